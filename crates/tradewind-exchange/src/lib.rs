//! Exchange market-data clients.
//!
//! Currently one client: Binance USDT-margined futures, used to pull the
//! candlestick history that trade-analysis prompts are built from.

pub mod binance;

pub use binance::{BinanceFutures, ExchangeError, Kline, SUPPORTED_INTERVALS};
