//! `tradewind-core`: shared configuration, errors and domain types.
//!
//! Everything the other crates agree on lives here: the merged TOML/env
//! configuration, the workspace-wide error type, and the futures-market
//! vocabulary (symbols, kline intervals, analysis targets).

pub mod config;
pub mod error;
pub mod types;

pub use config::TradewindConfig;
pub use error::{CoreError, Result};
pub use types::{AnalysisTarget, FuturesSymbol};
