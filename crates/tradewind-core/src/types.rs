use serde::{Deserialize, Serialize};

/// USDⓈ-M futures trading pairs the platform analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuturesSymbol {
    BTCUSDT,
    ETHUSDT,
    BNBUSDT,
    XRPUSDT,
    DOGEUSDT,
    SOLUSDT,
    ADAUSDT,
    DOTUSDT,
    MATICUSDT,
    LTCUSDT,
}

impl FuturesSymbol {
    /// The exchange-facing pair name, e.g. `"BTCUSDT"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuturesSymbol::BTCUSDT => "BTCUSDT",
            FuturesSymbol::ETHUSDT => "ETHUSDT",
            FuturesSymbol::BNBUSDT => "BNBUSDT",
            FuturesSymbol::XRPUSDT => "XRPUSDT",
            FuturesSymbol::DOGEUSDT => "DOGEUSDT",
            FuturesSymbol::SOLUSDT => "SOLUSDT",
            FuturesSymbol::ADAUSDT => "ADAUSDT",
            FuturesSymbol::DOTUSDT => "DOTUSDT",
            FuturesSymbol::MATICUSDT => "MATICUSDT",
            FuturesSymbol::LTCUSDT => "LTCUSDT",
        }
    }

    /// All supported pairs, in listing order.
    pub fn all() -> &'static [FuturesSymbol] {
        &[
            FuturesSymbol::BTCUSDT,
            FuturesSymbol::ETHUSDT,
            FuturesSymbol::BNBUSDT,
            FuturesSymbol::XRPUSDT,
            FuturesSymbol::DOGEUSDT,
            FuturesSymbol::SOLUSDT,
            FuturesSymbol::ADAUSDT,
            FuturesSymbol::DOTUSDT,
            FuturesSymbol::MATICUSDT,
            FuturesSymbol::LTCUSDT,
        ]
    }
}

impl std::fmt::Display for FuturesSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FuturesSymbol {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BTCUSDT" => Ok(FuturesSymbol::BTCUSDT),
            "ETHUSDT" => Ok(FuturesSymbol::ETHUSDT),
            "BNBUSDT" => Ok(FuturesSymbol::BNBUSDT),
            "XRPUSDT" => Ok(FuturesSymbol::XRPUSDT),
            "DOGEUSDT" => Ok(FuturesSymbol::DOGEUSDT),
            "SOLUSDT" => Ok(FuturesSymbol::SOLUSDT),
            "ADAUSDT" => Ok(FuturesSymbol::ADAUSDT),
            "DOTUSDT" => Ok(FuturesSymbol::DOTUSDT),
            "MATICUSDT" => Ok(FuturesSymbol::MATICUSDT),
            "LTCUSDT" => Ok(FuturesSymbol::LTCUSDT),
            other => Err(crate::error::CoreError::UnknownSymbol(other.to_string())),
        }
    }
}

/// What a recurring analysis job posts to the trader endpoint.
///
/// The scheduler treats this as an opaque payload template: `symbol` and
/// `kline_interval` are the typed fields the downstream endpoint requires,
/// `extra` carries any additional fields verbatim (flattened into the JSON
/// object on serialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTarget {
    pub symbol: FuturesSymbol,
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnalysisTarget {
    pub fn new(symbol: FuturesSymbol) -> Self {
        Self {
            symbol,
            kline_interval: default_kline_interval(),
            extra: serde_json::Map::new(),
        }
    }
}

fn default_kline_interval() -> String {
    "1h".to_string()
}
