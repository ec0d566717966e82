use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
