use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SentinelError {
    /// Missing or malformed startup configuration
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// RPC transport failures talking to the ledger
    #[error("RPC Error: {0}")]
    RpcError(String),

    /// An alert sink failed to render or send a message
    #[error("Delivery Error: {0}")]
    DeliveryError(String),

    /// Logger could not be installed
    #[error("Logging Error: {0}")]
    LoggingError(String),
}

impl From<anyhow::Error> for SentinelError {
    fn from(err: anyhow::Error) -> Self {
        SentinelError::RpcError(format!("{:#}", err))
    }
}

impl From<solana_client::client_error::ClientError> for SentinelError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SentinelError::RpcError(format!("Solana client error: {}", err))
    }
}

impl From<reqwest::Error> for SentinelError {
    fn from(err: reqwest::Error) -> Self {
        SentinelError::DeliveryError(format!("HTTP error: {}", err))
    }
}

impl From<fern::InitError> for SentinelError {
    fn from(err: fern::InitError) -> Self {
        SentinelError::LoggingError(err.to_string())
    }
}

impl SentinelError {
    /// Category shown in front of failures logged by the poll loop.
    pub fn categorize(&self) -> ErrorCategory {
        match self {
            SentinelError::ConfigError(_) | SentinelError::LoggingError(_) => {
                ErrorCategory::Configuration
            }
            SentinelError::RpcError(_) => ErrorCategory::Query,
            SentinelError::DeliveryError(_) => ErrorCategory::Delivery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Query,
    Delivery,
}

pub type Result<T> = std::result::Result<T, SentinelError>;
