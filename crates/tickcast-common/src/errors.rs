use std::path::PathBuf;

use crate::id::SubscriberId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Outcome of a failed delivery attempt to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("subscriber {0} is closed")]
    Closed(SubscriberId),

    #[error("subscriber {0} outbound queue is full")]
    Lagging(SubscriberId),
}

impl DeliveryError {
    pub fn subscriber(&self) -> SubscriberId {
        match self {
            Self::Closed(id) | Self::Lagging(id) => *id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TickcastError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Other(String),
}
