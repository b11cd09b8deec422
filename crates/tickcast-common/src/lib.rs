pub mod errors;
pub mod id;
pub mod tick;

pub use errors::{ConfigError, DeliveryError, TickcastError};
pub use id::SubscriberId;
pub use tick::{format_timestamp, parse_timestamp, Tick, TIMESTAMP_FORMAT};

pub type Result<T> = std::result::Result<T, TickcastError>;
