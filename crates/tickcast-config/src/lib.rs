//! Tickcast configuration.
//!
//! TOML-based configuration for the broadcast server. Every section uses
//! defaults, so an empty or partial file is valid and the server runs with
//! no file at all.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{BroadcastConfig, FailurePolicy, ServerConfig, TickcastConfig};
pub use toml_loader::{default_config_path, load_from_path, load_or_default};
pub use validation::validate;
