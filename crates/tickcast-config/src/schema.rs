//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickcastConfig {
    pub server: ServerConfig,
    pub broadcast: BroadcastConfig,
}

// =============================================================================
// Server Config
// =============================================================================

/// Network endpoint the WebSocket server listens on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface address to bind.
    pub bind: String,
    pub port: u16,
    /// Request path that is upgraded to a WebSocket.
    pub path: String,
    /// Capacity of each subscriber's outbound queue.
    pub subscriber_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8765,
            path: "/ws".into(),
            subscriber_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// =============================================================================
// Broadcast Config
// =============================================================================

/// Value range, pacing and failure handling of the broadcast loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub value_min: i64,
    pub value_max: i64,
    pub interval_ms: u64,
    pub on_send_error: FailurePolicy,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            value_min: 0,
            value_max: 255,
            interval_ms: 10,
            on_send_error: FailurePolicy::default(),
        }
    }
}

impl BroadcastConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// What the broadcast loop does when a send to one subscriber fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop broadcasting to everyone.
    #[default]
    FailStop,
    /// Deregister the failed subscriber and keep going.
    DropSubscriber,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailStop => f.write_str("fail_stop"),
            Self::DropSubscriber => f.write_str("drop_subscriber"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail_stop" | "fail-stop" => Ok(Self::FailStop),
            "drop_subscriber" | "drop-subscriber" => Ok(Self::DropSubscriber),
            other => Err(format!(
                "unknown send error policy '{other}' (expected fail_stop or drop_subscriber)"
            )),
        }
    }
}
