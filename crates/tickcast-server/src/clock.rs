//! Time source for message timestamps.

use chrono::{DateTime, Local, Utc};
use tickcast_common::format_timestamp;

/// Produces the timestamp string for each tick.
pub trait Clock: Send + Sync + 'static {
    fn timestamp(&self) -> String;
}

/// System clock rendered in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        format_timestamp(&Local::now())
    }
}

/// Always reports the same instant, rendered in UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        format_timestamp(&self.0)
    }
}
