//! tickcast-client: subscribe to a tickcast server and keep recent samples.

pub mod ring_buffer;
pub mod watch;

pub use ring_buffer::{RingBuffer, DEFAULT_CAPACITY};
pub use watch::{parse_sample, watch, Sample, WatchOptions};
