//! Subscribe to a tickcast server and record incoming samples.

use chrono::{Local, NaiveDateTime};
use futures_util::StreamExt;
use tickcast_common::{Tick, TickcastError};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::ring_buffer::{RingBuffer, DEFAULT_CAPACITY};

/// One received tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Local wall clock at receipt, unix milliseconds.
    pub received_at_ms: i64,
    pub timestamp: NaiveDateTime,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Stop after this many samples.
    pub limit: Option<usize>,
    /// Log a summary every N samples. 0 disables.
    pub summary_every: usize,
    pub capacity: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            summary_every: 100,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Decode one text frame.
pub fn parse_sample(text: &str, received_at_ms: i64) -> Result<Sample, TickcastError> {
    let tick = Tick::from_json(text).map_err(|e| TickcastError::Protocol(e.to_string()))?;
    let timestamp = tick
        .parsed_timestamp()
        .ok_or_else(|| TickcastError::Protocol(format!("bad timestamp: {}", tick.timestamp)))?;
    Ok(Sample {
        received_at_ms,
        timestamp,
        value: tick.value,
    })
}

/// Connect to `url` and push every sample into `buffer` until the server
/// closes the connection or `options.limit` samples have arrived.
///
/// Malformed frames are logged and skipped. Returns the number of samples
/// recorded.
pub async fn watch(
    url: &str,
    options: &WatchOptions,
    buffer: &mut RingBuffer<Sample>,
) -> Result<usize, TickcastError> {
    let (mut ws, _) = connect_async(url)
        .await
        .map_err(|e| TickcastError::WebSocket(format!("connect to {url} failed: {e}")))?;
    tracing::info!(url = %url, "Connected");

    let mut received = 0usize;
    while let Some(frame) = ws.next().await {
        let frame = frame.map_err(|e| TickcastError::WebSocket(e.to_string()))?;
        match frame {
            Message::Text(text) => {
                let sample = match parse_sample(text.as_str(), Local::now().timestamp_millis()) {
                    Ok(sample) => sample,
                    Err(e) => {
                        tracing::warn!(error = %e, message = %text.as_str(), "Skipping message");
                        continue;
                    }
                };
                buffer.push(sample);
                received += 1;

                if options.summary_every > 0 && received % options.summary_every == 0 {
                    if let Some(latest) = buffer.latest() {
                        tracing::info!(
                            received,
                            value = latest.value,
                            timestamp = %latest.timestamp,
                            "Progress"
                        );
                    }
                }

                if options.limit.is_some_and(|limit| received >= limit) {
                    let _ = ws.close(None).await;
                    break;
                }
            }
            Message::Close(_) => {
                tracing::info!("Server closed the connection");
                break;
            }
            _ => {}
        }
    }

    Ok(received)
}
