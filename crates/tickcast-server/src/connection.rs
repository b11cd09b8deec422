//! Per-connection task: register, pump queued ticks to the socket, deregister.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::lifecycle::Lifecycle;
use crate::registry::Subscriber;

/// Drive one upgraded WebSocket until either side goes away.
///
/// This task is the only owner of the socket. The registry only holds the
/// sending half of the outbound queue, so the socket is closed here and
/// nowhere else.
pub async fn handle_connection<S>(
    ws: WebSocketStream<S>,
    peer: SocketAddr,
    lifecycle: Lifecycle,
    buffer: usize,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (subscriber, mut rx) = Subscriber::channel(buffer);
    let id = subscriber.id();
    tracing::debug!(peer = %peer, subscriber = %id, "WebSocket upgraded");

    lifecycle.on_open(subscriber).await;
    let reason = pump(ws, &mut rx).await;
    // Queue stays open until deregistered; ticks racing teardown land here.
    lifecycle.on_close(id, &reason).await;
    drop(rx);
}

/// Forward queued text until the connection ends. Returns the close reason.
async fn pump<S>(ws: WebSocketStream<S>, rx: &mut mpsc::Receiver<Arc<str>>) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            queued = rx.recv() => match queued {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.as_ref().into())).await {
                        return format!("write failed: {e}");
                    }
                }
                // Every handle was dropped: the broadcaster evicted us.
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return "evicted by broadcaster".into();
                }
            },

            frame = stream.next() => match frame {
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) => format!(
                            "closed by client ({}): {}",
                            u16::from(frame.code),
                            frame.reason.as_str()
                        ),
                        None => "closed by client".into(),
                    };
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                // Inbound data is not consumed.
                Some(Ok(_)) => {}
                Some(Err(e)) => return format!("socket error: {e}"),
                None => return "stream ended".into(),
            },
        }
    }
}
