//! TCP accept loop and WebSocket upgrade.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tickcast_common::TickcastError;
use tickcast_config::ServerConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;

use crate::connection::handle_connection;
use crate::lifecycle::Lifecycle;

pub struct Server {
    listener: TcpListener,
    path: Arc<str>,
    buffer: usize,
    lifecycle: Lifecycle,
}

impl Server {
    /// Bind the listener described by `config`. Port 0 picks a free port.
    pub async fn bind(config: &ServerConfig, lifecycle: Lifecycle) -> Result<Self, TickcastError> {
        let listener = TcpListener::bind(config.addr()).await?;
        Ok(Self {
            listener,
            path: Arc::from(config.path.as_str()),
            buffer: config.subscriber_buffer,
            lifecycle,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TickcastError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already upgraded keep running on their own tasks.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("tickcast-server listening on ws://{}{}", addr, self.path);
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Accept loop shutting down");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let path = Arc::clone(&self.path);
                        let lifecycle = self.lifecycle.clone();
                        let buffer = self.buffer;
                        tokio::spawn(async move {
                            accept(stream, peer, path, lifecycle, buffer).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "TCP accept error");
                    }
                },
            }
        }
    }
}

async fn accept(
    stream: TcpStream,
    peer: SocketAddr,
    path: Arc<str>,
    lifecycle: Lifecycle,
    buffer: usize,
) {
    let check_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        if req.uri().path() == &*path {
            Ok(resp)
        } else {
            tracing::debug!(peer = %peer, path = %req.uri().path(), "Rejected upgrade path");
            let mut err = ErrorResponse::new(Some("not found".into()));
            *err.status_mut() = StatusCode::NOT_FOUND;
            Err(err)
        }
    };

    match accept_hdr_async(stream, check_path).await {
        Ok(ws) => handle_connection(ws, peer, lifecycle, buffer).await,
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
        }
    }
}
