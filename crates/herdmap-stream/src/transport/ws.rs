//! WebSocket transport over `tokio-tungstenite`.
//!
//! Text frames are passed through as-is. Binary frames are accepted when
//! they hold UTF-8 and skipped otherwise. Ping/pong is answered by
//! tungstenite itself. A close frame from the server ends the stream like
//! any other drop: the manager reconnects.

use futures::StreamExt as _;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::transport::{Connector, Transport};

/// Dials WebSocket endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Create a WebSocket connector.
    pub const fn new() -> Self {
        Self
    }
}

/// An open WebSocket connection.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<Self::Transport, StreamError> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| StreamError::Connect {
                url: url.to_owned(),
                message: e.to_string(),
            })?;
        debug!(url = url, status = %response.status(), "WebSocket handshake complete");
        Ok(WsTransport { stream })
    }
}

impl Transport for WsTransport {
    async fn next_frame(&mut self) -> Option<Result<String, StreamError>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(e) => {
                        debug!(len = bytes.len(), error = %e, "skipping non-UTF-8 binary frame");
                    }
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed the WebSocket");
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(StreamError::Transport(e.to_string()))),
            }
        }
        None
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            warn!(error = %e, "WebSocket close handshake failed");
        }
    }
}
