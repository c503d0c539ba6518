//! In-process stream transport.
//!
//! A [`MemoryConnector`] refuses every dial unless a connection has been
//! queued with [`MemoryConnector::accept_next`]. Each accepted connection
//! is driven by the returned [`MemoryFeed`]: frames sent on the feed
//! arrive at the client in order, and dropping the feed ends the
//! connection abruptly, which the client treats as an abnormal close.
//!
//! The connector also counts dial attempts and records the URLs dialed,
//! which is what reconnect tests assert on.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::transport::{Connector, Transport};

/// Scripted in-process connector. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    dialed: Vec<String>,
    queued: VecDeque<mpsc::UnboundedReceiver<String>>,
}

/// Server side of one accepted in-memory connection.
#[derive(Debug)]
pub struct MemoryFeed {
    tx: mpsc::UnboundedSender<String>,
}

/// Client side of one accepted in-memory connection.
#[derive(Debug)]
pub struct MemoryTransport {
    rx: mpsc::UnboundedReceiver<String>,
}

impl MemoryConnector {
    /// Create a connector with nothing queued (every dial is refused).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one connection to be accepted by the next dial.
    ///
    /// Connections are handed out in the order they were queued.
    pub fn accept_next(&self) -> MemoryFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().queued.push_back(rx);
        MemoryFeed { tx }
    }

    /// Number of dial attempts made so far, accepted or refused.
    pub fn attempts(&self) -> usize {
        self.lock().dialed.len()
    }

    /// URLs dialed so far, in order.
    pub fn dialed(&self) -> Vec<String> {
        self.lock().dialed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryFeed {
    /// Push one text frame to the client.
    ///
    /// Returns `false` if the client has already closed the connection.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.tx.send(frame.into()).is_ok()
    }

    /// Whether the client side has closed or dropped the connection.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, url: &str) -> Result<Self::Transport, StreamError> {
        let mut inner = self.lock();
        inner.dialed.push(url.to_owned());
        inner
            .queued
            .pop_front()
            .map(|rx| MemoryTransport { rx })
            .ok_or_else(|| StreamError::Connect {
                url: url.to_owned(),
                message: String::from("connection refused"),
            })
    }
}

impl Transport for MemoryTransport {
    async fn next_frame(&mut self) -> Option<Result<String, StreamError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}
