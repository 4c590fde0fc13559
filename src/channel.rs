//! Session-scoped push channel management.
//!
//! The backend streams step events over a WebSocket addressed by the
//! session id it returned from the submission call. This module owns the
//! single channel slot: opening a channel for a new session tears down
//! the previous one first, so events from two sessions can never
//! interleave into one timeline.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Default capacity of the per-channel event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Lifecycle events delivered alongside the frames themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The WebSocket handshake completed; the channel is live.
    Opened,
    /// One text frame, forwarded unmodified.
    Frame(String),
    /// The channel is gone: explicit close, remote close, or transport
    /// error. No reconnect is attempted.
    Closed,
}

/// Owns at most one open push channel at a time.
///
/// Each `open` call hands back a fresh receiver; the previous channel's
/// reader task is aborted and its sender dropped before the replacement
/// is spawned, with no await point in between. A superseded session's
/// events live only in its own (now discarded) queue.
pub struct ChannelManager {
    ws_base: String,
    queue_capacity: usize,
    current: Option<OpenChannel>,
}

struct OpenChannel {
    session_id: String,
    reader: JoinHandle<()>,
}

impl ChannelManager {
    /// Create a manager for the given WebSocket base URL
    /// (e.g. `ws://127.0.0.1:8000`).
    pub fn new(ws_base: &str) -> Self {
        Self::with_queue_capacity(ws_base, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(ws_base: &str, queue_capacity: usize) -> Self {
        Self {
            ws_base: ws_base.trim_end_matches('/').to_string(),
            queue_capacity: queue_capacity.max(1),
            current: None,
        }
    }

    /// Session id of the currently attached channel, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.session_id.as_str())
    }

    /// Open a channel for `session_id`, superseding any previous one.
    ///
    /// Teardown of the old channel and spawn of the new reader happen
    /// back-to-back with no suspension point; nothing from the old
    /// session can be queued behind events of the new one.
    pub fn open(&mut self, session_id: &str) -> mpsc::Receiver<ChannelEvent> {
        self.close();

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let url = format!("{}/progress/{}", self.ws_base, session_id);
        let reader = tokio::spawn(run_channel(url, tx));

        self.current = Some(OpenChannel {
            session_id: session_id.to_string(),
            reader,
        });
        rx
    }

    /// Tear down the current channel, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(channel) = self.current.take() {
            debug!(session_id = %channel.session_id, "closing push channel");
            channel.reader.abort();
        }
    }
}

impl Drop for ChannelManager {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reader task: `Opening -> Open -> Closed`.
///
/// Connects, reports `Opened`, then forwards text frames FIFO until the
/// stream ends for any reason. Always finishes with `Closed` (best
/// effort; the receiver may already be gone when superseded).
async fn run_channel(url: String, tx: mpsc::Sender<ChannelEvent>) {
    debug!(url = %url, "opening push channel");

    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(err) => {
            warn!(url = %url, error = %err, "push channel connect failed");
            let _ = tx.send(ChannelEvent::Closed).await;
            return;
        }
    };

    if tx.send(ChannelEvent::Opened).await.is_err() {
        return;
    }

    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                if tx.send(ChannelEvent::Frame(text)).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                debug!(url = %url, "push channel closed by remote");
                break;
            }
            // Binary, ping and pong frames are not step events.
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                warn!(url = %url, error = %err, "push channel transport error");
                break;
            }
        }
    }

    let _ = tx.send(ChannelEvent::Closed).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_supersedes_previous_channel() {
        let mut manager = ChannelManager::new("ws://127.0.0.1:9");
        let mut first = manager.open("session-1");
        let _second = manager.open("session-2");
        assert_eq!(manager.session_id(), Some("session-2"));

        // The first channel's queue drains to its own Closed marker (or
        // straight to None if the abort won the race); nothing from
        // session-2 can appear on it.
        loop {
            match first.recv().await {
                Some(ChannelEvent::Closed) | None => break,
                Some(other) => panic!("unexpected event on stale channel: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_closed() {
        // Nothing listens on port 9; the reader must fail soft.
        let mut manager = ChannelManager::new("ws://127.0.0.1:9");
        let mut rx = manager.open("session-1");
        assert_eq!(rx.recv().await, Some(ChannelEvent::Closed));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut manager = ChannelManager::new("ws://127.0.0.1:9");
        let _rx = manager.open("session-1");
        manager.close();
        manager.close();
        assert_eq!(manager.session_id(), None);
    }
}
