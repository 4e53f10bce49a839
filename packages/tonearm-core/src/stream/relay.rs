//! Bounded byte relay between an upstream source and an HTTP response.
//!
//! A pump task reads the upstream [`ByteStream`] and forwards chunks over a
//! bounded channel, so at most `capacity` chunks are held in memory. The
//! consumer side is a [`RelayStream`]; dropping it (the client went away)
//! cancels the pump, which drops the upstream source and closes its
//! connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::upstream::ByteStream;

type Chunk = Result<Bytes, std::io::Error>;

/// Cooperative cancellation handle for a running relay.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    token: CancellationToken,
}

impl RelayHandle {
    /// Stops the pump. Buffered chunks may still be read; no new ones arrive.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Consumer side of a relay. Dropping it cancels the pump.
pub struct RelayStream {
    rx: mpsc::Receiver<Chunk>,
    handle: RelayHandle,
    _cancel_on_drop: DropGuard,
}

impl RelayStream {
    pub fn handle(&self) -> RelayHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl Stream for RelayStream {
    type Item = Chunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for RelayStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayStream")
            .field("cancelled", &self.handle.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Starts relaying `source` through a buffer of `capacity` chunks.
///
/// `label` identifies the relay in log output (usually the media id).
pub fn spawn_relay(source: ByteStream, capacity: usize, label: impl Into<String>) -> RelayStream {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let token = CancellationToken::new();

    tokio::spawn(pump(source, tx, token.clone(), RelayGuard::new(label.into())));

    RelayStream {
        rx,
        handle: RelayHandle {
            token: token.clone(),
        },
        _cancel_on_drop: token.drop_guard(),
    }
}

async fn pump(
    mut source: ByteStream,
    tx: mpsc::Sender<Chunk>,
    token: CancellationToken,
    mut guard: RelayGuard,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                guard.outcome = RelayOutcome::Cancelled;
                break;
            }
            next = source.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                let len = chunk.len();
                let sent = tokio::select! {
                    biased;
                    _ = token.cancelled() => false,
                    sent = tx.send(Ok(chunk)) => sent.is_ok(),
                };
                if !sent {
                    guard.outcome = RelayOutcome::Cancelled;
                    break;
                }
                guard.record_chunk(len);
            }
            Some(Err(e)) => {
                guard.outcome = RelayOutcome::Failed(e.to_string());
                let _ = tx.send(Err(e)).await;
                break;
            }
            None => {
                guard.outcome = RelayOutcome::Finished;
                break;
            }
        }
    }
    // `source` drops here, releasing the upstream connection.
}

// ─────────────────────────────────────────────────────────────────────────────
// Relay Guard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum RelayOutcome {
    Running,
    Finished,
    Cancelled,
    Failed(String),
}

/// Logs relay lifecycle: a start line, and a summary on drop.
///
/// Owned by the pump task, so counters need no synchronization.
struct RelayGuard {
    label: String,
    started_at: Instant,
    bytes_sent: u64,
    chunks_sent: u64,
    outcome: RelayOutcome,
}

impl RelayGuard {
    fn new(label: String) -> Self {
        log::info!("[Stream] Relay started: media={}", label);
        Self {
            label,
            started_at: Instant::now(),
            bytes_sent: 0,
            chunks_sent: 0,
            outcome: RelayOutcome::Running,
        }
    }

    fn record_chunk(&mut self, len: usize) {
        self.chunks_sent += 1;
        self.bytes_sent += len as u64;
    }
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        match &self.outcome {
            RelayOutcome::Failed(err) => log::warn!(
                "[Stream] Relay failed: media={}, bytes={}, chunks={}, elapsed={}ms, error={}",
                self.label,
                self.bytes_sent,
                self.chunks_sent,
                elapsed_ms,
                err
            ),
            outcome => log::info!(
                "[Stream] Relay {}: media={}, bytes={}, chunks={}, elapsed={}ms",
                match outcome {
                    RelayOutcome::Finished => "finished",
                    RelayOutcome::Cancelled => "cancelled",
                    _ => "aborted",
                },
                self.label,
                self.bytes_sent,
                self.chunks_sent,
                elapsed_ms
            ),
        }
    }
}
