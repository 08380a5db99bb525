//! One-shot background filter passes.
//!
//! Each call to [`PatternFilter::filter_async`](crate::PatternFilter::filter_async)
//! runs on its own short-lived thread and reports back through a oneshot
//! channel. The handle can be awaited, blocked on, or polled.

use crate::error::{LogscopeError, Result};
use crate::filter::matches::MatchResult;
use log::warn;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Handle to a background filter pass
///
/// Resolves to the same [`MatchResult`] that a synchronous `filter` call would
/// have produced for the pattern current when the pass was scheduled. There is
/// no cancellation: dropping the handle lets the pass finish and discards its
/// result.
#[derive(Debug)]
pub struct PendingMatches {
    generation: u64,
    pattern: String,
    receiver: oneshot::Receiver<MatchResult>,
}

impl PendingMatches {
    /// Run `job` on a new thread and return a handle to its result
    pub(crate) fn spawn<F>(generation: u64, pattern: String, job: F) -> Self
    where
        F: FnOnce() -> MatchResult + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        let spawned = std::thread::Builder::new()
            .name(format!("filter-{}", generation))
            .spawn(move || {
                // Receiver may already be gone; nothing to report then
                let _ = sender.send(job());
            });

        // On failure the closure and its sender are dropped, so the handle
        // resolves to FilterTaskFailed instead of hanging.
        if let Err(e) = spawned {
            warn!("Failed to spawn filter thread: {}", e);
        }

        Self {
            generation,
            pattern,
            receiver,
        }
    }

    /// Generation number this request was tagged with
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pattern text the pass runs with
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Block the current thread until the pass finishes
    ///
    /// Inside an async runtime, `.await` the handle instead.
    ///
    /// # Panics
    ///
    /// This function panics if called within an asynchronous execution
    /// context.
    pub fn blocking_wait(self) -> Result<MatchResult> {
        self.receiver.blocking_recv().map_err(|_| worker_gone())
    }

    /// Take the result if the pass has finished, without blocking
    ///
    /// Returns `None` while the pass is still running. After a result has been
    /// taken, further calls report `FilterTaskFailed`.
    pub fn try_take(&mut self) -> Option<Result<MatchResult>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(Ok(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(worker_gone())),
        }
    }
}

impl Future for PendingMatches {
    type Output = Result<MatchResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.map_err(|_| worker_gone()))
    }
}

fn worker_gone() -> LogscopeError {
    LogscopeError::filter_task("background filter ended without a result")
}
