use super::error::{ResolveError, ResolveResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Deadline and cancellation state threaded through every resolver call.
///
/// Clones share the cancellation flag, so one handle can be given to a
/// signal handler while the others travel with the resolutions.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl ResolveContext {
    /// A context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is cancelled or expired; otherwise return the time budget
    pub fn check(&self, operation: &str) -> ResolveResult<Option<Duration>> {
        if self.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        match self.remaining() {
            Some(remaining) if remaining.is_zero() => Err(ResolveError::DeadlineExceeded {
                operation: operation.to_string(),
            }),
            remaining => Ok(remaining),
        }
    }
}
