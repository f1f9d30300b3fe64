/*!
 * Work Request Types
 * The value object a background execution carries across the thread boundary
 */

use crate::core::{Fd, LockError, LockResult};
use crate::flock;
use std::os::fd::IntoRawFd;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::debug;

/// Operation kind plus its argument; fixed at request creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Block until the exclusive lock on `path` is acquired
    Acquire { path: PathBuf },
    /// Release the lock held through `fd`
    Release { fd: Fd },
    /// Report whether another holder currently holds the lock on `path`
    Probe { path: PathBuf },
}

impl Operation {
    /// Short name for log fields
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Acquire { .. } => "acquire",
            Self::Release { .. } => "release",
            Self::Probe { .. } => "probe",
        }
    }
}

/// Success value carried back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Descriptor now holding the exclusive lock
    Acquired(Fd),
    /// Lock released
    Released,
    /// Whether another holder was observed
    Probed(bool),
}

/// What the outcome slot holds once the execute step has run
pub(crate) type Outcome = LockResult<Reply>;

/// Everything one background execution needs
///
/// Owned by exactly one context at a time: constructed by the dispatcher,
/// moved into the worker for the execute step, moved back to the runtime for
/// the complete step, then consumed. The outcome slot is written once by
/// [`execute`](Self::execute) and read once by [`complete`](Self::complete);
/// the oneshot sender is the future-resolution slot.
pub struct WorkRequest {
    operation: Operation,
    outcome: Option<Outcome>,
    resolve: oneshot::Sender<Outcome>,
}

impl WorkRequest {
    pub(crate) fn new(operation: Operation, resolve: oneshot::Sender<Outcome>) -> Self {
        Self {
            operation,
            outcome: None,
            resolve,
        }
    }

    /// Operation name for log fields
    #[inline]
    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    /// Execute step: runs the blocking adapter call, off the runtime
    ///
    /// Every failure is captured into the outcome slot; nothing crosses the
    /// worker boundary as a panic.
    pub(crate) fn execute(&mut self) {
        let outcome = match &self.operation {
            Operation::Acquire { path } => flock::open_for_locking(path).and_then(|file| {
                flock::acquire_exclusive(&file)?;
                // The caller owns the descriptor from here on; dropping the
                // File would close it and drop the lock with it
                Ok(Reply::Acquired(file.into_raw_fd()))
            }),
            Operation::Release { fd } => flock::release(*fd).map(|()| Reply::Released),
            Operation::Probe { path } => flock::probe(path).map(Reply::Probed),
        };
        self.outcome = Some(outcome);
    }

    /// Complete step: resolves the future from the outcome slot
    ///
    /// Runs back on the runtime, only after the execute step has finished.
    /// Consumes the request; the sender enforces resolve-exactly-once.
    pub(crate) fn complete(self) {
        let outcome = match self.outcome {
            Some(outcome) => outcome,
            // Execute always runs first; report a lost request instead of
            // panicking on the runtime if that ever breaks
            None => Err(LockError::dispatch("request completed without an outcome")),
        };
        if self.resolve.send(outcome).is_err() {
            debug!(operation = self.operation.name(), "caller dropped the future");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn execute_then_complete_resolves_once() {
        let dir = tempdir().unwrap();
        let (tx, rx) = oneshot::channel();
        let mut request = WorkRequest::new(
            Operation::Probe {
                path: dir.path().join("probe.lock"),
            },
            tx,
        );

        request.execute();
        request.complete();

        assert_eq!(rx.await.unwrap(), Ok(Reply::Probed(false)));
    }

    #[tokio::test]
    async fn failed_execute_carries_the_error() {
        let (tx, rx) = oneshot::channel();
        let mut request = WorkRequest::new(
            Operation::Acquire {
                path: PathBuf::from("/nonexistent-dir/x.lock"),
            },
            tx,
        );

        request.execute();
        request.complete();

        assert_eq!(rx.await.unwrap(), Err(LockError::OpenFailed));
    }
}
