/*!
 * Async Dispatcher / Completion Bridge
 * Validates, offloads to the blocking pool, and resolves futures on the runtime
 */

use super::future::LockFuture;
use super::request::{Operation, Reply, WorkRequest};
use crate::core::{LockError, LockResult};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Dispatches lock operations onto an injected runtime's blocking pool
///
/// Per request, the execute step always finishes before the complete step
/// runs: the completion task awaits the blocking task's join handle. Across
/// requests there is no ordering at all — overlapping operations against the
/// same path or descriptor are not serialized here, and their interleaving
/// is governed by OS flock semantics alone.
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    /// Dispatcher on an explicit runtime handle
    ///
    /// Injecting the handle lets tests substitute their own runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Dispatcher on the current runtime
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime context, like
    /// [`Handle::current`](tokio::runtime::Handle::current).
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Submit an operation for out-of-line execution
    ///
    /// Never blocks the submitter. An invalid argument shape rejects the
    /// returned future immediately and synchronously; no background work is
    /// scheduled for it. Otherwise the request is handed to the worker pool
    /// and the future resolves once the completion step has run.
    pub fn submit<T>(
        &self,
        operation: Operation,
        extract: fn(Reply) -> LockResult<T>,
    ) -> LockFuture<T> {
        let (tx, rx) = oneshot::channel();

        if let Err(err) = validate(&operation) {
            debug!(operation = operation.name(), error = %err, "rejected before dispatch");
            let _ = tx.send(Err(err));
            return LockFuture::new(rx, extract);
        }

        let request = WorkRequest::new(operation, tx);
        debug!(operation = request.name(), "dispatching to worker pool");

        // The request moves submitter -> worker -> completion task; nothing
        // on the submitting side touches it again after this point
        self.handle.spawn(async move {
            complete(
                tokio::task::spawn_blocking(move || {
                    let mut request = request;
                    request.execute();
                    request
                })
                .await,
            );
        });

        LockFuture::new(rx, extract)
    }
}

/// Complete step: runs back on the runtime once the worker has finished
fn complete(joined: Result<WorkRequest, JoinError>) {
    match joined {
        Ok(request) => request.complete(),
        Err(e) => {
            // The request died with the worker; its dropped sender still
            // rejects the future exactly once
            warn!(error = %e, "worker task failed");
        }
    }
}

fn validate(operation: &Operation) -> LockResult<()> {
    match operation {
        Operation::Acquire { path } | Operation::Probe { path } => {
            if path.as_os_str().is_empty() {
                Err(LockError::invalid_argument("Invalid string argument"))
            } else {
                Ok(())
            }
        }
        Operation::Release { fd } => {
            if *fd < 0 {
                Err(LockError::invalid_argument("First argument must be a number"))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use tempfile::tempdir;

    fn extract_fd(reply: Reply) -> LockResult<crate::core::Fd> {
        match reply {
            Reply::Acquired(fd) => Ok(fd),
            other => Err(LockError::dispatch(format!("unexpected reply: {other:?}"))),
        }
    }

    #[tokio::test]
    async fn invalid_path_rejects_synchronously() {
        let dispatcher = Dispatcher::current();

        // Resolved before the future is ever driven by the runtime
        let outcome = dispatcher
            .submit(
                Operation::Acquire {
                    path: Default::default(),
                },
                extract_fd,
            )
            .now_or_never()
            .expect("rejected synchronously");
        assert_eq!(
            outcome,
            Err(LockError::invalid_argument("Invalid string argument"))
        );
    }

    #[tokio::test]
    async fn negative_descriptor_rejects_synchronously() {
        let dispatcher = Dispatcher::current();

        let outcome = dispatcher
            .submit(Operation::Release { fd: -1 }, |reply| match reply {
                Reply::Released => Ok(()),
                other => Err(LockError::dispatch(format!("unexpected reply: {other:?}"))),
            })
            .now_or_never()
            .expect("rejected synchronously");
        assert_eq!(
            outcome,
            Err(LockError::invalid_argument("First argument must be a number"))
        );
    }

    #[tokio::test]
    async fn acquire_executes_on_the_worker_pool() {
        let dispatcher = Dispatcher::current();
        let dir = tempdir().unwrap();

        let fd = dispatcher
            .submit(
                Operation::Acquire {
                    path: dir.path().join("work.lock"),
                },
                extract_fd,
            )
            .await
            .expect("acquire");
        assert!(fd >= 0);

        dispatcher
            .submit(Operation::Release { fd }, |reply| match reply {
                Reply::Released => Ok(()),
                other => Err(LockError::dispatch(format!("unexpected reply: {other:?}"))),
            })
            .await
            .expect("release");
    }
}
