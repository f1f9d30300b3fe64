/*!
 * Caller-Facing Surface
 * lock / unlock / is_locked over the async dispatch bridge
 */

use crate::bridge::{Dispatcher, LockFuture, Operation, Reply};
use crate::core::{Fd, LockError};
use std::path::Path;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

/// Handle to the advisory file-locking service
///
/// Cheap to clone; every clone dispatches onto the same runtime.
#[derive(Clone)]
pub struct FileLock {
    dispatcher: Dispatcher,
}

impl FileLock {
    /// Service on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics outside a runtime context, like [`Handle::current`].
    pub fn new() -> Self {
        Self {
            dispatcher: Dispatcher::current(),
        }
    }

    /// Service on an explicit runtime handle
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            dispatcher: Dispatcher::new(handle),
        }
    }

    /// Acquire the exclusive advisory lock on `path`, creating the file if
    /// absent
    ///
    /// Resolves with the descriptor holding the lock once it is granted; the
    /// wait happens on the worker pool, with no timeout. The descriptor
    /// stays open, and the lock held, until passed to
    /// [`unlock`](Self::unlock). An empty path rejects synchronously.
    pub fn lock(&self, path: impl AsRef<Path>) -> LockFuture<Fd> {
        self.dispatcher.submit(
            Operation::Acquire {
                path: path.as_ref().to_path_buf(),
            },
            |reply| match reply {
                Reply::Acquired(fd) => Ok(fd),
                other => Err(mismatched(other)),
            },
        )
    }

    /// Release the lock held through `fd`
    ///
    /// The descriptor itself is left open afterwards; closing it is the
    /// caller's business. A negative descriptor rejects synchronously.
    pub fn unlock(&self, fd: Fd) -> LockFuture<()> {
        self.dispatcher
            .submit(Operation::Release { fd }, |reply| match reply {
                Reply::Released => Ok(()),
                other => Err(mismatched(other)),
            })
    }

    /// Report whether another holder currently holds the lock on `path`
    ///
    /// Advisory probing is inherently racy: two concurrent probes can both
    /// observe an unlocked file and both proceed to acquire, one of them
    /// then blocking. The answer is a snapshot, not a reservation. A holder
    /// in this same process is indistinguishable from one elsewhere.
    pub fn is_locked(&self, path: impl AsRef<Path>) -> LockFuture<bool> {
        self.dispatcher.submit(
            Operation::Probe {
                path: path.as_ref().to_path_buf(),
            },
            |reply| match reply {
                Reply::Probed(held) => Ok(held),
                other => Err(mismatched(other)),
            },
        )
    }
}

impl Default for FileLock {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatched(reply: Reply) -> LockError {
    LockError::dispatch(format!("unexpected reply: {reply:?}"))
}

/// Initialize structured tracing for binaries
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
