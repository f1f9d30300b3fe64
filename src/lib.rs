/*!
 * file-lock
 * Advisory whole-file exclusive locking for async callers
 *
 * The OS primitive (`flock(2)`) is blocking, so every operation is offloaded
 * onto the runtime's blocking pool and the caller gets a future that resolves
 * exactly once back on the runtime.
 */

pub mod api;
pub mod bridge;
pub mod core;
pub mod flock;

// Re-exports
pub use crate::api::{init_tracing, FileLock};
pub use crate::bridge::{Dispatcher, LockFuture, Operation, Reply, WorkRequest};
pub use crate::core::{Fd, LockError, LockResult};
