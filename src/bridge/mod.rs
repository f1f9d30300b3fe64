/*!
 * Async Dispatch Bridge
 * Moves blocking lock operations onto the worker pool and resolves the
 * caller-visible future exactly once, back on the runtime
 */

pub mod dispatcher;
pub mod future;
pub mod request;

// Re-export for convenience
pub use dispatcher::Dispatcher;
pub use future::LockFuture;
pub use request::{Operation, Reply, WorkRequest};
