/*!
 * Core Types
 * Common types used across the crate
 */

use std::os::fd::RawFd;

/// File descriptor handle holding an acquired lock
///
/// Returned by a successful acquire and consumed by release. The crate does
/// not track how many outstanding handles exist for a path.
pub type Fd = RawFd;

/// Common result type for lock operations
pub type LockResult<T> = Result<T, super::errors::LockError>;
