/*!
 * Lock Primitive Adapter
 * Thin synchronous wrappers over flock(2) for whole-file exclusive locks
 *
 * Every call here may block (acquire indefinitely so) and must only run on a
 * worker thread, never on the runtime. The lock file's contents are never
 * read or written; the file is purely a lock token.
 */

use crate::core::{Fd, LockError, LockResult};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;
use tracing::debug;

/// Open the target path for locking, creating it if absent
///
/// Contents are left alone; only the descriptor matters.
pub fn open_for_locking(path: &Path) -> LockResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| {
            debug!(path = %path.display(), error = %e, "open for locking failed");
            LockError::OpenFailed
        })
}

/// Acquire the exclusive advisory lock, blocking until it is granted
pub fn acquire_exclusive(file: &File) -> LockResult<()> {
    flock(file.as_raw_fd(), libc::LOCK_EX).map_err(|e| {
        debug!(fd = file.as_raw_fd(), error = %e, "exclusive acquire failed");
        LockError::LockFailed
    })
}

/// Release a previously acquired lock held through `fd`
///
/// The descriptor is left open; closing it is the caller's business.
pub fn release(fd: Fd) -> LockResult<()> {
    flock(fd, libc::LOCK_UN).map_err(|e| {
        debug!(fd, error = %e, "release failed");
        LockError::UnlockFailed
    })
}

/// Probe whether another holder currently holds the lock on `path`
///
/// Attempts a transient non-blocking exclusive acquire: success means the
/// lock was free and it is released again immediately; any acquire failure
/// is reported as held. The probe file is closed on drop, so the transient
/// lock is never left behind.
pub fn probe(path: &Path) -> LockResult<bool> {
    let file = open_for_locking(path)?;
    let fd = file.as_raw_fd();
    match flock(fd, libc::LOCK_EX | libc::LOCK_NB) {
        Ok(()) => {
            if let Err(e) = flock(fd, libc::LOCK_UN) {
                debug!(fd, error = %e, "transient probe release failed");
            }
            Ok(false)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "probe observed a holder");
            Ok(true)
        }
    }
}

#[allow(unsafe_code)]
fn flock(fd: Fd, operation: libc::c_int) -> io::Result<()> {
    // SAFETY: `fd` comes from an open file the caller keeps alive across this
    // call, and `operation` is a valid flock(2) operation.
    let rc = unsafe { libc::flock(fd, operation) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_then_probe_sees_holder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("held.lock");

        let file = open_for_locking(&path).unwrap();
        acquire_exclusive(&file).unwrap();

        // A separate open gives a separate open file description, so the
        // probe observes the holder the same way another process would
        assert!(probe(&path).unwrap());

        release(file.as_raw_fd()).unwrap();
        assert!(!probe(&path).unwrap());
    }

    #[test]
    fn probe_of_unlocked_path_reports_free() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("free.lock");

        assert!(!probe(&path).unwrap());
        assert!(!probe(&path).unwrap());

        // The path must still be lockable afterwards
        let file = open_for_locking(&path).unwrap();
        acquire_exclusive(&file).unwrap();
        release(file.as_raw_fd()).unwrap();
    }

    #[test]
    fn open_failure_is_canonical() {
        let err = open_for_locking(Path::new("/nonexistent-dir/x.lock")).unwrap_err();
        assert_eq!(err, LockError::OpenFailed);
    }
}
