/*!
 * flock-demo - Advisory Lock Walkthrough
 *
 * Probes, acquires, holds, and releases a whole-file exclusive lock:
 *
 *   flock-demo [path] [hold-secs]
 *
 * Run two instances against the same path to watch the second one wait.
 */

use file_lock::{init_tracing, FileLock};
use std::error::Error;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "/tmp/flock-demo.lock".to_string());
    let hold_secs: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);

    let locker = FileLock::new();

    if locker.is_locked(&path).await? {
        info!(path = %path, "file is locked by another process");
    }

    let fd = locker.lock(&path).await?;
    info!(path = %path, fd, "lock acquired");

    info!(hold_secs, "holding the lock");
    tokio::time::sleep(Duration::from_secs(hold_secs)).await;

    locker.unlock(fd).await?;
    info!(fd, "lock released");

    Ok(())
}
