/*!
 * Caller-Visible Future
 * Resolves or rejects exactly once, from the completion step
 */

use super::request::{Outcome, Reply};
use crate::core::{LockError, LockResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Future returned by [`Dispatcher::submit`](super::Dispatcher::submit)
///
/// Wraps the oneshot receiver whose sender travels inside the work request;
/// the channel itself enforces the resolve-exactly-once contract. A sender
/// dropped without sending (worker panic, runtime shutdown) surfaces as a
/// `Dispatch` rejection, never a hang and never a second resolution.
pub struct LockFuture<T> {
    rx: oneshot::Receiver<Outcome>,
    extract: fn(Reply) -> LockResult<T>,
}

impl<T> LockFuture<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Outcome>, extract: fn(Reply) -> LockResult<T>) -> Self {
        Self { rx, extract }
    }
}

impl<T> Future for LockFuture<T> {
    type Output = LockResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let extract = self.extract;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome.and_then(extract)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(LockError::dispatch(
                "worker abandoned the request",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn dropped_sender_rejects_instead_of_hanging() {
        let (tx, rx) = oneshot::channel::<Outcome>();
        drop(tx);

        let future = LockFuture::new(rx, |_| Ok(()));
        let outcome = future.now_or_never().expect("must be ready");
        assert!(matches!(outcome, Err(LockError::Dispatch(_))));
    }

    #[test]
    fn sent_outcome_is_extracted() {
        let (tx, rx) = oneshot::channel();
        tx.send(Ok(Reply::Probed(true))).unwrap();

        let future = LockFuture::new(rx, |reply| match reply {
            Reply::Probed(held) => Ok(held),
            _ => Err(LockError::dispatch("unexpected reply")),
        });
        assert_eq!(future.now_or_never().expect("must be ready"), Ok(true));
    }
}
