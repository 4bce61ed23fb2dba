use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

/// A pinned, boxed, `Send` future borrowing for `'a`.
///
/// Effects that await nested effects recurse through this alias.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Polls a future exactly once with a no-op waker.
///
/// Returns `Some` when the future completed without suspending. Nothing is
/// woken later, so a `None` result means the caller must drive the future
/// some other way.
pub fn poll_once<F: Future + Unpin>(fut: &mut F) -> Option<F::Output> {
	let mut cx = Context::from_waker(Waker::noop());
	match Pin::new(fut).poll(&mut cx) {
		Poll::Ready(out) => Some(out),
		Poll::Pending => None,
	}
}
