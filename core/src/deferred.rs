//! Deferred values for asynchronous loads.
//!
//! [`deferred`] creates a [`Resolver`] / [`LoadHandle`] pair. The resolver
//! side is handed to whatever produces the value (an image decoder, an IO
//! thread) and is consumed by resolving, so a value is delivered at most
//! once. The handle side is polled from the render loop, either with
//! [`LoadHandle::try_take`] or as a [`Future`] driven by a noop waker via
//! [`poll_now`].
//!
//! ```
//! use prism_core::deferred::{deferred, poll_now};
//! use std::task::Poll;
//!
//! let (resolver, mut handle) = deferred::<u32>();
//! assert_eq!(poll_now(&mut handle), Poll::Pending);
//! resolver.resolve(7);
//! assert_eq!(poll_now(&mut handle), Poll::Ready(Some(7)));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

/// Create a connected resolver and handle.
pub fn deferred<T>() -> (Resolver<T>, LoadHandle<T>) {
    let (sender, receiver) = mpsc::channel();
    (Resolver { sender }, LoadHandle { receiver })
}

/// A handle that is already resolved with `value`.
pub fn resolved<T>(value: T) -> LoadHandle<T> {
    let (resolver, handle) = deferred();
    resolver.resolve(value);
    handle
}

/// Producer side of a deferred value.
///
/// Dropping a resolver without resolving it makes the handle finish with
/// `None`.
#[derive(Debug)]
pub struct Resolver<T> {
    sender: mpsc::Sender<T>,
}

impl<T> Resolver<T> {
    /// Deliver the value. Does nothing if the handle was dropped.
    pub fn resolve(self, value: T) {
        // A dropped handle means nobody is waiting.
        let _ = self.sender.send(value);
    }
}

impl<T, E> Resolver<Result<T, E>> {
    /// Deliver a failure.
    pub fn reject(self, error: E) {
        self.resolve(Err(error));
    }
}

/// Consumer side of a deferred value.
///
/// Works with cooperative executors using noop wakers: polling only checks
/// whether the value has arrived.
#[derive(Debug)]
pub struct LoadHandle<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T> LoadHandle<T> {
    /// Take the value if it has arrived.
    ///
    /// This consumes the value; later calls return `None`.
    pub fn try_take(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// `Ready(Some(value))` once resolved, `Ready(None)` if the resolver was
    /// dropped without resolving, `Pending` otherwise.
    ///
    /// A delivered value is consumed.
    pub fn try_poll(&self) -> Poll<Option<T>> {
        match self.receiver.try_recv() {
            Ok(value) => Poll::Ready(Some(value)),
            Err(mpsc::TryRecvError::Empty) => Poll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => Poll::Ready(None),
        }
    }
}

impl<T> Future for LoadHandle<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.try_poll()
    }
}

/// Completes when every handle has completed.
///
/// Yields `Some` with the values in handle order, or `None` as soon as any
/// resolver is dropped unresolved.
pub fn all<T>(handles: Vec<LoadHandle<T>>) -> All<T> {
    let values = handles.iter().map(|_| None).collect();
    All { handles, values }
}

/// Future returned by [`all`].
pub struct All<T> {
    handles: Vec<LoadHandle<T>>,
    values: Vec<Option<T>>,
}

// Handles are polled through `&mut`, never pinned in place.
impl<T> Unpin for All<T> {}

impl<T> Future for All<T> {
    type Output = Option<Vec<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        for (handle, slot) in this.handles.iter_mut().zip(this.values.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            match Pin::new(handle).poll(cx) {
                Poll::Ready(Some(value)) => *slot = Some(value),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => {}
            }
        }
        if this.values.iter().all(Option::is_some) {
            let values = std::mem::take(&mut this.values);
            return Poll::Ready(values.into_iter().collect());
        }
        Poll::Pending
    }
}

/// Completes with the first value to arrive.
///
/// Dropped resolvers are ignored unless every handle is abandoned, in which
/// case the result is `None`. An empty list also yields `None`.
pub fn race<T>(handles: Vec<LoadHandle<T>>) -> Race<T> {
    let open = vec![true; handles.len()];
    Race { handles, open }
}

/// Future returned by [`race`].
pub struct Race<T> {
    handles: Vec<LoadHandle<T>>,
    open: Vec<bool>,
}

impl<T> Unpin for Race<T> {}

impl<T> Future for Race<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        for (handle, open) in this.handles.iter_mut().zip(this.open.iter_mut()) {
            if !*open {
                continue;
            }
            match Pin::new(handle).poll(cx) {
                Poll::Ready(Some(value)) => return Poll::Ready(Some(value)),
                Poll::Ready(None) => *open = false,
                Poll::Pending => {}
            }
        }
        if this.open.iter().any(|&o| o) {
            Poll::Pending
        } else {
            Poll::Ready(None)
        }
    }
}

/// Creates a no-op waker for manual polling.
pub fn noop_waker() -> Waker {
    fn noop(_: *const ()) {}
    fn clone(p: *const ()) -> RawWaker {
        RawWaker::new(p, &VTABLE)
    }
    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
    // SAFETY: every vtable function ignores the data pointer.
    unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) }
}

/// Poll `future` once with a noop waker.
pub fn poll_now<F: Future + Unpin>(future: &mut F) -> Poll<F::Output> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    Pin::new(future).poll(&mut cx)
}
