// channels/src/channel/async_impl.rs
//! The receive future and the stream adapter built on top of it.

use super::core::{ChannelCore, Registration};
use super::waiter::WaiterHandle;
use crate::error::RecvError;

use futures_core::future::FusedFuture;
use futures_core::stream::{FusedStream, Stream};
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

// --- RecvFuture ---

enum RecvInner<T> {
  /// A queued value was taken at call time. Dropping the future unpolled
  /// returns it to `core`.
  Taken { core: Arc<ChannelCore<T>>, value: T },
  /// The channel was already closed at call time.
  Closed,
  /// Queued as a waiter in the core.
  Waiting {
    core: Arc<ChannelCore<T>>,
    handle: WaiterHandle<T>,
  },
  Finished,
}

/// A future resolving to the next value of a channel.
///
/// The receive is registered when the future is created, not when it is first
/// polled, so waiters are served in the order `recv()` was called. Dropping a
/// pending future withdraws its place in the queue; dropping one that was
/// already handed a value gives the value back to the channel.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct RecvFuture<T> {
  inner: RecvInner<T>,
}

// The value is never pinned structurally.
impl<T> Unpin for RecvFuture<T> {}

impl<T> RecvFuture<T> {
  pub(crate) fn register(core: &Arc<ChannelCore<T>>, drain_backlog: bool) -> Self {
    let inner = match core.register_recv(drain_backlog) {
      Registration::Ready(Ok(value)) => RecvInner::Taken {
        core: Arc::clone(core),
        value,
      },
      Registration::Ready(Err(RecvError::Closed)) => RecvInner::Closed,
      Registration::Queued(handle) => RecvInner::Waiting {
        core: Arc::clone(core),
        handle,
      },
    };
    RecvFuture { inner }
  }
}

impl<T> Future for RecvFuture<T> {
  type Output = Result<T, RecvError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    match mem::replace(&mut this.inner, RecvInner::Finished) {
      RecvInner::Taken { value, .. } => Poll::Ready(Ok(value)),
      RecvInner::Closed => Poll::Ready(Err(RecvError::Closed)),
      RecvInner::Waiting { core, handle } => match handle.slot.poll_outcome(cx) {
        Poll::Ready(result) => Poll::Ready(result),
        Poll::Pending => {
          this.inner = RecvInner::Waiting { core, handle };
          Poll::Pending
        }
      },
      RecvInner::Finished => panic!("RecvFuture polled after completion"),
    }
  }
}

impl<T> FusedFuture for RecvFuture<T> {
  fn is_terminated(&self) -> bool {
    matches!(self.inner, RecvInner::Finished)
  }
}

impl<T> Drop for RecvFuture<T> {
  fn drop(&mut self) {
    match mem::replace(&mut self.inner, RecvInner::Finished) {
      RecvInner::Taken { core, value } => core.reclaim(value),
      RecvInner::Waiting { core, handle } => core.abandon(&handle),
      RecvInner::Closed | RecvInner::Finished => {}
    }
  }
}

impl<T> fmt::Debug for RecvFuture<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match &self.inner {
      RecvInner::Taken { .. } => "Ready",
      RecvInner::Closed => "Closed",
      RecvInner::Waiting { .. } => "Waiting",
      RecvInner::Finished => "Finished",
    };
    f.debug_struct("RecvFuture").field("state", &state).finish()
  }
}

// --- RecvStream ---

/// A stream of the values received from a channel.
///
/// Each step awaits the next value. Once the channel is closed the stream still
/// yields any values left in the queue, then ends. The end is final: a
/// terminated stream never yields again, even if polled further.
pub struct RecvStream<T> {
  core: Arc<ChannelCore<T>>,
  pending: Option<RecvFuture<T>>,
  terminated: bool,
}

impl<T> RecvStream<T> {
  pub(crate) fn new(core: Arc<ChannelCore<T>>) -> Self {
    RecvStream {
      core,
      pending: None,
      terminated: false,
    }
  }
}

impl<T> Stream for RecvStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    if this.terminated {
      return Poll::Ready(None);
    }
    let core = &this.core;
    let fut = this
      .pending
      .get_or_insert_with(|| RecvFuture::register(core, true));
    match Pin::new(fut).poll(cx) {
      Poll::Ready(Ok(value)) => {
        this.pending = None;
        Poll::Ready(Some(value))
      }
      Poll::Ready(Err(RecvError::Closed)) => {
        this.pending = None;
        this.terminated = true;
        Poll::Ready(None)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<T> FusedStream for RecvStream<T> {
  fn is_terminated(&self) -> bool {
    self.terminated
  }
}

impl<T> fmt::Debug for RecvStream<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvStream")
      .field("pending", &self.pending.is_some())
      .field("terminated", &self.terminated)
      .finish_non_exhaustive()
  }
}
