//! An unbounded hand-off channel.
//!
//! Producers [`send`](Channel::send) values without waiting, consumers
//! [`recv`](Channel::recv) them as futures, and neither side needs the other to
//! be active at the same time. Values sent while receivers are waiting go
//! straight to the oldest waiter; otherwise they are queued in order.
//!
//! ## Behavior
//!
//! - **FIFO everywhere**: queued values come out in send order, and waiting
//!   receivers are served in the order they called `recv`.
//! - **Closing**: [`close`](Channel::close) fails every waiting receiver with
//!   [`RecvError::Closed`](crate::error::RecvError::Closed). Values still queued stay available to
//!   [`try_recv`](Channel::try_recv) and to streams, while `recv` fails from then on.
//! - **Completion barrier**: a channel built with a completion target closes
//!   itself once [`done`](Channel::done) has been called that many times.

pub(crate) mod async_impl;
pub(crate) mod core;
mod waiter;


use self::core::ChannelCore;
use crate::config::ChannelConfig;
use crate::error::{ConfigError, SendError};

use futures_core::Stream;
use generational_arena::Index;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

pub use async_impl::{RecvFuture, RecvStream};

/// Observable state of a channel, derived from its queues and closed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
  /// No queued values and no waiting receivers.
  Empty,
  /// At least one receiver is waiting for a value.
  AwaitingConsumer,
  /// At least one value is queued.
  DataQueued,
  /// The channel is closed. Queued values may remain until drained.
  Closed,
}

/// Outcome of a non-blocking receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryRecv<T> {
  /// The next value in the queue.
  Value(T),
  /// Nothing is queued right now, but the channel is still open.
  NotAvailable,
  /// The channel is closed and its queue is drained.
  Closed,
}

impl<T> TryRecv<T> {
  /// Returns the value, if any.
  pub fn value(self) -> Option<T> {
    match self {
      TryRecv::Value(v) => Some(v),
      _ => None,
    }
  }

  /// Returns `true` for [`TryRecv::Closed`].
  pub fn is_closed(&self) -> bool {
    matches!(self, TryRecv::Closed)
  }
}

// --- Channel ---

/// A channel handle with both producer and consumer operations.
///
/// Cloning the handle shares the same channel, which is how several producers
/// take part in a completion barrier.
pub struct Channel<T> {
  core: Arc<ChannelCore<T>>,
}

impl<T> Channel<T> {
  /// Creates an empty channel without a completion target.
  pub fn new() -> Self {
    Self::with_config(ChannelConfig::default())
  }

  /// Creates a channel that closes after `target` calls to [`done`](Self::done).
  pub fn with_completion_target(target: usize) -> Self {
    Self::with_config(ChannelConfig::new().completion_target(target))
  }

  /// Creates a channel from an explicit config.
  pub fn with_config(config: ChannelConfig) -> Self {
    Channel {
      core: Arc::new(ChannelCore::new(config)),
    }
  }

  /// Sends a value, handing it to the oldest waiting receiver if there is one.
  ///
  /// # Errors
  ///
  /// Returns the value inside [`SendError`] if the channel is closed. The
  /// queue is left untouched.
  pub fn send(&self, value: T) -> Result<(), SendError<T>> {
    self.core.send(value)
  }

  /// Receives the next value.
  ///
  /// The receive is registered immediately; the returned future resolves to
  /// [`RecvError::Closed`](crate::error::RecvError::Closed) if the channel is
  /// already closed (even with values still queued) or closes while waiting.
  pub fn recv(&self) -> RecvFuture<T> {
    RecvFuture::register(&self.core, false)
  }

  /// Takes the next queued value without waiting.
  ///
  /// After close this keeps draining queued values before reporting
  /// [`TryRecv::Closed`]. It never serves or disturbs waiting receivers.
  pub fn try_recv(&self) -> TryRecv<T> {
    self.core.try_recv()
  }

  /// Closes the channel. Closing twice is a no-op.
  pub fn close(&self) {
    self.core.close();
  }

  /// Reports that one producer has finished.
  ///
  /// The channel closes once the number of calls reaches the completion
  /// target. Calls after that are ignored.
  ///
  /// # Errors
  ///
  /// [`ConfigError::NoCompletionTarget`] if the channel was built without a
  /// completion target.
  pub fn done(&self) -> Result<(), ConfigError> {
    self.core.done()
  }

  /// Returns a stream over the channel's values. See [`RecvStream`].
  pub fn stream(&self) -> RecvStream<T> {
    RecvStream::new(Arc::clone(&self.core))
  }

  /// Returns a consumer-only handle to this channel.
  pub fn receiver(&self) -> Receiver<T> {
    Receiver::new(Arc::clone(&self.core), None)
  }

  /// Current state of the channel.
  pub fn state(&self) -> ChannelState {
    self.core.state()
  }

  /// Number of queued values.
  pub fn len(&self) -> usize {
    self.core.len()
  }

  /// Returns `true` if no value is queued.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` once the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.core.is_closed()
  }

  /// Number of receivers currently waiting for a value.
  pub fn waiting_receivers(&self) -> usize {
    self.core.waiting_receivers()
  }

  /// Number of `done()` calls that were counted.
  pub fn completion_count(&self) -> usize {
    self.core.completion_count()
  }

  /// The completion target this channel was built with.
  pub fn completion_target(&self) -> Option<usize> {
    self.core.completion_target()
  }
}

impl<T> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Channel {
      core: Arc::clone(&self.core),
    }
  }
}

impl<T> Default for Channel<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Channel").field("core", &self.core).finish()
  }
}

// --- Receiver ---

/// A consumer-only handle: it can receive and be streamed, but not send or close.
///
/// Obtained from [`Channel::receiver`] or from a
/// [`Broadcast`](crate::broadcast::Broadcast) registry.
///
/// Polling the handle as a [`Stream`] keeps one receive registered inside it
/// between polls. If a poll returned `Pending`, that receive is already queued
/// and takes the next value ahead of any [`recv`](Receiver::recv) made later
/// on the same handle. Nothing is lost, but mixing the two on one handle does
/// not follow call order. Use [`Channel::stream`] for a separate stream.
pub struct Receiver<T> {
  stream: RecvStream<T>,
  core: Arc<ChannelCore<T>>,
  pub(crate) key: Option<Index>,
}

impl<T> Receiver<T> {
  pub(crate) fn new(core: Arc<ChannelCore<T>>, key: Option<Index>) -> Self {
    Receiver {
      stream: RecvStream::new(Arc::clone(&core)),
      core,
      key,
    }
  }

  pub(crate) fn core(&self) -> &Arc<ChannelCore<T>> {
    &self.core
  }

  /// Receives the next value. See [`Channel::recv`].
  pub fn recv(&self) -> RecvFuture<T> {
    RecvFuture::register(&self.core, false)
  }

  /// Takes the next queued value without waiting. See [`Channel::try_recv`].
  pub fn try_recv(&self) -> TryRecv<T> {
    self.core.try_recv()
  }

  /// Current state of the underlying channel.
  pub fn state(&self) -> ChannelState {
    self.core.state()
  }

  /// Number of queued values.
  pub fn len(&self) -> usize {
    self.core.len()
  }

  /// Returns `true` if no value is queued.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` once the underlying channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.core.is_closed()
  }
}

impl<T> Stream for Receiver<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    Pin::new(&mut self.get_mut().stream).poll_next(cx)
  }
}

impl<T> fmt::Debug for Receiver<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Receiver")
      .field("core", &self.core)
      .field("registered", &self.key.is_some())
      .finish()
  }
}
