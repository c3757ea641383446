// channels/src/channel/core.rs

//! The state machine behind every channel handle.
//!
//! `ChannelCore` owns a FIFO of queued values, a FIFO of suspended receivers,
//! a monotonic closed flag and an optional completion counter. Everything sits
//! behind one `parking_lot::Mutex`, so each operation runs to completion in a
//! single exclusive region.
//!
//! ### Invariants
//!
//! 1.  **Exclusive queues**: `data` and `waiters` are never both non-empty. A
//!     send with waiters present resumes the oldest one directly, and a receive
//!     with data present is served directly.
//! 2.  **Terminal close**: once `closed` is set it stays set, and `waiters` is
//!     emptied in the same critical section.
//! 3.  **Completion**: `completion_count` only grows and closes the channel at
//!     most once.
//! 4.  **No loss**: a value is either delivered to exactly one receive or still
//!     in `data`. A receive future dropped after being handed a value gives it
//!     back through [`ChannelCore::abandon`] or [`ChannelCore::reclaim`].

use super::waiter::{Abandoned, Waiter, WaiterHandle};
use super::{ChannelState, TryRecv};
use crate::config::ChannelConfig;
use crate::error::{ConfigError, RecvError, SendError};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use tracing::{debug, trace};

/// Result of asking the core for the next value.
pub(crate) enum Registration<T> {
  /// The call settled without suspending.
  Ready(Result<T, RecvError>),
  /// A waiter was queued; the handle resolves once it is fulfilled or rejected.
  Queued(WaiterHandle<T>),
}

pub(crate) struct ChannelInternal<T> {
  pub(crate) data: VecDeque<T>,
  pub(crate) waiters: VecDeque<Waiter<T>>,
  pub(crate) closed: bool,
  pub(crate) completion_count: usize,
  next_waiter_id: u64,
}

impl<T> ChannelInternal<T> {
  fn state(&self) -> ChannelState {
    if self.closed {
      ChannelState::Closed
    } else if !self.waiters.is_empty() {
      ChannelState::AwaitingConsumer
    } else if !self.data.is_empty() {
      ChannelState::DataQueued
    } else {
      ChannelState::Empty
    }
  }

  #[inline]
  fn check_invariants(&self) {
    debug_assert!(
      self.data.is_empty() || self.waiters.is_empty(),
      "data and waiter queues are both non-empty"
    );
    debug_assert!(
      !self.closed || self.waiters.is_empty(),
      "closed channel still holds waiters"
    );
  }

  /// Hands `value` to the oldest waiter, or queues it if nobody is waiting.
  fn deliver(&mut self, value: T) {
    match self.waiters.pop_front() {
      Some(waiter) => {
        trace!(waiter = waiter.id, "handing value to waiting receiver");
        waiter.fulfill(value);
      }
      None => self.data.push_back(value),
    }
  }

  /// Puts back a value a receive took but never observed. It was the oldest
  /// value at the time, so it goes ahead of everything still queued.
  fn give_back(&mut self, value: T) {
    match self.waiters.pop_front() {
      Some(next) => next.fulfill(value),
      None => self.data.push_front(value),
    }
  }

  fn register(&mut self) -> WaiterHandle<T> {
    let id = self.next_waiter_id;
    self.next_waiter_id = self.next_waiter_id.wrapping_add(1);
    let (waiter, handle) = Waiter::pair(id);
    self.waiters.push_back(waiter);
    trace!(waiter = id, waiting = self.waiters.len(), "receiver suspended");
    handle
  }

  fn close(&mut self) -> bool {
    if self.closed {
      return false;
    }
    let rejected = mem::take(&mut self.waiters);
    self.closed = true;
    debug!(
      rejected_waiters = rejected.len(),
      backlog = self.data.len(),
      "channel closed"
    );
    for waiter in rejected {
      waiter.reject();
    }
    true
  }
}

/// Shared core of a channel, designed to be wrapped in an `Arc`.
pub(crate) struct ChannelCore<T> {
  internal: Mutex<ChannelInternal<T>>,
  completion_target: Option<usize>,
}

impl<T> fmt::Debug for ChannelCore<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let guard = self.internal.lock();
    f.debug_struct("ChannelCore")
      .field("state", &guard.state())
      .field("queued", &guard.data.len())
      .field("waiting", &guard.waiters.len())
      .field("completion_count", &guard.completion_count)
      .field("completion_target", &self.completion_target)
      .finish()
  }
}

impl<T> ChannelCore<T> {
  pub(crate) fn new(config: ChannelConfig) -> Self {
    ChannelCore {
      internal: Mutex::new(ChannelInternal {
        data: VecDeque::new(),
        waiters: VecDeque::new(),
        closed: false,
        completion_count: 0,
        next_waiter_id: 0,
      }),
      completion_target: config.completion_target,
    }
  }

  pub(crate) fn state(&self) -> ChannelState {
    self.internal.lock().state()
  }

  pub(crate) fn send(&self, value: T) -> Result<(), SendError<T>> {
    let mut guard = self.internal.lock();
    if guard.closed {
      return Err(SendError(value));
    }
    guard.deliver(value);
    guard.check_invariants();
    Ok(())
  }

  /// Takes the next value or queues a waiter for it.
  ///
  /// With `drain_backlog` unset a closed channel always reports `Closed`, even
  /// with values left over. Streams set it so the backlog is still yielded.
  pub(crate) fn register_recv(&self, drain_backlog: bool) -> Registration<T> {
    let mut guard = self.internal.lock();
    if guard.closed {
      let backlog = if drain_backlog { guard.data.pop_front() } else { None };
      return Registration::Ready(backlog.ok_or(RecvError::Closed));
    }
    if let Some(value) = guard.data.pop_front() {
      return Registration::Ready(Ok(value));
    }
    let handle = guard.register();
    guard.check_invariants();
    Registration::Queued(handle)
  }

  pub(crate) fn try_recv(&self) -> TryRecv<T> {
    let mut guard = self.internal.lock();
    match guard.data.pop_front() {
      Some(value) => TryRecv::Value(value),
      None if guard.closed => TryRecv::Closed,
      None => TryRecv::NotAvailable,
    }
  }

  /// Closes the channel. Returns `false` if it was already closed.
  pub(crate) fn close(&self) -> bool {
    let mut guard = self.internal.lock();
    let closed_now = guard.close();
    guard.check_invariants();
    closed_now
  }

  pub(crate) fn done(&self) -> Result<(), ConfigError> {
    let target = self.completion_target.ok_or(ConfigError::NoCompletionTarget)?;
    let mut guard = self.internal.lock();
    if guard.closed {
      return Ok(());
    }
    guard.completion_count += 1;
    debug!(
      count = guard.completion_count,
      completion_target = target,
      "producer reported completion"
    );
    if guard.completion_count >= target {
      guard.close();
    }
    guard.check_invariants();
    Ok(())
  }

  /// Undoes a receive whose future was dropped before observing its outcome.
  pub(crate) fn abandon(&self, handle: &WaiterHandle<T>) {
    let mut guard = self.internal.lock();
    match handle.slot.abandon() {
      Abandoned::Queued => {
        guard.waiters.retain(|w| w.id != handle.id);
        trace!(waiter = handle.id, "pending receive dropped");
      }
      Abandoned::Unclaimed(value) => {
        trace!(waiter = handle.id, "returning unclaimed value to the channel");
        guard.give_back(value);
      }
      Abandoned::Settled => {}
    }
    guard.check_invariants();
  }

  /// Returns a value taken at registration time by a future that was dropped
  /// before it was polled.
  pub(crate) fn reclaim(&self, value: T) {
    let mut guard = self.internal.lock();
    trace!("returning value of an unpolled receive to the channel");
    guard.give_back(value);
    guard.check_invariants();
  }

  pub(crate) fn len(&self) -> usize {
    self.internal.lock().data.len()
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.internal.lock().closed
  }

  pub(crate) fn waiting_receivers(&self) -> usize {
    self.internal.lock().waiters.len()
  }

  pub(crate) fn completion_count(&self) -> usize {
    self.internal.lock().completion_count
  }

  pub(crate) fn completion_target(&self) -> Option<usize> {
    self.completion_target
  }
}
