// channels/src/channel/waiter.rs

//! Waiter records for receivers suspended on an empty channel.
//!
//! A waiter is split in two halves sharing one [`WaiterSlot`]:
//!
//! - [`Waiter`] sits in the core's FIFO and is the only way to resume the
//!   receiver, through [`Waiter::fulfill`] or [`Waiter::reject`].
//! - [`WaiterHandle`] is held by the receive future and polls the slot.
//!
//! The core lock is always taken before a slot lock, never the other way round.

use crate::error::RecvError;

use parking_lot::Mutex;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

pub(crate) enum SlotState<T> {
  /// Still queued in the core. Holds the waker of the last poll, if any.
  Pending(Option<Waker>),
  Fulfilled(T),
  Rejected,
  /// Outcome consumed by the receiver, or the receiver went away.
  Done,
}

/// What was left in a slot when its receiver gave up on it.
pub(crate) enum Abandoned<T> {
  /// The waiter is still in the core's queue and must be unlinked.
  Queued,
  /// A value was handed over but never observed. It must go back to the channel.
  Unclaimed(T),
  /// Nothing to undo.
  Settled,
}

pub(crate) struct WaiterSlot<T> {
  state: Mutex<SlotState<T>>,
}

impl<T> WaiterSlot<T> {
  fn new() -> Self {
    Self {
      state: Mutex::new(SlotState::Pending(None)),
    }
  }

  /// Polls for the outcome, registering the task's waker while still pending.
  pub(crate) fn poll_outcome(&self, cx: &mut Context<'_>) -> Poll<Result<T, RecvError>> {
    let mut state = self.state.lock();
    match mem::replace(&mut *state, SlotState::Done) {
      SlotState::Fulfilled(value) => Poll::Ready(Ok(value)),
      SlotState::Rejected => Poll::Ready(Err(RecvError::Closed)),
      SlotState::Pending(waker) => {
        let waker = match waker {
          Some(w) if w.will_wake(cx.waker()) => w,
          _ => cx.waker().clone(),
        };
        *state = SlotState::Pending(Some(waker));
        Poll::Pending
      }
      SlotState::Done => {
        debug_assert!(false, "waiter slot polled after its outcome was taken");
        Poll::Ready(Err(RecvError::Closed))
      }
    }
  }

  /// Marks the slot as abandoned. Must be called with the core lock held.
  pub(crate) fn abandon(&self) -> Abandoned<T> {
    let mut state = self.state.lock();
    match mem::replace(&mut *state, SlotState::Done) {
      SlotState::Pending(_) => Abandoned::Queued,
      SlotState::Fulfilled(value) => Abandoned::Unclaimed(value),
      SlotState::Rejected | SlotState::Done => Abandoned::Settled,
    }
  }

  fn settle(&self, outcome: SlotState<T>) {
    let waker = {
      let mut state = self.state.lock();
      match mem::replace(&mut *state, outcome) {
        SlotState::Pending(waker) => waker,
        _ => {
          debug_assert!(false, "waiter settled twice");
          None
        }
      }
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<T> fmt::Debug for WaiterSlot<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match &*self.state.lock() {
      SlotState::Pending(_) => "Pending",
      SlotState::Fulfilled(_) => "Fulfilled",
      SlotState::Rejected => "Rejected",
      SlotState::Done => "Done",
    };
    f.debug_struct("WaiterSlot").field("state", &state).finish()
  }
}

/// The core's half of a suspended receive.
#[derive(Debug)]
pub(crate) struct Waiter<T> {
  pub(crate) id: u64,
  slot: Arc<WaiterSlot<T>>,
}

impl<T> Waiter<T> {
  /// Creates a linked waiter/handle pair.
  pub(crate) fn pair(id: u64) -> (Waiter<T>, WaiterHandle<T>) {
    let slot = Arc::new(WaiterSlot::new());
    (
      Waiter {
        id,
        slot: Arc::clone(&slot),
      },
      WaiterHandle { id, slot },
    )
  }

  /// Resumes the receiver with `value`.
  pub(crate) fn fulfill(self, value: T) {
    self.slot.settle(SlotState::Fulfilled(value));
  }

  /// Resumes the receiver with [`RecvError::Closed`].
  pub(crate) fn reject(self) {
    self.slot.settle(SlotState::Rejected);
  }
}

/// The receive future's half of a suspended receive.
#[derive(Debug)]
pub(crate) struct WaiterHandle<T> {
  pub(crate) id: u64,
  pub(crate) slot: Arc<WaiterSlot<T>>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_util::task::noop_waker;

  #[test]
  fn fulfilled_slot_yields_value_once() {
    let (waiter, handle) = Waiter::pair(7);
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);

    assert!(handle.slot.poll_outcome(&mut cx).is_pending());
    waiter.fulfill("x");
    assert_eq!(handle.slot.poll_outcome(&mut cx), Poll::Ready(Ok("x")));
  }

  #[test]
  fn rejected_slot_reports_closed() {
    let (waiter, handle) = Waiter::<u8>::pair(1);
    waiter.reject();
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    assert_eq!(
      handle.slot.poll_outcome(&mut cx),
      Poll::Ready(Err(RecvError::Closed))
    );
  }

  #[test]
  fn abandoning_returns_unclaimed_value() {
    let (waiter, handle) = Waiter::pair(3);
    waiter.fulfill(42);
    match handle.slot.abandon() {
      Abandoned::Unclaimed(v) => assert_eq!(v, 42),
      _ => panic!("expected the unclaimed value back"),
    }
    assert!(matches!(handle.slot.abandon(), Abandoned::Settled));
  }

  #[test]
  fn abandoning_pending_slot_reports_queued() {
    let (_waiter, handle) = Waiter::<u8>::pair(9);
    assert!(matches!(handle.slot.abandon(), Abandoned::Queued));
  }
}
