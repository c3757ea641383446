//! A fan-out registry: one producer side, many independent receivers.
//!
//! Every receiver handed out by [`Broadcast::receiver`] owns a private channel.
//! A broadcast `send` clones the value into each registered channel, so
//! receivers never compete for values and a slow receiver only grows its own
//! queue.
//!
//! ## Behavior
//!
//! - **Best-effort delivery**: a member that refuses a value (because it was
//!   closed) is skipped. The other members still receive it.
//! - **Stable handles**: members live in a generational arena, so removal is
//!   O(1) and a stale handle can never remove a newer member.
//! - **Removal is not retroactive**: values already queued in a removed
//!   receiver stay there and can still be received.
//! - **`Clone` Requirement**: since a value goes to every member, `T` must
//!   implement `Clone`.

use crate::channel::core::ChannelCore;
use crate::channel::Receiver;
use crate::config::ChannelConfig;

use generational_arena::Arena;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// The producer side of a fan-out channel.
pub struct Broadcast<T> {
  members: Mutex<Arena<Arc<ChannelCore<T>>>>,
}

impl<T> Broadcast<T> {
  /// Creates a registry with no receivers.
  pub fn new() -> Self {
    Broadcast {
      members: Mutex::new(Arena::new()),
    }
  }

  /// Closes every registered receiver's channel.
  ///
  /// Waiting receives fail with
  /// [`RecvError::Closed`](crate::error::RecvError::Closed); queued values stay
  /// available to `try_recv` and streams.
  pub fn close(&self) {
    let members = self.members.lock();
    for (_, core) in members.iter() {
      core.close();
    }
    debug!(members = members.len(), "broadcast closed");
  }

  /// Registers a new receiver. It only sees values sent after this call.
  pub fn receiver(&self) -> Receiver<T> {
    let core = Arc::new(ChannelCore::new(ChannelConfig::default()));
    let mut members = self.members.lock();
    let key = members.insert(Arc::clone(&core));
    debug!(?key, members = members.len(), "broadcast receiver registered");
    Receiver::new(core, Some(key))
  }

  /// Unregisters `receiver`, so later sends no longer reach it.
  ///
  /// Returns `false` if the handle does not belong to this registry or was
  /// already removed.
  pub fn remove_receiver(&self, receiver: &Receiver<T>) -> bool {
    let key = match receiver.key {
      Some(key) => key,
      None => return false,
    };
    let mut members = self.members.lock();
    let owned = matches!(members.get(key), Some(core) if Arc::ptr_eq(core, receiver.core()));
    if !owned {
      return false;
    }
    members.remove(key);
    debug!(?key, members = members.len(), "broadcast receiver removed");
    true
  }

  /// Number of registered receivers.
  pub fn receiver_count(&self) -> usize {
    self.members.lock().len()
  }

  /// Returns `true` if no receiver is registered.
  pub fn is_empty(&self) -> bool {
    self.receiver_count() == 0
  }
}

impl<T: Clone> Broadcast<T> {
  /// Sends a copy of `value` to every registered receiver.
  ///
  /// Members whose channel is closed are skipped. Returns how many members
  /// accepted the value.
  pub fn send(&self, value: T) -> usize {
    let members = self.members.lock();
    let mut delivered = 0;
    for (key, core) in members.iter() {
      match core.send(value.clone()) {
        Ok(()) => delivered += 1,
        Err(_) => warn!(?key, "broadcast member is closed; value skipped"),
      }
    }
    delivered
  }
}

impl<T> Default for Broadcast<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for Broadcast<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Broadcast")
      .field("receivers", &self.receiver_count())
      .finish()
  }
}
