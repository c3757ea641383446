// channels/src/error.rs

use std::fmt;
use thiserror::Error;

/// Error returned by `send` when the channel has already been closed.
///
/// The value that could not be sent is handed back to the caller.
#[derive(Error, PartialEq, Eq, Clone, Copy)]
#[error("sending on closed channel")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
  /// Consumes the error, returning the value that was not sent.
  #[inline]
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SendError(..)")
  }
}

/// Error produced by a receive future that can never yield a value.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The channel was closed, either before the call or while it was waiting.
  #[error("channel closed")]
  Closed,
}

/// Misuse of a channel's configuration.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
  /// `done()` was called on a channel built without a completion target.
  #[error("cannot call done() on a channel without a completion target")]
  NoCompletionTarget,
}
