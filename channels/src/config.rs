// channels/src/config.rs

//! Construction-time options for a [`Channel`](crate::Channel).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options recognized when building a channel.
///
/// The only option today is the completion target. Leaving it unset disables
/// the completion barrier, and `done()` then reports
/// [`ConfigError::NoCompletionTarget`](crate::error::ConfigError::NoCompletionTarget).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelConfig {
  /// Number of `done()` calls after which the channel closes itself.
  pub completion_target: Option<usize>,
}

impl ChannelConfig {
  /// Creates a config with every option unset.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the completion target.
  ///
  /// A target of `0` closes the channel on the first `done()` call, since the
  /// check is `count >= target` after incrementing.
  pub fn completion_target(mut self, target: usize) -> Self {
    self.completion_target = Some(target);
    self
  }
}
