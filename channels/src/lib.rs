#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Unbounded hand-off channels for Rust.
//!
//! Handoff provides a typed channel that lets producers hand values to
//! consumers without both sides being active at once, and a broadcast
//! registry that fans one producer's values out to many independent
//! receivers.
//!
//! ```
//! use handoff::{Channel, TryRecv};
//!
//! # futures_executor::block_on(async {
//! let ch = Channel::new();
//! let first = ch.recv();
//! ch.send(2).unwrap();
//! ch.send(3).unwrap();
//! assert_eq!(first.await, Ok(2));
//! assert_eq!(ch.try_recv(), TryRecv::Value(3));
//! # });
//! ```

pub mod broadcast;
pub mod channel;
pub mod config;
pub mod error;

pub use broadcast::Broadcast;
pub use channel::{Channel, ChannelState, Receiver, RecvFuture, RecvStream, TryRecv};
pub use config::ChannelConfig;
pub use error::{ConfigError, RecvError, SendError};

// Helper function to check if a type is Send + Sync.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn handles_are_send_sync() {
  assert_send_sync::<Channel<u8>>();
  assert_send_sync::<Broadcast<u8>>();
  assert_send_sync::<Receiver<u8>>();
  assert_send_sync::<RecvFuture<u8>>();
  assert_send_sync::<RecvStream<u8>>();
}
