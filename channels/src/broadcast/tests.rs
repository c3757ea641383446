use super::*;
use crate::channel::{Channel, TryRecv};
use crate::error::RecvError;

use futures_executor::block_on;
use futures_util::StreamExt;

#[test]
fn every_member_gets_its_own_copy() {
  let bus = Broadcast::new();
  let a = bus.receiver();
  let b = bus.receiver();

  assert_eq!(bus.send(1), 2);
  assert_eq!(bus.send(2), 2);

  assert_eq!(a.try_recv(), TryRecv::Value(1));
  assert_eq!(a.try_recv(), TryRecv::Value(2));
  assert_eq!(b.try_recv(), TryRecv::Value(1));
  assert_eq!(b.try_recv(), TryRecv::Value(2));
}

#[test]
fn removed_member_keeps_delivered_values() {
  let bus = Broadcast::new();
  let a = bus.receiver();
  let b = bus.receiver();

  bus.send("early");
  assert!(bus.remove_receiver(&a));
  assert_eq!(bus.receiver_count(), 1);
  assert_eq!(bus.send("late"), 1);

  assert_eq!(a.try_recv(), TryRecv::Value("early"));
  assert_eq!(a.try_recv(), TryRecv::NotAvailable);
  assert_eq!(b.try_recv(), TryRecv::Value("early"));
  assert_eq!(b.try_recv(), TryRecv::Value("late"));
}

#[test]
fn remove_is_idempotent_and_scoped_to_its_registry() {
  let bus = Broadcast::<u8>::new();
  let other = Broadcast::<u8>::new();
  let a = bus.receiver();
  let foreign = other.receiver();
  let detached = Channel::<u8>::new().receiver();

  assert!(!bus.remove_receiver(&foreign));
  assert!(!bus.remove_receiver(&detached));
  assert!(bus.remove_receiver(&a));
  assert!(!bus.remove_receiver(&a));
  assert!(bus.is_empty());
  assert_eq!(other.receiver_count(), 1);
}

#[test]
fn closed_member_does_not_block_others() {
  let bus = Broadcast::new();
  let a = bus.receiver();
  let b = bus.receiver();
  a.core().close();

  assert_eq!(bus.send(5), 1);
  assert_eq!(a.try_recv(), TryRecv::Closed);
  assert_eq!(b.try_recv(), TryRecv::Value(5));
}

#[test]
fn close_reaches_waiting_members() {
  let bus = Broadcast::<u32>::new();
  let a = bus.receiver();
  let b = bus.receiver();
  let pending = a.recv();
  bus.send(1);
  bus.close();

  assert_eq!(block_on(pending), Ok(1));
  assert_eq!(block_on(a.recv()), Err(RecvError::Closed));
  let drained: Vec<u32> = block_on(b.collect());
  assert_eq!(drained, vec![1]);
}

#[test]
fn late_receiver_only_sees_later_values() {
  let bus = Broadcast::new();
  let a = bus.receiver();
  bus.send(1);
  let b = bus.receiver();
  bus.send(2);

  assert_eq!(a.len(), 2);
  assert_eq!(b.try_recv(), TryRecv::Value(2));
  assert_eq!(b.try_recv(), TryRecv::NotAvailable);
}
