// tests/broadcast_async.rs

mod common;
use common::*;

use futures_util::StreamExt;
use handoff::{Broadcast, Receiver, TryRecv};
use std::sync::Arc;
use tokio::time::timeout;

async fn ordered_subscriber(mut rx: Receiver<u32>) -> Vec<u32> {
  let mut seen = Vec::new();
  while let Some(v) = rx.next().await {
    if let Some(last) = seen.last() {
      assert!(v > *last, "broadcast values arrived out of order");
    }
    seen.push(v);
  }
  seen
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_subscribers_see_every_value_in_order() {
  let bus = Arc::new(Broadcast::new());
  // Registration happens here, before the tasks run, so no value is missed.
  let s1 = tokio::spawn(ordered_subscriber(bus.receiver()));
  let s2 = tokio::spawn(ordered_subscriber(bus.receiver()));

  for i in 1..=ITEMS_LOW as u32 {
    assert_eq!(bus.send(i), 2);
  }
  bus.close();

  let expected: Vec<u32> = (1..=ITEMS_LOW as u32).collect();
  assert_eq!(timeout(LONG_TIMEOUT, s1).await.unwrap().unwrap(), expected);
  assert_eq!(timeout(LONG_TIMEOUT, s2).await.unwrap().unwrap(), expected);
}

#[tokio::test]
async fn removed_subscriber_stops_receiving() {
  let bus = Broadcast::new();
  let a = bus.receiver();
  let b = bus.receiver();

  bus.send(1u32);
  assert!(bus.remove_receiver(&a));
  bus.send(2u32);
  bus.close();

  // `a` was detached before close, so its own channel stays open.
  assert_eq!(a.try_recv(), TryRecv::Value(1));
  assert_eq!(a.try_recv(), TryRecv::NotAvailable);
  assert!(!a.is_closed());

  let got: Vec<u32> = timeout(SHORT_TIMEOUT, b.collect()).await.unwrap();
  assert_eq!(got, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sending_from_another_task_reaches_waiting_receivers() {
  let bus = Arc::new(Broadcast::<String>::new());
  let receivers: Vec<_> = (0..3).map(|_| bus.receiver()).collect();
  let pending: Vec<_> = receivers.iter().map(|rx| rx.recv()).collect();

  let producer = {
    let bus = bus.clone();
    tokio::spawn(async move { bus.send("news".to_string()) })
  };
  assert_eq!(producer.await.unwrap(), 3);

  for fut in pending {
    assert_eq!(timeout(SHORT_TIMEOUT, fut).await.unwrap().unwrap(), "news");
  }
}
