// examples/fan_out.rs
//
// Run with `RUST_LOG=handoff=trace cargo run --example fan_out` to see the
// channel's own events.

use futures_util::StreamExt;
use handoff::{Broadcast, Channel};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  println!("--- Channel: 3 producers, completion barrier, one stream consumer ---");
  {
    let num_producers = 3;
    let ch = Channel::<String>::with_completion_target(num_producers);

    for i in 0..num_producers {
      let ch = ch.clone();
      tokio::spawn(async move {
        for j in 0..2 {
          let msg = format!("P{}-M{}", i, j);
          println!("[Producer {}] Sending: {}", i, msg);
          if ch.send(msg).is_err() {
            println!("[Producer {}] Channel closed.", i);
            break;
          }
          tokio::time::sleep(Duration::from_millis(10 + i as u64 * 5)).await;
        }
        ch.done().expect("channel was built with a completion target");
      });
    }

    let mut stream = ch.stream();
    while let Some(msg) = stream.next().await {
      println!("[Consumer] Received: {}", msg);
    }
    println!("[Consumer] All producers reported done; state = {:?}", ch.state());
  }

  println!("\n--- Broadcast: one producer, two views, one removed halfway ---");
  {
    let bus = Arc::new(Broadcast::<u32>::new());
    let left = bus.receiver();
    let right = bus.receiver();

    let right_task = tokio::spawn(async move {
      let seen: Vec<u32> = right.collect().await;
      println!("[Right] Saw {:?}", seen);
    });

    for i in 1..=3 {
      println!("[Producer] Broadcasting {} to {} receivers", i, bus.send(i));
    }
    bus.remove_receiver(&left);
    for i in 4..=6 {
      println!("[Producer] Broadcasting {} to {} receivers", i, bus.send(i));
    }
    bus.close();

    right_task.await.expect("right view panicked");
    let mut left_seen = Vec::new();
    while let Some(v) = left.try_recv().value() {
      left_seen.push(v);
    }
    println!("[Left] Saw {:?} before it was removed", left_seen);
  }
}
