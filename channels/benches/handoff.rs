// benches/handoff.rs

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures_util::StreamExt;
use handoff::{Broadcast, Channel, TryRecv};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

const ITEM_VALUE: u64 = 42;

// --- Queued path: everything is sent before anything is received ---
fn queued_benches(c: &mut Criterion) {
  let mut group = c.benchmark_group("HandoffQueued");
  for &items in &[1_000usize, 100_000] {
    group.throughput(Throughput::Elements(items as u64));
    group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
      b.iter(|| {
        let ch = Channel::new();
        for _ in 0..items {
          ch.send(ITEM_VALUE).unwrap();
        }
        let mut received = 0;
        while let TryRecv::Value(_) = ch.try_recv() {
          received += 1;
        }
        assert_eq!(received, items);
      });
    });
  }
  group.finish();
}

// --- Waiter path: producers on tokio, one stream consumer, completion barrier ---
fn async_benches(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let mut group = c.benchmark_group("HandoffAsync");
  for &(producers, items) in &[(1usize, 100_000usize), (4, 100_000)] {
    group.throughput(Throughput::Elements(items as u64));
    let id = format!("Prod{}/Items{}", producers, items);
    group.bench_function(id, |b| {
      b.iter_custom(|iters| {
        let mut total = Duration::ZERO;
        for _ in 0..iters {
          total += rt.block_on(async {
            let ch = Channel::with_completion_target(producers);
            let start = Instant::now();
            let per_producer = items / producers;
            for _ in 0..producers {
              let ch = ch.clone();
              tokio::spawn(async move {
                for _ in 0..per_producer {
                  ch.send(ITEM_VALUE).unwrap();
                }
                ch.done().unwrap();
              });
            }
            let count = ch.stream().count().await;
            assert_eq!(count, per_producer * producers);
            start.elapsed()
          });
        }
        total
      });
    });
  }
  group.finish();
}

fn broadcast_benches(c: &mut Criterion) {
  let mut group = c.benchmark_group("BroadcastFanOut");
  for &receivers in &[1usize, 8, 64] {
    group.throughput(Throughput::Elements(receivers as u64 * 1_000));
    group.bench_with_input(
      BenchmarkId::from_parameter(receivers),
      &receivers,
      |b, &receivers| {
        b.iter(|| {
          let bus = Broadcast::new();
          let rxs: Vec<_> = (0..receivers).map(|_| bus.receiver()).collect();
          for _ in 0..1_000 {
            bus.send(ITEM_VALUE);
          }
          for rx in &rxs {
            assert_eq!(rx.len(), 1_000);
          }
        });
      },
    );
  }
  group.finish();
}

criterion_group!(benches, queued_benches, async_benches, broadcast_benches);
criterion_main!(benches);
