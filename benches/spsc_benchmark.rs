use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lite_channel::spsc;
use lite_channel::strategy::{AtomicWait, BusyLoop, WaitOnFull, WaitStrategy, Yield};
use std::hint::black_box;
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc as tokio_mpsc;

const CAPACITY: usize = 128;

/// Benchmark: Bounded channel creation comparison (std sync_channel vs tokio mpsc vs spsc)
/// 基准测试：有界通道创建对比（std sync_channel vs tokio mpsc vs spsc）
fn bench_bounded_creation_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_creation_comparison");

    group.bench_function("std_sync_channel", |b| {
        b.iter(|| black_box(std_mpsc::sync_channel::<u32>(CAPACITY)));
    });

    group.bench_function("tokio_mpsc_bounded", |b| {
        b.iter(|| black_box(tokio_mpsc::channel::<u32>(CAPACITY)));
    });

    group.bench_function("lite_spsc", |b| {
        b.iter(|| black_box(spsc::channel::<u32>(CAPACITY)));
    });

    group.finish();
}

/// Benchmark: One send followed by one receive on the same thread
/// 基准测试：同一线程内一次发送接一次接收
fn bench_bounded_send_recv_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_send_recv_comparison");

    group.bench_function("std_sync_channel", |b| {
        let (tx, rx) = std_mpsc::sync_channel::<u32>(CAPACITY);
        b.iter(|| {
            tx.try_send(black_box(42)).unwrap();
            black_box(rx.try_recv().unwrap());
        });
    });

    group.bench_function("tokio_mpsc_bounded", |b| {
        let (tx, mut rx) = tokio_mpsc::channel::<u32>(CAPACITY);
        b.iter(|| {
            tx.try_send(black_box(42)).unwrap();
            black_box(rx.try_recv().unwrap());
        });
    });

    group.bench_function("lite_spsc", |b| {
        let (tx, rx) = spsc::channel::<u32>(CAPACITY);
        b.iter(|| {
            tx.try_send(black_box(42)).unwrap();
            black_box(rx.try_recv().unwrap());
        });
    });

    group.finish();
}

/// Benchmark: Fill then drain a batch on the same thread
/// 基准测试：同一线程内批量填充后全部取出
fn bench_bounded_batch_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_batch_comparison");

    for size in [10usize, 100, 1000] {
        // 容量稍大于消息数量
        let capacity = size + 10;

        group.bench_with_input(BenchmarkId::new("std_sync_channel", size), &size, |b, &size| {
            let (tx, rx) = std_mpsc::sync_channel::<u32>(capacity);
            b.iter(|| {
                for i in 0..size {
                    tx.try_send(i as u32).unwrap();
                }
                for _ in 0..size {
                    black_box(rx.try_recv().unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("tokio_mpsc_bounded", size), &size, |b, &size| {
            let (tx, mut rx) = tokio_mpsc::channel::<u32>(capacity);
            b.iter(|| {
                for i in 0..size {
                    tx.try_send(i as u32).unwrap();
                }
                for _ in 0..size {
                    black_box(rx.try_recv().unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("lite_spsc", size), &size, |b, &size| {
            let (tx, rx) = spsc::channel::<u32>(capacity);
            b.iter(|| {
                for i in 0..size {
                    tx.try_send(i as u32).unwrap();
                }
                for _ in 0..size {
                    black_box(rx.try_recv().unwrap());
                }
            });
        });
    }

    group.finish();
}

fn lite_cross_thread<W: WaitStrategy>(messages: u64) -> Duration {
    let (tx, rx) = spsc::channel_with::<u64, WaitOnFull, W>(CAPACITY);

    let start = Instant::now();
    let producer = thread::spawn(move || {
        for i in 0..messages {
            tx.send(i).unwrap();
        }
    });

    let mut sum = 0u64;
    while let Ok(value) = rx.recv() {
        sum = sum.wrapping_add(value);
    }
    producer.join().unwrap();
    black_box(sum);

    start.elapsed()
}

/// Benchmark: Producer thread to consumer thread throughput, per wait strategy
/// 基准测试：生产者线程到消费者线程的吞吐量（按等待策略）
fn bench_bounded_throughput_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_throughput_comparison");
    group.sample_size(20);

    const MESSAGES: u64 = 100_000;
    group.throughput(criterion::Throughput::Elements(MESSAGES));

    group.bench_function("std_sync_channel", |b| {
        b.iter_custom(|iters| {
            let mut total_duration = Duration::from_secs(0);

            for _ in 0..iters {
                let (tx, rx) = std_mpsc::sync_channel::<u64>(CAPACITY);

                let start = Instant::now();
                let producer = thread::spawn(move || {
                    for i in 0..MESSAGES {
                        tx.send(i).unwrap();
                    }
                });

                let mut sum = 0u64;
                while let Ok(value) = rx.recv() {
                    sum = sum.wrapping_add(value);
                }
                producer.join().unwrap();
                black_box(sum);

                total_duration += start.elapsed();
            }

            total_duration
        });
    });

    group.bench_function("tokio_mpsc_bounded", |b| {
        b.iter_custom(|iters| {
            let mut total_duration = Duration::from_secs(0);

            for _ in 0..iters {
                let (tx, mut rx) = tokio_mpsc::channel::<u64>(CAPACITY);

                let start = Instant::now();
                let producer = thread::spawn(move || {
                    for i in 0..MESSAGES {
                        tx.blocking_send(i).unwrap();
                    }
                });

                let mut sum = 0u64;
                while let Some(value) = rx.blocking_recv() {
                    sum = sum.wrapping_add(value);
                }
                producer.join().unwrap();
                black_box(sum);

                total_duration += start.elapsed();
            }

            total_duration
        });
    });

    group.bench_function("lite_spsc_busy_loop", |b| {
        b.iter_custom(|iters| (0..iters).map(|_| lite_cross_thread::<BusyLoop>(MESSAGES)).sum());
    });

    group.bench_function("lite_spsc_yield", |b| {
        b.iter_custom(|iters| (0..iters).map(|_| lite_cross_thread::<Yield>(MESSAGES)).sum());
    });

    group.bench_function("lite_spsc_atomic_wait", |b| {
        b.iter_custom(|iters| {
            (0..iters)
                .map(|_| lite_cross_thread::<AtomicWait>(MESSAGES))
                .sum()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bounded_creation_comparison,
    bench_bounded_send_recv_comparison,
    bench_bounded_batch_comparison,
    bench_bounded_throughput_comparison,
);

criterion_main!(benches);
