use chat_queue::{Limits, MessageQueue, MessageRecord, DEFAULT_CAPACITY};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn full_queue(payload_len: usize) -> MessageQueue {
    let mut queue = MessageQueue::new(1);
    for i in 0..DEFAULT_CAPACITY {
        queue.push(MessageRecord::new(i as u32, 1, vec![b'x'; payload_len]));
    }
    queue
}

fn bench_push_pop(c: &mut Criterion) {
    c.bench_function("push_pop_full_cycle", |b| {
        b.iter(|| {
            let mut queue = MessageQueue::new(1);
            for i in 0..DEFAULT_CAPACITY {
                queue.push(MessageRecord::text(i as u32, 1, "hello"));
            }
            while let Some(record) = queue.pop() {
                black_box(record);
            }
        })
    });
}

fn bench_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");
    for payload_len in [16usize, 4096] {
        let queue = full_queue(payload_len);
        let bytes = queue.to_bytes();
        let limits = Limits::default();

        group.bench_function(format!("write_{payload_len}"), |b| {
            b.iter(|| black_box(queue.to_bytes()))
        });
        group.bench_function(format!("read_{payload_len}"), |b| {
            b.iter(|| black_box(MessageQueue::from_bytes(&bytes, &limits).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_persistence);
criterion_main!(benches);
