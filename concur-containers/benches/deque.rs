use concur_containers::ConcurrentDeque;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::thread;

fn single_threaded_push_pop(c: &mut Criterion) {
    c.bench_function("deque_single_thread_push_pop", |b| {
        let deque = ConcurrentDeque::new();
        b.iter(|| {
            deque.add_last(black_box(1));
            black_box(deque.poll_first());
        });
    });
}

fn contended_ends(c: &mut Criterion) {
    c.bench_function("deque_contended_both_ends", |b| {
        b.iter(|| {
            let deque = Arc::new(ConcurrentDeque::<i32>::new());
            let producers: Vec<_> = (0..4)
                .map(|_| {
                    let deque = deque.clone();
                    thread::spawn(move || {
                        for i in 0..256 {
                            deque.add_last(i);
                        }
                    })
                })
                .collect();
            let consumers: Vec<_> = (0..4)
                .map(|_| {
                    let deque = deque.clone();
                    thread::spawn(move || {
                        let mut drained = 0;
                        while drained < 256 {
                            if deque.poll_first().is_some() {
                                drained += 1;
                            }
                        }
                    })
                })
                .collect();
            for p in producers {
                p.join().unwrap();
            }
            for c in consumers {
                c.join().unwrap();
            }
        });
    });
}

criterion_group!(benches, single_threaded_push_pop, contended_ends);
criterion_main!(benches);
