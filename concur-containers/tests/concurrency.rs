//! Concurrency stress scenarios for both containers.
//!
//! These exercise properties that can only be checked under real thread
//! interleaving: that every pushed element is eventually popped exactly
//! once, that end contention doesn't lose or duplicate elements, that an
//! interior unlink correctly removes exactly the targeted node, that
//! iteration never yields the same live element twice, and that the
//! bounded set's capacity and duplicate-rejection invariants hold when
//! many threads insert concurrently.

use concur_containers::{BoundedOrderedSet, BoundedSetConfig, ConcurrentDeque};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn producer_consumer_balance() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 2_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let deque = Arc::new(ConcurrentDeque::<usize>::new());
    let produced = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let deque = deque.clone();
            let produced = produced.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    deque.add_last(p * PER_PRODUCER + i);
                    produced.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let consumed = Arc::new(std::sync::Mutex::new(Vec::with_capacity(TOTAL)));
    let consumers: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let deque = deque.clone();
            let consumed = consumed.clone();
            thread::spawn(move || loop {
                match deque.poll_first() {
                    Some(item) => consumed.lock().unwrap().push(item),
                    None => {
                        if consumed.lock().unwrap().len() >= TOTAL {
                            break;
                        }
                        thread::yield_now();
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

    let consumed = consumed.lock().unwrap();
    assert_eq!(consumed.len(), TOTAL);
    let unique: HashSet<_> = consumed.iter().copied().collect();
    assert_eq!(unique.len(), TOTAL, "every element must be consumed exactly once");
    assert!(deque.is_empty());
}

#[test]
fn contended_ends_preserve_total_count() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1_000;

    let deque = Arc::new(ConcurrentDeque::<i32>::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let deque = deque.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    if (t + i) % 2 == 0 {
                        deque.add_first(1);
                    } else {
                        deque.add_last(1);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(deque.size() as usize, THREADS * PER_THREAD);
    assert_eq!(deque.to_vec().len(), THREADS * PER_THREAD);
}

#[test]
fn interior_unlink_removes_exact_node() {
    let deque = Arc::new(ConcurrentDeque::<i32>::new());
    deque.add_last(1);
    let middle = deque.add_last_x(2);
    deque.add_last(3);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let deque = deque.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    deque.add_last(100 + i);
                    deque.poll_first_x();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    deque.unlink(&middle);
    assert!(!deque.to_vec().contains(&2));
}

#[test]
fn iteration_never_duplicates_a_live_element() {
    let deque = Arc::new(ConcurrentDeque::<i32>::new());
    for i in 0..500 {
        deque.add_last(i);
    }

    let mutator = {
        let deque = deque.clone();
        thread::spawn(move || {
            for i in 500..1000 {
                deque.add_last(i);
                deque.poll_first();
            }
        })
    };

    let collected = deque.to_vec();
    mutator.join().unwrap();

    let unique: HashSet<_> = collected.iter().copied().collect();
    assert_eq!(unique.len(), collected.len(), "iterator yielded a duplicate");
}

#[test]
fn bounded_set_never_exceeds_capacity_under_contention() {
    const CAPACITY: usize = 50;
    let set = Arc::new(BoundedOrderedSet::<i64>::new(BoundedSetConfig::new(CAPACITY)));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let set = set.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    set.add(t * 1000 + i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert!(set.len() <= CAPACITY);
    let elements = set.to_vec();
    assert!(elements.windows(2).all(|w| w[0] < w[1]), "elements must stay ascending and unique");
}

#[test]
fn bounded_set_rejects_duplicates_under_contention() {
    let set = Arc::new(BoundedOrderedSet::<i32>::new(BoundedSetConfig::new(1_000)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let set = set.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    set.add(42);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(set.len(), 1);
    assert!(set.contains(&42));
}
