/*!
 * Task Queue Tests
 * FIFO ordering and loss-free hand-off across producer and consumer threads
 */

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use timeline_server::TaskQueue;

#[test]
fn test_fifo_single_thread() {
    let queue = TaskQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue(), None::<u32>);

    for i in 0..10 {
        queue.enqueue(i);
    }
    assert_eq!(queue.len(), 10);

    let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
    assert_eq!(drained, (0..10).collect::<Vec<_>>());
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_single_producer_consumers_see_increasing_order() {
    const ITEMS: u64 = 20_000;
    let queue = Arc::new(TaskQueue::new());
    let produced = Arc::new(AtomicBool::new(false));

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            let produced = produced.clone();
            thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    match queue.dequeue() {
                        Some(item) => seen.push(item),
                        None if produced.load(Ordering::Acquire) && queue.is_empty() => break,
                        None => thread::yield_now(),
                    }
                }
                seen
            })
        })
        .collect();

    for i in 0..ITEMS {
        queue.enqueue(i);
    }
    produced.store(true, Ordering::Release);

    let mut all = HashSet::new();
    for consumer in consumers {
        let seen = consumer.join().unwrap();
        // A single producer's items come out in the order they went in
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        for item in seen {
            assert!(all.insert(item), "item {item} dequeued twice");
        }
    }
    assert_eq!(all.len() as u64, ITEMS);
}

#[test]
fn test_multi_producer_no_loss() {
    let queue = Arc::new(TaskQueue::new());

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..2_500u64 {
                    queue.enqueue(p * 10_000 + i);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
    assert_eq!(drained.len(), 10_000);
    drained.sort_unstable();
    drained.dedup();
    assert_eq!(drained.len(), 10_000);
}
