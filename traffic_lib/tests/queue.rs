extern crate traffic_lib;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use proptest::prelude::*;

use traffic_lib::BlockingQueue;

proptest! {
    #[test]
    fn single_consumer_sees_sends_in_order(values in prop::collection::vec(any::<i64>(), 0..256)) {
        let queue = BlockingQueue::new();
        for v in &values {
            queue.send(*v);
        }
        let received: Vec<i64> = (0..values.len()).map(|_| queue.receive()).collect();
        prop_assert_eq!(received, values);
        prop_assert!(queue.is_empty());
    }
}

#[test]
fn test_order_is_kept_across_threads() {
    let queue = Arc::new(BlockingQueue::new());
    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            for i in 0..10_000u32 {
                queue.send(i);
            }
        })
    };
    for i in 0..10_000u32 {
        assert_eq!(queue.receive(), i);
    }
    producer.join().unwrap();
}

#[test]
fn test_many_producers_many_consumers_no_loss_no_duplicates() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: usize = 2_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(BlockingQueue::new());
    let received = Arc::new(Mutex::new(Vec::with_capacity(TOTAL)));

    let mut handles = Vec::new();
    for c in 0..CONSUMERS {
        let queue = queue.clone();
        let received = received.clone();
        // spread the receives so that together they take exactly every value
        let quota = TOTAL / CONSUMERS + usize::from(c < TOTAL % CONSUMERS);
        handles.push(thread::spawn(move || {
            let mut local = Vec::with_capacity(quota);
            for _ in 0..quota {
                local.push(queue.receive());
            }
            received.lock().unwrap().extend(local);
        }));
    }
    for p in 0..PRODUCERS {
        let queue = queue.clone();
        handles.push(thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                queue.send(p * PER_PRODUCER + i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let received = received.lock().unwrap();
    assert_eq!(received.len(), TOTAL);
    let unique: HashSet<_> = received.iter().copied().collect();
    assert_eq!(unique.len(), TOTAL);
    assert!(unique.iter().all(|v| *v < TOTAL));
    assert!(queue.is_empty());
}

#[test]
fn test_each_consumer_sees_a_producers_values_in_order() {
    let queue = Arc::new(BlockingQueue::new());
    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || (0..500).map(|_| queue.receive()).collect::<Vec<u32>>())
        })
        .collect();
    for i in 0..1_000u32 {
        queue.send(i);
    }
    for consumer in consumers {
        let values = consumer.join().unwrap();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", values);
    }
}
