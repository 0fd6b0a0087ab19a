//! Pool and channel working together the way the orchestrator uses them:
//! indexed results pushed from workers, drained after a barrier.

use std::sync::Arc;
use tally_runtime::{BoundedChannel, RuntimeError, WorkerPool};

#[test]
fn indexed_results_survive_out_of_order_completion() {
    let pool = WorkerPool::new(4).unwrap();
    let n = 12;
    let channel = Arc::new(BoundedChannel::new(n));

    let handles: Vec<_> = (0..n)
        .map(|index| {
            let channel = Arc::clone(&channel);
            pool.submit(move || {
                // later partitions finish first
                std::thread::sleep(std::time::Duration::from_millis((n - index) as u64));
                channel.put((index, index * 10));
            })
            .unwrap()
        })
        .collect();

    for handle in handles {
        handle.wait().unwrap();
    }
    assert_eq!(channel.len(), n);

    let mut drained = channel.take(n);
    drained.sort_by_key(|(index, _)| *index);
    let values: Vec<usize> = drained.into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, (0..n).map(|i| i * 10).collect::<Vec<_>>());
}

#[test]
fn producers_block_on_small_channel_without_loss() {
    let pool = WorkerPool::new(3).unwrap();
    let channel = Arc::new(BoundedChannel::new(2));

    let handles: Vec<_> = (0..30)
        .map(|i| {
            let channel = Arc::clone(&channel);
            pool.submit(move || channel.put(i)).unwrap()
        })
        .collect();

    let mut received: Vec<i32> = (0..30).map(|_| channel.get()).collect();
    for handle in handles {
        handle.wait().unwrap();
    }
    received.sort();
    assert_eq!(received, (0..30).collect::<Vec<_>>());
}

#[test]
fn failed_task_does_not_affect_siblings() {
    let pool = WorkerPool::new(2).unwrap();
    let handles: Vec<_> = (0..6)
        .map(|i| {
            pool.submit(move || {
                if i == 3 {
                    panic!("bad partition {}", i);
                }
                i
            })
            .unwrap()
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.wait()).collect();
    for (i, outcome) in outcomes.iter().enumerate() {
        if i == 3 {
            assert!(matches!(outcome, Err(RuntimeError::TaskPanicked { .. })));
        } else {
            assert_eq!(*outcome.as_ref().unwrap(), i);
        }
    }
}
