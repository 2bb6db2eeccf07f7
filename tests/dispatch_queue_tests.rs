//! Dispatch queue behavior under load
//!
//! These tests actively probe the queue's contract: the concurrency ceiling
//! holds under arbitrary submission interleavings, dispatch start order is
//! FIFO, every task runs exactly once, queue-driven dispatches are spaced by
//! the configured delay, and one task's failure leaves the rest untouched.
//! Timing-sensitive tests run on paused virtual time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use partwatch::dispatch::{DispatchError, DispatchQueue, QueueConfig};
use tokio::time::{sleep, Instant};

fn queue(max_concurrency: usize, delay_ms: u64) -> DispatchQueue {
    DispatchQueue::new(QueueConfig {
        max_concurrency,
        min_dispatch_delay: Duration::from_millis(delay_ms),
    })
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_the_ceiling() {
    let queue = queue(2, 500);
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            queue.submit(async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(50)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2, "peak was {}", peak.load(Ordering::SeqCst));
    assert!(queue.is_idle());
}

#[tokio::test(start_paused = true)]
async fn saturated_submissions_start_in_fifo_order() {
    let queue = queue(2, 100);
    let order = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let order = Arc::clone(&order);
            queue.submit(async move {
                order.lock().unwrap().push(i);
                sleep(Duration::from_millis(30)).await;
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn every_task_executes_exactly_once() {
    let queue = queue(2, 10);
    let counters: Arc<Vec<AtomicUsize>> =
        Arc::new((0..10).map(|_| AtomicUsize::new(0)).collect());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let counters = Arc::clone(&counters);
            queue.submit(async move {
                counters[i].fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    for (i, counter) in counters.iter().enumerate() {
        assert_eq!(counter.load(Ordering::SeqCst), 1, "task {i} ran a wrong number of times");
    }
}

#[tokio::test(start_paused = true)]
async fn queue_driven_dispatches_are_spaced_by_the_delay() {
    let queue = queue(1, 500);
    let starts = Arc::new(Mutex::new(Vec::new()));
    let submitted_at = Instant::now();

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let starts = Arc::clone(&starts);
            queue.submit(async move {
                starts.lock().unwrap().push(Instant::now());
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    let starts = starts.lock().unwrap();
    assert_eq!(starts.len(), 3);

    // First task went into spare capacity: no added delay.
    assert!(starts[0] - submitted_at < Duration::from_millis(100));

    // Every queue-driven successor waited out the spacing delay.
    assert!(starts[1] - starts[0] >= Duration::from_millis(500));
    assert!(starts[2] - starts[1] >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn submissions_into_spare_capacity_start_immediately() {
    let queue = queue(2, 500);
    let starts = Arc::new(Mutex::new(Vec::new()));
    let submitted_at = Instant::now();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let starts = Arc::clone(&starts);
            queue.submit(async move {
                starts.lock().unwrap().push(Instant::now());
                sleep(Duration::from_millis(1000)).await;
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    let starts = starts.lock().unwrap();
    assert!(starts[0] - submitted_at < Duration::from_millis(100));
    assert!(starts[1] - submitted_at < Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn one_failure_does_not_disturb_the_rest() {
    let queue = queue(2, 20);

    let handles: Vec<_> = (0usize..5)
        .map(|i| {
            queue.submit(async move {
                if i == 2 {
                    Err(format!("task {i} failed"))
                } else {
                    Ok(i)
                }
            })
        })
        .collect();

    let results = join_all(handles).await;

    for (i, result) in results.into_iter().enumerate() {
        let outcome = result.unwrap();
        if i == 2 {
            assert_eq!(outcome.unwrap_err(), "task 2 failed");
        } else {
            assert_eq!(outcome.unwrap(), i);
        }
    }
    assert!(queue.is_idle());
}

#[tokio::test(start_paused = true)]
async fn panicking_tasks_release_their_slots() {
    let queue = queue(2, 50);

    // Two panicking tasks occupy the whole ceiling; if their slots leaked,
    // nothing submitted afterwards would ever dispatch.
    let bad1 = queue.submit(async {
        panic!("boom");
    });
    let bad2 = queue.submit(async {
        panic!("boom");
    });
    let good = queue.submit(async { "still dispatched" });

    assert!(matches!(bad1.await, Err(DispatchError::Abandoned)));
    assert!(matches!(bad2.await, Err(DispatchError::Abandoned)));
    assert_eq!(good.await.unwrap(), "still dispatched");
    assert!(queue.is_idle());
}

#[tokio::test(start_paused = true)]
async fn queue_reports_idle_only_after_all_tasks_settle() {
    let queue = queue(2, 500);
    assert!(queue.is_idle());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            queue.submit(async move {
                sleep(Duration::from_millis(100)).await;
            })
        })
        .collect();

    assert!(!queue.is_idle(), "admitted work must clear the idle flag");

    for result in join_all(handles).await {
        result.unwrap();
    }
    assert!(queue.is_idle());
}

#[tokio::test(start_paused = true)]
async fn submissions_racing_in_flight_completions_hold_the_ceiling() {
    let queue = queue(2, 50);
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    // Stagger submissions so some arrive while earlier dispatches are mid
    // flight and others while the queue is draining.
    let mut handles = Vec::new();
    for wave in 0u64..4 {
        for _ in 0..4 {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            handles.push(queue.submit(async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(35)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        sleep(Duration::from_millis(40 * wave)).await;
    }

    for result in join_all(handles).await {
        result.unwrap();
    }
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(queue.is_idle());
}
