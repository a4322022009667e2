//! Concurrent logging and registry mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use kiln_diagnostics::listeners::MemoryListener;
use kiln_diagnostics::{Aggregator, Severity};

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

#[test]
fn counters_have_no_lost_updates() {
    let agg = Arc::new(Aggregator::new());
    let mem = Arc::new(MemoryListener::new());
    agg.register_listener(mem.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    agg.warning("w");
                    agg.error("e");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(agg.warning_count(), THREADS * PER_THREAD);
    assert_eq!(agg.error_count(), THREADS * PER_THREAD);
    assert_eq!(mem.len(), 2 * THREADS * PER_THREAD);
}

#[test]
fn exactly_one_sentinel_under_contention() {
    const LIMIT: usize = 100;
    let mem = Arc::new(MemoryListener::new());
    let agg = Arc::new(
        Aggregator::builder()
            .throttle_limit(LIMIT)
            .listener(mem.clone())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    agg.warning("noisy");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let sentinel = kiln_diagnostics::throttle_sentinel(LIMIT);
    let got = mem.diagnostics();
    assert_eq!(agg.warning_count(), THREADS * PER_THREAD);
    assert_eq!(got.iter().filter(|d| **d == sentinel).count(), 1);
    assert_eq!(got.len(), LIMIT + 1);
}

#[test]
fn per_thread_order_is_preserved() {
    let agg = Arc::new(Aggregator::new());
    let mem = Arc::new(MemoryListener::new());
    agg.register_listener(mem.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    agg.info(format!("{t}:{i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut next = vec![0usize; THREADS];
    for diag in mem.diagnostics() {
        let (t, i) = diag.message.split_once(':').unwrap();
        let (t, i): (usize, usize) = (t.parse().unwrap(), i.parse().unwrap());
        assert_eq!(i, next[t]);
        next[t] += 1;
    }
    assert!(next.iter().all(|n| *n == PER_THREAD));
}

#[test]
fn dispatch_survives_concurrent_registration() {
    let agg = Arc::new(Aggregator::new());
    let stable = Arc::new(MemoryListener::named("stable"));
    agg.register_listener(stable.clone());
    let done = Arc::new(AtomicBool::new(false));

    let churner = {
        let agg = Arc::clone(&agg);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let handle = agg.register_listener(Arc::new(MemoryListener::named("churn")));
                agg.unregister_listener(handle);
            }
        })
    };

    let loggers: Vec<_> = (0..4)
        .map(|_| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    agg.log_at(Severity::Warning, "racing");
                }
            })
        })
        .collect();
    for h in loggers {
        h.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    churner.join().unwrap();

    assert_eq!(stable.len(), 4 * PER_THREAD);
    assert_eq!(agg.warning_count(), 4 * PER_THREAD);
    assert_eq!(agg.listener_failure_count(), 0);
    assert_eq!(agg.listener_count(), 1);
}
