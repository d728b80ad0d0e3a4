use std::{collections::BTreeSet, sync::Mutex};

use super::*;
use crate::foundation::index::ViewIndex;

fn grid(n: i32) -> Vec<ViewIndex> {
    (0..n).map(ViewIndex::new_1d).collect()
}

#[test]
fn defaults() {
    let opts = DispatchOpts::default();
    assert!(opts.parallel);
    assert_eq!(opts.threads, 10);
    assert!(!DispatchOpts::sequential().parallel);
    assert!(
        DispatchOpts {
            threads: 0,
            ..DispatchOpts::default()
        }
        .validate()
        .is_err()
    );
}

#[test]
fn parallel_progress_reaches_total_without_gaps() {
    let items = grid(64);
    let progress = Progress::new(items.len());
    let seen = Mutex::new(Vec::new());
    let opts = DispatchOpts {
        parallel: true,
        threads: 4,
    };
    let stats = dispatch(&items, &opts, &progress, |idx| {
        seen.lock().unwrap().push(idx.x);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        stats,
        DispatchStats {
            total: 64,
            succeeded: 64
        }
    );
    assert_eq!(progress.done(), 64);
    let seen: BTreeSet<i32> = seen.into_inner().unwrap().into_iter().collect();
    assert_eq!(seen, (0..64).collect());
}

#[test]
fn tick_values_are_unique_under_contention() {
    let progress = Progress::new(400);
    let ticks = Mutex::new(Vec::new());
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    let t = progress.tick();
                    ticks.lock().unwrap().push(t);
                }
            });
        }
    });
    let mut ticks = ticks.into_inner().unwrap();
    ticks.sort_unstable();
    assert_eq!(ticks, (1..=400).collect::<Vec<_>>());
    assert_eq!(progress.done(), 400);
}

#[test]
fn progress_never_runs_ahead_of_jobs() {
    let items = grid(200);
    let progress = Progress::new(items.len());
    let ticks = Mutex::new(Vec::new());
    let opts = DispatchOpts {
        parallel: true,
        threads: 8,
    };
    // Ticks observed from inside the jobs never exceed what has been dispatched.
    dispatch(&items, &opts, &progress, |_| {
        ticks.lock().unwrap().push(progress.done());
        Ok(())
    })
    .unwrap();
    let ticks = ticks.into_inner().unwrap();
    assert!(ticks.iter().all(|&t| t < 200));
    assert_eq!(progress.done(), progress.total());
}

#[test]
fn sequential_runs_in_order() {
    let items = grid(5);
    let progress = Progress::new(items.len());
    let order = Mutex::new(Vec::new());
    dispatch(&items, &DispatchOpts::sequential(), &progress, |idx| {
        order.lock().unwrap().push((idx.x, progress.done()));
        Ok(())
    })
    .unwrap();
    assert_eq!(
        order.into_inner().unwrap(),
        vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]
    );
}

#[test]
fn failures_are_collected_after_the_whole_batch() {
    let items = grid(10);
    let progress = Progress::new(items.len());
    let ran = AtomicUsize::new(0);
    let err = dispatch(&items, &DispatchOpts::default(), &progress, |idx| {
        ran.fetch_add(1, Ordering::SeqCst);
        if idx.x % 4 == 3 {
            Err(ViewgridError::parameters(format!("bad view {idx}")))
        } else {
            Ok(())
        }
    })
    .unwrap_err();

    assert_eq!(ran.load(Ordering::SeqCst), 10);
    assert_eq!(progress.done(), 10);
    match err {
        ViewgridError::BatchFailed {
            failed,
            total,
            first,
        } => {
            assert_eq!(failed, 2);
            assert_eq!(total, 10);
            assert!(first.contains("bad view 3"), "{first}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn empty_batch_succeeds() {
    let progress = Progress::new(0);
    let stats = dispatch(&[] as &[ViewIndex], &DispatchOpts::default(), &progress, |_| {
        Ok(())
    })
    .unwrap();
    assert_eq!(stats, DispatchStats::default());
}
