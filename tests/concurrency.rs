use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;

use dagrun::{Task, TaskSet, execute};

type TestResult = Result<(), Box<dyn Error>>;

/// Build `count` independent tasks that each bump a live-running counter on
/// entry, record the high-water mark, and hold for a few milliseconds.
fn counting_set(count: usize, running: &Arc<AtomicUsize>, peak: &Arc<AtomicUsize>) -> TaskSet {
    let mut set = TaskSet::new();

    for i in 0..count {
        let running = Arc::clone(running);
        let peak = Arc::clone(peak);
        set.insert(
            format!("task{i}"),
            Task::new(move |_| async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(Value::Null)
            }),
        );
    }

    set
}

async fn peak_for(concurrency: Option<usize>) -> usize {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let results = execute(counting_set(6, &running, &peak), concurrency)
        .await
        .expect("run succeeds")
        .expect("six tasks ran");
    assert_eq!(results.len(), 6);

    peak.load(Ordering::SeqCst)
}

#[tokio::test]
async fn cap_is_never_exceeded() -> TestResult {
    for cap in [1, 2, 3] {
        let peak = peak_for(Some(cap)).await;
        assert!(peak <= cap, "peak {peak} exceeded cap {cap}");
        assert!(peak >= 1);
    }

    Ok(())
}

#[tokio::test]
async fn unbounded_run_overlaps_independent_tasks() -> TestResult {
    let peak = peak_for(None).await;
    assert!(peak >= 2, "independent tasks never overlapped (peak {peak})");

    Ok(())
}

#[tokio::test]
async fn zero_concurrency_means_unbounded() -> TestResult {
    let peak = peak_for(Some(0)).await;
    assert!(peak >= 2, "independent tasks never overlapped (peak {peak})");

    Ok(())
}

#[tokio::test]
async fn cap_holds_with_dependencies_in_the_graph() -> TestResult {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    // Two roots fan out into two dependents each.
    let mut set = TaskSet::new();
    for (name, after) in [
        ("r1", vec![]),
        ("r2", vec![]),
        ("d1", vec!["r1"]),
        ("d2", vec!["r1"]),
        ("d3", vec!["r2"]),
        ("d4", vec!["r2"]),
    ] {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        set.insert(
            name,
            Task::after(after, move |_| async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(Value::Null)
            }),
        );
    }

    let results = execute(set, Some(2)).await?.expect("six tasks ran");
    assert_eq!(results.len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);

    Ok(())
}
