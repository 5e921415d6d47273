use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::sleep;

use dagrun::{Task, TaskSet, execute};

type TestResult = Result<(), Box<dyn Error>>;

type CallOrder = Arc<Mutex<Vec<&'static str>>>;

fn position(order: &[&'static str], name: &str) -> usize {
    order
        .iter()
        .position(|n| *n == name)
        .unwrap_or_else(|| panic!("task '{name}' never ran"))
}

/// The six-task graph: `task2` is the sole root, `task1`/`task3`/`task5`/
/// `task6` each depend only on `task2`, and `task4` depends on `task1` and
/// `task2`. Latencies are shaped so that `task1` (and therefore `task4`)
/// finishes after the other dependents.
fn six_task_set(order: &CallOrder) -> TaskSet {
    let mut set = TaskSet::new();

    let o = Arc::clone(order);
    set.insert(
        "task1",
        Task::after(["task2"], move |_| async move {
            sleep(Duration::from_millis(25)).await;
            o.lock().unwrap().push("task1");
            Ok(Value::Null)
        }),
    );

    let o = Arc::clone(order);
    set.insert(
        "task2",
        Task::new(move |_| async move {
            sleep(Duration::from_millis(50)).await;
            o.lock().unwrap().push("task2");
            Ok(Value::Null)
        }),
    );

    let o = Arc::clone(order);
    set.insert(
        "task3",
        Task::after(["task2"], move |_| async move {
            o.lock().unwrap().push("task3");
            Ok(Value::Null)
        }),
    );

    let o = Arc::clone(order);
    set.insert(
        "task4",
        Task::after(["task1", "task2"], move |_| async move {
            o.lock().unwrap().push("task4");
            Ok(Value::Null)
        }),
    );

    let o = Arc::clone(order);
    set.insert(
        "task5",
        Task::after(["task2"], move |_| async move {
            sleep(Duration::ZERO).await;
            o.lock().unwrap().push("task5");
            Ok(Value::Null)
        }),
    );

    let o = Arc::clone(order);
    set.insert(
        "task6",
        Task::after(["task2"], move |_| async move {
            o.lock().unwrap().push("task6");
            Ok(Value::Null)
        }),
    );

    set
}

#[tokio::test]
async fn root_runs_first_and_slow_branch_finishes_last() -> TestResult {
    let order: CallOrder = Arc::new(Mutex::new(Vec::new()));

    let results = execute(six_task_set(&order), None).await?;
    assert!(results.is_some());

    let order = order.lock().unwrap();
    assert_eq!(order.len(), 6);
    assert_eq!(order[0], "task2");
    // task1 sleeps 25ms while its siblings finish immediately, so it comes
    // second to last, and task4 (waiting on it) last.
    assert_eq!(order[4], "task1");
    assert_eq!(order[5], "task4");

    Ok(())
}

#[tokio::test]
async fn dependencies_complete_before_dependents_at_any_concurrency() -> TestResult {
    for concurrency in [Some(1), Some(2), Some(3), None] {
        let order: CallOrder = Arc::new(Mutex::new(Vec::new()));

        execute(six_task_set(&order), concurrency).await?;

        let order = order.lock().unwrap();
        assert_eq!(order.len(), 6, "concurrency {concurrency:?}");
        for dependent in ["task1", "task3", "task4", "task5", "task6"] {
            assert!(
                position(&order, "task2") < position(&order, dependent),
                "task2 must complete before {dependent} (concurrency {concurrency:?})"
            );
        }
        assert!(
            position(&order, "task1") < position(&order, "task4"),
            "task1 must complete before task4 (concurrency {concurrency:?})"
        );
    }

    Ok(())
}

#[tokio::test]
async fn chain_runs_in_order() -> TestResult {
    let order: CallOrder = Arc::new(Mutex::new(Vec::new()));
    let mut set = TaskSet::new();

    let o = Arc::clone(&order);
    set.insert(
        "A",
        Task::new(move |_| async move {
            o.lock().unwrap().push("A");
            Ok(json!(1))
        }),
    );

    let o = Arc::clone(&order);
    set.insert(
        "B",
        Task::after(["A"], move |_| async move {
            o.lock().unwrap().push("B");
            Ok(json!(2))
        }),
    );

    let o = Arc::clone(&order);
    set.insert(
        "C",
        Task::after(["B"], move |_| async move {
            o.lock().unwrap().push("C");
            Ok(json!(3))
        }),
    );

    let results = execute(set, Some(1)).await?.expect("three tasks ran");

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
    assert_eq!(results.get("C"), Some(&json!(3)));

    Ok(())
}
