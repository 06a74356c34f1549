// Lifecycle and scheduling behavior of TaskManager, driven on a paused
// tokio clock so interval math is deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pawfeed_tasks::{TaskError, TaskManager, TaskStatus};

fn counting_work(counter: &Arc<AtomicUsize>) -> impl Fn() -> futures_util::future::Ready<anyhow::Result<()>> {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        futures_util::future::ready(Ok(()))
    }
}

#[tokio::test(start_paused = true)]
async fn queued_tasks_do_not_run_before_start() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let count = Arc::new(AtomicUsize::new(0));

    mgr.register_task("idle", Duration::from_millis(50), counting_work(&count))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    let snap = mgr.get_task_status("idle").unwrap();
    assert_eq!(snap.status, TaskStatus::Queued);
    assert!(snap.last_run.is_none());
}

#[tokio::test(start_paused = true)]
async fn start_runs_queued_tasks_once_in_registration_order() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        mgr.register_task(name, Duration::from_secs(3600), move || {
            order.lock().unwrap().push(name);
            futures_util::future::ready(Ok(()))
        })
        .await
        .unwrap();
    }

    mgr.start().await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);

    // Hour-long intervals: nothing else fires in the next few seconds.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(order.lock().unwrap().len(), 3);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn interval_execution_count_tracks_elapsed_time() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let count = Arc::new(AtomicUsize::new(0));

    mgr.register_task("ticker", Duration::from_millis(50), counting_work(&count))
        .await
        .unwrap();
    mgr.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(245)).await;
    mgr.stop().await;

    // One baseline run at start, then one per elapsed 50 ms interval,
    // within a tick of jitter on either side.
    let loops = count.load(Ordering::SeqCst) - 1;
    assert!((3..=5).contains(&loops), "loop runs out of range: {loops}");
}

#[tokio::test(start_paused = true)]
async fn register_after_start_promotes_immediately() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    mgr.start().await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    mgr.register_task("live", Duration::from_secs(3600), counting_work(&count))
        .await
        .unwrap();

    // The baseline run happens inside register_task.
    assert_eq!(count.load(Ordering::SeqCst), 1);
    let snap = mgr.get_task_status("live").unwrap();
    assert_eq!(snap.status, TaskStatus::Running);
    assert!(snap.handle.is_some());
    assert!(snap.next_run.unwrap() > snap.last_run.unwrap());

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_live_name_is_rejected() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    mgr.start().await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    mgr.register_task("dup", Duration::from_secs(60), counting_work(&count))
        .await
        .unwrap();

    let err = mgr
        .register_task("dup", Duration::from_secs(60), counting_work(&count))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::DuplicateTask { name } if name == "dup"));

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_rejected() {
    let mgr = TaskManager::new();
    let count = Arc::new(AtomicUsize::new(0));
    let err = mgr
        .register_task("zero", Duration::ZERO, counting_work(&count))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::InvalidInterval { .. }));
}

#[tokio::test(start_paused = true)]
async fn double_start_is_rejected() {
    let mgr = TaskManager::new();
    mgr.start().await.unwrap();
    assert!(matches!(mgr.start().await, Err(TaskError::AlreadyStarted)));
    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unregister_joins_the_loop_and_clears_status() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let count = Arc::new(AtomicUsize::new(0));

    mgr.register_task("gone", Duration::from_millis(50), counting_work(&count))
        .await
        .unwrap();
    mgr.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;

    mgr.unregister_task("gone").await;
    assert!(mgr.get_task_status("gone").is_none());

    // The unit was joined before unregister returned, so no lingering runs.
    let frozen = count.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(count.load(Ordering::SeqCst), frozen);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unregister_unknown_name_is_a_no_op() {
    let mgr = TaskManager::new();
    mgr.unregister_task("never-registered").await;
    assert!(mgr.get_task_status("never-registered").is_none());
}

#[tokio::test(start_paused = true)]
async fn stop_then_start_resumes_the_same_tasks() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));

    mgr.register_task("a", Duration::from_secs(3600), counting_work(&a))
        .await
        .unwrap();
    mgr.register_task("b", Duration::from_secs(3600), counting_work(&b))
        .await
        .unwrap();

    mgr.start().await.unwrap();
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 1);

    mgr.stop().await;
    // After stop the tasks are queued again, in the original order.
    let names: Vec<String> = mgr.list_tasks().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(mgr
        .list_tasks()
        .iter()
        .all(|t| t.status == TaskStatus::Queued));

    mgr.start().await.unwrap();
    assert_eq!(a.load(Ordering::SeqCst), 2);
    assert_eq!(b.load(Ordering::SeqCst), 2);
    assert_eq!(
        mgr.get_task_status("a").unwrap().status,
        TaskStatus::Running
    );

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failing_work_marks_the_task_failed_and_stops_it() {
    let mgr = TaskManager::with_tick(Duration::from_millis(10));
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_in_work = Arc::clone(&calls);
    mgr.register_task("flaky", Duration::from_millis(50), move || {
        let n = calls_in_work.fetch_add(1, Ordering::SeqCst);
        async move {
            if n >= 1 {
                anyhow::bail!("sensor went away");
            }
            Ok(())
        }
    })
    .await
    .unwrap();
    mgr.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let snap = mgr.get_task_status("flaky").unwrap();
    assert_eq!(snap.status, TaskStatus::Failed);

    // The loop exited on the failure: exactly one success + one failure.
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn require_task_reports_unknown_names() {
    let mgr = TaskManager::new();
    let err = mgr.require_task("ghost").unwrap_err();
    assert!(matches!(err, TaskError::NotRegistered { name } if name == "ghost"));
}
