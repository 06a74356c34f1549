//! `TaskManager` — owns and drives all named recurring jobs.
//!
//! Callers interact exclusively through this struct. The manager is designed
//! to be shared behind an `Arc`: all mutation goes through one internal lock,
//! so `&self` methods are safe from any task or handler.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Result, TaskError};
use crate::types::{TaskFn, TaskHandle, TaskSnapshot, TaskStatus};

/// Default tick resolution: how often each task loop re-checks its due time.
/// Bounds both scheduling latency and cancellation latency.
const DEFAULT_TICK: Duration = Duration::from_secs(1);

struct QueuedTask {
    name: String,
    work: TaskFn,
    interval: Duration,
    step: chrono::Duration,
    seq: u64,
}

struct TaskEntry {
    work: TaskFn,
    interval: Duration,
    step: chrono::Duration,
    seq: u64,
    status: TaskStatus,
    last_run: DateTime<Utc>,
    next_run: DateTime<Utc>,
    handle: TaskHandle,
    stop_tx: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
}

struct ManagerState {
    /// True between `start()` and `stop()`; new registrations go live
    /// immediately instead of queuing.
    started: bool,
    /// Monotonic registration counter; preserves queue order across
    /// stop/start round trips.
    next_seq: u64,
    queue: Vec<QueuedTask>,
    tasks: HashMap<String, TaskEntry>,
}

/// Runs N independently-scheduled, named units of recurring work with
/// centralized lifecycle control.
pub struct TaskManager {
    state: Arc<Mutex<ManagerState>>,
    tick: Duration,
    shutdown_tx: watch::Sender<bool>,
}

impl TaskManager {
    /// Create a manager with the default 1 s tick resolution.
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    /// Create a manager with a custom tick resolution.
    pub fn with_tick(tick: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(ManagerState {
                started: false,
                next_seq: 0,
                queue: Vec::new(),
                tasks: HashMap::new(),
            })),
            tick,
            shutdown_tx,
        }
    }

    /// Register a named recurring job.
    ///
    /// Before `start()` the job is queued (insertion order becomes run
    /// order); after `start()` it is promoted immediately, which runs the
    /// work once before this call returns.
    ///
    /// # Errors
    ///
    /// - `DuplicateTask`   — a live task already holds `name`.
    /// - `InvalidInterval` — `interval` is zero or out of range.
    pub async fn register_task<F, Fut>(&self, name: &str, interval: Duration, work: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let step = chrono::Duration::from_std(interval).map_err(|_| TaskError::InvalidInterval {
            name: name.to_string(),
        })?;
        if interval.is_zero() {
            return Err(TaskError::InvalidInterval {
                name: name.to_string(),
            });
        }

        let work: TaskFn = Arc::new(move || work().boxed());

        let queued = {
            let mut s = self.state.lock().unwrap();
            if s.tasks.contains_key(name) {
                return Err(TaskError::DuplicateTask {
                    name: name.to_string(),
                });
            }
            let seq = s.next_seq;
            s.next_seq += 1;
            if !s.started {
                // Duplicate names may pile up in the queue; the collision is
                // reported when the queue drains at start().
                s.queue.push(QueuedTask {
                    name: name.to_string(),
                    work,
                    interval,
                    step,
                    seq,
                });
                debug!(task = %name, "task queued");
                None
            } else {
                Some(QueuedTask {
                    name: name.to_string(),
                    work,
                    interval,
                    step,
                    seq,
                })
            }
        };

        match queued {
            None => Ok(()),
            Some(spec) => self.schedule(spec).await,
        }
    }

    /// Promote a task spec to a live, looping task.
    ///
    /// Claims the name atomically, runs the work once to establish the
    /// `last_run`/`next_run` baseline, then spawns the per-task loop. A
    /// failing first run leaves the task in `Failed` with no loop.
    async fn schedule(&self, spec: QueuedTask) -> Result<()> {
        let QueuedTask {
            name,
            work,
            interval,
            step,
            seq,
        } = spec;
        let handle = TaskHandle::new();
        let (stop_tx, stop_rx) = watch::channel(false);

        {
            let mut s = self.state.lock().unwrap();
            if s.tasks.contains_key(&name) {
                return Err(TaskError::DuplicateTask { name });
            }
            let now = Utc::now();
            s.tasks.insert(
                name.clone(),
                TaskEntry {
                    work: Arc::clone(&work),
                    interval,
                    step,
                    seq,
                    status: TaskStatus::Running,
                    last_run: now,
                    next_run: now + step,
                    handle: handle.clone(),
                    stop_tx,
                    join: None,
                },
            );
        }

        // Baseline run, outside the lock.
        if let Err(e) = (work)().await {
            error!(task = %name, "task failed on first run: {e}");
            let mut s = self.state.lock().unwrap();
            if let Some(entry) = s.tasks.get_mut(&name) {
                entry.status = TaskStatus::Failed;
            }
            return Ok(());
        }
        {
            let mut s = self.state.lock().unwrap();
            if let Some(entry) = s.tasks.get_mut(&name) {
                let now = Utc::now();
                entry.last_run = now;
                entry.next_run = now + step;
            }
        }

        let join = tokio::spawn(run_task_loop(
            Arc::clone(&self.state),
            name.clone(),
            self.tick,
            self.shutdown_tx.subscribe(),
            stop_rx,
        ));
        {
            let mut s = self.state.lock().unwrap();
            if let Some(entry) = s.tasks.get_mut(&name) {
                entry.join = Some(join);
            }
        }
        info!(task = %name, interval_secs = interval.as_secs_f64(), "task scheduled");
        Ok(())
    }

    /// Stop and join one task, then forget it. No-op if the name is unknown.
    ///
    /// Blocking in effect: the execution unit is fully joined before this
    /// returns, so no invocation can land afterwards.
    pub async fn unregister_task(&self, name: &str) {
        let join = {
            let mut s = self.state.lock().unwrap();
            s.queue.retain(|q| q.name != name);
            match s.tasks.remove(name) {
                None => None,
                Some(mut entry) => {
                    let _ = entry.stop_tx.send(true);
                    entry.join.take()
                }
            }
        };
        if let Some(join) = join {
            if join.await.is_err() {
                warn!(task = %name, "task loop panicked before join");
            }
            info!(task = %name, "task unregistered");
        }
    }

    /// Snapshot one task, or `None` if the name is unknown.
    pub fn get_task_status(&self, name: &str) -> Option<TaskSnapshot> {
        let s = self.state.lock().unwrap();
        if let Some(entry) = s.tasks.get(name) {
            return Some(snapshot(name, entry));
        }
        s.queue
            .iter()
            .find(|q| q.name == name)
            .map(|q| queued_snapshot(&q.name))
    }

    /// Snapshot one task, erroring if the name is unknown.
    pub fn require_task(&self, name: &str) -> Result<TaskSnapshot> {
        self.get_task_status(name)
            .ok_or_else(|| TaskError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Snapshots for every known task (live and queued), registration order.
    pub fn list_tasks(&self) -> Vec<TaskSnapshot> {
        let s = self.state.lock().unwrap();
        let mut all: Vec<(u64, TaskSnapshot)> = s
            .tasks
            .iter()
            .map(|(name, entry)| (entry.seq, snapshot(name, entry)))
            .chain(s.queue.iter().map(|q| (q.seq, queued_snapshot(&q.name))))
            .collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, snap)| snap).collect()
    }

    /// Start accepting live schedules and drain the registration queue in
    /// insertion order, running each queued task once.
    ///
    /// # Errors
    ///
    /// - `AlreadyStarted` — called twice without an intervening `stop()`.
    pub async fn start(&self) -> Result<()> {
        let queued = {
            let mut s = self.state.lock().unwrap();
            if s.started {
                return Err(TaskError::AlreadyStarted);
            }
            s.started = true;
            std::mem::take(&mut s.queue)
        };

        info!(count = queued.len(), "task manager starting");
        for spec in queued {
            // A name collision in the queue is reported, not fatal. Matches
            // defensive re-registration at startup.
            if let Err(e) = self.schedule(spec).await {
                warn!("skipping queued task: {e}");
            }
        }
        Ok(())
    }

    /// Stop every task, join every execution unit, and re-queue the tasks so
    /// a later `start()` resumes the same set. Idempotent.
    pub async fn stop(&self) {
        {
            let mut s = self.state.lock().unwrap();
            if !s.started {
                return;
            }
            s.started = false;
        }
        let _ = self.shutdown_tx.send(true);

        let joins: Vec<(String, JoinHandle<()>)> = {
            let mut s = self.state.lock().unwrap();
            s.tasks
                .iter_mut()
                .filter_map(|(name, entry)| entry.join.take().map(|j| (name.clone(), j)))
                .collect()
        };
        for (name, join) in joins {
            if join.await.is_err() {
                warn!(task = %name, "task loop panicked before join");
            }
        }

        {
            let mut s = self.state.lock().unwrap();
            let mut entries: Vec<(String, TaskEntry)> = s.tasks.drain().collect();
            entries.sort_by_key(|(_, e)| e.seq);
            for (name, entry) in entries {
                s.queue.push(QueuedTask {
                    name,
                    work: entry.work,
                    interval: entry.interval,
                    step: entry.step,
                    seq: entry.seq,
                });
            }
            s.queue.sort_by_key(|q| q.seq);
        }

        // Re-arm the shutdown watch so a later start() gets fresh receivers.
        let _ = self.shutdown_tx.send(false);
        info!("task manager stopped");
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot(name: &str, entry: &TaskEntry) -> TaskSnapshot {
    TaskSnapshot {
        name: name.to_string(),
        status: entry.status.clone(),
        last_run: Some(entry.last_run),
        next_run: Some(entry.next_run),
        handle: entry.join.is_some().then(|| entry.handle.clone()),
    }
}

fn queued_snapshot(name: &str) -> TaskSnapshot {
    TaskSnapshot {
        name: name.to_string(),
        status: TaskStatus::Queued,
        last_run: None,
        next_run: None,
        handle: None,
    }
}

/// Per-task loop: tick, check due time under the manager lock, invoke the
/// work outside it. Exits on the manager-wide shutdown watch, the task's own
/// stop watch, entry removal, or a failed invocation.
async fn run_task_loop(
    state: Arc<Mutex<ManagerState>>,
    name: String,
    tick: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // The lock covers only the due decision and the atomic
                // last_run/next_run update, never the invocation.
                let due = {
                    let mut s = state.lock().unwrap();
                    let Some(entry) = s.tasks.get_mut(&name) else { break };
                    let now = Utc::now();
                    if now >= entry.next_run {
                        entry.last_run = now;
                        entry.next_run = now + entry.step;
                        Some(Arc::clone(&entry.work))
                    } else {
                        None
                    }
                };
                if let Some(work) = due {
                    if let Err(e) = work().await {
                        error!(task = %name, "task work failed: {e}");
                        let mut s = state.lock().unwrap();
                        if let Some(entry) = s.tasks.get_mut(&name) {
                            entry.status = TaskStatus::Failed;
                        }
                        break;
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    mark_stopped(&state, &name);
                    break;
                }
            }
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    mark_stopped(&state, &name);
                    break;
                }
            }
        }
    }
    debug!(task = %name, "task loop exited");
}

fn mark_stopped(state: &Arc<Mutex<ManagerState>>, name: &str) {
    let mut s = state.lock().unwrap();
    if let Some(entry) = s.tasks.get_mut(name) {
        entry.status = TaskStatus::Stopped;
    }
}
