//! Shared data types for pawfeed-tasks.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A unit of recurring work. Invoked once per elapsed interval; an `Err`
/// marks the owning task [`TaskStatus::Failed`] and stops its loop.
pub type TaskFn = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

// ---------------------------------------------------------------------------
// TaskHandle
// ---------------------------------------------------------------------------

/// Opaque identifier for a task's execution unit.
///
/// The manager owns the real join handle; this id exists purely for status
/// reporting, so the underlying representation can change without breaking
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub String);

impl TaskHandle {
    /// Generate a fresh random handle (UUIDv4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TaskStatus / TaskSnapshot
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
///
/// `Stopped` and `Failed` are terminal: a task in either state must be
/// re-registered (or the whole manager stop/started) to run again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Registered but waiting for `start()` (or re-queued by `stop()`).
    Queued,
    /// The per-task loop is live.
    Running,
    /// The loop observed a stop/shutdown signal and exited.
    Stopped,
    /// The work callable returned an error; the loop has exited.
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Stopped => "stopped",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Consistent point-in-time view of one task, taken under the manager lock.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    /// Unique task name.
    pub name: String,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Start of the most recent invocation. `None` while still queued.
    pub last_run: Option<DateTime<Utc>>,
    /// Next planned invocation. `None` while still queued.
    pub next_run: Option<DateTime<Utc>>,
    /// Execution-unit id, present while the manager holds a live unit.
    pub handle: Option<TaskHandle>,
}
