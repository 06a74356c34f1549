//! `pawfeed-tasks` — named periodic background jobs for the feeder process.
//!
//! # Overview
//!
//! A [`TaskManager`] owns N recurring jobs, each identified by a unique name.
//! Jobs registered before [`TaskManager::start`] are queued in registration
//! order; `start()` runs each queued job once and then hands it a dedicated
//! execution unit that re-invokes the work whenever its interval has elapsed,
//! checked at a fixed tick resolution (default 1 s).
//!
//! Lifecycle control is centralized: [`TaskManager::stop`] joins every unit
//! and re-queues the jobs so a later `start()` resumes the same set;
//! [`TaskManager::unregister_task`] stops and joins a single unit.
//!
//! The due-time check and the `last_run`/`next_run` update happen under one
//! manager-wide lock; the work invocation itself runs outside it, so a slow
//! job cannot delay the scheduling decisions of the others.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{Result, TaskError};
pub use manager::TaskManager;
pub use types::{TaskHandle, TaskSnapshot, TaskStatus};
