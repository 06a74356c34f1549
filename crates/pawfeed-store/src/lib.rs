//! `pawfeed-store` — SQLite persistence for the feeder.
//!
//! Two tables: `feed_times` holds the schedule (time-of-day, one-shot vs
//! recurring, size) and `feedings` holds the history of every dispense.
//! [`FeedStore`] wraps a single connection behind a mutex; the scheduler's
//! polling path and the web handlers share one store handle.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::FeedStore;
pub use types::{FeedEvent, FeedKind, ScheduleEntry, ScheduleKind};
