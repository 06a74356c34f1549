//! `pawfeed-feeder` — the feed-trigger critical section.
//!
//! # Overview
//!
//! Feed triggers arrive from two directions: the scheduled-feed polling job
//! (driven by the task manager) and the manual-feed web endpoint. The
//! [`FeedFlag`] serializes them: a trigger flips the flag to in-progress and
//! arms a timeout that clears it after the cooldown, waking anyone blocked in
//! [`FeedFlag::wait_idle`]. The polling path waits out the cooldown before
//! resuming, which keeps a matched minute from firing twice; the manual path
//! is rejected outright while a feed is in progress.
//!
//! [`FeedCoordinator`] drives the peripherals (dispenser run proportional to
//! feed size, display overlay for the same duration), records every feeding,
//! and maintains the upcoming/past display summaries.

pub mod coordinator;
pub mod error;
pub mod flag;
pub mod summary;

pub use coordinator::FeedCoordinator;
pub use error::{FeedError, Result};
pub use flag::FeedFlag;
