use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use pawfeed_core::config::DISPENSE_SECS_PER_UNIT;
use pawfeed_hardware::{Dispenser, PaneDisplay};
use pawfeed_store::{FeedEvent, FeedKind, FeedStore, ScheduleKind};

use crate::error::{FeedError, Result};
use crate::flag::FeedFlag;
use crate::summary;

/// Display pane fed with the upcoming-feeds summary.
pub const UPCOMING_PANE: &str = "upcoming";
/// Display pane fed with the past-feeds summary.
pub const PAST_PANE: &str = "past";

const UPCOMING_TITLE: &str = "Upcoming Feeds:";
const PAST_TITLE: &str = "Past Feeds:";

/// Serializes feed triggers, drives the peripherals, and persists outcomes.
///
/// Both trigger paths go through the shared [`FeedFlag`]: the scheduled
/// polling path waits for Idle before and after firing, while a manual
/// trigger during a cooldown is rejected with [`FeedError::FeedInProgress`].
pub struct FeedCoordinator {
    store: Arc<FeedStore>,
    dispenser: Option<Arc<dyn Dispenser>>,
    display: Option<Arc<PaneDisplay>>,
    flag: Arc<FeedFlag>,
    feed_timeout: Duration,
}

impl FeedCoordinator {
    /// Wire up a coordinator. Absent peripherals degrade their feature: no
    /// dispenser means feeds are recorded but nothing moves, no display
    /// means no panes or overlay.
    pub fn new(
        store: Arc<FeedStore>,
        dispenser: Option<Arc<dyn Dispenser>>,
        display: Option<Arc<PaneDisplay>>,
        feed_timeout: Duration,
    ) -> Self {
        if let Some(display) = &display {
            display.register_pane(
                UPCOMING_PANE,
                summary::pane_rows(UPCOMING_TITLE, "No upcoming feeds", &[]),
            );
            display.register_pane(
                PAST_PANE,
                summary::pane_rows(PAST_TITLE, "No feeds today", &[]),
            );
        }
        Self {
            store,
            dispenser,
            display,
            flag: Arc::new(FeedFlag::new()),
            feed_timeout,
        }
    }

    /// The shared feed-in-progress flag.
    pub fn flag(&self) -> Arc<FeedFlag> {
        Arc::clone(&self.flag)
    }

    pub fn is_feed_in_progress(&self) -> bool {
        self.flag.is_in_progress()
    }

    /// Whether a dispenser is attached. The manual-feed endpoint refuses
    /// triggers that could not physically dispense anything.
    pub fn has_dispenser(&self) -> bool {
        self.dispenser.is_some()
    }

    /// Trigger a feed of `size` units, stamped with the current local time.
    ///
    /// Launches the dispense and the display overlay on their own execution
    /// units and returns without waiting for them; the written history
    /// record is returned. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - `FeedInProgress` if another feed's cooldown has not cleared yet.
    /// - `InvalidSize` if `size` is zero.
    pub fn trigger_feed(&self, size: u32, kind: FeedKind) -> Result<FeedEvent> {
        let now = Local::now();
        self.trigger_feed_stamped(
            size,
            kind,
            &now.format("%H:%M").to_string(),
            &now.format("%Y-%m-%d").to_string(),
        )
    }

    fn trigger_feed_stamped(
        &self,
        size: u32,
        kind: FeedKind,
        time: &str,
        date: &str,
    ) -> Result<FeedEvent> {
        if size == 0 {
            return Err(FeedError::InvalidSize);
        }
        let Some(epoch) = self.flag.try_set() else {
            return Err(FeedError::FeedInProgress);
        };

        // Timeout fallback: clears this period even if no explicit reset
        // arrives. The epoch keeps it from touching any later period.
        let flag = Arc::clone(&self.flag);
        let timeout = self.feed_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            flag.reset_epoch(epoch);
        });

        let run = Duration::from_secs(u64::from(size) * DISPENSE_SECS_PER_UNIT);
        match &self.dispenser {
            Some(dispenser) => {
                let dispenser = Arc::clone(dispenser);
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = dispenser.forward(run) {
                        warn!("dispense failed: {e}");
                    }
                });
            }
            None => warn!("no dispenser attached, feed not dispensed"),
        }
        if let Some(display) = &self.display {
            let display = Arc::clone(display);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = display.feed_overlay(run) {
                    warn!("feed overlay failed: {e}");
                }
            });
        }

        info!(%kind, size, %time, "feed triggered");
        Ok(self.store.record_feeding(time, date, size, kind)?)
    }

    /// Explicitly clear the feed-in-progress flag, waking any waiter.
    pub fn reset_feed_flag(&self) {
        self.flag.reset();
    }

    /// Scheduled-feed poll: fire every entry matching the current minute,
    /// prune one-shots, and refresh the display summaries.
    ///
    /// Never fails: a broken entry or store hiccup is logged and retried on
    /// the next poll.
    pub async fn check_feed_times(&self) {
        let now = Local::now();
        self.check_feed_times_at(
            &now.format("%H:%M").to_string(),
            &now.format("%Y-%m-%d").to_string(),
        )
        .await;
    }

    /// `check_feed_times` against an explicit clock, minute-granular.
    pub async fn check_feed_times_at(&self, now_hm: &str, date: &str) {
        let entries = match self.store.list_feed_times() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("schedule scan failed: {e}");
                return;
            }
        };

        // Entries arrive ascending by time, so the earliest due entry of the
        // matched minute fires first.
        for entry in entries {
            if entry.time != now_hm {
                continue;
            }
            // Never overlap an in-progress feed (e.g. a manual trigger).
            self.flag.wait_idle().await;
            match self.trigger_feed_stamped(entry.size, FeedKind::Scheduled, now_hm, date) {
                Ok(_) => {
                    if entry.kind == ScheduleKind::OneShot {
                        if let Err(e) = self.store.delete_feed_time(&entry.id) {
                            warn!(id = %entry.id, "could not remove one-shot feed time: {e}");
                        }
                    }
                }
                Err(e) => {
                    warn!(time = %entry.time, "scheduled feed skipped: {e}");
                    continue;
                }
            }
            // Wait out the cooldown before looking at the next entry so the
            // matched minute cannot re-fire.
            self.flag.wait_idle().await;
        }

        self.refresh_summaries_at(now_hm, date);
    }

    /// Recompute the upcoming/past panes from the store.
    pub fn refresh_summaries(&self) {
        let now = Local::now();
        self.refresh_summaries_at(
            &now.format("%H:%M").to_string(),
            &now.format("%Y-%m-%d").to_string(),
        );
    }

    /// `refresh_summaries` against an explicit clock.
    pub fn refresh_summaries_at(&self, now_hm: &str, date: &str) {
        let Some(display) = &self.display else {
            return;
        };
        let upcoming = match self.store.list_feed_times() {
            Ok(entries) => summary::upcoming_feeds(&entries, now_hm),
            Err(e) => {
                warn!("schedule scan failed: {e}");
                return;
            }
        };
        let past = match self.store.list_feedings() {
            Ok(history) => summary::past_feeds(&history, date, now_hm),
            Err(e) => {
                warn!("history scan failed: {e}");
                return;
            }
        };
        if let Err(e) = display.update_pane(
            UPCOMING_PANE,
            summary::pane_rows(UPCOMING_TITLE, "No upcoming feeds", &upcoming),
        ) {
            warn!("display update failed: {e}");
        }
        if let Err(e) = display.update_pane(
            PAST_PANE,
            summary::pane_rows(PAST_TITLE, "No feeds today", &past),
        ) {
            warn!("display update failed: {e}");
        }
    }
}
