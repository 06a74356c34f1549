use std::sync::Mutex;

use tokio::sync::Notify;
use tracing::debug;

/// The feed-in-progress flag: a two-state machine (Idle / InProgress) guarded
/// by one mutex, with a notify primitive that wakes waiters on every clear.
///
/// Each InProgress period carries an epoch. The timeout fallback resets
/// through [`FeedFlag::reset_epoch`] with the epoch it was armed for, so a
/// stale timer that outlives an explicit reset can never clear a *later*
/// period.
pub struct FeedFlag {
    state: Mutex<FlagState>,
    notify: Notify,
}

struct FlagState {
    in_progress: bool,
    epoch: u64,
}

impl FeedFlag {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FlagState {
                in_progress: false,
                epoch: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Flip to InProgress unconditionally. Returns the period's epoch.
    pub fn set(&self) -> u64 {
        let mut s = self.state.lock().unwrap();
        s.in_progress = true;
        s.epoch += 1;
        debug!(epoch = s.epoch, "feed flag set");
        s.epoch
    }

    /// Flip to InProgress only from Idle. Returns `None` when a feed is
    /// already in progress. This is the atomic check the trigger paths use.
    pub fn try_set(&self) -> Option<u64> {
        let mut s = self.state.lock().unwrap();
        if s.in_progress {
            return None;
        }
        s.in_progress = true;
        s.epoch += 1;
        debug!(epoch = s.epoch, "feed flag set");
        Some(s.epoch)
    }

    /// Clear the flag and wake all waiters. No-op (and no wake) when already
    /// Idle, so racing an explicit reset against the timeout cannot
    /// double-notify.
    pub fn reset(&self) {
        let mut s = self.state.lock().unwrap();
        if !s.in_progress {
            return;
        }
        s.in_progress = false;
        debug!(epoch = s.epoch, "feed flag reset");
        drop(s);
        self.notify.notify_waiters();
    }

    /// Clear the flag only if the current period is still `epoch`. The
    /// timeout fallback's entry point.
    pub fn reset_epoch(&self, epoch: u64) {
        let mut s = self.state.lock().unwrap();
        if !s.in_progress || s.epoch != epoch {
            return;
        }
        s.in_progress = false;
        debug!(epoch, "feed flag reset (timeout)");
        drop(s);
        self.notify.notify_waiters();
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.lock().unwrap().in_progress
    }

    /// Suspend until the flag is Idle. Returns immediately when it already is.
    pub async fn wait_idle(&self) {
        loop {
            // Create the notified future before the check so a clear that
            // lands in between cannot be missed.
            let notified = self.notify.notified();
            if !self.is_in_progress() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for FeedFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn waiter_wakes_when_the_flag_clears() {
        let flag = Arc::new(FeedFlag::new());
        flag.set();

        let waiter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { flag.wait_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        flag.reset();
        waiter.await.unwrap();
        assert!(!flag.is_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_idle_returns_immediately_when_idle() {
        let flag = FeedFlag::new();
        flag.wait_idle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn double_reset_is_a_no_op() {
        let flag = Arc::new(FeedFlag::new());
        flag.set();
        flag.reset();
        flag.reset();

        // A later period must still block its waiter: the redundant reset
        // did not leave a stored wake-up behind.
        flag.set();
        let waiter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { flag.wait_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        flag.reset();
        waiter.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stale_epoch_cannot_clear_a_later_period() {
        let flag = FeedFlag::new();
        let first = flag.set();
        flag.reset();

        let _second = flag.set();
        flag.reset_epoch(first);
        assert!(flag.is_in_progress(), "stale timeout cleared a later period");
    }

    #[tokio::test(start_paused = true)]
    async fn try_set_rejects_while_in_progress() {
        let flag = FeedFlag::new();
        assert!(flag.try_set().is_some());
        assert!(flag.try_set().is_none());
        flag.reset();
        assert!(flag.try_set().is_some());
    }
}
