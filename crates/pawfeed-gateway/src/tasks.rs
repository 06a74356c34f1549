//! Background job wiring: the recurring work the feeder runs between
//! requests, registered before the manager starts.

use std::sync::Arc;
use std::time::Duration;

use pawfeed_core::PawfeedConfig;
use pawfeed_feeder::FeedCoordinator;
use pawfeed_hardware::{HopperLevel, HopperSensor, PaneDisplay};
use pawfeed_tasks::{TaskError, TaskManager};
use tracing::warn;

const HOPPER_PANE: &str = "hopper";

/// Register the feeder's recurring jobs on `tasks`.
///
/// Display- and sensor-bound jobs are only registered when the peripheral is
/// actually attached.
pub async fn register_background_tasks(
    tasks: &TaskManager,
    config: &PawfeedConfig,
    coordinator: &Arc<FeedCoordinator>,
    display: Option<&Arc<PaneDisplay>>,
    hopper: Option<&Arc<dyn HopperSensor>>,
) -> Result<(), TaskError> {
    let c = Arc::clone(coordinator);
    tasks
        .register_task(
            "feed-times",
            Duration::from_secs(config.tasks.feed_poll_secs),
            move || {
                let c = Arc::clone(&c);
                async move {
                    c.check_feed_times().await;
                    Ok(())
                }
            },
        )
        .await?;

    if display.is_some() {
        let c = Arc::clone(coordinator);
        tasks
            .register_task(
                "display-refresh",
                Duration::from_secs(config.tasks.display_refresh_secs),
                move || {
                    let c = Arc::clone(&c);
                    async move {
                        c.refresh_summaries();
                        Ok(())
                    }
                },
            )
            .await?;
    }

    if let Some(display) = display {
        let d = Arc::clone(display);
        tasks
            .register_task(
                "pane-rotate",
                Duration::from_secs(config.tasks.pane_rotate_secs),
                move || {
                    let d = Arc::clone(&d);
                    async move {
                        if let Err(e) = d.iterate_panes() {
                            warn!("pane rotation failed: {e}");
                        }
                        Ok(())
                    }
                },
            )
            .await?;
    }

    if let (Some(display), Some(hopper)) = (display, hopper) {
        display.register_pane(HOPPER_PANE, vec!["Hopper:".to_string()]);
        let d = Arc::clone(display);
        let h = Arc::clone(hopper);
        tasks
            .register_task(
                "hopper-level",
                Duration::from_secs(config.tasks.hopper_poll_secs),
                move || {
                    let d = Arc::clone(&d);
                    let h = Arc::clone(&h);
                    async move {
                        match h.level_percent() {
                            Ok(percent) => {
                                let level = HopperLevel::from_percent(percent);
                                let now = chrono::Local::now().format("%I:%M %p");
                                let rows =
                                    vec!["Hopper:".to_string(), format!("{now} | {level}")];
                                if let Err(e) = d.update_pane(HOPPER_PANE, rows) {
                                    warn!("hopper pane update failed: {e}");
                                }
                            }
                            Err(e) => warn!("hopper read failed: {e}"),
                        }
                        Ok(())
                    }
                },
            )
            .await?;
    }

    Ok(())
}
