use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;

/// Character-cell geometry of the feeder's front screen.
pub const LCD_WIDTH: usize = 20;
pub const LCD_HEIGHT: usize = 4;

/// Row-level access to a character display.
///
/// Implementations own the actual command protocol (I2C expander, serial,
/// terminal emulation). Rows longer than [`LCD_WIDTH`] are truncated by the
/// pane layer before they reach the driver.
pub trait DisplayDriver: Send + Sync {
    fn write_row(&self, row: usize, text: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<T: DisplayDriver + ?Sized> DisplayDriver for std::sync::Arc<T> {
    fn write_row(&self, row: usize, text: &str) -> Result<()> {
        (**self).write_row(row, text)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

struct Pane {
    name: String,
    rows: Vec<String>,
}

struct DisplayState {
    panes: Vec<Pane>,
    pane_index: usize,
}

/// Named-pane management over any [`DisplayDriver`].
///
/// Pane rotation (one background job) and pane content updates (other jobs,
/// plus feed triggers) race against each other, so every screen mutation
/// goes through the display's own lock, independent of the task manager's.
pub struct PaneDisplay {
    driver: Box<dyn DisplayDriver>,
    state: Mutex<DisplayState>,
}

impl PaneDisplay {
    pub fn new(driver: Box<dyn DisplayDriver>) -> Self {
        Self {
            driver,
            state: Mutex::new(DisplayState {
                panes: Vec::new(),
                pane_index: 0,
            }),
        }
    }

    /// Register a pane with its initial content. Ignored (with a warning) if
    /// the name is already taken.
    pub fn register_pane(&self, name: &str, rows: Vec<String>) {
        let mut state = self.state.lock().unwrap();
        if state.panes.iter().any(|p| p.name == name) {
            warn!(pane = %name, "pane already exists");
            return;
        }
        debug!(pane = %name, "pane registered");
        state.panes.push(Pane {
            name: name.to_string(),
            rows,
        });
    }

    /// Drop a pane. Ignored (with a warning) if the name is unknown.
    pub fn remove_pane(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let before = state.panes.len();
        state.panes.retain(|p| p.name != name);
        if state.panes.len() == before {
            warn!(pane = %name, "pane not found");
            return;
        }
        if state.pane_index >= state.panes.len() {
            state.pane_index = 0;
        }
    }

    /// Replace a pane's content; re-renders immediately when that pane is the
    /// one currently on screen.
    pub fn update_pane(&self, name: &str, rows: Vec<String>) -> Result<()> {
        let state = &mut *self.state.lock().unwrap();
        let Some(pane) = state.panes.iter_mut().find(|p| p.name == name) else {
            warn!(pane = %name, "pane not found, cannot update content");
            return Ok(());
        };
        pane.rows = rows;
        if state.panes[state.pane_index].name == name {
            let rows = state.panes[state.pane_index].rows.clone();
            self.render(&rows)?;
        }
        Ok(())
    }

    /// Advance to the next pane and render it.
    pub fn iterate_panes(&self) -> Result<()> {
        let state = &mut *self.state.lock().unwrap();
        if state.panes.is_empty() {
            return Ok(());
        }
        state.pane_index = (state.pane_index + 1) % state.panes.len();
        debug!(pane = %state.panes[state.pane_index].name, "rotating pane");
        let rows = state.panes[state.pane_index].rows.clone();
        self.render(&rows)
    }

    /// Name of the pane currently on screen, if any.
    pub fn current_pane(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .panes
            .get(state.pane_index)
            .map(|p| p.name.clone())
    }

    /// Show the feed-time animation for `duration`, then restore the current
    /// pane. Blocks for the whole overlay and holds the display lock, so no
    /// rotation or update can tear the screen mid-animation.
    pub fn feed_overlay(&self, duration: Duration) -> Result<()> {
        let state = self.state.lock().unwrap();
        let art = [
            "   |`__/,|   ( (    ",
            " _.|o o  |____) )   ",
            "-(((---(((--------  ",
            "     Feed Time!     ",
        ];
        self.driver.clear()?;
        for (i, row) in art.iter().enumerate() {
            self.driver.write_row(i, row)?;
        }
        std::thread::sleep(duration);
        match state.panes.get(state.pane_index) {
            Some(pane) => {
                let rows = pane.rows.clone();
                self.render(&rows)
            }
            None => self.driver.clear(),
        }
    }

    /// Clear and write `rows` through the driver. Caller holds the state lock.
    fn render(&self, rows: &[String]) -> Result<()> {
        self.driver.clear()?;
        for (i, row) in rows.iter().take(LCD_HEIGHT).enumerate() {
            let text = if row.len() > LCD_WIDTH {
                &row[..LCD_WIDTH]
            } else {
                row
            };
            self.driver.write_row(i, text)?;
        }
        Ok(())
    }
}

/// In-memory driver for development machines and tests: keeps the last
/// rendered screen so assertions can read it back.
#[derive(Default)]
pub struct BufferDriver {
    rows: Mutex<Vec<String>>,
}

impl BufferDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Vec<String> {
        self.rows.lock().unwrap().clone()
    }
}

impl DisplayDriver for BufferDriver {
    fn write_row(&self, row: usize, text: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.len() <= row {
            rows.resize(row + 1, String::new());
        }
        rows[row] = text.to_string();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn display_with_buffer() -> (Arc<PaneDisplay>, Arc<BufferDriver>) {
        let driver = Arc::new(BufferDriver::new());
        let display = Arc::new(PaneDisplay::new(Box::new(Arc::clone(&driver))));
        (display, driver)
    }

    #[test]
    fn rotation_cycles_through_panes_in_registration_order() {
        let (display, buffer) = display_with_buffer();
        display.register_pane("upcoming", vec!["Upcoming Feeds:".into()]);
        display.register_pane("past", vec!["Past Feeds:".into()]);

        display.iterate_panes().unwrap();
        assert_eq!(display.current_pane().as_deref(), Some("past"));
        assert_eq!(buffer.screen(), vec!["Past Feeds:"]);

        display.iterate_panes().unwrap();
        assert_eq!(display.current_pane().as_deref(), Some("upcoming"));
        assert_eq!(buffer.screen(), vec!["Upcoming Feeds:"]);
    }

    #[test]
    fn duplicate_pane_registration_is_ignored() {
        let (display, _) = display_with_buffer();
        display.register_pane("upcoming", vec!["a".into()]);
        display.register_pane("upcoming", vec!["b".into()]);

        display.iterate_panes().unwrap();
        // Only one pane exists, so rotation stays on it.
        assert_eq!(display.current_pane().as_deref(), Some("upcoming"));
    }

    #[test]
    fn updating_the_visible_pane_rerenders_it() {
        let (display, buffer) = display_with_buffer();
        display.register_pane("upcoming", vec!["old".into()]);

        display.update_pane("upcoming", vec!["new".into()]).unwrap();
        assert_eq!(buffer.screen(), vec!["new"]);

        // Updating a hidden pane leaves the screen alone.
        display.register_pane("past", vec!["past".into()]);
        display.update_pane("past", vec!["changed".into()]).unwrap();
        assert_eq!(buffer.screen(), vec!["new"]);
    }

    #[test]
    fn overlay_restores_the_current_pane() {
        let (display, buffer) = display_with_buffer();
        display.register_pane("upcoming", vec!["Upcoming Feeds:".into()]);
        display.update_pane("upcoming", vec!["Upcoming Feeds:".into()]).unwrap();

        display.feed_overlay(Duration::ZERO).unwrap();
        assert_eq!(buffer.screen(), vec!["Upcoming Feeds:"]);
    }

    #[test]
    fn long_rows_are_truncated_to_the_screen_width() {
        let (display, buffer) = display_with_buffer();
        let wide = "x".repeat(LCD_WIDTH + 7);
        display.register_pane("wide", vec![wide]);
        display.iterate_panes().unwrap();
        assert_eq!(buffer.screen()[0].len(), LCD_WIDTH);
    }
}
