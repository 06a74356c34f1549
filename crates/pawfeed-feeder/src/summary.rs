//! Upcoming/past feed summaries for the display panes.
//!
//! Times are `HH:MM` 24-hour strings, which order lexicographically exactly
//! as times of day; both selectors lean on that.

use pawfeed_core::config::MAX_DISPLAY_FEEDS;
use pawfeed_store::{FeedEvent, ScheduleEntry};

/// Schedule times strictly after `now_hm` (later today), ascending, at most
/// [`MAX_DISPLAY_FEEDS`].
pub fn upcoming_feeds(entries: &[ScheduleEntry], now_hm: &str) -> Vec<String> {
    let mut times: Vec<String> = entries
        .iter()
        .filter(|e| e.time.as_str() > now_hm)
        .map(|e| e.time.clone())
        .collect();
    times.sort();
    times.truncate(MAX_DISPLAY_FEEDS);
    times
}

/// Feeding times from `date` strictly before `now_hm`, most recent first, at
/// most [`MAX_DISPLAY_FEEDS`].
pub fn past_feeds(history: &[FeedEvent], date: &str, now_hm: &str) -> Vec<String> {
    let mut times: Vec<String> = history
        .iter()
        .filter(|e| e.date == date && e.time.as_str() < now_hm)
        .map(|e| e.time.clone())
        .collect();
    times.sort();
    times.reverse();
    times.truncate(MAX_DISPLAY_FEEDS);
    times
}

/// `"14:30"` → `"02:30 PM"`. Falls back to the input when it does not parse.
pub fn format_12h(hm: &str) -> String {
    chrono::NaiveTime::parse_from_str(hm, "%H:%M")
        .map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|_| hm.to_string())
}

/// Render a titled pane from a list of `HH:MM` times.
pub fn pane_rows(title: &str, empty_text: &str, times: &[String]) -> Vec<String> {
    if times.is_empty() {
        return vec![title.to_string(), empty_text.to_string()];
    }
    let mut rows = vec![title.to_string()];
    rows.extend(times.iter().map(|t| format_12h(t)));
    rows
}
