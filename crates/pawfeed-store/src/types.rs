use serde::{Deserialize, Serialize};

/// Whether a schedule entry survives its first firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Removed from the schedule after it fires once.
    OneShot,
    /// Fires every day at the matching time.
    Recurring,
}

impl std::fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScheduleKind::OneShot => "one_shot",
            ScheduleKind::Recurring => "recurring",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ScheduleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "one_shot" => Ok(ScheduleKind::OneShot),
            "recurring" => Ok(ScheduleKind::Recurring),
            other => Err(format!("unknown schedule kind: {other}")),
        }
    }
}

/// How a feeding was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Operator pressed the button on the dashboard.
    Manual,
    /// Matched from a stored schedule entry.
    Scheduled,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeedKind::Manual => "manual",
            FeedKind::Scheduled => "scheduled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "manual" => Ok(FeedKind::Manual),
            "scheduled" => Ok(FeedKind::Scheduled),
            other => Err(format!("unknown feed kind: {other}")),
        }
    }
}

/// A scheduled feed time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// UUID v4 string — primary key.
    pub id: String,
    /// Time of day as `HH:MM` (24-hour). Matching is minute-granular.
    pub time: String,
    /// One-shot or recurring.
    pub kind: ScheduleKind,
    /// Feed size in dispenser units.
    pub size: u32,
}

/// A recorded feeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEvent {
    /// UUID v4 string — primary key.
    pub id: String,
    /// Time of day as `HH:MM`.
    pub time: String,
    /// Date as `YYYY-MM-DD`.
    pub date: String,
    /// Feed size in dispenser units.
    pub size: u32,
    /// Manual or scheduled.
    pub kind: FeedKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_strings() {
        assert_eq!(
            "one_shot".parse::<ScheduleKind>().unwrap(),
            ScheduleKind::OneShot
        );
        assert_eq!(ScheduleKind::Recurring.to_string(), "recurring");
        assert_eq!("manual".parse::<FeedKind>().unwrap(), FeedKind::Manual);
        assert!("automatic".parse::<FeedKind>().is_err());
    }
}
