use std::sync::Mutex;

use crate::error::Result;

/// Food-level sensor at the top of the hopper.
///
/// Implementations report how full the hopper is as a percentage; the
/// distance-to-surface measurement and its calibration stay inside the
/// platform driver.
pub trait HopperSensor: Send + Sync {
    fn level_percent(&self) -> Result<f64>;
}

/// Coarse hopper state for the display pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopperLevel {
    Full,
    Half,
    Low,
    Critical,
}

impl HopperLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 75.0 {
            HopperLevel::Full
        } else if percent >= 40.0 {
            HopperLevel::Half
        } else if percent >= 15.0 {
            HopperLevel::Low
        } else {
            HopperLevel::Critical
        }
    }
}

impl std::fmt::Display for HopperLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HopperLevel::Full => "Full",
            HopperLevel::Half => "~Half",
            HopperLevel::Low => "Low",
            HopperLevel::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

/// Development stand-in with a settable level.
pub struct SimHopperSensor {
    percent: Mutex<f64>,
}

impl SimHopperSensor {
    pub fn new(percent: f64) -> Self {
        Self {
            percent: Mutex::new(percent),
        }
    }

    pub fn set_percent(&self, percent: f64) {
        *self.percent.lock().unwrap() = percent;
    }
}

impl HopperSensor for SimHopperSensor {
    fn level_percent(&self) -> Result<f64> {
        Ok(*self.percent.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(HopperLevel::from_percent(100.0), HopperLevel::Full);
        assert_eq!(HopperLevel::from_percent(75.0), HopperLevel::Full);
        assert_eq!(HopperLevel::from_percent(50.0), HopperLevel::Half);
        assert_eq!(HopperLevel::from_percent(20.0), HopperLevel::Low);
        assert_eq!(HopperLevel::from_percent(5.0), HopperLevel::Critical);
    }

    #[test]
    fn level_labels_match_the_screen_strings() {
        assert_eq!(HopperLevel::Half.to_string(), "~Half");
        assert_eq!(HopperLevel::Critical.to_string(), "Critical");
    }
}
