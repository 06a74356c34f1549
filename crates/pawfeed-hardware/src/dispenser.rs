use std::sync::Mutex;
use std::time::Duration;

use tracing::info;

use crate::error::Result;

/// A motor-driven food dispenser.
///
/// `forward` blocks for the given duration while the motor runs; the amount
/// of food released is proportional to the run time. Callers that must not
/// block dispatch the call onto a blocking-capable execution unit.
pub trait Dispenser: Send + Sync {
    /// Run the motor forward for `duration`.
    fn forward(&self, duration: Duration) -> Result<()>;

    /// Run the motor backward for `duration`, used to clear jams.
    fn backward(&self, duration: Duration) -> Result<()>;
}

/// Development stand-in: records every run instead of driving GPIOs.
///
/// Does not sleep, so tests over it complete immediately.
#[derive(Default)]
pub struct SimDispenser {
    runs: Mutex<Vec<(Direction, Duration)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl SimDispenser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations of all forward runs so far, in order.
    pub fn forward_runs(&self) -> Vec<Duration> {
        self.runs
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, _)| *d == Direction::Forward)
            .map(|(_, t)| *t)
            .collect()
    }
}

impl Dispenser for SimDispenser {
    fn forward(&self, duration: Duration) -> Result<()> {
        info!(secs = duration.as_secs_f64(), "sim dispenser: forward");
        self.runs
            .lock()
            .unwrap()
            .push((Direction::Forward, duration));
        Ok(())
    }

    fn backward(&self, duration: Duration) -> Result<()> {
        info!(secs = duration.as_secs_f64(), "sim dispenser: backward");
        self.runs
            .lock()
            .unwrap()
            .push((Direction::Backward, duration));
        Ok(())
    }
}
