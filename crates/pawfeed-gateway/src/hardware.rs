//! Peripheral construction honoring the hardware enable flags.
//!
//! Development builds run on the simulated drivers; a Raspberry Pi
//! deployment swaps in its GPIO-backed implementations of the same traits.
//! Either way, a disabled or failed peripheral degrades to `None` and the
//! scheduler and the other peripherals keep running.

use std::sync::Arc;

use pawfeed_core::PawfeedConfig;
use pawfeed_hardware::{
    BufferDriver, Dispenser, HopperSensor, PaneDisplay, SimDispenser, SimHopperSensor,
};
use tracing::info;

pub fn build_dispenser(config: &PawfeedConfig) -> Option<Arc<dyn Dispenser>> {
    if !config.hardware.dispenser {
        info!("dispenser hardware not enabled");
        return None;
    }
    info!("dispenser attached (simulated driver)");
    Some(Arc::new(SimDispenser::new()))
}

pub fn build_display(config: &PawfeedConfig) -> Option<Arc<PaneDisplay>> {
    if !config.hardware.display {
        info!("display hardware not enabled");
        return None;
    }
    info!("display attached (buffer driver)");
    Some(Arc::new(PaneDisplay::new(Box::new(BufferDriver::new()))))
}

pub fn build_hopper(config: &PawfeedConfig) -> Option<Arc<dyn HopperSensor>> {
    if !config.hardware.hopper {
        info!("hopper sensor not enabled");
        return None;
    }
    info!("hopper sensor attached (simulated driver)");
    Some(Arc::new(SimHopperSensor::new(100.0)))
}
