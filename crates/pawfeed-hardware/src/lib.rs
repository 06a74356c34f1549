//! `pawfeed-hardware` — peripheral seams for the feeder.
//!
//! The scheduler and coordinator talk to hardware exclusively through the
//! traits here: [`Dispenser`] (motor), [`DisplayDriver`] (character screen
//! rows), and [`HopperSensor`] (food level). The wire protocols behind them
//! (GPIO pulse timing, I2C command bytes, ultrasonic echo measurement) live
//! in platform drivers outside this workspace; the simulated implementations
//! stand in on development machines and in tests.
//!
//! [`PaneDisplay`] layers named-pane management over any driver: panes are
//! registered once, updated by whichever task owns their content, and rotated
//! onto the screen by the pane-rotation job.

pub mod dispenser;
pub mod display;
pub mod error;
pub mod hopper;

pub use dispenser::{Dispenser, SimDispenser};
pub use display::{BufferDriver, DisplayDriver, PaneDisplay, LCD_HEIGHT, LCD_WIDTH};
pub use error::{HardwareError, Result};
pub use hopper::{HopperLevel, HopperSensor, SimHopperSensor};
