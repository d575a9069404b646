#![no_std]

// Shared control logic for the zone valve and boiler controller.
//
// The crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware is reached only through the capability traits
// in `io`, so the same state machines run on the board and in the emulator.

pub mod boiler;
pub mod channel;
pub mod config;
pub mod console;
pub mod controller;
pub mod indicator;
pub mod io;
pub mod plant;
pub mod telemetry;

pub use boiler::{Boiler, BoilerState};
pub use channel::{Channel, ChannelId, ValveMotion};
pub use config::{BoilerTiming, ChannelTiming, ControllerConfig};
pub use controller::{ChannelMask, ConfigError, ControlState, Controller};
pub use io::{Actuator, DemandSensor, NoopActuator};
