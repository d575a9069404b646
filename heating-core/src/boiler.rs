//! Boiler ignition shaping.
//!
//! A raw ignition request is delayed by the underrun countdown before the
//! boiler fires, and the overrun countdown keeps the boiler reported as hot
//! after the request goes away so the controller can vent residual heat.

use core::fmt;

use crate::config::BoilerTiming;
use crate::io::Actuator;

/// Ignition state of the shared boiler.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BoilerState {
    #[default]
    Idle,
    Underrun,
    Demand,
    Overrun,
}

impl BoilerState {
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            BoilerState::Idle => 0,
            BoilerState::Underrun => 1,
            BoilerState::Demand => 2,
            BoilerState::Overrun => 3,
        }
    }

    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw & 0b11 {
            0 => BoilerState::Idle,
            1 => BoilerState::Underrun,
            2 => BoilerState::Demand,
            _ => BoilerState::Overrun,
        }
    }
}

impl fmt::Display for BoilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoilerState::Idle => "idle",
            BoilerState::Underrun => "underrun",
            BoilerState::Demand => "demand",
            BoilerState::Overrun => "overrun",
        })
    }
}

/// Shared heat source behind an injected ignition actuator.
pub struct Boiler<A> {
    igniter: A,
    requested: bool,
    state: BoilerState,
    underrun_ticks: u32,
    overrun_ticks: u32,
    underrun_countdown: u32,
    overrun_countdown: u32,
}

impl<A: Actuator> Boiler<A> {
    /// Creates an idle boiler with no pending countdowns.
    pub fn new(igniter: A, timing: BoilerTiming) -> Self {
        Self {
            igniter,
            requested: false,
            state: BoilerState::Idle,
            underrun_ticks: timing.underrun_ticks(),
            overrun_ticks: timing.overrun_ticks(),
            underrun_countdown: 0,
            overrun_countdown: 0,
        }
    }

    /// Records the latest ignition request; a rising edge arms the underrun delay.
    pub fn set_demand(&mut self, requested: bool) {
        if requested && !self.requested {
            self.underrun_countdown = self.underrun_ticks;
        }
        self.requested = requested;
    }

    /// Advances the ignition state by one tick and drives the igniter.
    pub fn advance(&mut self) {
        if self.requested {
            if self.underrun_countdown > 0 {
                self.underrun_countdown -= 1;
                self.state = BoilerState::Underrun;
            } else {
                self.overrun_countdown = self.overrun_ticks;
                self.state = BoilerState::Demand;
            }
        } else if self.overrun_countdown > 0 {
            self.overrun_countdown -= 1;
            self.state = BoilerState::Overrun;
        } else {
            self.state = BoilerState::Idle;
        }

        self.igniter.drive(self.state == BoilerState::Demand);
    }
}

impl<A> Boiler<A> {
    #[must_use]
    pub fn state(&self) -> BoilerState {
        self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == BoilerState::Idle
    }

    /// Returns `true` while the ignition output is energized.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.state == BoilerState::Demand
    }

    /// Latest request recorded through [`Boiler::set_demand`].
    #[must_use]
    pub fn requested(&self) -> bool {
        self.requested
    }

    #[must_use]
    pub fn underrun_countdown(&self) -> u32 {
        self.underrun_countdown
    }

    #[must_use]
    pub fn overrun_countdown(&self) -> u32 {
        self.overrun_countdown
    }

    pub fn igniter(&self) -> &A {
        &self.igniter
    }
}
