//! Indicator LED patterns and the liveness heartbeat.
//!
//! A single 32-bit pattern mask walks one bit every [`PATTERN_STEP_TICKS`].
//! Each indicator ANDs the walking bit with a per-state pattern, and with a
//! brightness mask that rotates every tick to dim blinking LEDs. The pattern
//! wrapping back to bit 0 doubles as the watchdog heartbeat, so a stalled
//! control loop stops petting the watchdog.

use crate::boiler::BoilerState;
use crate::channel::ValveMotion;
use crate::controller::ControlState;

/// Ticks between pattern steps (100 ms at the 1 ms tick).
pub const PATTERN_STEP_TICKS: u32 = 100;

const DIM: u32 = 0x0101_0101;
const MID: u32 = 0x1111_1111;

const VALVE_OPENING: u32 = 0x7f7f_7f7f;
const VALVE_CLOSING: u32 = 0x3030_3030;
const BOILER_UNDERRUN: u32 = 0xf0f0_f0f0;
const BOILER_OVERRUN: u32 = 0xf000_0000;

/// Status LED pattern for each controller state.
#[must_use]
pub const fn status_pattern(state: ControlState) -> u32 {
    match state {
        ControlState::Idle => 0x0000_0001,
        ControlState::Demand => 0x0001_0001,
        ControlState::Cool => 0x1111_1111,
    }
}

/// Result of advancing the indicator clock by one tick.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IndicatorStep {
    /// The walking pattern moved this tick; slow indicators should refresh.
    pub pattern_stepped: bool,
    /// The pattern wrapped to its start; the host should pet its watchdog.
    pub pet_watchdog: bool,
}

/// Free-running clock behind every indicator pattern.
#[derive(Clone, Debug)]
pub struct IndicatorClock {
    pattern: u32,
    dim: u32,
    mid: u32,
    since_step: u32,
}

impl IndicatorClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: 1,
            dim: DIM,
            mid: MID,
            since_step: 0,
        }
    }

    /// Advances one tick.
    pub fn advance(&mut self) -> IndicatorStep {
        self.dim = self.dim.rotate_right(1);
        self.mid = self.mid.rotate_right(1);

        self.since_step += 1;
        if self.since_step < PATTERN_STEP_TICKS {
            return IndicatorStep::default();
        }

        self.since_step = 0;
        self.pattern = self.pattern.rotate_right(1);
        IndicatorStep {
            pattern_stepped: true,
            pet_watchdog: self.pattern == 1,
        }
    }

    /// Walking bit of the pattern mask.
    #[must_use]
    pub const fn pattern(&self) -> u32 {
        self.pattern
    }

    /// LED level for a valve in the given motion state.
    #[must_use]
    pub const fn valve_led(&self, motion: ValveMotion) -> bool {
        match motion {
            ValveMotion::Closed => false,
            ValveMotion::Open => true,
            ValveMotion::Opening => VALVE_OPENING & self.pattern & self.dim != 0,
            ValveMotion::Closing => VALVE_CLOSING & self.pattern & self.mid != 0,
        }
    }

    /// LED level for the boiler in the given ignition state.
    #[must_use]
    pub const fn boiler_led(&self, state: BoilerState) -> bool {
        match state {
            BoilerState::Idle => false,
            BoilerState::Demand => true,
            BoilerState::Underrun => BOILER_UNDERRUN & self.pattern & self.dim != 0,
            BoilerState::Overrun => BOILER_OVERRUN & self.pattern & self.dim != 0,
        }
    }

    /// LED level for the status heartbeat.
    #[must_use]
    pub const fn status_led(&self, state: ControlState) -> bool {
        status_pattern(state) & self.pattern != 0
    }
}

impl Default for IndicatorClock {
    fn default() -> Self {
        Self::new()
    }
}
