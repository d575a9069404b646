//! Per-zone valve channel: demand debounce plus motorised valve travel.
//!
//! The debounce accumulator climbs one step per tick while the raw signal is
//! present and halves on every tick it is absent. Demand asserts only when the
//! accumulator saturates at [`DEMAND_MAX`] and clears only when it has drained
//! to zero, so intermediate values never flip the flag.
//!
//! Valve travel is modelled separately with a countdown, which lets a channel
//! report "demanding but not yet open" to the controller.

use core::fmt;

use crate::config::{ChannelTiming, DEMAND_MAX};
use crate::io::{Actuator, DemandSensor};

/// Largest channel count a controller can arbitrate (one bit per channel).
pub const MAX_CHANNELS: usize = 32;

/// Stable position of a channel within its controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Creates an identifier for the channel at `index`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Deterministic index into the controller's channel list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Bit this channel occupies in a [`ChannelMask`](crate::ChannelMask).
    ///
    /// Identifiers past [`MAX_CHANNELS`] map to no bit at all.
    #[must_use]
    pub const fn bit(self) -> u32 {
        if (self.0 as usize) < MAX_CHANNELS {
            1 << self.0
        } else {
            0
        }
    }

    /// Attempts to build an identifier from a raw index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|_| index < MAX_CHANNELS)
            .map(Self)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Physical position of a valve.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ValveMotion {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ValveMotion {
    /// Compact code used when packing motion states into atomics.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            ValveMotion::Closed => 0,
            ValveMotion::Opening => 1,
            ValveMotion::Open => 2,
            ValveMotion::Closing => 3,
        }
    }

    /// Inverse of [`ValveMotion::to_raw`]; only the low two bits are used.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw & 0b11 {
            0 => ValveMotion::Closed,
            1 => ValveMotion::Opening,
            2 => ValveMotion::Open,
            _ => ValveMotion::Closing,
        }
    }
}

impl fmt::Display for ValveMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValveMotion::Closed => "closed",
            ValveMotion::Opening => "opening",
            ValveMotion::Open => "open",
            ValveMotion::Closing => "closing",
        })
    }
}

/// One heating zone: its demand input, valve actuator, and travel model.
pub struct Channel<S, A> {
    id: ChannelId,
    sensor: S,
    valve: A,
    open_ticks: u32,
    close_ticks: u32,
    demand_level: u16,
    demand: bool,
    motion: ValveMotion,
    countdown: u32,
}

impl<S, A> Channel<S, A>
where
    S: DemandSensor,
    A: Actuator,
{
    /// Creates a quiescent channel: no demand, valve closed and at rest.
    pub fn new(id: ChannelId, sensor: S, valve: A, timing: ChannelTiming) -> Self {
        Self {
            id,
            sensor,
            valve,
            open_ticks: timing.open_ticks(),
            close_ticks: timing.close_ticks(),
            demand_level: 0,
            demand: false,
            motion: ValveMotion::Closed,
            countdown: 0,
        }
    }

    /// Samples the injected sensor and advances the channel by one tick.
    pub fn tick(&mut self) {
        let raw = self.sensor.sample();
        self.sample_and_advance(raw);
    }

    /// Advances the debounce accumulator and valve travel by one tick.
    pub fn sample_and_advance(&mut self, raw: bool) {
        if raw {
            if self.demand_level < DEMAND_MAX {
                self.demand_level += 1;
            }
        } else {
            self.demand_level /= 2;
        }

        if self.demand_level == DEMAND_MAX {
            self.demand = true;
        } else if self.demand_level == 0 {
            self.demand = false;
        }

        match self.motion {
            ValveMotion::Opening if self.countdown == 0 => self.motion = ValveMotion::Open,
            ValveMotion::Closing if self.countdown == 0 => self.motion = ValveMotion::Closed,
            _ if self.countdown > 0 => self.countdown -= 1,
            _ => {}
        }
    }

    /// Energizes the valve motor and starts opening unless already heading open.
    pub fn open(&mut self) {
        self.valve.drive(true);

        if !matches!(self.motion, ValveMotion::Open | ValveMotion::Opening) {
            self.motion = ValveMotion::Opening;
            self.countdown = self.open_ticks;
        }
    }

    /// Releases the valve motor and starts closing unless already heading closed.
    pub fn close(&mut self) {
        self.valve.drive(false);

        if !matches!(self.motion, ValveMotion::Closed | ValveMotion::Closing) {
            self.motion = ValveMotion::Closing;
            self.countdown = self.close_ticks;
        }
    }

    /// Returns the debounced demand flag.
    #[must_use]
    pub fn has_demand(&self) -> bool {
        self.demand
    }

    /// Returns `true` once the valve has finished travelling open.
    #[must_use]
    pub fn fully_open(&self) -> bool {
        self.motion == ValveMotion::Open
    }
}

impl<S, A> Channel<S, A> {
    #[must_use]
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Current motion state of the valve.
    #[must_use]
    pub fn motion_state(&self) -> ValveMotion {
        self.motion
    }

    /// Raw debounce accumulator, in `0..=DEMAND_MAX`.
    #[must_use]
    pub fn demand_level(&self) -> u16 {
        self.demand_level
    }

    /// Ticks left in the current valve transition (0 when at rest).
    #[must_use]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FixedDemand, NoopActuator};
    use core::time::Duration;

    fn channel() -> Channel<FixedDemand, NoopActuator> {
        Channel::new(
            ChannelId::new(0),
            FixedDemand(false),
            NoopActuator::new(),
            ChannelTiming::new(Duration::from_millis(3), Duration::from_millis(2)),
        )
    }

    #[test]
    fn demand_saturates_without_overshoot() {
        let mut channel = channel();
        for _ in 0..(DEMAND_MAX as usize + 50) {
            channel.sample_and_advance(true);
        }
        assert_eq!(channel.demand_level(), DEMAND_MAX);
        assert!(channel.has_demand());
    }

    #[test]
    fn single_dropout_keeps_demand() {
        let mut channel = channel();
        for _ in 0..DEMAND_MAX {
            channel.sample_and_advance(true);
        }
        channel.sample_and_advance(false);
        assert_eq!(channel.demand_level(), DEMAND_MAX / 2);
        assert!(channel.has_demand());

        // Climbing back does not re-assert until saturation, but demand never dropped.
        channel.sample_and_advance(true);
        assert!(channel.has_demand());
    }

    #[test]
    fn open_then_close_midway_restarts_countdown() {
        let mut channel = channel();
        channel.open();
        assert_eq!(channel.motion_state(), ValveMotion::Opening);
        assert_eq!(channel.countdown(), 3);

        channel.sample_and_advance(false);
        channel.close();
        assert_eq!(channel.motion_state(), ValveMotion::Closing);
        assert_eq!(channel.countdown(), 2);
    }

    #[test]
    fn repeated_open_does_not_restart_travel() {
        let mut channel = channel();
        channel.open();
        channel.sample_and_advance(false);
        channel.open();
        assert_eq!(channel.countdown(), 2);
    }

    #[test]
    fn valve_settles_after_countdown_drains() {
        let mut channel = channel();
        channel.open();
        for _ in 0..3 {
            channel.sample_and_advance(false);
            assert_eq!(channel.motion_state(), ValveMotion::Opening);
        }
        channel.sample_and_advance(false);
        assert!(channel.fully_open());
        assert_eq!(channel.countdown(), 0);
    }

    #[test]
    fn motion_codes_round_trip() {
        for motion in [
            ValveMotion::Closed,
            ValveMotion::Opening,
            ValveMotion::Open,
            ValveMotion::Closing,
        ] {
            assert_eq!(ValveMotion::from_raw(motion.to_raw()), motion);
        }
    }

    #[test]
    fn identifiers_map_to_bits() {
        assert_eq!(ChannelId::new(3).bit(), 0b1000);
        assert_eq!(ChannelId::from_index(31).map(ChannelId::bit), Some(1 << 31));
        assert_eq!(ChannelId::from_index(32), None);
    }
}
