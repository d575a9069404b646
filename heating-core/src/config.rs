//! Timing constants and configuration bundles shared by every target.
//!
//! Everything the state machines count is expressed in ticks. One tick is one
//! [`TICK_PERIOD`]; hosts call the controller exactly once per period. The
//! human-facing configuration is written in [`Duration`]s and converted once,
//! when the channel or boiler is constructed.

use core::time::Duration;

/// Saturation point of the demand debounce accumulator.
pub const DEMAND_MAX: u16 = 512;

/// Wall-clock length of a single controller tick.
pub const TICK_PERIOD: Duration = Duration::from_millis(1);

/// Time a motorised valve needs to travel fully open. The valves are slow.
pub const VALVE_OPEN_TIME: Duration = Duration::from_millis(8_000);
/// Time a motorised valve needs to travel fully closed.
pub const VALVE_CLOSE_TIME: Duration = Duration::from_millis(4_000);
/// Margin added on top of the valve close time before the boiler may ignite.
pub const UNDERRUN_MARGIN: Duration = Duration::from_millis(1_000);
/// Time the boiler keeps venting residual heat once demand disappears.
pub const BOILER_OVERRUN_TIME: Duration = Duration::from_secs(5 * 60);

/// Converts a duration into whole ticks, rounding down and saturating at `u32::MAX`.
#[must_use]
pub fn ticks_for(duration: Duration) -> u32 {
    let ticks = duration.as_nanos() / TICK_PERIOD.as_nanos();
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

/// Valve travel timings.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelTiming {
    pub open_time: Duration,
    pub close_time: Duration,
}

impl ChannelTiming {
    pub const fn new(open_time: Duration, close_time: Duration) -> Self {
        Self {
            open_time,
            close_time,
        }
    }

    #[must_use]
    pub fn open_ticks(&self) -> u32 {
        ticks_for(self.open_time)
    }

    #[must_use]
    pub fn close_ticks(&self) -> u32 {
        ticks_for(self.close_time)
    }
}

impl Default for ChannelTiming {
    fn default() -> Self {
        Self::new(VALVE_OPEN_TIME, VALVE_CLOSE_TIME)
    }
}

/// Boiler ignition shaping timings.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoilerTiming {
    /// Delay between an ignition request and the boiler actually firing.
    pub underrun_time: Duration,
    /// How long the boiler is considered hot after the request is withdrawn.
    pub overrun_time: Duration,
}

impl BoilerTiming {
    pub const fn new(underrun_time: Duration, overrun_time: Duration) -> Self {
        Self {
            underrun_time,
            overrun_time,
        }
    }

    /// Derives the underrun from the valve close time so a valve that was
    /// told to close has finished moving before ignition.
    #[must_use]
    pub fn for_valves(valves: &ChannelTiming) -> Self {
        Self::new(
            valves.close_time.saturating_add(UNDERRUN_MARGIN),
            BOILER_OVERRUN_TIME,
        )
    }

    #[must_use]
    pub fn underrun_ticks(&self) -> u32 {
        ticks_for(self.underrun_time)
    }

    #[must_use]
    pub fn overrun_ticks(&self) -> u32 {
        ticks_for(self.overrun_time)
    }
}

impl Default for BoilerTiming {
    fn default() -> Self {
        Self::for_valves(&ChannelTiming::default())
    }
}

/// Complete timing configuration for a controller installation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ControllerConfig {
    pub channel: ChannelTiming,
    pub boiler: BoilerTiming,
}

impl ControllerConfig {
    #[must_use]
    pub const fn with_channel_timing(mut self, channel: ChannelTiming) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub const fn with_underrun(mut self, underrun_time: Duration) -> Self {
        self.boiler.underrun_time = underrun_time;
        self
    }

    #[must_use]
    pub const fn with_overrun(mut self, overrun_time: Duration) -> Self {
        self.boiler.overrun_time = overrun_time;
        self
    }
}
