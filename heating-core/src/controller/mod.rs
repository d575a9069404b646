//! Multi-channel arbiter.
//!
//! The controller turns independent zone demands into one valve plan and one
//! boiler request per tick. It never owns the channels or the boiler; the host
//! builds them once at startup and lends them for the lifetime of the
//! controller.
//!
//! Tick order is fixed: every channel advances first, then the controller
//! arbitrates on the freshly updated state, then the boiler advances. The
//! boiler therefore always sees valve positions from the same tick.

mod mask;

use core::fmt;

pub use mask::ChannelMask;

use crate::boiler::Boiler;
use crate::channel::{Channel, ChannelId, MAX_CHANNELS};
use crate::io::{Actuator, DemandSensor};

/// System-wide control state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ControlState {
    #[default]
    Idle,
    Demand,
    Cool,
}

impl ControlState {
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            ControlState::Idle => 0,
            ControlState::Demand => 1,
            ControlState::Cool => 2,
        }
    }

    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => ControlState::Demand,
            2 => ControlState::Cool,
            _ => ControlState::Idle,
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlState::Idle => "idle",
            ControlState::Demand => "demand",
            ControlState::Cool => "cool",
        })
    }
}

/// Wiring mistakes rejected when a controller is assembled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The channel list is empty.
    NoChannels,
    /// More channels than fit in a [`ChannelMask`].
    TooManyChannels { count: usize },
    /// A channel's identifier does not match its position in the list.
    MisplacedChannel { position: usize, id: ChannelId },
    /// The default overrun channel is not part of the list.
    OverrunOutOfRange { overrun: ChannelId, count: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoChannels => f.write_str("controller needs at least one channel"),
            ConfigError::TooManyChannels { count } => {
                write!(f, "{count} channels exceed the limit of {MAX_CHANNELS}")
            }
            ConfigError::MisplacedChannel { position, id } => {
                write!(f, "channel {id} sits at position {position}")
            }
            ConfigError::OverrunOutOfRange { overrun, count } => {
                write!(f, "overrun channel {overrun} outside {count} channels")
            }
        }
    }
}

/// Arbitrates valve positions and boiler ignition across borrowed channels.
pub struct Controller<'a, S, A, B> {
    channels: &'a mut [Channel<S, A>],
    boiler: &'a mut Boiler<B>,
    default_overrun: ChannelId,
    current_overrun: ChannelId,
    state: ControlState,
    demand_mask: ChannelMask,
    open_mask: ChannelMask,
}

impl<'a, S, A, B> Controller<'a, S, A, B>
where
    S: DemandSensor,
    A: Actuator,
    B: Actuator,
{
    /// Assembles a controller in the idle state.
    pub fn new(
        channels: &'a mut [Channel<S, A>],
        boiler: &'a mut Boiler<B>,
        default_overrun: ChannelId,
    ) -> Result<Self, ConfigError> {
        let count = channels.len();
        if count == 0 {
            return Err(ConfigError::NoChannels);
        }
        if count > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels { count });
        }
        if let Some((position, channel)) = channels
            .iter()
            .enumerate()
            .find(|(position, channel)| channel.id().index() != *position)
        {
            return Err(ConfigError::MisplacedChannel {
                position,
                id: channel.id(),
            });
        }
        if default_overrun.index() >= count {
            return Err(ConfigError::OverrunOutOfRange {
                overrun: default_overrun,
                count,
            });
        }

        Ok(Self {
            channels,
            boiler,
            default_overrun,
            current_overrun: default_overrun,
            state: ControlState::Idle,
            demand_mask: ChannelMask::EMPTY,
            open_mask: ChannelMask::EMPTY,
        })
    }

    /// Runs one complete control tick: channels, arbitration, boiler.
    pub fn tick(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.tick();
        }
        self.arbitrate();
        self.boiler.advance();
    }

    fn arbitrate(&mut self) {
        let mut demand = ChannelMask::EMPTY;
        let mut open = ChannelMask::EMPTY;
        for channel in self.channels.iter() {
            if channel.has_demand() {
                demand.insert(channel.id());
            }
            if channel.fully_open() {
                open.insert(channel.id());
            }
        }

        if demand.is_empty() && !self.demand_mask.is_empty() {
            self.current_overrun = open.highest().unwrap_or(self.default_overrun);
        }

        self.demand_mask = demand;
        self.open_mask = open;

        let any_demanded_open = demand & open;

        if !demand.is_empty() {
            self.state = ControlState::Demand;
            // Ignite only once a demanding valve has proven itself open.
            self.boiler.set_demand(!any_demanded_open.is_empty());

            for channel in self.channels.iter_mut() {
                if channel.has_demand() {
                    channel.open();
                } else if !channel.fully_open() {
                    // never got fully open; abort the travel
                    channel.close();
                } else if !any_demanded_open.is_empty() {
                    // another demanded valve carries the flow now
                    channel.close();
                }
            }
        } else if !self.boiler.is_idle() {
            self.state = ControlState::Cool;
            self.boiler.set_demand(false);

            let overrun = self.current_overrun;
            let vent = &mut self.channels[overrun.index()];
            vent.open();
            // Others may close only once the vent path is open.
            if vent.fully_open() {
                for channel in self.channels.iter_mut() {
                    if channel.id() != overrun {
                        channel.close();
                    }
                }
            }
        } else {
            self.state = ControlState::Idle;
            self.boiler.set_demand(false);

            // Reasserted every idle tick so a lost command heals itself.
            for channel in self.channels.iter_mut() {
                channel.close();
            }
        }
    }
}

impl<S, A, B> Controller<'_, S, A, B> {
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.state
    }

    #[must_use]
    pub fn demand_mask(&self) -> ChannelMask {
        self.demand_mask
    }

    #[must_use]
    pub fn open_mask(&self) -> ChannelMask {
        self.open_mask
    }

    /// Channel that absorbs overrun heat once demand disappears.
    #[must_use]
    pub fn current_overrun(&self) -> ChannelId {
        self.current_overrun
    }

    #[must_use]
    pub fn default_overrun(&self) -> ChannelId {
        self.default_overrun
    }

    #[must_use]
    pub fn channels(&self) -> &[Channel<S, A>] {
        self.channels
    }

    #[must_use]
    pub fn channel(&self, id: ChannelId) -> Option<&Channel<S, A>> {
        self.channels.get(id.index())
    }

    #[must_use]
    pub fn boiler(&self) -> &Boiler<B> {
        self.boiler
    }
}
