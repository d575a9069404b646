//! Change tracking and event history for the control loop.
//!
//! [`StatusMonitor`] is the presentation-side collaborator: it reads the
//! controller's read-only accessors once per tick, keeps the "previous value"
//! trackers, and emits a [`ControlEvent`] only when something changed. Events
//! land in a fixed-capacity [`TelemetryRecorder`] so the console can replay
//! recent history, while firmware and emulator mirror each new event to their
//! log sinks.

use core::fmt;

use heapless::HistoryBuf;

use crate::boiler::BoilerState;
use crate::channel::{ChannelId, MAX_CHANNELS, ValveMotion};
use crate::controller::{ChannelMask, ControlState, Controller};
use crate::plant;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_CAPACITY: usize = 64;

/// Monotonic tick counter maintained by the host.
pub type Tick = u64;

/// Identifier assigned to each recorded event.
pub type EventId = u32;

/// Before/after pair for one of the controller's bitmasks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MaskChange {
    pub from: ChannelMask,
    pub to: ChannelMask,
}

/// Discrete changes observed in the control loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    /// Demand and/or fully-open masks changed. `width` is the channel count.
    MasksChanged {
        demand: MaskChange,
        open: MaskChange,
        width: u8,
    },
    StateChanged(ControlState),
    BoilerChanged(BoilerState),
    ValveMoved {
        channel: ChannelId,
        motion: ValveMotion,
    },
    /// Demand vanished and this channel was chosen to vent overrun heat.
    OverrunElected(ChannelId),
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlEvent::MasksChanged {
                demand,
                open,
                width,
            } => write!(
                f,
                "demand {} -> {}, open {} -> {}",
                MaskTags::new(demand.from, *width),
                MaskTags::new(demand.to, *width),
                MaskTags::new(open.from, *width),
                MaskTags::new(open.to, *width),
            ),
            ControlEvent::StateChanged(state) => write!(f, "state {state}"),
            ControlEvent::BoilerChanged(state) => write!(f, "boiler {state}"),
            ControlEvent::ValveMoved { channel, motion } => {
                write!(f, "valve {} {motion}", plant::tag_for(*channel))
            }
            ControlEvent::OverrunElected(channel) => {
                write!(f, "overrun via {}", plant::tag_for(*channel))
            }
        }
    }
}

/// Renders a mask as one tag character per channel, `-` where the bit is clear.
#[derive(Copy, Clone, Debug)]
pub struct MaskTags {
    mask: ChannelMask,
    width: u8,
}

impl MaskTags {
    #[must_use]
    pub const fn new(mask: ChannelMask, width: u8) -> Self {
        Self { mask, width }
    }
}

impl fmt::Display for MaskTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        for index in 0..self.width {
            let id = ChannelId::new(index);
            let tag = if self.mask.contains(id) {
                plant::tag_for(id)
            } else {
                '-'
            };
            f.write_char(tag)?;
        }
        Ok(())
    }
}

/// Telemetry record stored in the history buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub tick: Tick,
    pub event: ControlEvent,
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} t={}ms {}", self.id, self.tick, self.event)
    }
}

/// Fixed-capacity ring of the most recent control events.
pub struct TelemetryRecorder {
    ring: HistoryBuf<TelemetryRecord, TELEMETRY_CAPACITY>,
    next_event_id: EventId,
}

impl TelemetryRecorder {
    /// Creates a recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Appends an event, evicting the oldest record once full.
    pub fn record(&mut self, tick: Tick, event: ControlEvent) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);
        self.ring.write(TelemetryRecord { id, tick, event });
        id
    }

    /// Returns the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord> {
        self.ring.oldest_ordered()
    }

    /// Returns up to `count` of the newest records, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &TelemetryRecord> {
        let skip = self.ring.len().saturating_sub(count);
        self.ring.oldest_ordered().skip(skip)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Number of events ever recorded, including evicted ones.
    #[must_use]
    pub fn total(&self) -> EventId {
        self.next_event_id
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Previous-value tracker that turns per-tick observations into events.
pub struct StatusMonitor {
    state: ControlState,
    boiler: BoilerState,
    demand: ChannelMask,
    open: ChannelMask,
    motions: [ValveMotion; MAX_CHANNELS],
}

impl StatusMonitor {
    /// Starts from the quiescent boot state, so the first tick reports only
    /// what differs from Idle/Closed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ControlState::Idle,
            boiler: BoilerState::Idle,
            demand: ChannelMask::EMPTY,
            open: ChannelMask::EMPTY,
            motions: [ValveMotion::Closed; MAX_CHANNELS],
        }
    }

    /// Compares the controller against the previous tick and records changes.
    ///
    /// Returns the number of events recorded for this tick.
    pub fn observe<S, A, B>(
        &mut self,
        now: Tick,
        controller: &Controller<'_, S, A, B>,
        recorder: &mut TelemetryRecorder,
    ) -> usize {
        let mut emitted = 0;
        let mut emit = |event| {
            recorder.record(now, event);
            emitted += 1;
        };

        let demand = controller.demand_mask();
        let open = controller.open_mask();

        if demand.is_empty() && !self.demand.is_empty() {
            emit(ControlEvent::OverrunElected(controller.current_overrun()));
        }

        if demand != self.demand || open != self.open {
            let width = u8::try_from(controller.channels().len()).unwrap_or(u8::MAX);
            emit(ControlEvent::MasksChanged {
                demand: MaskChange {
                    from: self.demand,
                    to: demand,
                },
                open: MaskChange {
                    from: self.open,
                    to: open,
                },
                width,
            });
            self.demand = demand;
            self.open = open;
        }

        if controller.state() != self.state {
            self.state = controller.state();
            emit(ControlEvent::StateChanged(self.state));
        }

        for (slot, channel) in self.motions.iter_mut().zip(controller.channels()) {
            if channel.motion_state() != *slot {
                *slot = channel.motion_state();
                emit(ControlEvent::ValveMoved {
                    channel: channel.id(),
                    motion: *slot,
                });
            }
        }

        let boiler = controller.boiler().state();
        if boiler != self.boiler {
            self.boiler = boiler;
            emit(ControlEvent::BoilerChanged(boiler));
        }

        emitted
    }
}

impl Default for StatusMonitor {
    fn default() -> Self {
        Self::new()
    }
}
