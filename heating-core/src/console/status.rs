//! Shared status surface for the console.
//!
//! Both front-ends build a [`StatusSnapshot`] (the emulator straight from its
//! controller, the firmware from the control task's published atomics) and
//! render it through [`StatusFormatter`] so `status` reads the same everywhere.

use core::fmt;

use heapless::Vec;

use crate::boiler::BoilerState;
use crate::channel::{ChannelId, MAX_CHANNELS, ValveMotion};
use crate::controller::{ChannelMask, ControlState, Controller};
use crate::plant;
use crate::telemetry::{MaskTags, Tick};

/// Per-channel view exposed by the `status` command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelStatus {
    pub id: ChannelId,
    pub demand: bool,
    pub motion: ValveMotion,
}

/// Point-in-time copy of everything `status` reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub tick: Tick,
    pub state: ControlState,
    pub overrun: ChannelId,
    pub demand: ChannelMask,
    pub open: ChannelMask,
    pub boiler: BoilerState,
    pub firing: bool,
    pub channels: Vec<ChannelStatus, MAX_CHANNELS>,
}

impl StatusSnapshot {
    /// Reads the controller's accessors at tick `now`.
    #[must_use]
    pub fn capture<S, A, B>(now: Tick, controller: &Controller<'_, S, A, B>) -> Self {
        let demand = controller.demand_mask();
        let channels = controller
            .channels()
            .iter()
            .take(MAX_CHANNELS)
            .map(|channel| ChannelStatus {
                id: channel.id(),
                demand: demand.contains(channel.id()),
                motion: channel.motion_state(),
            })
            .collect();

        Self {
            tick: now,
            state: controller.state(),
            overrun: controller.current_overrun(),
            demand,
            open: controller.open_mask(),
            boiler: controller.boiler().state(),
            firing: controller.boiler().is_firing(),
            channels,
        }
    }

    /// Number of channels covered by the snapshot.
    #[must_use]
    pub fn width(&self) -> u8 {
        u8::try_from(self.channels.len()).unwrap_or(u8::MAX)
    }
}

/// Helper that renders a [`StatusSnapshot`] into human-readable lines.
#[derive(Clone, Copy, Debug)]
pub struct StatusFormatter<'a> {
    snapshot: &'a StatusSnapshot,
}

impl<'a> StatusFormatter<'a> {
    #[must_use]
    pub const fn new(snapshot: &'a StatusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Writes the controller line (e.g. `state demand overrun=3 t=1200ms`).
    pub fn write_state_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "state {} overrun={} t={}ms",
            self.snapshot.state,
            plant::tag_for(self.snapshot.overrun),
            self.snapshot.tick
        )
    }

    /// Writes the mask line (e.g. `demand W--- open ----`).
    pub fn write_masks_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        let width = self.snapshot.width();
        write!(
            writer,
            "demand {} open {}",
            MaskTags::new(self.snapshot.demand, width),
            MaskTags::new(self.snapshot.open, width)
        )
    }

    /// Writes the valve line (e.g. `valves W=opening 1=closed`).
    pub fn write_valves_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        writer.write_str("valves")?;
        for channel in &self.snapshot.channels {
            write!(writer, " {}={}", plant::tag_for(channel.id), channel.motion)?;
        }
        Ok(())
    }

    /// Writes the boiler line (e.g. `boiler underrun firing=false`).
    pub fn write_boiler_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "boiler {} firing={}",
            self.snapshot.boiler, self.snapshot.firing
        )
    }

    /// Writes every status line, each followed by `newline`.
    pub fn write_all<W: fmt::Write>(&self, writer: &mut W, newline: &str) -> fmt::Result {
        self.write_state_line(writer)?;
        writer.write_str(newline)?;
        self.write_masks_line(writer)?;
        writer.write_str(newline)?;
        self.write_valves_line(writer)?;
        writer.write_str(newline)?;
        self.write_boiler_line(writer)?;
        writer.write_str(newline)
    }
}
