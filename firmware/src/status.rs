#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! The control task publishes a copy of the controller's observable state into
//! lightweight atomics once per tick. The console task rebuilds a
//! `StatusSnapshot` from them without borrowing the controller. Fields are
//! stored independently, so a snapshot may straddle two ticks.

use heating_core::channel::MAX_CHANNELS;
use heating_core::console::{ChannelStatus, StatusSnapshot};
use heating_core::{BoilerState, ChannelId, ChannelMask, ControlState, Controller, ValveMotion};
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

const MOTION_BITS: usize = 2;

/// Tick counter of the most recent publish.
static TICK: AtomicU64 = AtomicU64::new(0);
/// Encoded `ControlState`.
static STATE: AtomicU8 = AtomicU8::new(0);
/// Index of the channel currently elected for overrun.
static OVERRUN: AtomicU8 = AtomicU8::new(0);
static DEMAND_MASK: AtomicU32 = AtomicU32::new(0);
static OPEN_MASK: AtomicU32 = AtomicU32::new(0);
/// Encoded `BoilerState`.
static BOILER: AtomicU8 = AtomicU8::new(0);
static FIRING: AtomicBool = AtomicBool::new(false);
/// Two bits of `ValveMotion` per channel, channel 0 in the low bits.
static MOTIONS: AtomicU64 = AtomicU64::new(0);
/// Number of channels covered by the published state.
static WIDTH: AtomicU8 = AtomicU8::new(0);

fn pack_motions(motions: impl Iterator<Item = ValveMotion>) -> u64 {
    motions
        .take(MAX_CHANNELS)
        .enumerate()
        .fold(0, |packed, (index, motion)| {
            packed | (u64::from(motion.to_raw()) << (index * MOTION_BITS))
        })
}

fn motion_at(packed: u64, index: usize) -> ValveMotion {
    let raw = (packed >> (index * MOTION_BITS)) & 0b11;
    ValveMotion::from_raw(u8::try_from(raw).unwrap_or_default())
}

/// Copies the controller's current state into the shared atomics.
pub fn publish<S, A, B>(now: u64, controller: &Controller<'_, S, A, B>) {
    let channels = controller.channels();
    let width = u8::try_from(channels.len().min(MAX_CHANNELS)).unwrap_or(u8::MAX);

    MOTIONS.store(
        pack_motions(channels.iter().map(|channel| channel.motion_state())),
        Ordering::Relaxed,
    );
    DEMAND_MASK.store(controller.demand_mask().bits(), Ordering::Relaxed);
    OPEN_MASK.store(controller.open_mask().bits(), Ordering::Relaxed);
    STATE.store(controller.state().to_raw(), Ordering::Relaxed);
    OVERRUN.store(
        u8::try_from(controller.current_overrun().index()).unwrap_or(u8::MAX),
        Ordering::Relaxed,
    );
    BOILER.store(controller.boiler().state().to_raw(), Ordering::Relaxed);
    FIRING.store(controller.boiler().is_firing(), Ordering::Relaxed);
    WIDTH.store(width, Ordering::Relaxed);
    TICK.store(now, Ordering::Release);
}

/// Builds a snapshot from the most recently published state.
pub fn snapshot() -> StatusSnapshot {
    let tick = TICK.load(Ordering::Acquire);
    let demand = ChannelMask::from_bits(DEMAND_MASK.load(Ordering::Relaxed));
    let motions = MOTIONS.load(Ordering::Relaxed);
    let width = usize::from(WIDTH.load(Ordering::Relaxed)).min(MAX_CHANNELS);

    let channels = (0..width)
        .filter_map(ChannelId::from_index)
        .map(|id| ChannelStatus {
            id,
            demand: demand.contains(id),
            motion: motion_at(motions, id.index()),
        })
        .collect();

    StatusSnapshot {
        tick,
        state: ControlState::from_raw(STATE.load(Ordering::Relaxed)),
        overrun: ChannelId::new(OVERRUN.load(Ordering::Relaxed)),
        demand,
        open: ChannelMask::from_bits(OPEN_MASK.load(Ordering::Relaxed)),
        boiler: BoilerState::from_raw(BOILER.load(Ordering::Relaxed)),
        firing: FIRING.load(Ordering::Relaxed),
        channels,
    }
}
