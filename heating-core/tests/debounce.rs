use core::cell::Cell;

use heating_core::config::DEMAND_MAX;
use heating_core::io::FixedDemand;
use heating_core::{Channel, ChannelId, ChannelTiming, NoopActuator};

fn channel() -> Channel<FixedDemand, NoopActuator> {
    Channel::new(
        ChannelId::new(0),
        FixedDemand(false),
        NoopActuator::new(),
        ChannelTiming::default(),
    )
}

#[test]
fn demand_sets_after_full_run_of_samples() {
    let mut channel = channel();

    for _ in 1..DEMAND_MAX {
        channel.sample_and_advance(true);
        assert!(!channel.has_demand());
    }

    channel.sample_and_advance(true);
    assert!(channel.has_demand());
    assert_eq!(channel.demand_level(), DEMAND_MAX);

    // Saturated: extra samples do not push the accumulator further.
    channel.sample_and_advance(true);
    assert_eq!(channel.demand_level(), DEMAND_MAX);
}

#[test]
fn demand_clears_on_the_tenth_quiet_sample() {
    let mut channel = channel();
    for _ in 0..DEMAND_MAX {
        channel.sample_and_advance(true);
    }

    let mut levels = Vec::new();
    for _ in 0..9 {
        channel.sample_and_advance(false);
        levels.push(channel.demand_level());
        assert!(channel.has_demand());
    }
    assert_eq!(levels, [256, 128, 64, 32, 16, 8, 4, 2, 1]);

    channel.sample_and_advance(false);
    assert_eq!(channel.demand_level(), 0);
    assert!(!channel.has_demand());
}

#[test]
fn single_glitch_halves_progress() {
    let mut channel = channel();
    for _ in 0..(DEMAND_MAX - 1) {
        channel.sample_and_advance(true);
    }
    channel.sample_and_advance(false);
    assert_eq!(channel.demand_level(), (DEMAND_MAX - 1) / 2);

    let remaining = DEMAND_MAX - channel.demand_level();
    for _ in 1..remaining {
        channel.sample_and_advance(true);
    }
    assert!(!channel.has_demand());
    channel.sample_and_advance(true);
    assert!(channel.has_demand());
}

#[test]
fn noisy_input_between_thresholds_keeps_previous_flag() {
    let mut channel = channel();
    for _ in 0..DEMAND_MAX {
        channel.sample_and_advance(true);
    }

    // Alternating noise never drains the accumulator to zero.
    for _ in 0..200 {
        channel.sample_and_advance(false);
        channel.sample_and_advance(true);
        assert!(channel.has_demand());
    }
}

#[test]
fn tick_reads_the_injected_sensor() {
    let raw = Cell::new(true);
    let mut channel = Channel::new(
        ChannelId::new(1),
        || raw.get(),
        NoopActuator::new(),
        ChannelTiming::default(),
    );

    for _ in 0..DEMAND_MAX {
        channel.tick();
    }
    assert!(channel.has_demand());

    raw.set(false);
    for _ in 0..10 {
        channel.tick();
    }
    assert!(!channel.has_demand());
}
