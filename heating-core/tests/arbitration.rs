mod common;

use core::time::Duration;

use heating_core::config::DEMAND_MAX;
use heating_core::{
    BoilerState, BoilerTiming, ChannelId, ChannelTiming, ControlState, Controller, ValveMotion,
};

fn boiler_timing(overrun_ms: u64) -> BoilerTiming {
    BoilerTiming::new(Duration::from_millis(2), Duration::from_millis(overrun_ms))
}

#[test]
fn overrun_goes_to_highest_open_channel_not_default() {
    let inputs = common::cells::<3>();
    let valves = common::cells::<3>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, common::quick_valves());
    let mut boiler = common::boiler(&fire[0], boiler_timing(40));
    let a = ChannelId::new(0);
    let c = ChannelId::new(2);
    let mut controller = Controller::new(&mut channels, &mut boiler, a).expect("wiring");

    inputs[0].set(true);
    inputs[2].set(true);
    while controller.open_mask().bits() != 0b101 {
        controller.tick();
    }
    assert!(valves[0].get() && valves[2].get());
    assert!(!valves[1].get());

    inputs[0].set(false);
    inputs[2].set(false);
    while !controller.demand_mask().is_empty() {
        controller.tick();
    }

    assert_eq!(controller.current_overrun(), c);
    assert_eq!(controller.default_overrun(), a);
    assert_eq!(controller.state(), ControlState::Cool);

    // C vents, A is released once C is confirmed open.
    assert!(valves[2].get());
    assert!(!valves[0].get());
    assert_eq!(
        controller.channel(a).map(|channel| channel.motion_state()),
        Some(ValveMotion::Closing)
    );
}

#[test]
fn demanded_valve_takes_over_from_idle_open_valve() {
    let inputs = common::cells::<2>();
    let valves = common::cells::<2>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, common::quick_valves());
    let mut boiler = common::boiler(&fire[0], boiler_timing(2_000));
    let mut controller =
        Controller::new(&mut channels, &mut boiler, ChannelId::new(1)).expect("wiring");

    inputs[0].set(true);
    while !controller.boiler().is_firing() {
        controller.tick();
    }

    // Zone 0 goes quiet while zone 1 starts asking; the long overrun keeps
    // valve 0 venting until zone 1 is debounced.
    inputs[0].set(false);
    inputs[1].set(true);
    for _ in 0..DEMAND_MAX {
        controller.tick();
    }
    assert_eq!(controller.demand_mask().bits(), 0b10);

    // Valve 0 stays open until valve 1 has opened, so the boiler never
    // dead-heads.
    assert_eq!(
        controller.channel(ChannelId::new(0)).map(|channel| channel.motion_state()),
        Some(ValveMotion::Open)
    );

    while controller.open_mask().bits() & 0b10 == 0 {
        assert!(controller.open_mask().bits() & 0b01 != 0);
        controller.tick();
    }
    assert_eq!(
        controller.channel(ChannelId::new(0)).map(|channel| channel.motion_state()),
        Some(ValveMotion::Closing)
    );
    assert_eq!(controller.state(), ControlState::Demand);
}

#[test]
fn valve_still_travelling_is_closed_when_its_demand_leaves() {
    let inputs = common::cells::<2>();
    let valves = common::cells::<2>();
    let fire = common::cells::<1>();
    let slow = ChannelTiming::new(Duration::from_millis(2_000), Duration::from_millis(2));
    let mut channels = common::channels(&inputs, &valves, slow);
    let mut boiler = common::boiler(&fire[0], boiler_timing(40));
    let zone = ChannelId::new(1);
    let mut controller =
        Controller::new(&mut channels, &mut boiler, ChannelId::new(0)).expect("wiring");

    inputs[0].set(true);
    inputs[1].set(true);
    for _ in 0..DEMAND_MAX {
        controller.tick();
    }
    assert_eq!(controller.demand_mask().bits(), 0b11);
    assert_eq!(
        controller.channel(zone).map(|channel| channel.motion_state()),
        Some(ValveMotion::Opening)
    );
    assert!(valves[1].get());

    // Zone 0 keeps calling, so zone 1's half-finished open is abandoned.
    inputs[1].set(false);
    while controller.demand_mask().contains(zone) {
        controller.tick();
    }

    assert_eq!(controller.demand_mask().bits(), 0b01);
    assert!(controller.open_mask().is_empty());
    assert_eq!(controller.state(), ControlState::Demand);
    assert_eq!(
        controller.channel(zone).map(|channel| channel.motion_state()),
        Some(ValveMotion::Closing)
    );
    assert!(!valves[1].get());
    assert!(valves[0].get());
}

#[test]
fn idle_controller_closes_everything_each_tick() {
    let inputs = common::cells::<2>();
    let valves = common::cells::<2>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, common::quick_valves());
    let mut boiler = common::boiler(&fire[0], boiler_timing(40));
    let mut controller =
        Controller::new(&mut channels, &mut boiler, ChannelId::new(0)).expect("wiring");

    valves[0].set(true);
    valves[1].set(true);
    controller.tick();

    assert_eq!(controller.state(), ControlState::Idle);
    assert!(!valves[0].get() && !valves[1].get());
    assert_eq!(controller.boiler().state(), BoilerState::Idle);
}
