//! Three zones on the default installation timings, walked tick by tick.

mod common;

use core::time::Duration;

use heating_core::config::DEMAND_MAX;
use heating_core::{
    Actuator, BoilerState, ChannelId, ControlState, Controller, ControllerConfig, DemandSensor,
    ValveMotion,
};

fn run_until<S, A, B>(controller: &mut Controller<'_, S, A, B>, now: &mut u32, tick: u32)
where
    S: DemandSensor,
    A: Actuator,
    B: Actuator,
{
    while *now < tick {
        controller.tick();
        *now += 1;
    }
}

#[test]
fn single_zone_call_for_heat_from_idle_to_idle() {
    let config = ControllerConfig::default().with_overrun(Duration::from_secs(2));
    let open_ticks = config.channel.open_ticks();
    let underrun_ticks = config.boiler.underrun_ticks();
    let overrun_ticks = config.boiler.overrun_ticks();

    let inputs = common::cells::<3>();
    let valves = common::cells::<3>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, config.channel);
    let mut boiler = common::boiler(&fire[0], config.boiler);
    let zone = ChannelId::new(0);
    let mut controller = Controller::new(&mut channels, &mut boiler, ChannelId::new(2))
        .expect("three channels");

    let mut now: u32 = 0;

    inputs[0].set(true);

    // Debounce.
    run_until(&mut controller, &mut now, u32::from(DEMAND_MAX) - 1);
    assert!(controller.demand_mask().is_empty());
    run_until(&mut controller, &mut now, u32::from(DEMAND_MAX));
    assert!(controller.demand_mask().contains(zone));
    assert_eq!(controller.state(), ControlState::Demand);
    assert!(valves[0].get());

    // Valve travel: the boiler is not asked to fire until the valve is open.
    let opened_at = u32::from(DEMAND_MAX) + open_ticks + 1;
    run_until(&mut controller, &mut now, opened_at - 1);
    assert_eq!(
        controller.channel(zone).map(|channel| channel.motion_state()),
        Some(ValveMotion::Opening)
    );
    assert_eq!(controller.boiler().state(), BoilerState::Idle);
    assert!(!controller.boiler().requested());

    run_until(&mut controller, &mut now, opened_at);
    assert!(controller.open_mask().contains(zone));
    assert!(controller.boiler().requested());
    assert_eq!(controller.boiler().state(), BoilerState::Underrun);

    // Underrun.
    let fired_at = opened_at + underrun_ticks;
    run_until(&mut controller, &mut now, fired_at - 1);
    assert_eq!(controller.boiler().state(), BoilerState::Underrun);
    assert!(!fire[0].get());

    run_until(&mut controller, &mut now, fired_at);
    assert_eq!(controller.boiler().state(), BoilerState::Demand);
    assert!(fire[0].get());

    // Demand ends: ten quiet samples drain the debounce.
    inputs[0].set(false);
    let released_at = fired_at + 10;
    run_until(&mut controller, &mut now, released_at - 1);
    assert_eq!(controller.state(), ControlState::Demand);
    run_until(&mut controller, &mut now, released_at);
    assert!(controller.demand_mask().is_empty());
    assert_eq!(controller.state(), ControlState::Cool);
    assert_eq!(controller.current_overrun(), zone);
    assert_eq!(controller.boiler().state(), BoilerState::Overrun);
    assert!(!fire[0].get());
    assert!(valves[0].get());

    // Overrun drains, then the next tick settles everything closed.
    let cooled_at = released_at + overrun_ticks;
    run_until(&mut controller, &mut now, cooled_at);
    assert_eq!(controller.boiler().state(), BoilerState::Idle);
    assert_eq!(controller.state(), ControlState::Cool);

    run_until(&mut controller, &mut now, cooled_at + 1);
    assert_eq!(controller.state(), ControlState::Idle);
    assert!(!valves[0].get());
    assert_eq!(
        controller.channel(zone).map(|channel| channel.motion_state()),
        Some(ValveMotion::Closing)
    );
}
