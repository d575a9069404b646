use embassy_time::{Duration, Ticker};
use heating_core::indicator::IndicatorClock;
use heating_core::plant::DEFAULT_OVERRUN_ZONE;
use heating_core::telemetry::StatusMonitor;
use heating_core::{Boiler, Channel, Controller, ControllerConfig};

use crate::board::Board;
use crate::{status, telemetry};

/// One control tick.
const TICK_PERIOD: Duration = Duration::from_millis(1);

#[embassy_executor::task]
pub async fn run(board: Board) -> ! {
    let Board {
        zones,
        mut valve_leds,
        boiler_relay,
        mut boiler_led,
        mut status_led,
        mut watchdog,
    } = board;

    let config = ControllerConfig::default();
    let mut channels =
        zones.map(|zone| Channel::new(zone.id, zone.demand, zone.valve, config.channel));
    let mut boiler = Boiler::new(boiler_relay, config.boiler);

    let mut controller = match Controller::new(&mut channels, &mut boiler, DEFAULT_OVERRUN_ZONE) {
        Ok(controller) => controller,
        Err(err) => {
            // Outputs stay de-energized and the watchdog is never started.
            defmt::error!("control: invalid wiring: {}", defmt::Display2Format(&err));
            loop {
                core::future::pending::<()>().await;
            }
        }
    };

    defmt::info!(
        "control: {} zones, default overrun via {}",
        controller.channels().len(),
        defmt::Display2Format(&controller.default_overrun())
    );

    let mut monitor = StatusMonitor::new();
    let mut indicator = IndicatorClock::new();
    let mut ticker = Ticker::every(TICK_PERIOD);
    let mut now: u64 = 0;

    watchdog.unleash();

    loop {
        ticker.next().await;

        controller.tick();
        now += 1;

        telemetry::observe(now, &controller, &mut monitor);
        status::publish(now, &controller);

        let step = indicator.advance();
        for (led, channel) in valve_leds.iter_mut().zip(controller.channels()) {
            led.set(indicator.valve_led(channel.motion_state()));
        }
        boiler_led.set(indicator.boiler_led(controller.boiler().state()));
        status_led.set(indicator.status_led(controller.state()));

        if step.pet_watchdog {
            watchdog.pet();
        }
    }
}
