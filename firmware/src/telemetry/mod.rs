#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Control event history for the firmware target.
//!
//! The control task feeds every tick through a `StatusMonitor`; the resulting
//! events land in a shared ring that the console reads for `log`, and each one
//! is mirrored to defmt (or stdout on the host) as it happens.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heating_core::Controller;
use heating_core::console::EventLog;
use heating_core::telemetry::{StatusMonitor, TelemetryRecord, TelemetryRecorder, Tick};

type SharedRecorder = Mutex<CriticalSectionRawMutex, RefCell<TelemetryRecorder>>;

static EVENT_LOG: SharedRecorder = Mutex::new(RefCell::new(TelemetryRecorder::new()));

/// Records this tick's events into the shared log and mirrors them out.
pub fn observe<S, A, B>(
    now: Tick,
    controller: &Controller<'_, S, A, B>,
    monitor: &mut StatusMonitor,
) {
    EVENT_LOG.lock(|log| record_and_mirror(now, controller, monitor, &mut log.borrow_mut()));
}

/// Copies up to `count` recent events, oldest first.
pub fn recent(count: usize) -> EventLog {
    EVENT_LOG.lock(|log| log.borrow().recent(count).copied().collect())
}

fn record_and_mirror<S, A, B>(
    now: Tick,
    controller: &Controller<'_, S, A, B>,
    monitor: &mut StatusMonitor,
    recorder: &mut TelemetryRecorder,
) -> usize {
    let emitted = monitor.observe(now, controller, recorder);
    if emitted > 0 {
        recorder.recent(emitted).for_each(emit_log);
    }
    emitted
}

#[cfg(target_os = "none")]
fn emit_log(record: &TelemetryRecord) {
    defmt::info!("telemetry:control {}", defmt::Display2Format(record));
}

#[cfg(not(target_os = "none"))]
fn emit_log(record: &TelemetryRecord) {
    println!("telemetry:control {record}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use heating_core::io::FixedDemand;
    use heating_core::telemetry::ControlEvent;
    use heating_core::{
        Boiler, BoilerTiming, Channel, ChannelId, ChannelTiming, ControlState, NoopActuator,
    };

    fn quick_boiler() -> Boiler<NoopActuator> {
        Boiler::new(
            NoopActuator,
            BoilerTiming::new(Duration::from_millis(3), Duration::from_millis(5)),
        )
    }

    fn quick_timing() -> ChannelTiming {
        ChannelTiming::new(Duration::from_millis(2), Duration::from_millis(2))
    }

    #[test]
    fn demand_onset_is_recorded_once() {
        let mut channels = [Channel::new(
            ChannelId::new(0),
            FixedDemand(true),
            NoopActuator,
            quick_timing(),
        )];
        let mut boiler = quick_boiler();
        let mut controller =
            Controller::new(&mut channels, &mut boiler, ChannelId::new(0)).expect("one channel");
        let mut monitor = StatusMonitor::new();
        let mut recorder = TelemetryRecorder::new();

        let mut emitted = 0;
        for now in 1..=511 {
            controller.tick();
            emitted += record_and_mirror(now, &controller, &mut monitor, &mut recorder);
        }
        assert_eq!(emitted, 0);

        controller.tick();
        assert!(record_and_mirror(512, &controller, &mut monitor, &mut recorder) > 0);
        assert!(recorder.oldest_first().any(|record| {
            record.tick == 512 && record.event == ControlEvent::StateChanged(ControlState::Demand)
        }));

        controller.tick();
        assert_eq!(record_and_mirror(513, &controller, &mut monitor, &mut recorder), 0);
    }

    #[test]
    fn shared_log_serves_recent_events() {
        let mut channels = [Channel::new(
            ChannelId::new(0),
            FixedDemand(true),
            NoopActuator,
            quick_timing(),
        )];
        let mut boiler = quick_boiler();
        let mut controller =
            Controller::new(&mut channels, &mut boiler, ChannelId::new(0)).expect("one channel");
        let mut monitor = StatusMonitor::new();

        for now in 1..=600 {
            controller.tick();
            observe(now, &controller, &mut monitor);
        }

        let events = recent(2);
        assert_eq!(events.len(), 2);
        assert!(events[0].id < events[1].id);
        assert!(recent(usize::MAX).len() >= 2);
    }
}
