//! Simulated plant: thermostat switches, valve relays and the boiler contact.
//!
//! [`HostRig`] owns the four catalog channels and the boiler; a
//! [`Simulation`] borrows them into a [`Controller`] and steps it in simulated
//! milliseconds. Switches and relays are shared cells so the session, the
//! scenarios and tests can poke inputs and read outputs while the controller
//! holds the channels.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use heating_core::config::ticks_for;
use heating_core::console::{CommandError, ConsoleHost, DemandOverride, EventLog, StatusSnapshot};
use heating_core::plant::{self, ALL_ZONES, DEFAULT_OVERRUN_ZONE, ZONE_COUNT};
use heating_core::telemetry::{StatusMonitor, TelemetryRecord, TelemetryRecorder, Tick};
use heating_core::{
    Actuator, Boiler, Channel, ChannelId, ConfigError, Controller, ControllerConfig, DemandSensor,
};

/// Raw demand for one zone: the simulated thermostat plus an operator override.
#[derive(Debug, Default)]
pub struct ZoneSignal {
    thermostat: Cell<bool>,
    forced: Cell<Option<bool>>,
}

impl ZoneSignal {
    #[must_use]
    pub fn level(&self) -> bool {
        self.forced.get().unwrap_or(self.thermostat.get())
    }
}

/// Sensor handed to a channel; reads the shared [`ZoneSignal`].
pub struct ZoneInput(Rc<ZoneSignal>);

impl DemandSensor for ZoneInput {
    fn sample(&mut self) -> bool {
        self.0.level()
    }
}

/// Relay whose contact state is visible outside the controller.
pub struct SimulatedRelay(Rc<Cell<bool>>);

impl Actuator for SimulatedRelay {
    fn drive(&mut self, energized: bool) {
        self.0.set(energized);
    }
}

type RigChannel = Channel<ZoneInput, SimulatedRelay>;

/// Owns the simulated hardware for the reference four-zone installation.
pub struct HostRig {
    channels: [RigChannel; ZONE_COUNT],
    boiler: Boiler<SimulatedRelay>,
    signals: [Rc<ZoneSignal>; ZONE_COUNT],
    valve_relays: [Rc<Cell<bool>>; ZONE_COUNT],
    fire_relay: Rc<Cell<bool>>,
}

impl HostRig {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let signals: [Rc<ZoneSignal>; ZONE_COUNT] = Default::default();
        let valve_relays: [Rc<Cell<bool>>; ZONE_COUNT] = Default::default();
        let fire_relay = Rc::new(Cell::new(false));

        let channels = ALL_ZONES.map(|zone| {
            let index = zone.id.index();
            Channel::new(
                zone.id,
                ZoneInput(Rc::clone(&signals[index])),
                SimulatedRelay(Rc::clone(&valve_relays[index])),
                config.channel,
            )
        });
        let boiler = Boiler::new(SimulatedRelay(Rc::clone(&fire_relay)), config.boiler);

        Self {
            channels,
            boiler,
            signals,
            valve_relays,
            fire_relay,
        }
    }

    /// Wires the rig into a controller, starting from the boot state.
    pub fn simulation(&mut self) -> Result<Simulation<'_>, ConfigError> {
        let signals = self.signals.clone();
        let valve_relays = self.valve_relays.clone();
        let fire_relay = Rc::clone(&self.fire_relay);
        let controller = Controller::new(&mut self.channels, &mut self.boiler, DEFAULT_OVERRUN_ZONE)?;

        Ok(Simulation {
            controller,
            signals,
            valve_relays,
            fire_relay,
            monitor: StatusMonitor::new(),
            recorder: TelemetryRecorder::new(),
            now: 0,
        })
    }
}

impl Default for HostRig {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

/// Controller plus its observers, stepped in simulated time.
pub struct Simulation<'a> {
    controller: Controller<'a, ZoneInput, SimulatedRelay, SimulatedRelay>,
    signals: [Rc<ZoneSignal>; ZONE_COUNT],
    valve_relays: [Rc<Cell<bool>>; ZONE_COUNT],
    fire_relay: Rc<Cell<bool>>,
    monitor: StatusMonitor,
    recorder: TelemetryRecorder,
    now: Tick,
}

impl<'a> Simulation<'a> {
    /// Runs a single control tick and records what changed.
    pub fn step(&mut self) {
        self.controller.tick();
        self.now += 1;
        self.monitor
            .observe(self.now, &self.controller, &mut self.recorder);
    }

    /// Sets the simulated thermostat contact for a zone.
    pub fn set_thermostat(&mut self, zone: ChannelId, calling: bool) -> Result<(), CommandError> {
        self.signal(zone)?.thermostat.set(calling);
        Ok(())
    }

    #[must_use]
    pub fn now(&self) -> Tick {
        self.now
    }

    #[must_use]
    pub fn valve_energized(&self, zone: ChannelId) -> bool {
        self.valve_relays
            .get(zone.index())
            .is_some_and(|relay| relay.get())
    }

    #[must_use]
    pub fn boiler_firing(&self) -> bool {
        self.fire_relay.get()
    }

    #[must_use]
    pub fn controller(&self) -> &Controller<'a, ZoneInput, SimulatedRelay, SimulatedRelay> {
        &self.controller
    }

    /// Records with an id at or after `first`, oldest first.
    pub fn events_since(&self, first: u32) -> impl Iterator<Item = &TelemetryRecord> {
        self.recorder
            .oldest_first()
            .filter(move |record| record.id >= first)
    }

    /// Id the next recorded event will receive.
    #[must_use]
    pub fn next_event_id(&self) -> u32 {
        self.recorder.total()
    }

    fn signal(&self, zone: ChannelId) -> Result<&ZoneSignal, CommandError> {
        self.signals
            .get(zone.index())
            .map(Rc::as_ref)
            .ok_or(CommandError::UnknownZone)
    }
}

impl ConsoleHost for Simulation<'_> {
    fn snapshot(&mut self) -> StatusSnapshot {
        StatusSnapshot::capture(self.now, &self.controller)
    }

    fn recent_events(&mut self, count: usize) -> EventLog {
        self.recorder.recent(count).copied().collect()
    }

    fn override_demand(
        &mut self,
        zone: ChannelId,
        setting: DemandOverride,
    ) -> Result<(), CommandError> {
        let forced = match setting {
            DemandOverride::On => Some(true),
            DemandOverride::Off => Some(false),
            DemandOverride::Auto => None,
        };
        self.signal(zone)?.forced.set(forced);
        Ok(())
    }

    fn advance(&mut self, duration: Duration) -> Result<Tick, CommandError> {
        for _ in 0..ticks_for(duration) {
            self.step();
        }
        Ok(self.now)
    }
}

/// Resolves a zone reference the way the console does.
#[must_use]
pub fn zone(text: &str) -> Option<ChannelId> {
    plant::zone_by_tag(text).map(|zone| zone.id)
}
