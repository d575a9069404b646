//! GPIO bindings for the reference board.
//!
//! Zones are wired in `heating_core::plant::ALL_ZONES` order:
//!
//! | zone | demand | valve | LED  |
//! |------|--------|-------|------|
//! | W    | PB4    | PA8   | PB0  |
//! | 1    | PB3    | PA9   | PB1  |
//! | 2    | PB5    | PA10  | PB2  |
//! | 3    | PB6    | PA15  | PB10 |
//!
//! The boiler relay is PC6 with its LED on PB11; the status LED is PA5.
//! Thermostat contacts read high while calling for heat; relays and LEDs are
//! active high.

use embassy_stm32::Peri;
use embassy_stm32::gpio::{Input, Level, Output, Pin, Pull, Speed};
use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;
use heating_core::plant::ZONE_COUNT;
use heating_core::{Actuator, ChannelId, DemandSensor};

/// Watchdog period. The indicator pets it every 3.2 s.
pub const WATCHDOG_TIMEOUT_US: u32 = 5_000_000;

/// Thermostat input for one zone.
pub struct DemandPin(Input<'static>);

impl DemandPin {
    pub fn new(pin: Peri<'static, impl Pin>) -> Self {
        Self(Input::new(pin, Pull::Down))
    }
}

impl DemandSensor for DemandPin {
    fn sample(&mut self) -> bool {
        self.0.is_high()
    }
}

/// Relay coil driver for a valve motor or the boiler fire contact.
pub struct RelayPin(Output<'static>);

impl RelayPin {
    pub fn new(pin: Peri<'static, impl Pin>) -> Self {
        Self(Output::new(pin, Level::Low, Speed::Low))
    }
}

impl Actuator for RelayPin {
    fn drive(&mut self, energized: bool) {
        self.0.set_level(Level::from(energized));
    }
}

/// Indicator LED output.
pub struct Led(Output<'static>);

impl Led {
    pub fn new(pin: Peri<'static, impl Pin>) -> Self {
        Self(Output::new(pin, Level::Low, Speed::Low))
    }

    pub fn set(&mut self, lit: bool) {
        self.0.set_level(Level::from(lit));
    }
}

/// Inputs and outputs controlled by one channel.
pub struct ZoneIo {
    pub id: ChannelId,
    pub demand: DemandPin,
    pub valve: RelayPin,
}

impl ZoneIo {
    pub fn new(
        id: ChannelId,
        demand: Peri<'static, impl Pin>,
        valve: Peri<'static, impl Pin>,
    ) -> Self {
        Self {
            id,
            demand: DemandPin::new(demand),
            valve: RelayPin::new(valve),
        }
    }
}

/// Everything the control task owns.
pub struct Board {
    pub zones: [ZoneIo; ZONE_COUNT],
    pub valve_leds: [Led; ZONE_COUNT],
    pub boiler_relay: RelayPin,
    pub boiler_led: Led,
    pub status_led: Led,
    pub watchdog: IndependentWatchdog<'static, IWDG>,
}
