#![allow(dead_code)]

use core::cell::Cell;
use core::time::Duration;

use heating_core::{
    Actuator, Boiler, BoilerTiming, Channel, ChannelId, ChannelTiming, DemandSensor,
};

/// Raw demand input backed by a cell the test flips.
pub struct Input<'a>(pub &'a Cell<bool>);

impl DemandSensor for Input<'_> {
    fn sample(&mut self) -> bool {
        self.0.get()
    }
}

/// Actuator that mirrors its last command into a cell.
pub struct Relay<'a>(pub &'a Cell<bool>);

impl Actuator for Relay<'_> {
    fn drive(&mut self, energized: bool) {
        self.0.set(energized);
    }
}

pub type TestChannel<'a> = Channel<Input<'a>, Relay<'a>>;

pub fn channels<'a, const N: usize>(
    inputs: &'a [Cell<bool>; N],
    valves: &'a [Cell<bool>; N],
    timing: ChannelTiming,
) -> [TestChannel<'a>; N] {
    core::array::from_fn(move |index| {
        let id = ChannelId::from_index(index).expect("channel index in range");
        Channel::new(id, Input(&inputs[index]), Relay(&valves[index]), timing)
    })
}

pub fn boiler(fire: &Cell<bool>, timing: BoilerTiming) -> Boiler<Relay<'_>> {
    Boiler::new(Relay(fire), timing)
}

pub fn quick_valves() -> ChannelTiming {
    ChannelTiming::new(Duration::from_millis(3), Duration::from_millis(2))
}

pub fn cells<const N: usize>() -> [Cell<bool>; N] {
    core::array::from_fn(|_| Cell::new(false))
}
