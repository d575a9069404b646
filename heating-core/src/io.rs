//! Boundary capabilities injected into channels and the boiler.
//!
//! The state machines never touch pins directly. Firmware wraps GPIO handles
//! in these traits, while the emulator and tests supply closures or shared
//! cells.

/// Source of a zone's raw, undebounced demand signal.
pub trait DemandSensor {
    /// Returns the current raw signal level.
    fn sample(&mut self) -> bool;
}

impl<F> DemandSensor for F
where
    F: FnMut() -> bool,
{
    fn sample(&mut self) -> bool {
        self()
    }
}

/// Fixed demand level, handy for zones that are wired permanently.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FixedDemand(pub bool);

impl DemandSensor for FixedDemand {
    fn sample(&mut self) -> bool {
        self.0
    }
}

/// Sink for an on/off actuator such as a valve motor relay or the boiler's
/// fire contact.
pub trait Actuator {
    /// Energizes (`true`) or releases (`false`) the actuator.
    fn drive(&mut self, energized: bool);
}

/// Actuator that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopActuator;

impl NoopActuator {
    /// Creates a new no-op actuator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Actuator for NoopActuator {
    fn drive(&mut self, _: bool) {}
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn drive(&mut self, energized: bool) {
        (**self).drive(energized);
    }
}
