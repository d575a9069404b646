use std::io;

use heating_core::console::{CommandExecutor, CommandOutcome};
use heating_core::plant;
use heating_core::telemetry::Tick;

use crate::rig::{self, Simulation};
use crate::transcript::{TranscriptLogger, TranscriptRole};

const NEWLINE: &str = "\n";

/// Console front-end over a running simulation.
///
/// Lines are either console commands, shared with the firmware, or the
/// emulator-only `thermostat <zone> on|off` which flips a simulated contact.
pub struct Session<'a> {
    executor: CommandExecutor<Simulation<'a>>,
    transcript: Option<TranscriptLogger>,
    next_event: u32,
}

impl<'a> Session<'a> {
    pub fn new(simulation: Simulation<'a>, transcript: Option<TranscriptLogger>) -> Self {
        let next_event = simulation.next_event_id();
        Self {
            executor: CommandExecutor::new(simulation),
            transcript,
            next_event,
        }
    }

    /// Handles one operator line and returns everything to print.
    ///
    /// Events recorded while the command ran come first, then the response.
    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.executor.host().now();
        self.record(now, TranscriptRole::Host, trimmed)?;

        let response = if let Some(rest) = strip_keyword(trimmed, "thermostat") {
            self.handle_thermostat(rest)
        } else {
            match self.executor.execute(trimmed) {
                Ok(outcome) => render(&outcome),
                Err(err) => vec![format!("ERR {err}")],
            }
        };

        let mut lines = self.drain_events()?;
        let now = self.executor.host().now();
        for line in &response {
            self.record(now, TranscriptRole::Emulator, line)?;
        }
        lines.extend(response);
        Ok(lines)
    }

    fn handle_thermostat(&mut self, args: &str) -> Vec<String> {
        let mut words = args.split_whitespace();
        let (Some(zone), Some(level), None) = (words.next(), words.next(), words.next()) else {
            return vec!["ERR usage: thermostat <zone> on|off".to_string()];
        };
        let Some(id) = rig::zone(zone) else {
            return vec!["ERR unknown zone".to_string()];
        };
        let calling = if level.eq_ignore_ascii_case("on") {
            true
        } else if level.eq_ignore_ascii_case("off") {
            false
        } else {
            return vec!["ERR usage: thermostat <zone> on|off".to_string()];
        };

        match self.executor.host_mut().set_thermostat(id, calling) {
            Ok(()) => vec![format!(
                "OK thermostat {} {}",
                plant::tag_for(id),
                if calling { "on" } else { "off" }
            )],
            Err(err) => vec![format!("ERR {err}")],
        }
    }

    fn drain_events(&mut self) -> io::Result<Vec<String>> {
        let simulation = self.executor.host();
        let mut lines = Vec::new();

        let mut events = simulation.events_since(self.next_event).peekable();
        if let Some(first) = events.peek() {
            let dropped = first.id.wrapping_sub(self.next_event);
            if dropped > 0 {
                lines.push(format!("({dropped} earlier events no longer buffered)"));
            }
        }
        lines.extend(events.map(ToString::to_string));

        let now = simulation.now();
        self.next_event = simulation.next_event_id();
        for line in &lines {
            self.record(now, TranscriptRole::Event, line)?;
        }
        Ok(lines)
    }

    fn record(&mut self, now: Tick, role: TranscriptRole, line: &str) -> io::Result<()> {
        match self.transcript.as_mut() {
            Some(transcript) => transcript.append_line(now, role, line),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn simulation(&self) -> &Simulation<'a> {
        self.executor.host()
    }
}

fn strip_keyword<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let head = line.get(..keyword.len())?;
    let rest = &line[keyword.len()..];
    (head.eq_ignore_ascii_case(keyword) && (rest.is_empty() || rest.starts_with(' ')))
        .then_some(rest)
}

fn render(outcome: &CommandOutcome) -> Vec<String> {
    let mut text = String::new();
    // Writing into a String cannot fail.
    let _ = outcome.write_response(&mut text, NEWLINE);
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::HostRig;
    use heating_core::{BoilerState, ChannelId, ControlState};

    #[test]
    fn events_precede_the_acknowledgement() {
        let mut rig = HostRig::default();
        let mut session = Session::new(rig.simulation().expect("wiring"), None);

        assert_eq!(
            session.handle_command("demand W on").expect("no transcript"),
            ["OK demand W on"]
        );

        let lines = session.handle_command("run 1s").expect("no transcript");
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#0 t=512ms demand ---- -> W---"));
        assert_eq!(lines[1], "#1 t=512ms state demand");
        assert_eq!(lines[2], "#2 t=512ms valve W opening");
        assert_eq!(lines[3], "OK t=1000ms");
    }

    #[test]
    fn thermostat_and_console_override_interact() {
        let mut rig = HostRig::default();
        let mut session = Session::new(rig.simulation().expect("wiring"), None);

        assert_eq!(
            session.handle_command("thermostat 3 on").expect("no transcript"),
            ["OK thermostat 3 on"]
        );
        session.handle_command("demand 3 off").expect("no transcript");
        session.handle_command("run 2s").expect("no transcript");
        assert!(session.simulation().controller().demand_mask().is_empty());

        session.handle_command("demand 3 auto").expect("no transcript");
        session.handle_command("run 14s").expect("no transcript");
        let controller = session.simulation().controller();
        assert!(controller.demand_mask().contains(ChannelId::new(3)));
        assert_eq!(controller.boiler().state(), BoilerState::Demand);
        assert_eq!(controller.state(), ControlState::Demand);
    }

    #[test]
    fn errors_are_reported_inline() {
        let mut rig = HostRig::default();
        let mut session = Session::new(rig.simulation().expect("wiring"), None);

        let lines = session.handle_command("demand 7 on").expect("no transcript");
        assert_eq!(lines, ["ERR unknown zone"]);

        let lines = session.handle_command("thermostat W maybe").expect("no transcript");
        assert_eq!(lines, ["ERR usage: thermostat <zone> on|off"]);

        let lines = session.handle_command("boil").expect("no transcript");
        assert!(lines[0].starts_with("ERR syntax error at column"));
    }

    #[test]
    fn keyword_match_requires_word_boundary() {
        assert_eq!(strip_keyword("thermostat W on", "thermostat"), Some(" W on"));
        assert_eq!(strip_keyword("Thermostat", "thermostat"), Some(""));
        assert_eq!(strip_keyword("thermostats", "thermostat"), None);
        assert_eq!(strip_keyword("help", "thermostat"), None);
    }
}
