//! Console command dispatcher.
//!
//! Glues parsed commands to whatever hosts the controller. The executor owns
//! no controller state itself: reads and the optional emulator-only actions
//! go through [`ConsoleHost`], so the firmware and emulator share one
//! implementation and one set of response strings.

use core::fmt;
use core::time::Duration;

use heapless::Vec;

use crate::channel::ChannelId;
use crate::plant;
use crate::telemetry::{TELEMETRY_CAPACITY, TelemetryRecord, Tick};

use super::grammar::{self, Command, DemandOverride};
use super::status::{StatusFormatter, StatusSnapshot};

/// Number of events `log` prints when no count is given.
pub const DEFAULT_LOG_COUNT: usize = 8;

/// Help text per command, in the order `help` lists them.
pub const HELP_TOPICS: [(&str, &str); 5] = [
    ("status", "status                     show controller, valve and boiler state"),
    ("log", "log [count]                show the most recent control events"),
    ("demand", "demand <zone> on|off|auto  override a zone's demand input"),
    ("run", "run <n>ms|<n>s|<n>m        advance simulated time"),
    ("help", "help [topic]               list commands or describe one"),
];

/// Events copied out of the host's history for the `log` command.
pub type EventLog = Vec<TelemetryRecord, TELEMETRY_CAPACITY>;

/// Platform hook the executor drives.
///
/// `override_demand` and `advance` only make sense where time and inputs are
/// simulated; the defaults report them as unsupported.
pub trait ConsoleHost {
    /// Current controller status.
    fn snapshot(&mut self) -> StatusSnapshot;

    /// Up to `count` most recent events, oldest first.
    fn recent_events(&mut self, count: usize) -> EventLog;

    /// Applies an operator override to a zone's raw demand input.
    fn override_demand(
        &mut self,
        zone: ChannelId,
        setting: DemandOverride,
    ) -> Result<(), CommandError> {
        let _ = (zone, setting);
        Err(CommandError::Unsupported("demand"))
    }

    /// Runs the control loop for `duration`, returning the tick reached.
    fn advance(&mut self, duration: Duration) -> Result<Tick, CommandError> {
        let _ = duration;
        Err(CommandError::Unsupported("run"))
    }
}

/// Command execution successes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Status(StatusSnapshot),
    Help(Option<&'static str>),
    Log(EventLog),
    DemandSet {
        zone: ChannelId,
        setting: DemandOverride,
    },
    Advanced {
        now: Tick,
    },
}

impl CommandOutcome {
    /// Renders the response, terminating each line with `newline`.
    pub fn write_response<W: fmt::Write>(&self, writer: &mut W, newline: &str) -> fmt::Result {
        match self {
            CommandOutcome::Status(snapshot) => {
                StatusFormatter::new(snapshot).write_all(writer, newline)
            }
            CommandOutcome::Help(Some(text)) => {
                writer.write_str(text)?;
                writer.write_str(newline)
            }
            CommandOutcome::Help(None) => {
                for (_, text) in HELP_TOPICS {
                    writer.write_str(text)?;
                    writer.write_str(newline)?;
                }
                Ok(())
            }
            CommandOutcome::Log(records) if records.is_empty() => {
                writer.write_str("no events")?;
                writer.write_str(newline)
            }
            CommandOutcome::Log(records) => {
                for record in records {
                    write!(writer, "{record}{newline}")?;
                }
                Ok(())
            }
            CommandOutcome::DemandSet { zone, setting } => {
                write!(
                    writer,
                    "OK demand {} {setting}{newline}",
                    plant::tag_for(*zone)
                )
            }
            CommandOutcome::Advanced { now } => write!(writer, "OK t={now}ms{newline}"),
        }
    }
}

/// Errors surfaced while executing a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    Parse(grammar::ParseError),
    /// The zone reference matched neither a tag nor a name.
    UnknownZone,
    /// `help` was asked about a command that does not exist.
    UnknownTopic,
    /// The host cannot perform the named command.
    Unsupported(&'static str),
}

impl From<grammar::ParseError> for CommandError {
    fn from(error: grammar::ParseError) -> Self {
        Self::Parse(error)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(error) => write!(f, "{error}"),
            CommandError::UnknownZone => f.write_str("unknown zone"),
            CommandError::UnknownTopic => f.write_str("unknown help topic"),
            CommandError::Unsupported(command) => {
                write!(f, "`{command}` is not available on this controller")
            }
        }
    }
}

/// Dispatches console commands to a [`ConsoleHost`].
pub struct CommandExecutor<H> {
    host: H,
}

impl<H> CommandExecutor<H> {
    /// Creates a new executor around the provided host.
    pub const fn new(host: H) -> Self {
        Self { host }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the executor and yields the inner host.
    #[must_use]
    pub fn into_inner(self) -> H {
        self.host
    }
}

impl<H: ConsoleHost> CommandExecutor<H> {
    /// Parses and executes a console command.
    pub fn execute(&mut self, line: &str) -> Result<CommandOutcome, CommandError> {
        let command = grammar::parse(line)?;
        self.dispatch(command)
    }

    fn dispatch(&mut self, command: Command<'_>) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::Status => Ok(CommandOutcome::Status(self.host.snapshot())),
            Command::Help { topic: None } => Ok(CommandOutcome::Help(None)),
            Command::Help { topic: Some(topic) } => HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(topic))
                .map(|(_, text)| CommandOutcome::Help(Some(*text)))
                .ok_or(CommandError::UnknownTopic),
            Command::Log { count } => {
                let count = count.map_or(DEFAULT_LOG_COUNT, usize::from);
                let count = count.min(TELEMETRY_CAPACITY);
                Ok(CommandOutcome::Log(self.host.recent_events(count)))
            }
            Command::Demand { zone, setting } => {
                let zone = plant::zone_by_tag(zone)
                    .ok_or(CommandError::UnknownZone)?
                    .id;
                self.host.override_demand(zone, setting)?;
                Ok(CommandOutcome::DemandSet { zone, setting })
            }
            Command::Run(duration) => {
                let now = self.host.advance(duration)?;
                Ok(CommandOutcome::Advanced { now })
            }
        }
    }
}
