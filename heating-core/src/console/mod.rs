//! Operator console shared by the emulator and the firmware.
//!
//! [`grammar`] turns a line into a [`grammar::Command`], [`commands`] runs it
//! against a [`commands::ConsoleHost`], and [`status`] keeps the textual
//! rendering of controller state identical across front-ends.

pub mod commands;
pub mod grammar;
pub mod status;

pub use commands::{
    CommandError, CommandExecutor, CommandOutcome, ConsoleHost, DEFAULT_LOG_COUNT, EventLog,
    HELP_TOPICS,
};
pub use grammar::{Command, DemandOverride, ParseError, parse, parse_duration};
pub use status::{ChannelStatus, StatusFormatter, StatusSnapshot};
