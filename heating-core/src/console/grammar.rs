//! Console command grammar.
//!
//! ```text
//! status
//! help [topic]
//! log [count]
//! demand <zone> on|off|auto
//! run <duration>            duration = <n>ms | <n>s | <n>m
//! ```
//!
//! Keywords are case-insensitive. Parsing works directly on the line with
//! `winnow` combinators and never allocates. Once a keyword and its separator
//! have matched, argument errors are committed so the reported offset points
//! at the bad argument.

use core::fmt;
use core::time::Duration;

use winnow::ModalResult;
use winnow::ascii::{Caseless, digit1, space0, space1};
use winnow::combinator::{alt, cut_err, eof, opt, preceded};
use winnow::prelude::*;
use winnow::token::take_while;

/// Structured commands produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Status,
    Help { topic: Option<&'a str> },
    Log { count: Option<u16> },
    Demand { zone: &'a str, setting: DemandOverride },
    Run(Duration),
}

/// Operator override applied to a zone's raw demand signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DemandOverride {
    /// Force the raw signal high.
    On,
    /// Force the raw signal low.
    Off,
    /// Follow the zone's own input again.
    Auto,
}

impl fmt::Display for DemandOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DemandOverride::On => "on",
            DemandOverride::Off => "off",
            DemandOverride::Auto => "auto",
        })
    }
}

/// Syntax error, located by byte offset into the submitted line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at column {}", self.offset + 1)
    }
}

/// Parse a console command from the provided line.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    command.parse(line).map_err(|err| ParseError {
        offset: err.offset(),
    })
}

/// Parse a standalone duration such as `600ms`, `10s`, or `5m`.
pub fn parse_duration(text: &str) -> Result<Duration, ParseError> {
    duration.parse(text.trim()).map_err(|err| ParseError {
        offset: err.offset(),
    })
}

fn command<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    space0.parse_next(input)?;
    let command = alt((status, help, log, demand, run)).parse_next(input)?;
    (space0, eof).parse_next(input)?;
    Ok(command)
}

fn status<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    Caseless("status").value(Command::Status).parse_next(input)
}

fn help<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded(Caseless("help"), opt(preceded(space1, word)))
        .map(|topic| Command::Help { topic })
        .parse_next(input)
}

fn log<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded(
        Caseless("log"),
        opt(preceded(space1, digit1.try_map(str::parse::<u16>))),
    )
    .map(|count| Command::Log { count })
    .parse_next(input)
}

fn demand<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded(
        (Caseless("demand"), space1),
        cut_err((word, space1, setting)),
    )
    .map(|(zone, _, setting)| Command::Demand { zone, setting })
    .parse_next(input)
}

fn run<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded((Caseless("run"), space1), cut_err(duration))
        .map(Command::Run)
        .parse_next(input)
}

fn setting(input: &mut &str) -> ModalResult<DemandOverride> {
    alt((
        Caseless("on").value(DemandOverride::On),
        Caseless("off").value(DemandOverride::Off),
        Caseless("auto").value(DemandOverride::Auto),
    ))
    .parse_next(input)
}

#[derive(Copy, Clone)]
enum Unit {
    Millis,
    Seconds,
    Minutes,
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    let amount = digit1.try_map(str::parse::<u64>).parse_next(input)?;
    let unit = alt((
        Caseless("ms").value(Unit::Millis),
        Caseless("m").value(Unit::Minutes),
        Caseless("s").value(Unit::Seconds),
    ))
    .parse_next(input)?;

    Ok(match unit {
        Unit::Millis => Duration::from_millis(amount),
        Unit::Seconds => Duration::from_secs(amount),
        Unit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
    })
}

fn word<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)
}
