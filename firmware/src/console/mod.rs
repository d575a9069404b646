//! Operator console served over USB CDC.
//!
//! The USB task moves raw packets between the host and two frame queues. The
//! console task reassembles bytes into lines, runs them through the shared
//! `CommandExecutor`, and queues the rendered response back out.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::fmt::{self, Write as _};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use heating_core::console::{CommandExecutor, ConsoleHost, EventLog, StatusSnapshot};

use crate::{status, telemetry};

/// Longest command line accepted, excluding the terminator.
pub const MAX_LINE_LEN: usize = 96;
/// Size of one queued USB frame.
pub const FRAME_CAPACITY: usize = 64;
/// Outgoing frames stay one byte under the packet size so every write ends
/// the bulk transfer without a zero-length packet.
pub const TX_CHUNK_LEN: usize = FRAME_CAPACITY - 1;
/// Upper bound on one rendered response; fits a full `log 64`.
pub const RESPONSE_CAPACITY: usize = 4096;
/// Line terminator sent to the serial terminal.
pub const NEWLINE: &str = "\r\n";

const QUEUE_DEPTH: usize = 8;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

pub type ConsoleFrame = Vec<u8, FRAME_CAPACITY>;
pub type ConsoleQueue = Channel<CriticalSectionRawMutex, ConsoleFrame, QUEUE_DEPTH>;
pub type Line = String<MAX_LINE_LEN>;
pub type Response = String<RESPONSE_CAPACITY>;

/// Packets received from the host.
pub static CONSOLE_RX: ConsoleQueue = Channel::new();
/// Response frames waiting for the host.
pub static CONSOLE_TX: ConsoleQueue = Channel::new();

/// Errors raised while assembling an input line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineError {
    /// The line outgrew [`MAX_LINE_LEN`]; input is dropped until the next
    /// terminator.
    Overflow,
    InvalidUtf8,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Overflow => write!(f, "line too long (max {MAX_LINE_LEN} bytes)"),
            LineError::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

/// Byte-at-a-time line editor with backspace support.
#[derive(Default)]
pub struct LineAssembler {
    buffer: Vec<u8, MAX_LINE_LEN>,
    discarding: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feeds one byte, returning a line once CR or LF completes it.
    ///
    /// Empty lines (including the LF of a CRLF pair) produce nothing.
    pub fn push(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match byte {
            b'\r' | b'\n' => {
                if core::mem::take(&mut self.discarding) || self.buffer.is_empty() {
                    self.buffer.clear();
                    return Ok(None);
                }
                let bytes = core::mem::take(&mut self.buffer);
                Line::from_utf8(bytes)
                    .map(Some)
                    .map_err(|_| LineError::InvalidUtf8)
            }
            _ if self.discarding => Ok(None),
            BACKSPACE | DELETE => {
                self.buffer.pop();
                Ok(None)
            }
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }
}

/// Console host backed by the control task's published state.
///
/// Inputs and time are real on the board, so `demand` and `run` keep the
/// default "not available" behaviour.
pub struct FirmwareConsole;

impl ConsoleHost for FirmwareConsole {
    fn snapshot(&mut self) -> StatusSnapshot {
        status::snapshot()
    }

    fn recent_events(&mut self, count: usize) -> EventLog {
        telemetry::recent(count)
    }
}

/// Executes one line and renders the reply into `out`.
///
/// Blank lines render nothing. A reply that outgrows `out` is replaced by an
/// error line.
pub fn respond<H: ConsoleHost>(
    executor: &mut CommandExecutor<H>,
    line: &str,
    out: &mut Response,
) {
    out.clear();
    if line.trim().is_empty() {
        return;
    }

    let rendered = match executor.execute(line) {
        Ok(outcome) => outcome.write_response(out, NEWLINE),
        Err(err) => write!(out, "ERR {err}{NEWLINE}"),
    };

    if rendered.is_err() {
        out.clear();
        let _ = write!(out, "ERR response too long{NEWLINE}");
    }
}

/// Splits rendered text into frames for the USB task.
pub fn frames(text: &str) -> impl Iterator<Item = ConsoleFrame> + '_ {
    text.as_bytes()
        .chunks(TX_CHUNK_LEN)
        .filter_map(|chunk| ConsoleFrame::from_slice(chunk).ok())
}
