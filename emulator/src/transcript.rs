use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use heating_core::telemetry::Tick;

/// Who produced a transcript line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptRole {
    Host,
    Emulator,
    Event,
}

impl TranscriptRole {
    fn prefix(self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
            TranscriptRole::Event => "EVT *",
        }
    }
}

/// Append-only session log, timestamped in simulated milliseconds.
pub struct TranscriptLogger<W: Write = BufWriter<File>> {
    writer: W,
}

impl TranscriptLogger {
    /// Creates (or truncates) the transcript file and writes its header.
    pub fn create(path: &Path, title: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Self::with_writer(BufWriter::new(file), title)
    }
}

impl<W: Write> TranscriptLogger<W> {
    pub fn with_writer(writer: W, title: &str) -> io::Result<Self> {
        let mut logger = Self { writer };
        logger.write_header(title)?;
        Ok(logger)
    }

    fn write_header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.writer, "# {title}")?;
        writeln!(self.writer, "# Timestamps are simulated milliseconds since boot")?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    pub fn append_line(&mut self, now: Tick, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(self.writer, "[+{now:>8} ms] {} {line}", role.prefix())?;
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
