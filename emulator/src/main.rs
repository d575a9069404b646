mod rig;
mod session;
mod transcript;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use heating_core::ControllerConfig;
use heating_core::console::parse_duration;

use rig::HostRig;
use session::Session;
use transcript::TranscriptLogger;

const USAGE: &str =
    "Usage: heating-emulator [--overrun <dur>] [--underrun <dur>] [--transcript <path>]";

struct Options {
    config: ControllerConfig,
    transcript: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let transcript = options
        .transcript
        .as_deref()
        .map(|path| TranscriptLogger::create(path, "Zone valve controller emulator transcript"))
        .transpose()?;

    let mut rig = HostRig::new(options.config);
    let simulation = rig
        .simulation()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let mut session = Session::new(simulation, transcript);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Zone valve controller emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed)? {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        config: ControllerConfig::default(),
        transcript: None,
    };

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| format!("Expected value after {flag}"))
        };

        match flag.as_str() {
            "--overrun" => {
                let overrun = duration_arg(&flag, &value()?)?;
                options.config = options.config.with_overrun(overrun);
            }
            "--underrun" => {
                let underrun = duration_arg(&flag, &value()?)?;
                options.config = options.config.with_underrun(underrun);
            }
            "--transcript" => options.transcript = Some(PathBuf::from(value()?)),
            other => return Err(format!("Unknown argument `{other}`")),
        }
    }

    Ok(options)
}

fn duration_arg(flag: &str, text: &str) -> Result<std::time::Duration, String> {
    parse_duration(text).map_err(|_| format!("Invalid duration `{text}` for {flag}"))
}
