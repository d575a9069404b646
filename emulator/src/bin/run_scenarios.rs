//! Replays canned operator sessions against the emulator and writes one
//! transcript per scenario (default directory: `transcripts/`).

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

#[allow(dead_code)]
#[path = "../rig.rs"]
mod rig;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;
#[allow(dead_code)]
#[path = "../transcript.rs"]
mod transcript;

use heating_core::ControllerConfig;
use rig::HostRig;
use session::Session;
use transcript::TranscriptLogger;

struct Scenario {
    name: &'static str,
    title: &'static str,
    lines: &'static [&'static str],
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "single-zone",
        title: "One zone calls for heat, fires, then vents through its own valve",
        lines: &[
            "status",
            "thermostat 1 on",
            "run 1s",
            "status",
            "run 15s",
            "status",
            "thermostat 1 off",
            "run 100ms",
            "status",
            "run 5m",
            "status",
        ],
    },
    Scenario {
        name: "handover",
        title: "Hot water hands the boiler over to zone 2 without dead-heading",
        lines: &[
            "thermostat W on",
            "run 14s",
            "thermostat W off",
            "thermostat 2 on",
            "run 1s",
            "status",
            "run 10s",
            "status",
            "log 12",
        ],
    },
    Scenario {
        name: "short-call",
        title: "Demand vanishes before the valve opens; the boiler never fires",
        lines: &[
            "thermostat 3 on",
            "run 2s",
            "thermostat 3 off",
            "run 1s",
            "status",
            "log",
        ],
    },
    Scenario {
        name: "override",
        title: "Operator overrides a calling thermostat, then hands control back",
        lines: &[
            "thermostat W on",
            "demand W off",
            "run 2s",
            "status",
            "demand W auto",
            "run 1s",
            "status",
        ],
    },
];

fn main() -> io::Result<()> {
    let out_dir = parse_out_dir().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: run-scenarios [--out <dir>]");
        process::exit(2);
    });

    for scenario in SCENARIOS {
        run_scenario(scenario, &out_dir)?;
    }
    Ok(())
}

fn run_scenario(scenario: &Scenario, out_dir: &std::path::Path) -> io::Result<()> {
    let path = out_dir.join(format!("{}.log", scenario.name));
    let transcript = TranscriptLogger::create(&path, scenario.title)?;

    let mut rig = HostRig::new(ControllerConfig::default());
    let simulation = rig
        .simulation()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let mut session = Session::new(simulation, Some(transcript));

    println!("== {} ==", scenario.name);
    for line in scenario.lines {
        println!("> {line}");
        for response in session.handle_command(line)? {
            println!("{response}");
        }
    }
    println!("(transcript: {})", path.display());
    Ok(())
}

fn parse_out_dir() -> Result<PathBuf, String> {
    let mut args = env::args().skip(1);
    match args.next() {
        None => Ok(PathBuf::from("transcripts")),
        Some(arg) if arg == "--out" => args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| "Expected value after --out".to_string()),
        Some(arg) => match arg.strip_prefix("--out=") {
            Some(value) => Ok(PathBuf::from(value)),
            None => Err(format!("Unknown argument `{arg}`")),
        },
    }
}
