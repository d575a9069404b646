//! Console commands driven against a live controller.

mod common;

use core::cell::Cell;
use core::time::Duration;

use heating_core::config::ticks_for;
use heating_core::console::{
    CommandError, CommandExecutor, CommandOutcome, ConsoleHost, DemandOverride, EventLog,
    StatusSnapshot,
};
use heating_core::telemetry::{StatusMonitor, TelemetryRecorder, Tick};
use heating_core::{ChannelId, ControlState, Controller, ControllerConfig};

type RigController<'a> = Controller<'a, common::Input<'a>, common::Relay<'a>, common::Relay<'a>>;

struct RigHost<'a> {
    controller: RigController<'a>,
    inputs: &'a [Cell<bool>],
    monitor: StatusMonitor,
    recorder: TelemetryRecorder,
    now: Tick,
}

impl ConsoleHost for RigHost<'_> {
    fn snapshot(&mut self) -> StatusSnapshot {
        StatusSnapshot::capture(self.now, &self.controller)
    }

    fn recent_events(&mut self, count: usize) -> EventLog {
        self.recorder.recent(count).copied().collect()
    }

    fn override_demand(
        &mut self,
        zone: ChannelId,
        setting: DemandOverride,
    ) -> Result<(), CommandError> {
        let input = self.inputs.get(zone.index()).ok_or(CommandError::UnknownZone)?;
        input.set(setting == DemandOverride::On);
        Ok(())
    }

    fn advance(&mut self, duration: Duration) -> Result<Tick, CommandError> {
        for _ in 0..ticks_for(duration) {
            self.controller.tick();
            self.now += 1;
            self.monitor
                .observe(self.now, &self.controller, &mut self.recorder);
        }
        Ok(self.now)
    }
}

fn render(outcome: &CommandOutcome) -> String {
    let mut out = String::new();
    outcome.write_response(&mut out, "\n").expect("string sink");
    out
}

#[test]
fn operator_walks_a_zone_through_a_heat_call() {
    let config = ControllerConfig::default();
    let inputs = common::cells::<4>();
    let valves = common::cells::<4>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, config.channel);
    let mut boiler = common::boiler(&fire[0], config.boiler);
    let controller =
        Controller::new(&mut channels, &mut boiler, ChannelId::new(3)).expect("four zones");

    let mut executor = CommandExecutor::new(RigHost {
        controller,
        inputs: &inputs,
        monitor: StatusMonitor::new(),
        recorder: TelemetryRecorder::new(),
        now: 0,
    });

    let idle = render(&executor.execute("status").expect("status"));
    assert_eq!(
        idle,
        "state idle overrun=3 t=0ms\n\
         demand ---- open ----\n\
         valves W=closed 1=closed 2=closed 3=closed\n\
         boiler idle firing=false\n"
    );

    let ack = executor.execute("demand 1 on").expect("override");
    assert_eq!(render(&ack), "OK demand 1 on\n");

    let ran = executor.execute("run 1s").expect("advance");
    assert_eq!(ran, CommandOutcome::Advanced { now: 1_000 });

    let status = render(&executor.execute("status").expect("status"));
    assert!(status.contains("state demand overrun=3"));
    assert!(status.contains("demand -1-- open ----"));
    assert!(status.contains("1=opening"));
    assert_eq!(executor.host().controller.state(), ControlState::Demand);

    let log = render(&executor.execute("log 3").expect("log"));
    assert!(log.contains("t=512ms"));
    assert!(log.contains("valve 1 opening"));
    assert!(log.lines().count() <= 3);

    executor.execute("run 15s").expect("advance");
    let status = render(&executor.execute("status").expect("status"));
    assert!(status.contains("boiler demand firing=true"));
    assert!(fire[0].get());
}

#[test]
fn syntax_errors_carry_their_column() {
    let config = ControllerConfig::default();
    let inputs = common::cells::<1>();
    let valves = common::cells::<1>();
    let fire = common::cells::<1>();
    let mut channels = common::channels(&inputs, &valves, config.channel);
    let mut boiler = common::boiler(&fire[0], config.boiler);
    let controller =
        Controller::new(&mut channels, &mut boiler, ChannelId::new(0)).expect("one zone");
    let mut executor = CommandExecutor::new(RigHost {
        controller,
        inputs: &inputs,
        monitor: StatusMonitor::new(),
        recorder: TelemetryRecorder::new(),
        now: 0,
    });

    let err = executor.execute("run 5 minutes").expect_err("unit required");
    assert!(matches!(err, CommandError::Parse(parse) if parse.offset >= 4));
    assert!(err.to_string().starts_with("syntax error at column"));
}
