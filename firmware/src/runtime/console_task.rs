use core::fmt::Write as _;

use heating_core::console::CommandExecutor;

use crate::console::{
    CONSOLE_RX, CONSOLE_TX, FirmwareConsole, LineAssembler, NEWLINE, Response, frames, respond,
};

#[embassy_executor::task]
pub async fn run() -> ! {
    let incoming = CONSOLE_RX.receiver();
    let outgoing = CONSOLE_TX.sender();
    let mut assembler = LineAssembler::new();
    let mut executor = CommandExecutor::new(FirmwareConsole);
    let mut response = Response::new();

    loop {
        let frame = incoming.receive().await;

        for &byte in &frame {
            match assembler.push(byte) {
                Ok(None) => continue,
                Ok(Some(line)) => {
                    defmt::debug!("console: {}", line.as_str());
                    respond(&mut executor, &line, &mut response);
                }
                Err(err) => {
                    defmt::warn!("console: {}", defmt::Display2Format(&err));
                    response.clear();
                    let _ = write!(response, "ERR {err}{NEWLINE}");
                }
            }

            for chunk in frames(&response) {
                outgoing.send(chunk).await;
            }
        }
    }
}
