use embassy_futures::join::join;
use embassy_futures::select::{Either3, select3};
use embassy_stm32 as hal;
use embassy_stm32::Peri;
use embassy_usb::class::cdc_acm::{ControlChanged, Receiver, Sender};
use embassy_usb::driver::{Driver, EndpointError};

use super::USB_STORAGE;
use crate::console::{CONSOLE_RX, CONSOLE_TX, ConsoleFrame};
use crate::usb::{self, UsbDeviceStrings};

embassy_stm32::bind_interrupts!(struct UsbIrqs {
    USB_UCPD1_2 => embassy_stm32::usb::InterruptHandler<hal::peripherals::USB>;
});

#[embassy_executor::task]
pub async fn run(
    usb: Peri<'static, hal::peripherals::USB>,
    dp: Peri<'static, hal::peripherals::PA12>,
    dm: Peri<'static, hal::peripherals::PA11>,
) -> ! {
    let storage = USB_STORAGE.init(usb::UsbDeviceStorage::new());
    let driver = embassy_stm32::usb::Driver::new(usb, UsbIrqs, dp, dm);

    let usb::UsbConsole { mut device, port } =
        usb::UsbConsole::new(driver, storage, UsbDeviceStrings::default());

    join(
        device.run(),
        run_console_interface(port.sender, port.receiver, port.control),
    )
    .await;
    loop {
        core::future::pending::<()>().await;
    }
}

async fn run_console_interface<D>(
    mut sender: Sender<'static, D>,
    mut receiver: Receiver<'static, D>,
    control: ControlChanged<'static>,
) -> !
where
    D: Driver<'static>,
{
    let rx_queue = CONSOLE_RX.sender();
    let tx_queue = CONSOLE_TX.receiver();
    let mut ingress = [0u8; usb::MAX_PACKET_SIZE as usize];
    let mut pending_tx: Option<ConsoleFrame> = None;

    loop {
        join(receiver.wait_connection(), sender.wait_connection()).await;
        wait_for_dtr(&control, &mut sender).await;
        pending_tx.take();

        defmt::info!("usb: console connected");

        loop {
            match select3(
                receiver.read_packet(&mut ingress),
                async {
                    if pending_tx.is_none() {
                        pending_tx = Some(tx_queue.receive().await);
                    }

                    let Some(frame) = pending_tx.as_ref() else {
                        return Ok::<usize, EndpointError>(0);
                    };
                    let len = frame.len();
                    sender.write_packet(frame).await?;
                    pending_tx.take();
                    Ok(len)
                },
                control.control_changed(),
            )
            .await
            {
                Either3::First(Ok(0)) => {}
                Either3::First(Ok(count)) => {
                    let Ok(frame) = ConsoleFrame::from_slice(&ingress[..count]) else {
                        defmt::warn!("usb: dropping console frame len={} (overflow)", count);
                        continue;
                    };
                    rx_queue.send(frame).await;
                }
                Either3::First(Err(EndpointError::Disabled)) => {
                    defmt::warn!("usb: console interface disabled");
                    break;
                }
                Either3::First(Err(_)) => {
                    defmt::warn!("usb: console read error");
                }
                Either3::Second(Ok(_)) => {}
                Either3::Second(Err(EndpointError::Disabled)) => {
                    defmt::warn!("usb: console write disabled");
                    break;
                }
                Either3::Second(Err(_)) => {
                    defmt::warn!("usb: console write error");
                }
                Either3::Third(()) => {
                    if !sender.dtr() {
                        defmt::warn!("usb: console host dropped DTR");
                        pending_tx.take();
                        break;
                    }
                }
            }
        }
    }
}

async fn wait_for_dtr<D>(control: &ControlChanged<'static>, sender: &mut Sender<'static, D>)
where
    D: Driver<'static>,
{
    while !sender.dtr() {
        control.control_changed().await;
    }
}
