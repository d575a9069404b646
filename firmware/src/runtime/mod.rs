use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use heating_core::plant::ALL_ZONES;
use static_cell::StaticCell;

use crate::board::{Board, Led, RelayPin, WATCHDOG_TIMEOUT_US, ZoneIo};
use crate::usb;

mod console_task;
mod control_task;
mod usb_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static USB_STORAGE: StaticCell<usb::UsbDeviceStorage> = StaticCell::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA5,
        PA8,
        PA9,
        PA10,
        PA11,
        PA12,
        PA15,
        PB0,
        PB1,
        PB2,
        PB3,
        PB4,
        PB5,
        PB6,
        PB10,
        PB11,
        PC6,
        IWDG,
        USB,
        ..
    } = hal::init(config);

    let board = Board {
        zones: [
            ZoneIo::new(ALL_ZONES[0].id, PB4, PA8),
            ZoneIo::new(ALL_ZONES[1].id, PB3, PA9),
            ZoneIo::new(ALL_ZONES[2].id, PB5, PA10),
            ZoneIo::new(ALL_ZONES[3].id, PB6, PA15),
        ],
        valve_leds: [Led::new(PB0), Led::new(PB1), Led::new(PB2), Led::new(PB10)],
        boiler_relay: RelayPin::new(PC6),
        boiler_led: Led::new(PB11),
        status_led: Led::new(PA5),
        watchdog: hal::wdg::IndependentWatchdog::new(IWDG, WATCHDOG_TIMEOUT_US),
    };

    spawner
        .spawn(control_task::run(board))
        .expect("failed to spawn control task");

    spawner
        .spawn(usb_task::run(USB, PA12, PA11))
        .expect("failed to spawn USB task");

    spawner
        .spawn(console_task::run())
        .expect("failed to spawn console task");

    core::future::pending::<()>().await;
}
