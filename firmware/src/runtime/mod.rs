use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};

use crate::hw::SupervisorBoard;

mod supervisor_task;

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

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PA3,
        PA4,
        EXTI0,
        EXTI1,
        ..
    } = hal::init(config);

    // Outputs come up released: the host stays unpowered until the sequencer
    // walks the power-on path itself.
    let board = SupervisorBoard::new(
        ExtiInput::new(PA0, EXTI0, Pull::Up),
        ExtiInput::new(PA1, EXTI1, Pull::None),
        Output::new(PA2, Level::Low, Speed::Low),
        Output::new(PA3, Level::Low, Speed::Low),
        Input::new(PA4, Pull::Up),
    );

    spawner
        .spawn(supervisor_task::run(board))
        .expect("failed to spawn supervisor task");

    core::future::pending::<()>().await;
}
