//! Board wiring for the supervisor.
//!
//! Pin assignment on the STM32G0:
//!
//! | Line     | Pin | Mode                      |
//! |----------|-----|---------------------------|
//! | POWER    | PA0 | input, pull-up, EXTI0     |
//! | USB      | PA1 | input, EXTI1              |
//! | EN       | PA2 | push-pull output          |
//! | SHUTDOWN | PA3 | push-pull output          |
//! | BOOT     | PA4 | input, pull-up            |
//!
//! POWER and USB sit on EXTI channels solely so their edges can end the
//! low-power wait; the wake path carries no logic of its own.

use embassy_futures::select::select;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Output};

/// Concrete GPIO bundle handed to the supervisor task.
pub struct SupervisorBoard {
    power_button: ExtiInput<'static>,
    usb_sense: ExtiInput<'static>,
    enable: Output<'static>,
    shutdown: Output<'static>,
    boot: Input<'static>,
}

impl SupervisorBoard {
    pub fn new(
        power_button: ExtiInput<'static>,
        usb_sense: ExtiInput<'static>,
        enable: Output<'static>,
        shutdown: Output<'static>,
        boot: Input<'static>,
    ) -> Self {
        Self {
            power_button,
            usb_sense,
            enable,
            shutdown,
            boot,
        }
    }

    /// Raw level on the power button line (pull-up: high means released).
    pub fn button_high(&self) -> bool {
        self.power_button.is_high()
    }

    /// Raw level on the upstream power presence line.
    pub fn usb_high(&self) -> bool {
        self.usb_sense.is_high()
    }

    /// Raw level on the BOOT handshake line.
    pub fn boot_high(&self) -> bool {
        self.boot.is_high()
    }

    /// Drives the boost converter enable line.
    pub fn set_enable(&mut self, level: bool) {
        if level {
            self.enable.set_high();
        } else {
            self.enable.set_low();
        }
    }

    /// Drives the shutdown request line.
    pub fn set_shutdown(&mut self, level: bool) {
        if level {
            self.shutdown.set_high();
        } else {
            self.shutdown.set_low();
        }
    }

    /// Blocks until any edge on a monitored pin.
    ///
    /// The executor parks the core in its low-power wait while both futures
    /// are pending; whichever EXTI edge arrives first resumes the loop.
    pub async fn wait_for_wake(&mut self) {
        select(
            self.power_button.wait_for_any_edge(),
            self.usb_sense.wait_for_any_edge(),
        )
        .await;
    }
}
