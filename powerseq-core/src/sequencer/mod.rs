//! The power-sequencing state machine.
//!
//! One [`PowerSequencer`] owns every piece of cross-tick state: the current
//! phase, the phase entry timer, and the press-classification bookkeeping.
//! The loop driver feeds it a fresh [`Inputs`] snapshot once per tick and
//! applies the returned [`Outputs`]; nothing here touches hardware.
//!
//! Timeouts are the failure model. Every wait phase resolves to a safe
//! de-energized phase when its timer runs out, so the machine cannot stall:
//! a host that never boots, never releases BOOT, or loses upstream power
//! always lands back in the idle cycle with EN and SHUTDOWN released.

use crate::debounce::Debouncer;
use crate::input::LevelSensor;
use crate::time::{Instant, Millis};

/// Cadence at which the loop driver samples inputs and ticks the sequencer.
pub const SAMPLE_PERIOD: Millis = Millis::new(10);
/// Hold duration separating a long press from a short one.
pub const LONG_PRESS: Millis = Millis::new(2_000);
/// How long upstream power must stay present before EN is asserted.
pub const POWERWAIT_TIMEOUT: Millis = Millis::new(1_000);
/// How long the host gets to assert BOOT after EN comes up.
pub const BOOTWAIT_TIMEOUT: Millis = Millis::new(30_000);
/// How long the host gets to release BOOT after SHUTDOWN is asserted.
pub const SHUTDOWN_TIMEOUT: Millis = Millis::new(30_000);
/// Grace period after BOOT is released before power is cut.
pub const POWEROFF_TIMEOUT: Millis = Millis::new(30_000);
/// How long the supervisor stays awake after each wake before halting again.
pub const IDLE_WAKE_WINDOW: Millis = Millis::new(5_000);

/// Sequencing phase. The machine cycles indefinitely; there is no terminal
/// phase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Supervisor has just come out of reset.
    Start,
    /// Arm the upstream-power settle timer.
    PowerWait0,
    /// Wait for upstream power to hold steady.
    PowerWait1,
    /// Assert EN.
    PowerOn,
    /// Arm the boot timer.
    BootWait0,
    /// Wait for the host to assert BOOT, or give up.
    BootWait1,
    /// Host is up.
    Boot,
    /// Assert SHUTDOWN and arm the shutdown timer.
    Shutdown0,
    /// Wait for the host to release BOOT, or give up.
    Shutdown1,
    /// Release SHUTDOWN and arm the power-off grace timer.
    PowerOff0,
    /// Wait out the grace period; the host may re-assert BOOT to cancel.
    PowerOff1,
    /// Cut power: release EN and SHUTDOWN.
    PowerOff2,
    /// Request the low-power halt.
    Idle0,
    /// Arm the wake window timer.
    Idle1,
    /// Wait for a power request, or halt again when the window closes.
    Idle2,
}

impl Phase {
    /// Human-readable phase name for logs and the emulator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Start => "START",
            Phase::PowerWait0 => "POWERWAIT0",
            Phase::PowerWait1 => "POWERWAIT1",
            Phase::PowerOn => "POWERON",
            Phase::BootWait0 => "BOOTWAIT0",
            Phase::BootWait1 => "BOOTWAIT1",
            Phase::Boot => "BOOT",
            Phase::Shutdown0 => "SHUTDOWN0",
            Phase::Shutdown1 => "SHUTDOWN1",
            Phase::PowerOff0 => "POWEROFF0",
            Phase::PowerOff1 => "POWEROFF1",
            Phase::PowerOff2 => "POWEROFF2",
            Phase::Idle0 => "IDLE0",
            Phase::Idle1 => "IDLE1",
            Phase::Idle2 => "IDLE2",
        }
    }

    /// True in the phases that make up the idle/halt cycle.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Phase::Idle0 | Phase::Idle1 | Phase::Idle2)
    }
}

/// Debounced button events for one tick.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ButtonEvents {
    /// Press settled this tick.
    pub pressed: bool,
    /// Release settled this tick.
    pub released: bool,
    /// Contact is settled closed.
    pub held_down: bool,
}

/// Input snapshot consumed by [`PowerSequencer::tick`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Inputs {
    pub button: ButtonEvents,
    /// Upstream power presently reads high.
    pub usb_high: bool,
    /// Upstream power rose since the previous tick.
    pub usb_went_high: bool,
    /// Upstream power fell since the previous tick.
    pub usb_went_low: bool,
    /// Host holds the BOOT line low.
    pub boot_asserted: bool,
}

impl Inputs {
    /// Assembles the tick snapshot from freshly updated sensors.
    ///
    /// At the sampling cadence at most one transition can have occurred per
    /// tick, so the current level decides which one-shot edge query runs.
    /// Querying only that direction keeps the sensors' last-query reference
    /// in step without eating the opposite edge.
    pub fn sample(button: &mut Debouncer, usb: &mut LevelSensor, boot: &LevelSensor) -> Self {
        let (usb_went_high, usb_went_low) = if usb.is_high() {
            (usb.went_high(), false)
        } else {
            (false, usb.went_low())
        };

        Self {
            button: ButtonEvents {
                pressed: button.is_pressed(),
                released: button.is_released(),
                held_down: button.is_down(),
            },
            usb_high: usb.is_high(),
            usb_went_high,
            usb_went_low,
            boot_asserted: boot.is_low(),
        }
    }
}

/// Output snapshot returned by [`PowerSequencer::tick`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Outputs {
    /// Level to drive on EN.
    pub enable: bool,
    /// Level to drive on SHUTDOWN.
    pub shutdown: bool,
    /// The loop driver should halt until a monitored-pin edge.
    pub request_sleep: bool,
}

/// The sequencing engine.
#[derive(Copy, Clone, Debug)]
pub struct PowerSequencer {
    phase: Phase,
    /// Phase entry timestamp; meaningful only in timeout phases.
    phase_timer: Instant,
    /// Timestamp of the last settled press.
    time_pressed: Instant,
    /// A long press fired and its release has not settled yet.
    button_ignored: bool,
    enable: bool,
    shutdown: bool,
}

impl PowerSequencer {
    /// Creates the sequencer in its power-just-applied phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Start,
            phase_timer: Instant::ZERO,
            time_pressed: Instant::ZERO,
            button_ignored: false,
            enable: false,
            shutdown: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Level currently latched on EN.
    #[must_use]
    pub const fn enable(&self) -> bool {
        self.enable
    }

    /// Level currently latched on SHUTDOWN.
    #[must_use]
    pub const fn shutdown(&self) -> bool {
        self.shutdown
    }

    /// Advances the machine by one tick.
    pub fn tick(&mut self, now: Instant, inputs: Inputs) -> Outputs {
        let (short_press, long_press) = self.classify_press(now, inputs.button);
        let mut request_sleep = false;

        // Preemptive override: a long press forces the power-off path from
        // any phase, ahead of the per-phase transition below.
        if long_press {
            self.phase = Phase::PowerOff2;
        }

        match self.phase {
            Phase::Start => {
                self.phase = if inputs.usb_high {
                    Phase::PowerWait0
                } else {
                    Phase::PowerOff2
                };
            }
            Phase::PowerWait0 => {
                self.phase_timer = now;
                self.phase = Phase::PowerWait1;
            }
            Phase::PowerWait1 => {
                if inputs.usb_went_low {
                    self.phase = Phase::PowerOff2;
                } else if now.elapsed_since(self.phase_timer) > POWERWAIT_TIMEOUT {
                    self.phase = Phase::PowerOn;
                }
            }
            Phase::PowerOn => {
                self.enable = true;
                self.phase = Phase::BootWait0;
            }
            Phase::BootWait0 => {
                self.phase_timer = now;
                self.phase = Phase::BootWait1;
            }
            Phase::BootWait1 => {
                if now.elapsed_since(self.phase_timer) > BOOTWAIT_TIMEOUT {
                    self.phase = Phase::PowerOff2;
                } else if inputs.boot_asserted {
                    self.phase = Phase::Boot;
                }
            }
            Phase::Boot => {
                if short_press || inputs.usb_went_low {
                    self.phase = Phase::Shutdown0;
                } else if !inputs.boot_asserted {
                    self.phase = Phase::PowerOff0;
                }
            }
            Phase::Shutdown0 => {
                self.shutdown = true;
                self.phase_timer = now;
                self.phase = Phase::Shutdown1;
            }
            Phase::Shutdown1 => {
                if now.elapsed_since(self.phase_timer) > SHUTDOWN_TIMEOUT || !inputs.boot_asserted
                {
                    self.phase = Phase::PowerOff0;
                }
            }
            Phase::PowerOff0 => {
                // Entry work and the first PowerOff1 evaluation share a
                // tick; the sequence has no boundary here.
                self.shutdown = false;
                self.phase_timer = now;
                self.phase = Phase::PowerOff1;
                self.step_poweroff1(now, &inputs);
            }
            Phase::PowerOff1 => self.step_poweroff1(now, &inputs),
            Phase::PowerOff2 => {
                self.enable = false;
                self.shutdown = false;
                self.phase = Phase::Idle0;
            }
            Phase::Idle0 => {
                // Halt request, wake-window arming, and the first wake check
                // all share the tick. The loop driver performs the actual
                // halt after this tick returns and resynchronizes the clock,
                // so the window armed here measures awake time from the next
                // tick on.
                request_sleep = true;
                self.phase = Phase::Idle1;
                self.step_idle1(now, &inputs, short_press);
            }
            Phase::Idle1 => self.step_idle1(now, &inputs, short_press),
            Phase::Idle2 => self.step_idle2(now, &inputs, short_press),
        }

        Outputs {
            enable: self.enable,
            shutdown: self.shutdown,
            request_sleep,
        }
    }

    /// Folds the tick's button events into short/long press flags.
    ///
    /// After a long press fires, the same hold is soaked up: nothing more is
    /// reported until the release settles, and that release is consumed
    /// without yielding a short press.
    fn classify_press(&mut self, now: Instant, button: ButtonEvents) -> (bool, bool) {
        let mut short_press = false;
        let mut long_press = false;

        if self.button_ignored {
            if button.released {
                self.button_ignored = false;
            }
        } else if button.pressed {
            self.time_pressed = now;
        } else if button.released {
            short_press = true;
        } else if button.held_down && now.elapsed_since(self.time_pressed) > LONG_PRESS {
            long_press = true;
            self.button_ignored = true;
        }

        (short_press, long_press)
    }

    fn step_poweroff1(&mut self, now: Instant, inputs: &Inputs) {
        if now.elapsed_since(self.phase_timer) > POWEROFF_TIMEOUT {
            self.phase = Phase::PowerOff2;
        } else if inputs.boot_asserted {
            // Host re-asserted BOOT during the grace period; abort the
            // power-off.
            self.phase = Phase::Boot;
        }
    }

    fn step_idle1(&mut self, now: Instant, inputs: &Inputs, short_press: bool) {
        self.phase_timer = now;
        self.phase = Phase::Idle2;
        self.step_idle2(now, inputs, short_press);
    }

    fn step_idle2(&mut self, now: Instant, inputs: &Inputs, short_press: bool) {
        if now.elapsed_since(self.phase_timer) > IDLE_WAKE_WINDOW {
            self.phase = Phase::Idle0;
        } else if (short_press && inputs.usb_high) || inputs.usb_went_high {
            self.phase = Phase::PowerOn;
        }
    }
}

impl Default for PowerSequencer {
    fn default() -> Self {
        Self::new()
    }
}
