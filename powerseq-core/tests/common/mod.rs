//! Shared harness that replays raw line levels through the full stack.
//!
//! The rig owns the same component set the firmware loop driver does
//! (clock, debouncer, level sensors, sequencer) and steps them at
//! `SAMPLE_PERIOD`, so scenario tests exercise exactly the per-tick ordering
//! the hardware sees. The low-power halt is a counted no-op here; the clock
//! keeps running, which matches the awake-time-only contract of the real
//! driver.

#![allow(dead_code)]

use powerseq_core::debounce::Debouncer;
use powerseq_core::input::LevelSensor;
use powerseq_core::lines::LineId;
use powerseq_core::sequencer::{Inputs, Outputs, Phase, PowerSequencer, SAMPLE_PERIOD};
use powerseq_core::time::{Instant, Millis, TickClock};

pub struct Rig {
    clock: TickClock,
    button: Debouncer,
    usb: LevelSensor,
    boot: LevelSensor,
    sequencer: PowerSequencer,
    /// Physical button state fed on the next tick (pressed pulls the line low).
    pub button_pressed: bool,
    /// Upstream power presence fed on the next tick.
    pub usb_present: bool,
    /// Host holds BOOT low when true.
    pub boot_asserted: bool,
    /// Number of ticks that requested the low-power halt.
    pub halt_requests: u32,
    last: Outputs,
}

impl Rig {
    /// Builds a rig with the sensors seeded from the initial line levels,
    /// the way the firmware seeds them at startup.
    pub fn new(usb_present: bool) -> Self {
        Self {
            clock: TickClock::new(),
            button: Debouncer::new(LineId::Power),
            usb: LevelSensor::new(LineId::Usb, usb_present),
            boot: LevelSensor::new(LineId::Boot, true),
            sequencer: PowerSequencer::new(),
            button_pressed: false,
            usb_present,
            boot_asserted: false,
            halt_requests: 0,
            last: Outputs {
                enable: false,
                shutdown: false,
                request_sleep: false,
            },
        }
    }

    /// Advances one sample period: clock, sensors, sequencer.
    pub fn tick(&mut self) -> Outputs {
        let now = self.clock.advance(SAMPLE_PERIOD);
        self.button.update(!self.button_pressed);
        self.usb.update(self.usb_present);
        self.boot.update(!self.boot_asserted);

        let inputs = Inputs::sample(&mut self.button, &mut self.usb, &self.boot);
        let outputs = self.sequencer.tick(now, inputs);
        if outputs.request_sleep {
            self.halt_requests += 1;
        }
        self.last = outputs;
        outputs
    }

    /// Ticks through `duration` of virtual time.
    pub fn run_for(&mut self, duration: Millis) -> Outputs {
        let steps = duration.as_u32() / SAMPLE_PERIOD.as_u32();
        for _ in 0..steps {
            self.tick();
        }
        self.last
    }

    /// Ticks until the sequencer reports `phase`, or `limit` elapses.
    pub fn run_until_phase(&mut self, phase: Phase, limit: Millis) -> bool {
        let steps = limit.as_u32() / SAMPLE_PERIOD.as_u32();
        for _ in 0..steps {
            self.tick();
            if self.sequencer.phase() == phase {
                return true;
            }
        }
        self.sequencer.phase() == phase
    }

    /// Presses the button, holds it for `hold`, releases it, and ticks long
    /// enough for the release to settle through the debouncer.
    pub fn press_for(&mut self, hold: Millis) {
        self.button_pressed = true;
        self.run_for(hold);
        self.button_pressed = false;
        self.run_for(Millis::new(80));
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn outputs(&self) -> Outputs {
        self.last
    }

    pub fn enable(&self) -> bool {
        self.sequencer.enable()
    }

    pub fn shutdown(&self) -> bool {
        self.sequencer.shutdown()
    }
}

/// Drives a fresh power-up through to the BOOT phase.
pub fn boot_up(rig: &mut Rig) {
    rig.usb_present = true;
    assert!(
        rig.run_until_phase(Phase::BootWait1, Millis::new(2_000)),
        "EN should come up once upstream power settles"
    );
    assert!(rig.enable());
    rig.boot_asserted = true;
    assert!(rig.run_until_phase(Phase::Boot, Millis::new(100)));
}
