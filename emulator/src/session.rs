//! Interactive session driving the portable supervisor stack.
//!
//! The session owns the exact component set the firmware loop driver owns
//! (clock, debouncer, level sensors, sequencer, transition log), wired to
//! virtual lines that commands flip. The low-power halt is modeled
//! faithfully: while halted, virtual time does not advance, and only an edge
//! on POWER or USB resumes the loop. BOOT is not a wake source.

use crossterm::style::Stylize;

use powerseq_core::debounce::Debouncer;
use powerseq_core::input::LevelSensor;
use powerseq_core::lines::LineId;
use powerseq_core::sequencer::{Inputs, PowerSequencer, SAMPLE_PERIOD};
use powerseq_core::telemetry::{PhaseChange, TransitionLog};
use powerseq_core::time::{Millis, TickClock};

/// Hold duration used by `press` when none is given: a clean short press.
const DEFAULT_PRESS_MS: u32 = 300;
/// Settle margin ticked after a release so the debouncer reports it.
const RELEASE_SETTLE_MS: u32 = 80;

pub struct Session {
    clock: TickClock,
    button: Debouncer,
    usb: LevelSensor,
    boot: LevelSensor,
    sequencer: PowerSequencer,
    log: TransitionLog,
    button_pressed: bool,
    usb_present: bool,
    boot_asserted: bool,
    halted: bool,
}

impl Session {
    pub fn new(usb_present: bool) -> Self {
        Self {
            clock: TickClock::new(),
            button: Debouncer::new(LineId::Power),
            usb: LevelSensor::new(LineId::Usb, usb_present),
            boot: LevelSensor::new(LineId::Boot, true),
            sequencer: PowerSequencer::new(),
            log: TransitionLog::new(),
            button_pressed: false,
            usb_present,
            boot_asserted: false,
            halted: false,
        }
    }

    pub fn handle_command(&mut self, input: &str) -> Vec<String> {
        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };
        let argument = parts.next();

        match (command, argument) {
            ("help", _) => help_text(),
            ("status", _) => self.status(),
            ("log", _) => self.transitions(),
            ("run", Some(ms)) => match ms.parse::<u32>() {
                Ok(ms) => self.run(Millis::new(ms)),
                Err(_) => vec![format!("Not a duration in ms: {ms}")],
            },
            ("run", None) => self.run(Millis::new(SAMPLE_PERIOD.as_u32())),
            ("press", argument) => {
                let hold = argument.map_or(Ok(DEFAULT_PRESS_MS), str::parse);
                match hold {
                    Ok(ms) => self.press(Millis::new(ms)),
                    Err(_) => vec![format!("Not a hold duration in ms: {}", argument.unwrap())],
                }
            }
            ("usb", Some("on")) => self.set_usb(true),
            ("usb", Some("off")) => self.set_usb(false),
            ("boot", Some("assert")) => self.set_boot(true),
            ("boot", Some("release")) => self.set_boot(false),
            _ => vec![format!("Unknown command: {input}. Try `help`.")],
        }
    }

    /// Advances virtual time, stopping early if the sequencer halts.
    fn run(&mut self, duration: Millis) -> Vec<String> {
        if self.halted {
            return vec![format!(
                "{}; only a POWER or USB edge resumes it.",
                "Processor is halted".yellow()
            )];
        }

        let mut responses = Vec::new();
        let steps = duration.as_u32().div_ceil(SAMPLE_PERIOD.as_u32());
        for _ in 0..steps {
            self.tick(&mut responses);
            if self.halted {
                responses.push(format!(
                    "{} at {}ms",
                    "Processor halted".yellow(),
                    self.clock.now().ticks()
                ));
                break;
            }
        }
        responses
    }

    /// One sample period: clock, sensors, sequencer, outputs.
    fn tick(&mut self, responses: &mut Vec<String>) {
        let now = self.clock.advance(SAMPLE_PERIOD);
        self.button.update(!self.button_pressed);
        self.usb.update(self.usb_present);
        self.boot.update(!self.boot_asserted);

        let inputs = Inputs::sample(&mut self.button, &mut self.usb, &self.boot);
        let before = self.sequencer.phase();
        let outputs = self.sequencer.tick(now, inputs);
        let after = self.sequencer.phase();

        if before != after {
            self.log.record(PhaseChange::new(now, before, after));
            responses.push(format!(
                "[{:>6}ms] {} -> {}",
                now.ticks(),
                before.name().dim(),
                after.name().bold()
            ));
        }
        if outputs.request_sleep {
            self.halted = true;
        }
    }

    /// A full press-and-release gesture, settle time included.
    fn press(&mut self, hold: Millis) -> Vec<String> {
        let mut responses = Vec::new();
        self.button_pressed = true;
        self.wake(&mut responses);
        responses.extend(self.run(hold));

        self.button_pressed = false;
        self.wake(&mut responses);
        responses.extend(self.run(Millis::new(RELEASE_SETTLE_MS)));
        responses
    }

    fn set_usb(&mut self, present: bool) -> Vec<String> {
        let mut responses = Vec::new();
        if self.usb_present != present {
            self.usb_present = present;
            self.wake(&mut responses);
        }
        responses.push(format!(
            "USB {}",
            if present { "on".green() } else { "off".red() }
        ));
        responses
    }

    fn set_boot(&mut self, asserted: bool) -> Vec<String> {
        // BOOT edges do not wake the halted processor.
        self.boot_asserted = asserted;
        vec![format!(
            "BOOT {}",
            if asserted {
                "asserted".green()
            } else {
                "released".dim()
            }
        )]
    }

    /// Ends the halt in response to a monitored-line edge.
    fn wake(&mut self, responses: &mut Vec<String>) {
        if self.halted {
            self.halted = false;
            responses.push(format!(
                "{} at {}ms",
                "Processor woke".green(),
                self.clock.now().ticks()
            ));
        }
    }

    fn status(&self) -> Vec<String> {
        let level = |high: bool| if high { "high".green() } else { "low".dim() };
        vec![
            format!(
                "phase {} at {}ms{}",
                self.sequencer.phase().name().bold(),
                self.clock.now().ticks(),
                if self.halted { " (halted)" } else { "" }
            ),
            format!(
                "outputs: EN {}  SHUTDOWN {}",
                level(self.sequencer.enable()),
                level(self.sequencer.shutdown())
            ),
            format!(
                "lines: POWER {}  USB {}  BOOT {}",
                level(!self.button_pressed),
                level(self.usb_present),
                level(!self.boot_asserted)
            ),
        ]
    }

    fn transitions(&self) -> Vec<String> {
        if self.log.is_empty() {
            return vec!["No transitions recorded.".to_string()];
        }
        self.log
            .iter()
            .map(|change| {
                format!(
                    "[{:>6}ms] {} -> {}",
                    change.at.ticks(),
                    change.from.name(),
                    change.to.name()
                )
            })
            .collect()
    }
}

fn help_text() -> Vec<String> {
    [
        "run [ms]        advance virtual time (default one sample period)",
        "press [ms]      press and release the power button (default 300 ms)",
        "usb on|off      set upstream power presence",
        "boot assert|release   drive the host's BOOT handshake line",
        "status          show phase, outputs, and line levels",
        "log             dump the recorded phase transitions",
        "exit            quit",
    ]
    .iter()
    .map(|line| (*line).to_string())
    .collect()
}
