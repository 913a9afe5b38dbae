//! The loop driver: clock, then sensors, then sequencer, once per tick.
//!
//! Each iteration accumulates awake wall time into the [`TickClock`], feeds
//! one raw sample to every sensor, ticks the sequencer, and mirrors its
//! latched outputs onto the pins. When the sequencer requests the low-power
//! halt the task parks on the monitored-pin edges and then resynchronizes
//! the wall-time reference, so the halted interval never reaches the clock.
//! Intervals measured by the sequencer count awake time only, which is what
//! keeps the idle wake window open long enough for a wake-causing press to
//! debounce.

use embassy_time::{Duration, Instant as WallInstant, Timer};
use powerseq_core::debounce::Debouncer;
use powerseq_core::input::LevelSensor;
use powerseq_core::lines::LineId;
use powerseq_core::sequencer::{Inputs, PowerSequencer, SAMPLE_PERIOD};
use powerseq_core::telemetry::{PhaseChange, TransitionLog};
use powerseq_core::time::{Millis, TickClock};

use crate::hw::SupervisorBoard;

#[embassy_executor::task]
pub async fn run(mut board: SupervisorBoard) {
    let mut clock = TickClock::new();
    let mut button = Debouncer::new(LineId::Power);
    let mut usb = LevelSensor::new(LineId::Usb, board.usb_high());
    let mut boot = LevelSensor::new(LineId::Boot, board.boot_high());
    let mut sequencer = PowerSequencer::new();
    let mut log: TransitionLog = TransitionLog::new();

    defmt::info!("supervisor: starting in {}", sequencer.phase().name());

    let mut last_wall = WallInstant::now();

    loop {
        let wall = WallInstant::now();
        let awake = u32::try_from(wall.duration_since(last_wall).as_millis()).unwrap_or(u32::MAX);
        last_wall = wall;
        let now = clock.advance(Millis::new(awake));

        button.update(board.button_high());
        usb.update(board.usb_high());
        boot.update(board.boot_high());
        let inputs = Inputs::sample(&mut button, &mut usb, &boot);

        let before = sequencer.phase();
        let outputs = sequencer.tick(now, inputs);
        board.set_enable(outputs.enable);
        board.set_shutdown(outputs.shutdown);

        let after = sequencer.phase();
        if before != after {
            defmt::info!(
                "phase {} -> {} at {}ms",
                before.name(),
                after.name(),
                now.ticks()
            );
            log.record(PhaseChange::new(now, before, after));
        }

        if outputs.request_sleep {
            defmt::debug!(
                "idle: halting after {} transitions this wake",
                log.len()
            );
            log.clear();
            board.wait_for_wake().await;
            defmt::info!("idle: woke on pin edge");
            // The halted span must not reach the tick clock.
            last_wall = WallInstant::now();
        } else {
            Timer::after(Duration::from_millis(u64::from(SAMPLE_PERIOD.as_u32()))).await;
        }
    }
}
