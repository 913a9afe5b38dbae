//! Host-side shutdown daemon.
//!
//! Watches the supervisor's SHUTDOWN line through the GPIO character device
//! and, on a rising edge (or an already-asserted line at startup, unless
//! told otherwise), runs the configured shutdown command exactly once and
//! exits. The command is fire-and-forget: its exit status is not examined.

mod config;

use std::env;
use std::error::Error;
use std::process::{self, Command};

use gpio_cdev::{Chip, EventRequestFlags, LineRequestFlags};

use config::{Config, USAGE};

fn main() {
    let config = match config::parse(env::args().skip(1)) {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{USAGE}");
            return;
        }
        Err(err) => {
            eprintln!("powerseqd: {err}");
            eprintln!("{USAGE}");
            process::exit(err.exit_code());
        }
    };

    if config.verbose > 0 {
        println!(
            "powerseqd: starting, device={} line={}",
            config.device, config.line
        );
    }

    if let Err(err) = watch(&config) {
        eprintln!("powerseqd: {err}");
        process::exit(os_exit_code(&err));
    }
}

/// Blocks until a shutdown is signaled, then runs the shutdown command.
fn watch(config: &Config) -> Result<(), gpio_cdev::Error> {
    let mut chip = Chip::new(&config.device)?;
    let line = chip.get_line(config.line)?;
    let events = line.events(
        LineRequestFlags::INPUT,
        EventRequestFlags::RISING_EDGE,
        "powerseqd",
    )?;

    if events.get_value()? != 0 {
        println!(
            "powerseqd: shutdown line is asserted at startup{}",
            if config.ignore_initial_state {
                " (ignoring)"
            } else {
                ""
            }
        );
        if !config.ignore_initial_state {
            run_shutdown_command(config);
            return Ok(());
        }
    }

    for event in events {
        let _event = event?;
        if config.verbose > 0 {
            println!("powerseqd: received shutdown signal");
        }
        run_shutdown_command(config);
        break;
    }

    Ok(())
}

/// Runs the configured command through `/bin/sh -c`, ignoring its status.
fn run_shutdown_command(config: &Config) {
    if config.verbose > 1 {
        println!("powerseqd: running shutdown command: {}", config.command);
    }

    let _ = Command::new("/bin/sh")
        .arg("-c")
        .arg(&config.command)
        .status();
}

/// Translates a device failure into a negated OS error code, -1 when the
/// error chain carries no errno.
fn os_exit_code(err: &(dyn Error + 'static)) -> i32 {
    let mut cause: Option<&(dyn Error + 'static)> = Some(err);
    while let Some(current) = cause {
        if let Some(io_err) = current.downcast_ref::<std::io::Error>()
            && let Some(code) = io_err.raw_os_error()
        {
            return -code;
        }
        cause = current.source();
    }
    -1
}
