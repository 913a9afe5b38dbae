mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let usb_present = parse_args().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: powerseq-emulator [--usb]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(usb_present);
    let mut line = String::new();

    writeln!(
        writer,
        "powerseq emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Returns whether the virtual upstream supply starts present.
fn parse_args() -> Result<bool, String> {
    let mut usb_present = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--usb" => usb_present = true,
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(usb_present)
}
