//! Command-line configuration for the shutdown daemon.

use std::fmt;

/// Default GPIO character device to open.
pub const DEFAULT_DEVICE: &str = "/dev/gpiochip0";
/// Default line offset carrying the supervisor's SHUTDOWN signal.
pub const DEFAULT_LINE: u32 = 17;
/// Default command run once a shutdown is requested.
pub const DEFAULT_COMMAND: &str = "/bin/systemctl poweroff";

pub const USAGE: &str =
    "powerseqd: usage: powerseqd [-d <device>] [-l <line>] [-c <shutdown_command>] [-vih]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// GPIO character device path.
    pub device: String,
    /// Line offset of the SHUTDOWN signal on that device.
    pub line: u32,
    /// Command handed to `/bin/sh -c` on trigger.
    pub command: String,
    /// Diagnostic chattiness; each `-v` adds one level.
    pub verbose: u32,
    /// Treat an already-asserted line at startup as a no-op.
    pub ignore_initial_state: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            line: DEFAULT_LINE,
            command: DEFAULT_COMMAND.to_string(),
            verbose: 0,
            ignore_initial_state: false,
        }
    }
}

/// Invocation problems, split by the exit code they map to.
#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    /// The line argument is not a positive integer. Exit code 1.
    InvalidLine(String),
    /// Malformed invocation. Exit code 2.
    Usage(String),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidLine(_) => 1,
            CliError::Usage(_) => 2,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidLine(value) => {
                write!(f, "invalid shutdown line specification: {value}")
            }
            CliError::Usage(message) => write!(f, "{message}"),
        }
    }
}

/// Parses the daemon's arguments (program name already stripped).
///
/// Returns `Ok(None)` when `--help` was requested.
///
/// # Errors
///
/// [`CliError::InvalidLine`] for a malformed line offset,
/// [`CliError::Usage`] for anything else the parser does not understand.
pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Config>, CliError> {
    let mut config = Config::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-v" | "--verbose" => config.verbose += 1,
            "-i" | "--ignore-initial-state" => config.ignore_initial_state = true,
            "-d" | "--device" => config.device = take_value(&arg, &mut args)?,
            "-c" | "--command" => config.command = take_value(&arg, &mut args)?,
            "-l" | "--line" => {
                let value = take_value(&arg, &mut args)?;
                config.line = parse_line(&value)?;
            }
            other => {
                if let Some(value) = other.strip_prefix("--device=") {
                    config.device = value.to_string();
                } else if let Some(value) = other.strip_prefix("--command=") {
                    config.command = value.to_string();
                } else if let Some(value) = other.strip_prefix("--line=") {
                    config.line = parse_line(value)?;
                } else {
                    return Err(CliError::Usage(format!("unknown argument: {other}")));
                }
            }
        }
    }

    Ok(Some(config))
}

fn take_value(
    flag: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<String, CliError> {
    args.next()
        .ok_or_else(|| CliError::Usage(format!("expected a value after {flag}")))
}

fn parse_line(value: &str) -> Result<u32, CliError> {
    match value.parse::<u32>() {
        Ok(offset) if offset > 0 => Ok(offset),
        _ => Err(CliError::InvalidLine(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(args: &[&str]) -> Config {
        parse(args.iter().map(ToString::to_string))
            .expect("arguments should parse")
            .expect("help should not be requested")
    }

    #[test]
    fn no_arguments_yields_defaults() {
        let config = parse_ok(&[]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn every_option_is_accepted() {
        let config = parse_ok(&[
            "--device",
            "/dev/gpiochip2",
            "--line",
            "4",
            "--command",
            "/sbin/halt",
            "-v",
            "-v",
            "-i",
        ]);
        assert_eq!(config.device, "/dev/gpiochip2");
        assert_eq!(config.line, 4);
        assert_eq!(config.command, "/sbin/halt");
        assert_eq!(config.verbose, 2);
        assert!(config.ignore_initial_state);
    }

    #[test]
    fn equals_forms_are_accepted() {
        let config = parse_ok(&["--device=/dev/gpiochip1", "--line=27", "--command=/bin/true"]);
        assert_eq!(config.device, "/dev/gpiochip1");
        assert_eq!(config.line, 27);
        assert_eq!(config.command, "/bin/true");
    }

    #[test]
    fn short_options_are_accepted() {
        let config = parse_ok(&["-d", "/dev/gpiochip3", "-l", "9", "-c", "echo done"]);
        assert_eq!(config.device, "/dev/gpiochip3");
        assert_eq!(config.line, 9);
        assert_eq!(config.command, "echo done");
    }

    #[test]
    fn help_short_circuits() {
        let outcome = parse(["--line", "bogus", "--help"].iter().map(ToString::to_string));
        // --help before the bad value never gets there; after it, the error
        // wins. Order matters, same as getopt.
        assert!(outcome.is_err());

        let outcome = parse(["--help"].iter().map(ToString::to_string));
        assert_eq!(outcome, Ok(None));
    }

    #[test]
    fn malformed_line_is_an_invalid_line_error() {
        for bogus in ["x", "0", "-3", ""] {
            let outcome = parse(["--line", bogus].iter().map(ToString::to_string));
            match outcome {
                Err(err @ CliError::InvalidLine(_)) => assert_eq!(err.exit_code(), 1),
                other => panic!("expected InvalidLine for {bogus:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_flags_are_usage_errors() {
        let outcome = parse(["--frobnicate"].iter().map(ToString::to_string));
        match outcome {
            Err(err @ CliError::Usage(_)) => assert_eq!(err.exit_code(), 2),
            other => panic!("expected Usage, got {other:?}"),
        }
    }

    #[test]
    fn missing_values_are_usage_errors() {
        let outcome = parse(["--device"].iter().map(ToString::to_string));
        assert!(matches!(outcome, Err(CliError::Usage(_))));
    }
}
