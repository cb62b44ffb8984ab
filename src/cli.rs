//! Command-line interface for mock-pay.
//!
//! Uses lexopt to keep the binary small.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

use lexopt::prelude::*;
use thiserror::Error;

/// Command-line arguments.
///
/// Options left unset fall through to env vars, the config file and defaults.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Session lifetime in seconds.
    pub session_ttl: Option<u64>,
    /// Seconds between expired-session sweeps.
    pub sweep_interval: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Long("session-ttl") => {
                result.session_ttl = Some(parse_secs(&mut parser, "session-ttl")?);
            }
            Long("sweep-interval") => {
                result.sweep_interval = Some(parse_secs(&mut parser, "sweep-interval")?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_secs(parser: &mut lexopt::Parser, name: &'static str) -> Result<u64, ArgsError> {
    let value: String = parser.value()?.parse()?;
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ArgsError::InvalidValue(name, value)),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"mock-pay {version}
Mock payment-session simulator

USAGE:
    mock-pay [OPTIONS]

OPTIONS:
    -H, --host <ADDR>           Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>           Port to listen on [default: 3000]
    -c, --config <FILE>         Path to configuration file (JSON)
        --session-ttl <SECS>    Session lifetime in seconds [default: 600]
        --sweep-interval <SECS> Seconds between expiry sweeps [default: 60]
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    MOCK_PAY_HOST            Host address (overrides config)
    MOCK_PAY_PORT, PORT      Port number (overrides config)
    MOCK_PAY_SESSION_TTL     Session lifetime in seconds
    MOCK_PAY_SWEEP_INTERVAL  Seconds between expiry sweeps
    MOCK_PAY_LOG_LEVEL       Log level (overrides config)
    RUST_LOG                 Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, 10 minute sessions)
    mock-pay

    # Listen on all interfaces with short-lived sessions
    mock-pay -H 0.0.0.0 -p 8080 --session-ttl 120

    # Start with config file
    mock-pay -c /etc/mock-pay/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("mock-pay {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// Lexopt parsing error.
    #[error("{0}")]
    Lexopt(#[from] lexopt::Error),
    /// Invalid argument value.
    #[error("invalid value for --{0}: '{1}'")]
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    #[error("unexpected argument: '{0}'")]
    UnexpectedArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("mock-pay")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.host.is_none());
        assert!(result.port.is_none());
    }

    #[test]
    fn test_host_port() {
        let result = parse_args_from(args(&["-H", "0.0.0.0", "-p", "8080"])).unwrap();
        assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
        assert_eq!(result.port, Some(8080));
    }

    #[test]
    fn test_long_options() {
        let result =
            parse_args_from(args(&["--host", "192.168.1.1", "--port", "9000"])).unwrap();
        assert_eq!(result.host.unwrap().to_string(), "192.168.1.1");
        assert_eq!(result.port, Some(9000));
    }

    #[test]
    fn test_session_timing() {
        let result =
            parse_args_from(args(&["--session-ttl", "120", "--sweep-interval", "10"])).unwrap();
        assert_eq!(result.session_ttl, Some(120));
        assert_eq!(result.sweep_interval, Some(10));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = parse_args_from(args(&["--session-ttl", "0"])).unwrap_err();
        assert!(err.to_string().contains("session-ttl"));
    }

    #[test]
    fn test_non_numeric_interval_rejected() {
        let err = parse_args_from(args(&["--sweep-interval", "soon"])).unwrap_err();
        assert!(matches!(err, ArgsError::InvalidValue("sweep-interval", _)));
    }

    #[test]
    fn test_config_file() {
        let result = parse_args_from(args(&["-c", "/etc/config.json"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/config.json")));
    }

    #[test]
    fn test_help_and_version_flags() {
        assert!(parse_args_from(args(&["-h"])).unwrap().help);
        assert!(parse_args_from(args(&["--help"])).unwrap().help);
        assert!(parse_args_from(args(&["-V"])).unwrap().version);
        assert!(parse_args_from(args(&["--version"])).unwrap().version);
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_args_from(args(&["-p", "invalid"])).is_err());
        assert!(parse_args_from(args(&["-H", "not-an-ip"])).is_err());
        assert!(parse_args_from(args(&["--sweep-interval", "soon"])).is_err());
    }

    #[test]
    fn test_unexpected_argument() {
        let err = parse_args_from(args(&["serve"])).unwrap_err();
        assert!(matches!(err, ArgsError::UnexpectedArgument(_)));
    }
}
