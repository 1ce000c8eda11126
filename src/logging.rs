//! Logging setup.
//!
//! Lines go to stderr in the format the surrounding shell scripts grep for:
//!
//! ```text
//! @[2026-10-19T09:41:07.123][encryption-util][SEVERE] Error in decrypting secret artifact: ...
//! ```

use std::io;

use chrono::Local;
use fern::Dispatch;
use log::{Level, LevelFilter};

/// Environment variable consulted for the log level.
pub const LOG_ENV: &str = "ENCRYPTION_UTIL_LOG";

const COMPONENT: &str = "encryption-util";

/// Severity vocabulary of the `trace` collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Severe,
    Warning,
    Info,
    Fine,
    Finer,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Severe => "SEVERE",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Fine => "FINE",
            Severity::Finer => "FINER",
        }
    }

    fn level(self) -> Level {
        match self {
            Severity::Severe => Level::Error,
            Severity::Warning => Level::Warn,
            Severity::Info => Level::Info,
            Severity::Fine => Level::Debug,
            Severity::Finer => Level::Trace,
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Severity::Severe,
            Level::Warn => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug => Severity::Fine,
            Level::Trace => Severity::Finer,
        }
    }
}

/// Emits `message` at `severity`. Fire-and-forget.
pub fn trace(severity: Severity, message: &str) {
    log::log!(severity.level(), "{}", message);
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") | Some("severe") => LevelFilter::Error,
        Some("warn") | Some("warning") => LevelFilter::Warn,
        Some("debug") | Some("fine") => LevelFilter::Debug,
        Some("trace") | Some("finer") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Resolves the level from the environment, raised one step per `verbose`.
///
/// Never below `Error`: the SEVERE failure line is always emitted, even with
/// the level set to `off`.
pub fn logging_level(verbose: u8) -> LevelFilter {
    resolve(std::env::var(LOG_ENV).ok().as_deref(), verbose)
}

fn resolve(value: Option<&str>, verbose: u8) -> LevelFilter {
    raise(parse_level(value), verbose).max(LevelFilter::Error)
}

fn raise(base: LevelFilter, steps: u8) -> LevelFilter {
    let mut level = base;
    for _ in 0..steps {
        level = match level {
            LevelFilter::Off => LevelFilter::Error,
            LevelFilter::Error => LevelFilter::Warn,
            LevelFilter::Warn => LevelFilter::Info,
            LevelFilter::Info => LevelFilter::Debug,
            LevelFilter::Debug | LevelFilter::Trace => LevelFilter::Trace,
        };
    }
    level
}

pub fn format_line(timestamp: &str, level: Level, message: &std::fmt::Arguments<'_>) -> String {
    format!(
        "@[{}][{}][{}] {}",
        timestamp,
        COMPONENT,
        Severity::from(level).as_str(),
        message
    )
}

/// Installs the global logger. Failure to install is reported but not fatal.
pub fn setup_logger(verbose: u8) {
    let level_filter = logging_level(verbose);

    if let Err(e) = Dispatch::new()
        .format(|out, message, record| {
            let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
            out.finish(format_args!(
                "{}",
                format_line(&timestamp, record.level(), message)
            ))
        })
        .level(level_filter)
        .chain(io::stderr())
        .apply()
    {
        eprintln!("logger initialization failed: {e}");
    }
    log::debug!("enabled log level {level_filter}");
}
