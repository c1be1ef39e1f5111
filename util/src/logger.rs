//! Logger initialisation
//!
//! Every executable logs to stdout and to a log file in its session directory. Lines are prefixed
//! with the time since the start of the session and a coloured level tag, debug and trace lines
//! also show the module they came from:
//!
//! ```text
//! [  1.204512 INF] GoalClient subscribed to "huber/robot/goal" on tcp://localhost:1883
//! [  1.305001 DBG] servo_lib::cycle_mgr: Dropped demands: ...
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets which are too chatty to log below a given level.
const TARGET_CAPS: &[(&str, LevelFilter)] = &[
    ("zmq", LevelFilter::Info),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// `min_level` must be `Info` or more verbose, warnings and errors are never hidden.
/// 
/// Only the first call in a process can succeed.
pub fn logger_init(
    min_level: LevelFilter, 
    session: &Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let prefix = line_prefix(session::get_elapsed_seconds(), record.level());

            if record.level() > Level::Info {
                out.finish(format_args!("{} {}: {}", prefix, record.target(), message))
            }
            else {
                out.finish(format_args!("{} {}", prefix, message))
            }
        })
        .level(min_level);

    for (target, cap) in TARGET_CAPS {
        dispatch = dispatch.level_for(*target, min_level.min(*cap));
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The `[elapsed LVL]` prefix of a log line.
fn line_prefix(elapsed_s: f64, level: Level) -> String {
    format!("[{:10.6} {}]", elapsed_s, level_tag(level))
}

/// Three letter, coloured tag for a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_line_prefix() {
        colored::control::set_override(false);

        assert_eq!(line_prefix(1.5, Level::Info), "[  1.500000 INF]");
        assert_eq!(line_prefix(12.25, Level::Warn), "[ 12.250000 WRN]");
        assert!(line_prefix(f64::NAN, Level::Error).ends_with("ERR]"));
    }
}
