//! Log Module

use colored::Colorize;
use std::io::Write;
use std::sync::{Once, RwLock};

static INIT: Once = Once::new();
static LOG_LEVEL: RwLock<LogLevel> = RwLock::new(LogLevel::Info);

/// This enum is used to represent the different log levels
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Log,
    Warn,
    Error,
}

impl LogLevel {
    fn from_name(name: &str) -> LogLevel {
        match name {
            "Debug" => LogLevel::Debug,
            "Info" => LogLevel::Info,
            "Log" => LogLevel::Log,
            "Warn" => LogLevel::Warn,
            "Error" => LogLevel::Error,
            _ => LogLevel::Log,
        }
    }
}

/// Initializes the log level, which is called only once when the program starts
fn init_log_level() {
    let level = std::env::var("BUILDBOT_LOG_LEVEL").unwrap_or_else(|_| "Info".to_string());
    if let Ok(mut write_lock) = LOG_LEVEL.write() {
        *write_lock = LogLevel::from_name(&level);
    }
}

/// This function is used to log messages to the console
/// # Arguments
/// * `level` - The log level of the message
/// * `message` - The message to log
/// # Example
/// ```
/// use buildbot::utils::log::{log, LogLevel};
/// log(LogLevel::Info, "Hello World!");
/// ```
///
/// # Level setting
/// The log level can be set by setting the environment variable `BUILDBOT_LOG_LEVEL`
/// to one of the following values:
/// * `Debug`
/// * `Info`
/// * `Log`
/// * `Warn`
/// * `Error`
/// If the environment variable is not set, the default log level is `Info`
pub fn log(level: LogLevel, message: &str) {
    INIT.call_once(|| {
        init_log_level();
    });
    let level_str = match level {
        LogLevel::Debug => "[DEBUG]".purple(),
        LogLevel::Info => "[INFO]".blue(),
        LogLevel::Log => "[LOG]".green(),
        LogLevel::Warn => "[WARN]".yellow(),
        LogLevel::Error => "[ERROR]".red(),
    };
    let threshold = LOG_LEVEL.read().map(|l| *l).unwrap_or(LogLevel::Info);
    if level >= threshold {
        println!("{} {}", level_str, message);
        // Child processes share stdout, keep our lines ahead of theirs
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("Debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("Warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Log);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Log < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
