//! Logging setup: three independently-leveled sinks (stdout, rotating log
//! file, JS-console file) built on `tracing-subscriber` + `tracing-appender`.
//!
//! Levels are the CLI's `0=Debug .. 5=Off` numbering, mapped through an
//! explicit table rather than deriving from `tracing::Level`'s own
//! ordering, since "5=Off" has no `tracing::Level` counterpart.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{FilterFn, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Target console.log/error output inside engine-evaluated scripts is
/// logged under, so the jsfile sink can select just that stream.
pub const JS_LOG_TARGET: &str = "dsep::js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Off,
}

/// `0=Debug, 1=Info, 2=Warning, 3=Error, 4=Critical, 5=Off`; anything past
/// 5 also means Off.
pub fn level_from_u8(n: u8) -> LogLevel {
    match n {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        2 => LogLevel::Warning,
        3 => LogLevel::Error,
        4 => LogLevel::Critical,
        _ => LogLevel::Off,
    }
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Guards that must stay alive for the duration of the process; dropping
/// one stops its non-blocking writer thread and silently drops log lines.
#[must_use]
pub struct LoggingGuards {
    _stdout: Option<WorkerGuard>,
    _file: Option<WorkerGuard>,
    _jsfile: Option<WorkerGuard>,
}

/// Install the global subscriber from the three CLI-level sinks. `log_dir`
/// is only opened when `file_level` or `jsfile_level` is not `Off`.
pub fn init(
    stdout_level: LogLevel,
    file_level: LogLevel,
    jsfile_level: LogLevel,
    log_dir: &Path,
    rotate: bool,
    keep: usize,
) -> std::io::Result<LoggingGuards> {
    let registry = tracing_subscriber::registry();

    let (stdout_layer, stdout_guard) = if stdout_level != LogLevel::Off {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        let layer = fmt::layer()
            .with_writer(writer)
            .with_filter(stdout_level.to_filter())
            .with_filter(FilterFn::new(|meta| meta.target() != JS_LOG_TARGET));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let (file_layer, file_guard) = if file_level != LogLevel::Off {
        std::fs::create_dir_all(log_dir)?;
        let appender = rolling_appender(log_dir, "dsed", rotate, keep)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(file_level.to_filter())
            .with_filter(FilterFn::new(|meta| meta.target() != JS_LOG_TARGET));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let (jsfile_layer, jsfile_guard) = if jsfile_level != LogLevel::Off {
        std::fs::create_dir_all(log_dir)?;
        let appender = rolling_appender(log_dir, "dsed-js", rotate, keep)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(jsfile_level.to_filter())
            .with_filter(FilterFn::new(|meta| meta.target() == JS_LOG_TARGET));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    registry.with(stdout_layer).with(file_layer).with(jsfile_layer).init();

    Ok(LoggingGuards { _stdout: stdout_guard, _file: file_guard, _jsfile: jsfile_guard })
}

fn rolling_appender(
    dir: &Path,
    prefix: &str,
    rotate: bool,
    keep: usize,
) -> std::io::Result<RollingFileAppender> {
    let rotation = if rotate { Rotation::DAILY } else { Rotation::NEVER };
    let mut builder = RollingFileAppender::builder().rotation(rotation).filename_prefix(prefix);
    if rotate && keep > 0 {
        builder = builder.max_log_files(keep);
    }
    builder.build(dir).map_err(|e| std::io::Error::other(e.to_string()))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
