//! Process logging bootstrap.
//!
//! # Responsibility
//! - Install the `flexi_logger` backend behind the `log` facade once per
//!   process, writing either to stderr or to rotating files.
//! - Capture panics as log events.
//!
//! # Invariants
//! - Library modules only emit through `log`; they never install a logger.
//! - Initialization is idempotent for an identical level and target, and
//!   rejects any attempt to switch either afterwards.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "trellis";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rotating files inside an absolute directory.
    Directory(PathBuf),
}

struct ActiveLogger {
    level: &'static str,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts logging at `level` towards `target`.
///
/// # Errors
/// - Unknown level, or a relative/empty directory.
/// - Directory creation or backend start-up failure.
/// - Logging already active with a different level or target.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), String> {
    let level = normalize_level(level)?;
    let target = normalize_target(target)?;

    let active = ACTIVE.get_or_try_init(|| start_logger(level, target.clone()))?;
    if active.target != target {
        return Err(format!(
            "logging already initialized towards {}; refusing to switch to {}",
            describe(&active.target),
            describe(&target)
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already initialized at level `{}`; refusing to switch to `{}`",
            active.level, level
        ));
    }
    Ok(())
}

/// Active `(level, target)`, or `None` before initialization.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.target.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, target: LogTarget) -> Result<ActiveLogger, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let handle = match &target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start(),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
        }
    }
    .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} target={} version={}",
        level,
        describe(&target),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target,
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_target(target: LogTarget) -> Result<LogTarget, String> {
    match target {
        LogTarget::Stderr => Ok(LogTarget::Stderr),
        LogTarget::Directory(dir) => {
            if dir.as_os_str().is_empty() {
                return Err("log directory cannot be empty".to_string());
            }
            if !Path::new(&dir).is_absolute() {
                return Err(format!(
                    "log directory must be absolute, got `{}`",
                    dir.display()
                ));
            }
            Ok(LogTarget::Directory(dir))
        }
    }
}

fn describe(target: &LogTarget) -> String {
    match target {
        LogTarget::Stderr => "stderr".to_string(),
        LogTarget::Directory(dir) => format!("`{}`", dir.display()),
    }
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(panic_info);
    }));
}

// Log lines are parsed line by line; payloads must not break that.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_target, single_line, LogTarget,
    };
    use std::path::PathBuf;

    #[test]
    fn normalizes_known_levels() {
        assert_eq!(normalize_level(" WARNING ").expect("warning"), "warn");
        assert_eq!(normalize_level("Trace").expect("trace"), "trace");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn rejects_relative_log_directory() {
        let err = normalize_target(LogTarget::Directory(PathBuf::from("logs/dev")))
            .expect_err("relative directory must be rejected");
        assert!(err.contains("absolute"));
    }

    #[test]
    fn flattens_and_truncates_payloads() {
        let line = single_line("one\ntwo\rthree", 7);
        assert_eq!(line, "one two...");
        assert_eq!(single_line("short", 10), "short");
    }

    #[test]
    fn init_is_idempotent_and_rejects_switching() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = LogTarget::Directory(dir.path().to_path_buf());

        init_logging("info", target.clone()).expect("first init");
        init_logging("INFO", target.clone()).expect("same config is idempotent");

        let level_err = init_logging("debug", target.clone()).expect_err("level switch");
        assert!(level_err.contains("refusing to switch"));
        let target_err = init_logging("info", LogTarget::Stderr).expect_err("target switch");
        assert!(target_err.contains("refusing to switch"));

        let (level, active) = logging_status().expect("logging active");
        assert_eq!(level, "info");
        assert_eq!(active, target);
    }
}
