//! log4rs setup. `app.log` takes the root logger; `verdicts.log` gets one line per evaluated query
//! (target [`VERDICT_TARGET`]); `dev.log` receives [`crate::dev_trace!`] output when enabled.

use crate::errors::OplogError;
use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

pub const VERDICT_TARGET: &str = "oplogcheck::verdicts";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

fn log_err(e: impl std::fmt::Display) -> OplogError {
    OplogError::Logging(e.to_string())
}

pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, OplogError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(log_err)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(log_err)
}

/// Build the rolling-file configuration without installing it.
///
/// # Errors
/// Returns an error if the directory or an appender cannot be created.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev: bool,
) -> Result<Config, OplogError> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("verdicts", Box::new(rolling(&base, "verdicts", keep)?)))
        .logger(Logger::builder().appender("verdicts").additive(false).build(VERDICT_TARGET, lvl));

    builder = if enable_dev {
        builder
            .appender(Appender::builder().build("dev", Box::new(rolling(&base, "dev", keep)?)))
            .logger(
                Logger::builder()
                    .appender("dev")
                    .additive(false)
                    .build(crate::devlog::DEV_TARGET, LevelFilter::Trace),
            )
    } else {
        builder.logger(Logger::builder().additive(false).build(crate::devlog::DEV_TARGET, LevelFilter::Off))
    };

    builder.build(Root::builder().appender("app").build(lvl)).map_err(log_err)
}

/// Configure logging for the process.
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// # Errors
/// Returns an error if the configuration cannot be built or a logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev: bool,
) -> Result<(), OplogError> {
    let config = build_config(dir, level, retention, enable_dev)?;
    log4rs::init_config(config).map_err(log_err)?;
    Ok(())
}

/// Configure logging from environment variables:
/// - OPLOGCHECK_LOG_DIR
/// - OPLOGCHECK_LOG_LEVEL
/// - OPLOGCHECK_LOG_RETENTION
/// - OPLOGCHECK_DEV_TRACE
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), OplogError> {
    let dir = std::env::var(crate::config::ENV_LOG_DIR).ok().map(PathBuf::from);
    let level = std::env::var(crate::config::ENV_LOG_LEVEL).ok();
    let retention =
        std::env::var("OPLOGCHECK_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    let dev = std::env::var("OPLOGCHECK_DEV_TRACE")
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    configure_logging(dir.as_deref(), level.as_deref(), retention, dev)
}
