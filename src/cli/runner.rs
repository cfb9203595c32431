use crate::checker::OplogChecker;
use crate::checks::RULES;
use crate::diagnosis::{ReasonCode, Verdict};
use crate::driver::ObservationDriver;
use crate::errors::OplogError;
use std::io::Write;

use super::command::Command;
use super::util::read_query;

mod built {
    include!(concat!(env!("OUT_DIR"), "/compiled_features.rs"));
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_DISQUALIFIED: i32 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// Run a command, printing to stdout in human format.
///
/// # Errors
/// See [`run_with_format`].
pub fn run(checker: &OplogChecker, cmd: Command) -> Result<i32, OplogError> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    run_with_format(checker, cmd, OutputMode::Human, &mut lock)
}

/// Run a command and return the process exit code.
///
/// # Errors
/// Returns an error if the query cannot be loaded or output cannot be written.
pub fn run_with_format(
    checker: &OplogChecker,
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<i32, OplogError> {
    match cmd {
        Command::Check { query, driver } => {
            let q = read_query(&query)?;
            let driver_ref = driver.as_ref().map(|d| d as &dyn ObservationDriver);
            let verdict = checker.check(&q, driver_ref);
            write_verdict(&verdict, mode, out)?;
            Ok(if verdict.supports_oplog() { EXIT_OK } else { EXIT_DISQUALIFIED })
        }
        Command::Codes => {
            let codes = ReasonCode::all();
            match mode {
                OutputMode::Json => {
                    let list: Vec<_> = codes
                        .iter()
                        .map(|c| serde_json::json!({ "code": c.as_str(), "description": c.describe() }))
                        .collect();
                    writeln!(out, "{}", serde_json::Value::Array(list))?;
                }
                OutputMode::Plain => {
                    for c in codes {
                        writeln!(out, "{c}")?;
                    }
                }
                OutputMode::Human => {
                    for c in codes {
                        writeln!(out, "{:<24} {}", c.as_str(), c.describe())?;
                    }
                }
            }
            Ok(EXIT_OK)
        }
        Command::Rules => {
            match mode {
                OutputMode::Json => {
                    let list: Vec<_> = RULES
                        .iter()
                        .enumerate()
                        .map(|(i, r)| serde_json::json!({ "order": i + 1, "name": r.name, "code": r.code }))
                        .collect();
                    writeln!(out, "{}", serde_json::Value::Array(list))?;
                }
                OutputMode::Plain | OutputMode::Human => {
                    for (i, r) in RULES.iter().enumerate() {
                        writeln!(out, "{:>2}. {:<14} {}", i + 1, r.name, r.code)?;
                    }
                }
            }
            Ok(EXIT_OK)
        }
        Command::Info => {
            let features = built::COMPILED_FEATURES;
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "package_name": env!("CARGO_PKG_NAME"),
                        "package_version": env!("CARGO_PKG_VERSION"),
                        "compiled_features": features,
                        "oplog_source": checker.config().has_oplog_source(),
                        "release": checker.config().official_release(),
                        "matcher": checker.config().matcher.is_some(),
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain | OutputMode::Human => {
                    writeln!(out, "{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
                    writeln!(out, "features={}", features.join(","))?;
                    writeln!(out, "oplog_source={}", checker.config().has_oplog_source())?;
                    writeln!(out, "release={}", checker.config().official_release().unwrap_or("none"))?;
                }
            }
            Ok(EXIT_OK)
        }
    }
}

fn write_verdict(verdict: &Verdict, mode: OutputMode, out: &mut dyn Write) -> Result<(), OplogError> {
    match (mode, verdict) {
        (OutputMode::Json, Verdict::Eligible) => {
            writeln!(out, "{}", serde_json::json!({ "eligible": true, "code": null }))?;
        }
        (OutputMode::Json, Verdict::Diagnosed(d)) => {
            let json = serde_json::json!({
                "eligible": d.code.is_supported(),
                "code": d.code,
                "reason": d.reason,
                "solution": d.solution,
            });
            writeln!(out, "{json}")?;
        }
        (OutputMode::Plain, Verdict::Eligible) => writeln!(out, "ELIGIBLE")?,
        (OutputMode::Plain, Verdict::Diagnosed(d)) => writeln!(out, "{}", d.code)?,
        (OutputMode::Human, Verdict::Eligible) => {
            writeln!(out, "eligible: no rule objects to tailing this query")?;
        }
        (OutputMode::Human, Verdict::Diagnosed(d)) => {
            writeln!(out, "code:     {}", d.code)?;
            writeln!(out, "reason:   {}", d.reason)?;
            writeln!(out, "solution: {}", d.solution)?;
        }
    }
    Ok(())
}
