//! Explains why a MongoDB query cannot be observed by oplog tailing.
//!
//! [`OplogChecker`] runs an ordered chain of rules over a [`QueryDescriptor`] and returns either
//! [`Verdict::Eligible`] or the [`Diagnosis`] from the first rule that objects.

pub mod checker;
pub mod checks;
pub mod cli;
pub mod config;
pub mod devlog;
pub mod diagnosis;
pub mod driver;
pub mod errors;
pub mod logger;
pub mod query;
pub mod types;

pub use checker::OplogChecker;
pub use config::{AppConfig, CheckConfig};
pub use diagnosis::{Diagnosis, ReasonCode, Verdict};
pub use driver::{DriverKind, ObservationDriver};
pub use errors::OplogError;
pub use types::{QueryDescriptor, QueryOptions};

/// Check a single query against the given configuration.
pub fn check_why_no_oplog(
    config: &CheckConfig,
    query: &QueryDescriptor,
    driver: Option<&dyn ObservationDriver>,
) -> Verdict {
    OplogChecker::new(config.clone()).check(query, driver)
}

/// Initializes logging from the `OPLOGCHECK_LOG_*` environment variables.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a logger is already installed.
pub fn init() -> Result<(), OplogError> {
    logger::configure_from_env()
}
