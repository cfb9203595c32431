use crate::driver::DriverKind;
use std::path::PathBuf;

/// Where the query JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Inline(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check {
        query: QuerySource,
        driver: Option<DriverKind>,
    },
    Codes,
    Rules,
    Info,
}
