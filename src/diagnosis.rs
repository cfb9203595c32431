//! Outcomes of an eligibility check.
//!
//! A check either has no objection ([`Verdict::Eligible`]) or produces a [`Diagnosis`] carrying a
//! stable [`ReasonCode`], a reason for display, and a hint for the operator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NoEnv,
    DisableOplog,
    MinimongoMatcherError,
    NotSupportedFields,
    SkipNotSupported,
    WhereNotSupported,
    GeoNotSupported,
    LimitNoSort,
    MinimongoSorterError,
    GitCheckout,
    OplogSupported,
}

impl ReasonCode {
    pub const fn all() -> &'static [ReasonCode] {
        &[
            Self::NoEnv,
            Self::DisableOplog,
            Self::MinimongoMatcherError,
            Self::NotSupportedFields,
            Self::SkipNotSupported,
            Self::WhereNotSupported,
            Self::GeoNotSupported,
            Self::LimitNoSort,
            Self::MinimongoSorterError,
            Self::GitCheckout,
            Self::OplogSupported,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoEnv => "NO_ENV",
            Self::DisableOplog => "DISABLE_OPLOG",
            Self::MinimongoMatcherError => "MINIMONGO_MATCHER_ERROR",
            Self::NotSupportedFields => "NOT_SUPPORTED_FIELDS",
            Self::SkipNotSupported => "SKIP_NOT_SUPPORTED",
            Self::WhereNotSupported => "WHERE_NOT_SUPPORTED",
            Self::GeoNotSupported => "GEO_NOT_SUPPORTED",
            Self::LimitNoSort => "LIMIT_NO_SORT",
            Self::MinimongoSorterError => "MINIMONGO_SORTER_ERROR",
            Self::GitCheckout => "GIT_CHECKOUT",
            Self::OplogSupported => "OPLOG_SUPPORTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == s)
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Self::NoEnv => "no oplog source is configured for this deployment",
            Self::DisableOplog => "the query explicitly opted out of oplog tailing",
            Self::MinimongoMatcherError => "the selector cannot be compiled by the matcher",
            Self::NotSupportedFields => "the projection uses operators that cannot be applied incrementally",
            Self::SkipNotSupported => "skip cannot be maintained against a tailed feed",
            Self::WhereNotSupported => "$where predicates cannot be evaluated incrementally",
            Self::GeoNotSupported => "geospatial operators cannot be evaluated incrementally",
            Self::LimitNoSort => "a limit needs a sort to decide which documents stay in the window",
            Self::MinimongoSorterError => "the sort specifier cannot be turned into a comparator",
            Self::GitCheckout => "running from a source checkout, oplog support is unverified",
            Self::OplogSupported => "the active driver is already tailing this query",
        }
    }

    /// True for the only code that confirms tailing rather than disqualifying it.
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::OplogSupported)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: ReasonCode,
    pub reason: String,
    pub solution: String,
}

impl Diagnosis {
    pub fn new(code: ReasonCode, reason: impl Into<String>, solution: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() { code.describe().to_string() } else { reason };
        Self { code, reason, solution: solution.into() }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

/// Result of a single rule or of the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "diagnosis", rename_all = "snake_case")]
pub enum Verdict {
    Eligible,
    Diagnosed(Diagnosis),
}

impl Verdict {
    pub fn fail(code: ReasonCode, reason: impl Into<String>, solution: impl Into<String>) -> Self {
        Self::Diagnosed(Diagnosis::new(code, reason, solution))
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    pub fn code(&self) -> Option<ReasonCode> {
        match self {
            Self::Eligible => None,
            Self::Diagnosed(d) => Some(d.code),
        }
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Self::Eligible => None,
            Self::Diagnosed(d) => Some(d),
        }
    }

    /// Eligible, or confirmed by the driver.
    pub fn supports_oplog(&self) -> bool {
        self.code().is_none_or(ReasonCode::is_supported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_screaming_snake() {
        for code in ReasonCode::all() {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            assert_eq!(ReasonCode::parse(code.as_str()), Some(*code));
        }
    }

    #[test]
    fn empty_reason_falls_back_to_description() {
        let d = Diagnosis::new(ReasonCode::SkipNotSupported, "  ", "");
        assert_eq!(d.reason, ReasonCode::SkipNotSupported.describe());
    }

    #[test]
    fn supported_code_counts_as_oplog() {
        assert!(Verdict::Eligible.supports_oplog());
        assert!(Verdict::fail(ReasonCode::OplogSupported, "x", "y").supports_oplog());
        assert!(!Verdict::fail(ReasonCode::NoEnv, "x", "y").supports_oplog());
    }
}
