//! The eligibility rules, in evaluation order.
//!
//! Each rule is a pure function of the [`CheckContext`]. The chain stops at the first rule that
//! returns a diagnosis, so the order of [`RULES`] is the precedence between reasons.

mod engines;
mod environment;
mod fast_path;
mod options;
mod selector;

pub use engines::{matcher, sorter};
pub use environment::{env, git_checkout};
pub use fast_path::driver_supported;
pub use options::{disable_oplog, fields, limit_without_sort, skip};
pub use selector::{geo, where_clause};

use crate::config::CheckConfig;
use crate::diagnosis::{ReasonCode, Verdict};
use crate::driver::ObservationDriver;
use crate::types::QueryDescriptor;

/// Everything a rule may look at.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub config: &'a CheckConfig,
    pub query: &'a QueryDescriptor,
    pub driver: Option<&'a dyn ObservationDriver>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        config: &'a CheckConfig,
        query: &'a QueryDescriptor,
        driver: Option<&'a dyn ObservationDriver>,
    ) -> Self {
        Self { config, query, driver }
    }
}

pub struct Rule {
    pub name: &'static str,
    pub code: ReasonCode,
    run: fn(&CheckContext<'_>) -> Verdict,
}

impl Rule {
    pub fn evaluate(&self, cx: &CheckContext<'_>) -> Verdict {
        (self.run)(cx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).field("code", &self.code).finish()
    }
}

pub static RULES: &[Rule] = &[
    Rule { name: "env", code: ReasonCode::NoEnv, run: |cx| env(cx.config) },
    Rule { name: "driver", code: ReasonCode::OplogSupported, run: |cx| driver_supported(cx.query, cx.driver) },
    Rule { name: "disable-oplog", code: ReasonCode::DisableOplog, run: |cx| disable_oplog(cx.query) },
    Rule { name: "matcher", code: ReasonCode::MinimongoMatcherError, run: |cx| matcher(cx.config, cx.query) },
    Rule { name: "fields", code: ReasonCode::NotSupportedFields, run: |cx| fields(cx.query) },
    Rule { name: "skip", code: ReasonCode::SkipNotSupported, run: |cx| skip(cx.query) },
    Rule { name: "where", code: ReasonCode::WhereNotSupported, run: |cx| where_clause(cx.query) },
    Rule { name: "geo", code: ReasonCode::GeoNotSupported, run: |cx| geo(cx.query) },
    Rule { name: "limit-no-sort", code: ReasonCode::LimitNoSort, run: |cx| limit_without_sort(cx.query) },
    Rule { name: "sorter", code: ReasonCode::MinimongoSorterError, run: |cx| sorter(cx.config, cx.query) },
    Rule { name: "git-checkout", code: ReasonCode::GitCheckout, run: |cx| git_checkout(cx.config) },
];

pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.name == name)
}
