use crate::checks::{CheckContext, RULES};
use crate::config::CheckConfig;
use crate::diagnosis::Verdict;
use crate::driver::ObservationDriver;
use crate::logger::VERDICT_TARGET;
use crate::types::QueryDescriptor;

/// Runs the rule chain for one query at a time.
#[derive(Debug, Clone, Default)]
pub struct OplogChecker {
    config: CheckConfig,
}

impl OplogChecker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Evaluate the rules in order and return the first diagnosis, or `Eligible` if none fires.
    pub fn check(&self, query: &QueryDescriptor, driver: Option<&dyn ObservationDriver>) -> Verdict {
        let cx = CheckContext::new(&self.config, query, driver);
        let verdict = RULES
            .iter()
            .find_map(|rule| {
                let v = rule.evaluate(&cx);
                crate::dev_trace!("rule {} -> {}", rule.name, v.code().map_or("pass", |c| c.as_str()));
                match v {
                    Verdict::Eligible => None,
                    diagnosed => Some(diagnosed),
                }
            })
            .unwrap_or(Verdict::Eligible);
        match verdict.code() {
            None => log::info!(target: VERDICT_TARGET, "collection={} verdict=eligible", query.label()),
            Some(code) => log::info!(target: VERDICT_TARGET, "collection={} verdict={code}", query.label()),
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devlog::TraceCapture;
    use crate::diagnosis::ReasonCode;
    use crate::types::QueryOptions;
    use bson::doc;

    #[test]
    fn chain_stops_at_first_failure() {
        let cap = TraceCapture::start();
        let checker = OplogChecker::new(CheckConfig::default().with_oplog_url("mongodb://ssdsd"));
        let q = QueryDescriptor::new(doc! { "aa": { "$gt": 20 } })
            .with_options(QueryOptions { skip: Some(5), limit: Some(20), ..Default::default() });
        assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::SkipNotSupported));
        assert_eq!(cap.rules_run(), vec!["env", "driver", "disable-oplog", "matcher", "fields", "skip"]);
        assert_eq!(cap.take().last().map(String::as_str), Some("rule skip -> SKIP_NOT_SUPPORTED"));
    }

    #[test]
    fn all_rules_pass() {
        let checker = OplogChecker::new(
            CheckConfig::default().with_oplog_url("mongodb://ssdsd").with_release("METEOR@1.0"),
        );
        let q = QueryDescriptor::new(doc! { "aa": 10 });
        assert_eq!(checker.check(&q, None), Verdict::Eligible);
    }
}
