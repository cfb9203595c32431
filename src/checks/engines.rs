use crate::config::CheckConfig;
use crate::diagnosis::{ReasonCode, Verdict};
use crate::types::QueryDescriptor;

/// The selector must compile. Without a matching engine there is nothing to verify, so the
/// selector is assumed supported.
pub fn matcher(config: &CheckConfig, query: &QueryDescriptor) -> Verdict {
    let Some(engine) = &config.matcher else {
        crate::dev_trace!("matcher: no engine configured, assuming supported");
        return Verdict::Eligible;
    };
    match engine.compile(&query.selector) {
        Ok(_) => Verdict::Eligible,
        Err(e) => Verdict::fail(
            ReasonCode::MinimongoMatcherError,
            format!("The selector cannot be compiled by the oplog matcher: {}", e.message()),
            "Rewrite the selector using operators the matcher supports.",
        ),
    }
}

/// A present sort specifier must compile into a comparator.
pub fn sorter(config: &CheckConfig, query: &QueryDescriptor) -> Verdict {
    let (Some(spec), Some(engine)) = (query.options.sort_spec(), &config.sorter) else {
        return Verdict::Eligible;
    };
    match engine.compile(spec) {
        Ok(_) => Verdict::Eligible,
        Err(e) => Verdict::fail(
            ReasonCode::MinimongoSorterError,
            format!("Some of the sort specifiers are not supported: {}", e.message()),
            "Sort on plain document fields; $natural and $meta sorts force polling.",
        ),
    }
}
