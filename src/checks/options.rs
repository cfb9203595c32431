use crate::diagnosis::{ReasonCode, Verdict};
use crate::types::QueryDescriptor;
use bson::Bson;

pub fn disable_oplog(query: &QueryDescriptor) -> Verdict {
    if !query.options.disable_oplog {
        return Verdict::Eligible;
    }
    Verdict::fail(
        ReasonCode::DisableOplog,
        "The query sets _disableOplog, which forces the polling driver.",
        "Remove the _disableOplog option if this query should be tailed.",
    )
}

/// Plain inclusion/exclusion projections only: values must be 1, 0, true or false. Operator
/// projections (`$elemMatch`, `$slice`, `$meta`) and positional `a.$` keys are rejected.
pub fn fields(query: &QueryDescriptor) -> Verdict {
    let Some(projection) = &query.options.fields else {
        return Verdict::Eligible;
    };
    let offending = projection.iter().find_map(|(key, value)| {
        if key.starts_with('$') || key.ends_with(".$") || key.contains(".$.") {
            return Some(key.clone());
        }
        match value {
            Bson::Document(d) => Some(
                d.keys()
                    .find(|k| k.starts_with('$'))
                    .map_or_else(|| format!("{key}: {value}"), |op| format!("{key}.{op}")),
            ),
            Bson::Boolean(_) => None,
            Bson::Int32(0 | 1) | Bson::Int64(0 | 1) => None,
            Bson::Double(d) if *d == 0.0 || *d == 1.0 => None,
            other => Some(format!("{key}: {other}")),
        }
    });
    match offending {
        None => Verdict::Eligible,
        Some(key) => Verdict::fail(
            ReasonCode::NotSupportedFields,
            format!("The projection uses {key}, which oplog tailing does not support."),
            "Project plain fields only and filter or slice array contents on the client.",
        ),
    }
}

pub fn skip(query: &QueryDescriptor) -> Verdict {
    match query.options.effective_skip() {
        None => Verdict::Eligible,
        Some(n) => Verdict::fail(
            ReasonCode::SkipNotSupported,
            format!("The query uses skip ({n}), which cannot be maintained from the oplog."),
            "Paginate with a range selector on the sort key plus limit instead of skip.",
        ),
    }
}

pub fn limit_without_sort(query: &QueryDescriptor) -> Verdict {
    let opts = &query.options;
    match (opts.effective_limit(), opts.sort_spec()) {
        (Some(n), None) => Verdict::fail(
            ReasonCode::LimitNoSort,
            format!("The query has limit ({n}) but no sort, so the window of documents is not deterministic."),
            "Add a sort specifier to the query alongside the limit.",
        ),
        _ => Verdict::Eligible,
    }
}
