use crate::diagnosis::{ReasonCode, Verdict};
use crate::query::GEO_OPERATORS;
use crate::types::QueryDescriptor;
use bson::{Bson, Document};

const LOGICAL: &[&str] = &["$and", "$or", "$nor"];

/// Visit the top level of a selector and the top level of every `$and`/`$or`/`$nor` branch.
/// Field conditions are not searched below their own operator document.
fn find_in_clauses<T>(selector: &Document, visit: &mut impl FnMut(&str, &Bson) -> Option<T>) -> Option<T> {
    for (key, value) in selector {
        if let Some(hit) = visit(key, value) {
            return Some(hit);
        }
        if LOGICAL.contains(&key.as_str())
            && let Bson::Array(branches) = value
        {
            for branch in branches {
                if let Bson::Document(d) = branch
                    && let Some(hit) = find_in_clauses(d, visit)
                {
                    return Some(hit);
                }
            }
        }
    }
    None
}

pub fn where_clause(query: &QueryDescriptor) -> Verdict {
    let found = find_in_clauses(&query.selector, &mut |key: &str, _: &Bson| (key == "$where").then_some(()));
    if found.is_none() {
        return Verdict::Eligible;
    }
    Verdict::fail(
        ReasonCode::WhereNotSupported,
        "The selector uses $where, which runs arbitrary code the oplog matcher cannot evaluate.",
        "Express the $where predicate with regular query operators.",
    )
}

pub fn geo(query: &QueryDescriptor) -> Verdict {
    let found = find_in_clauses(&query.selector, &mut |key: &str, value: &Bson| match value {
        Bson::Document(cond) => cond
            .keys()
            .find(|op| GEO_OPERATORS.contains(&op.as_str()))
            .map(|op| format!("{op} on {key}")),
        _ => None,
    });
    match found {
        None => Verdict::Eligible,
        Some(what) => Verdict::fail(
            ReasonCode::GeoNotSupported,
            format!("The selector uses a geospatial operator ({what}), which oplog tailing does not support."),
            "Drop the geospatial operator from reactive queries, or poll this query deliberately.",
        ),
    }
}
