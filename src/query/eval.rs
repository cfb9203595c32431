use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::parse::{as_integral, as_number};
use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, TypeSpec};

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Nor(fs) => !fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => !lookup(doc, path).is_empty() == *exists,
        Filter::In { path, values } => in_set(&lookup(doc, path), values),
        Filter::Nin { path, values } => !in_set(&lookup(doc, path), values),
        Filter::All { path, values } => {
            let found = expand(&lookup(doc, path));
            !values.is_empty() && values.iter().all(|want| found.iter().any(|v| values_equal(v, want)))
        }
        Filter::Cmp { path, op, value } => eval_cmp(&lookup(doc, path), *op, value),
        Filter::Size { path, len } => {
            lookup(doc, path).iter().any(|v| matches!(v, Bson::Array(items) if items.len() == *len))
        }
        Filter::Mod { path, divisor, remainder } => expand(&lookup(doc, path))
            .iter()
            .filter_map(|v| as_integral(v))
            .any(|n| n.checked_rem(*divisor).unwrap_or(0) == *remainder),
        Filter::Type { path, spec } => {
            let found = lookup(doc, path);
            found.iter().any(|v| type_matches(v, *spec)) || expand(&found).iter().any(|v| type_matches(v, *spec))
        }
        Filter::Regex { path, pattern, options } => expand(&lookup(doc, path))
            .iter()
            .any(|v| regex_matches(v, pattern, options)),
        Filter::ElemMatch { path, filter, scalar } => lookup(doc, path).iter().any(|v| match v {
            Bson::Array(items) => items.iter().any(|item| elem_matches(item, filter, *scalar)),
            _ => false,
        }),
        Filter::Where(_) | Filter::Geo { .. } => false,
    }
}

fn elem_matches(item: &Bson, filter: &Filter, scalar: bool) -> bool {
    if scalar {
        let mut wrapper = BsonDocument::new();
        wrapper.insert("", item.clone());
        eval_filter(&wrapper, filter)
    } else {
        matches!(item, Bson::Document(d) if eval_filter(d, filter))
    }
}

fn eval_cmp(found: &[&Bson], op: CmpOp, value: &Bson) -> bool {
    match op {
        CmpOp::Eq => {
            if matches!(value, Bson::Null) && found.is_empty() {
                return true;
            }
            expand(found).iter().any(|v| values_equal(v, value))
        }
        CmpOp::Ne => !eval_cmp(found, CmpOp::Eq, value),
        CmpOp::Gt | CmpOp::Gte | CmpOp::Lt | CmpOp::Lte => expand(found).iter().any(|v| {
            if !comparable(v, value) {
                return false;
            }
            let c = compare_bson(v, value);
            match op {
                CmpOp::Gt => c == Ordering::Greater,
                CmpOp::Gte => c != Ordering::Less,
                CmpOp::Lt => c == Ordering::Less,
                _ => c != Ordering::Greater,
            }
        }),
    }
}

fn in_set(found: &[&Bson], set: &[Bson]) -> bool {
    if found.is_empty() {
        return set.iter().any(|x| matches!(x, Bson::Null));
    }
    let candidates = expand(found);
    set.iter().take(MAX_IN_SET).any(|x| match x {
        Bson::RegularExpression(r) => {
            candidates.iter().any(|v| regex_matches(v, r.pattern.as_str(), r.options.as_str()))
        }
        _ => candidates.iter().any(|v| values_equal(v, x)),
    })
}

/// Values found at a path plus the elements of any arrays among them.
fn expand<'a>(found: &[&'a Bson]) -> Vec<&'a Bson> {
    let mut out = Vec::with_capacity(found.len());
    for v in found {
        out.push(*v);
        if let Bson::Array(items) = *v {
            out.extend(items.iter());
        }
    }
    out
}

/// Resolve a dotted path, fanning out across arrays of sub-documents.
pub(crate) fn lookup<'a>(doc: &'a BsonDocument, path: &str) -> Vec<&'a Bson> {
    let parts: Vec<&str> = if path.is_empty() { vec![""] } else { path.split('.').collect() };
    let mut out = Vec::new();
    if parts.len() > MAX_PATH_DEPTH {
        return out;
    }
    if let Some(v) = doc.get(parts[0]) {
        descend(v, &parts[1..], &mut out);
    }
    out
}

fn descend<'a>(v: &'a Bson, rest: &[&str], out: &mut Vec<&'a Bson>) {
    let Some((head, tail)) = rest.split_first() else {
        out.push(v);
        return;
    };
    match v {
        Bson::Document(d) => {
            if let Some(next) = d.get(*head) {
                descend(next, tail, out);
            }
        }
        Bson::Array(items) => {
            if let Ok(idx) = head.parse::<usize>() {
                if let Some(next) = items.get(idx) {
                    descend(next, tail, out);
                }
            } else {
                for item in items {
                    if let Bson::Document(d) = item
                        && let Some(next) = d.get(*head)
                    {
                        descend(next, tail, out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn comparable(a: &Bson, b: &Bson) -> bool {
    (as_number(a).is_some() && as_number(b).is_some()) || type_rank(a) == type_rank(b)
}

fn type_matches(v: &Bson, spec: TypeSpec) -> bool {
    match spec {
        TypeSpec::Number => as_number(v).is_some() || matches!(v, Bson::Decimal128(_)),
        TypeSpec::Code(code) => {
            let actual = match v {
                Bson::MinKey => -1,
                other => i32::from(other.element_type() as u8),
            };
            actual == code
        }
    }
}

fn regex_matches(v: &Bson, pattern: &str, options: &str) -> bool {
    let Bson::String(s) = v else {
        return false;
    };
    #[cfg(feature = "regex")]
    {
        build_regex(pattern, options).is_ok_and(|re| re.is_match(s))
    }
    #[cfg(not(feature = "regex"))]
    {
        let _ = (s, pattern, options);
        false
    }
}

#[cfg(feature = "regex")]
pub(crate) fn build_regex(pattern: &str, options: &str) -> Result<regex::Regex, regex::Error> {
    let mut re = regex::RegexBuilder::new(pattern);
    re.case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'));
    re.build()
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        (T::DateTime(x), T::DateTime(y)) => x.cmp(y),
        (T::ObjectId(x), T::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Cross-type ordering follows the server's canonical BSON comparison order.
fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::DbPointer(_) => 12,
        T::JavaScriptCode(_) => 13,
        T::JavaScriptCodeWithScope(_) => 14,
        T::MaxKey => 255,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile_selector;
    use bson::doc;

    fn matches(selector: BsonDocument, doc: BsonDocument) -> bool {
        eval_filter(&doc, &compile_selector(&selector).unwrap())
    }

    #[test]
    fn array_fields_match_elementwise() {
        assert!(matches(doc! { "tags": "a" }, doc! { "tags": ["b", "a"] }));
        assert!(matches(doc! { "n": { "$gt": 5 } }, doc! { "n": [1, 9] }));
        assert!(!matches(doc! { "n": { "$gt": 10 } }, doc! { "n": [1, 9] }));
    }

    #[test]
    fn dotted_paths_through_arrays() {
        let d = doc! { "items": [ { "sku": "x" }, { "sku": "y" } ] };
        assert!(matches(doc! { "items.sku": "y" }, d.clone()));
        assert!(matches(doc! { "items.1.sku": "y" }, d));
    }

    #[test]
    fn null_equality_matches_missing() {
        assert!(matches(doc! { "gone": Bson::Null }, doc! { "a": 1 }));
        assert!(!matches(doc! { "a": { "$ne": 1 } }, doc! { "a": 1 }));
    }

    #[test]
    fn type_bracketing_on_ranges() {
        assert!(!matches(doc! { "a": { "$gt": 1 } }, doc! { "a": "zzz" }));
        assert!(matches(doc! { "a": { "$gte": 1 } }, doc! { "a": 1.0 }));
    }

    #[test]
    fn where_and_geo_never_match() {
        assert!(!matches(doc! { "$where": "true" }, doc! { "a": 1 }));
        assert!(!matches(doc! { "loc": { "$near": [0, 0] } }, doc! { "loc": [0, 0] }));
    }

    #[test]
    fn mod_by_minus_one_does_not_overflow() {
        assert!(matches(doc! { "a": { "$mod": [-1_i64, 0] } }, doc! { "a": i64::MIN }));
        assert!(!matches(doc! { "a": { "$mod": [-1_i64, 1] } }, doc! { "a": i64::MIN }));
        assert!(matches(doc! { "a": { "$mod": [4, 1] } }, doc! { "a": [8, 9] }));
    }

    #[test]
    fn scalar_elem_match() {
        assert!(matches(doc! { "n": { "$elemMatch": { "$gte": 3, "$lt": 5 } } }, doc! { "n": [1, 4] }));
        assert!(!matches(doc! { "n": { "$elemMatch": { "$gte": 3, "$lt": 4 } } }, doc! { "n": [1, 4] }));
    }
}
