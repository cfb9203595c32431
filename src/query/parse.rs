use crate::errors::OplogError;
use bson::{Bson, Document};

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_NESTING, TypeSpec};

/// Operators that turn a field condition into a geospatial query.
pub const GEO_OPERATORS: &[&str] = &["$near", "$nearSphere", "$geoWithin", "$within", "$geoIntersects"];

const DISTANCE_MODIFIERS: &[&str] = &["$maxDistance", "$minDistance"];

fn err(msg: impl Into<String>) -> OplogError {
    OplogError::Matcher(msg.into())
}

/// Compile a selector document into a filter tree.
///
/// # Errors
/// Returns `OplogError::Matcher` when the selector uses an operator the matcher cannot
/// evaluate or an operator value of the wrong shape (e.g. `{a: {$in: null}}`).
pub fn compile_selector(selector: &Document) -> Result<Filter, OplogError> {
    compile_document(selector, 0)
}

/// # Errors
/// Returns an error if the JSON string is not a document or is not a valid selector.
pub fn parse_selector_json(json: &str) -> Result<Filter, OplogError> {
    let doc: Document = serde_json::from_str(json)?;
    compile_selector(&doc)
}

fn compile_document(doc: &Document, depth: usize) -> Result<Filter, OplogError> {
    if depth > MAX_NESTING {
        return Err(err("selector is nested too deeply"));
    }
    let mut parts = Vec::with_capacity(doc.len());
    for (key, value) in doc {
        match key.as_str() {
            "$and" => parts.push(Filter::And(compile_branches(key, value, depth)?)),
            "$or" => parts.push(Filter::Or(compile_branches(key, value, depth)?)),
            "$nor" => parts.push(Filter::Nor(compile_branches(key, value, depth)?)),
            "$where" => parts.push(compile_where(value)?),
            "$comment" => {}
            k if k.starts_with('$') => {
                return Err(err(format!("Unrecognized logical operator: {k}")));
            }
            path => parts.push(compile_condition(path, value, depth)?),
        }
    }
    Ok(Filter::all_of(parts))
}

fn compile_branches(op: &str, value: &Bson, depth: usize) -> Result<Vec<Filter>, OplogError> {
    let Bson::Array(items) = value else {
        return Err(err(format!("{op} must be a nonempty array")));
    };
    if items.is_empty() {
        return Err(err(format!("{op} must be a nonempty array")));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => compile_document(d, depth + 1),
            _ => Err(err(format!("{op} entries must be objects"))),
        })
        .collect()
}

fn compile_where(value: &Bson) -> Result<Filter, OplogError> {
    match value {
        Bson::String(code) | Bson::JavaScriptCode(code) => Ok(Filter::Where(code.clone())),
        Bson::JavaScriptCodeWithScope(c) => Ok(Filter::Where(c.code.clone())),
        _ => Err(err("$where requires a string or code value")),
    }
}

fn is_operator_document(d: &Document) -> Result<bool, OplogError> {
    let mut saw_op = false;
    let mut saw_field = false;
    for key in d.keys() {
        if key.starts_with('$') {
            saw_op = true;
        } else {
            saw_field = true;
        }
    }
    if saw_op && saw_field {
        return Err(err("Inconsistent operator: operators cannot be mixed with field names"));
    }
    Ok(saw_op)
}

fn compile_condition(path: &str, value: &Bson, depth: usize) -> Result<Filter, OplogError> {
    match value {
        Bson::Document(d) if !d.is_empty() => {
            if is_operator_document(d)? {
                compile_operators(path, d, depth)
            } else {
                Ok(Filter::Cmp { path: path.to_string(), op: CmpOp::Eq, value: value.clone() })
            }
        }
        Bson::RegularExpression(r) => regex_filter(path, r.pattern.as_str(), r.options.as_str()),
        literal => Ok(Filter::Cmp { path: path.to_string(), op: CmpOp::Eq, value: literal.clone() }),
    }
}

fn compile_operators(path: &str, ops: &Document, depth: usize) -> Result<Filter, OplogError> {
    if depth > MAX_NESTING {
        return Err(err("selector is nested too deeply"));
    }
    let has_near = ops.keys().any(|k| k == "$near" || k == "$nearSphere");
    let mut parts = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let p = path.to_string();
        let node = match op.as_str() {
            "$eq" => Filter::Cmp { path: p, op: CmpOp::Eq, value: operand.clone() },
            "$ne" => Filter::Cmp { path: p, op: CmpOp::Ne, value: operand.clone() },
            "$gt" => Filter::Cmp { path: p, op: CmpOp::Gt, value: operand.clone() },
            "$gte" => Filter::Cmp { path: p, op: CmpOp::Gte, value: operand.clone() },
            "$lt" => Filter::Cmp { path: p, op: CmpOp::Lt, value: operand.clone() },
            "$lte" => Filter::Cmp { path: p, op: CmpOp::Lte, value: operand.clone() },
            "$in" => Filter::In { path: p, values: array_operand(op, operand)? },
            "$nin" => Filter::Nin { path: p, values: array_operand(op, operand)? },
            "$all" => Filter::All { path: p, values: array_operand(op, operand)? },
            "$exists" => Filter::Exists { path: p, exists: truthy(operand) },
            "$size" => {
                let len = as_integral(operand)
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| err("$size needs a non-negative integer"))?;
                Filter::Size { path: p, len: usize::try_from(len).unwrap_or(usize::MAX) }
            }
            "$mod" => compile_mod(p, operand)?,
            "$type" => Filter::Type { path: p, spec: type_spec(operand)? },
            "$regex" => {
                let options = match ops.get("$options") {
                    None => "",
                    Some(Bson::String(s)) => s.as_str(),
                    Some(_) => return Err(err("$options needs a string")),
                };
                match operand {
                    Bson::String(s) => regex_filter(path, s, options)?,
                    Bson::RegularExpression(r) => {
                        let merged = if options.is_empty() { r.options.as_str() } else { options };
                        regex_filter(path, r.pattern.as_str(), merged)?
                    }
                    _ => return Err(err("$regex has to be a string or a regular expression")),
                }
            }
            "$options" => {
                if !ops.contains_key("$regex") {
                    return Err(err("$options needs a $regex"));
                }
                continue;
            }
            "$elemMatch" => {
                let Bson::Document(inner) = operand else {
                    return Err(err("$elemMatch needs an object"));
                };
                if is_operator_document(inner)? {
                    let filter = compile_operators("", inner, depth + 1)?;
                    Filter::ElemMatch { path: p, filter: Box::new(filter), scalar: true }
                } else {
                    let filter = compile_document(inner, depth + 1)?;
                    Filter::ElemMatch { path: p, filter: Box::new(filter), scalar: false }
                }
            }
            "$not" => match operand {
                Bson::Document(inner) if !inner.is_empty() => {
                    if !is_operator_document(inner)? {
                        return Err(err("$not needs a regex or a document of operators"));
                    }
                    Filter::Not(Box::new(compile_operators(path, inner, depth + 1)?))
                }
                Bson::RegularExpression(r) => {
                    Filter::Not(Box::new(regex_filter(path, r.pattern.as_str(), r.options.as_str())?))
                }
                _ => return Err(err("$not needs a regex or a document of operators")),
            },
            g if GEO_OPERATORS.contains(&g) => {
                Filter::Geo { path: p, op: g.to_string(), operand: operand.clone() }
            }
            d if DISTANCE_MODIFIERS.contains(&d) => {
                if !has_near {
                    return Err(err(format!("{d} needs a $near or $nearSphere")));
                }
                if as_number(operand).is_none() {
                    return Err(err(format!("{d} needs a number")));
                }
                continue;
            }
            other => return Err(err(format!("Unrecognized operator: {other}"))),
        };
        parts.push(node);
    }
    Ok(Filter::all_of(parts))
}

fn array_operand(op: &str, operand: &Bson) -> Result<Vec<Bson>, OplogError> {
    match operand {
        Bson::Array(values) => {
            if values.len() > MAX_IN_SET {
                return Err(err(format!("{op} accepts at most {MAX_IN_SET} values")));
            }
            Ok(values.clone())
        }
        _ => Err(err(format!("{op} needs an array"))),
    }
}

fn compile_mod(path: String, operand: &Bson) -> Result<Filter, OplogError> {
    let shape = || err("$mod requires an array of [divisor, remainder]");
    let Bson::Array(pair) = operand else {
        return Err(shape());
    };
    if pair.len() != 2 {
        return Err(shape());
    }
    let divisor = as_integral(&pair[0]).ok_or_else(shape)?;
    let remainder = as_integral(&pair[1]).ok_or_else(shape)?;
    if divisor == 0 {
        return Err(err("$mod divisor cannot be 0"));
    }
    Ok(Filter::Mod { path, divisor, remainder })
}

fn type_spec(operand: &Bson) -> Result<TypeSpec, OplogError> {
    if let Some(code) = as_integral(operand) {
        return i32::try_from(code)
            .map(TypeSpec::Code)
            .map_err(|_| err(format!("invalid numerical $type code: {code}")));
    }
    let Bson::String(alias) = operand else {
        return Err(err("$type needs a number or a string alias"));
    };
    let code = match alias.as_str() {
        "number" => return Ok(TypeSpec::Number),
        "double" => 1,
        "string" => 2,
        "object" => 3,
        "array" => 4,
        "binData" => 5,
        "undefined" => 6,
        "objectId" => 7,
        "bool" => 8,
        "date" => 9,
        "null" => 10,
        "regex" => 11,
        "dbPointer" => 12,
        "javascript" => 13,
        "symbol" => 14,
        "javascriptWithScope" => 15,
        "int" => 16,
        "timestamp" => 17,
        "long" => 18,
        "decimal" => 19,
        "minKey" => -1,
        "maxKey" => 127,
        other => return Err(err(format!("unknown string alias for $type: {other}"))),
    };
    Ok(TypeSpec::Code(code))
}

fn regex_filter(path: &str, pattern: &str, options: &str) -> Result<Filter, OplogError> {
    if let Some(bad) = options.chars().find(|c| !matches!(c, 'i' | 'm' | 's' | 'x' | 'u')) {
        return Err(err(format!("unsupported regex option: {bad}")));
    }
    #[cfg(feature = "regex")]
    super::eval::build_regex(pattern, options).map_err(|e| err(format!("invalid $regex: {e}")))?;
    Ok(Filter::Regex { path: path.to_string(), pattern: pattern.to_string(), options: options.to_string() })
}

pub(crate) fn as_number(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

pub(crate) fn as_integral(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        #[allow(clippy::cast_possible_truncation)]
        Bson::Double(d) if d.is_finite() && d.fract() == 0.0 => Some(*d as i64),
        _ => None,
    }
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Null | Bson::Undefined => false,
        other => as_number(other).is_none_or(|n| n != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn in_requires_array() {
        let e = compile_selector(&doc! { "aa": { "$in": Bson::Null } }).unwrap_err();
        assert_eq!(e.message(), "$in needs an array");
    }

    #[test]
    fn mixed_operator_and_field_rejected() {
        let e = compile_selector(&doc! { "a": { "$gt": 1, "b": 2 } }).unwrap_err();
        assert!(e.message().starts_with("Inconsistent operator"));
    }

    #[test]
    fn where_and_geo_compile() {
        assert!(matches!(compile_selector(&doc! { "$where": "this.a > 1" }).unwrap(), Filter::Where(_)));
        let f = compile_selector(&doc! { "loc": { "$near": [50, 50], "$maxDistance": 10 } }).unwrap();
        assert!(matches!(f, Filter::Geo { ref op, .. } if op == "$near"));
    }

    #[test]
    fn max_distance_without_near_rejected() {
        assert!(compile_selector(&doc! { "loc": { "$maxDistance": 10 } }).is_err());
    }

    #[test]
    fn empty_logical_rejected() {
        let e = compile_selector(&doc! { "$or": [] }).unwrap_err();
        assert_eq!(e.message(), "$or must be a nonempty array");
    }

    #[test]
    fn type_aliases() {
        assert!(compile_selector(&doc! { "a": { "$type": "string" } }).is_ok());
        assert!(compile_selector(&doc! { "a": { "$type": "strng" } }).is_err());
    }
}
