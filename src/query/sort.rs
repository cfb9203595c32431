use crate::errors::OplogError;
use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::eval::{compare_bson, lookup};
use super::parse::as_number;
use super::types::{MAX_SORT_FIELDS, Order, SortSpec};

/// A compiled sort specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorter {
    keys: Vec<SortSpec>,
}

fn err(msg: impl Into<String>) -> OplogError {
    OplogError::Sorter(msg.into())
}

impl Sorter {
    /// Compile a sort specifier.
    ///
    /// Accepted shapes are a document (`{a: 1, b: -1}`), an array of field names, or an array of
    /// `[field, direction]` pairs. Directions are non-zero numbers or `asc`/`desc` strings.
    ///
    /// # Errors
    /// Returns `OplogError::Sorter` for `$`-prefixed keys such as `$natural`, empty field names,
    /// unknown directions, and unsupported shapes.
    pub fn compile(spec: &Bson) -> Result<Self, OplogError> {
        let mut keys = Vec::new();
        match spec {
            Bson::Document(d) => {
                for (field, dir) in d {
                    keys.push(SortSpec { field: check_field(field)?, order: direction(field, dir)? });
                }
            }
            Bson::Array(items) => {
                for item in items {
                    keys.push(array_key(item)?);
                }
            }
            _ => return Err(err("sort specifier must be a document or an array")),
        }
        if keys.len() > MAX_SORT_FIELDS {
            return Err(err(format!("sort specifier has more than {MAX_SORT_FIELDS} keys")));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[SortSpec] {
        &self.keys
    }

    /// Order two documents by the compiled keys. Missing fields sort before present ones.
    pub fn compare(&self, a: &BsonDocument, b: &BsonDocument) -> Ordering {
        for s in &self.keys {
            let va = lookup(a, &s.field).into_iter().next();
            let vb = lookup(b, &s.field).into_iter().next();
            let ord = match (va, vb) {
                (Some(x), Some(y)) => compare_bson(x, y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return if s.order == Order::Asc { ord } else { ord.reverse() };
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort.
    pub fn sort(&self, docs: &mut [BsonDocument]) {
        docs.sort_by(|a, b| self.compare(a, b));
    }
}

fn check_field(field: &str) -> Result<String, OplogError> {
    if field.is_empty() {
        return Err(err("sort key must be a non-empty field name"));
    }
    if field.starts_with('$') {
        return Err(err(format!("{field} sorts are not supported")));
    }
    Ok(field.to_string())
}

fn direction(field: &str, dir: &Bson) -> Result<Order, OplogError> {
    if let Some(n) = as_number(dir) {
        return match n {
            n if n > 0.0 => Ok(Order::Asc),
            n if n < 0.0 => Ok(Order::Desc),
            _ => Err(err(format!("bad sort direction for {field}: 0"))),
        };
    }
    match dir {
        Bson::String(s) => match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Order::Asc),
            "desc" | "descending" => Ok(Order::Desc),
            other => Err(err(format!("bad sort direction for {field}: {other}"))),
        },
        Bson::Document(d) if d.keys().any(|k| k.starts_with('$')) => {
            let op = d.keys().next().map(String::as_str).unwrap_or_default();
            Err(err(format!("{op} sorts are not supported")))
        }
        other => Err(err(format!("bad sort direction for {field}: {other}"))),
    }
}

fn array_key(item: &Bson) -> Result<SortSpec, OplogError> {
    match item {
        Bson::String(field) => Ok(SortSpec { field: check_field(field)?, order: Order::Asc }),
        Bson::Array(pair) if pair.len() == 2 => {
            let Bson::String(field) = &pair[0] else {
                return Err(err("sort pair must start with a field name"));
            };
            Ok(SortSpec { field: check_field(field)?, order: direction(field, &pair[1])? })
        }
        _ => Err(err("sort array entries must be field names or [field, direction] pairs")),
    }
}
