use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 32;
pub(crate) const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Target of a `$type` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Code(i32),
    Number,
}

/// Compiled selector tree.
#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Nor(Vec<Filter>),
    Not(Box<Filter>),
    Exists { path: String, exists: bool },
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    All { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
    Size { path: String, len: usize },
    Mod { path: String, divisor: i64, remainder: i64 },
    Type { path: String, spec: TypeSpec },
    Regex { path: String, pattern: String, options: String },
    /// `scalar` is set when the inner filter holds bare operators (`{$elemMatch: {$gt: 1}}`)
    /// and is evaluated against each element under the path `""`.
    ElemMatch { path: String, filter: Box<Filter>, scalar: bool },
    /// Free-form code predicate. Kept opaque, never matches in-process.
    Where(String),
    /// Geospatial operator with its raw operand. Never matches in-process.
    Geo { path: String, op: String, operand: Bson },
}

impl Filter {
    /// Collapse a list of conditions into one node.
    pub(crate) fn all_of(mut parts: Vec<Filter>) -> Filter {
        match parts.len() {
            0 => Filter::True,
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }
}
