// Submodules for separation of concerns
mod engine;
mod eval;
mod parse;
mod sort;
mod types;

pub use engine::{DocumentEngine, Matcher, MatchingEngine, SortEngine};
pub use eval::{compare_bson, eval_filter};
pub use parse::{GEO_OPERATORS, compile_selector, parse_selector_json};
pub use sort::Sorter;
pub use types::{CmpOp, Filter, Order, SortSpec, TypeSpec};
