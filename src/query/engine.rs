use crate::errors::OplogError;
use bson::{Bson, Document as BsonDocument};

use super::eval::eval_filter;
use super::parse::compile_selector;
use super::sort::Sorter;
use super::types::Filter;

/// A compiled selector.
#[derive(Debug, Clone)]
pub struct Matcher {
    filter: Filter,
}

impl Matcher {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn matches(&self, doc: &BsonDocument) -> bool {
        eval_filter(doc, &self.filter)
    }
}

/// Builds matchers from selectors.
pub trait MatchingEngine: Send + Sync {
    /// # Errors
    /// Returns an error when the selector has a shape the engine cannot match.
    fn compile(&self, selector: &BsonDocument) -> Result<Matcher, OplogError>;
}

/// Builds comparators from sort specifiers.
pub trait SortEngine: Send + Sync {
    /// # Errors
    /// Returns an error when the sort specifier cannot be turned into a comparator.
    fn compile(&self, spec: &Bson) -> Result<Sorter, OplogError>;
}

/// The in-process document engine backing both traits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEngine;

impl MatchingEngine for DocumentEngine {
    fn compile(&self, selector: &BsonDocument) -> Result<Matcher, OplogError> {
        compile_selector(selector).map(Matcher::new)
    }
}

impl SortEngine for DocumentEngine {
    fn compile(&self, spec: &Bson) -> Result<Sorter, OplogError> {
        Sorter::compile(spec)
    }
}
