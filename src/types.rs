use crate::errors::OplogError;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Options recognized on an observed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, alias = "projection", skip_serializing_if = "Option::is_none")]
    pub fields: Option<Document>,
    /// Internal override that forces the polling driver.
    #[serde(default, rename = "_disableOplog")]
    pub disable_oplog: bool,
}

impl QueryOptions {
    /// A zero skip or limit is the same as none.
    pub fn effective_skip(&self) -> Option<i64> {
        self.skip.filter(|n| *n != 0)
    }

    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|n| *n != 0)
    }

    /// The sort specifier, treating an explicit null as absent.
    pub fn sort_spec(&self) -> Option<&Bson> {
        self.sort.as_ref().filter(|s| !matches!(s, Bson::Null))
    }
}

/// A query as seen by an observer: the selector and its options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub selector: Document,
    #[serde(default)]
    pub options: QueryOptions,
}

impl QueryDescriptor {
    pub fn new(selector: Document) -> Self {
        Self { collection_name: None, selector, options: QueryOptions::default() }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Parse `{"collectionName": .., "selector": {..}, "options": {..}}`.
    ///
    /// # Errors
    /// Returns an error if the JSON does not describe a query.
    pub fn from_json(json: &str) -> Result<Self, OplogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Short label for log lines.
    pub fn label(&self) -> &str {
        self.collection_name.as_deref().unwrap_or("<anonymous>")
    }
}
