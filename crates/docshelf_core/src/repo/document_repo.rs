//! Document repository facade over one collection.
//!
//! # Responsibility
//! - Name the operations callers need (clear, insert, fetch by sku,
//!   push/pull on `features`, containment and dotted-path queries).
//! - Translate them into store primitives so the backend stays swappable.
//!
//! # Invariants
//! - Inserts validate the `sku` business key; duplicates are not rejected.
//! - A missing document is `Ok(None)` or a zero count, never an error.
//! - Each call issues exactly one store primitive.

use crate::config::StoreConfig;
use crate::model::document::{Document, DocumentId, StoredDocument, SKU_FIELD};
use crate::model::path::FieldPath;
use crate::repo::error::RepoResult;
use crate::store::filter::Filter;
use crate::store::update::ArrayUpdate;
use crate::store::{open_store, DocumentStore};
use log::{debug, info};
use serde_json::Value;

/// Array field targeted by the feature operations.
pub const FEATURES_FIELD: &str = "features";

/// Repository bound to the collection of its store.
pub struct DocumentRepository<S: DocumentStore> {
    store: S,
}

impl DocumentRepository<Box<dyn DocumentStore>> {
    /// Opens the configured backend and wraps it.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        Ok(Self::new(open_store(config)?))
    }
}

impl<S: DocumentStore> DocumentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn collection_name(&self) -> &str {
        self.store.collection_name()
    }

    /// Empties the collection and returns the number of removed documents.
    pub fn clear(&self) -> RepoResult<u64> {
        let removed = self.store.delete_all()?;
        info!(
            "event=collection_clear module=repo status=ok collection={} removed={}",
            self.collection_name(),
            removed
        );
        Ok(removed)
    }

    /// Adds one document and returns its generated id.
    ///
    /// # Errors
    /// - `RepoError::Validation` when `sku` is missing or not a string.
    pub fn insert(&self, document: &Document) -> RepoResult<DocumentId> {
        document.validate()?;
        let id = self.store.insert_one(document)?;
        debug!(
            "event=doc_insert module=repo status=ok collection={} id={}",
            self.collection_name(),
            id
        );
        Ok(id)
    }

    /// Returns the document with the given sku, or `None`.
    pub fn find_by_sku(&self, sku: &str) -> RepoResult<Option<StoredDocument>> {
        self.store.find_one(&sku_filter(sku))
    }

    /// Appends `value` to `features`, creating the array when missing.
    ///
    /// Returns the number of modified documents (0 or 1).
    pub fn push_feature(&self, sku: &str, value: impl Into<Value>) -> RepoResult<u64> {
        let update = ArrayUpdate::push(FieldPath::field(FEATURES_FIELD), value);
        self.apply_update(sku, &update)
    }

    /// Removes every occurrence of `value` from `features`.
    ///
    /// Returns 1 only when an element was actually removed.
    pub fn pull_feature(&self, sku: &str, value: impl Into<Value>) -> RepoResult<u64> {
        let update = ArrayUpdate::pull(FieldPath::field(FEATURES_FIELD), value);
        self.apply_update(sku, &update)
    }

    /// Documents whose `features` contain every given value.
    pub fn find_by_all_features<I, V>(&self, values: I) -> RepoResult<Vec<StoredDocument>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.store.find(&all_features_filter(values))
    }

    pub fn count_by_all_features<I, V>(&self, values: I) -> RepoResult<u64>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.store.count(&all_features_filter(values))
    }

    /// Documents where the dotted `path` reaches `value`, looking into every
    /// element of arrays along the way.
    ///
    /// # Errors
    /// - `RepoError::InvalidPath` for empty paths or empty segments.
    pub fn find_by_nested_field(
        &self,
        path: &str,
        value: impl Into<Value>,
    ) -> RepoResult<Vec<StoredDocument>> {
        let filter = Filter::eq(FieldPath::parse(path)?, value);
        self.store.find(&filter)
    }

    pub fn count_by_nested_field(&self, path: &str, value: impl Into<Value>) -> RepoResult<u64> {
        let filter = Filter::eq(FieldPath::parse(path)?, value);
        self.store.count(&filter)
    }

    /// Releases the store.
    pub fn close(self) -> RepoResult<()> {
        S::close(Box::new(self.store))
    }

    fn apply_update(&self, sku: &str, update: &ArrayUpdate) -> RepoResult<u64> {
        let outcome = self.store.update_one(&sku_filter(sku), update)?;
        debug!(
            "event=doc_update module=repo status=ok sku={} op=\"{}\" matched={} modified={}",
            sku, update, outcome.matched, outcome.modified
        );
        Ok(outcome.modified)
    }
}

fn sku_filter(sku: &str) -> Filter {
    Filter::eq(FieldPath::field(SKU_FIELD), sku)
}

fn all_features_filter<I, V>(values: I) -> Filter
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Filter::all(FieldPath::field(FEATURES_FIELD), values)
}
