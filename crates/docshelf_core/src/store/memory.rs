//! In-process document store.
//!
//! Used as a test double and by the `memory:` endpoint. Contents live for
//! the lifetime of the store value.

use super::filter::Filter;
use super::update::ArrayUpdate;
use super::{DocumentStore, UpdateOutcome};
use crate::model::document::{Document, DocumentId, StoredDocument};
use crate::repo::error::RepoResult;
use std::cell::RefCell;
use uuid::Uuid;

/// Insertion-ordered collection held in memory.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collection: String,
    documents: RefCell<Vec<StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: RefCell::new(Vec::new()),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let removed = self.documents.borrow_mut().drain(..).count();
        Ok(removed as u64)
    }

    fn insert_one(&self, document: &Document) -> RepoResult<DocumentId> {
        let id = Uuid::new_v4();
        self.documents.borrow_mut().push(StoredDocument {
            id,
            document: document.clone(),
        });
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> RepoResult<Option<StoredDocument>> {
        Ok(self
            .documents
            .borrow()
            .iter()
            .find(|stored| filter.matches(&stored.document))
            .cloned())
    }

    fn find(&self, filter: &Filter) -> RepoResult<Vec<StoredDocument>> {
        Ok(self
            .documents
            .borrow()
            .iter()
            .filter(|stored| filter.matches(&stored.document))
            .cloned()
            .collect())
    }

    fn count(&self, filter: &Filter) -> RepoResult<u64> {
        let count = self
            .documents
            .borrow()
            .iter()
            .filter(|stored| filter.matches(&stored.document))
            .count();
        Ok(count as u64)
    }

    fn update_one(&self, filter: &Filter, update: &ArrayUpdate) -> RepoResult<UpdateOutcome> {
        let mut documents = self.documents.borrow_mut();
        let Some(target) = documents
            .iter_mut()
            .find(|stored| filter.matches(&stored.document))
        else {
            return Ok(UpdateOutcome::NO_MATCH);
        };

        // Mutate a copy so a rejected update leaves the stored body intact.
        let mut candidate = target.document.clone();
        let modified = update.apply(&mut candidate)?;
        if modified {
            target.document = candidate;
        }
        Ok(UpdateOutcome::matched(modified))
    }
}
