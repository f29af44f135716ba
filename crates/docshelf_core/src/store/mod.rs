//! Document store primitives and backends.
//!
//! # Responsibility
//! - Define the primitive operations a collection backend must provide.
//! - Keep query and mutation semantics in shared `Filter`/`ArrayUpdate`
//!   code so backends differ only in where documents live.
//! - Pick a backend from configuration.
//!
//! # Invariants
//! - One store handle is bound to exactly one collection.
//! - `update_one` applies its mutation atomically: either the whole change
//!   is visible or none of it.
//! - `find` returns documents in insertion order.

pub mod filter;
pub mod memory;
pub mod sqlite;
pub mod update;

use crate::config::{Endpoint, StoreConfig};
use crate::model::document::{Document, DocumentId, StoredDocument};
use crate::repo::error::RepoResult;
use filter::Filter;
use log::info;
use memory::MemoryDocumentStore;
use sqlite::SqliteDocumentStore;
use update::ArrayUpdate;

/// Result of a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents selected by the filter (0 or 1).
    pub matched: u64,
    /// Documents whose content changed (0 or 1).
    pub modified: u64,
}

impl UpdateOutcome {
    pub const NO_MATCH: Self = Self {
        matched: 0,
        modified: 0,
    };

    pub(crate) fn matched(modified: bool) -> Self {
        Self {
            matched: 1,
            modified: u64::from(modified),
        }
    }
}

/// Primitive operations over one collection.
pub trait DocumentStore {
    fn collection_name(&self) -> &str;
    /// Removes every document, returning how many were removed.
    fn delete_all(&self) -> RepoResult<u64>;
    fn insert_one(&self, document: &Document) -> RepoResult<DocumentId>;
    /// Returns one matching document; which one is unspecified when several
    /// match.
    fn find_one(&self, filter: &Filter) -> RepoResult<Option<StoredDocument>>;
    fn find(&self, filter: &Filter) -> RepoResult<Vec<StoredDocument>>;
    fn count(&self, filter: &Filter) -> RepoResult<u64>;
    /// Applies `update` to one matching document.
    fn update_one(&self, filter: &Filter, update: &ArrayUpdate) -> RepoResult<UpdateOutcome>;

    /// Releases the underlying resources, reporting failures that a plain
    /// drop would swallow.
    fn close(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn collection_name(&self) -> &str {
        (**self).collection_name()
    }

    fn delete_all(&self) -> RepoResult<u64> {
        (**self).delete_all()
    }

    fn insert_one(&self, document: &Document) -> RepoResult<DocumentId> {
        (**self).insert_one(document)
    }

    fn find_one(&self, filter: &Filter) -> RepoResult<Option<StoredDocument>> {
        (**self).find_one(filter)
    }

    fn find(&self, filter: &Filter) -> RepoResult<Vec<StoredDocument>> {
        (**self).find(filter)
    }

    fn count(&self, filter: &Filter) -> RepoResult<u64> {
        (**self).count(filter)
    }

    fn update_one(&self, filter: &Filter, update: &ArrayUpdate) -> RepoResult<UpdateOutcome> {
        (**self).update_one(filter, update)
    }

    fn close(self: Box<Self>) -> RepoResult<()> {
        <S as DocumentStore>::close(*self)
    }
}

/// Opens the backend named by `config.endpoint`, bound to
/// `config.collection`.
///
/// # Errors
/// - `RepoError::StoreUnavailable` when the backing database cannot be
///   opened or bootstrapped.
pub fn open_store(config: &StoreConfig) -> RepoResult<Box<dyn DocumentStore>> {
    info!(
        "event=store_open module=store status=start endpoint={} database={} collection={}",
        config.endpoint, config.database, config.collection
    );

    let store: Box<dyn DocumentStore> = match &config.endpoint {
        Endpoint::SqliteDir(dir) => Box::new(SqliteDocumentStore::open(
            dir.join(config.database_file_name()),
            config.collection.as_str(),
        )?),
        Endpoint::SqliteMemory => Box::new(SqliteDocumentStore::open_in_memory(
            config.collection.as_str(),
        )?),
        Endpoint::Memory => Box::new(MemoryDocumentStore::new(config.collection.as_str())),
    };

    info!(
        "event=store_open module=store status=ok endpoint={} collection={}",
        config.endpoint, config.collection
    );
    Ok(store)
}
