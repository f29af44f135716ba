//! Document repository core for docshelf.
//! A small facade for document CRUD and array mutations over swappable
//! document stores.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, Endpoint, LogConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::document::{Document, DocumentId, DocumentValidationError, StoredDocument};
pub use model::path::{FieldPath, PathError};
pub use repo::document_repo::{DocumentRepository, FEATURES_FIELD};
pub use repo::error::{RepoError, RepoResult};
pub use service::walkthrough::{
    run_walkthrough, WalkthroughError, WalkthroughReport, WalkthroughResult,
};
pub use store::filter::Filter;
pub use store::memory::MemoryDocumentStore;
pub use store::sqlite::SqliteDocumentStore;
pub use store::update::{ArrayUpdate, UpdateError};
pub use store::{open_store, DocumentStore, UpdateOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
