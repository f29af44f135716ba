//! Repository layer.
//!
//! # Responsibility
//! - Define the use-case oriented document API over one collection.
//! - Isolate store primitives from callers.
//!
//! # Invariants
//! - Writes enforce `Document::validate()` before persistence.
//! - Absence is a value (`None`, zero counts), not an error.

pub mod document_repo;
pub mod error;
