//! Document domain model.
//!
//! # Responsibility
//! - Define the semi-structured record stored in every collection.
//! - Define dotted field paths and the value equality used by queries.
//!
//! # Invariants
//! - Every stored document is identified by a stable `DocumentId`.
//! - `sku` is the business key; uniqueness is a caller responsibility.

pub mod document;
pub mod path;
