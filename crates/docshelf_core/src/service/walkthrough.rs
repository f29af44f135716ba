//! Fixed product-catalog walkthrough.
//!
//! # Responsibility
//! - Run the clear / insert / fetch / push / pull / query sequence against a
//!   repository, printing human-readable state after each step.
//! - Return the observed results so callers and tests can assert on them.
//!
//! # Invariants
//! - Steps run strictly in order; the first failure aborts the sequence.
//! - Output goes only to the provided writer.

use crate::model::document::{Document, DocumentId, StoredDocument};
use crate::repo::document_repo::DocumentRepository;
use crate::repo::error::RepoError;
use crate::store::DocumentStore;
use log::info;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};

/// Business key of the document the walkthrough manipulates.
pub const DEMO_SKU: &str = "PRD-400";
pub const PUSHED_FEATURE: &str = "Voice Assistant";
pub const PULLED_FEATURE: &str = "Portable";
pub const REQUIRED_FEATURES: [&str; 2] = ["Waterproof", "Long Battery"];
pub const NESTED_PATH: &str = "connectors.version";
pub const NESTED_VALUE: &str = "Type-C";

const RULE_WIDTH: usize = 60;

pub type WalkthroughResult<T> = Result<T, WalkthroughError>;

#[derive(Debug)]
pub enum WalkthroughError {
    Repo(RepoError),
    Output(io::Error),
}

impl Display for WalkthroughError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to write walkthrough output: {err}"),
        }
    }
}

impl Error for WalkthroughError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<RepoError> for WalkthroughError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<io::Error> for WalkthroughError {
    fn from(value: io::Error) -> Self {
        Self::Output(value)
    }
}

/// What the walkthrough observed.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    pub cleared: u64,
    pub inserted_id: DocumentId,
    pub push_modified: u64,
    pub pull_modified: u64,
    pub all_features_count: u64,
    pub nested_field_count: u64,
    pub final_document: Option<StoredDocument>,
}

/// The Bluetooth speaker inserted in step 1.
pub fn speaker_document() -> Document {
    let mut document = Document::new();
    document.insert("name", "Bluetooth Speaker");
    document.insert("sku", DEMO_SKU);
    document.insert("features", json!(["Waterproof", "Portable", "Long Battery"]));
    document.insert(
        "connectors",
        json!([
            { "type": "Aux", "version": "3.5mm" },
            { "type": "USB", "version": "Type-C" }
        ]),
    );
    document.insert("price", 49.99);
    document
}

/// Runs the walkthrough; `endpoint` is only used in the banner.
pub fn run_walkthrough<S, W>(
    repo: &DocumentRepository<S>,
    endpoint: &str,
    out: &mut W,
) -> WalkthroughResult<WalkthroughReport>
where
    S: DocumentStore,
    W: Write,
{
    info!(
        "event=walkthrough module=service status=start collection={}",
        repo.collection_name()
    );

    let cleared = repo.clear()?;
    writeln!(
        out,
        "--- Connected to {endpoint}. Collection '{}' cleared. ---",
        repo.collection_name()
    )?;
    write_rule(out)?;

    writeln!(out, "===== STEP 1: Insert a document with an array =====")?;
    let inserted_id = repo.insert(&speaker_document())?;
    writeln!(out, "Insertion successful. Document ID: {inserted_id}")?;
    display_target_document(repo, DEMO_SKU, out)?;

    writeln!(out, "===== STEP 2: Retrieve the document =====")?;
    match repo.find_by_sku(DEMO_SKU)? {
        Some(stored) => {
            writeln!(out, "Document retrieved successfully:")?;
            write_document(out, &stored)?;
        }
        None => writeln!(out, "Document not found.")?,
    }
    write_rule(out)?;

    writeln!(
        out,
        "===== STEP 3: Update the array (Add '{PUSHED_FEATURE}' using push) ====="
    )?;
    let push_modified = repo.push_feature(DEMO_SKU, PUSHED_FEATURE)?;
    writeln!(out, "Update successful. Documents modified: {push_modified}")?;
    display_target_document(repo, DEMO_SKU, out)?;

    writeln!(
        out,
        "===== STEP 4: Remove an element from the array (Remove '{PULLED_FEATURE}' using pull) ====="
    )?;
    let pull_modified = repo.pull_feature(DEMO_SKU, PULLED_FEATURE)?;
    writeln!(out, "Removal successful. Documents modified: {pull_modified}")?;
    let final_document = display_target_document(repo, DEMO_SKU, out)?;

    writeln!(out, "===== STEP 5: Query using array filters =====")?;
    writeln!(out)?;
    writeln!(
        out,
        "--- 5a: Query using all-of (Check for multiple features) ---"
    )?;
    let all_features_count = repo.count_by_all_features(REQUIRED_FEATURES)?;
    writeln!(
        out,
        "Found {all_features_count} document(s) matching the all-of query:"
    )?;
    for stored in repo.find_by_all_features(REQUIRED_FEATURES)? {
        write_document(out, &stored)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "--- 5b: Query on embedded array (Check for {NESTED_VALUE} connector) ---"
    )?;
    let nested_field_count = repo.count_by_nested_field(NESTED_PATH, NESTED_VALUE)?;
    writeln!(
        out,
        "Found {nested_field_count} document(s) matching the embedded query:"
    )?;
    for stored in repo.find_by_nested_field(NESTED_PATH, NESTED_VALUE)? {
        write_document(out, &stored)?;
    }

    info!(
        "event=walkthrough module=service status=ok collection={} push_modified={} pull_modified={}",
        repo.collection_name(),
        push_modified,
        pull_modified
    );

    Ok(WalkthroughReport {
        cleared,
        inserted_id,
        push_modified,
        pull_modified,
        all_features_count,
        nested_field_count,
        final_document,
    })
}

/// Prints the current state of the document with `sku` and returns it.
pub fn display_target_document<S, W>(
    repo: &DocumentRepository<S>,
    sku: &str,
    out: &mut W,
) -> WalkthroughResult<Option<StoredDocument>>
where
    S: DocumentStore,
    W: Write,
{
    let document = repo.find_by_sku(sku)?;
    writeln!(out)?;
    writeln!(out, "--- Current State of Document (SKU: {sku}) ---")?;
    match &document {
        Some(stored) => write_document(out, stored)?,
        None => writeln!(out, "Document not found.")?,
    }
    write_rule(out)?;
    Ok(document)
}

/// Pretty JSON rendering with `_id` first.
pub fn render_document(stored: &StoredDocument) -> String {
    // Value keys are always strings, so serialization cannot fail.
    serde_json::to_string_pretty(&stored.to_display_value()).unwrap_or_default()
}

fn write_document<W: Write>(out: &mut W, stored: &StoredDocument) -> io::Result<()> {
    writeln!(out, "{}", render_document(stored))
}

fn write_rule<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}
