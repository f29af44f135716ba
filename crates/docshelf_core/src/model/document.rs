//! Document record and identity.
//!
//! # Responsibility
//! - Hold one JSON-like record as an insertion-ordered field map.
//! - Validate the `sku` business key before persistence.
//! - Pair a body with its store-generated identity.
//!
//! # Invariants
//! - A `Document` body is always a JSON object.
//! - The reserved `_id` field never appears inside a body; identity lives
//!   in `StoredDocument::id`.
//! - Identity is preserved across in-place array mutations.

use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Field holding the business key.
pub const SKU_FIELD: &str = "sku";
/// Reserved field used when rendering identity next to the body.
pub const ID_FIELD: &str = "_id";

/// Stable store-generated identifier of a document.
pub type DocumentId = Uuid;

/// Validation error for document bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    /// Body is not a JSON object.
    NotAnObject,
    /// Body has no `sku` field.
    MissingSku,
    /// `sku` exists but is not a non-blank string.
    InvalidSku,
    /// Body uses a field name reserved for store metadata.
    ReservedField(String),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "document body must be a JSON object"),
            Self::MissingSku => write!(f, "document is missing required field `{SKU_FIELD}`"),
            Self::InvalidSku => write!(f, "field `{SKU_FIELD}` must be a non-empty string"),
            Self::ReservedField(name) => write!(f, "field `{name}` is reserved"),
        }
    }
}

impl Error for DocumentValidationError {}

/// Semi-structured record: field names mapped to scalars, nested objects or
/// arrays, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a JSON value.
    ///
    /// # Errors
    /// - `NotAnObject` when `value` is not an object.
    /// - `ReservedField` when the object carries `_id`.
    pub fn from_value(value: Value) -> Result<Self, DocumentValidationError> {
        match value {
            Value::Object(fields) => {
                if fields.contains_key(ID_FIELD) {
                    return Err(DocumentValidationError::ReservedField(ID_FIELD.to_string()));
                }
                Ok(Self { fields })
            }
            _ => Err(DocumentValidationError::NotAnObject),
        }
    }

    /// Sets one top-level field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Returns one top-level field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the business key when it is a string.
    pub fn sku(&self) -> Option<&str> {
        self.fields.get(SKU_FIELD).and_then(Value::as_str)
    }

    /// Read-only access to all fields in insertion order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Checks the persistence contract.
    ///
    /// # Invariants
    /// - `sku` is present and a non-blank string.
    /// - `_id` is not used as a body field.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if self.fields.contains_key(ID_FIELD) {
            return Err(DocumentValidationError::ReservedField(ID_FIELD.to_string()));
        }
        match self.fields.get(SKU_FIELD) {
            None => Err(DocumentValidationError::MissingSku),
            Some(Value::String(sku)) if !sku.trim().is_empty() => Ok(()),
            Some(_) => Err(DocumentValidationError::InvalidSku),
        }
    }

}

/// A document as held by a store, together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub document: Document,
}

impl StoredDocument {
    pub fn sku(&self) -> Option<&str> {
        self.document.sku()
    }

    /// Renders identity and body as one object, `_id` first.
    pub fn to_display_value(&self) -> Value {
        let mut rendered = Map::with_capacity(self.document.fields.len() + 1);
        rendered.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        for (name, value) in &self.document.fields {
            rendered.insert(name.clone(), value.clone());
        }
        Value::Object(rendered)
    }
}
