//! Array mutation primitives applied in place to one document.
//!
//! # Invariants
//! - `Push` never de-duplicates and creates the array (and any missing
//!   intermediate objects) when absent.
//! - `Pull` removes every equal element and keeps the order of the rest.
//! - A failed update leaves the document untouched.
//! - Update paths traverse objects only; segments are object keys.

use crate::model::document::Document;
use crate::model::path::{values_equal, FieldPath};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The target field exists and is not an array.
    NotAnArray { path: String },
    /// A parent of the target field exists and is not an object.
    NotAnObject { path: String },
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray { path } => write!(f, "field `{path}` is not an array"),
            Self::NotAnObject { path } => {
                write!(f, "cannot traverse `{path}`: parent is not an object")
            }
        }
    }
}

impl Error for UpdateError {}

/// Atomic array mutation on a single matched document.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayUpdate {
    Push { path: FieldPath, value: Value },
    Pull { path: FieldPath, value: Value },
}

impl ArrayUpdate {
    pub fn push(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::Push {
            path,
            value: value.into(),
        }
    }

    pub fn pull(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::Pull {
            path,
            value: value.into(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Push { path, .. } | Self::Pull { path, .. } => path,
        }
    }

    /// Applies the mutation and reports whether the document changed.
    pub fn apply(&self, document: &mut Document) -> Result<bool, UpdateError> {
        match self {
            Self::Push { path, value } => {
                let parent = parent_for_push(document.fields_mut(), path)?;
                let leaf = leaf_name(path);
                match parent.get_mut(leaf) {
                    None => {
                        parent.insert(leaf.to_string(), Value::Array(vec![value.clone()]));
                    }
                    Some(Value::Array(items)) => items.push(value.clone()),
                    Some(_) => {
                        return Err(UpdateError::NotAnArray {
                            path: path.to_string(),
                        })
                    }
                }
                Ok(true)
            }
            Self::Pull { path, value } => {
                let Some(parent) = parent_for_pull(document.fields_mut(), path)? else {
                    return Ok(false);
                };
                match parent.get_mut(leaf_name(path)) {
                    None => Ok(false),
                    Some(Value::Array(items)) => {
                        let before = items.len();
                        items.retain(|item| !values_equal(item, value));
                        Ok(items.len() != before)
                    }
                    Some(_) => Err(UpdateError::NotAnArray {
                        path: path.to_string(),
                    }),
                }
            }
        }
    }
}

impl Display for ArrayUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push { path, value } => write!(f, "push {value} to {path}"),
            Self::Pull { path, value } => write!(f, "pull {value} from {path}"),
        }
    }
}

fn leaf_name(path: &FieldPath) -> &str {
    path.segments().last().map_or("", String::as_str)
}

fn parent_segments(path: &FieldPath) -> &[String] {
    let segments = path.segments();
    &segments[..segments.len().saturating_sub(1)]
}

// Missing parents are created as empty objects.
fn parent_for_push<'a>(
    root: &'a mut Map<String, Value>,
    path: &FieldPath,
) -> Result<&'a mut Map<String, Value>, UpdateError> {
    let mut current = root;
    for segment in parent_segments(path) {
        let next = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match next {
            Value::Object(fields) => fields,
            _ => {
                return Err(UpdateError::NotAnObject {
                    path: path.to_string(),
                })
            }
        };
    }
    Ok(current)
}

fn parent_for_pull<'a>(
    root: &'a mut Map<String, Value>,
    path: &FieldPath,
) -> Result<Option<&'a mut Map<String, Value>>, UpdateError> {
    let mut current = root;
    for segment in parent_segments(path) {
        current = match current.get_mut(segment) {
            None => return Ok(None),
            Some(Value::Object(fields)) => fields,
            Some(_) => {
                return Err(UpdateError::NotAnObject {
                    path: path.to_string(),
                })
            }
        };
    }
    Ok(Some(current))
}
