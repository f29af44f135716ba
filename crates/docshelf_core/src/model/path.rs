//! Dotted field paths and value equality.
//!
//! # Responsibility
//! - Parse `a.b.c` paths into segments.
//! - Resolve a path against a document into candidate leaf values.
//! - Compare JSON values the way queries expect.
//!
//! # Invariants
//! - A path has at least one segment and no segment is empty.
//! - Resolution through an array applies the remaining path to each object
//!   element (existential semantics); a numeric segment also addresses the
//!   element at that position.
//! - Numbers compare by numeric value, objects compare regardless of key order.

use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const FIELD_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
    EmptySegment { path: String },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "field path cannot be empty"),
            Self::EmptySegment { path } => {
                write!(f, "field path `{path}` contains an empty segment")
            }
        }
    }
}

impl Error for PathError {}

/// Parsed dotted path such as `connectors.version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    /// - `Empty` for an empty or blank input.
    /// - `EmptySegment` for inputs like `a..b`, `.a` or `a.`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = trimmed
            .split(FIELD_SEPARATOR)
            .map(str::to_string)
            .collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: trimmed.to_string(),
            });
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Path addressing one top-level field; `name` is taken literally.
    pub fn field(name: &str) -> Self {
        Self {
            raw: name.to_string(),
            segments: vec![name.to_string()],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Collects every value reachable through this path.
    ///
    /// Missing fields and scalars on the way contribute nothing, so an empty
    /// result means "no such field" for every branch.
    pub fn resolve<'a>(&self, root: &'a Map<String, Value>) -> Vec<&'a Value> {
        let mut leaves = Vec::new();
        if let Some((head, rest)) = self.segments.split_first() {
            if let Some(value) = root.get(head) {
                collect_leaves(value, rest, &mut leaves);
            }
        }
        leaves
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn collect_leaves<'a>(value: &'a Value, segments: &[String], leaves: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        leaves.push(value);
        return;
    };

    match value {
        Value::Object(fields) => {
            if let Some(next) = fields.get(head) {
                collect_leaves(next, rest, leaves);
            }
        }
        Value::Array(items) => {
            if let Ok(index) = head.parse::<usize>() {
                if let Some(item) = items.get(index) {
                    collect_leaves(item, rest, leaves);
                }
            }
            for item in items.iter().filter(|item| item.is_object()) {
                collect_leaves(item, segments, leaves);
            }
        }
        _ => {}
    }
}

/// Query equality between two JSON values.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => numbers_equal(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => left == right,
    }
}

/// Whether a resolved leaf satisfies an equality condition: the leaf equals
/// `expected`, or the leaf is an array holding an element equal to it.
pub fn leaf_matches(leaf: &Value, expected: &Value) -> bool {
    values_equal(leaf, expected)
        || leaf
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(item, expected)))
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return l == r;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}
