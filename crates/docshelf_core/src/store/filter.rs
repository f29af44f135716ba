//! Query primitives evaluated against documents.
//!
//! # Invariants
//! - Every backend evaluates filters through `Filter::matches`, so query
//!   semantics never depend on the store.
//! - `All` with an empty value list matches nothing.

use crate::model::document::Document;
use crate::model::path::{leaf_matches, FieldPath};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Selection predicate for store primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Some value reached by `path` equals `value`, directly or as an array
    /// element.
    Eq { path: FieldPath, value: Value },
    /// Every entry of `values` satisfies `Eq` on `path`.
    All { path: FieldPath, values: Vec<Value> },
}

impl Filter {
    pub fn eq(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::Eq {
            path,
            value: value.into(),
        }
    }

    pub fn all<I, V>(path: FieldPath, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::All {
            path,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Eq { path, .. } | Self::All { path, .. } => path,
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        let leaves = self.path().resolve(document.fields());
        match self {
            Self::Eq { value, .. } => leaves.iter().any(|leaf| leaf_matches(leaf, value)),
            Self::All { values, .. } => {
                !values.is_empty()
                    && values
                        .iter()
                        .all(|value| leaves.iter().any(|leaf| leaf_matches(leaf, value)))
            }
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq { path, value } => write!(f, "({path} == {value})"),
            Self::All { path, values } => {
                write!(f, "({path} all {})", Value::Array(values.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use crate::model::document::Document;
    use crate::model::path::FieldPath;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn features() -> FieldPath {
        FieldPath::field("features")
    }

    #[test]
    fn eq_matches_scalars_and_array_members() {
        let item = doc(json!({ "sku": "A", "features": ["x", "y"] }));
        assert!(Filter::eq(FieldPath::field("sku"), "A").matches(&item));
        assert!(!Filter::eq(FieldPath::field("sku"), "B").matches(&item));
        assert!(Filter::eq(features(), "y").matches(&item));
        assert!(Filter::eq(features(), json!(["x", "y"])).matches(&item));
        assert!(!Filter::eq(features(), json!(["y", "x"])).matches(&item));
    }

    #[test]
    fn all_requires_superset() {
        let abc = doc(json!({ "sku": "1", "features": ["A", "B", "C"] }));
        let a = doc(json!({ "sku": "2", "features": ["A"] }));
        let filter = Filter::all(features(), ["A", "B"]);
        assert!(filter.matches(&abc));
        assert!(!filter.matches(&a));
    }

    #[test]
    fn all_ignores_order_and_duplicates() {
        let item = doc(json!({ "sku": "1", "features": ["A", "B"] }));
        assert!(Filter::all(features(), ["B", "A", "B"]).matches(&item));
    }

    #[test]
    fn all_with_empty_values_matches_nothing() {
        let item = doc(json!({ "sku": "1", "features": ["A"] }));
        assert!(!Filter::all(features(), Vec::<Value>::new()).matches(&item));
    }

    #[test]
    fn all_on_missing_field_matches_nothing() {
        let item = doc(json!({ "sku": "1" }));
        assert!(!Filter::all(features(), ["A"]).matches(&item));
    }

    #[test]
    fn nested_eq_is_existential_over_arrays() {
        let speaker = doc(json!({
            "sku": "PRD-400",
            "connectors": [
                { "type": "Aux", "version": "3.5mm" },
                { "type": "USB", "version": "Type-C" }
            ]
        }));
        let path = FieldPath::parse("connectors.version").unwrap();
        assert!(Filter::eq(path.clone(), "Type-C").matches(&speaker));
        assert!(Filter::eq(path.clone(), "3.5mm").matches(&speaker));
        assert!(!Filter::eq(path, "Lightning").matches(&speaker));
    }

    #[test]
    fn display_is_readable() {
        let filter = Filter::all(features(), ["A", "B"]);
        assert_eq!(filter.to_string(), r#"(features all ["A","B"])"#);
    }
}
