use docshelf_core::{
    Document, DocumentRepository, DocumentStore, DocumentValidationError, MemoryDocumentStore,
    RepoError, SqliteDocumentStore, UpdateError,
};
use serde_json::{json, Value};

fn boxed(store: impl DocumentStore + 'static) -> DocumentRepository<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = Box::new(store);
    DocumentRepository::new(store)
}

fn backends() -> Vec<(&'static str, DocumentRepository<Box<dyn DocumentStore>>)> {
    vec![
        ("memory", boxed(MemoryDocumentStore::new("products"))),
        (
            "sqlite",
            boxed(SqliteDocumentStore::open_in_memory("products").unwrap()),
        ),
    ]
}

fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

fn speaker() -> Document {
    doc(json!({
        "name": "Bluetooth Speaker",
        "sku": "PRD-400",
        "features": ["Waterproof", "Portable", "Long Battery"],
        "connectors": [
            { "type": "Aux", "version": "3.5mm" },
            { "type": "USB", "version": "Type-C" }
        ],
        "price": 49.99
    }))
}

fn features_of<S: DocumentStore>(repo: &DocumentRepository<S>, sku: &str) -> Value {
    repo.find_by_sku(sku)
        .unwrap()
        .expect("document should exist")
        .document
        .get("features")
        .cloned()
        .unwrap_or(Value::Null)
}

#[test]
fn insert_and_find_by_sku_roundtrip() {
    for (name, repo) in backends() {
        let id = repo.insert(&speaker()).unwrap();
        let loaded = repo.find_by_sku("PRD-400").unwrap().unwrap();
        assert_eq!(loaded.id, id, "{name}");
        assert_eq!(loaded.document, speaker(), "{name}");
    }
}

#[test]
fn find_by_sku_reports_absence_as_none() {
    for (name, repo) in backends() {
        assert!(repo.find_by_sku("PRD-999").unwrap().is_none(), "{name}");
    }
}

#[test]
fn insert_requires_string_sku() {
    for (name, repo) in backends() {
        let err = repo.insert(&doc(json!({ "name": "nameless" }))).unwrap_err();
        assert!(
            matches!(err, RepoError::Validation(DocumentValidationError::MissingSku)),
            "{name}"
        );
        let err = repo.insert(&doc(json!({ "sku": 7 }))).unwrap_err();
        assert!(
            matches!(err, RepoError::Validation(DocumentValidationError::InvalidSku)),
            "{name}"
        );
    }
}

#[test]
fn clear_empties_collection_and_reports_count() {
    for (name, repo) in backends() {
        repo.insert(&doc(json!({ "sku": "A" }))).unwrap();
        repo.insert(&doc(json!({ "sku": "B" }))).unwrap();

        assert_eq!(repo.clear().unwrap(), 2, "{name}");
        assert!(repo.find_by_sku("A").unwrap().is_none(), "{name}");
        assert!(repo.find_by_sku("B").unwrap().is_none(), "{name}");
        assert_eq!(repo.clear().unwrap(), 0, "{name}");
    }
}

#[test]
fn push_then_pull_matches_walkthrough_scenario() {
    for (name, repo) in backends() {
        let id = repo
            .insert(&doc(json!({
                "sku": "PRD-400",
                "features": ["Waterproof", "Portable", "Long Battery"]
            })))
            .unwrap();

        assert_eq!(repo.push_feature("PRD-400", "Voice Assistant").unwrap(), 1);
        assert_eq!(
            features_of(&repo, "PRD-400"),
            json!(["Waterproof", "Portable", "Long Battery", "Voice Assistant"]),
            "{name}"
        );

        assert_eq!(repo.pull_feature("PRD-400", "Portable").unwrap(), 1);
        assert_eq!(
            features_of(&repo, "PRD-400"),
            json!(["Waterproof", "Long Battery", "Voice Assistant"]),
            "{name}"
        );

        let loaded = repo.find_by_sku("PRD-400").unwrap().unwrap();
        assert_eq!(loaded.id, id, "{name}: identity survives mutation");
    }
}

#[test]
fn pull_leaves_other_fields_unchanged() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        repo.pull_feature("PRD-400", "Waterproof").unwrap();

        let loaded = repo.find_by_sku("PRD-400").unwrap().unwrap().document;
        assert_eq!(loaded.get("features"), Some(&json!(["Portable", "Long Battery"])));
        for field in ["name", "sku", "connectors", "price"] {
            assert_eq!(loaded.get(field), speaker().get(field), "{name}: {field}");
        }
    }
}

#[test]
fn push_then_pull_restores_features_when_value_was_absent() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        let before = features_of(&repo, "PRD-400");

        repo.push_feature("PRD-400", "Bass Boost").unwrap();
        repo.pull_feature("PRD-400", "Bass Boost").unwrap();

        assert_eq!(features_of(&repo, "PRD-400"), before, "{name}");
    }
}

#[test]
fn push_then_pull_drops_preexisting_occurrences_too() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();

        repo.push_feature("PRD-400", "Portable").unwrap();
        assert_eq!(
            features_of(&repo, "PRD-400"),
            json!(["Waterproof", "Portable", "Long Battery", "Portable"]),
            "{name}: push does not de-duplicate"
        );

        repo.pull_feature("PRD-400", "Portable").unwrap();
        assert_eq!(
            features_of(&repo, "PRD-400"),
            json!(["Waterproof", "Long Battery"]),
            "{name}: pull removes the earlier occurrence as well"
        );
    }
}

#[test]
fn push_creates_features_when_missing() {
    for (name, repo) in backends() {
        repo.insert(&doc(json!({ "sku": "BARE" }))).unwrap();
        assert_eq!(repo.push_feature("BARE", "Solar").unwrap(), 1);
        assert_eq!(features_of(&repo, "BARE"), json!(["Solar"]), "{name}");
    }
}

#[test]
fn mutations_on_unknown_sku_modify_nothing() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        assert_eq!(repo.push_feature("PRD-999", "x").unwrap(), 0, "{name}");
        assert_eq!(repo.pull_feature("PRD-999", "x").unwrap(), 0, "{name}");
    }
}

#[test]
fn pull_of_absent_value_modifies_nothing() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        assert_eq!(repo.pull_feature("PRD-400", "Solar").unwrap(), 0, "{name}");
        assert_eq!(
            features_of(&repo, "PRD-400"),
            json!(["Waterproof", "Portable", "Long Battery"])
        );
    }
}

#[test]
fn mutating_non_array_features_is_rejected_without_changes() {
    for (name, repo) in backends() {
        repo.insert(&doc(json!({ "sku": "ODD", "features": "Waterproof" })))
            .unwrap();

        let err = repo.push_feature("ODD", "Portable").unwrap_err();
        assert!(
            matches!(err, RepoError::InvalidUpdate(UpdateError::NotAnArray { .. })),
            "{name}"
        );
        assert_eq!(features_of(&repo, "ODD"), json!("Waterproof"), "{name}");
    }
}

#[test]
fn all_features_query_requires_superset() {
    for (name, repo) in backends() {
        repo.insert(&doc(json!({ "sku": "ABC", "features": ["A", "B", "C"] })))
            .unwrap();
        repo.insert(&doc(json!({ "sku": "A", "features": ["A"] })))
            .unwrap();
        repo.insert(&doc(json!({ "sku": "NONE" }))).unwrap();

        let found = repo.find_by_all_features(["A", "B"]).unwrap();
        let skus: Vec<_> = found.iter().filter_map(|stored| stored.sku()).collect();
        assert_eq!(skus, vec!["ABC"], "{name}");
        assert_eq!(repo.count_by_all_features(["A", "B"]).unwrap(), 1, "{name}");

        assert_eq!(repo.count_by_all_features(["B", "A", "A"]).unwrap(), 1, "{name}");
        assert_eq!(repo.count_by_all_features(["A"]).unwrap(), 2, "{name}");
        assert!(repo.find_by_all_features(["Z"]).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn nested_field_query_matches_any_array_element() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        repo.insert(&doc(json!({
            "sku": "PRD-500",
            "connectors": [{ "type": "Optical", "version": "TOSLINK" }]
        })))
        .unwrap();

        let found = repo
            .find_by_nested_field("connectors.version", "Type-C")
            .unwrap();
        assert_eq!(found.len(), 1, "{name}");
        assert_eq!(found[0].sku(), Some("PRD-400"), "{name}");
        assert_eq!(
            repo.count_by_nested_field("connectors.version", "Type-C")
                .unwrap(),
            1,
            "{name}"
        );
        assert_eq!(
            repo.count_by_nested_field("connectors.type", "Optical")
                .unwrap(),
            1,
            "{name}"
        );
        assert_eq!(
            repo.count_by_nested_field("connectors.version", "Lightning")
                .unwrap(),
            0,
            "{name}"
        );
    }
}

#[test]
fn nested_field_query_supports_positions_and_numbers() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        assert_eq!(repo.count_by_nested_field("features.0", "Waterproof").unwrap(), 1);
        assert_eq!(repo.count_by_nested_field("price", 49.99).unwrap(), 1, "{name}");
        assert_eq!(repo.count_by_nested_field("connectors.1.type", "USB").unwrap(), 1);
    }
}

#[test]
fn nested_field_query_rejects_malformed_paths() {
    for (name, repo) in backends() {
        assert!(
            matches!(
                repo.find_by_nested_field("connectors..version", "Type-C"),
                Err(RepoError::InvalidPath(_))
            ),
            "{name}"
        );
        assert!(
            matches!(repo.count_by_nested_field("", "x"), Err(RepoError::InvalidPath(_))),
            "{name}"
        );
    }
}

#[test]
fn duplicate_skus_are_accepted_and_updates_touch_one_document() {
    for (name, repo) in backends() {
        repo.insert(&doc(json!({ "sku": "DUP", "features": [] })))
            .unwrap();
        repo.insert(&doc(json!({ "sku": "DUP", "features": [] })))
            .unwrap();

        assert_eq!(repo.push_feature("DUP", "x").unwrap(), 1, "{name}");
        assert_eq!(repo.count_by_all_features(["x"]).unwrap(), 1, "{name}");
        assert_eq!(repo.count_by_nested_field("sku", "DUP").unwrap(), 2, "{name}");
    }
}

#[test]
fn find_returns_documents_in_insertion_order() {
    for (name, repo) in backends() {
        for sku in ["first", "second", "third"] {
            repo.insert(&doc(json!({ "sku": sku, "features": ["shared"] })))
                .unwrap();
        }
        let skus: Vec<String> = repo
            .find_by_all_features(["shared"])
            .unwrap()
            .into_iter()
            .filter_map(|stored| stored.sku().map(str::to_string))
            .collect();
        assert_eq!(skus, vec!["first", "second", "third"], "{name}");
    }
}

#[test]
fn close_releases_store() {
    for (name, repo) in backends() {
        repo.insert(&speaker()).unwrap();
        assert!(repo.close().is_ok(), "{name}");
    }
}
