//! Tests for the schema registry.

use std::sync::Arc;
use std::thread;

use super::{Field, RegistryError, Schema, SchemaRegistry};

fn schema() -> Schema {
    Schema::new().field(Field::string("level").default("info"))
}

#[test]
fn register_and_lookup() {
    let registry = SchemaRegistry::new();
    registry.register("logger", schema()).unwrap();

    assert!(registry.has("logger"));
    assert!(!registry.has("user"));
    assert_eq!(registry.count(), 1);
    assert_eq!(registry.get("logger"), Some(schema()));
    assert_eq!(registry.get("user"), None);
}

#[test]
fn get_all_is_ordered_copy() {
    let registry = SchemaRegistry::new();
    registry.register("user", schema()).unwrap();
    registry.register("logger", schema()).unwrap();

    let all = registry.get_all();
    let names: Vec<&str> = all.keys().map(String::as_str).collect();
    assert_eq!(names, ["logger", "user"]);
}

#[test]
fn duplicate_namespace_is_rejected() {
    let registry = SchemaRegistry::new();
    registry.register("logger", schema()).unwrap();

    let err = registry.register("logger", schema()).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Duplicate {
            namespace: "logger".to_string()
        }
    );
    assert_eq!(registry.count(), 1);
}

#[test]
fn empty_namespace_is_rejected() {
    let registry = SchemaRegistry::new();
    assert_eq!(
        registry.register("", schema()),
        Err(RegistryError::EmptyNamespace)
    );
}

#[test]
fn non_identifier_namespace_is_rejected() {
    let registry = SchemaRegistry::new();
    for namespace in ["Logger", "log.ger", "1st", "with space"] {
        assert!(
            matches!(
                registry.register(namespace, schema()),
                Err(RegistryError::InvalidNamespace { .. })
            ),
            "{namespace}"
        );
    }
}

#[test]
fn empty_schema_is_rejected() {
    let registry = SchemaRegistry::new();
    assert!(matches!(
        registry.register("logger", Schema::new()),
        Err(RegistryError::EmptySchema { .. })
    ));
}

#[test]
fn sealed_registry_rejects_registration_but_serves_lookups() {
    let registry = SchemaRegistry::new();
    registry.register("logger", schema()).unwrap();
    registry.seal();
    registry.seal();

    assert!(registry.is_sealed());
    assert!(matches!(
        registry.register("user", schema()),
        Err(RegistryError::Sealed { .. })
    ));
    assert!(registry.has("logger"));
}

#[test]
fn concurrent_registration_keeps_every_module() {
    let registry = Arc::new(SchemaRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.register(format!("module_{i}"), schema()))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(registry.count(), 8);
}
