//! Tests for value tree helpers.

use serde_json::json;

use crate::tree::{deep_merge, insert, lookup};

mod merge {
    use super::*;

    #[test]
    fn scalar_override() {
        let result = deep_merge(json!({"timeout": 100}), json!({"timeout": 200}));
        assert_eq!(result["timeout"], 200);
    }

    #[test]
    fn sibling_keys_survive_partial_override() {
        let base = json!({"database": {"host": "db", "port": 5432}});
        let overlay = json!({"database": {"port": 6432}});

        let result = deep_merge(base, overlay);

        assert_eq!(result["database"]["host"], "db");
        assert_eq!(result["database"]["port"], 6432);
    }

    #[test]
    fn arrays_are_replaced() {
        let base = json!({"targets": ["stdout", "file"]});
        let overlay = json!({"targets": ["stderr"]});

        let result = deep_merge(base, overlay);

        assert_eq!(result["targets"], json!(["stderr"]));
    }

    #[test]
    fn scalar_can_replace_section() {
        let result = deep_merge(json!({"a": {"b": 1}}), json!({"a": 2}));
        assert_eq!(result["a"], 2);
    }
}

mod paths {
    use super::*;

    #[test]
    fn lookup_walks_nested_objects() {
        let tree = json!({"logger": {"output": {"max_size": 100}}});
        assert_eq!(lookup(&tree, "logger.output.max_size"), Some(&json!(100)));
        assert_eq!(lookup(&tree, "logger.output"), Some(&json!({"max_size": 100})));
    }

    #[test]
    fn lookup_misses_absent_or_scalar_parent() {
        let tree = json!({"app": {"name": "x"}});
        assert_eq!(lookup(&tree, "app.version"), None);
        assert_eq!(lookup(&tree, "app.name.first"), None);
        assert_eq!(lookup(&tree, "db.host"), None);
    }

    #[test]
    fn insert_creates_intermediate_objects() {
        let mut tree = json!({});
        insert(&mut tree, "logger.output.max_size", json!(50));
        assert_eq!(tree, json!({"logger": {"output": {"max_size": 50}}}));
    }

    #[test]
    fn insert_keeps_siblings() {
        let mut tree = json!({"app": {"name": "x", "version": "1"}});
        insert(&mut tree, "app.name", json!("y"));
        assert_eq!(tree, json!({"app": {"name": "y", "version": "1"}}));
    }

    #[test]
    fn insert_replaces_scalar_parent() {
        let mut tree = json!({"app": "flat"});
        insert(&mut tree, "app.name", json!("y"));
        assert_eq!(tree, json!({"app": {"name": "y"}}));
    }
}
