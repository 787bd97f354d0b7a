//! Tests for dynamic store backends.

use std::time::Duration;

use tempfile::TempDir;

use crate::store::mock::FailingStore;
use crate::store::{DynamicStore, FileStore, MemoryStore, ProviderError, StoredValue, bounded};

mod memory_store {
    use super::*;

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get_one("app.name").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_marks_record_dynamic() {
        let store = MemoryStore::new();
        store.set_one("app.name", "stored").await.unwrap();

        assert_eq!(
            store.get_one("app.name").await.unwrap(),
            Some(StoredValue::dynamic("stored"))
        );
    }

    #[tokio::test]
    async fn list_skips_inactive_records() {
        let store = MemoryStore::new()
            .with_override("app.name", "stored")
            .with_record(
                "app.timezone",
                StoredValue {
                    value: "UTC".to_string(),
                    is_dynamic: false,
                },
            );

        let all = store.list_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all["app.name"], "stored");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_key_is_noop() {
        let store = MemoryStore::new().with_override("a", "1");
        store.delete_one("b").await.unwrap();
        store.delete_one("a").await.unwrap();
        assert!(store.is_empty());
    }
}

mod file_store {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("dynamic.json"));

        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.get_one("app.name").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dynamic.json");

        FileStore::new(&path).set_one("app.name", "stored").await.unwrap();
        assert!(path.exists());

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get_one("app.name").await.unwrap(),
            Some(StoredValue::dynamic("stored"))
        );
    }

    #[tokio::test]
    async fn set_overwrites_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("dynamic.json"));

        store.set_one("app.name", "one").await.unwrap();
        store.set_one("poc.enabled", "false").await.unwrap();
        store.set_one("app.name", "two").await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["app.name"], "two");
        assert_eq!(all["poc.enabled"], "false");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("dynamic.json"));

        store.set_one("app.name", "one").await.unwrap();
        store.delete_one("app.name").await.unwrap();
        store.delete_one("app.name").await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic.json");
        let store = FileStore::new(&path);

        store.set_one("app.name", "one").await.unwrap();

        assert!(!dir.path().join("dynamic.json.tmp").exists());
    }

    #[tokio::test]
    async fn invalid_json_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic.json");
        std::fs::write(&path, "not valid json {{{").unwrap();

        let err = FileStore::new(&path).list_all().await.unwrap_err();
        match err {
            ProviderError::Corrupted { reason } => assert!(reason.contains("Invalid JSON")),
            other => panic!("Expected Corrupted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn incompatible_version_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic.json");
        std::fs::write(&path, r#"{"version": 999, "records": {}}"#).unwrap();

        let err = FileStore::new(&path).get_one("x").await.unwrap_err();
        match err {
            ProviderError::Corrupted { reason } => {
                assert!(reason.contains("Incompatible version"));
                assert!(reason.contains("999"));
            }
            other => panic!("Expected Corrupted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_writers_lose_nothing() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStore::new(dir.path().join("dynamic.json")));

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.set_one(&format!("key.{i}"), "v").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list_all().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn dropped_write_still_lands_before_later_writes() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("dynamic.json"));

        // The caller gives up immediately; the write must not outlive a later delete.
        let _ = tokio::time::timeout(Duration::ZERO, store.set_one("app.name", "late")).await;
        store.delete_one("app.name").await.unwrap();

        assert_eq!(store.get_one("app.name").await.unwrap(), None);
        assert!(!dir.path().join("dynamic.json.tmp").exists());
    }
}

mod timeouts {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let store = FailingStore {
            delay: Some(Duration::from_secs(10)),
            ..FailingStore::default()
        };

        let err = bounded(Some(Duration::from_secs(1)), store.list_all())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn unbounded_call_passes_through() {
        let store = MemoryStore::new().with_override("a", "1");
        let all = bounded(None, store.list_all()).await.unwrap();
        assert_eq!(all["a"], "1");
    }
}
