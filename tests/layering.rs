//! End-to-end resolution through the public API.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use strata::bootstrap::Bootstrap;
use strata::loader::{ConfigLayout, Environment};
use strata::schema::{Field, Schema};
use strata::service::{ConfigService, ServiceError, ValueSource};
use strata::store::{DynamicStore, FileStore, MemoryStore};

fn root() -> Schema {
    Schema::new()
        .section(
            "app",
            Schema::new()
                .field(Field::string("name").default("apprun").rule("required,min=1").dynamic())
                .field(Field::integer("workers").default(4).rule("min=1,max=64").dynamic()),
        )
        .section(
            "database",
            Schema::new()
                .field(Field::string("host").default("localhost").rule("required"))
                .field(Field::string("password").default("initial-pass").rule("required,min=8")),
        )
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn boot(dir: &TempDir, vars: &[(&str, &str)]) -> Bootstrap {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    Bootstrap::new(ConfigLayout::new(dir.path()))
        .with_root_schema(root())
        .with_environment(Environment::Fixed(vars))
}

async fn start<P: DynamicStore>(dir: &TempDir, vars: &[(&str, &str)], store: P) -> ConfigService<Value, P> {
    boot(dir, vars).start(store).await.unwrap()
}

#[tokio::test]
async fn each_layer_overrides_the_one_below() {
    let dir = TempDir::new().unwrap();

    let service = start(&dir, &[], MemoryStore::new()).await;
    assert_eq!(
        service.get_value("app.name").unwrap(),
        (json!("apprun"), ValueSource::Default)
    );

    write(dir.path(), "default.toml", "[app]\nname = \"custom\"\n");
    let service = start(&dir, &[], MemoryStore::new()).await;
    assert_eq!(
        service.get_value("app.name").unwrap(),
        (json!("custom"), ValueSource::File)
    );

    let store = MemoryStore::new().with_override("app.name", "stored");
    let service = start(&dir, &[], store).await;
    assert_eq!(
        service.get_value("app.name").unwrap(),
        (json!("stored"), ValueSource::Dynamic)
    );

    let store = MemoryStore::new().with_override("app.name", "stored");
    let service = start(&dir, &[("APP_NAME", "fromenv")], store).await;
    assert_eq!(service.snapshot().value("app.name"), Some(&json!("fromenv")));
    assert_eq!(
        service.get_value("app.name").unwrap(),
        (json!("fromenv"), ValueSource::Environment)
    );
}

#[tokio::test]
async fn drop_in_wins_over_domain_and_base_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "default.toml", "[database]\nhost = \"base\"\n");
    write(dir.path(), "database.toml", "[database]\nhost = \"domain\"\n");
    write(dir.path(), "conf.d/50-deploy.toml", "[database]\nhost = \"dropin\"\n");

    let service = start(&dir, &[], MemoryStore::new()).await;

    assert_eq!(service.snapshot().value("database.host"), Some(&json!("dropin")));
    // Untouched sibling keeps its default
    assert_eq!(service.snapshot().value("database.password"), Some(&json!("initial-pass")));
}

#[tokio::test]
async fn static_field_rejects_runtime_change() {
    let dir = TempDir::new().unwrap();
    let service = start(&dir, &[], MemoryStore::new()).await;

    let err = service.update_value("database.password", "x").await.unwrap_err();

    assert!(matches!(err, ServiceError::Forbidden { .. }));
    assert!(service.list_dynamic_overrides().await.unwrap().is_empty());
    assert_eq!(service.snapshot().version(), 1);
}

#[tokio::test]
async fn environment_beats_runtime_update() {
    let dir = TempDir::new().unwrap();
    let service = start(&dir, &[("APP_WORKERS", "8")], MemoryStore::new()).await;

    service.update_value("app.workers", "16").await.unwrap();

    assert_eq!(service.snapshot().value("app.workers"), Some(&json!(8)));
    assert_eq!(
        service.get_value("app.workers").unwrap(),
        (json!(8), ValueSource::Environment)
    );
}

#[tokio::test]
async fn overrides_survive_restart_with_file_store() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("dynamic.json");

    let service = start(&dir, &[], FileStore::new(&store_path)).await;
    service.update_value("app.workers", "12").await.unwrap();
    drop(service);

    let restarted = start(&dir, &[], FileStore::new(&store_path)).await;
    assert_eq!(
        restarted.get_value("app.workers").unwrap(),
        (json!(12), ValueSource::Dynamic)
    );

    restarted.delete_value("app.workers").await.unwrap();
    assert_eq!(
        restarted.get_value("app.workers").unwrap(),
        (json!(4), ValueSource::Default)
    );
}

#[tokio::test]
async fn module_schema_contributes_dynamic_keys() {
    let dir = TempDir::new().unwrap();
    let boot = boot(&dir, &[]);
    boot.registry()
        .register(
            "cache",
            Schema::new().field(Field::integer("ttl").default(60).rule("min=1").dynamic()),
        )
        .unwrap();

    let service: ConfigService<Value, _> = boot.start(MemoryStore::new()).await.unwrap();
    service.update_value("cache.ttl", "120").await.unwrap();

    let keys: Vec<String> = service.allowed_dynamic_keys().into_iter().collect();
    assert_eq!(keys, ["app.name", "app.workers", "cache.ttl"]);
    assert_eq!(service.snapshot().value("cache.ttl"), Some(&json!(120)));
}
