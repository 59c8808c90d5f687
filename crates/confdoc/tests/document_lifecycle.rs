//! Integration tests for the document lifecycle against the real file system.
//!
//! These tests exercise create/read/update/delete through the public API and
//! check what actually ends up on disk after each step.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use confdoc::{ConfigDocument, ConfigError, ConfigFormat, DocumentStore, Encoding, FileStore};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// File store whose writes can be switched off mid-test to simulate a path
/// that has become unwritable.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: FileStore,
    fail_writes: Rc<Cell<bool>>,
}

impl DocumentStore for FlakyStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated unwritable path",
            ));
        }
        self.inner.write(path, bytes)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.inner.remove(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_update_then_reload_from_disk_returns_new_content() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");

    let mut doc = ConfigDocument::create(&path, ConfigFormat::Json, json!({"a": 1})).unwrap();
    doc.update_content(json!({"a": 2})).unwrap();

    let reloaded = ConfigDocument::read(&path, ConfigFormat::Json).unwrap();
    assert_eq!(reloaded.content().unwrap(), &json!({"a": 2}));
}

#[test]
fn test_toml_update_is_persisted() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let mut doc = ConfigDocument::create(&path, ConfigFormat::Toml, json!({"port": 80})).unwrap();

    doc.update_content(json!({"port": 8080, "tls": {"enabled": true}})).unwrap();

    let on_disk: Value = ConfigFormat::Toml
        .parse(&fs::read_to_string(&path).unwrap())
        .unwrap();
    assert_eq!(on_disk, json!({"port": 8080, "tls": {"enabled": true}}));
}

#[test]
fn test_read_of_serialized_text_returns_same_content() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let content = json!({
        "name": "demo",
        "retries": 3,
        "weights": [0.25, 0.75],
        "nested": {"flag": false, "list": ["x", "y"]}
    });

    for format in ConfigFormat::ALL {
        let path = dir.path().join(format!("doc.{}", format.extension()));
        fs::write(&path, format.serialize(&content).unwrap()).unwrap();

        let doc = ConfigDocument::read(&path, format).unwrap();

        assert_eq!(doc.content().unwrap(), &content, "{format} round trip");
    }
}

#[test]
fn test_failed_update_leaves_file_byte_identical() {
    // Arrange
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    let store = FlakyStore::default();
    let switch = Rc::clone(&store.fail_writes);
    let mut doc =
        ConfigDocument::create_with_store(store, &path, ConfigFormat::Json, json!({"a": 1}))
            .unwrap();
    let before = fs::read(&path).unwrap();

    // Act
    switch.set(true);
    let result = doc.update_content(json!({"a": 2}));

    // Assert
    assert!(matches!(result, Err(ConfigError::Io { .. })), "write failure must be surfaced");
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(doc.content().unwrap(), &json!({"a": 1}));

    // A later successful write still goes through.
    switch.set(false);
    doc.update_content(json!({"a": 3})).unwrap();
    let reloaded = ConfigDocument::read(&path, ConfigFormat::Json).unwrap();
    assert_eq!(reloaded.content().unwrap(), &json!({"a": 3}));
}

#[test]
fn test_delete_removes_file_and_invalidates_document() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.toml");
    let mut doc = ConfigDocument::create(&path, ConfigFormat::Toml, json!({"k": "v"})).unwrap();

    doc.delete().unwrap();

    assert!(!path.exists());
    let err = ConfigDocument::read(&path, ConfigFormat::Toml).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert!(doc.update_content(json!({})).unwrap_err().is_invalid_state());
    assert!(doc.encode(Encoding::Hex).unwrap_err().is_invalid_state());
    assert!(doc.delete().unwrap_err().is_invalid_state());
}

#[test]
fn test_encode_does_not_rewrite_backing_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    let mut doc = ConfigDocument::create(&path, ConfigFormat::Json, json!({"k": "v"})).unwrap();
    let before = fs::read(&path).unwrap();

    doc.encode(Encoding::Base32).unwrap();

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_merge_content_keeps_existing_keys_on_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    let mut doc =
        ConfigDocument::create(&path, ConfigFormat::Json, json!({"test": "test"})).unwrap();
    let Value::Object(values) = json!({"test2": "test2"}) else {
        unreachable!()
    };

    doc.merge_content(values).unwrap();

    let reloaded = ConfigDocument::read(&path, ConfigFormat::Json).unwrap();
    assert_eq!(reloaded.content().unwrap(), &json!({"test": "test", "test2": "test2"}));
}

#[test]
fn test_reload_picks_up_external_edits() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.toml");
    let mut doc =
        ConfigDocument::create(&path, ConfigFormat::Toml, json!({"level": "info"})).unwrap();

    fs::write(&path, "level = \"debug\"\n").unwrap();
    doc.reload().unwrap();

    assert_eq!(doc.content().unwrap(), &json!({"level": "debug"}));
}

#[test]
fn test_open_or_create_keeps_existing_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "{\"keep\": true}").unwrap();

    let doc = ConfigDocument::open_or_create(&path, ConfigFormat::Json).unwrap();

    assert_eq!(doc.content().unwrap(), &json!({"keep": true}));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"keep\": true}");
}

#[test]
fn test_create_in_missing_directory_is_io_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("app.json");

    let err = ConfigDocument::create(&path, ConfigFormat::Json, json!({})).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_read_malformed_file_is_parse_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[[ not valid toml").unwrap();

    let err = ConfigDocument::read(&path, ConfigFormat::Toml).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Toml, .. }));
}
