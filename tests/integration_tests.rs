//! Integration tests for lconf.
//!
//! These tests load real files from temporary directories and exercise the
//! full load procedure, including nested includes.

use lconf::loader::{MemoryStore, SearchRoots};
use lconf::{load, load_file, ConfError, LoadOptions, Value, INCLUDE_KEY};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to write a file below `dir`, creating parent directories.
fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn test_typical_document() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app.conf",
        r#"{
            // http settings
            http: {
                addr: "www.example.com",
                ports: [80, 8080,],
                timeout: "1m30s",
            },
            /* feature switches */
            features: {cache: "true", workers: 3.5},
        }"#,
    );

    let conf = load_file(dir.path().join("app.conf")).unwrap();
    assert_eq!(conf.string("http.addr", ""), "www.example.com");
    assert_eq!(conf.int_list("http.ports", &[]), vec![80, 8080]);
    assert_eq!(conf.int("http.ports[1]", 0), 8080);
    assert_eq!(
        conf.duration("http.timeout", Default::default()),
        std::time::Duration::from_secs(90)
    );
    assert!(conf.bool("features.cache", false));
    assert_eq!(conf.int("features.workers", 0), 4);
}

#[test]
fn test_get_empty_key_returns_decoded_tree() {
    let dir = TempDir::new().unwrap();
    let text = r#"{"a": {"b": [10, 20, {"c": 5}]}, "s": "x", "n": null}"#;
    write(dir.path(), "plain.conf", text);

    let conf = load_file(dir.path().join("plain.conf")).unwrap();
    let expected: Value = json5::from_str(text).unwrap();
    assert_eq!(conf.get(""), Some(&expected));
    assert_eq!(conf.get("a.b[2].c"), Some(&Value::Number(5.0)));
    assert_eq!(conf.get("a.b[5]"), None);
}

#[test]
fn test_include_overwrites_parent_keys() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "parent.json",
        r##"{"x": 1, "#include#": "child.json"}"##,
    );
    write(dir.path(), "child.json", r#"{"x": 2, "y": 3}"#);

    let conf = load_file(dir.path().join("parent.json")).unwrap();
    let expected: Value = json5::from_str(r#"{"x": 2, "y": 3}"#).unwrap();
    assert_eq!(conf.root(), &expected);
    assert!(!conf.contains(INCLUDE_KEY));
}

#[test]
fn test_missing_include_is_silently_dropped() {
    // Intentional: a missing include target contributes nothing and the
    // load still succeeds.
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "parent.json",
        r##"{"x": 1, "#include#": "missing.json"}"##,
    );

    let conf = load_file(dir.path().join("parent.json")).unwrap();
    assert_eq!(conf.content().len(), 1);
    assert_eq!(conf.int("x", 0), 1);
    assert!(!conf.contains(INCLUDE_KEY));
}

#[test]
fn test_malformed_include_is_silently_dropped() {
    // Intentional: a decode error in an included file is absorbed.
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "parent.json",
        r##"{"x": 1, "#include#": ["broken.json", "good.json"]}"##,
    );
    write(dir.path(), "broken.json", "{ this is not json");
    write(dir.path(), "good.json", r#"{"y": 2}"#);

    let conf = load_file(dir.path().join("parent.json")).unwrap();
    assert_eq!(conf.int("x", 0), 1);
    assert_eq!(conf.int("y", 0), 2);
    assert_eq!(conf.content().len(), 2);
}

#[test]
fn test_nested_includes_resolve_relative_to_including_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.conf",
        r##"{
            name: "main",
            db: {"#include#": "conf.d/db.conf"},
        }"##,
    );
    write(
        dir.path(),
        "conf.d/db.conf",
        r##"{host: "db.local", "#include#": "secrets/db-auth.conf"}"##,
    );
    write(dir.path(), "conf.d/secrets/db-auth.conf", r#"{user: "app"}"#);

    let conf = load_file(dir.path().join("main.conf")).unwrap();
    assert_eq!(conf.string("db.host", ""), "db.local");
    assert_eq!(conf.string("db.user", ""), "app");

    let db = conf.section("db").unwrap();
    assert_eq!(db.path(), dir.path().join("main.conf"));
    assert_eq!(db.content().len(), 2);
}

#[test]
fn test_include_list_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.conf",
        r##"{"#include#": ["base.conf", "override.conf"], "local": true}"##,
    );
    write(dir.path(), "base.conf", r#"{level: "info", size: 1}"#);
    write(dir.path(), "override.conf", r#"{level: "debug"}"#);

    let conf = load_file(dir.path().join("main.conf")).unwrap();
    assert_eq!(conf.string("level", ""), "debug");
    assert_eq!(conf.int("size", 0), 1);
    assert!(conf.bool("local", false));
}

#[test]
fn test_defaults_for_missing_and_unparseable() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.conf", r#"{flag: "notabool", n: "many"}"#);

    let conf = load_file(dir.path().join("app.conf")).unwrap();
    assert!(conf.bool("flag", true));
    assert!(conf.bool("other", true));
    assert_eq!(conf.int("n", 7), 7);
    assert_eq!(conf.float("n", 0.5), 0.5);
}

#[test]
fn test_section_not_found() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.conf", r#"{scalar: 1}"#);

    let conf = load_file(dir.path().join("app.conf")).unwrap();
    assert!(matches!(
        conf.section("missing"),
        Err(ConfError::SectionNotFound { .. })
    ));
    assert!(matches!(
        conf.section("scalar"),
        Err(ConfError::SectionNotFound { .. })
    ));
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let conf = load_file(dir.path().join("absent.conf")).unwrap();
    assert!(conf.content().is_empty());
    assert_eq!(conf.string("anything", "default"), "default");
}

#[test]
fn test_decode_error_is_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.conf", "{ a: }");

    let err = load_file(dir.path().join("bad.conf")).unwrap_err();
    assert!(matches!(err, ConfError::Decode { .. }));
    assert!(err.to_string().contains("bad.conf"));
}

#[test]
fn test_locator_prefers_working_directory() {
    let cwd = TempDir::new().unwrap();
    let exe = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    write(cwd.path(), "app.conf", "{from: 'cwd'}");
    write(exe.path(), "app.conf", "{from: 'exe'}");
    write(home.path(), "app.conf", "{from: 'home'}");

    let roots = SearchRoots {
        cwd: Some(cwd.path().to_path_buf()),
        exe_dir: Some(exe.path().to_path_buf()),
        home: Some(home.path().to_path_buf()),
    };
    let options = LoadOptions::new().with_search_roots(roots.clone());
    assert_eq!(load("app.conf", &options).unwrap().string("from", ""), "cwd");

    fs::remove_file(cwd.path().join("app.conf")).unwrap();
    assert_eq!(load("app.conf", &options).unwrap().string("from", ""), "exe");

    fs::remove_file(exe.path().join("app.conf")).unwrap();
    assert_eq!(load("app.conf", &options).unwrap().string("from", ""), "home");
}

#[test]
fn test_store_backend_with_includes() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        "/services/api/main",
        r##"{
            port: 8080,
            "#include#": ["../shared/logging", "missing"],
        }"##,
    );
    store.insert("/services/shared/logging", r#"{log: {level: "warn"}}"#);

    let options = LoadOptions::new().with_store(store);
    let conf = load("/services/api/main", &options).unwrap();

    assert_eq!(conf.int("port", 0), 8080);
    assert_eq!(conf.string("log.level", ""), "warn");
    assert!(!conf.contains(INCLUDE_KEY));
    assert_eq!(conf.path(), Path::new("/services/api/main"));
}

#[test]
fn test_large_integer_in_included_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.conf",
        r##"{"id": 18446744073709551616, "#include#": "limits.conf", "nothing": null}"##,
    );
    write(dir.path(), "limits.conf", r#"{max: 123456789012345678901234, min: 1}"#);

    let conf = load_file(dir.path().join("main.conf")).unwrap();
    assert_eq!(conf.get("id"), Some(&Value::Number(1.8446744073709552e19)));
    assert_eq!(conf.string("max", ""), "1.2345678901234569e+23");
    assert_eq!(conf.int("max", -1), -1);
    assert_eq!(conf.int("min", 0), 1);
    assert_eq!(conf.value("nothing", &Value::from("def")), &Value::from("def"));
}
