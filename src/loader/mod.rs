//! Configuration loading.
//!
//! Documents are read from the filesystem (default) or from a
//! [`DocumentStore`], decoded as relaxed JSON and have their includes
//! resolved before being handed out as a [`Conf`].

mod include;
mod literal;
mod locate;
mod store;

pub use include::INCLUDE_KEY;
pub use locate::{locate, SearchRoots};
pub use store::{DocumentStore, MemoryStore, StoreError};

use crate::conf::Conf;
use crate::error::{ConfError, Result};
use crate::value::{Map, Value};
use include::resolve_includes;
use literal::widen_integer_literals;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Options for a load.
///
/// The default loads from the filesystem, locating relative paths with the
/// search roots of the running process.
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Backing store used instead of the filesystem
    store: Option<Arc<dyn DocumentStore>>,
    /// Search roots overriding the process environment
    search_roots: Option<SearchRoots>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents from `store` instead of the filesystem.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Locate relative file paths against `roots`.
    pub fn with_search_roots(mut self, roots: SearchRoots) -> Self {
        self.search_roots = Some(roots);
        self
    }

    pub fn store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.store.as_ref()
    }

    /// Whether loads go to a document store rather than the filesystem.
    pub fn uses_store(&self) -> bool {
        self.store.is_some()
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("store", &self.store.as_ref().map(|s| s.describe()))
            .field("search_roots", &self.search_roots)
            .finish()
    }
}

/// Load configuration from `path` with the given options.
///
/// A file that does not exist yields an empty configuration rather than an
/// error. Read and parse failures are returned; failed includes are not.
pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Conf> {
    Loader::new(options).load(path.as_ref())
}

/// Load configuration from the filesystem with default options.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Conf> {
    load(path, &LoadOptions::default())
}

/// Decode a relaxed-JSON document held in memory.
///
/// Includes are not resolved since there is no directory to resolve them
/// against; an include entry stays in the tree as an ordinary key.
pub fn parse_str<P: Into<PathBuf>>(text: &str, path: P) -> Result<Conf> {
    let path = path.into();
    let map = decode(text, &path)?;
    Ok(Conf::new(path, map))
}

/// Decode `text` into the root mapping of a document.
fn decode(text: &str, path: &Path) -> Result<Map> {
    let value: Value = match json5::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            // Integer literals beyond i64 fail in the decoder; retry them as floats.
            let widened = widen_integer_literals(text).and_then(|text| json5::from_str(&text).ok());
            match widened {
                Some(value) => {
                    debug!(path = %path.display(), "decoded with out-of-range integers read as floats");
                    value
                }
                None => {
                    return Err(ConfError::Decode {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }
    };

    match value {
        Value::Object(map) => Ok(Arc::unwrap_or_clone(map)),
        other => Err(ConfError::Decode {
            path: path.to_path_buf(),
            message: format!("top-level value must be an object, found {}", other.kind()),
        }),
    }
}

/// One load procedure, including the loads of every nested include.
struct Loader<'a> {
    options: &'a LoadOptions,
    /// Documents currently being loaded, outermost first
    active: Vec<PathBuf>,
}

impl<'a> Loader<'a> {
    fn new(options: &'a LoadOptions) -> Self {
        Self {
            options,
            active: Vec::new(),
        }
    }

    fn load(&mut self, requested: &Path) -> Result<Conf> {
        match self.options.store() {
            Some(store) => self.load_from_store(Arc::clone(store), requested),
            None => self.load_from_file(requested),
        }
    }

    fn load_from_file(&mut self, requested: &Path) -> Result<Conf> {
        let path = match &self.options.search_roots {
            Some(roots) => roots.locate(requested),
            None => locate(requested),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "configuration file not found, using empty configuration");
                return Ok(Conf::empty(path));
            }
            Err(source) => return Err(ConfError::Read { path, source }),
        };

        let map = self.decode_and_include(&text, &path)?;
        Ok(Conf::new(path, map))
    }

    fn load_from_store(&mut self, store: Arc<dyn DocumentStore>, key: &Path) -> Result<Conf> {
        let key = normalize(key);
        let raw = store.fetch(&key.to_string_lossy())?;
        let text = String::from_utf8(raw).map_err(|e| ConfError::Decode {
            path: key.clone(),
            message: e.to_string(),
        })?;

        let map = self.decode_and_include(&text, &key)?;
        Ok(Conf::new(key, map))
    }

    fn decode_and_include(&mut self, text: &str, path: &Path) -> Result<Map> {
        let mut map = decode(text, path)?;
        let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();

        let identity = self.identity(path);
        self.active.push(identity);
        resolve_includes(&mut map, &base_dir, &mut |target: &Path| self.load_include(target));
        self.active.pop();

        Ok(map)
    }

    fn load_include(&mut self, target: &Path) -> Result<Map> {
        let identity = self.identity(target);
        if self.active.contains(&identity) {
            warn!(path = %target.display(), "include cycle detected");
            return Err(ConfError::Decode {
                path: target.to_path_buf(),
                message: "include cycle".to_string(),
            });
        }
        self.load(target).map(Conf::into_map)
    }

    /// A stable name for `path`, used to detect include cycles.
    fn identity(&self, path: &Path) -> PathBuf {
        if self.options.uses_store() {
            return normalize(path);
        }
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ // comment\n http: { port: 80, }, }").unwrap();

        let conf = load_file(file.path()).unwrap();
        assert_eq!(conf.int("http.port", 0), 80);
        assert_eq!(conf.path(), file.path());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let conf = load_file("/nonexistent/path/config.conf").unwrap();
        assert!(conf.content().is_empty());
        assert_eq!(conf.path(), Path::new("/nonexistent/path/config.conf"));
    }

    #[test]
    fn test_load_invalid_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ a: [1, 2 }").unwrap();

        let result = load_file(file.path());
        assert!(matches!(result.unwrap_err(), ConfError::Decode { .. }));
    }

    #[test]
    fn test_large_integers_decode_as_floats() {
        let conf = parse_str(
            r#"{"big": 18446744073709551616, "neg": -9223372036854775809, "small": 7}"#,
            "big.conf",
        )
        .unwrap();
        assert_eq!(conf.get("big"), Some(&Value::Number(1.8446744073709552e19)));
        assert_eq!(conf.get("neg"), Some(&Value::Number(-9.223372036854776e18)));
        assert_eq!(conf.int("small", 0), 7);
    }

    #[test]
    fn test_large_integer_does_not_hide_syntax_error() {
        let err = parse_str(r#"{"big": 18446744073709551616, "bad": }"#, "bad.conf").unwrap_err();
        assert!(matches!(err, ConfError::Decode { .. }));
    }

    #[test]
    fn test_load_non_object_root() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("top-level value must be an object"));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file(dir.path()).unwrap_err();
        assert!(matches!(err, ConfError::Read { .. }));
    }

    #[test]
    fn test_include_cycle_is_cut() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.conf"),
            r##"{"a": 1, "#include#": "b.conf"}"##,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.conf"),
            r##"{"b": 2, "#include#": "a.conf"}"##,
        )
        .unwrap();

        let conf = load_file(dir.path().join("a.conf")).unwrap();
        assert_eq!(conf.int("a", 0), 1);
        assert_eq!(conf.int("b", 0), 2);
        assert!(conf.get(INCLUDE_KEY).is_none());
    }

    #[test]
    fn test_relative_path_uses_search_roots() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.conf"), "{name: 'app'}").unwrap();

        let options = LoadOptions::new().with_search_roots(SearchRoots {
            cwd: None,
            exe_dir: None,
            home: Some(dir.path().to_path_buf()),
        });
        let conf = load("app.conf", &options).unwrap();
        assert_eq!(conf.string("name", ""), "app");
        assert_eq!(conf.path(), dir.path().join("app.conf"));
    }

    #[test]
    fn test_load_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.insert("/svc/main", r##"{port: 80, "#include#": "extra"}"##);
        store.insert("/svc/extra", "{debug: true}");

        let options = LoadOptions::new().with_store(store);
        let conf = load("/svc/main", &options).unwrap();
        assert_eq!(conf.int("port", 0), 80);
        assert!(conf.bool("debug", false));
        assert_eq!(conf.path(), Path::new("/svc/main"));
    }

    #[test]
    fn test_load_from_store_missing_key() {
        let options = LoadOptions::new().with_store(Arc::new(MemoryStore::new()));
        let err = load("/svc/main", &options).unwrap_err();
        assert!(matches!(err, ConfError::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn test_parse_str_keeps_include_key() {
        let conf = parse_str(r##"{"#include#": "x.conf", a: 1}"##, "inline").unwrap();
        assert_eq!(conf.string(INCLUDE_KEY, ""), "x.conf");
        assert_eq!(conf.path(), Path::new("inline"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_options_debug() {
        let options = LoadOptions::new().with_store(Arc::new(MemoryStore::new()));
        let debug = format!("{:?}", options);
        assert!(debug.contains("memory store"));
        assert!(options.uses_store());
        assert!(!LoadOptions::default().uses_store());
    }
}
