//! Configuration file location.
//!
//! A relative file name is searched in the working directory, next to the
//! running executable and in the user's home directory, in that order.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories searched when resolving a relative configuration path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
    /// Current working directory
    pub cwd: Option<PathBuf>,
    /// Directory containing the running executable
    pub exe_dir: Option<PathBuf>,
    /// Home directory of the current user
    pub home: Option<PathBuf>,
}

impl SearchRoots {
    /// Search roots of the running process.
    pub fn from_env() -> Self {
        Self {
            cwd: std::env::current_dir().ok(),
            exe_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            home: dirs::home_dir(),
        }
    }

    /// Resolve `requested` against the search roots.
    ///
    /// Absolute paths are returned unchanged without checking that they
    /// exist. Otherwise the first existing candidate wins, and when none
    /// exists the path is made absolute against the working directory so
    /// that the caller can report it.
    pub fn locate(&self, requested: &Path) -> PathBuf {
        if requested.is_absolute() {
            return requested.to_path_buf();
        }

        let candidates = [
            ("cwd", self.cwd.as_ref()),
            ("exe_dir", self.exe_dir.as_ref()),
            ("home", self.home.as_ref()),
        ];

        for (root_name, root) in candidates {
            let Some(root) = root else { continue };
            let candidate = root.join(requested);
            if candidate.exists() {
                debug!(
                    requested = %requested.display(),
                    root = root_name,
                    path = %candidate.display(),
                    "located configuration file"
                );
                return candidate;
            }
        }

        let fallback = match &self.cwd {
            Some(cwd) => cwd.join(requested),
            None => requested.to_path_buf(),
        };
        debug!(
            requested = %requested.display(),
            path = %fallback.display(),
            "configuration file not found in any search root"
        );
        fallback
    }
}

/// Resolve `requested` against the search roots of the running process.
pub fn locate<P: AsRef<Path>>(requested: P) -> PathBuf {
    SearchRoots::from_env().locate(requested.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Roots {
        cwd: TempDir,
        exe: TempDir,
        home: TempDir,
    }

    impl Roots {
        fn new() -> Self {
            Self {
                cwd: TempDir::new().unwrap(),
                exe: TempDir::new().unwrap(),
                home: TempDir::new().unwrap(),
            }
        }

        fn search_roots(&self) -> SearchRoots {
            SearchRoots {
                cwd: Some(self.cwd.path().to_path_buf()),
                exe_dir: Some(self.exe.path().to_path_buf()),
                home: Some(self.home.path().to_path_buf()),
            }
        }
    }

    #[test]
    fn test_absolute_path_unchanged() {
        let roots = Roots::new();
        let path = Path::new("/definitely/not/here.conf");
        assert_eq!(roots.search_roots().locate(path), path);
    }

    #[test]
    fn test_cwd_preferred_over_exe_and_home() {
        let roots = Roots::new();
        for dir in [&roots.cwd, &roots.exe, &roots.home] {
            fs::write(dir.path().join("app.conf"), "{}").unwrap();
        }

        let located = roots.search_roots().locate(Path::new("app.conf"));
        assert_eq!(located, roots.cwd.path().join("app.conf"));
    }

    #[test]
    fn test_exe_dir_preferred_over_home() {
        let roots = Roots::new();
        fs::write(roots.exe.path().join("app.conf"), "{}").unwrap();
        fs::write(roots.home.path().join("app.conf"), "{}").unwrap();

        let located = roots.search_roots().locate(Path::new("app.conf"));
        assert_eq!(located, roots.exe.path().join("app.conf"));
    }

    #[test]
    fn test_home_fallback() {
        let roots = Roots::new();
        fs::create_dir(roots.home.path().join(".app")).unwrap();
        fs::write(roots.home.path().join(".app/app.conf"), "{}").unwrap();

        let located = roots.search_roots().locate(Path::new(".app/app.conf"));
        assert_eq!(located, roots.home.path().join(".app/app.conf"));
    }

    #[test]
    fn test_missing_falls_back_to_cwd() {
        let roots = Roots::new();
        let located = roots.search_roots().locate(Path::new("missing.conf"));
        assert_eq!(located, roots.cwd.path().join("missing.conf"));
        assert!(located.is_absolute());
    }

    #[test]
    fn test_missing_roots_are_skipped() {
        let roots = Roots::new();
        fs::write(roots.home.path().join("app.conf"), "{}").unwrap();
        let search = SearchRoots {
            cwd: None,
            exe_dir: None,
            home: Some(roots.home.path().to_path_buf()),
        };
        assert_eq!(
            search.locate(Path::new("app.conf")),
            roots.home.path().join("app.conf")
        );
    }
}
