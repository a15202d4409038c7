//! [`ScriptDir`] for tests that read scripts from disk.

use script_api::FileScriptSource;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding script files.
///
/// # Example
///
/// ```rust,no_run
/// use script_test_utils::ScriptDir;
///
/// let dir = ScriptDir::new();
/// let source = dir.file_source("hello.simple.kts", "println(1)");
/// ```
pub struct ScriptDir {
    temp_dir: TempDir,
}

impl Default for ScriptDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name` (relative to root), creating parent dirs.
    pub fn write_script(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write script {}: {e}", path.display()));
        path
    }

    /// Write a script and return a source handle for it.
    pub fn file_source(&self, name: &str, content: &str) -> FileScriptSource {
        FileScriptSource::new(self.write_script(name, content))
    }

    /// Write a definitions layer at `relative` (e.g. `.script-config/definitions.toml`).
    pub fn write_definitions(&self, relative: &str, toml: &str) -> PathBuf {
        self.write_script(relative, toml)
    }
}
