//! Layered loading of script definitions
//!
//! The `DefinitionLoader` starts from the built-in definitions and merges
//! definition files on top, later layers overriding earlier ones.

use std::fs;
use std::path::{Path, PathBuf};

use super::script_type::DefinitionsFile;
use crate::Result;

const DEFINITIONS_FILE: &str = "definitions.toml";
const LOCAL_DEFINITIONS_FILE: &str = "definitions.local.toml";
const PROJECT_DIR: &str = ".script-config";

/// Loads script definitions from a hierarchy of sources:
///
/// 1. Built-in definitions
/// 2. Global definitions (`<config_dir>/script-config/definitions.toml`)
/// 3. Project definitions (`.script-config/definitions.toml`)
/// 4. Local overrides (`.script-config/definitions.local.toml`)
pub struct DefinitionLoader {
    /// Project root directory
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl DefinitionLoader {
    /// Create a loader for the given project root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
        }
    }

    /// Create a loader with a custom global config directory
    pub fn with_global_config_dir(root: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("script-config"))
    }

    /// Load and merge all layers
    ///
    /// Missing layers are skipped. Invalid TOML in any layer is an error.
    pub fn load(&self) -> Result<DefinitionsFile> {
        let mut definitions = DefinitionsFile::builtin();

        if let Some(global_dir) = self.global_config_dir() {
            merge_layer(&mut definitions, &global_dir.join(DEFINITIONS_FILE), "global")?;
        }

        let project_dir = self.root.join(PROJECT_DIR);
        merge_layer(&mut definitions, &project_dir.join(DEFINITIONS_FILE), "project")?;
        merge_layer(
            &mut definitions,
            &project_dir.join(LOCAL_DEFINITIONS_FILE),
            "local",
        )?;

        Ok(definitions)
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if the project has its own definitions
    pub fn has_project_definitions(&self) -> bool {
        self.root.join(PROJECT_DIR).join(DEFINITIONS_FILE).is_file()
    }
}

fn merge_layer(definitions: &mut DefinitionsFile, path: &Path, layer: &str) -> Result<()> {
    if !path.is_file() {
        tracing::debug!(?path, layer, "No definitions found, skipping layer");
        return Ok(());
    }
    tracing::debug!(?path, layer, "Loading definitions layer");
    let content = fs::read_to_string(path)?;
    let overlay = DefinitionsFile::parse(&content, path)?;
    definitions.merge(&overlay);
    Ok(())
}
