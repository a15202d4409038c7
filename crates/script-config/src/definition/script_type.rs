//! Script type definitions parsed from TOML
//!
//! A definitions file lists script types under `[types.<id>]`:
//!
//! ```toml
//! [types.simple-script]
//! display_name = "Simple script"
//! file_extension = "simple.kts"
//! default_imports = ["kotlin.*"]
//! compiler_flags = ["progressive"]
//!
//! [types.simple-script.deprecated_flags]
//! deprecatedOption = "use 'progressive' instead"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Identifier of the built-in script type
pub const SIMPLE_SCRIPT: &str = "simple-script";

/// Everything a configurator needs to know about one script type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptDefinition {
    /// Script type identifier, taken from the `[types.<id>]` table name
    #[serde(skip)]
    pub id: String,

    pub display_name: String,

    /// Extension without leading dot, e.g. `simple.kts`
    pub file_extension: String,

    pub default_imports: Vec<String>,

    /// Coordinates every script of this type depends on
    pub default_dependencies: Vec<String>,

    pub repositories: Vec<String>,

    /// Flags scripts may enable or disable
    pub compiler_flags: Vec<String>,

    /// Flags that still work but should be replaced, with a note each
    pub deprecated_flags: BTreeMap<String, String>,
}

impl ScriptDefinition {
    /// The built-in `simple-script` type
    pub fn simple_script() -> Self {
        let mut deprecated_flags = BTreeMap::new();
        deprecated_flags.insert(
            "deprecatedOption".to_string(),
            "it will be removed in a future release".to_string(),
        );
        Self {
            id: SIMPLE_SCRIPT.to_string(),
            display_name: "Simple script".to_string(),
            file_extension: "simple.kts".to_string(),
            default_imports: vec!["kotlin.*".to_string()],
            default_dependencies: Vec::new(),
            repositories: Vec::new(),
            compiler_flags: vec!["progressive".to_string(), "explicit-api".to_string()],
            deprecated_flags,
        }
    }

    /// Whether a script file name belongs to this type
    pub fn matches(&self, file_name: &str) -> bool {
        has_extension(file_name, &self.file_extension)
    }

    /// Whether scripts may use `flag`
    pub fn is_known_flag(&self, flag: &str) -> bool {
        self.compiler_flags.iter().any(|f| f == flag) || self.deprecated_flags.contains_key(flag)
    }

    /// Deprecation note for `flag`, if it is deprecated
    pub fn deprecation(&self, flag: &str) -> Option<&str> {
        self.deprecated_flags.get(flag).map(String::as_str)
    }

    /// Merge another definition of the same type into this one
    ///
    /// Non-empty scalars from `other` win, lists are extended with values
    /// not already present, map entries from `other` override.
    pub fn merge(&mut self, other: &ScriptDefinition) {
        if !other.display_name.is_empty() {
            self.display_name = other.display_name.clone();
        }
        if !other.file_extension.is_empty() {
            self.file_extension = other.file_extension.clone();
        }
        extend_unique(&mut self.default_imports, &other.default_imports);
        extend_unique(&mut self.default_dependencies, &other.default_dependencies);
        extend_unique(&mut self.repositories, &other.repositories);
        extend_unique(&mut self.compiler_flags, &other.compiler_flags);
        for (flag, note) in &other.deprecated_flags {
            self.deprecated_flags.insert(flag.clone(), note.clone());
        }
    }
}

/// Whether `file_name` ends in `.<extension>` and has a non-empty stem
pub fn has_extension(file_name: &str, extension: &str) -> bool {
    if extension.is_empty() {
        return false;
    }
    let suffix = format!(".{}", extension);
    file_name.len() > suffix.len() && file_name.ends_with(&suffix)
}

fn extend_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

/// A set of script type definitions keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionsFile {
    #[serde(default)]
    pub types: BTreeMap<String, ScriptDefinition>,
}

impl DefinitionsFile {
    /// Parse definitions from TOML content
    ///
    /// `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut file: DefinitionsFile =
            toml::from_str(content).map_err(|source| Error::InvalidDefinitions {
                path: path.to_path_buf(),
                source,
            })?;
        for (id, definition) in file.types.iter_mut() {
            definition.id = id.clone();
        }
        Ok(file)
    }

    /// Definitions shipped with the crate
    pub fn builtin() -> Self {
        let mut types = BTreeMap::new();
        types.insert(SIMPLE_SCRIPT.to_string(), ScriptDefinition::simple_script());
        Self { types }
    }

    /// Merge another layer on top of this one
    pub fn merge(&mut self, other: &DefinitionsFile) {
        for (id, definition) in &other.types {
            match self.types.get_mut(id) {
                Some(existing) => existing.merge(definition),
                None => {
                    let mut definition = definition.clone();
                    definition.id = id.clone();
                    self.types.insert(id.clone(), definition);
                }
            }
        }
    }

    /// Look up a definition by script type id
    pub fn get(&self, id: &str) -> Option<&ScriptDefinition> {
        self.types.get(id)
    }

    /// Look up a definition, failing for unknown ids
    pub fn require(&self, id: &str) -> Result<&ScriptDefinition> {
        self.get(id).ok_or_else(|| Error::UnknownScriptType { id: id.to_string() })
    }

    /// Iterate over all definitions in id order
    pub fn iter(&self) -> impl Iterator<Item = &ScriptDefinition> {
        self.types.values()
    }
}
