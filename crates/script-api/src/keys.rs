//! Well-known configuration keys
//!
//! Keys shared by configurators, analyzers and the compiler driver. Script
//! type providers are free to declare further keys of their own next to
//! these; the container does not need to know about them up front.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::diagnostics::SourceLocation;

/// A value together with where it was found in the script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Located<T> {
    pub value: T,
    pub location: Option<SourceLocation>,
}

impl<T> Located<T> {
    pub fn new(value: T, location: Option<SourceLocation>) -> Self {
        Self { value, location }
    }

    /// A value with no known location
    pub fn unlocated(value: T) -> Self {
        Self::new(value, None)
    }
}

/// A dependency coordinate resolved to a concrete artifact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// Coordinate as requested, e.g. `org.example:lib:1.0`
    pub coordinate: String,
    /// Location of the resolved artifact
    pub path: PathBuf,
}

/// Keys of a [`crate::ScriptCompileConfiguration`]
pub mod compile {
    use super::ResolvedDependency;
    use crate::hmap::Key;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::LazyLock;

    /// Human readable name of the script type
    pub static DISPLAY_NAME: LazyLock<Key<String>> = LazyLock::new(|| Key::new("displayName"));

    /// File extension that identifies the script type, without leading dot
    pub static FILE_EXTENSION: LazyLock<Key<String>> =
        LazyLock::new(|| Key::new("fileExtension"));

    /// Imports every script of this type gets implicitly
    pub static DEFAULT_IMPORTS: LazyLock<Key<Vec<String>>> =
        LazyLock::new(|| Key::new("defaultImports"));

    /// Imports added by refinement
    pub static IMPORTS: LazyLock<Key<Vec<String>>> = LazyLock::new(|| Key::new("imports"));

    /// Unresolved coordinates every script of this type depends on
    pub static REQUIRED_DEPENDENCIES: LazyLock<Key<Vec<String>>> =
        LazyLock::new(|| Key::new("requiredDependencies"));

    /// Concrete dependencies, filled in by refinement
    pub static DEPENDENCIES: LazyLock<Key<Vec<ResolvedDependency>>> =
        LazyLock::new(|| Key::new("dependencies"));

    /// Repositories consulted when resolving dependencies
    pub static REPOSITORIES: LazyLock<Key<Vec<String>>> =
        LazyLock::new(|| Key::new("repositories"));

    /// Enabled compiler flags
    pub static COMPILER_FLAGS: LazyLock<Key<BTreeSet<String>>> =
        LazyLock::new(|| Key::new("compilerFlags"));

    /// Compiler options with values
    pub static COMPILER_OPTIONS: LazyLock<Key<BTreeMap<String, String>>> =
        LazyLock::new(|| Key::new("compilerOptions"));
}

/// Keys of a [`crate::ProcessedScriptData`]
pub mod processed {
    use super::Located;
    use crate::hmap::Key;
    use std::sync::LazyLock;

    /// Dependency coordinates declared in the script
    pub static DECLARED_DEPENDENCIES: LazyLock<Key<Vec<Located<String>>>> =
        LazyLock::new(|| Key::new("declaredDependencies"));

    /// Raw `name=value` directives found in the script
    pub static DIRECTIVES: LazyLock<Key<Vec<Located<String>>>> =
        LazyLock::new(|| Key::new("directives"));

    /// Imports found in the script
    pub static DECLARED_IMPORTS: LazyLock<Key<Vec<Located<String>>>> =
        LazyLock::new(|| Key::new("declaredImports"));
}
