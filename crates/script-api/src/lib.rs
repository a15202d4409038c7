//! Script compile-configuration contracts
//!
//! This crate is the bottom layer of the workspace. It defines:
//!
//! - **Typed container**: [`HeterogeneousMap`] addressed by [`Key<T>`]
//! - **Diagnostics**: [`Diagnostic`] records and the [`ResultWithDiagnostics`] sum type
//! - **Sources**: the [`ScriptSource`] handle and two implementations
//! - **Contracts**: [`ScriptConfigurator`] and [`ScriptAnalyzer`]
//! - **Well-known keys**: [`keys::compile`] and [`keys::processed`]
//!
//! Concrete configurators, dependency resolution and the configuration
//! pipeline live in `script-config`.

pub mod configurator;
pub mod diagnostics;
pub mod error;
pub mod hmap;
pub mod keys;
pub mod result;
pub mod source;

pub use configurator::{
    ProcessedScriptData, ScriptAnalyzer, ScriptCompileConfiguration, ScriptConfigurator,
};
pub use diagnostics::{Diagnostic, Position, Severity, SourceLocation};
pub use error::{Error, Result};
pub use hmap::{ComparableValue, ConfigValue, HeterogeneousMap, Key, KeyId, KeyInfo};
pub use keys::{Located, ResolvedDependency};
pub use result::{DiagnosticsCollector, ResultWithDiagnostics};
pub use source::{FileScriptSource, ScriptSource, StringScriptSource};
