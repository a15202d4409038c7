//! Script type definitions
//!
//! A [`ScriptDefinition`] describes how scripts of one type are compiled by
//! default. Definitions ship built in and can be extended or overridden by
//! TOML files, see [`DefinitionLoader`] for the layer order.

mod loader;
mod script_type;

pub use loader::DefinitionLoader;
pub use script_type::{DefinitionsFile, SIMPLE_SCRIPT, ScriptDefinition, has_extension};
