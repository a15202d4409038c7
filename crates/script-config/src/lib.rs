//! Script compile-configuration resolution
//!
//! This crate turns script type definitions into compile configurations:
//!
//! - [`definition`]: script types and the TOML layers they are loaded from
//! - [`dependency`]: coordinates and resolvers
//! - [`directive`]: `name=value` directives found in scripts
//! - [`configurator`]: base configuration and refinement
//! - [`pipeline`]: per-script state machine over a configurator
//! - [`registry`]: configurator lookup by id or file extension

pub mod configurator;
pub mod definition;
pub mod dependency;
pub mod directive;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod registry;

pub use configurator::{
    CachedConfigurator, DEFAULT_REFINEMENT_CAPACITY, RefinementCache, SimpleScriptConfigurator,
};
pub use definition::{DefinitionLoader, DefinitionsFile, SIMPLE_SCRIPT, ScriptDefinition};
pub use dependency::{
    CachingResolver, CompoundResolver, DEFAULT_RESOLUTION_CAPACITY, DependencyCoordinate,
    DependencyResolver, InMemoryResolver, LocalRepositoryResolver,
};
pub use directive::Directive;
pub use error::{Error, Result};
pub use pipeline::{ConfigurationPipeline, PipelineState};
pub use registry::ConfiguratorRegistry;
