//! Configurator implementations
//!
//! - [`SimpleScriptConfigurator`]: definition-driven configurator
//! - [`CachedConfigurator`]: reuses refinement results for equal inputs

mod cache;
mod refine;
mod simple;

pub use cache::{CachedConfigurator, DEFAULT_REFINEMENT_CAPACITY, RefinementCache};
pub use simple::SimpleScriptConfigurator;
