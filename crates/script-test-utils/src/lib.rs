//! Shared test utilities for the script configuration workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`scripts`]: [`ScriptDir`] for script files on disk
//! - [`repository`]: [`LocalRepository`] laid out like a local artifact repository
//! - [`analyzer`]: analyzers that produce processed script data

pub mod analyzer;
pub mod repository;
pub mod scripts;

pub use analyzer::{FixedAnalyzer, LineAnalyzer};
pub use repository::LocalRepository;
pub use scripts::ScriptDir;
