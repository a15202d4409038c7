//! Script source handles
//!
//! A [`ScriptSource`] identifies a script and gives access to its text. The
//! configurator only ever looks at the metadata (name, location); reading
//! the body is left to the analyzer.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::diagnostics::SourceLocation;
use crate::error::{Error, Result};

/// Identity and content handle of a script
#[async_trait]
pub trait ScriptSource: Send + Sync + fmt::Debug {
    /// File name of the script, e.g. `build.simple.kts`
    fn name(&self) -> &str;

    /// Stable location reference used in diagnostics, e.g. a path
    fn location(&self) -> Option<&str>;

    /// Read the full script text
    async fn text(&self) -> Result<String>;

    /// Verify that the source metadata is readable without reading the body
    async fn check_metadata(&self) -> Result<()> {
        Ok(())
    }

    /// Build a diagnostic location pointing into this source
    fn location_at(&self, line: u32, column: u32) -> SourceLocation {
        SourceLocation::at(line, column).in_source(self.location().unwrap_or(self.name()))
    }
}

/// In-memory script, mostly used by tooling and tests
#[derive(Debug, Clone)]
pub struct StringScriptSource {
    name: String,
    text: String,
    location: Option<String>,
}

impl StringScriptSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            location: None,
        }
    }

    /// Attach a location reference for diagnostics
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

#[async_trait]
impl ScriptSource for StringScriptSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Script stored on disk
#[derive(Debug, Clone)]
pub struct FileScriptSource {
    path: PathBuf,
    name: String,
    location: String,
}

impl FileScriptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let location = path.to_string_lossy().into_owned();
        Self {
            path,
            name,
            location,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: std::io::Error) -> Error {
        Error::SourceRead {
            location: self.location.clone(),
            source,
        }
    }
}

#[async_trait]
impl ScriptSource for FileScriptSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<&str> {
        Some(&self.location)
    }

    async fn text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.read_error(e))
    }

    async fn check_metadata(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| self.read_error(e))?;
        if !metadata.is_file() {
            return Err(Error::SourceNotAFile {
                location: self.location.clone(),
            });
        }
        Ok(())
    }
}
