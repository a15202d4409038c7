//! Diagnostic records
//!
//! Diagnostics are plain data. They are collected in raise order and handed
//! to a presentation layer (console, IDE) that lives outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice
    Info,
    /// Potential problem, never fails a step on its own
    Warning,
    /// The step failed
    Error,
    /// The step failed and the pipeline cannot continue
    Fatal,
}

impl Severity {
    /// Whether this severity fails the step that reported it
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// A 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Where in a script a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Stable reference to the originating script (path or name)
    pub source: Option<String>,
    pub start: Position,
    pub end: Option<Position>,
}

impl SourceLocation {
    /// A location at `line:column` in an unnamed source
    pub fn at(line: u32, column: u32) -> Self {
        Self {
            source: None,
            start: Position::new(line, column),
            end: None,
        }
    }

    /// Attach the originating source reference
    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Extend the location to a range ending at `line:column`
    pub fn to(mut self, line: u32, column: u32) -> Self {
        self.end = Some(Position::new(line, column));
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}:", source)?;
        }
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}

/// A single reported issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Rendered error chain of the fault that caused this diagnostic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            cause: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Attach a location, if one is known
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Attach a known location
    pub fn at(self, location: SourceLocation) -> Self {
        self.with_location(Some(location))
    }

    /// Record the error (and its source chain) that caused this diagnostic
    pub fn with_cause(mut self, cause: &(dyn std::error::Error + 'static)) -> Self {
        let mut rendered = cause.to_string();
        let mut next = cause.source();
        while let Some(inner) = next {
            rendered.push_str(": ");
            rendered.push_str(&inner.to_string());
            next = inner.source();
        }
        self.cause = Some(rendered);
        self
    }

    /// Whether this diagnostic fails the step that reported it
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}
