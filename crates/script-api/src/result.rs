//! Result type carrying diagnostics
//!
//! [`ResultWithDiagnostics`] replaces exceptions for script-level problems:
//! a step either succeeds with a value and advisory diagnostics, or fails
//! with diagnostics only. The helpers on this type keep two invariants:
//!
//! - `Success` never carries a diagnostic of severity [`Severity::Error`] or
//!   above
//! - `Failure` always carries at least one such diagnostic
//!
//! [`Severity::Error`]: crate::Severity::Error

use std::future::Future;

use crate::diagnostics::{Diagnostic, SourceLocation};
use crate::error::{Error, Result};

const SYNTHETIC_FAILURE_MESSAGE: &str = "Step failed without reporting an error";

/// Outcome of a configuration step
///
/// Other crates build values through the constructors only, so the
/// variant invariants cannot be bypassed:
///
/// ```compile_fail
/// use script_api::{Diagnostic, ResultWithDiagnostics};
///
/// let _ = ResultWithDiagnostics::Success {
///     value: 1,
///     diagnostics: vec![Diagnostic::error("boom")],
/// };
/// ```
#[must_use = "a failed step carries diagnostics that must be inspected"]
#[derive(Debug, Clone, PartialEq)]
pub enum ResultWithDiagnostics<T> {
    #[non_exhaustive]
    Success {
        value: T,
        diagnostics: Vec<Diagnostic>,
    },
    #[non_exhaustive]
    Failure {
        diagnostics: Vec<Diagnostic>,
    },
}

impl<T> ResultWithDiagnostics<T> {
    /// A success without diagnostics
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// A success with advisory diagnostics
    ///
    /// If any diagnostic is error-level the value is dropped and a failure
    /// is returned instead.
    pub fn success_with(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.iter().any(Diagnostic::is_error) {
            tracing::debug!("Error-level diagnostic turned success into failure");
            return Self::Failure { diagnostics };
        }
        Self::Success { value, diagnostics }
    }

    /// A failure
    ///
    /// When `diagnostics` holds no error-level entry, a synthetic error is
    /// appended so the result still reads as failed. Use
    /// [`ResultWithDiagnostics::try_failure`] to reject that case instead.
    pub fn failure(mut diagnostics: Vec<Diagnostic>) -> Self {
        if !diagnostics.iter().any(Diagnostic::is_error) {
            tracing::warn!(
                count = diagnostics.len(),
                "Failure constructed without an error diagnostic"
            );
            diagnostics.push(Diagnostic::error(SYNTHETIC_FAILURE_MESSAGE));
        }
        Self::Failure { diagnostics }
    }

    /// A failure, rejecting diagnostics that contain no error
    pub fn try_failure(diagnostics: Vec<Diagnostic>) -> Result<Self> {
        if diagnostics.iter().any(Diagnostic::is_error) {
            Ok(Self::Failure { diagnostics })
        } else {
            Err(Error::FailureWithoutError)
        }
    }

    /// A failure from a single error message
    pub fn error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::Failure {
            diagnostics: vec![Diagnostic::error(message).with_location(location)],
        }
    }

    /// Re-establish the variant invariants
    ///
    /// A `Success` holding an error-level diagnostic becomes a `Failure`,
    /// a `Failure` without one gets the synthetic error of
    /// [`ResultWithDiagnostics::failure`]. Hosts apply this to results
    /// returned by configurators and analyzers they do not control.
    pub fn normalized(self) -> Self {
        match self {
            Self::Success { value, diagnostics } => Self::success_with(value, diagnostics),
            Self::Failure { diagnostics } => Self::failure(diagnostics),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Diagnostics in raise order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Success { diagnostics, .. } | Self::Failure { diagnostics } => diagnostics,
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Self::Success { diagnostics, .. } | Self::Failure { diagnostics } => diagnostics,
        }
    }

    /// The success value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Convert into a standard `Result`, keeping diagnostics on both sides
    pub fn into_result(self) -> std::result::Result<(T, Vec<Diagnostic>), Vec<Diagnostic>> {
        match self {
            Self::Success { value, diagnostics } => Ok((value, diagnostics)),
            Self::Failure { diagnostics } => Err(diagnostics),
        }
    }

    /// Transform the success value
    pub fn map<U, F>(self, f: F) -> ResultWithDiagnostics<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { value, diagnostics } => ResultWithDiagnostics::Success {
                value: f(value),
                diagnostics,
            },
            Self::Failure { diagnostics } => ResultWithDiagnostics::Failure { diagnostics },
        }
    }

    /// Sequence a second fallible step
    ///
    /// A failure short-circuits without calling `f`. Otherwise the
    /// diagnostics of both steps are concatenated, this step's first, and
    /// the outcome of `f` decides success or failure.
    pub fn and_then<U, F>(self, f: F) -> ResultWithDiagnostics<U>
    where
        F: FnOnce(T) -> ResultWithDiagnostics<U>,
    {
        match self {
            Self::Success { value, diagnostics } => f(value).with_prior_diagnostics(diagnostics),
            Self::Failure { diagnostics } => ResultWithDiagnostics::Failure { diagnostics },
        }
    }

    /// Asynchronous form of [`ResultWithDiagnostics::and_then`]
    pub async fn and_then_async<U, F, Fut>(self, f: F) -> ResultWithDiagnostics<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = ResultWithDiagnostics<U>>,
    {
        match self {
            Self::Success { value, diagnostics } => {
                f(value).await.with_prior_diagnostics(diagnostics)
            }
            Self::Failure { diagnostics } => ResultWithDiagnostics::Failure { diagnostics },
        }
    }

    /// Prepend diagnostics raised by an earlier step
    pub fn with_prior_diagnostics(self, mut prior: Vec<Diagnostic>) -> Self {
        match self {
            Self::Success { value, diagnostics } => {
                prior.extend(diagnostics);
                Self::success_with(value, prior)
            }
            Self::Failure { diagnostics } => {
                prior.extend(diagnostics);
                Self::Failure { diagnostics: prior }
            }
        }
    }

    /// Append one diagnostic; an error-level one turns success into failure
    pub fn with_diagnostic(self, diagnostic: Diagnostic) -> Self {
        match self {
            Self::Success {
                value,
                mut diagnostics,
            } => {
                diagnostics.push(diagnostic);
                Self::success_with(value, diagnostics)
            }
            Self::Failure { mut diagnostics } => {
                diagnostics.push(diagnostic);
                Self::Failure { diagnostics }
            }
        }
    }
}

/// Accumulates diagnostics while a step runs
///
/// Steps that validate many independent settings push every problem they
/// find and decide success or failure once, in [`DiagnosticsCollector::finish`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn info(&mut self, message: impl Into<String>, location: Option<SourceLocation>) {
        self.push(Diagnostic::info(message).with_location(location));
    }

    pub fn warning(&mut self, message: impl Into<String>, location: Option<SourceLocation>) {
        self.push(Diagnostic::warning(message).with_location(location));
    }

    pub fn error(&mut self, message: impl Into<String>, location: Option<SourceLocation>) {
        self.push(Diagnostic::error(message).with_location(location));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish the step: success with `value` unless an error was collected
    pub fn finish<T>(self, value: T) -> ResultWithDiagnostics<T> {
        if self.has_errors() {
            ResultWithDiagnostics::Failure {
                diagnostics: self.diagnostics,
            }
        } else {
            ResultWithDiagnostics::Success {
                value,
                diagnostics: self.diagnostics,
            }
        }
    }

    /// Finish the step as failed
    pub fn fail<T>(self) -> ResultWithDiagnostics<T> {
        ResultWithDiagnostics::failure(self.diagnostics)
    }
}
