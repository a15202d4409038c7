//! Per-script configuration pipeline
//!
//! The pipeline enforces the order in which a driver talks to a
//! configurator for one script:
//!
//! ```text
//! NotConfigured --resolve_base--> BaseResolved --refine--> Refined(success | failure)
//!       |
//!       +--------resolve_base (failed)--> BaseFailed
//! ```
//!
//! `Refined` and `BaseFailed` are terminal. Diagnostics of every step are
//! carried forward, so the final result lists them in the order they were
//! raised.

use script_api::{
    Diagnostic, ProcessedScriptData, ResultWithDiagnostics, ScriptAnalyzer,
    ScriptCompileConfiguration, ScriptConfigurator, ScriptSource,
};

use crate::error::{Error, Result};

/// State of a [`ConfigurationPipeline`]
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    NotConfigured,
    BaseResolved {
        configuration: ScriptCompileConfiguration,
        diagnostics: Vec<Diagnostic>,
    },
    BaseFailed {
        diagnostics: Vec<Diagnostic>,
    },
    Refined(ResultWithDiagnostics<ScriptCompileConfiguration>),
}

impl PipelineState {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not configured",
            Self::BaseResolved { .. } => "base resolved",
            Self::BaseFailed { .. } => "base failed",
            Self::Refined(result) if result.is_success() => "refined",
            Self::Refined(_) => "refinement failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BaseFailed { .. } | Self::Refined(_))
    }
}

/// Drives one script through base resolution and refinement
///
/// Results from the configurator and the analyzer are normalized before
/// they are stored, so a success never carries an error-level diagnostic.
pub struct ConfigurationPipeline<'a> {
    configurator: &'a dyn ScriptConfigurator,
    state: PipelineState,
}

impl<'a> ConfigurationPipeline<'a> {
    pub fn new(configurator: &'a dyn ScriptConfigurator) -> Self {
        Self {
            configurator,
            state: PipelineState::NotConfigured,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The most recent successfully resolved configuration
    pub fn configuration(&self) -> Option<&ScriptCompileConfiguration> {
        match &self.state {
            PipelineState::BaseResolved { configuration, .. } => Some(configuration),
            PipelineState::Refined(result) => result.value(),
            _ => None,
        }
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }

    /// Obtain the base configuration
    ///
    /// Only valid in the `NotConfigured` state.
    pub async fn resolve_base(
        &mut self,
        source: Option<&dyn ScriptSource>,
    ) -> Result<&PipelineState> {
        if self.state != PipelineState::NotConfigured {
            return Err(self.invalid("resolve base configuration"));
        }

        let base = self.configurator.base_configuration(source).await.normalized();
        self.state = match base {
            ResultWithDiagnostics::Success {
                value,
                diagnostics,
                ..
            } => PipelineState::BaseResolved {
                configuration: value,
                diagnostics,
            },
            ResultWithDiagnostics::Failure { diagnostics, .. } => {
                tracing::info!(
                    script_type = self.configurator.script_type(),
                    "Base configuration failed"
                );
                PipelineState::BaseFailed { diagnostics }
            }
        };
        Ok(&self.state)
    }

    /// Refine the base configuration with processed script data
    ///
    /// Only valid in the `BaseResolved` state.
    pub async fn refine(&mut self, processed: &ProcessedScriptData) -> Result<&PipelineState> {
        let PipelineState::BaseResolved {
            configuration,
            diagnostics,
        } = &self.state
        else {
            return Err(self.invalid("refine configuration"));
        };

        let result = self
            .configurator
            .refine_configuration(configuration, processed)
            .await
            .normalized()
            .with_prior_diagnostics(diagnostics.clone());
        self.state = PipelineState::Refined(result);
        Ok(&self.state)
    }

    /// Final result of a pipeline in a terminal state
    pub fn finish(self) -> Result<ResultWithDiagnostics<ScriptCompileConfiguration>> {
        match self.state {
            PipelineState::Refined(result) => Ok(result),
            PipelineState::BaseFailed { diagnostics } => {
                Ok(ResultWithDiagnostics::failure(diagnostics))
            }
            other => Err(Error::InvalidTransition {
                operation: "finish",
                state: other.name(),
            }),
        }
    }

    /// Run the full pipeline for `source`, using `analyzer` between the two
    /// configurator steps
    ///
    /// A failing analysis ends the pipeline without refinement.
    pub async fn run(
        mut self,
        source: &dyn ScriptSource,
        analyzer: &dyn ScriptAnalyzer,
    ) -> Result<ResultWithDiagnostics<ScriptCompileConfiguration>> {
        self.resolve_base(Some(source)).await?;

        let Some(configuration) = self.configuration().cloned() else {
            return self.finish();
        };

        match analyzer.analyze(source, &configuration).await.normalized() {
            ResultWithDiagnostics::Success {
                value,
                diagnostics: analysis,
                ..
            } => {
                if let PipelineState::BaseResolved { diagnostics, .. } = &mut self.state {
                    diagnostics.extend(analysis);
                }
                self.refine(&value).await?;
            }
            ResultWithDiagnostics::Failure {
                diagnostics: analysis,
                ..
            } => {
                tracing::info!(script = source.name(), "Script analysis failed");
                let mut diagnostics = match &self.state {
                    PipelineState::BaseResolved { diagnostics, .. } => diagnostics.clone(),
                    _ => Vec::new(),
                };
                diagnostics.extend(analysis);
                self.state = PipelineState::Refined(ResultWithDiagnostics::failure(diagnostics));
            }
        }

        self.finish()
    }
}
