//! Configurator driven by a [`ScriptDefinition`]

use async_trait::async_trait;
use script_api::keys::compile;
use script_api::{
    Diagnostic, ProcessedScriptData, ResultWithDiagnostics, ScriptCompileConfiguration,
    ScriptConfigurator, ScriptSource,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::refine::Refinement;
use crate::definition::ScriptDefinition;
use crate::dependency::{DependencyCoordinate, DependencyResolver};

/// Configurator for script types described entirely by a definition
///
/// The base configuration is built from the definition alone. Refinement
/// applies directives, imports and dependencies found in the script and
/// resolves dependencies through the shared resolver.
pub struct SimpleScriptConfigurator {
    definition: ScriptDefinition,
    resolver: Arc<dyn DependencyResolver>,
}

impl SimpleScriptConfigurator {
    pub fn new(definition: ScriptDefinition, resolver: Arc<dyn DependencyResolver>) -> Self {
        Self {
            definition,
            resolver,
        }
    }

    /// Configurator for the built-in `simple-script` type
    pub fn simple_script(resolver: Arc<dyn DependencyResolver>) -> Self {
        Self::new(ScriptDefinition::simple_script(), resolver)
    }

    pub fn definition(&self) -> &ScriptDefinition {
        &self.definition
    }

    /// Defaults of the script type, after validating the definition
    fn baseline(&self) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        let definition = &self.definition;
        let mut problems = Vec::new();

        if definition.file_extension.is_empty() {
            problems.push(Diagnostic::fatal(format!(
                "Malformed definition of script type '{}': missing file extension",
                definition.id
            )));
        }
        for raw in &definition.default_dependencies {
            if let Err(e) = DependencyCoordinate::parse(raw) {
                problems.push(
                    Diagnostic::fatal(format!(
                        "Malformed definition of script type '{}': bad default dependency",
                        definition.id
                    ))
                    .with_cause(&e),
                );
            }
        }
        if !problems.is_empty() {
            return ResultWithDiagnostics::failure(problems);
        }

        let configuration = ScriptCompileConfiguration::new()
            .with(&compile::DISPLAY_NAME, definition.display_name.clone())
            .with(&compile::FILE_EXTENSION, definition.file_extension.clone())
            .with(&compile::DEFAULT_IMPORTS, definition.default_imports.clone())
            .with(
                &compile::REQUIRED_DEPENDENCIES,
                definition.default_dependencies.clone(),
            )
            .with(&compile::REPOSITORIES, definition.repositories.clone())
            .with(&compile::COMPILER_FLAGS, BTreeSet::new())
            .with(&compile::COMPILER_OPTIONS, BTreeMap::new());

        ResultWithDiagnostics::success(configuration)
    }
}

#[async_trait]
impl ScriptConfigurator for SimpleScriptConfigurator {
    fn script_type(&self) -> &str {
        &self.definition.id
    }

    async fn base_configuration(
        &self,
        source: Option<&dyn ScriptSource>,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        if let Some(source) = source {
            tracing::debug!(script_type = %self.definition.id, script = source.name(), "Resolving base configuration");

            if !self.definition.matches(source.name()) {
                return ResultWithDiagnostics::failure(vec![Diagnostic::fatal(format!(
                    "Unrecognized script type: '{}' is not a {} script (*.{})",
                    source.name(),
                    self.definition.display_name,
                    self.definition.file_extension
                ))]);
            }
            if let Err(e) = source.check_metadata().await {
                return ResultWithDiagnostics::failure(vec![
                    Diagnostic::fatal(format!(
                        "Cannot read metadata of script '{}'",
                        source.name()
                    ))
                    .with_cause(&e),
                ]);
            }
        } else {
            tracing::debug!(script_type = %self.definition.id, "Resolving generic base configuration");
        }

        self.baseline()
    }

    async fn refine_configuration(
        &self,
        configuration: &ScriptCompileConfiguration,
        processed: &ProcessedScriptData,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        Refinement::new(&self.definition, self.resolver.as_ref())
            .run(configuration, processed)
            .await
    }
}
