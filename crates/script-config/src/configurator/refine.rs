//! Configuration refinement
//!
//! Refinement folds the facts an analyzer found in a script into a copy of
//! the base configuration. Every problem is collected rather than returned
//! early, so one failed refinement reports all invalid directives and
//! dependencies at once. The input configuration is never touched.

use script_api::keys::{compile, processed};
use script_api::{
    Diagnostic, DiagnosticsCollector, Located, ProcessedScriptData, ResolvedDependency,
    ResultWithDiagnostics, ScriptCompileConfiguration, SourceLocation,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::definition::ScriptDefinition;
use crate::dependency::{DependencyCoordinate, DependencyResolver};
use crate::directive::{Directive, is_valid_import};

/// Effects of all directives of one script, validated against each other
#[derive(Debug, Default)]
struct DirectiveEffects {
    enabled: Vec<Located<String>>,
    disabled: Vec<Located<String>>,
    options: BTreeMap<String, Located<String>>,
    imports: Vec<String>,
    repositories: Vec<String>,
}

fn contains_flag(flags: &[Located<String>], flag: &str) -> bool {
    flags.iter().any(|f| f.value == flag)
}

fn push_unique(target: &mut Vec<String>, value: &str) {
    if !target.iter().any(|v| v == value) {
        target.push(value.to_string());
    }
}

type Requested = (DependencyCoordinate, Option<SourceLocation>);

pub(crate) struct Refinement<'a> {
    definition: &'a ScriptDefinition,
    resolver: &'a dyn DependencyResolver,
    collector: DiagnosticsCollector,
}

impl<'a> Refinement<'a> {
    pub(crate) fn new(definition: &'a ScriptDefinition, resolver: &'a dyn DependencyResolver) -> Self {
        Self {
            definition,
            resolver,
            collector: DiagnosticsCollector::new(),
        }
    }

    pub(crate) async fn run(
        mut self,
        configuration: &ScriptCompileConfiguration,
        data: &ProcessedScriptData,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        tracing::debug!(
            script_type = %self.definition.id,
            configuration_keys = configuration.len(),
            data_keys = data.len(),
            "Refining configuration"
        );

        let mut updated = configuration.clone();
        let effects = self.collect_directives(data);

        self.apply_flags(&mut updated, &effects);
        self.apply_options(&mut updated, &effects);
        self.apply_imports(&mut updated, data, &effects);

        let mut repositories = updated.get_or_default(&compile::REPOSITORIES);
        for repository in &effects.repositories {
            push_unique(&mut repositories, repository);
        }
        updated.set(&compile::REPOSITORIES, repositories.clone());

        self.apply_dependencies(&mut updated, data, &repositories).await;

        let result = self.collector.finish(updated);
        if result.is_success() {
            tracing::debug!(
                script_type = %self.definition.id,
                diagnostics = result.diagnostics().len(),
                "Refinement succeeded"
            );
        } else {
            tracing::info!(
                script_type = %self.definition.id,
                diagnostics = result.diagnostics().len(),
                "Refinement failed"
            );
        }
        result
    }

    fn collect_directives(&mut self, data: &ProcessedScriptData) -> DirectiveEffects {
        let mut effects = DirectiveEffects::default();
        // Conflicting (option, value) pairs already reported
        let mut conflicts: BTreeSet<(String, String)> = BTreeSet::new();
        let Some(directives) = data.get(&processed::DIRECTIVES) else {
            return effects;
        };

        for located in directives {
            let location = located.location.clone();
            let directive = match Directive::parse(&located.value) {
                Ok(directive) => directive,
                Err(e) => {
                    self.collector.error(e.to_string(), location);
                    continue;
                }
            };

            match directive {
                Directive::EnableFlag(flag) | Directive::DisableFlag(flag)
                    if !self.definition.is_known_flag(&flag) =>
                {
                    self.collector.error(
                        format!(
                            "Unknown compiler flag '{}' for {}",
                            flag, self.definition.display_name
                        ),
                        location,
                    );
                }
                Directive::EnableFlag(flag) => {
                    if contains_flag(&effects.disabled, &flag) {
                        self.report_flag_conflict(&flag, location);
                    } else if !contains_flag(&effects.enabled, &flag) {
                        effects.enabled.push(Located::new(flag, location));
                    }
                }
                Directive::DisableFlag(flag) => {
                    if contains_flag(&effects.enabled, &flag) {
                        self.report_flag_conflict(&flag, location);
                    } else if !contains_flag(&effects.disabled, &flag) {
                        effects.disabled.push(Located::new(flag, location));
                    }
                }
                Directive::Option { name, value } => {
                    let previous = effects.options.get(&name).map(|p| p.value.clone());
                    match previous {
                        Some(previous) if previous != value => {
                            if !conflicts.insert((name.clone(), value.clone())) {
                                continue;
                            }
                            self.collector.error(
                                format!(
                                    "Conflicting values for compiler option '{}': '{}' and '{}'",
                                    name, previous, value
                                ),
                                location,
                            );
                        }
                        Some(_) => {}
                        None => {
                            effects.options.insert(name, Located::new(value, location));
                        }
                    }
                }
                Directive::Import(import) => push_unique(&mut effects.imports, &import),
                Directive::Repository(repository) => {
                    push_unique(&mut effects.repositories, &repository)
                }
            }
        }
        effects
    }

    fn report_flag_conflict(&mut self, flag: &str, location: Option<SourceLocation>) {
        self.collector.error(
            format!(
                "Conflicting directives: compiler flag '{}' is both enabled and disabled",
                flag
            ),
            location,
        );
    }

    fn apply_flags(&mut self, updated: &mut ScriptCompileConfiguration, effects: &DirectiveEffects) {
        let mut flags: BTreeSet<String> = updated.get_or_default(&compile::COMPILER_FLAGS);
        for flag in &effects.enabled {
            if flags.contains(&flag.value) {
                continue;
            }
            if let Some(note) = self.definition.deprecation(&flag.value) {
                self.collector.warning(
                    format!("Compiler flag '{}' is deprecated: {}", flag.value, note),
                    flag.location.clone(),
                );
            }
            flags.insert(flag.value.clone());
        }
        for flag in &effects.disabled {
            flags.remove(&flag.value);
        }
        updated.set(&compile::COMPILER_FLAGS, flags);
    }

    fn apply_options(
        &mut self,
        updated: &mut ScriptCompileConfiguration,
        effects: &DirectiveEffects,
    ) {
        let mut options: BTreeMap<String, String> = updated.get_or_default(&compile::COMPILER_OPTIONS);
        for (name, value) in &effects.options {
            if let Some(previous) = options.get(name) {
                if previous != &value.value {
                    self.collector.info(
                        format!(
                            "Compiler option '{}' overridden: '{}' replaced by '{}'",
                            name, previous, value.value
                        ),
                        value.location.clone(),
                    );
                }
            }
            options.insert(name.clone(), value.value.clone());
        }
        updated.set(&compile::COMPILER_OPTIONS, options);
    }

    fn apply_imports(
        &mut self,
        updated: &mut ScriptCompileConfiguration,
        data: &ProcessedScriptData,
        effects: &DirectiveEffects,
    ) {
        let mut imports = updated.get_or_default(&compile::IMPORTS);
        if let Some(declared) = data.get(&processed::DECLARED_IMPORTS) {
            for import in declared {
                if is_valid_import(&import.value) {
                    push_unique(&mut imports, &import.value);
                } else {
                    self.collector.error(
                        format!("Malformed import '{}'", import.value),
                        import.location.clone(),
                    );
                }
            }
        }
        for import in &effects.imports {
            push_unique(&mut imports, import);
        }
        updated.set(&compile::IMPORTS, imports);
    }

    async fn apply_dependencies(
        &mut self,
        updated: &mut ScriptCompileConfiguration,
        data: &ProcessedScriptData,
        repositories: &[String],
    ) {
        let mut requested: Vec<Requested> = Vec::new();

        for raw in updated.get_or_default(&compile::REQUIRED_DEPENDENCIES) {
            match DependencyCoordinate::parse(&raw) {
                Ok(coordinate) => requested.push((coordinate, None)),
                Err(e) => self.collector.error(e.to_string(), None),
            }
        }
        if let Some(declared) = data.get(&processed::DECLARED_DEPENDENCIES) {
            for located in declared {
                match DependencyCoordinate::parse(&located.value) {
                    Ok(coordinate) => requested.push((coordinate, located.location.clone())),
                    Err(e) => self.collector.error(e.to_string(), located.location.clone()),
                }
            }
        }

        let selected = self.select_versions(requested);

        let mut resolved: Vec<ResolvedDependency> = Vec::new();
        for (coordinate, location) in &selected {
            match self.resolver.resolve(coordinate, repositories).await {
                Ok(dependency) => {
                    if !resolved.contains(&dependency) {
                        resolved.push(dependency);
                    }
                }
                Err(e) => {
                    tracing::debug!(%coordinate, error = %e, "Dependency resolution failed");
                    self.collector.push(
                        Diagnostic::error(format!(
                            "Unable to resolve dependency '{}'",
                            coordinate
                        ))
                        .with_location(location.clone())
                        .with_cause(&e),
                    );
                }
            }
        }

        // Entries for modules resolved in this pass are replaced, the rest stay.
        let mut dependencies: Vec<ResolvedDependency> = updated
            .get_or_default(&compile::DEPENDENCIES)
            .into_iter()
            .filter(|existing| {
                let Ok(existing) = DependencyCoordinate::parse(&existing.coordinate) else {
                    return true;
                };
                !selected
                    .iter()
                    .any(|(coordinate, _)| coordinate.module() == existing.module())
            })
            .collect();
        dependencies.extend(resolved);
        updated.set(&compile::DEPENDENCIES, dependencies);
    }

    /// Keep the highest version requested for each module
    fn select_versions(&mut self, requested: Vec<Requested>) -> Vec<Requested> {
        let mut selected: Vec<Requested> = Vec::new();
        for (coordinate, location) in requested {
            let position = selected
                .iter()
                .position(|(chosen, _)| chosen.module() == coordinate.module());
            let Some(position) = position else {
                selected.push((coordinate, location));
                continue;
            };
            let existing = &mut selected[position];

            match coordinate.compare_version(&existing.0) {
                std::cmp::Ordering::Greater => {
                    self.collector.info(
                        format!("Dependency '{}' superseded by '{}'", existing.0, coordinate),
                        existing.1.clone(),
                    );
                    *existing = (coordinate, location);
                }
                std::cmp::Ordering::Less => {
                    self.collector.info(
                        format!("Dependency '{}' superseded by '{}'", coordinate, existing.0),
                        location,
                    );
                }
                std::cmp::Ordering::Equal => {}
            }
        }
        selected
    }
}
