//! End-to-end configuration of scripts on disk

use pretty_assertions::assert_eq;
use script_api::keys::compile;
use script_api::{FileScriptSource, Severity};
use script_config::{
    CachingResolver, CompoundResolver, ConfigurationPipeline, ConfiguratorRegistry,
    DefinitionsFile, DependencyResolver, LocalRepositoryResolver,
};
use script_test_utils::{LineAnalyzer, LocalRepository, ScriptDir};
use std::collections::BTreeSet;
use std::sync::Arc;

fn registry_for(repository: &LocalRepository) -> ConfiguratorRegistry {
    let resolver: Arc<dyn DependencyResolver> = Arc::new(CachingResolver::new(Arc::new(
        CompoundResolver::new().with(Arc::new(LocalRepositoryResolver::new(repository.root()))),
    )));
    ConfiguratorRegistry::from_definitions(&DefinitionsFile::builtin(), resolver)
}

#[tokio::test]
async fn test_script_with_dependencies_and_directives() {
    let repository = LocalRepository::new();
    let jar = repository.publish("org.example:lib:1.2");
    let scripts = ScriptDir::new();
    let source = scripts.file_source(
        "hello.simple.kts",
        "@file:DependsOn(\"org.example:lib:1.2\")\n\
         @file:Directive(\"flag=progressive\")\n\
         @file:Directive(\"option=jvmTarget:17\")\n\
         import org.example.*\n\
         \n\
         println(greet())\n",
    );
    let registry = registry_for(&repository);

    let configurator = registry.for_source(&source).unwrap();
    let result = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap();

    assert!(result.is_success(), "diagnostics: {:?}", result.diagnostics());
    assert!(result.diagnostics().is_empty());

    let configuration = result.into_value().unwrap();
    let deps = configuration.get(&compile::DEPENDENCIES).unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].path, jar);
    assert_eq!(
        configuration.get(&compile::COMPILER_FLAGS),
        Some(&BTreeSet::from(["progressive".to_string()]))
    );
    assert_eq!(
        configuration.get(&compile::IMPORTS),
        Some(&vec!["org.example.*".to_string()])
    );
    assert_eq!(
        configuration.get(&compile::DEFAULT_IMPORTS),
        Some(&vec!["kotlin.*".to_string()])
    );
}

#[tokio::test]
async fn test_unresolved_dependency_points_at_script_line() {
    let repository = LocalRepository::new();
    let scripts = ScriptDir::new();
    let source = scripts.file_source(
        "broken.simple.kts",
        "// needs a library\n@file:DependsOn(\"org.example:missing:1.0\")\n",
    );
    let registry = registry_for(&repository);

    let configurator = registry.for_source(&source).unwrap();
    let result = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap();

    assert!(result.is_failure());
    let diagnostics = result.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert!(diagnostics[0].message.contains("org.example:missing:1.0"));

    let location = diagnostics[0].location.as_ref().unwrap();
    assert_eq!(location.start.line, 2);
    assert_eq!(
        location.source.as_deref(),
        Some(source.path().to_string_lossy().as_ref())
    );
}

#[tokio::test]
async fn test_repository_directive_extends_search() {
    let default_repository = LocalRepository::new();
    let extra_repository = LocalRepository::new();
    let jar = extra_repository.publish("extra:1.0");
    let scripts = ScriptDir::new();
    let source = scripts.file_source(
        "extra.simple.kts",
        &format!(
            "@file:Directive(\"repository={}\")\n@file:DependsOn(\"extra:1.0\")\n",
            extra_repository.url()
        ),
    );
    let registry = registry_for(&default_repository);

    let configurator = registry.for_source(&source).unwrap();
    let configuration = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(configuration.get(&compile::DEPENDENCIES).unwrap()[0].path, jar);
    assert_eq!(
        configuration.get(&compile::REPOSITORIES),
        Some(&vec![extra_repository.url()])
    );
}

#[tokio::test]
async fn test_missing_script_fails_base_configuration() {
    let repository = LocalRepository::new();
    let scripts = ScriptDir::new();
    let source = FileScriptSource::new(scripts.root().join("gone.simple.kts"));
    let registry = registry_for(&repository);

    let configurator = registry.for_source(&source).unwrap();
    let result = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap();

    assert!(result.is_failure());
    assert_eq!(result.diagnostics().len(), 1);
    assert_eq!(result.diagnostics()[0].severity, Severity::Fatal);
    assert!(result.diagnostics()[0].message.contains("Cannot read metadata"));
}

#[tokio::test]
async fn test_deprecated_flag_in_script_warns_once() {
    let repository = LocalRepository::new();
    let scripts = ScriptDir::new();
    let source = scripts.file_source(
        "old.simple.kts",
        "@file:Directive(\"flag=deprecatedOption\")\n@file:Directive(\"flag=deprecatedOption\")\n",
    );
    let registry = registry_for(&repository);

    let configurator = registry.for_source(&source).unwrap();
    let result = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.diagnostics().len(), 1);
    assert_eq!(result.diagnostics()[0].severity, Severity::Warning);
    assert_eq!(result.diagnostics()[0].location.as_ref().unwrap().start.line, 1);
}

#[test]
fn test_unknown_extension_has_no_configurator() {
    let repository = LocalRepository::new();
    let registry = registry_for(&repository);

    assert!(registry.for_file_name("notes.txt").is_none());
    assert!(registry.for_file_name("build.gradle.kts").is_none());
}
