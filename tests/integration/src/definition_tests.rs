//! Script types defined in project definition files

use pretty_assertions::assert_eq;
use script_api::keys::compile;
use script_api::{ScriptConfigurator, Severity};
use script_config::{
    ConfigurationPipeline, ConfiguratorRegistry, DefinitionLoader, DependencyResolver, Error,
    LocalRepositoryResolver,
};
use script_test_utils::{LineAnalyzer, LocalRepository, ScriptDir};
use std::sync::Arc;
use tempfile::TempDir;

fn loader(project: &ScriptDir, global: &TempDir) -> DefinitionLoader {
    DefinitionLoader::with_global_config_dir(project.root(), global.path().to_path_buf())
}

#[tokio::test]
async fn test_project_script_type_resolves_default_dependencies() {
    let repository = LocalRepository::new();
    let jar = repository.publish("org.example:runtime:2.0");
    let project = ScriptDir::new();
    let global = TempDir::new().unwrap();
    project.write_definitions(
        ".script-config/definitions.toml",
        &format!(
            r#"
[types.build-script]
display_name = "Build script"
file_extension = "build.kts"
default_imports = ["org.example.build.*"]
default_dependencies = ["org.example:runtime:2.0"]
repositories = ["{}"]
compiler_flags = ["progressive"]
"#,
            repository.url()
        ),
    );

    let definitions = loader(&project, &global).load().unwrap();
    let empty_root = TempDir::new().unwrap();
    let resolver: Arc<dyn DependencyResolver> =
        Arc::new(LocalRepositoryResolver::new(empty_root.path()));
    let registry = ConfiguratorRegistry::from_definitions(&definitions, resolver);
    assert_eq!(registry.list(), vec!["build-script", "simple-script"]);

    let source = project.file_source("project.build.kts", "@file:Directive(\"flag=progressive\")\n");
    let configurator = registry.for_source(&source).unwrap();
    assert_eq!(configurator.script_type(), "build-script");

    let configuration = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(
        configuration.get(&compile::DISPLAY_NAME).map(String::as_str),
        Some("Build script")
    );
    let deps = configuration.get(&compile::DEPENDENCIES).unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].path, jar);
}

#[tokio::test]
async fn test_local_layer_overrides_builtin_type() {
    let project = ScriptDir::new();
    let global = TempDir::new().unwrap();
    std::fs::write(
        global.path().join("definitions.toml"),
        "[types.simple-script]\ncompiler_flags = [\"turbo\"]\n",
    )
    .unwrap();
    project.write_definitions(
        ".script-config/definitions.local.toml",
        "[types.simple-script]\ndisplay_name = \"My scripts\"\n",
    );

    let definitions = loader(&project, &global).load().unwrap();
    let simple = definitions.get("simple-script").unwrap();
    assert_eq!(simple.display_name, "My scripts");
    assert!(simple.is_known_flag("turbo"));
    assert!(simple.is_known_flag("progressive"));

    let empty_root = TempDir::new().unwrap();
    let registry = ConfiguratorRegistry::from_definitions(
        &definitions,
        Arc::new(LocalRepositoryResolver::new(empty_root.path())),
    );
    let source = project.file_source("fast.simple.kts", "@file:Directive(\"flag=turbo\")\n");
    let configurator = registry.for_source(&source).unwrap();
    let result = ConfigurationPipeline::new(configurator.as_ref())
        .run(&source, &LineAnalyzer::new())
        .await
        .unwrap();

    assert!(result.is_success(), "diagnostics: {:?}", result.diagnostics());
}

#[tokio::test]
async fn test_malformed_default_dependency_is_fatal() {
    let project = ScriptDir::new();
    let global = TempDir::new().unwrap();
    project.write_definitions(
        ".script-config/definitions.toml",
        "[types.broken]\nfile_extension = \"broken.kts\"\ndefault_dependencies = [\"nonsense\"]\n",
    );

    let definitions = loader(&project, &global).load().unwrap();
    let empty_root = TempDir::new().unwrap();
    let registry = ConfiguratorRegistry::from_definitions(
        &definitions,
        Arc::new(LocalRepositoryResolver::new(empty_root.path())),
    );

    let configurator = registry.get("broken").unwrap();
    let result = configurator.base_configuration(None).await;
    assert!(result.is_failure());
    assert_eq!(result.diagnostics()[0].severity, Severity::Fatal);
}

#[test]
fn test_invalid_definitions_file_is_an_error() {
    let project = ScriptDir::new();
    let global = TempDir::new().unwrap();
    project.write_definitions(".script-config/definitions.toml", "[types.x\n");

    let err = loader(&project, &global).load().unwrap_err();
    assert!(matches!(err, Error::InvalidDefinitions { .. }));
}
