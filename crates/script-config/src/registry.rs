//! Configurator registry
//!
//! Maps script type ids to configurators and picks the configurator for a
//! script by its file extension.

use script_api::{ScriptConfigurator, ScriptSource};
use std::collections::HashMap;
use std::sync::Arc;

use crate::configurator::{CachedConfigurator, SimpleScriptConfigurator};
use crate::definition::{DefinitionsFile, has_extension};
use crate::dependency::DependencyResolver;

struct Registration {
    extension: Option<String>,
    configurator: Arc<dyn ScriptConfigurator>,
}

/// Central registry of script configurators
#[derive(Default)]
pub struct ConfiguratorRegistry {
    configurators: HashMap<String, Registration>,
}

impl ConfiguratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a cached [`SimpleScriptConfigurator`] for every
    /// definition, all sharing `resolver`
    pub fn from_definitions(
        definitions: &DefinitionsFile,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Self {
        let mut registry = Self::new();
        for definition in definitions.iter() {
            let extension = definition.file_extension.clone();
            let configurator =
                SimpleScriptConfigurator::new(definition.clone(), Arc::clone(&resolver));
            registry.register(
                Some(extension.as_str()).filter(|ext| !ext.is_empty()),
                Arc::new(CachedConfigurator::new(configurator)),
            );
        }
        tracing::debug!(count = registry.len(), "Registered configurators from definitions");
        registry
    }

    /// Register a configurator under its script type id
    ///
    /// A configurator registered without an extension is only reachable by id.
    /// Registering the same id again replaces the previous entry.
    pub fn register(&mut self, extension: Option<&str>, configurator: Arc<dyn ScriptConfigurator>) {
        let id = configurator.script_type().to_string();
        if self.configurators.contains_key(&id) {
            tracing::debug!(script_type = %id, "Replacing registered configurator");
        }
        self.configurators.insert(
            id,
            Registration {
                extension: extension.map(str::to_string),
                configurator,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ScriptConfigurator>> {
        self.configurators
            .get(id)
            .map(|r| Arc::clone(&r.configurator))
    }

    /// Configurator whose extension matches `file_name`
    ///
    /// When several extensions match (`kts` and `simple.kts`), the longest wins.
    pub fn for_file_name(&self, file_name: &str) -> Option<Arc<dyn ScriptConfigurator>> {
        self.configurators
            .values()
            .filter_map(|r| {
                let extension = r.extension.as_deref()?;
                has_extension(file_name, extension).then_some((extension.len(), r))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, r)| Arc::clone(&r.configurator))
    }

    pub fn for_source(&self, source: &dyn ScriptSource) -> Option<Arc<dyn ScriptConfigurator>> {
        self.for_file_name(source.name())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.configurators.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.configurators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurators.is_empty()
    }

    /// Registered script type ids (sorted)
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.configurators.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ScriptDefinition;
    use crate::dependency::InMemoryResolver;
    use script_api::StringScriptSource;

    fn resolver() -> Arc<dyn DependencyResolver> {
        Arc::new(InMemoryResolver::new())
    }

    fn definition(id: &str, extension: &str) -> ScriptDefinition {
        ScriptDefinition {
            id: id.to_string(),
            display_name: id.to_string(),
            file_extension: extension.to_string(),
            ..ScriptDefinition::default()
        }
    }

    #[test]
    fn test_builtin_definitions_are_registered() {
        let registry = ConfiguratorRegistry::from_definitions(&DefinitionsFile::builtin(), resolver());

        assert!(registry.contains("simple-script"));
        assert_eq!(registry.list(), vec!["simple-script"]);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_lookup_by_file_name() {
        let registry = ConfiguratorRegistry::from_definitions(&DefinitionsFile::builtin(), resolver());

        let found = registry.for_file_name("hello.simple.kts").unwrap();
        assert_eq!(found.script_type(), "simple-script");
        assert!(registry.for_file_name("hello.kts").is_none());
        assert!(registry.for_file_name("simple.kts.bak").is_none());
    }

    #[test]
    fn test_longest_extension_wins() {
        let mut registry = ConfiguratorRegistry::new();
        for def in [definition("kotlin", "kts"), definition("build", "build.kts")] {
            let ext = def.file_extension.clone();
            registry.register(
                Some(&ext),
                Arc::new(SimpleScriptConfigurator::new(def, resolver())),
            );
        }

        let source = StringScriptSource::new("project.build.kts", "");
        assert_eq!(registry.for_source(&source).unwrap().script_type(), "build");
        assert_eq!(
            registry.for_file_name("other.kts").unwrap().script_type(),
            "kotlin"
        );
    }

    #[test]
    fn test_registration_without_extension_is_id_only() {
        let mut registry = ConfiguratorRegistry::new();
        registry.register(
            None,
            Arc::new(SimpleScriptConfigurator::simple_script(resolver())),
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.get("simple-script").is_some());
        assert!(registry.for_file_name("a.simple.kts").is_none());
    }
}
