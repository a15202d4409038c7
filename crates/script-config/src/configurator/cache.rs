//! Refinement result caching
//!
//! Refinement is a pure function of the configuration and the processed
//! script data, so completed results can be reused for equal inputs.

use async_trait::async_trait;
use script_api::{
    ProcessedScriptData, ResultWithDiagnostics, ScriptCompileConfiguration, ScriptConfigurator,
    ScriptSource,
};
use moka::future::Cache;

type RefinementKey = (ScriptCompileConfiguration, ProcessedScriptData);

/// Number of refinements a [`RefinementCache`] keeps by default
pub const DEFAULT_REFINEMENT_CAPACITY: u64 = 1024;

/// Successful refinements keyed by their inputs
///
/// Only completed, successful results are stored. A refinement that fails
/// or is cancelled before it finishes leaves the cache untouched. The cache
/// holds at most `max_entries` results and evicts the rest.
pub struct RefinementCache {
    entries: Cache<RefinementKey, ResultWithDiagnostics<ScriptCompileConfiguration>>,
}

impl Default for RefinementCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinementCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REFINEMENT_CAPACITY)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Cached result for the given inputs
    pub async fn get(
        &self,
        configuration: &ScriptCompileConfiguration,
        processed: &ProcessedScriptData,
    ) -> Option<ResultWithDiagnostics<ScriptCompileConfiguration>> {
        let key = (configuration.clone(), processed.clone());
        self.entries.get(&key).await
    }

    /// Store a result; failures are ignored
    pub async fn insert(
        &self,
        configuration: &ScriptCompileConfiguration,
        processed: &ProcessedScriptData,
        result: &ResultWithDiagnostics<ScriptCompileConfiguration>,
    ) {
        if result.is_failure() {
            return;
        }
        self.entries
            .insert((configuration.clone(), processed.clone()), result.clone())
            .await;
    }

    /// Number of stored results, after pending evictions are applied
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.entry_count().await == 0
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}

/// Wraps a configurator with a [`RefinementCache`]
pub struct CachedConfigurator<C> {
    inner: C,
    cache: RefinementCache,
}

impl<C: ScriptConfigurator> CachedConfigurator<C> {
    pub fn new(inner: C) -> Self {
        Self::with_capacity(inner, DEFAULT_REFINEMENT_CAPACITY)
    }

    pub fn with_capacity(inner: C, max_entries: u64) -> Self {
        Self {
            inner,
            cache: RefinementCache::with_capacity(max_entries),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn cache(&self) -> &RefinementCache {
        &self.cache
    }
}

#[async_trait]
impl<C: ScriptConfigurator> ScriptConfigurator for CachedConfigurator<C> {
    fn script_type(&self) -> &str {
        self.inner.script_type()
    }

    async fn base_configuration(
        &self,
        source: Option<&dyn ScriptSource>,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        self.inner.base_configuration(source).await
    }

    async fn refine_configuration(
        &self,
        configuration: &ScriptCompileConfiguration,
        processed: &ProcessedScriptData,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        if let Some(result) = self.cache.get(configuration, processed).await {
            tracing::debug!(script_type = self.script_type(), "Refinement cache hit");
            return result;
        }

        let result = self
            .inner
            .refine_configuration(configuration, processed)
            .await;
        self.cache.insert(configuration, processed, &result).await;
        result
    }
}
