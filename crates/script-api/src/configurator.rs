//! Configurator and analyzer contracts
//!
//! A compilation driver uses these traits in a fixed order for every script:
//!
//! ```text
//! base_configuration(source) -> analyze(source) -> refine_configuration(config, data)
//! ```
//!
//! Both configurator operations are asynchronous because they may touch the
//! filesystem or a dependency repository. Dropping the returned future
//! cancels the operation.

use async_trait::async_trait;

use crate::hmap::HeterogeneousMap;
use crate::result::ResultWithDiagnostics;
use crate::source::ScriptSource;

/// How to compile a script: dependencies, imports, compiler flags
pub type ScriptCompileConfiguration = HeterogeneousMap;

/// Facts an analyzer discovered in a script's source
pub type ProcessedScriptData = HeterogeneousMap;

/// Produces and refines the compile configuration of one script type
#[async_trait]
pub trait ScriptConfigurator: Send + Sync {
    /// Identifier of the script type, e.g. `simple-script`
    fn script_type(&self) -> &str;

    /// Baseline configuration for the script type
    ///
    /// With `None`, returns the configuration of a generic script of this
    /// type. With a source, checks that the source belongs to this type and
    /// returns its defaults without analysing the script body.
    async fn base_configuration(
        &self,
        source: Option<&dyn ScriptSource>,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration>;

    /// Validate and augment `configuration` with facts from the script
    ///
    /// Must depend only on its two arguments, never modify `configuration`,
    /// and reach a fixed point: refining the result again with the same
    /// data yields the same configuration.
    async fn refine_configuration(
        &self,
        configuration: &ScriptCompileConfiguration,
        processed: &ProcessedScriptData,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration>;

    /// Refine with empty processed data
    async fn refine_without_data(
        &self,
        configuration: &ScriptCompileConfiguration,
    ) -> ResultWithDiagnostics<ScriptCompileConfiguration> {
        self.refine_configuration(configuration, &ProcessedScriptData::new())
            .await
    }
}

/// Extracts [`ProcessedScriptData`] from a script's source
///
/// Implemented outside this crate by script-type specific analyzers.
#[async_trait]
pub trait ScriptAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        source: &dyn ScriptSource,
        configuration: &ScriptCompileConfiguration,
    ) -> ResultWithDiagnostics<ProcessedScriptData>;
}
