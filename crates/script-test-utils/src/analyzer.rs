//! Analyzers standing in for a real script parser.
//!
//! - [`FixedAnalyzer`] returns the same result for every script
//! - [`LineAnalyzer`] scans script text line by line for annotations:
//!
//! ```text
//! @file:DependsOn("org.example:lib:1.0")
//! @file:Directive("flag=progressive")
//! import org.example.*
//! ```

use async_trait::async_trait;
use script_api::keys::processed;
use script_api::{
    DiagnosticsCollector, Located, ProcessedScriptData, ResultWithDiagnostics, ScriptAnalyzer,
    ScriptCompileConfiguration, ScriptSource,
};

/// Returns a preset result regardless of the script.
pub struct FixedAnalyzer {
    result: ResultWithDiagnostics<ProcessedScriptData>,
}

impl FixedAnalyzer {
    pub fn new(result: ResultWithDiagnostics<ProcessedScriptData>) -> Self {
        Self { result }
    }

    /// Analyzer that succeeds with `data` and no diagnostics.
    pub fn with_data(data: ProcessedScriptData) -> Self {
        Self::new(ResultWithDiagnostics::success(data))
    }
}

#[async_trait]
impl ScriptAnalyzer for FixedAnalyzer {
    async fn analyze(
        &self,
        _source: &dyn ScriptSource,
        _configuration: &ScriptCompileConfiguration,
    ) -> ResultWithDiagnostics<ProcessedScriptData> {
        self.result.clone()
    }
}

/// Extracts declared dependencies, directives and imports from script text.
///
/// Unknown `@file:` annotations are reported as warnings. A source that
/// cannot be read fails the analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineAnalyzer;

impl LineAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Parse `text` as if it were the body of `source`.
    pub fn scan(
        source: &dyn ScriptSource,
        text: &str,
    ) -> ResultWithDiagnostics<ProcessedScriptData> {
        let mut collector = DiagnosticsCollector::new();
        let mut dependencies = Vec::new();
        let mut directives = Vec::new();
        let mut imports = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            // Columns count characters, not bytes
            let column = line.chars().take_while(|c| c.is_whitespace()).count() as u32 + 1;
            let location = source.location_at(index as u32 + 1, column);

            if let Some(rest) = trimmed.strip_prefix("@file:") {
                if let Some(value) = annotation_argument(rest, "DependsOn") {
                    dependencies.push(Located::new(value.to_string(), Some(location)));
                } else if let Some(value) = annotation_argument(rest, "Directive") {
                    directives.push(Located::new(value.to_string(), Some(location)));
                } else {
                    collector.warning(
                        format!("Ignoring unknown annotation '@file:{}'", rest.trim_end()),
                        Some(location),
                    );
                }
            } else if let Some(rest) = trimmed.strip_prefix("import ") {
                imports.push(Located::new(rest.trim().to_string(), Some(location)));
            }
        }

        let data = ProcessedScriptData::new()
            .with(&processed::DECLARED_DEPENDENCIES, dependencies)
            .with(&processed::DIRECTIVES, directives)
            .with(&processed::DECLARED_IMPORTS, imports);
        collector.finish(data)
    }
}

/// `Name("value")` → `value`
fn annotation_argument<'a>(annotation: &'a str, name: &str) -> Option<&'a str> {
    annotation
        .trim_end()
        .strip_prefix(name)?
        .strip_prefix("(\"")?
        .strip_suffix("\")")
}

#[async_trait]
impl ScriptAnalyzer for LineAnalyzer {
    async fn analyze(
        &self,
        source: &dyn ScriptSource,
        _configuration: &ScriptCompileConfiguration,
    ) -> ResultWithDiagnostics<ProcessedScriptData> {
        match source.text().await {
            Ok(text) => Self::scan(source, &text),
            Err(e) => ResultWithDiagnostics::failure(vec![
                script_api::Diagnostic::error(format!("Cannot read script '{}'", source.name()))
                    .with_cause(&e),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_api::StringScriptSource;

    #[test]
    fn test_scans_annotations_and_imports() {
        let source = StringScriptSource::new("a.simple.kts", "");
        let text = "@file:DependsOn(\"lib:1.0\")\n  @file:Directive(\"flag=progressive\")\nimport org.example.*\nprintln(1)\n";

        let data = LineAnalyzer::scan(&source, text).into_value().unwrap();

        let deps = data.get(&processed::DECLARED_DEPENDENCIES).unwrap();
        assert_eq!(deps[0].value, "lib:1.0");
        assert_eq!(deps[0].location.as_ref().unwrap().start.line, 1);

        let directives = data.get(&processed::DIRECTIVES).unwrap();
        assert_eq!(directives[0].value, "flag=progressive");
        assert_eq!(directives[0].location.as_ref().unwrap().start.column, 3);

        let imports = data.get(&processed::DECLARED_IMPORTS).unwrap();
        assert_eq!(imports[0].value, "org.example.*");
    }

    #[test]
    fn test_column_counts_characters_of_wide_indent() {
        let source = StringScriptSource::new("a.simple.kts", "");
        let text = "\u{3000}\u{3000}@file:Directive(\"flag=progressive\")\n";

        let data = LineAnalyzer::scan(&source, text).into_value().unwrap();

        let directives = data.get(&processed::DIRECTIVES).unwrap();
        assert_eq!(directives[0].value, "flag=progressive");
        assert_eq!(directives[0].location.as_ref().unwrap().start.column, 3);
    }

    #[test]
    fn test_unknown_annotation_is_a_warning() {
        let source = StringScriptSource::new("a.simple.kts", "");
        let result = LineAnalyzer::scan(&source, "@file:Repository(\"x\")");

        assert!(result.is_success());
        assert_eq!(result.diagnostics().len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_analyzer_returns_preset() {
        let source = StringScriptSource::new("a.simple.kts", "");
        let analyzer = FixedAnalyzer::with_data(ProcessedScriptData::new());

        let result = analyzer
            .analyze(&source, &ScriptCompileConfiguration::new())
            .await;
        assert_eq!(result, ResultWithDiagnostics::success(ProcessedScriptData::new()));
    }
}
