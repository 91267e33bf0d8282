use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::ImpactAnalysis;

/// Serializes an analysis in the shape visualizations consume.
///
/// Field names are camelCase (`symbolName`, `affectedFiles`, `referenceCount`, ...) and the node
/// `type` / link `kind` values are lowercase words.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, analysis: &ImpactAnalysis, output_path: &Path) -> Result<()> {
        let json_content = self.format_analysis(analysis)?;
        fs::write(output_path, json_content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &ImpactAnalysis) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(analysis)?
        } else {
            serde_json::to_string(analysis)?
        };
        Ok(json)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
