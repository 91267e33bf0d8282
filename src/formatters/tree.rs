//! Indented text rendering for terminals.
//!
//! ```text
//! # IMPACT: foo
//! SOURCE: a.ts
//! FILES:2 REFERENCES:3
//!
//! ## FILES
//! F0 a.ts:5 [function] refs:1 <defines>
//! F1 b.test.ts:2 [test] refs:2 <tests>
//!   L2 [test]
//!   L9 [test]
//! ```

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::{ImpactAnalysis, LinkKind, ROOT_ID};

pub struct TreeFormatter {
    /// Append a per-type reference count section
    include_breakdown: bool,
}

impl TreeFormatter {
    pub fn new() -> Self {
        Self {
            include_breakdown: true,
        }
    }

    pub fn with_breakdown(mut self, include: bool) -> Self {
        self.include_breakdown = include;
        self
    }

    pub fn format_to_file(&self, analysis: &ImpactAnalysis, output_path: &Path) -> Result<()> {
        let formatted_content = self.format_analysis(analysis)?;
        fs::write(output_path, formatted_content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &ImpactAnalysis) -> Result<String> {
        let mut output = String::with_capacity(1024);

        writeln!(output, "# IMPACT: {}", analysis.symbol_name)?;
        writeln!(output, "SOURCE: {}", analysis.source_file)?;
        writeln!(
            output,
            "FILES:{} REFERENCES:{}\n",
            analysis.affected_files, analysis.total_references
        )?;

        output.push_str("## FILES\n");
        let adjacency = analysis.adjacency();
        for (index, file) in adjacency.children(ROOT_ID).iter().enumerate() {
            let kind = adjacency
                .link_to(&file.id)
                .map(|link| link.kind)
                .unwrap_or(LinkKind::Uses);
            writeln!(
                output,
                "F{index} {}:{} [{}] refs:{} <{}>",
                file.file_name,
                file.line,
                file.node_type.as_str(),
                file.reference_count,
                kind.as_str()
            )?;
            for reference in adjacency.children(&file.id) {
                writeln!(
                    output,
                    "  {} [{}]",
                    reference.name,
                    reference.node_type.as_str()
                )?;
            }
        }

        if self.include_breakdown {
            output.push_str("\n## TYPES\n");
            for (node_type, count) in analysis.type_breakdown() {
                writeln!(output, "{}:{}", node_type.as_str(), count)?;
            }
        }

        Ok(output)
    }
}

impl Default for TreeFormatter {
    fn default() -> Self {
        Self::new()
    }
}
