use anyhow::{Context, Result};
use petgraph::visit::EdgeRef;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::{ImpactAnalysis, NodeType};

/// Graphviz rendering of the impact tree, one `n<index>` vertex per node.
pub struct DotFormatter {
    /// Graphviz `rankdir`, e.g. "LR" or "TB"
    rank_dir: String,
}

impl DotFormatter {
    pub fn new() -> Self {
        Self {
            rank_dir: "LR".to_string(),
        }
    }

    pub fn with_rank_dir(mut self, rank_dir: &str) -> Self {
        self.rank_dir = rank_dir.to_string();
        self
    }

    pub fn format_to_file(&self, analysis: &ImpactAnalysis, output_path: &Path) -> Result<()> {
        let formatted_content = self.format_analysis(analysis)?;
        fs::write(output_path, formatted_content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &ImpactAnalysis) -> Result<String> {
        let graph = analysis.to_graph();
        let mut output = String::with_capacity(512);

        writeln!(output, "digraph impact {{")?;
        writeln!(output, "  rankdir={};", self.rank_dir)?;
        for index in graph.node_indices() {
            let node = &graph[index];
            writeln!(
                output,
                "  n{} [label=\"{}\" shape={}];",
                index.index(),
                escape(&node.name),
                shape(node.node_type)
            )?;
        }
        for edge in graph.edge_references() {
            writeln!(
                output,
                "  n{} -> n{} [label=\"{}\"];",
                edge.source().index(),
                edge.target().index(),
                edge.weight().kind.as_str()
            )?;
        }
        output.push_str("}\n");

        Ok(output)
    }
}

impl Default for DotFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn shape(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Symbol => "doublecircle",
        NodeType::Test => "hexagon",
        NodeType::Component => "component",
        NodeType::Class | NodeType::Type => "box3d",
        NodeType::Import => "cds",
        NodeType::Function | NodeType::Variable => "box",
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
