use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};

use super::classify::{classify_file, classify_line};
use super::graph::{
    file_name_of, DependencyLink, DependencyNode, GraphBuilder, ImpactAnalysis, LinkKind,
    NodeType, ROOT_ID,
};
use super::reference::{LineSource, Position, ReferenceLocation, SourceLocation, SymbolResolver};
use crate::error::{Error, Result};

/// Build the impact graph for `symbol` from its raw references.
///
/// Files appear in the order they are first seen in `references`, which fixes their ids
/// (`file-0`, `file-1`, ...). A file with a single reference is represented by its file node
/// alone; files with more get one `ref-<file>-<n>` child per reference.
///
/// Line text comes from the reference itself when attached, otherwise from `lines`. A failed
/// read classifies that one reference as a function and the build carries on.
///
/// # Errors
///
/// `Error::NoReferences` when `references` is empty. Callers are expected to report that case
/// themselves instead of rendering an empty graph.
pub fn build_impact_analysis(
    symbol: &str,
    source: &SourceLocation,
    references: &[ReferenceLocation],
    lines: &dyn LineSource,
) -> Result<ImpactAnalysis> {
    if references.is_empty() {
        return Err(Error::NoReferences {
            symbol: symbol.to_string(),
        });
    }

    let groups = group_by_file(references);
    let total_references = references.len();

    let mut graph_builder = GraphBuilder::new();
    graph_builder.add_node(DependencyNode::root(symbol, &source.file, total_references));

    for (i, (file, file_refs)) in groups.iter().enumerate() {
        let file_name = file_name_of(file);
        let file_type = classify_file(&file_name);
        let file_id = format!("file-{i}");

        graph_builder.add_node(
            DependencyNode::new(
                file_id.clone(),
                file_name.clone(),
                file_type,
                file,
                display_line(file_refs[0].line),
            )
            .with_reference_count(file_refs.len()),
        );

        let kind = if file_type == NodeType::Test {
            LinkKind::Tests
        } else if file.as_os_str() == source.file.as_os_str() {
            LinkKind::Defines
        } else {
            LinkKind::Uses
        };
        graph_builder.add_edge(DependencyLink::new(kind, ROOT_ID.to_string(), file_id.clone()));

        if file_refs.len() < 2 {
            continue;
        }

        for (j, reference) in file_refs.iter().enumerate() {
            let ref_id = format!("ref-{i}-{j}");
            let line = display_line(reference.line);
            graph_builder.add_node(DependencyNode::new(
                ref_id.clone(),
                format!("L{line}"),
                reference_type(reference, &file_name, lines),
                file,
                line,
            ));
            graph_builder.add_edge(DependencyLink::new(LinkKind::Uses, file_id.clone(), ref_id));
        }
    }

    let graph = graph_builder.build();
    debug!(
        symbol,
        nodes = graph.node_count(),
        links = graph.edge_count(),
        "built impact graph"
    );

    Ok(ImpactAnalysis::from_graph(
        symbol.to_string(),
        file_name_of(&source.file),
        groups.len(),
        total_references,
        graph,
    ))
}

/// References grouped per file, files in first-encounter order, references in input order.
fn group_by_file(references: &[ReferenceLocation]) -> Vec<(&Path, Vec<&ReferenceLocation>)> {
    let mut groups: Vec<(&Path, Vec<&ReferenceLocation>)> = Vec::new();
    // keyed on the raw identifier so only byte-identical paths share a file node
    let mut index: HashMap<&OsStr, usize> = HashMap::new();

    for reference in references {
        let file = reference.file.as_path();
        match index.get(file.as_os_str()) {
            Some(&slot) => groups[slot].1.push(reference),
            None => {
                index.insert(file.as_os_str(), groups.len());
                groups.push((file, vec![reference]));
            }
        }
    }

    groups
}

/// 1-based display line; saturates on out-of-range input.
fn display_line(line: usize) -> usize {
    line.saturating_add(1)
}

fn reference_type(
    reference: &ReferenceLocation,
    file_name: &str,
    lines: &dyn LineSource,
) -> NodeType {
    if let Some(text) = &reference.text {
        return classify_line(text, file_name);
    }

    match lines.read_line(&reference.file, reference.line) {
        Ok(text) => classify_line(&text, file_name),
        Err(err) => {
            warn!(
                file = %reference.file.display(),
                line = display_line(reference.line),
                error = %err,
                "line text unavailable; classifying reference as function"
            );
            NodeType::Function
        }
    }
}

/// Runs a whole request: symbol lookup, reference lookup, graph build.
pub struct ImpactAnalyzer<R, L> {
    resolver: R,
    lines: L,
}

impl<R, L> ImpactAnalyzer<R, L>
where
    R: SymbolResolver,
    L: LineSource,
{
    pub fn new(resolver: R, lines: L) -> Self {
        Self { resolver, lines }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Analyze the symbol under `position` in `file`.
    ///
    /// # Errors
    ///
    /// `Error::NoSymbol` when the cursor is not on an identifier, `Error::NoReferences` when
    /// the symbol is unused, and whatever the resolver reports when the lookup itself fails.
    pub fn analyze(&self, file: &Path, position: Position) -> Result<ImpactAnalysis> {
        let symbol = self
            .resolver
            .word_at(file, position)?
            .ok_or_else(|| Error::NoSymbol {
                file: file.to_path_buf(),
                line: position.line,
                column: position.column,
            })?;

        let references = self.resolver.find_references(file, position)?;
        info!(
            symbol = %symbol,
            references = references.len(),
            "resolved references"
        );

        let source = SourceLocation::new(file, position.line);
        build_impact_analysis(&symbol, &source, &references, &self.lines)
    }
}
