use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Id of the synthetic root node. Generated file and reference ids never take this value.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Symbol,
    Function,
    Class,
    Variable,
    Test,
    Component,
    Import,
    Type,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Symbol => "symbol",
            NodeType::Function => "function",
            NodeType::Class => "class",
            NodeType::Variable => "variable",
            NodeType::Test => "test",
            NodeType::Component => "component",
            NodeType::Import => "import",
            NodeType::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Defines,
    Uses,
    Tests,
    Imports,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Defines => "defines",
            LinkKind::Uses => "uses",
            LinkKind::Tests => "tests",
            LinkKind::Imports => "imports",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub id: String,
    pub name: String,
    pub file_name: String,
    /// Lossy UTF-8 rendering of the file identifier
    pub file_path: String,
    /// 1-based; 0 for the root
    pub line: usize,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub reference_count: usize,
    pub is_root: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyLink {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

pub type ImpactGraph = Graph<DependencyNode, DependencyLink, Directed>;

/// Display name for a file identifier: the last path component, or the whole identifier when it
/// has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl DependencyNode {
    pub fn new(
        id: String,
        name: String,
        node_type: NodeType,
        file_path: impl AsRef<Path>,
        line: usize,
    ) -> Self {
        let file_path = file_path.as_ref();
        Self {
            id,
            name,
            file_name: file_name_of(file_path),
            file_path: file_path.to_string_lossy().into_owned(),
            line,
            node_type,
            reference_count: 1,
            is_root: false,
        }
    }

    /// The synthetic node standing for the analyzed symbol itself.
    pub fn root(symbol: &str, source_file: &Path, total_references: usize) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            name: symbol.to_string(),
            file_name: file_name_of(source_file),
            file_path: source_file.to_string_lossy().into_owned(),
            line: 0,
            node_type: NodeType::Symbol,
            reference_count: total_references,
            is_root: true,
        }
    }

    pub fn with_reference_count(mut self, count: usize) -> Self {
        self.reference_count = count;
        self
    }
}

impl DependencyLink {
    pub fn new(kind: LinkKind, source: String, target: String) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

pub struct GraphBuilder {
    graph: ImpactGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    /// Returns `None` when either endpoint has not been added yet.
    pub fn add_edge(&mut self, link: DependencyLink) -> Option<petgraph::graph::EdgeIndex> {
        let source_idx = self.node_map.get(&link.source)?;
        let target_idx = self.node_map.get(&link.target)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, link))
    }

    pub fn build(self) -> ImpactGraph {
        self.graph
    }

    pub fn get_node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one impact analysis request.
///
/// Plain data only: it is serialized as JSON and handed to whatever renders it. A new analysis
/// replaces the previous one; nothing here is mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub symbol_name: String,
    pub source_file: String,
    pub affected_files: usize,
    pub total_references: usize,
    pub nodes: Vec<DependencyNode>,
    pub links: Vec<DependencyLink>,
}

impl ImpactAnalysis {
    /// Flatten a built graph. Nodes and links keep their insertion order.
    pub fn from_graph(
        symbol_name: String,
        source_file: String,
        affected_files: usize,
        total_references: usize,
        graph: ImpactGraph,
    ) -> Self {
        let (nodes, edges) = graph.into_nodes_edges();
        Self {
            symbol_name,
            source_file,
            affected_files,
            total_references,
            nodes: nodes.into_iter().map(|node| node.weight).collect(),
            links: edges.into_iter().map(|edge| edge.weight).collect(),
        }
    }

    pub fn root(&self) -> Option<&DependencyNode> {
        self.nodes.iter().find(|node| node.is_root)
    }

    pub fn node(&self, id: &str) -> Option<&DependencyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Targets of the links leaving `id`, in link order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a DependencyNode> + 'a {
        let by_id: HashMap<&str, &DependencyNode> =
            self.nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        self.links
            .iter()
            .filter(move |link| link.source == id)
            .filter_map(move |link| by_id.get(link.target.as_str()).copied())
    }

    /// The single link entering `id`, if any.
    pub fn link_to(&self, id: &str) -> Option<&DependencyLink> {
        self.links.iter().find(|link| link.target == id)
    }

    pub fn file_nodes(&self) -> impl Iterator<Item = &DependencyNode> + '_ {
        self.children_of(ROOT_ID)
    }

    /// Index the links once for repeated child and parent-link lookups.
    pub fn adjacency(&self) -> Adjacency<'_> {
        let by_id: HashMap<&str, &DependencyNode> =
            self.nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        let mut children: HashMap<&str, Vec<&DependencyNode>> = HashMap::new();
        let mut incoming = HashMap::with_capacity(self.links.len());
        for link in &self.links {
            incoming.entry(link.target.as_str()).or_insert(link);
            if let Some(&target) = by_id.get(link.target.as_str()) {
                children.entry(link.source.as_str()).or_default().push(target);
            }
        }
        Adjacency { children, incoming }
    }

    /// References counted per classified type.
    ///
    /// A file with expanded reference nodes contributes its children's types; a collapsed file
    /// contributes its own type once. The counts sum to `total_references`.
    pub fn type_breakdown(&self) -> BTreeMap<NodeType, usize> {
        let adjacency = self.adjacency();
        let mut breakdown = BTreeMap::new();
        for file in adjacency.children(ROOT_ID) {
            let references = adjacency.children(&file.id);
            if references.is_empty() {
                *breakdown.entry(file.node_type).or_insert(0) += file.reference_count;
            }
            for reference in references {
                *breakdown.entry(reference.node_type).or_insert(0) += 1;
            }
        }
        breakdown
    }

    /// Rebuild a petgraph view for structural queries and graph renderers.
    pub fn to_graph(&self) -> ImpactGraph {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_node(node.clone());
        }
        for link in &self.links {
            builder.add_edge(link.clone());
        }
        builder.build()
    }
}

/// Link lookups over one [`ImpactAnalysis`], built by [`ImpactAnalysis::adjacency`].
pub struct Adjacency<'a> {
    children: HashMap<&'a str, Vec<&'a DependencyNode>>,
    incoming: HashMap<&'a str, &'a DependencyLink>,
}

impl<'a> Adjacency<'a> {
    /// Targets of the links leaving `id`, in link order.
    pub fn children(&self, id: &str) -> &[&'a DependencyNode] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link_to(&self, id: &str) -> Option<&'a DependencyLink> {
        self.incoming.get(id).copied()
    }
}
