pub mod analyzer;
pub mod classify;
pub mod debounce;
pub mod graph;
pub mod lines;
pub mod reference;
pub mod scanner;
pub mod session;

pub use analyzer::{build_impact_analysis, ImpactAnalyzer};
pub use classify::{classify_file, classify_line};
pub use debounce::{DebounceTrigger, Debouncer};
pub use graph::{
    Adjacency, DependencyLink, DependencyNode, GraphBuilder, ImpactAnalysis, ImpactGraph,
    LinkKind, NodeType, ROOT_ID,
};
pub use lines::FileLineReader;
pub use reference::{
    word_at_column, LineSource, Position, ReferenceLocation, SourceLocation, SymbolResolver,
};
pub use scanner::{FileScanner, TextReferenceFinder};
pub use session::{AnalysisSession, RequestTicket};
