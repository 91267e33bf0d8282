//! # RIPPLE
//!
//! Symbol impact analysis for editors and code review tooling.
//!
//! Given the location of a symbol, RIPPLE gathers every known reference to it, groups the
//! references by file, classifies each one with a lightweight textual heuristic and produces a
//! small two-level graph (symbol -> file -> reference) describing the blast radius of a change.
//!
//! ## Output Formats
//!
//! - **JSON**: The `ImpactAnalysis` wire shape consumed by visualizations
//! - **Tree**: Readable indented summary for terminals
//! - **DOT**: Graphviz digraph for static rendering
//!
//! Classification never parses source. It inspects the single line containing each reference
//! and is allowed to be wrong.

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;

pub use error::{Error, Result};
