pub mod dot;
pub mod json;
pub mod tree;

pub use dot::DotFormatter;
pub use json::JsonFormatter;
pub use tree::TreeFormatter;
