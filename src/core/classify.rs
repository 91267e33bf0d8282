//! Heuristic reference classification.
//!
//! Two total functions: [`classify_file`] decides a coarse type from a file name alone and
//! [`classify_line`] refines it from the text of the line a reference sits on. Neither parses
//! anything; a wrong answer is acceptable, a missing one is not.

use regex::Regex;
use std::sync::LazyLock;

use super::graph::NodeType;

const COMPONENT_EXTENSIONS: [&str; 4] = ["vue", "svelte", "jsx", "tsx"];

/// Line rules in precedence order; the first matching pattern decides the type.
static LINE_RULES: LazyLock<Vec<(Regex, NodeType)>> = LazyLock::new(|| {
    vec![
        (whole_words(&["import", "require", "from"]), NodeType::Import),
        (whole_words(&["class"]), NodeType::Class),
        (whole_words(&["interface", "type"]), NodeType::Type),
        (whole_words(&["const", "let", "var"]), NodeType::Variable),
        (
            Regex::new(r"\bfunction\b|=>").expect("function pattern is a valid regex"),
            NodeType::Function,
        ),
        (
            whole_words(&["it", "describe", "test", "expect"]),
            NodeType::Test,
        ),
    ]
});

fn whole_words(words: &[&str]) -> Regex {
    let pattern = format!(r"\b(?:{})\b", words.join("|"));
    Regex::new(&pattern).expect("keyword alternation is a valid regex")
}

/// Classify a file by name.
///
/// Test naming wins over everything else, so `button.component.test.tsx` is a test.
pub fn classify_file(file_name: &str) -> NodeType {
    let lower = file_name.to_lowercase();
    let extension = lower.rsplit_once('.').map(|(_, ext)| ext);

    if is_test_file(&lower) {
        NodeType::Test
    } else if lower.contains("component")
        || extension.is_some_and(|ext| COMPONENT_EXTENSIONS.contains(&ext))
    {
        NodeType::Component
    } else if lower.ends_with(".d.ts") || lower.contains(".type.") || lower.contains(".types.") {
        NodeType::Type
    } else {
        NodeType::Function
    }
}

/// `.test.` or `.spec.` directly before the final extension.
fn is_test_file(lower: &str) -> bool {
    lower
        .rsplit_once('.')
        .map(|(stem, _)| stem.ends_with(".test") || stem.ends_with(".spec"))
        .unwrap_or(false)
}

/// Classify a single reference from its line of source, falling back to the file's type when no
/// keyword on the line says anything.
pub fn classify_line(line_text: &str, file_name: &str) -> NodeType {
    LINE_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(line_text))
        .map(|(_, node_type)| *node_type)
        .unwrap_or_else(|| classify_file(file_name))
}
