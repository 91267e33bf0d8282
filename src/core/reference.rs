//! Inputs to an analysis and the collaborator seams that supply them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One place the analyzed symbol is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLocation {
    pub file: PathBuf,
    /// Zero-based line number
    pub line: usize,
    /// Text of the line, when the resolver already has it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ReferenceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Zero-based cursor position. `column` counts characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Where the analyzed symbol lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// Zero-based line number
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Best-effort access to the text of a single line.
pub trait LineSource {
    fn read_line(&self, file: &Path, line: usize) -> Result<String>;
}

impl<F> LineSource for F
where
    F: Fn(&Path, usize) -> Result<String>,
{
    fn read_line(&self, file: &Path, line: usize) -> Result<String> {
        self(file, line)
    }
}

/// Resolves the symbol under a cursor and everything that references it.
pub trait SymbolResolver {
    /// The identifier at `position`, or `None` when the cursor is not on one.
    fn word_at(&self, file: &Path, position: Position) -> Result<Option<String>>;

    fn find_references(&self, file: &Path, position: Position) -> Result<Vec<ReferenceLocation>>;
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Extract the identifier touching `column` in `text`.
///
/// A cursor sitting just past the last character of a word still selects it. Bare numerals are
/// not symbols.
pub fn word_at_column(text: &str, column: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let anchor = if chars.get(column).is_some_and(|c| is_word_char(*c)) {
        column
    } else if column > 0 && chars.get(column - 1).is_some_and(|c| is_word_char(*c)) {
        column - 1
    } else {
        return None;
    };

    let start = chars[..anchor]
        .iter()
        .rposition(|c| !is_word_char(*c))
        .map_or(0, |pos| pos + 1);
    let end = chars[anchor..]
        .iter()
        .position(|c| !is_word_char(*c))
        .map_or(chars.len(), |pos| anchor + pos);

    let word: String = chars[start..end].iter().collect();
    if word.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(word)
    }
}
