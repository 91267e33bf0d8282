use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::reference::{is_word_char, word_at_column, Position, ReferenceLocation, SymbolResolver};
use crate::config::Config;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub extension: String,
}

pub struct FileScanner {
    extensions: HashSet<String>,
    exclude: HashSet<String>,
    max_file_bytes: u64,
}

impl FileScanner {
    pub fn new(config: &Config) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude: config.exclude.iter().cloned().collect(),
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Source files under `root`, sorted by path so reference order is stable between runs.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<FileInfo>> {
        let entries: Vec<_> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry.file_name()))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let mut files: Vec<FileInfo> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                let extension = path.extension()?.to_str()?.to_lowercase();
                if !self.extensions.contains(&extension) {
                    return None;
                }
                let size = entry.metadata().ok()?.len();
                if size > self.max_file_bytes {
                    debug!(file = %path.display(), size, "skipping oversized file");
                    return None;
                }
                Some(FileInfo {
                    path: path.to_path_buf(),
                    extension,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        name.to_str().is_some_and(|name| self.exclude.contains(name))
    }
}

/// Whole-word textual reference search over a workspace.
///
/// Stands in for a language server: every identifier-bounded occurrence of the symbol in a
/// scanned file is a reference, one per occurrence, with the line text attached.
pub struct TextReferenceFinder {
    root: PathBuf,
    scanner: FileScanner,
    include_declaration: bool,
}

impl TextReferenceFinder {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            scanner: FileScanner::new(config),
            include_declaration: config.include_declaration,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn search_file(
        &self,
        path: &Path,
        symbol: &str,
        declaration: Option<Position>,
    ) -> Vec<ReferenceLocation> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(file = %path.display(), error = %err, "skipping unreadable file");
                return Vec::new();
            }
        };

        let symbol_len = symbol.chars().count();
        let mut references = Vec::new();
        for (line, text) in content.lines().enumerate() {
            for column in occurrences(text, symbol) {
                let is_declaration = declaration.is_some_and(|pos| {
                    pos.line == line && pos.column >= column && pos.column <= column + symbol_len
                });
                if is_declaration {
                    continue;
                }
                references.push(ReferenceLocation::new(path, line).with_text(text));
            }
        }
        references
    }
}

impl SymbolResolver for TextReferenceFinder {
    fn word_at(&self, file: &Path, position: Position) -> Result<Option<String>> {
        let content = fs::read_to_string(file)?;
        Ok(content
            .lines()
            .nth(position.line)
            .and_then(|text| word_at_column(text, position.column)))
    }

    fn find_references(&self, file: &Path, position: Position) -> Result<Vec<ReferenceLocation>> {
        let Some(symbol) = self.word_at(file, position)? else {
            return Ok(Vec::new());
        };

        let files = self.scanner.scan_directory(&self.root)?;
        let source = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());

        let per_file: Vec<Vec<ReferenceLocation>> = files
            .par_iter()
            .map(|info| {
                let is_source = info
                    .path
                    .canonicalize()
                    .map(|path| path == source)
                    .unwrap_or(false);
                let declaration = (is_source && !self.include_declaration).then_some(position);
                self.search_file(&info.path, &symbol, declaration)
            })
            .collect();

        let references: Vec<ReferenceLocation> = per_file.into_iter().flatten().collect();
        info!(
            symbol = %symbol,
            files = files.len(),
            references = references.len(),
            "text reference search complete"
        );
        Ok(references)
    }
}

/// Character columns of every identifier-bounded occurrence of `symbol` in `text`.
fn occurrences(text: &str, symbol: &str) -> Vec<usize> {
    if symbol.is_empty() {
        return Vec::new();
    }
    text.match_indices(symbol)
        .filter(|(start, _)| {
            let before = text[..*start].chars().next_back();
            let after = text[start + symbol.len()..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .map(|(start, _)| text[..start].chars().count())
        .collect()
}
