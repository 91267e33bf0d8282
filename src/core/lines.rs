use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::reference::LineSource;
use crate::error::{Error, Result};

/// Disk-backed line reader with a per-file cache.
///
/// Files are read whole on first access and split into lines; later reads of the same file are
/// served from memory. Call [`FileLineReader::clear`] after the files may have changed.
pub struct FileLineReader {
    cache: DashMap<PathBuf, Arc<Vec<String>>>,
    max_file_bytes: Option<u64>,
}

impl FileLineReader {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            max_file_bytes: None,
        }
    }

    /// Refuse to load files larger than `limit` bytes.
    pub fn with_max_file_bytes(mut self, limit: u64) -> Self {
        self.max_file_bytes = Some(limit);
        self
    }

    fn load(&self, file: &Path) -> Result<Arc<Vec<String>>> {
        if let Some(entry) = self.cache.get(file) {
            return Ok(Arc::clone(entry.value()));
        }

        let metadata = fs::metadata(file)?;
        if let Some(limit) = self.max_file_bytes {
            if metadata.len() > limit {
                return Err(Error::FileTooLarge {
                    file: file.to_path_buf(),
                    size: metadata.len(),
                    limit,
                });
            }
        }

        // read_to_string rejects invalid UTF-8 with InvalidData
        let content = fs::read_to_string(file)?;
        let lines: Arc<Vec<String>> = Arc::new(content.lines().map(str::to_owned).collect());
        debug!(file = %file.display(), lines = lines.len(), "cached file lines");
        self.cache.insert(file.to_path_buf(), Arc::clone(&lines));
        Ok(lines)
    }

    pub fn invalidate(&self, file: &Path) {
        self.cache.remove(file);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cached_files(&self) -> usize {
        self.cache.len()
    }
}

impl Default for FileLineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for FileLineReader {
    fn read_line(&self, file: &Path, line: usize) -> Result<String> {
        let lines = self.load(file)?;
        lines.get(line).cloned().ok_or_else(|| Error::LineOutOfRange {
            file: file.to_path_buf(),
            line,
        })
    }
}
