//! Workspace configuration loaded from `.ripple.toml`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".ripple.toml";

const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File extensions searched for textual references (without the dot)
    pub extensions: Vec<String>,
    /// Directory names skipped while walking the workspace
    pub exclude: Vec<String>,
    /// Whether the occurrence under the cursor counts as a reference
    pub include_declaration: bool,
    /// Quiet period before a burst of edits triggers re-analysis
    pub debounce_ms: u64,
    /// Files larger than this are neither searched nor read for line text
    pub max_file_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        let extensions = [
            "ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte", "py", "rs", "go", "java",
            "cs",
        ];
        let exclude = ["node_modules", ".git", "target", "dist", "build", "out"];
        Self {
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            exclude: exclude.iter().map(|dir| dir.to_string()).collect(),
            include_declaration: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    /// Load `.ripple.toml` from `root`.
    ///
    /// A missing file yields the defaults. A file that exists but does not parse is an error;
    /// a written config is never silently replaced by defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(Error::Config("`extensions` must not be empty".to_string()));
        }
        if let Some(ext) = self.extensions.iter().find(|ext| ext.starts_with('.')) {
            return Err(Error::Config(format!(
                "extension `{ext}` must be written without the leading dot"
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
