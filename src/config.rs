use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave: bool,
    pub autosave_delay_ms: u64,
    /// Shown in the title while no file is attached.
    pub untitled_name: String,
    /// File name proposed by the save-as dialog.
    pub save_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave: true,
            autosave_delay_ms: 2000,
            untitled_name: "Untitled.md".to_string(),
            save_name: "untitled.md".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub title: String,
    pub stylesheet: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: "Preview".to_string(),
            stylesheet: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults if not found.
    /// A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(Error::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
