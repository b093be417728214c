use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::metrics::WordLength;
use crate::session::{Layout, SessionConfig, DEFAULT_LOOK_AHEAD};

/// Persisted user preferences; command line flags take precedence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub wrap: bool,
    pub look_ahead: u16,
    pub word_length: WordLength,
    pub texts_dir: Option<PathBuf>,
    pub save_scores: bool,
    /// Ring the terminal bell on a mistyped key
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wrap: false,
            look_ahead: DEFAULT_LOOK_AHEAD,
            word_length: WordLength::Fixed,
            texts_dir: None,
            save_scores: true,
            bell: false,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            layout: if self.wrap {
                Layout::Wrapped
            } else {
                Layout::Scrolled
            },
            look_ahead: self.look_ahead,
            word_length: self.word_length,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typist_config.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
            tracing::warn!(
                target: "config",
                path = %self.path.display(),
                "config_unreadable_using_defaults"
            );
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        let config_error = |source| Error::Config {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(config_error)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data).map_err(config_error)
    }
}
