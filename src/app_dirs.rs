use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typist";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn scores_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_local_dir().join("scores.csv"))
    }

    /// `$HOME/.local/state/typist` when HOME is set, the platform data dir otherwise
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            Self::project().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}
