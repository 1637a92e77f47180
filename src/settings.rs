use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::models::{SortBy, SortOrder, ViewMode};
use crate::thumbnails::LoaderConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    // View
    pub view_mode: ViewMode,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,

    // Thumbnails
    pub enable_thumbnails: bool,
    pub thumbnail_size: u32,
    pub thumbnail_cache_capacity: usize,
    pub max_concurrent_thumbnails: usize,
    /// Distance in pixels outside the viewport at which thumbnails start loading.
    pub thumbnail_margin: f32,

    // Behavior
    pub search_max_results: usize,
    pub type_ahead_window_ms: u64,
    pub confirm_deletions: bool,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::List,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Asc,

            enable_thumbnails: true,
            thumbnail_size: 96,
            thumbnail_cache_capacity: 200,
            max_concurrent_thumbnails: 4,
            thumbnail_margin: 100.0,

            search_max_results: 100,
            type_ahead_window_ms: 500,
            confirm_deletions: true,
        }
    }
}

impl ExplorerSettings {
    /// Settings from the default location, or defaults if they cannot be read.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(err) => {
                warn!("using default settings: {}", err);
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!("using default settings, {} is unusable: {}", path.display(), err);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("fileexp").join("settings.json"))
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            size: self.thumbnail_size,
            capacity: self.thumbnail_cache_capacity,
            max_concurrent: self.max_concurrent_thumbnails,
        }
    }

    pub fn type_ahead_window(&self) -> Duration {
        Duration::from_millis(self.type_ahead_window_ms)
    }
}
