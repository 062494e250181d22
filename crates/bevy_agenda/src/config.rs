use std::{fs, path::Path, time::Duration};

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`DashboardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dashboard config: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Timing and storage knobs for the dashboard widgets.
///
/// Every field is optional in RON; missing fields keep their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Popup fade-out window before its content is removed.
    pub popup_close_delay_ms: u64,
    /// Scroll inactivity before a time column snaps.
    pub scroll_debounce_ms: u64,
    /// Duration of the snap animation itself.
    pub scroll_snap_ms: u64,
    /// Height of one time-picker row in layout units.
    pub time_item_height: f32,
    /// Local-storage key of the persisted theme.
    pub theme_storage_key: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            popup_close_delay_ms: 300,
            scroll_debounce_ms: 150,
            scroll_snap_ms: 200,
            time_item_height: 40.0,
            theme_storage_key: "dashboard-theme".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    #[must_use]
    pub fn popup_close_delay(&self) -> Duration {
        Duration::from_millis(self.popup_close_delay_ms)
    }

    #[must_use]
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    #[must_use]
    pub fn scroll_snap(&self) -> Duration {
        Duration::from_millis(self.scroll_snap_ms)
    }
}
