use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::story::{Author, DEFAULT_STORY_DURATION};
use crate::uploader::{UploadPolicy, BYTES_PER_MB};

const APP_DIR: &str = "story-reel";

/// Autoplay timers never fire faster than this.
const MIN_TICK_MS: u64 = 16;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size/type limits for the "Add story" dialog.
    pub uploader: UploadPolicy,
    /// Display time given to uploaded stories.
    pub story_duration_ms: u64,
    /// How often the viewer samples autoplay progress.
    pub tick_interval_ms: u64,
    /// Identity attached to stories uploaded from this machine.
    pub author: Author,
    /// Remote images larger than this are not displayed.
    pub remote_fetch_limit_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uploader: UploadPolicy::default(),
            story_duration_ms: DEFAULT_STORY_DURATION.as_millis() as u64,
            tick_interval_ms: 100,
            author: Author {
                name: "ENTY HETHA".into(),
                avatar: "https://www.teewinek.com/wp-content/uploads/2024/11/hoodie-avec-impression-en-tunisie-teewinek-tunisie.png".into(),
            },
            remote_fetch_limit_mb: 20,
        }
    }
}

impl Config {
    /// Directory: ~/.config/story-reel/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push(APP_DIR);
        p
    }

    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn story_duration(&self) -> Duration {
        Duration::from_millis(self.story_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(MIN_TICK_MS))
    }

    pub fn remote_fetch_limit(&self) -> u64 {
        self.remote_fetch_limit_mb.saturating_mul(BYTES_PER_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.story_duration(), Duration::from_millis(5000));
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "uploader": { "max_size_mb": 50 }, "tick_interval_ms": 1 }"#,
        )
        .unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.uploader.max_size_mb, 50);
        assert_eq!(config.uploader.allowed_types.len(), 4);
        assert_eq!(config.tick_interval(), Duration::from_millis(MIN_TICK_MS));
        assert_eq!(config.author, Config::default().author);
    }

    #[test]
    fn save_then_load_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            story_duration_ms: 7000,
            author: Author {
                name: "Someone".into(),
                avatar: "file:///avatar.png".into(),
            },
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }
}
