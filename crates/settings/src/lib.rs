use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine a configuration directory")]
    NoConfigDirectory,
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

pub const SETTINGS_FILE: &str = "config.toml";

/// User-tunable knobs for downloading, cutting and reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// yt-dlp executable name or path
    pub ytdlp_path: String,
    /// yt-dlp format selector for downloads
    pub download_format: String,
    /// Netscape cookies file handed to yt-dlp
    pub cookies_file: Option<PathBuf>,
    /// Stream-copy instead of re-encoding clips
    pub copy_codec: bool,
    pub preset: String,
    pub crf: u8,
    /// Pause after each clip, in milliseconds
    pub clip_pause_ms: u64,
    /// Keep downloaded source videos after cutting
    pub keep_downloads: bool,
    pub thumbnail_timeout_secs: u64,
    /// Maximum length of a per-source output folder name, in characters
    pub folder_name_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            download_format: "best[height<=720]/best".to_string(),
            cookies_file: None,
            copy_codec: false,
            preset: "medium".to_string(),
            crf: 22,
            clip_pause_ms: 200,
            keep_downloads: false,
            thumbnail_timeout_secs: 15,
            folder_name_limit: 180,
        }
    }
}

impl Settings {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Manages the settings file on disk
pub struct SettingsManager {
    config_dir: PathBuf,
}

impl SettingsManager {
    /// Use the platform configuration directory
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "socialscribe", "SocialScribe")
            .ok_or(SettingsError::NoConfigDirectory)?;

        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    /// Use a custom directory
    pub fn with_directory<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Load settings, or defaults when no file has been written yet
    pub fn load(&self) -> Result<Settings> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path)?;
        Settings::from_toml(&contents)
    }

    /// Write settings, replacing any existing file
    pub fn save(&self, settings: &Settings) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::write(self.settings_path(), settings.to_toml()?)?;
        Ok(())
    }

    /// Write the defaults unless a settings file already exists.
    /// Returns whether a file was written.
    pub fn init(&self) -> Result<bool> {
        if self.settings_path().exists() {
            return Ok(false);
        }
        self.save(&Settings::default())?;
        Ok(true)
    }
}
