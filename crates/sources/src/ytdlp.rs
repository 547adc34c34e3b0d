use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::Deserialize;

use common::{Result, ToolkitError};

/// Default stem for downloaded media inside a source's folder
pub const DOWNLOAD_STEM: &str = "temp_video";

/// The subset of yt-dlp's `--dump-json` output we care about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<f64>,
    pub upload_date: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

impl VideoMetadata {
    /// Parse a single JSON document as printed by `yt-dlp --dump-json`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ToolkitError::InvalidMetadata(e.to_string()))
    }

    /// Uploader first, then channel
    pub fn channel_name(&self) -> Option<&str> {
        non_empty(self.uploader.as_deref()).or_else(|| non_empty(self.channel.as_deref()))
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// The main thumbnail, falling back to the last (largest) listed one
    pub fn thumbnail_url(&self) -> Option<&str> {
        non_empty(self.thumbnail.as_deref()).or_else(|| {
            self.thumbnails
                .last()
                .and_then(|t| non_empty(t.url.as_deref()))
        })
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d as u64)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Thin wrapper around the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub binary: String,
    pub format: String,
    pub cookies_file: Option<PathBuf>,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "best[height<=720]/best".to_string(),
            cookies_file: None,
        }
    }
}

impl YtDlp {
    /// Check if yt-dlp is installed and accessible
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
        ];
        if let Some(cookies) = &self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }
        args
    }

    /// Arguments for a metadata-only lookup
    pub fn metadata_args(&self, url: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(["--dump-json".to_string(), "--skip-download".to_string()]);
        args.push(url.to_string());
        args
    }

    /// Arguments for downloading into `dest_dir`, printing the final path
    pub fn download_args(&self, url: &str, dest_dir: &Path) -> Vec<String> {
        let template = dest_dir.join(format!("{}.%(ext)s", DOWNLOAD_STEM));
        let mut args = self.base_args();
        args.extend([
            "-f".to_string(), self.format.clone(),
            "-o".to_string(), template.to_string_lossy().into_owned(),
            "--no-simulate".to_string(),
            "--print".to_string(), "after_move:filepath".to_string(),
        ]);
        args.push(url.to_string());
        args
    }

    fn run(&self, args: &[String]) -> Result<String> {
        debug!("{} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(ToolkitError::IoError)?;

        if !output.status.success() {
            let error_message = String::from_utf8_lossy(&output.stderr);
            return Err(ToolkitError::YtDlpCommandFailed(error_message.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fetch metadata without downloading anything
    pub fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let stdout = self.run(&self.metadata_args(url))?;
        let json = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| ToolkitError::InvalidMetadata("yt-dlp printed nothing".to_string()))?;
        VideoMetadata::from_json(json)
    }

    /// Download `url` into `dest_dir` and return the media file's path
    pub fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir).map_err(ToolkitError::IoError)?;

        let stdout = self.run(&self.download_args(url, dest_dir))?;
        let printed = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from);

        match printed {
            Some(path) if path.exists() => Ok(path),
            _ => find_download(dest_dir).ok_or(ToolkitError::OutputFileNotCreated),
        }
    }
}

/// Locate `temp_video.*` in a folder when yt-dlp didn't report a path
pub fn find_download(dest_dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dest_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_file()
                && path.file_stem().and_then(|s| s.to_str()) == Some(DOWNLOAD_STEM)
                && path.extension().map_or(false, |ext| ext != "part")
        })
}
