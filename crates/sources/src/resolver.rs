use std::path::{Path, PathBuf};

use log::{debug, warn};

use common::{probe_duration, Result, SourceInfo, SourceKind, SourceRow};

use crate::ytdlp::YtDlp;

/// Fallback channel for local files with no override and no parent folder
pub const LOCAL_CHANNEL: &str = "LocalFile";
pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CHANNEL: &str = "Unknown";

/// A row's source after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub identifier: String,
    pub kind: SourceKind,
    pub info: SourceInfo,
    /// Set for local files; remote sources get theirs from `fetch`
    pub media: Option<PathBuf>,
}

/// Finds out what a source identifier points at and gets its media on disk
pub trait SourceResolver: Send + Sync {
    fn classify(&self, identifier: &str) -> SourceKind;

    /// Learn title, channel and duration without downloading
    fn resolve(&self, row: &SourceRow) -> Result<ResolvedSource>;

    /// Return a local path for the media, downloading into `dest_dir` if needed
    fn fetch(&self, source: &ResolvedSource, dest_dir: &Path) -> Result<PathBuf>;
}

/// Local paths are used as they are, everything else goes through yt-dlp
#[derive(Debug, Clone, Default)]
pub struct MediaResolver {
    pub ytdlp: YtDlp,
}

impl MediaResolver {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self { ytdlp }
    }
}

/// Title and channel for a file on disk
pub fn local_info(path: &Path, channel_override: Option<&str>) -> SourceInfo {
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let channel = channel_override
        .map(str::to_string)
        .or_else(|| {
            path.parent()
                .and_then(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| LOCAL_CHANNEL.to_string());

    SourceInfo {
        title,
        channel,
        duration: None,
    }
}

impl SourceResolver for MediaResolver {
    fn classify(&self, identifier: &str) -> SourceKind {
        if Path::new(identifier).exists() {
            SourceKind::Local
        } else {
            SourceKind::Remote
        }
    }

    fn resolve(&self, row: &SourceRow) -> Result<ResolvedSource> {
        match row.kind {
            SourceKind::Local => {
                let path = PathBuf::from(&row.source_identifier);
                let mut info = local_info(&path, row.display_channel.as_deref());
                info.duration = match probe_duration(&path) {
                    Ok(seconds) => Some(seconds),
                    Err(e) => {
                        warn!("Could not read duration of {}: {}", path.display(), e);
                        None
                    }
                };

                Ok(ResolvedSource {
                    identifier: row.source_identifier.clone(),
                    kind: SourceKind::Local,
                    info,
                    media: Some(path),
                })
            }
            SourceKind::Remote => {
                let metadata = self.ytdlp.fetch_metadata(&row.source_identifier)?;
                debug!("Metadata for {}: {:?}", row.source_identifier, metadata.title);

                let info = SourceInfo {
                    title: metadata.title().unwrap_or(DEFAULT_TITLE).to_string(),
                    channel: metadata.channel_name().unwrap_or(DEFAULT_CHANNEL).to_string(),
                    duration: metadata.duration_seconds(),
                };

                Ok(ResolvedSource {
                    identifier: row.source_identifier.clone(),
                    kind: SourceKind::Remote,
                    info,
                    media: None,
                })
            }
        }
    }

    fn fetch(&self, source: &ResolvedSource, dest_dir: &Path) -> Result<PathBuf> {
        match &source.media {
            Some(path) => Ok(path.clone()),
            None => self.ytdlp.download(&source.identifier, dest_dir),
        }
    }
}
