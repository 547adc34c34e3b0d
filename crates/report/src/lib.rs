//! Word reports of video metadata and thumbnails for a list of URLs.

use chrono::NaiveDate;
use log::{info, warn};
use thiserror::Error;

use sources::{VideoMetadata, YtDlp};

pub mod document;
pub mod thumbnail;

pub use document::{render_document, write_document};
pub use thumbnail::{HttpThumbnails, Thumbnail, ThumbnailFetcher};

pub const DEFAULT_REPORT_FILE: &str = "SocialScribe_YouTube_Report.docx";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No URLs were given")]
    NoUrls,

    #[error("Thumbnail download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Thumbnail could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write document: {0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// One video's block in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub title: String,
    pub channel: String,
    pub upload_date: String,
    pub url: String,
    pub thumbnail: Option<Thumbnail>,
}

impl ReportEntry {
    pub fn from_metadata(url: &str, metadata: &VideoMetadata) -> Self {
        Self {
            title: metadata.title().unwrap_or("Unknown Title").to_string(),
            channel: metadata.channel_name().unwrap_or("Unknown Channel").to_string(),
            upload_date: metadata
                .upload_date
                .as_deref()
                .map(normalize_upload_date)
                .unwrap_or_default(),
            url: url.to_string(),
            thumbnail: None,
        }
    }
}

/// `20240131` or `2024-01-31[...]` become `31-01-2024`; anything else is
/// returned as given
pub fn normalize_upload_date(raw: &str) -> String {
    let trimmed = raw.trim();

    let compact = trimmed
        .get(..8)
        .filter(|head| head.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y%m%d").ok());

    let iso = || {
        trimmed
            .get(..10)
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
    };

    match compact.or_else(iso) {
        Some(date) => date.format("%d-%m-%Y").to_string(),
        None => raw.to_string(),
    }
}

/// One URL per line; blank lines and surrounding whitespace are ignored
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Looks up metadata for a URL without downloading the video
pub trait MetadataSource: Send + Sync {
    fn metadata(&self, url: &str) -> common::Result<VideoMetadata>;
}

impl MetadataSource for YtDlp {
    fn metadata(&self, url: &str) -> common::Result<VideoMetadata> {
        self.fetch_metadata(url)
    }
}

/// Collects report entries; per-URL failures are logged and skipped
pub struct ReportGenerator {
    metadata: Box<dyn MetadataSource>,
    thumbnails: Option<Box<dyn ThumbnailFetcher>>,
}

impl ReportGenerator {
    pub fn new(metadata: Box<dyn MetadataSource>) -> Self {
        Self {
            metadata,
            thumbnails: None,
        }
    }

    pub fn with_thumbnails(mut self, fetcher: Box<dyn ThumbnailFetcher>) -> Self {
        self.thumbnails = Some(fetcher);
        self
    }

    pub fn entry(&self, url: &str) -> Option<ReportEntry> {
        let metadata = match self.metadata.metadata(url) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Could not fetch metadata for: {} | {}", url, e);
                return None;
            }
        };

        let mut entry = ReportEntry::from_metadata(url, &metadata);

        if let (Some(fetcher), Some(thumb_url)) = (&self.thumbnails, metadata.thumbnail_url()) {
            match fetcher.fetch(thumb_url) {
                Ok(thumbnail) => entry.thumbnail = Some(thumbnail),
                Err(e) => warn!("No thumbnail for {}: {}", url, e),
            }
        }

        Some(entry)
    }

    pub fn collect(&self, urls: &[String]) -> Result<Vec<ReportEntry>> {
        if urls.is_empty() {
            return Err(ReportError::NoUrls);
        }

        let entries: Vec<ReportEntry> = urls.iter().filter_map(|url| self.entry(url)).collect();
        info!("Collected {} of {} report entries", entries.len(), urls.len());

        Ok(entries)
    }
}
