//! Where clip sources come from: files on disk or anything yt-dlp can fetch.

pub mod resolver;
pub mod ytdlp;

pub use resolver::{local_info, MediaResolver, ResolvedSource, SourceResolver};
pub use ytdlp::{VideoMetadata, YtDlp};
