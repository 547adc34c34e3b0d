use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("FFmpeg not found. Please install FFmpeg and make sure it's in your PATH.")]
    FFmpegNotFound,

    #[error("FFmpeg command failed: {0}")]
    FFmpegCommandFailed(String),

    #[error("yt-dlp command failed: {0}")]
    YtDlpCommandFailed(String),

    #[error("Input file '{0}' not found")]
    InputFileNotFound(String),

    #[error("Output file was not created")]
    OutputFileNotCreated,

    #[error("Could not determine media duration")]
    DurationUnavailable,

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, ToolkitError>;
