use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Result, ToolkitError};

/// Check if FFmpeg is installed and accessible
pub fn check_ffmpeg() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|_| true)
        .unwrap_or(false)
}

/// Execute an FFmpeg command with the given arguments
pub fn execute_ffmpeg(args: &[&str]) -> Result<Output> {
    debug!("ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(args)
        .output()
        .map_err(ToolkitError::IoError)?;

    if !output.status.success() {
        let error_message = String::from_utf8_lossy(&output.stderr);
        return Err(ToolkitError::FFmpegCommandFailed(error_message.to_string()));
    }

    Ok(output)
}

/// Get the container duration in whole seconds using FFprobe
pub fn probe_duration(file_path: &Path) -> Result<u64> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-show_entries", "format=duration",
            "-of", "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(file_path)
        .output()
        .map_err(ToolkitError::IoError)?;

    if !output.status.success() {
        let error_message = String::from_utf8_lossy(&output.stderr);
        return Err(ToolkitError::FFmpegCommandFailed(error_message.to_string()));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe's `format=duration` output, truncating to whole seconds
pub fn parse_probe_duration(stdout: &str) -> Result<u64> {
    let seconds = stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| ToolkitError::DurationUnavailable)?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ToolkitError::DurationUnavailable);
    }

    Ok(seconds as u64)
}

/// Verify input file exists
pub fn verify_input_file(file_path: &Path) -> Result<()> {
    if !file_path.exists() {
        return Err(ToolkitError::InputFileNotFound(file_path.display().to_string()));
    }
    Ok(())
}

/// Get file size in megabytes
pub fn get_file_size_mb(file_path: &Path) -> f64 {
    match std::fs::metadata(file_path) {
        Ok(metadata) => metadata.len() as f64 / (1024.0 * 1024.0),
        Err(_) => 0.0,
    }
}
