use std::fs;
use std::path::Path;

use log::warn;

use common::{execute_ffmpeg, format_timecode, verify_input_file, Result, ToolkitError};

use crate::plan::TimeRange;

/// Cuts one interval out of a local media file
pub trait ClipExtractor: Send + Sync {
    fn extract(&self, input_file: &Path, range: &TimeRange, output_file: &Path) -> Result<()>;
}

/// Encoding settings for ffmpeg-based extraction
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    /// Copy codec instead of re-encoding (faster but cuts on keyframes)
    pub copy_codec: bool,
    pub preset: String,
    pub crf: u8,
}

/// Remove whatever a failed cut left at `output_file`, so a later run
/// doesn't take a truncated clip for a finished one
pub fn discard_partial_output(output_file: &Path) {
    if !output_file.exists() {
        return;
    }
    if let Err(e) = fs::remove_file(output_file) {
        warn!("Could not remove partial clip {}: {}", output_file.display(), e);
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self {
            copy_codec: false,
            preset: "medium".to_string(),
            crf: 22,
        }
    }
}

impl FfmpegExtractor {
    /// Build the argument list for a single cut
    pub fn build_args(&self, input_file: &str, range: &TimeRange, output_file: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(), input_file.into(),
            "-ss".into(), format_timecode(range.start_seconds),
            "-to".into(), format_timecode(range.end_seconds),
        ];

        if self.copy_codec {
            args.extend(["-c".to_string(), "copy".to_string()]);
        } else {
            args.extend([
                "-c:v".to_string(), "libx264".to_string(),
                "-preset".to_string(), self.preset.clone(),
                "-crf".to_string(), self.crf.to_string(),
                "-c:a".to_string(), "aac".to_string(),
            ]);
        }

        args.push(output_file.into());
        args
    }
}

impl ClipExtractor for FfmpegExtractor {
    fn extract(&self, input_file: &Path, range: &TimeRange, output_file: &Path) -> Result<()> {
        verify_input_file(input_file)?;

        if let Some(parent) = output_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ToolkitError::IoError)?;
            }
        }

        let input = input_file.to_string_lossy();
        let output = output_file.to_string_lossy();
        let args = self.build_args(&input, range, &output);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        if let Err(e) = execute_ffmpeg(&arg_refs) {
            discard_partial_output(output_file);
            return Err(e);
        }

        // Verify output file was created
        if !output_file.exists() {
            return Err(ToolkitError::OutputFileNotCreated);
        }

        Ok(())
    }
}
