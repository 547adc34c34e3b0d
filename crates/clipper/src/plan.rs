use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use common::{parse_timecode, sanitize_label, sanitize_name, SourceInfo, SourceRow};

lazy_static! {
    /// Ranges inside one cell are separated by `/` or `,`
    static ref RANGE_SEPARATOR: Regex = Regex::new(r"[/,]").unwrap();
}

/// Longest folder name used for a source's clips
pub const DEFAULT_FOLDER_NAME_LIMIT: usize = 180;

/// A validated `[start, end)` interval in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimeRange {
    /// Clamp both bounds into `[0, duration]` and keep the range only if it
    /// is still non-empty. An unknown duration leaves the upper side open.
    pub fn clamped(start: i64, end: i64, duration: Option<u64>) -> Option<Self> {
        let clamp = |value: i64| {
            let value = value.max(0) as u64;
            match duration {
                Some(limit) => value.min(limit),
                None => value,
            }
        };

        let start_seconds = clamp(start);
        let end_seconds = clamp(end);

        if start_seconds >= end_seconds {
            return None;
        }

        Some(Self { start_seconds, end_seconds })
    }
}

/// One interval to cut from one source into one named file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipJob {
    pub source_identifier: String,
    pub range: TimeRange,
    pub output_name: String,
}

/// Names shared by every clip cut from the same source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipNaming {
    pub channel: String,
    pub title: String,
}

impl ClipNaming {
    pub fn from_info(info: &SourceInfo) -> Self {
        Self {
            channel: sanitize_name(&info.channel),
            title: sanitize_name(&info.title),
        }
    }

    /// `{label}_{channel}_{title}_part{index}.mp4`
    pub fn clip_file_name(&self, column_label: &str, index: usize) -> String {
        format!("{}_{}_{}_part{}.mp4", column_label, self.channel, self.title, index)
    }

    /// `{channel}_{title}`, cut to at most `limit` characters
    pub fn folder_name(&self, limit: usize) -> String {
        format!("{}_{}", self.channel, self.title).chars().take(limit).collect()
    }
}

/// Turn one cell of range text into clip jobs.
///
/// Each `/`- or `,`-separated part is numbered by its position in the
/// cell, starting at 1. Parts that don't parse, or that are empty once
/// clamped, are dropped without renumbering their siblings.
pub fn split_range_cell(
    source_identifier: &str,
    cell_text: &str,
    column_label: &str,
    naming: &ClipNaming,
    duration: Option<u64>,
) -> Vec<ClipJob> {
    let text = cell_text.trim();
    if text.is_empty() || !text.contains('-') {
        return Vec::new();
    }

    let mut jobs = Vec::new();
    for (position, part) in RANGE_SEPARATOR.split(text).enumerate() {
        let Some((start_token, end_token)) = part.split_once('-') else {
            continue;
        };

        let (Some(start), Some(end)) = (parse_timecode(start_token), parse_timecode(end_token)) else {
            debug!("Ignoring unparseable range '{}' in column '{}'", part.trim(), column_label);
            continue;
        };

        let Some(range) = TimeRange::clamped(start, end, duration) else {
            debug!("Ignoring empty range '{}' in column '{}'", part.trim(), column_label);
            continue;
        };

        jobs.push(ClipJob {
            source_identifier: source_identifier.to_string(),
            range,
            output_name: naming.clip_file_name(column_label, position + 1),
        });
    }

    jobs
}

/// The work left to do for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    pub output_dir: PathBuf,
    /// Jobs whose output file does not exist yet, in column then cell order
    pub pending: Vec<ClipJob>,
    /// Outputs left by an earlier run; their jobs are not queued again
    pub already_produced: Vec<PathBuf>,
}

/// Folder under `output_root` that receives a source's clips
pub fn output_folder(info: &SourceInfo, output_root: &Path, folder_name_limit: usize) -> PathBuf {
    output_root.join(ClipNaming::from_info(info).folder_name(folder_name_limit))
}

/// Plan every clip for a row, skipping outputs that already exist under
/// `output_root/{channel}_{title}`.
///
/// Columns whose labels sanitize to the same text name the same file; the
/// leftmost one wins and the later jobs are dropped.
pub fn plan_row(
    row: &SourceRow,
    info: &SourceInfo,
    output_root: &Path,
    folder_name_limit: usize,
) -> RowPlan {
    let naming = ClipNaming::from_info(info);
    let output_dir = output_folder(info, output_root, folder_name_limit);

    let mut pending = Vec::new();
    let mut already_produced = Vec::new();
    let mut planned = HashSet::new();

    for cell in &row.time_range_cells {
        let label = sanitize_label(&cell.column_label);
        let jobs = split_range_cell(
            &row.source_identifier,
            &cell.raw_text,
            &label,
            &naming,
            info.duration,
        );

        for job in jobs {
            if !planned.insert(job.output_name.clone()) {
                debug!("{} is already planned for this row, ignoring '{}'", job.output_name, cell.column_label);
                continue;
            }

            let output_path = output_dir.join(&job.output_name);
            if output_path.exists() {
                debug!("{} already exists, skipping", output_path.display());
                already_produced.push(output_path);
            } else {
                pending.push(job);
            }
        }
    }

    RowPlan {
        output_dir,
        pending,
        already_produced,
    }
}
