use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use clipper::{discard_partial_output, output_folder, plan_row, ClipExtractor, DEFAULT_FOLDER_NAME_LIMIT};
use common::{format_timecode, SourceKind, SourceRow, ToolkitError};
use sources::SourceResolver;

pub mod archive;
pub mod table;

pub use archive::{archive_entry_name, build_archive};
pub use table::{read_table, Table, TableRow};

/// Errors that stop a whole batch
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("The input table has no header row")]
    MissingHeader,

    #[error("Could not read the input table: {0}")]
    Table(#[from] calamine::Error),

    #[error("Operation error: {0}")]
    OperationError(#[from] ToolkitError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// What happened to a single clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Produced(PathBuf),
    Skipped { output: PathBuf, reason: String },
    Failed { output: PathBuf, reason: String },
}

impl JobOutcome {
    pub fn output(&self) -> &Path {
        match self {
            JobOutcome::Produced(output)
            | JobOutcome::Skipped { output, .. }
            | JobOutcome::Failed { output, .. } => output,
        }
    }
}

/// What happened to a whole row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    Processed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    /// 1-based spreadsheet row, counting the header
    pub row_number: usize,
    pub source: String,
    pub status: RowStatus,
    pub jobs: Vec<JobOutcome>,
}

impl RowReport {
    fn new(row_number: usize, source: &str) -> Self {
        Self {
            row_number,
            source: source.to_string(),
            status: RowStatus::Processed,
            jobs: Vec::new(),
        }
    }

    fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.status = RowStatus::Skipped(reason.into());
        self
    }

    fn failed(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("Row {} ({}): {}", self.row_number, self.source, reason);
        self.status = RowStatus::Failed(reason);
        self
    }
}

/// Aggregated outcome of a trim run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub output_root: PathBuf,
    pub rows: Vec<RowReport>,
}

impl BatchSummary {
    fn jobs(&self) -> impl Iterator<Item = &JobOutcome> {
        self.rows.iter().flat_map(|row| row.jobs.iter())
    }

    pub fn produced(&self) -> usize {
        self.jobs().filter(|j| matches!(j, JobOutcome::Produced(_))).count()
    }

    pub fn skipped(&self) -> usize {
        self.jobs().filter(|j| matches!(j, JobOutcome::Skipped { .. })).count()
    }

    pub fn failed_jobs(&self) -> usize {
        self.jobs().filter(|j| matches!(j, JobOutcome::Failed { .. })).count()
    }

    pub fn failed_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.status, RowStatus::Failed(_)))
            .count()
    }

    /// Every clip that exists on disk after the run: new ones and ones a
    /// previous run already produced, in row order, each path once.
    pub fn archive_inputs(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.jobs()
            .filter(|j| !matches!(j, JobOutcome::Failed { .. }))
            .map(|j| j.output().to_path_buf())
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }
}

/// One lock per output folder. Rows sharing a folder also share its
/// download file, so they must not overlap.
#[derive(Default)]
struct FolderLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FolderLocks {
    fn for_folder(&self, folder: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(folder.to_path_buf()).or_default())
    }
}

/// Reads rows of sources and ranges, cuts the clips, and reports per unit
pub struct TrimBatch {
    resolver: Box<dyn SourceResolver>,
    extractor: Box<dyn ClipExtractor>,
    output_root: PathBuf,
    folder_name_limit: usize,
    clip_pause: Duration,
    keep_downloads: bool,
    parallel: bool,

    // Progress callback
    progress_callback: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
}

impl TrimBatch {
    pub fn new(
        resolver: Box<dyn SourceResolver>,
        extractor: Box<dyn ClipExtractor>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            extractor,
            output_root: output_root.into(),
            folder_name_limit: DEFAULT_FOLDER_NAME_LIMIT,
            clip_pause: Duration::from_millis(200),
            keep_downloads: false,
            parallel: false,
            progress_callback: None,
        }
    }

    /// Process rows on a thread pool instead of one after another
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Pause after each clip
    pub fn with_clip_pause(mut self, pause: Duration) -> Self {
        self.clip_pause = pause;
        self
    }

    /// Keep downloaded source media instead of deleting it after its row
    pub fn with_keep_downloads(mut self, keep: bool) -> Self {
        self.keep_downloads = keep;
        self
    }

    pub fn with_folder_name_limit(mut self, limit: usize) -> Self {
        self.folder_name_limit = limit;
        self
    }

    /// Set a progress callback function
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Run every row of the table. Only failing to create the output root
    /// is fatal; row and clip problems end up in the summary.
    pub fn process(&self, table: &Table) -> Result<BatchSummary> {
        fs::create_dir_all(&self.output_root)?;

        let total_rows = table.rows.len();

        // Create a progress bar if there's no custom callback
        let progress_bar = if self.progress_callback.is_none() {
            let pb = ProgressBar::new(total_rows as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")
            {
                pb.set_style(style);
            }
            Some(pb)
        } else {
            None
        };

        let processed = AtomicUsize::new(0);
        let folder_locks = FolderLocks::default();
        let run_row = |row: &TableRow| {
            let report = self.process_row(row.number, &table.headers, &row.cells, &folder_locks);

            let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(ref progress_bar) = progress_bar {
                progress_bar.inc(1);
            } else if let Some(ref callback) = self.progress_callback {
                callback(done, total_rows);
            }

            report
        };

        let rows: Vec<RowReport> = if self.parallel {
            table.rows.par_iter().map(run_row).collect()
        } else {
            table.rows.iter().map(run_row).collect()
        };

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Trimming complete");
        }

        Ok(BatchSummary {
            output_root: self.output_root.clone(),
            rows,
        })
    }

    /// Resolve, plan and cut one row
    fn process_row(
        &self,
        row_number: usize,
        headers: &[String],
        cells: &[String],
        folder_locks: &FolderLocks,
    ) -> RowReport {
        let identifier = cells.first().map(|c| c.trim()).unwrap_or_default();
        let kind = self.resolver.classify(identifier);
        let row = SourceRow::from_cells(headers, cells, kind);
        let report = RowReport::new(row_number, &row.source_identifier);

        if row.is_blank() {
            return report.skipped("empty source identifier");
        }

        let source = match self.resolver.resolve(&row) {
            Ok(source) => source,
            Err(e) => return report.failed(format!("could not fetch metadata: {}", e)),
        };

        // Held until the download is cleaned up
        let folder_lock =
            folder_locks.for_folder(&output_folder(&source.info, &self.output_root, self.folder_name_limit));
        let _folder_guard = folder_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let plan = plan_row(&row, &source.info, &self.output_root, self.folder_name_limit);
        info!(
            "Row {}: '{}' by '{}', {} clip(s) to cut, {} already present",
            row_number,
            source.info.title,
            source.info.channel,
            plan.pending.len(),
            plan.already_produced.len()
        );

        let mut report = report;
        report.jobs.extend(plan.already_produced.iter().map(|output| JobOutcome::Skipped {
            output: output.clone(),
            reason: "already exists".to_string(),
        }));

        if plan.pending.is_empty() {
            return report;
        }

        if let Err(e) = fs::create_dir_all(&plan.output_dir) {
            return report.failed(format!("could not create {}: {}", plan.output_dir.display(), e));
        }

        let media = match self.resolver.fetch(&source, &plan.output_dir) {
            Ok(media) => media,
            Err(e) => return report.failed(format!("failed to download: {}", e)),
        };

        for job in &plan.pending {
            let output = plan.output_dir.join(&job.output_name);
            if output.exists() {
                debug!("{} appeared since planning, skipping", output.display());
                report.jobs.push(JobOutcome::Skipped {
                    output,
                    reason: "already exists".to_string(),
                });
                continue;
            }

            debug!(
                "Cutting {} to {} into {}",
                format_timecode(job.range.start_seconds),
                format_timecode(job.range.end_seconds),
                output.display()
            );

            let outcome = match self.extractor.extract(&media, &job.range, &output) {
                Ok(()) => JobOutcome::Produced(output),
                Err(e) => {
                    warn!("Error trimming {}: {}", output.display(), e);
                    discard_partial_output(&output);
                    JobOutcome::Failed {
                        output,
                        reason: e.to_string(),
                    }
                }
            };
            report.jobs.push(outcome);

            if !self.clip_pause.is_zero() {
                thread::sleep(self.clip_pause);
            }
        }

        if source.kind == SourceKind::Remote && !self.keep_downloads {
            if let Err(e) = fs::remove_file(&media) {
                debug!("Could not remove download {}: {}", media.display(), e);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper::TimeRange;
    use common::{SourceInfo, Result as ToolkitResult};
    use sources::ResolvedSource;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Resolver that knows a fixed set of remote ids and "downloads" by
    /// writing a placeholder file
    struct FakeResolver {
        known: Vec<(&'static str, SourceInfo)>,
        local: HashSet<String>,
        fail_download: bool,
    }

    impl FakeResolver {
        fn remote(id: &'static str, title: &str, channel: &str, duration: Option<u64>) -> Self {
            Self {
                known: vec![(
                    id,
                    SourceInfo {
                        title: title.to_string(),
                        channel: channel.to_string(),
                        duration,
                    },
                )],
                local: HashSet::new(),
                fail_download: false,
            }
        }
    }

    impl SourceResolver for FakeResolver {
        fn classify(&self, identifier: &str) -> SourceKind {
            if self.local.contains(identifier) {
                SourceKind::Local
            } else {
                SourceKind::Remote
            }
        }

        fn resolve(&self, row: &SourceRow) -> ToolkitResult<ResolvedSource> {
            if row.kind == SourceKind::Local {
                return Ok(ResolvedSource {
                    identifier: row.source_identifier.clone(),
                    kind: SourceKind::Local,
                    info: sources::local_info(Path::new(&row.source_identifier), row.display_channel.as_deref()),
                    media: Some(PathBuf::from(&row.source_identifier)),
                });
            }

            self.known
                .iter()
                .find(|(id, _)| *id == row.source_identifier)
                .map(|(id, info)| ResolvedSource {
                    identifier: id.to_string(),
                    kind: SourceKind::Remote,
                    info: info.clone(),
                    media: None,
                })
                .ok_or_else(|| ToolkitError::YtDlpCommandFailed("Video unavailable".to_string()))
        }

        fn fetch(&self, source: &ResolvedSource, dest_dir: &Path) -> ToolkitResult<PathBuf> {
            if let Some(path) = &source.media {
                return Ok(path.clone());
            }
            if self.fail_download {
                return Err(ToolkitError::YtDlpCommandFailed("HTTP Error 403".to_string()));
            }
            let path = dest_dir.join("temp_video.mp4");
            fs::write(&path, b"video")?;
            Ok(path)
        }
    }

    /// Extractor that writes a marker file and records each call
    #[derive(Default)]
    struct FakeExtractor {
        calls: Arc<Mutex<Vec<(PathBuf, TimeRange, String)>>>,
        fail_on: Option<String>,
        /// Leave a truncated file behind when failing, like a killed encoder
        partial_on_fail: bool,
    }

    impl ClipExtractor for FakeExtractor {
        fn extract(&self, input_file: &Path, range: &TimeRange, output_file: &Path) -> ToolkitResult<()> {
            let name = output_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.calls
                .lock()
                .unwrap()
                .push((input_file.to_path_buf(), *range, name.clone()));

            if !input_file.exists() {
                return Err(ToolkitError::InputFileNotFound(input_file.display().to_string()));
            }
            if self.fail_on.as_deref() == Some(name.as_str()) {
                if self.partial_on_fail {
                    fs::write(output_file, b"half")?;
                }
                return Err(ToolkitError::FFmpegCommandFailed("Invalid data found".to_string()));
            }
            fs::write(output_file, b"clip")?;
            Ok(())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: strings(headers),
            rows: rows
                .iter()
                .enumerate()
                .map(|(index, r)| TableRow {
                    number: index + 2,
                    cells: strings(r),
                })
                .collect(),
        }
    }

    fn batch(resolver: FakeResolver, extractor: FakeExtractor, root: &Path) -> TrimBatch {
        TrimBatch::new(Box::new(resolver), Box::new(extractor), root)
            .with_clip_pause(Duration::ZERO)
            .with_progress_callback(|_, _| {})
    }

    #[test]
    fn single_remote_row_produces_one_clip() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::default();
        let calls = Arc::clone(&extractor.calls);
        let resolver = FakeResolver::remote("vid1", "My Video", "Chan", Some(300));

        let summary = batch(resolver, extractor, dir.path())
            .process(&table(&["URL", "Intro"], &[&["vid1", "0-5"]]))
            .unwrap();

        let expected = dir.path().join("Chan_My Video").join("Intro_Chan_My Video_part1.mp4");
        assert_eq!(summary.rows[0].status, RowStatus::Processed);
        assert_eq!(summary.rows[0].jobs, vec![JobOutcome::Produced(expected.clone())]);
        assert_eq!(summary.archive_inputs(), vec![expected]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, TimeRange { start_seconds: 0, end_seconds: 5 });
    }

    #[test]
    fn downloads_are_removed_after_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FakeResolver::remote("vid1", "T", "C", Some(60));

        batch(resolver, FakeExtractor::default(), dir.path())
            .process(&table(&["URL", "A"], &[&["vid1", "0-5"]]))
            .unwrap();

        assert!(!dir.path().join("C_T").join("temp_video.mp4").exists());
    }

    #[test]
    fn keep_downloads_leaves_the_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FakeResolver::remote("vid1", "T", "C", Some(60));

        batch(resolver, FakeExtractor::default(), dir.path())
            .with_keep_downloads(true)
            .process(&table(&["URL", "A"], &[&["vid1", "0-5"]]))
            .unwrap();

        assert!(dir.path().join("C_T").join("temp_video.mp4").exists());
    }

    #[test]
    fn rerun_skips_existing_clips() {
        let dir = tempfile::tempdir().unwrap();
        let input = table(&["URL", "ClipA"], &[&["vid1", "0-5,10-20"]]);

        let first = batch(
            FakeResolver::remote("vid1", "Title", "Chan", Some(60)),
            FakeExtractor::default(),
            dir.path(),
        )
        .process(&input)
        .unwrap();
        assert_eq!(first.produced(), 2);

        let extractor = FakeExtractor::default();
        let calls = Arc::clone(&extractor.calls);
        let second = batch(
            FakeResolver::remote("vid1", "Title", "Chan", Some(60)),
            extractor,
            dir.path(),
        )
        .process(&input)
        .unwrap();

        assert_eq!(second.produced(), 0);
        assert_eq!(second.skipped(), 2);
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(second.archive_inputs(), first.archive_inputs());
    }

    #[test]
    fn nothing_pending_means_no_download() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Chan_Title");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("ClipA_Chan_Title_part1.mp4"), b"done").unwrap();

        let mut resolver = FakeResolver::remote("vid1", "Title", "Chan", Some(60));
        resolver.fail_download = true;

        let summary = batch(resolver, FakeExtractor::default(), dir.path())
            .process(&table(&["URL", "ClipA"], &[&["vid1", "0-5"]]))
            .unwrap();

        assert_eq!(summary.rows[0].status, RowStatus::Processed);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn unresolvable_rows_fail_without_stopping_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FakeResolver::remote("vid1", "T", "C", Some(60));

        let summary = batch(resolver, FakeExtractor::default(), dir.path())
            .process(&table(
                &["URL", "A"],
                &[&["missing", "0-5"], &["", "0-5"], &["vid1", "0-5"]],
            ))
            .unwrap();

        assert!(matches!(summary.rows[0].status, RowStatus::Failed(_)));
        assert!(summary.rows[0].jobs.is_empty());
        assert!(matches!(summary.rows[1].status, RowStatus::Skipped(_)));
        assert_eq!(summary.rows[2].status, RowStatus::Processed);
        assert_eq!(summary.rows[2].row_number, 4);
        assert_eq!(summary.produced(), 1);
        assert_eq!(summary.failed_rows(), 1);
    }

    #[test]
    fn download_failure_fails_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = FakeResolver::remote("vid1", "T", "C", Some(60));
        resolver.fail_download = true;

        let summary = batch(resolver, FakeExtractor::default(), dir.path())
            .process(&table(&["URL", "A"], &[&["vid1", "0-5"]]))
            .unwrap();

        assert!(matches!(summary.rows[0].status, RowStatus::Failed(_)));
        assert_eq!(summary.produced(), 0);
    }

    #[test]
    fn failed_clip_does_not_stop_its_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor {
            fail_on: Some("A_C_T_part1.mp4".to_string()),
            ..Default::default()
        };

        let summary = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), extractor, dir.path())
            .process(&table(&["URL", "A"], &[&["vid1", "0-5,10-15"]]))
            .unwrap();

        assert_eq!(summary.failed_jobs(), 1);
        assert_eq!(summary.produced(), 1);
        assert_eq!(
            summary.archive_inputs(),
            vec![dir.path().join("C_T").join("A_C_T_part2.mp4")]
        );
    }

    #[test]
    fn local_rows_use_override_and_shifted_columns() {
        let dir = tempfile::tempdir().unwrap();
        let media_dir = dir.path().join("media");
        fs::create_dir_all(&media_dir).unwrap();
        let media = media_dir.join("interview.mp4");
        fs::write(&media, b"video").unwrap();
        let media_id = media.to_string_lossy().into_owned();

        let mut resolver = FakeResolver::remote("vid1", "T", "C", None);
        resolver.local.insert(media_id.clone());

        let extractor = FakeExtractor::default();
        let calls = Arc::clone(&extractor.calls);
        let output_root = dir.path().join("out");

        let summary = batch(resolver, extractor, &output_root)
            .process(&table(
                &["Source", "Channel", "Quote (mm:ss)"],
                &[&[media_id.as_str(), "Studio", "1:00-1:30"]],
            ))
            .unwrap();

        assert_eq!(
            summary.archive_inputs(),
            vec![output_root.join("Studio_interview").join("Quote_Studio_interview_part1.mp4")]
        );
        assert_eq!(calls.lock().unwrap()[0].0, media);
        assert!(media.exists());
    }

    #[test]
    fn parallel_rows_keep_table_order() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FakeResolver {
            known: vec![
                ("a", SourceInfo { title: "A".into(), channel: "C".into(), duration: Some(60) }),
                ("b", SourceInfo { title: "B".into(), channel: "C".into(), duration: Some(60) }),
                ("c", SourceInfo { title: "D".into(), channel: "C".into(), duration: Some(60) }),
            ],
            local: HashSet::new(),
            fail_download: false,
        };
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = Arc::clone(&seen);

        let summary = TrimBatch::new(Box::new(resolver), Box::new(FakeExtractor::default()), dir.path())
            .with_clip_pause(Duration::ZERO)
            .with_parallel(true)
            .with_progress_callback(move |_, _| {
                seen_in_callback.fetch_add(1, Ordering::SeqCst);
            })
            .process(&table(&["URL", "X"], &[&["a", "0-1"], &["b", "0-1"], &["c", "0-1"]]))
            .unwrap();

        let sources: Vec<&str> = summary.rows.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
        assert_eq!(summary.produced(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn colliding_column_labels_cut_once() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::default();
        let calls = Arc::clone(&extractor.calls);

        let summary = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), extractor, dir.path())
            .process(&table(&["URL", "Intro (EN)", "Intro (KN)"], &[&["vid1", "0-5", "10-20"]]))
            .unwrap();

        let expected = dir.path().join("C_T").join("Intro_C_T_part1.mp4");
        assert_eq!(summary.produced(), 1);
        assert_eq!(summary.archive_inputs(), vec![expected]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, TimeRange { start_seconds: 0, end_seconds: 5 });
    }

    #[test]
    fn repeated_source_is_archived_once() {
        let dir = tempfile::tempdir().unwrap();

        let summary = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), FakeExtractor::default(), dir.path())
            .process(&table(&["URL", "A"], &[&["vid1", "0-5"], &["vid1", "0-5"]]))
            .unwrap();

        assert_eq!(summary.produced(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(
            summary.archive_inputs(),
            vec![dir.path().join("C_T").join("A_C_T_part1.mp4")]
        );
    }

    #[test]
    fn failed_clip_is_retried_on_the_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = table(&["URL", "A"], &[&["vid1", "0-5"]]);
        let output = dir.path().join("C_T").join("A_C_T_part1.mp4");

        let first = batch(
            FakeResolver::remote("vid1", "T", "C", Some(60)),
            FakeExtractor {
                fail_on: Some("A_C_T_part1.mp4".to_string()),
                partial_on_fail: true,
                ..Default::default()
            },
            dir.path(),
        )
        .process(&input)
        .unwrap();

        assert_eq!(first.failed_jobs(), 1);
        assert!(!output.exists());
        assert!(first.archive_inputs().is_empty());

        let second = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), FakeExtractor::default(), dir.path())
            .process(&input)
            .unwrap();

        assert_eq!(second.produced(), 1);
        assert_eq!(fs::read(&output).unwrap(), b"clip");
    }

    #[test]
    fn parallel_rows_sharing_a_folder_do_not_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let row: &[&str] = &["vid1", "0-5,10-15"];
        let rows = vec![row; 6];

        let summary = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), FakeExtractor::default(), dir.path())
            .with_parallel(true)
            .process(&table(&["URL", "A"], &rows))
            .unwrap();

        assert_eq!(summary.failed_jobs(), 0);
        assert_eq!(summary.failed_rows(), 0);
        assert_eq!(summary.produced(), 2);
        assert_eq!(summary.skipped(), 10);
        assert_eq!(summary.archive_inputs().len(), 2);
    }

    #[test]
    fn row_numbers_follow_the_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let input = Table::from_rows(vec![
            strings(&["URL", "A"]),
            strings(&["", ""]),
            strings(&["missing", "0-5"]),
        ])
        .unwrap();

        let summary = batch(FakeResolver::remote("vid1", "T", "C", Some(60)), FakeExtractor::default(), dir.path())
            .process(&input)
            .unwrap();

        assert_eq!(summary.rows[0].row_number, 3);
    }
}
