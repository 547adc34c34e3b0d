use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use batch_processing::{build_archive, read_table, JobOutcome, RowStatus, TrimBatch};
use clipper::FfmpegExtractor;
use common::{check_ffmpeg, get_file_size_mb, ToolkitError};
use report::{parse_url_list, write_document, HttpThumbnails, ReportGenerator, DEFAULT_REPORT_FILE};
use settings::{Settings, SettingsManager};
use sources::{MediaResolver, YtDlp};

#[derive(Parser)]
#[clap(author, version, about = "Spreadsheet-driven video clipping and metadata reports")]
struct Cli {
    /// Use settings from this directory instead of the user config directory
    #[clap(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Show debug output (RUST_LOG takes precedence)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut the time ranges listed in a spreadsheet into clips and zip them
    Trim {
        /// Spreadsheet (.xlsx, .xls, .ods): source in the first column, ranges like 00:01-00:12 after it
        table: PathBuf,

        /// Directory that receives one folder of clips per source
        #[clap(short, long, default_value = "socialscribe_clips")]
        output_dir: PathBuf,

        /// Zip file to write
        #[clap(short, long, default_value = "SocialScribe_clips.zip")]
        archive: PathBuf,

        /// Cookies file for yt-dlp
        #[clap(long)]
        cookies: Option<PathBuf>,

        /// Copy codec instead of re-encoding (faster but may be less precise)
        #[clap(long)]
        copy_codec: bool,

        /// Process rows in parallel
        #[clap(long)]
        parallel: bool,

        /// Keep downloaded source videos next to their clips
        #[clap(long)]
        keep_downloads: bool,
    },

    /// Build a Word report with metadata and thumbnails for video URLs
    Report {
        /// Video URLs
        urls: Vec<String>,

        /// Text file with one URL per line
        #[clap(short, long)]
        input: Option<PathBuf>,

        /// Output .docx path
        #[clap(short, long, default_value = DEFAULT_REPORT_FILE)]
        output: PathBuf,

        /// Cookies file for yt-dlp
        #[clap(long)]
        cookies: Option<PathBuf>,

        /// Skip downloading thumbnails
        #[clap(long)]
        no_thumbnails: bool,
    },

    /// Inspect or create the settings file
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as TOML
    Show,
    /// Write default settings if no file exists yet
    Init,
    /// Print where the settings file lives
    Path,
}

fn settings_manager(config_dir: Option<&Path>) -> Result<SettingsManager> {
    match config_dir {
        Some(dir) => Ok(SettingsManager::with_directory(dir)),
        None => SettingsManager::new().context("Could not locate the settings directory"),
    }
}

fn load_settings(config_dir: Option<&Path>) -> Result<Settings> {
    let manager = settings_manager(config_dir)?;
    manager
        .load()
        .with_context(|| format!("Could not load {}", manager.settings_path().display()))
}

fn ytdlp_from(settings: &Settings) -> YtDlp {
    YtDlp {
        binary: settings.ytdlp_path.clone(),
        format: settings.download_format.clone(),
        cookies_file: settings.cookies_file.clone(),
    }
}

fn run_trim(
    mut settings: Settings,
    table_path: &Path,
    output_dir: PathBuf,
    archive: &Path,
    parallel: bool,
) -> Result<()> {
    if !check_ffmpeg() {
        bail!(ToolkitError::FFmpegNotFound);
    }

    let table = read_table(table_path)
        .with_context(|| format!("Could not read {}", table_path.display()))?;
    info!("Read {} row(s) from {}", table.rows.len(), table_path.display());

    let ytdlp = ytdlp_from(&settings);
    if !ytdlp.is_available() {
        warn!("{} not found; only local files can be processed", ytdlp.binary);
    }

    let extractor = FfmpegExtractor {
        copy_codec: settings.copy_codec,
        preset: std::mem::take(&mut settings.preset),
        crf: settings.crf,
    };

    let batch = TrimBatch::new(
        Box::new(MediaResolver::new(ytdlp)),
        Box::new(extractor),
        output_dir,
    )
    .with_parallel(parallel)
    .with_clip_pause(Duration::from_millis(settings.clip_pause_ms))
    .with_keep_downloads(settings.keep_downloads)
    .with_folder_name_limit(settings.folder_name_limit);

    let summary = batch.process(&table)?;

    for row in &summary.rows {
        match &row.status {
            RowStatus::Processed => {}
            RowStatus::Skipped(reason) => info!("Row {} skipped: {}", row.row_number, reason),
            RowStatus::Failed(reason) => eprintln!("Row {} ({}) failed: {}", row.row_number, row.source, reason),
        }
        for job in &row.jobs {
            if let JobOutcome::Failed { output, reason } = job {
                eprintln!("Clip {} failed: {}", output.display(), reason.trim());
            }
        }
    }

    let inputs = summary.archive_inputs();
    let written = build_archive(&summary.output_root, &inputs, archive)
        .with_context(|| format!("Could not write {}", archive.display()))?;

    println!(
        "{} clip(s) created, {} already present, {} failed, {} row(s) failed.",
        summary.produced(),
        summary.skipped(),
        summary.failed_jobs(),
        summary.failed_rows()
    );
    println!(
        "Archive with {} clip(s) saved to {} ({:.1} MB)",
        written,
        archive.display(),
        get_file_size_mb(archive)
    );

    Ok(())
}

fn run_report(
    settings: Settings,
    mut urls: Vec<String>,
    input: Option<&Path>,
    output: &Path,
    thumbnails: bool,
) -> Result<()> {
    if let Some(input) = input {
        let text = fs::read_to_string(input)
            .with_context(|| format!("Could not read {}", input.display()))?;
        urls.extend(parse_url_list(&text));
    }
    let urls: Vec<String> = urls.iter().flat_map(|u| parse_url_list(u)).collect();

    if urls.is_empty() {
        bail!("Please give at least one video URL.");
    }

    let mut generator = ReportGenerator::new(Box::new(ytdlp_from(&settings)));
    if thumbnails {
        match HttpThumbnails::new(Duration::from_secs(settings.thumbnail_timeout_secs)) {
            Ok(fetcher) => generator = generator.with_thumbnails(Box::new(fetcher)),
            Err(e) => warn!("Thumbnails disabled: {}", e),
        }
    }

    println!("Building report for {} URL(s)...", urls.len());
    let entries = generator.collect(&urls)?;
    write_document(&entries, output)
        .with_context(|| format!("Could not write {}", output.display()))?;

    println!("Report with {} entr{} saved to {}", entries.len(), if entries.len() == 1 { "y" } else { "ies" }, output.display());
    Ok(())
}

fn run_config(config_dir: Option<&Path>, action: ConfigAction) -> Result<()> {
    let manager = settings_manager(config_dir)?;

    match action {
        ConfigAction::Show => {
            let settings = manager.load()?;
            print!("{}", settings.to_toml()?);
        }
        ConfigAction::Init => {
            if manager.init()? {
                println!("Wrote default settings to {}", manager.settings_path().display());
            } else {
                println!("Settings already exist at {}", manager.settings_path().display());
            }
        }
        ConfigAction::Path => println!("{}", manager.settings_path().display()),
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Trim { table, output_dir, archive, cookies, copy_codec, parallel, keep_downloads } => {
            let mut settings = load_settings(config_dir)?;
            if cookies.is_some() {
                settings.cookies_file = cookies;
            }
            settings.copy_codec |= copy_codec;
            settings.keep_downloads |= keep_downloads;

            println!("Running trimmer...");
            run_trim(settings, &table, output_dir, &archive, parallel)
        }

        Commands::Report { urls, input, output, cookies, no_thumbnails } => {
            let mut settings = load_settings(config_dir)?;
            if cookies.is_some() {
                settings.cookies_file = cookies;
            }

            run_report(settings, urls, input.as_deref(), &output, !no_thumbnails)
        }

        Commands::Config { action } => run_config(config_dir, action),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
