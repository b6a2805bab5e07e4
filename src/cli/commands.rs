//! Command implementations
//!
//! Each command returns `Ok(true)` when everything it ran succeeded and
//! `Ok(false)` when it ran but some task failed. Errors are reserved for
//! problems that stop the command before or outside task execution.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use crate::adapters::task_file::is_supported_url;
use crate::adapters::TaskFileAdapter;
use crate::app::AppContainer;
use crate::cli::args::{ClipArgs, DownloadArgs, ProbeArgs, RunArgs, SplitArgs, ValidateArgs};
use crate::cli::Commands;
use crate::config::Settings;
use crate::domain::model::*;
use crate::output::render_summary;
use crate::utils::path::PathUtils;
use crate::utils::size::SizeParser;
use crate::utils::time::TimeParser;
use crate::utils::Utils;

const DEFAULT_EXTENSION: &str = "mp4";

/// Dispatch a parsed command
pub async fn execute(command: Commands, settings: &Settings) -> Result<bool> {
    match command {
        Commands::Run(args) => run(args, settings).await,
        Commands::Validate(args) => validate(args),
        Commands::Probe(args) => probe(args, settings).await,
        Commands::Split(args) => split(args, settings).await,
        Commands::Clip(args) => clip(args, settings).await,
        Commands::Download(args) => download(args, settings).await,
    }
}

/// Execute the run command
pub async fn run(args: RunArgs, settings: &Settings) -> Result<bool> {
    let document = TaskFileAdapter::load(&args.config)
        .with_context(|| format!("Failed to load task document {}", args.config.display()))?;

    let container = AppContainer::new(settings);
    let orchestrator = container
        .orchestrator()
        .context("Failed to create the worker pool")?;
    info!(
        tasks = document.total_tasks(),
        workers = orchestrator.workers(),
        policy = ?orchestrator.policy(),
        "Starting run"
    );

    let result = orchestrator
        .run_document(&document)
        .await
        .context("Run aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_summary(&result));
    }
    Ok(result.overall_success)
}

/// Execute the validate command
pub fn validate(args: ValidateArgs) -> Result<bool> {
    let document = TaskFileAdapter::load(&args.config)
        .with_context(|| format!("Invalid task document {}", args.config.display()))?;

    println!(
        "{}: {} tasks ({} ordered, {} batch groups)",
        args.config.display(),
        document.total_tasks(),
        document.ordered.len(),
        document.groups.len()
    );
    for ordered in &document.ordered {
        println!("  [order {}] {}", ordered.order, ordered.task.label());
    }
    for (index, group) in document.groups.iter().enumerate() {
        let mode = if group.is_parallel() { "parallel" } else { "sequential" };
        println!(
            "  [group {}] {} {} tasks, {}, in {}",
            index + 1,
            group.len(),
            group.kind(),
            mode,
            group.path().display()
        );
        for task in group.tasks() {
            println!("    {}", task.label());
        }
    }
    Ok(true)
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, settings: &Settings) -> Result<bool> {
    let container = AppContainer::new(settings);
    let info = container
        .task_interactor()
        .inspect(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(true);
    }

    println!("File:     {}", args.input.display());
    println!(
        "Duration: {}",
        TimeParser::format_time(info.duration_seconds)
    );
    println!("Size:     {}", Utils::format_file_size(info.size_bytes));
    println!("Bitrate:  {:.0} kb/s", info.average_bitrate_bps / 1000.0);
    if let Some(format) = &info.format_name {
        println!("Format:   {}", format);
    }
    if let Some(codec) = &info.video_codec {
        match (info.width, info.height) {
            (Some(w), Some(h)) => println!("Video:    {} {}x{}", codec, w, h),
            _ => println!("Video:    {}", codec),
        }
    }
    if let Some(codec) = &info.audio_codec {
        println!("Audio:    {}", codec);
    }
    Ok(true)
}

/// Execute the split command
pub async fn split(args: SplitArgs, settings: &Settings) -> Result<bool> {
    let max_size_bytes = SizeParser::parse_size(&args.max_size)?;
    if max_size_bytes == 0 {
        bail!("--max-size must be greater than zero");
    }

    let (output_base, output_extension) =
        output_target(&args.output_name, args.ext.as_deref(), &args.input);
    let task = Task::Split(SplitParams {
        source: args.input,
        output_base,
        output_extension,
        max_size_bytes,
    });
    run_single(task, settings).await
}

/// Execute the clip command
pub async fn clip(args: ClipArgs, settings: &Settings) -> Result<bool> {
    let intervals = args
        .intervals
        .iter()
        .map(|raw| TimeParser::parse_interval(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let (output_base, output_extension) =
        output_target(&args.output_name, args.ext.as_deref(), &args.input);
    let task = Task::Clip(ClipParams {
        source: args.input,
        output_base,
        output_extension,
        intervals,
        codecs: CodecChoice::from_names(args.video_codec.as_deref(), args.audio_codec.as_deref()),
    });
    run_single(task, settings).await
}

/// Execute the download command
pub async fn download(args: DownloadArgs, settings: &Settings) -> Result<bool> {
    if !is_supported_url(&args.url) {
        bail!("Invalid URL '{}': expected http or https", args.url);
    }

    let task = Task::Download(DownloadParams {
        url: args.url,
        output: args.output,
    });
    run_single(task, settings).await
}

async fn run_single(task: Task, settings: &Settings) -> Result<bool> {
    let started_at = Utc::now();
    let container = AppContainer::new(settings);
    let result = container.task_interactor().run_task(&task).await;

    let batch = BatchResult::new(vec![result], RunState::Completed, started_at);
    println!("{}", render_summary(&batch));
    Ok(batch.overall_success)
}

/// Split `--output-name` into a numbering base and an extension.
///
/// The extension comes from `--ext`, else the output name itself, else the
/// input, else mp4.
fn output_target(output_name: &Path, explicit: Option<&str>, input: &Path) -> (PathBuf, String) {
    let (base, named) = PathUtils::split_extension(output_name);
    let extension = explicit
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .or(named)
        .or_else(|| PathUtils::get_extension(input))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    (base, extension)
}
