//! CLI module for vidtask
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SettingsLayer;
use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

/// vidtask - size-bounded splits, clip extraction and batch runs over ffmpeg
#[derive(Parser, Debug)]
#[command(name = "vidtask")]
#[command(about = "Plan and run download, split and clip tasks with ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Settings file (defaults to ./vidtask.toml when present)
    #[arg(long, global = true, env = "VIDTASK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Worker pool size for parallel batch groups
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Stop starting new tasks after the first failure
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Keep existing outputs; new files get a numeric suffix instead
    #[arg(long, global = true)]
    pub no_overwrite: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given on the command line; unset flags override nothing
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            workers: self.workers,
            fail_fast: self.fail_fast.then_some(true),
            overwrite: self.no_overwrite.then_some(false),
            log_level: self.log_level,
            log_format: self.log_format,
            ..Default::default()
        }
    }
}

fn parse_workers(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, 1024)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every task in a task document
    Run(args::RunArgs),
    /// Load and validate a task document without running it
    Validate(args::ValidateArgs),
    /// Show what the engine reports about a media file
    Probe(args::ProbeArgs),
    /// Split a file into size-bounded segments
    Split(args::SplitArgs),
    /// Extract one or more clips from a file
    Clip(args::ClipArgs),
    /// Download a remote stream to a local file
    Download(args::DownloadArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_become_settings_layer() {
        let cli = Cli::try_parse_from([
            "vidtask",
            "--workers",
            "3",
            "--no-overwrite",
            "validate",
            "--config",
            "tasks.json",
        ])
        .unwrap();

        let layer = cli.settings_layer();
        assert_eq!(layer.workers, Some(3));
        assert_eq!(layer.overwrite, Some(false));
        assert_eq!(layer.fail_fast, None);
    }

    #[test]
    fn test_workers_must_be_positive() {
        let result =
            Cli::try_parse_from(["vidtask", "--workers", "0", "validate", "--config", "t.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clip_accepts_repeated_intervals() {
        let cli = Cli::try_parse_from([
            "vidtask", "clip", "--input", "in.mp4", "--output-name", "c",
            "--interval", "10-20", "--interval", "01:00-01:30",
        ])
        .unwrap();

        match cli.command {
            Commands::Clip(args) => assert_eq!(args.intervals.len(), 2),
            other => panic!("expected clip, got {:?}", other),
        }
    }
}
