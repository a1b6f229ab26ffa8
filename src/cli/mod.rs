//! Command-line interface for RGB-D frame synchronization.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processors::synchronize::{run_synchronization, SyncOptions, SyncSummary};
use crate::SyncConfig;

#[derive(Parser, Debug)]
#[command(name = "rgbd-sync")]
#[command(about = "Synchronize color and depth images", version)]
pub struct Cli {
    /// Path to the dataset
    dataset: PathBuf,

    /// Turn on debug mode
    #[arg(long = "debug_mode")]
    debug_mode: bool,

    /// Path to YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Preview changes without renaming or deleting files
    #[arg(long)]
    dry_run: bool,

    /// Write the color/depth associations to this CSV file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn log_level(&self) -> log::LevelFilter {
        if self.debug_mode {
            return log::LevelFilter::Debug;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    fn options(&self) -> SyncOptions {
        SyncOptions {
            debug_mode: self.debug_mode,
            dry_run: self.dry_run,
            report: self.report.clone(),
        }
    }
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 38 {
            format!("{}...", value.chars().take(35).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<38} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

fn summary_items(
    dataset: &Path,
    summary: &SyncSummary,
    start: Instant,
) -> Vec<(&'static str, String)> {
    let deleted = summary
        .outcome
        .deleted_color
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "none".to_string());

    vec![
        ("Dataset", dataset.display().to_string()),
        ("Color frames", summary.color_frames.to_string()),
        ("Depth frames", summary.depth_frames.to_string()),
        ("Depth renamed", summary.renamed().to_string()),
        ("Depth discarded", summary.discarded().to_string()),
        ("Color deleted", deleted),
        ("Dry run", summary.dry_run.to_string()),
        ("Duration", format!("{:.2?}", start.elapsed())),
    ]
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging first; debug mode traces to stdout
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level()).format_timestamp_secs();
    if cli.debug_mode {
        builder.target(env_logger::Target::Stdout);
    }
    builder.init();

    // Load config
    let config = match &cli.config {
        Some(path) => match SyncConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {:#}, using defaults",
                    path.display(),
                    e
                );
                SyncConfig::default()
            }
        },
        None => SyncConfig::default(),
    };

    cmd_synchronize(&cli, &config);
}

fn cmd_synchronize(cli: &Cli, config: &SyncConfig) {
    let start = Instant::now();

    if cli.dry_run {
        println!("DRY RUN: No files will be renamed or deleted");
    }

    // The spinner would garble debug tracing on stdout
    let spinner =
        (!cli.debug_mode).then(|| create_spinner("Synchronizing color and depth frames..."));

    let result = run_synchronization(&cli.dataset, &cli.options(), config);

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(summary) => {
            let title = if summary.dry_run {
                "Synchronization Plan"
            } else {
                "Synchronization Complete"
            };
            print_summary(title, &summary_items(&cli.dataset, &summary, start));
        }
        Err(e) => {
            error!("Synchronization failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::try_parse_from(["rgbd-sync", "/data/scene0"]).unwrap();
        assert_eq!(cli.dataset, PathBuf::from("/data/scene0"));
        assert!(!cli.debug_mode);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_parse_debug_mode_flag() {
        let cli = Cli::try_parse_from(["rgbd-sync", "/data/scene0", "--debug_mode"]).unwrap();
        assert!(cli.debug_mode);
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        assert!(cli.options().debug_mode);
    }

    #[test]
    fn test_parse_extra_options() {
        let cli = Cli::try_parse_from([
            "rgbd-sync",
            "/data/scene0",
            "-v",
            "--dry-run",
            "--report",
            "assoc.csv",
            "-c",
            "sync.yaml",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
        let options = cli.options();
        assert!(options.dry_run);
        assert_eq!(options.report, Some(PathBuf::from("assoc.csv")));
        assert_eq!(cli.config, Some(PathBuf::from("sync.yaml")));
    }

    #[test]
    fn test_missing_dataset_is_rejected() {
        assert!(Cli::try_parse_from(["rgbd-sync"]).is_err());
    }
}
