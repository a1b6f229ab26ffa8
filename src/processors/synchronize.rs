//! End-to-end synchronization of one RGB-D dataset.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::config::SyncConfig;
use crate::core::listing::{list_rgbd_files, ListingError};
use crate::core::timestamps::{parse_timestamps, TimestampError};
use crate::core::writers::{write_associations_csv, WriteError};
use crate::processors::association::{associate, AssociationError};
use crate::processors::reorganize::{plan, reorganize, ReorganizeError, ReorganizeOutcome};

/// Errors from any stage of a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error(transparent)]
    Report(#[from] WriteError),

    #[error(transparent)]
    Reorganize(#[from] ReorganizeError),
}

/// Per-run switches, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Trace frame lists, associations and renames
    pub debug_mode: bool,
    /// Compute everything but leave the dataset untouched
    pub dry_run: bool,
    /// Where to write the association report CSV
    pub report: Option<PathBuf>,
}

/// Result of a synchronization run.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub color_frames: usize,
    pub depth_frames: usize,
    /// Color frames that share a depth frame with their predecessor
    pub repeated_matches: usize,
    pub outcome: ReorganizeOutcome,
    pub dry_run: bool,
}

impl SyncSummary {
    pub fn renamed(&self) -> usize {
        self.outcome.moves.len()
    }

    pub fn discarded(&self) -> usize {
        self.outcome.discarded.len()
    }
}

fn trace_frames(label: &str, paths: &[PathBuf]) {
    debug!(
        "{} frames: {:?}",
        label,
        paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
    );
}

/// Synchronize the depth frames of the dataset at `root` with its color frames.
///
/// Lists both modalities, parses timestamps from file names, associates each
/// color frame with a depth frame, optionally writes a report, and finally
/// renames the depth frames (or only plans the renames on a dry run).
///
/// # Example
///
/// ```no_run
/// use rgbd_sync::{run_synchronization, SyncConfig, SyncOptions};
/// use std::path::Path;
///
/// let summary = run_synchronization(
///     Path::new("/data/scene0"),
///     &SyncOptions::default(),
///     &SyncConfig::default(),
/// )
/// .unwrap();
/// println!("renamed {} depth frames", summary.renamed());
/// ```
pub fn run_synchronization(
    root: &Path,
    options: &SyncOptions,
    config: &SyncConfig,
) -> Result<SyncSummary, SyncError> {
    let frames = list_rgbd_files(root, config)?;
    if options.debug_mode {
        trace_frames("Depth", &frames.depth);
        trace_frames("Color", &frames.color);
    }

    let depth_ts = parse_timestamps(&frames.depth)?;
    let color_ts = parse_timestamps(&frames.color)?;

    let associations = associate(&color_ts, &depth_ts)?;
    info!(
        "Associated {} color frames with {} depth frames",
        associations.len(),
        frames.depth.len()
    );

    if let Some(report) = &options.report {
        write_associations_csv(report, &frames, &associations)?;
        info!("Wrote association report to {}", report.display());
    }

    let outcome = if options.dry_run {
        plan(root, &frames, &associations, config)?
    } else {
        reorganize(root, &frames, &associations, config)?
    };

    Ok(SyncSummary {
        color_frames: frames.color.len(),
        depth_frames: frames.depth.len(),
        repeated_matches: associations.repeated(),
        outcome,
        dry_run: options.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_dataset(root: &Path, color: &[&str], depth: &[&str]) {
        let color_dir = root.join("color");
        let depth_dir = root.join("depth");
        fs::create_dir_all(&color_dir).unwrap();
        fs::create_dir_all(&depth_dir).unwrap();
        for name in color {
            fs::write(color_dir.join(name), name).unwrap();
        }
        for name in depth {
            fs::write(depth_dir.join(name), name).unwrap();
        }
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_run_synchronization() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_dataset(
            root,
            &["frame-105.jpg", "frame-205.jpg", "frame-305.jpg"],
            &["frame-100.png", "frame-200.png", "frame-300.png"],
        );

        let summary = run_synchronization(root, &SyncOptions::default(), &SyncConfig::default())?;

        assert_eq!(summary.color_frames, 3);
        assert_eq!(summary.depth_frames, 3);
        assert_eq!(summary.renamed(), 3);
        assert_eq!(summary.discarded(), 0);
        assert_eq!(
            listing(&root.join("depth")),
            vec!["000001.png", "000002.png", "000003.png"]
        );
        assert_eq!(fs::read_to_string(root.join("depth/000003.png"))?, "frame-300.png");
        Ok(())
    }

    #[test]
    fn test_run_synchronization_natural_order() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        // Lexicographic order would put frame-1000 before frame-900
        create_dataset(
            root,
            &["frame-905.jpg", "frame-1005.jpg"],
            &["frame-900.png", "frame-1000.png"],
        );

        run_synchronization(root, &SyncOptions::default(), &SyncConfig::default())?;

        assert_eq!(fs::read_to_string(root.join("depth/000001.png"))?, "frame-900.png");
        assert_eq!(fs::read_to_string(root.join("depth/000002.png"))?, "frame-1000.png");
        Ok(())
    }

    #[test]
    fn test_run_synchronization_dry_run_with_report() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_dataset(
            root,
            &["frame-105.jpg", "frame-205.jpg", "frame-305.jpg"],
            &["frame-100.png", "frame-200.png"],
        );
        let report = root.join("out/associations.csv");
        let options = SyncOptions {
            dry_run: true,
            report: Some(report.clone()),
            ..Default::default()
        };

        let summary = run_synchronization(root, &options, &SyncConfig::default())?;

        assert!(summary.dry_run);
        assert_eq!(summary.renamed(), 2);
        assert_eq!(summary.repeated_matches, 1);
        assert!(summary.outcome.deleted_color.is_some());
        assert_eq!(
            listing(&root.join("depth")),
            vec!["frame-100.png", "frame-200.png"]
        );
        assert_eq!(listing(&root.join("color")).len(), 3);

        let content = fs::read_to_string(&report)?;
        assert_eq!(content.lines().count(), 4);
        Ok(())
    }

    #[test]
    fn test_run_synchronization_bad_name_aborts_before_changes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_dataset(
            root,
            &["frame-105.jpg"],
            &["frame-100.png", "frame_oops.png"],
        );

        let err = run_synchronization(root, &SyncOptions::default(), &SyncConfig::default())
            .unwrap_err();

        assert!(matches!(err, SyncError::Timestamp(_)));
        assert_eq!(
            listing(&root.join("depth")),
            vec!["frame-100.png", "frame_oops.png"]
        );
        assert!(!root.join("temp").exists());
    }

    #[test]
    fn test_run_synchronization_missing_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let err = run_synchronization(
            &temp_dir.path().join("missing"),
            &SyncOptions::default(),
            &SyncConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Listing(ListingError::DatasetNotFound(_))));
    }

    #[test]
    fn test_run_synchronization_no_depth_frames() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_dataset(root, &["frame-105.jpg"], &[]);

        let err = run_synchronization(root, &SyncOptions::default(), &SyncConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Association(AssociationError::NoDepthFrames { .. })
        ));
    }
}
