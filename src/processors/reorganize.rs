//! Depth folder reorganization.
//!
//! The depth folder is moved aside to a temporary folder, a fresh depth folder
//! is created, and each matched depth frame is moved back under a sequential
//! zero-padded name (`000001.png`, `000002.png`, ...) aligned with the color
//! frame index. Depth frames nobody matched are removed with the temporary
//! folder.
//!
//! A matched depth frame can only be missing when a color frame reuses the
//! depth frame of its predecessor, which happens once the depth stream has
//! run out. That is accepted for the final color frame only; the color frame
//! is deleted instead. Anywhere else it aborts the run and leaves the renames
//! done so far in place.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::SyncConfig;
use crate::core::listing::FrameSet;
use crate::processors::association::Associations;

/// Errors that can occur while reorganizing the depth folder.
#[derive(Debug, Error)]
pub enum ReorganizeError {
    #[error("depth directory not found: {0}")]
    MissingDepthDir(PathBuf),

    #[error("temporary directory already exists: {0} (restore it to the depth folder before re-running)")]
    TempDirExists(PathBuf),

    #[error(
        "matched depth frame {expected} is missing for color frame {color_index} of {color_frames}; \
         only the last color frame may be left without a depth frame"
    )]
    InvariantViolation {
        color_index: usize,
        color_frames: usize,
        expected: PathBuf,
    },

    #[error("association for color frame {color_index} points at depth frame {depth_index}, which is not listed")]
    UnknownDepthFrame {
        color_index: usize,
        depth_index: usize,
    },

    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for reorganization operations.
pub type Result<T> = std::result::Result<T, ReorganizeError>;

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> ReorganizeError {
    let path = path.to_path_buf();
    move |source| ReorganizeError::Io {
        action,
        path,
        source,
    }
}

/// A depth frame moved to its synchronized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub color_index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What a reorganization does (or did) to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorganizeOutcome {
    /// Depth frames moved to their sequential names, in color order
    pub moves: Vec<PlannedMove>,
    /// Entries of the depth folder that were never matched, removed with it
    pub discarded: Vec<OsString>,
    /// Color frame deleted because it had no depth frame left
    pub deleted_color: Option<PathBuf>,
}

struct Layout {
    depth_dir: PathBuf,
    temp_dir: PathBuf,
}

fn preflight(root: &Path, config: &SyncConfig) -> Result<Layout> {
    let depth_dir = root.join(&config.folders.depth);
    let temp_dir = root.join(&config.folders.temp);

    if !depth_dir.is_dir() {
        return Err(ReorganizeError::MissingDepthDir(depth_dir));
    }
    if temp_dir.exists() {
        return Err(ReorganizeError::TempDirExists(temp_dir));
    }

    Ok(Layout {
        depth_dir,
        temp_dir,
    })
}

fn depth_file_name(
    frames: &FrameSet,
    color_index: usize,
    depth_index: usize,
) -> Result<OsString> {
    frames
        .depth
        .get(depth_index)
        .and_then(|p| p.file_name())
        .map(|n| n.to_os_string())
        .ok_or(ReorganizeError::UnknownDepthFrame {
            color_index,
            depth_index,
        })
}

fn last_color_or_violation(
    frames: &FrameSet,
    color_index: usize,
    expected: PathBuf,
) -> Result<PathBuf> {
    let color_frames = frames.color.len();
    match frames.color.last() {
        Some(last) if color_index + 1 == color_frames => Ok(last.clone()),
        _ => Err(ReorganizeError::InvariantViolation {
            color_index,
            color_frames,
            expected,
        }),
    }
}

/// Names of every entry in `dir`, sorted.
fn entry_names(dir: &Path, action: &'static str) -> Result<Vec<OsString>> {
    let mut names = fs::read_dir(dir)
        .map_err(io_error(action, dir))?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error(action, dir))?;
    names.sort();
    Ok(names)
}

/// Compute the reorganization without touching the filesystem.
///
/// Performs the same pre-flight checks and invariant checks as
/// [`reorganize`]. Sources in the returned moves point at the current depth
/// folder, and every entry of that folder not moved is reported as discarded.
pub fn plan(
    root: &Path,
    frames: &FrameSet,
    associations: &Associations,
    config: &SyncConfig,
) -> Result<ReorganizeOutcome> {
    let layout = preflight(root, config)?;

    // Everything in the depth folder ends up in the temporary folder
    let mut remaining: HashSet<OsString> = entry_names(&layout.depth_dir, "read depth folder")?
        .into_iter()
        .collect();
    let mut outcome = ReorganizeOutcome::default();

    for assn in associations {
        let name = depth_file_name(frames, assn.color_index, assn.depth_index)?;
        let source = layout.depth_dir.join(&name);
        let destination = layout
            .depth_dir
            .join(config.output.file_name(assn.color_index));

        if remaining.remove(&name) {
            outcome.moves.push(PlannedMove {
                color_index: assn.color_index,
                source,
                destination,
            });
        } else {
            let color = last_color_or_violation(frames, assn.color_index, source)?;
            outcome.deleted_color = Some(color);
        }
    }

    let mut discarded: Vec<OsString> = remaining.into_iter().collect();
    discarded.sort();
    outcome.discarded = discarded;

    Ok(outcome)
}

/// Rename matched depth frames into sequential names, in place.
///
/// Steps, in order:
/// 1. Move the depth folder to the temporary folder (refused if it exists).
/// 2. Create a fresh depth folder.
/// 3. Move each matched frame back as `%06d.png`, numbered from 1.
/// 4. Remove the temporary folder with all unmatched frames.
///
/// # Errors
///
/// Fails before changing anything if the depth folder is missing or the
/// temporary folder already exists. An [`ReorganizeError::InvariantViolation`]
/// or I/O failure after step 1 leaves the dataset partially reorganized.
pub fn reorganize(
    root: &Path,
    frames: &FrameSet,
    associations: &Associations,
    config: &SyncConfig,
) -> Result<ReorganizeOutcome> {
    let layout = preflight(root, config)?;
    let Layout {
        depth_dir,
        temp_dir,
    } = layout;

    fs::rename(&depth_dir, &temp_dir).map_err(io_error("move depth folder", &depth_dir))?;
    if !depth_dir.exists() {
        fs::create_dir_all(&depth_dir).map_err(io_error("create depth folder", &depth_dir))?;
    }

    let mut outcome = ReorganizeOutcome::default();

    for assn in associations {
        let name = depth_file_name(frames, assn.color_index, assn.depth_index)?;
        let temp_name = temp_dir.join(&name);
        let new_name = depth_dir.join(config.output.file_name(assn.color_index));

        debug!("{}", temp_name.display());
        debug!("{}", new_name.display());

        if temp_name.exists() {
            fs::rename(&temp_name, &new_name).map_err(io_error("rename depth frame", &temp_name))?;
            outcome.moves.push(PlannedMove {
                color_index: assn.color_index,
                source: frames.depth_dir.join(&name),
                destination: new_name,
            });
        } else {
            let color = last_color_or_violation(frames, assn.color_index, temp_name)?;
            warn!(
                "No depth frame left for last color frame, deleting {}",
                color.display()
            );
            fs::remove_file(&color).map_err(io_error("delete color frame", &color))?;
            outcome.deleted_color = Some(color);
        }
    }

    outcome.discarded = entry_names(&temp_dir, "read temporary folder")?;

    fs::remove_dir_all(&temp_dir).map_err(io_error("remove temporary folder", &temp_dir))?;

    info!(
        "Renamed {} depth frames, discarded {}",
        outcome.moves.len(),
        outcome.discarded.len()
    );

    Ok(outcome)
}
