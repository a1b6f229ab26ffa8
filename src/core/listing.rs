//! RGB-D dataset file listing.
//!
//! A dataset root holds one color folder (`image/`, `rgb/` or `color/`, first
//! match wins) and one `depth/` folder. Frames in each folder are filtered by
//! extension and sorted naturally, so `frame-9.png` comes before `frame-10.png`.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use thiserror::Error;

use crate::config::{FolderConfig, SyncConfig};

/// Errors that can occur while listing dataset files.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("dataset directory not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("no color folder (tried {candidates:?}) in {root}")]
    NoColorFolder { root: PathBuf, candidates: Vec<String> },

    #[error("no depth folder '{name}' in {root}")]
    NoDepthFolder { root: PathBuf, name: String },

    #[error("failed to read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;

/// Sorted color and depth frame paths of one dataset.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    pub color_dir: PathBuf,
    pub depth_dir: PathBuf,
    pub color: Vec<PathBuf>,
    pub depth: Vec<PathBuf>,
}

impl FrameSet {
    /// True when neither modality has any frames.
    pub fn is_empty(&self) -> bool {
        self.color.is_empty() && self.depth.is_empty()
    }
}

/// One run of a file name: either text or a digit sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Text(String),
    /// Digits with leading zeros stripped, compared by numeric value
    Number(String),
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Number(a), Chunk::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Less,
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn digit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"))
}

/// Split a name into alternating text and number chunks.
///
/// The result always starts with a (possibly empty) text chunk, so keys of two
/// names line up chunk by chunk.
fn alphanum_key(name: &str) -> Vec<Chunk> {
    let mut key = Vec::new();
    let mut last = 0;

    for m in digit_pattern().find_iter(name) {
        key.push(Chunk::Text(name[last..m.start()].to_string()));
        let digits = m.as_str().trim_start_matches('0');
        key.push(Chunk::Number(digits.to_string()));
        last = m.end();
    }
    key.push(Chunk::Text(name[last..].to_string()));

    key
}

fn file_name_key(path: &Path) -> Vec<Chunk> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    alphanum_key(&name)
}

/// Sort paths by file name, comparing digit runs numerically.
pub fn natural_sort(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| file_name_key(p));
}

/// List regular files in `dir` whose extension is exactly `extension`
/// (including the leading dot), naturally sorted.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ListingError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()) == extension)
                    .unwrap_or(false)
        })
        .collect();

    natural_sort(&mut files);
    Ok(files)
}

/// Resolve the color and depth folders under a dataset root.
pub fn find_rgbd_folders(root: &Path, folders: &FolderConfig) -> Result<(PathBuf, PathBuf)> {
    if !root.is_dir() {
        return Err(ListingError::DatasetNotFound(root.to_path_buf()));
    }

    let color_dir = folders
        .color_candidates
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_dir())
        .ok_or_else(|| ListingError::NoColorFolder {
            root: root.to_path_buf(),
            candidates: folders.color_candidates.clone(),
        })?;

    let depth_dir = root.join(&folders.depth);
    if !depth_dir.is_dir() {
        return Err(ListingError::NoDepthFolder {
            root: root.to_path_buf(),
            name: folders.depth.clone(),
        });
    }

    Ok((color_dir, depth_dir))
}

/// List the color and depth frames of a dataset.
///
/// Color frames are grouped by extension in configured order (all `.jpg`
/// first, then all `.png` by default), each group sorted on its own.
pub fn list_rgbd_files(root: &Path, config: &SyncConfig) -> Result<FrameSet> {
    let (color_dir, depth_dir) = find_rgbd_folders(root, &config.folders)?;

    let mut color = Vec::new();
    for ext in &config.extensions.color {
        color.extend(list_files(&color_dir, ext)?);
    }

    let mut depth = Vec::new();
    for ext in &config.extensions.depth {
        depth.extend(list_files(&depth_dir, ext)?);
    }

    debug!(
        "Listed {} color frames in {}, {} depth frames in {}",
        color.len(),
        color_dir.display(),
        depth.len(),
        depth_dir.display()
    );

    Ok(FrameSet {
        color_dir,
        depth_dir,
        color,
        depth,
    })
}
