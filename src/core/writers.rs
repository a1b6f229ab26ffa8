//! Association report writer.
//!
//! Writes one CSV row per color frame describing which depth frame it was
//! paired with, so a synchronization run can be audited after the depth files
//! have been renamed.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::listing::FrameSet;
use crate::processors::association::Associations;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// An association points outside the frame lists.
    #[error("association for color frame {color_index} has no matching file")]
    MissingFrame { color_index: usize },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

const REPORT_HEADER: [&str; 7] = [
    "color_index",
    "depth_index",
    "color_timestamp",
    "depth_timestamp",
    "distance",
    "color_file",
    "depth_file",
];

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Write the color/depth pairing to a CSV file.
///
/// File names are written as base names; the color and depth folders are
/// implied by the dataset.
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
/// - An association refers to a frame that is not in `frames`
pub fn write_associations_csv(
    path: &Path,
    frames: &FrameSet,
    associations: &Associations,
) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));

    let path_str = path.display().to_string();

    csv_writer
        .write_record(REPORT_HEADER)
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for assn in associations {
        let color_file = frames
            .color
            .get(assn.color_index)
            .ok_or(WriteError::MissingFrame {
                color_index: assn.color_index,
            })?;
        let depth_file = frames
            .depth
            .get(assn.depth_index)
            .ok_or(WriteError::MissingFrame {
                color_index: assn.color_index,
            })?;

        csv_writer
            .write_record(&[
                assn.color_index.to_string(),
                assn.depth_index.to_string(),
                assn.color_timestamp.to_string(),
                assn.depth_timestamp.to_string(),
                assn.distance.to_string(),
                file_name(color_file),
                file_name(depth_file),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::association::associate;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn create_test_frames() -> FrameSet {
        FrameSet {
            color_dir: PathBuf::from("color"),
            depth_dir: PathBuf::from("depth"),
            color: vec![
                PathBuf::from("color/frame-105.jpg"),
                PathBuf::from("color/frame-205.jpg"),
            ],
            depth: vec![
                PathBuf::from("depth/frame-100.png"),
                PathBuf::from("depth/frame-150.png"),
                PathBuf::from("depth/frame-200.png"),
            ],
        }
    }

    #[test]
    fn test_write_associations_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report").join("associations.csv");
        let frames = create_test_frames();
        let assoc = associate(&[105, 205], &[100, 150, 200]).unwrap();

        write_associations_csv(&path, &frames, &assoc).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], REPORT_HEADER.join(","));
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert_eq!(lines[1], "0,0,105,100,5,frame-105.jpg,frame-100.png");
        assert_eq!(lines[2], "1,2,205,200,5,frame-205.jpg,frame-200.png");
    }

    #[test]
    fn test_write_associations_csv_frame_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("associations.csv");
        let mut frames = create_test_frames();
        frames.depth.truncate(1);
        let assoc = associate(&[105, 205], &[100, 150, 200]).unwrap();

        let result = write_associations_csv(&path, &frames, &assoc);

        match result.unwrap_err() {
            WriteError::MissingFrame { color_index } => assert_eq!(color_index, 1),
            other => panic!("Expected MissingFrame error, got {other:?}"),
        }
    }
}
