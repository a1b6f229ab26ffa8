//! Timestamp extraction from frame file names.
//!
//! Frames are named `<prefix>-<timestamp>.<ext>`, e.g. `frame-1305031102175304.png`.
//! The timestamp is the second token after splitting the base name on `-` and `.`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Token position of the timestamp within the split base name.
const TIMESTAMP_TOKEN: usize = 1;

/// Errors that can occur while extracting timestamps.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("no UTF-8 file name in path: {0}")]
    MissingFileName(PathBuf),

    #[error("file name '{name}' has no timestamp token (expected <prefix>-<timestamp>.<ext>)")]
    MissingToken { name: String },

    #[error("invalid timestamp '{token}' in file name '{name}'")]
    InvalidTimestamp { name: String, token: String },
}

/// Result type for timestamp operations.
pub type Result<T> = std::result::Result<T, TimestampError>;

/// Parse the integer timestamp out of a frame path.
///
/// # Errors
///
/// Fails when the path has no base name, the base name contains neither `-`
/// nor `.`, or the timestamp token is not an integer.
///
/// # Example
///
/// ```
/// use rgbd_sync::core::timestamps::parse_timestamp;
/// use std::path::Path;
///
/// let ts = parse_timestamp(Path::new("depth/frame-000123.png")).unwrap();
/// assert_eq!(ts, 123);
/// ```
pub fn parse_timestamp(path: &Path) -> Result<i64> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TimestampError::MissingFileName(path.to_path_buf()))?;

    let token = name
        .split(&['-', '.'][..])
        .nth(TIMESTAMP_TOKEN)
        .ok_or_else(|| TimestampError::MissingToken {
            name: name.to_string(),
        })?;

    token
        .parse::<i64>()
        .map_err(|_| TimestampError::InvalidTimestamp {
            name: name.to_string(),
            token: token.to_string(),
        })
}

/// Parse timestamps for a whole frame list, stopping at the first bad name.
pub fn parse_timestamps<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<i64>> {
    paths.iter().map(|p| parse_timestamp(p.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp(Path::new("/data/color/frame-1305031102.jpg")).unwrap();
        assert_eq!(ts, 1305031102);
    }

    #[test]
    fn test_parse_timestamp_leading_zeros() {
        let ts = parse_timestamp(Path::new("frame-000042.png")).unwrap();
        assert_eq!(ts, 42);
    }

    #[test]
    fn test_parse_timestamp_extra_tokens() {
        // Only the token after the prefix counts
        let ts = parse_timestamp(Path::new("frame-100-7.png")).unwrap();
        assert_eq!(ts, 100);
    }

    #[test]
    fn test_parse_timestamp_missing_dash_uses_extension() {
        // "frame.png" splits into ["frame", "png"]
        let err = parse_timestamp(Path::new("frame.png")).unwrap_err();
        match err {
            TimestampError::InvalidTimestamp { token, .. } => assert_eq!(token, "png"),
            other => panic!("Expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_timestamp_no_separator() {
        let err = parse_timestamp(Path::new("frame")).unwrap_err();
        assert!(matches!(err, TimestampError::MissingToken { .. }));
    }

    #[test]
    fn test_parse_timestamp_non_numeric() {
        let err = parse_timestamp(Path::new("frame-abc.png")).unwrap_err();
        assert!(matches!(err, TimestampError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_parse_timestamps_stops_on_first_error() {
        let paths = vec![
            PathBuf::from("frame-1.png"),
            PathBuf::from("bad.png"),
            PathBuf::from("frame-3.png"),
        ];
        assert!(parse_timestamps(&paths).is_err());

        let good = vec![PathBuf::from("frame-1.png"), PathBuf::from("frame-3.png")];
        assert_eq!(parse_timestamps(&good).unwrap(), vec![1, 3]);
    }
}
