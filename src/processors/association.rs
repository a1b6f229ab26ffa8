//! Greedy nearest-timestamp association of color frames to depth frames.
//!
//! A single forward-only depth cursor is shared by all color frames. For each
//! color frame the cursor advances while the timestamp distance does not grow,
//! and the last accepted depth frame becomes the match. Ties go to the later
//! depth frame.
//!
//! Once the cursor has run past the final depth frame, every remaining color
//! frame is matched to that final depth frame again. The reorganizer only
//! tolerates this for the very last color frame.

use log::{debug, warn};
use thiserror::Error;

/// Errors that can occur during association.
#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("cannot associate {color_frames} color frames: no depth frames")]
    NoDepthFrames { color_frames: usize },
}

/// Result type for association operations.
pub type Result<T> = std::result::Result<T, AssociationError>;

/// Forward-only position in the depth frame list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthCursor {
    position: usize,
}

impl DepthCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of depth frames consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every depth frame has been consumed.
    pub fn is_exhausted(&self, depth_len: usize) -> bool {
        self.position >= depth_len
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}

/// The depth frame chosen for one color frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub color_index: usize,
    pub depth_index: usize,
    pub color_timestamp: i64,
    pub depth_timestamp: i64,
    pub distance: u64,
}

/// Associations indexed by color frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Associations(Vec<Association>);

impl Associations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, color_index: usize) -> Option<&Association> {
        self.0.get(color_index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Association> {
        self.0.iter()
    }

    /// Depth index for each color frame, in color order.
    pub fn depth_indices(&self) -> Vec<usize> {
        self.0.iter().map(|a| a.depth_index).collect()
    }

    /// True when depth indices never decrease with the color index.
    pub fn is_monotonic(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[0].depth_index <= pair[1].depth_index)
    }

    /// Number of color frames that reuse the depth frame of their predecessor.
    pub fn repeated(&self) -> usize {
        self.0
            .windows(2)
            .filter(|pair| pair[0].depth_index == pair[1].depth_index)
            .count()
    }
}

impl<'a> IntoIterator for &'a Associations {
    type Item = &'a Association;
    type IntoIter = std::slice::Iter<'a, Association>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Progress bound of the scan: the cursor position compared with the last
/// depth timestamp value, not the list length.
fn past_last_timestamp(position: usize, last_depth_ts: i64) -> bool {
    i64::try_from(position).map_or(true, |p| p > last_depth_ts)
}

/// Advance `cursor` for one color frame and return the matched depth index.
///
/// Returns `None` only when the cursor has never moved, i.e. there are no
/// depth frames at all.
pub fn match_frame(
    cursor: &mut DepthCursor,
    color_index: usize,
    color_ts: i64,
    depth_ts: &[i64],
) -> Option<usize> {
    let last_depth_ts = depth_ts.last().copied().unwrap_or(i64::MIN);
    let mut best_dist = u64::MAX;

    while !cursor.is_exhausted(depth_ts.len()) {
        let dist = depth_ts[cursor.position].abs_diff(color_ts);
        if dist > best_dist {
            break;
        }
        best_dist = dist;
        cursor.advance();

        if past_last_timestamp(cursor.position, last_depth_ts) {
            warn!(
                "Ended at color frame {}, depth frame {}",
                color_index, cursor.position
            );
        }
    }

    cursor.position.checked_sub(1)
}

/// Associate every color frame with a depth frame.
///
/// The result has exactly one entry per color frame and its depth indices
/// never decrease.
///
/// # Errors
///
/// Returns [`AssociationError::NoDepthFrames`] when there are color frames but
/// no depth frames to match them with.
///
/// # Example
///
/// ```
/// use rgbd_sync::processors::association::associate;
///
/// let assoc = associate(&[105, 205, 305], &[100, 200, 300]).unwrap();
/// assert_eq!(assoc.depth_indices(), vec![0, 1, 2]);
/// ```
pub fn associate(color_ts: &[i64], depth_ts: &[i64]) -> Result<Associations> {
    let mut cursor = DepthCursor::new();
    let mut associations = Vec::with_capacity(color_ts.len());

    for (color_index, &color_timestamp) in color_ts.iter().enumerate() {
        let depth_index = match_frame(&mut cursor, color_index, color_timestamp, depth_ts)
            .ok_or(AssociationError::NoDepthFrames {
                color_frames: color_ts.len(),
            })?;
        let depth_timestamp = depth_ts[depth_index];

        debug!(
            "{} {} {} {}",
            color_index, depth_index, depth_timestamp, color_timestamp
        );

        associations.push(Association {
            color_index,
            depth_index,
            color_timestamp,
            depth_timestamp,
            distance: depth_timestamp.abs_diff(color_timestamp),
        });
    }

    Ok(Associations(associations))
}
