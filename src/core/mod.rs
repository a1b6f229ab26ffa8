//! Core dataset I/O: file listing, timestamp parsing, and report writing.

pub mod listing;
pub mod timestamps;
pub mod writers;

pub use listing::{list_rgbd_files, natural_sort, FrameSet, ListingError};
pub use timestamps::{parse_timestamp, parse_timestamps, TimestampError};
pub use writers::{write_associations_csv, WriteError};
