//! Synchronization of unsynchronized RGB-D color and depth frame sequences.
//!
//! This crate provides tools for:
//! - Listing color and depth frames of a dataset in natural order
//! - Parsing capture timestamps out of `frame-<timestamp>.<ext>` file names
//! - Greedy nearest-timestamp association of color frames to depth frames
//! - Renaming matched depth frames to `000001.png, 000002.png, ...` in place
//!
//! # Example
//!
//! ```no_run
//! use rgbd_sync::{core::listing::list_rgbd_files, processors::association::associate};
//! use rgbd_sync::core::timestamps::parse_timestamps;
//! use rgbd_sync::SyncConfig;
//! use std::path::Path;
//!
//! let frames = list_rgbd_files(Path::new("/data/scene0"), &SyncConfig::default()).unwrap();
//! let color_ts = parse_timestamps(&frames.color).unwrap();
//! let depth_ts = parse_timestamps(&frames.depth).unwrap();
//! let associations = associate(&color_ts, &depth_ts).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{ExtensionConfig, FolderConfig, OutputConfig, SyncConfig};
pub use crate::core::listing::FrameSet;
pub use processors::synchronize::{run_synchronization, SyncError, SyncOptions, SyncSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
