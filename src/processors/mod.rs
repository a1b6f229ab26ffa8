//! Frame association and dataset reorganization.

pub mod association;
pub mod reorganize;
pub mod synchronize;

// Re-export key types for convenience
pub use association::{
    associate, match_frame, Association, AssociationError, Associations, DepthCursor,
};
pub use reorganize::{plan, reorganize, PlannedMove, ReorganizeError, ReorganizeOutcome};
pub use synchronize::{run_synchronization, SyncError, SyncOptions, SyncSummary};
