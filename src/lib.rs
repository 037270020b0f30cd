//! reeds_shepp - Reeds-Shepp motion primitives in Rust
//!
//! Optimal forward/reverse paths between planar poses for a vehicle with a
//! minimum turning radius: closed-form solving of the 48 classical path
//! words, direction-weighted costs, arc-length interpolation and a
//! parallel batch harness.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D};
pub use common::{ReedsSheppError, ReedsSheppResult};
pub use path_planning::reeds_shepp::{
    api, BatchConfig, BatchSolver, Course, CostModel, Direction, PathWord, ReedsSheppConfig,
    ReedsSheppPath, ReedsSheppPlanner, SegmentKind, WordMask, Workers,
};
