//! Reeds-Shepp motion primitives
//!
//! Shortest paths between planar poses for a car that drives forward and
//! backward with a bounded turning radius. A query is solved by normalizing
//! the goal into the start frame, solving each enabled word of the 48-word
//! catalog in closed form, weighting forward and reverse travel, and picking
//! the cheapest word (or keeping them all).
//!
//! - [`ReedsSheppPlanner`]: single queries, paths and sampled courses
//! - [`BatchSolver`]: arrays of pose pairs, serial or on a rayon pool
//! - [`api`]: flat-array entry points over the two above
//!
//! Reference: J. A. Reeds and L. A. Shepp, "Optimal paths for a car that goes
//! both forwards and backwards", Pacific Journal of Mathematics, 1990.

pub mod api;
pub mod batch;
pub mod cost;
pub mod formulas;
pub mod interpolate;
pub mod planner;
pub mod segment;
pub mod solver;
pub mod words;

pub use batch::{configure_global_workers, partition, BatchConfig, BatchSolver, PosePairs, SegmentOutputs, Workers};
pub use cost::{Candidate, CostModel};
pub use interpolate::PathSample;
pub use planner::{Course, ReedsSheppConfig, ReedsSheppPlanner};
pub use segment::{Direction, ReedsSheppPath, Segment, SegmentKind, SegmentLengths, MAX_SEGMENTS};
pub use words::{PathWord, WordFamily, WordMask, NUM_PATH_WORDS};
