//! Utility modules for reeds_shepp

pub mod visualization;

pub use visualization::{colors, PathStyle, PoseStyle, Visualizer};
