//! Common types and error definitions for reeds_shepp
//!
//! This module provides the pose geometry and the error type shared by
//! the solver, the interpolator and the batch harness.

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
