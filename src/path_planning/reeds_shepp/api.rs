//! Flat-array entry points
//!
//! Poses are flattened `(x, y, yaw)` triples and per-segment data is laid out
//! five slots per path. Every function checks its slice lengths and
//! parameters once, up front, and never panics on caller input.

use crate::common::{ensure_positive, Pose2D, ReedsSheppError, ReedsSheppResult};
use super::batch::{BatchConfig, BatchSolver, PosePairs, SegmentOutputs};
use super::interpolate::{self, linspace};
use super::planner::{ReedsSheppConfig, ReedsSheppPlanner};
use super::segment::{Direction, Segment, SegmentKind};
use super::words::WordMask;

/// Solve every start/goal pair and write distance, signed segment lengths
/// and segment type codes into `outputs`
///
/// `enabled` carries one flag per catalog word. `num_disabled` must equal the
/// number of `false` flags, and `num_paths` must be 1 when `optimal_only` is
/// set and the number of enabled words otherwise.
#[allow(clippy::too_many_arguments)]
pub fn solve_segments(
    start_poses: &[f64],
    goal_poses: &[f64],
    turning_radius: f64,
    forward_cost: f64,
    reverse_cost: f64,
    enabled: &[bool],
    num_disabled: usize,
    num_paths: usize,
    optimal_only: bool,
    batch: &BatchConfig,
    outputs: SegmentOutputs<'_>,
) -> ReedsSheppResult<()> {
    let mask = WordMask::from_enabled_flags(enabled)?;
    let disabled = enabled.len() - mask.count();
    if disabled != num_disabled {
        return Err(ReedsSheppError::InvalidParameter(format!(
            "{} words flagged as disabled but {} declared",
            disabled, num_disabled
        )));
    }
    let config = ReedsSheppConfig::default()
        .with_turning_radius(turning_radius)
        .with_costs(forward_cost, reverse_cost)
        .with_enabled(mask)
        .with_optimal_only(optimal_only);
    if config.paths_per_pair() != num_paths {
        return Err(ReedsSheppError::DimensionMismatch(format!(
            "{} paths per pair requested, configuration yields {}",
            num_paths,
            config.paths_per_pair()
        )));
    }

    let pairs = PosePairs::from_flat(start_poses, goal_poses)?;
    BatchSolver::new(config, *batch)?.solve_segments(&pairs, outputs)
}

/// Optimal cost of every pair over all words, forward cost 1
pub fn solve_distance(
    start_poses: &[f64],
    goal_poses: &[f64],
    turning_radius: f64,
    reverse_cost: f64,
    batch: &BatchConfig,
    distance: &mut [f64],
) -> ReedsSheppResult<()> {
    let config = ReedsSheppConfig::default()
        .with_turning_radius(turning_radius)
        .with_costs(1.0, reverse_cost);
    let pairs = PosePairs::from_flat(start_poses, goal_poses)?;
    BatchSolver::new(config, *batch)?.solve_distances(&pairs, distance)
}

/// Solve the optimal path and sample `num_steps` evenly spaced poses over
/// its first `max_distance` of arc length
///
/// Returns `num_steps` flattened poses. A single step samples the end of the
/// covered span.
pub fn interpolate_path(
    start_pose: [f64; 3],
    goal_pose: [f64; 3],
    max_distance: f64,
    num_steps: usize,
    turning_radius: f64,
    reverse_cost: f64,
) -> ReedsSheppResult<Vec<f64>> {
    if max_distance.is_nan() || max_distance < 0.0 {
        return Err(ReedsSheppError::InvalidParameter(format!(
            "max_distance must be >= 0, got {}",
            max_distance
        )));
    }
    let config = ReedsSheppConfig::default()
        .with_turning_radius(turning_radius)
        .with_costs(1.0, reverse_cost);
    let planner = ReedsSheppPlanner::new(config)?;
    let start = Pose2D::from(start_pose);
    let goal = Pose2D::from(goal_pose);
    let path = planner.connect(&start, &goal)?;

    let distances = linspace(0.0, max_distance.min(path.length()), num_steps);
    Ok(path
        .interpolate(&start, &goal, &distances)
        .iter()
        .flat_map(|s| s.pose.to_array())
        .collect())
}

/// Sample an already solved path at the arc lengths in `samples`
///
/// The path is given as unsigned `lengths`, direction codes (+1 / -1) and
/// segment type codes, one entry per segment. `Nop` segments are skipped.
/// Writes `samples.len()` flattened poses into `poses_out` and the travel
/// direction at each sample (+1.0 / -1.0) into `directions_out`.
#[allow(clippy::too_many_arguments)]
pub fn interpolate_segments(
    start_pose: [f64; 3],
    goal_pose: [f64; 3],
    samples: &[f64],
    turning_radius: f64,
    lengths: &[f64],
    directions: &[i32],
    types: &[u32],
    poses_out: &mut [f64],
    directions_out: &mut [f64],
) -> ReedsSheppResult<()> {
    ensure_positive("turning_radius", turning_radius)?;
    if lengths.len() != directions.len() || lengths.len() != types.len() {
        return Err(ReedsSheppError::DimensionMismatch(format!(
            "segment arrays disagree: {} lengths, {} directions, {} types",
            lengths.len(),
            directions.len(),
            types.len()
        )));
    }
    if poses_out.len() != samples.len() * 3 || directions_out.len() != samples.len() {
        return Err(ReedsSheppError::DimensionMismatch(format!(
            "{} samples need {} pose values and {} directions, got {} and {}",
            samples.len(),
            samples.len() * 3,
            samples.len(),
            poses_out.len(),
            directions_out.len()
        )));
    }
    let segments = segments_from_codes(lengths, directions, types)?;

    let sampled = interpolate::interpolate_segments(
        &Pose2D::from(start_pose),
        &Pose2D::from(goal_pose),
        &segments,
        turning_radius,
        samples,
    );
    for ((sample, pose), direction) in sampled
        .iter()
        .zip(poses_out.chunks_exact_mut(3))
        .zip(directions_out.iter_mut())
    {
        pose.copy_from_slice(&sample.pose.to_array());
        *direction = sample.direction.sign();
    }
    Ok(())
}

fn segments_from_codes(
    lengths: &[f64],
    directions: &[i32],
    types: &[u32],
) -> ReedsSheppResult<Vec<Segment>> {
    let mut segments = Vec::with_capacity(lengths.len());
    for ((&length, &direction), &kind) in lengths.iter().zip(directions).zip(types) {
        let kind = SegmentKind::from_code(kind)?;
        if kind == SegmentKind::Nop {
            continue;
        }
        if !(length.is_finite() && length >= 0.0) {
            return Err(ReedsSheppError::InvalidParameter(format!(
                "segment length must be finite and >= 0, got {}",
                length
            )));
        }
        segments.push(Segment::new(kind, length, Direction::from_code(direction)?));
    }
    Ok(segments)
}
