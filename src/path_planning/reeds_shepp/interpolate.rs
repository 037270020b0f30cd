//! Arc-length sampling of a solved path

use crate::common::Pose2D;
use super::segment::{Direction, ReedsSheppPath, Segment};

/// One sampled pose with the travel direction at that point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub pose: Pose2D,
    pub direction: Direction,
}

/// Cumulative layout of a segment sequence
struct SegmentTable<'a> {
    segments: &'a [Segment],
    /// Pose at the beginning of each segment
    origins: Vec<Pose2D>,
    /// Cumulative arc length at the end of each segment
    ends: Vec<f64>,
}

impl<'a> SegmentTable<'a> {
    fn new(start: &Pose2D, segments: &'a [Segment], turning_radius: f64) -> Self {
        let mut origins = Vec::with_capacity(segments.len());
        let mut ends = Vec::with_capacity(segments.len());
        let mut pose = *start;
        let mut travelled = 0.0;
        for segment in segments {
            origins.push(pose);
            pose = segment.end_pose(&pose, turning_radius);
            travelled += segment.length;
            ends.push(travelled);
        }
        Self { segments, origins, ends }
    }

    fn total(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    fn first_direction(&self) -> Direction {
        self.segments
            .iter()
            .find(|s| s.length > 0.0)
            .map_or(Direction::Forward, |s| s.direction)
    }

    fn last_direction(&self) -> Direction {
        self.segments
            .iter()
            .rev()
            .find(|s| s.length > 0.0)
            .map_or(Direction::Forward, |s| s.direction)
    }
}

/// Sample the path made of `segments` at the arc lengths in `distances`
///
/// Distances are clamped to the path: anything at or below zero yields
/// `start`, anything at or past the total length yields `goal`. A sample on
/// a segment boundary belongs to the earlier segment. Headings come back
/// wrapped to [-pi, pi).
pub fn interpolate_segments(
    start: &Pose2D,
    goal: &Pose2D,
    segments: &[Segment],
    turning_radius: f64,
    distances: &[f64],
) -> Vec<PathSample> {
    debug_assert!(turning_radius > 0.0);
    let table = SegmentTable::new(start, segments, turning_radius);
    let total = table.total();

    distances
        .iter()
        .map(|&d| {
            if d <= 0.0 {
                return PathSample {
                    pose: start.normalized(),
                    direction: table.first_direction(),
                };
            }
            let found = if d < total {
                table.ends.iter().position(|&end| d <= end)
            } else {
                None
            };
            match found {
                Some(idx) => {
                    let segment = &segments[idx];
                    let begin = table.ends[idx] - segment.length;
                    let local = (d - begin).clamp(0.0, segment.length);
                    PathSample {
                        pose: segment
                            .advance(&table.origins[idx], local, turning_radius)
                            .normalized(),
                        direction: segment.direction,
                    }
                }
                None => PathSample {
                    pose: goal.normalized(),
                    direction: table.last_direction(),
                },
            }
        })
        .collect()
}

/// `n` evenly spaced values from `from` to `to` inclusive
///
/// A single value is placed at `to`.
pub fn linspace(from: f64, to: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![to],
        _ => {
            let step = (to - from) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| from + step * i as f64).collect();
            values[n - 1] = to;
            values
        }
    }
}

impl ReedsSheppPath {
    /// Sample at the given arc lengths, `start` and `goal` being the poses the
    /// path was solved between
    pub fn interpolate(&self, start: &Pose2D, goal: &Pose2D, distances: &[f64]) -> Vec<PathSample> {
        interpolate_segments(start, goal, self.segments(), self.turning_radius, distances)
    }

    /// Sample every `step` of arc length, always ending exactly at `goal`
    pub fn sample_uniform(&self, start: &Pose2D, goal: &Pose2D, step: f64) -> Vec<PathSample> {
        debug_assert!(step > 0.0);
        let total = self.length();
        let mut distances: Vec<f64> = (0..)
            .map(|i| i as f64 * step)
            .take_while(|&d| d < total)
            .collect();
        distances.push(total);
        self.interpolate(start, goal, &distances)
    }
}
