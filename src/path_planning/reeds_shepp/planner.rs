//! Single-query Reeds-Shepp planner
//!
//! Connects two poses with the cheapest enabled word, or with every enabled
//! word, and samples the result for tracking or plotting.

use log::{info, warn};

use crate::common::{ensure_positive, Pose2D, ReedsSheppError, ReedsSheppResult};
use super::cost::{all_candidates, optimal, CostModel};
use super::interpolate::PathSample;
use super::segment::{Direction, ReedsSheppPath};
use super::words::{PathWord, WordMask};

/// Configuration for the Reeds-Shepp planner
#[derive(Debug, Clone, PartialEq)]
pub struct ReedsSheppConfig {
    /// Minimum turning radius of the vehicle
    pub turning_radius: f64,
    /// Weight applied to forward arc length
    pub forward_cost: f64,
    /// Weight applied to reverse arc length
    pub reverse_cost: f64,
    /// Words the planner may use
    pub enabled: WordMask,
    /// Report only the cheapest word per query
    pub optimal_only: bool,
}

impl Default for ReedsSheppConfig {
    fn default() -> Self {
        Self {
            turning_radius: 1.0,
            forward_cost: 1.0,
            reverse_cost: 1.0,
            enabled: WordMask::all(),
            optimal_only: true,
        }
    }
}

impl ReedsSheppConfig {
    pub fn with_turning_radius(mut self, turning_radius: f64) -> Self {
        self.turning_radius = turning_radius;
        self
    }

    pub fn with_costs(mut self, forward_cost: f64, reverse_cost: f64) -> Self {
        self.forward_cost = forward_cost;
        self.reverse_cost = reverse_cost;
        self
    }

    pub fn with_enabled(mut self, enabled: WordMask) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_optimal_only(mut self, optimal_only: bool) -> Self {
        self.optimal_only = optimal_only;
        self
    }

    pub fn validate(&self) -> ReedsSheppResult<()> {
        self.cost_model().validate()
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.turning_radius, self.forward_cost, self.reverse_cost)
    }

    /// Output slots per pose pair in batch mode
    pub fn paths_per_pair(&self) -> usize {
        if self.optimal_only {
            1
        } else {
            self.enabled.count()
        }
    }
}

/// A path sampled along its arc length
#[derive(Debug, Clone)]
pub struct Course {
    pub path: ReedsSheppPath,
    pub samples: Vec<PathSample>,
}

impl Course {
    pub fn poses(&self) -> impl Iterator<Item = Pose2D> + '_ {
        self.samples.iter().map(|s| s.pose)
    }

    /// Maximal runs of samples driven in the same direction
    ///
    /// Consecutive runs share their cusp sample so plotted runs connect.
    pub fn runs(&self) -> Vec<(Direction, Vec<Pose2D>)> {
        let mut runs: Vec<(Direction, Vec<Pose2D>)> = Vec::new();
        for sample in &self.samples {
            let cusp = match runs.last_mut() {
                Some((direction, poses)) if *direction == sample.direction => {
                    poses.push(sample.pose);
                    continue;
                }
                Some((_, poses)) => poses.last().copied(),
                None => None,
            };
            let mut poses: Vec<Pose2D> = cusp.into_iter().collect();
            poses.push(sample.pose);
            runs.push((sample.direction, poses));
        }
        runs
    }
}

/// Reeds-Shepp planner
#[derive(Debug, Clone)]
pub struct ReedsSheppPlanner {
    config: ReedsSheppConfig,
}

impl ReedsSheppPlanner {
    /// Create a planner, rejecting non-positive radius or cost weights
    pub fn new(config: ReedsSheppConfig) -> ReedsSheppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_turning_radius(turning_radius: f64) -> ReedsSheppResult<Self> {
        Self::new(ReedsSheppConfig::default().with_turning_radius(turning_radius))
    }

    pub fn config(&self) -> &ReedsSheppConfig {
        &self.config
    }

    /// Cheapest path from `start` to `goal` among the enabled words
    pub fn connect(&self, start: &Pose2D, goal: &Pose2D) -> ReedsSheppResult<ReedsSheppPath> {
        ensure_finite(start, goal)?;
        let r = self.config.turning_radius;
        let q = start.relative(goal, r);
        match optimal(&q, self.config.enabled, &self.config.cost_model()) {
            Some(candidate) => {
                let path = candidate.into_path(r);
                info!("Reeds-Shepp: {} found, cost {:.3}", path.word, path.cost);
                Ok(path)
            }
            None => {
                warn!(
                    "Reeds-Shepp: none of the {} enabled words connects the poses",
                    self.config.enabled.count()
                );
                Err(ReedsSheppError::PlanningError(
                    "no enabled path word connects start and goal".to_string(),
                ))
            }
        }
    }

    /// One entry per enabled word in catalog order, `None` where the word has no solution
    pub fn connect_all(
        &self,
        start: &Pose2D,
        goal: &Pose2D,
    ) -> ReedsSheppResult<Vec<(PathWord, Option<ReedsSheppPath>)>> {
        ensure_finite(start, goal)?;
        let r = self.config.turning_radius;
        let q = start.relative(goal, r);
        let model = self.config.cost_model();
        Ok(all_candidates(&q, self.config.enabled, &model)
            .map(|(word, c)| (word, c.map(|c| c.into_path(r))))
            .collect())
    }

    /// Optimal cost, `f64::INFINITY` when no enabled word has a solution
    pub fn distance(&self, start: &Pose2D, goal: &Pose2D) -> ReedsSheppResult<f64> {
        ensure_finite(start, goal)?;
        let q = start.relative(goal, self.config.turning_radius);
        Ok(optimal(&q, self.config.enabled, &self.config.cost_model()).map_or(f64::INFINITY, |c| c.cost))
    }

    /// Optimal path sampled every `step` of arc length
    pub fn plan_course(&self, start: &Pose2D, goal: &Pose2D, step: f64) -> ReedsSheppResult<Course> {
        ensure_positive("step", step)?;
        let path = self.connect(start, goal)?;
        let samples = path.sample_uniform(start, goal, step);
        Ok(Course { path, samples })
    }
}

fn ensure_finite(start: &Pose2D, goal: &Pose2D) -> ReedsSheppResult<()> {
    if start.is_finite() && goal.is_finite() {
        Ok(())
    } else {
        Err(ReedsSheppError::InvalidParameter(
            "start and goal poses must be finite".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_config_default() {
        let config = ReedsSheppConfig::default();
        assert_eq!(config.turning_radius, 1.0);
        assert_eq!(config.enabled, WordMask::all());
        assert_eq!(config.paths_per_pair(), 1);
        assert_eq!(config.with_optimal_only(false).paths_per_pair(), 48);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(ReedsSheppPlanner::with_turning_radius(0.0).is_err());
        assert!(ReedsSheppPlanner::with_turning_radius(f64::NAN).is_err());
        let config = ReedsSheppConfig::default().with_costs(1.0, -2.0);
        assert!(matches!(
            ReedsSheppPlanner::new(config),
            Err(ReedsSheppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_connect_reaches_goal() {
        let planner = ReedsSheppPlanner::with_turning_radius(10.0).unwrap();
        let start = Pose2D::new(-1.0, -4.0, (-20.0f64).to_radians());
        let goal = Pose2D::new(5.0, 5.0, 25.0f64.to_radians());
        let path = planner.connect(&start, &goal).unwrap();
        let (dp, dyaw) = path.end_pose(&start).error_to(&goal);
        assert!(dp < 1e-4, "{}", dp);
        assert!(dyaw < 1e-6);
        assert_relative_eq!(planner.distance(&start, &goal).unwrap(), path.cost);
    }

    #[test]
    fn test_connect_without_words_fails() {
        let config = ReedsSheppConfig::default().with_enabled(WordMask::none());
        let planner = ReedsSheppPlanner::new(config).unwrap();
        let result = planner.connect(&Pose2D::origin(), &Pose2D::new(1.0, 0.0, 0.0));
        assert!(matches!(result, Err(ReedsSheppError::PlanningError(_))));
        assert_eq!(
            planner.distance(&Pose2D::origin(), &Pose2D::new(1.0, 0.0, 0.0)).unwrap(),
            f64::INFINITY
        );
    }

    #[test]
    fn test_connect_all_lists_enabled_words() {
        let planner = ReedsSheppPlanner::with_turning_radius(1.0).unwrap();
        let goal = Pose2D::new(3.0, 1.0, 0.5);
        let all = planner.connect_all(&Pose2D::origin(), &goal).unwrap();
        assert_eq!(all.len(), 48);
        let best = planner.connect(&Pose2D::origin(), &goal).unwrap();
        let min = all
            .iter()
            .filter_map(|(_, p)| p.as_ref())
            .map(|p| p.cost)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(best.cost, min);
    }

    #[test]
    fn test_non_finite_pose_is_rejected() {
        let planner = ReedsSheppPlanner::with_turning_radius(1.0).unwrap();
        let bad = Pose2D::new(f64::NAN, 0.0, 0.0);
        assert!(planner.connect(&Pose2D::origin(), &bad).is_err());
    }

    #[test]
    fn test_course_runs_split_at_cusps() {
        let config = ReedsSheppConfig::default().with_costs(1.0, 1.0);
        let planner = ReedsSheppPlanner::new(config).unwrap();
        // Parallel parking needs at least one reversal
        let goal = Pose2D::new(0.0, 0.6, 0.0);
        let course = planner.plan_course(&Pose2D::origin(), &goal, 0.05).unwrap();
        assert!(course.path.has_reverse());
        let runs = course.runs();
        assert!(runs.len() >= 2);
        for pair in runs.windows(2) {
            assert_ne!(pair[0].0, pair[1].0);
            assert_eq!(pair[0].1.last(), pair[1].1.first());
        }
        assert_eq!(course.poses().last(), Some(goal));
        assert!(course.poses().all(|p| p.yaw >= -PI && p.yaw < PI));
    }
}
