//! Common types used throughout reeds_shepp

use std::f64::consts::{PI, TAU};

use nalgebra::{Isometry2, Vector2, Vector3};

use crate::common::error::{ReedsSheppError, ReedsSheppResult};

/// Wrap an angle to [-pi, pi)
///
/// Angles already inside the range are returned unchanged, bit for bit.
pub fn wrap_to_pi(angle: f64) -> f64 {
    if (-PI..PI).contains(&angle) {
        angle
    } else {
        (angle + PI).rem_euclid(TAU) - PI
    }
}

/// Reduce an angle modulo 2*pi into [-pi, pi]
///
/// Unlike [`wrap_to_pi`], both ends of the interval are reachable, which the
/// closed-form solvers rely on for their sign tests.
pub fn mod2pi(x: f64) -> f64 {
    let v = x % TAU;
    if v < -PI {
        v + TAU
    } else if v > PI {
        v - TAU
    } else {
        v
    }
}

/// Polar coordinates (r, theta) of (x, y)
pub fn polar(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    /// Build a pose from a flattened `(x, y, yaw)` triple
    pub fn from_slice(values: &[f64]) -> ReedsSheppResult<Self> {
        match values {
            [x, y, yaw] => Ok(Self::new(*x, *y, *yaw)),
            _ => Err(ReedsSheppError::DimensionMismatch(format!(
                "a pose needs 3 values, got {}",
                values.len()
            ))),
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.yaw]
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.yaw)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.yaw.is_finite()
    }

    /// Same pose with its heading wrapped to [-pi, pi)
    pub fn normalized(&self) -> Self {
        Self::new(self.x, self.y, wrap_to_pi(self.yaw))
    }

    /// Apply a displacement `(dx, dy, dyaw)` expressed in this pose's frame
    ///
    /// The heading is accumulated without wrapping.
    pub fn compose(&self, dx: f64, dy: f64, dyaw: f64) -> Self {
        let (s, c) = self.yaw.sin_cos();
        Self {
            x: self.x + c * dx - s * dy,
            y: self.y + s * dx + c * dy,
            yaw: self.yaw + dyaw,
        }
    }

    /// Express `goal` in this pose's frame, with distances divided by `scale`
    ///
    /// With `scale` set to the turning radius this is the normalization every
    /// closed-form solver expects: the start sits at the origin facing +x and
    /// the vehicle turns on unit circles.
    pub fn relative(&self, goal: &Pose2D, scale: f64) -> Self {
        debug_assert!(scale > 0.0);
        let dx = goal.x - self.x;
        let dy = goal.y - self.y;
        let (s, c) = self.yaw.sin_cos();
        Self {
            x: (c * dx + s * dy) / scale,
            y: (-s * dx + c * dy) / scale,
            yaw: wrap_to_pi(goal.yaw - self.yaw),
        }
    }

    /// Position and heading distance to another pose, heading difference wrapped
    pub fn error_to(&self, other: &Pose2D) -> (f64, f64) {
        (
            self.position().distance(&other.position()),
            wrap_to_pi(self.yaw - other.yaw).abs(),
        )
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.x, self.y), self.yaw)
    }

    /// Heading comes back in (-pi, pi]
    pub fn from_isometry(iso: &Isometry2<f64>) -> Self {
        Self {
            x: iso.translation.vector.x,
            y: iso.translation.vector.y,
            yaw: iso.rotation.angle(),
        }
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], yaw: v[2] }
    }
}

/// Split a flattened array of `(x, y, yaw)` triples into poses
pub fn poses_from_flat(values: &[f64]) -> ReedsSheppResult<Vec<Pose2D>> {
    if values.len() % 3 != 0 {
        return Err(ReedsSheppError::DimensionMismatch(format!(
            "flattened pose array length {} is not a multiple of 3",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(3)
        .map(|v| Pose2D::new(v[0], v[1], v[2]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_wrap_to_pi() {
        assert_eq!(wrap_to_pi(0.3), 0.3);
        assert_eq!(wrap_to_pi(-PI), -PI);
        assert_relative_eq!(wrap_to_pi(PI), -PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_to_pi(3.0 * PI + 0.5), -PI + 0.5, epsilon = 1e-12);
        assert_relative_eq!(wrap_to_pi(-2.0 * PI - 0.25), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_mod2pi_keeps_both_ends() {
        assert_relative_eq!(mod2pi(PI), PI);
        assert_relative_eq!(mod2pi(-PI), -PI);
        assert_relative_eq!(mod2pi(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(mod2pi(-5.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_in_local_frame() {
        let pose = Pose2D::new(1.0, 2.0, FRAC_PI_2);
        let moved = pose.compose(1.0, 0.0, 0.5);
        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(moved.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(moved.yaw, FRAC_PI_2 + 0.5);
    }

    #[test]
    fn test_compose_matches_isometry_product() {
        let pose = Pose2D::new(-0.7, 4.2, 2.9);
        let composed = pose.compose(0.4, -1.3, 1.1);
        let expected = pose.to_isometry() * Pose2D::new(0.4, -1.3, 1.1).to_isometry();
        let from_iso = Pose2D::from_isometry(&expected);
        let (dp, dyaw) = composed.error_to(&from_iso);
        assert!(dp < 1e-12);
        assert!(dyaw < 1e-12);
    }

    #[test]
    fn test_relative_normalizes_by_scale() {
        let start = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let goal = Pose2D::new(1.0, 5.0, PI);
        let rel = start.relative(&goal, 2.0);
        assert_relative_eq!(rel.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(rel.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rel.yaw, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_poses_from_flat() {
        let poses = poses_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[1], Pose2D::new(3.0, 4.0, 5.0));
        assert!(poses_from_flat(&[0.0, 1.0]).is_err());
        assert!(Pose2D::from_slice(&[1.0, 2.0]).is_err());
    }
}
