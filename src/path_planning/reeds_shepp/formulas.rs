// Reeds-Shepp closed-form solvers
//
// Formula numbers follow Reeds & Shepp, "Optimal paths for a car that goes
// both forwards and backwards" (1990), section 8, with the corrections later
// published for 8.3/8.4 and 8.11.
//
// Every solver takes the goal expressed in the start frame and scaled by
// 1/turning_radius, and returns signed segment lengths in path order.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::common::{mod2pi, polar, Pose2D};
use super::segment::{SegmentKind, SegmentLengths, MAX_SEGMENTS};

/// Sign tests tolerate this much round-off
pub(crate) const ZERO: f64 = 10.0 * f64::EPSILON;

fn lengths3(t: f64, u: f64, v: f64) -> SegmentLengths {
    [t, u, v, 0.0, 0.0]
}

fn lengths4(a: f64, b: f64, c: f64, d: f64) -> SegmentLengths {
    [a, b, c, d, 0.0]
}

// 8.1: L+ S+ L+
fn left_straight_left(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let (u, t) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if t < -ZERO {
        return None;
    }
    let v = mod2pi(phi - t);
    (v >= -ZERO).then(|| lengths3(t, u, v))
}

// 8.2: L+ S+ R+
fn left_straight_right(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let (u1, t1) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u1_sq = u1 * u1;
    if u1_sq < 4.0 {
        return None;
    }
    let u = (u1_sq - 4.0).sqrt();
    let t = mod2pi(t1 + 2.0_f64.atan2(u));
    let v = mod2pi(t - phi);
    (t >= -ZERO && v >= -ZERO).then(|| lengths3(t, u, v))
}

// 8.3/8.4: L+ R- L, last arc of either sign
fn left_x_right_left(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 > 4.0 {
        return None;
    }
    let u = -2.0 * (0.25 * u1).asin();
    let t = mod2pi(theta + 0.5 * u + PI);
    let v = mod2pi(phi - t + u);
    (t >= -ZERO && u <= ZERO).then(|| lengths3(t, u, v))
}

/// Shared tail of formulas 8.7 and 8.8
fn tau_omega(u: f64, v: f64, xi: f64, eta: f64, phi: f64) -> (f64, f64) {
    let delta = mod2pi(u - v);
    let a = u.sin() - delta.sin();
    let b = u.cos() - delta.cos() - 1.0;
    let t1 = (eta * a - xi * b).atan2(xi * a + eta * b);
    let t2 = 2.0 * (delta.cos() - v.cos() - u.cos()) + 3.0;
    let tau = if t2 < 0.0 { mod2pi(t1 + PI) } else { mod2pi(t1) };
    let omega = mod2pi(tau - u + v - phi);
    (tau, omega)
}

// 8.7: L+ R+ L- R-
fn left_right_x_left_right(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = 0.25 * (2.0 + xi.hypot(eta));
    if rho > 1.0 {
        return None;
    }
    let u = rho.acos();
    let (t, v) = tau_omega(u, -u, xi, eta, phi);
    (t >= -ZERO && v <= ZERO).then(|| lengths4(t, u, -u, v))
}

// 8.8: L+ R- L- R+
fn left_x_right_left_x_right(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = (20.0 - xi * xi - eta * eta) / 16.0;
    if !(0.0..=1.0).contains(&rho) {
        return None;
    }
    let u = -rho.acos();
    if u < -FRAC_PI_2 {
        return None;
    }
    let (t, v) = tau_omega(u, u, xi, eta, phi);
    (t >= -ZERO && v >= -ZERO).then(|| lengths4(t, u, u, v))
}

// 8.9: L+ R-(pi/2) S- L-
fn left_x_right90_straight_left(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let (rho, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if rho < 2.0 {
        return None;
    }
    let r = (rho * rho - 4.0).sqrt();
    let u = 2.0 - r;
    let t = mod2pi(theta + r.atan2(-2.0));
    let v = mod2pi(phi - FRAC_PI_2 - t);
    (t >= -ZERO && u <= ZERO && v <= ZERO).then(|| lengths4(t, -FRAC_PI_2, u, v))
}

// 8.10: L+ R-(pi/2) S- R-
fn left_x_right90_straight_right(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, theta) = polar(-eta, xi);
    if rho < 2.0 {
        return None;
    }
    let t = theta;
    let u = 2.0 - rho;
    let v = mod2pi(t + FRAC_PI_2 - phi);
    (t >= -ZERO && u <= ZERO && v <= ZERO).then(|| lengths4(t, -FRAC_PI_2, u, v))
}

// 8.11: L+ R-(pi/2) S- L-(pi/2) R+
fn left_x_right90_straight_left90_x_right(x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, _) = polar(xi, eta);
    if rho < 2.0 {
        return None;
    }
    let u = 4.0 - (rho * rho - 4.0).sqrt();
    if u > ZERO {
        return None;
    }
    let t = mod2pi(((4.0 - u) * xi - 2.0 * eta).atan2(-2.0 * xi + (u - 4.0) * eta));
    let v = mod2pi(t - phi);
    (t >= -ZERO && v >= -ZERO).then(|| [t, -FRAC_PI_2, u, -FRAC_PI_2, v])
}

/// Canonical solver a catalog word is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseFormula {
    LpSpLp,
    LpSpRp,
    LpRmL,
    LpRupLumRm,
    LpRumLumRp,
    LpRmSmLm,
    LpRmSmRm,
    LpRmSLmRp,
}

impl BaseFormula {
    pub fn kinds(self) -> [SegmentKind; MAX_SEGMENTS] {
        use SegmentKind::{Left as L, Nop as N, Right as R, Straight as S};
        match self {
            BaseFormula::LpSpLp => [L, S, L, N, N],
            BaseFormula::LpSpRp => [L, S, R, N, N],
            BaseFormula::LpRmL => [L, R, L, N, N],
            BaseFormula::LpRupLumRm | BaseFormula::LpRumLumRp => [L, R, L, R, N],
            BaseFormula::LpRmSmLm => [L, R, S, L, N],
            BaseFormula::LpRmSmRm => [L, R, S, R, N],
            BaseFormula::LpRmSLmRp => [L, R, S, L, R],
        }
    }

    pub fn num_segments(self) -> usize {
        match self {
            BaseFormula::LpSpLp | BaseFormula::LpSpRp | BaseFormula::LpRmL => 3,
            BaseFormula::LpRmSLmRp => 5,
            _ => 4,
        }
    }

    pub fn evaluate(self, x: f64, y: f64, phi: f64) -> Option<SegmentLengths> {
        match self {
            BaseFormula::LpSpLp => left_straight_left(x, y, phi),
            BaseFormula::LpSpRp => left_straight_right(x, y, phi),
            BaseFormula::LpRmL => left_x_right_left(x, y, phi),
            BaseFormula::LpRupLumRm => left_right_x_left_right(x, y, phi),
            BaseFormula::LpRumLumRp => left_x_right_left_x_right(x, y, phi),
            BaseFormula::LpRmSmLm => left_x_right90_straight_left(x, y, phi),
            BaseFormula::LpRmSmRm => left_x_right90_straight_right(x, y, phi),
            BaseFormula::LpRmSLmRp => left_x_right90_straight_left90_x_right(x, y, phi),
        }
    }
}

/// Symmetry mapping a base solution onto a sibling word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    Identity,
    /// Drive every segment in the opposite direction
    Timeflip,
    /// Swap left and right
    Reflect,
    TimeflipReflect,
}

impl Symmetry {
    fn flips_time(self) -> bool {
        matches!(self, Symmetry::Timeflip | Symmetry::TimeflipReflect)
    }

    fn reflects(self) -> bool {
        matches!(self, Symmetry::Reflect | Symmetry::TimeflipReflect)
    }
}

/// How a word's solution is obtained from a base formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    pub base: BaseFormula,
    pub symmetry: Symmetry,
    /// Solve the reversed problem (goal to start) and replay the segments in reverse order
    pub backwards: bool,
}

impl Derivation {
    pub const fn forward(base: BaseFormula, symmetry: Symmetry) -> Self {
        Self { base, symmetry, backwards: false }
    }

    pub const fn backward(base: BaseFormula, symmetry: Symmetry) -> Self {
        Self { base, symmetry, backwards: true }
    }

    /// Segment kinds of the derived word
    pub fn kinds(&self) -> [SegmentKind; MAX_SEGMENTS] {
        let n = self.base.num_segments();
        let mut kinds = self.base.kinds();
        if self.backwards {
            kinds[..n].reverse();
        }
        if self.symmetry.reflects() {
            for k in kinds.iter_mut() {
                *k = k.reflected();
            }
        }
        kinds
    }

    /// Signed lengths for the normalized relative goal `q`, if the base formula has a solution
    pub fn evaluate(&self, q: &Pose2D) -> Option<SegmentLengths> {
        let (mut x, mut y, phi) = (q.x, q.y, q.yaw);
        if self.backwards {
            let (s, c) = phi.sin_cos();
            let xb = x * c + y * s;
            let yb = x * s - y * c;
            x = xb;
            y = yb;
        }
        let (x, y, phi) = match self.symmetry {
            Symmetry::Identity => (x, y, phi),
            Symmetry::Timeflip => (-x, y, -phi),
            Symmetry::Reflect => (x, -y, -phi),
            Symmetry::TimeflipReflect => (-x, -y, phi),
        };

        let mut lengths = self.base.evaluate(x, y, phi)?;
        if self.symmetry.flips_time() {
            for l in lengths.iter_mut() {
                *l = -*l;
            }
        }
        if self.backwards {
            lengths[..self.base.num_segments()].reverse();
        }
        Some(lengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::reeds_shepp::solver::normalized_end_pose as reconstruct;
    use approx::assert_relative_eq;

    #[test]
    fn test_left_straight_left_straight_ahead() {
        // Goal straight ahead: zero arcs and a straight of length 3
        let l = left_straight_left(3.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(l[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(l[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(l[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_left_straight_right_requires_clearance() {
        // Circles closer than 2 radii have no outer LSR tangent
        assert!(left_straight_right(0.0, 0.5, 0.0).is_none());
    }

    #[test]
    fn test_every_base_formula_reconstructs_its_goal() {
        let goals = [
            Pose2D::new(1.0, 2.0, 0.3),
            Pose2D::new(-1.5, 0.5, 2.0),
            Pose2D::new(0.2, -0.3, -1.2),
            Pose2D::new(4.0, 4.0, 3.0),
            Pose2D::new(-3.0, -2.0, -2.5),
            Pose2D::new(0.5, 1.0, PI - 0.1),
        ];
        let bases = [
            BaseFormula::LpSpLp,
            BaseFormula::LpSpRp,
            BaseFormula::LpRmL,
            BaseFormula::LpRupLumRm,
            BaseFormula::LpRumLumRp,
            BaseFormula::LpRmSmLm,
            BaseFormula::LpRmSmRm,
            BaseFormula::LpRmSLmRp,
        ];
        let mut solved = 0;
        for base in bases {
            for goal in &goals {
                if let Some(l) = base.evaluate(goal.x, goal.y, goal.yaw) {
                    let (dp, dyaw) = reconstruct(&base.kinds(), &l).error_to(goal);
                    assert!(dp < 1e-6 && dyaw < 1e-6, "{:?} misses {:?}", base, goal);
                    solved += 1;
                }
            }
        }
        assert!(solved > 0);
    }

    #[test]
    fn test_derivations_reconstruct_their_goal() {
        let goal = Pose2D::new(-2.0, 1.0, 1.0);
        for symmetry in [
            Symmetry::Identity,
            Symmetry::Timeflip,
            Symmetry::Reflect,
            Symmetry::TimeflipReflect,
        ] {
            for backwards in [false, true] {
                let d = Derivation { base: BaseFormula::LpSpLp, symmetry, backwards };
                if let Some(l) = d.evaluate(&goal) {
                    let (dp, dyaw) = reconstruct(&d.kinds(), &l).error_to(&goal);
                    assert!(dp < 1e-6 && dyaw < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_backward_kinds_are_reversed_then_reflected() {
        let d = Derivation::backward(BaseFormula::LpRmSmRm, Symmetry::Reflect);
        use SegmentKind::*;
        assert_eq!(d.kinds(), [Left, Straight, Left, Right, Nop]);
    }
}
