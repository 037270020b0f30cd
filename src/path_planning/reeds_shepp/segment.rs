//! Segments and paths produced by the Reeds-Shepp solver

use std::fmt;

use crate::common::{Pose2D, ReedsSheppError, ReedsSheppResult};
use super::words::PathWord;

/// Longest word in the catalog has five segments
pub const MAX_SEGMENTS: usize = 5;

/// Signed segment lengths of one candidate, in turning-radius units
///
/// Positive entries are driven forward, negative entries backward. Slots past
/// the word's segment count are zero.
pub type SegmentLengths = [f64; MAX_SEGMENTS];

/// Steering of a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Unused slot of a word shorter than five segments
    Nop,
    Left,
    Straight,
    Right,
}

impl SegmentKind {
    /// Numeric code used by the flat-array API
    pub fn code(self) -> u32 {
        match self {
            SegmentKind::Nop => 0,
            SegmentKind::Left => 1,
            SegmentKind::Straight => 2,
            SegmentKind::Right => 3,
        }
    }

    pub fn from_code(code: u32) -> ReedsSheppResult<Self> {
        match code {
            0 => Ok(SegmentKind::Nop),
            1 => Ok(SegmentKind::Left),
            2 => Ok(SegmentKind::Straight),
            3 => Ok(SegmentKind::Right),
            _ => Err(ReedsSheppError::InvalidParameter(format!(
                "unknown segment type code {}",
                code
            ))),
        }
    }

    /// Mirror image across the vehicle's longitudinal axis
    pub fn reflected(self) -> Self {
        match self {
            SegmentKind::Left => SegmentKind::Right,
            SegmentKind::Right => SegmentKind::Left,
            other => other,
        }
    }

    pub fn letter(self) -> char {
        match self {
            SegmentKind::Nop => 'N',
            SegmentKind::Left => 'L',
            SegmentKind::Straight => 'S',
            SegmentKind::Right => 'R',
        }
    }

    /// Displacement `(dx, dy, dyaw)` in the local frame after travelling the
    /// signed arc length `s` on a circle of radius `turning_radius`
    pub fn displacement(self, s: f64, turning_radius: f64) -> (f64, f64, f64) {
        match self {
            SegmentKind::Nop => (0.0, 0.0, 0.0),
            SegmentKind::Straight => (s, 0.0, 0.0),
            SegmentKind::Left | SegmentKind::Right => {
                let phi = s / turning_radius;
                // r * (1 - cos(phi)), without the cancellation for small phi
                let lateral = 2.0 * turning_radius * (0.5 * phi).sin().powi(2);
                let forward = turning_radius * phi.sin();
                if self == SegmentKind::Left {
                    (forward, lateral, phi)
                } else {
                    (forward, -lateral, -phi)
                }
            }
        }
    }
}

/// Travel direction of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    /// Numeric code used by the flat-array API: +1 forward, -1 backward
    pub fn code(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    pub fn from_code(code: i32) -> ReedsSheppResult<Self> {
        match code {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Backward),
            _ => Err(ReedsSheppError::InvalidParameter(format!(
                "segment direction must be +1 or -1, got {}",
                code
            ))),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// One constant-curvature piece of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Arc length in world units, always >= 0
    pub length: f64,
    pub direction: Direction,
}

impl Segment {
    pub fn new(kind: SegmentKind, length: f64, direction: Direction) -> Self {
        debug_assert!(length >= 0.0);
        Self { kind, length, direction }
    }

    pub fn nop() -> Self {
        Self::new(SegmentKind::Nop, 0.0, Direction::Forward)
    }

    pub fn signed_length(&self) -> f64 {
        self.direction.sign() * self.length
    }

    /// Pose reached after travelling `distance` (0..=length) along this segment from `pose`
    pub fn advance(&self, pose: &Pose2D, distance: f64, turning_radius: f64) -> Pose2D {
        let (dx, dy, dyaw) = self
            .kind
            .displacement(self.direction.sign() * distance, turning_radius);
        pose.compose(dx, dy, dyaw)
    }

    pub fn end_pose(&self, pose: &Pose2D, turning_radius: f64) -> Pose2D {
        self.advance(pose, self.length, turning_radius)
    }
}

/// A solved Reeds-Shepp path in world units
#[derive(Debug, Clone, PartialEq)]
pub struct ReedsSheppPath {
    pub word: PathWord,
    /// Unused trailing slots hold `Segment::nop()`
    pub segments: [Segment; MAX_SEGMENTS],
    /// Direction-weighted length
    pub cost: f64,
    pub turning_radius: f64,
}

impl ReedsSheppPath {
    /// Materialize normalized signed lengths of `word` into world-unit segments
    ///
    /// Directions come from the word's pattern, so a `-0.0` or round-off
    /// negative length in a forward slot stays a forward segment.
    pub fn from_normalized(
        word: PathWord,
        lengths: &SegmentLengths,
        turning_radius: f64,
        cost: f64,
    ) -> Self {
        let kinds = word.kinds();
        let directions = word.directions();
        let mut segments = [Segment::nop(); MAX_SEGMENTS];
        for (i, segment) in segments.iter_mut().enumerate() {
            if let Some(direction) = directions[i] {
                *segment = Segment::new(kinds[i], lengths[i].abs() * turning_radius, direction);
            }
        }
        Self {
            word,
            segments,
            cost,
            turning_radius,
        }
    }

    /// Segments actually used by the word
    pub fn segments(&self) -> &[Segment] {
        &self.segments[..self.word.num_segments()]
    }

    /// Total arc length in world units
    pub fn length(&self) -> f64 {
        self.segments().iter().map(|s| s.length).sum()
    }

    pub fn has_reverse(&self) -> bool {
        self.segments()
            .iter()
            .any(|s| s.direction == Direction::Backward && s.length > 0.0)
    }

    /// Lengths with the travel direction folded into the sign
    pub fn signed_lengths(&self) -> [f64; MAX_SEGMENTS] {
        let mut out = [0.0; MAX_SEGMENTS];
        for (o, s) in out.iter_mut().zip(self.segments.iter()) {
            *o = s.signed_length();
        }
        out
    }

    pub fn kind_codes(&self) -> [u32; MAX_SEGMENTS] {
        let mut out = [0; MAX_SEGMENTS];
        for (o, s) in out.iter_mut().zip(self.segments.iter()) {
            *o = s.kind.code();
        }
        out
    }

    /// Pose reached by driving every segment from `start`
    pub fn end_pose(&self, start: &Pose2D) -> Pose2D {
        self.segments()
            .iter()
            .fold(*start, |pose, s| s.end_pose(&pose, self.turning_radius))
    }
}

impl fmt::Display for ReedsSheppPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.word)?;
        for (i, s) in self.segments().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", s.signed_length())?;
        }
        write!(f, "] cost {:.3}", self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_segment_codes_round_trip() {
        for kind in [SegmentKind::Nop, SegmentKind::Left, SegmentKind::Straight, SegmentKind::Right] {
            assert_eq!(SegmentKind::from_code(kind.code()).unwrap(), kind);
        }
        assert!(SegmentKind::from_code(4).is_err());
        assert!(Direction::from_code(0).is_err());
        assert_eq!(Direction::from_code(-1).unwrap(), Direction::Backward);
    }

    #[test]
    fn test_left_quarter_turn() {
        let seg = Segment::new(SegmentKind::Left, FRAC_PI_2 * 2.0, Direction::Forward);
        let end = seg.end_pose(&Pose2D::origin(), 2.0);
        assert_relative_eq!(end.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(end.yaw, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_right_turn_backward() {
        // Reversing on a right arc swings the rear to the left
        let seg = Segment::new(SegmentKind::Right, FRAC_PI_2, Direction::Backward);
        let end = seg.end_pose(&Pose2D::origin(), 1.0);
        assert_relative_eq!(end.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(end.yaw, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_straight_backward() {
        let seg = Segment::new(SegmentKind::Straight, 3.0, Direction::Backward);
        let end = seg.end_pose(&Pose2D::new(1.0, 1.0, FRAC_PI_2), 1.0);
        assert_relative_eq!(end.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_path_materialization() {
        let lengths = [FRAC_PI_2, 1.0, FRAC_PI_2, 0.0, 0.0];
        let path = ReedsSheppPath::from_normalized(PathWord::LpSpRp, &lengths, 2.0, 0.0);
        assert_eq!(path.segments().len(), 3);
        assert_relative_eq!(path.length(), PI + 2.0, epsilon = 1e-12);
        assert_eq!(path.kind_codes(), [1, 2, 3, 0, 0]);
        assert!(!path.has_reverse());
        assert_eq!(path.segments[3], Segment::nop());
    }

    #[test]
    fn test_negative_zero_keeps_pattern_direction() {
        let lengths = [-0.0, -1.0, -0.5, 0.0, 0.0];
        let path = ReedsSheppPath::from_normalized(PathWord::LnSnLn, &lengths, 1.0, 1.5);
        assert!(path.segments().iter().all(|s| s.direction == Direction::Backward));
        assert_eq!(path.signed_lengths()[1], -1.0);
    }
}
