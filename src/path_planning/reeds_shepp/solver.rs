//! Per-word solving of a normalized relative goal
//!
//! Input is always the goal expressed in the start frame and divided by the
//! turning radius (see [`Pose2D::relative`]). Every candidate is replayed from
//! the origin before it is accepted, so a returned solution always reaches
//! the goal it was solved for.

use ordered_float::OrderedFloat;

use crate::common::Pose2D;
use super::formulas::ZERO;
use super::segment::{SegmentKind, SegmentLengths, MAX_SEGMENTS};
use super::words::{PathWord, WordMask};

/// Largest end-pose miss, in turning-radius units and radians, accepted for a candidate
pub const RECONSTRUCTION_TOLERANCE: f64 = 1e-6;

/// Solve one word, returning signed lengths in turning-radius units
///
/// `None` means the word has no real solution for `goal`; that is a normal
/// outcome, not an error.
pub fn solve_word(word: PathWord, goal: &Pose2D) -> Option<SegmentLengths> {
    let entry = word.entry();
    entry.derivations
        .iter()
        .filter_map(|d| d.evaluate(goal))
        .filter(|lengths| matches_pattern(lengths, &entry.signs))
        .filter(|lengths| reaches(goal, &entry.kinds, lengths))
        .min_by_key(|lengths| OrderedFloat(total_length(lengths)))
}

/// Every enabled word with a solution, in catalog order
pub fn solve_enabled(
    goal: &Pose2D,
    mask: WordMask,
) -> impl Iterator<Item = (PathWord, SegmentLengths)> + '_ {
    mask.iter()
        .filter_map(move |word| solve_word(word, goal).map(|lengths| (word, lengths)))
}

/// Sum of absolute segment lengths
pub fn total_length(lengths: &SegmentLengths) -> f64 {
    lengths.iter().map(|l| l.abs()).sum()
}

/// End pose of a unit-radius path started at the origin
pub fn normalized_end_pose(
    kinds: &[SegmentKind; MAX_SEGMENTS],
    lengths: &SegmentLengths,
) -> Pose2D {
    kinds
        .iter()
        .zip(lengths.iter())
        .fold(Pose2D::origin(), |pose, (kind, &l)| {
            let (dx, dy, dyaw) = kind.displacement(l, 1.0);
            pose.compose(dx, dy, dyaw)
        })
}

fn matches_pattern(lengths: &SegmentLengths, signs: &[i8; MAX_SEGMENTS]) -> bool {
    lengths
        .iter()
        .zip(signs.iter())
        .all(|(&l, &s)| f64::from(s) * l >= -ZERO)
}

fn reaches(goal: &Pose2D, kinds: &[SegmentKind; MAX_SEGMENTS], lengths: &SegmentLengths) -> bool {
    let (dp, dyaw) = normalized_end_pose(kinds, lengths).error_to(goal);
    dp <= RECONSTRUCTION_TOLERANCE && dyaw <= RECONSTRUCTION_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::reeds_shepp::words::NUM_PATH_WORDS;
    use approx::assert_relative_eq;
    use itertools::iproduct;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn word_signs_hold(word: PathWord, lengths: &SegmentLengths) -> bool {
        word.directions()
            .iter()
            .zip(lengths.iter())
            .all(|(d, &l)| match d {
                Some(d) => d.sign() * l >= -ZERO,
                None => l == 0.0,
            })
    }

    #[test]
    fn test_straight_ahead_is_lsl() {
        let goal = Pose2D::new(4.0, 0.0, 0.0);
        let lengths = solve_word(PathWord::LpSpLp, &goal).unwrap();
        assert_relative_eq!(total_length(&lengths), 4.0, epsilon = 1e-12);
        assert!(solve_word(PathWord::LnSnLn, &goal).is_none());
    }

    #[test]
    fn test_straight_behind_is_reverse_lsl() {
        let goal = Pose2D::new(-2.5, 0.0, 0.0);
        let lengths = solve_word(PathWord::LnSnLn, &goal).unwrap();
        assert_relative_eq!(lengths[1], -2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_every_solution_reaches_goal_on_grid() {
        let coords = [-3.0, -1.2, -0.4, 0.0, 0.7, 1.9, 4.5];
        let headings = [-3.0, -1.5, -0.3, 0.0, 0.8, 2.2, PI - 1e-3];
        let mut solved = vec![0usize; NUM_PATH_WORDS];
        for (&x, &y, &yaw) in iproduct!(coords.iter(), coords.iter(), headings.iter()) {
            let goal = Pose2D::new(x, y, yaw);
            for (word, lengths) in solve_enabled(&goal, WordMask::all()) {
                let (dp, dyaw) = normalized_end_pose(&word.kinds(), &lengths).error_to(&goal);
                assert!(dp <= RECONSTRUCTION_TOLERANCE, "{} misses {:?}", word, goal);
                assert!(dyaw <= RECONSTRUCTION_TOLERANCE, "{} misses {:?}", word, goal);
                assert!(word_signs_hold(word, &lengths), "{} has wrong signs", word);
                solved[word.id()] += 1;
            }
        }
        assert!(solved[PathWord::LpSpLp.id()] > 0);
        assert!(solved[PathWord::LpRnLp.id()] > 0);
    }

    #[test]
    fn test_some_word_always_solves() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let goal = Pose2D::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-PI..PI),
            );
            assert!(solve_enabled(&goal, WordMask::all()).next().is_some(), "{:?}", goal);
        }
    }

    #[test]
    fn test_mask_restricts_candidates() {
        let goal = Pose2D::new(1.0, 2.0, 0.5);
        let mask = WordMask::none().enable(PathWord::RnSnRn);
        assert!(solve_enabled(&goal, mask).all(|(w, _)| w == PathWord::RnSnRn));
        assert_eq!(solve_enabled(&goal, WordMask::none()).count(), 0);
    }
}
