//! Direction-weighted path cost and candidate selection

use itertools::izip;
use ordered_float::OrderedFloat;

use crate::common::{ensure_positive, Pose2D, ReedsSheppResult};
use super::segment::{Direction, ReedsSheppPath, SegmentLengths, MAX_SEGMENTS};
use super::solver::{solve_enabled, solve_word};
use super::words::{PathWord, WordMask};

/// Per-direction weights applied to travelled arc length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub turning_radius: f64,
    pub forward_cost: f64,
    pub reverse_cost: f64,
}

impl CostModel {
    pub fn new(turning_radius: f64, forward_cost: f64, reverse_cost: f64) -> Self {
        Self {
            turning_radius,
            forward_cost,
            reverse_cost,
        }
    }

    pub fn validate(&self) -> ReedsSheppResult<()> {
        ensure_positive("turning_radius", self.turning_radius)?;
        ensure_positive("forward_cost", self.forward_cost)?;
        ensure_positive("reverse_cost", self.reverse_cost)
    }

    pub fn weight(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Forward => self.forward_cost,
            Direction::Backward => self.reverse_cost,
        }
    }

    /// Cost in world units of normalized signed `lengths` driven as `word`
    pub fn cost(&self, word: PathWord, lengths: &SegmentLengths) -> f64 {
        let weighted: f64 = word
            .directions()
            .iter()
            .zip(lengths.iter())
            .filter_map(|(d, l)| d.map(|d| l.abs() * self.weight(d)))
            .sum();
        self.turning_radius * weighted
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// A solved word with its normalized lengths and world-unit cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub word: PathWord,
    pub lengths: SegmentLengths,
    pub cost: f64,
}

impl Candidate {
    /// Signed lengths in world units, sign taken from the word's pattern
    pub fn physical_lengths(&self, turning_radius: f64) -> [f64; MAX_SEGMENTS] {
        let mut out = [0.0; MAX_SEGMENTS];
        for (o, d, l) in izip!(out.iter_mut(), self.word.directions(), self.lengths) {
            if let Some(d) = d {
                *o = d.sign() * l.abs() * turning_radius;
            }
        }
        out
    }

    pub fn into_path(self, turning_radius: f64) -> ReedsSheppPath {
        ReedsSheppPath::from_normalized(self.word, &self.lengths, turning_radius, self.cost)
    }
}

/// Cheapest enabled word for the normalized goal `q`
///
/// Exact cost ties go to the lowest word id. `None` when no enabled word has
/// a solution.
pub fn optimal(q: &Pose2D, mask: WordMask, model: &CostModel) -> Option<Candidate> {
    solve_enabled(q, mask)
        .map(|(word, lengths)| Candidate {
            word,
            lengths,
            cost: model.cost(word, &lengths),
        })
        .min_by_key(|c| (OrderedFloat(c.cost), c.word.id()))
}

/// One entry per enabled word in catalog order, `None` for unsolvable words
pub fn all_candidates<'a>(
    q: &'a Pose2D,
    mask: WordMask,
    model: &'a CostModel,
) -> impl Iterator<Item = (PathWord, Option<Candidate>)> + 'a {
    mask.iter().map(move |word| {
        let candidate = solve_word(word, q).map(|lengths| Candidate {
            word,
            lengths,
            cost: model.cost(word, &lengths),
        });
        (word, candidate)
    })
}
