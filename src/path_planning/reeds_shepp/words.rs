//! The fixed catalog of 48 Reeds-Shepp path words
//!
//! A word names a sequence of segment kinds together with a fixed travel
//! direction per segment, e.g. `L+R-L+`. Word ids (0..48) are stable and are
//! what batch outputs are indexed by.
//!
//! Each word is solved by one or more [`Derivation`]s of a base formula. A
//! derived solution only counts for the word if every segment's sign agrees
//! with the word's direction pattern, which is what separates e.g. `C|C|C`
//! from `C|CC` when both come out of the same formula.

use std::fmt;

use crate::common::{ReedsSheppError, ReedsSheppResult};
use super::formulas::{BaseFormula, Derivation, Symmetry};
use super::segment::{Direction, SegmentKind, MAX_SEGMENTS};

pub const NUM_PATH_WORDS: usize = 48;

/// Structural family of a word; `|` marks a cusp (direction reversal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordFamily {
    /// CSC
    Csc,
    /// C|C|C
    CxCxC,
    /// C|CC
    CxCC,
    /// CC|C
    CCxC,
    /// CCu|CuC
    CCuxCuC,
    /// C|CuCu|C
    CxCuCuxC,
    /// C|C(pi/2)SC
    CxC90SC,
    /// CSC(pi/2)|C
    CSC90xC,
    /// C|C(pi/2)SC(pi/2)|C
    CxC90SC90xC,
}

impl WordFamily {
    pub fn notation(self) -> &'static str {
        match self {
            WordFamily::Csc => "CSC",
            WordFamily::CxCxC => "C|C|C",
            WordFamily::CxCC => "C|CC",
            WordFamily::CCxC => "CC|C",
            WordFamily::CCuxCuC => "CCu|CuC",
            WordFamily::CxCuCuxC => "C|CuCu|C",
            WordFamily::CxC90SC => "C|C(pi/2)SC",
            WordFamily::CSC90xC => "CSC(pi/2)|C",
            WordFamily::CxC90SC90xC => "C|C(pi/2)SC(pi/2)|C",
        }
    }
}

/// Identifier of a catalog word
///
/// Variant names spell the word: `L`/`R`/`S` for the segment kind, `p`/`n`
/// for forward (positive) or backward (negative) travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PathWord {
    LpSpLp, LnSnLn, RpSpRp, RnSnRn, LpSpRp, LnSnRn, RpSpLp, RnSnLn,
    LpRnLp, LnRpLn, RpLnRp, RnLpRn,
    LpRnLn, LnRpLp, RpLnRn, RnLpRp,
    LnRnLp, LpRpLn, RnLnRp, RpLpRn,
    LpRpLnRn, LnRnLpRp, RpLpRnLn, RnLnRpLp,
    LpRnLnRp, LnRpLpRn, RpLnRnLp, RnLpRpLn,
    LpRnSnLn, LnRpSpLp, RpLnSnRn, RnLpSpRp,
    LpRnSnRn, LnRpSpRp, RpLnSnLn, RnLpSpLp,
    LnSnRnLp, LpSpRpLn, RnSnLnRp, RpSpLpRn,
    RnSnRnLp, RpSpRpLn, LnSnLnRp, LpSpLpRn,
    LpRnSnLnRp, LnRpSpLpRn, RpLnSnRnLp, RnLpSpRpLn,
}

/// Catalog row: direction pattern and how to solve the word
pub(crate) struct WordEntry {
    pub word: PathWord,
    pub family: WordFamily,
    pub kinds: [SegmentKind; MAX_SEGMENTS],
    /// +1 forward, -1 backward, 0 unused
    pub signs: [i8; MAX_SEGMENTS],
    pub derivations: &'static [Derivation],
}

use BaseFormula as B;
use SegmentKind::{Left as L, Nop as N, Right as R, Straight as S};
use Symmetry::{Identity as Id, Reflect as Rf, Timeflip as Tf, TimeflipReflect as TR};

const fn fwd(base: BaseFormula, symmetry: Symmetry) -> Derivation {
    Derivation::forward(base, symmetry)
}

const fn bwd(base: BaseFormula, symmetry: Symmetry) -> Derivation {
    Derivation::backward(base, symmetry)
}

const fn entry(
    word: PathWord,
    family: WordFamily,
    kinds: [SegmentKind; MAX_SEGMENTS],
    signs: [i8; MAX_SEGMENTS],
    derivations: &'static [Derivation],
) -> WordEntry {
    WordEntry { word, family, kinds, signs, derivations }
}

use PathWord::*;
use WordFamily::*;

pub(crate) static CATALOG: [WordEntry; NUM_PATH_WORDS] = [
    entry(LpSpLp, Csc, [L, S, L, N, N], [1, 1, 1, 0, 0], &[fwd(B::LpSpLp, Id)]),
    entry(LnSnLn, Csc, [L, S, L, N, N], [-1, -1, -1, 0, 0], &[fwd(B::LpSpLp, Tf)]),
    entry(RpSpRp, Csc, [R, S, R, N, N], [1, 1, 1, 0, 0], &[fwd(B::LpSpLp, Rf)]),
    entry(RnSnRn, Csc, [R, S, R, N, N], [-1, -1, -1, 0, 0], &[fwd(B::LpSpLp, TR)]),
    entry(LpSpRp, Csc, [L, S, R, N, N], [1, 1, 1, 0, 0], &[fwd(B::LpSpRp, Id)]),
    entry(LnSnRn, Csc, [L, S, R, N, N], [-1, -1, -1, 0, 0], &[fwd(B::LpSpRp, Tf)]),
    entry(RpSpLp, Csc, [R, S, L, N, N], [1, 1, 1, 0, 0], &[fwd(B::LpSpRp, Rf)]),
    entry(RnSnLn, Csc, [R, S, L, N, N], [-1, -1, -1, 0, 0], &[fwd(B::LpSpRp, TR)]),
    // C|C|C is reachable both from the formula and from its backwards form
    entry(LpRnLp, CxCxC, [L, R, L, N, N], [1, -1, 1, 0, 0], &[fwd(B::LpRmL, Id), bwd(B::LpRmL, Id)]),
    entry(LnRpLn, CxCxC, [L, R, L, N, N], [-1, 1, -1, 0, 0], &[fwd(B::LpRmL, Tf), bwd(B::LpRmL, Tf)]),
    entry(RpLnRp, CxCxC, [R, L, R, N, N], [1, -1, 1, 0, 0], &[fwd(B::LpRmL, Rf), bwd(B::LpRmL, Rf)]),
    entry(RnLpRn, CxCxC, [R, L, R, N, N], [-1, 1, -1, 0, 0], &[fwd(B::LpRmL, TR), bwd(B::LpRmL, TR)]),
    entry(LpRnLn, CxCC, [L, R, L, N, N], [1, -1, -1, 0, 0], &[fwd(B::LpRmL, Id)]),
    entry(LnRpLp, CxCC, [L, R, L, N, N], [-1, 1, 1, 0, 0], &[fwd(B::LpRmL, Tf)]),
    entry(RpLnRn, CxCC, [R, L, R, N, N], [1, -1, -1, 0, 0], &[fwd(B::LpRmL, Rf)]),
    entry(RnLpRp, CxCC, [R, L, R, N, N], [-1, 1, 1, 0, 0], &[fwd(B::LpRmL, TR)]),
    entry(LnRnLp, CCxC, [L, R, L, N, N], [-1, -1, 1, 0, 0], &[bwd(B::LpRmL, Id)]),
    entry(LpRpLn, CCxC, [L, R, L, N, N], [1, 1, -1, 0, 0], &[bwd(B::LpRmL, Tf)]),
    entry(RnLnRp, CCxC, [R, L, R, N, N], [-1, -1, 1, 0, 0], &[bwd(B::LpRmL, Rf)]),
    entry(RpLpRn, CCxC, [R, L, R, N, N], [1, 1, -1, 0, 0], &[bwd(B::LpRmL, TR)]),
    entry(LpRpLnRn, CCuxCuC, [L, R, L, R, N], [1, 1, -1, -1, 0], &[fwd(B::LpRupLumRm, Id)]),
    entry(LnRnLpRp, CCuxCuC, [L, R, L, R, N], [-1, -1, 1, 1, 0], &[fwd(B::LpRupLumRm, Tf)]),
    entry(RpLpRnLn, CCuxCuC, [R, L, R, L, N], [1, 1, -1, -1, 0], &[fwd(B::LpRupLumRm, Rf)]),
    entry(RnLnRpLp, CCuxCuC, [R, L, R, L, N], [-1, -1, 1, 1, 0], &[fwd(B::LpRupLumRm, TR)]),
    entry(LpRnLnRp, CxCuCuxC, [L, R, L, R, N], [1, -1, -1, 1, 0], &[fwd(B::LpRumLumRp, Id)]),
    entry(LnRpLpRn, CxCuCuxC, [L, R, L, R, N], [-1, 1, 1, -1, 0], &[fwd(B::LpRumLumRp, Tf)]),
    entry(RpLnRnLp, CxCuCuxC, [R, L, R, L, N], [1, -1, -1, 1, 0], &[fwd(B::LpRumLumRp, Rf)]),
    entry(RnLpRpLn, CxCuCuxC, [R, L, R, L, N], [-1, 1, 1, -1, 0], &[fwd(B::LpRumLumRp, TR)]),
    entry(LpRnSnLn, CxC90SC, [L, R, S, L, N], [1, -1, -1, -1, 0], &[fwd(B::LpRmSmLm, Id)]),
    entry(LnRpSpLp, CxC90SC, [L, R, S, L, N], [-1, 1, 1, 1, 0], &[fwd(B::LpRmSmLm, Tf)]),
    entry(RpLnSnRn, CxC90SC, [R, L, S, R, N], [1, -1, -1, -1, 0], &[fwd(B::LpRmSmLm, Rf)]),
    entry(RnLpSpRp, CxC90SC, [R, L, S, R, N], [-1, 1, 1, 1, 0], &[fwd(B::LpRmSmLm, TR)]),
    entry(LpRnSnRn, CxC90SC, [L, R, S, R, N], [1, -1, -1, -1, 0], &[fwd(B::LpRmSmRm, Id)]),
    entry(LnRpSpRp, CxC90SC, [L, R, S, R, N], [-1, 1, 1, 1, 0], &[fwd(B::LpRmSmRm, Tf)]),
    entry(RpLnSnLn, CxC90SC, [R, L, S, L, N], [1, -1, -1, -1, 0], &[fwd(B::LpRmSmRm, Rf)]),
    entry(RnLpSpLp, CxC90SC, [R, L, S, L, N], [-1, 1, 1, 1, 0], &[fwd(B::LpRmSmRm, TR)]),
    entry(LnSnRnLp, CSC90xC, [L, S, R, L, N], [-1, -1, -1, 1, 0], &[bwd(B::LpRmSmLm, Id)]),
    entry(LpSpRpLn, CSC90xC, [L, S, R, L, N], [1, 1, 1, -1, 0], &[bwd(B::LpRmSmLm, Tf)]),
    entry(RnSnLnRp, CSC90xC, [R, S, L, R, N], [-1, -1, -1, 1, 0], &[bwd(B::LpRmSmLm, Rf)]),
    entry(RpSpLpRn, CSC90xC, [R, S, L, R, N], [1, 1, 1, -1, 0], &[bwd(B::LpRmSmLm, TR)]),
    entry(RnSnRnLp, CSC90xC, [R, S, R, L, N], [-1, -1, -1, 1, 0], &[bwd(B::LpRmSmRm, Id)]),
    entry(RpSpRpLn, CSC90xC, [R, S, R, L, N], [1, 1, 1, -1, 0], &[bwd(B::LpRmSmRm, Tf)]),
    entry(LnSnLnRp, CSC90xC, [L, S, L, R, N], [-1, -1, -1, 1, 0], &[bwd(B::LpRmSmRm, Rf)]),
    entry(LpSpLpRn, CSC90xC, [L, S, L, R, N], [1, 1, 1, -1, 0], &[bwd(B::LpRmSmRm, TR)]),
    entry(LpRnSnLnRp, CxC90SC90xC, [L, R, S, L, R], [1, -1, -1, -1, 1], &[fwd(B::LpRmSLmRp, Id)]),
    entry(LnRpSpLpRn, CxC90SC90xC, [L, R, S, L, R], [-1, 1, 1, 1, -1], &[fwd(B::LpRmSLmRp, Tf)]),
    entry(RpLnSnRnLp, CxC90SC90xC, [R, L, S, R, L], [1, -1, -1, -1, 1], &[fwd(B::LpRmSLmRp, Rf)]),
    entry(RnLpSpRpLn, CxC90SC90xC, [R, L, S, R, L], [-1, 1, 1, 1, -1], &[fwd(B::LpRmSLmRp, TR)]),
];

impl PathWord {
    pub const ALL: [PathWord; NUM_PATH_WORDS] = [
        LpSpLp, LnSnLn, RpSpRp, RnSnRn, LpSpRp, LnSnRn, RpSpLp, RnSnLn,
        LpRnLp, LnRpLn, RpLnRp, RnLpRn,
        LpRnLn, LnRpLp, RpLnRn, RnLpRp,
        LnRnLp, LpRpLn, RnLnRp, RpLpRn,
        LpRpLnRn, LnRnLpRp, RpLpRnLn, RnLnRpLp,
        LpRnLnRp, LnRpLpRn, RpLnRnLp, RnLpRpLn,
        LpRnSnLn, LnRpSpLp, RpLnSnRn, RnLpSpRp,
        LpRnSnRn, LnRpSpRp, RpLnSnLn, RnLpSpLp,
        LnSnRnLp, LpSpRpLn, RnSnLnRp, RpSpLpRn,
        RnSnRnLp, RpSpRpLn, LnSnLnRp, LpSpLpRn,
        LpRnSnLnRp, LnRpSpLpRn, RpLnSnRnLp, RnLpSpRpLn,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub(crate) fn entry(self) -> &'static WordEntry {
        &CATALOG[self.id()]
    }

    pub fn family(self) -> WordFamily {
        self.entry().family
    }

    /// Segment kinds, `Nop` past the last segment
    pub fn kinds(self) -> [SegmentKind; MAX_SEGMENTS] {
        self.entry().kinds
    }

    /// Travel direction of every used segment
    pub fn directions(self) -> [Option<Direction>; MAX_SEGMENTS] {
        self.entry().signs.map(|s| match s {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Backward),
            _ => None,
        })
    }

    pub fn num_segments(self) -> usize {
        self.entry().signs.iter().filter(|&&s| s != 0).count()
    }
}

impl fmt::Display for PathWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry();
        for (kind, sign) in entry.kinds.iter().zip(entry.signs.iter()) {
            match sign {
                1 => write!(f, "{}+", kind.letter())?,
                -1 => write!(f, "{}-", kind.letter())?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Set of enabled words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordMask(u64);

impl WordMask {
    const FULL: u64 = (1 << NUM_PATH_WORDS) - 1;

    pub const fn all() -> Self {
        Self(Self::FULL)
    }

    pub const fn none() -> Self {
        Self(0)
    }

    /// Mask from one flag per catalog word, `true` meaning enabled
    pub fn from_enabled_flags(flags: &[bool]) -> ReedsSheppResult<Self> {
        if flags.len() != NUM_PATH_WORDS {
            return Err(ReedsSheppError::DimensionMismatch(format!(
                "word mask needs {} flags, got {}",
                NUM_PATH_WORDS,
                flags.len()
            )));
        }
        let bits = flags
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u64, |acc, (i, _)| acc | (1 << i));
        Ok(Self(bits))
    }

    pub fn from_words<I: IntoIterator<Item = PathWord>>(words: I) -> Self {
        words.into_iter().fold(Self::none(), Self::enable)
    }

    pub fn from_family(family: WordFamily) -> Self {
        Self::from_words(PathWord::ALL.into_iter().filter(|w| w.family() == family))
    }

    pub fn enable(self, word: PathWord) -> Self {
        Self(self.0 | (1 << word.id()))
    }

    pub fn disable(self, word: PathWord) -> Self {
        Self(self.0 & !(1 << word.id()))
    }

    pub fn contains(&self, word: PathWord) -> bool {
        self.0 & (1 << word.id()) != 0
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled words in catalog order
    pub fn iter(&self) -> impl Iterator<Item = PathWord> {
        let mask = *self;
        PathWord::ALL.into_iter().filter(move |w| mask.contains(*w))
    }
}

impl Default for WordMask {
    fn default() -> Self {
        Self::all()
    }
}
