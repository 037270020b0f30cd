//! Batch evaluation over arrays of pose pairs
//!
//! Pairs are independent. The pair index range is cut into disjoint
//! sub-ranges, every output buffer is split into matching disjoint slices,
//! and each sub-range is solved on its own, serially or on a rayon pool.
//! Results for pair `i` always land in slot `i`, whatever the execution order.

use std::ops::Range;

use log::debug;
use rayon::prelude::*;

use crate::common::{poses_from_flat, Pose2D, ReedsSheppError, ReedsSheppResult};
use super::cost::{all_candidates, optimal, Candidate};
use super::planner::ReedsSheppConfig;
use super::segment::{SegmentKind, MAX_SEGMENTS};

/// Split `0..total` into consecutive ranges of at most `grain` items
///
/// A grain of zero, or one covering everything, gives a single range. An
/// empty span gives no ranges.
pub fn partition(total: usize, grain: usize) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    if grain == 0 || grain >= total {
        return vec![0..total];
    }
    (0..total)
        .step_by(grain)
        .map(|begin| begin..(begin + grain).min(total))
        .collect()
}

/// Where sub-ranges are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workers {
    /// Calling thread only
    Serial,
    /// Process-wide rayon pool
    Global,
    /// Dedicated pool with this many threads, built per call
    Pool(usize),
}

/// Execution settings of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub workers: Workers,
    /// Pairs per sub-range; `None` spreads the pairs evenly over the workers
    pub grain_size: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::serial()
    }
}

impl BatchConfig {
    pub fn serial() -> Self {
        Self {
            workers: Workers::Serial,
            grain_size: None,
        }
    }

    pub fn global() -> Self {
        Self {
            workers: Workers::Global,
            grain_size: None,
        }
    }

    pub fn pool(num_threads: usize) -> Self {
        Self {
            workers: Workers::Pool(num_threads),
            grain_size: None,
        }
    }

    pub fn with_grain_size(mut self, grain_size: usize) -> Self {
        self.grain_size = Some(grain_size);
        self
    }

    pub fn validate(&self) -> ReedsSheppResult<()> {
        match self.workers {
            Workers::Pool(0) => Err(ReedsSheppError::InvalidParameter(
                "worker pool needs at least one thread".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Grain actually used for `total` pairs
    pub fn grain_for(&self, total: usize) -> usize {
        if let Some(grain) = self.grain_size {
            return grain;
        }
        let threads = match self.workers {
            Workers::Serial => return total,
            Workers::Global => rayon::current_num_threads(),
            Workers::Pool(n) => n,
        };
        total.div_ceil(threads.max(1))
    }
}

/// Size the process-wide rayon pool; only the first call in a process succeeds
pub fn configure_global_workers(num_threads: usize) -> ReedsSheppResult<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    debug!("global worker pool sized to {} threads", num_threads);
    Ok(())
}

/// Start and goal poses paired by index, a single-pose side being broadcast
#[derive(Debug, Clone)]
pub struct PosePairs {
    starts: Vec<Pose2D>,
    goals: Vec<Pose2D>,
    len: usize,
}

impl PosePairs {
    pub fn new(starts: Vec<Pose2D>, goals: Vec<Pose2D>) -> ReedsSheppResult<Self> {
        let len = match (starts.len(), goals.len()) {
            (0, 0) => 0,
            (0, _) | (_, 0) => {
                return Err(ReedsSheppError::DimensionMismatch(
                    "start and goal arrays must both be empty or both non-empty".to_string(),
                ))
            }
            (s, g) if s == g || g == 1 => s,
            (1, g) => g,
            (s, g) => {
                return Err(ReedsSheppError::DimensionMismatch(format!(
                    "cannot pair {} start poses with {} goal poses",
                    s, g
                )))
            }
        };
        if !starts.iter().chain(goals.iter()).all(Pose2D::is_finite) {
            return Err(ReedsSheppError::InvalidParameter(
                "pose arrays contain non-finite values".to_string(),
            ));
        }
        Ok(Self { starts, goals, len })
    }

    /// Pairs from flattened `(x, y, yaw)` arrays
    pub fn from_flat(starts: &[f64], goals: &[f64]) -> ReedsSheppResult<Self> {
        Self::new(poses_from_flat(starts)?, poses_from_flat(goals)?)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> (Pose2D, Pose2D) {
        debug_assert!(i < self.len);
        let start = self.starts[if self.starts.len() == 1 { 0 } else { i }];
        let goal = self.goals[if self.goals.len() == 1 { 0 } else { i }];
        (start, goal)
    }
}

/// Caller-owned output buffers of a batch
///
/// For `n` pairs and `k` paths per pair, `distance` holds `n * k` values and
/// the optional `lengths` / `types` hold `n * k * 5`, row-major by pair, then
/// path, then segment.
#[derive(Debug)]
pub struct SegmentOutputs<'a> {
    pub distance: &'a mut [f64],
    pub lengths: Option<&'a mut [f64]>,
    pub types: Option<&'a mut [u32]>,
}

impl<'a> SegmentOutputs<'a> {
    pub fn new(distance: &'a mut [f64]) -> Self {
        Self {
            distance,
            lengths: None,
            types: None,
        }
    }

    pub fn with_lengths(mut self, lengths: &'a mut [f64]) -> Self {
        self.lengths = Some(lengths);
        self
    }

    pub fn with_types(mut self, types: &'a mut [u32]) -> Self {
        self.types = Some(types);
        self
    }

    fn check(&self, num_pairs: usize, num_paths: usize) -> ReedsSheppResult<()> {
        let slots = num_pairs * num_paths;
        check_len("distance", self.distance.len(), slots)?;
        if let Some(lengths) = &self.lengths {
            check_len("segment lengths", lengths.len(), slots * MAX_SEGMENTS)?;
        }
        if let Some(types) = &self.types {
            check_len("segment types", types.len(), slots * MAX_SEGMENTS)?;
        }
        Ok(())
    }

    /// Cut the buffers into one disjoint part per range
    fn split(self, ranges: &[Range<usize>], num_paths: usize) -> Vec<SegmentOutputs<'a>> {
        let SegmentOutputs {
            mut distance,
            mut lengths,
            mut types,
        } = self;
        let mut parts = Vec::with_capacity(ranges.len());
        for range in ranges {
            let slots = range.len() * num_paths;
            let (head, tail) = std::mem::take(&mut distance).split_at_mut(slots);
            distance = tail;
            parts.push(SegmentOutputs {
                distance: head,
                lengths: take_front(&mut lengths, slots * MAX_SEGMENTS),
                types: take_front(&mut types, slots * MAX_SEGMENTS),
            });
        }
        parts
    }

    /// Write one path slot, `None` meaning no solution
    fn write(&mut self, slot: usize, kinds: [SegmentKind; MAX_SEGMENTS], candidate: Option<&Candidate>, turning_radius: f64) {
        self.distance[slot] = candidate.map_or(f64::INFINITY, |c| c.cost);
        let segs = slot * MAX_SEGMENTS..(slot + 1) * MAX_SEGMENTS;
        if let Some(lengths) = self.lengths.as_deref_mut() {
            let values = candidate.map_or([0.0; MAX_SEGMENTS], |c| c.physical_lengths(turning_radius));
            lengths[segs.clone()].copy_from_slice(&values);
        }
        if let Some(types) = self.types.as_deref_mut() {
            types[segs].copy_from_slice(&kinds.map(SegmentKind::code));
        }
    }
}

fn take_front<'a, T>(buf: &mut Option<&'a mut [T]>, n: usize) -> Option<&'a mut [T]> {
    let whole = buf.take()?;
    let (head, tail) = whole.split_at_mut(n);
    *buf = Some(tail);
    Some(head)
}

fn check_len(name: &str, actual: usize, expected: usize) -> ReedsSheppResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ReedsSheppError::DimensionMismatch(format!(
            "{} buffer holds {} values, expected {}",
            name, actual, expected
        )))
    }
}

/// Batch solver over pose pairs
#[derive(Debug, Clone)]
pub struct BatchSolver {
    config: ReedsSheppConfig,
    batch: BatchConfig,
}

impl BatchSolver {
    pub fn new(config: ReedsSheppConfig, batch: BatchConfig) -> ReedsSheppResult<Self> {
        config.validate()?;
        batch.validate()?;
        Ok(Self { config, batch })
    }

    pub fn config(&self) -> &ReedsSheppConfig {
        &self.config
    }

    /// Fill `outputs` with the cost, signed lengths and segment types of
    /// every pair
    ///
    /// In optimal mode each pair owns one slot; otherwise one slot per
    /// enabled word in catalog order. Unsolvable slots get an infinite
    /// distance and zero lengths.
    pub fn solve_segments(&self, pairs: &PosePairs, outputs: SegmentOutputs<'_>) -> ReedsSheppResult<()> {
        let num_paths = self.config.paths_per_pair();
        outputs.check(pairs.len(), num_paths)?;

        let grain = self.batch.grain_for(pairs.len());
        let ranges = partition(pairs.len(), grain);
        debug!(
            "batch: {} pairs x {} paths in {} ranges of <= {} ({:?})",
            pairs.len(),
            num_paths,
            ranges.len(),
            grain,
            self.batch.workers
        );

        let jobs: Vec<(Range<usize>, SegmentOutputs<'_>)> = ranges
            .iter()
            .cloned()
            .zip(outputs.split(&ranges, num_paths))
            .collect();
        self.dispatch(jobs, |range, mut out| self.solve_range(pairs, range, &mut out))
    }

    /// Optimal cost of every pair; `distance` holds one value per output slot
    pub fn solve_distances(&self, pairs: &PosePairs, distance: &mut [f64]) -> ReedsSheppResult<()> {
        self.solve_segments(pairs, SegmentOutputs::new(distance))
    }

    fn solve_range(&self, pairs: &PosePairs, range: Range<usize>, out: &mut SegmentOutputs<'_>) {
        let r = self.config.turning_radius;
        let model = self.config.cost_model();
        let mask = self.config.enabled;
        let num_paths = self.config.paths_per_pair();

        for (local, i) in range.enumerate() {
            let (start, goal) = pairs.get(i);
            let q = start.relative(&goal, r);
            let first = local * num_paths;
            if self.config.optimal_only {
                match optimal(&q, mask, &model) {
                    Some(best) => out.write(first, best.word.kinds(), Some(&best), r),
                    None => out.write(first, [SegmentKind::Nop; MAX_SEGMENTS], None, r),
                }
            } else {
                for (k, (word, candidate)) in all_candidates(&q, mask, &model).enumerate() {
                    out.write(first + k, word.kinds(), candidate.as_ref(), r);
                }
            }
        }
    }

    fn dispatch<'a, F>(&self, jobs: Vec<(Range<usize>, SegmentOutputs<'a>)>, job: F) -> ReedsSheppResult<()>
    where
        F: Fn(Range<usize>, SegmentOutputs<'a>) + Send + Sync,
    {
        match self.batch.workers {
            Workers::Serial => jobs.into_iter().for_each(|(range, out)| job(range, out)),
            Workers::Global => jobs.into_par_iter().for_each(|(range, out)| job(range, out)),
            Workers::Pool(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| jobs.into_par_iter().for_each(|(range, out)| job(range, out)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::reeds_shepp::words::{PathWord, WordMask};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn random_poses(rng: &mut StdRng, n: usize) -> Vec<Pose2D> {
        (0..n)
            .map(|_| {
                Pose2D::new(
                    rng.gen_range(-8.0..8.0),
                    rng.gen_range(-8.0..8.0),
                    rng.gen_range(-PI..PI),
                )
            })
            .collect()
    }

    struct Buffers {
        distance: Vec<f64>,
        lengths: Vec<f64>,
        types: Vec<u32>,
    }

    fn run(solver: &BatchSolver, pairs: &PosePairs) -> Buffers {
        let slots = pairs.len() * solver.config().paths_per_pair();
        let mut b = Buffers {
            distance: vec![0.0; slots],
            lengths: vec![0.0; slots * MAX_SEGMENTS],
            types: vec![0; slots * MAX_SEGMENTS],
        };
        let outputs = SegmentOutputs::new(&mut b.distance)
            .with_lengths(&mut b.lengths)
            .with_types(&mut b.types);
        solver.solve_segments(pairs, outputs).unwrap();
        b
    }

    #[test]
    fn test_partition() {
        assert!(partition(0, 4).is_empty());
        assert_eq!(partition(10, 0), vec![0..10]);
        assert_eq!(partition(10, 10), vec![0..10]);
        assert_eq!(partition(10, 25), vec![0..10]);
        assert_eq!(partition(10, 4), vec![0..4, 4..8, 8..10]);
        assert_eq!(partition(9, 3), vec![0..3, 3..6, 6..9]);
    }

    #[test]
    fn test_grain_defaults() {
        assert_eq!(BatchConfig::serial().grain_for(100), 100);
        assert_eq!(BatchConfig::pool(4).grain_for(10), 3);
        assert_eq!(BatchConfig::pool(4).with_grain_size(7).grain_for(10), 7);
        assert!(BatchConfig::pool(0).validate().is_err());
    }

    #[test]
    fn test_pose_pairs_broadcast() {
        let one = vec![Pose2D::origin()];
        let three = vec![Pose2D::new(1.0, 0.0, 0.0); 3];
        assert_eq!(PosePairs::new(one.clone(), three.clone()).unwrap().len(), 3);
        assert_eq!(PosePairs::new(three.clone(), one.clone()).unwrap().len(), 3);
        assert_eq!(PosePairs::new(Vec::new(), Vec::new()).unwrap().len(), 0);
        assert!(PosePairs::new(Vec::new(), one.clone()).is_err());
        assert!(PosePairs::new(three.clone(), vec![Pose2D::origin(); 2]).is_err());
        assert!(PosePairs::new(one, vec![Pose2D::new(f64::INFINITY, 0.0, 0.0)]).is_err());

        let pairs = PosePairs::from_flat(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(pairs.get(1), (Pose2D::origin(), Pose2D::new(4.0, 5.0, 6.0)));
        assert!(PosePairs::from_flat(&[0.0, 0.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_parallel_output_is_bit_identical() {
        let mut rng = StdRng::seed_from_u64(42);
        let starts = random_poses(&mut rng, 97);
        let goals = random_poses(&mut rng, 97);
        let pairs = PosePairs::new(starts, goals).unwrap();
        let config = ReedsSheppConfig::default().with_costs(1.0, 2.5);

        let serial = run(&BatchSolver::new(config.clone(), BatchConfig::serial()).unwrap(), &pairs);
        let pooled = run(
            &BatchSolver::new(config.clone(), BatchConfig::pool(4).with_grain_size(5)).unwrap(),
            &pairs,
        );
        let global = run(&BatchSolver::new(config, BatchConfig::global()).unwrap(), &pairs);
        for other in [&pooled, &global] {
            assert!(serial.distance.iter().zip(&other.distance).all(|(a, b)| a.to_bits() == b.to_bits()));
            assert!(serial.lengths.iter().zip(&other.lengths).all(|(a, b)| a.to_bits() == b.to_bits()));
            assert_eq!(serial.types, other.types);
        }
        assert!(serial.distance.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn test_batch_matches_single_queries() {
        let mut rng = StdRng::seed_from_u64(8);
        let goals = random_poses(&mut rng, 20);
        let start = Pose2D::new(0.5, -0.5, 0.3);
        let pairs = PosePairs::new(vec![start], goals.clone()).unwrap();
        let config = ReedsSheppConfig::default().with_turning_radius(2.0);
        let out = run(&BatchSolver::new(config.clone(), BatchConfig::pool(3)).unwrap(), &pairs);
        let model = config.cost_model();
        for (i, goal) in goals.iter().enumerate() {
            let best = optimal(&start.relative(goal, 2.0), WordMask::all(), &model).unwrap();
            assert_eq!(out.distance[i], best.cost);
            assert_eq!(&out.lengths[i * 5..i * 5 + 5], &best.physical_lengths(2.0));
            assert_eq!(&out.types[i * 5..i * 5 + 5], &best.word.kinds().map(SegmentKind::code));
        }
    }

    #[test]
    fn test_all_paths_layout_and_sentinels() {
        let mask = WordMask::from_words([PathWord::LpSpLp, PathWord::LnSnLn]);
        let config = ReedsSheppConfig::default()
            .with_enabled(mask)
            .with_optimal_only(false);
        let pairs = PosePairs::new(vec![Pose2D::origin()], vec![Pose2D::new(4.0, 0.0, 0.0)]).unwrap();
        let out = run(&BatchSolver::new(config, BatchConfig::serial()).unwrap(), &pairs);
        assert_eq!(out.distance.len(), 2);
        assert!((out.distance[0] - 4.0).abs() < 1e-12);
        assert_eq!(out.distance[1], f64::INFINITY);
        assert_eq!(&out.types[..], &[1, 2, 1, 0, 0, 1, 2, 1, 0, 0]);
        assert!(out.lengths[5..].iter().all(|l| *l == 0.0));
    }

    #[test]
    fn test_no_enabled_word_gives_sentinel() {
        let config = ReedsSheppConfig::default().with_enabled(WordMask::none());
        let pairs = PosePairs::new(vec![Pose2D::origin()], vec![Pose2D::new(1.0, 1.0, 1.0); 2]).unwrap();
        let out = run(&BatchSolver::new(config, BatchConfig::serial()).unwrap(), &pairs);
        assert!(out.distance.iter().all(|d| *d == f64::INFINITY));
        assert!(out.types.iter().all(|t| *t == 0));
        assert!(out.lengths.iter().all(|l| *l == 0.0));
    }

    #[test]
    fn test_buffer_sizes_are_checked() {
        let solver = BatchSolver::new(ReedsSheppConfig::default(), BatchConfig::serial()).unwrap();
        let pairs = PosePairs::new(vec![Pose2D::origin(); 3], vec![Pose2D::origin(); 3]).unwrap();
        let mut distance = vec![0.0; 2];
        assert!(matches!(
            solver.solve_distances(&pairs, &mut distance),
            Err(ReedsSheppError::DimensionMismatch(_))
        ));
        let mut distance = vec![0.0; 3];
        let mut lengths = vec![0.0; 14];
        let outputs = SegmentOutputs::new(&mut distance).with_lengths(&mut lengths);
        assert!(solver.solve_segments(&pairs, outputs).is_err());
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let solver = BatchSolver::new(ReedsSheppConfig::default(), BatchConfig::pool(2)).unwrap();
        let pairs = PosePairs::new(Vec::new(), Vec::new()).unwrap();
        let mut distance: Vec<f64> = Vec::new();
        assert!(solver.solve_distances(&pairs, &mut distance).is_ok());
    }
}
