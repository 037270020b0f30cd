//
// Reeds-Shepp path planning demo
//
// Plans one path, plots it, then solves a batch of random pose pairs
// serially and on a worker pool.

use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reeds_shepp::path_planning::reeds_shepp::{BatchConfig, BatchSolver, PosePairs, SegmentOutputs, MAX_SEGMENTS};
use reeds_shepp::utils::Visualizer;
use reeds_shepp::{Pose2D, ReedsSheppConfig, ReedsSheppPlanner, ReedsSheppResult};

const NUM_RANDOM_PAIRS: usize = 10_000;

fn random_pose(rng: &mut StdRng) -> Pose2D {
    Pose2D::new(
        rng.gen_range(-20.0..20.0),
        rng.gen_range(-20.0..20.0),
        rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
    )
}

fn plan_single() -> ReedsSheppResult<()> {
    let start = Pose2D::new(-1.0, -4.0, (-20.0_f64).to_radians());
    let goal = Pose2D::new(5.0, 5.0, (25.0_f64).to_radians());
    let turning_radius = 10.0;
    let step_size = 0.05;

    let planner = ReedsSheppPlanner::new(
        ReedsSheppConfig::default()
            .with_turning_radius(turning_radius)
            .with_costs(1.0, 1.5),
    )?;
    let course = planner.plan_course(&start, &goal, step_size)?;
    println!("Path: {}", course.path);
    for segment in course.path.segments() {
        println!(
            "  {:?} {:?} {:.3} m",
            segment.kind, segment.direction, segment.length
        );
    }
    println!("Sampled {} poses", course.samples.len());

    let mut vis = Visualizer::new();
    vis.set_title("Reeds-Shepp Path Planning")
        .plot_course(&course)
        .plot_start(&start, 1.0)
        .plot_goal(&goal, 1.0);
    let output_path = "img/path_planning/reeds_shepp_result.png";
    match vis.save_png(output_path, 800, 600) {
        Ok(()) => println!("Plot saved to: {}", output_path),
        Err(e) => println!("Could not save plot: {}", e),
    }
    Ok(())
}

fn run_batch(config: &ReedsSheppConfig) -> ReedsSheppResult<()> {
    let mut rng = StdRng::seed_from_u64(0);
    let starts: Vec<Pose2D> = (0..NUM_RANDOM_PAIRS).map(|_| random_pose(&mut rng)).collect();
    let goals: Vec<Pose2D> = (0..NUM_RANDOM_PAIRS).map(|_| random_pose(&mut rng)).collect();
    let pairs = PosePairs::new(starts, goals)?;

    let mut results = Vec::new();
    for batch in [BatchConfig::serial(), BatchConfig::global()] {
        let solver = BatchSolver::new(config.clone(), batch)?;
        let mut distance = vec![0.0; pairs.len()];
        let mut lengths = vec![0.0; pairs.len() * MAX_SEGMENTS];
        let mut types = vec![0u32; pairs.len() * MAX_SEGMENTS];

        let begin = Instant::now();
        solver.solve_segments(
            &pairs,
            SegmentOutputs::new(&mut distance)
                .with_lengths(&mut lengths)
                .with_types(&mut types),
        )?;
        info!("{:?}: {} pairs in {:?}", batch.workers, pairs.len(), begin.elapsed());
        println!("{:?} workers: {:?}", batch.workers, begin.elapsed());
        results.push(distance);
    }

    let mean = results[0].iter().sum::<f64>() / NUM_RANDOM_PAIRS as f64;
    println!("Mean optimal cost over {} random pairs: {:.3}", NUM_RANDOM_PAIRS, mean);
    println!("Serial and parallel results identical: {}", results[0] == results[1]);
    Ok(())
}

fn main() -> ReedsSheppResult<()> {
    env_logger::init();
    println!("Reeds Shepp path planner start!!");

    plan_single()?;
    run_batch(&ReedsSheppConfig::default().with_turning_radius(2.0))?;

    println!("Reeds Shepp path planner finish!!");
    Ok(())
}
