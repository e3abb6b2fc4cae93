use anyhow::Result;
use clap::Parser;
use glam::DVec2;
use parking_maneuver::{Config, Maneuver, Scenario};
use rand::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
struct Opts {
    /// Maneuver name, or manual:<degrees>.
    #[clap(default_value = "two-rotation-min-angle")]
    pub maneuver: String,
    /// TOML file overriding the default car, street and tolerances.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Displaces the start pose randomly by up to this many millimetres.
    #[clap(long)]
    pub jitter: Option<f64>,
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let Opts {
        maneuver,
        config,
        jitter,
        seed,
    } = Opts::parse();

    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let maneuver: Maneuver = maneuver.parse()?;

    let mut scenario = Scenario::new(&config, maneuver)?;
    let plan = scenario.plan();
    println!("maneuver:       {}", plan.maneuver);
    println!(
        "parking space:  {:.0} mm",
        plan.parking_space_length * config.scale
    );
    if let Some(width) = plan.bay_width {
        println!("bay width:      {:.0} mm", width * config.scale);
    }
    println!("kerb distance:  {:.0} mm", plan.kerb_distance * config.scale);
    println!(
        "first turn:     {:.2} deg, then {:.0} mm straight",
        plan.first_turn.angle.to_degrees(),
        plan.first_turn.straight * config.scale
    );
    for (index, step) in plan.moves.iter().enumerate() {
        println!("  {index}: {step}");
    }

    // Replay from a displaced start to see how sensitive the plan is.
    if let Some(jitter) = jitter {
        let mut rng = StdRng::seed_from_u64(seed);
        let offset = jitter.abs() / config.scale;
        let mut pose = scenario.plan().start_pose;
        pose.position += DVec2::new(
            rng.gen_range(-offset..=offset),
            rng.gen_range(-offset..=offset),
        );
        scenario.restart_at(pose);
    }

    scenario.run_to_end();
    for (index, outcome) in scenario.outcomes().iter().enumerate() {
        println!("move {index}: {outcome:?}");
    }

    let assessment = scenario.assess();
    println!(
        "rotation error {:.2} deg, {:.0} mm from the kerb: {}",
        assessment.rotation_error_degrees,
        assessment.kerb_distance * config.scale,
        if assessment.within_tolerance {
            "parked"
        } else {
            "failed"
        }
    );

    Ok(())
}
