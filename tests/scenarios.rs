use approx::assert_relative_eq;
use parking_maneuver::{
    scenario::Progress, Config, Layout, Maneuver, Outcome, PlanError, Scenario,
};

#[test]
fn test_every_maneuver_parks() {
    let config = Config::default();
    for maneuver in Maneuver::all() {
        let mut scenario = Scenario::new(&config, maneuver).unwrap();
        assert_eq!(scenario.run_to_end(), Progress::Finished, "{maneuver}");
        assert_eq!(scenario.outcomes().len(), scenario.plan().moves.len());
        assert!(
            scenario
                .outcomes()
                .iter()
                .all(|outcome| matches!(outcome, Outcome::TargetReached | Outcome::StopCondition)),
            "{maneuver}: {:?}",
            scenario.outcomes()
        );

        let assessment = scenario.assess();
        assert!(assessment.within_tolerance, "{maneuver}: {assessment:?}");
    }
}

#[test]
fn test_two_turn_finish_matches_plan() {
    let mut scenario = Scenario::new(&Config::default(), Maneuver::TwoRotationMinAngle).unwrap();
    scenario.run_to_end();

    let assessment = scenario.assess();
    assert_relative_eq!(assessment.rotation_error_degrees, 0.0, epsilon = 1e-6);
    assert_relative_eq!(
        assessment.kerb_distance,
        scenario.plan().kerb_distance,
        epsilon = 1e-6
    );
}

#[test]
fn test_bay_ends_facing_out() {
    let mut scenario = Scenario::new(&Config::default(), Maneuver::BayPark).unwrap();
    assert_eq!(scenario.street().layout(), Layout::Bay);
    scenario.run_to_end();

    let car = scenario.car();
    assert_relative_eq!(
        car.pose().rotation,
        -std::f64::consts::FRAC_PI_2,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        scenario.street().distance_to_kerb(car.rear_bumper().y),
        scenario.plan().kerb_distance,
        epsilon = 1e-6
    );
}

#[test]
fn test_pause_holds_the_car() {
    let mut scenario = Scenario::new(&Config::default(), Maneuver::TwoRotationZeroStraight).unwrap();
    for _ in 0..150 {
        scenario.tick();
    }
    let controls = scenario.controls();
    controls.pause();
    let pose = *scenario.car().pose();
    for _ in 0..50 {
        scenario.tick();
    }
    assert_eq!(*scenario.car().pose(), pose);

    controls.resume();
    assert_eq!(scenario.run_to_end(), Progress::Finished);
    assert!(scenario.assess().within_tolerance);
}

#[test]
fn test_restart_replays_the_same_moves() {
    let mut scenario = Scenario::new(&Config::default(), Maneuver::ThreeRotationMinAngle).unwrap();
    scenario.run_to_end();
    let first = *scenario.car().pose();

    scenario.restart();
    assert_eq!(*scenario.car().pose(), scenario.plan().start_pose);
    scenario.run_to_end();
    assert_eq!(*scenario.car().pose(), first);
}

#[test]
fn test_config_from_toml() {
    let config = Config::from_toml_str(
        r#"
        [street]
        parking_space = 9000.0

        [executor]
        speed = 2000.0
        "#,
    )
    .unwrap();
    let mut scenario = Scenario::new(&config, Maneuver::TwoRotationMinAngle).unwrap();
    assert_relative_eq!(scenario.plan().parking_space_length, 450.0);
    assert_eq!(scenario.run_to_end(), Progress::Finished);
    assert!(scenario.assess().within_tolerance);
}

#[test]
fn test_short_space_is_rejected() {
    let mut config = Config::default();
    config.street.parking_space = Some(6000.0);
    let err = Scenario::new(&config, Maneuver::TwoRotationMinAngle).unwrap_err();
    assert!(matches!(err, PlanError::SpaceTooShort { .. }));

    assert!(matches!(
        "parallel-magic".parse::<Maneuver>(),
        Err(PlanError::UnknownManeuver(_))
    ));
}

#[test]
fn test_tight_lock_car() {
    let mut config = Config::default();
    config.car.min_turning_radius = 4500.0;

    // the quarter turn would swing the front corner off the canvas
    assert!(matches!(
        Scenario::new(&config, Maneuver::BayPark),
        Err(PlanError::Infeasible { .. })
    ));

    let mut scenario = Scenario::new(&config, Maneuver::TwoRotationMinAngle).unwrap();
    assert_eq!(scenario.run_to_end(), Progress::Finished);
    assert!(!scenario.outcomes().contains(&Outcome::Collided));
    assert!(scenario.assess().within_tolerance);
}
