use crate::{
    car::{Car, CarPose},
    config::{Config, Tolerances},
    executor::{Controls, Executor, ExecutorInit, Outcome, Report, State},
    maneuver::{plan, Maneuver, PlanError, PlanResult},
    moves::Move,
    street::{Layout, Street},
};
use log::{info, warn};
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Progress {
    Running,
    Finished,
    Cancelled,
}

#[derive(Debug)]
pub struct Scenario {
    plan: PlanResult,
    executor: Executor,
    tolerances: Tolerances,
    cursor: usize,
    outcomes: Vec<Outcome>,
    progress: Progress,
}

impl Scenario {
    pub fn new(config: &Config, maneuver: Maneuver) -> Result<Self, PlanError> {
        let car = config.scaled_car();
        let plan = plan(
            maneuver,
            &car,
            &config.scaled_street(),
            &config.scaled_planner(),
        )?;
        let executor = ExecutorInit::from_config(&config.scaled_executor())
            .build(Car::new(car, plan.start_pose), plan.street.clone());

        Ok(Self {
            plan,
            executor,
            tolerances: config.scaled_tolerances(),
            cursor: 0,
            outcomes: vec![],
            progress: Progress::Running,
        })
    }

    pub fn plan(&self) -> &PlanResult {
        &self.plan
    }

    pub fn car(&self) -> &Car {
        self.executor.car()
    }

    pub fn street(&self) -> &Street {
        self.executor.street()
    }

    pub fn controls(&self) -> Controls {
        self.executor.controls()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn current_move(&self) -> Option<&Move> {
        self.plan.moves.get(self.cursor)
    }

    pub fn message(&self) -> Option<&str> {
        self.executor.message()
    }

    /// Advances the current move by one tick, starting the next move when
    /// the previous one has finished. `None` once the scenario is over.
    pub fn tick(&mut self) -> Option<Report> {
        if self.progress != Progress::Running {
            return None;
        }
        let Some(step) = self.plan.moves.get(self.cursor) else {
            self.progress = Progress::Finished;
            return None;
        };
        if self.executor.state() != State::Running {
            self.executor.start(step);
        }

        let report = self.executor.tick();
        if let State::Finished(outcome) = report.state {
            self.outcomes.push(outcome);
            match outcome {
                Outcome::Cancelled => {
                    info!("{} cancelled at move {}", self.plan.moves.name(), self.cursor);
                    self.progress = Progress::Cancelled;
                }
                Outcome::Collided | Outcome::Unreachable => {
                    warn!(
                        "move {} of {} ended {outcome:?}, continuing",
                        self.cursor,
                        self.plan.moves.name()
                    );
                    self.cursor += 1;
                }
                Outcome::TargetReached | Outcome::StopCondition => {
                    self.cursor += 1;
                }
            }
            if self.progress == Progress::Running && self.cursor == self.plan.moves.len() {
                info!("{} finished", self.plan.moves.name());
                self.progress = Progress::Finished;
            }
        }
        Some(report)
    }

    pub fn run_to_end(&mut self) -> Progress {
        while self.tick().is_some() {}
        self.progress
    }

    /// Puts the car back at the start pose and clears pause and cancel.
    pub fn restart(&mut self) {
        self.restart_at(self.plan.start_pose);
    }

    pub fn restart_at(&mut self, pose: CarPose) {
        self.executor.controls().clear();
        self.executor.reset(pose);
        self.cursor = 0;
        self.outcomes.clear();
        self.progress = Progress::Running;
    }

    pub fn assess(&self) -> Assessment {
        assess(self.car(), self.street(), &self.tolerances)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub rotation_error_degrees: f64,
    /// Gap between the kerb, or the bay's back wall, and the nearest corner.
    pub kerb_distance: f64,
    pub within_tolerance: bool,
}

pub fn assess(car: &Car, street: &Street, tolerances: &Tolerances) -> Assessment {
    let target_rotation = match street.layout() {
        Layout::Parallel => 0.0,
        Layout::Bay => -FRAC_PI_2,
    };
    let rotation_error_degrees = (car.pose().rotation - target_rotation).abs().to_degrees();
    let lowest = car
        .corners()
        .iter()
        .map(|(_, point)| point.y)
        .fold(f64::NEG_INFINITY, f64::max);
    let kerb_distance = street.distance_to_kerb(lowest);

    let within_tolerance = rotation_error_degrees <= tolerances.max_rotation_degrees
        && (0.0..=tolerances.max_kerb_distance).contains(&kerb_distance);
    if within_tolerance {
        info!("parked: rotation off by {rotation_error_degrees:.2} deg, {kerb_distance:.2} from the kerb");
    } else {
        warn!(
            "parking failure: rotation off by {rotation_error_degrees:.2} deg, {kerb_distance:.2} from the kerb"
        );
    }

    Assessment {
        rotation_error_degrees,
        kerb_distance,
        within_tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{car::CarParams, street::StreetParams};
    use glam::DVec2;

    #[test]
    fn test_assess_parallel() {
        let street = Street::new(&StreetParams::default().scaled(20.0), Layout::Parallel, 400.0);
        let tolerances = Tolerances::default().scaled(20.0);
        let params = CarParams::default().scaled(20.0);

        let car = Car::new(params, CarPose::new(DVec2::new(400.0, 490.0), 0.0));
        let assessment = assess(&car, &street, &tolerances);
        assert!(assessment.within_tolerance);
        assert!((assessment.kerb_distance - 10.0).abs() < 1e-9);

        let car = Car::new(params, CarPose::new(DVec2::new(400.0, 400.0), 0.0));
        assert!(!assess(&car, &street, &tolerances).within_tolerance);

        let car = Car::new(params, CarPose::new(DVec2::new(400.0, 480.0), 0.1));
        assert!(!assess(&car, &street, &tolerances).within_tolerance);
    }

    #[test]
    fn test_cancel_stops_the_sequence() {
        let mut scenario = Scenario::new(&Config::default(), Maneuver::TwoRotationMinAngle).unwrap();
        for _ in 0..200 {
            scenario.tick();
        }
        scenario.controls().cancel();
        let pose = *scenario.car().pose();

        assert_eq!(scenario.run_to_end(), Progress::Cancelled);
        assert_eq!(*scenario.car().pose(), pose);
        assert_eq!(scenario.outcomes().last(), Some(&Outcome::Cancelled));
        assert!(scenario.tick().is_none());

        scenario.restart();
        assert_eq!(scenario.progress(), Progress::Running);
        assert_eq!(*scenario.car().pose(), scenario.plan().start_pose);
        assert!(scenario.outcomes().is_empty());
    }
}
