use crate::{
    car::{Car, Lock},
    constants::TARGET_RESOLUTION,
};
use std::fmt;

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

    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Fixed(f64),
    /// Runs until a stop condition or a collision ends the move.
    Unbounded,
    /// Brings the body centre midway between two x positions.
    CentreBetween { rear: f64, front: f64 },
    /// Brings the middle of the rear bumper to the given y.
    RearBumperToY(f64),
}

impl Distance {
    /// Direction and non-negative length to travel from the current pose.
    /// Position targets choose their own direction.
    pub fn resolve(&self, direction: Direction, car: &Car) -> (Direction, f64) {
        let displacement = match *self {
            Distance::Fixed(distance) => direction.sign() * distance,
            Distance::Unbounded => return (direction, f64::INFINITY),
            Distance::CentreBetween { rear, front } => {
                along_heading((rear + front) / 2.0 - car.centre().x, car.heading().x)
            }
            Distance::RearBumperToY(y) => along_heading(y - car.rear_bumper().y, car.heading().y),
        };
        (Direction::from_sign(displacement), displacement.abs())
    }
}

fn along_heading(offset: f64, component: f64) -> f64 {
    if component.abs() < f64::EPSILON {
        0.0
    } else {
        offset / component
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    Fixed(f64),
    ToRotation(f64),
}

impl Angle {
    /// Rotation left to turn when the body rotates in the sense of
    /// `turn_sign`. `None` when the target rotation lies the other way.
    pub fn resolve(&self, car: &Car, turn_sign: f64) -> Option<f64> {
        match *self {
            Angle::Fixed(angle) => Some(angle.abs()),
            Angle::ToRotation(target) => {
                let along = (target - car.pose().rotation) * turn_sign.signum();
                (along > -1.0 / TARGET_RESOLUTION).then_some(along.max(0.0))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    RearAxleBehind { x: f64 },
    /// The line along the car's kerb side, through the rear-right corner,
    /// meets the kerb at or beyond `x`.
    KerbLineReaches { kerb_y: f64, x: f64 },
    /// Turning at `radius` until parallel would put the rear axle at `axle_y`.
    ArcLandsAt { axle_y: f64, radius: f64 },
}

impl StopCondition {
    pub fn is_met(&self, car: &Car) -> bool {
        let pose = car.pose();
        match *self {
            StopCondition::RearAxleBehind { x } => pose.position.x <= x,
            StopCondition::KerbLineReaches { kerb_y, x } => {
                let heading = car.heading();
                if heading.y >= 0.0 {
                    return false;
                }
                let corner = car.rear_right();
                let reach = (kerb_y - corner.y) / heading.y;
                corner.x + reach * heading.x >= x
            }
            StopCondition::ArcLandsAt { axle_y, radius } => {
                pose.position.y + radius * (1.0 - pose.rotation.cos()) >= axle_y
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveKind {
    Steer(Lock),
    Straight {
        direction: Direction,
        distance: Distance,
    },
    Arc {
        direction: Direction,
        angle: Angle,
        /// Used when the wheels turn out to be centred.
        distance: Option<Distance>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub kind: MoveKind,
    pub stop: Option<StopCondition>,
    pub message: Option<String>,
}

impl Move {
    fn new(kind: MoveKind) -> Self {
        Self {
            kind,
            stop: None,
            message: None,
        }
    }

    pub fn steer(lock: Lock) -> Self {
        Self::new(MoveKind::Steer(lock))
    }

    pub fn straight(direction: Direction, distance: Distance) -> Self {
        Self::new(MoveKind::Straight {
            direction,
            distance,
        })
    }

    pub fn arc(direction: Direction, angle: Angle) -> Self {
        Self::new(MoveKind::Arc {
            direction,
            angle,
            distance: None,
        })
    }

    /// Sets the distance an arc falls back to when driven with centred wheels.
    /// No effect on other moves.
    pub fn or_straight(mut self, fallback: Distance) -> Self {
        if let MoveKind::Arc {
            ref mut distance, ..
        } = self.kind
        {
            *distance = Some(fallback);
        }
        self
    }

    pub fn until(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Steer(lock) => write!(f, "steer {lock:?}")?,
            MoveKind::Straight {
                direction,
                distance,
            } => write!(f, "straight {direction:?} {distance:?}")?,
            MoveKind::Arc {
                direction, angle, ..
            } => write!(f, "arc {direction:?} {angle:?}")?,
        }
        if let Some(stop) = &self.stop {
            write!(f, " until {stop:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveSequence {
    name: String,
    moves: Vec<Move>,
}

impl MoveSequence {
    pub fn new(name: impl Into<String>, moves: Vec<Move>) -> Self {
        Self {
            name: name.into(),
            moves,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::{CarParams, CarPose};
    use approx::assert_relative_eq;
    use glam::DVec2;
    use std::f64::consts::FRAC_PI_2;

    fn car(x: f64, y: f64, rotation: f64) -> Car {
        Car::new(
            CarParams::default().scaled(20.0),
            CarPose::new(DVec2::new(x, y), rotation),
        )
    }

    #[test]
    fn test_fixed_distance_keeps_direction() {
        let car = car(0.0, 0.0, 0.0);
        assert_eq!(
            Distance::Fixed(12.0).resolve(Direction::Backward, &car),
            (Direction::Backward, 12.0)
        );
        assert_eq!(
            Distance::Unbounded.resolve(Direction::Forward, &car),
            (Direction::Forward, f64::INFINITY)
        );
    }

    #[test]
    fn test_centre_between_picks_direction() {
        // body centre sits 82.35 ahead of the rear axle
        let car = car(100.0, 0.0, 0.0);
        let (direction, distance) =
            Distance::CentreBetween { rear: 0.0, front: 200.0 }.resolve(Direction::Forward, &car);
        assert_eq!(direction, Direction::Backward);
        assert_relative_eq!(distance, 82.35, epsilon = 1e-9);

        let (direction, distance) =
            Distance::CentreBetween { rear: 300.0, front: 400.0 }.resolve(Direction::Backward, &car);
        assert_eq!(direction, Direction::Forward);
        assert_relative_eq!(distance, 350.0 - 182.35, epsilon = 1e-9);
    }

    #[test]
    fn test_rear_bumper_to_y_when_facing_up() {
        let car = car(100.0, 300.0, -FRAC_PI_2);
        // rear bumper is 50 below the axle
        let (direction, distance) =
            Distance::RearBumperToY(400.0).resolve(Direction::Backward, &car);
        assert_eq!(direction, Direction::Backward);
        assert_relative_eq!(distance, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_to_rotation() {
        let car = car(0.0, 0.0, -0.4);
        assert_relative_eq!(Angle::ToRotation(0.0).resolve(&car, 1.0).unwrap(), 0.4);
        assert_relative_eq!(
            Angle::ToRotation(-FRAC_PI_2).resolve(&car, -1.0).unwrap(),
            FRAC_PI_2 - 0.4
        );
        assert_relative_eq!(Angle::Fixed(-0.2).resolve(&car, -1.0).unwrap(), 0.2);
    }

    #[test]
    fn test_angle_to_rotation_on_the_wrong_side() {
        let car = car(0.0, 0.0, 0.2);
        assert_eq!(Angle::ToRotation(0.0).resolve(&car, 1.0), None);
        assert_relative_eq!(Angle::ToRotation(0.0).resolve(&car, -1.0).unwrap(), 0.2);
        // already there, up to rounding
        assert_eq!(Angle::ToRotation(0.2 + 1e-12).resolve(&car, -1.0), Some(0.0));
    }

    #[test]
    fn test_stop_conditions() {
        let stop = StopCondition::RearAxleBehind { x: 50.0 };
        assert!(stop.is_met(&car(50.0, 0.0, 0.0)));
        assert!(!stop.is_met(&car(51.0, 0.0, 0.0)));

        let stop = StopCondition::ArcLandsAt {
            axle_y: 110.0,
            radius: 100.0,
        };
        assert!(!stop.is_met(&car(0.0, 100.0, 0.0)));
        assert!(stop.is_met(&car(0.0, 100.0, -0.5)));
    }

    #[test]
    fn test_kerb_line_needs_nose_up() {
        let stop = StopCondition::KerbLineReaches {
            kerb_y: 550.0,
            x: 300.0,
        };
        assert!(!stop.is_met(&car(500.0, 400.0, 0.0)));
        assert!(!stop.is_met(&car(500.0, 400.0, 0.3)));

        // The intersection trails far behind the car at shallow angles and
        // closes in as the nose rises.
        assert!(!stop.is_met(&car(500.0, 400.0, -0.3)));
        assert!(stop.is_met(&car(500.0, 400.0, -1.2)));
    }

    #[test]
    fn test_builders() {
        let step = Move::arc(Direction::Backward, Angle::Fixed(0.5))
            .or_straight(Distance::Fixed(3.0))
            .until(StopCondition::RearAxleBehind { x: 1.0 })
            .with_message("turn in");
        assert_eq!(
            step.kind,
            MoveKind::Arc {
                direction: Direction::Backward,
                angle: Angle::Fixed(0.5),
                distance: Some(Distance::Fixed(3.0)),
            }
        );
        assert_eq!(step.message.as_deref(), Some("turn in"));

        let sequence = MoveSequence::new("demo", vec![Move::steer(Lock::Center), step]);
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.name(), "demo");
        assert_eq!(
            Move::steer(Lock::Center).or_straight(Distance::Unbounded),
            Move::steer(Lock::Center)
        );
    }
}
