mod bay;
mod fixed_start;
mod geometry;
mod rules;
mod three_rotation;
mod two_rotation;

pub use bay::BayPark;
pub use fixed_start::FixedStart;
pub use geometry::{finite, largest, smallest, Geometry, PlanContext};
pub use rules::RulesBased;
pub use three_rotation::ThreeRotationMinAngle;
pub use two_rotation::{ManualTurn, TwoRotationMinAngle, TwoRotationZeroStraight};

use crate::{
    car::{CarParams, CarParamsError, CarPose, Lock},
    config::PlannerConfig,
    constants::DEFAULT_MANUAL_FIRST_TURN_DEGREES,
    moves::{Angle, Direction, Distance, Move, MoveSequence},
    street::{Layout, Street, StreetParams},
};
use glam::DVec2;
use log::{debug, info};
use std::{f64::consts::FRAC_PI_2, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("unknown maneuver '{0}'")]
    UnknownManeuver(String),
    #[error("invalid car parameters: {0}")]
    InvalidCar(#[from] CarParamsError),
    #[error("{quantity} is not finite for these parameters")]
    NonFinite { quantity: &'static str },
    #[error("first turn of {degrees:.3} degrees is outside [0, {max}] degrees")]
    FirstTurnOutOfRange { degrees: f64, max: f64 },
    #[error("{quantity} of {value:.3} cannot be driven")]
    Infeasible { quantity: &'static str, value: f64 },
    #[error("parking space {available:.3} is shorter than the required {required:.3}")]
    SpaceTooShort { required: f64, available: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualParams {
    pub first_turn_degrees: f64,
}

impl Default for ManualParams {
    fn default() -> Self {
        Self {
            first_turn_degrees: DEFAULT_MANUAL_FIRST_TURN_DEGREES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Maneuver {
    TwoRotationMinAngle,
    TwoRotationZeroStraight,
    ThreeRotationMinAngle,
    FixedStart,
    Manual(ManualParams),
    RulesBased,
    BayPark,
}

impl Maneuver {
    pub const NAMES: [&'static str; 7] = [
        "two-rotation-min-angle",
        "two-rotation-zero-straight",
        "three-rotation-min-angle",
        "fixed-start",
        "manual",
        "rules-based",
        "bay-park",
    ];

    pub fn all() -> [Maneuver; 7] {
        [
            Maneuver::TwoRotationMinAngle,
            Maneuver::TwoRotationZeroStraight,
            Maneuver::ThreeRotationMinAngle,
            Maneuver::FixedStart,
            Maneuver::Manual(ManualParams::default()),
            Maneuver::RulesBased,
            Maneuver::BayPark,
        ]
    }

    pub fn name(&self) -> &'static str {
        self.strategy().name()
    }

    pub fn layout(&self) -> Layout {
        self.strategy().layout()
    }

    pub fn strategy(&self) -> Box<dyn ManeuverStrategy> {
        match *self {
            Maneuver::TwoRotationMinAngle => Box::new(TwoRotationMinAngle),
            Maneuver::TwoRotationZeroStraight => Box::new(TwoRotationZeroStraight),
            Maneuver::ThreeRotationMinAngle => Box::new(ThreeRotationMinAngle),
            Maneuver::FixedStart => Box::new(FixedStart),
            Maneuver::Manual(params) => Box::new(ManualTurn {
                first_turn: params.first_turn_degrees.to_radians(),
            }),
            Maneuver::RulesBased => Box::new(RulesBased),
            Maneuver::BayPark => Box::new(BayPark),
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Maneuver::Manual(params) => write!(f, "manual:{}", params.first_turn_degrees),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for Maneuver {
    type Err = PlanError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let maneuver = match text {
            "two-rotation-min-angle" => Maneuver::TwoRotationMinAngle,
            "two-rotation-zero-straight" => Maneuver::TwoRotationZeroStraight,
            "three-rotation-min-angle" => Maneuver::ThreeRotationMinAngle,
            "fixed-start" => Maneuver::FixedStart,
            "manual" => Maneuver::Manual(ManualParams::default()),
            "rules-based" => Maneuver::RulesBased,
            "bay-park" => Maneuver::BayPark,
            _ => {
                let degrees = text
                    .strip_prefix("manual:")
                    .and_then(|degrees| degrees.parse::<f64>().ok())
                    .filter(|degrees| degrees.is_finite())
                    .ok_or_else(|| PlanError::UnknownManeuver(text.to_string()))?;
                Maneuver::Manual(ManualParams {
                    first_turn_degrees: degrees,
                })
            }
        };
        Ok(maneuver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    /// Rotation at which a three-turn car would touch the rear car.
    pub collision_angle: f64,
    pub kerb_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub pivot: DVec2,
    pub rear_outer: DVec2,
    pub front_outer: DVec2,
    pub rear_limit_x: f64,
    /// Rear-axle midpoint of the parked car.
    pub final_axle: DVec2,
    /// Turn centre of the last reversing arc.
    pub arc_centre: DVec2,
    pub start_axle_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstTurn {
    pub angle: f64,
    pub straight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    pub maneuver: Maneuver,
    /// Gap between the parked cars, or the bay depth for bays.
    pub parking_space_length: f64,
    pub bay_width: Option<f64>,
    pub kerb_distance: f64,
    pub collision_angle: f64,
    pub first_turn: FirstTurn,
    pub start_pose: CarPose,
    pub street: Street,
    pub moves: MoveSequence,
}

/// Per-maneuver derivations, called by [`plan`] in declaration order.
pub trait ManeuverStrategy {
    fn name(&self) -> &'static str;

    fn layout(&self) -> Layout {
        Layout::Parallel
    }

    fn collision_angle(&self, _ctx: &PlanContext) -> f64 {
        0.0
    }

    /// Finishing distance from the kerb. The rear corner swings out by
    /// `rb - (r0 + w/2)` while the car straightens.
    fn parked_kerb_distance(&self, ctx: &PlanContext, _collision_angle: f64) -> f64 {
        let Geometry { rb, outer_axle, .. } = ctx.geometry;
        let swing = rb - outer_axle + ctx.planner.min_kerb_distance;
        largest(&[ctx.kerb_floor(), swing])
    }

    /// Space beyond the car length and two safety gaps.
    fn extra_parking_space(&self, ctx: &PlanContext, basis: &Basis) -> f64 {
        two_turn_extra_space(ctx, basis.kerb_distance)
    }

    fn required_space(&self, ctx: &PlanContext, basis: &Basis) -> f64 {
        ctx.base_space(self.layout()) + self.extra_parking_space(ctx, basis)
    }

    fn anchors(&self, ctx: &PlanContext, basis: &Basis, street: &Street) -> Anchors {
        let Geometry { r0, rear_overhang, .. } = ctx.geometry;
        let final_axle = DVec2::new(
            street.rear_limit_x() + rear_overhang,
            ctx.final_axle_y(basis.kerb_distance),
        );
        Anchors {
            final_axle,
            arc_centre: final_axle - DVec2::new(0.0, r0),
            ..base_anchors(ctx, street, self.layout(), ctx.planner.start_lateral_gap)
        }
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError>;

    /// Start pose that a reversing full-lock arc of the first turn angle,
    /// the straight and the closing arc carry onto the final pose.
    fn start_pose(&self, ctx: &PlanContext, anchors: &Anchors, turn: &FirstTurn) -> CarPose {
        let r0 = ctx.geometry.r0;
        let FirstTurn { angle, straight } = *turn;
        let x = anchors.arc_centre.x + 2.0 * r0 * angle.sin() + straight * angle.cos();
        CarPose::new(DVec2::new(x, anchors.start_axle_y), 0.0)
    }

    fn move_sequence(
        &self,
        _ctx: &PlanContext,
        basis: &Basis,
        _anchors: &Anchors,
        turn: &FirstTurn,
    ) -> MoveSequence {
        reversing_turns(self.name(), basis, turn)
    }
}

/// Layout-independent anchors. The final pose and arc centre are left at
/// the pivot for the caller to fill in.
pub(crate) fn base_anchors(
    ctx: &PlanContext,
    street: &Street,
    layout: Layout,
    lateral_gap: f64,
) -> Anchors {
    let pivot = street.pivot_point();
    Anchors {
        pivot,
        rear_outer: street.rear_outer_corner(),
        front_outer: street.front_outer_corner(),
        rear_limit_x: street.rear_limit_x(),
        final_axle: pivot,
        arc_centre: pivot,
        start_axle_y: ctx.start_axle_y(layout, lateral_gap),
    }
}

/// Space needed for the front corner to clear the pivot on the closing arc.
pub(crate) fn two_turn_extra_space(ctx: &PlanContext, kerb_distance: f64) -> f64 {
    let Geometry { r0, rc, reach, .. } = ctx.geometry;
    let depth = ctx.final_axle_y(kerb_distance) - ctx.pivot_y(Layout::Parallel);
    let front = (rc.powi(2) - (r0 - depth).powi(2)).sqrt();
    (front - reach).max(0.0)
}

/// First turn that puts the outer front corner's arc through the pivot.
pub(crate) fn min_angle_turn(ctx: &PlanContext, anchors: &Anchors) -> FirstTurn {
    let Geometry { r0, outer_axle, reach, .. } = ctx.geometry;
    let to_pivot = anchors.pivot - anchors.arc_centre;
    let angle = outer_axle.atan2(reach) - to_pivot.y.atan2(to_pivot.x);
    FirstTurn {
        angle,
        straight: straight_after(ctx, anchors, angle),
    }
}

pub(crate) fn straight_after(ctx: &PlanContext, anchors: &Anchors, angle: f64) -> f64 {
    let r0 = ctx.geometry.r0;
    (anchors.arc_centre.y + 2.0 * r0 * angle.cos() - r0 - anchors.start_axle_y) / angle.sin()
}

/// Clockwise reversing arc, optional straight, counterclockwise arc to the
/// collision angle and, when that angle is not zero, a forward clockwise arc
/// back to parallel.
pub(crate) fn reversing_turns(name: &str, basis: &Basis, turn: &FirstTurn) -> MoveSequence {
    let mut moves = vec![
        Move::steer(Lock::Clockwise).with_message("full lock towards the kerb"),
        Move::arc(Direction::Backward, Angle::Fixed(turn.angle)).with_message("turning in"),
        Move::steer(Lock::Center),
    ];
    if turn.straight > 0.0 {
        moves.push(
            Move::straight(Direction::Backward, Distance::Fixed(turn.straight))
                .with_message("reversing into the space"),
        );
    }
    moves.push(Move::steer(Lock::Counterclockwise).with_message("full lock away from the kerb"));
    moves.push(
        Move::arc(
            Direction::Backward,
            Angle::ToRotation(-basis.collision_angle),
        )
        .with_message("straightening"),
    );
    if basis.collision_angle > 0.0 {
        moves.push(Move::steer(Lock::Clockwise));
        moves.push(
            Move::arc(Direction::Forward, Angle::ToRotation(0.0)).with_message("pulling forward"),
        );
    }
    moves.push(Move::steer(Lock::Center).with_message("parked"));
    MoveSequence::new(name, moves)
}

/// Rejects first turns that cannot be driven forwards into the space.
fn check_first_turn(turn: FirstTurn) -> Result<FirstTurn, PlanError> {
    let FirstTurn { angle, straight } = turn;
    finite("first turn angle", angle)?;
    finite("straight distance", straight)?;
    if !(angle > 0.0 && angle <= FRAC_PI_2) {
        return Err(PlanError::Infeasible {
            quantity: "first turn angle",
            value: angle.to_degrees(),
        });
    }
    if straight < -1e-9 {
        return Err(PlanError::Infeasible {
            quantity: "straight distance",
            value: straight,
        });
    }
    Ok(FirstTurn {
        angle,
        straight: straight.max(0.0),
    })
}

/// Smallest y the outer front corner reaches while reversing `turn.angle`
/// on clockwise lock from `start`.
fn first_arc_top(ctx: &PlanContext, start: &CarPose, turn: &FirstTurn) -> f64 {
    let Geometry {
        r0,
        outer_axle,
        reach,
        ..
    } = ctx.geometry;
    let radius = outer_axle.hypot(reach);
    let centre_y = start.position.y + r0;
    // angle between the corner and straight up, seen from the turn centre
    let from_vertical = reach.atan2(outer_axle);
    if turn.angle >= from_vertical {
        centre_y - radius
    } else {
        centre_y - radius * (from_vertical - turn.angle).cos()
    }
}

fn check_first_arc_clearance(
    ctx: &PlanContext,
    street: &Street,
    start: &CarPose,
    turn: &FirstTurn,
) -> Result<(), PlanError> {
    let clearance = first_arc_top(ctx, start, turn) - street.canvas().top();
    if clearance < 0.0 {
        return Err(PlanError::Infeasible {
            quantity: "first arc clearance",
            value: clearance,
        });
    }
    Ok(())
}

pub fn plan(
    maneuver: Maneuver,
    car: &CarParams,
    street: &StreetParams,
    planner: &PlannerConfig,
) -> Result<PlanResult, PlanError> {
    let ctx = PlanContext::new(car, street, planner)?;
    let strategy = maneuver.strategy();
    let layout = strategy.layout();

    let collision_angle = finite("collision angle", strategy.collision_angle(&ctx))?;
    let kerb_distance = finite(
        "kerb distance",
        strategy.parked_kerb_distance(&ctx, collision_angle),
    )?;
    let basis = Basis {
        collision_angle,
        kerb_distance,
    };
    debug!(
        "{}: collision angle {:.3} deg, kerb distance {kerb_distance:.3}",
        strategy.name(),
        collision_angle.to_degrees()
    );

    let required = finite("parking space", strategy.required_space(&ctx, &basis))?;
    let space = match street.parking_space {
        Some(available) if available < required => {
            return Err(PlanError::SpaceTooShort {
                required,
                available,
            })
        }
        Some(available) => available,
        None => required,
    };
    let street_layout = Street::new(street, layout, space);

    let anchors = strategy.anchors(&ctx, &basis, &street_layout);
    let first_turn = check_first_turn(strategy.first_turn(&ctx, &anchors)?)?;
    let start_pose = strategy.start_pose(&ctx, &anchors, &first_turn);
    check_first_arc_clearance(&ctx, &street_layout, &start_pose, &first_turn)?;
    let moves = strategy.move_sequence(&ctx, &basis, &anchors, &first_turn);
    debug!(
        "{}: first turn {:.3} deg, straight {:.3}, start ({:.3}, {:.3})",
        strategy.name(),
        first_turn.angle.to_degrees(),
        first_turn.straight,
        start_pose.position.x,
        start_pose.position.y
    );

    let (parking_space_length, bay_width) = match layout {
        Layout::Parallel => (space, None),
        Layout::Bay => (ctx.base_space(Layout::Parallel), Some(space)),
    };
    info!(
        "planned {maneuver}: space {parking_space_length:.3}, {} moves",
        moves.len()
    );

    Ok(PlanResult {
        maneuver,
        parking_space_length,
        bay_width,
        kerb_distance,
        collision_angle,
        first_turn,
        start_pose,
        street: street_layout,
        moves,
    })
}
