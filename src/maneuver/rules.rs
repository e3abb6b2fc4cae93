use super::{
    min_angle_turn, two_turn_extra_space, Anchors, Basis, FirstTurn, ManeuverStrategy,
    PlanContext, PlanError,
};
use crate::{
    car::{CarPose, Lock},
    constants::QUARTER_TURN,
    moves::{Angle, Direction, Distance, Move, MoveSequence, StopCondition},
};
use glam::DVec2;

/// Driving-school rules: every turn ends on something the driver can see
/// rather than on a computed angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesBased;

impl ManeuverStrategy for RulesBased {
    fn name(&self) -> &'static str {
        "rules-based"
    }

    fn extra_parking_space(&self, ctx: &PlanContext, basis: &Basis) -> f64 {
        two_turn_extra_space(ctx, basis.kerb_distance) + ctx.planner.rules_extra_space
    }

    /// Nominal only. The turns are ended by stop conditions while driving.
    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        Ok(min_angle_turn(ctx, anchors))
    }

    fn start_pose(&self, ctx: &PlanContext, anchors: &Anchors, _turn: &FirstTurn) -> CarPose {
        let x = anchors.front_outer.x + ctx.planner.rules_start_gap;
        CarPose::new(DVec2::new(x, anchors.start_axle_y), 0.0)
    }

    fn move_sequence(
        &self,
        ctx: &PlanContext,
        _basis: &Basis,
        anchors: &Anchors,
        _turn: &FirstTurn,
    ) -> MoveSequence {
        let moves = vec![
            Move::straight(Direction::Backward, Distance::Unbounded)
                .until(StopCondition::RearAxleBehind {
                    x: anchors.front_outer.x,
                })
                .with_message("reverse until level with the front car's bumper"),
            Move::steer(Lock::Clockwise).with_message("full lock towards the kerb"),
            Move::arc(Direction::Backward, Angle::Fixed(QUARTER_TURN))
                .until(StopCondition::KerbLineReaches {
                    kerb_y: ctx.kerb_y(),
                    x: anchors.rear_outer.x + ctx.planner.rules_kerb_offset,
                })
                .with_message("turn until the kerb line passes the rear car"),
            Move::steer(Lock::Center),
            Move::straight(Direction::Backward, Distance::Unbounded)
                .until(StopCondition::ArcLandsAt {
                    axle_y: anchors.final_axle.y,
                    radius: ctx.geometry.r0,
                })
                .with_message("reverse until the opposite lock lands at the kerb"),
            Move::steer(Lock::Counterclockwise).with_message("full lock away from the kerb"),
            Move::arc(Direction::Backward, Angle::ToRotation(0.0)).with_message("straightening"),
            Move::steer(Lock::Center),
            Move::straight(
                Direction::Forward,
                Distance::CentreBetween {
                    rear: anchors.rear_limit_x,
                    front: anchors.pivot.x,
                },
            )
            .with_message("centre in the space"),
        ];
        MoveSequence::new(self.name(), moves)
    }
}
