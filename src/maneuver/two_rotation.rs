use super::{min_angle_turn, straight_after, Anchors, FirstTurn, ManeuverStrategy, PlanContext, PlanError};

/// Two full-lock arcs with the smallest first turn whose front corner still
/// clears the pivot point.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoRotationMinAngle;

impl ManeuverStrategy for TwoRotationMinAngle {
    fn name(&self) -> &'static str {
        "two-rotation-min-angle"
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        Ok(min_angle_turn(ctx, anchors))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TwoRotationZeroStraight;

impl ManeuverStrategy for TwoRotationZeroStraight {
    fn name(&self) -> &'static str {
        "two-rotation-zero-straight"
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        let r0 = ctx.geometry.r0;
        let cos = (anchors.start_axle_y - anchors.arc_centre.y + r0) / (2.0 * r0);
        if !(-1.0..=1.0).contains(&cos) {
            return Err(PlanError::Infeasible {
                quantity: "arc-to-arc lateral offset",
                value: anchors.start_axle_y - anchors.arc_centre.y,
            });
        }
        Ok(FirstTurn {
            angle: cos.acos(),
            straight: 0.0,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ManualTurn {
    /// Radians.
    pub first_turn: f64,
}

impl ManeuverStrategy for ManualTurn {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        let angle = self.first_turn;
        Ok(FirstTurn {
            angle,
            straight: straight_after(ctx, anchors, angle),
        })
    }
}
