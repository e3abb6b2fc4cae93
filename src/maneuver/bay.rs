use super::{
    base_anchors, Anchors, Basis, FirstTurn, Geometry, ManeuverStrategy, PlanContext, PlanError,
};
use crate::{
    car::{CarPose, Lock},
    constants::QUARTER_TURN,
    moves::{Angle, Direction, Distance, Move, MoveSequence},
    street::{Layout, Street},
};
use glam::DVec2;

/// Reverses a quarter turn into a bay between two perpendicular cars and
/// backs up to the wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct BayPark;

impl BayPark {
    fn start_axle_y(ctx: &PlanContext) -> f64 {
        ctx.start_axle_y(Layout::Bay, ctx.planner.bay_start_lateral_gap)
    }
}

impl ManeuverStrategy for BayPark {
    fn name(&self) -> &'static str {
        "bay-park"
    }

    fn layout(&self) -> Layout {
        Layout::Bay
    }

    /// The wall stops the car before the kerb matters, so there is no swing
    /// allowance.
    fn parked_kerb_distance(&self, ctx: &PlanContext, _collision_angle: f64) -> f64 {
        ctx.kerb_floor()
    }

    /// Widening needed for the inner side to clear the front car's corner
    /// while turning in.
    fn extra_parking_space(&self, ctx: &PlanContext, _basis: &Basis) -> f64 {
        let Geometry { r0, half_width, .. } = ctx.geometry;
        let inner = r0 - half_width;
        let depth = Self::start_axle_y(ctx) + r0 - ctx.pivot_y(Layout::Bay);

        if depth >= inner {
            inner
        } else if depth > 0.0 {
            inner - (inner.powi(2) - depth.powi(2)).sqrt()
        } else {
            0.0
        }
    }

    fn anchors(&self, ctx: &PlanContext, basis: &Basis, street: &Street) -> Anchors {
        let Geometry {
            r0,
            half_width,
            rear_overhang,
            ..
        } = ctx.geometry;
        let start_axle_y = Self::start_axle_y(ctx);
        let centre_x = street.rear_limit_x() + half_width;

        Anchors {
            final_axle: DVec2::new(
                centre_x,
                ctx.kerb_y() - basis.kerb_distance - rear_overhang,
            ),
            arc_centre: DVec2::new(centre_x + r0, start_axle_y + r0),
            ..base_anchors(ctx, street, Layout::Bay, ctx.planner.bay_start_lateral_gap)
        }
    }

    fn first_turn(&self, _ctx: &PlanContext, _anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        Ok(FirstTurn {
            angle: QUARTER_TURN,
            straight: 0.0,
        })
    }

    fn start_pose(&self, ctx: &PlanContext, anchors: &Anchors, _turn: &FirstTurn) -> CarPose {
        let position = DVec2::new(anchors.final_axle.x + ctx.geometry.r0, anchors.start_axle_y);
        CarPose::new(position, 0.0)
    }

    fn move_sequence(
        &self,
        ctx: &PlanContext,
        basis: &Basis,
        _anchors: &Anchors,
        _turn: &FirstTurn,
    ) -> MoveSequence {
        let moves = vec![
            Move::steer(Lock::Clockwise).with_message("full lock towards the bay"),
            Move::arc(Direction::Backward, Angle::ToRotation(-QUARTER_TURN))
                .with_message("turning into the bay"),
            Move::steer(Lock::Center),
            Move::straight(
                Direction::Backward,
                Distance::RearBumperToY(ctx.kerb_y() - basis.kerb_distance),
            )
            .with_message("reversing to the wall"),
        ];
        MoveSequence::new(self.name(), moves)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        maneuver::{plan, Maneuver, PlanError},
        street::Layout,
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_bay_plan() {
        let config = Config::default();
        let car = config.scaled_car();
        let street = config.scaled_street();
        let result = plan(Maneuver::BayPark, &car, &street, &config.scaled_planner()).unwrap();

        assert_eq!(result.street.layout(), Layout::Bay);
        assert_relative_eq!(result.parking_space_length, car.length() + 2.0 * street.safety_gap);
        let width = result.bay_width.unwrap();
        assert!(width >= car.width() + 2.0 * street.safety_gap);
        assert_relative_eq!(width, 152.0519, epsilon = 1e-3);
        assert_relative_eq!(result.kerb_distance, 12.5);

        let start = result.start_pose.position;
        assert_relative_eq!(start.x, 458.3071, epsilon = 1e-3);
        assert_relative_eq!(start.y, 135.0, epsilon = 1e-9);
        assert_eq!(result.moves.len(), 4);
    }

    #[test]
    fn test_distant_approach_needs_no_extra_width() {
        let mut config = Config::default();
        // beyond r0 - w/2 the inner side never reaches the front car's corner
        config.planner.bay_start_lateral_gap = 5000.0;
        config.street.kerb_y = 20000.0;
        config.street.canvas_height = 21000.0;
        let car = config.scaled_car();
        let gap = config.scaled_street().safety_gap;
        let result = plan(
            Maneuver::BayPark,
            &car,
            &config.scaled_street(),
            &config.scaled_planner(),
        )
        .unwrap();
        assert_relative_eq!(result.bay_width.unwrap(), car.width() + 2.0 * gap);
    }

    #[test]
    fn test_quarter_turn_must_stay_on_the_canvas() {
        let mut config = Config::default();
        config.car.min_turning_radius = 4500.0;
        let err = plan(
            Maneuver::BayPark,
            &config.scaled_car(),
            &config.scaled_street(),
            &config.scaled_planner(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlanError::Infeasible {
                quantity: "first arc clearance",
                value,
            } if value < 0.0
        ));

        // the same car still fits the default bay with a deeper approach
        config.street.kerb_y = 14000.0;
        config.street.canvas_height = 15000.0;
        assert!(plan(
            Maneuver::BayPark,
            &config.scaled_car(),
            &config.scaled_street(),
            &config.scaled_planner(),
        )
        .is_ok());
    }
}
