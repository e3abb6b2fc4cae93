use super::{
    base_anchors, largest, min_angle_turn, Anchors, Basis, FirstTurn, Geometry, ManeuverStrategy,
    PlanContext, PlanError,
};
use crate::street::{Layout, Street};
use glam::DVec2;

/// Reverses until the rear corner nearly touches the rear car at the
/// collision angle, then pulls forward to straighten. Needs less space than
/// the two-turn maneuvers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeRotationMinAngle;

impl ThreeRotationMinAngle {
    /// Centre of the closing reversing arc relative to the final rear axle.
    fn arc_centre_offset(ctx: &PlanContext, collision_angle: f64) -> DVec2 {
        let r0 = ctx.geometry.r0;
        DVec2::new(
            -2.0 * r0 * collision_angle.sin(),
            r0 - 2.0 * r0 * collision_angle.cos(),
        )
    }

    /// Distance from the rear limit to the final rear axle, so the rear
    /// corner just reaches the limit at the collision angle.
    fn rear_setback(ctx: &PlanContext, collision_angle: f64) -> f64 {
        let Geometry { rb, phi, .. } = ctx.geometry;
        rb * (collision_angle + phi).sin()
    }
}

impl ManeuverStrategy for ThreeRotationMinAngle {
    fn name(&self) -> &'static str {
        "three-rotation-min-angle"
    }

    /// Solved against the estimated kerb distance, since the real one
    /// depends on this angle.
    fn collision_angle(&self, ctx: &PlanContext) -> f64 {
        let Geometry { r0, rc, reach, .. } = ctx.geometry;
        let estimated_axle_y = ctx.final_axle_y(ctx.planner.estimated_kerb_distance);
        let m = reach;
        let n = estimated_axle_y - ctx.pivot_y(Layout::Parallel) + r0;
        let hypot = m.hypot(n);

        let cos = (m.powi(2) + n.powi(2) + 4.0 * r0.powi(2) - rc.powi(2)) / (4.0 * r0 * hypot);
        (cos.clamp(-1.0, 1.0).acos() - m.atan2(n)).max(0.0)
    }

    fn parked_kerb_distance(&self, ctx: &PlanContext, collision_angle: f64) -> f64 {
        let Geometry {
            outer_axle,
            width,
            rear_overhang,
            ..
        } = ctx.geometry;
        let swing = (1.0 - collision_angle.cos()) * (outer_axle - width)
            + rear_overhang * collision_angle.sin()
            + ctx.planner.min_kerb_distance;
        largest(&[ctx.kerb_floor(), swing])
    }

    fn extra_parking_space(&self, ctx: &PlanContext, basis: &Basis) -> f64 {
        let Geometry {
            rc,
            reach,
            rear_overhang,
            ..
        } = ctx.geometry;
        let Basis {
            collision_angle,
            kerb_distance,
        } = *basis;

        let rear = Self::rear_setback(ctx, collision_angle) - rear_overhang;
        let mut centre = Self::arc_centre_offset(ctx, collision_angle);
        centre.y += ctx.final_axle_y(kerb_distance);
        let depth = centre.y - ctx.pivot_y(Layout::Parallel);
        let front = centre.x + (rc.powi(2) - depth.powi(2)).sqrt();

        rear + (front - reach).max(0.0)
    }

    fn anchors(&self, ctx: &PlanContext, basis: &Basis, street: &Street) -> Anchors {
        let final_axle = DVec2::new(
            street.rear_limit_x() + Self::rear_setback(ctx, basis.collision_angle),
            ctx.final_axle_y(basis.kerb_distance),
        );
        Anchors {
            final_axle,
            arc_centre: final_axle + Self::arc_centre_offset(ctx, basis.collision_angle),
            ..base_anchors(ctx, street, Layout::Parallel, ctx.planner.start_lateral_gap)
        }
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        Ok(min_angle_turn(ctx, anchors))
    }
}
