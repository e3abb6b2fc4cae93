use super::{smallest, Anchors, FirstTurn, ManeuverStrategy, PlanContext, PlanError};
use crate::constants::{FIXED_START_FALLBACK_ANGLE, FIXED_START_MAX_ANGLE_DEGREES};
use log::debug;

/// Starts with the rear bumper a fixed distance past the pivot point and
/// solves the first turn that still lands on the closing arc.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStart;

const RESIDUAL_TOLERANCE: f64 = 1e-6;

impl FixedStart {
    /// Solves `2 r0 (1 - cos a) + t sin a = dy` and `2 r0 sin a + t cos a = dx`
    /// for the turn `a` and straight `t >= 0`. Squaring out `t` leaves a
    /// quadratic in `sin a`; roots that do not satisfy both equations are
    /// dropped and the smallest remaining angle wins.
    fn solve(r0: f64, dx: f64, dy: f64) -> Option<FirstTurn> {
        let k = dy - 2.0 * r0;
        let a = dx.powi(2) + k.powi(2);
        let b = -4.0 * r0 * dx;
        let c = 4.0 * r0.powi(2) - k.powi(2);
        let discriminant = b.powi(2) - 4.0 * a * c;
        if a == 0.0 || discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let candidates = [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
            .into_iter()
            .filter(|sin| (0.0..=1.0).contains(sin))
            .filter_map(|sin| {
                let angle = sin.asin();
                let straight = (dx - 2.0 * r0 * sin) / angle.cos();
                let residual = 2.0 * r0 * (1.0 - angle.cos()) + straight * sin - dy;
                (straight >= -RESIDUAL_TOLERANCE && residual.abs() < RESIDUAL_TOLERANCE)
                    .then_some(FirstTurn { angle, straight })
            });

        let candidates: Vec<FirstTurn> = candidates.collect();
        let angle = smallest(candidates.iter().map(|turn| turn.angle))?;
        candidates.into_iter().find(|turn| turn.angle == angle)
    }
}

impl ManeuverStrategy for FixedStart {
    fn name(&self) -> &'static str {
        "fixed-start"
    }

    fn first_turn(&self, ctx: &PlanContext, anchors: &Anchors) -> Result<FirstTurn, PlanError> {
        let r0 = ctx.geometry.r0;
        let start_x = anchors.pivot.x + ctx.planner.fixed_start_gap + ctx.geometry.rear_overhang;
        let dx = start_x - anchors.arc_centre.x;
        let dy = anchors.arc_centre.y + r0 - anchors.start_axle_y;

        let turn = Self::solve(r0, dx, dy).unwrap_or_else(|| {
            debug!("no admissible first turn for a fixed start at x = {start_x:.3}");
            FirstTurn {
                angle: FIXED_START_FALLBACK_ANGLE,
                straight: 0.0,
            }
        });

        let degrees = turn.angle.to_degrees();
        if !(0.0..=FIXED_START_MAX_ANGLE_DEGREES).contains(&degrees) {
            return Err(PlanError::FirstTurnOutOfRange {
                degrees,
                max: FIXED_START_MAX_ANGLE_DEGREES,
            });
        }
        Ok(turn)
    }
}
