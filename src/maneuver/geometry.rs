use super::PlanError;
use crate::{
    car::{CarParams, Corner, Lock, Side},
    config::PlannerConfig,
    street::{Layout, StreetParams},
};
use noisy_float::prelude::*;

/// Full-lock radii and body dimensions shared by every maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub length: f64,
    pub width: f64,
    pub half_width: f64,
    pub rear_overhang: f64,
    /// Rear axle to front bumper.
    pub reach: f64,
    pub r0: f64,
    /// Outer rear-axle end, `r0 + w/2`.
    pub outer_axle: f64,
    /// Outer front corner on the counterclockwise lock.
    pub rc: f64,
    /// Outer rear corner on the clockwise lock.
    pub rb: f64,
    /// Angle at the turn centre between the outer axle end and the outer
    /// rear corner.
    pub phi: f64,
}

impl Geometry {
    pub fn new(car: &CarParams) -> Result<Self, PlanError> {
        let r0 = car.rear_axle_radius(Lock::Clockwise.fraction());
        let outer_axle = car.axle_side_radius(Side::Left, Lock::Clockwise);

        let geometry = Self {
            length: car.length(),
            width: car.width(),
            half_width: car.width() / 2.0,
            rear_overhang: car.rear_overhang,
            reach: car.rear_axle_to_front(),
            r0: finite("rear axle turning radius", r0)?,
            outer_axle: finite("outer axle turning radius", outer_axle)?,
            rc: finite(
                "front corner turning radius",
                car.corner_radius(Corner::FrontRight, Lock::Counterclockwise),
            )?,
            rb: finite(
                "rear corner turning radius",
                car.corner_radius(Corner::RearLeft, Lock::Clockwise),
            )?,
            phi: car.rear_overhang.atan2(outer_axle),
        };
        Ok(geometry)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub car: &'a CarParams,
    pub street: &'a StreetParams,
    pub planner: &'a PlannerConfig,
    pub geometry: Geometry,
}

impl<'a> PlanContext<'a> {
    pub fn new(
        car: &'a CarParams,
        street: &'a StreetParams,
        planner: &'a PlannerConfig,
    ) -> Result<Self, PlanError> {
        car.validate()?;
        Ok(Self {
            car,
            street,
            planner,
            geometry: Geometry::new(car)?,
        })
    }

    pub fn kerb_y(&self) -> f64 {
        self.street.kerb_y
    }

    /// Rear-axle y of a car parked parallel `kerb_distance` from the kerb.
    pub fn final_axle_y(&self, kerb_distance: f64) -> f64 {
        self.street.kerb_y - kerb_distance - self.geometry.half_width
    }

    pub fn pivot_y(&self, layout: Layout) -> f64 {
        self.street.pivot_y(layout)
    }

    /// Rear-axle y of the start pose, `lateral_gap` clear of the pivot line.
    pub fn start_axle_y(&self, layout: Layout, lateral_gap: f64) -> f64 {
        self.pivot_y(layout) - lateral_gap - self.geometry.half_width
    }

    pub fn base_space(&self, layout: Layout) -> f64 {
        let body = match layout {
            Layout::Parallel => self.geometry.length,
            Layout::Bay => self.geometry.width,
        };
        body + 2.0 * self.street.safety_gap
    }

    /// Smallest kerb distance the parked car may finish at, before any swing
    /// allowance.
    pub fn kerb_floor(&self) -> f64 {
        self.planner.min_kerb_distance.max(self.street.car_from_kerb)
    }
}

pub fn finite(quantity: &'static str, value: f64) -> Result<f64, PlanError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlanError::NonFinite { quantity })
    }
}

pub fn largest(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .map(r64)
        .max()
        .map_or(0.0, |value| value.raw())
}

pub fn smallest(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .map(r64)
        .min()
        .map(|value| value.raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geometry_matches_car_model() {
        let car = CarParams::default().scaled(20.0);
        let geometry = Geometry::new(&car).unwrap();

        assert_relative_eq!(geometry.r0, car.rear_axle_radius(1.0));
        assert_relative_eq!(geometry.outer_axle, geometry.r0 + 50.0);
        assert_relative_eq!(geometry.rc, geometry.outer_axle.hypot(214.7), epsilon = 1e-9);
        assert_relative_eq!(geometry.rb, geometry.outer_axle.hypot(50.0), epsilon = 1e-9);
        assert_relative_eq!(geometry.rb * geometry.phi.sin(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_car_is_rejected() {
        let car = CarParams {
            min_turning_radius: 100.0,
            ..CarParams::default()
        }
        .scaled(20.0);
        let street = StreetParams::default().scaled(20.0);
        let planner = PlannerConfig::default().scaled(20.0);
        assert!(matches!(
            PlanContext::new(&car, &street, &planner),
            Err(PlanError::InvalidCar(_))
        ));
        assert!(matches!(
            Geometry::new(&car),
            Err(PlanError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_extremes_skip_non_finite() {
        assert_eq!(largest(&[1.0, f64::NAN, 3.0, 2.0]), 3.0);
        assert_eq!(smallest([4.0, f64::INFINITY, 2.5]), Some(2.5));
        assert_eq!(smallest([f64::NAN]), None);
    }
}
