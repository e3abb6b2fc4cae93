use glam::DVec2;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lock {
    Center,
    Clockwise,
    Counterclockwise,
}

impl Lock {
    pub fn fraction(self) -> f64 {
        match self {
            Lock::Center => 0.0,
            Lock::Clockwise => 1.0,
            Lock::Counterclockwise => -1.0,
        }
    }

    /// Side of the car facing away from the turn centre.
    fn outer_side(self) -> Option<Side> {
        match self {
            Lock::Center => None,
            Lock::Clockwise => Some(Side::Left),
            Lock::Counterclockwise => Some(Side::Right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    pub fn side(self) -> Side {
        match self {
            Corner::FrontLeft | Corner::RearLeft => Side::Left,
            Corner::FrontRight | Corner::RearRight => Side::Right,
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Corner::FrontLeft | Corner::FrontRight)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CarParamsError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("minimum turning radius {radius} is shorter than the rear axle to front distance {reach}")]
    TurningRadiusTooShort { radius: f64, reach: f64 },
}

/// Car geometry. Distances are millimetres in configuration files and
/// canvas units once [`CarParams::scaled`] has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarParams {
    pub rear_overhang: f64,
    pub wheelbase: f64,
    pub front_overhang: f64,
    pub track_width: f64,
    pub side_overhang: f64,
    pub tyre_width: f64,
    pub tyre_length: f64,
    pub min_turning_radius: f64,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            rear_overhang: 1000.0,
            wheelbase: 3400.0,
            front_overhang: 894.0,
            track_width: 1700.0,
            side_overhang: 150.0,
            tyre_width: 215.0,
            tyre_length: 650.0,
            min_turning_radius: 6600.0,
        }
    }
}

impl CarParams {
    pub fn scaled(&self, scale: f64) -> Self {
        let Self {
            rear_overhang,
            wheelbase,
            front_overhang,
            track_width,
            side_overhang,
            tyre_width,
            tyre_length,
            min_turning_radius,
        } = *self;

        Self {
            rear_overhang: rear_overhang / scale,
            wheelbase: wheelbase / scale,
            front_overhang: front_overhang / scale,
            track_width: track_width / scale,
            side_overhang: side_overhang / scale,
            tyre_width: tyre_width / scale,
            tyre_length: tyre_length / scale,
            min_turning_radius: min_turning_radius / scale,
        }
    }

    pub fn validate(&self) -> Result<(), CarParamsError> {
        let fields = [
            ("rear_overhang", self.rear_overhang),
            ("wheelbase", self.wheelbase),
            ("front_overhang", self.front_overhang),
            ("track_width", self.track_width),
            ("side_overhang", self.side_overhang),
            ("tyre_width", self.tyre_width),
            ("tyre_length", self.tyre_length),
            ("min_turning_radius", self.min_turning_radius),
        ];
        if let Some(&(name, value)) = fields.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(CarParamsError::NonPositive { name, value });
        }

        let reach = self.rear_axle_to_front();
        if self.min_turning_radius < reach {
            return Err(CarParamsError::TurningRadiusTooShort {
                radius: self.min_turning_radius,
                reach,
            });
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.rear_overhang + self.wheelbase + self.front_overhang
    }

    pub fn width(&self) -> f64 {
        self.track_width + 2.0 * self.side_overhang
    }

    pub fn rear_axle_to_front(&self) -> f64 {
        self.wheelbase + self.front_overhang
    }

    /// Angle at the turn centre between the rear axle and the front of the
    /// car at full lock. NaN when the turning radius is shorter than the
    /// rear-axle-to-front distance.
    pub fn max_turn_angle(&self) -> f64 {
        (self.rear_axle_to_front() / self.min_turning_radius).asin()
    }

    /// Radius swept by the centre of the front bumper for a steering-wheel
    /// fraction in `[-1, 1]`. Infinite when the wheels are centred.
    pub fn turning_radius(&self, steering: f64) -> f64 {
        let angle = steering.abs().min(1.0) * self.max_turn_angle();
        if angle == 0.0 {
            return f64::INFINITY;
        }
        self.rear_axle_to_front() / angle.sin()
    }

    pub fn rear_axle_radius(&self, steering: f64) -> f64 {
        let radius = self.turning_radius(steering);
        if radius.is_infinite() {
            return radius;
        }
        (radius.powi(2) - self.rear_axle_to_front().powi(2)).sqrt()
    }

    /// Signed distance from the rear-axle midpoint to the turn centre along
    /// the car's right-hand axis.
    pub fn turn_centre_offset(&self, steering: f64) -> f64 {
        self.rear_axle_radius(steering).copysign(steering)
    }

    pub fn axle_side_radius(&self, side: Side, lock: Lock) -> f64 {
        let Some(outer) = lock.outer_side() else {
            return f64::INFINITY;
        };
        let radius = self.rear_axle_radius(lock.fraction());
        let half_width = self.width() / 2.0;

        if side == outer {
            radius + half_width
        } else {
            radius - half_width
        }
    }

    pub fn corner_radius(&self, corner: Corner, lock: Lock) -> f64 {
        let lateral = self.axle_side_radius(corner.side(), lock);
        let longitudinal = if corner.is_front() {
            self.rear_axle_to_front()
        } else {
            self.rear_overhang
        };
        lateral.hypot(longitudinal)
    }

    pub fn wheel_angle(&self, steering: f64, side: Side) -> f64 {
        let centre = self.turn_centre_offset(steering);
        if centre.is_infinite() {
            return 0.0;
        }

        let half_track = self.track_width / 2.0;
        let lateral = match side {
            Side::Left => centre + half_track,
            Side::Right => centre - half_track,
        };
        (self.wheelbase / lateral).atan()
    }

    pub fn max_wheel_angle(&self) -> f64 {
        self.wheel_angle(1.0, Side::Right)
    }

    /// Inverse of [`CarParams::wheel_angle`] for the left wheel.
    pub fn centre_offset_from_wheel(&self, left_wheel: f64) -> Option<f64> {
        if left_wheel.abs() < f64::EPSILON {
            return None;
        }
        Some(self.wheelbase / left_wheel.tan() - self.track_width / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarPose {
    pub position: DVec2,
    /// Body rotation, clockwise-positive.
    pub rotation: f64,
    pub left_wheel: f64,
    pub right_wheel: f64,
}

impl CarPose {
    pub fn new(position: DVec2, rotation: f64) -> Self {
        Self {
            position,
            rotation,
            left_wheel: 0.0,
            right_wheel: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    params: CarParams,
    pose: CarPose,
}

impl Car {
    pub fn new(params: CarParams, pose: CarPose) -> Self {
        Self { params, pose }
    }

    pub fn params(&self) -> &CarParams {
        &self.params
    }

    pub fn pose(&self) -> &CarPose {
        &self.pose
    }

    pub fn pose_mut(&mut self) -> &mut CarPose {
        &mut self.pose
    }

    pub fn set_pose(&mut self, pose: CarPose) {
        self.pose = pose;
    }

    pub fn heading(&self) -> DVec2 {
        DVec2::from_angle(self.pose.rotation)
    }

    pub fn right(&self) -> DVec2 {
        self.heading().perp()
    }

    pub fn body_point(&self, forward: f64, lateral: f64) -> DVec2 {
        self.pose.position + self.heading() * forward + self.right() * lateral
    }

    pub fn corner(&self, corner: Corner) -> DVec2 {
        let params = &self.params;
        let half_width = params.width() / 2.0;
        let forward = if corner.is_front() {
            params.rear_axle_to_front()
        } else {
            -params.rear_overhang
        };
        let lateral = match corner.side() {
            Side::Left => -half_width,
            Side::Right => half_width,
        };
        self.body_point(forward, lateral)
    }

    pub fn corners(&self) -> [(Corner, DVec2); 4] {
        Corner::ALL.map(|corner| (corner, self.corner(corner)))
    }

    pub fn front_left(&self) -> DVec2 {
        self.corner(Corner::FrontLeft)
    }

    pub fn front_right(&self) -> DVec2 {
        self.corner(Corner::FrontRight)
    }

    pub fn rear_left(&self) -> DVec2 {
        self.corner(Corner::RearLeft)
    }

    pub fn rear_right(&self) -> DVec2 {
        self.corner(Corner::RearRight)
    }

    pub fn rear_bumper(&self) -> DVec2 {
        self.body_point(-self.params.rear_overhang, 0.0)
    }

    pub fn centre(&self) -> DVec2 {
        let params = &self.params;
        self.body_point((params.rear_axle_to_front() - params.rear_overhang) / 2.0, 0.0)
    }

    /// Point expressed as (forward, lateral) offsets from the rear axle.
    pub fn to_local(&self, point: DVec2) -> DVec2 {
        let offset = point - self.pose.position;
        DVec2::new(offset.dot(self.heading()), offset.dot(self.right()))
    }

    pub fn contains(&self, point: DVec2) -> bool {
        let local = self.to_local(point);
        let params = &self.params;
        local.x > -params.rear_overhang
            && local.x < params.rear_axle_to_front()
            && local.y.abs() < params.width() / 2.0
    }

    pub fn turn_centre_offset(&self) -> Option<f64> {
        self.params.centre_offset_from_wheel(self.pose.left_wheel)
    }

    pub fn translate(&mut self, distance: f64) {
        self.pose.position += self.heading() * distance;
    }

    pub fn rotate_about(&mut self, centre: DVec2, angle: f64) {
        let offset = (self.pose.position - centre).rotate(DVec2::from_angle(angle));
        self.pose.position = centre + offset;
        self.pose.rotation += angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn scaled_params() -> CarParams {
        CarParams::default().scaled(20.0)
    }

    fn random_params(rng: &mut impl Rng) -> CarParams {
        let wheelbase = rng.gen_range(2000.0..4000.0);
        let front_overhang = rng.gen_range(600.0..1200.0);
        CarParams {
            rear_overhang: rng.gen_range(500.0..1200.0),
            wheelbase,
            front_overhang,
            track_width: rng.gen_range(1300.0..1800.0),
            side_overhang: rng.gen_range(50.0..200.0),
            tyre_width: rng.gen_range(150.0..300.0),
            tyre_length: rng.gen_range(500.0..800.0),
            min_turning_radius: (wheelbase + front_overhang) * rng.gen_range(1.05..2.5),
        }
    }

    #[test]
    fn test_full_lock_reproduces_min_turning_radius() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let params = random_params(&mut rng).scaled(20.0);
            assert!(params.validate().is_ok());
            assert_relative_eq!(
                params.turning_radius(1.0),
                params.min_turning_radius,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                params.turning_radius(-1.0),
                params.min_turning_radius,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_dimensions() {
        let params = scaled_params();
        assert_relative_eq!(params.length(), 264.7, epsilon = 1e-9);
        assert_relative_eq!(params.width(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(params.rear_axle_to_front(), 214.7, epsilon = 1e-9);
    }

    #[test]
    fn test_turning_radius_grows_as_steering_relaxes() {
        let params = scaled_params();
        assert!(params.turning_radius(0.0).is_infinite());
        assert!(params.turning_radius(0.5) > params.turning_radius(1.0));
        assert_eq!(params.turning_radius(2.0), params.turning_radius(1.0));
    }

    #[test]
    fn test_invalid_turning_radius_is_nan() {
        let params = CarParams {
            min_turning_radius: 3000.0,
            ..CarParams::default()
        };
        assert!(params.max_turn_angle().is_nan());
        assert!(params.turning_radius(1.0).is_nan());
        assert!(matches!(
            params.validate(),
            Err(CarParamsError::TurningRadiusTooShort { .. })
        ));
    }

    #[test]
    fn test_corner_radii() {
        let params = scaled_params();
        let r0 = params.rear_axle_radius(1.0);
        let half = params.width() / 2.0;

        assert_relative_eq!(
            params.axle_side_radius(Side::Left, Lock::Clockwise),
            r0 + half
        );
        assert_relative_eq!(
            params.axle_side_radius(Side::Left, Lock::Counterclockwise),
            r0 - half
        );
        assert_relative_eq!(
            params.corner_radius(Corner::FrontRight, Lock::Counterclockwise),
            (r0 + half).hypot(params.rear_axle_to_front())
        );
        assert_relative_eq!(
            params.corner_radius(Corner::RearRight, Lock::Clockwise),
            (r0 - half).hypot(params.rear_overhang)
        );
        assert!(params
            .corner_radius(Corner::RearLeft, Lock::Center)
            .is_infinite());
    }

    #[test]
    fn test_inner_wheel_steers_more() {
        let params = scaled_params();
        let left = params.wheel_angle(1.0, Side::Left);
        let right = params.wheel_angle(1.0, Side::Right);
        assert!(right > left && left > 0.0);

        let left = params.wheel_angle(-1.0, Side::Left);
        let right = params.wheel_angle(-1.0, Side::Right);
        assert!(left < right && right < 0.0);

        assert_eq!(params.wheel_angle(0.0, Side::Left), 0.0);
        assert_eq!(params.max_wheel_angle(), params.wheel_angle(1.0, Side::Right));
    }

    #[test]
    fn test_centre_offset_round_trips_through_wheel_angle() {
        let params = scaled_params();
        for steering in [-1.0, -0.4, 0.3, 1.0] {
            let wheel = params.wheel_angle(steering, Side::Left);
            let offset = params.centre_offset_from_wheel(wheel).unwrap();
            assert_relative_eq!(
                offset,
                params.turn_centre_offset(steering),
                max_relative = 1e-9
            );
        }
        assert_eq!(params.centre_offset_from_wheel(0.0), None);
    }

    #[test]
    fn test_corners_follow_rotation() {
        let params = scaled_params();
        let mut car = Car::new(params, CarPose::new(DVec2::new(100.0, 100.0), 0.0));
        assert_relative_eq!(car.front_right().x, 314.7, epsilon = 1e-9);
        assert_relative_eq!(car.front_right().y, 150.0, epsilon = 1e-9);
        assert_relative_eq!(car.rear_left().x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(car.rear_left().y, 50.0, epsilon = 1e-9);

        car.pose_mut().rotation = FRAC_PI_2;
        assert_relative_eq!(car.front_left().x, 150.0, epsilon = 1e-9);
        assert_relative_eq!(car.front_left().y, 314.7, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_about_keeps_distance_to_centre() {
        let params = scaled_params();
        let mut car = Car::new(params, CarPose::new(DVec2::new(100.0, 100.0), 0.0));
        let centre = DVec2::new(100.0, 350.0);
        car.rotate_about(centre, 0.3);
        assert_relative_eq!(car.pose().position.distance(centre), 250.0, epsilon = 1e-9);
        assert_relative_eq!(car.pose().rotation, 0.3);
        assert!(car.pose().position.x > 100.0);
    }

    #[test]
    fn test_contains() {
        let car = Car::new(scaled_params(), CarPose::new(DVec2::new(100.0, 100.0), 0.0));
        assert!(car.contains(DVec2::new(200.0, 120.0)));
        assert!(!car.contains(DVec2::new(40.0, 100.0)));
        assert!(!car.contains(car.front_right()));
    }
}
