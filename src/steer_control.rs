use crate::car::{CarParams, CarPose, Lock, Side};

#[derive(Debug)]
pub struct SteerController {
    pub target_left: f64,
    pub target_right: f64,
    pub max_step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerControl {
    pub left_wheel: f64,
    pub right_wheel: f64,
    pub arrived: bool,
}

impl SteerController {
    /// `steering_rate` is in full locks per second.
    pub fn from_params(params: &CarParams, steering_rate: f64, tick_duration: f64) -> Self {
        Self::new(steering_rate * tick_duration * params.max_wheel_angle())
    }

    pub fn new(max_step: f64) -> Self {
        Self {
            target_left: 0.0,
            target_right: 0.0,
            max_step,
        }
    }

    pub fn set_target(&mut self, params: &CarParams, lock: Lock) {
        let steering = lock.fraction();
        self.target_left = params.wheel_angle(steering, Side::Left);
        self.target_right = params.wheel_angle(steering, Side::Right);
    }

    /// Moves the wheel with the larger remaining angle by one step and the
    /// other proportionally, so both arrive on the same tick.
    pub fn step(&self, pose: &mut CarPose) -> SteerControl {
        let Self {
            target_left,
            target_right,
            max_step,
        } = *self;

        let delta_left = target_left - pose.left_wheel;
        let delta_right = target_right - pose.right_wheel;
        let largest = delta_left.abs().max(delta_right.abs());

        let arrived = largest <= max_step;
        if arrived {
            pose.left_wheel = target_left;
            pose.right_wheel = target_right;
        } else {
            let ratio = max_step / largest;
            pose.left_wheel += delta_left * ratio;
            pose.right_wheel += delta_right * ratio;
        }

        SteerControl {
            left_wheel: pose.left_wheel,
            right_wheel: pose.right_wheel,
            arrived,
        }
    }
}
