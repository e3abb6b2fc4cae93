use std::f64::consts::{FRAC_PI_2, PI};

/// Millimetres per canvas unit.
pub const DEFAULT_SCALE: f64 = 20.0;

pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;
pub const DEFAULT_SPEED_MM_S: f64 = 1000.0;
pub const DEFAULT_STEERING_RATE: f64 = 1.0;
pub const DEFAULT_RAMP_START_FRACTION: f64 = 0.25;
pub const DEFAULT_RAMP_TICKS: usize = 30;

/// Targets are compared after scaling by this factor and rounding.
pub const TARGET_RESOLUTION: f64 = 1e6;
pub const MAX_ROLLBACK_STEPS: usize = 1000;

pub const FIXED_START_MAX_ANGLE_DEGREES: f64 = 45.0;
pub const FIXED_START_FALLBACK_ANGLE: f64 = PI;
pub const QUARTER_TURN: f64 = FRAC_PI_2;

pub const DEFAULT_MANUAL_FIRST_TURN_DEGREES: f64 = 30.0;
