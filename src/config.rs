use crate::{
    car::{CarParams, CarParamsError},
    constants::{
        DEFAULT_RAMP_START_FRACTION, DEFAULT_RAMP_TICKS, DEFAULT_SCALE, DEFAULT_SPEED_MM_S,
        DEFAULT_STEERING_RATE, DEFAULT_TICK_RATE_HZ,
    },
    street::StreetParams,
};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid car parameters: {0}")]
    Car(#[from] CarParamsError),
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub min_kerb_distance: f64,
    /// Kerb distance assumed when solving the collision angle.
    pub estimated_kerb_distance: f64,
    /// Clearance between the pivot line and the car's kerb side at the start.
    pub start_lateral_gap: f64,
    pub bay_start_lateral_gap: f64,
    /// Distance from the pivot point to the rear bumper at the fixed start.
    pub fixed_start_gap: f64,
    pub rules_start_gap: f64,
    pub rules_extra_space: f64,
    pub rules_kerb_offset: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_kerb_distance: 100.0,
            estimated_kerb_distance: 400.0,
            start_lateral_gap: 500.0,
            bay_start_lateral_gap: 2000.0,
            fixed_start_gap: 1000.0,
            rules_start_gap: 1000.0,
            rules_extra_space: 1000.0,
            rules_kerb_offset: 2500.0,
        }
    }
}

impl PlannerConfig {
    pub fn scaled(&self, scale: f64) -> Self {
        let Self {
            min_kerb_distance,
            estimated_kerb_distance,
            start_lateral_gap,
            bay_start_lateral_gap,
            fixed_start_gap,
            rules_start_gap,
            rules_extra_space,
            rules_kerb_offset,
        } = *self;

        Self {
            min_kerb_distance: min_kerb_distance / scale,
            estimated_kerb_distance: estimated_kerb_distance / scale,
            start_lateral_gap: start_lateral_gap / scale,
            bay_start_lateral_gap: bay_start_lateral_gap / scale,
            fixed_start_gap: fixed_start_gap / scale,
            rules_start_gap: rules_start_gap / scale,
            rules_extra_space: rules_extra_space / scale,
            rules_kerb_offset: rules_kerb_offset / scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub tick_rate_hz: f64,
    /// Millimetres per second, scaled to canvas units per second.
    pub speed: f64,
    pub steering_rate: f64,
    pub ramp_start_fraction: f64,
    pub ramp_ticks: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            speed: DEFAULT_SPEED_MM_S,
            steering_rate: DEFAULT_STEERING_RATE,
            ramp_start_fraction: DEFAULT_RAMP_START_FRACTION,
            ramp_ticks: DEFAULT_RAMP_TICKS,
        }
    }
}

impl ExecutorConfig {
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            speed: self.speed / scale,
            ..*self
        }
    }

    pub fn tick_duration_sec(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub max_rotation_degrees: f64,
    pub max_kerb_distance: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            max_rotation_degrees: 3.0,
            max_kerb_distance: 500.0,
        }
    }
}

impl Tolerances {
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            max_kerb_distance: self.max_kerb_distance / scale,
            ..*self
        }
    }
}

/// Scenario configuration. Distances are millimetres; the accessors return
/// copies divided by `scale`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scale: f64,
    pub car: CarParams,
    pub street: StreetParams,
    pub planner: PlannerConfig,
    pub executor: ExecutorConfig,
    pub tolerances: Tolerances,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            car: CarParams::default(),
            street: StreetParams::default(),
            planner: PlannerConfig::default(),
            executor: ExecutorConfig::default(),
            tolerances: Tolerances::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("scale", self.scale),
            ("executor.tick_rate_hz", self.executor.tick_rate_hz),
            ("executor.speed", self.executor.speed),
            ("executor.steering_rate", self.executor.steering_rate),
        ];
        if let Some(&(name, value)) = positive.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(ConfigError::NonPositive { name, value });
        }
        self.car.validate()?;
        Ok(())
    }

    pub fn scaled_car(&self) -> CarParams {
        self.car.scaled(self.scale)
    }

    pub fn scaled_street(&self) -> StreetParams {
        self.street.scaled(self.scale)
    }

    pub fn scaled_planner(&self) -> PlannerConfig {
        self.planner.scaled(self.scale)
    }

    pub fn scaled_executor(&self) -> ExecutorConfig {
        self.executor.scaled(self.scale)
    }

    pub fn scaled_tolerances(&self) -> Tolerances {
        self.tolerances.scaled(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
            scale = 10.0

            [car]
            wheelbase = 2700.0

            [street]
            safety_gap = 300.0
            parking_space = 7000.0

            [executor]
            tick_rate_hz = 30.0
        "#;
        let config = Config::from_toml_str(text).unwrap();

        assert_eq!(config.car.wheelbase, 2700.0);
        assert_eq!(config.car.rear_overhang, 1000.0);
        assert_eq!(config.street.parking_space, Some(7000.0));
        assert_eq!(config.executor.ramp_ticks, DEFAULT_RAMP_TICKS);

        assert_relative_eq!(config.scaled_car().wheelbase, 270.0);
        assert_relative_eq!(config.scaled_street().safety_gap, 30.0);
        assert_eq!(config.scaled_street().parking_space, Some(700.0));
        assert_relative_eq!(config.scaled_executor().speed, 100.0);
        assert_relative_eq!(config.scaled_executor().tick_duration_sec(), 1.0 / 30.0);
    }

    #[test]
    fn test_rejects_invalid_car() {
        let text = r#"
            [car]
            min_turning_radius = 2000.0
        "#;
        assert!(matches!(
            Config::from_toml_str(text),
            Err(ConfigError::Car(CarParamsError::TurningRadiusTooShort { .. }))
        ));
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(matches!(
            Config::from_toml_str("scale = 0.0"),
            Err(ConfigError::NonPositive { name: "scale", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_document() {
        assert!(matches!(
            Config::from_toml_str("[car\nwheelbase = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load("/nonexistent/parking.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
