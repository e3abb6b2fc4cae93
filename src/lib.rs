pub mod car;
pub mod collision;
pub mod config;
pub mod constants;
pub mod executor;
pub mod maneuver;
pub mod moves;
pub mod scenario;
pub mod speed_control;
pub mod steer_control;
pub mod street;

pub use car::{Car, CarParams, CarPose};
pub use config::Config;
pub use executor::{Executor, ExecutorInit, Outcome};
pub use maneuver::{plan, Maneuver, PlanError, PlanResult};
pub use scenario::{assess, Assessment, Scenario};
pub use street::{Layout, Street, StreetParams};
