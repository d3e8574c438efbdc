#![cfg_attr(not(test), no_std)]

// Hardware independent half of the thermometer dispenser. Board access goes
// through embedded-hal traits so tests can hand in fakes.

pub mod cell;
pub mod config;
pub mod dispenser;
pub mod display;
pub mod emissivity;
pub mod error;
pub mod filter;
pub mod mlx90614;
pub mod model;

#[cfg(test)]
mod testing;

pub use cell::TemperatureCell;
pub use config::{Config, DispenseConfig, EepromConfig, SensorConfig};
pub use dispenser::{BodySensor, DispenseError, Dispenser, PollOutcome};
pub use display::DigitalTube;
pub use emissivity::{EmissivityUpdate, EmissivityWords};
pub use error::{CalibrationError, CalibrationStep, Error};
pub use mlx90614::{Mlx90614, Register};
pub use model::{estimate_body_temperature, BodyModel};
