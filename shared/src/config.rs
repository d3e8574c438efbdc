// Runtime configuration. Board wiring lives in the firmware, everything
// the sensor driver and dispense loop need lives here.

use fugit::MillisDurationU32;

use crate::mlx90614::DEFAULT_ADDRESS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub sensor: SensorConfig,
    pub dispense: DispenseConfig,
}

impl Config {
    pub const DEFAULT: Self = Self {
        sensor: SensorConfig::DEFAULT,
        dispense: DispenseConfig::DEFAULT,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    pub address: u8,
    // PEC on the polling reads, off in the deployed loop to keep the poll rate up
    pub verify_measurements: bool,
    pub eeprom: EepromConfig,
}

impl SensorConfig {
    pub const DEFAULT: Self = Self {
        address: DEFAULT_ADDRESS,
        verify_measurements: false,
        eeprom: EepromConfig::DEFAULT,
    };
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromConfig {
    // wait after each EEPROM write
    pub settle: MillisDurationU32,
    pub verify: bool,
}

impl EepromConfig {
    pub const DEFAULT: Self = Self {
        settle: MillisDurationU32::from_ticks(50),
        verify: true,
    };
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispenseConfig {
    // readings strictly between these count as a person
    pub accept_above_c: f64,
    pub accept_below_c: f64,
    pub pump_on: MillisDurationU32,
    pub lockout: MillisDurationU32,
    pub refresh: MillisDurationU32,
    pub idle: MillisDurationU32,
    // zero retries on the next cycle straight away
    pub error_backoff: MillisDurationU32,
    // 1 disables smoothing, capped at MEDIAN_CAPACITY
    pub median_samples: usize,
}

impl DispenseConfig {
    pub const DEFAULT: Self = Self {
        accept_above_c: 34.0,
        accept_below_c: 38.0,
        pump_on: MillisDurationU32::from_ticks(800),
        lockout: MillisDurationU32::from_ticks(1500),
        refresh: MillisDurationU32::from_ticks(50),
        idle: MillisDurationU32::from_ticks(500),
        error_backoff: MillisDurationU32::from_ticks(0),
        median_samples: 1,
    };

    pub fn accepts(&self, temperature_c: f64) -> bool {
        temperature_c > self.accept_above_c && temperature_c < self.accept_below_c
    }
}

impl Default for DispenseConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
