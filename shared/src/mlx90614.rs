// SMBus register interface to the MLX90614 infrared thermometer

use core::fmt;

use crc::{Crc, CRC_8_SMBUS};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use fugit::MillisDurationU32;
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{Immutable, IntoBytes};

use crate::config::{EepromConfig, SensorConfig};
use crate::dispenser::BodySensor;
use crate::error::Error;
use crate::model;

pub const DEFAULT_ADDRESS: u8 = 0x5A;

// set on RAM measurement words when the reading is invalid
pub const FAULT_FLAG: u16 = 0x8000;

// CRC-8, poly 0x07, zero init, MSB first
const PEC: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    // RAM
    AmbientTemp = 0x06,
    ObjectTemp = 0x07,
    // EEPROM
    Emissivity = 0x24,
    EmissivityFactor = 0x2F,
}

impl Register {
    pub const fn command(self) -> u8 {
        self as u8
    }

    // bit 15 is an error flag on measurement words only
    pub const fn is_measurement(self) -> bool {
        matches!(self, Register::AmbientTemp | Register::ObjectTemp)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::AmbientTemp => "Ta",
            Register::ObjectTemp => "Tobj1",
            Register::Emissivity => "emissivity",
            Register::EmissivityFactor => "emissivity factor",
        };
        write!(f, "{} (0x{:02x})", name, self.command())
    }
}

// everything after the slave address
#[repr(C)]
#[derive(IntoBytes, Immutable)]
struct WriteFrame {
    command: u8,
    data: U16,
    pec: u8,
}

pub fn pec(bytes: &[u8]) -> u8 {
    PEC.checksum(bytes)
}

// LSB = 0.02K
pub fn raw_to_celsius(raw: u16) -> f64 {
    raw as f64 * 0.02 - 273.15
}

pub struct Mlx90614<I> {
    i2c: I,
    address: u8,
    verify_measurements: bool,
    pub(crate) eeprom: EepromConfig,
}

impl<I, E> Mlx90614<I>
where
    I: I2c<SevenBitAddress, Error = E>,
{
    pub fn new(i2c: I, config: SensorConfig) -> Self {
        Self {
            i2c,
            address: config.address,
            verify_measurements: config.verify_measurements,
            eeprom: config.eeprom,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I {
        self.i2c
    }

    // The fault flag is checked before the PEC, and only on measurement words
    pub fn read_register(
        &mut self,
        register: Register,
        verify_integrity: bool,
    ) -> Result<u16, Error<E>> {
        let mut frame = [0u8; 3];
        self.i2c
            .write_read(self.address, &[register.command()], &mut frame)
            .map_err(Error::Bus)?;

        let [low, high, received] = frame;
        let raw = u16::from_le_bytes([low, high]);
        if !verify_integrity {
            return Ok(raw);
        }

        if register.is_measurement() && raw & FAULT_FLAG != 0 {
            return Err(Error::Fault { register, raw });
        }

        let computed = pec(&[
            self.address << 1,
            register.command(),
            (self.address << 1) | 1,
            low,
            high,
        ]);
        if computed != received {
            return Err(Error::Integrity {
                register,
                computed,
                received,
            });
        }

        Ok(raw)
    }

    pub fn write_register<D: DelayNs>(
        &mut self,
        register: Register,
        value: u16,
        verify_after_write: bool,
        settle: MillisDurationU32,
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        let [low, high] = value.to_le_bytes();
        // The write PEC has no repeated start, so no read address byte
        let frame = WriteFrame {
            command: register.command(),
            data: U16::new(value),
            pec: pec(&[self.address << 1, register.command(), low, high]),
        };
        self.i2c
            .write(self.address, frame.as_bytes())
            .map_err(Error::Bus)?;

        delay.delay_ms(settle.to_millis());

        if verify_after_write {
            let read = self.read_register(register, true)?;
            if read != value {
                return Err(Error::VerifyMismatch {
                    register,
                    written: value,
                    read,
                });
            }
        }

        Ok(())
    }

    // The fault flag is rejected whether or not the PEC is checked
    fn read_temperature(
        &mut self,
        register: Register,
        verify_integrity: bool,
    ) -> Result<f64, Error<E>> {
        let raw = self.read_register(register, verify_integrity)?;
        if raw & FAULT_FLAG != 0 {
            return Err(Error::Fault { register, raw });
        }
        Ok(raw_to_celsius(raw))
    }

    pub fn read_ambient(&mut self, verify_integrity: bool) -> Result<f64, Error<E>> {
        self.read_temperature(Register::AmbientTemp, verify_integrity)
    }

    pub fn read_object(&mut self, verify_integrity: bool) -> Result<f64, Error<E>> {
        self.read_temperature(Register::ObjectTemp, verify_integrity)
    }

    pub fn read_body_temperature(&mut self, verify_integrity: bool) -> Result<f64, Error<E>> {
        let ambient = self.read_ambient(verify_integrity)?;
        let object = self.read_object(verify_integrity)?;
        Ok(model::estimate_body_temperature(ambient, object))
    }
}

impl<I, E> BodySensor for Mlx90614<I>
where
    I: I2c<SevenBitAddress, Error = E>,
{
    type Error = Error<E>;

    fn body_temperature(&mut self) -> Result<f64, Self::Error> {
        self.read_body_temperature(self.verify_measurements)
    }
}
