// Emissivity calibration in the sensor EEPROM, coefficient 0x24 and factor 0x2F

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::error::{CalibrationError, CalibrationStep, Error};
use crate::mlx90614::{Mlx90614, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissivityWords {
    pub coefficient: u16,
    pub factor: u16,
}

impl EmissivityWords {
    // emissivity 1.0 as shipped
    pub const FACTORY: Self = Self {
        coefficient: 0xFFFF,
        factor: 2458,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissivityUpdate {
    pub old: EmissivityWords,
    pub new: EmissivityWords,
}

pub fn rescale<E>(
    old: EmissivityWords,
    value: f64,
) -> Result<EmissivityWords, CalibrationError<E>> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CalibrationError::OutOfRange(value));
    }
    if value == 1.0 {
        return Ok(EmissivityWords::FACTORY);
    }

    // Half to even on both words, 3072.5 -> 3072
    let coefficient = libm::rint(value * 65535.0);
    if coefficient == 0.0 {
        return Err(CalibrationError::ZeroCoefficient {
            register: Register::Emissivity,
        });
    }
    if old.coefficient == 0 {
        return Err(CalibrationError::ZeroCoefficient {
            register: Register::Emissivity,
        });
    }

    let factor = libm::rint(old.coefficient as f64 / coefficient * old.factor as f64);
    if factor > u16::MAX as f64 {
        return Err(CalibrationError::FactorOverflow(factor));
    }

    Ok(EmissivityWords {
        coefficient: coefficient as u16,
        factor: factor as u16,
    })
}

impl<I, E> Mlx90614<I>
where
    I: I2c<SevenBitAddress, Error = E>,
{
    // Unchecked, factory cells don't always carry a valid PEC
    pub fn raw_emissivity(&mut self) -> Result<EmissivityWords, CalibrationError<E>> {
        let coefficient = self
            .read_register(Register::Emissivity, false)
            .map_err(step(CalibrationStep::ReadCoefficient))?;
        let factor = self
            .read_register(Register::EmissivityFactor, false)
            .map_err(step(CalibrationStep::ReadFactor))?;
        Ok(EmissivityWords {
            coefficient,
            factor,
        })
    }

    pub fn read_emissivity(&mut self, verify_integrity: bool) -> Result<f64, Error<E>> {
        let coefficient = self.read_register(Register::Emissivity, verify_integrity)?;
        Ok(coefficient as f64 / 65535.0)
    }

    // A failure past the first erase leaves the EEPROM half written, the step says where
    pub fn set_emissivity<D: DelayNs>(
        &mut self,
        value: f64,
        delay: &mut D,
    ) -> Result<EmissivityUpdate, CalibrationError<E>> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CalibrationError::OutOfRange(value));
        }

        let old = self.raw_emissivity()?;
        let new = rescale(old, value)?;

        self.rewrite_cell(
            Register::Emissivity,
            new.coefficient,
            CalibrationStep::EraseCoefficient,
            CalibrationStep::WriteCoefficient,
            delay,
        )?;
        self.rewrite_cell(
            Register::EmissivityFactor,
            new.factor,
            CalibrationStep::EraseFactor,
            CalibrationStep::WriteFactor,
            delay,
        )?;

        Ok(EmissivityUpdate { old, new })
    }

    fn rewrite_cell<D: DelayNs>(
        &mut self,
        register: Register,
        value: u16,
        erase: CalibrationStep,
        write: CalibrationStep,
        delay: &mut D,
    ) -> Result<(), CalibrationError<E>> {
        let settle = self.eeprom.settle;
        let verify = self.eeprom.verify;

        delay.delay_ms(settle.to_millis());
        self.write_register(register, 0x0000, verify, settle, delay)
            .map_err(step(erase))?;
        delay.delay_ms(settle.to_millis());
        self.write_register(register, value, verify, settle, delay)
            .map_err(step(write))?;
        delay.delay_ms(settle.to_millis());

        Ok(())
    }
}

fn step<E>(step: CalibrationStep) -> impl FnOnce(Error<E>) -> CalibrationError<E> {
    move |source| CalibrationError::Step { step, source }
}
