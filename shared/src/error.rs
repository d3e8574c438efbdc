use core::fmt;

use crate::mlx90614::Register;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    Bus(E),
    Integrity {
        register: Register,
        computed: u8,
        received: u8,
    },
    Fault { register: Register, raw: u16 },
    VerifyMismatch {
        register: Register,
        written: u16,
        read: u16,
    },
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::Integrity {
                register,
                computed,
                received,
            } => write!(
                f,
                "PEC mismatch reading {}: computed 0x{:02x}, received 0x{:02x}",
                register, computed, received
            ),
            Error::Fault { register, raw } => {
                write!(f, "sensor flagged {} invalid (raw 0x{:04x})", register, raw)
            }
            Error::VerifyMismatch {
                register,
                written,
                read,
            } => write!(
                f,
                "read-back of {} after write: wrote 0x{:04x}, read 0x{:04x}",
                register, written, read
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

// Which half of the EEPROM may be inconsistent after a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    ReadCoefficient,
    ReadFactor,
    EraseCoefficient,
    WriteCoefficient,
    EraseFactor,
    WriteFactor,
}

impl fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            CalibrationStep::ReadCoefficient => "reading emissivity coefficient",
            CalibrationStep::ReadFactor => "reading emissivity factor",
            CalibrationStep::EraseCoefficient => "erasing emissivity coefficient",
            CalibrationStep::WriteCoefficient => "writing emissivity coefficient",
            CalibrationStep::EraseFactor => "erasing emissivity factor",
            CalibrationStep::WriteFactor => "writing emissivity factor",
        };
        f.write_str(step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError<E> {
    OutOfRange(f64),
    // rescale is undefined, raised before anything is written
    ZeroCoefficient { register: Register },
    FactorOverflow(f64),
    Step {
        step: CalibrationStep,
        source: Error<E>,
    },
}

impl<E: fmt::Debug> fmt::Display for CalibrationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::OutOfRange(value) => {
                write!(f, "emissivity {} out of range [0, 1]", value)
            }
            CalibrationError::ZeroCoefficient { register } => {
                write!(f, "zero coefficient in {}, cannot rescale factor", register)
            }
            CalibrationError::FactorOverflow(factor) => {
                write!(f, "rescaled emissivity factor {} exceeds 0xffff", factor)
            }
            CalibrationError::Step { step, source } => write!(f, "{} failed: {}", step, source),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for CalibrationError<E> {}
