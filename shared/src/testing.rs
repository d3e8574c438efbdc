// Simulated peripherals for host tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation};

use crate::dispenser::BodySensor;
use crate::mlx90614::{pec, Register, DEFAULT_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

impl i2c::Error for FakeBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Read(u8),
    Write(u8, u16),
}

// MLX90614 register file on a bus
// Writing a non-zero word over a non-zero EEPROM cell without an erase
// stores the AND of both, as the real part does.
pub struct FakeSensor {
    pub address: u8,
    registers: [u16; 256],
    pub corrupt_pec: bool,
    pub fail_bus: bool,
    // acknowledged but dropped
    pub write_protected: Option<Register>,
    // fails on the bus
    pub fail_write_of: Option<(Register, u16)>,
    pub log: Vec<Transaction>,
    pub raw_writes: Vec<[u8; 4]>,
}

impl FakeSensor {
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            registers: [0; 256],
            corrupt_pec: false,
            fail_bus: false,
            write_protected: None,
            fail_write_of: None,
            log: vec![],
            raw_writes: vec![],
        }
    }

    pub fn set(&mut self, register: Register, value: u16) {
        self.registers[register.command() as usize] = value;
    }

    pub fn get(&self, register: Register) -> u16 {
        self.registers[register.command() as usize]
    }

    fn is_eeprom(command: u8) -> bool {
        (0x20..=0x3F).contains(&command)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), FakeBusError> {
        let [command, low, high, received] =
            <[u8; 4]>::try_from(bytes).map_err(|_| FakeBusError)?;
        let value = u16::from_le_bytes([low, high]);

        if let Some((register, failing)) = self.fail_write_of {
            if register.command() == command && failing == value {
                return Err(FakeBusError);
            }
        }

        self.raw_writes.push([command, low, high, received]);
        self.log.push(Transaction::Write(command, value));

        // The part ignores frames with a bad PEC
        if pec(&[self.address << 1, command, low, high]) != received {
            return Ok(());
        }
        let protected = self.write_protected.map(Register::command) == Some(command);
        if protected || !Self::is_eeprom(command) {
            return Ok(());
        }

        let cell = &mut self.registers[command as usize];
        *cell = if value == 0 || *cell == 0 { value } else { *cell & value };
        Ok(())
    }

    fn read(&mut self, command: u8, buffer: &mut [u8]) -> Result<(), FakeBusError> {
        if buffer.len() != 3 {
            return Err(FakeBusError);
        }
        self.log.push(Transaction::Read(command));

        let [low, high] = self.registers[command as usize].to_le_bytes();
        let address = self.address << 1;
        let mut frame_pec = pec(&[address, command, address | 1, low, high]);
        if self.corrupt_pec {
            frame_pec ^= 0xFF;
        }
        buffer.copy_from_slice(&[low, high, frame_pec]);
        Ok(())
    }
}

impl Default for FakeSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for FakeSensor {
    type Error = FakeBusError;
}

impl I2c for FakeSensor {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // NACK
        if self.fail_bus || address != self.address {
            return Err(FakeBusError);
        }

        let mut command = None;
        for operation in operations {
            match operation {
                Operation::Write([selected]) => command = Some(*selected),
                Operation::Write(bytes) => self.write(bytes)?,
                Operation::Read(buffer) => {
                    let selected = command.ok_or(FakeBusError)?;
                    self.read(selected, buffer)?;
                }
            }
        }
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls_ms: Vec<u32>,
    pub total_ns: u64,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.calls_ms.iter().map(|&ms| ms as u64).sum::<u64>() + self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls_ms.push(ms);
    }
}

#[derive(Debug, Default, Clone)]
pub struct PinLog(Rc<RefCell<Vec<(char, bool)>>>);

impl PinLog {
    pub fn events(&self) -> Vec<(char, bool)> {
        self.0.borrow().clone()
    }

    pub fn levels_of(&self, pin: char) -> Vec<bool> {
        self.0
            .borrow()
            .iter()
            .filter(|(name, _)| *name == pin)
            .map(|(_, level)| *level)
            .collect()
    }
}

pub struct RecordingPin {
    name: char,
    log: PinLog,
}

impl RecordingPin {
    pub fn new(name: char, log: &PinLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }
}

impl PinErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.0.borrow_mut().push((self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.0.borrow_mut().push((self.name, true));
        Ok(())
    }
}

// queued readings, then `fallback` forever
pub struct ScriptedSensor {
    pub readings: VecDeque<Result<f64, FakeBusError>>,
    pub fallback: Result<f64, FakeBusError>,
    pub reads: usize,
}

impl ScriptedSensor {
    pub fn new<const N: usize>(
        readings: [Result<f64, FakeBusError>; N],
        fallback: Result<f64, FakeBusError>,
    ) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            fallback,
            reads: 0,
        }
    }
}

impl BodySensor for ScriptedSensor {
    type Error = FakeBusError;

    fn body_temperature(&mut self) -> Result<f64, Self::Error> {
        self.reads += 1;
        self.readings.pop_front().unwrap_or(self.fallback)
    }
}
