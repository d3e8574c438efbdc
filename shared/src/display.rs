// Bit-banged 4 digit seven segment display behind two 74HC595 shift registers.
// Each digit is a segment byte followed by a position byte, then a latch pulse.
use bitfield::{bitfield, Bit};
use embedded_hal::digital::OutputPin;

use crate::cell::TemperatureCell;

#[allow(unused)]
pub mod glyph {
    pub const A: usize = 10;
    pub const B: usize = 11;
    pub const C: usize = 12;
    pub const D: usize = 13;
    pub const E: usize = 14;
    pub const F: usize = 15;
    pub const DASH: usize = 16;
    pub const BLANK: usize = 17;
}

// active low
//  0     1     2     3     4     5     6     7     8     9
//  A     b     C     d     E     F     -     blank
pub const SEGMENTS: [u8; 18] = [
    0xC0, 0xF9, 0xA4, 0xB0, 0x99, 0x92, 0x82, 0xF8, 0x80, 0x90, //
    0x8C, 0xBF, 0xC6, 0xA1, 0x86, 0xFF, 0xBF, 0xFF,
];

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Segments(u8);
    impl Debug;
    // high = off
    pub dp_off, set_dp_off: 7;
}

impl Segments {
    pub fn glyph(index: usize) -> Self {
        Segments(SEGMENTS.get(index).copied().unwrap_or(SEGMENTS[glyph::BLANK]))
    }

    pub fn with_dot(mut self) -> Self {
        self.set_dp_off(false);
        self
    }
}

pub fn segments(index: usize) -> u8 {
    Segments::glyph(index).0
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First = 0x01,
    Second = 0x02,
    Third = 0x04,
    Fourth = 0x08,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub segments: Segments,
    pub position: Position,
}

impl Frame {
    const fn blank(position: Position) -> Self {
        Frame {
            segments: Segments(SEGMENTS[glyph::BLANK]),
            position,
        }
    }
}

// Tenths, units with the dot, tens. The trailing blanks keep the last lit
// digit from outshining the others until the next refresh.
pub fn frames(temperature_c: f32) -> [Frame; 6] {
    let digit = |k: i32| -> usize {
        if !temperature_c.is_finite() || temperature_c < 0.0 {
            return glyph::DASH;
        }
        let tenths = temperature_c * 10.0;
        let mut scaled = tenths;
        for _ in 0..k {
            scaled /= 10.0;
        }
        (scaled % 10.0) as usize
    };

    [
        Frame {
            segments: Segments::glyph(digit(0)),
            position: Position::First,
        },
        Frame {
            segments: Segments::glyph(digit(1)).with_dot(),
            position: Position::Second,
        },
        Frame {
            segments: Segments::glyph(digit(2)),
            position: Position::Third,
        },
        Frame::blank(Position::First),
        Frame::blank(Position::Second),
        Frame::blank(Position::Third),
    ]
}

pub struct DigitalTube<P> {
    sclk: P,
    rclk: P,
    dio: P,
}

impl<P: OutputPin> DigitalTube<P> {
    pub fn new(sclk: P, rclk: P, dio: P) -> Self {
        Self { sclk, rclk, dio }
    }

    // MSB first, sampled on the rising clock edge
    pub fn shift_out(&mut self, byte: u8) -> Result<(), P::Error> {
        for i in (0..8).rev() {
            if byte.bit(i) {
                self.dio.set_high()?;
            } else {
                self.dio.set_low()?;
            }
            self.sclk.set_low()?;
            self.sclk.set_high()?;
        }
        Ok(())
    }

    pub fn show(&mut self, frame: Frame) -> Result<(), P::Error> {
        self.shift_out(frame.segments.0)?;
        self.shift_out(frame.position as u8)?;
        self.rclk.set_low()?;
        self.rclk.set_high()
    }

    pub fn refresh(&mut self, temperature_c: f32) -> Result<(), P::Error> {
        for frame in frames(temperature_c) {
            self.show(frame)?;
        }
        Ok(())
    }

    pub fn refresh_from(&mut self, cell: &TemperatureCell) -> Result<(), P::Error> {
        self.refresh(cell.get())
    }
}
