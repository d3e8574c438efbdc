use portable_atomic::{AtomicF32, Ordering};

// Written by the poll loop, read by the display interrupt.
// One aligned 32 bit store, never torn.
#[derive(Debug)]
pub struct TemperatureCell(AtomicF32);

impl TemperatureCell {
    pub const fn new() -> Self {
        Self(AtomicF32::new(0.0))
    }

    pub fn set(&self, temperature_c: f64) {
        self.0.store(temperature_c as f32, Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.set(0.0);
    }
}

impl Default for TemperatureCell {
    fn default() -> Self {
        Self::new()
    }
}
