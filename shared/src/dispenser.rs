// Dispense policy: poll the thermometer, run the pump when someone with a
// plausible body temperature is in front of it, keep the display current.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use fugit::MillisDurationU32;

use crate::cell::TemperatureCell;
use crate::config::DispenseConfig;
use crate::filter::MedianWindow;

pub const MEDIAN_CAPACITY: usize = 10;

pub trait BodySensor {
    type Error;

    fn body_temperature(&mut self) -> Result<f64, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome<E> {
    // missed_reads: failed reads while the display was kept current
    Dispensed { temperature: f64, missed_reads: u32 },
    Idle { temperature: f64 },
    Skipped(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseError<P> {
    Pump(P),
}

pub struct Dispenser<'a, S, P, D> {
    sensor: S,
    pump: P,
    delay: D,
    cell: &'a TemperatureCell,
    config: DispenseConfig,
    window: MedianWindow<MEDIAN_CAPACITY>,
}

impl<'a, S, P, D> Dispenser<'a, S, P, D>
where
    S: BodySensor,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        sensor: S,
        pump: P,
        delay: D,
        cell: &'a TemperatureCell,
        config: DispenseConfig,
    ) -> Self {
        Self {
            sensor,
            pump,
            delay,
            cell,
            window: MedianWindow::new(config.median_samples),
            config,
        }
    }

    pub fn release(self) -> (S, P, D) {
        (self.sensor, self.pump, self.delay)
    }

    fn sample(&mut self) -> Result<f64, S::Error> {
        let temperature = self.sensor.body_temperature()?;
        self.window.push(temperature);
        Ok(self.window.median().unwrap_or(temperature))
    }

    // Blocks for the whole dispense cycle
    pub fn poll(&mut self) -> Result<PollOutcome<S::Error>, DispenseError<P::Error>> {
        let temperature = match self.sample() {
            Ok(temperature) => temperature,
            Err(e) => {
                let backoff = self.config.error_backoff.to_millis();
                if backoff > 0 {
                    self.delay.delay_ms(backoff);
                }
                return Ok(PollOutcome::Skipped(e));
            }
        };

        if !self.config.accepts(temperature) {
            self.cell.clear();
            self.delay.delay_ms(self.config.idle.to_millis());
            return Ok(PollOutcome::Idle { temperature });
        }

        self.cell.set(temperature);
        self.pump.set_high().map_err(DispenseError::Pump)?;
        let mut missed_reads = self.track(self.config.pump_on);
        self.pump.set_low().map_err(DispenseError::Pump)?;
        missed_reads += self.track(self.config.lockout);

        Ok(PollOutcome::Dispensed {
            temperature,
            missed_reads,
        })
    }

    // Re-read and publish every refresh interval for `span`.
    // Failed reads leave the last value on the display.
    fn track(&mut self, span: MillisDurationU32) -> u32 {
        let step = self.config.refresh.to_millis().max(1);
        let mut missed = 0;
        for _ in 0..span.to_millis() / step {
            match self.sample() {
                Ok(temperature) => self.cell.set(temperature),
                Err(_) => missed += 1,
            }
            self.delay.delay_ms(step);
        }
        missed
    }
}
