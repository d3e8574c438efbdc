// Median over the last few readings, rejects single-sample spikes

use heapless::Vec;

#[derive(Debug, Clone)]
pub struct MedianWindow<const N: usize> {
    samples: Vec<f64, N>,
    len: usize,
    next: usize,
}

impl<const N: usize> MedianWindow<N> {
    pub fn new(len: usize) -> Self {
        const { assert!(N > 0, "median window needs capacity") };
        Self {
            samples: Vec::new(),
            len: len.clamp(1, N),
            next: 0,
        }
    }

    pub fn window_len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: f64) {
        let slot = self.next;
        self.next = (slot + 1) % self.len;
        // slot == samples.len() while filling up, len <= N
        match self.samples.get_mut(slot) {
            Some(oldest) => *oldest = sample,
            None => {
                if let Err(sample) = self.samples.push(sample) {
                    self.samples[0] = sample;
                }
            }
        }
    }

    // even count: mean of the two middle samples
    pub fn median(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable_by(f64::total_cmp);
        let half = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[half - 1] + sorted[half]) / 2.0)
        } else {
            Some(sorted[half])
        }
    }
}
