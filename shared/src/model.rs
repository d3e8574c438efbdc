// Body temperature from ambient and forehead surface temperature

pub const TA_LEVEL: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub base: f64,
    pub slope: f64,
}

impl Line {
    pub const fn new(base: f64, slope: f64) -> Self {
        Self { base, slope }
    }

    fn at(&self, ambient_c: f64) -> f64 {
        self.base + self.slope * (ambient_c - TA_LEVEL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    pub offset: f64,
    pub per_ambient: f64,
}

impl Gain {
    pub const fn new(offset: f64, per_ambient: f64) -> Self {
        Self {
            offset,
            per_ambient,
        }
    }

    fn at(&self, ambient_c: f64) -> f64 {
        self.offset + self.per_ambient * ambient_c
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, object_c: f64) -> bool {
        object_c >= self.low && object_c <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyModel {
    // band edges for ambient <= TA_LEVEL
    pub cold_low: Line,
    pub cold_high: Line,
    // band edges for ambient > TA_LEVEL
    pub warm_low: Line,
    pub warm_high: Line,

    // body temperature at the low and high band edge
    pub body_low: f64,
    pub body_high: f64,

    pub above_gain: Gain,
    pub below_gain: Gain,
}

impl BodyModel {
    pub const DEFAULT: Self = Self {
        cold_low: Line::new(32.66, 0.186),
        cold_high: Line::new(34.84, 0.148),
        warm_low: Line::new(32.66, 0.086),
        warm_high: Line::new(34.84, 0.100),

        body_low: 36.3,
        body_high: 36.8,

        above_gain: Gain::new(0.829321, 0.002364),
        below_gain: Gain::new(0.551658, 0.021525),
    };

    pub fn band(&self, ambient_c: f64) -> Band {
        if ambient_c <= TA_LEVEL {
            Band {
                low: self.cold_low.at(ambient_c),
                high: self.cold_high.at(ambient_c),
            }
        } else {
            Band {
                low: self.warm_low.at(ambient_c),
                high: self.warm_high.at(ambient_c),
            }
        }
    }

    pub fn estimate(&self, ambient_c: f64, object_c: f64) -> f64 {
        let band = self.band(ambient_c);

        if band.contains(object_c) {
            let width = band.width();
            // A zero width band can only contain its single point, which is the low edge
            if width <= 0.0 {
                return self.body_low;
            }
            self.body_low + (self.body_high - self.body_low) / width * (object_c - band.low)
        } else if object_c > band.high {
            self.body_high + self.above_gain.at(ambient_c) * (object_c - band.high)
        } else {
            self.body_low + self.below_gain.at(ambient_c) * (object_c - band.low)
        }
    }
}

impl Default for BodyModel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn estimate_body_temperature(ambient_c: f64, object_c: f64) -> f64 {
    BodyModel::DEFAULT.estimate(ambient_c, object_c)
}
