//! Band and linear scales mapping data to pixel positions

/// Categorical scale dividing a range into equal bands.
///
/// A single `padding` is used as both inner and outer padding and bands
/// are centered in the range.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let padding = padding.clamp(0.0, 1.0);
        let n = domain.len() as f64;
        let (r0, r1) = range;

        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self {
            domain,
            start,
            step,
            bandwidth,
        }
    }

    /// Left edge of the band for `label`
    pub fn position(&self, label: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == label)
            .map(|i| self.start + self.step * i as f64)
    }

    /// Center of the band for `label`
    pub fn center(&self, label: &str) -> Option<f64> {
        self.position(label).map(|x| x + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Tick increment for `count` ticks over `[start, stop]`.
///
/// Positive values are the increment itself; negative values `-k` stand
/// for an increment of `1/k`, which keeps decimal ticks exact.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power) / factor)
    }
}

/// Evenly spaced, human-friendly values within `[start, stop]`
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite()) || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reversed) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 {
        return Vec::new();
    }

    let mut values = Vec::new();
    if inc > 0.0 {
        let mut i0 = (lo / inc).round();
        let mut i1 = (hi / inc).round();
        if i0 * inc < lo {
            i0 += 1.0;
        }
        if i1 * inc > hi {
            i1 -= 1.0;
        }
        let mut i = i0;
        while i <= i1 {
            values.push(i * inc);
            i += 1.0;
        }
    } else {
        let inv = -inc;
        let mut i0 = (lo * inv).round();
        let mut i1 = (hi * inv).round();
        if i0 / inv < lo {
            i0 += 1.0;
        }
        if i1 / inv > hi {
            i1 -= 1.0;
        }
        let mut i = i0;
        while i <= i1 {
            values.push(i / inv);
            i += 1.0;
        }
    }

    if reversed {
        values.reverse();
    }
    values
}

/// Continuous scale with linear interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value to the range. A degenerate domain maps to the
    /// middle of the range.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Extend the domain outward to whole tick increments
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous = Some(step);
        }

        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    /// Number of decimals needed to print ticks for `count` without noise
    pub fn tick_precision(&self, count: usize) -> usize {
        let (d0, d1) = self.domain;
        let inc = tick_increment(d0.min(d1), d0.max(d1), count);
        if inc < 0.0 {
            (-inc).log10().ceil().max(0.0) as usize
        } else {
            0
        }
    }

    /// Tick label using a fixed precision, `-0` printed as `0`
    pub fn format_tick(value: f64, precision: usize) -> String {
        let text = format!("{value:.precision$}");
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text[1..].to_string()
        } else {
            text
        }
    }
}
