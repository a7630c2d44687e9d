use std::fmt;

/// ColorBrewer "Reds", light to dark.
const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Uniform cubic B-spline through evenly spaced control values, `t` in [0, 1].
fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };

    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

    let t1 = (t - i as f64 / n as f64) * n as f64;
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone)]
pub struct ColorRamp {
    r: Vec<f64>,
    g: Vec<f64>,
    b: Vec<f64>,
}

impl ColorRamp {
    pub fn new(stops: &[Rgb]) -> Self {
        assert!(stops.len() >= 2, "a colour ramp needs at least two stops");
        Self {
            r: stops.iter().map(|c| c.r as f64).collect(),
            g: stops.iter().map(|c| c.g as f64).collect(),
            b: stops.iter().map(|c| c.b as f64).collect(),
        }
    }

    pub fn reds() -> Self {
        let stops: Vec<Rgb> = REDS.iter().filter_map(|h| Rgb::from_hex(h)).collect();
        Self::new(&stops)
    }

    pub fn sample(&self, t: f64) -> Rgb {
        Rgb {
            r: channel(basis_spline(&self.r, t)),
            g: channel(basis_spline(&self.g, t)),
            b: channel(basis_spline(&self.b, t)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequentialScale {
    max: f64,
    ramp: ColorRamp,
}

impl SequentialScale {
    pub fn new(max: f64, ramp: ColorRamp) -> Self {
        Self { max, ramp }
    }

    pub fn domain(&self) -> [f64; 2] {
        [0.0, self.max]
    }

    pub fn color(&self, value: f64) -> Rgb {
        // degenerate domain samples the middle of the ramp
        let t = if self.max == 0.0 { 0.5 } else { value / self.max };
        self.ramp.sample(t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    /// Population 0, including subzones with no population record.
    Neutral,
    Ramp(Rgb),
    Highlight,
}

#[derive(Debug, Clone)]
pub struct FillRule {
    scale: SequentialScale,
    neutral: String,
    highlight: String,
}

impl FillRule {
    pub fn new(scale: SequentialScale, neutral: impl Into<String>, highlight: impl Into<String>) -> Self {
        Self {
            scale,
            neutral: neutral.into(),
            highlight: highlight.into(),
        }
    }

    pub fn for_populations(
        populations: impl IntoIterator<Item = u64>,
        neutral: impl Into<String>,
        highlight: impl Into<String>,
    ) -> Self {
        let max = populations.into_iter().max().unwrap_or(0);
        Self::new(SequentialScale::new(max as f64, ColorRamp::reds()), neutral, highlight)
    }

    pub fn scale(&self) -> &SequentialScale {
        &self.scale
    }

    pub fn fill_for(&self, population: u64) -> Fill {
        if population == 0 {
            Fill::Neutral
        } else {
            Fill::Ramp(self.scale.color(population as f64))
        }
    }

    pub fn paint(&self, fill: &Fill) -> String {
        match fill {
            Fill::Neutral => self.neutral.clone(),
            Fill::Ramp(rgb) => rgb.to_string(),
            Fill::Highlight => self.highlight.clone(),
        }
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
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

    let (i1, i2, inc) = if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        let mut i1 = (start * inv).round();
        let mut i2 = (stop * inv).round();
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        (i1, i2, -inv)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round();
        let mut i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Round tick values (1, 2 or 5 times a power of ten) covering [start, stop],
/// roughly `count` of them.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let count = count as f64;
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start { (stop, start, true) } else { (start, stop, false) };

    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    let mut ticks: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 { k / -inc } else { k * inc }
        })
        .collect();
    if reverse {
        ticks.reverse();
    }
    ticks
}
