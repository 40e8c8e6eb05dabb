/// Axis scale for one spectrum's visible window
///
/// Computes "nice" tick steps from a data range, the rounded-out on-scale
/// range used to draw the axes, and the decimal precision of tick labels.
/// Pixel factors are not stored here: they depend on the plot size and are
/// derived on demand, so a `ScaleData` kept in a zoom history never changes.
use serde::{Deserialize, Serialize};

use crate::data::coordinate::{self, Coordinate, MAX_FRACTION_DIGITS};

/// Unit ladder for tick steps, applied to the mantissa of the raw span.
const UNITS: [f64; 7] = [1.5, 2.0, 2.5, 4.0, 5.0, 8.0, 10.0];

/// Relative slack used when deciding whether a gridline sits on the minimum.
const FIRST_TICK_SLACK: f64 = 1e-4;

/// Tick step for `[min, max]` split into roughly `divisions` parts.
///
/// Returns the step and the decimal exponent of the raw span.
pub fn nice_step(min: f64, max: f64, divisions: u32) -> (f64, i32) {
    let span = (max - min).abs() / divisions.max(1) as f64;
    if !span.is_finite() || span <= 0.0 {
        return (1.0, 0);
    }
    let mut exponent = span.log10().floor() as i32;
    // three significant decimals, as a 0.###E0 rendering would give
    let mut mantissa = (span / 10f64.powi(exponent) * 1000.0).round() / 1000.0;
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    } else if mantissa < 1.0 {
        mantissa *= 10.0;
        exponent -= 1;
    }
    let unit = UNITS
        .iter()
        .copied()
        .find(|&u| mantissa <= u)
        .unwrap_or(10.0);
    (10f64.powi(exponent) * unit, exponent)
}

/// Number of label decimals for a step exponent.
pub fn decimals_for(hash: i32) -> usize {
    if hash >= 1 {
        0
    } else {
        ((1 - hash) as usize).min(MAX_FRACTION_DIGITS)
    }
}

/// Fixed-decimal label without a negative zero.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

fn first_tick(min: f64, step: f64) -> f64 {
    let mut first = (min / step).floor() * step;
    if ((min - first) / step).abs() > FIRST_TICK_SLACK {
        first += step;
    }
    first
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleData {
    pub start_index: usize,
    pub end_index: usize,
    pub point_count: usize,

    pub min_x: f64,
    pub max_x: f64,
    pub min_x_on_scale: f64,
    pub max_x_on_scale: f64,
    pub first_x: f64,
    pub x_step: f64,
    pub x_hash: i32,

    pub min_y: f64,
    pub max_y: f64,
    pub min_y_on_scale: f64,
    pub max_y_on_scale: f64,
    pub first_y: f64,
    pub y_step: f64,
    pub y_hash: i32,

    pub init_min_y: f64,
    pub init_max_y: f64,
    pub init_min_y_on_scale: f64,
    pub init_max_y_on_scale: f64,

    pub x_divisions: u32,
    pub y_divisions: u32,
    pub continuous: bool,

    /// User multiplier for this spectrum; never applied to the samples
    pub spectrum_scale_factor: f64,
    /// Y value held fixed while scaling (0, or 100 for transmittance)
    pub spectrum_y_ref: f64,
    pub user_y_factor: f64,
}

impl Default for ScaleData {
    fn default() -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            point_count: 0,
            min_x: 0.0,
            max_x: 1.0,
            min_x_on_scale: 0.0,
            max_x_on_scale: 1.0,
            first_x: 0.0,
            x_step: 1.0,
            x_hash: 0,
            min_y: 0.0,
            max_y: 1.0,
            min_y_on_scale: 0.0,
            max_y_on_scale: 1.0,
            first_y: 0.0,
            y_step: 1.0,
            y_hash: 0,
            init_min_y: 0.0,
            init_max_y: 1.0,
            init_min_y_on_scale: 0.0,
            init_max_y_on_scale: 1.0,
            x_divisions: 14,
            y_divisions: 10,
            continuous: true,
            spectrum_scale_factor: 1.0,
            spectrum_y_ref: 0.0,
            user_y_factor: 1.0,
        }
    }
}

impl ScaleData {
    /// Scale for an explicit data range.
    pub fn from_range(
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        x_divisions: u32,
        y_divisions: u32,
        continuous: bool,
    ) -> Self {
        let mut s = Self {
            min_x,
            max_x,
            min_y,
            max_y,
            x_divisions,
            y_divisions,
            continuous,
            ..Default::default()
        };
        s.set_scale();
        s
    }

    /// Scale for the window `[start, end]` of a coordinate array.
    pub fn from_coords(
        coords: &[Coordinate],
        start: usize,
        end: usize,
        x_divisions: u32,
        y_divisions: u32,
        continuous: bool,
    ) -> Self {
        let mut s = Self::from_range(
            coordinate::min_x(coords, start, end),
            coordinate::max_x(coords, start, end),
            coordinate::min_y(coords, start, end),
            coordinate::max_y(coords, start, end),
            x_divisions,
            y_divisions,
            continuous,
        );
        s.set_window(start, end);
        s
    }

    pub fn set_window(&mut self, start: usize, end: usize) {
        self.start_index = start;
        self.end_index = end;
        self.point_count = (end + 1).saturating_sub(start);
    }

    fn set_scale(&mut self) {
        self.set_x_scale();
        self.set_y_scale(self.min_y, self.max_y, true);
    }

    pub fn set_x_scale(&mut self) {
        let (step, hash) = nice_step(self.min_x, self.max_x, self.x_divisions);
        self.x_step = step;
        self.x_hash = hash;
        self.first_x = first_tick(self.min_x, step);
        self.min_x_on_scale = self.min_x;
        self.max_x_on_scale = self.max_x;
        if !self.continuous {
            // stick spectra must not end on a line
            self.max_x_on_scale += step / 2.0;
        }
    }

    /// Recompute the Y axis for `[min_y, max_y]`.
    ///
    /// With `set_min_max` the on-scale range is rounded out to whole steps and
    /// recorded as the initial range; otherwise the raw bounds are used as is.
    pub fn set_y_scale(&mut self, min_y: f64, mut max_y: f64, set_min_max: bool) {
        if min_y == max_y {
            max_y = min_y + 1.0;
        }
        let (step, hash) = nice_step(min_y, max_y, self.y_divisions);
        self.y_step = step;
        self.y_hash = hash;
        self.min_y = min_y;
        self.max_y = max_y;
        if set_min_max {
            self.min_y_on_scale = step * (min_y / step).floor();
            self.max_y_on_scale = step * (max_y / step).ceil();
        } else {
            self.min_y_on_scale = min_y;
            self.max_y_on_scale = max_y;
        }
        self.first_y = first_tick(min_y, step);
        if self.is_y_zero_on_scale() {
            // exact multiple of the step so that one gridline lands on zero
            self.first_y = (self.first_y / step).round() * step;
        }
        if set_min_max {
            self.init_min_y_on_scale = self.min_y_on_scale;
            self.init_max_y_on_scale = self.max_y_on_scale;
            self.init_min_y = min_y;
            self.init_max_y = max_y;
        }
    }

    /// Apply a zoomed X range exactly.
    pub fn set_x_range(&mut self, x1: f64, x2: f64) {
        self.min_x = x1.min(x2);
        self.max_x = x1.max(x2);
        self.set_x_scale();
    }

    pub fn is_y_zero_on_scale(&self) -> bool {
        self.min_y_on_scale < 0.0 && self.max_y_on_scale > 0.0
    }

    pub fn is_in_range_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    /// Data units per pixel along X.
    pub fn x_factor(&self, x_pixels: i32) -> f64 {
        (self.max_x_on_scale - self.min_x_on_scale) / x_pixels.max(1) as f64
    }

    /// Data units per pixel along Y.
    pub fn y_factor(&self, y_pixels: i32) -> f64 {
        (self.max_y_on_scale - self.min_y_on_scale) / y_pixels.max(1) as f64
    }

    /// X gridline values from `first_x` through `max_x_on_scale`.
    pub fn x_gridlines(&self) -> Vec<f64> {
        let last = self.max_x_on_scale + self.x_step * FIRST_TICK_SLACK;
        let mut out = Vec::new();
        let mut k = 0.0;
        loop {
            let v = self.first_x + k * self.x_step;
            if v > last || out.len() > 1000 {
                break;
            }
            out.push(v);
            k += 1.0;
        }
        out
    }

    /// Y gridline values from `first_y` while below `max_y_on_scale + step/2`.
    ///
    /// Values are whole multiples of the step, so zero is hit exactly when it
    /// is on scale.
    pub fn y_gridlines(&self) -> Vec<f64> {
        let last = self.max_y_on_scale + self.y_step / 2.0;
        let k0 = (self.first_y / self.y_step).round();
        let exact = (k0 * self.y_step - self.first_y).abs() <= self.y_step * FIRST_TICK_SLACK;
        let mut out = Vec::new();
        let mut k = 0.0;
        loop {
            let v = if exact {
                (k0 + k) * self.y_step
            } else {
                self.first_y + k * self.y_step
            };
            if v >= last || out.len() > 1000 {
                break;
            }
            out.push(v);
            k += 1.0;
        }
        out
    }

    pub fn x_decimals(&self) -> usize {
        decimals_for(self.x_hash)
    }

    pub fn y_decimals(&self) -> usize {
        decimals_for(self.y_hash)
    }

    pub fn format_x(&self, x: f64) -> String {
        format_fixed(x, self.x_decimals())
    }

    pub fn format_y(&self, y: f64) -> String {
        format_fixed(y, self.y_decimals())
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        self.min_x += dx;
        self.max_x += dx;
        self.min_x_on_scale += dx;
        self.max_x_on_scale += dx;
        self.first_x += dx;
    }
}
