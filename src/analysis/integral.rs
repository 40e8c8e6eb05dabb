/// Integration curve and integral regions
///
/// The curve holds fractions of full scale: a running sum of the spectrum's
/// intensities, normalized so the whole spectrum spans `range_percent` and
/// lifted by `offset_percent`. Regions report the curve difference across
/// their X interval, times 100 and the normalization factor.
use serde::{Deserialize, Serialize};

use crate::config::IntegralConfig;
use crate::data::coordinate::{self, Coordinate};
use crate::data::Spectrum;

/// End of the X axis the running sum starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationDirection {
    /// Conventional NMR display: the curve rises toward low x
    #[default]
    HighX,
    LowX,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralRegion {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
    pub value: f64,
    pub text: String,
}

impl IntegralRegion {
    pub fn min_x(&self) -> f64 {
        self.x1.min(self.x2)
    }

    pub fn max_x(&self) -> f64 {
        self.x1.max(self.x2)
    }

    /// Open-interval overlap with `[x1, x2]` in either order.
    pub fn overlaps(&self, x1: f64, x2: f64) -> bool {
        self.min_x() < x1.max(x2) && self.max_x() > x1.min(x2)
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
        self.text = format!("{:.2}", value);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegralData {
    /// Curve in fractions of full scale, one point per sample
    pub curve: Vec<Coordinate>,
    /// Committed regions, sorted by their low x
    pub regions: Vec<IntegralRegion>,
    /// Region being dragged out, not yet committed
    pub pending: Option<IntegralRegion>,
    pub normalization_factor: f64,
    pub direction: IntegrationDirection,
    percent_offset: f64,
    range: f64,
    int_range: f64,
    offset: f64,
    integral_total: f64,
    min_value: f64,
}

impl IntegralData {
    pub fn new(spec: &Spectrum, config: &IntegralConfig, direction: IntegrationDirection) -> Self {
        let mut data = Self {
            curve: Vec::new(),
            regions: Vec::new(),
            pending: None,
            normalization_factor: 1.0,
            direction,
            percent_offset: config.offset_percent,
            range: config.range_percent,
            int_range: 0.0,
            offset: 0.0,
            integral_total: 0.0,
            min_value: config.min_value,
        };
        data.calculate(&spec.coords);
        log::debug!(
            "Integrated '{}' ({} points, direction {:?})",
            spec.title,
            spec.coords.len(),
            direction
        );
        data
    }

    /// Integrate from the high-x end.
    pub fn from_spectrum(spec: &Spectrum, config: &IntegralConfig) -> Self {
        Self::new(spec, config, IntegrationDirection::default())
    }

    fn calculate(&mut self, coords: &[Coordinate]) {
        let n = coords.len();
        self.integral_total = coords.iter().map(|c| c.y).sum();
        if self.range == 0.0 {
            self.range = 10.0;
        }
        self.int_range = if self.integral_total != 0.0 {
            (self.range / 100.0) / self.integral_total
        } else {
            0.0
        };
        self.offset = self.percent_offset / 100.0;

        // walk from the chosen end of the X axis whatever the storage order
        let from_last = (self.direction == IntegrationDirection::HighX) == coordinate::is_increasing(coords);
        let mut curve = vec![Coordinate::default(); n];
        let mut sum = 0.0;
        for k in 0..n {
            let i = if from_last { n - 1 - k } else { k };
            sum += coords[i].y;
            curve[i] = Coordinate::new(coords[i].x, sum * self.int_range + self.offset);
        }
        self.curve = curve;
    }

    pub fn percent_offset(&self) -> f64 {
        self.percent_offset
    }

    pub fn range_percent(&self) -> f64 {
        self.range
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Curve fraction at `x` (NaN outside the data).
    pub fn y_value_at(&self, x: f64) -> f64 {
        coordinate::y_value_at(&self.curve, x)
    }

    pub fn percent_y_value_at(&self, x: f64) -> f64 {
        self.y_value_at(x) * 100.0
    }

    fn region(&self, x1: f64, x2: f64) -> IntegralRegion {
        let y1 = self.y_value_at(x1);
        let y2 = self.y_value_at(x2);
        let mut r = IntegralRegion {
            x1,
            x2,
            y1,
            y2,
            value: 0.0,
            text: String::new(),
        };
        r.set_value((y2 - y1).abs() * 100.0 * self.normalization_factor);
        r
    }

    /// Add a region over `[x1, x2]`.
    ///
    /// A NaN `x1` clears everything. A non-final region only replaces the
    /// pending one. A final region removes every region it overlaps and is
    /// kept if it reads at least the configured minimum.
    pub fn add_integral_region(&mut self, x1: f64, x2: f64, is_final: bool) {
        if x1.is_nan() {
            self.regions.clear();
            self.pending = None;
            return;
        }
        let region = self.region(x1, x2);
        if !is_final {
            self.pending = Some(region);
            return;
        }
        self.pending = None;
        self.clear_range(x1, x2);
        if region.value.is_nan() || region.value < self.min_value {
            return;
        }
        self.regions.push(region);
        self.regions
            .sort_by(|a, b| a.min_x().partial_cmp(&b.min_x()).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Remove regions overlapping `[x1, x2]` and any without text.
    pub fn clear_range(&mut self, x1: f64, x2: f64) {
        self.regions.retain(|r| !r.text.is_empty() && !r.overlaps(x1, x2));
    }

    pub fn remove(&mut self, i: usize) -> Option<IntegralRegion> {
        (i < self.regions.len()).then(|| self.regions.remove(i))
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.pending = None;
    }

    /// Bulk-add final regions from a list such as `"2-3, 4.5-5, -1--0.5"`.
    ///
    /// Each pair reads `x2-x1`; a minus sign that starts a number is kept.
    /// Malformed pairs are skipped.
    pub fn add_marks(&mut self, marks: &str) {
        let escaped = format!(" {}", marks)
            .replace(',', " ")
            .replace(" -", " #")
            .replace("--", "-#")
            .replace('-', "^")
            .replace('#', "-");
        self.pending = None;
        for token in escaped.split_whitespace().rev() {
            let Some((a, b)) = token.split_once('^') else {
                continue;
            };
            match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                (Ok(x2), Ok(x1)) => self.add_integral_region(x1, x2, true),
                _ => log::warn!("Skipping malformed integral mark '{}'", token),
            }
        }
    }

    /// Move the curve to a new offset and range (both percent of full scale).
    pub fn update(&mut self, offset_percent: f64, range_percent: f64) {
        if range_percent <= 0.0 || (range_percent == self.range && offset_percent == self.percent_offset) {
            return;
        }
        let int_range_new = if self.integral_total != 0.0 {
            range_percent / 100.0 / self.integral_total
        } else {
            0.0
        };
        let offset_new = offset_percent / 100.0;
        for c in self.curve.iter_mut() {
            let unit = if self.int_range != 0.0 {
                (c.y - self.offset) / self.int_range
            } else {
                0.0
            };
            c.y = unit * int_range_new + offset_new;
        }
        if self.normalization_factor != 1.0 {
            self.normalization_factor *= self.range / range_percent;
        }
        self.percent_offset = offset_percent;
        self.range = range_percent;
        self.int_range = int_range_new;
        self.offset = offset_new;
        self.recompute_regions();
    }

    fn recompute_regions(&mut self) {
        let mut regions = std::mem::take(&mut self.regions);
        for r in regions.iter_mut() {
            *r = self.region(r.x1, r.x2);
        }
        self.regions = regions;
    }

    /// Multiply the normalization and every region's value by `f`.
    pub fn scale_integration_by(&mut self, f: f64) {
        self.normalization_factor *= f;
        for r in self.regions.iter_mut() {
            r.set_value(r.value * f);
        }
        if let Some(p) = self.pending.as_mut() {
            p.set_value(p.value * f);
        }
    }

    /// Rescale so region `i` reads `value`.
    pub fn set_selected_integral(&mut self, i: usize, value: f64) {
        let Some(current) = self.regions.get(i).map(|r| r.value) else {
            return;
        };
        if current == 0.0 || !value.is_finite() {
            return;
        }
        self.scale_integration_by(value / current);
    }

    /// Samples that fall inside a region; every sample when there is none.
    pub fn bit_set(&self) -> Vec<bool> {
        let n = self.curve.len();
        if self.regions.is_empty() {
            return vec![true; n];
        }
        let mut bits = vec![false; n];
        for r in &self.regions {
            let a = coordinate::nearest_index_for_x(&self.curve, r.x1);
            let b = coordinate::nearest_index_for_x(&self.curve, r.x2);
            for bit in bits.iter_mut().take(a.max(b).min(n)).skip(a.min(b)) {
                *bit = true;
            }
        }
        bits
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        coordinate::shift_x(&mut self.curve, dx);
        for r in self.regions.iter_mut() {
            r.x1 += dx;
            r.x2 += dx;
        }
    }

    /// Rows of (number, start, end, value).
    pub fn to_table(&self) -> Vec<[String; 4]> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| {
                [
                    (i + 1).to_string(),
                    format!("{:.2}", r.x1),
                    format!("{:.2}", r.x2),
                    r.text.clone(),
                ]
            })
            .collect()
    }
}
