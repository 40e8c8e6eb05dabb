/// Peak picking
///
/// One pass over a three-sample window. A sample is a peak when it rises
/// above the threshold and above both neighbours (falls below all three for
/// inverted spectra). Only peaks inside the visible X range are kept, and
/// the scan stops at the configured cap.
use serde::{Deserialize, Serialize};

use crate::config::PeakConfig;
use crate::data::coordinate::{self, format_decimal};
use crate::data::Spectrum;
use crate::view::scale::ScaleData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Sample index of the extremum
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeakData {
    pub peaks: Vec<Peak>,
    pub threshold: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub interpolated: bool,
}

impl PeakData {
    /// Pick peaks of `spec` within the visible range of `scale`.
    pub fn compute(spec: &Spectrum, scale: &ScaleData, config: &PeakConfig) -> Self {
        let min_y = scale.min_y_on_scale;
        let max_y = scale.max_y_on_scale;
        let threshold = config
            .threshold
            .unwrap_or((min_y + max_y) / 2.0);
        let mut data = Self {
            peaks: Vec::new(),
            threshold,
            min_y,
            max_y,
            interpolated: config.interpolate,
        };
        let coords = &spec.coords;
        if coords.len() < 3 || config.max_peaks == 0 {
            return data;
        }
        let min_x = scale.min_x_on_scale;
        let max_x = scale.max_x_on_scale;

        for i in 2..coords.len() {
            let (y0, y1, y2) = (coords[i - 2].y, coords[i - 1].y, coords[i].y);
            let is_peak = if spec.inverted {
                y1 < threshold && y0 > y1 && y1 < y2
            } else {
                y1 > threshold && y0 < y1 && y1 > y2
            };
            if !is_peak {
                continue;
            }
            let x = if config.interpolate {
                coordinate::parabolic_interpolation(coords, i - 1)
            } else {
                coords[i - 1].x
            };
            if x >= min_x && x <= max_x {
                data.peaks.push(Peak { index: i - 1, x, y: y1 });
                if data.peaks.len() == config.max_peaks {
                    break;
                }
            }
        }
        log::debug!(
            "Picked {} peaks in '{}' above {}",
            data.peaks.len(),
            spec.title,
            threshold
        );
        data
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Peak> {
        self.peaks.get(i)
    }

    /// Peak to move to from `x`.
    ///
    /// The nearest peak strictly beyond `x` in the direction of `step`
    /// (positive is toward larger x); failing that, the farthest peak on the
    /// other side, so navigation wraps around.
    pub fn next_peak(&self, x: f64, step: i32) -> Option<usize> {
        if self.peaks.is_empty() || step == 0 {
            return None;
        }
        let dir = step.signum() as f64;
        let x0 = x + dir * 1e-6;
        let mut ahead: Option<(usize, f64)> = None;
        let mut behind: Option<(usize, f64)> = None;
        for (i, p) in self.peaks.iter().enumerate() {
            let d = (p.x - x0) * dir;
            if d > 0.0 {
                if ahead.map_or(true, |(_, best)| d < best) {
                    ahead = Some((i, d));
                }
            } else if d < 0.0 && behind.map_or(true, |(_, best)| d < best) {
                behind = Some((i, d));
            }
        }
        ahead.or(behind).map(|(i, _)| i)
    }

    /// Index of the peak closest to `x`.
    pub fn nearest(&self, x: f64) -> Option<usize> {
        self.peaks
            .iter()
            .enumerate()
            .min_by(|a, b| {
                (a.1.x - x)
                    .abs()
                    .partial_cmp(&(b.1.x - x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Rows of (number, x, y) for a peak listing.
    pub fn to_table(&self) -> Vec<[String; 3]> {
        self.peaks
            .iter()
            .enumerate()
            .map(|(i, p)| {
                [
                    (i + 1).to_string(),
                    format_decimal(p.x, 4),
                    format_decimal(p.y, 4),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Coordinate;

    fn spectrum(ys: &[f64]) -> Spectrum {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        Spectrum::new("t", Coordinate::from_xy(&xs, ys))
    }

    fn scale_for(spec: &Spectrum) -> ScaleData {
        ScaleData::from_coords(&spec.coords, 0, spec.coords.len() - 1, 14, 10, true)
    }

    #[test]
    fn test_single_peak_scenario() {
        let spec = spectrum(&[0.0, 5.0, 0.0, -5.0, 0.0]);
        let config = PeakConfig {
            threshold: Some(2.0),
            ..Default::default()
        };
        let data = PeakData::compute(&spec, &scale_for(&spec), &config);
        assert_eq!(data.len(), 1);
        let p = data.peaks[0];
        assert!(p.x > 0.0 && p.x < 2.0);
        assert!(p.y >= 0.0 && p.y <= 5.0);
        assert_eq!(p.index, 1);
    }

    #[test]
    fn test_inverted_picks_minima() {
        let mut spec = spectrum(&[0.0, 5.0, 0.0, -5.0, 0.0]);
        spec.inverted = true;
        let config = PeakConfig {
            threshold: Some(-2.0),
            ..Default::default()
        };
        let data = PeakData::compute(&spec, &scale_for(&spec), &config);
        assert_eq!(data.len(), 1);
        assert_eq!(data.peaks[0].index, 3);
    }

    #[test]
    fn test_default_threshold_is_mid_scale() {
        let spec = spectrum(&[0.0, 10.0, 0.0, 3.0, 0.0]);
        let scale = scale_for(&spec);
        let data = PeakData::compute(&spec, &scale, &PeakConfig::default());
        assert_eq!(data.threshold, (scale.min_y_on_scale + scale.max_y_on_scale) / 2.0);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_cap_and_range() {
        let ys: Vec<f64> = (0..1000).map(|i| if i % 2 == 1 { 10.0 } else { 0.0 }).collect();
        let spec = spectrum(&ys);
        let config = PeakConfig {
            threshold: Some(1.0),
            ..Default::default()
        };
        let full = PeakData::compute(&spec, &scale_for(&spec), &config);
        assert_eq!(full.len(), 100);

        let mut scale = scale_for(&spec);
        scale.set_x_range(100.0, 140.0);
        let zoomed = PeakData::compute(&spec, &scale, &config);
        assert!(zoomed.len() <= 100);
        assert!(!zoomed.is_empty());
        for p in &zoomed.peaks {
            assert!(p.x >= scale.min_x_on_scale && p.x <= scale.max_x_on_scale);
        }
    }

    #[test]
    fn test_next_peak_wraps() {
        let data = PeakData {
            peaks: [1.0, 4.0, 7.0]
                .iter()
                .enumerate()
                .map(|(i, &x)| Peak { index: i, x, y: 1.0 })
                .collect(),
            ..Default::default()
        };
        assert_eq!(data.next_peak(4.0, 1), Some(2));
        assert_eq!(data.next_peak(4.0, -1), Some(0));
        assert_eq!(data.next_peak(7.0, 1), Some(0));
        assert_eq!(data.next_peak(1.0, -1), Some(2));
        assert_eq!(data.nearest(3.2), Some(1));
        assert_eq!(data.to_table()[2][1], "7");
    }
}
