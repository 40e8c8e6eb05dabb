/// One entry of a graph set's zoom history
///
/// Holds one `ScaleData` per spectrum of the set. All entries share the X
/// range; Y ranges are shared only when every spectrum has the same Y units
/// and user Y factor.
use serde::{Deserialize, Serialize};

use super::scale::ScaleData;
use crate::data::coordinate;
use crate::data::Spectrum;

/// Which spectra a Y scaling request applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTarget {
    All,
    Spectrum(usize),
    /// Intensity range of a 2D image
    TwoD,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    pub scales: Vec<ScaleData>,
    pub min_y_2d: f64,
    pub max_y_2d: f64,
    pub spec_shift: f64,
    pub single_y_scale: bool,
}

/// Y range of `[start, end]` after the spectrum's user factor is applied.
///
/// A 2D spectrum takes the range over all of its rows.
fn user_y_range(spec: &Spectrum, start: usize, end: usize) -> (f64, f64) {
    let (lo, hi) = if spec.is_1d() || spec.subspectra.is_empty() {
        (
            coordinate::min_y(&spec.coords, start, end),
            coordinate::max_y(&spec.coords, start, end),
        )
    } else {
        spec.subspectra.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
            (
                lo.min(coordinate::min_y(&row.coords, start, end)),
                hi.max(coordinate::max_y(&row.coords, start, end)),
            )
        })
    };
    let f = spec.user_y_factor;
    let r = spec.y_ref;
    let a = (lo - r) * f + r;
    let b = (hi - r) * f + r;
    (a.min(b), a.max(b))
}

impl ViewData {
    /// Build a view over the given windows (inclusive sample indices).
    ///
    /// `y_range` overrides the data Y range for every spectrum when its bounds
    /// differ.
    pub fn new(
        spectra: &[&Spectrum],
        windows: &[(usize, usize)],
        y_range: Option<(f64, f64)>,
        x_divisions: u32,
        y_divisions: u32,
    ) -> Self {
        let continuous = spectra.first().map_or(true, |s| s.continuous);
        let single_y_scale = spectra.iter().all(|s| {
            s.y_units == spectra[0].y_units && s.user_y_factor == spectra[0].user_y_factor
        });

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut y_ranges = Vec::with_capacity(spectra.len());
        for (spec, &(start, end)) in spectra.iter().zip(windows) {
            min_x = min_x.min(coordinate::min_x(&spec.coords, start, end));
            max_x = max_x.max(coordinate::max_x(&spec.coords, start, end));
            y_ranges.push(user_y_range(spec, start, end));
        }
        if !min_x.is_finite() || !max_x.is_finite() {
            min_x = 0.0;
            max_x = 1.0;
        }
        if single_y_scale {
            let lo = y_ranges.iter().fold(f64::INFINITY, |m, r| m.min(r.0));
            let hi = y_ranges.iter().fold(f64::NEG_INFINITY, |m, r| m.max(r.1));
            for r in y_ranges.iter_mut() {
                *r = (lo, hi);
            }
        }
        if let Some((y1, y2)) = y_range {
            if y1 != y2 {
                for r in y_ranges.iter_mut() {
                    *r = (y1.min(y2), y1.max(y2));
                }
            }
        }

        let scales = spectra
            .iter()
            .zip(windows)
            .zip(y_ranges)
            .map(|((spec, &(start, end)), (lo, hi))| {
                let lo = if lo.is_finite() { lo } else { 0.0 };
                let hi = if hi.is_finite() { hi } else { 1.0 };
                let mut s = ScaleData::from_range(
                    min_x,
                    max_x,
                    lo,
                    hi,
                    x_divisions,
                    y_divisions,
                    continuous,
                );
                s.set_window(start, end);
                s.spectrum_y_ref = spec.y_ref;
                s.user_y_factor = spec.user_y_factor;
                s
            })
            .collect();

        let mut view = Self {
            scales,
            min_y_2d: 0.0,
            max_y_2d: 0.0,
            spec_shift: 0.0,
            single_y_scale,
        };
        if let Some(spec) = spectra.first() {
            if !spec.is_1d() {
                view.set_min_max_y_2d(spec);
            }
        }
        view
    }

    /// Full-range view of every spectrum.
    pub fn full(spectra: &[&Spectrum], x_divisions: u32, y_divisions: u32) -> Self {
        let windows: Vec<(usize, usize)> = spectra
            .iter()
            .map(|s| (0, s.coords.len().saturating_sub(1)))
            .collect();
        Self::new(spectra, &windows, None, x_divisions, y_divisions)
    }

    /// Sample windows covering `[init_x, final_x]` in every spectrum.
    ///
    /// Each window starts at the first sample at or beyond `init_x` and ends
    /// just before the first sample at or beyond `final_x`. Returns `None`
    /// unless every spectrum keeps at least `min_points` samples.
    pub fn data_point_indices(
        spectra: &[&Spectrum],
        init_x: f64,
        final_x: f64,
        min_points: usize,
    ) -> Option<Vec<(usize, usize)>> {
        spectra
            .iter()
            .map(|spec| {
                let n = spec.coords.len();
                if n == 0 {
                    return None;
                }
                let increasing = spec.is_increasing();
                // scan in ascending x whatever the storage order
                let x_at = |k: usize| {
                    if increasing {
                        spec.coords[k].x
                    } else {
                        spec.coords[n - 1 - k].x
                    }
                };
                let mut k = 0;
                while k < n && x_at(k) < init_x {
                    k += 1;
                }
                if k == n {
                    return None;
                }
                let start = k;
                let mut count = 0;
                while k < n {
                    count += 1;
                    if x_at(k) >= final_x {
                        break;
                    }
                    k += 1;
                }
                let end = k.min(n).saturating_sub(1).max(start);
                if count < min_points {
                    return None;
                }
                Some(if increasing {
                    (start, end)
                } else {
                    (n - 1 - end, n - 1 - start)
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Scale of spectrum `i` (the first one when out of range).
    pub fn scale(&self, i: usize) -> &ScaleData {
        &self.scales[i.min(self.scales.len().saturating_sub(1))]
    }

    pub fn min_x(&self) -> f64 {
        self.scales.first().map_or(0.0, |s| s.min_x)
    }

    pub fn max_x(&self) -> f64 {
        self.scales.first().map_or(1.0, |s| s.max_x)
    }

    pub fn min_x_on_scale(&self) -> f64 {
        self.scales.first().map_or(0.0, |s| s.min_x_on_scale)
    }

    pub fn max_x_on_scale(&self) -> f64 {
        self.scales.first().map_or(1.0, |s| s.max_x_on_scale)
    }

    pub fn is_in_range_x(&self, x: f64) -> bool {
        self.scales.first().is_some_and(|s| s.is_in_range_x(x))
    }

    pub fn set_x_range(&mut self, x1: f64, x2: f64) {
        for s in self.scales.iter_mut() {
            s.set_x_range(x1, x2);
        }
    }

    pub fn set_min_max_y_2d(&mut self, spec: &Spectrum) {
        let (lo, hi) = spec
            .subspectra
            .iter()
            .fold((f64::MAX, -f64::MAX), |(lo, hi), row| {
                (lo.min(row.y2d), hi.max(row.y2d))
            });
        if lo <= hi {
            self.min_y_2d = lo;
            self.max_y_2d = hi;
        }
    }

    pub fn reset_scale_factors(&mut self) {
        for s in self.scales.iter_mut() {
            s.spectrum_scale_factor = 1.0;
        }
    }

    /// `None` resets every factor to 1.
    pub fn set_scale_factor(&mut self, i: Option<usize>, f: f64) {
        if f == 0.0 {
            return;
        }
        match i {
            None => self.reset_scale_factors(),
            Some(i) => {
                if let Some(s) = self.scales.get_mut(i) {
                    s.spectrum_scale_factor = f;
                }
            }
        }
    }

    pub fn scale_spectrum(&mut self, target: ScaleTarget, f: f64) {
        if f == 0.0 {
            return;
        }
        match target {
            ScaleTarget::All => {
                for s in self.scales.iter_mut() {
                    s.spectrum_scale_factor *= f;
                }
            }
            ScaleTarget::Spectrum(i) => {
                if let Some(s) = self.scales.get_mut(i) {
                    s.spectrum_scale_factor *= f;
                }
            }
            ScaleTarget::TwoD => {
                for s in self.scales.iter_mut() {
                    if f == 1.0 {
                        s.min_y = s.init_min_y;
                        s.max_y = s.init_max_y;
                    } else {
                        let dy = s.max_y - s.min_y;
                        s.max_y = s.min_y + dy / f;
                    }
                }
            }
        }
    }

    pub fn spectrum_scale_factor(&self, i: usize) -> f64 {
        self.scales.get(i).map_or(1.0, |s| s.spectrum_scale_factor)
    }

    /// Carry the per-spectrum scaling of `from` into this view.
    pub fn copy_scale_factors(&mut self, from: &ViewData) {
        for (s, f) in self.scales.iter_mut().zip(&from.scales) {
            s.spectrum_scale_factor = f.spectrum_scale_factor;
            s.user_y_factor = f.user_y_factor;
            s.spectrum_y_ref = f.spectrum_y_ref;
            s.init_min_y_on_scale = f.init_min_y_on_scale;
            s.init_max_y_on_scale = f.init_max_y_on_scale;
        }
    }

    /// Effective Y axis of spectrum `i` under its scale factor.
    ///
    /// An unscaled spectrum gets its own rounded range. A scaled one divides
    /// the initial on-scale range about its Y reference, clamped into that
    /// range.
    pub fn axis_scale(&self, i: usize) -> ScaleData {
        let mut a = self.scale(i).clone();
        let f = a.spectrum_scale_factor;
        if f == 1.0 {
            a.set_y_scale(a.min_y, a.max_y, true);
            return a;
        }
        let lo = a.init_min_y_on_scale;
        let hi = a.init_max_y_on_scale;
        let r = a.spectrum_y_ref.max(lo.min(hi)).min(hi.max(lo));
        a.set_y_scale((lo - r) / f + r, (hi - r) / f + r, false);
        a
    }

    pub fn un_scale_y(&self, i: usize, y: f64) -> f64 {
        y * self.spectrum_scale_factor(i)
    }

    pub fn are_y_scales_same(&self, i: usize, j: usize) -> bool {
        match (self.scales.get(i), self.scales.get(j)) {
            (Some(a), Some(b)) => {
                a.spectrum_scale_factor == b.spectrum_scale_factor
                    && a.spectrum_y_ref == b.spectrum_y_ref
                    && a.user_y_factor == b.user_y_factor
            }
            _ => false,
        }
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        self.spec_shift += dx;
        for s in self.scales.iter_mut() {
            s.add_spec_shift(dx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinate, Nucleus};
    use approx::assert_relative_eq;

    fn ramp(n: usize, scale: f64) -> Spectrum {
        let coords = (0..n)
            .map(|i| Coordinate::new(i as f64, scale * (i as f64).sin()))
            .collect();
        Spectrum::new("ramp", coords)
    }

    #[test]
    fn test_full_view_shares_x_range() {
        let a = ramp(20, 1.0);
        let mut b = ramp(10, 3.0);
        b.y_units = "other".into();
        let view = ViewData::full(&[&a, &b], 14, 10);
        assert_eq!(view.len(), 2);
        assert!(!view.single_y_scale);
        assert_eq!(view.scale(0).max_x, 19.0);
        assert_eq!(view.scale(1).max_x, 19.0);
        assert!(view.scale(1).max_y > view.scale(0).max_y);
    }

    #[test]
    fn test_single_y_scale_merges_ranges() {
        let a = ramp(20, 1.0);
        let b = ramp(20, 3.0);
        let view = ViewData::full(&[&a, &b], 14, 10);
        assert!(view.single_y_scale);
        assert_eq!(view.scale(0).max_y, view.scale(1).max_y);
    }

    #[test]
    fn test_indices_follow_scan() {
        let a = ramp(10, 1.0);
        let w = ViewData::data_point_indices(&[&a], 2.5, 6.0, 3);
        assert_eq!(w, Some(vec![(3, 5)]));
        assert_eq!(ViewData::data_point_indices(&[&a], 2.5, 3.5, 3), None);
        assert_eq!(ViewData::data_point_indices(&[&a], 20.0, 30.0, 1), None);
    }

    #[test]
    fn test_indices_on_descending_storage() {
        let coords = (0..10).rev().map(|i| Coordinate::new(i as f64, 0.0)).collect();
        let d = Spectrum::nmr("d", Nucleus::H1, 400.0, coords);
        let w = ViewData::data_point_indices(&[&d], 2.5, 6.0, 3).unwrap();
        // x = 9..0 stored; ascending window covers x 3, 4, 5
        assert_eq!(w, vec![(4, 6)]);
        assert_eq!(d.coords[4].x, 5.0);
        assert_eq!(d.coords[6].x, 3.0);
    }

    #[test]
    fn test_scale_factor_does_not_touch_ranges() {
        let a = ramp(20, 10.0);
        let mut view = ViewData::full(&[&a], 14, 10);
        let before = view.scale(0).clone();
        view.scale_spectrum(ScaleTarget::Spectrum(0), 2.0);
        assert_eq!(view.spectrum_scale_factor(0), 2.0);
        assert_eq!(view.scale(0).min_y, before.min_y);
        assert_eq!(view.scale(0).max_y_on_scale, before.max_y_on_scale);
        let axis = view.axis_scale(0);
        assert_relative_eq!(
            axis.max_y_on_scale - axis.min_y_on_scale,
            (before.max_y_on_scale - before.min_y_on_scale) / 2.0
        );
        assert_relative_eq!(view.un_scale_y(0, 3.0), 6.0);
        view.set_scale_factor(None, 1.0);
        assert_eq!(view.spectrum_scale_factor(0), 1.0);
    }

    #[test]
    fn test_two_d_scale_and_restore() {
        let a = ramp(20, 10.0);
        let mut view = ViewData::full(&[&a], 14, 10);
        let (lo, hi) = (view.scale(0).min_y, view.scale(0).max_y);
        view.scale_spectrum(ScaleTarget::TwoD, 2.0);
        assert_relative_eq!(view.scale(0).max_y, lo + (hi - lo) / 2.0);
        view.scale_spectrum(ScaleTarget::TwoD, 1.0);
        assert_eq!(view.scale(0).max_y, hi);
    }

    #[test]
    fn test_y_scales_same_and_copy() {
        let a = ramp(20, 1.0);
        let b = ramp(20, 1.0);
        let mut v1 = ViewData::full(&[&a, &b], 14, 10);
        assert!(v1.are_y_scales_same(0, 1));
        v1.scale_spectrum(ScaleTarget::Spectrum(1), 4.0);
        assert!(!v1.are_y_scales_same(0, 1));
        let mut v2 = ViewData::full(&[&a, &b], 14, 10);
        v2.copy_scale_factors(&v1);
        assert_eq!(v2.spectrum_scale_factor(1), 4.0);
    }

    #[test]
    fn test_spec_shift_moves_x() {
        let a = ramp(10, 1.0);
        let mut view = ViewData::full(&[&a], 14, 10);
        view.add_spec_shift(0.5);
        assert_eq!(view.min_x(), 0.5);
        assert_eq!(view.max_x_on_scale(), 9.5);
        assert_eq!(view.spec_shift, 0.5);
    }
}
