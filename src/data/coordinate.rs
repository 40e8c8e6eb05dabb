/// (x, y) samples and the array helpers the view engine runs on
///
/// Arrays are expected to be monotonic in x, either increasing or decreasing.
/// Every helper clamps its index arguments instead of panicking.
use serde::{Deserialize, Serialize};

/// Maximum number of fractional digits used when formatting coordinates.
pub const MAX_FRACTION_DIGITS: usize = 8;

/// A single spectral sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x_string(&self) -> String {
        format_decimal(self.x, MAX_FRACTION_DIGITS)
    }

    pub fn y_string(&self) -> String {
        format_decimal(self.y, MAX_FRACTION_DIGITS)
    }

    /// Build coordinates from parallel x and y slices (extra values are ignored).
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Vec<Coordinate> {
        xs.iter()
            .zip(ys.iter())
            .map(|(&x, &y)| Coordinate::new(x, y))
            .collect()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x_string(), self.y_string())
    }
}

/// Locale-independent decimal formatting: fixed `max_digits` fractional digits
/// with trailing zeros (and a dangling point) removed.
pub fn format_decimal(value: f64, max_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let s = format!("{:.*}", max_digits, value);
    let trimmed = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Clamp `value` into `[low, high]`; `high` wins if the bounds cross.
pub fn into_range(value: i32, low: i32, high: i32) -> i32 {
    value.max(low).min(high)
}

pub fn is_increasing(coords: &[Coordinate]) -> bool {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) => first.x <= last.x,
        _ => true,
    }
}

/// The inclusive window `[start, end]`, clamped to the array.
pub fn window(coords: &[Coordinate], start: usize, end: usize) -> &[Coordinate] {
    if coords.is_empty() {
        return &[];
    }
    let end = end.min(coords.len() - 1);
    if start > end {
        return &[];
    }
    &coords[start..=end]
}

pub fn min_x(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    window(coords, start, end)
        .iter()
        .fold(f64::INFINITY, |m, c| m.min(c.x))
}

pub fn max_x(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    window(coords, start, end)
        .iter()
        .fold(f64::NEG_INFINITY, |m, c| m.max(c.x))
}

pub fn min_y(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    window(coords, start, end)
        .iter()
        .fold(f64::INFINITY, |m, c| m.min(c.y))
}

pub fn max_y(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    window(coords, start, end)
        .iter()
        .fold(f64::NEG_INFINITY, |m, c| m.max(c.y))
}

/// Index of the first sample at or beyond `x` in the array's own x order,
/// clamped to the last index.
pub fn nearest_index_for_x(coords: &[Coordinate], x: f64) -> usize {
    if coords.is_empty() {
        return 0;
    }
    let i = if is_increasing(coords) {
        coords.partition_point(|c| c.x < x)
    } else {
        coords.partition_point(|c| c.x > x)
    };
    i.min(coords.len() - 1)
}

/// Linearly interpolated y at `x`; NaN when `x` lies outside the array.
pub fn y_value_at(coords: &[Coordinate], x: f64) -> f64 {
    let n = coords.len();
    if n == 0 || x.is_nan() {
        return f64::NAN;
    }
    let i = if is_increasing(coords) {
        coords.partition_point(|c| c.x < x)
    } else {
        coords.partition_point(|c| c.x > x)
    };
    if i >= n {
        return f64::NAN;
    }
    if coords[i].x == x {
        return coords[i].y;
    }
    if i == 0 {
        return f64::NAN;
    }
    let (c0, c1) = (coords[i - 1], coords[i]);
    if c1.x == c0.x {
        return c1.y;
    }
    c0.y + (c1.y - c0.y) / (c1.x - c0.x) * (x - c0.x)
}

/// Vertex x of the parabola through samples `i - 1`, `i`, `i + 1`.
///
/// Falls back to the raw sample x at the array ends or when the three samples
/// are collinear.
pub fn parabolic_interpolation(coords: &[Coordinate], i: usize) -> f64 {
    if i == 0 || i + 1 >= coords.len() {
        return coords.get(i).map_or(f64::NAN, |c| c.x);
    }
    let alpha = coords[i - 1].y;
    let beta = coords[i].y;
    let gamma = coords[i + 1].y;
    let denom = alpha - 2.0 * beta + gamma;
    if denom == 0.0 {
        return coords[i].x;
    }
    let p = 0.5 * (alpha - gamma) / denom;
    coords[i].x + p * (coords[i + 1].x - coords[i].x)
}

/// Climb from the sample nearest `x` toward the higher neighbour (lower for
/// inverted spectra) and return the x of the extremum reached.
pub fn find_x_for_peak_nearest(coords: &[Coordinate], x: f64, inverted: bool) -> f64 {
    let n = coords.len();
    if n == 0 {
        return f64::NAN;
    }
    let sign = if inverted { -1.0 } else { 1.0 };
    let y = |k: usize| sign * coords[k].y;
    let mut i = nearest_index_for_x(coords, x);
    let left_higher = i > 0 && y(i - 1) > y(i);
    let right_higher = i + 1 < n && y(i + 1) > y(i);
    if right_higher && (!left_higher || y(i + 1) >= y(i - 1)) {
        while i + 1 < n && y(i + 1) > y(i) {
            i += 1;
        }
    } else if left_higher {
        while i > 0 && y(i - 1) > y(i) {
            i -= 1;
        }
    }
    coords[i].x
}

/// Walk from `x` toward larger x (`to_right`) or smaller x until a sample
/// reaches `y` (falls below it for inverted spectra), then snap to that peak.
pub fn nearest_x_with_y_above(
    coords: &[Coordinate],
    x: f64,
    y: f64,
    inverted: bool,
    to_right: bool,
) -> Option<f64> {
    let n = coords.len();
    if n == 0 {
        return None;
    }
    let sign = if inverted { -1.0 } else { 1.0 };
    let threshold = sign * y;
    let forward = to_right == is_increasing(coords);
    let mut i = nearest_index_for_x(coords, x) as isize;
    while i >= 0 && (i as usize) < n {
        let c = coords[i as usize];
        if sign * c.y >= threshold {
            return Some(find_x_for_peak_nearest(coords, c.x, inverted));
        }
        i += if forward { 1 } else { -1 };
    }
    None
}

pub fn shift_x(coords: &mut [Coordinate], dx: f64) {
    for c in coords.iter_mut() {
        c.x += dx;
    }
}

pub fn reverse(coords: &mut [Coordinate]) {
    coords.reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> Vec<Coordinate> {
        (0..n).map(|i| Coordinate::new(i as f64, (i * i) as f64)).collect()
    }

    #[test]
    fn test_nearest_index_brackets_target() {
        let coords = ramp(10);
        for target in [0.0, 0.5, 3.2, 7.0, 8.99] {
            let i = nearest_index_for_x(&coords, target);
            assert!(coords[i].x >= target);
            if i > 0 {
                assert!(coords[i - 1].x <= target);
            }
        }
        assert_eq!(nearest_index_for_x(&coords, -5.0), 0);
        assert_eq!(nearest_index_for_x(&coords, 50.0), 9);
    }

    #[test]
    fn test_nearest_index_on_decreasing_array() {
        let mut coords = ramp(10);
        reverse(&mut coords);
        let i = nearest_index_for_x(&coords, 6.5);
        assert_eq!(coords[i].x, 6.0);
    }

    #[test]
    fn test_y_value_interpolates_and_rejects_outside() {
        let coords = vec![Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 4.0)];
        assert_relative_eq!(y_value_at(&coords, 1.0), 2.0);
        assert_relative_eq!(y_value_at(&coords, 0.0), 0.0);
        assert!(y_value_at(&coords, -0.1).is_nan());
        assert!(y_value_at(&coords, 2.1).is_nan());
    }

    #[test]
    fn test_parabolic_vertex_symmetric_peak() {
        let coords = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 5.0),
            Coordinate::new(2.0, 0.0),
        ];
        assert_relative_eq!(parabolic_interpolation(&coords, 1), 1.0);
    }

    #[test]
    fn test_parabolic_vertex_leans_toward_larger_neighbour() {
        let coords = vec![
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 5.0),
            Coordinate::new(2.0, 3.0),
        ];
        let x = parabolic_interpolation(&coords, 1);
        assert!(x > 1.0 && x < 1.5);
    }

    #[test]
    fn test_find_peak_nearest_climbs() {
        let coords: Vec<Coordinate> = (0..11)
            .map(|i| {
                let x = i as f64;
                Coordinate::new(x, -(x - 7.0).powi(2))
            })
            .collect();
        assert_eq!(find_x_for_peak_nearest(&coords, 3.0, false), 7.0);
        assert_eq!(find_x_for_peak_nearest(&coords, 10.0, false), 7.0);
    }

    #[test]
    fn test_nearest_x_with_y_above_both_directions() {
        let ys = [0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0, 0.0];
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        let coords = Coordinate::from_xy(&xs, &ys);
        assert_eq!(nearest_x_with_y_above(&coords, 4.0, 2.0, false, true), Some(6.0));
        assert_eq!(nearest_x_with_y_above(&coords, 4.0, 2.0, false, false), Some(2.0));
        assert_eq!(nearest_x_with_y_above(&coords, 4.0, 9.0, false, true), None);
    }

    #[test]
    fn test_min_max_clamp_window() {
        let coords = ramp(5);
        assert_eq!(min_x(&coords, 1, 100), 1.0);
        assert_eq!(max_y(&coords, 0, 2), 4.0);
        assert!(min_y(&coords, 4, 2).is_infinite());
    }

    #[test]
    fn test_format_decimal_strips_zeros() {
        assert_eq!(format_decimal(1.5, 8), "1.5");
        assert_eq!(format_decimal(2.0, 8), "2");
        assert_eq!(format_decimal(-0.000000001, 8), "0");
        assert_eq!(format_decimal(0.123456789, 8), "0.12345679");
        assert_eq!(Coordinate::new(1.25, -3.0).to_string(), "[1.25, -3]");
    }

    #[test]
    fn test_into_range() {
        assert_eq!(into_range(-4, 0, 10), 0);
        assert_eq!(into_range(14, 0, 10), 10);
        assert_eq!(into_range(5, 0, 10), 5);
    }

    #[test]
    fn test_shift_x() {
        let mut coords = ramp(3);
        shift_x(&mut coords, 0.5);
        assert_eq!(coords[2].x, 2.5);
    }
}
