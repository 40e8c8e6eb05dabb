use serde::{Deserialize, Serialize};

use super::coordinate::{self, Coordinate};

/// Nucleus type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Nucleus {
    H1,
    C13,
    N15,
    F19,
    P31,
    Other(String),
}

impl std::fmt::Display for Nucleus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nucleus::H1 => write!(f, "1H"),
            Nucleus::C13 => write!(f, "13C"),
            Nucleus::N15 => write!(f, "15N"),
            Nucleus::F19 => write!(f, "19F"),
            Nucleus::P31 => write!(f, "31P"),
            Nucleus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Experiment dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimensionality {
    OneD,
    TwoD,
}

/// Axis parameters for a spectral dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisParams {
    pub nucleus: Nucleus,
    pub num_points: usize,
    pub spectral_width_hz: f64,
    pub observe_freq_mhz: f64,
    pub reference_ppm: f64,
    pub label: String,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            nucleus: Nucleus::H1,
            num_points: 0,
            spectral_width_hz: 0.0,
            observe_freq_mhz: 400.0,
            reference_ppm: 0.0,
            label: String::new(),
        }
    }
}

impl AxisParams {
    /// Convert a point index to ppm
    pub fn index_to_ppm(&self, index: usize) -> f64 {
        if self.num_points == 0 || self.observe_freq_mhz == 0.0 {
            return 0.0;
        }
        let sw_ppm = self.spectral_width_hz / self.observe_freq_mhz;
        let frac = index as f64 / self.num_points as f64;
        // Point 0 sits at reference_ppm and the axis runs downfield to upfield.
        self.reference_ppm - frac * sw_ppm
    }

    /// Generate a ppm scale array
    pub fn ppm_scale(&self) -> Vec<f64> {
        (0..self.num_points)
            .map(|i| self.index_to_ppm(i))
            .collect()
    }
}

/// One row of a 2D spectrum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subspectrum {
    /// Indirect-dimension value of this row
    pub y2d: f64,
    pub coords: Vec<Coordinate>,
}

/// A loaded spectrum as handed over by the I/O layer.
///
/// The view engine never mutates the samples; zooming and scaling only move
/// index windows and multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    pub title: String,
    pub coords: Vec<Coordinate>,
    pub x_units: String,
    pub y_units: String,
    pub dimensionality: Dimensionality,
    /// `None` for non-NMR data (IR, UV, MS)
    pub nucleus: Option<Nucleus>,
    pub observe_freq_mhz: f64,
    /// Peaks point down (transmittance-like data)
    pub inverted: bool,
    /// Continuous trace rather than a stick spectrum
    pub continuous: bool,
    pub stackable: bool,
    pub user_y_factor: f64,
    /// Y value that stays fixed when the spectrum is scaled (0 or 100)
    pub y_ref: f64,
    pub subspectra: Vec<Subspectrum>,
}

impl Default for Spectrum {
    fn default() -> Self {
        Self {
            title: String::new(),
            coords: Vec::new(),
            x_units: String::new(),
            y_units: String::new(),
            dimensionality: Dimensionality::OneD,
            nucleus: None,
            observe_freq_mhz: 0.0,
            inverted: false,
            continuous: true,
            stackable: true,
            user_y_factor: 1.0,
            y_ref: 0.0,
            subspectra: Vec::new(),
        }
    }
}

impl Spectrum {
    pub fn new(title: &str, coords: Vec<Coordinate>) -> Self {
        Self {
            title: title.to_string(),
            coords,
            ..Default::default()
        }
    }

    /// A 1D NMR spectrum on a ppm axis
    pub fn nmr(title: &str, nucleus: Nucleus, observe_freq_mhz: f64, coords: Vec<Coordinate>) -> Self {
        Self {
            title: title.to_string(),
            coords,
            x_units: "ppm".to_string(),
            y_units: "arbitrary units".to_string(),
            nucleus: Some(nucleus),
            observe_freq_mhz,
            ..Default::default()
        }
    }

    /// A 1D NMR spectrum whose x axis is generated from acquisition parameters
    pub fn from_axis(title: &str, axis: &AxisParams, intensities: &[f64]) -> Self {
        let ppm = axis.ppm_scale();
        Self::nmr(
            title,
            axis.nucleus.clone(),
            axis.observe_freq_mhz,
            Coordinate::from_xy(&ppm, intensities),
        )
    }

    /// A 2D NMR spectrum; the first row doubles as the 1D trace
    pub fn two_d(title: &str, nucleus: Nucleus, observe_freq_mhz: f64, rows: Vec<Subspectrum>) -> Self {
        let coords = rows.first().map(|r| r.coords.clone()).unwrap_or_default();
        Self {
            dimensionality: Dimensionality::TwoD,
            subspectra: rows,
            ..Self::nmr(title, nucleus, observe_freq_mhz, coords)
        }
    }

    pub fn is_nmr(&self) -> bool {
        self.nucleus.is_some()
    }

    pub fn is_hnmr(&self) -> bool {
        self.nucleus == Some(Nucleus::H1)
    }

    pub fn is_1d(&self) -> bool {
        self.dimensionality == Dimensionality::OneD
    }

    pub fn is_increasing(&self) -> bool {
        coordinate::is_increasing(&self.coords)
    }

    /// NMR (ppm) and IR (wavenumber) are conventionally drawn high-to-low.
    pub fn should_display_x_axis_increasing(&self) -> bool {
        if self.is_nmr() {
            return false;
        }
        let units = self.x_units.to_lowercase();
        !(units.contains("1/cm") || units.contains("cm-1") || units.contains("wavenumber"))
    }

    /// Two spectra may share a graph set (one X axis and one zoom history).
    pub fn is_scale_compatible(&self, other: &Spectrum) -> bool {
        self.x_units.eq_ignore_ascii_case(&other.x_units)
            && self.is_1d() == other.is_1d()
            && self.is_hnmr() == other.is_hnmr()
    }

    /// X zooms of two graph sets may be linked.
    pub fn is_linkable_x(&self, other: &Spectrum) -> bool {
        match (&self.nucleus, &other.nucleus) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn subspectrum_count(&self) -> usize {
        self.subspectra.len()
    }

    /// Samples of row `sub_index` for 2D data, the 1D trace otherwise.
    pub fn xy_coords(&self, sub_index: usize) -> &[Coordinate] {
        if self.is_1d() || self.subspectra.is_empty() {
            return &self.coords;
        }
        let i = sub_index.min(self.subspectra.len() - 1);
        &self.subspectra[i].coords
    }

    pub fn y_value_at(&self, x: f64) -> f64 {
        coordinate::y_value_at(&self.coords, x)
    }

    pub fn find_x_for_peak_nearest(&self, x: f64) -> f64 {
        coordinate::find_x_for_peak_nearest(&self.coords, x, self.inverted)
    }

    /// Axis label for the X (`true`) or Y axis
    pub fn axis_label(&self, is_x: bool) -> Option<&str> {
        let units = if is_x { &self.x_units } else { &self.y_units };
        if units.is_empty() {
            None
        } else {
            Some(units.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(n: usize) -> Vec<Coordinate> {
        (0..n).map(|i| Coordinate::new(i as f64, 1.0)).collect()
    }

    #[test]
    fn test_index_to_ppm_runs_downfield_to_upfield() {
        let axis = AxisParams {
            num_points: 100,
            spectral_width_hz: 4000.0,
            observe_freq_mhz: 400.0,
            reference_ppm: 12.0,
            ..Default::default()
        };
        assert_eq!(axis.index_to_ppm(0), 12.0);
        assert!((axis.index_to_ppm(50) - 7.0).abs() < 1e-12);
        assert_eq!(axis.ppm_scale().len(), 100);
    }

    #[test]
    fn test_scale_compatibility_rules() {
        let h1 = Spectrum::nmr("a", Nucleus::H1, 400.0, trace(4));
        let h1b = Spectrum::nmr("b", Nucleus::H1, 600.0, trace(4));
        let c13 = Spectrum::nmr("c", Nucleus::C13, 100.0, trace(4));
        let ir = Spectrum {
            x_units: "1/cm".into(),
            ..Spectrum::new("ir", trace(4))
        };
        assert!(h1.is_scale_compatible(&h1b));
        assert!(!h1.is_scale_compatible(&c13));
        assert!(!h1.is_scale_compatible(&ir));

        let mut upper = h1b.clone();
        upper.x_units = "PPM".into();
        assert!(h1.is_scale_compatible(&upper));

        // only the proton classification separates ppm traces
        let ppm = Spectrum {
            x_units: "ppm".into(),
            ..Spectrum::new("ppm", trace(4))
        };
        assert!(c13.is_scale_compatible(&ppm));
        assert!(!h1.is_scale_compatible(&ppm));

        let two_d = Spectrum::two_d(
            "hsqc",
            Nucleus::H1,
            400.0,
            vec![Subspectrum { y2d: 0.0, coords: trace(4) }],
        );
        assert!(!h1.is_scale_compatible(&two_d));
    }

    #[test]
    fn test_display_direction() {
        let h1 = Spectrum::nmr("a", Nucleus::H1, 400.0, trace(4));
        assert!(!h1.should_display_x_axis_increasing());
        let uv = Spectrum {
            x_units: "nm".into(),
            ..Spectrum::new("uv", trace(4))
        };
        assert!(uv.should_display_x_axis_increasing());
    }

    #[test]
    fn test_xy_coords_selects_row() {
        let rows = vec![
            Subspectrum { y2d: 1.0, coords: trace(3) },
            Subspectrum { y2d: 2.0, coords: trace(5) },
        ];
        let s = Spectrum::two_d("map", Nucleus::C13, 100.0, rows);
        assert_eq!(s.xy_coords(1).len(), 5);
        assert_eq!(s.xy_coords(9).len(), 5);
        assert_eq!(s.coords.len(), 3);
    }
}
