/// Two-point measurements drawn on a spectrum
use serde::{Deserialize, Serialize};

use crate::data::Spectrum;

/// Produces the label of a measurement from its spectrum's unit conventions.
pub trait MeasurementFormatter {
    fn format(&self, spec: &Spectrum, m: &Measurement) -> String;
}

/// Hz for NMR with a known observe frequency, ppm for other NMR data, and
/// the X units otherwise. Zero-length spans get no label.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl MeasurementFormatter for DefaultFormatter {
    fn format(&self, spec: &Spectrum, m: &Measurement) -> String {
        if m.value == 0.0 || !m.value.is_finite() {
            return String::new();
        }
        if spec.is_nmr() {
            if spec.observe_freq_mhz > 0.0 {
                format!("{:.1} Hz", m.value * spec.observe_freq_mhz)
            } else {
                format!("{:.4} ppm", m.value)
            }
        } else if spec.x_units.is_empty() {
            format!("{:.2}", m.value)
        } else {
            format!("{:.2} {}", m.value, spec.x_units)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Arena index of the spectrum this was drawn on
    pub spectrum: usize,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub value: f64,
    pub text: String,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Measurement {
    /// A measurement anchored at one point; both ends start there.
    pub fn new(spectrum: usize, x: f64, y: f64) -> Self {
        Self {
            spectrum,
            x1: x,
            y1: y,
            x2: x,
            y2: y,
            value: 0.0,
            text: String::new(),
            offset_x: 0,
            offset_y: 6,
        }
    }

    /// Move the second end and relabel.
    pub fn set_pt2(&mut self, x: f64, y: f64, spec: &Spectrum, formatter: &dyn MeasurementFormatter) {
        self.x2 = x;
        self.y2 = y;
        self.value = (self.x2 - self.x1).abs();
        self.text = formatter.format(spec, self);
    }

    pub fn overlaps(&self, x1: f64, x2: f64) -> bool {
        self.x1.min(self.x2) < x1.max(x2) && self.x1.max(self.x2) > x1.min(x2)
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        self.x1 += dx;
        self.x2 += dx;
    }
}

/// Stored measurements of one spectrum
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementData {
    pub measurements: Vec<Measurement>,
}

impl MeasurementData {
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn push(&mut self, m: Measurement) {
        self.measurements.push(m);
    }

    pub fn remove(&mut self, i: usize) -> Option<Measurement> {
        (i < self.measurements.len()).then(|| self.measurements.remove(i))
    }

    /// Drop measurements overlapping `[x1, x2]` and any without a label.
    pub fn clear_range(&mut self, x1: f64, x2: f64) {
        self.measurements
            .retain(|m| !m.text.is_empty() && !m.overlaps(x1, x2));
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        for m in self.measurements.iter_mut() {
            m.add_spec_shift(dx);
        }
    }

    /// Rows of (number, x1, x2, span); NMR spans convert to Hz when `in_hz`.
    pub fn to_table(&self, spec: &Spectrum, in_hz: bool) -> Vec<[String; 4]> {
        let x_decimals = if spec.is_nmr() { 4 } else { 2 };
        let to_hz = in_hz && spec.is_nmr() && spec.observe_freq_mhz > 0.0;
        let dx_decimals = if spec.is_hnmr() && !to_hz { 4 } else { 2 };
        self.measurements
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let v = if to_hz { m.value * spec.observe_freq_mhz } else { m.value };
                [
                    (i + 1).to_string(),
                    format!("{:.*}", x_decimals, m.x1),
                    format!("{:.*}", x_decimals, m.x2),
                    format!("{:.*}", dx_decimals, v),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinate, Nucleus};

    fn proton() -> Spectrum {
        Spectrum::nmr("1H", Nucleus::H1, 400.0, vec![Coordinate::new(0.0, 0.0)])
    }

    #[test]
    fn test_set_pt2_value_and_hz_label() {
        let spec = proton();
        let mut m = Measurement::new(0, 2.0, 1.0);
        m.set_pt2(1.5, 1.0, &spec, &DefaultFormatter);
        assert_eq!(m.value, 0.5);
        assert_eq!(m.text, "200.0 Hz");
        assert_eq!(m.offset_y, 6);
    }

    #[test]
    fn test_labels_by_spectrum_kind() {
        let mut spec = proton();
        spec.observe_freq_mhz = 0.0;
        let mut m = Measurement::new(0, 1.0, 0.0);
        m.set_pt2(1.25, 0.0, &spec, &DefaultFormatter);
        assert_eq!(m.text, "0.2500 ppm");

        let mut ir = Spectrum::new("ir", vec![Coordinate::new(0.0, 0.0)]);
        ir.x_units = "1/CM".into();
        m.set_pt2(3.0, 0.0, &ir, &DefaultFormatter);
        assert_eq!(m.text, "2.00 1/CM");

        m.set_pt2(1.0, 0.0, &ir, &DefaultFormatter);
        assert!(m.text.is_empty());
    }

    struct Upper;
    impl MeasurementFormatter for Upper {
        fn format(&self, _spec: &Spectrum, m: &Measurement) -> String {
            format!("D={}", m.value)
        }
    }

    #[test]
    fn test_custom_formatter() {
        let mut m = Measurement::new(0, 0.0, 0.0);
        m.set_pt2(3.0, 0.0, &proton(), &Upper);
        assert_eq!(m.text, "D=3");
    }

    #[test]
    fn test_table_and_clear_range() {
        let spec = proton();
        let mut data = MeasurementData::default();
        for (a, b) in [(1.0, 1.1), (3.0, 3.5)] {
            let mut m = Measurement::new(0, a, 0.0);
            m.set_pt2(b, 0.0, &spec, &DefaultFormatter);
            data.push(m);
        }
        let rows = data.to_table(&spec, true);
        assert_eq!(rows[1][3], "200.00");
        assert_eq!(data.to_table(&spec, false)[1][3], "0.5000");

        data.clear_range(3.2, 4.0);
        assert_eq!(data.len(), 1);
        data.add_spec_shift(1.0);
        assert_eq!(data.measurements[0].x1, 2.0);
    }
}
