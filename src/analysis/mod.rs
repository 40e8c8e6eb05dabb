/// Per-spectrum analyses: peak picking, integration and measurements
pub mod integral;
pub mod measurement;
pub mod peaks;

pub use integral::{IntegralData, IntegralRegion, IntegrationDirection};
pub use measurement::{DefaultFormatter, Measurement, MeasurementData, MeasurementFormatter};
pub use peaks::{Peak, PeakData};
