pub mod coordinate;
pub mod spectrum;

pub use coordinate::Coordinate;
pub use spectrum::{AxisParams, Dimensionality, Nucleus, Spectrum, Subspectrum};
