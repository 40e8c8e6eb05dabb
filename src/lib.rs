//! Spectral view engine
//!
//! Turns spectra (ordered x/y samples with unit metadata) into an interactive
//! plot model: axis scales with nice gridlines, a zoom history per graph set,
//! split and stacked layouts, peak picking, integration and two-point
//! measurements. Drawing goes through the [`view::Canvas`] trait in pixel
//! space, so any host can render it.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod session;
pub mod view;

pub use config::ViewConfig;
pub use data::{Coordinate, Nucleus, Spectrum, Subspectrum};
pub use error::{Result, ViewError};
pub use session::SessionLog;
pub use view::{Canvas, GraphSet, Key, PanelData};
