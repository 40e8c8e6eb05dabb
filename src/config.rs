/// View configuration
///
/// Everything the engine would otherwise read from process-wide settings:
/// zoom limits, margins, display toggles, peak picking, integration and 2D
/// contrast parameters, and colors. Every section defaults field by field,
/// so a partial JSON file loads.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub enabled: bool,
    /// Fewest samples a zoom may leave in any spectrum
    pub min_points: usize,
    /// Smaller drags (in either axis) never commit a zoom
    pub min_drag_pixels: i32,
    pub pin_select_pixels: i32,
    pub x_divisions: u32,
    pub y_divisions: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_points: 3,
            min_drag_pixels: 5,
            pin_select_pixels: 5,
            x_divisions: 14,
            y_divisions: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Vertical offset between stacked spectra, percent of plot height
    pub stack_offset_percent: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left: 60,
            right: 50,
            top: 30,
            bottom: 50,
            stack_offset_percent: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub grid: bool,
    pub x_scale: bool,
    pub y_scale: bool,
    pub x_units: bool,
    pub y_units: bool,
    pub title: bool,
    pub reverse_plot: bool,
    pub link_x_zoom: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            grid: true,
            x_scale: true,
            y_scale: true,
            x_units: true,
            y_units: true,
            title: true,
            reverse_plot: false,
            link_x_zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Unset means the middle of the on-scale Y range
    pub threshold: Option<f64>,
    pub interpolate: bool,
    pub max_peaks: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            interpolate: true,
            max_peaks: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegralConfig {
    pub offset_percent: f64,
    pub range_percent: f64,
    /// Regions reading less than this are dropped
    pub min_value: f64,
    pub min_y_percent: f64,
}

impl Default for IntegralConfig {
    fn default() -> Self {
        Self {
            offset_percent: 30.0,
            range_percent: 50.0,
            min_value: 0.1,
            min_y_percent: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub min_gray: f64,
    pub max_gray: f64,
    pub max_adjust_iterations: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_gray: 0.05,
            max_gray: 0.20,
            max_adjust_iterations: 10,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Drawing roles a canvas maps to concrete colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRole {
    Background,
    PlotArea,
    Plot,
    Grid,
    Scale,
    Units,
    Title,
    ZoomBox,
    IntegralPlot,
    PeakTab,
    CurrentBox,
    Highlight,
    Grey,
}

impl std::fmt::Display for ColorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorRole::Background => write!(f, "background"),
            ColorRole::PlotArea => write!(f, "plot area"),
            ColorRole::Plot => write!(f, "plot"),
            ColorRole::Grid => write!(f, "grid"),
            ColorRole::Scale => write!(f, "scale"),
            ColorRole::Units => write!(f, "units"),
            ColorRole::Title => write!(f, "title"),
            ColorRole::ZoomBox => write!(f, "zoom box"),
            ColorRole::IntegralPlot => write!(f, "integral"),
            ColorRole::PeakTab => write!(f, "peak tab"),
            ColorRole::CurrentBox => write!(f, "current box"),
            ColorRole::Highlight => write!(f, "highlight"),
            ColorRole::Grey => write!(f, "grey"),
        }
    }
}

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: Rgb,
    pub plot_area: Rgb,
    pub plot: Rgb,
    pub grid: Rgb,
    pub scale: Rgb,
    pub units: Rgb,
    pub title: Rgb,
    pub zoom_box: Rgb,
    pub integral_plot: Rgb,
    pub peak_tab: Rgb,
    pub current_box: Rgb,
    pub highlight: Rgb,
    pub grey: Rgb,
    /// Per-spectrum plot colors, cycled
    pub palette: Vec<Rgb>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            plot_area: [255, 255, 255],
            plot: [0, 0, 255],
            grid: [200, 200, 200],
            scale: [0, 0, 0],
            units: [255, 0, 0],
            title: [0, 0, 0],
            zoom_box: [100, 100, 50],
            integral_plot: [255, 0, 0],
            peak_tab: [255, 0, 0],
            current_box: [128, 0, 128],
            highlight: [255, 200, 0],
            grey: [128, 128, 128],
            palette: vec![
                [0x1f, 0x77, 0xb4],
                [0xd6, 0x27, 0x28],
                [0x2c, 0xa0, 0x2c],
                [0xff, 0x7f, 0x0e],
                [0x94, 0x67, 0xbd],
                [0x8c, 0x56, 0x4b],
                [0xe3, 0x77, 0xc2],
                [0x17, 0xbe, 0xcf],
            ],
        }
    }
}

impl ColorConfig {
    pub fn role(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Background => self.background,
            ColorRole::PlotArea => self.plot_area,
            ColorRole::Plot => self.plot,
            ColorRole::Grid => self.grid,
            ColorRole::Scale => self.scale,
            ColorRole::Units => self.units,
            ColorRole::Title => self.title,
            ColorRole::ZoomBox => self.zoom_box,
            ColorRole::IntegralPlot => self.integral_plot,
            ColorRole::PeakTab => self.peak_tab,
            ColorRole::CurrentBox => self.current_box,
            ColorRole::Highlight => self.highlight,
            ColorRole::Grey => self.grey,
        }
    }

    /// Plot color of spectrum `i`; the plain plot color if the palette is empty.
    pub fn plot_color(&self, i: usize) -> Rgb {
        if self.palette.is_empty() {
            self.plot
        } else {
            self.palette[i % self.palette.len()]
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub zoom: ZoomConfig,
    pub layout: LayoutConfig,
    pub display: DisplayConfig,
    pub peaks: PeakConfig,
    pub integral: IntegralConfig,
    pub image: ImageConfig,
    pub colors: ColorConfig,
}

impl ViewConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded view configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ViewConfig::default();
        assert!(c.zoom.enabled);
        assert_eq!(c.zoom.min_points, 3);
        assert_eq!(c.zoom.x_divisions, 14);
        assert_eq!(c.peaks.max_peaks, 100);
        assert_eq!(c.image.max_adjust_iterations, 10);
        assert_eq!(c.integral.offset_percent, 30.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = ViewConfig::from_json(r#"{ "zoom": { "min_points": 7 }, "display": { "grid": false } }"#)
            .unwrap();
        assert_eq!(c.zoom.min_points, 7);
        assert_eq!(c.zoom.min_drag_pixels, 5);
        assert!(!c.display.grid);
        assert!(c.display.x_scale);
        assert_eq!(c.layout.left, 60);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(ViewConfig::from_json("{ zoom: ").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let mut c = ViewConfig::default();
        c.peaks.threshold = Some(2.5);
        let path = std::env::temp_dir().join(format!("view-config-{}.json", uuid::Uuid::new_v4()));
        c.save(&path).unwrap();
        let loaded = ViewConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_palette_cycles() {
        let colors = ColorConfig::default();
        assert_eq!(colors.plot_color(0), colors.plot_color(colors.palette.len()));
        assert_eq!(colors.role(ColorRole::Grid), colors.grid);
    }
}
