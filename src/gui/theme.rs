/// Switchable light and dark themes for the demo window
///
/// A theme styles the egui chrome and supplies the `ColorConfig` the
/// spectrum panel draws with.
use spectral_view::config::ColorConfig;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AppTheme {
    Light,
    Dark,
}

impl AppTheme {
    pub fn label(&self) -> &'static str {
        match self {
            AppTheme::Light => "☀ Light",
            AppTheme::Dark => "☾ Dark",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AppTheme::Light => AppTheme::Dark,
            AppTheme::Dark => AppTheme::Light,
        }
    }

    /// Panel drawing colors for this theme
    pub fn plot_colors(&self) -> ColorConfig {
        match self {
            AppTheme::Light => ColorConfig::default(),
            AppTheme::Dark => ColorConfig {
                background: [0x12, 0x14, 0x1C],
                plot_area: [0x18, 0x1B, 0x26],
                plot: [0x00, 0xE5, 0xFF],
                grid: [0x33, 0x37, 0x48],
                scale: [0xC8, 0xCA, 0xD6],
                units: [0xFF, 0x6B, 0x6B],
                title: [0xE0, 0xE0, 0xF0],
                zoom_box: [0xFF, 0xD6, 0x00],
                integral_plot: [0xFF, 0x55, 0x88],
                peak_tab: [0xFF, 0xC0, 0x00],
                current_box: [0xBD, 0x6B, 0xFF],
                highlight: [0x80, 0x68, 0x10],
                grey: [0x70, 0x72, 0x80],
                palette: vec![
                    [0x00, 0xE5, 0xFF],
                    [0xFF, 0x55, 0x88],
                    [0x00, 0xFF, 0x88],
                    [0xFF, 0xD6, 0x00],
                    [0xBD, 0x6B, 0xFF],
                    [0xFF, 0x8C, 0x00],
                ],
            },
        }
    }
}

/// Chrome colors a theme provides
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub panel_fill: egui::Color32,
    pub window_fill: egui::Color32,
    pub faint_bg: egui::Color32,

    pub widget_bg: egui::Color32,
    pub widget_bg_stroke: egui::Color32,
    pub widget_hovered_stroke: egui::Color32,
    pub widget_active_bg: egui::Color32,

    pub selection_bg: egui::Color32,
    pub selection_stroke: egui::Color32,

    pub text_secondary: egui::Color32,
    pub text_muted: egui::Color32,
    pub accent: egui::Color32,

    pub status_bar_bg: egui::Color32,
    pub status_text: egui::Color32,

    pub is_dark: bool,
}

impl ThemeColors {
    pub fn from_theme(theme: AppTheme) -> Self {
        match theme {
            AppTheme::Light => Self::light(),
            AppTheme::Dark => Self::dark(),
        }
    }

    fn light() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0xF7, 0xF7, 0xF8),
            window_fill: egui::Color32::from_rgb(0xFF, 0xFF, 0xFF),
            faint_bg: egui::Color32::from_rgb(0xF0, 0xF1, 0xF3),

            widget_bg: egui::Color32::from_rgb(0xEB, 0xEC, 0xEE),
            widget_bg_stroke: egui::Color32::from_rgb(0xD0, 0xD2, 0xD6),
            widget_hovered_stroke: egui::Color32::from_rgb(0x5B, 0x9B, 0xD5),
            widget_active_bg: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),

            selection_bg: egui::Color32::from_rgba_premultiplied(0x3B, 0x7D, 0xC0, 0x40),
            selection_stroke: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),

            text_secondary: egui::Color32::from_rgb(0x44, 0x48, 0x52),
            text_muted: egui::Color32::from_rgb(0x88, 0x8C, 0x94),
            accent: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),

            status_bar_bg: egui::Color32::from_rgb(0xF0, 0xF1, 0xF3),
            status_text: egui::Color32::from_rgb(0x44, 0x48, 0x52),

            is_dark: false,
        }
    }

    fn dark() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0x0D, 0x0F, 0x16),
            window_fill: egui::Color32::from_rgb(0x12, 0x14, 0x1C),
            faint_bg: egui::Color32::from_rgb(0x16, 0x19, 0x22),

            widget_bg: egui::Color32::from_rgb(0x1A, 0x1D, 0x28),
            widget_bg_stroke: egui::Color32::from_rgb(0x33, 0x37, 0x48),
            widget_hovered_stroke: egui::Color32::from_rgb(0x00, 0xE5, 0xFF),
            widget_active_bg: egui::Color32::from_rgb(0x2A, 0x5F, 0x9E),

            selection_bg: egui::Color32::from_rgba_premultiplied(0x00, 0xA0, 0xC0, 0x40),
            selection_stroke: egui::Color32::from_rgb(0x00, 0xA0, 0xC0),

            text_secondary: egui::Color32::from_rgb(0xA0, 0xA4, 0xB8),
            text_muted: egui::Color32::from_rgb(0x6A, 0x6E, 0x80),
            accent: egui::Color32::from_rgb(0x00, 0xE5, 0xFF),

            status_bar_bg: egui::Color32::from_rgb(0x0A, 0x0C, 0x12),
            status_text: egui::Color32::from_rgb(0xA0, 0xA4, 0xB8),

            is_dark: true,
        }
    }
}

/// Apply a theme to the egui context
pub fn apply_theme(ctx: &egui::Context, theme: AppTheme) {
    let c = ThemeColors::from_theme(theme);

    let mut visuals = if c.is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = c.panel_fill;
    visuals.window_fill = c.window_fill;
    visuals.faint_bg_color = c.faint_bg;

    visuals.widgets.noninteractive.bg_fill = c.widget_bg;
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(0.5, c.widget_bg_stroke);
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, c.text_secondary);

    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, c.widget_hovered_stroke);
    visuals.widgets.active.bg_fill = c.widget_active_bg;

    visuals.selection.bg_fill = c.selection_bg;
    visuals.selection.stroke = egui::Stroke::new(1.5, c.selection_stroke);

    ctx.set_visuals(visuals);
}
