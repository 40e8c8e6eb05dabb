/// Draggable plot widgets: zoom boxes, range pins and 2D cursors
///
/// A widget carries both its data value and its pixel extent. Pins are
/// one-pixel-wide handles on the slider bands around the plot; zoom boxes
/// span the rectangle being dragged out.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    ZoomBox1D,
    Pin1Dx0,
    Pin1Dx1,
    Pin1Dx01,
    Pin1Dy0,
    Pin1Dy1,
    Pin1Dy01,
    ZoomBox2D,
    Cur2Dx0,
    Cur2Dx1,
    Cur2Dy,
}

impl WidgetKind {
    pub fn is_pin(self) -> bool {
        matches!(
            self,
            WidgetKind::Pin1Dx0
                | WidgetKind::Pin1Dx1
                | WidgetKind::Pin1Dx01
                | WidgetKind::Pin1Dy0
                | WidgetKind::Pin1Dy1
                | WidgetKind::Pin1Dy01
        )
    }

    pub fn is_cursor(self) -> bool {
        matches!(self, WidgetKind::Cur2Dx0 | WidgetKind::Cur2Dx1 | WidgetKind::Cur2Dy)
    }

    pub fn is_x_type(self) -> bool {
        matches!(
            self,
            WidgetKind::Pin1Dx0
                | WidgetKind::Pin1Dx1
                | WidgetKind::Pin1Dx01
                | WidgetKind::Cur2Dx0
                | WidgetKind::Cur2Dx1
        )
    }

    pub fn is_2d(self) -> bool {
        matches!(
            self,
            WidgetKind::ZoomBox2D | WidgetKind::Cur2Dx0 | WidgetKind::Cur2Dx1 | WidgetKind::Cur2Dy
        )
    }

    pub fn is_zoom_box(self) -> bool {
        matches!(self, WidgetKind::ZoomBox1D | WidgetKind::ZoomBox2D)
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetKind::ZoomBox1D => write!(f, "zoomBox1D"),
            WidgetKind::Pin1Dx0 => write!(f, "pin1Dx0"),
            WidgetKind::Pin1Dx1 => write!(f, "pin1Dx1"),
            WidgetKind::Pin1Dx01 => write!(f, "pin1Dx01"),
            WidgetKind::Pin1Dy0 => write!(f, "pin1Dy0"),
            WidgetKind::Pin1Dy1 => write!(f, "pin1Dy1"),
            WidgetKind::Pin1Dy01 => write!(f, "pin1Dy01"),
            WidgetKind::ZoomBox2D => write!(f, "zoomBox2D"),
            WidgetKind::Cur2Dx0 => write!(f, "cur2Dx0"),
            WidgetKind::Cur2Dx1 => write!(f, "cur2Dx1"),
            WidgetKind::Cur2Dy => write!(f, "cur2Dy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotWidget {
    pub kind: WidgetKind,
    pub x: f64,
    pub y: f64,
    pub x_pixel0: i32,
    pub y_pixel0: i32,
    pub x_pixel1: i32,
    pub y_pixel1: i32,
    pub enabled: bool,
}

impl PlotWidget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            x: 0.0,
            y: 0.0,
            x_pixel0: 0,
            y_pixel0: 0,
            x_pixel1: 0,
            y_pixel1: 0,
            enabled: true,
        }
    }

    /// Pointer within `tolerance` pixels of the handle in both axes.
    pub fn selected(&self, x_pixel: i32, y_pixel: i32, tolerance: i32) -> bool {
        self.enabled
            && (x_pixel - self.x_pixel0).abs() < tolerance
            && (y_pixel - self.y_pixel0).abs() < tolerance
    }

    pub fn set_x(&mut self, x: f64, x_pixel: i32) {
        self.x = x;
        self.x_pixel0 = x_pixel;
        self.x_pixel1 = x_pixel;
    }

    pub fn set_y(&mut self, y: f64, y_pixel: i32) {
        self.y = y;
        self.y_pixel0 = y_pixel;
        self.y_pixel1 = y_pixel;
    }

    /// Data value along the widget's own axis.
    pub fn value(&self) -> f64 {
        if self.kind.is_x_type() {
            self.x
        } else {
            self.y
        }
    }

    /// Collapse a zoom box onto its start point.
    pub fn collapse(&mut self) {
        self.x_pixel1 = self.x_pixel0;
        self.y_pixel1 = self.y_pixel0;
    }

    pub fn is_collapsed(&self) -> bool {
        self.x_pixel1 == self.x_pixel0
    }
}

impl std::fmt::Display for PlotWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind.is_pin() {
            write!(
                f,
                "{} x={}/{} y={}/{}",
                self.kind, self.x, self.x_pixel0, self.y, self.y_pixel0
            )
        } else {
            write!(
                f,
                "{} {} {} / {} {}",
                self.kind, self.x_pixel0, self.y_pixel0, self.x_pixel1, self.y_pixel1
            )
        }
    }
}

/// The widget set of one graph set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widgets {
    pub zoom_box_1d: PlotWidget,
    pub pin_x0: PlotWidget,
    pub pin_x1: PlotWidget,
    pub pin_x01: PlotWidget,
    pub pin_y0: PlotWidget,
    pub pin_y1: PlotWidget,
    pub pin_y01: PlotWidget,
    pub zoom_box_2d: PlotWidget,
    pub cur_2d_x0: PlotWidget,
    pub cur_2d_x1: PlotWidget,
    pub cur_2d_y: PlotWidget,
}

impl Default for Widgets {
    fn default() -> Self {
        Self {
            zoom_box_1d: PlotWidget::new(WidgetKind::ZoomBox1D),
            pin_x0: PlotWidget::new(WidgetKind::Pin1Dx0),
            pin_x1: PlotWidget::new(WidgetKind::Pin1Dx1),
            pin_x01: PlotWidget::new(WidgetKind::Pin1Dx01),
            pin_y0: PlotWidget::new(WidgetKind::Pin1Dy0),
            pin_y1: PlotWidget::new(WidgetKind::Pin1Dy1),
            pin_y01: PlotWidget::new(WidgetKind::Pin1Dy01),
            zoom_box_2d: PlotWidget::new(WidgetKind::ZoomBox2D),
            cur_2d_x0: PlotWidget::new(WidgetKind::Cur2Dx0),
            cur_2d_x1: PlotWidget::new(WidgetKind::Cur2Dx1),
            cur_2d_y: PlotWidget::new(WidgetKind::Cur2Dy),
        }
    }
}

impl Widgets {
    pub fn get(&self, kind: WidgetKind) -> &PlotWidget {
        match kind {
            WidgetKind::ZoomBox1D => &self.zoom_box_1d,
            WidgetKind::Pin1Dx0 => &self.pin_x0,
            WidgetKind::Pin1Dx1 => &self.pin_x1,
            WidgetKind::Pin1Dx01 => &self.pin_x01,
            WidgetKind::Pin1Dy0 => &self.pin_y0,
            WidgetKind::Pin1Dy1 => &self.pin_y1,
            WidgetKind::Pin1Dy01 => &self.pin_y01,
            WidgetKind::ZoomBox2D => &self.zoom_box_2d,
            WidgetKind::Cur2Dx0 => &self.cur_2d_x0,
            WidgetKind::Cur2Dx1 => &self.cur_2d_x1,
            WidgetKind::Cur2Dy => &self.cur_2d_y,
        }
    }

    pub fn get_mut(&mut self, kind: WidgetKind) -> &mut PlotWidget {
        match kind {
            WidgetKind::ZoomBox1D => &mut self.zoom_box_1d,
            WidgetKind::Pin1Dx0 => &mut self.pin_x0,
            WidgetKind::Pin1Dx1 => &mut self.pin_x1,
            WidgetKind::Pin1Dx01 => &mut self.pin_x01,
            WidgetKind::Pin1Dy0 => &mut self.pin_y0,
            WidgetKind::Pin1Dy1 => &mut self.pin_y1,
            WidgetKind::Pin1Dy01 => &mut self.pin_y01,
            WidgetKind::ZoomBox2D => &mut self.zoom_box_2d,
            WidgetKind::Cur2Dx0 => &mut self.cur_2d_x0,
            WidgetKind::Cur2Dx1 => &mut self.cur_2d_x1,
            WidgetKind::Cur2Dy => &mut self.cur_2d_y,
        }
    }

    /// Widgets in hit-test order; 2D widgets only while an image is shown.
    pub fn active(&self, with_2d: bool) -> Vec<&PlotWidget> {
        let mut out = vec![
            &self.zoom_box_1d,
            &self.pin_x0,
            &self.pin_x01,
            &self.pin_x1,
            &self.pin_y0,
            &self.pin_y01,
            &self.pin_y1,
        ];
        if with_2d {
            out.extend([&self.zoom_box_2d, &self.cur_2d_x0, &self.cur_2d_x1, &self.cur_2d_y]);
        }
        out
    }

    /// First selectable pin or cursor under the pointer.
    pub fn find(&self, x_pixel: i32, y_pixel: i32, tolerance: i32, with_2d: bool) -> Option<WidgetKind> {
        self.active(with_2d)
            .into_iter()
            .filter(|w| w.kind.is_pin() || w.kind.is_cursor())
            .find(|w| w.selected(x_pixel, y_pixel, tolerance))
            .map(|w| w.kind)
    }

    pub fn collapse_zoom_boxes(&mut self) {
        self.zoom_box_1d.collapse();
        self.zoom_box_2d.collapse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_flags() {
        assert!(WidgetKind::Pin1Dx01.is_pin());
        assert!(WidgetKind::Pin1Dx01.is_x_type());
        assert!(!WidgetKind::Pin1Dy0.is_x_type());
        assert!(WidgetKind::Cur2Dy.is_cursor());
        assert!(WidgetKind::Cur2Dy.is_2d());
        assert!(!WidgetKind::ZoomBox1D.is_pin());
        assert_eq!(WidgetKind::ZoomBox2D.to_string(), "zoomBox2D");
    }

    #[test]
    fn test_selection_tolerance() {
        let mut w = PlotWidget::new(WidgetKind::Pin1Dx0);
        w.set_x(1.5, 100);
        w.y_pixel0 = 20;
        assert!(w.selected(104, 16, 5));
        assert!(!w.selected(105, 20, 5));
        w.enabled = false;
        assert!(!w.selected(100, 20, 5));
    }

    #[test]
    fn test_find_skips_zoom_box() {
        let mut ws = Widgets::default();
        ws.zoom_box_1d.x_pixel0 = 50;
        ws.zoom_box_1d.y_pixel0 = 50;
        ws.pin_x1.set_x(2.0, 200);
        ws.pin_x1.y_pixel0 = 25;
        ws.pin_x0.x_pixel0 = -100;
        ws.pin_x01.x_pixel0 = -100;
        ws.pin_y0.x_pixel0 = -100;
        ws.pin_y01.x_pixel0 = -100;
        ws.pin_y1.x_pixel0 = -100;
        assert_eq!(ws.find(50, 50, 5, false), None);
        assert_eq!(ws.find(201, 26, 5, false), Some(WidgetKind::Pin1Dx1));
        assert_eq!(ws.get(WidgetKind::Pin1Dx1).value(), 2.0);
    }
}
