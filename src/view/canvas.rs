/// Abstract drawing surface
///
/// The engine converts everything to pixels before calling in, so an
/// implementation only needs to know how to put lines, boxes and text on
/// screen. Colors are requested by role and resolved by the implementation.
use image::GrayImage;

use crate::config::ColorRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowType {
    Up,
    Down,
    Left,
    Right,
    Reset,
    Home,
}

pub trait Canvas {
    fn set_color(&mut self, role: ColorRole);

    /// Plot color of spectrum `i` in the palette
    fn set_plot_color(&mut self, i: usize);

    fn set_stroke_bold(&mut self, bold: bool);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);

    fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn fill_box(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Circle centered on `(x, y)`
    fn draw_circle(&mut self, x: i32, y: i32, diameter: i32);

    fn fill_circle(&mut self, x: i32, y: i32, diameter: i32);

    /// Text with its baseline-left corner at `(x, y)`
    fn draw_string(&mut self, text: &str, x: i32, y: i32);

    fn string_width(&self, text: &str) -> i32;

    fn font_height(&self) -> i32;

    fn fill_arrow(&mut self, kind: ArrowType, x: i32, y: i32, fill: bool);

    /// Small square handle centered on `(x, y)`
    fn draw_handle(&mut self, x: i32, y: i32, outline_only: bool) {
        if outline_only {
            self.draw_rect(x - 2, y - 2, 4, 4);
        } else {
            self.fill_box(x - 2, y - 2, 5, 5);
        }
    }

    /// Gray image scaled into the given pixel rectangle
    fn draw_image(&mut self, _image: &GrayImage, _x: i32, _y: i32, _width: i32, _height: i32) {}
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Color(ColorRole),
    PlotColor(usize),
    Bold(bool),
    Line(i32, i32, i32, i32),
    Rect(i32, i32, i32, i32),
    FillBox(i32, i32, i32, i32),
    Circle(i32, i32, i32),
    FillCircle(i32, i32, i32),
    Text(String, i32, i32),
    Arrow(ArrowType, i32, i32, bool),
    Image(u32, u32, i32, i32, i32, i32),
}

/// Canvas that keeps every call, for tests and headless export of the
/// drawing sequence. Text is measured at a fixed 7x12 cell.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(s, _, _) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(i32, i32, i32, i32)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                DrawOp::Line(a, b, c, d) => Some((a, b, c, d)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Canvas for RecordingCanvas {
    fn set_color(&mut self, role: ColorRole) {
        self.ops.push(DrawOp::Color(role));
    }

    fn set_plot_color(&mut self, i: usize) {
        self.ops.push(DrawOp::PlotColor(i));
    }

    fn set_stroke_bold(&mut self, bold: bool) {
        self.ops.push(DrawOp::Bold(bold));
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.ops.push(DrawOp::Line(x0, y0, x1, y1));
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.ops.push(DrawOp::Rect(x, y, width, height));
    }

    fn fill_box(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.ops.push(DrawOp::FillBox(x, y, width, height));
    }

    fn draw_circle(&mut self, x: i32, y: i32, diameter: i32) {
        self.ops.push(DrawOp::Circle(x, y, diameter));
    }

    fn fill_circle(&mut self, x: i32, y: i32, diameter: i32) {
        self.ops.push(DrawOp::FillCircle(x, y, diameter));
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32) {
        self.ops.push(DrawOp::Text(text.to_string(), x, y));
    }

    fn string_width(&self, text: &str) -> i32 {
        7 * text.chars().count() as i32
    }

    fn font_height(&self) -> i32 {
        12
    }

    fn fill_arrow(&mut self, kind: ArrowType, x: i32, y: i32, fill: bool) {
        self.ops.push(DrawOp::Arrow(kind, x, y, fill));
    }

    fn draw_image(&mut self, image: &GrayImage, x: i32, y: i32, width: i32, height: i32) {
        self.ops
            .push(DrawOp::Image(image.width(), image.height(), x, y, width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_canvas_keeps_order() {
        let mut c = RecordingCanvas::new();
        c.set_color(ColorRole::Grid);
        c.draw_line(0, 0, 10, 0);
        c.draw_string("1.5", 3, 4);
        c.draw_handle(5, 5, false);
        assert_eq!(c.ops[0], DrawOp::Color(ColorRole::Grid));
        assert_eq!(c.lines(), vec![(0, 0, 10, 0)]);
        assert_eq!(c.texts(), vec!["1.5"]);
        assert_eq!(c.ops[3], DrawOp::FillBox(3, 3, 5, 5));
        assert_eq!(c.string_width("abc"), 21);
    }
}
