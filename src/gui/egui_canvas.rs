/// `Canvas` backed by an `egui::Painter`
///
/// Engine pixels are offsets from the top-left corner of the plot rect;
/// colors come from the view configuration by role.
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke};
use image::GrayImage;

use spectral_view::config::{ColorConfig, ColorRole, Rgb};
use spectral_view::view::{ArrowType, Canvas};

const FONT_SIZE: f32 = 11.0;
const ARROW_HALF: f32 = 5.0;

fn color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

pub struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
    colors: &'a ColorConfig,
    color: Color32,
    width: f32,
    font: FontId,
    /// Texture slot for the 2D image, kept alive by the app between frames
    texture: &'a mut Option<egui::TextureHandle>,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(
        painter: &'a egui::Painter,
        origin: Pos2,
        colors: &'a ColorConfig,
        texture: &'a mut Option<egui::TextureHandle>,
    ) -> Self {
        Self {
            painter,
            origin,
            colors,
            color: color32(colors.plot),
            width: 1.0,
            font: FontId::monospace(FONT_SIZE),
            texture,
        }
    }

    fn pos(&self, x: i32, y: i32) -> Pos2 {
        Pos2::new(self.origin.x + x as f32 + 0.5, self.origin.y + y as f32 + 0.5)
    }

    fn rect(&self, x: i32, y: i32, width: i32, height: i32) -> Rect {
        let min = self.pos(x, y);
        Rect::from_min_size(min, egui::vec2(width as f32, height as f32))
    }

    fn stroke(&self) -> Stroke {
        Stroke::new(self.width, self.color)
    }
}

impl Canvas for EguiCanvas<'_> {
    fn set_color(&mut self, role: ColorRole) {
        self.color = color32(self.colors.role(role));
    }

    fn set_plot_color(&mut self, i: usize) {
        self.color = color32(self.colors.plot_color(i));
    }

    fn set_stroke_bold(&mut self, bold: bool) {
        self.width = if bold { 2.0 } else { 1.0 };
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.painter
            .line_segment([self.pos(x0, y0), self.pos(x1, y1)], self.stroke());
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.painter.rect_stroke(
            self.rect(x, y, width, height),
            0.0,
            self.stroke(),
            egui::StrokeKind::Inside,
        );
    }

    fn fill_box(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.painter
            .rect_filled(self.rect(x, y, width, height), 0.0, self.color);
    }

    fn draw_circle(&mut self, x: i32, y: i32, diameter: i32) {
        self.painter
            .circle_stroke(self.pos(x, y), diameter as f32 / 2.0, self.stroke());
    }

    fn fill_circle(&mut self, x: i32, y: i32, diameter: i32) {
        self.painter
            .circle_filled(self.pos(x, y), diameter as f32 / 2.0, self.color);
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32) {
        self.painter.text(
            self.pos(x, y),
            Align2::LEFT_BOTTOM,
            text,
            self.font.clone(),
            self.color,
        );
    }

    fn string_width(&self, text: &str) -> i32 {
        let galley = self
            .painter
            .layout_no_wrap(text.to_string(), self.font.clone(), self.color);
        galley.size().x.ceil() as i32
    }

    fn font_height(&self) -> i32 {
        self.painter
            .ctx()
            .fonts(|f| f.row_height(&self.font))
            .ceil() as i32
    }

    fn fill_arrow(&mut self, kind: ArrowType, x: i32, y: i32, fill: bool) {
        let c = self.pos(x, y);
        let h = ARROW_HALF;
        let points = match kind {
            ArrowType::Up => vec![c + egui::vec2(0.0, -h), c + egui::vec2(h, h), c + egui::vec2(-h, h)],
            ArrowType::Down => vec![c + egui::vec2(0.0, h), c + egui::vec2(-h, -h), c + egui::vec2(h, -h)],
            ArrowType::Left => vec![c + egui::vec2(-h, 0.0), c + egui::vec2(h, -h), c + egui::vec2(h, h)],
            ArrowType::Right => vec![c + egui::vec2(h, 0.0), c + egui::vec2(-h, h), c + egui::vec2(-h, -h)],
            ArrowType::Reset | ArrowType::Home => {
                let r = Rect::from_center_size(c, egui::vec2(2.0 * h, 2.0 * h));
                if fill {
                    self.painter.rect_filled(r, 0.0, self.color);
                } else {
                    self.painter
                        .rect_stroke(r, 0.0, self.stroke(), egui::StrokeKind::Inside);
                }
                return;
            }
        };
        let fill_color = if fill { self.color } else { Color32::TRANSPARENT };
        self.painter
            .add(egui::Shape::convex_polygon(points, fill_color, self.stroke()));
    }

    fn draw_image(&mut self, image: &GrayImage, x: i32, y: i32, width: i32, height: i32) {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_gray(size, image.as_raw());
        let options = egui::TextureOptions::NEAREST;
        let id = match self.texture.as_mut() {
            Some(tex) => {
                tex.set(color_image, options);
                tex.id()
            }
            None => {
                let tex = self
                    .painter
                    .ctx()
                    .load_texture("spectrum-2d", color_image, options);
                let id = tex.id();
                *self.texture = Some(tex);
                id
            }
        };
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        self.painter
            .image(id, self.rect(x, y, width, height), uv, Color32::WHITE);
    }
}
