/// Rendering of a graph set onto a [`Canvas`]
///
/// Everything is converted to pixels here; the canvas only sees lines,
/// boxes, text and color roles.
use super::events::Arrow;
use super::GraphSet;
use crate::config::ColorRole;
use crate::data::Spectrum;
use crate::view::canvas::{ArrowType, Canvas};
use crate::view::widget::WidgetKind;

/// Height of a peak tab above the plot
const PEAK_TAB_HEIGHT: i32 = 8;

impl GraphSet {
    /// Draw every split slice of the set, then restore the geometry of the
    /// slice under the pointer.
    pub fn draw_graph(&mut self, canvas: &mut dyn Canvas, spectra: &[Spectrum]) {
        for i_split in 0..self.n_split {
            self.set_position_for_frame(i_split);
            self.set_widgets(true);
            self.draw_all(canvas, spectra, i_split);
        }
        let current = if self.n_split > 1 {
            self.moved_to.unwrap_or(0).min(self.n_split - 1)
        } else {
            0
        };
        self.set_position_for_frame(current);
        self.set_widgets(true);
        self.set_scale(self.moved_to.unwrap_or_else(|| self.fixed_selected()));
    }

    fn stack_offset(&self, i: usize) -> i32 {
        if self.show_all_stacked && self.n_split == 1 {
            i as i32
                * (self.frame.y_pixels as f64 * self.config.layout.stack_offset_percent as f64
                    / 100.0) as i32
        } else {
            0
        }
    }

    fn draw_all(&mut self, canvas: &mut dyn Canvas, spectra: &[Spectrum], i_split: usize) {
        let f = self.frame;
        let head = &spectra[self.spectra[0]];
        if let Some(iv) = self.image.as_mut() {
            let (x, y, w, h) = (iv.x_pixel0, iv.y_pixel0, iv.x_pixels, iv.y_pixels);
            if let Some(img) = iv.update_buffer(head, false) {
                canvas.draw_image(img, x, y, w, h);
            }
        }

        canvas.set_color(ColorRole::PlotArea);
        canvas.fill_box(f.x_pixel0, f.y_pixel0, f.x_pixels, f.y_pixels);
        self.draw_frame(canvas);

        let display = self.config.display.clone();
        let mut first = true;
        for i in 0..self.spectra.len() {
            if !self.do_plot(i, i_split) {
                continue;
            }
            self.set_scale(i);
            let spec = self.spec(spectra, i);
            let offset = self.stack_offset(i);
            if first {
                if self.is_current && self.config.zoom.enabled {
                    self.draw_widgets(canvas);
                }
                if display.grid {
                    self.draw_grid(canvas);
                }
            }
            self.draw_peak_tabs(canvas, i);
            let own_axis = if self.show_all_stacked && !self.view.single_y_scale {
                self.selected.map_or(first, |s| s == i)
            } else {
                first
            };
            if first && display.title {
                self.draw_title(canvas, spec);
            }
            if own_axis {
                if display.y_scale {
                    self.draw_y_scale(canvas);
                }
                if display.y_units {
                    self.draw_units(canvas, spec, false);
                }
            }
            self.draw_spectrum(canvas, spectra, i, offset);
            self.draw_integral(canvas, i);
            self.draw_measurements(canvas, i, offset);
            first = false;
        }
        if self.have_left_right_arrows() {
            canvas.set_color(ColorRole::CurrentBox);
            let (x, y) = self.arrow_position(Arrow::Left);
            canvas.fill_arrow(ArrowType::Left, x, y, true);
            let (x, y) = self.arrow_position(Arrow::Right);
            canvas.fill_arrow(ArrowType::Right, x, y, true);
            let (x, y) = self.arrow_position(Arrow::Home);
            canvas.fill_arrow(ArrowType::Home, x, y, !self.show_all_stacked);
        }
        if display.x_scale {
            self.draw_x_scale(canvas);
        }
        if display.x_units {
            self.draw_units(canvas, head, true);
        }
        self.draw_annotations(canvas, i_split);
    }

    fn draw_frame(&self, canvas: &mut dyn Canvas) {
        let f = &self.frame;
        if !self.config.display.grid {
            canvas.set_color(ColorRole::Grid);
            canvas.draw_rect(f.x_pixel0, f.y_pixel0, f.x_pixels, f.y_pixels);
        }
        canvas.set_color(ColorRole::CurrentBox);
        for (arrow, kind) in [
            (Arrow::Up, ArrowType::Up),
            (Arrow::Down, ArrowType::Down),
            (Arrow::Reset, ArrowType::Reset),
        ] {
            let (x, y) = self.arrow_position(arrow);
            canvas.fill_arrow(kind, x, y, true);
        }
        if self.is_current && self.frac_y * (self.n_split as f64) < 1.0 {
            canvas.draw_rect(
                f.x_pixel00 + 10,
                f.y_pixel00 + 1,
                f.x_pixel11 - 20 - f.x_pixel00,
                f.y_pixel11 - 2 - f.y_pixel00,
            );
        }
        if self.is_splittable() {
            canvas.fill_box(f.x_pixel11 - 20, f.y_pixel00 + 1, 10, 10);
        }
    }

    fn draw_widgets(&self, canvas: &mut dyn Canvas) {
        let f = &self.frame;
        let w = &self.widgets;
        let zb = &w.zoom_box_1d;
        if !zb.is_collapsed() {
            canvas.set_color(ColorRole::ZoomBox);
            let (y0, y1) = if self.integral_drag {
                (f.y_pixel0, f.y_pixel1)
            } else {
                (zb.y_pixel0, zb.y_pixel1)
            };
            canvas.fill_box(
                zb.x_pixel0.min(zb.x_pixel1),
                y0.min(y1),
                (zb.x_pixel1 - zb.x_pixel0).abs(),
                (y1 - y0).abs(),
            );
        }
        canvas.set_color(ColorRole::Scale);
        canvas.draw_line(w.pin_x0.x_pixel0, w.pin_x0.y_pixel0, w.pin_x1.x_pixel0, w.pin_x1.y_pixel0);
        canvas.draw_line(w.pin_y0.x_pixel0, w.pin_y0.y_pixel0, w.pin_y1.x_pixel0, w.pin_y1.y_pixel0);
        for kind in [
            WidgetKind::Pin1Dx0,
            WidgetKind::Pin1Dx1,
            WidgetKind::Pin1Dx01,
            WidgetKind::Pin1Dy0,
            WidgetKind::Pin1Dy1,
            WidgetKind::Pin1Dy01,
        ] {
            let p = w.get(kind);
            if p.enabled {
                canvas.draw_handle(p.x_pixel0, p.y_pixel0, Some(kind) == self.active_widget);
            }
        }
        if let Some(iv) = &self.image {
            canvas.set_color(ColorRole::Highlight);
            for p in [&w.cur_2d_x0, &w.cur_2d_x1] {
                canvas.draw_line(p.x_pixel0, iv.y_pixel0, p.x_pixel0, iv.y_pixel1);
            }
            let y = w.cur_2d_y.y_pixel0;
            canvas.draw_line(iv.x_pixel0, y, iv.x_pixel1, y);
            let zb = &w.zoom_box_2d;
            if !zb.is_collapsed() {
                canvas.set_color(ColorRole::ZoomBox);
                canvas.draw_rect(
                    zb.x_pixel0.min(zb.x_pixel1),
                    zb.y_pixel0.min(zb.y_pixel1),
                    (zb.x_pixel1 - zb.x_pixel0).abs(),
                    (zb.y_pixel1 - zb.y_pixel0).abs(),
                );
            }
        }
    }

    /// Pixel row of a gridline value, ignoring any user scale factor.
    fn grid_pixel_y(&self, y: f64) -> i32 {
        self.frame.y_pixel1 - ((y - self.axis.min_y_on_scale) / self.y_factor()) as i32
    }

    fn visible_x_gridlines(&self) -> Vec<f64> {
        let a = &self.axis;
        let eps = a.x_step * 1e-6;
        a.x_gridlines()
            .into_iter()
            .filter(|&x| x >= a.min_x_on_scale - eps && x <= a.max_x_on_scale + eps)
            .collect()
    }

    fn draw_grid(&self, canvas: &mut dyn Canvas) {
        let f = &self.frame;
        canvas.set_color(ColorRole::Grid);
        for x in self.visible_x_gridlines() {
            let px = self.to_pixel_x(x);
            canvas.draw_line(px, f.y_pixel0, px, f.y_pixel1);
        }
        for y in self.axis.y_gridlines() {
            let py = self.grid_pixel_y(y);
            if py == self.fix_y(py) {
                canvas.draw_line(f.x_pixel0, py, f.x_pixel1, py);
            }
        }
    }

    fn draw_x_scale(&self, canvas: &mut dyn Canvas) {
        let f = &self.frame;
        let h = canvas.font_height();
        canvas.set_color(ColorRole::Scale);
        for x in self.visible_x_gridlines() {
            let px = self.to_pixel_x(x);
            canvas.draw_line(px, f.y_pixel1, px, f.y_pixel1 + 3);
            let text = self.axis.format_x(x);
            let w = canvas.string_width(&text);
            canvas.draw_string(&text, px - w / 2, f.y_pixel1 + 4 + h);
        }
    }

    fn draw_y_scale(&self, canvas: &mut dyn Canvas) {
        let f = &self.frame;
        let h = canvas.font_height();
        canvas.set_color(ColorRole::Scale);
        for y in self.axis.y_gridlines() {
            let py = self.grid_pixel_y(y);
            if py != self.fix_y(py) {
                continue;
            }
            canvas.draw_line(f.x_pixel0 - 3, py, f.x_pixel0, py);
            let text = self.axis.format_y(y);
            let w = canvas.string_width(&text);
            canvas.draw_string(&text, f.x_pixel0 - 5 - w, py + h / 3);
        }
    }

    fn draw_units(&self, canvas: &mut dyn Canvas, spec: &Spectrum, is_x: bool) {
        let Some(units) = spec.axis_label(is_x) else {
            return;
        };
        let f = &self.frame;
        let h = canvas.font_height();
        let w = canvas.string_width(units);
        canvas.set_color(ColorRole::Units);
        if is_x {
            canvas.draw_string(units, f.x_pixel1 - w, f.y_pixel1 + 2 * h + 6);
        } else {
            canvas.draw_string(units, (f.x_pixel0 - w - 5).max(f.x_pixel00), f.y_pixel0 - h / 2);
        }
    }

    fn draw_title(&self, canvas: &mut dyn Canvas, spec: &Spectrum) {
        let f = &self.frame;
        canvas.set_color(ColorRole::Title);
        canvas.draw_string(&spec.title, f.x_pixel0, f.y_pixel11 - 2);
    }

    fn draw_spectrum(&self, canvas: &mut dyn Canvas, spectra: &[Spectrum], i: usize, offset: i32) {
        let coords = self.coords(spectra, i);
        if coords.is_empty() {
            return;
        }
        let scale = self.view.scale(i);
        let end = scale.end_index.min(coords.len() - 1);
        let visible = &coords[scale.start_index.min(end)..=end];
        canvas.set_plot_color(i);
        if self.spec(spectra, 0).continuous {
            for w in visible.windows(2) {
                let (y1, y2) = (self.to_pixel_y(w[0].y), self.to_pixel_y(w[1].y));
                if y1 == i32::MIN || y2 == i32::MIN {
                    continue;
                }
                canvas.draw_line(
                    self.to_pixel_x(w[0].x),
                    offset + self.fix_y(y1),
                    self.to_pixel_x(w[1].x),
                    offset + self.fix_y(y2),
                );
            }
        } else {
            let base = self.fix_y(self.to_pixel_y(self.axis.min_y_on_scale.max(0.0)));
            if self.axis.is_y_zero_on_scale() {
                canvas.draw_line(self.frame.x_pixel0, base + offset, self.frame.x_pixel1, base + offset);
            }
            for c in visible {
                let py = self.to_pixel_y(c.y);
                if py == i32::MIN {
                    continue;
                }
                let px = self.to_pixel_x(c.x);
                canvas.draw_line(px, base + offset, px, self.fix_y(py) + offset);
            }
        }
    }

    fn draw_integral(&self, canvas: &mut dyn Canvas, i: usize) {
        let Some(ig) = self.integrals[i].as_ref() else {
            return;
        };
        let f = &self.frame;
        if let Some(p) = &ig.pending {
            let (x1, x2) = (self.to_pixel_x(p.x1), self.to_pixel_x(p.x2));
            canvas.set_color(ColorRole::Highlight);
            canvas.fill_box(x1.min(x2), f.y_pixel0, (x2 - x1).abs(), f.y_pixels);
        }
        if !ig.curve.is_empty() {
            let bits = ig.bit_set();
            let scale = self.view.scale(i);
            let end = scale.end_index.min(ig.curve.len() - 1);
            canvas.set_color(ColorRole::IntegralPlot);
            let mut bold = false;
            for k in scale.start_index.min(end)..end {
                let (a, b) = (ig.curve[k], ig.curve[k + 1]);
                let (y1, y2) = (self.to_pixel_y_int(a.y), self.to_pixel_y_int(b.y));
                if y1 == i32::MIN || y2 == i32::MIN {
                    continue;
                }
                if bits[k] != bold {
                    bold = bits[k];
                    canvas.set_stroke_bold(bold);
                }
                canvas.draw_line(
                    self.to_pixel_x(a.x),
                    self.fix_y(y1),
                    self.to_pixel_x(b.x),
                    self.fix_y(y2),
                );
            }
            if bold {
                canvas.set_stroke_bold(false);
            }
        }
        let h = canvas.font_height();
        for (k, r) in ig.regions.iter().enumerate() {
            let px = self.to_pixel_x(r.x2);
            if px != self.fix_x(px) {
                continue;
            }
            let role = if self.selected_integral == Some((i, k)) {
                ColorRole::Highlight
            } else {
                ColorRole::IntegralPlot
            };
            canvas.set_color(role);
            let (y1, y2) = (self.fix_y(self.to_pixel_y_int(r.y1)), self.fix_y(self.to_pixel_y_int(r.y2)));
            canvas.draw_line(px, y1, px, y2);
            canvas.draw_string(&r.text, px + 2, (y1 + y2) / 2 + h / 3);
        }
    }

    fn draw_peak_tabs(&self, canvas: &mut dyn Canvas, i: usize) {
        let Some(peaks) = self.peaks[i].as_ref() else {
            return;
        };
        let f = &self.frame;
        canvas.set_color(ColorRole::PeakTab);
        for p in &peaks.peaks {
            let px = self.to_pixel_x(p.x);
            if px == self.fix_x(px) {
                canvas.draw_line(px, f.y_pixel0, px, f.y_pixel0 + PEAK_TAB_HEIGHT);
            }
        }
    }

    fn draw_measurements(&self, canvas: &mut dyn Canvas, i: usize, offset: i32) {
        let arena = self.spectra[i];
        let pending = self
            .pending_measurement
            .as_ref()
            .filter(|m| m.spectrum == arena)
            .map(|m| (None, m));
        let stored = self.measurements[i]
            .measurements
            .iter()
            .enumerate()
            .map(|(k, m)| (Some(k), m));
        let h = canvas.font_height();
        let xf = self.x_factor();
        for (k, m) in stored.chain(pending) {
            let hovered = k.is_some_and(|k| self.selected_measurement == Some((i, k)));
            canvas.set_color(if hovered {
                ColorRole::Highlight
            } else {
                ColorRole::Title
            });
            let py = self.to_pixel_y(m.y1);
            if py == i32::MIN {
                continue;
            }
            let (x1, x2) = (self.to_pixel_x(m.x1), self.to_pixel_x(m.x2));
            let y = self.fix_y(py) + offset;
            canvas.draw_line(x1, y, x2, y);
            canvas.draw_line(x1, y - 2, x1, y + 2);
            canvas.draw_line(x2, y - 2, x2, y + 2);
            if ((m.x2 - m.x1) / xf).abs() < 2.0 || m.text.is_empty() {
                continue;
            }
            let w = canvas.string_width(&m.text);
            canvas.draw_string(&m.text, (x1 + x2) / 2 - w / 2 + m.offset_x, y - m.offset_y - h / 3);
        }
    }

    fn draw_annotations(&mut self, canvas: &mut dyn Canvas, i_split: usize) {
        if self.annotations.is_empty() {
            return;
        }
        canvas.set_color(ColorRole::Title);
        for k in 0..self.annotations.len() {
            let i = self.annotations[k].spectrum;
            if !self.do_plot(i, i_split) {
                continue;
            }
            self.set_scale(i);
            let a = &self.annotations[k];
            let px = self.to_pixel_x(a.x);
            let py = self.to_pixel_y(a.y);
            if !self.is_in_plot_region(px, py) {
                continue;
            }
            canvas.draw_string(&a.text, px + a.offset_x, py - a.offset_y);
        }
    }
}
