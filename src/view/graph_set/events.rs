/// Pointer and keyboard handling for a graph set
///
/// Press picks a pin or starts a zoom box, drag moves it (pins zoom live
/// without touching the history), release commits. Clicks drive the
/// measurement and arrow controls.
use super::{GraphSet, ViewEvent};
use crate::analysis::Measurement;
use crate::data::Spectrum;
use crate::view::widget::WidgetKind;

/// Pixel tolerance for hitting a line or its end points
const ONLINE_CUTOFF: i32 = 2;

const RT2: f64 = std::f64::consts::SQRT_2;

/// Which part of a measurement a hit test looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitPart {
    Start,
    End,
    Line,
    /// Baseline bar just above the bottom of the plot
    LowerBar,
    /// Label next to an integral
    Label,
    /// Line, then the lower bar
    Any,
}

/// Arrow controls drawn in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arrow {
    Up,
    Down,
    Reset,
    Left,
    Right,
    Home,
}

fn distance(dx: i32, dy: i32) -> f64 {
    ((dx as f64).powi(2) + (dy as f64).powi(2)).sqrt()
}

/// Whether `(x, y)` lies on the segment `(x1, y1)-(x2, y2)`, to within a
/// couple of pixels.
pub fn is_on_line(x: i32, y: i32, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    let dx1 = (x1 - x).abs();
    if dx1 < ONLINE_CUTOFF && (y1 - y).abs() < ONLINE_CUTOFF {
        return true;
    }
    let dx2 = x2 - x;
    if dx2.abs() < ONLINE_CUTOFF && (y2 - y).abs() < ONLINE_CUTOFF {
        return true;
    }
    let dy12 = y1 - y2;
    if dy12.abs() > ONLINE_CUTOFF && (y1 < y) == (y2 < y) {
        return false;
    }
    let dx12 = x1 - x2;
    if dx12.abs() > ONLINE_CUTOFF && (x1 < x) == (x2 < x) {
        return false;
    }
    distance(dx1, y1 - y) + distance(dx2, y - y2) < distance(dx12, dy12) + ONLINE_CUTOFF as f64
}

impl GraphSet {
    // ─── Hit testing ───────────────────────────────────────────────────────────

    /// Center of arrow `kind` in the frame.
    pub(crate) fn arrow_position(&self, kind: Arrow) -> (i32, i32) {
        let f = &self.frame;
        let mid_y = (f.y_pixel11 + f.y_pixel00) / 2;
        let mid_x = f.x_pixel00 + 32;
        match kind {
            Arrow::Up => (f.x_pixel11 - 25, mid_y - 15),
            Arrow::Down => (f.x_pixel11 - 25, mid_y + 15),
            Arrow::Reset => (f.x_pixel11 - 25, mid_y),
            Arrow::Left => (mid_x - 15, f.y_pixel11 - 10),
            Arrow::Right => (mid_x + 15, f.y_pixel11 - 10),
            Arrow::Home => (mid_x, f.y_pixel11 - 10),
        }
    }

    fn is_arrow_click(&self, x_pixel: i32, y_pixel: i32, kind: Arrow) -> bool {
        let (ax, ay) = self.arrow_position(kind);
        (ax - x_pixel).abs() < 10 && (ay - y_pixel).abs() < 10
    }

    fn pin_selected(&self, x_pixel: i32, y_pixel: i32) -> Option<WidgetKind> {
        self.widgets.find(
            x_pixel,
            y_pixel,
            self.config.zoom.pin_select_pixels,
            self.image.is_some(),
        )
    }

    /// Whether the pointer is on spectrum `i`, or on the integral curve of
    /// the selected spectrum when `i` is `None`.
    pub(crate) fn is_on_spectrum(&self, spectra: &[Spectrum], x: i32, y: i32, i: Option<usize>) -> bool {
        let (index, coords, continuous, integral) = match i {
            None => {
                let k = self.fixed_selected();
                match self.integrals[k].as_ref() {
                    Some(ig) => (k, ig.curve.as_slice(), true, true),
                    None => return false,
                }
            }
            Some(k) => (k, self.coords(spectra, k), self.spec(spectra, 0).continuous, false),
        };
        if coords.is_empty() {
            return false;
        }
        let y_offset = index as i32
            * (self.frame.y_pixels as f64 * self.config.layout.stack_offset_percent as f64 / 100.0) as i32;
        let scale = self.view.scale(index);
        let end = scale.end_index.min(coords.len() - 1);
        let to_py = |v: f64| {
            if integral {
                self.to_pixel_y_int(v)
            } else {
                self.to_pixel_y(v)
            }
        };
        if continuous {
            for w in coords[scale.start_index.min(end)..=end].windows(2) {
                let (y1, y2) = (to_py(w[0].y), to_py(w[1].y));
                if y1 == i32::MIN || y2 == i32::MIN {
                    continue;
                }
                let (x1, x2) = (self.to_pixel_x(w[0].x), self.to_pixel_x(w[1].x));
                if is_on_line(x, y, x1, y_offset + self.fix_y(y1), x2, y_offset + self.fix_y(y2)) {
                    return true;
                }
            }
        } else {
            let base = self.fix_y(self.to_pixel_y(self.axis.min_y_on_scale.max(0.0)));
            for c in &coords[scale.start_index.min(end)..=end] {
                let py = self.to_pixel_y(c.y);
                if py == i32::MIN {
                    continue;
                }
                let py = self.fix_y(py);
                if base == py && (py == self.frame.y_pixel0 || py == self.frame.y_pixel1) {
                    continue;
                }
                let px = self.to_pixel_x(c.x);
                if is_on_line(x, y, px, base, px, py) {
                    return true;
                }
            }
        }
        false
    }

    fn segment_hit(&self, x: i32, y: i32, seg: (i32, i32, i32, i32), part: HitPart) -> bool {
        let (x1, y1, mut x2, mut y2) = seg;
        match part {
            HitPart::Start => (x - x1).abs() + (y - y1).abs() < 4,
            HitPart::End => (x - x2).abs() + (y - y2).abs() < 4,
            HitPart::Label => {
                let ym = (y1 + y2) / 2;
                x2 = x1 + 20;
                y2 = ym;
                is_on_line(x, y, x1, ym, x2, y2)
            }
            _ => is_on_line(x, y, x1, y1, x2, y2),
        }
    }

    /// Topmost measurement of spectrum position `pos` under the pointer.
    fn find_measurement(&self, pos: usize, x: i32, y: i32, part: HitPart) -> Option<usize> {
        let list = &self.measurements.get(pos)?.measurements;
        if part == HitPart::Any {
            return self
                .find_measurement(pos, x, y, HitPart::Line)
                .or_else(|| self.find_measurement(pos, x, y, HitPart::LowerBar));
        }
        list.iter().rposition(|m| {
            let py = if part == HitPart::LowerBar {
                self.frame.y_pixel1 - 2
            } else {
                self.to_pixel_y(m.y1)
            };
            let seg = (self.to_pixel_x(m.x1), py, self.to_pixel_x(m.x2), py);
            self.segment_hit(x, y, seg, part)
        })
    }

    /// Topmost integral region of spectrum position `pos` under the pointer.
    /// A region is hit on its vertical bar at the end of the span.
    fn find_integral(&self, pos: usize, x: i32, y: i32, part: HitPart) -> Option<usize> {
        let ig = self.integrals.get(pos)?.as_ref()?;
        let part = if part == HitPart::Any { HitPart::Line } else { part };
        ig.regions.iter().rposition(|r| {
            let px = self.to_pixel_x(r.x2);
            let seg = (px, self.to_pixel_y_int(r.y1), px, self.to_pixel_y_int(r.y2));
            self.segment_hit(x, y, seg, part)
        })
    }

    // ─── Mouse events ──────────────────────────────────────────────────────────

    /// Pointer pressed. Starts an integral drag with ctrl (when integrated)
    /// or on the integral curve, then grabs a pin or opens a zoom box.
    pub fn mouse_pressed(&mut self, spectra: &[Spectrum], x: i32, y: i32, ctrl: bool) {
        let has_integrals = self.integrals[self.fixed_selected()].is_some();
        self.integral_drag = ctrl && has_integrals;
        self.check_spectrum_clicked(spectra, x, y, 0);
        self.press_widget(x, y);
    }

    fn press_widget(&mut self, x_pixel: i32, y_pixel: i32) {
        if !self.config.zoom.enabled {
            return;
        }
        let mut widget = self.pin_selected(x_pixel, y_pixel);
        if widget.is_none() {
            let y = self.fix_y(y_pixel);
            if x_pixel < self.frame.x_pixel1 {
                let x = self.fix_x(x_pixel);
                let xv = self.to_x(x);
                let zb = &mut self.widgets.zoom_box_1d;
                zb.set_x(xv, x);
                zb.y_pixel0 = y;
                zb.y_pixel1 = y;
                widget = Some(WidgetKind::ZoomBox1D);
            } else if let Some(iv) = self.image.as_ref().filter(|iv| x_pixel < iv.x_pixel1) {
                let (xv, x) = (iv.to_x(x_pixel), iv.fix_x(x_pixel));
                let zb = &mut self.widgets.zoom_box_2d;
                zb.set_x(xv, x);
                zb.y_pixel0 = y;
                zb.y_pixel1 = y;
                widget = Some(WidgetKind::ZoomBox2D);
            }
        }
        self.active_widget = widget;
    }

    /// Pointer dragged with a button down. Moves the active widget; pins and
    /// cursors re-zoom immediately but leave the history alone.
    pub fn mouse_dragged(&mut self, spectra: &[Spectrum], x: i32, y: i32) {
        self.drag_widget(spectra, x, y);
        self.mouse_moved(spectra, x, y);
    }

    fn drag_widget(&mut self, spectra: &[Spectrum], x_pixel: i32, y_pixel: i32) -> bool {
        if !self.config.zoom.enabled {
            return false;
        }
        let Some(kind) = self.active_widget else {
            return false;
        };
        let (min_y, max_y) = (self.axis.min_y, self.axis.max_y);
        match kind {
            WidgetKind::ZoomBox1D => {
                let (x, y) = (self.fix_x(x_pixel), self.fix_y(y_pixel));
                self.widgets.zoom_box_1d.x_pixel1 = x;
                self.widgets.zoom_box_1d.y_pixel1 = y;
                let zb = &self.widgets.zoom_box_1d;
                if self.integral_drag && zb.x_pixel0 != zb.x_pixel1 {
                    let (x0, x1) = (zb.x, self.to_x(zb.x_pixel1));
                    self.check_integral(x0, x1, false);
                }
            }
            WidgetKind::ZoomBox2D => {
                let Some(iv) = self.image.as_ref() else {
                    return false;
                };
                self.widgets.zoom_box_2d.x_pixel1 = iv.fix_x(x_pixel);
                self.widgets.zoom_box_2d.y_pixel1 = self.fix_y(y_pixel);
            }
            WidgetKind::Cur2Dy => {
                let y = self.fix_y(y_pixel);
                let Some(sub) = self.image.as_ref().map(|iv| iv.to_subspectrum_index(y)) else {
                    return false;
                };
                self.widgets.cur_2d_y.y_pixel0 = y;
                self.widgets.cur_2d_y.y_pixel1 = y;
                self.set_current_subspectrum(spectra, sub);
            }
            WidgetKind::Cur2Dx0 | WidgetKind::Cur2Dx1 => {
                let Some((xv, x)) = self
                    .image
                    .as_ref()
                    .map(|iv| (iv.to_x(iv.fix_x(x_pixel)), iv.fix_x(x_pixel)))
                else {
                    return false;
                };
                self.widgets.get_mut(kind).set_x(xv, x);
                let (x0, x1) = (self.widgets.cur_2d_x0.x, self.widgets.cur_2d_x1.x);
                self.do_zoom(spectra, x0, min_y, x1, max_y, false, false);
            }
            WidgetKind::Pin1Dx0 | WidgetKind::Pin1Dx1 | WidgetKind::Pin1Dx01 => {
                let x = self.fix_x(x_pixel);
                let xv = self.to_x0(x);
                self.widgets.get_mut(kind).set_x(xv, x);
                if kind == WidgetKind::Pin1Dx01 {
                    let w = &self.widgets;
                    let dp = x - (w.pin_x0.x_pixel0 + w.pin_x1.x_pixel0) / 2 + 1;
                    let (p0, p1) = (w.pin_x0.x_pixel0 + dp, w.pin_x1.x_pixel0 + dp);
                    if self.fix_x(p0) != p0 || self.fix_x(p1) != p1 {
                        return true;
                    }
                    let (v0, v1) = (self.to_x0(p0), self.to_x0(p1));
                    self.widgets.pin_x0.set_x(v0, p0);
                    self.widgets.pin_x1.set_x(v1, p1);
                }
                let (x0, x1) = (self.widgets.pin_x0.x, self.widgets.pin_x1.x);
                self.do_zoom(spectra, x0, min_y, x1, max_y, false, false);
            }
            WidgetKind::Pin1Dy0 | WidgetKind::Pin1Dy1 | WidgetKind::Pin1Dy01 => {
                let y = self.fix_y(y_pixel);
                let yv = self.to_y0(y);
                self.widgets.get_mut(kind).set_y(yv, y);
                if kind == WidgetKind::Pin1Dy01 {
                    let w = &self.widgets;
                    let dp = y - (w.pin_y0.y_pixel0 + w.pin_y1.y_pixel0) / 2 + 1;
                    let (p0, p1) = (w.pin_y0.y_pixel0 + dp, w.pin_y1.y_pixel0 + dp);
                    let (v0, v1) = (self.to_y0(p0), self.to_y0(p1));
                    if v0.min(v1) == min_y || v0.max(v1) == max_y {
                        return true;
                    }
                    self.widgets.pin_y0.set_y(v0, p0);
                    self.widgets.pin_y1.set_y(v1, p1);
                }
                let (x0, x1) = (self.view.min_x_on_scale(), self.view.max_x_on_scale());
                let (y0, y1) = (self.widgets.pin_y0.y, self.widgets.pin_y1.y);
                self.do_zoom(spectra, x0, y0, x1, y1, false, false);
            }
        }
        true
    }

    /// Drag was long enough in both axes to count.
    fn is_good_drag(&self, kind: WidgetKind) -> bool {
        let w = self.widgets.get(kind);
        let min = self.config.zoom.min_drag_pixels;
        (w.x_pixel1 - w.x_pixel0).abs() >= min && (w.y_pixel1 - w.y_pixel0).abs() >= min
    }

    /// Integral drags span the full plot height, so only X counts.
    fn is_good_integral_drag(&self) -> bool {
        let w = &self.widgets.zoom_box_1d;
        (w.x_pixel1 - w.x_pixel0).abs() >= self.config.zoom.min_drag_pixels
    }

    /// Pointer released. Commits an integral, a zoom box, or a pin move.
    pub fn mouse_released(&mut self, spectra: &[Spectrum]) {
        if let Some(i) = self.moved_to {
            self.set_scale(i);
        }
        let widget = self.active_widget.take();
        if self.integral_drag {
            if self.is_good_integral_drag() {
                let zb = &self.widgets.zoom_box_1d;
                let (x0, x1) = (self.to_x(zb.x_pixel0), self.to_x(zb.x_pixel1));
                self.check_integral(x0, x1, true);
            } else {
                let i = self.fixed_selected();
                if let Some(ig) = self.integrals[i].as_mut() {
                    ig.pending = None;
                }
            }
            let zb = &mut self.widgets.zoom_box_1d;
            zb.x_pixel0 = 0;
            zb.x_pixel1 = 0;
            self.integral_drag = false;
            return;
        }
        match widget {
            Some(WidgetKind::ZoomBox2D) => {
                if !self.is_good_drag(WidgetKind::ZoomBox2D) {
                    self.widgets.zoom_box_2d.collapse();
                    return;
                }
                let zb = self.widgets.zoom_box_2d.clone();
                let Some(iv) = self.image.as_mut() else {
                    return;
                };
                iv.set_zoom(zb.x_pixel0, zb.y_pixel0, zb.x_pixel1, zb.y_pixel1);
                let x0 = iv.to_x(iv.x_pixel0);
                let x1 = iv.to_x(iv.x_pixel0 + iv.x_pixels - 1);
                self.widgets.zoom_box_2d.collapse();
                let (y0, y1) = (self.axis.min_y, self.axis.max_y);
                self.do_zoom(spectra, x0, y0, x1, y1, true, false);
            }
            Some(WidgetKind::ZoomBox1D) => {
                if !self.is_good_drag(WidgetKind::ZoomBox1D) {
                    log::debug!("Zoom box too small, discarded");
                    self.widgets.zoom_box_1d.collapse();
                    return;
                }
                let zb = self.widgets.zoom_box_1d.clone();
                let (x0, y0) = (self.to_x(zb.x_pixel0), self.to_y(zb.y_pixel0));
                let (x1, y1) = (self.to_x(zb.x_pixel1), self.to_y(zb.y_pixel1));
                self.do_zoom(spectra, x0, y0, x1, y1, true, true);
                self.widgets.zoom_box_1d.collapse();
            }
            Some(
                WidgetKind::Pin1Dx0
                | WidgetKind::Pin1Dx1
                | WidgetKind::Pin1Dx01
                | WidgetKind::Pin1Dy0
                | WidgetKind::Pin1Dy1
                | WidgetKind::Pin1Dy01
                | WidgetKind::Cur2Dx0
                | WidgetKind::Cur2Dx1,
            ) => {
                self.add_current_zoom();
            }
            _ => {}
        }
    }

    /// Pointer moved. Tracks the hovered split slice and plot position,
    /// stretches a pending measurement, or hover-selects a measurement.
    pub fn mouse_moved(&mut self, spectra: &[Spectrum], x: i32, y: i32) {
        if self.spectra.len() > 1 {
            let i_frame = self.split_point(y);
            self.set_position_for_frame(i_frame);
            self.moved_to = if self.n_split > 1 {
                Some(i_frame)
            } else {
                self.selected
            };
            if let Some(i) = self.moved_to {
                self.set_scale(i);
            }
        }
        self.in_plot_move = self.is_in_plot_region(x, y);
        self.x_pixel_moved_to = if self.in_plot_move { x } else { -1 };
        if self.in_plot_move {
            self.x_value_moved_to = self.to_x(x);
        }
        if self.integral_drag {
            return;
        }
        if self.pending_measurement.is_some() {
            self.process_pending_measurement(spectra, x, y, 0);
            return;
        }
        let pos = self.fixed_selected();
        self.selected_measurement = None;
        self.selected_integral = None;
        if !self.in_plot_move {
            return;
        }
        self.selected_measurement = self
            .find_measurement(pos, x, y, HitPart::Any)
            .map(|k| (pos, k));
        if self.selected_measurement.is_none() {
            self.selected_integral = self
                .find_integral(pos, x, y, HitPart::Any)
                .or_else(|| self.find_integral(pos, x, y, HitPart::Label))
                .map(|k| (pos, k));
        }
    }

    /// Arrow and stacked-spectrum selection shared by press and click.
    /// Returns true when the event was consumed.
    fn check_spectrum_clicked(&mut self, spectra: &[Spectrum], x: i32, y: i32, click_count: u32) -> bool {
        if click_count > 0 && self.check_arrow_left_right(x, y) {
            return true;
        }
        if click_count > 1 || self.pending_measurement.is_some() || !self.is_in_plot_region(x, y) {
            return false;
        }
        if click_count == 0 {
            let pos = self.fixed_selected();
            let on_integral = self.is_on_spectrum(spectra, x, y, None)
                || self.find_integral(pos, x, y, HitPart::Any).is_some();
            self.integral_drag |= on_integral;
        }
        if !self.show_all_stacked {
            return false;
        }
        for i in 0..self.spectra.len() {
            if self.is_on_spectrum(spectra, x, y, Some(i)) {
                let is_new = Some(i) != self.selected;
                self.set_spectrum_clicked(Some(i));
                return is_new;
            }
        }
        self.set_spectrum_clicked(None);
        false
    }

    fn check_arrow_left_right(&mut self, x: i32, y: i32) -> bool {
        if !self.have_left_right_arrows() {
            return false;
        }
        let n = self.spectra.len() as i32;
        let dx = if self.is_arrow_click(x, y, Arrow::Left) {
            -1
        } else if self.is_arrow_click(x, y, Arrow::Right) {
            1
        } else {
            0
        };
        if dx != 0 {
            let cur = self.selected.map_or(-1, |i| i as i32);
            let next = (cur + dx).rem_euclid(n) as usize;
            self.set_spectrum_clicked(Some(next));
            return true;
        }
        if self.is_arrow_click(x, y, Arrow::Home) {
            if self.show_all_stacked {
                self.show_all_stacked = false;
                let i = self.fixed_selected();
                self.set_spectrum_clicked(Some(i));
            } else {
                self.show_all_stacked = self.allow_stacking;
                self.selected = None;
                self.events.push(ViewEvent::SpectrumSelected(None));
            }
            return true;
        }
        false
    }

    fn check_arrow_up_down(&mut self, spectra: &[Spectrum], x: i32, y: i32) -> bool {
        let f = if self.is_arrow_click(x, y, Arrow::Up) {
            RT2
        } else if self.is_arrow_click(x, y, Arrow::Down) {
            1.0 / RT2
        } else {
            0.0
        };
        if f != 0.0 {
            if self.n_split > 1 {
                self.selected = self.moved_to;
            }
            let spec = self.spec(spectra, self.fixed_selected());
            let f = if spec.y_units.to_ascii_uppercase().contains("TRANSMITTANCE") {
                1.0 / f
            } else {
                f
            };
            self.scale_selected_by(spectra, f);
            return true;
        }
        if self.is_arrow_click(x, y, Arrow::Reset) {
            self.reset_scaling(spectra);
            return true;
        }
        false
    }

    /// Pointer clicked `click_count` times without moving.
    pub fn mouse_clicked(&mut self, spectra: &[Spectrum], x: i32, y: i32, click_count: u32, ctrl: bool) {
        if self.check_spectrum_clicked(spectra, x, y, click_count) {
            return;
        }
        self.selected_measurement = None;
        self.selected_integral = None;
        if self.check_arrow_up_down(spectra, x, y) {
            return;
        }
        self.last_click_x = f64::NAN;
        if self.is_split_widget(x, y) {
            self.split_stack(self.n_split == 1);
            return;
        }
        if self.pin_selected(x, y).is_some() {
            return;
        }
        let is_2d = self
            .image
            .as_ref()
            .is_some_and(|iv| x == iv.fix_x(x) && y == self.fix_y(y));
        if !is_2d && ctrl {
            if self.pending_measurement.is_some() {
                self.process_pending_measurement(spectra, x, y, -3);
            } else {
                self.process_pending_measurement(spectra, x, y, 3);
            }
            return;
        }
        if click_count == 2 {
            if is_2d {
                self.set_2d_cross_hairs(spectra, x, y);
                return;
            }
            if self.is_in_top_bar(x, y) {
                let x0 = self.to_x0(self.frame.x_pixel0);
                let x1 = self.to_x0(self.frame.x_pixel1);
                let (y0, y1) = (self.axis.min_y, self.axis.max_y);
                self.do_zoom(spectra, x0, y0, x1, y1, true, false);
            } else if self.is_in_right_bar(x, y) {
                let (x0, x1) = (self.view.min_x_on_scale(), self.view.max_x_on_scale());
                let (y0, y1) = (self.base().min_y, self.base().max_y);
                self.do_zoom(spectra, x0, y0, x1, y1, true, false);
            } else if self.is_in_top_bar_2d(x, y) {
                self.reset_2d(spectra, true);
            } else if self.is_in_right_bar_2d(x, y) {
                self.reset_2d(spectra, false);
            } else if self.pending_measurement.is_some() {
                self.process_pending_measurement(spectra, x, y, -2);
            } else {
                self.process_pending_measurement(spectra, x, y, 2);
            }
            return;
        }
        if is_2d {
            self.set_2d_cross_hairs(spectra, x, y);
            return;
        }
        if self.is_in_plot_region(x, y) {
            if self.pending_measurement.is_some() {
                self.process_pending_measurement(spectra, x, y, 1);
                return;
            }
            self.last_click_x = self.to_x(x);
        }
    }

    /// Undo the image zoom along X (also resetting the 1D range) or Y.
    fn reset_2d(&mut self, spectra: &[Spectrum], is_x: bool) {
        let Some(iv) = self.image.as_mut() else {
            return;
        };
        if !is_x {
            iv.reset_view_y();
            return;
        }
        iv.reset_view_x();
        let (x0, x1) = (iv.min_x, iv.max_x);
        let (y0, y1) = (self.axis.min_y, self.axis.max_y);
        self.do_zoom(spectra, x0, y0, x1, y1, true, false);
    }

    fn set_2d_cross_hairs(&mut self, spectra: &[Spectrum], x_pixel: i32, y_pixel: i32) {
        let Some(iv) = self.image.as_ref() else {
            return;
        };
        if x_pixel != iv.fix_x(x_pixel) || y_pixel != self.fix_y(y_pixel) {
            return;
        }
        let xv = iv.to_x(x_pixel);
        let sub = iv.to_subspectrum_index(y_pixel);
        let px = self.to_pixel_x(xv);
        self.widgets.pin_x1.set_x(xv, px);
        self.widgets.cur_2d_x1.set_x(xv, x_pixel);
        self.set_current_subspectrum(spectra, sub);
    }

    // ─── Measurements ──────────────────────────────────────────────────────────

    /// Advance the pending measurement for a pointer event.
    ///
    /// `click_count`: 0 move, 2 double click (start, snapping to a peak or
    /// an existing end point), 3 ctrl-click (start, no snapping), 1 click
    /// (store and continue from the end point), -2 second double click and
    /// -3 second ctrl-click (store and stop).
    pub(crate) fn process_pending_measurement(
        &mut self,
        spectra: &[Spectrum],
        x_pixel: i32,
        y_pixel: i32,
        click_count: i32,
    ) {
        if !self.is_in_plot_region(x_pixel, y_pixel) {
            self.pending_measurement = None;
            return;
        }
        let formatter = self.formatter.clone();
        let x0 = self.to_x(x_pixel);
        let y = self.to_y(y_pixel);
        match click_count {
            0 => {
                let Some(m) = self.pending_measurement.as_mut() else {
                    return;
                };
                let spec = &spectra[m.spectrum];
                m.set_pt2(x0, y, spec, formatter.as_ref());
            }
            2 | 3 => {
                let pos = self.fixed_selected();
                self.set_scale(pos);
                let y = self.to_y(y_pixel);
                let (mut x, mut y) = (x0, y);
                if click_count == 2 {
                    let list = &self.measurements[pos].measurements;
                    if let Some(k) = self.find_measurement(pos, x_pixel, y_pixel, HitPart::Start) {
                        (x, y) = (list[k].x1, list[k].y1);
                    } else if let Some(k) = self.find_measurement(pos, x_pixel, y_pixel, HitPart::End) {
                        (x, y) = (list[k].x2, list[k].y2);
                    } else {
                        x = self.nearest_peak(spectra, x, y);
                    }
                }
                let arena = self.spectra[pos];
                let mut m = Measurement::new(arena, x, y);
                m.set_pt2(x0, y, &spectra[arena], formatter.as_ref());
                self.pending_measurement = Some(m);
            }
            1 | -2 | -3 => {
                let Some(arena) = self.pending_measurement.as_ref().map(|m| m.spectrum) else {
                    return;
                };
                if let Some(pos) = self.position_of(arena) {
                    self.set_scale(pos);
                }
                let mut px = x_pixel;
                if click_count != -3 {
                    if let Some(p) = self.find_nearest_max_min(spectra, arena) {
                        px = p;
                    }
                }
                let (x, y) = (self.to_x(px), self.to_y(y_pixel));
                let Some(mut m) = self.pending_measurement.take() else {
                    return;
                };
                m.set_pt2(x, y, &spectra[arena], formatter.as_ref());
                if m.text.is_empty() {
                    log::debug!("Zero-length measurement discarded");
                    return;
                }
                self.store_measurement(m);
                if click_count == 1 {
                    self.set_spectrum_clicked(self.position_of(arena));
                    self.pending_measurement = Some(Measurement::new(arena, x, y));
                }
            }
            _ => {}
        }
    }

    /// Pixel of the peak nearest the last hovered x, if it is on screen.
    fn find_nearest_max_min(&mut self, spectra: &[Spectrum], arena: usize) -> Option<i32> {
        if self.x_value_moved_to.is_nan() {
            return None;
        }
        let x = spectra[arena].find_x_for_peak_nearest(self.x_value_moved_to);
        let px = self.to_pixel_x(x);
        if px != self.fix_x(px) {
            return None;
        }
        self.x_value_moved_to = x;
        self.x_pixel_moved_to = px;
        Some(px)
    }

    // ─── Keys ──────────────────────────────────────────────────────────────────

    /// Escape (or Delete with `is_del`).
    ///
    /// Always collapses the zoom boxes. Inside the plot it first cancels a
    /// pending measurement; otherwise it drops the active widget and removes
    /// the hovered measurement or integral, or with Delete every one in the
    /// visible range.
    pub fn escape_key_pressed(&mut self, is_del: bool) {
        self.widgets.collapse_zoom_boxes();
        if !self.in_plot_move {
            return;
        }
        if self.pending_measurement.take().is_some() {
            return;
        }
        self.active_widget = None;
        let (x0, x1) = (self.view.min_x_on_scale(), self.view.max_x_on_scale());
        if let Some((pos, k)) = self.selected_measurement.take() {
            let list = &mut self.measurements[pos];
            if is_del {
                list.clear_range(x0, x1);
            } else {
                list.remove(k);
            }
        }
        if let Some((pos, k)) = self.selected_integral.take() {
            if let Some(ig) = self.integrals[pos].as_mut() {
                if is_del {
                    ig.clear_range(x0, x1);
                } else {
                    ig.remove(k);
                }
            }
        }
    }

    pub fn has_pending_measurement(&self) -> bool {
        self.pending_measurement.is_some()
    }

    pub fn selected_measurement(&self) -> Option<(usize, usize)> {
        self.selected_measurement
    }

    pub fn selected_integral(&self) -> Option<(usize, usize)> {
        self.selected_integral
    }
}
