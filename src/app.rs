/// Demo application: a spectral panel in an eframe window
///
/// Builds a panel from synthetic spectra, draws it through the egui canvas,
/// and forwards pointer and keyboard input to the panel.
use spectral_view::data::{Coordinate, Nucleus, Spectrum, Subspectrum};
use spectral_view::view::Key;
use spectral_view::{PanelData, ViewConfig};

use crate::gui::egui_canvas::EguiCanvas;
use crate::gui::theme::{self, AppTheme, ThemeColors};

const N_POINTS: usize = 2048;
const PPM_LOW: f64 = 0.0;
const PPM_HIGH: f64 = 10.0;

fn lorentzian(x: f64, center: f64, width: f64, height: f64) -> f64 {
    let d = (x - center) / width;
    height / (1.0 + d * d)
}

/// A ppm trace made of Lorentzian lines `(center, width, height)`
fn synthetic_trace(lines: &[(f64, f64, f64)]) -> Vec<Coordinate> {
    let step = (PPM_HIGH - PPM_LOW) / (N_POINTS - 1) as f64;
    let xs: Vec<f64> = (0..N_POINTS).map(|i| PPM_LOW + i as f64 * step).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| lines.iter().map(|&(c, w, h)| lorentzian(x, c, w, h)).sum())
        .collect();
    Coordinate::from_xy(&xs, &ys)
}

/// Lines of a first-order multiplet with Pascal-triangle intensities
fn multiplet(center: f64, n_lines: usize, j_ppm: f64, height: f64) -> Vec<(f64, f64, f64)> {
    let mut weights = vec![1.0_f64];
    for _ in 1..n_lines {
        let mut next = vec![1.0; weights.len() + 1];
        for k in 1..weights.len() {
            next[k] = weights[k - 1] + weights[k];
        }
        weights = next;
    }
    let max = weights.iter().cloned().fold(1.0, f64::max);
    let first = center - j_ppm * (n_lines - 1) as f64 / 2.0;
    weights
        .iter()
        .enumerate()
        .map(|(k, w)| (first + k as f64 * j_ppm, 0.004, height * w / max))
        .collect()
}

pub fn demo_spectra() -> Vec<Spectrum> {
    let ethanol: Vec<_> = [
        multiplet(1.22, 3, 0.0175, 9.0),
        multiplet(3.69, 4, 0.0175, 6.0),
        vec![(2.61, 0.01, 3.0)],
    ]
    .concat();
    let ethyl_acetate: Vec<_> = [
        multiplet(1.26, 3, 0.018, 9.0),
        vec![(2.04, 0.004, 10.0)],
        multiplet(4.12, 4, 0.018, 6.0),
    ]
    .concat();
    let toluene: Vec<_> = [
        vec![(2.36, 0.004, 10.0)],
        multiplet(7.17, 3, 0.02, 4.0),
        multiplet(7.25, 3, 0.02, 6.0),
    ]
    .concat();

    let hsqc_rows = (0..64)
        .map(|r| {
            let carbon = 10.0 + r as f64 * 1.0;
            let mut lines = Vec::new();
            for &(h, c) in &[(1.22, 18.0), (3.69, 58.0), (2.04, 21.0), (4.12, 60.0)] {
                let dc = (carbon - c) / 1.5;
                lines.push((h, 0.02, 10.0 / (1.0 + dc * dc)));
            }
            Subspectrum {
                y2d: carbon,
                coords: synthetic_trace(&lines),
            }
        })
        .collect();

    vec![
        Spectrum::nmr("Ethanol", Nucleus::H1, 400.0, synthetic_trace(&ethanol)),
        Spectrum::nmr("Ethyl acetate", Nucleus::H1, 400.0, synthetic_trace(&ethyl_acetate)),
        Spectrum::nmr("Toluene", Nucleus::H1, 400.0, synthetic_trace(&toluene)),
        Spectrum::two_d("1H-13C HSQC", Nucleus::H1, 400.0, hsqc_rows),
    ]
}

pub struct SpectralViewApp {
    panel: Option<PanelData>,
    theme: AppTheme,
    config: ViewConfig,
    texture: Option<egui::TextureHandle>,
    status_message: String,
    cursor_x: Option<f64>,
}

impl SpectralViewApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = AppTheme::Light;
        theme::apply_theme(&cc.egui_ctx, theme);

        let mut config = ViewConfig::default();
        config.colors = theme.plot_colors();

        let (panel, status_message) = match PanelData::new(demo_spectra(), config.clone()) {
            Ok(panel) => {
                let n = panel.graph_sets().len();
                (Some(panel), format!("Loaded demo spectra into {} graph sets", n))
            }
            Err(e) => {
                log::error!("Cannot build panel: {}", e);
                (None, format!("Error: {}", e))
            }
        };

        Self {
            panel,
            theme,
            config,
            texture: None,
            status_message,
            cursor_x: None,
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.next();
        theme::apply_theme(ctx, self.theme);
        self.config.colors = self.theme.plot_colors();
        if let Some(panel) = self.panel.as_mut() {
            panel.set_config(self.config.clone());
        }
    }

    fn save_session_log(&mut self) {
        let Some(panel) = self.panel.as_ref() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("session_log.txt")
            .add_filter("Text", &["txt"])
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let result = if is_json {
            panel.session().save_json(&path)
        } else {
            panel.session().save_text(&path)
        };
        self.status_message = match result {
            Ok(()) => format!("Session log saved to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save session log: {}", e);
                format!("Error: {}", e)
            }
        };
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        ui.horizontal(|ui| {
            if ui.button(self.theme.label()).clicked() {
                self.toggle_theme(&ctx);
            }
            ui.separator();
            let Some(panel) = self.panel.as_mut() else {
                return;
            };
            let split = panel.current_set().n_split() > 1;
            if ui.button(if split { "Stack" } else { "Split" }).clicked() {
                panel.split_stack(!split);
            }
            if ui.button("◀ Previous").clicked() {
                panel.key_pressed(Key::PageUp);
            }
            if ui.button("Next ▶").clicked() {
                panel.key_pressed(Key::PageDown);
            }
            if ui.button("Reset view").clicked() {
                panel.key_pressed(Key::Home);
            }
            ui.separator();
            if ui.button("Peaks").clicked() {
                let n = panel.with_current(|gs, spectra| gs.set_peak_list(spectra, None));
                self.status_message = format!("{} peaks found", n);
            }
            if ui.button("∫ Integrate").clicked() {
                panel.with_current(|gs, spectra| {
                    let on = gs.integrals(gs.fixed_selected()).is_none();
                    gs.set_integration(spectra, on);
                });
            }
            ui.separator();
            if ui.button("Save log…").clicked() {
                self.save_session_log();
            }
        });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let colors = ThemeColors::from_theme(self.theme);
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&self.status_message).color(colors.status_text));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(panel) = self.panel.as_ref() {
                    ui.label(
                        egui::RichText::new(format!("{} operations", panel.session().len()))
                            .color(colors.text_muted),
                    );
                }
                if let Some(x) = self.cursor_x {
                    ui.label(egui::RichText::new(format!("x = {:.4}", x)).color(colors.accent));
                }
            });
        });
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, origin: egui::Pos2) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let to_panel = |p: egui::Pos2| ((p.x - origin.x) as i32, (p.y - origin.y) as i32);
        let ctrl = ui.input(|i| i.modifiers.command);

        if response.drag_started() {
            if let Some(p) = response.interact_pointer_pos() {
                let (x, y) = to_panel(p);
                panel.mouse_pressed(x, y, ctrl);
            }
        } else if response.dragged() {
            if let Some(p) = response.interact_pointer_pos() {
                let (x, y) = to_panel(p);
                panel.mouse_dragged(x, y);
            }
        }
        if response.drag_stopped() {
            panel.mouse_released();
        }

        if response.clicked() || response.double_clicked() {
            if let Some(p) = response.interact_pointer_pos() {
                let (x, y) = to_panel(p);
                let count = if response.double_clicked() { 2 } else { 1 };
                panel.mouse_pressed(x, y, ctrl);
                panel.mouse_released();
                panel.mouse_clicked(x, y, count, ctrl);
            }
        }

        self.cursor_x = None;
        if let Some(p) = response.hover_pos() {
            let (x, y) = to_panel(p);
            if !response.dragged() {
                panel.mouse_moved(x, y);
            }
            let set = panel.current_set();
            if set.is_in_plot_region(x, y) {
                self.cursor_x = Some(set.to_x(x));
            }
        }

        if response.hovered() {
            let keys = [
                (egui::Key::Escape, Key::Escape),
                (egui::Key::Delete, Key::Delete),
                (egui::Key::ArrowLeft, Key::Left),
                (egui::Key::ArrowRight, Key::Right),
                (egui::Key::ArrowUp, Key::Up),
                (egui::Key::ArrowDown, Key::Down),
                (egui::Key::PageUp, Key::PageUp),
                (egui::Key::PageDown, Key::PageDown),
                (egui::Key::Home, Key::Home),
            ];
            for (egui_key, key) in keys {
                if ui.input(|i| i.key_pressed(egui_key)) {
                    panel.key_pressed(key);
                }
            }
        }
    }
}

impl eframe::App for SpectralViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let colors = ThemeColors::from_theme(self.theme);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::default().fill(colors.status_bar_bg).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_status_bar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
            let origin = rect.min;

            if let Some(panel) = self.panel.as_mut() {
                panel.set_size(rect.width() as i32, rect.height() as i32);
            }
            self.handle_input(ui, &response, origin);

            if let Some(panel) = self.panel.as_mut() {
                let painter = ui.painter_at(rect);
                let mut canvas = EguiCanvas::new(&painter, origin, &self.config.colors, &mut self.texture);
                panel.draw(&mut canvas);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("No spectra loaded");
                });
            }
        });
    }
}
