/// Panel: the spectra arena, its graph sets, and event routing between them
///
/// Spectra are grouped into graph sets by scale compatibility and the sets
/// are stacked vertically. Pointer events go to the current set (a press
/// first makes the set under the pointer current); committed view changes
/// are drained from the sets into the session log and, for X zooms, pushed
/// to every other set that can be linked in X.
use super::canvas::Canvas;
use super::graph_set::{GraphSet, ViewEvent};
use crate::config::{ColorRole, ViewConfig};
use crate::data::Spectrum;
use crate::error::{Result, ViewError};
use crate::session::SessionLog;

/// Keys the panel reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
}

pub struct PanelData {
    spectra: Vec<Spectrum>,
    sets: Vec<GraphSet>,
    current: usize,
    width: i32,
    height: i32,
    config: ViewConfig,
    session: SessionLog,
    link_in_progress: bool,
    needs_repaint: bool,
}

/// Group arena indices so that every member of a group is scale compatible
/// with every other; each spectrum joins the first group that accepts it.
fn route_spectra(spectra: &[Spectrum]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, spec) in spectra.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|g| g.iter().all(|&j| spectra[j].is_scale_compatible(spec)))
        {
            Some(g) => g.push(i),
            None => groups.push(vec![i]),
        }
    }
    groups
}

impl PanelData {
    pub fn new(spectra: Vec<Spectrum>, config: ViewConfig) -> Result<Self> {
        if spectra.is_empty() {
            return Err(ViewError::NoSpectra);
        }
        let sets = route_spectra(&spectra)
            .into_iter()
            .map(|g| GraphSet::new(g, &spectra, &config))
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "Panel created: {} spectra in {} graph sets",
            spectra.len(),
            sets.len()
        );
        let mut panel = Self {
            spectra,
            sets,
            current: 0,
            width: 0,
            height: 0,
            config,
            session: SessionLog::new(),
            link_in_progress: false,
            needs_repaint: true,
        };
        GraphSet::set_fractional_positions(&mut panel.sets);
        panel.set_current(0);
        Ok(panel)
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }

    pub fn graph_sets(&self) -> &[GraphSet] {
        &self.sets
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_set(&self) -> &GraphSet {
        &self.sets[self.current]
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionLog {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionLog {
        &mut self.session
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    // ─── Geometry and configuration ────────────────────────────────────────────

    pub fn set_size(&mut self, width: i32, height: i32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.layout_sets();
        self.refresh();
    }

    fn layout_sets(&mut self) {
        GraphSet::set_fractional_positions(&mut self.sets);
        let (w, h) = (self.width, self.height);
        for gs in self.sets.iter_mut() {
            gs.set_panel_size(w, h);
        }
    }

    pub fn set_config(&mut self, config: ViewConfig) {
        for gs in self.sets.iter_mut() {
            gs.set_config(&config);
        }
        self.config = config;
        self.layout_sets();
        self.refresh();
    }

    pub fn set_current(&mut self, i: usize) {
        if i >= self.sets.len() {
            return;
        }
        self.current = i;
        for (k, gs) in self.sets.iter_mut().enumerate() {
            gs.set_current(k == i);
        }
    }

    /// Topmost graph set under the pointer
    fn find_graph_set(&self, x: i32, y: i32) -> Option<usize> {
        self.sets.iter().rposition(|gs| gs.has_point(x, y))
    }

    // ─── Repaint ───────────────────────────────────────────────────────────────

    /// Request a repaint. Returns false when one is already pending.
    pub fn refresh(&mut self) -> bool {
        if self.needs_repaint {
            return false;
        }
        self.needs_repaint = true;
        true
    }

    pub fn repaint_done(&mut self) {
        self.needs_repaint = false;
    }

    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.set_color(ColorRole::Background);
        canvas.fill_box(0, 0, self.width, self.height);
        for gs in self.sets.iter_mut() {
            gs.draw_graph(canvas, &self.spectra);
        }
        self.repaint_done();
    }

    // ─── Pointer and keys ──────────────────────────────────────────────────────

    pub fn mouse_pressed(&mut self, x: i32, y: i32, ctrl: bool) {
        if let Some(i) = self.find_graph_set(x, y) {
            self.set_current(i);
        }
        let gs = &mut self.sets[self.current];
        if ctrl && gs.integrals(gs.fixed_selected()).is_none() {
            return;
        }
        gs.mouse_pressed(&self.spectra, x, y, ctrl);
        self.after_event();
    }

    pub fn mouse_dragged(&mut self, x: i32, y: i32) {
        self.sets[self.current].mouse_dragged(&self.spectra, x, y);
        self.after_event();
    }

    pub fn mouse_released(&mut self) {
        self.sets[self.current].mouse_released(&self.spectra);
        self.after_event();
    }

    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        self.sets[self.current].mouse_moved(&self.spectra, x, y);
        self.after_event();
    }

    pub fn mouse_clicked(&mut self, x: i32, y: i32, click_count: u32, ctrl: bool) {
        self.sets[self.current].mouse_clicked(&self.spectra, x, y, click_count, ctrl);
        self.after_event();
    }

    /// Returns whether the key was handled.
    pub fn key_pressed(&mut self, key: Key) -> bool {
        let spectra = &self.spectra;
        let gs = &mut self.sets[self.current];
        match key {
            Key::Escape => gs.escape_key_pressed(false),
            Key::Delete => gs.escape_key_pressed(true),
            Key::Left => {
                gs.to_peak(-1);
            }
            Key::Right => {
                gs.to_peak(1);
            }
            Key::Up => gs.scale_selected_by(spectra, std::f64::consts::SQRT_2),
            Key::Down => gs.scale_selected_by(spectra, std::f64::consts::FRAC_1_SQRT_2),
            Key::PageUp => gs.previous_view(),
            Key::PageDown => gs.next_view(),
            Key::Home => gs.reset_view(),
        }
        self.after_event();
        true
    }

    /// Run `f` against the current graph set, then log and propagate what it
    /// committed.
    pub fn with_current<R>(&mut self, f: impl FnOnce(&mut GraphSet, &[Spectrum]) -> R) -> R {
        let r = f(&mut self.sets[self.current], &self.spectra);
        self.after_event();
        r
    }

    pub fn zoom(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        self.with_current(|gs, spectra| gs.zoom(spectra, x1, y1, x2, y2))
    }

    pub fn set_zoom(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.with_current(|gs, spectra| gs.set_zoom(spectra, x1, y1, x2, y2));
    }

    pub fn split_stack(&mut self, do_split: bool) {
        self.with_current(|gs, _| gs.split_stack(do_split));
    }

    pub fn set_reverse_plot(&mut self, reverse: bool) {
        self.config.display.reverse_plot = reverse;
        for gs in self.sets.iter_mut() {
            gs.set_reverse_plot(&self.spectra, reverse);
        }
        self.refresh();
    }

    // ─── Event drain ───────────────────────────────────────────────────────────

    fn after_event(&mut self) {
        let events = self.sets[self.current].take_events();
        let mut relayout = false;
        for event in &events {
            self.session.record(self.current, event);
            match *event {
                ViewEvent::SplitChanged { .. } => relayout = true,
                ViewEvent::Zoomed { min_x, max_x } => self.link_zoom(min_x, max_x),
                _ => {}
            }
        }
        if relayout {
            self.layout_sets();
        }
        self.refresh();
    }

    /// Push an X range committed on the current set to every set linkable
    /// with it.
    fn link_zoom(&mut self, min_x: f64, max_x: f64) {
        if !self.config.display.link_x_zoom || self.link_in_progress || self.sets.len() < 2 {
            return;
        }
        self.link_in_progress = true;
        let head = self.sets[self.current].spectrum_indices()[0];
        for (k, gs) in self.sets.iter_mut().enumerate() {
            if k == self.current {
                continue;
            }
            let other = gs.spectrum_indices()[0];
            if !self.spectra[head].is_linkable_x(&self.spectra[other]) {
                continue;
            }
            if gs.zoom_x_linked(&self.spectra, min_x, max_x) {
                log::debug!("Linked zoom applied to graph set {}", k);
            }
            for event in gs.take_events() {
                self.session.record(k, &event);
            }
        }
        self.link_in_progress = false;
    }
}
