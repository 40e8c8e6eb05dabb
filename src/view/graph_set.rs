/// Graph set: spectra sharing one X axis, one zoom history and one plot region
///
/// A set refers to its spectra by index into the panel's arena, so every
/// operation that reads samples takes the arena as `spectra`. The set owns
/// its view history, its pin widgets and the per-spectrum analyses (peak
/// lists, integrals, measurements, annotations).
///
/// Pixel geometry is recomputed per split slice with
/// [`GraphSet::set_position_for_frame`]; all pixel/data transforms read the
/// frame and the axis scale of the spectrum last made current.
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::image_view::ImageView;
use super::scale::ScaleData;
use super::view_data::{ScaleTarget, ViewData};
use super::widget::{WidgetKind, Widgets};
use crate::analysis::{
    DefaultFormatter, IntegralData, Measurement, MeasurementData, MeasurementFormatter, PeakData,
};
use crate::config::ViewConfig;
use crate::data::{coordinate, Spectrum};
use crate::error::{Result, ViewError};

mod draw;
mod events;

pub use events::is_on_line;

/// Panel height kept free below the stacked frames
const MARGIN_RESERVE: i32 = 40;

/// Fraction of the plot width given to a 2D image
const IMAGE_WIDTH_FRACTION: f64 = 0.6;

// ─── Types ─────────────────────────────────────────────────────────────────────

/// Pixel layout of one split slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x_pixel00: i32,
    pub x_pixel11: i32,
    pub y_pixel000: i32,
    pub y_pixel00: i32,
    pub y_pixel11: i32,
    pub x_pixel0: i32,
    pub x_pixel1: i32,
    /// Right edge of the plot before a 2D image claims its share
    pub x_pixel10: i32,
    pub y_pixel0: i32,
    pub y_pixel1: i32,
    pub x_pixels0: i32,
    pub x_pixels: i32,
    pub y_pixels: i32,
}

/// A text label pinned to a data point of one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Position of the spectrum within its graph set
    pub spectrum: usize,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Committed state changes, drained by the panel for the session log and
/// for linked zooming.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Zoomed { min_x: f64, max_x: f64 },
    ViewMoved { index: usize },
    ViewsCleared,
    SplitChanged { n_split: usize },
    Scaled { factor: f64 },
    ScalesReset,
    SpectrumSelected(Option<usize>),
    PeaksComputed { spectrum: usize, count: usize },
    IntegralAdded { spectrum: usize, x1: f64, x2: f64 },
    MeasurementStored { spectrum: usize, text: String },
    AnnotationAdded { text: String },
}

// ─── GraphSet ──────────────────────────────────────────────────────────────────

pub struct GraphSet {
    spectra: Vec<usize>,
    config: ViewConfig,
    formatter: Rc<dyn MeasurementFormatter>,

    width: i32,
    height: i32,
    f_x0: f64,
    f_y0: f64,
    frac_y: f64,
    frame: Frame,
    n_split: usize,
    show_all_stacked: bool,
    allow_stacking: bool,
    selected: Option<usize>,
    moved_to: Option<usize>,
    i_this_scale: usize,
    draw_x_left_to_right: bool,
    is_current: bool,

    history: Vec<ViewData>,
    current_zoom_index: usize,
    view: ViewData,
    axis: ScaleData,

    widgets: Widgets,
    pins_placed: bool,
    active_widget: Option<WidgetKind>,
    image: Option<ImageView>,
    sub_index: usize,

    peaks: Vec<Option<PeakData>>,
    integrals: Vec<Option<IntegralData>>,
    measurements: Vec<MeasurementData>,
    annotations: Vec<Annotation>,
    pending_measurement: Option<Measurement>,
    /// (spectrum position, measurement index) under the pointer
    selected_measurement: Option<(usize, usize)>,
    /// (spectrum position, region index) under the pointer
    selected_integral: Option<(usize, usize)>,
    integral_drag: bool,
    in_plot_move: bool,
    x_pixel_moved_to: i32,
    x_value_moved_to: f64,
    last_click_x: f64,
    events: Vec<ViewEvent>,
}

impl GraphSet {
    /// Build a set over the arena entries `indices`.
    ///
    /// Fails when the list is empty, an index is out of range, a spectrum has
    /// no samples, or two spectra cannot share an X scale.
    pub fn new(indices: Vec<usize>, spectra: &[Spectrum], config: &ViewConfig) -> Result<Self> {
        let first = *indices.first().ok_or(ViewError::NoSpectra)?;
        let head = spectra.get(first).ok_or(ViewError::SpectrumIndex(first))?;
        let mut refs = Vec::with_capacity(indices.len());
        for &i in &indices {
            let spec = spectra.get(i).ok_or(ViewError::SpectrumIndex(i))?;
            if spec.coords.is_empty() {
                return Err(ViewError::EmptySpectrum(spec.title.clone()));
            }
            if !head.is_scale_compatible(spec) {
                log::warn!(
                    "Spectrum '{}' cannot share a graph set with '{}'",
                    spec.title,
                    head.title
                );
                return Err(ViewError::ScalesIncompatible {
                    first: head.title.clone(),
                    other: spec.title.clone(),
                });
            }
            refs.push(spec);
        }

        let mut view = ViewData::full(&refs, config.zoom.x_divisions, config.zoom.y_divisions);
        let mut image = ImageView::for_spectrum(head, &view);
        if let Some(iv) = image.as_mut() {
            iv.adjust_view(head, &mut view, &config.image);
        }
        let n = indices.len();
        let allow_stacking = head.stackable;
        let axis = view.axis_scale(0);

        log::debug!("Graph set created with {} spectra, first '{}'", n, head.title);

        Ok(Self {
            spectra: indices,
            config: config.clone(),
            formatter: Rc::new(DefaultFormatter),
            width: 0,
            height: 0,
            f_x0: 0.0,
            f_y0: 0.0,
            frac_y: 1.0,
            frame: Frame::default(),
            n_split: 1,
            show_all_stacked: allow_stacking && n > 1,
            allow_stacking,
            selected: None,
            moved_to: None,
            i_this_scale: 0,
            draw_x_left_to_right: head.should_display_x_axis_increasing()
                != config.display.reverse_plot,
            is_current: true,
            history: vec![view.clone()],
            current_zoom_index: 0,
            view,
            axis,
            widgets: Widgets::default(),
            pins_placed: false,
            active_widget: None,
            image,
            sub_index: 0,
            peaks: vec![None; n],
            integrals: vec![None; n],
            measurements: vec![MeasurementData::default(); n],
            annotations: Vec::new(),
            pending_measurement: None,
            selected_measurement: None,
            selected_integral: None,
            integral_drag: false,
            in_plot_move: false,
            x_pixel_moved_to: -1,
            x_value_moved_to: f64::NAN,
            last_click_x: f64::NAN,
            events: Vec::new(),
        })
    }

    pub fn set_config(&mut self, config: &ViewConfig) {
        self.config = config.clone();
        self.refresh_axis();
    }

    pub fn set_formatter(&mut self, formatter: Rc<dyn MeasurementFormatter>) {
        self.formatter = formatter;
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    /// Arena indices of the spectra in this set
    pub fn spectrum_indices(&self) -> &[usize] {
        &self.spectra
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn n_split(&self) -> usize {
        self.n_split
    }

    pub fn show_all_stacked(&self) -> bool {
        self.show_all_stacked
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn current_zoom_index(&self) -> usize {
        self.current_zoom_index
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn view(&self) -> &ViewData {
        &self.view
    }

    /// Axis scale of the spectrum the transforms currently use
    pub fn axis(&self) -> &ScaleData {
        &self.axis
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn active_widget(&self) -> Option<WidgetKind> {
        self.active_widget
    }

    pub fn image(&self) -> Option<&ImageView> {
        self.image.as_ref()
    }

    pub fn sub_index(&self) -> usize {
        self.sub_index
    }

    pub fn peak_list(&self, i: usize) -> Option<&PeakData> {
        self.peaks.get(i).and_then(|p| p.as_ref())
    }

    pub fn integrals(&self, i: usize) -> Option<&IntegralData> {
        self.integrals.get(i).and_then(|p| p.as_ref())
    }

    pub fn measurements(&self, i: usize) -> Option<&MeasurementData> {
        self.measurements.get(i)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn pending_measurement(&self) -> Option<&Measurement> {
        self.pending_measurement.as_ref()
    }

    /// X of the last click inside the plot; NaN when there is none
    pub fn last_click_x(&self) -> f64 {
        self.last_click_x
    }

    pub fn is_integral_drag(&self) -> bool {
        self.integral_drag
    }

    pub fn set_integral_drag(&mut self, on: bool) {
        self.integral_drag = on;
    }

    pub fn set_current(&mut self, is_current: bool) {
        self.is_current = is_current;
    }

    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Selected position, or the first spectrum when none is selected
    pub fn fixed_selected(&self) -> usize {
        self.selected.unwrap_or(0).min(self.spectra.len().saturating_sub(1))
    }

    fn spec<'a>(&self, spectra: &'a [Spectrum], i: usize) -> &'a Spectrum {
        &spectra[self.spectra[i]]
    }

    fn refs<'a>(&self, spectra: &'a [Spectrum]) -> Vec<&'a Spectrum> {
        self.spectra.iter().map(|&i| &spectra[i]).collect()
    }

    /// Samples currently drawn for the spectrum at position `i`
    fn coords<'a>(&self, spectra: &'a [Spectrum], i: usize) -> &'a [coordinate::Coordinate] {
        let spec = self.spec(spectra, i);
        if self.image.is_some() {
            spec.xy_coords(self.sub_index)
        } else {
            &spec.coords
        }
    }

    fn position_of(&self, arena_index: usize) -> Option<usize> {
        self.spectra.iter().position(|&i| i == arena_index)
    }

    // ─── Layout ────────────────────────────────────────────────────────────────

    pub fn set_panel_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.set_position_for_frame(0);
        self.set_widgets(true);
    }

    pub fn set_fractional_position(&mut self, f_y0: f64, frac_y: f64) {
        self.f_y0 = f_y0;
        self.frac_y = frac_y;
    }

    /// Stack sets vertically, each split slice getting an equal share.
    pub fn set_fractional_positions(sets: &mut [GraphSet]) {
        let total: usize = sets.iter().map(|gs| gs.n_split).sum();
        if total == 0 {
            return;
        }
        let f = 1.0 / total as f64;
        let mut y = 0.0;
        for gs in sets.iter_mut() {
            gs.set_fractional_position(y, f);
            y += f * gs.n_split as f64;
        }
    }

    /// Derive the frame and plot rectangle of split slice `i_split`.
    ///
    /// Margins are full at the panel edges and halved between sets. With a
    /// 2D image the image takes the right part of the plot width.
    pub fn set_position_for_frame(&mut self, i_split: usize) {
        let layout = &self.config.layout;
        let (width, height) = (self.width, self.height);
        let marginal = (height - MARGIN_RESERVE) as f64;
        let mut f = Frame {
            x_pixel00: (width as f64 * self.f_x0) as i32,
            y_pixel000: (height as f64 * self.f_y0) as i32,
            ..Frame::default()
        };
        f.x_pixel11 = f.x_pixel00 + width - 1;
        f.y_pixel00 = f.y_pixel000 + (marginal * self.frac_y * i_split as f64) as i32;
        f.y_pixel11 = f.y_pixel00 + (marginal * self.frac_y) as i32 - 1;
        f.x_pixel0 = f.x_pixel00 + layout.left / if f.x_pixel00 == 0 { 1 } else { 2 };
        f.x_pixel1 = f.x_pixel11 - layout.right / if f.x_pixel11 > width - 2 { 1 } else { 2 };
        f.x_pixel10 = f.x_pixel1;
        f.y_pixel0 = f.y_pixel00 + layout.top / if f.y_pixel00 == 0 { 1 } else { 2 };
        f.y_pixel1 = f.y_pixel11 - layout.bottom / if f.y_pixel11 > height - 2 { 1 } else { 2 };
        f.x_pixels0 = f.x_pixel1 - f.x_pixel0 + 1;
        f.x_pixels = f.x_pixels0;
        f.y_pixels = f.y_pixel1 - f.y_pixel0 + 1;
        if let Some(iv) = self.image.as_mut() {
            iv.set_pixel_width_height((IMAGE_WIDTH_FRACTION * f.x_pixels0 as f64) as i32, f.y_pixels);
            iv.set_xy0((f.x_pixel10 - iv.x_pixels).max(0), f.y_pixel0);
            if f.x_pixels0 > 0 {
                let ratio = (f.x_pixels0 - iv.x_pixels) as f64 / f.x_pixels0 as f64;
                f.x_pixels = (ratio * f.x_pixels0 as f64 * 0.8).floor() as i32;
                f.x_pixel1 = f.x_pixel0 + f.x_pixels - 1;
            }
        }
        self.frame = f;
    }

    /// Bottom pixel of the whole set, all split slices included
    fn set_bottom(&self) -> i32 {
        let marginal = (self.height - MARGIN_RESERVE) as f64;
        self.frame.y_pixel000 + (marginal * self.frac_y * self.n_split as f64) as i32 - 1
    }

    pub fn has_point(&self, x_pixel: i32, y_pixel: i32) -> bool {
        x_pixel >= self.frame.x_pixel00
            && x_pixel <= self.frame.x_pixel11
            && y_pixel >= self.frame.y_pixel000
            && y_pixel <= self.set_bottom()
    }

    pub fn is_in_plot_region(&self, x_pixel: i32, y_pixel: i32) -> bool {
        x_pixel >= self.frame.x_pixel0
            && x_pixel <= self.frame.x_pixel1
            && y_pixel >= self.frame.y_pixel0
            && y_pixel <= self.frame.y_pixel1
    }

    /// Split slice under `y_pixel`.
    pub fn split_point(&self, y_pixel: i32) -> usize {
        let h = self.frame.y_pixel11 - self.frame.y_pixel00;
        if h <= 0 {
            return 0;
        }
        let i = ((y_pixel - self.frame.y_pixel000) / h).max(0) as usize;
        i.min(self.n_split - 1)
    }

    pub fn is_splittable(&self) -> bool {
        self.spectra.len() > 1
    }

    pub(crate) fn is_split_widget(&self, x_pixel: i32, y_pixel: i32) -> bool {
        let f = &self.frame;
        self.is_splittable()
            && x_pixel >= f.x_pixel11 - 20
            && x_pixel <= f.x_pixel11 - 10
            && y_pixel >= f.y_pixel00 + 1
            && y_pixel <= f.y_pixel00 + 11
    }

    pub(crate) fn is_in_top_bar(&self, x_pixel: i32, y_pixel: i32) -> bool {
        x_pixel == self.fix_x(x_pixel)
            && y_pixel > self.widgets.pin_x0.y_pixel0 - 2
            && y_pixel < self.widgets.pin_x0.y_pixel1
    }

    /// The Y-pin band right of the plot.
    pub(crate) fn is_in_right_bar(&self, x_pixel: i32, y_pixel: i32) -> bool {
        y_pixel == self.fix_y(y_pixel) && x_pixel > self.frame.x_pixel1 && x_pixel < self.frame.x_pixel1 + 5
    }

    pub(crate) fn is_in_top_bar_2d(&self, x_pixel: i32, y_pixel: i32) -> bool {
        self.image.as_ref().is_some_and(|iv| x_pixel == iv.fix_x(x_pixel))
            && y_pixel > self.widgets.pin_x0.y_pixel0 - 2
            && y_pixel < self.widgets.pin_x0.y_pixel1
    }

    pub(crate) fn is_in_right_bar_2d(&self, x_pixel: i32, y_pixel: i32) -> bool {
        y_pixel == self.fix_y(y_pixel)
            && self
                .image
                .as_ref()
                .is_some_and(|iv| x_pixel > iv.x_pixel1 && x_pixel < iv.x_pixel1 + 5)
    }

    /// Left/right/home arrows only cycle a stacked, unsplit current set.
    pub fn have_left_right_arrows(&self) -> bool {
        self.spectra.len() > 1 && self.n_split == 1 && self.is_current
    }

    // ─── Transforms ────────────────────────────────────────────────────────────

    /// Make spectrum `i` the one whose Y axis the transforms use.
    pub fn set_scale(&mut self, i: usize) {
        self.i_this_scale = i.min(self.spectra.len().saturating_sub(1));
        self.axis = self.view.axis_scale(self.i_this_scale);
    }

    fn refresh_axis(&mut self) {
        self.axis = self.view.axis_scale(self.i_this_scale);
    }

    fn x_factor(&self) -> f64 {
        self.axis.x_factor(self.frame.x_pixels)
    }

    fn y_factor(&self) -> f64 {
        self.axis.y_factor(self.frame.y_pixels)
    }

    fn base(&self) -> &ScaleData {
        self.history[0].scale(self.i_this_scale)
    }

    pub fn is_x_left_to_right(&self) -> bool {
        self.draw_x_left_to_right
    }

    pub fn fix_x(&self, x_pixel: i32) -> i32 {
        coordinate::into_range(x_pixel, self.frame.x_pixel0, self.frame.x_pixel1)
    }

    pub fn fix_y(&self, y_pixel: i32) -> i32 {
        coordinate::into_range(y_pixel, self.frame.y_pixel0, self.frame.y_pixel1)
    }

    pub fn to_pixel_x(&self, x: f64) -> i32 {
        let dx = ((x - self.axis.min_x_on_scale) / self.x_factor()) as i32;
        if self.draw_x_left_to_right {
            self.frame.x_pixel0 + dx
        } else {
            self.frame.x_pixel1 - dx
        }
    }

    pub fn to_x(&self, x_pixel: i32) -> f64 {
        if let Some(iv) = &self.image {
            if iv.is_x_within_range(x_pixel) {
                return iv.to_x(x_pixel);
            }
        }
        let d = (self.frame.x_pixel1 - self.fix_x(x_pixel)) as f64 * self.x_factor();
        if self.draw_x_left_to_right {
            self.axis.max_x_on_scale - d
        } else {
            self.axis.min_x_on_scale + d
        }
    }

    /// X under `x_pixel` against the full-range view.
    pub fn to_x0(&self, x_pixel: i32) -> f64 {
        let base = self.base();
        let factor = (base.max_x_on_scale - base.min_x_on_scale) / self.frame.x_pixels.max(1) as f64;
        let d = (self.frame.x_pixel1 - self.fix_x(x_pixel)) as f64 * factor;
        if self.draw_x_left_to_right {
            base.max_x_on_scale - d
        } else {
            base.min_x_on_scale + d
        }
    }

    pub fn to_pixel_x0(&self, x: f64) -> i32 {
        let base = self.base();
        let factor = (base.max_x_on_scale - base.min_x_on_scale) / self.frame.x_pixels.max(1) as f64;
        let d = if self.draw_x_left_to_right {
            (base.max_x_on_scale - x) / factor
        } else {
            (x - base.min_x_on_scale) / factor
        };
        (self.frame.x_pixel1 as f64 - d) as i32
    }

    /// Pixel row of `y` for the current spectrum; `i32::MIN` for NaN.
    pub fn to_pixel_y(&self, y: f64) -> i32 {
        if y.is_nan() {
            return i32::MIN;
        }
        let a = &self.axis;
        let v = ((y - a.spectrum_y_ref) * a.user_y_factor + a.spectrum_y_ref - a.min_y_on_scale)
            / self.y_factor();
        self.frame.y_pixel1 - v as i32
    }

    /// Pixel row of an integral curve fraction.
    pub fn to_pixel_y_int(&self, y: f64) -> i32 {
        if y.is_nan() {
            return i32::MIN;
        }
        self.frame.y_pixel1 - (self.frame.y_pixels as f64 * y) as i32
    }

    pub fn to_pixel_y0(&self, y: f64) -> i32 {
        let base = self.base();
        let factor = (base.max_y_on_scale - base.min_y_on_scale) / self.frame.y_pixels.max(1) as f64;
        self.fix_y((self.frame.y_pixel0 as f64 + (base.max_y_on_scale - y) / factor) as i32)
    }

    pub fn to_y(&self, y_pixel: i32) -> f64 {
        self.axis.max_y_on_scale + (self.frame.y_pixel0 - y_pixel) as f64 * self.y_factor()
    }

    /// Y under `y_pixel` against the full-range view, clamped to its data.
    pub fn to_y0(&self, y_pixel: i32) -> f64 {
        let base = self.base();
        let factor = (base.max_y_on_scale - base.min_y_on_scale) / self.frame.y_pixels.max(1) as f64;
        let y = base.max_y_on_scale + (self.frame.y_pixel0 - self.fix_y(y_pixel)) as f64 * factor;
        y.min(base.max_y).max(base.min_y)
    }

    // ─── Zoom history ──────────────────────────────────────────────────────────

    /// Zoom to a data rectangle and record it in the history.
    ///
    /// Returns whether the view changed.
    pub fn zoom(&mut self, spectra: &[Spectrum], x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        self.do_zoom(spectra, x1, y1, x2, y2, true, false)
    }

    /// Core zoom.
    ///
    /// With `check_range` the request is clipped to the current view and
    /// dropped if it lies entirely outside it. The request is silently
    /// rejected when zooming is disabled (unless it only changes the 2D gray
    /// range) or any spectrum would keep fewer than the minimum points.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn do_zoom(
        &mut self,
        spectra: &[Spectrum],
        mut init_x: f64,
        mut init_y: f64,
        mut final_x: f64,
        mut final_y: f64,
        add_zoom: bool,
        check_range: bool,
    ) -> bool {
        if init_x > final_x {
            std::mem::swap(&mut init_x, &mut final_x);
        }
        if init_y > final_y {
            std::mem::swap(&mut init_y, &mut final_y);
        }
        let is_gray_change = self
            .image
            .as_ref()
            .is_some_and(|iv| iv.min_z != init_y || iv.max_z != final_y);
        if !self.config.zoom.enabled && !is_gray_change {
            return false;
        }
        if check_range {
            if !self.view.is_in_range_x(init_x) && !self.view.is_in_range_x(final_x) {
                return false;
            }
            if !self.view.is_in_range_x(init_x) {
                init_x = self.view.min_x();
            } else if !self.view.is_in_range_x(final_x) {
                final_x = self.view.max_x();
            }
        }

        let refs = self.refs(spectra);
        let Some(windows) =
            ViewData::data_point_indices(&refs, init_x, final_x, self.config.zoom.min_points)
        else {
            log::warn!(
                "Zoom to [{}, {}] rejected: fewer than {} points",
                init_x,
                final_x,
                self.config.zoom.min_points
            );
            return false;
        };

        let sel = self.fixed_selected();
        let f = if !is_gray_change && self.image.is_none() {
            self.view.spectrum_scale_factor(sel)
        } else {
            1.0
        };
        let (y1, y2) = if f != 1.0 {
            (self.view.un_scale_y(sel, init_y), self.view.un_scale_y(sel, final_y))
        } else {
            (init_y, final_y)
        };
        let view0 = std::mem::replace(
            &mut self.view,
            ViewData::new(
                &refs,
                &windows,
                Some((y1, y2)),
                self.config.zoom.x_divisions,
                self.config.zoom.y_divisions,
            ),
        );
        if init_x != final_x {
            self.view.set_x_range(init_x, final_x);
        }
        self.view.copy_scale_factors(&view0);
        self.refresh_axis();

        let px0 = self.to_pixel_x0(init_x);
        let px1 = self.to_pixel_x0(final_x);
        let py0 = self.to_pixel_y0(init_y);
        let py1 = self.to_pixel_y0(final_y);
        self.widgets.pin_x0.set_x(init_x, px0);
        self.widgets.pin_x1.set_x(final_x, px1);
        self.widgets.pin_y0.set_y(init_y, py0);
        self.widgets.pin_y1.set_y(final_y, py1);

        if let Some(iv) = self.image.as_ref() {
            let fixed = iv.fix_sub_index(self.sub_index as i32).max(0) as usize;
            if fixed != self.sub_index {
                self.sub_index = fixed;
            }
        }
        if is_gray_change {
            if let Some(iv) = self.image.as_mut() {
                iv.set(&self.view);
                iv.update_buffer(&spectra[self.spectra[0]], true);
            }
        }
        if add_zoom {
            self.add_current_zoom();
        }
        true
    }

    /// Push the current view, dropping any views after the current one.
    pub fn add_current_zoom(&mut self) {
        self.history.truncate(self.current_zoom_index + 1);
        self.history.push(self.view.clone());
        self.current_zoom_index += 1;
        log::debug!(
            "Zoom committed to [{}, {}], history {}",
            self.view.min_x(),
            self.view.max_x(),
            self.history.len()
        );
        self.events.push(ViewEvent::Zoomed {
            min_x: self.view.min_x(),
            max_x: self.view.max_x(),
        });
    }

    pub fn set_zoom_to(&mut self, i: usize) {
        if i >= self.history.len() {
            return;
        }
        self.current_zoom_index = i;
        self.view = self.history[i].clone();
        self.refresh_axis();
        self.reset_pins_from_view();
    }

    pub fn previous_view(&mut self) {
        if self.current_zoom_index > 0 {
            self.set_zoom_to(self.current_zoom_index - 1);
            self.events.push(ViewEvent::ViewMoved {
                index: self.current_zoom_index,
            });
        }
    }

    pub fn next_view(&mut self) {
        if self.current_zoom_index + 1 < self.history.len() {
            self.set_zoom_to(self.current_zoom_index + 1);
            self.events.push(ViewEvent::ViewMoved {
                index: self.current_zoom_index,
            });
        }
    }

    /// Back to the full-range view, keeping the history.
    pub fn reset_view(&mut self) {
        self.set_zoom_to(0);
        self.events.push(ViewEvent::ViewMoved { index: 0 });
    }

    pub fn clear_views(&mut self) {
        self.history.truncate(1);
        self.set_zoom_to(0);
        log::debug!("Zoom history cleared");
        self.events.push(ViewEvent::ViewsCleared);
    }

    /// Zoom from the base view.
    ///
    /// A NaN `x1` keeps the full X range and sets Y only; `x1 == x2 == 0`
    /// just resets the pins.
    pub fn set_zoom(&mut self, spectra: &[Spectrum], x1: f64, y1: f64, x2: f64, y2: f64) {
        self.set_zoom_to(0);
        let (x1, x2) = if x1.is_nan() {
            (self.view.min_x(), self.view.max_x())
        } else {
            (x1, x2)
        };
        if x1 == 0.0 && x2 == 0.0 {
            self.new_pins();
        } else {
            self.do_zoom(spectra, x1, y1, x2, y2, true, false);
        }
    }

    /// Apply an X range pushed from a linked set, keeping this set's Y.
    pub fn zoom_x_linked(&mut self, spectra: &[Spectrum], min_x: f64, max_x: f64) -> bool {
        let (y0, y1) = (self.axis.min_y, self.axis.max_y);
        self.do_zoom(spectra, min_x, y0, max_x, y1, true, false)
    }

    // ─── Pins ──────────────────────────────────────────────────────────────────

    fn new_pins(&mut self) {
        let (min_x, max_x) = (self.view.min_x(), self.view.max_x());
        let (min_y, max_y) = (self.axis.min_y, self.axis.max_y);
        self.widgets = Widgets::default();
        let px0 = self.to_pixel_x0(min_x);
        let px1 = self.to_pixel_x0(max_x);
        let py0 = self.to_pixel_y0(min_y);
        let py1 = self.to_pixel_y0(max_y);
        let w = &mut self.widgets;
        w.pin_x0.set_x(min_x, px0);
        w.pin_x1.set_x(max_x, px1);
        w.pin_y0.set_y(min_y, py0);
        w.pin_y1.set_y(max_y, py1);
        self.pins_placed = true;
    }

    fn reset_pins_from_view(&mut self) {
        if !self.pins_placed {
            return;
        }
        let (x0, x1) = (self.view.min_x_on_scale(), self.view.max_x_on_scale());
        let (y0, y1) = (self.axis.min_y, self.axis.max_y);
        let (px0, px1, py0, py1) = (
            self.to_pixel_x0(x0),
            self.to_pixel_x0(x1),
            self.to_pixel_y0(y0),
            self.to_pixel_y0(y1),
        );
        self.widgets.pin_x0.set_x(x0, px0);
        self.widgets.pin_x1.set_x(x1, px1);
        self.widgets.pin_y0.set_y(y0, py0);
        self.widgets.pin_y1.set_y(y1, py1);
    }

    /// Re-place pins from their values after a resize.
    fn reset_pin_positions(&mut self) {
        let w = &self.widgets;
        let (x0, x1, y0, y1) = (w.pin_x0.x, w.pin_x1.x, w.pin_y0.y, w.pin_y1.y);
        let (px0, px1, py0, py1) = (
            self.to_pixel_x0(x0),
            self.to_pixel_x0(x1),
            self.to_pixel_y0(y0),
            self.to_pixel_y0(y1),
        );
        self.widgets.pin_x0.set_x(x0, px0);
        self.widgets.pin_x1.set_x(x1, px1);
        self.widgets.pin_y0.set_y(y0, py0);
        self.widgets.pin_y1.set_y(y1, py1);
    }

    /// Center pins sit between their pins; the 2D cursors follow the X pins.
    fn set_derived_pins(&mut self) {
        let f = self.frame;
        let lo_y = self.to_pixel_y(self.axis.min_y);
        let hi_y = self.to_pixel_y(self.axis.max_y);
        let w = &mut self.widgets;
        let (ax, bx) = (w.pin_x0.x_pixel0, w.pin_x1.x_pixel0);
        let (ay, by) = (w.pin_y0.y_pixel0, w.pin_y1.y_pixel0);
        w.pin_x01.set_x(0.0, (ax + bx) / 2);
        w.pin_y01.set_y(0.0, (ay + by) / 2);
        w.pin_x01.enabled = ax.min(bx) > f.x_pixel0 || ax.max(bx) < f.x_pixel1;
        w.pin_y01.enabled = ay.min(by) > lo_y.min(hi_y) || ay.max(by) < lo_y.max(hi_y);
        if let Some(iv) = &self.image {
            let (x0, x1) = (w.pin_x0.x, w.pin_x1.x);
            w.cur_2d_x0.set_x(x0, iv.to_pixel_x(x0));
            w.cur_2d_x1.set_x(x1, iv.to_pixel_x(x1));
            let py = iv.to_pixel_y(self.sub_index);
            w.cur_2d_y.y_pixel0 = py;
            w.cur_2d_y.y_pixel1 = py;
            w.cur_2d_y.y = self.sub_index as f64;
        }
    }

    /// Slider bands: X pins above the plot, Y pins right of it.
    fn set_pin_slider_positions(&mut self) {
        let f = self.frame;
        let w = &mut self.widgets;
        for p in [&mut w.pin_x0, &mut w.pin_x1, &mut w.pin_x01] {
            p.y_pixel0 = f.y_pixel0 - 5;
            p.y_pixel1 = f.y_pixel0;
        }
        for p in [&mut w.pin_y0, &mut w.pin_y1, &mut w.pin_y01] {
            p.x_pixel0 = f.x_pixel1 + 5;
            p.x_pixel1 = f.x_pixel1;
        }
        if let Some(iv) = &self.image {
            for p in [&mut w.cur_2d_x0, &mut w.cur_2d_x1] {
                p.y_pixel0 = f.y_pixel1 + 15;
                p.y_pixel1 = f.y_pixel0 - 5;
            }
            w.cur_2d_y.x_pixel0 = (f.x_pixel1 + iv.x_pixel0) / 2;
            w.cur_2d_y.x_pixel1 = iv.x_pixel1 + 5;
        }
    }

    pub(crate) fn set_widgets(&mut self, need_new_pins: bool) {
        if need_new_pins {
            if self.pins_placed {
                self.reset_pin_positions();
            } else {
                self.new_pins();
            }
        }
        self.set_derived_pins();
        self.set_pin_slider_positions();
    }

    // ─── Selection, split and stack ────────────────────────────────────────────

    pub fn set_selected(&mut self, i: Option<usize>) {
        let i = i.filter(|&i| i < self.spectra.len());
        self.selected = i;
        if let Some(i) = i {
            self.set_scale(i);
        }
    }

    pub(crate) fn set_spectrum_clicked(&mut self, i: Option<usize>) {
        if i.is_none() || i != self.selected {
            self.last_click_x = f64::NAN;
        }
        self.moved_to = i;
        self.set_selected(i);
        self.events.push(ViewEvent::SpectrumSelected(self.selected));
    }

    /// Split into one slice per spectrum, or merge back into one stacked plot.
    pub fn split_stack(&mut self, do_split: bool) {
        if do_split && self.is_splittable() {
            self.n_split = self.spectra.len();
            self.show_all_stacked = false;
            self.set_spectrum_clicked(Some(0));
        } else {
            self.n_split = 1;
            self.show_all_stacked = self.allow_stacking && !do_split && self.spectra.len() > 1;
            self.set_spectrum_clicked(None);
        }
        Self::set_fractional_positions(std::slice::from_mut(self));
        log::debug!(
            "Split/stack: n_split {}, stacked {}",
            self.n_split,
            self.show_all_stacked
        );
        self.events.push(ViewEvent::SplitChanged {
            n_split: self.n_split,
        });
    }

    pub(crate) fn do_plot(&self, i: usize, i_split: usize) -> bool {
        if self.n_split > 1 {
            i == i_split
        } else {
            self.show_all_stacked || self.selected.is_none() || self.selected == Some(i)
        }
    }

    // ─── Scaling ───────────────────────────────────────────────────────────────

    /// Scale every spectrum's Y display by `f`.
    pub fn scale_y_by(&mut self, f: f64) {
        self.apply_scale(ScaleTarget::All, f);
    }

    /// Scale the selected spectrum, or the 2D intensity range when an image
    /// is shown.
    pub fn scale_selected_by(&mut self, spectra: &[Spectrum], f: f64) {
        let target = if self.image.is_some() {
            ScaleTarget::TwoD
        } else {
            match self.selected {
                Some(i) => ScaleTarget::Spectrum(i),
                None if self.spectra.len() == 1 => ScaleTarget::Spectrum(0),
                None => ScaleTarget::All,
            }
        };
        self.apply_scale(target, f);
        if self.image.is_some() {
            self.update_2d_image(spectra);
        }
    }

    fn apply_scale(&mut self, target: ScaleTarget, f: f64) {
        self.view.scale_spectrum(target, f);
        if let Some(v) = self.history.get_mut(self.current_zoom_index) {
            v.scale_spectrum(target, f);
        }
        self.refresh_axis();
        self.reset_pins_from_view();
        self.events.push(ViewEvent::Scaled { factor: f });
    }

    /// Clear the history and every scale factor.
    pub fn reset_scaling(&mut self, spectra: &[Spectrum]) {
        self.clear_views();
        self.view.set_scale_factor(None, 1.0);
        if let Some(v) = self.history.first_mut() {
            v.set_scale_factor(None, 1.0);
        }
        self.refresh_axis();
        if self.image.is_some() {
            self.update_2d_image(spectra);
            self.reset_pins_from_view();
        }
        self.events.push(ViewEvent::ScalesReset);
    }

    pub fn set_reverse_plot(&mut self, spectra: &[Spectrum], reverse: bool) {
        self.config.display.reverse_plot = reverse;
        self.draw_x_left_to_right =
            self.spec(spectra, 0).should_display_x_axis_increasing() != reverse;
        self.set_widgets(true);
    }

    // ─── 2D image ──────────────────────────────────────────────────────────────

    fn update_2d_image(&mut self, spectra: &[Spectrum]) {
        let head = &spectra[self.spectra[0]];
        if let Some(iv) = self.image.as_mut() {
            iv.set(&self.view);
            iv.update_buffer(head, true);
        }
    }

    /// Show row `i` of the 2D spectrum as the 1D trace.
    pub fn set_current_subspectrum(&mut self, spectra: &[Spectrum], i: usize) {
        let n = self.spec(spectra, 0).subspectrum_count();
        if n > 0 {
            self.sub_index = i.min(n - 1);
        }
    }

    // ─── Peaks, integrals, measurements, annotations ───────────────────────────

    /// Pick peaks of the selected spectrum over the visible range.
    pub fn set_peak_list(&mut self, spectra: &[Spectrum], threshold: Option<f64>) -> usize {
        let i = self.fixed_selected();
        let mut config = self.config.peaks.clone();
        if threshold.is_some() {
            config.threshold = threshold;
        }
        let scale = self.view.axis_scale(i);
        let peaks = PeakData::compute(self.spec(spectra, i), &scale, &config);
        let count = peaks.len();
        self.peaks[i] = Some(peaks);
        self.events.push(ViewEvent::PeaksComputed {
            spectrum: self.spectra[i],
            count,
        });
        count
    }

    pub fn clear_peak_list(&mut self) {
        let i = self.fixed_selected();
        self.peaks[i] = None;
    }

    /// Turn integration of the selected spectrum on or off.
    pub fn set_integration(&mut self, spectra: &[Spectrum], on: bool) {
        let i = self.fixed_selected();
        self.integrals[i] = if on {
            Some(IntegralData::from_spectrum(
                self.spec(spectra, i),
                &self.config.integral,
            ))
        } else {
            None
        };
    }

    /// Add final integral regions from a "x2-x1, ..." list, integrating first
    /// when needed.
    pub fn add_integral_marks(&mut self, spectra: &[Spectrum], marks: &str) {
        let i = self.fixed_selected();
        if self.integrals[i].is_none() {
            self.set_integration(spectra, true);
        }
        if let Some(ig) = self.integrals[i].as_mut() {
            ig.add_marks(marks);
            log::info!("Integral marks '{}' applied, {} regions", marks, ig.len());
        }
    }

    /// Normalize so the selected integral (or the first one) reads `value`.
    pub fn set_selected_integral(&mut self, value: f64) {
        let (i, k) = self
            .selected_integral
            .unwrap_or((self.fixed_selected(), 0));
        if let Some(ig) = self.integrals.get_mut(i).and_then(|ig| ig.as_mut()) {
            ig.set_selected_integral(k, value);
        }
    }

    /// Add a region to the selected spectrum's integral, pending unless final.
    pub(crate) fn check_integral(&mut self, x1: f64, x2: f64, is_final: bool) {
        let i = self.fixed_selected();
        let arena = self.spectra[i];
        let Some(ig) = self.integrals[i].as_mut() else {
            return;
        };
        ig.add_integral_region(x1, x2, is_final);
        let kept = ig
            .regions
            .iter()
            .any(|r| r.min_x() == x1.min(x2) && r.max_x() == x1.max(x2));
        if is_final && kept {
            self.events.push(ViewEvent::IntegralAdded {
                spectrum: arena,
                x1,
                x2,
            });
        }
    }

    pub fn clear_integrals(&mut self) {
        let i = self.fixed_selected();
        if let Some(ig) = self.integrals[i].as_mut() {
            ig.clear();
        }
        self.selected_integral = None;
    }

    pub fn clear_measurements(&mut self) {
        let i = self.fixed_selected();
        self.measurements[i] = MeasurementData::default();
        self.selected_measurement = None;
    }

    pub(crate) fn store_measurement(&mut self, m: Measurement) {
        let Some(i) = self.position_of(m.spectrum) else {
            return;
        };
        log::info!("Measurement stored: {}", m.text);
        self.events.push(ViewEvent::MeasurementStored {
            spectrum: m.spectrum,
            text: m.text.clone(),
        });
        self.measurements[i].push(m);
    }

    pub fn add_annotation(&mut self, x: f64, y: f64, text: &str) {
        self.annotations.push(Annotation {
            spectrum: self.fixed_selected(),
            x,
            y,
            text: text.to_string(),
            offset_x: 0,
            offset_y: 0,
        });
        self.events.push(ViewEvent::AnnotationAdded {
            text: text.to_string(),
        });
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }

    /// Move the click marker to the next peak in `step`'s direction across
    /// the screen. Returns the peak x.
    pub fn to_peak(&mut self, step: i32) -> Option<f64> {
        let step = if self.draw_x_left_to_right { step } else { -step };
        let peaks = self.peaks[self.fixed_selected()].as_ref()?;
        let from = if self.last_click_x.is_nan() {
            0.0
        } else {
            self.last_click_x
        };
        let k = peaks.next_peak(from, step)?;
        let x = peaks.get(k)?.x;
        self.last_click_x = x;
        Some(x)
    }

    /// Nearest x left or right of `x` where the spectrum reaches `y`.
    pub fn nearest_peak(&self, spectra: &[Spectrum], x: f64, y: f64) -> f64 {
        let spec = self.spec(spectra, self.fixed_selected());
        let left = coordinate::nearest_x_with_y_above(&spec.coords, x, y, spec.inverted, false);
        let right = coordinate::nearest_x_with_y_above(&spec.coords, x, y, spec.inverted, true);
        match (left, right) {
            (Some(a), Some(b)) => {
                if (a - x).abs() < (b - x).abs() {
                    a
                } else {
                    b
                }
            }
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => x,
        }
    }

    /// Shift every X-bound object of the set by `dx`.
    pub fn add_spec_shift(&mut self, dx: f64) {
        self.view.add_spec_shift(dx);
        for v in self.history.iter_mut() {
            v.add_spec_shift(dx);
        }
        for ig in self.integrals.iter_mut().flatten() {
            ig.add_spec_shift(dx);
        }
        for m in self.measurements.iter_mut() {
            m.add_spec_shift(dx);
        }
        for a in self.annotations.iter_mut() {
            a.x += dx;
        }
        self.refresh_axis();
        self.reset_pins_from_view();
    }
}

#[cfg(test)]
mod tests;
