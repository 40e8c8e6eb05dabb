//! End-to-end pointer, key and drawing sequences through the public panel API.

use approx::assert_abs_diff_eq;

use spectral_view::view::{DrawOp, RecordingCanvas};
use spectral_view::{Coordinate, Key, Nucleus, PanelData, SessionLog, Spectrum, Subspectrum, ViewConfig};

/// Lorentzian lines on a 0..10 ppm axis sampled every 0.05 ppm
fn trace(centers: &[f64]) -> Vec<Coordinate> {
    (0..=200)
        .map(|i| {
            let x = i as f64 * 0.05;
            let y = centers
                .iter()
                .map(|c| 1.0 / (1.0 + ((x - c) * 10.0).powi(2)))
                .sum();
            Coordinate::new(x, y)
        })
        .collect()
}

fn proton(title: &str, centers: &[f64]) -> Spectrum {
    Spectrum::nmr(title, Nucleus::H1, 400.0, trace(centers))
}

fn hsqc() -> Spectrum {
    let rows = (0..8)
        .map(|r| Subspectrum {
            y2d: 10.0 * r as f64,
            coords: trace(&[2.0 + r as f64 * 0.5]),
        })
        .collect();
    Spectrum::two_d("hsqc", Nucleus::H1, 400.0, rows)
}

fn panel(spectra: Vec<Spectrum>) -> PanelData {
    let mut p = PanelData::new(spectra, ViewConfig::default()).unwrap();
    p.set_size(600, 440);
    p
}

fn operations(log: &SessionLog, name: &str) -> usize {
    log.entries.iter().filter(|e| e.operation == name).count()
}

#[test]
fn test_drag_zoom_then_page_back() {
    let mut p = panel(vec![proton("a", &[2.0, 5.0, 8.0])]);
    let (full_min, full_max) = (p.current_set().view().min_x(), p.current_set().view().max_x());
    let xa = p.current_set().to_x(150);
    let xb = p.current_set().to_x(350);

    p.mouse_pressed(150, 100, false);
    p.mouse_dragged(250, 200);
    p.mouse_dragged(350, 250);
    p.mouse_released();

    let gs = p.current_set();
    assert_eq!(gs.history_len(), 2);
    assert_eq!(gs.current_zoom_index(), 1);
    assert_abs_diff_eq!(gs.view().min_x(), xa.min(xb), epsilon = 0.1);
    assert_abs_diff_eq!(gs.view().max_x(), xa.max(xb), epsilon = 0.1);
    assert_eq!(operations(p.session(), "Zoom"), 1);

    p.key_pressed(Key::PageUp);
    let gs = p.current_set();
    assert_eq!(gs.current_zoom_index(), 0);
    assert_eq!(gs.view().min_x(), full_min);
    assert_eq!(gs.view().max_x(), full_max);
    assert_eq!(operations(p.session(), "View"), 1);
}

#[test]
fn test_tiny_drag_leaves_history_alone() {
    let mut p = panel(vec![proton("a", &[2.0, 5.0])]);
    p.mouse_pressed(200, 100, false);
    p.mouse_dragged(202, 180);
    p.mouse_released();
    assert_eq!(p.current_set().history_len(), 1);
    assert!(p.session().is_empty());
}

#[test]
fn test_drag_zoom_in_one_set_links_the_other() {
    let mut p = panel(vec![proton("a", &[2.0, 5.0]), hsqc()]);
    p.mouse_pressed(150, 60, false);
    p.mouse_dragged(350, 120);
    p.mouse_released();

    assert_eq!(p.current_index(), 0);
    let (top, bottom) = (&p.graph_sets()[0], &p.graph_sets()[1]);
    assert_eq!(top.history_len(), 2);
    assert_eq!(bottom.history_len(), 2);
    assert_abs_diff_eq!(bottom.view().min_x(), top.view().min_x(), epsilon = 0.051);
    assert_abs_diff_eq!(bottom.view().max_x(), top.view().max_x(), epsilon = 0.051);
    assert_eq!(operations(p.session(), "Zoom"), 2);
}

#[test]
fn test_draw_covers_every_set() {
    let mut p = panel(vec![proton("a", &[2.0]), hsqc()]);
    let mut canvas = RecordingCanvas::new();
    p.draw(&mut canvas);

    assert!(matches!(canvas.ops.first(), Some(DrawOp::Color(_))));
    assert_eq!(canvas.ops.get(1), Some(&DrawOp::FillBox(0, 0, 600, 440)));
    let texts = canvas.texts();
    assert!(texts.contains(&"a"));
    assert!(texts.contains(&"hsqc"));
    assert_eq!(canvas.count(|op| matches!(op, DrawOp::Image(..))), 1);
    assert!(!p.needs_repaint());
}

#[test]
fn test_peaks_and_integral_marks() {
    let mut p = panel(vec![proton("a", &[2.0, 5.0, 8.0])]);
    let n = p.with_current(|gs, spectra| gs.set_peak_list(spectra, None));
    assert_eq!(n, 3);
    p.with_current(|gs, spectra| gs.add_integral_marks(spectra, "1.5-2.5, 4.5-5.5"));

    let gs = p.current_set();
    assert_eq!(gs.peak_list(0).map(|pl| pl.len()), Some(3));
    assert_eq!(gs.integrals(0).map(|ig| ig.len()), Some(2));
    assert_eq!(operations(p.session(), "Peak list"), 1);
}

#[test]
fn test_split_stack_round_trip() {
    let mut p = panel(vec![proton("a", &[2.0]), proton("b", &[5.0]), proton("c", &[8.0])]);
    p.split_stack(true);
    assert_eq!(p.current_set().n_split(), 3);
    p.split_stack(false);
    assert_eq!(p.current_set().n_split(), 1);
    assert_eq!(operations(p.session(), "Split/stack"), 2);
}

#[test]
fn test_session_log_exports() {
    let mut p = panel(vec![proton("a", &[2.0, 5.0])]);
    p.zoom(1.0, 0.0, 6.0, 1.0);
    p.key_pressed(Key::Home);

    let text = p.session().to_text();
    assert!(text.contains("Zoom"));
    let json = p.session().to_json().unwrap();
    let parsed: SessionLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), p.session().len());
}
