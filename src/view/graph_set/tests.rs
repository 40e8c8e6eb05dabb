use approx::assert_abs_diff_eq;

use super::*;
use crate::data::{Coordinate, Nucleus, Subspectrum};
use crate::view::canvas::{DrawOp, RecordingCanvas};

/// Lorentzian lines of height 10 on x = 0..100 in steps of 0.5
fn lines(title: &str, centers: &[f64]) -> Spectrum {
    let coords = (0..=200)
        .map(|i| {
            let x = i as f64 * 0.5;
            let y = centers
                .iter()
                .map(|c| 10.0 / (1.0 + (x - c).powi(2)))
                .sum();
            Coordinate::new(x, y)
        })
        .collect();
    Spectrum::new(title, coords)
}

fn set_over(spectra: &[Spectrum]) -> GraphSet {
    let mut gs = GraphSet::new((0..spectra.len()).collect(), spectra, &ViewConfig::default())
        .expect("compatible spectra");
    gs.set_panel_size(600, 440);
    gs
}

fn x_tolerance(gs: &GraphSet) -> f64 {
    2.0 * gs.x_factor()
}

#[test]
fn test_frame_geometry() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let gs = set_over(&spectra);
    let f = *gs.frame();
    assert_eq!((f.x_pixel0, f.x_pixel1), (60, 549));
    assert_eq!((f.y_pixel0, f.y_pixel1), (30, 374));
    assert_eq!(f.x_pixels, 490);
    assert_eq!(f.y_pixels, 345);
    assert!(gs.is_in_plot_region(300, 200));
    assert!(!gs.is_in_plot_region(20, 200));
    assert!(gs.has_point(20, 200));
}

#[test]
fn test_pixel_round_trip_stays_within_a_pixel() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let gs = set_over(&spectra);
    for x in [3.7, 37.3, 88.1] {
        assert_abs_diff_eq!(gs.to_x(gs.to_pixel_x(x)), x, epsilon = x_tolerance(&gs));
    }
    let yf = gs.y_factor();
    for y in [0.5, 4.2, 9.9] {
        assert_abs_diff_eq!(gs.to_y(gs.to_pixel_y(y)), y, epsilon = 2.0 * yf);
    }
    assert_eq!(gs.to_pixel_y(f64::NAN), i32::MIN);
}

#[test]
fn test_reversed_axis_runs_right_to_left() {
    let spectra = vec![Spectrum::nmr(
        "1H",
        Nucleus::H1,
        400.0,
        lines("", &[3.0]).coords,
    )];
    let gs = set_over(&spectra);
    assert!(!gs.is_x_left_to_right());
    assert!(gs.to_pixel_x(90.0) < gs.to_pixel_x(10.0));
}

#[test]
fn test_new_rejects_bad_input() {
    let ir = lines("ir", &[50.0]);
    let nmr = Spectrum::nmr("1H", Nucleus::H1, 400.0, lines("", &[3.0]).coords);
    let spectra = vec![ir, nmr];
    let config = ViewConfig::default();

    let err = GraphSet::new(vec![0, 1], &spectra, &config).err();
    assert!(matches!(
        err,
        Some(ViewError::ScalesIncompatible { ref first, ref other }) if first == "ir" && other == "1H"
    ));
    assert!(matches!(
        GraphSet::new(vec![], &spectra, &config).err(),
        Some(ViewError::NoSpectra)
    ));
    assert!(matches!(
        GraphSet::new(vec![5], &spectra, &config).err(),
        Some(ViewError::SpectrumIndex(5))
    ));
    let empty = vec![Spectrum::new("empty", Vec::new())];
    assert!(matches!(
        GraphSet::new(vec![0], &empty, &config).err(),
        Some(ViewError::EmptySpectrum(_))
    ));
}

#[test]
fn test_zoom_then_previous_restores_view_exactly() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let original = gs.view().clone();

    assert!(gs.zoom(&spectra, 20.0, 0.0, 60.0, 10.0));
    assert_eq!(gs.history_len(), 2);
    assert_eq!(gs.current_zoom_index(), 1);
    assert_eq!(gs.view().min_x(), 20.0);
    assert_eq!(gs.view().max_x(), 60.0);

    gs.previous_view();
    assert_eq!(gs.current_zoom_index(), 0);
    assert_eq!(gs.view(), &original);

    gs.next_view();
    assert_eq!(gs.view().min_x(), 20.0);
    assert!(gs
        .take_events()
        .contains(&ViewEvent::Zoomed { min_x: 20.0, max_x: 60.0 }));
}

#[test]
fn test_zoom_truncates_forward_history() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.zoom(&spectra, 10.0, 0.0, 90.0, 10.0);
    gs.zoom(&spectra, 20.0, 0.0, 80.0, 10.0);
    gs.previous_view();
    gs.zoom(&spectra, 40.0, 0.0, 50.0, 10.0);
    assert_eq!(gs.history_len(), 3);
    assert_eq!(gs.current_zoom_index(), 2);
    gs.next_view();
    assert_eq!(gs.view().min_x(), 40.0);
}

#[test]
fn test_clear_views_then_next_is_noop() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.zoom(&spectra, 10.0, 0.0, 90.0, 10.0);
    gs.zoom(&spectra, 20.0, 0.0, 80.0, 10.0);
    gs.clear_views();
    assert_eq!(gs.history_len(), 1);
    let base = gs.view().clone();
    gs.next_view();
    assert_eq!(gs.current_zoom_index(), 0);
    assert_eq!(gs.view(), &base);
}

#[test]
fn test_zoom_with_too_few_points_is_rejected() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    assert!(!gs.zoom(&spectra, 10.0, 0.0, 10.4, 10.0));
    assert_eq!(gs.history_len(), 1);
    assert_eq!(gs.view().min_x(), 0.0);
}

#[test]
fn test_small_drag_adds_no_history() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    for ((x0, y0), (x1, y1)) in [((10, 10), (12, 11)), ((200, 200), (202, 201))] {
        gs.mouse_pressed(&spectra, x0, y0, false);
        gs.mouse_dragged(&spectra, x1, y1);
        gs.mouse_released(&spectra);
        assert_eq!(gs.history_len(), 1);
        assert!(gs.widgets().zoom_box_1d.is_collapsed());
    }
}

#[test]
fn test_zoom_box_drag_commits_view() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let x0 = gs.to_x(100);
    let x1 = gs.to_x(300);
    gs.mouse_pressed(&spectra, 100, 100, false);
    assert_eq!(gs.active_widget(), Some(WidgetKind::ZoomBox1D));
    gs.mouse_dragged(&spectra, 300, 250);
    gs.mouse_released(&spectra);
    assert_eq!(gs.history_len(), 2);
    assert_abs_diff_eq!(gs.view().min_x(), x0, epsilon = 1e-9);
    assert_abs_diff_eq!(gs.view().max_x(), x1, epsilon = 1e-9);
    assert_eq!(gs.active_widget(), None);
}

#[test]
fn test_pin_drag_zooms_live_and_commits_on_release() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let pin = gs.widgets().pin_x0.clone();
    gs.mouse_pressed(&spectra, pin.x_pixel0, pin.y_pixel0, false);
    assert_eq!(gs.active_widget(), Some(WidgetKind::Pin1Dx0));

    gs.mouse_dragged(&spectra, 159, pin.y_pixel0);
    assert_eq!(gs.history_len(), 1);
    assert_abs_diff_eq!(gs.view().min_x(), gs.to_x0(159), epsilon = 1e-9);

    gs.mouse_released(&spectra);
    assert_eq!(gs.history_len(), 2);
}

#[test]
fn test_set_zoom_with_nan_x_sets_y_only() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.set_zoom(&spectra, f64::NAN, 2.0, 0.0, 8.0);
    assert_eq!(gs.view().min_x(), 0.0);
    assert_eq!(gs.view().max_x(), 100.0);
    assert_eq!(gs.axis().min_y, 2.0);
    assert_eq!(gs.axis().max_y, 8.0);
}

#[test]
fn test_split_stack_with_three_spectra() {
    let spectra = vec![
        lines("a", &[20.0]),
        lines("b", &[50.0]),
        lines("c", &[80.0]),
    ];
    let mut gs = set_over(&spectra);
    assert!(gs.show_all_stacked());
    assert_eq!(gs.n_split(), 1);

    gs.split_stack(true);
    assert_eq!(gs.n_split(), 3);
    assert!(!gs.show_all_stacked());
    assert_eq!(gs.selected(), Some(0));
    assert_abs_diff_eq!(gs.frac_y, 1.0 / 3.0, epsilon = 1e-12);
    assert!(gs.do_plot(1, 1));
    assert!(!gs.do_plot(1, 0));

    gs.set_position_for_frame(0);
    assert_eq!(gs.split_point(10), 0);
    assert_eq!(gs.split_point(390), 2);
    assert!(gs.has_point(100, 390));

    gs.split_stack(false);
    assert_eq!(gs.n_split(), 1);
    assert!(gs.show_all_stacked());
    assert_eq!(gs.selected(), None);
    let events = gs.take_events();
    assert!(events.contains(&ViewEvent::SplitChanged { n_split: 3 }));
    assert!(events.contains(&ViewEvent::SplitChanged { n_split: 1 }));
}

#[test]
fn test_split_widget_click_toggles() {
    let spectra = vec![lines("a", &[20.0]), lines("b", &[50.0])];
    let mut gs = set_over(&spectra);
    let f = *gs.frame();
    gs.mouse_clicked(&spectra, f.x_pixel11 - 15, f.y_pixel00 + 5, 1, false);
    assert_eq!(gs.n_split(), 2);
}

#[test]
fn test_fractional_positions_stack_sets() {
    let spectra = vec![lines("a", &[20.0]), lines("b", &[50.0])];
    let mut sets = vec![
        GraphSet::new(vec![0], &spectra, &ViewConfig::default()).unwrap(),
        GraphSet::new(vec![0, 1], &spectra, &ViewConfig::default()).unwrap(),
    ];
    sets[1].n_split = 2;
    GraphSet::set_fractional_positions(&mut sets);
    assert_abs_diff_eq!(sets[0].f_y0, 0.0);
    assert_abs_diff_eq!(sets[1].f_y0, 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(sets[1].frac_y, 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_up_arrow_scales_and_reset_clears() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.zoom(&spectra, 20.0, 0.0, 80.0, 10.0);

    let (x, y) = gs.arrow_position(events::Arrow::Up);
    gs.mouse_clicked(&spectra, x, y, 1, false);
    assert_abs_diff_eq!(gs.view().spectrum_scale_factor(0), std::f64::consts::SQRT_2, epsilon = 1e-12);

    let (x, y) = gs.arrow_position(events::Arrow::Down);
    gs.mouse_clicked(&spectra, x, y, 1, false);
    assert_abs_diff_eq!(gs.view().spectrum_scale_factor(0), 1.0, epsilon = 1e-12);

    gs.scale_y_by(2.0);
    let (x, y) = gs.arrow_position(events::Arrow::Reset);
    gs.mouse_clicked(&spectra, x, y, 1, false);
    assert_eq!(gs.view().spectrum_scale_factor(0), 1.0);
    assert_eq!(gs.history_len(), 1);
}

#[test]
fn test_scale_factor_survives_history_moves() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.scale_y_by(2.0);
    assert_eq!(gs.history[0].spectrum_scale_factor(0), 2.0);
    gs.zoom(&spectra, 20.0, 0.0, 80.0, 10.0);
    assert_eq!(gs.view().spectrum_scale_factor(0), 2.0);
    gs.previous_view();
    assert_eq!(gs.view().spectrum_scale_factor(0), 2.0);
}

#[test]
fn test_left_right_arrows_cycle_selection() {
    let spectra = vec![
        lines("a", &[20.0]),
        lines("b", &[50.0]),
        lines("c", &[80.0]),
    ];
    let mut gs = set_over(&spectra);
    assert!(gs.have_left_right_arrows());
    let right = gs.arrow_position(events::Arrow::Right);
    let left = gs.arrow_position(events::Arrow::Left);

    gs.mouse_clicked(&spectra, right.0, right.1, 1, false);
    assert_eq!(gs.selected(), Some(0));
    gs.mouse_clicked(&spectra, right.0, right.1, 1, false);
    assert_eq!(gs.selected(), Some(1));
    gs.mouse_clicked(&spectra, left.0, left.1, 1, false);
    gs.mouse_clicked(&spectra, left.0, left.1, 1, false);
    assert_eq!(gs.selected(), Some(2));

    let home = gs.arrow_position(events::Arrow::Home);
    gs.mouse_clicked(&spectra, home.0, home.1, 1, false);
    assert!(!gs.show_all_stacked());
    assert_eq!(gs.selected(), Some(2));
}

#[test]
fn test_double_click_measurement_snaps_to_peaks() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let p35 = gs.to_pixel_x(35.0);
    let p70 = gs.to_pixel_x(70.0);

    gs.mouse_moved(&spectra, p35, 200);
    gs.mouse_clicked(&spectra, p35, 200, 2, false);
    let pending = gs.pending_measurement().expect("measurement started");
    assert_abs_diff_eq!(pending.x1, 30.0, epsilon = 1e-9);

    gs.mouse_moved(&spectra, p70, 200);
    gs.mouse_clicked(&spectra, p70, 200, 1, false);
    let stored = gs.measurements(0).unwrap();
    assert_eq!(stored.len(), 1);
    let m = &stored.measurements[0];
    assert_abs_diff_eq!(m.x1, 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(m.x2, 70.0, epsilon = x_tolerance(&gs));
    assert!(!m.text.is_empty());

    // a single click keeps measuring from the stored end point
    assert!(gs.has_pending_measurement());
    gs.escape_key_pressed(false);
    assert!(!gs.has_pending_measurement());
    assert_eq!(gs.measurements(0).unwrap().len(), 1);
}

#[test]
fn test_zero_length_measurement_is_discarded() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let px = gs.to_pixel_x(50.0);
    gs.mouse_clicked(&spectra, px, 200, 1, true);
    assert!(gs.has_pending_measurement());
    gs.mouse_clicked(&spectra, px, 200, 1, true);
    assert!(!gs.has_pending_measurement());
    assert!(gs.measurements(0).unwrap().is_empty());
}

#[test]
fn test_escape_removes_hovered_measurement() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let mut m = Measurement::new(0, 20.0, 5.0);
    m.set_pt2(40.0, 5.0, &spectra[0], &DefaultFormatter);
    gs.store_measurement(m);

    let (x, y) = (gs.to_pixel_x(30.0), gs.to_pixel_y(5.0));
    gs.mouse_moved(&spectra, x, y);
    assert_eq!(gs.selected_measurement(), Some((0, 0)));
    gs.escape_key_pressed(false);
    assert!(gs.measurements(0).unwrap().is_empty());
}

#[test]
fn test_delete_clears_visible_measurements() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    for (a, b) in [(10.0, 20.0), (60.0, 80.0)] {
        let mut m = Measurement::new(0, a, 5.0);
        m.set_pt2(b, 5.0, &spectra[0], &DefaultFormatter);
        gs.store_measurement(m);
    }
    let (x, y) = (gs.to_pixel_x(15.0), gs.to_pixel_y(5.0));
    gs.mouse_moved(&spectra, x, y);
    gs.escape_key_pressed(true);
    assert!(gs.measurements(0).unwrap().is_empty());
}

#[test]
fn test_to_peak_walks_and_wraps() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    assert_eq!(gs.set_peak_list(&spectra, None), 2);

    assert_abs_diff_eq!(gs.to_peak(1).unwrap(), 30.0, epsilon = 1e-3);
    assert_abs_diff_eq!(gs.to_peak(1).unwrap(), 70.0, epsilon = 1e-3);
    assert_abs_diff_eq!(gs.to_peak(1).unwrap(), 30.0, epsilon = 1e-3);
    assert_abs_diff_eq!(gs.to_peak(-1).unwrap(), 70.0, epsilon = 1e-3);
    assert_abs_diff_eq!(gs.last_click_x(), 70.0, epsilon = 1e-3);
}

#[test]
fn test_integral_drag_adds_region() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.set_integration(&spectra, true);
    let (p25, p35) = (gs.to_pixel_x(25.0), gs.to_pixel_x(35.0));

    gs.mouse_pressed(&spectra, p25, 200, true);
    assert!(gs.is_integral_drag());
    gs.mouse_dragged(&spectra, p35, 200);
    assert!(gs.integrals(0).unwrap().pending.is_some());
    gs.mouse_released(&spectra);

    let ig = gs.integrals(0).unwrap();
    assert_eq!(ig.len(), 1);
    assert!(ig.pending.is_none());
    assert_abs_diff_eq!(ig.regions[0].min_x(), gs.to_x(p25), epsilon = 1e-9);
    assert!(!gs.is_integral_drag());
    assert!(gs
        .take_events()
        .iter()
        .any(|e| matches!(e, ViewEvent::IntegralAdded { spectrum: 0, .. })));
}

#[test]
fn test_integral_marks_and_normalization() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.add_integral_marks(&spectra, "35-25, 75-65");
    let ig = gs.integrals(0).unwrap();
    assert_eq!(ig.len(), 2);
    gs.set_selected_integral(1.0);
    let ig = gs.integrals(0).unwrap();
    assert_abs_diff_eq!(ig.regions[0].value, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ig.regions[1].value, 1.0, epsilon = 1e-3);
}

#[test]
fn test_is_on_line() {
    assert!(is_on_line(5, 0, 0, 0, 10, 0));
    assert!(is_on_line(0, 1, 0, 0, 10, 0));
    assert!(!is_on_line(5, 5, 0, 0, 10, 0));
    assert!(!is_on_line(15, 0, 0, 0, 10, 0));
}

#[test]
fn test_stacked_click_selects_spectrum_under_pointer() {
    let spectra = vec![lines("a", &[20.0]), lines("b", &[80.0])];
    let mut gs = set_over(&spectra);
    gs.set_scale(1);
    let (x, y) = (gs.to_pixel_x(80.0), gs.fix_y(gs.to_pixel_y(10.0)));
    gs.mouse_clicked(&spectra, x, y, 1, false);
    assert_eq!(gs.selected(), Some(1));
}

#[test]
fn test_two_d_set_has_image_and_subspectra() {
    let rows = (0..4)
        .map(|r| Subspectrum {
            y2d: r as f64,
            coords: lines("", &[25.0 + r as f64]).coords,
        })
        .collect();
    let spectra = vec![Spectrum::two_d("hsqc", Nucleus::H1, 400.0, rows)];
    let mut gs = set_over(&spectra);
    assert!(gs.image().is_some());
    gs.set_current_subspectrum(&spectra, 10);
    assert_eq!(gs.sub_index(), 3);
    assert!(gs.frame().x_pixels < gs.frame().x_pixels0);
}

#[test]
fn test_double_click_right_bar_resets_y() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    gs.zoom(&spectra, 20.0, 2.0, 60.0, 6.0);
    assert_eq!(gs.axis().min_y, 2.0);

    let (x, y) = (gs.frame().x_pixel1 + 3, gs.frame().y_pixel0 + 60);
    assert!(gs.is_in_right_bar(x, y));
    gs.mouse_clicked(&spectra, x, y, 2, false);

    assert_eq!(gs.history_len(), 3);
    assert_abs_diff_eq!(gs.view().min_x(), 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(gs.view().max_x(), 60.0, epsilon = 1e-9);
    let (min_y, max_y) = (gs.base().min_y, gs.base().max_y);
    assert_abs_diff_eq!(gs.axis().min_y, min_y, epsilon = 1e-9);
    assert_abs_diff_eq!(gs.axis().max_y, max_y, epsilon = 1e-9);
}

#[test]
fn test_double_click_image_bars_reset_2d_window() {
    let rows = (0..8)
        .map(|r| Subspectrum {
            y2d: r as f64,
            coords: lines("", &[25.0 + r as f64]).coords,
        })
        .collect();
    let spectra = vec![Spectrum::two_d("hsqc", Nucleus::H1, 400.0, rows)];
    let mut gs = set_over(&spectra);
    let f = *gs.frame();

    let zoom_image = |gs: &mut GraphSet| {
        let iv = gs.image.as_mut().unwrap();
        iv.reset_view();
        let (x0, y0) = (iv.x_pixel0, iv.y_pixel0);
        iv.set_zoom(x0 + 10, y0 + 100, x0 + 60, y0 + 200);
    };
    zoom_image(&mut gs);
    let (iv_x0, iv_x1) = (gs.image().unwrap().x_pixel0, gs.image().unwrap().x_pixel1);
    let y_window = {
        let iv = gs.image().unwrap();
        assert!(iv.x_view2 - iv.x_view1 < iv.image_width - 1);
        assert!(iv.y_view2 - iv.y_view1 < iv.image_height - 1);
        (iv.y_view1, iv.y_view2)
    };

    let (x, y) = ((iv_x0 + iv_x1) / 2, f.y_pixel0 - 3);
    assert!(gs.is_in_top_bar_2d(x, y));
    assert!(!gs.is_in_top_bar(x, y));
    gs.mouse_clicked(&spectra, x, y, 2, false);
    let iv = gs.image().unwrap();
    assert_eq!((iv.x_view1, iv.x_view2), (0, iv.image_width - 1));
    assert_eq!((iv.y_view1, iv.y_view2), y_window);
    assert_eq!(gs.history_len(), 2);
    assert_abs_diff_eq!(gs.view().min_x(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(gs.view().max_x(), 100.0, epsilon = 1e-9);

    zoom_image(&mut gs);
    let x_window = {
        let iv = gs.image().unwrap();
        (iv.x_view1, iv.x_view2)
    };
    let (x, y) = (iv_x1 + 3, f.y_pixel0 + 60);
    assert!(gs.is_in_right_bar_2d(x, y));
    gs.mouse_clicked(&spectra, x, y, 2, false);
    let iv = gs.image().unwrap();
    assert_eq!((iv.y_view1, iv.y_view2), (0, iv.image_height - 1));
    assert_eq!((iv.x_view1, iv.x_view2), x_window);
    assert_eq!(gs.history_len(), 2);
}

#[test]
fn test_draw_emits_title_and_spectrum() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    let mut canvas = RecordingCanvas::new();
    gs.draw_graph(&mut canvas, &spectra);
    assert!(canvas.texts().contains(&"peaks"));
    assert!(canvas.count(|op| matches!(op, DrawOp::PlotColor(0))) == 1);
    assert!(canvas.lines().len() > 200);
}

#[test]
fn test_measurement_label_needs_two_pixels() {
    let spectra = vec![lines("peaks", &[30.0, 70.0])];
    let mut gs = set_over(&spectra);
    for (a, b) in [(20.0, 20.1), (40.0, 60.0)] {
        let mut m = Measurement::new(0, a, 5.0);
        m.set_pt2(b, 5.0, &spectra[0], &DefaultFormatter);
        gs.store_measurement(m);
    }
    let mut canvas = RecordingCanvas::new();
    gs.draw_graph(&mut canvas, &spectra);
    let texts = canvas.texts();
    assert!(!texts.contains(&"0.10"));
    assert!(texts.contains(&"20.00"));
}
