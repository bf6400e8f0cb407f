// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end renders through a [`ChartView`].

use kurbo::Point;
use peniko::Brush;
use peniko::color::palette::css;
use riskviz_core::{MarkDiff, MarkId, MarkPayload};

use crate::{
    ChartView, CorrelationInput, HistogramInput, HistogramStyle, MatrixStyle, PieInput, PieStyle,
    PointerEvent, RenderError, TooltipAlign, histogram_bar_id, matrix_cell_id, pie_slice_id,
    render_correlation_matrix, render_pie_chart, render_risk_histogram,
};

fn texts(view: &ChartView) -> Vec<String> {
    view.marks()
        .into_iter()
        .filter_map(|(_, p)| match p {
            MarkPayload::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect()
}

fn rect_fill(view: &ChartView, id: MarkId) -> Brush {
    match view.scene().payload(id) {
        Some(MarkPayload::Rect(r)) => r.fill.clone(),
        other => panic!("expected a rect payload for {id:?}, got {other:?}"),
    }
}

fn two_by_two() -> CorrelationInput {
    CorrelationInput {
        product_name: vec!["Alpha Fund".into(), "Beta Fund".into()],
        product_code: vec!["ALP".into(), "BET".into()],
        covariance: vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), Some(1.0)]],
    }
}

fn histogram() -> HistogramInput {
    HistogramInput {
        confidence_interval: 0.9,
        prices: (1..=10).map(f64::from).collect(),
        bin_size: 2,
        interpolate: "monotone".to_string(),
        shortfall_value: -3.456,
        var_value: -2.5,
    }
}

fn pie() -> PieInput {
    PieInput {
        product: vec!["X".into(), "Y".into()],
        value: vec![30.0, 70.0],
        percentage: vec![0.3, 0.7],
    }
}

#[test]
fn matrix_colors_off_diagonal_cells_and_blanks_the_diagonal() {
    let style = MatrixStyle::default();
    let mut view = ChartView::new();
    let diffs = render_correlation_matrix(&mut view, &two_by_two(), &style).unwrap();
    assert!(diffs.iter().all(|d| matches!(d, MarkDiff::Enter { .. })));
    assert_eq!(view.target_count(), 4);

    // A degenerate color domain maps to the start color.
    assert_eq!(rect_fill(&view, matrix_cell_id(2, 0, 1)), style.start_color.into());
    assert_eq!(rect_fill(&view, matrix_cell_id(2, 0, 0)), style.empty_color.into());
    assert_eq!(rect_fill(&view, matrix_cell_id(2, 1, 1)), style.empty_color.into());

    let labels = texts(&view);
    assert_eq!(labels.iter().filter(|t| *t == "0.5000").count(), 2);
    assert_eq!(labels.iter().filter(|t| t.is_empty()).count(), 2);
    assert_eq!(labels.iter().filter(|t| *t == "ALP").count(), 2);
    assert!(!labels.iter().any(|t| t == "1.0000"));
}

#[test]
fn matrix_hover_recolors_off_diagonal_cells_only() {
    let style = MatrixStyle::default();
    let mut view = ChartView::new();
    render_correlation_matrix(&mut view, &two_by_two(), &style).unwrap();

    // Top-right cell: row 0, column 1.
    let diffs = view.handle_pointer(PointerEvent::Enter(Point::new(480.0, 90.0)));
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].id(), matrix_cell_id(2, 0, 1));
    assert_eq!(rect_fill(&view, matrix_cell_id(2, 0, 1)), style.hover_color.into());
    let tip = view.tooltip().unwrap();
    assert_eq!(tip.lines, vec!["Alpha Fund vs Beta Fund".to_string(), "0.5".to_string()]);
    assert_eq!(tip.align, TooltipAlign::BottomCenter);

    // Top-left cell is on the diagonal: the old cell restores, nothing new lights up.
    let diffs = view.handle_pointer(PointerEvent::Move(Point::new(200.0, 90.0)));
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].id(), matrix_cell_id(2, 0, 1));
    assert_eq!(view.hovered(), Some(matrix_cell_id(2, 0, 0)));
    assert!(view.tooltip().is_none());
}

#[test]
fn histogram_draws_every_layer() {
    let mut view = ChartView::new();
    render_risk_histogram(&mut view, &histogram(), &HistogramStyle::default()).unwrap();

    // Two bars and two curve points are hoverable.
    assert_eq!(view.target_count(), 4);
    let labels = texts(&view);
    for expected in [
        "Value at Risk 10.00%",
        "VaR value: -2.50",
        "Shortfall value: -3.46",
        "Profit and Loss",
        "Frequency",
        "Cumulative Probability",
        "100%",
    ] {
        assert!(labels.iter().any(|t| t == expected), "missing {expected:?}");
    }

    // Cutoff bin 0 puts both bars in the body.
    let body: Brush = css::STEEL_BLUE.into();
    assert_eq!(rect_fill(&view, histogram_bar_id(0)), body);
    assert_eq!(rect_fill(&view, histogram_bar_id(1)), body);

    let Some(MarkPayload::Path(rule)) = view.scene().payload(crate::HISTOGRAM_CUTOFF_ID) else {
        panic!("expected the cutoff rule");
    };
    assert_eq!(rule.stroke_width, 3.0);
    let bounds = rule.path.control_box();
    assert_eq!((bounds.x0, bounds.y0, bounds.y1), (50.0, 40.0, 340.0));
}

#[test]
fn histogram_tail_uses_the_tail_color() {
    let mut input = histogram();
    input.confidence_interval = 0.1;
    let mut view = ChartView::new();
    render_risk_histogram(&mut view, &input, &HistogramStyle::default()).unwrap();
    assert_eq!(rect_fill(&view, histogram_bar_id(0)), css::CRIMSON.into());
    assert_eq!(rect_fill(&view, histogram_bar_id(1)), css::STEEL_BLUE.into());
    assert!(texts(&view).iter().any(|t| t == "Value at Risk 90.00%"));
}

#[test]
fn entering_a_bar_recolors_it_and_leaving_restores_it() {
    let style = HistogramStyle::default();
    let mut view = ChartView::new();
    render_risk_histogram(&mut view, &histogram(), &style).unwrap();

    let diffs = view.handle_pointer(PointerEvent::Enter(Point::new(500.0, 200.0)));
    let [MarkDiff::Update { id, new, .. }] = &diffs[..] else {
        panic!("expected a single update, got {diffs:?}");
    };
    assert_eq!(*id, histogram_bar_id(1));
    let MarkPayload::Rect(bar) = &**new else {
        panic!("expected a rect payload");
    };
    assert_eq!(bar.fill, style.body_hover_color.into());
    let tip = view.tooltip().unwrap();
    assert_eq!(
        tip.lines,
        vec!["Frequency: 5".to_string(), "x: from 5.50 to 10.00".to_string()]
    );

    let diffs = view.handle_pointer(PointerEvent::Leave);
    assert_eq!(diffs.len(), 1);
    assert_eq!(rect_fill(&view, histogram_bar_id(1)), style.body_color.into());
    assert!(view.tooltip().is_none());
}

#[test]
fn pie_tooltips_follow_the_pointer() {
    let mut view = ChartView::new();
    render_pie_chart(&mut view, &pie(), &PieStyle::default()).unwrap();
    assert_eq!(view.target_count(), 2);

    // Legend labels list the slices in input order.
    let labels = texts(&view);
    assert_eq!(labels, vec!["X".to_string(), "Y".to_string()]);

    // 45 degrees clockwise from 12 o'clock, inside the ring: the first slice.
    let at = Point::new(229.5, 70.5);
    let diffs = view.handle_pointer(PointerEvent::Enter(at));
    assert!(diffs.is_empty());
    assert_eq!(view.hovered(), Some(pie_slice_id(0)));
    let tip = view.tooltip().unwrap();
    assert_eq!(
        tip.lines,
        vec!["X".to_string(), "30".to_string(), "30.00%".to_string()]
    );
    assert_eq!(tip.anchor, Point::new(204.5, 80.5));

    // Across the ring, the second slice.
    view.handle_pointer(PointerEvent::Move(Point::new(150.0, 262.0)));
    assert_eq!(view.tooltip().unwrap().lines[2], "70.00%");

    // The hole holds the legend, which is not hoverable.
    view.handle_pointer(PointerEvent::Move(Point::new(150.0, 150.0)));
    assert!(view.tooltip().is_none());
}

#[test]
fn rendering_replaces_the_previous_drawing() {
    let mut view = ChartView::new();
    render_risk_histogram(&mut view, &histogram(), &HistogramStyle::default()).unwrap();
    let count = view.marks().len();

    // The same input again changes nothing.
    let diffs = render_risk_histogram(&mut view, &histogram(), &HistogramStyle::default()).unwrap();
    assert!(diffs.is_empty(), "{diffs:?}");
    assert_eq!(view.marks().len(), count);

    // A different chart kind removes every histogram mark and table.
    let diffs = render_pie_chart(&mut view, &pie(), &PieStyle::default()).unwrap();
    let exits = diffs
        .iter()
        .filter(|d| matches!(d, MarkDiff::Exit { .. }))
        .count();
    assert_eq!(exits, count);
    assert!(view.scene().tables.is_empty());
    assert_eq!(view.marks().len(), 6);
}

#[test]
fn failed_render_leaves_the_view_untouched() {
    let mut view = ChartView::new();
    render_pie_chart(&mut view, &pie(), &PieStyle::default()).unwrap();
    view.handle_pointer(PointerEvent::Enter(Point::new(229.5, 70.5)));

    let mut bad = histogram();
    bad.bin_size = 0;
    assert_eq!(
        render_risk_histogram(&mut view, &bad, &HistogramStyle::default()).err(),
        Some(RenderError::InvalidBinCount)
    );
    assert_eq!(view.marks().len(), 6);
    assert_eq!(view.hovered(), Some(pie_slice_id(0)));
    assert!(view.tooltip().is_some());
}
