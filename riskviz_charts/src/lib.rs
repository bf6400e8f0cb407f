// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Risk chart renderers on top of `riskviz_core`.
//!
//! Three renderers share one pipeline: normalize the input into records, build scales, generate
//! stable-identity marks, and register hover targets with a [`ChartView`]:
//! - [`render_correlation_matrix`]: a covariance heatmap with product labels,
//! - [`render_risk_histogram`]: a Value-at-Risk histogram with a cumulative curve and cutoff,
//! - [`render_pie_chart`]: a donut chart with a legend in the hole.
//!
//! Every renderer validates its input first and leaves the view untouched on error. A
//! successful render replaces the view's previous contents and returns the mark diffs.
//!
//! The building blocks (scales, axes, legends, mark specs) are public so other charts can be
//! assembled the same way. Text shaping is out of scope; text marks store unshaped strings.

mod axis;
mod color;
mod config;
mod correlation_matrix;
mod curve;
mod error;
mod format;
mod histogram_bins;
mod interaction;
mod legend;
mod line_mark;
mod pie_chart;
mod point_mark;
mod rect_mark;
mod risk_histogram;
mod rule_mark;
mod scale;
mod sector_mark;
mod text_mark;
mod view;
mod z_order;

#[cfg(test)]
mod chart_tests;

pub use axis::{
    AXIS_LABEL_ID_OFFSET, AXIS_TITLE_ID_OFFSET, AxisOrient, AxisSpec, AxisStyle, StrokeStyle,
};
pub use color::{ColorParseError, ColorRamp, RampSpace, parse_css_color};
pub use config::{HistogramStyle, Margins, MatrixStyle, PieStyle, RenderConfig};
pub use correlation_matrix::{
    CorrelationInput, MatrixCell, matrix_cell_id, render_correlation_matrix,
};
pub use curve::Interpolation;
pub use error::RenderError;
pub use format::{format_tick_with_step, percent_whole, to_fixed};
pub use histogram_bins::{HistogramBin, bin_prices, cutoff_index};
pub use interaction::{
    HOVER_SIGNAL, HoverTarget, PointerEvent, Tooltip, TooltipAlign, TooltipPlacement,
};
pub use legend::{LEGEND_LABEL_ID_OFFSET, LegendItem, LegendSwatches, LegendSwatchesSpec};
pub use line_mark::LineMarkSpec;
pub use pie_chart::{PieInput, PieSlice, pie_slice_id, render_pie_chart};
pub use point_mark::PointMarkSpec;
pub use rect_mark::RectMarkSpec;
pub use risk_histogram::{
    BINS_TABLE, COL_COUNT, COL_CUMULATIVE_FRACTION, COL_MIDPOINT, COL_X, HISTOGRAM_CUTOFF_ID,
    HistogramInput, histogram_bar_id, histogram_point_id, render_risk_histogram,
};
pub use rule_mark::RuleMarkSpec;
pub use scale::{ScaleBand, ScaleBandSpec, ScaleLinear, ScaleLinearSpec, ScaleSpec, extent};
pub use sector_mark::SectorMarkSpec;
pub use text_mark::{TextMarkSpec, TextStyle};
pub use view::ChartView;
pub use z_order::*;
