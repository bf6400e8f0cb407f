// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value-at-Risk histogram.
//!
//! Five layers share one render context:
//! - bars, split into a tail and a body at the cutoff bin,
//! - the cumulative-probability curve with one hoverable point per bin,
//! - the cutoff rule with the VaR and shortfall annotations,
//! - bottom, left and right axes,
//! - the title.

use kurbo::Rect;
use riskviz_core::{ColId, Mark, MarkDiff, MarkId, Table, TableData, TableId};
use riskviz_core::{TextAnchor, TextBaseline};
use serde::Deserialize;

use crate::axis::{AxisSpec, StrokeStyle};
use crate::config::HistogramStyle;
use crate::curve::Interpolation;
use crate::error::{RenderError, check_finite};
use crate::format::{percent_whole, to_fixed};
use crate::histogram_bins::{HistogramBin, bin_prices, cutoff_index};
use crate::interaction::{HoverTarget, TooltipPlacement};
use crate::line_mark::LineMarkSpec;
use crate::point_mark::PointMarkSpec;
use crate::rect_mark::RectMarkSpec;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::{ScaleLinear, ScaleLinearSpec};
use crate::text_mark::{TextMarkSpec, TextStyle};
use crate::view::{ChartView, Frame};
use crate::z_order;

/// Table holding one row per bin.
pub const BINS_TABLE: TableId = TableId(1);
/// Bin midpoint column of [`BINS_TABLE`].
pub const COL_MIDPOINT: ColId = ColId(0);
/// Cumulative fraction column of [`BINS_TABLE`].
pub const COL_CUMULATIVE_FRACTION: ColId = ColId(1);
/// Lower bin edge column of [`BINS_TABLE`].
pub const COL_X: ColId = ColId(2);
/// Count column of [`BINS_TABLE`].
pub const COL_COUNT: ColId = ColId(3);

const TITLE_ID: u64 = 1;
const CURVE_ID: u64 = 2;
const CUTOFF_RULE_ID: u64 = 3;
const ANNOTATION_IDS: u64 = 4;
const BAR_IDS: u64 = 1 << 32;
const POINT_IDS: u64 = 2 << 32;
const X_AXIS_IDS: u64 = 3 << 32;
const COUNT_AXIS_IDS: u64 = 4 << 32;
const FRACTION_AXIS_IDS: u64 = 5 << 32;

/// Input of [`render_risk_histogram`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramInput {
    /// Confidence level in `(0, 1)`; the tail holds `1 - confidence_interval` of the sample.
    pub confidence_interval: f64,
    /// Simulated profit-and-loss sample.
    pub prices: Vec<f64>,
    /// Number of bins.
    pub bin_size: usize,
    /// Interpolation name of the cumulative curve.
    #[serde(default = "default_interpolation")]
    pub interpolate: String,
    /// Expected shortfall, shown next to the cutoff.
    #[serde(rename = "shortfall_value")]
    pub shortfall_value: f64,
    /// Value at Risk, shown next to the cutoff.
    #[serde(rename = "var_value")]
    pub var_value: f64,
}

fn default_interpolation() -> String {
    Interpolation::Linear.name().to_string()
}

impl HistogramInput {
    /// Significance level, `1 - confidence_interval`.
    pub fn significance(&self) -> f64 {
        1.0 - self.confidence_interval
    }

    /// Parses the interpolation name.
    pub fn interpolation(&self) -> Result<Interpolation, RenderError> {
        self.interpolate.parse()
    }

    /// Checks the confidence level, bin count, sample and annotation values.
    pub fn validate(&self) -> Result<(), RenderError> {
        let c = self.confidence_interval;
        if !(c > 0.0 && c < 1.0) {
            return Err(RenderError::InvalidConfidence(c));
        }
        if self.bin_size == 0 {
            return Err(RenderError::InvalidBinCount);
        }
        if self.prices.is_empty() {
            return Err(RenderError::EmptySample);
        }
        check_finite("prices", self.prices.iter().copied())?;
        check_finite("var_value", [self.var_value])?;
        check_finite("shortfall_value", [self.shortfall_value])?;
        self.interpolation().map(|_| ())
    }
}

#[derive(Debug)]
struct BinTable(Vec<HistogramBin>);

impl TableData for BinTable {
    fn row_count(&self) -> usize {
        self.0.len()
    }

    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        let bin = self.0.get(row)?;
        match col {
            COL_MIDPOINT => Some(bin.midpoint()),
            COL_CUMULATIVE_FRACTION => Some(bin.cumulative_fraction),
            COL_X => Some(bin.x),
            COL_COUNT => Some(bin.count as f64),
            _ => None,
        }
    }
}

/// Returns the mark id of the bar of bin `i`.
pub fn histogram_bar_id(i: usize) -> MarkId {
    MarkId::from_raw(BAR_IDS).offset(i)
}

/// Returns the mark id of the cumulative-curve point of bin `i`.
pub fn histogram_point_id(i: usize) -> MarkId {
    MarkId::from_raw(POINT_IDS).offset(i)
}

/// Mark id of the cutoff rule.
pub const HISTOGRAM_CUTOFF_ID: MarkId = MarkId(CUTOFF_RULE_ID);

/// Everything derived from the input and style before any mark is built.
struct HistogramContext<'a> {
    input: &'a HistogramInput,
    style: &'a HistogramStyle,
    bins: Vec<HistogramBin>,
    cutoff: usize,
    interpolation: Interpolation,
    view_box: Rect,
    plot: Rect,
    x_spec: ScaleLinearSpec,
    x: ScaleLinear,
    count_spec: ScaleLinearSpec,
    count: ScaleLinear,
    fraction_spec: ScaleLinearSpec,
    fraction: ScaleLinear,
}

impl<'a> HistogramContext<'a> {
    fn new(input: &'a HistogramInput, style: &'a HistogramStyle) -> Result<Self, RenderError> {
        let interpolation = input.interpolation()?;
        let bins = bin_prices(&input.prices, input.bin_size);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Err(RenderError::EmptySample);
        };
        let domain = (first.x, last.x + last.dx);
        let cutoff = cutoff_index(&bins, input.significance());
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);

        let plot = style.margins.plot_rect(style.width, style.height);
        let x_range = (plot.x0, plot.x1);
        let y_range = (plot.y1, plot.y0);
        let x_spec = ScaleLinearSpec::new(domain);
        let count_spec = ScaleLinearSpec::new((0.0, max_count as f64)).with_nice(true);
        let fraction_spec = ScaleLinearSpec::new((0.0, 1.0)).with_nice(true);

        Ok(Self {
            input,
            style,
            cutoff,
            interpolation,
            view_box: style.margins.view_box(style.width, style.height),
            plot,
            x: x_spec.instantiate_resolved(x_range, style.tick_count),
            x_spec,
            count: count_spec.instantiate_resolved(y_range, style.tick_count),
            count_spec,
            fraction: fraction_spec.instantiate_resolved(y_range, style.tick_count),
            fraction_spec,
            bins,
        })
    }

    fn bin_width(&self) -> f64 {
        let (min, _) = self.x.domain();
        let dx = self.bins.first().map_or(0.0, |b| b.dx);
        self.x.map(min + dx) - self.x.map(min)
    }

    fn bars(&self, marks: &mut Vec<Mark>, targets: &mut Vec<HoverTarget>) {
        let width = self.bin_width();
        let stroke = StrokeStyle::solid(self.style.bar_stroke_color, 1.0);
        for (i, bin) in self.bins.iter().enumerate() {
            let x0 = self.x.map(bin.x);
            let rect = Rect::new(x0, self.count.map(bin.count as f64), x0 + width, self.plot.y1);
            let (fill, hover) = if i < self.cutoff {
                (self.style.tail_color, self.style.tail_hover_color)
            } else {
                (self.style.body_color, self.style.body_hover_color)
            };
            marks.push(
                RectMarkSpec::new(histogram_bar_id(i), rect)
                    .with_fill(fill)
                    .with_hover_fill(hover)
                    .with_stroke(stroke.clone())
                    .mark(),
            );
            targets.push(HoverTarget::new(
                histogram_bar_id(i),
                vec![
                    format!("Frequency: {}", bin.count),
                    format!("x: from {} to {}", to_fixed(bin.x, 2), to_fixed(bin.x + bin.dx, 2)),
                ],
                TooltipPlacement::AboveMark { gap: 10.0 },
            ));
        }
    }

    fn cumulative_curve(&self, marks: &mut Vec<Mark>, targets: &mut Vec<HoverTarget>) {
        marks.push(
            LineMarkSpec::new(
                MarkId::from_raw(CURVE_ID),
                BINS_TABLE,
                COL_MIDPOINT,
                COL_CUMULATIVE_FRACTION,
                self.x,
                self.fraction,
            )
            .with_interpolation(self.interpolation)
            .with_stroke(StrokeStyle::solid(
                self.style.curve_color,
                self.style.curve_width,
            ))
            .mark(),
        );

        let points = PointMarkSpec::new(
            MarkId::from_raw(POINT_IDS),
            BINS_TABLE,
            COL_MIDPOINT,
            COL_CUMULATIVE_FRACTION,
            self.x,
            self.fraction,
        )
        .with_radius(self.style.point_radius, self.style.point_hover_radius)
        .with_fill(self.style.point_color, self.style.point_hover_color);
        marks.extend(points.marks(self.bins.len()));
        targets.extend(self.bins.iter().enumerate().map(|(i, bin)| {
            HoverTarget::new(
                points.mark_id(i),
                vec![
                    format!("x: {}", to_fixed(bin.midpoint(), 2)),
                    format!("percentage: {}%", to_fixed(bin.cumulative_fraction * 100.0, 2)),
                ],
                TooltipPlacement::AboveMark { gap: 10.0 },
            )
        }));
    }

    fn cutoff_marker(&self, marks: &mut Vec<Mark>) {
        let Some(bin) = self.bins.get(self.cutoff) else {
            return;
        };
        let x = self.x.map(bin.x);
        marks.push(
            RuleMarkSpec::vertical(HISTOGRAM_CUTOFF_ID, x, self.plot.y0, self.plot.y1)
                .with_stroke(StrokeStyle::solid(
                    self.style.cutoff_color,
                    self.style.cutoff_width,
                ))
                .with_z_index(z_order::ANNOTATIONS)
                .mark(),
        );

        // Two lines stacked one em apart, hanging below the middle of the rule.
        let size = self.style.annotation_font_size;
        let top = 0.5 * (self.plot.y0 + self.plot.y1) + 5.0;
        let style = TextStyle::new(size, self.style.cutoff_color).bold();
        let lines = [
            format!("VaR value: {}", to_fixed(self.input.var_value, 2)),
            format!("Shortfall value: {}", to_fixed(self.input.shortfall_value, 2)),
        ];
        let origin = (x - 5.0, top + size);
        marks.extend(
            TextMarkSpec::stacked(MarkId::from_raw(ANNOTATION_IDS), origin, size, lines)
                .into_iter()
                .map(|label| {
                    label
                        .with_style(style.clone())
                        .with_anchor(TextAnchor::End)
                        .with_baseline(TextBaseline::Alphabetic)
                        .with_z_index(z_order::ANNOTATIONS)
                        .mark()
                }),
        );
    }

    fn axes(&self) -> Vec<Mark> {
        let (plot, view) = (self.plot, self.view_box);
        let tick_count = self.style.tick_count;
        let x_axis = AxisSpec::bottom(X_AXIS_IDS, self.x_spec)
            .with_tick_count(tick_count)
            .with_title("Profit and Loss");
        let count_axis = AxisSpec::left(COUNT_AXIS_IDS, self.count_spec)
            .with_tick_count(tick_count)
            .with_title("Frequency");
        let fraction_axis = AxisSpec::right(FRACTION_AXIS_IDS, self.fraction_spec)
            .with_tick_count(tick_count)
            .with_tick_formatter(|v, _| percent_whole(v))
            .with_title("Cumulative Probability");

        let mut marks = x_axis.marks(plot, Rect::new(plot.x0, plot.y1, plot.x1, view.y1));
        marks.extend(count_axis.marks(plot, Rect::new(view.x0, plot.y0, plot.x0, plot.y1)));
        marks.extend(fraction_axis.marks(plot, Rect::new(plot.x1, plot.y0, view.x1, plot.y1)));
        marks
    }

    fn title(&self) -> Mark {
        let x = 0.5 * (self.plot.x0 + self.plot.x1);
        let y = self.plot.y0 - 0.5 * self.style.margins.top;
        TextMarkSpec::new(
            MarkId::from_raw(TITLE_ID),
            (x, y),
            format!("Value at Risk {}%", to_fixed(self.input.significance() * 100.0, 2)),
        )
        .with_anchor(TextAnchor::Middle)
        .with_baseline(TextBaseline::Alphabetic)
        .with_font_size(self.style.title_font_size)
        .mark()
    }

    fn frame(&self) -> Frame {
        let mut marks = Vec::with_capacity(2 * self.bins.len() + 64);
        let mut targets = Vec::with_capacity(2 * self.bins.len());
        self.bars(&mut marks, &mut targets);
        self.cumulative_curve(&mut marks, &mut targets);
        self.cutoff_marker(&mut marks);
        marks.extend(self.axes());
        marks.push(self.title());

        Frame {
            view_box: self.view_box,
            tables: vec![Table::from_data(
                BINS_TABLE,
                Box::new(BinTable(self.bins.clone())),
            )],
            marks,
            targets,
        }
    }
}

/// Renders the risk histogram into `view`, replacing its contents.
///
/// The cutoff bin is computed once from the binned sample and shared by the bar colors and the
/// cutoff marker. On error the view is left untouched.
pub fn render_risk_histogram(
    view: &mut ChartView,
    input: &HistogramInput,
    style: &HistogramStyle,
) -> Result<Vec<MarkDiff>, RenderError> {
    input.validate()?;
    let ctx = HistogramContext::new(input, style)?;
    tracing::debug!(
        samples = input.prices.len(),
        bins = ctx.bins.len(),
        cutoff = ctx.cutoff,
        interpolation = %ctx.interpolation,
        "rendering risk histogram"
    );
    Ok(view.replace(ctx.frame()))
}
