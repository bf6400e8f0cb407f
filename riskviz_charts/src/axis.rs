// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! Axes follow the Vega shape: a single [`AxisSpec`] with an `orient`, arranged against a plot
//! rectangle and the margin strip reserved for it. Linear axes pick "nice" tick values; band
//! axes put one tick at the center of every band and label it through a formatter.

use std::sync::Arc;

use kurbo::Rect;
use peniko::Brush;
use peniko::color::palette::css;
use riskviz_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::format::format_tick_with_step;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::ScaleSpec;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// A paint + width pair for stroked paths (domain lines, ticks, outlines).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 1.0)
    }
}

/// Axis styling.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Style for the axis domain line and tick marks.
    pub rule: StrokeStyle,
    /// Fill paint for tick labels.
    pub label_fill: Brush,
    /// Font size for tick labels.
    pub label_font_size: f64,
    /// Fill paint for the axis title.
    pub title_fill: Brush,
    /// Font size for the axis title.
    pub title_font_size: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let rule = StrokeStyle::default();
        Self {
            label_fill: rule.brush.clone(),
            title_fill: rule.brush.clone(),
            rule,
            label_font_size: 10.0,
            title_font_size: 12.0,
        }
    }
}

/// Axis orientation relative to the plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis placed below the plot area.
    Bottom,
    /// A vertical axis placed to the left of the plot area.
    Left,
    /// A vertical axis placed to the right of the plot area.
    Right,
}

type TickFormatter = Arc<dyn Fn(f64, f64) -> String>;

/// Offset from `id_base` of the first tick label id.
pub const AXIS_LABEL_ID_OFFSET: u64 = 1 << 20;
/// Offset from `id_base` of the axis title id.
pub const AXIS_TITLE_ID_OFFSET: u64 = 1 << 21;

/// An axis specification.
#[derive(Clone)]
pub struct AxisSpec {
    /// Stable-id base: the domain line uses `id_base`, tick `i` uses `id_base + 1 + i`, its label
    /// `id_base + AXIS_LABEL_ID_OFFSET + i`, and the title `id_base + AXIS_TITLE_ID_OFFSET`.
    pub id_base: u64,
    /// The axis scale specification.
    pub scale: ScaleSpec,
    /// Axis placement relative to the plot.
    pub orient: AxisOrient,
    /// Approximate number of ticks (linear scales).
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Gap between the tick end and its label.
    pub tick_padding: f64,
    /// Whether to draw tick marks.
    pub ticks: bool,
    /// Whether to draw tick labels.
    pub labels: bool,
    /// Whether to draw the axis domain line.
    pub show_domain: bool,
    /// Axis styling.
    pub style: AxisStyle,
    /// Optional axis title text.
    pub title: Option<String>,
    /// Tick label formatter, given the tick value and the tick step.
    ///
    /// Band axes pass the band index as the value.
    pub tick_formatter: Option<TickFormatter>,
    /// Tick label rotation angle in degrees.
    pub label_angle: f64,
}

impl core::fmt::Debug for AxisSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisSpec")
            .field("id_base", &self.id_base)
            .field("scale", &self.scale)
            .field("orient", &self.orient)
            .field("tick_count", &self.tick_count)
            .field("tick_size", &self.tick_size)
            .field("tick_padding", &self.tick_padding)
            .field("ticks", &self.ticks)
            .field("labels", &self.labels)
            .field("show_domain", &self.show_domain)
            .field("style", &self.style)
            .field("title", &self.title)
            .field("tick_formatter", &self.tick_formatter.is_some())
            .field("label_angle", &self.label_angle)
            .finish()
    }
}

impl AxisSpec {
    /// Creates a new axis: 10 ticks of size 6, labels 3 units past the ticks, a domain line,
    /// default style, no title.
    pub fn new(id_base: u64, scale: impl Into<ScaleSpec>, orient: AxisOrient) -> Self {
        Self {
            id_base,
            scale: scale.into(),
            orient,
            tick_count: 10,
            tick_size: 6.0,
            tick_padding: 3.0,
            ticks: true,
            labels: true,
            show_domain: true,
            style: AxisStyle::default(),
            title: None,
            tick_formatter: None,
            label_angle: 0.0,
        }
    }

    /// Convenience constructor for a `bottom` axis.
    pub fn bottom(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Bottom)
    }

    /// Convenience constructor for a `left` axis.
    pub fn left(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Left)
    }

    /// Convenience constructor for a `right` axis.
    pub fn right(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Right)
    }

    /// Set the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Set tick size in scene coordinates.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Enable or disable the axis domain line.
    pub fn with_domain(mut self, domain: bool) -> Self {
        self.show_domain = domain;
        self
    }

    /// Set a custom tick label formatter.
    pub fn with_tick_formatter(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.tick_formatter = Some(Arc::new(f));
        self
    }

    /// Set tick label rotation angle in degrees.
    pub fn with_label_angle(mut self, angle_degrees: f64) -> Self {
        self.label_angle = angle_degrees;
        self
    }

    /// Set the axis style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn range(&self, plot: Rect) -> (f64, f64) {
        match self.orient {
            AxisOrient::Bottom => (plot.x0, plot.x1),
            AxisOrient::Left | AxisOrient::Right => (plot.y1, plot.y0),
        }
    }

    /// Returns `(value, position)` for every tick, plus the tick step.
    fn tick_positions(&self, plot: Rect) -> (Vec<(f64, f64)>, f64) {
        let range = self.range(plot);
        match self.scale {
            ScaleSpec::Linear(s) => {
                let scale = s.instantiate_resolved(range, self.tick_count);
                let ticks = scale.ticks(self.tick_count);
                let step = tick_step(&ticks);
                let (lo, hi) = ordered(scale.domain());
                let positions = ticks
                    .into_iter()
                    .filter(|v| *v >= lo - 1e-9 && *v <= hi + 1e-9)
                    .map(|v| (v, scale.map(v)))
                    .collect();
                (positions, step)
            }
            ScaleSpec::Band(s) => {
                let band = s.instantiate(range);
                let positions = (0..band.count())
                    .map(|i| (i as f64, band.center(i)))
                    .collect();
                (positions, 1.0)
            }
        }
    }

    fn format_tick(&self, v: f64, step: f64) -> String {
        match &self.tick_formatter {
            Some(f) => f(v, step),
            None => format_tick_with_step(v, step),
        }
    }

    fn rule(&self, id: u64, from: (f64, f64), to: (f64, f64)) -> Mark {
        RuleMarkSpec::new(MarkId::from_raw(id), from, to)
            .with_stroke(self.style.rule.clone())
            .with_z_index(z_order::AXIS_RULES)
            .mark()
    }

    /// Generate axis marks for the given plot rectangle and the strip reserved for this axis.
    ///
    /// `axis_rect` is the margin region adjacent to `plot`; the title is placed against its
    /// outer edge.
    pub fn marks(&self, plot: Rect, axis_rect: Rect) -> Vec<Mark> {
        let tick_size = self.tick_size.abs();
        let tick_extent = if self.ticks { tick_size } else { 0.0 };
        let label_offset = tick_extent + self.tick_padding.max(0.0);
        let (ticks, step) = self.tick_positions(plot);
        let mut out = Vec::new();

        if self.show_domain {
            let (from, to) = match self.orient {
                AxisOrient::Bottom => ((plot.x0, plot.y1), (plot.x1, plot.y1)),
                AxisOrient::Left => ((plot.x0, plot.y0), (plot.x0, plot.y1)),
                AxisOrient::Right => ((plot.x1, plot.y0), (plot.x1, plot.y1)),
            };
            out.push(self.rule(self.id_base, from, to));
        }

        for (i, (v, pos)) in ticks.into_iter().enumerate() {
            let i = i as u64;
            if self.ticks {
                let (from, to) = match self.orient {
                    AxisOrient::Bottom => ((pos, plot.y1), (pos, plot.y1 + tick_size)),
                    AxisOrient::Left => ((plot.x0, pos), (plot.x0 - tick_size, pos)),
                    AxisOrient::Right => ((plot.x1, pos), (plot.x1 + tick_size, pos)),
                };
                out.push(self.rule(self.id_base + 1 + i, from, to));
            }

            if self.labels {
                let (at, anchor, baseline) = match self.orient {
                    // Rotated labels hang from their end so they read up and away from the tick.
                    AxisOrient::Bottom if self.label_angle != 0.0 => (
                        (pos, plot.y1 + label_offset),
                        TextAnchor::End,
                        TextBaseline::Middle,
                    ),
                    AxisOrient::Bottom => (
                        (pos, plot.y1 + label_offset),
                        TextAnchor::Middle,
                        TextBaseline::Hanging,
                    ),
                    AxisOrient::Left => (
                        (plot.x0 - label_offset, pos),
                        TextAnchor::End,
                        TextBaseline::Middle,
                    ),
                    AxisOrient::Right => (
                        (plot.x1 + label_offset, pos),
                        TextAnchor::Start,
                        TextBaseline::Middle,
                    ),
                };
                out.push(
                    TextMarkSpec::new(
                        MarkId::from_raw(self.id_base + AXIS_LABEL_ID_OFFSET + i),
                        at,
                        self.format_tick(v, step),
                    )
                    .with_anchor(anchor)
                    .with_baseline(baseline)
                    .with_angle(self.label_angle)
                    .with_font_size(self.style.label_font_size)
                    .with_fill(self.style.label_fill.clone())
                    .with_z_index(z_order::AXIS_LABELS)
                    .mark(),
                );
            }
        }

        if let Some(title) = &self.title {
            let half = 0.5 * self.style.title_font_size;
            let (at, angle, baseline) = match self.orient {
                AxisOrient::Bottom => (
                    (0.5 * (plot.x0 + plot.x1), axis_rect.y1 - self.style.title_font_size),
                    0.0,
                    TextBaseline::Hanging,
                ),
                AxisOrient::Left => (
                    (axis_rect.x0 + half, 0.5 * (plot.y0 + plot.y1)),
                    -90.0,
                    TextBaseline::Middle,
                ),
                AxisOrient::Right => (
                    (axis_rect.x1 - half, 0.5 * (plot.y0 + plot.y1)),
                    90.0,
                    TextBaseline::Middle,
                ),
            };
            out.push(
                TextMarkSpec::new(MarkId::from_raw(self.id_base + AXIS_TITLE_ID_OFFSET), at, title.clone())
                    .with_anchor(TextAnchor::Middle)
                    .with_baseline(baseline)
                    .with_angle(angle)
                    .with_font_size(self.style.title_font_size)
                    .with_fill(self.style.title_fill.clone())
                    .with_z_index(z_order::AXIS_TITLES)
                    .mark(),
            );
        }

        out
    }
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn tick_step(ticks: &[f64]) -> f64 {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use riskviz_core::{Encoding, MarkEncodings, MarkKind, TextEncodings};

    use super::*;
    use crate::scale::{ScaleBandSpec, ScaleLinearSpec};

    fn label_texts(marks: &[Mark]) -> Vec<(u64, String)> {
        marks
            .iter()
            .filter(|m| m.kind == MarkKind::Text)
            .filter_map(|m| {
                let MarkEncodings::Text(e) = &m.encodings else {
                    return None;
                };
                let TextEncodings { text, .. } = e.as_ref();
                match text {
                    Encoding::Const(s) => Some((m.id.0, s.clone())),
                    Encoding::Compute { .. } => None,
                }
            })
            .collect()
    }

    #[test]
    fn band_axis_labels_every_band_through_the_formatter() {
        let codes = ["AAA", "BBB", "CCC"];
        let plot = Rect::new(110.0, 20.0, 410.0, 320.0);
        let axis = AxisSpec::bottom(100, ScaleBandSpec::new(3))
            .with_domain(false)
            .with_tick_size(5.0)
            .with_label_angle(-60.0)
            .with_tick_formatter(move |v, _| codes[v as usize].to_string());
        let marks = axis.marks(plot, Rect::new(110.0, 320.0, 410.0, 430.0));

        // Three ticks + three labels, no domain line.
        assert_eq!(marks.len(), 6);
        assert!(marks.iter().all(|m| m.id != MarkId::from_raw(100)));
        assert_eq!(
            label_texts(&marks),
            vec![
                (AXIS_LABEL_ID_OFFSET + 100, "AAA".to_string()),
                (AXIS_LABEL_ID_OFFSET + 101, "BBB".to_string()),
                (AXIS_LABEL_ID_OFFSET + 102, "CCC".to_string()),
            ]
        );
        for m in marks.iter().filter(|m| m.kind == MarkKind::Text) {
            let MarkEncodings::Text(e) = &m.encodings else {
                unreachable!();
            };
            assert_eq!(e.anchor, TextAnchor::End);
            assert!(matches!(e.angle, Encoding::Const(a) if a == -60.0));
            assert!(matches!(e.x, Encoding::Const(x) if x == 160.0 || x == 260.0 || x == 360.0));
        }
    }

    #[test]
    fn linear_axis_formats_ticks_by_step_and_adds_a_title() {
        let plot = Rect::new(50.0, 40.0, 650.0, 340.0);
        let axis = AxisSpec::left(200, ScaleLinearSpec::new((0.0, 37.0)).with_nice(true))
            .with_title("Frequency");
        let marks = axis.marks(plot, Rect::new(0.0, 40.0, 50.0, 340.0));
        let labels = label_texts(&marks);
        let label_id = |i: u64| AXIS_LABEL_ID_OFFSET + 200 + i;
        assert_eq!(labels.first(), Some(&(label_id(0), "0".to_string())));
        assert_eq!(
            labels.iter().find(|(id, _)| *id == label_id(4)).map(|(_, s)| s.as_str()),
            Some("20")
        );
        assert!(labels.contains(&(AXIS_TITLE_ID_OFFSET + 200, "Frequency".to_string())));
        assert!(marks.iter().any(|m| m.id == MarkId::from_raw(200)));
    }

    #[test]
    fn percent_axis_uses_custom_formatter() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let axis = AxisSpec::right(1, ScaleLinearSpec::new((0.0, 1.0)))
            .with_tick_formatter(|v, _| crate::format::percent_whole(v));
        let labels = label_texts(&axis.marks(plot, Rect::new(100.0, 0.0, 150.0, 100.0)));
        assert_eq!(labels.len(), 11);
        assert_eq!(labels[5].1, "50%");
        assert_eq!(labels[10].1, "100%");
    }
}
