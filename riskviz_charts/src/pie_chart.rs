// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Donut chart of portfolio shares with a legend in the hole.

use core::f64::consts::TAU;

use kurbo::{Point, Rect, Vec2};
use riskviz_core::{Mark, MarkDiff, MarkId};
use serde::Deserialize;

use crate::color::{ColorRamp, RampSpace};
use crate::config::PieStyle;
use crate::error::{RenderError, check_finite, check_len};
use crate::format::to_fixed;
use crate::interaction::{HoverTarget, TooltipPlacement};
use crate::legend::{LegendItem, LegendSwatchesSpec};
use crate::sector_mark::SectorMarkSpec;
use crate::view::{ChartView, Frame};

const SLICE_IDS: u64 = 1 << 32;
const LEGEND_IDS: u64 = 2 << 32;

/// Input of [`render_pie_chart`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PieInput {
    /// Slice names.
    pub product: Vec<String>,
    /// Slice values; angles are proportional to these.
    pub value: Vec<f64>,
    /// Slice shares as fractions of one, shown in tooltips.
    pub percentage: Vec<f64>,
}

/// One annotated slice.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    /// Slice name.
    pub identity: String,
    /// Raw slice value.
    pub value: f64,
    /// Share in percent, rounded to two decimals.
    pub percentage: f64,
    /// Position of the slice in the input.
    pub id: usize,
}

impl PieSlice {
    /// Tooltip text: name, raw value and share.
    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            self.identity.clone(),
            format!("{}", self.value),
            format!("{}%", to_fixed(self.percentage, 2)),
        ]
    }
}

impl PieInput {
    /// Checks lengths and values.
    ///
    /// Shares that do not add up to one are accepted with a warning.
    pub fn validate(&self) -> Result<(), RenderError> {
        let n = self.product.len();
        if n == 0 {
            return Err(RenderError::EmptySlices);
        }
        check_len("value", n, self.value.len())?;
        check_len("percentage", n, self.percentage.len())?;
        check_finite("value", self.value.iter().copied())?;
        check_finite("percentage", self.percentage.iter().copied())?;
        if let Some((index, &value)) = self.value.iter().enumerate().find(|(_, v)| **v < 0.0) {
            return Err(RenderError::NegativeValue { index, value });
        }
        if self.value.iter().sum::<f64>() <= 0.0 {
            return Err(RenderError::ZeroTotal);
        }

        let share: f64 = self.percentage.iter().sum();
        if (share - 1.0).abs() > 0.0001 * n as f64 {
            tracing::warn!(share, slices = n, "pie percentages do not sum to one");
        }
        Ok(())
    }

    /// Returns the slices in input order.
    pub fn slices(&self) -> Vec<PieSlice> {
        self.product
            .iter()
            .zip(&self.value)
            .zip(&self.percentage)
            .enumerate()
            .map(|(id, ((identity, &value), &share))| PieSlice {
                identity: identity.clone(),
                value,
                percentage: (share * 100.0 * 100.0).round() / 100.0,
                id,
            })
            .collect()
    }
}

/// Returns the mark id of slice `i`.
pub fn pie_slice_id(i: usize) -> MarkId {
    MarkId::from_raw(SLICE_IDS).offset(i)
}

/// Everything derived from the input and style before any mark is built.
struct PieContext<'a> {
    style: &'a PieStyle,
    slices: Vec<PieSlice>,
    total: f64,
    view_box: Rect,
    center: Point,
    outer_radius: f64,
    inner_radius: f64,
    ramp: ColorRamp,
}

impl<'a> PieContext<'a> {
    fn new(input: &PieInput, style: &'a PieStyle) -> Self {
        let slices = input.slices();
        let radius = 0.5 * style.width.min(style.height);
        let last = slices.len().saturating_sub(1) as f64;
        Self {
            style,
            total: slices.iter().map(|s| s.value).sum(),
            view_box: Rect::new(0.0, 0.0, style.width, style.height),
            center: Point::new(0.5 * style.width, 0.5 * style.height),
            outer_radius: style.outer_radius * radius,
            inner_radius: style.inner_radius * radius,
            ramp: ColorRamp::new((0.0, last), style.start_color, style.end_color, RampSpace::Hcl),
            slices,
        }
    }

    fn sectors(&self) -> Vec<SectorMarkSpec> {
        let mut start = 0.0;
        self.slices
            .iter()
            .map(|slice| {
                let end = start + TAU * slice.value / self.total;
                let sector = SectorMarkSpec::new(
                    pie_slice_id(slice.id),
                    self.center,
                    self.inner_radius,
                    self.outer_radius,
                    start,
                    end,
                )
                .with_fill(self.ramp.color_at(slice.id as f64));
                start = end;
                sector
            })
            .collect()
    }

    fn legend(&self) -> Vec<Mark> {
        let items = self
            .slices
            .iter()
            .map(|s| LegendItem::solid(s.identity.clone(), self.ramp.color_at(s.id as f64)))
            .collect();
        let legend = LegendSwatchesSpec::new(MarkId::from_raw(LEGEND_IDS), items)
            .with_swatch_size(self.style.legend_swatch_size, self.style.legend_spacing)
            .with_font_size(self.style.legend_font_size);
        legend.at(legend.centered_origin(self.center)).marks()
    }

    fn frame(&self) -> Frame {
        let [dx, dy] = self.style.tooltip_offset;
        let placement = TooltipPlacement::FollowPointer {
            offset: Vec2::new(dx, dy),
        };
        let mut marks: Vec<Mark> = self.sectors().iter().map(SectorMarkSpec::mark).collect();
        marks.extend(self.legend());
        let targets = self
            .slices
            .iter()
            .map(|s| HoverTarget::new(pie_slice_id(s.id), s.tooltip_lines(), placement))
            .collect();

        Frame {
            view_box: self.view_box,
            tables: Vec::new(),
            marks,
            targets,
        }
    }
}

/// Renders the donut chart into `view`, replacing its contents.
///
/// Slices sweep clockwise from 12 o'clock in input order. On error the view is left untouched.
pub fn render_pie_chart(
    view: &mut ChartView,
    input: &PieInput,
    style: &PieStyle,
) -> Result<Vec<MarkDiff>, RenderError> {
    input.validate()?;
    let ctx = PieContext::new(input, style);
    tracing::debug!(slices = ctx.slices.len(), total = ctx.total, "rendering pie chart");
    Ok(view.replace(ctx.frame()))
}
