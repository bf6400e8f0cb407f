// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend mark generation.
//!
//! A vertical list of color swatches with text labels, as drawn in the hole of the donut chart.

use kurbo::Point;
use peniko::color::palette::css;
use peniko::{Brush, Color};
use riskviz_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::axis::StrokeStyle;
use crate::rect_mark::RectMarkSpec;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// Offset from `id_base` of the first label id.
pub const LEGEND_LABEL_ID_OFFSET: usize = 1 << 20;

/// A simple legend row item.
#[derive(Clone, Debug)]
pub struct LegendItem {
    /// The label string shown next to the swatch.
    pub label: String,
    /// The swatch fill paint.
    pub fill: Brush,
}

impl LegendItem {
    /// Convenience constructor for a solid-color swatch.
    pub fn solid(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            fill: Brush::Solid(color),
        }
    }
}

/// An unpositioned legend: swatch geometry, label style and items.
#[derive(Clone, Debug)]
pub struct LegendSwatchesSpec {
    /// Stable-id base; swatch `i` uses `id_base + i`, label `i` uses
    /// `id_base + LEGEND_LABEL_ID_OFFSET + i`.
    pub id_base: MarkId,
    /// Swatch square size.
    pub swatch_size: f64,
    /// Gap between rows, and between a swatch and its label.
    pub spacing: f64,
    /// Label font size.
    pub font_size: f64,
    /// Label color.
    pub text_fill: Brush,
    /// Items in display order.
    pub items: Vec<LegendItem>,
}

impl LegendSwatchesSpec {
    /// Creates a legend with 18px swatches spaced 4px apart.
    pub fn new(id_base: MarkId, items: Vec<LegendItem>) -> Self {
        Self {
            id_base,
            swatch_size: 18.0,
            spacing: 4.0,
            font_size: 12.0,
            text_fill: css::BLACK.into(),
            items,
        }
    }

    /// Set the swatch size and spacing.
    pub fn with_swatch_size(mut self, swatch_size: f64, spacing: f64) -> Self {
        self.swatch_size = swatch_size;
        self.spacing = spacing;
        self
    }

    /// Set the label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the label text paint.
    pub fn with_text_fill(mut self, text_fill: impl Into<Brush>) -> Self {
        self.text_fill = text_fill.into();
        self
    }

    /// Distance between the tops of consecutive rows.
    pub fn row_pitch(&self) -> f64 {
        self.swatch_size + self.spacing
    }

    /// Returns the origin that centers the rows vertically on `center`, with the swatch column
    /// starting two swatches to its left.
    pub fn centered_origin(&self, center: Point) -> Point {
        let offset = self.row_pitch() * self.items.len() as f64 / 2.0;
        Point::new(center.x - 2.0 * self.swatch_size, center.y - offset)
    }

    /// Creates a positioned legend with its first swatch's top-left corner at `origin`.
    pub fn at(&self, origin: Point) -> LegendSwatches {
        LegendSwatches {
            spec: self.clone(),
            origin,
        }
    }
}

/// A positioned legend.
#[derive(Clone, Debug)]
pub struct LegendSwatches {
    spec: LegendSwatchesSpec,
    origin: Point,
}

impl LegendSwatches {
    /// Generate legend marks (swatch rect + label text per item).
    pub fn marks(&self) -> Vec<Mark> {
        let spec = &self.spec;
        let size = spec.swatch_size;
        let mut out = Vec::with_capacity(2 * spec.items.len());

        for (i, item) in spec.items.iter().enumerate() {
            let top = self.origin.y + i as f64 * spec.row_pitch();

            out.push(
                RectMarkSpec::new(
                    spec.id_base.offset(i),
                    kurbo::Rect::new(self.origin.x, top, self.origin.x + size, top + size),
                )
                .with_fill(item.fill.clone())
                .with_stroke(StrokeStyle::solid(item.fill.clone(), 1.0))
                .with_z_index(z_order::LEGEND_SWATCHES)
                .mark(),
            );

            // The label baseline sits `spacing` above the swatch bottom.
            out.push(
                TextMarkSpec::new(
                    spec.id_base.offset(LEGEND_LABEL_ID_OFFSET + i),
                    (self.origin.x + size + spec.spacing, top + size - spec.spacing),
                    item.label.clone(),
                )
                .with_font_size(spec.font_size)
                .with_fill(spec.text_fill.clone())
                .with_anchor(TextAnchor::Start)
                .with_baseline(TextBaseline::Alphabetic)
                .with_z_index(z_order::LEGEND_LABELS)
                .mark(),
            );
        }
        out
    }
}
