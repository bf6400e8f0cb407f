// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text labels: cell values, axis and legend labels, annotations and titles.

use kurbo::{Point, Vec2};
use peniko::Brush;
use riskviz_core::{FontWeight, Mark, MarkId, TextAnchor, TextBaseline};

/// Font and paint of a label.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Fill paint.
    pub fill: Brush,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            font_weight: FontWeight::NORMAL,
            fill: Brush::default(),
        }
    }
}

impl TextStyle {
    /// A regular-weight style.
    pub fn new(font_size: f64, fill: impl Into<Brush>) -> Self {
        Self {
            font_size,
            font_weight: FontWeight::NORMAL,
            fill: fill.into(),
        }
    }

    /// The same style in bold.
    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::BOLD;
        self
    }
}

/// One unshaped text label.
#[derive(Clone, Debug)]
pub struct TextMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content.
    pub text: String,
    /// Font and paint.
    pub style: TextStyle,
    /// Clockwise rotation around `pos`, in degrees.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Paint order.
    pub z_index: i32,
}

impl TextMarkSpec {
    /// Creates a start-anchored, vertically centered label in the default style.
    pub fn new(id: MarkId, pos: impl Into<Point>, text: impl Into<String>) -> Self {
        Self {
            id,
            pos: pos.into(),
            text: text.into(),
            style: TextStyle::default(),
            angle: 0.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            z_index: crate::z_order::TITLES,
        }
    }

    /// Lays out `lines` top to bottom, `line_height` apart, the first one at `pos`.
    ///
    /// Line `i` gets the id `id_base + i`.
    pub fn stacked(
        id_base: MarkId,
        pos: impl Into<Point>,
        line_height: f64,
        lines: impl IntoIterator<Item = String>,
    ) -> Vec<Self> {
        let pos = pos.into();
        lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                Self::new(
                    id_base.offset(i),
                    pos + Vec2::new(0.0, line_height * i as f64),
                    text,
                )
            })
            .collect()
    }

    /// Replaces the font and paint.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.style.font_size = font_size;
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.style.fill = fill.into();
        self
    }

    /// Sets the horizontal anchor.
    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the baseline.
    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Sets the rotation in degrees.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the paint order.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builds the mark; every channel is constant.
    pub fn mark(&self) -> Mark {
        Mark::builder(self.id)
            .text()
            .z_index(self.z_index)
            .x_const(self.pos.x)
            .y_const(self.pos.y)
            .text_const(self.text.clone())
            .font_size_const(self.style.font_size)
            .font_weight(self.style.font_weight)
            .fill_brush_const(self.style.fill.clone())
            .text_anchor(self.anchor)
            .text_baseline(self.baseline)
            .angle_const(self.angle)
            .build()
    }
}
