// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule mark generation.
//!
//! A rule is a stroked straight segment: axis domain lines, tick marks and the VaR cutoff.

use kurbo::{BezPath, Point};
use peniko::Color;
use riskviz_core::{Mark, MarkId};

use crate::axis::StrokeStyle;
use crate::z_order;

/// A rule mark spec (a stroked line segment).
#[derive(Clone, Debug)]
pub struct RuleMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Start point in scene coordinates.
    pub from: Point,
    /// End point in scene coordinates.
    pub to: Point,
    /// Stroke paint and width.
    pub stroke: StrokeStyle,
    /// Rendering order hint (`riskviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl RuleMarkSpec {
    /// Creates a new rule between two points with a 1px black stroke.
    pub fn new(id: MarkId, from: impl Into<Point>, to: impl Into<Point>) -> Self {
        Self {
            id,
            from: from.into(),
            to: to.into(),
            stroke: StrokeStyle::default(),
            z_index: z_order::SERIES_STROKE,
        }
    }

    /// Creates a horizontal rule.
    pub fn horizontal(id: MarkId, y: f64, x0: f64, x1: f64) -> Self {
        Self::new(id, (x0, y), (x1, y))
    }

    /// Creates a vertical rule.
    pub fn vertical(id: MarkId, x: f64, y0: f64, y1: f64) -> Self {
        Self::new(id, (x, y0), (x, y1))
    }

    /// Sets the stroke.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates the rule mark.
    pub fn mark(&self) -> Mark {
        let mut p = BezPath::new();
        p.move_to(self.from);
        p.line_to(self.to);
        Mark::builder(self.id)
            .path()
            .path_const(p)
            .z_index(self.z_index)
            .fill_const(Color::TRANSPARENT)
            .stroke_brush_const(self.stroke.brush.clone())
            .stroke_width_const(self.stroke.stroke_width)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use peniko::color::palette::css;
    use riskviz_core::{MarkDiff, MarkPayload, Scene};

    use super::*;

    #[test]
    fn vertical_rule_is_a_stroked_segment() {
        let rule = RuleMarkSpec::vertical(MarkId::from_raw(1), 40.0, 0.0, 300.0)
            .with_stroke(StrokeStyle::solid(css::CRIMSON, 3.0));
        let mut scene = Scene::new();
        let diffs = scene.tick([rule.mark()]);
        let [MarkDiff::Enter { new, bounds, .. }] = &diffs[..] else {
            panic!("expected a single enter diff");
        };
        assert_eq!(*bounds, Some(Rect::new(40.0, 0.0, 40.0, 300.0)));
        let MarkPayload::Path(p) = &**new else {
            panic!("expected path payload");
        };
        assert_eq!(p.fill, Color::TRANSPARENT.into());
        assert_eq!(p.stroke, css::CRIMSON.into());
        assert_eq!(p.stroke_width, 3.0);
    }
}
