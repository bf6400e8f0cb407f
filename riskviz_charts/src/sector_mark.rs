// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sector (arc) mark generation for donut slices.

use core::f64::consts::FRAC_PI_2;

use kurbo::{BezPath, Circle, Point, Shape};
use peniko::Brush;
use riskviz_core::{Mark, MarkId};

use crate::axis::StrokeStyle;
use crate::interaction::HoverFill;

/// A sector (annular slice), suitable for pie/donut charts.
///
/// Angles are in radians measured clockwise from 12 o'clock, the convention pie layouts use.
#[derive(Clone, Debug)]
pub struct SectorMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Center in scene coordinates.
    pub center: Point,
    /// Inner radius in scene coordinates (0 for a pie slice).
    pub inner_radius: f64,
    /// Outer radius in scene coordinates.
    pub outer_radius: f64,
    /// Start angle in radians.
    pub start_angle: f64,
    /// End angle in radians.
    pub end_angle: f64,
    /// Fill paint for the sector.
    pub fill: Brush,
    /// Fill while hovered; `None` keeps the fill constant.
    pub hover_fill: Option<Brush>,
    /// Optional outline stroke.
    pub stroke: Option<StrokeStyle>,
    /// Curve flattening tolerance when converting the sector to a `BezPath`.
    pub tolerance: f64,
    /// Rendering order hint (`riskviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl SectorMarkSpec {
    /// Creates a new sector mark spec.
    pub fn new(
        id: MarkId,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Self {
            id,
            center,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
            fill: Brush::default(),
            hover_fill: None,
            stroke: None,
            tolerance: 0.1,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the fill used while the sector is hovered.
    pub fn with_hover_fill(mut self, hover_fill: impl Into<Brush>) -> Self {
        self.hover_fill = Some(hover_fill.into());
        self
    }

    /// Sets the outline stroke.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Returns the outline of this sector.
    pub fn path(&self) -> BezPath {
        let circle = Circle::new(self.center, self.outer_radius);
        let sweep = self.end_angle - self.start_angle;
        // Scene y grows downward, so kurbo angles already run clockwise; shift the origin from
        // 3 o'clock to 12 o'clock.
        let segment = circle.segment(self.inner_radius, self.start_angle - FRAC_PI_2, sweep);
        segment.path_elements(self.tolerance).collect()
    }

    /// Generates the sector mark.
    pub fn mark(&self) -> Mark {
        let mut builder = Mark::builder(self.id)
            .path()
            .path_const(self.path())
            .z_index(self.z_index);

        builder = match &self.hover_fill {
            Some(hover) => HoverFill::new(self.fill.clone(), hover.clone()).apply(builder),
            None => builder.fill_brush_const(self.fill.clone()),
        };

        match &self.stroke {
            Some(stroke) => builder
                .stroke_brush_const(stroke.brush.clone())
                .stroke_width_const(stroke.stroke_width)
                .build(),
            None => builder.stroke_width_const(0.0).build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use peniko::color::palette::css;
    use riskviz_core::{MarkDiff, MarkKind, MarkPayload, Scene};

    use super::*;

    #[test]
    fn sector_emits_a_path_mark_with_bounds() {
        let sector = SectorMarkSpec::new(
            MarkId::from_raw(1),
            Point::new(50.0, 50.0),
            10.0,
            20.0,
            0.0,
            FRAC_PI_2,
        )
        .with_fill(css::TOMATO)
        .with_stroke(StrokeStyle::solid(css::BLACK, 2.0));

        let mut scene = Scene::new();
        let diffs = scene.tick([sector.mark()]);
        let [
            MarkDiff::Enter {
                id,
                kind,
                new,
                bounds,
                ..
            },
        ] = &diffs[..]
        else {
            panic!("expected a single enter diff");
        };
        assert_eq!(*id, MarkId::from_raw(1));
        assert_eq!(*kind, MarkKind::Path);
        assert!(bounds.is_some());

        let MarkPayload::Path(p) = &**new else {
            panic!("expected path payload");
        };
        assert_eq!(p.fill, css::TOMATO.into());
        assert_eq!(p.stroke, css::BLACK.into());
        assert_eq!(p.stroke_width, 2.0);
    }

    #[test]
    fn first_quarter_sweeps_from_twelve_to_three_oclock() {
        let sector = SectorMarkSpec::new(
            MarkId::from_raw(1),
            Point::new(0.0, 0.0),
            60.0,
            90.0,
            0.0,
            FRAC_PI_2,
        );
        let path = sector.path();
        // Inside the band, upper-right quadrant (scene y grows downward).
        assert!(path.contains(Point::new(50.0, -50.0)));
        // The hole and the other quadrants stay empty.
        assert!(!path.contains(Point::new(10.0, -10.0)));
        assert!(!path.contains(Point::new(-50.0, -50.0)));
        assert!(!path.contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn full_turn_covers_the_ring() {
        let sector =
            SectorMarkSpec::new(MarkId::from_raw(1), Point::new(0.0, 0.0), 60.0, 90.0, 0.0, 2.0 * PI);
        let path = sector.path();
        for pt in [(75.0, 0.0), (0.0, 75.0), (-75.0, 0.0), (20.0, -70.0)] {
            assert!(path.contains(Point::new(pt.0, pt.1)), "{pt:?}");
        }
        assert!(!path.contains(Point::ZERO));
    }
}
