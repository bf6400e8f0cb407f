// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle mark generation (heatmap cells, histogram bars, backgrounds, swatches).

use kurbo::Rect;
use peniko::Brush;
use riskviz_core::{Mark, MarkId};

use crate::axis::StrokeStyle;
use crate::interaction::HoverFill;

/// A rectangle mark spec.
#[derive(Clone, Debug)]
pub struct RectMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Rectangle geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
    /// Fill while hovered; `None` keeps the fill constant.
    pub hover_fill: Option<Brush>,
    /// Optional outline.
    pub stroke: Option<StrokeStyle>,
    /// Rendering order hint (`riskviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl RectMarkSpec {
    /// Creates a new rectangle mark spec.
    pub fn new(id: MarkId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            fill: Brush::default(),
            hover_fill: None,
            stroke: None,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the fill used while the mark is hovered.
    pub fn with_hover_fill(mut self, hover_fill: impl Into<Brush>) -> Self {
        self.hover_fill = Some(hover_fill.into());
        self
    }

    /// Sets the outline.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates the mark.
    pub fn mark(&self) -> Mark {
        let mut builder = Mark::builder(self.id)
            .rect()
            .z_index(self.z_index)
            .rect_const(self.rect);

        builder = match &self.hover_fill {
            Some(hover) => HoverFill::new(self.fill.clone(), hover.clone()).apply(builder),
            None => builder.fill_brush_const(self.fill.clone()),
        };

        if let Some(stroke) = &self.stroke {
            builder = builder
                .stroke_brush_const(stroke.brush.clone())
                .stroke_width_const(stroke.stroke_width);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use peniko::color::palette::css;
    use riskviz_core::{MarkDiff, MarkPayload, Scene};

    use super::*;
    use crate::interaction::HOVER_SIGNAL;

    fn rect_payload(diff: &MarkDiff) -> &riskviz_core::RectChannels {
        let (MarkDiff::Enter { new, .. } | MarkDiff::Update { new, .. }) = diff else {
            panic!("expected an enter or update diff");
        };
        let MarkPayload::Rect(r) = &**new else {
            panic!("expected rect payload");
        };
        r
    }

    #[test]
    fn outline_and_geometry_are_constant() {
        let spec = RectMarkSpec::new(MarkId::from_raw(7), Rect::new(0.0, 0.0, 50.0, 20.0))
            .with_fill(css::WHITE)
            .with_stroke(StrokeStyle::solid(css::BLACK, 2.0));
        let mut scene = Scene::new();
        let diffs = scene.tick([spec.mark()]);
        let r = rect_payload(&diffs[0]);
        assert_eq!(r.rect, Rect::new(0.0, 0.0, 50.0, 20.0));
        assert_eq!(r.stroke, css::BLACK.into());
        assert_eq!(r.stroke_width, 2.0);
    }

    #[test]
    fn hover_fill_follows_the_hover_signal() {
        let id = MarkId::from_raw(7);
        let spec = RectMarkSpec::new(id, Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_fill(css::CRIMSON)
            .with_hover_fill(css::DARK_RED);
        let mut scene = Scene::new();
        scene.insert_signal::<Option<MarkId>>(HOVER_SIGNAL, None);
        let diffs = scene.tick([spec.mark()]);
        assert_eq!(rect_payload(&diffs[0]).fill, css::CRIMSON.into());

        scene.set_signal(HOVER_SIGNAL, Some(id)).unwrap();
        let diffs = scene.update();
        assert_eq!(rect_payload(&diffs[0]).fill, css::DARK_RED.into());

        // Hovering another mark restores the resting fill.
        scene
            .set_signal(HOVER_SIGNAL, Some(MarkId::from_raw(8)))
            .unwrap();
        let diffs = scene.update();
        assert_eq!(rect_payload(&diffs[0]).fill, css::CRIMSON.into());
    }
}
