// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line mark generation.

use kurbo::Point;
use peniko::Color;
use riskviz_core::{ColId, InputRef, Mark, MarkId, TableId};

use crate::axis::StrokeStyle;
use crate::curve::Interpolation;
use crate::scale::ScaleLinear;

/// A line mark derived from a table.
///
/// This generates a single [`riskviz_core::MarkKind::Path`] mark through every row, joined
/// with the chosen [`Interpolation`].
#[derive(Clone, Debug)]
pub struct LineMarkSpec {
    /// Stable-id for the mark emitted by this spec.
    pub id: MarkId,
    /// Source table id.
    pub table: TableId,
    /// Column for x values.
    pub x: ColId,
    /// Column for y values.
    pub y: ColId,
    /// X scale mapping data x into scene x.
    pub x_scale: ScaleLinear,
    /// Y scale mapping data y into scene y.
    pub y_scale: ScaleLinear,
    /// How consecutive rows are joined.
    pub interpolation: Interpolation,
    /// Stroke style for the line.
    pub stroke: StrokeStyle,
    /// Rendering order hint (`riskviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl LineMarkSpec {
    /// Creates a straight-segment line spec with a black stroke at width 1.
    pub fn new(
        id: MarkId,
        table: TableId,
        x: ColId,
        y: ColId,
        x_scale: ScaleLinear,
        y_scale: ScaleLinear,
    ) -> Self {
        Self {
            id,
            table,
            x,
            y,
            x_scale,
            y_scale,
            interpolation: Interpolation::Linear,
            stroke: StrokeStyle::default(),
            z_index: crate::z_order::SERIES_STROKE,
        }
    }

    /// Sets the interpolation mode.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the stroke style.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates the line mark.
    pub fn mark(&self) -> Mark {
        let table_id = self.table;
        let x_col = self.x;
        let y_col = self.y;
        let x_scale = self.x_scale;
        let y_scale = self.y_scale;
        let interpolation = self.interpolation;

        Mark::builder(self.id)
            .path()
            .z_index(self.z_index)
            .path_compute([InputRef::Table { table: table_id }], move |ctx, _| {
                let n = ctx.table_row_count(table_id).unwrap_or(0);
                let points: Vec<Point> = (0..n)
                    .map(|row| {
                        let x = ctx.table_f64(table_id, row, x_col).unwrap_or(0.0);
                        let y = ctx.table_f64(table_id, row, y_col).unwrap_or(0.0);
                        Point::new(x_scale.map(x), y_scale.map(y))
                    })
                    .collect();
                interpolation.path(&points)
            })
            .fill_const(Color::TRANSPARENT)
            .stroke_brush_const(self.stroke.brush.clone())
            .stroke_width_const(self.stroke.stroke_width)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::PathEl;
    use peniko::color::palette::css;
    use riskviz_core::{MarkPayload, Scene, Table, TableData};

    use super::*;

    #[derive(Debug)]
    struct Ramp(usize);

    impl TableData for Ramp {
        fn row_count(&self) -> usize {
            self.0
        }

        fn f64(&self, row: usize, _col: ColId) -> Option<f64> {
            (row < self.0).then_some(row as f64)
        }
    }

    #[test]
    fn line_follows_table_rows_and_reacts_to_new_data() {
        let table = TableId(4);
        let spec = LineMarkSpec::new(
            MarkId::from_raw(1),
            table,
            ColId(0),
            ColId(1),
            ScaleLinear::new((0.0, 10.0), (0.0, 100.0)),
            ScaleLinear::new((0.0, 10.0), (100.0, 0.0)),
        )
        .with_interpolation(Interpolation::StepAfter)
        .with_stroke(StrokeStyle::solid(css::DARK_SLATE_GRAY, 1.5));

        let mut scene = Scene::new();
        scene.insert_table(Table::from_data(table, Box::new(Ramp(3))));
        scene.tick([spec.mark()]);
        let Some(MarkPayload::Path(p)) = scene.payload(spec.id) else {
            panic!("expected path payload");
        };
        // Three rows joined by two horizontal-then-vertical steps.
        assert_eq!(p.path.elements().len(), 5);
        assert_eq!(p.path.elements()[1], PathEl::LineTo(Point::new(10.0, 100.0)));
        assert_eq!(p.stroke_width, 1.5);

        scene.insert_table(Table::from_data(table, Box::new(Ramp(4))));
        let diffs = scene.update();
        assert_eq!(diffs.len(), 1);
        let Some(MarkPayload::Path(p)) = scene.payload(spec.id) else {
            panic!("expected path payload");
        };
        assert_eq!(p.path.elements().len(), 7);
    }
}
