// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point mark generation.

use kurbo::{BezPath, Circle, Shape};
use peniko::Brush;
use riskviz_core::{ColId, InputRef, Mark, MarkId, TableId};

use crate::interaction::{HOVER_DEP, is_hovered};
use crate::scale::ScaleLinear;

/// Circle points derived from a table, one per row, that grow and recolor while hovered.
///
/// This generates one [`riskviz_core::MarkKind::Path`] mark per row; mark `i` has id
/// `id_base.offset(i)`.
#[derive(Clone, Debug)]
pub struct PointMarkSpec {
    /// Id of the mark for row 0.
    pub id_base: MarkId,
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
    /// Resting radius.
    pub radius: f64,
    /// Radius while hovered.
    pub hover_radius: f64,
    /// Resting fill.
    pub fill: Brush,
    /// Fill while hovered.
    pub hover_fill: Brush,
    /// Rendering order hint (`riskviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl PointMarkSpec {
    /// Creates a point mark spec with radius 1 (3 when hovered) and default fills.
    pub fn new(
        id_base: MarkId,
        table: TableId,
        x: ColId,
        y: ColId,
        x_scale: ScaleLinear,
        y_scale: ScaleLinear,
    ) -> Self {
        Self {
            id_base,
            table,
            x,
            y,
            x_scale,
            y_scale,
            radius: 1.0,
            hover_radius: 3.0,
            fill: Brush::default(),
            hover_fill: Brush::default(),
            z_index: crate::z_order::SERIES_POINTS,
        }
    }

    /// Sets resting and hovered radii.
    pub fn with_radius(mut self, radius: f64, hover_radius: f64) -> Self {
        self.radius = radius;
        self.hover_radius = hover_radius;
        self
    }

    /// Sets resting and hovered fills.
    pub fn with_fill(mut self, fill: impl Into<Brush>, hover_fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self.hover_fill = hover_fill.into();
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Returns the id of the mark for `row`.
    pub fn mark_id(&self, row: usize) -> MarkId {
        self.id_base.offset(row)
    }

    /// Generates one mark per row of the table.
    pub fn marks(&self, rows: usize) -> Vec<Mark> {
        (0..rows).map(|row| self.row_mark(row)).collect()
    }

    fn row_mark(&self, row: usize) -> Mark {
        let table = self.table;
        let (x_col, y_col) = (self.x, self.y);
        let (x_scale, y_scale) = (self.x_scale, self.y_scale);
        let (radius, hover_radius) = (self.radius, self.hover_radius);
        let fill = self.fill.clone();
        let hover_fill = self.hover_fill.clone();

        Mark::builder(self.mark_id(row))
            .path()
            .z_index(self.z_index)
            .path_compute(
                [
                    InputRef::TableCol { table, col: x_col },
                    InputRef::TableCol { table, col: y_col },
                    HOVER_DEP,
                ],
                move |ctx, me| {
                    let x = x_scale.map(ctx.table_f64(table, row, x_col).unwrap_or(0.0));
                    let y = y_scale.map(ctx.table_f64(table, row, y_col).unwrap_or(0.0));
                    let r = if is_hovered(ctx, me) {
                        hover_radius
                    } else {
                        radius
                    };
                    circle_path(x, y, r)
                },
            )
            .fill_compute([HOVER_DEP], move |ctx, me| {
                if is_hovered(ctx, me) {
                    hover_fill.clone()
                } else {
                    fill.clone()
                }
            })
            .stroke_width_const(0.0)
            .build()
    }
}

fn circle_path(cx: f64, cy: f64, r: f64) -> BezPath {
    Circle::new((cx, cy), r).path_elements(0.01).collect()
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};
    use peniko::color::palette::css;
    use riskviz_core::{MarkDiff, MarkPayload, Scene, Table, TableData};

    use super::*;
    use crate::interaction::HOVER_SIGNAL;

    #[derive(Debug)]
    struct Xy(Vec<(f64, f64)>);

    impl TableData for Xy {
        fn row_count(&self) -> usize {
            self.0.len()
        }

        fn f64(&self, row: usize, col: ColId) -> Option<f64> {
            let (x, y) = *self.0.get(row)?;
            match col.0 {
                0 => Some(x),
                1 => Some(y),
                _ => None,
            }
        }
    }

    fn bounds(scene: &Scene, id: MarkId) -> Rect {
        scene.payload(id).and_then(MarkPayload::bounds).unwrap()
    }

    #[test]
    fn points_grow_and_recolor_on_hover() {
        let table = TableId(1);
        let identity = ScaleLinear::new((0.0, 100.0), (0.0, 100.0));
        let spec = PointMarkSpec::new(
            MarkId::from_raw(100),
            table,
            ColId(0),
            ColId(1),
            identity,
            identity,
        )
        .with_fill(css::BLACK, css::ORANGE);

        let mut scene = Scene::new();
        scene.insert_signal::<Option<MarkId>>(HOVER_SIGNAL, None);
        scene.insert_table(Table::from_data(
            table,
            Box::new(Xy(vec![(10.0, 10.0), (50.0, 20.0)])),
        ));
        let diffs = scene.tick(spec.marks(2));
        assert_eq!(diffs.len(), 2);

        let second = spec.mark_id(1);
        assert_eq!(second, MarkId::from_raw(101));
        let b = bounds(&scene, second);
        assert!((b.width() - 2.0).abs() < 0.05);
        assert!(b.contains(Point::new(50.0, 20.0)));

        scene.set_signal(HOVER_SIGNAL, Some(second)).unwrap();
        let diffs = scene.update();
        let [MarkDiff::Update { id, new, .. }] = &diffs[..] else {
            panic!("expected a single update diff");
        };
        assert_eq!(*id, second);
        let MarkPayload::Path(p) = &**new else {
            panic!("expected path payload");
        };
        assert_eq!(p.fill, css::ORANGE.into());
        assert!((bounds(&scene, second).width() - 6.0).abs() < 0.05);
    }
}
