// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Correlation matrix heatmap.
//!
//! One cell per `(row, col)` pair of a square covariance matrix, colored along a two-stop
//! gradient over the off-diagonal values, with the value printed in the cell and product codes
//! along the bottom and left edges.

use kurbo::Rect;
use riskviz_core::{Mark, MarkDiff, MarkId, TextAnchor};
use serde::Deserialize;

use crate::axis::{AxisSpec, AxisStyle, StrokeStyle};
use crate::color::{ColorRamp, RampSpace};
use crate::config::MatrixStyle;
use crate::error::{RenderError, check_finite, check_len};
use crate::format::to_fixed;
use crate::interaction::{HoverTarget, TooltipPlacement};
use crate::rect_mark::RectMarkSpec;
use crate::scale::{ScaleBand, ScaleBandSpec, extent};
use crate::text_mark::TextMarkSpec;
use crate::view::{ChartView, Frame};
use crate::z_order;

const BACKGROUND_ID: u64 = 1;
const CELL_IDS: u64 = 1 << 32;
const VALUE_IDS: u64 = 2 << 32;
const COLUMN_AXIS_IDS: u64 = 3 << 32;
const ROW_AXIS_IDS: u64 = 4 << 32;

/// Input of [`render_correlation_matrix`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationInput {
    /// Full product names, used in tooltips.
    pub product_name: Vec<String>,
    /// Short product codes, used as axis labels.
    pub product_code: Vec<String>,
    /// Square covariance matrix; `None` marks a missing value.
    pub covariance: Vec<Vec<Option<f64>>>,
}

/// One cell of the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixCell {
    /// Covariance value, if present.
    pub value: Option<f64>,
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl MatrixCell {
    /// Whether the cell sits on the diagonal.
    pub fn is_diagonal(&self) -> bool {
        self.row == self.col
    }

    /// The value shown in the cell and used for coloring: `None` on the diagonal.
    pub fn display_value(&self) -> Option<f64> {
        if self.is_diagonal() { None } else { self.value }
    }
}

impl CorrelationInput {
    /// Number of products (matrix rows).
    pub fn len(&self) -> usize {
        self.covariance.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.covariance.is_empty()
    }

    /// Checks that the matrix is square, matches the label lists, and holds finite values.
    pub fn validate(&self) -> Result<(), RenderError> {
        let n = self.len();
        if n == 0 {
            return Err(RenderError::EmptyMatrix);
        }
        if let Some((row, r)) = self.covariance.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(RenderError::NonSquareMatrix {
                row,
                len: r.len(),
                expected: n,
            });
        }
        check_len("productName", n, self.product_name.len())?;
        check_len("productCode", n, self.product_code.len())?;
        check_finite(
            "covariance",
            self.covariance.iter().flatten().map(|v| v.unwrap_or(0.0)),
        )
    }

    /// Returns the `n²` cells in row-major order.
    pub fn cells(&self) -> Vec<MatrixCell> {
        self.covariance
            .iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .map(move |(col, value)| MatrixCell {
                        value: *value,
                        row,
                        col,
                    })
            })
            .collect()
    }

    /// Returns the `(min, max)` of the present off-diagonal values.
    ///
    /// `None` when no off-diagonal value is present (a single product, or only missing values);
    /// such a matrix has no colored cell.
    pub fn color_domain(&self) -> Option<(f64, f64)> {
        extent(self.cells().iter().filter_map(MatrixCell::display_value))
    }

    fn tooltip_lines(&self, cell: &MatrixCell) -> Vec<String> {
        if cell.is_diagonal() {
            return Vec::new();
        }
        let value = match cell.value {
            Some(v) => format!("{v}"),
            None => "missing".to_string(),
        };
        vec![
            format!(
                "{} vs {}",
                self.product_name[cell.row], self.product_name[cell.col]
            ),
            value,
        ]
    }
}

/// Everything derived from the input and style before any mark is built.
struct MatrixContext<'a> {
    input: &'a CorrelationInput,
    style: &'a MatrixStyle,
    view_box: Rect,
    plot: Rect,
    x: ScaleBand,
    y: ScaleBand,
    domain: Option<(f64, f64)>,
    ramp: Option<ColorRamp>,
}

impl<'a> MatrixContext<'a> {
    fn new(input: &'a CorrelationInput, style: &'a MatrixStyle) -> Self {
        let domain = input.color_domain();
        let n = input.len();
        let plot = style.margins.plot_rect(style.width, style.height);
        Self {
            input,
            style,
            view_box: style.margins.view_box(style.width, style.height),
            plot,
            x: ScaleBand::new((plot.x0, plot.x1), n),
            y: ScaleBand::new((plot.y0, plot.y1), n),
            ramp: domain
                .map(|d| ColorRamp::new(d, style.start_color, style.end_color, RampSpace::Rgb)),
            domain,
        }
    }

    /// Whether `v` sits on the dark half of the gradient and needs the light label color.
    fn is_dark(&self, v: f64) -> bool {
        self.domain.is_some_and(|(_, max)| v >= max / 2.0)
    }

    fn grid_stroke(&self) -> StrokeStyle {
        StrokeStyle::solid(self.style.grid_color, self.style.grid_width)
    }

    fn cell_rect(&self, cell: &MatrixCell) -> Rect {
        let x0 = self.x.x(cell.col);
        let y0 = self.y.x(cell.row);
        Rect::new(x0, y0, x0 + self.x.band_width(), y0 + self.y.band_width())
    }

    fn background(&self) -> Mark {
        RectMarkSpec::new(MarkId::from_raw(BACKGROUND_ID), self.plot)
            .with_fill(self.style.empty_color)
            .with_stroke(self.grid_stroke())
            .with_z_index(z_order::PLOT_BACKGROUND)
            .mark()
    }

    fn cell(&self, index: usize, cell: &MatrixCell) -> Mark {
        let spec = RectMarkSpec::new(MarkId::from_raw(CELL_IDS).offset(index), self.cell_rect(cell))
            .with_stroke(self.grid_stroke());
        let fill = match (cell.display_value(), &self.ramp) {
            (Some(v), Some(ramp)) => ramp.color_at(v),
            _ => self.style.empty_color,
        };
        let spec = spec.with_fill(fill);
        let spec = if cell.is_diagonal() {
            spec
        } else {
            spec.with_hover_fill(self.style.hover_color)
        };
        spec.mark()
    }

    fn value_label(&self, index: usize, cell: &MatrixCell) -> Mark {
        let (text, fill) = match cell.display_value() {
            Some(v) if self.is_dark(v) => (
                to_fixed(v, self.style.value_digits),
                self.style.text_color_dark,
            ),
            Some(v) => (to_fixed(v, self.style.value_digits), self.style.text_color),
            None => (String::new(), self.style.text_color),
        };
        TextMarkSpec::new(
            MarkId::from_raw(VALUE_IDS).offset(index),
            self.cell_rect(cell).center(),
            text,
        )
        .with_anchor(TextAnchor::Middle)
        .with_font_size(self.style.font_size)
        .with_fill(fill)
        .with_z_index(z_order::SERIES_LABELS)
        .mark()
    }

    fn axis_style(&self) -> AxisStyle {
        AxisStyle {
            label_font_size: self.style.font_size,
            ..AxisStyle::default()
        }
    }

    fn label_axes(&self) -> Vec<Mark> {
        let n = self.input.len();
        let codes = self.input.product_code.clone();
        let columns = AxisSpec::bottom(COLUMN_AXIS_IDS, ScaleBandSpec::new(n))
            .with_domain(false)
            .with_tick_size(self.style.tick_size)
            .with_label_angle(self.style.column_label_angle)
            .with_style(self.axis_style())
            .with_tick_formatter(move |v, _| code_at(&codes, v));
        let codes = self.input.product_code.clone();
        let rows = AxisSpec::left(ROW_AXIS_IDS, ScaleBandSpec::new(n))
            .with_domain(false)
            .with_tick_size(self.style.tick_size)
            .with_style(self.axis_style())
            .with_tick_formatter(move |v, _| code_at(&codes, v));

        let below = Rect::new(self.plot.x0, self.plot.y1, self.plot.x1, self.view_box.y1);
        let left = Rect::new(self.view_box.x0, self.plot.y0, self.plot.x0, self.plot.y1);
        let mut marks = columns.marks(self.plot, below);
        marks.extend(rows.marks(self.plot, left));
        marks
    }

    fn frame(&self) -> Frame {
        let cells = self.input.cells();
        let mut marks = Vec::with_capacity(2 * cells.len() + 4 * self.input.len() + 1);
        let mut targets = Vec::with_capacity(cells.len());

        marks.push(self.background());
        for (i, cell) in cells.iter().enumerate() {
            marks.push(self.cell(i, cell));
            marks.push(self.value_label(i, cell));
            targets.push(HoverTarget::new(
                MarkId::from_raw(CELL_IDS).offset(i),
                self.input.tooltip_lines(cell),
                TooltipPlacement::AboveMark { gap: 10.0 },
            ));
        }
        marks.extend(self.label_axes());

        Frame {
            view_box: self.view_box,
            tables: Vec::new(),
            marks,
            targets,
        }
    }
}

fn code_at(codes: &[String], band: f64) -> String {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "band axes pass small non-negative band indices"
    )]
    let i = band as usize;
    codes.get(i).cloned().unwrap_or_default()
}

/// Returns the mark id of the cell at `(row, col)` in an `n`-product matrix.
pub fn matrix_cell_id(n: usize, row: usize, col: usize) -> MarkId {
    MarkId::from_raw(CELL_IDS).offset(row * n + col)
}

/// Renders the correlation matrix into `view`, replacing its contents.
///
/// On error the view is left untouched.
pub fn render_correlation_matrix(
    view: &mut ChartView,
    input: &CorrelationInput,
    style: &MatrixStyle,
) -> Result<Vec<MarkDiff>, RenderError> {
    input.validate()?;
    let ctx = MatrixContext::new(input, style);
    tracing::debug!(
        products = input.len(),
        domain = ?ctx.domain,
        "rendering correlation matrix"
    );
    Ok(view.replace(ctx.frame()))
}
