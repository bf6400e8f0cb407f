// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line interpolation.
//!
//! The cumulative-probability overlay accepts the classic d3 (v3) line interpolator names. Each
//! mode turns a polyline into a [`BezPath`] with the same control-point construction, so a curve
//! drawn here overlays one drawn by a browser exactly.

use core::fmt;
use core::str::FromStr;

use kurbo::{BezPath, Point, Vec2};

use crate::error::RenderError;

/// Tension used by [`Interpolation::Cardinal`].
const CARDINAL_TENSION: f64 = 0.7;

/// Slopes below this magnitude are treated as flat by [`Interpolation::Monotone`].
const FLAT_EPSILON: f64 = 1e-6;

/// How consecutive points of a line are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Straight segments.
    #[default]
    Linear,
    /// Horizontal-vertical-horizontal steps centered between points.
    Step,
    /// Vertical then horizontal steps.
    StepBefore,
    /// Horizontal then vertical steps.
    StepAfter,
    /// Uniform cubic B-spline; passes through the end points only.
    Basis,
    /// Cardinal spline through every point.
    Cardinal,
    /// Cubic interpolation that preserves monotonicity in `y`.
    Monotone,
}

impl Interpolation {
    /// All supported modes.
    pub const ALL: [Self; 7] = [
        Self::Linear,
        Self::Step,
        Self::StepBefore,
        Self::StepAfter,
        Self::Basis,
        Self::Cardinal,
        Self::Monotone,
    ];

    /// Returns the canonical name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Step => "step",
            Self::StepBefore => "step-before",
            Self::StepAfter => "step-after",
            Self::Basis => "basis",
            Self::Cardinal => "cardinal",
            Self::Monotone => "monotone",
        }
    }

    /// Builds the path through `points`.
    ///
    /// An empty slice yields an empty path and a single point yields a lone `MoveTo`. The
    /// spline modes fall back to straight segments below three points.
    pub fn path(self, points: &[Point]) -> BezPath {
        match self {
            Self::Linear => linear(points),
            Self::Step => step(points),
            Self::StepBefore => step_before(points),
            Self::StepAfter => step_after(points),
            Self::Basis => basis(points),
            Self::Cardinal => cardinal(points, CARDINAL_TENSION),
            Self::Monotone => monotone(points),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| RenderError::UnknownInterpolation(s.to_owned()))
    }
}

fn start(points: &[Point]) -> Option<(BezPath, Point)> {
    let first = *points.first()?;
    let mut path = BezPath::new();
    path.move_to(first);
    Some((path, first))
}

fn linear(points: &[Point]) -> BezPath {
    let Some((mut path, _)) = start(points) else {
        return BezPath::new();
    };
    for &p in &points[1..] {
        path.line_to(p);
    }
    path
}

fn step(points: &[Point]) -> BezPath {
    let Some((mut path, mut cur)) = start(points) else {
        return BezPath::new();
    };
    for &p in &points[1..] {
        let mid = 0.5 * (cur.x + p.x);
        path.line_to((mid, cur.y));
        path.line_to((mid, p.y));
        cur = p;
    }
    if points.len() > 1 {
        path.line_to(points[points.len() - 1]);
    }
    path
}

fn step_before(points: &[Point]) -> BezPath {
    let Some((mut path, mut cur)) = start(points) else {
        return BezPath::new();
    };
    for &p in &points[1..] {
        path.line_to((cur.x, p.y));
        path.line_to(p);
        cur = p;
    }
    path
}

fn step_after(points: &[Point]) -> BezPath {
    let Some((mut path, mut cur)) = start(points) else {
        return BezPath::new();
    };
    for &p in &points[1..] {
        path.line_to((p.x, cur.y));
        path.line_to(p);
        cur = p;
    }
    path
}

const BASIS_1: [f64; 4] = [0.0, 2.0 / 3.0, 1.0 / 3.0, 0.0];
const BASIS_2: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0];
const BASIS_3: [f64; 4] = [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];

fn dot4(weights: [f64; 4], window: &[Point; 4]) -> Point {
    let mut out = Point::ZERO;
    for (w, p) in weights.iter().zip(window) {
        out.x += w * p.x;
        out.y += w * p.y;
    }
    out
}

fn basis(points: &[Point]) -> BezPath {
    if points.len() < 3 {
        return linear(points);
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let mut window = [first, first, first, points[1]];

    let mut path = BezPath::new();
    path.move_to(first);
    path.line_to(dot4(BASIS_3, &window));

    // The last point is repeated once so the spline reaches it.
    for &p in points[2..].iter().chain(core::iter::once(&last)) {
        window.rotate_left(1);
        window[3] = p;
        path.curve_to(
            dot4(BASIS_1, &window),
            dot4(BASIS_2, &window),
            dot4(BASIS_3, &window),
        );
    }
    path.line_to(last);
    path
}

fn cardinal(points: &[Point], tension: f64) -> BezPath {
    if points.len() < 3 {
        return linear(points);
    }
    let a = (1.0 - tension) / 2.0;
    let tangents: Vec<Vec2> = points
        .windows(3)
        .map(|w| a * (w[2] - w[0]))
        .collect();
    hermite(points, &tangents)
}

fn slope(p0: Point, p1: Point) -> f64 {
    (p1.y - p0.y) / (p1.x - p0.x)
}

fn monotone(points: &[Point]) -> BezPath {
    if points.len() < 3 {
        return linear(points);
    }
    let last = points.len() - 1;

    // Finite differences: one-sided at the ends, averaged secant slopes inside.
    let secants: Vec<f64> = points.windows(2).map(|w| slope(w[0], w[1])).collect();
    let mut m = Vec::with_capacity(points.len());
    m.push(secants[0]);
    m.extend(secants.windows(2).map(|s| 0.5 * (s[0] + s[1])));
    m.push(secants[last - 1]);

    // Fritsch-Carlson constraint.
    for (i, &d) in secants.iter().enumerate() {
        if d.abs() < FLAT_EPSILON {
            m[i] = 0.0;
            m[i + 1] = 0.0;
        } else {
            let a = m[i] / d;
            let b = m[i + 1] / d;
            let s = a * a + b * b;
            if s > 9.0 {
                let s = d * 3.0 / s.sqrt();
                m[i] = s * a;
                m[i + 1] = s * b;
            }
        }
    }

    let tangents: Vec<Vec2> = (0..=last)
        .map(|i| {
            let span = points[(i + 1).min(last)].x - points[i.saturating_sub(1)].x;
            let s = span / (6.0 * (1.0 + m[i] * m[i]));
            let tx = if s.is_finite() { s } else { 0.0 };
            let ty = m[i] * s;
            Vec2::new(tx, if ty.is_finite() { ty } else { 0.0 })
        })
        .collect();
    hermite(points, &tangents)
}

/// Joins `points` with cubic Hermite segments.
///
/// `tangents` either has one entry per point, or one per interior point; in the latter case the
/// first and last segments are quadratic.
fn hermite(points: &[Point], tangents: &[Vec2]) -> BezPath {
    let quad = points.len() != tangents.len();
    if tangents.is_empty() || (quad && points.len() != tangents.len() + 2) {
        return linear(points);
    }

    let mut path = BezPath::new();
    path.move_to(points[0]);

    let t0 = tangents[0];
    let mut p0 = points[0];
    let mut p = points[1];
    let mut t = t0;
    let mut pi = 1;

    if quad {
        path.quad_to(p - t0 * (2.0 / 3.0), p);
        p0 = points[1];
        pi = 2;
    }

    if tangents.len() > 1 {
        t = tangents[1];
        p = points[pi];
        pi += 1;
        path.curve_to(p0 + t0, p - t, p);
        for &next_t in &tangents[2..] {
            // Smooth continuation: the first control point mirrors the previous second one.
            let c1 = p + t;
            p = points[pi];
            t = next_t;
            pi += 1;
            path.curve_to(c1, p - t, p);
        }
    }

    if quad {
        path.quad_to(p + t * (2.0 / 3.0), points[pi]);
    }
    path
}
