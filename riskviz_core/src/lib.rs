// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `riskviz_core`: the retained mark runtime behind the risk charts.
//!
//! This crate provides:
//! - versioned inputs ([`Table`]/[`Signal`])
//! - stable mark identity ([`MarkId`])
//! - explicit dependency tracking ([`InputRef`])
//! - incremental evaluation + diff output ([`MarkDiff`])
//! - per-kind mark payloads ([`MarkPayload`]) with hit testing
//!
//! A chart renderer typically:
//! - stores derived records (histogram bins, slices) in a [`Table`] through [`TableData`]
//! - stores interaction state (the hovered mark) in a [`Signal`]
//! - builds one [`Mark`] per record with stable [`MarkId`]s, whose hover-sensitive channels are
//!   computed from that signal
//! - calls [`Scene::tick`] with the complete mark set and forwards the [`MarkDiff`] stream to a
//!   renderer.
//!
//! Ticking a scene with a new mark set replaces the previous one: marks that are not part of the
//! new set leave with an `Exit` diff.

#![no_std]

extern crate alloc;

use alloc::{boxed::Box, string::String, vec::Vec};
use core::any::Any;
use core::fmt;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use kurbo::{BezPath, Point, Rect, Shape};
use peniko::{Brush, Color};
use smallvec::SmallVec;

/// Monotonic version counter for inputs.
pub type Version = u64;

/// Stable identifier for a [`Table`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

/// Stable identifier for a [`Signal`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u32);

/// Stable identifier for a [`Mark`].
///
/// Ids must stay stable across renders for the same visual item so that re-rendering yields
/// `Update` diffs rather than `Exit` + `Enter` pairs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Create a mark id from a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the id `offset` slots after `self`.
    ///
    /// Renderers reserve an id block per layer and address per-record marks with this.
    pub const fn offset(self, offset: usize) -> Self {
        Self(self.0.wrapping_add(offset as u64))
    }
}

/// Stable identifier for a table column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColId(pub u32);

/// The geometric "kind" of a mark, which determines how channels are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// An axis-aligned rectangle using [`RectChannels`].
    Rect,
    /// A text item positioned at a point.
    Text,
    /// A vector path.
    Path,
}

/// An input reference used for dependency tracking.
///
/// These references are declared on computed encodings (see [`Encoding::Compute`]) and determine
/// what becomes dirty when tables/signals change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputRef {
    /// Reference an entire table.
    ///
    /// Use this when an encoding reads many rows (e.g. a curve through every bin).
    Table {
        /// The referenced table.
        table: TableId,
    },
    /// Reference a specific table column.
    TableCol {
        /// The referenced table.
        table: TableId,
        /// The referenced column.
        col: ColId,
    },
    /// Reference a signal.
    Signal {
        /// The referenced signal.
        signal: SignalId,
    },
}

/// A versioned set of rows with optional numeric column access.
#[derive(Debug)]
pub struct Table {
    /// Stable identifier.
    pub id: TableId,
    /// Monotonic version counter.
    pub version: Version,
    /// Stable keys for each row.
    pub row_keys: Vec<u64>,
    /// Optional columnar access for encodings.
    pub data: Option<Box<dyn TableData>>,
}

impl Table {
    /// Create a new table with version `1`.
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            version: 1,
            row_keys: Vec::new(),
            data: None,
        }
    }

    /// Create a table whose rows are `0..data.row_count()`.
    pub fn from_data(id: TableId, data: Box<dyn TableData>) -> Self {
        let row_keys = (0..data.row_count() as u64).collect();
        Self {
            id,
            version: 1,
            row_keys,
            data: Some(data),
        }
    }

    /// Increment the version counter.
    pub fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Return the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }
}

/// Numeric column access for table-driven mark encodings.
///
/// Computed encodings read values through [`EvalCtx::table_f64`].
pub trait TableData: fmt::Debug {
    /// Number of rows available via this accessor.
    fn row_count(&self) -> usize;

    /// Return a numeric value for a given row/column.
    fn f64(&self, row: usize, col: ColId) -> Option<f64>;
}

/// Type-erased access to a [`Signal`] for storage in a scene.
pub trait AnySignal: Any {
    /// Return the signal's stable identifier.
    fn id(&self) -> SignalId;
    /// Return the signal's version counter.
    fn version(&self) -> Version;
    /// Increment the version counter.
    fn bump(&mut self);
    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
    /// Downcast support (mutable).
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A versioned scalar value.
#[derive(Debug)]
pub struct Signal<T: Clone + 'static> {
    /// Stable identifier.
    pub id: SignalId,
    /// Monotonic version counter.
    pub version: Version,
    /// Current value.
    pub value: T,
}

impl<T: Clone + 'static> AnySignal for Signal<T> {
    fn id(&self) -> SignalId {
        self.id
    }
    fn version(&self) -> Version {
        self.version
    }
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Errors returned by typed signal accessors on [`Scene`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignalAccessError {
    /// A signal exists at the requested id, but its type does not match `T`.
    TypeMismatch,
}

impl fmt::Display for SignalAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch => f.write_str("signal exists with a different value type"),
        }
    }
}

impl core::error::Error for SignalAccessError {}

type ComputeFn<T> = dyn Fn(&EvalCtx<'_>, MarkId) -> T + 'static;

/// A single encoding channel on a mark: either a constant or a computed function.
///
/// When using [`Encoding::Compute`], the `deps` list must include all inputs the closure reads.
/// Dependency tracking is explicit; missing deps means missing updates.
pub enum Encoding<T> {
    /// A constant value.
    Const(T),
    /// A computed value, with explicit dependencies.
    Compute {
        /// The inputs that may affect this encoding.
        deps: SmallVec<[InputRef; 4]>,
        /// Compute the value for a given mark.
        f: Box<ComputeFn<T>>,
    },
}

impl<T: fmt::Debug> fmt::Debug for Encoding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Self::Compute { deps, .. } => f
                .debug_struct("Compute")
                .field("deps", deps)
                .field("f", &"<fn>")
                .finish(),
        }
    }
}

impl<T> Encoding<T> {
    fn compute(
        deps: impl IntoIterator<Item = InputRef>,
        f: impl Fn(&EvalCtx<'_>, MarkId) -> T + 'static,
    ) -> Self {
        Self::Compute {
            deps: deps.into_iter().collect(),
            f: Box::new(f),
        }
    }

    fn deps(&self) -> &[InputRef] {
        match self {
            Self::Const(_) => &[],
            Self::Compute { deps, .. } => deps,
        }
    }

    fn needs_update(&self, changed_inputs: &[InputRef]) -> bool {
        self.deps().iter().any(|d| changed_inputs.contains(d))
    }
}

impl<T: Clone> Encoding<T> {
    fn eval(&self, ctx: &EvalCtx<'_>, id: MarkId) -> T {
        match self {
            Self::Const(v) => v.clone(),
            Self::Compute { f, .. } => (f)(ctx, id),
        }
    }
}

/// Evaluated per-kind channels (payload) for a mark instance.
///
/// This is what renderers consume, what appears in [`MarkDiff`]s, and what pointer hit testing
/// runs against.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// An axis-aligned rectangle.
    Rect(RectChannels),
    /// A text item positioned at a point.
    Text(TextChannels),
    /// A vector path.
    Path(PathChannels),
}

impl MarkPayload {
    /// Return the kind of this payload.
    pub fn kind(&self) -> MarkKind {
        match self {
            Self::Rect(_) => MarkKind::Rect,
            Self::Text(_) => MarkKind::Text,
            Self::Path(_) => MarkKind::Path,
        }
    }

    /// Optional bounds hint for downstream damage calculation.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            // Text is unshaped here, so its extent is unknown.
            Self::Text(_) => None,
            Self::Path(p) => Some(p.path.bounding_box()),
        }
    }

    /// Returns `true` if `pt` lies inside the painted geometry of this mark.
    ///
    /// Rects test their rectangle; paths test the nonzero winding of their outline. Text never
    /// reports a hit.
    pub fn contains(&self, pt: Point) -> bool {
        match self {
            Self::Rect(r) => r.rect.contains(pt),
            Self::Text(_) => false,
            Self::Path(p) => p.path.contains(pt),
        }
    }
}

/// Evaluated channels for [`MarkKind::Rect`].
#[derive(Clone, Debug, PartialEq)]
pub struct RectChannels {
    /// Rectangle geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
    /// Outline paint.
    pub stroke: Brush,
    /// Outline width; `0` disables the outline.
    pub stroke_width: f64,
}

/// CSS-style numeric font weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Regular text (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold text (`700`).
    pub const BOLD: Self = Self(700);
}

/// Evaluated channels for [`MarkKind::Text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextChannels {
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content (unshaped).
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text rotation angle in degrees around [`TextChannels::pos`], positive is clockwise.
    ///
    /// Rotated column labels under a heatmap use `-60`.
    pub angle: f64,
    /// Horizontal text anchoring (how the glyphs align relative to [`TextChannels::pos`]).
    pub anchor: TextAnchor,
    /// Vertical alignment for text relative to [`TextChannels::pos`].
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

/// Horizontal anchoring for text.
///
/// In SVG terms, this maps to the `text-anchor` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Anchor at the start (left in LTR).
    Start,
    /// Anchor in the middle.
    Middle,
    /// Anchor at the end (right in LTR).
    End,
}

/// Vertical alignment for text.
///
/// In SVG terms, this maps to the `dominant-baseline` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Baseline is centered on the anchor point.
    Middle,
    /// Baseline is the font's alphabetic baseline.
    Alphabetic,
    /// Baseline is the font's hanging baseline.
    Hanging,
}

/// Evaluated channels for [`MarkKind::Path`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathChannels {
    /// The vector path geometry.
    pub path: BezPath,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

fn black() -> Brush {
    Brush::Solid(Color::from_rgba8(0, 0, 0, 255))
}

fn no_paint() -> Brush {
    Brush::Solid(Color::TRANSPARENT)
}

/// Declarative encodings for a mark.
///
/// A chart renderer builds `MarkEncodings` (usually through [`MarkBuilder`]) and the scene
/// evaluates them incrementally to produce [`MarkPayload`] diffs.
#[derive(Debug)]
pub enum MarkEncodings {
    /// Encodings for [`MarkKind::Rect`].
    Rect(Box<RectEncodings>),
    /// Encodings for [`MarkKind::Text`].
    Text(Box<TextEncodings>),
    /// Encodings for [`MarkKind::Path`].
    Path(Box<PathEncodings>),
}

impl MarkEncodings {
    fn kind(&self) -> MarkKind {
        match self {
            Self::Rect(_) => MarkKind::Rect,
            Self::Text(_) => MarkKind::Text,
            Self::Path(_) => MarkKind::Path,
        }
    }

    fn deps(&self) -> SmallVec<[InputRef; 8]> {
        let mut out = SmallVec::<[InputRef; 8]>::new();
        match self {
            Self::Rect(e) => {
                out.extend_from_slice(e.x.deps());
                out.extend_from_slice(e.y.deps());
                out.extend_from_slice(e.w.deps());
                out.extend_from_slice(e.h.deps());
                out.extend_from_slice(e.fill.deps());
                out.extend_from_slice(e.stroke.deps());
                out.extend_from_slice(e.stroke_width.deps());
            }
            Self::Text(e) => {
                out.extend_from_slice(e.x.deps());
                out.extend_from_slice(e.y.deps());
                out.extend_from_slice(e.text.deps());
                out.extend_from_slice(e.font_size.deps());
                out.extend_from_slice(e.angle.deps());
                out.extend_from_slice(e.fill.deps());
            }
            Self::Path(e) => {
                out.extend_from_slice(e.path.deps());
                out.extend_from_slice(e.fill.deps());
                out.extend_from_slice(e.stroke.deps());
                out.extend_from_slice(e.stroke_width.deps());
            }
        }
        out.sort();
        out.dedup();
        out
    }
}

/// Encodings for [`MarkKind::Rect`].
#[derive(Debug)]
pub struct RectEncodings {
    /// X position.
    pub x: Encoding<f64>,
    /// Y position.
    pub y: Encoding<f64>,
    /// Width.
    pub w: Encoding<f64>,
    /// Height.
    pub h: Encoding<f64>,
    /// Fill paint.
    pub fill: Encoding<Brush>,
    /// Outline paint.
    pub stroke: Encoding<Brush>,
    /// Outline width.
    pub stroke_width: Encoding<f64>,
}

/// Encodings for [`MarkKind::Text`].
///
/// Anchor, baseline and weight are layout choices fixed at build time; the remaining channels
/// may be computed.
#[derive(Debug)]
pub struct TextEncodings {
    /// X position.
    pub x: Encoding<f64>,
    /// Y position.
    pub y: Encoding<f64>,
    /// Text content.
    pub text: Encoding<String>,
    /// Font size.
    pub font_size: Encoding<f64>,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text rotation angle in degrees (see [`TextChannels::angle`]).
    pub angle: Encoding<f64>,
    /// Horizontal text anchoring.
    pub anchor: TextAnchor,
    /// Vertical alignment.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Encoding<Brush>,
}

/// Encodings for [`MarkKind::Path`].
#[derive(Debug)]
pub struct PathEncodings {
    /// Path geometry.
    pub path: Encoding<BezPath>,
    /// Fill paint.
    pub fill: Encoding<Brush>,
    /// Stroke paint.
    pub stroke: Encoding<Brush>,
    /// Stroke width.
    pub stroke_width: Encoding<f64>,
}

impl Default for RectEncodings {
    fn default() -> Self {
        Self {
            x: Encoding::Const(0.0),
            y: Encoding::Const(0.0),
            w: Encoding::Const(0.0),
            h: Encoding::Const(0.0),
            fill: Encoding::Const(black()),
            stroke: Encoding::Const(no_paint()),
            stroke_width: Encoding::Const(0.0),
        }
    }
}

impl Default for TextEncodings {
    fn default() -> Self {
        Self {
            x: Encoding::Const(0.0),
            y: Encoding::Const(0.0),
            text: Encoding::Const(String::new()),
            font_size: Encoding::Const(12.0),
            font_weight: FontWeight::NORMAL,
            angle: Encoding::Const(0.0),
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            fill: Encoding::Const(black()),
        }
    }
}

impl Default for PathEncodings {
    fn default() -> Self {
        Self {
            path: Encoding::Const(BezPath::new()),
            fill: Encoding::Const(black()),
            stroke: Encoding::Const(no_paint()),
            stroke_width: Encoding::Const(0.0),
        }
    }
}

/// A stable-identity visual instance with declarative encodings.
#[derive(Debug)]
pub struct Mark {
    /// Stable identifier.
    pub id: MarkId,
    /// Z-ordering for rendering; higher values are drawn above lower values.
    pub z_index: i32,
    /// The geometric kind of this mark.
    pub kind: MarkKind,
    /// Encodings for this mark's kind.
    pub encodings: MarkEncodings,
    /// Flattened dependency summary for quick dirtiness checks.
    pub deps: SmallVec<[InputRef; 8]>,
    /// Cached evaluated channels.
    pub cache: Option<MarkPayload>,
    cached_z_index: i32,
    /// Last versions observed for inputs.
    pub last_seen: HashMap<InputRef, Version>,
    force_eval: bool,
}

impl Mark {
    /// Create a rect mark with constant/default encodings.
    pub fn new(id: MarkId) -> Self {
        let mut m = Self {
            id,
            z_index: 0,
            kind: MarkKind::Rect,
            encodings: MarkEncodings::Rect(Box::default()),
            deps: SmallVec::new(),
            cache: None,
            cached_z_index: 0,
            last_seen: HashMap::new(),
            force_eval: false,
        };
        m.rebuild_deps();
        m
    }

    /// Rebuild [`Mark::deps`] from per-encoding deps.
    pub fn rebuild_deps(&mut self) {
        self.kind = self.encodings.kind();
        self.deps = self.encodings.deps();
    }

    /// Start building a mark with chainable encoding setters.
    pub fn builder(id: MarkId) -> MarkBuilder {
        MarkBuilder {
            mark: Self::new(id),
        }
    }
}

/// A builder for [`Mark`] that rebuilds dependencies on `build()`.
///
/// Setters that do not apply to the current kind are ignored.
#[derive(Debug)]
pub struct MarkBuilder {
    mark: Mark,
}

impl MarkBuilder {
    /// Set the mark z-index (rendering order).
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.mark.z_index = z_index;
        self
    }

    /// Set the mark kind, resetting its encodings to defaults.
    pub fn kind(mut self, kind: MarkKind) -> Self {
        self.mark.kind = kind;
        self.mark.encodings = match kind {
            MarkKind::Rect => MarkEncodings::Rect(Box::default()),
            MarkKind::Text => MarkEncodings::Text(Box::default()),
            MarkKind::Path => MarkEncodings::Path(Box::default()),
        };
        self
    }

    /// Convenience for `MarkKind::Rect`.
    pub fn rect(self) -> Self {
        self.kind(MarkKind::Rect)
    }

    /// Convenience for `MarkKind::Text`.
    pub fn text(self) -> Self {
        self.kind(MarkKind::Text)
    }

    /// Convenience for `MarkKind::Path`.
    pub fn path(self) -> Self {
        self.kind(MarkKind::Path)
    }

    fn set_x(mut self, enc: Encoding<f64>) -> Self {
        match &mut self.mark.encodings {
            MarkEncodings::Rect(e) => e.x = enc,
            MarkEncodings::Text(e) => e.x = enc,
            MarkEncodings::Path(_) => {}
        }
        self
    }

    fn set_y(mut self, enc: Encoding<f64>) -> Self {
        match &mut self.mark.encodings {
            MarkEncodings::Rect(e) => e.y = enc,
            MarkEncodings::Text(e) => e.y = enc,
            MarkEncodings::Path(_) => {}
        }
        self
    }

    fn set_fill(mut self, enc: Encoding<Brush>) -> Self {
        match &mut self.mark.encodings {
            MarkEncodings::Rect(e) => e.fill = enc,
            MarkEncodings::Text(e) => e.fill = enc,
            MarkEncodings::Path(e) => e.fill = enc,
        }
        self
    }

    /// Set the `x` encoding to a constant value.
    pub fn x_const(self, v: f64) -> Self {
        self.set_x(Encoding::Const(v))
    }

    /// Set the `x` encoding to a computed value.
    pub fn x_compute(
        self,
        deps: impl IntoIterator<Item = InputRef>,
        f: impl Fn(&EvalCtx<'_>, MarkId) -> f64 + 'static,
    ) -> Self {
        self.set_x(Encoding::compute(deps, f))
    }

    /// Set the `y` encoding to a constant value.
    pub fn y_const(self, v: f64) -> Self {
        self.set_y(Encoding::Const(v))
    }

    /// Set the `y` encoding to a computed value.
    pub fn y_compute(
        self,
        deps: impl IntoIterator<Item = InputRef>,
        f: impl Fn(&EvalCtx<'_>, MarkId) -> f64 + 'static,
    ) -> Self {
        self.set_y(Encoding::compute(deps, f))
    }

    /// Set the `w` encoding to a constant value (rect marks only).
    pub fn w_const(mut self, v: f64) -> Self {
        if let MarkEncodings::Rect(e) = &mut self.mark.encodings {
            e.w = Encoding::Const(v);
        }
        self
    }

    /// Set the `h` encoding to a constant value (rect marks only).
    pub fn h_const(mut self, v: f64) -> Self {
        if let MarkEncodings::Rect(e) = &mut self.mark.encodings {
            e.h = Encoding::Const(v);
        }
        self
    }

    /// Set `x`, `y`, `w` and `h` from a rectangle (rect marks only).
    pub fn rect_const(self, rect: Rect) -> Self {
        self.x_const(rect.x0)
            .y_const(rect.y0)
            .w_const(rect.width())
            .h_const(rect.height())
    }

    /// Set the `fill` encoding to a constant color.
    pub fn fill_const(self, v: Color) -> Self {
        self.set_fill(Encoding::Const(Brush::Solid(v)))
    }

    /// Set the `fill` encoding to a constant brush.
    pub fn fill_brush_const(self, v: impl Into<Brush>) -> Self {
        self.set_fill(Encoding::Const(v.into()))
    }

    /// Set the `fill` encoding to a computed value.
    pub fn fill_compute(
        self,
        deps: impl IntoIterator<Item = InputRef>,
        f: impl Fn(&EvalCtx<'_>, MarkId) -> Brush + 'static,
    ) -> Self {
        self.set_fill(Encoding::compute(deps, f))
    }

    /// Set the `text` encoding to a constant value (text marks only).
    pub fn text_const(mut self, v: impl Into<String>) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.text = Encoding::Const(v.into());
        }
        self
    }

    /// Set the `font_size` encoding to a constant value (text marks only).
    pub fn font_size_const(mut self, v: f64) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.font_size = Encoding::Const(v);
        }
        self
    }

    /// Set the font weight (text marks only).
    pub fn font_weight(mut self, weight: FontWeight) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.font_weight = weight;
        }
        self
    }

    /// Set the `angle` encoding to a constant value in degrees (text marks only).
    pub fn angle_const(mut self, v: f64) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.angle = Encoding::Const(v);
        }
        self
    }

    /// Set the text anchor (text marks only).
    pub fn text_anchor(mut self, anchor: TextAnchor) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.anchor = anchor;
        }
        self
    }

    /// Set the text baseline (text marks only).
    pub fn text_baseline(mut self, baseline: TextBaseline) -> Self {
        if let MarkEncodings::Text(e) = &mut self.mark.encodings {
            e.baseline = baseline;
        }
        self
    }

    /// Set the `path` encoding to a constant value (path marks only).
    pub fn path_const(mut self, v: BezPath) -> Self {
        if let MarkEncodings::Path(e) = &mut self.mark.encodings {
            e.path = Encoding::Const(v);
        }
        self
    }

    /// Set the `path` encoding to a computed value (path marks only).
    pub fn path_compute(
        mut self,
        deps: impl IntoIterator<Item = InputRef>,
        f: impl Fn(&EvalCtx<'_>, MarkId) -> BezPath + 'static,
    ) -> Self {
        if let MarkEncodings::Path(e) = &mut self.mark.encodings {
            e.path = Encoding::compute(deps, f);
        }
        self
    }

    /// Set the `stroke` encoding to a constant color (rect and path marks).
    pub fn stroke_const(self, v: Color) -> Self {
        self.stroke_brush_const(Brush::Solid(v))
    }

    /// Set the `stroke` encoding to a constant brush (rect and path marks).
    pub fn stroke_brush_const(mut self, v: impl Into<Brush>) -> Self {
        let v = v.into();
        match &mut self.mark.encodings {
            MarkEncodings::Rect(e) => e.stroke = Encoding::Const(v),
            MarkEncodings::Path(e) => e.stroke = Encoding::Const(v),
            MarkEncodings::Text(_) => {}
        }
        self
    }

    /// Set the `stroke_width` encoding to a constant value (rect and path marks).
    pub fn stroke_width_const(mut self, v: f64) -> Self {
        match &mut self.mark.encodings {
            MarkEncodings::Rect(e) => e.stroke_width = Encoding::Const(v),
            MarkEncodings::Path(e) => e.stroke_width = Encoding::Const(v),
            MarkEncodings::Text(_) => {}
        }
        self
    }

    /// Finish building and rebuild dependencies.
    pub fn build(mut self) -> Mark {
        self.mark.rebuild_deps();
        self.mark
    }
}

/// Read-only access to scene inputs during encoding evaluation.
pub struct EvalCtx<'a> {
    /// Tables available during evaluation.
    pub tables: &'a HashMap<TableId, Table>,
    /// Signals available during evaluation.
    pub signals: &'a HashMap<SignalId, Box<dyn AnySignal>>,
}

impl fmt::Debug for EvalCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalCtx")
            .field("tables_len", &self.tables.len())
            .field("signals_len", &self.signals.len())
            .finish()
    }
}

impl EvalCtx<'_> {
    fn table_version(&self, id: TableId) -> Option<Version> {
        self.tables.get(&id).map(|t| t.version)
    }

    fn signal_version(&self, id: SignalId) -> Option<Version> {
        self.signals.get(&id).map(|s| s.version())
    }

    /// Downcast and clone a signal value, if present and of type `T`.
    pub fn signal<T: Clone + 'static>(&self, id: SignalId) -> Option<T> {
        let s = self.signals.get(&id)?;
        let typed = s.as_any().downcast_ref::<Signal<T>>()?;
        Some(typed.value.clone())
    }

    /// Read a numeric table value, if a table data accessor is present.
    pub fn table_f64(&self, table: TableId, row: usize, col: ColId) -> Option<f64> {
        let t = self.tables.get(&table)?;
        let data = t.data.as_deref()?;
        data.f64(row, col)
    }

    /// Return the current table row count.
    pub fn table_row_count(&self, table: TableId) -> Option<usize> {
        self.tables.get(&table).map(Table::row_count)
    }
}

/// Mark-level diffs keyed by stable identity.
///
/// Payloads are boxed to keep `MarkDiff` itself reasonably sized.
#[derive(Debug)]
pub enum MarkDiff {
    /// A mark is newly present.
    Enter {
        /// Stable identifier.
        id: MarkId,
        /// Z-ordering for rendering; higher values are drawn above lower values.
        z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Newly evaluated channels.
        new: Box<MarkPayload>,
        /// Optional bounds hint for downstream damage calculation.
        bounds: Option<Rect>,
    },
    /// A mark exists and some channels changed.
    Update {
        /// Stable identifier.
        id: MarkId,
        /// Previous z-index.
        old_z_index: i32,
        /// New z-index.
        new_z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Previously cached channels.
        old: Box<MarkPayload>,
        /// Newly evaluated channels.
        new: Box<MarkPayload>,
        /// Union of old and new bounds when both are known.
        damage: Option<Rect>,
    },
    /// A mark was removed.
    Exit {
        /// Stable identifier.
        id: MarkId,
        /// Z-ordering for rendering.
        z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Cached channels, if this mark was previously evaluated.
        old: Option<Box<MarkPayload>>,
        /// Optional bounds hint for downstream damage calculation.
        bounds: Option<Rect>,
    },
}

impl MarkDiff {
    /// The id of the mark this diff concerns.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { id, .. } | Self::Update { id, .. } | Self::Exit { id, .. } => *id,
        }
    }

    /// Returns the best available damage rectangle for this diff.
    pub fn damage(&self) -> Option<Rect> {
        match self {
            Self::Enter { bounds, .. } => *bounds,
            Self::Update { damage, .. } => *damage,
            Self::Exit { bounds, .. } => *bounds,
        }
    }
}

/// A mutable collection of tables, signals, and marks, with incremental evaluation.
pub struct Scene {
    /// Tables keyed by [`TableId`].
    pub tables: HashMap<TableId, Table>,
    /// Signals keyed by [`SignalId`].
    pub signals: HashMap<SignalId, Box<dyn AnySignal>>,
    /// Marks keyed by [`MarkId`].
    pub marks: HashMap<MarkId, Mark>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("tables_len", &self.tables.len())
            .field("signals_len", &self.signals.len())
            .field("marks_len", &self.marks.len())
            .finish()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            signals: HashMap::new(),
            marks: HashMap::new(),
        }
    }

    /// Insert or replace a signal with an initial version of `1`.
    pub fn insert_signal<T: Clone + 'static>(&mut self, id: SignalId, value: T) {
        self.signals.insert(
            id,
            Box::new(Signal {
                id,
                version: 1,
                value,
            }),
        );
    }

    /// Insert a table, or replace the data of an existing table with the same id.
    ///
    /// Replacing bumps the version so that dependent marks re-evaluate.
    pub fn insert_table(&mut self, table: Table) {
        match self.tables.entry(table.id) {
            Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                existing.row_keys = table.row_keys;
                existing.data = table.data;
                existing.bump();
            }
            Entry::Vacant(e) => {
                e.insert(table);
            }
        }
    }

    /// Set a signal value and bump its version (inserting it if missing).
    ///
    /// Returns `Err(TypeMismatch)` if a signal exists at `id` with a different type.
    pub fn set_signal<T: Clone + 'static>(
        &mut self,
        id: SignalId,
        value: T,
    ) -> Result<(), SignalAccessError> {
        let Some(signal) = self.signals.get_mut(&id) else {
            self.insert_signal(id, value);
            return Ok(());
        };

        let typed = signal
            .as_any_mut()
            .downcast_mut::<Signal<T>>()
            .ok_or(SignalAccessError::TypeMismatch)?;

        typed.bump();
        typed.value = value;
        Ok(())
    }

    /// Get an immutable reference to a signal value, if present and of type `T`.
    pub fn signal_ref<T: Clone + 'static>(
        &self,
        id: SignalId,
    ) -> Result<Option<&T>, SignalAccessError> {
        let Some(signal) = self.signals.get(&id) else {
            return Ok(None);
        };
        let typed = signal
            .as_any()
            .downcast_ref::<Signal<T>>()
            .ok_or(SignalAccessError::TypeMismatch)?;
        Ok(Some(&typed.value))
    }

    /// Return the last evaluated payload of a mark.
    pub fn payload(&self, id: MarkId) -> Option<&MarkPayload> {
        self.marks.get(&id)?.cache.as_ref()
    }

    /// Return the evaluated payloads in paint order (ascending z-index, then id).
    pub fn payloads_in_paint_order(&self) -> Vec<(MarkId, &MarkPayload)> {
        let mut out: Vec<_> = self
            .marks
            .values()
            .filter_map(|m| m.cache.as_ref().map(|p| (m.z_index, m.id, p)))
            .collect();
        out.sort_by_key(|(z, id, _)| (*z, *id));
        out.into_iter().map(|(_, id, p)| (id, p)).collect()
    }

    /// Replace the scene's mark set (structural reconciliation).
    ///
    /// The provided marks are the complete mark set:
    /// - existing ids not present in `marks` are removed and returned as `Exit` diffs,
    /// - a mark whose [`MarkKind`] changes exits and re-enters on the next evaluation,
    /// - marks with ids that already exist keep their cached evaluation state and are
    ///   re-evaluated, so changed constants surface as `Update` diffs.
    pub fn set_marks<I>(&mut self, marks: I) -> Vec<MarkDiff>
    where
        I: IntoIterator<Item = Mark>,
    {
        let mut old_marks = core::mem::take(&mut self.marks);
        let mut exits = Vec::new();

        for mut mark in marks {
            mark.rebuild_deps();

            if let Some(old) = old_marks.remove(&mark.id) {
                if mark.kind != old.kind {
                    exits.push(exit_diff(old));
                } else {
                    mark.force_eval = true;
                    mark.cache = old.cache;
                    mark.cached_z_index = old.cached_z_index;
                    mark.last_seen = old.last_seen;
                }
            }

            self.marks.insert(mark.id, mark);
        }

        exits.extend(old_marks.into_values().map(exit_diff));
        exits
    }

    /// Perform a full tick: reconcile marks and evaluate diffs.
    pub fn tick<I>(&mut self, marks: I) -> Vec<MarkDiff>
    where
        I: IntoIterator<Item = Mark>,
    {
        let mut diffs = self.set_marks(marks);
        diffs.extend(self.update());
        diffs
    }

    /// Evaluate incremental updates and produce mark diffs.
    ///
    /// Use this when the mark set is stable and only input versions changed (tables/signals).
    pub fn update(&mut self) -> Vec<MarkDiff> {
        let ctx = EvalCtx {
            tables: &self.tables,
            signals: &self.signals,
        };
        let mut diffs = Vec::new();

        for mark in self.marks.values_mut() {
            let mut changed_inputs = SmallVec::<[InputRef; 8]>::new();

            for dep in mark.deps.iter().copied() {
                let v = match dep {
                    InputRef::Table { table } | InputRef::TableCol { table, .. } => {
                        ctx.table_version(table)
                    }
                    InputRef::Signal { signal } => ctx.signal_version(signal),
                };
                let Some(v) = v else { continue };
                let prev = mark.last_seen.insert(dep, v).unwrap_or(0);
                if v != prev {
                    changed_inputs.push(dep);
                }
            }

            let Some(old) = mark.cache.take() else {
                let new = eval_payload(&mark.encodings, &ctx, mark.id);
                diffs.push(MarkDiff::Enter {
                    id: mark.id,
                    z_index: mark.z_index,
                    kind: mark.kind,
                    new: Box::new(new.clone()),
                    bounds: new.bounds(),
                });
                mark.cache = Some(new);
                mark.cached_z_index = mark.z_index;
                mark.force_eval = false;
                continue;
            };

            let new = if mark.force_eval {
                eval_payload(&mark.encodings, &ctx, mark.id)
            } else if changed_inputs.is_empty() {
                old.clone()
            } else {
                let mut new = old.clone();
                update_payload(&mark.encodings, &ctx, mark.id, &changed_inputs, &mut new);
                new
            };

            if old != new || mark.cached_z_index != mark.z_index {
                let damage = union_bounds(old.bounds(), new.bounds());
                diffs.push(MarkDiff::Update {
                    id: mark.id,
                    old_z_index: mark.cached_z_index,
                    new_z_index: mark.z_index,
                    kind: mark.kind,
                    old: Box::new(old),
                    new: Box::new(new.clone()),
                    damage,
                });
            }
            mark.cache = Some(new);
            mark.cached_z_index = mark.z_index;
            mark.force_eval = false;
        }

        diffs
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_diff(old: Mark) -> MarkDiff {
    let bounds = old.cache.as_ref().and_then(MarkPayload::bounds);
    MarkDiff::Exit {
        id: old.id,
        z_index: old.z_index,
        kind: old.kind,
        old: old.cache.map(Box::new),
        bounds,
    }
}

fn union_bounds(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    Some(a?.union(b?))
}

fn normalized_rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x.min(x + w), y.min(y + h), x.max(x + w), y.max(y + h))
}

fn eval_payload(encodings: &MarkEncodings, ctx: &EvalCtx<'_>, id: MarkId) -> MarkPayload {
    match encodings {
        MarkEncodings::Rect(e) => MarkPayload::Rect(RectChannels {
            rect: normalized_rect(
                e.x.eval(ctx, id),
                e.y.eval(ctx, id),
                e.w.eval(ctx, id),
                e.h.eval(ctx, id),
            ),
            fill: e.fill.eval(ctx, id),
            stroke: e.stroke.eval(ctx, id),
            stroke_width: e.stroke_width.eval(ctx, id),
        }),
        MarkEncodings::Text(e) => MarkPayload::Text(TextChannels {
            pos: Point::new(e.x.eval(ctx, id), e.y.eval(ctx, id)),
            text: e.text.eval(ctx, id),
            font_size: e.font_size.eval(ctx, id),
            font_weight: e.font_weight,
            angle: e.angle.eval(ctx, id),
            anchor: e.anchor,
            baseline: e.baseline,
            fill: e.fill.eval(ctx, id),
        }),
        MarkEncodings::Path(e) => MarkPayload::Path(PathChannels {
            path: e.path.eval(ctx, id),
            fill: e.fill.eval(ctx, id),
            stroke: e.stroke.eval(ctx, id),
            stroke_width: e.stroke_width.eval(ctx, id),
        }),
    }
}

fn update_payload(
    encodings: &MarkEncodings,
    ctx: &EvalCtx<'_>,
    id: MarkId,
    changed: &[InputRef],
    payload: &mut MarkPayload,
) {
    match (encodings, payload) {
        (MarkEncodings::Rect(e), MarkPayload::Rect(p)) => {
            let geometry = [&e.x, &e.y, &e.w, &e.h];
            if geometry.iter().any(|enc| enc.needs_update(changed)) {
                p.rect = normalized_rect(
                    e.x.eval(ctx, id),
                    e.y.eval(ctx, id),
                    e.w.eval(ctx, id),
                    e.h.eval(ctx, id),
                );
            }
            if e.fill.needs_update(changed) {
                p.fill = e.fill.eval(ctx, id);
            }
            if e.stroke.needs_update(changed) {
                p.stroke = e.stroke.eval(ctx, id);
            }
            if e.stroke_width.needs_update(changed) {
                p.stroke_width = e.stroke_width.eval(ctx, id);
            }
        }
        (MarkEncodings::Text(e), MarkPayload::Text(p)) => {
            if e.x.needs_update(changed) {
                p.pos.x = e.x.eval(ctx, id);
            }
            if e.y.needs_update(changed) {
                p.pos.y = e.y.eval(ctx, id);
            }
            if e.text.needs_update(changed) {
                p.text = e.text.eval(ctx, id);
            }
            if e.font_size.needs_update(changed) {
                p.font_size = e.font_size.eval(ctx, id);
            }
            if e.angle.needs_update(changed) {
                p.angle = e.angle.eval(ctx, id);
            }
            if e.fill.needs_update(changed) {
                p.fill = e.fill.eval(ctx, id);
            }
        }
        (MarkEncodings::Path(e), MarkPayload::Path(p)) => {
            if e.path.needs_update(changed) {
                p.path = e.path.eval(ctx, id);
            }
            if e.fill.needs_update(changed) {
                p.fill = e.fill.eval(ctx, id);
            }
            if e.stroke.needs_update(changed) {
                p.stroke = e.stroke.eval(ctx, id);
            }
            if e.stroke_width.needs_update(changed) {
                p.stroke_width = e.stroke_width.eval(ctx, id);
            }
        }
        (encodings, payload) => *payload = eval_payload(encodings, ctx, id),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::format;

    const HOVER: SignalId = SignalId(1);

    fn hover_rect(id: MarkId) -> Mark {
        Mark::builder(id)
            .rect()
            .rect_const(Rect::new(0.0, 0.0, 10.0, 10.0))
            .fill_compute([InputRef::Signal { signal: HOVER }], move |ctx, me| {
                let hovered = ctx.signal::<Option<MarkId>>(HOVER).flatten();
                if hovered == Some(me) {
                    Brush::Solid(Color::from_rgba8(255, 165, 0, 255))
                } else {
                    Brush::Solid(Color::from_rgba8(70, 130, 180, 255))
                }
            })
            .build()
    }

    #[test]
    fn hover_signal_updates_only_the_dependent_channel() {
        let mut scene = Scene::new();
        scene.insert_signal::<Option<MarkId>>(HOVER, None);

        let id = MarkId(7);
        let diffs = scene.tick([hover_rect(id)]);
        assert!(matches!(&diffs[..], [MarkDiff::Enter { id: got, .. }] if *got == id));

        scene.set_signal(HOVER, Some(id)).unwrap();
        let diffs = scene.update();
        let [MarkDiff::Update { old, new, .. }] = &diffs[..] else {
            panic!("expected a single update diff");
        };
        let (MarkPayload::Rect(old), MarkPayload::Rect(new)) = (&**old, &**new) else {
            panic!("expected rect payloads");
        };
        assert_ne!(old.fill, new.fill);
        assert_eq!(old.rect, new.rect);

        // Nothing changed since the last update.
        assert!(scene.update().is_empty());
    }

    #[test]
    fn retick_with_same_marks_is_quiet() {
        let mut scene = Scene::new();
        scene.insert_signal::<Option<MarkId>>(HOVER, None);
        let _ = scene.tick([hover_rect(MarkId(1)), hover_rect(MarkId(2))]);

        let diffs = scene.tick([hover_rect(MarkId(1)), hover_rect(MarkId(2))]);
        assert!(diffs.is_empty(), "identical re-render should not emit diffs");
        assert_eq!(scene.marks.len(), 2);
    }

    #[test]
    fn retick_replaces_previous_marks() {
        let mut scene = Scene::new();
        let _ = scene.tick([Mark::new(MarkId(1)), Mark::new(MarkId(2))]);

        let diffs = scene.tick([Mark::builder(MarkId(2)).x_const(5.0).build()]);
        let exits: Vec<_> = diffs
            .iter()
            .filter(|d| matches!(d, MarkDiff::Exit { .. }))
            .map(MarkDiff::id)
            .collect();
        assert_eq!(exits, [MarkId(1)]);
        assert!(
            diffs
                .iter()
                .any(|d| matches!(d, MarkDiff::Update { id, .. } if *id == MarkId(2))),
            "changed constant should surface as an update"
        );
        assert_eq!(scene.marks.len(), 1);
    }

    #[test]
    fn kind_change_exits_and_reenters() {
        let mut scene = Scene::new();
        let id = MarkId(3);
        let _ = scene.tick([Mark::new(id)]);
        let diffs = scene.tick([Mark::builder(id).text().text_const("x").build()]);
        assert!(matches!(diffs[0], MarkDiff::Exit { kind: MarkKind::Rect, .. }));
        assert!(matches!(diffs[1], MarkDiff::Enter { kind: MarkKind::Text, .. }));
    }

    #[derive(Debug)]
    struct Column(Vec<f64>);

    impl TableData for Column {
        fn row_count(&self) -> usize {
            self.0.len()
        }

        fn f64(&self, row: usize, _col: ColId) -> Option<f64> {
            self.0.get(row).copied()
        }
    }

    #[test]
    fn replacing_table_data_reevaluates_dependents() {
        let mut scene = Scene::new();
        let table = TableId(4);
        scene.insert_table(Table::from_data(table, Box::new(Column(Vec::from([1.0, 2.0])))));

        let label = Mark::builder(MarkId(1))
            .text()
            .text_compute_for_test(table)
            .build();
        let _ = scene.tick([label]);

        scene.insert_table(Table::from_data(table, Box::new(Column(Vec::from([5.0])))));
        let diffs = scene.update();
        let [MarkDiff::Update { new, .. }] = &diffs[..] else {
            panic!("expected update");
        };
        let MarkPayload::Text(new) = &**new else {
            panic!("expected text payload");
        };
        assert_eq!(new.text, "rows=1 first=5");
    }

    impl MarkBuilder {
        fn text_compute_for_test(mut self, table: TableId) -> Self {
            if let MarkEncodings::Text(e) = &mut self.mark.encodings {
                e.text = Encoding::compute([InputRef::Table { table }], move |ctx, _| {
                    let rows = ctx.table_row_count(table).unwrap_or(0);
                    let first = ctx.table_f64(table, 0, ColId(0)).unwrap_or(f64::NAN);
                    format!("rows={rows} first={first}")
                });
            }
            self
        }
    }

    #[test]
    fn hit_testing_follows_geometry() {
        let rect = MarkPayload::Rect(RectChannels {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill: black(),
            stroke: no_paint(),
            stroke_width: 0.0,
        });
        assert!(rect.contains(Point::new(5.0, 5.0)));
        assert!(!rect.contains(Point::new(15.0, 5.0)));

        let mut triangle = BezPath::new();
        triangle.move_to((0.0, 0.0));
        triangle.line_to((10.0, 0.0));
        triangle.line_to((0.0, 10.0));
        triangle.close_path();
        let path = MarkPayload::Path(PathChannels {
            path: triangle,
            fill: black(),
            stroke: no_paint(),
            stroke_width: 0.0,
        });
        assert!(path.contains(Point::new(2.0, 2.0)));
        assert!(!path.contains(Point::new(9.0, 9.0)));
        assert!(path.bounds().is_some());
    }

    #[test]
    fn paint_order_sorts_by_z_then_id() {
        let mut scene = Scene::new();
        let _ = scene.tick([
            Mark::builder(MarkId(1)).z_index(5).build(),
            Mark::builder(MarkId(2)).z_index(1).build(),
            Mark::builder(MarkId(0)).z_index(5).build(),
        ]);
        let order: Vec<_> = scene
            .payloads_in_paint_order()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, [MarkId(2), MarkId(0), MarkId(1)]);
    }

    #[test]
    fn set_signal_type_mismatch_does_not_bump_version() {
        let mut scene = Scene::new();
        scene.insert_signal(HOVER, 1.0_f32);
        let before = scene.signals.get(&HOVER).unwrap().version();

        let err = scene.set_signal::<u32>(HOVER, 123_u32).unwrap_err();
        assert_eq!(err, SignalAccessError::TypeMismatch);
        assert_eq!(scene.signals.get(&HOVER).unwrap().version(), before);
        assert_eq!(scene.signal_ref::<f32>(HOVER).unwrap(), Some(&1.0));
    }
}
