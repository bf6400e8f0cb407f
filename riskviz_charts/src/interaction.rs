// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state shared between marks and the [`ChartView`](crate::ChartView).
//!
//! The hovered mark lives in a single scene signal. Hover-sensitive channels are computed from
//! that signal, so a pointer moving from one bar to the next re-evaluates exactly the two
//! affected marks.

use kurbo::{Point, Rect, Vec2};
use peniko::Brush;
use riskviz_core::{EvalCtx, InputRef, MarkBuilder, MarkId, SignalId};

/// Signal holding the currently hovered mark (`Option<MarkId>`).
pub const HOVER_SIGNAL: SignalId = SignalId(0);

pub(crate) const HOVER_DEP: InputRef = InputRef::Signal {
    signal: HOVER_SIGNAL,
};

/// Returns `true` while `me` is the hovered mark.
pub(crate) fn is_hovered(ctx: &EvalCtx<'_>, me: MarkId) -> bool {
    ctx.signal::<Option<MarkId>>(HOVER_SIGNAL).flatten() == Some(me)
}

/// A fill that switches to a highlight paint while its mark is hovered.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HoverFill {
    fill: Brush,
    hover: Brush,
}

impl HoverFill {
    pub(crate) fn new(fill: impl Into<Brush>, hover: impl Into<Brush>) -> Self {
        Self {
            fill: fill.into(),
            hover: hover.into(),
        }
    }

    pub(crate) fn apply(&self, builder: MarkBuilder) -> MarkBuilder {
        let fill = self.fill.clone();
        let hover = self.hover.clone();
        builder.fill_compute([HOVER_DEP], move |ctx, me| {
            if is_hovered(ctx, me) {
                hover.clone()
            } else {
                fill.clone()
            }
        })
    }
}

/// A pointer event in view coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// The pointer entered the view at a position.
    Enter(Point),
    /// The pointer moved within the view.
    Move(Point),
    /// The pointer left the view.
    Leave,
}

/// Where a tooltip is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TooltipPlacement {
    /// Centered above the hovered mark's bounds, `gap` units over its top edge.
    AboveMark {
        /// Distance between the mark and the tooltip.
        gap: f64,
    },
    /// Top-left corner at the pointer position plus `offset`.
    FollowPointer {
        /// Offset from the pointer.
        offset: Vec2,
    },
}

/// Which point of the tooltip box sits on [`Tooltip::anchor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TooltipAlign {
    /// The middle of the bottom edge.
    BottomCenter,
    /// The top-left corner.
    TopLeft,
}

/// A mark that reacts to the pointer, with the tooltip text it shows.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverTarget {
    /// The mark that is hit tested.
    pub mark: MarkId,
    /// Tooltip lines; an empty list shows no tooltip.
    pub lines: Vec<String>,
    /// Tooltip anchoring.
    pub placement: TooltipPlacement,
}

impl HoverTarget {
    /// Creates a hover target.
    pub fn new(mark: MarkId, lines: Vec<String>, placement: TooltipPlacement) -> Self {
        Self {
            mark,
            lines,
            placement,
        }
    }

    /// Resolves the visible tooltip for this target, or `None` if it has no text.
    ///
    /// `bounds` are the hovered mark's current bounds and `pointer` the pointer position.
    pub fn tooltip(&self, bounds: Option<Rect>, pointer: Point) -> Option<Tooltip> {
        if self.lines.is_empty() {
            return None;
        }
        let (anchor, align) = match self.placement {
            TooltipPlacement::AboveMark { gap } => {
                let b = bounds.unwrap_or_else(|| Rect::from_points(pointer, pointer));
                (
                    Point::new(0.5 * (b.x0 + b.x1), b.y0 - gap),
                    TooltipAlign::BottomCenter,
                )
            }
            TooltipPlacement::FollowPointer { offset } => (pointer + offset, TooltipAlign::TopLeft),
        };
        Some(Tooltip {
            mark: self.mark,
            lines: self.lines.clone(),
            anchor,
            align,
        })
    }
}

/// A visible tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    /// The mark this tooltip describes.
    pub mark: MarkId,
    /// Text lines, top to bottom.
    pub lines: Vec<String>,
    /// Anchor point in view coordinates.
    pub anchor: Point,
    /// How the tooltip box aligns to [`Tooltip::anchor`].
    pub align: TooltipAlign,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_mark_centers_over_the_bounds() {
        let target = HoverTarget::new(
            MarkId::from_raw(3),
            vec!["Frequency: 4".into()],
            TooltipPlacement::AboveMark { gap: 10.0 },
        );
        let tip = target
            .tooltip(Some(Rect::new(10.0, 50.0, 30.0, 90.0)), Point::new(12.0, 80.0))
            .unwrap();
        assert_eq!(tip.anchor, Point::new(20.0, 40.0));
        assert_eq!(tip.align, TooltipAlign::BottomCenter);
    }

    #[test]
    fn follow_pointer_offsets_the_pointer() {
        let target = HoverTarget::new(
            MarkId::from_raw(3),
            vec!["X".into()],
            TooltipPlacement::FollowPointer {
                offset: Vec2::new(-25.0, 10.0),
            },
        );
        let tip = target.tooltip(None, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(tip.anchor, Point::new(75.0, 110.0));
        assert_eq!(tip.align, TooltipAlign::TopLeft);
    }

    #[test]
    fn empty_lines_show_nothing() {
        let target = HoverTarget::new(
            MarkId::from_raw(3),
            Vec::new(),
            TooltipPlacement::AboveMark { gap: 10.0 },
        );
        assert_eq!(target.tooltip(None, Point::ZERO), None);
    }
}
