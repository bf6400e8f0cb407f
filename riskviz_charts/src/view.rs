// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render target shared by all chart renderers.

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use riskviz_core::{Mark, MarkDiff, MarkId, MarkPayload, Scene, Table};

use crate::interaction::{HOVER_SIGNAL, HoverTarget, PointerEvent, Tooltip};

/// Everything one render produces for a view.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) view_box: Rect,
    pub(crate) tables: Vec<Table>,
    pub(crate) marks: Vec<Mark>,
    pub(crate) targets: Vec<HoverTarget>,
}

/// A chart surface: the retained scene, its hover targets and the visible tooltip.
///
/// Renderers replace the whole content of a view; pointer events are then delivered through
/// [`ChartView::handle_pointer`], which returns the incremental diffs caused by hover changes.
#[derive(Debug)]
pub struct ChartView {
    scene: Scene,
    view_box: Rect,
    targets: HashMap<MarkId, HoverTarget>,
    hovered: Option<MarkId>,
    tooltip: Option<Tooltip>,
}

impl Default for ChartView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartView {
    /// Creates an empty view.
    pub fn new() -> Self {
        let mut scene = Scene::new();
        scene.insert_signal::<Option<MarkId>>(HOVER_SIGNAL, None);
        Self {
            scene,
            view_box: Rect::ZERO,
            targets: HashMap::new(),
            hovered: None,
            tooltip: None,
        }
    }

    /// The retained scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The drawing extent of the current chart.
    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    /// Current mark payloads in paint order.
    pub fn marks(&self) -> Vec<(MarkId, &MarkPayload)> {
        self.scene.payloads_in_paint_order()
    }

    /// The hover target registered for `mark`, if any.
    pub fn target(&self, mark: MarkId) -> Option<&HoverTarget> {
        self.targets.get(&mark)
    }

    /// Number of registered hover targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The hovered mark.
    pub fn hovered(&self) -> Option<MarkId> {
        self.hovered
    }

    /// The visible tooltip.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Replaces the content of this view, clearing hover state.
    pub(crate) fn replace(&mut self, frame: Frame) -> Vec<MarkDiff> {
        let Frame {
            view_box,
            tables,
            marks,
            targets,
        } = frame;

        self.view_box = view_box;
        self.hovered = None;
        self.tooltip = None;
        self.set_hover(None);

        self.scene
            .tables
            .retain(|id, _| tables.iter().any(|t| t.id == *id));
        for table in tables {
            self.scene.insert_table(table);
        }
        self.targets = targets.into_iter().map(|t| (t.mark, t)).collect();

        let diffs = self.scene.tick(marks);
        tracing::debug!(
            marks = self.scene.marks.len(),
            targets = self.targets.len(),
            diffs = diffs.len(),
            "replaced view content"
        );
        diffs
    }

    /// Returns the top-most hover target under `pt`.
    pub fn hit_test(&self, pt: Point) -> Option<MarkId> {
        self.scene
            .payloads_in_paint_order()
            .into_iter()
            .rev()
            .find(|(id, payload)| self.targets.contains_key(id) && payload.contains(pt))
            .map(|(id, _)| id)
    }

    /// Routes a pointer event, updating hover state and the tooltip.
    ///
    /// Returns the mark diffs caused by the hover change (empty when the hovered mark did not
    /// change).
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<MarkDiff> {
        let (hit, pointer) = match event {
            PointerEvent::Enter(pt) | PointerEvent::Move(pt) => (self.hit_test(pt), Some(pt)),
            PointerEvent::Leave => (None, None),
        };

        let diffs = if hit != self.hovered {
            tracing::trace!(?hit, previous = ?self.hovered, "hover changed");
            self.hovered = hit;
            self.set_hover(hit);
            self.scene.update()
        } else {
            Vec::new()
        };

        self.tooltip = match (hit, pointer) {
            (Some(id), Some(pt)) => self.targets.get(&id).and_then(|target| {
                let bounds = self.scene.payload(id).and_then(MarkPayload::bounds);
                target.tooltip(bounds, pt)
            }),
            _ => None,
        };
        diffs
    }

    fn set_hover(&mut self, hovered: Option<MarkId>) {
        if let Err(err) = self.scene.set_signal(HOVER_SIGNAL, hovered) {
            tracing::warn!(%err, "hover signal has an unexpected type");
        }
    }
}

#[cfg(test)]
mod tests {
    use peniko::color::palette::css;

    use super::*;
    use crate::interaction::{HoverFill, TooltipPlacement};

    fn two_boxes() -> Frame {
        let marks = (0..2_u32)
            .map(|i| {
                let x = 10.0 + 30.0 * f64::from(i);
                let b = Mark::builder(MarkId::from_raw(u64::from(i) + 1))
                    .rect()
                    .rect_const(Rect::new(x, 10.0, x + 20.0, 30.0));
                HoverFill::new(css::STEEL_BLUE, css::ORANGE).apply(b).build()
            })
            .collect();
        let targets = (0..2_u64)
            .map(|i| {
                HoverTarget::new(
                    MarkId::from_raw(i + 1),
                    vec![format!("box {i}")],
                    TooltipPlacement::AboveMark { gap: 10.0 },
                )
            })
            .collect();
        Frame {
            view_box: Rect::new(0.0, 0.0, 100.0, 40.0),
            tables: Vec::new(),
            marks,
            targets,
        }
    }

    fn fill_of(diff: &MarkDiff) -> peniko::Brush {
        match diff {
            MarkDiff::Update { new, .. } => match &**new {
                MarkPayload::Rect(r) => r.fill.clone(),
                other => panic!("unexpected payload {other:?}"),
            },
            other => panic!("unexpected diff {other:?}"),
        }
    }

    #[test]
    fn hovering_recolors_and_shows_the_tooltip() {
        let mut view = ChartView::new();
        view.replace(two_boxes());

        let diffs = view.handle_pointer(PointerEvent::Enter(Point::new(15.0, 20.0)));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].id(), MarkId::from_raw(1));
        assert_eq!(fill_of(&diffs[0]), css::ORANGE.into());
        let tip = view.tooltip().unwrap();
        assert_eq!(tip.lines, vec!["box 0".to_string()]);
        assert_eq!(tip.anchor, Point::new(20.0, 0.0));

        // Moving within the same mark is quiet.
        assert!(view.handle_pointer(PointerEvent::Move(Point::new(16.0, 21.0))).is_empty());

        // Moving to the other box swaps both fills.
        let diffs = view.handle_pointer(PointerEvent::Move(Point::new(45.0, 20.0)));
        assert_eq!(diffs.len(), 2);
        assert_eq!(view.hovered(), Some(MarkId::from_raw(2)));

        let diffs = view.handle_pointer(PointerEvent::Leave);
        assert_eq!(diffs.len(), 1);
        assert_eq!(fill_of(&diffs[0]), css::STEEL_BLUE.into());
        assert!(view.tooltip().is_none());
        assert_eq!(view.hovered(), None);
    }

    #[test]
    fn gaps_between_marks_clear_hover() {
        let mut view = ChartView::new();
        view.replace(two_boxes());
        view.handle_pointer(PointerEvent::Enter(Point::new(15.0, 20.0)));
        let diffs = view.handle_pointer(PointerEvent::Move(Point::new(35.0, 20.0)));
        assert_eq!(diffs.len(), 1);
        assert_eq!(view.hovered(), None);
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn replace_resets_hover_and_reports_exits() {
        let mut view = ChartView::new();
        view.replace(two_boxes());
        view.handle_pointer(PointerEvent::Enter(Point::new(15.0, 20.0)));

        let mut frame = two_boxes();
        frame.marks.truncate(1);
        frame.targets.truncate(1);
        let diffs = view.replace(frame);

        assert!(diffs
            .iter()
            .any(|d| matches!(d, MarkDiff::Exit { id, .. } if *id == MarkId::from_raw(2))));
        // The previously hovered box returns to its resting fill.
        assert!(diffs.iter().any(|d| d.id() == MarkId::from_raw(1)));
        assert_eq!(view.hovered(), None);
        assert!(view.tooltip().is_none());
        assert_eq!(view.marks().len(), 1);
        assert_eq!(view.target_count(), 1);
    }
}
