// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG output for rendered charts.
//!
//! The scene is rebuilt from the `MarkDiff` stream a render returns, the same stream an
//! incremental renderer would consume. Hoverable marks carry their tooltip as an SVG `<title>`.

use std::collections::HashMap;

use kurbo::Rect;
use peniko::Brush;
use riskviz_charts::ChartView;
use riskviz_core::{FontWeight, MarkDiff, MarkId, MarkPayload, TextAnchor, TextBaseline};

#[derive(Debug)]
pub(crate) struct SvgScene {
    marks: HashMap<MarkId, (i32, MarkPayload)>,
    titles: HashMap<MarkId, String>,
    view_box: Rect,
}

impl SvgScene {
    pub(crate) fn new(view_box: Rect) -> Self {
        Self {
            marks: HashMap::new(),
            titles: HashMap::new(),
            view_box,
        }
    }

    /// Builds a scene from a render's diffs, taking tooltips from the view's hover targets.
    pub(crate) fn from_render(view: &ChartView, diffs: &[MarkDiff]) -> Self {
        let mut scene = Self::new(view.view_box());
        scene.apply_diffs(diffs);
        for id in scene.marks.keys().copied().collect::<Vec<_>>() {
            if let Some(target) = view.target(id)
                && !target.lines.is_empty()
            {
                scene.titles.insert(id, target.lines.join("\n"));
            }
        }
        scene
    }

    pub(crate) fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        for diff in diffs {
            match diff {
                MarkDiff::Enter {
                    id, z_index, new, ..
                } => {
                    self.marks.insert(*id, (*z_index, (**new).clone()));
                }
                MarkDiff::Update {
                    id,
                    new_z_index,
                    new,
                    ..
                } => {
                    self.marks.insert(*id, (*new_z_index, (**new).clone()));
                }
                MarkDiff::Exit { id, .. } => {
                    self.marks.remove(id);
                    self.titles.remove(id);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.marks.len()
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let vb = self.view_box;
        let mut out = String::new();
        out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            vb.x0,
            vb.y0,
            vb.width(),
            vb.height(),
            vb.width(),
            vb.height()
        ));
        out.push('\n');

        let mut ordered: Vec<_> = self.marks.iter().collect();
        ordered.sort_by_key(|(id, (z, _))| (*z, **id));

        for (id, (_, payload)) in ordered {
            let title = self.titles.get(id);
            match payload {
                MarkPayload::Rect(r) => {
                    out.push_str(&format!(
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        r.rect.x0,
                        r.rect.y0,
                        r.rect.width(),
                        r.rect.height(),
                    ));
                    write_paint_attr(&mut out, "fill", &r.fill);
                    write_stroke(&mut out, &r.stroke, r.stroke_width);
                    close_element(&mut out, "rect", title);
                }
                MarkPayload::Text(t) => {
                    let baseline = match t.baseline {
                        TextBaseline::Middle => "middle",
                        TextBaseline::Alphabetic => "alphabetic",
                        TextBaseline::Hanging => "hanging",
                    };
                    out.push_str(&format!(
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
                        t.pos.x, t.pos.y, t.font_size, baseline
                    ));
                    if t.font_weight != FontWeight::NORMAL {
                        out.push_str(&format!(r#" font-weight="{}""#, t.font_weight.0));
                    }
                    if t.angle != 0.0 {
                        out.push_str(&format!(
                            r#" transform="rotate({} {} {})""#,
                            t.angle, t.pos.x, t.pos.y
                        ));
                    }
                    out.push_str(match t.anchor {
                        TextAnchor::Start => r#" text-anchor="start""#,
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                        TextAnchor::End => r#" text-anchor="end""#,
                    });
                    write_paint_attr(&mut out, "fill", &t.fill);
                    out.push('>');
                    out.push_str(&escape_xml(&t.text));
                    out.push_str("</text>\n");
                }
                MarkPayload::Path(p) => {
                    out.push_str(&format!(r#"<path d="{}""#, p.path.to_svg()));
                    write_paint_attr(&mut out, "fill", &p.fill);
                    write_stroke(&mut out, &p.stroke, p.stroke_width);
                    close_element(&mut out, "path", title);
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }
}

fn close_element(out: &mut String, name: &str, title: Option<&String>) {
    match title {
        Some(title) => {
            out.push_str(&format!("><title>{}</title></{name}>\n", escape_xml(title)));
        }
        None => out.push_str("/>\n"),
    }
}

fn write_stroke(out: &mut String, brush: &Brush, width: f64) {
    if width > 0.0 {
        write_paint_attr(out, "stroke", brush);
        out.push_str(&format!(r#" stroke-width="{width}""#));
    }
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let fill_opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, fill_opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use riskviz_charts::{PieInput, PieStyle, render_pie_chart};

    use super::*;

    #[test]
    fn slices_carry_their_tooltip_as_a_title() {
        let mut view = ChartView::new();
        let input = PieInput {
            product: vec!["Bonds & Notes".into(), "Equity".into()],
            value: vec![1.0, 3.0],
            percentage: vec![0.25, 0.75],
        };
        let diffs = render_pie_chart(&mut view, &input, &PieStyle::default()).unwrap();
        let scene = SvgScene::from_render(&view, &diffs);
        assert_eq!(scene.len(), 6);

        let svg = scene.to_svg_string();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 300""#));
        assert!(svg.contains("<title>Bonds &amp; Notes\n1\n25.00%</title></path>"));
        assert!(svg.contains(">Equity</text>"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn text_and_stroke_attributes_are_written() {
        use peniko::color::palette::css;
        use riskviz_charts::{TextMarkSpec, TextStyle};
        use riskviz_core::Scene;

        let label = TextMarkSpec::new(MarkId::from_raw(1), (10.0, 20.0), "a < b")
            .with_style(TextStyle::new(14.0, css::BLACK).bold())
            .with_anchor(TextAnchor::End)
            .with_angle(-90.0);
        let mut core = Scene::new();
        let diffs = core.tick([label.mark()]);
        let mut scene = SvgScene::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        scene.apply_diffs(&diffs);

        let svg = scene.to_svg_string();
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50" width="100" height="50""#
        ));
        assert!(svg.contains(
            r##"<text x="10" y="20" font-size="14" dominant-baseline="middle" font-weight="700" transform="rotate(-90 10 20)" text-anchor="end" fill="#000000">a &lt; b</text>"##
        ));

        let mut out = String::new();
        write_stroke(&mut out, &Brush::Solid(css::WHITE.with_alpha(0.5)), 2.0);
        assert!(out.starts_with(r##" stroke="#ffffff" stroke-opacity="0.50"##));
        assert!(out.ends_with(r#"" stroke-width="2""#));
        out.clear();
        write_stroke(&mut out, &Brush::Solid(css::WHITE), 0.0);
        assert!(out.is_empty());
    }

    #[test]
    fn exits_remove_marks() {
        let mut view = ChartView::new();
        let input = PieInput {
            product: vec!["A".into()],
            value: vec![1.0],
            percentage: vec![1.0],
        };
        let diffs = render_pie_chart(&mut view, &input, &PieStyle::default()).unwrap();
        let mut scene = SvgScene::from_render(&view, &diffs);
        assert_eq!(scene.len(), 3);

        let exits: Vec<_> = diffs
            .iter()
            .map(|d| MarkDiff::Exit {
                id: d.id(),
                z_index: 0,
                kind: riskviz_core::MarkKind::Rect,
                old: None,
                bounds: None,
            })
            .collect();
        scene.apply_diffs(&exits);
        assert_eq!(scene.len(), 0);
        assert_eq!(
            scene.to_svg_string().lines().count(),
            2,
            "only the svg element remains"
        );
    }
}
