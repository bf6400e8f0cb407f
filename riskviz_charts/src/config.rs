// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart styles.
//!
//! Every style deserializes with `serde`, and every field falls back to its default, so a config
//! file only needs to name what it changes. Colors are CSS strings (`"#ADD5F7"`, `"crimson"`).

use kurbo::Rect;
use peniko::Color;
use peniko::color::palette::css;
use serde::{Deserialize, Deserializer};

use crate::color::parse_css_color;

fn css_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_css_color(&s).map_err(serde::de::Error::custom)
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

/// Space reserved around the plot area.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Space above the plot.
    pub top: f64,
    /// Space right of the plot.
    pub right: f64,
    /// Space below the plot.
    pub bottom: f64,
    /// Space left of the plot.
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Margins {
    /// Creates margins in CSS order.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Returns the plot rectangle for a `width` x `height` plot inset by these margins.
    pub fn plot_rect(&self, width: f64, height: f64) -> Rect {
        Rect::new(self.left, self.top, self.left + width, self.top + height)
    }

    /// Returns the full view box around a `width` x `height` plot.
    pub fn view_box(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            0.0,
            0.0,
            width + self.left + self.right,
            height + self.top + self.bottom,
        )
    }
}

/// Style of the correlation matrix heatmap.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatrixStyle {
    /// Grid width.
    pub width: f64,
    /// Grid height.
    pub height: f64,
    /// Space around the grid; bottom and left hold the product labels.
    pub margins: Margins,
    /// Gradient color at the smallest off-diagonal value.
    #[serde(deserialize_with = "css_color")]
    pub start_color: Color,
    /// Gradient color at the largest off-diagonal value.
    #[serde(deserialize_with = "css_color")]
    pub end_color: Color,
    /// Fill of hovered cells.
    #[serde(deserialize_with = "css_color")]
    pub hover_color: Color,
    /// Fill of diagonal cells and missing values.
    #[serde(deserialize_with = "css_color")]
    pub empty_color: Color,
    /// Cell and background outline color.
    #[serde(deserialize_with = "css_color")]
    pub grid_color: Color,
    /// Cell and background outline width.
    pub grid_width: f64,
    /// Value label color on light cells.
    #[serde(deserialize_with = "css_color")]
    pub text_color: Color,
    /// Value label color on dark cells (values at or above half the maximum).
    #[serde(deserialize_with = "css_color")]
    pub text_color_dark: Color,
    /// Value and product label font size.
    pub font_size: f64,
    /// Fractional digits of cell values.
    pub value_digits: usize,
    /// Length of the label ticks.
    pub tick_size: f64,
    /// Rotation of the column labels, in degrees.
    pub column_label_angle: f64,
}

impl Default for MatrixStyle {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 300.0,
            margins: Margins::new(20.0, 30.0, 110.0, 110.0),
            start_color: rgb(0xAD, 0xD5, 0xF7),
            end_color: rgb(0x05, 0x65, 0x85),
            hover_color: css::ORANGE,
            empty_color: css::WHITE,
            grid_color: rgb(0xAD, 0xAD, 0xAD),
            grid_width: 2.0,
            text_color: rgb(0x54, 0x58, 0x5B),
            text_color_dark: css::WHITE,
            font_size: 10.0,
            value_digits: 4,
            tick_size: 5.0,
            column_label_angle: -60.0,
        }
    }
}

/// Style of the risk histogram.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistogramStyle {
    /// Plot width.
    pub width: f64,
    /// Plot height.
    pub height: f64,
    /// Space around the plot; holds the axes and the title.
    pub margins: Margins,
    /// Fill of bars left of the cutoff.
    #[serde(deserialize_with = "css_color")]
    pub tail_color: Color,
    /// Fill of hovered bars left of the cutoff.
    #[serde(deserialize_with = "css_color")]
    pub tail_hover_color: Color,
    /// Fill of bars from the cutoff on.
    #[serde(deserialize_with = "css_color")]
    pub body_color: Color,
    /// Fill of hovered bars from the cutoff on.
    #[serde(deserialize_with = "css_color")]
    pub body_hover_color: Color,
    /// Bar outline color.
    #[serde(deserialize_with = "css_color")]
    pub bar_stroke_color: Color,
    /// Cumulative curve color.
    #[serde(deserialize_with = "css_color")]
    pub curve_color: Color,
    /// Cumulative curve stroke width.
    pub curve_width: f64,
    /// Curve point fill.
    #[serde(deserialize_with = "css_color")]
    pub point_color: Color,
    /// Curve point fill while hovered.
    #[serde(deserialize_with = "css_color")]
    pub point_hover_color: Color,
    /// Curve point radius.
    pub point_radius: f64,
    /// Curve point radius while hovered.
    pub point_hover_radius: f64,
    /// Cutoff rule and annotation color.
    #[serde(deserialize_with = "css_color")]
    pub cutoff_color: Color,
    /// Cutoff rule width.
    pub cutoff_width: f64,
    /// VaR and shortfall annotation font size.
    pub annotation_font_size: f64,
    /// Chart title font size.
    pub title_font_size: f64,
    /// Approximate tick count of every axis.
    pub tick_count: usize,
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            margins: Margins::new(40.0, 50.0, 60.0, 50.0),
            tail_color: css::CRIMSON,
            tail_hover_color: rgb(0xAA, 0x00, 0x00),
            body_color: css::STEEL_BLUE,
            body_hover_color: rgb(0x3E, 0x60, 0x6F),
            bar_stroke_color: rgb(0xAD, 0xAD, 0xAD),
            curve_color: rgb(0x11, 0x62, 0x5B),
            curve_width: 1.0,
            point_color: css::BLACK,
            point_hover_color: css::ORANGE,
            point_radius: 1.0,
            point_hover_radius: 3.0,
            cutoff_color: css::CRIMSON,
            cutoff_width: 3.0,
            annotation_font_size: 15.0,
            title_font_size: 15.0,
            tick_count: 10,
        }
    }
}

/// Style of the donut chart.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PieStyle {
    /// View width.
    pub width: f64,
    /// View height.
    pub height: f64,
    /// Outer radius as a fraction of half the smaller view side.
    pub outer_radius: f64,
    /// Inner radius as a fraction of half the smaller view side.
    pub inner_radius: f64,
    /// Color of the first slice.
    #[serde(deserialize_with = "css_color")]
    pub start_color: Color,
    /// Color of the last slice.
    #[serde(deserialize_with = "css_color")]
    pub end_color: Color,
    /// Legend swatch size.
    pub legend_swatch_size: f64,
    /// Gap between legend rows and between a swatch and its label.
    pub legend_spacing: f64,
    /// Legend label font size.
    pub legend_font_size: f64,
    /// Tooltip offset from the pointer, `[dx, dy]`.
    pub tooltip_offset: [f64; 2],
}

impl Default for PieStyle {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            outer_radius: 0.9,
            inner_radius: 0.6,
            start_color: rgb(0xAD, 0xD5, 0xF7),
            end_color: rgb(0x05, 0x65, 0x85),
            legend_swatch_size: 18.0,
            legend_spacing: 4.0,
            legend_font_size: 15.0,
            tooltip_offset: [-25.0, 10.0],
        }
    }
}

/// Styles of all chart kinds.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Correlation matrix style.
    pub matrix: MatrixStyle,
    /// Risk histogram style.
    pub histogram: HistogramStyle,
    /// Donut chart style.
    pub pie: PieStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let json = r##"{
            "histogram": { "tail_color": "#FF0000", "margins": { "top": 10 } },
            "pie": { "legend_font_size": 12 }
        }"##;
        let config: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.histogram.tail_color, rgb(0xFF, 0, 0));
        assert_eq!(config.histogram.margins, Margins::new(10.0, 0.0, 0.0, 0.0));
        assert_eq!(config.histogram.body_color, css::STEEL_BLUE);
        assert_eq!(config.pie.legend_font_size, 12.0);
        assert_eq!(config.matrix, MatrixStyle::default());
    }

    #[test]
    fn bad_colors_are_rejected() {
        let err = serde_json::from_str::<PieStyle>(r#"{ "start_color": "crimon" }"#).unwrap_err();
        assert!(err.to_string().contains("crimon"), "{err}");
    }

    #[test]
    fn margins_frame_the_plot() {
        let m = Margins::new(40.0, 50.0, 60.0, 50.0);
        assert_eq!(m.plot_rect(600.0, 300.0), Rect::new(50.0, 40.0, 650.0, 340.0));
        assert_eq!(m.view_box(600.0, 300.0), Rect::new(0.0, 0.0, 700.0, 400.0));
    }
}
