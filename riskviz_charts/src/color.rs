// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-stop color gradients and CSS color parsing.
//!
//! Heatmap cells interpolate in sRGB; pie slices interpolate in cylindrical CIE LCh ("HCL"),
//! which keeps lightness steps even across neighbouring slices.

use peniko::Color;
use peniko::color::{AlphaColor, Lch, Srgb, parse_color};
use thiserror::Error;

use crate::scale::ScaleLinear;

/// A CSS color string could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid CSS color `{0}`")]
pub struct ColorParseError(pub String);

/// Parses a CSS color (`#ADD5F7`, `steelblue`, `rgb(...)`) into an sRGB color.
pub fn parse_css_color(s: &str) -> Result<Color, ColorParseError> {
    parse_color(s.trim())
        .map(|c| c.to_alpha_color::<Srgb>())
        .map_err(|_| ColorParseError(s.to_owned()))
}

/// The space a [`ColorRamp`] interpolates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RampSpace {
    /// Per-channel sRGB interpolation, rounded to 8-bit channels.
    Rgb,
    /// Hue/chroma/lightness interpolation along the shorter hue arc.
    Hcl,
}

/// A linear mapping from a numeric domain onto a two-stop gradient.
///
/// A degenerate domain (`min == max`) maps every value to the start color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorRamp {
    scale: ScaleLinear,
    start: Color,
    end: Color,
    space: RampSpace,
}

impl ColorRamp {
    /// Creates a gradient from `start` (at `domain.0`) to `end` (at `domain.1`).
    pub fn new(domain: (f64, f64), start: Color, end: Color, space: RampSpace) -> Self {
        Self {
            scale: ScaleLinear::new(domain, (0.0, 1.0)),
            start,
            end,
            space,
        }
    }

    /// Returns the gradient color for `v`.
    ///
    /// Values outside the domain extrapolate; channels are clamped to the displayable range.
    pub fn color_at(&self, v: f64) -> Color {
        let t = self.scale.map(v);
        match self.space {
            RampSpace::Rgb => lerp_rgb(self.start, self.end, t),
            RampSpace::Hcl => lerp_hcl(self.start, self.end, t),
        }
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
        .round()
        .clamp(0.0, 255.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to the u8 range")]
    {
        v as u8
    }
}

fn lerp_rgb(start: Color, end: Color, t: f64) -> Color {
    let a = start.to_rgba8();
    let b = end.to_rgba8();
    Color::from_rgba8(
        lerp_channel(a.r, b.r, t),
        lerp_channel(a.g, b.g, t),
        lerp_channel(a.b, b.b, t),
        lerp_channel(a.a, b.a, t),
    )
}

fn lerp_hcl(start: Color, end: Color, t: f64) -> Color {
    let [l0, c0, h0, a0] = start.convert::<Lch>().components;
    let [l1, c1, h1, a1] = end.convert::<Lch>().components;
    let mut dh = h1 - h0;
    if dh > 180.0 {
        dh -= 360.0;
    } else if dh < -180.0 {
        dh += 360.0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "color components are f32; interpolation precision is ample"
    )]
    let t = t as f32;
    let mixed = AlphaColor::<Lch>::new([
        l0 + (l1 - l0) * t,
        c0 + (c1 - c0) * t,
        h0 + dh * t,
        a0 + (a1 - a0) * t,
    ]);
    // Round-trip through 8-bit channels so equal inputs produce equal paints.
    let rgba = mixed.convert::<Srgb>().to_rgba8();
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}
