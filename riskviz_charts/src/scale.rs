// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales mapping data values into scene coordinates.
//!
//! Linear scales position histogram bars and curves and drive color gradients; band scales lay
//! out heatmap rows and columns.

/// A scale specification (domain + options, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleSpec {
    /// Continuous linear scale.
    Linear(ScaleLinearSpec),
    /// Discrete band scale.
    Band(ScaleBandSpec),
}

impl From<ScaleLinearSpec> for ScaleSpec {
    fn from(value: ScaleLinearSpec) -> Self {
        Self::Linear(value)
    }
}

impl From<ScaleBandSpec> for ScaleSpec {
    fn from(value: ScaleBandSpec) -> Self {
        Self::Band(value)
    }
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

/// Specification for a linear scale (domain + options, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinearSpec {
    /// Domain in data units.
    pub domain: (f64, f64),
    /// Whether to extend the domain outward to tick boundaries.
    pub nice: bool,
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    ///
    /// A degenerate domain maps everything to the start of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

impl ScaleLinearSpec {
    /// Creates a new linear scale spec.
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            domain,
            nice: false,
        }
    }

    /// Enables or disables nice-domain behavior.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Returns the effective domain after applying `nice` (if enabled).
    pub fn resolved_domain(&self, tick_count: usize) -> (f64, f64) {
        if !self.nice {
            return self.domain;
        }
        match nice_ticks(self.domain.0, self.domain.1, tick_count)[..] {
            [first, .., last] => (first, last),
            _ => self.domain,
        }
    }

    /// Instantiates a concrete scale using the `resolved_domain` (respecting `nice`).
    pub fn instantiate_resolved(&self, range: (f64, f64), tick_count: usize) -> ScaleLinear {
        ScaleLinear::new(self.resolved_domain(tick_count), range)
    }
}

pub(crate) fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let step = nice_step((max - min) / count as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round().min(10_000.0);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "finite, non-negative and capped at 10k"
    )]
    let n = n_f as u64;
    if step < 1.0 {
        // Fractional steps divide by the integer `1 / step`, so 3 / 10 gives exactly 0.3 where
        // 3 * 0.1 gives 0.30000000000000004.
        let inv = (1.0 / step).round();
        let first = (start * inv).round();
        (0..=n).map(|i| (first + i as f64) / inv).collect()
    } else {
        let first = (start / step).round();
        (0..=n).map(|i| (first + i as f64) * step).collect()
    }
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A discrete band scale for categorical layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

/// Specification for a band scale (count + padding, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBandSpec {
    /// Number of bands.
    pub count: usize,
    /// Inner padding in band units.
    pub padding_inner: f64,
    /// Outer padding in band units.
    pub padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`, without padding.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the leading edge of the band at `index`.
    ///
    /// Bands are laid out from the smaller end of the range, so band 0 is leftmost or topmost.
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let start = r0.min(r1);
        start + bw * self.padding_outer + step * index as f64
    }

    /// Returns the center of the band at `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.x(index) + 0.5 * self.band_width()
    }
}

impl ScaleBandSpec {
    /// Creates a new band scale spec without padding.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Instantiates a concrete scale for a given output range.
    pub fn instantiate(&self, range: (f64, f64)) -> ScaleBand {
        ScaleBand::new(range, self.count).with_padding(self.padding_inner, self.padding_outer)
    }
}

/// Returns the `(min, max)` of the finite values, or `None` if there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((v.min(lo), v.max(hi))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_domain_extends_to_tick_boundaries() {
        let spec = ScaleLinearSpec::new((0.0, 37.0)).with_nice(true);
        assert_eq!(spec.resolved_domain(10), (0.0, 40.0));
        let spec = ScaleLinearSpec::new((0.0, 1.0)).with_nice(true);
        assert_eq!(spec.resolved_domain(10), (0.0, 1.0));
    }

    #[test]
    fn ticks_are_snapped() {
        let ticks = ScaleLinear::new((0.0, 1.0), (0.0, 1.0)).ticks(10);
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[3], 0.3);
        assert_eq!(ticks[7], 0.7);
        assert_eq!(ticks[10], 1.0);

        let ticks = nice_ticks(-0.35, 0.05, 8);
        assert_eq!(ticks, vec![-0.35, -0.3, -0.25, -0.2, -0.15, -0.1, -0.05, 0.0, 0.05]);

        let ticks = nice_ticks(0.0, 37.0, 10);
        assert_eq!(ticks, vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0]);
    }

    #[test]
    fn band_scale_without_padding_tiles_the_range() {
        let band = ScaleBand::new((0.0, 300.0), 3);
        assert_eq!(band.band_width(), 100.0);
        assert_eq!(band.x(0), 0.0);
        assert_eq!(band.x(2), 200.0);
        assert_eq!(band.center(1), 150.0);

        // A reversed range still lays band 0 out at the smaller end.
        let band = ScaleBandSpec::new(3).instantiate((300.0, 0.0));
        assert_eq!(band.x(0), 0.0);
    }

    #[test]
    fn linear_maps_and_handles_degenerate_domains() {
        let s = ScaleLinear::new((1.0, 10.0), (0.0, 90.0));
        assert_eq!(s.map(5.5), 45.0);
        let flat = ScaleLinear::new((2.0, 2.0), (7.0, 9.0));
        assert_eq!(flat.map(2.0), 7.0);
    }

    #[test]
    fn extent_ignores_non_finite() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(extent([f64::INFINITY]), None);
    }
}
