// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Equal-width binning of a price sample, with running cumulative counts.

/// One histogram bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramBin {
    /// Lower edge of the bin.
    pub x: f64,
    /// Bin width.
    pub dx: f64,
    /// Number of samples in the bin.
    pub count: usize,
    /// Number of samples in this bin and every bin before it.
    pub cumulative_count: usize,
    /// `cumulative_count` as a fraction of the sample size.
    pub cumulative_fraction: f64,
}

impl HistogramBin {
    /// Center of the bin.
    pub fn midpoint(&self) -> f64 {
        self.x + 0.5 * self.dx
    }
}

/// Partitions `prices` into `bin_count` equal-width bins spanning `[min, max]`.
///
/// Bins are half-open `[x, x + dx)` except the last, which also holds the maximum. Non-finite
/// prices are skipped. Returns no bins for an empty sample or a zero bin count.
pub fn bin_prices(prices: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let Some((min, max)) = crate::scale::extent(prices.iter().copied()) else {
        return Vec::new();
    };
    if bin_count == 0 {
        return Vec::new();
    }

    let width = (max - min) / bin_count as f64;
    let thresholds: Vec<f64> = (0..=bin_count).map(|i| min + width * i as f64).collect();
    let interior = &thresholds[1..bin_count];

    let mut counts = vec![0_usize; bin_count];
    let mut total = 0_usize;
    for &p in prices.iter().filter(|p| p.is_finite()) {
        counts[interior.partition_point(|t| *t <= p)] += 1;
        total += 1;
    }

    let mut cumulative = 0;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            cumulative += count;
            HistogramBin {
                x: thresholds[i],
                dx: thresholds[i + 1] - thresholds[i],
                count,
                cumulative_count: cumulative,
                cumulative_fraction: cumulative as f64 / total as f64,
            }
        })
        .collect()
}

/// Returns the first bin whose cumulative fraction exceeds `significance`, or 0 if none does.
pub fn cutoff_index(bins: &[HistogramBin], significance: f64) -> usize {
    bins.iter()
        .position(|b| b.cumulative_fraction > significance)
        .unwrap_or(0)
}
