// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! `riskviz_core` marks carry an explicit `z_index` for render ordering; the renderers in this
//! crate pick from these layers so the three charts stack their marks the same way.
//!
//! Renderers and hit testing sort by `(z_index, MarkId)`, so marks sharing a layer paint in id
//! order.

/// Plot background/frame fills.
pub const PLOT_BACKGROUND: i32 = -100;

/// Filled series marks (heatmap cells, bars, donut sectors).
pub const SERIES_FILL: i32 = 0;
/// Text drawn on top of filled series marks (cell values).
pub const SERIES_LABELS: i32 = 5;
/// Stroked series marks (the cumulative curve).
pub const SERIES_STROKE: i32 = 10;
/// Point series marks drawn above lines.
pub const SERIES_POINTS: i32 = 20;
/// Reference rules and their annotations (the VaR cutoff).
pub const ANNOTATIONS: i32 = 25;

/// Axis domain line and tick marks.
pub const AXIS_RULES: i32 = 30;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 40;
/// Axis title labels.
pub const AXIS_TITLES: i32 = 50;

/// Legend swatches.
pub const LEGEND_SWATCHES: i32 = 60;
/// Legend labels.
pub const LEGEND_LABELS: i32 = 70;
/// Chart-level titles.
pub const TITLES: i32 = 80;
