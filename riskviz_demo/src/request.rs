// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The batch of charts to render.

use std::fs;
use std::path::Path;

use riskviz_charts::{
    ChartView, CorrelationInput, HistogramInput, PieInput, RenderConfig,
    render_correlation_matrix, render_pie_chart, render_risk_histogram,
};
use riskviz_core::MarkDiff;
use serde::Deserialize;

use crate::error::DemoError;

/// A request file: `{ "charts": [ … ] }`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct RequestBatch {
    pub(crate) charts: Vec<ChartRequest>,
}

/// One chart to render. `data` is decoded once `kind` is known.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct ChartRequest {
    pub(crate) id: String,
    pub(crate) kind: ChartKind,
    pub(crate) data: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum ChartKind {
    CorrelationMatrix,
    Histogram,
    PieChart,
}

impl ChartKind {
    /// Prefix of the output name, followed by the request id.
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::CorrelationMatrix => "correlation-matrix-simulate",
            Self::Histogram => "histogram-simulate",
            Self::PieChart => "pie-chart-simulate",
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::CorrelationMatrix => "Correlation matrix",
            Self::Histogram => "Value at Risk",
            Self::PieChart => "Portfolio composition",
        }
    }
}

impl RequestBatch {
    pub(crate) fn load(path: &Path) -> Result<Self, DemoError> {
        let json = fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl ChartRequest {
    /// Output name without extension, e.g. `histogram-simulate3`.
    pub(crate) fn name(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.id)
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, DemoError> {
        T::deserialize(&self.data).map_err(|source| DemoError::ChartData {
            id: self.id.clone(),
            source,
        })
    }

    /// Decodes the data for this request's kind and renders it into `view`.
    pub(crate) fn render(
        &self,
        view: &mut ChartView,
        config: &RenderConfig,
    ) -> Result<Vec<MarkDiff>, DemoError> {
        let rendered = match self.kind {
            ChartKind::CorrelationMatrix => {
                render_correlation_matrix(view, &self.decode::<CorrelationInput>()?, &config.matrix)
            }
            ChartKind::Histogram => {
                render_risk_histogram(view, &self.decode::<HistogramInput>()?, &config.histogram)
            }
            ChartKind::PieChart => render_pie_chart(view, &self.decode::<PieInput>()?, &config.pie),
        };
        rendered.map_err(|source| DemoError::Render {
            id: self.id.clone(),
            source,
        })
    }
}
