// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use riskviz_charts::RenderError;
use thiserror::Error;

/// Errors of the `riskviz` command.
#[derive(Debug, Error)]
pub(crate) enum DemoError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid request file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid style file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("chart {id}: invalid data: {source}")]
    ChartData {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("chart {id}: {source}")]
    Render {
        id: String,
        #[source]
        source: RenderError,
    },
    #[error("{0}\nusage: riskviz <requests.json> [--config style.yaml] [--out DIR]")]
    Usage(String),
}

impl DemoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
