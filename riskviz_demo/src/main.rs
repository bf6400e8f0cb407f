// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `riskviz`: renders a batch of risk chart requests to SVG files and an HTML report.
//!
//! ```text
//! riskviz <requests.json> [--config style.yaml] [--out DIR]
//! ```
//!
//! Each chart is written to `DIR/<prefix><id>.svg`; all charts that rendered are collected in
//! `DIR/riskviz_report.html`. A chart that fails is logged and skipped, and the exit status is
//! non-zero if any did.

mod config;
mod error;
mod html;
mod request;
mod svg;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use riskviz_charts::{ChartView, RenderConfig};

use crate::error::DemoError;
use crate::request::{ChartRequest, RequestBatch};

const REPORT_FILE: &str = "riskviz_report.html";

#[derive(Clone, Debug, PartialEq)]
struct Args {
    requests: PathBuf,
    config: Option<PathBuf>,
    out: PathBuf,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, DemoError> {
        let mut requests = None;
        let mut config = None;
        let mut out = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "--out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| DemoError::Usage(format!("{arg} needs a value")))?;
                    let slot = if arg == "--config" { &mut config } else { &mut out };
                    *slot = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => {
                    return Err(DemoError::Usage(format!("unknown option {flag}")));
                }
                _ if requests.is_some() => {
                    return Err(DemoError::Usage(format!("unexpected argument {arg}")));
                }
                _ => requests = Some(PathBuf::from(&arg)),
            }
        }
        Ok(Self {
            requests: requests
                .ok_or_else(|| DemoError::Usage("missing request file".to_string()))?,
            config,
            out: out.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// What a batch run produced.
#[derive(Clone, Debug, Default, PartialEq)]
struct Summary {
    written: Vec<PathBuf>,
    failed: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            tracing::error!(failed = summary.failed, "some charts were not rendered");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Summary, DemoError> {
    let config = config::load_config(args.config.as_deref())?;
    let batch = RequestBatch::load(&args.requests)?;
    fs::create_dir_all(&args.out).map_err(|e| DemoError::io(&args.out, e))?;
    tracing::info!(charts = batch.charts.len(), out = %args.out.display(), "rendering batch");

    let mut summary = Summary::default();
    let mut sections = Vec::new();
    for request in &batch.charts {
        match render_chart(request, &config) {
            Ok(section) => {
                let path = args.out.join(format!("{}.svg", request.name()));
                write_file(&path, &section.svg)?;
                tracing::info!(path = %path.display(), "wrote chart");
                summary.written.push(path);
                sections.push(section);
            }
            Err(err) => {
                tracing::error!("{err}");
                summary.failed += 1;
            }
        }
    }

    let report = args.out.join(REPORT_FILE);
    write_file(&report, &html::render_report("Risk charts", &sections))?;
    tracing::info!(path = %report.display(), sections = sections.len(), "wrote report");
    summary.written.push(report);
    Ok(summary)
}

fn render_chart(
    request: &ChartRequest,
    config: &RenderConfig,
) -> Result<html::HtmlSection, DemoError> {
    let mut view = ChartView::new();
    let diffs = request.render(&mut view, config)?;
    let scene = svg::SvgScene::from_render(&view, &diffs);
    tracing::debug!(id = %request.id, marks = scene.len(), "rendered chart");
    Ok(html::HtmlSection {
        title: request.kind.title().to_string(),
        description: format!("{} ({} marks)", request.name(), scene.len()),
        svg: scene.to_svg_string(),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), DemoError> {
    fs::write(path, contents).map_err(|e| DemoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, DemoError> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_options_in_any_order() {
        assert_eq!(
            args(&["--out", "charts", "batch.json", "--config", "style.yaml"]).unwrap(),
            Args {
                requests: "batch.json".into(),
                config: Some("style.yaml".into()),
                out: "charts".into(),
            }
        );
        assert_eq!(args(&["batch.json"]).unwrap().out, PathBuf::from("."));
    }

    #[test]
    fn rejects_bad_command_lines() {
        assert!(matches!(args(&[]), Err(DemoError::Usage(_))));
        assert!(matches!(args(&["a.json", "--out"]), Err(DemoError::Usage(_))));
        assert!(matches!(args(&["a.json", "b.json"]), Err(DemoError::Usage(_))));
        assert!(matches!(args(&["a.json", "--verbose"]), Err(DemoError::Usage(_))));
    }

    #[test]
    fn batch_writes_svgs_and_report_and_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let requests = dir.path().join("batch.json");
        fs::write(
            &requests,
            r#"{ "charts": [
                { "id": "1", "kind": "pieChart",
                  "data": { "product": ["X", "Y"], "value": [30, 70], "percentage": [0.3, 0.7] } },
                { "id": "2", "kind": "histogram",
                  "data": { "confidenceInterval": 1.5, "prices": [1, 2], "binSize": 2,
                            "shortfall_value": 0, "var_value": 0 } }
            ] }"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let summary = run(&Args {
            requests,
            config: None,
            out: out.clone(),
        })
        .unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.written,
            vec![out.join("pie-chart-simulate1.svg"), out.join(REPORT_FILE)]
        );

        let svg = fs::read_to_string(out.join("pie-chart-simulate1.svg")).unwrap();
        assert!(svg.contains("<title>Y\n70\n70.00%</title>"));
        assert!(!out.join("histogram-simulate2.svg").exists());

        let report = fs::read_to_string(out.join(REPORT_FILE)).unwrap();
        assert_eq!(report.matches("<svg").count(), 1);
        assert!(report.contains("pie-chart-simulate1"));
    }

    #[test]
    fn unreadable_request_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&Args {
            requests: dir.path().join("missing.json"),
            config: None,
            out: dir.path().to_path_buf(),
        });
        assert!(matches!(result, Err(DemoError::Io { .. })));
    }
}
