// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::path::Path;

use riskviz_charts::RenderConfig;

use crate::error::DemoError;

/// Loads chart styles from a YAML file, or the defaults when no file is given.
///
/// Keys left out of the file keep their default values.
pub(crate) fn load_config(path: Option<&Path>) -> Result<RenderConfig, DemoError> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let yaml = fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
    parse_config(&yaml)
}

pub(crate) fn parse_config(yaml: &str) -> Result<RenderConfig, DemoError> {
    // An empty document is `null` to serde_yaml.
    if yaml.trim().is_empty() {
        return Ok(RenderConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

#[cfg(test)]
mod tests {
    use peniko::color::palette::css;
    use riskviz_charts::HistogramStyle;

    use super::*;

    #[test]
    fn yaml_overrides_single_fields() {
        let config = parse_config(
            "histogram:\n  tail_color: orange\n  tick_count: 5\npie:\n  width: 400\n",
        )
        .unwrap();
        assert_eq!(config.histogram.tail_color.to_rgba8(), css::ORANGE.to_rgba8());
        assert_eq!(config.histogram.tick_count, 5);
        assert_eq!(config.histogram.body_color, HistogramStyle::default().body_color);
        assert_eq!(config.pie.width, 400.0);
        assert_eq!(config.pie.height, 300.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.yaml");
        assert!(matches!(load_config(Some(&path)), Err(DemoError::Io { .. })));

        fs::write(&path, "").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), RenderConfig::default());
        assert_eq!(load_config(None).unwrap(), RenderConfig::default());
    }

    #[test]
    fn unknown_colors_are_rejected() {
        assert!(matches!(
            parse_config("matrix:\n  hover_color: crimon\n"),
            Err(DemoError::Yaml(_))
        ));
    }
}
