// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::svg::escape_xml;

/// One chart of the report.
#[derive(Clone, Debug)]
pub(crate) struct HtmlSection {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) svg: String,
}

/// Renders a standalone page with every section's SVG inlined, in order.
pub(crate) fn render_report(title: &str, sections: &[HtmlSection]) -> String {
    let title = escape_xml(title);
    let mut out = String::new();
    out.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; color: #54585B; }}
section {{ margin-bottom: 3em; }}
h2 {{ margin-bottom: 0.2em; }}
p {{ margin-top: 0; }}
</style>
</head>
<body>
<h1>{title}</h1>
"#
    ));
    for section in sections {
        out.push_str(&format!(
            "<section>\n<h2>{}</h2>\n<p>{}</p>\n{}</section>\n",
            escape_xml(&section.title),
            escape_xml(&section.description),
            section.svg
        ));
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_keep_their_order_and_escape_text() {
        let sections = [
            HtmlSection {
                title: "P&L".into(),
                description: "first".into(),
                svg: "<svg id=\"a\"></svg>\n".into(),
            },
            HtmlSection {
                title: "Second".into(),
                description: "second".into(),
                svg: "<svg id=\"b\"></svg>\n".into(),
            },
        ];
        let html = render_report("Report <1>", &sections);
        assert!(html.contains("<title>Report &lt;1&gt;</title>"));
        assert!(html.contains("<h2>P&amp;L</h2>"));
        let a = html.find("<svg id=\"a\">").unwrap();
        let b = html.find("<svg id=\"b\">").unwrap();
        assert!(a < b);
        assert!(html.ends_with("</html>\n"));
    }
}
