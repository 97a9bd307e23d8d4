//! Standalone HTML page. Charts are Vega-Lite specs rendered in the browser
//! by vega-embed; everything else is static markup.

use super::Writer;
use super::vegalite::VegaLiteWriter;
use crate::config::DashboardSettings;
use crate::dashboard::overview::schema_summary;
use crate::dashboard::types::{
    CLEANED_HEADING, DASHBOARD_TITLE, DUPLICATES_LABEL, MISSING_LABEL, PAGE_TITLE,
    PREVIEW_HEADING, Page, Report, SHAPE_LABEL, TablePreview,
};
use crate::error::{EdaError, Result};
use std::fmt::Write as _;

const SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 1100px; color: #222; }
table { border-collapse: collapse; font-size: 0.85rem; margin: 0.5rem 0; }
th, td { border: 1px solid #ddd; padding: 0.2rem 0.5rem; text-align: left; }
th { background: #f4f4f4; }
pre { background: #f8f8f8; padding: 0.75rem; overflow-x: auto; }
.advisory { background: #fff4d6; border-left: 4px solid #e0a800; padding: 0.75rem; }
.warning { color: #a15c00; }
.chart { margin: 1rem 0 2rem; }
";

pub struct HtmlWriter {
    charts: VegaLiteWriter,
}

impl HtmlWriter {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            charts: VegaLiteWriter::new(settings),
        }
    }
}

impl Writer for HtmlWriter {
    type Output = String;

    fn write(&self, page: &Page) -> Result<String> {
        let mut body = String::new();
        let mut embeds = String::new();
        let _ = writeln!(body, "<h1>{}</h1>", escape(DASHBOARD_TITLE));

        match page {
            Page::Advisory { message } => {
                let _ = writeln!(body, "<p class=\"advisory\">{}</p>", escape(message));
            }
            Page::Report(report) => self.write_report(&mut body, &mut embeds, report)?,
        }

        let mut out = String::new();
        let _ = writeln!(out, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>");
        let _ = writeln!(out, "<meta charset=\"utf-8\">");
        let _ = writeln!(out, "<title>{}</title>", escape(PAGE_TITLE));
        let _ = writeln!(out, "<style>\n{STYLE}</style>");
        for src in SCRIPTS {
            let _ = writeln!(out, "<script src=\"{src}\"></script>");
        }
        let _ = writeln!(out, "</head>\n<body>");
        out.push_str(&body);
        if !embeds.is_empty() {
            let _ = writeln!(out, "<script>\n{embeds}</script>");
        }
        let _ = writeln!(out, "</body>\n</html>");
        Ok(out)
    }
}

impl HtmlWriter {
    fn write_report(&self, body: &mut String, embeds: &mut String, report: &Report) -> Result<()> {
        let overview = &report.overview;

        let _ = writeln!(body, "<h3>{}</h3>", escape(PREVIEW_HEADING));
        body.push_str(&table(&overview.preview));
        let (rows, cols) = overview.shape();
        let _ = writeln!(body, "<p>{} ({rows}, {cols})</p>", escape(SHAPE_LABEL));
        let _ = writeln!(body, "<pre>{}</pre>", escape(&schema_summary(overview)));

        let _ = writeln!(body, "<p>{}</p>\n<table>", escape(MISSING_LABEL));
        for (name, nulls) in overview.null_counts() {
            let _ = writeln!(body, "<tr><th>{}</th><td>{nulls}</td></tr>", escape(name));
        }
        let _ = writeln!(body, "</table>");
        let _ = writeln!(
            body,
            "<p>{} {}</p>",
            escape(DUPLICATES_LABEL),
            overview.duplicate_rows
        );

        let _ = writeln!(body, "<h3>{}</h3>", escape(CLEANED_HEADING));
        body.push_str(&table(&report.prepared_preview));

        let mut index = 0;
        for (section, charts) in report.sections() {
            let _ = writeln!(body, "<h2>{}</h2>", escape(section.title()));
            for chart in charts {
                let spec = self.charts.chart(chart)?;
                let json = serde_json::to_string(&spec)
                    .map_err(|e| EdaError::Render(format!("{}: {e}", chart.title)))?;

                let _ = writeln!(body, "<h3>{}</h3>", escape(&chart.heading));
                let _ = writeln!(body, "<div class=\"chart\" id=\"chart-{index}\"></div>");
                let _ = writeln!(
                    embeds,
                    "vegaEmbed(\"#chart-{index}\", {}, {{\"actions\": false}});",
                    script_safe(&json)
                );
                index += 1;
            }
        }

        for warning in &report.warnings {
            let _ = writeln!(body, "<p class=\"warning\">{}</p>", escape(warning));
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// JSON embedded in a `<script>` block must not close the block early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn table(preview: &TablePreview) -> String {
    let mut out = String::from("<table>\n<tr>");
    for column in &preview.columns {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr>\n");
    for row in &preview.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    if preview.rows.len() < preview.total_rows {
        let _ = writeln!(
            out,
            "<p>{} of {} rows shown</p>",
            preview.rows.len(),
            preview.total_rows
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::types::UPLOAD_ADVISORY;

    #[test]
    fn test_advisory_page() -> Result<()> {
        let html = HtmlWriter::new(&DashboardSettings::default()).write(&Page::advisory())?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(UPLOAD_ADVISORY));
        assert!(html.contains("<title>Ecommerce EDA</title>"));
        assert!(!html.contains("vegaEmbed("));
        Ok(())
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(script_safe("{\"x\":\"</script>\"}"), "{\"x\":\"<\\/script>\"}");
    }
}
