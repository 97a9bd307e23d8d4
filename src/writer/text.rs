//! Plain-text rendering for the terminal.

use super::Writer;
use crate::dashboard::overview::schema_summary;
use crate::dashboard::types::{
    BoxSummary, CLEANED_HEADING, ChartData, ChartSpec, CorrelationMatrix, DASHBOARD_TITLE,
    DUPLICATES_LABEL, HistogramBin, LabelValue, MISSING_LABEL, PREVIEW_HEADING, Page, Report,
    SHAPE_LABEL, StackedValue, TablePreview, TimePoint, TreeNode,
};
use crate::error::Result;
use crate::utils::{fmt_amount, fmt_opt};
use std::fmt::Write as _;

const MAX_CELL: usize = 24;
const BAR_WIDTH: usize = 30;

#[derive(Clone, Copy, Debug, Default)]
pub struct TextWriter;

impl TextWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Writer for TextWriter {
    type Output = String;

    fn write(&self, page: &Page) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{DASHBOARD_TITLE}");
        let _ = writeln!(out, "{}", "=".repeat(DASHBOARD_TITLE.chars().count()));

        match page {
            Page::Advisory { message } => {
                let _ = writeln!(out, "\n{message}");
            }
            Page::Report(report) => write_report(&mut out, report),
        }
        Ok(out)
    }
}

fn write_report(out: &mut String, report: &Report) {
    let overview = &report.overview;

    let _ = writeln!(out, "\n{PREVIEW_HEADING}");
    out.push_str(&table(&overview.preview));
    let (rows, cols) = overview.shape();
    let _ = writeln!(out, "{SHAPE_LABEL} ({rows}, {cols})\n");
    let _ = writeln!(out, "{}\n", schema_summary(overview));

    let missing = overview
        .null_counts()
        .iter()
        .map(|(name, n)| format!("{name}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "{MISSING_LABEL} {{{missing}}}");
    let _ = writeln!(out, "{DUPLICATES_LABEL} {}", overview.duplicate_rows);

    let _ = writeln!(out, "\n{CLEANED_HEADING}");
    out.push_str(&table(&report.prepared_preview));

    for (section, charts) in report.sections() {
        let _ = writeln!(out, "\n{}", section.title());
        let _ = writeln!(out, "{}", "-".repeat(section.title().chars().count()));
        for chart in charts {
            write_chart(out, chart);
        }
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped:");
        for skipped in &report.skipped {
            let _ = writeln!(
                out,
                "  {:?} (missing {})",
                skipped.step,
                skipped.missing.join(", ")
            );
        }
    }
    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in &report.warnings {
            let _ = writeln!(out, "  {warning}");
        }
    }

    let _ = writeln!(out, "\n{}", report.summary());
}

fn write_chart(out: &mut String, chart: &ChartSpec) {
    let _ = writeln!(out, "\n{}", chart.heading);
    let _ = writeln!(out, "  {}", chart.title);

    let body = match &chart.data {
        ChartData::Categories(values) => categories(values),
        ChartData::TimeSeries(points) => time_series(points),
        ChartData::Histogram(bins) => histogram(bins),
        ChartData::Boxes(boxes) => box_table(boxes),
        ChartData::Stacked(values) => stacked(values),
        ChartData::Hierarchy(nodes) => hierarchy(nodes),
        ChartData::Matrix(matrix) => matrix_grid(matrix),
    };

    if body.is_empty() {
        let _ = writeln!(out, "  (no data)");
    } else {
        for line in body.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
}

/// Whole numbers without decimals, everything else as an amount.
fn fmt_number(v: f64) -> String {
    let amount = fmt_amount(v);
    match amount.strip_suffix(".00") {
        Some(whole) if v.fract() == 0.0 => whole.to_owned(),
        _ => amount,
    }
}

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL {
        cell.to_owned()
    } else {
        let mut short: String = cell.chars().take(MAX_CELL - 1).collect();
        short.push('…');
        short
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.max(1))
}

/// Aligned table with a header rule. Columns are padded to their widest cell.
fn table(preview: &TablePreview) -> String {
    let headers: Vec<String> = preview.columns.iter().map(|c| truncate(c)).collect();
    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(c)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&headers));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in &rows {
        let _ = writeln!(out, "{}", line(row));
    }
    if preview.rows.len() < preview.total_rows {
        let _ = writeln!(
            out,
            "… {} of {} rows shown",
            preview.rows.len(),
            preview.total_rows
        );
    }
    out
}

fn categories(values: &[LabelValue]) -> String {
    let width = values
        .iter()
        .map(|v| v.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = values.iter().map(|v| v.value).fold(0.0, f64::max);

    let mut out = String::new();
    for v in values {
        let _ = writeln!(
            out,
            "{:<width$}  {:>14}  {}",
            v.label,
            fmt_number(v.value),
            bar(v.value, max)
        );
    }
    out
}

fn time_series(points: &[TimePoint]) -> String {
    let max = points.iter().map(|p| p.value).fold(0.0, f64::max);
    let mut out = String::new();
    for p in points {
        let _ = writeln!(
            out,
            "{}  {:>14}  {}",
            p.period.format("%Y-%m"),
            fmt_amount(p.value),
            bar(p.value, max)
        );
    }
    out
}

fn histogram(bins: &[HistogramBin]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let last = bins.len().saturating_sub(1);
    let mut out = String::new();
    for (i, b) in bins.iter().enumerate() {
        let close = if i == last { ']' } else { ')' };
        let _ = writeln!(
            out,
            "[{:>10.2}, {:>10.2}{close}  {:>6}  {}",
            b.start,
            b.end,
            b.count,
            bar(b.count as f64, max)
        );
    }
    out
}

fn box_table(boxes: &[BoxSummary]) -> String {
    let width = boxes
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>6}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}  {:>8}",
        "group", "n", "low", "q1", "median", "q3", "high", "outliers"
    );
    for b in boxes {
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}  {:>8}",
            b.label,
            b.count,
            fmt_amount(b.lower_whisker),
            fmt_amount(b.q1),
            fmt_amount(b.median),
            fmt_amount(b.q3),
            fmt_amount(b.upper_whisker),
            b.outliers.len()
        );
    }
    out
}

fn stacked(values: &[StackedValue]) -> String {
    let width = values
        .iter()
        .map(|v| v.category.chars().count() + v.group.chars().count() + 3)
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for v in values {
        let key = format!("{} / {}", v.category, v.group);
        let _ = writeln!(out, "{key:<width$}  {:>14}", fmt_amount(v.value));
    }
    out
}

fn hierarchy(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    for root in nodes.iter().filter(|n| n.parent.is_none()) {
        let _ = writeln!(out, "{:<28}  {:>14}", truncate(&root.label), fmt_amount(root.value));
        for child in nodes
            .iter()
            .filter(|n| n.parent.as_deref() == Some(root.id.as_str()))
        {
            let _ = writeln!(
                out,
                "  {:<26}  {:>14}",
                truncate(&child.label),
                fmt_amount(child.value)
            );
        }
    }
    out
}

fn matrix_grid(matrix: &CorrelationMatrix) -> String {
    let names: Vec<String> = matrix.columns.iter().map(|c| truncate(c)).collect();
    let width = names
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max(7);

    let mut out = String::new();
    let _ = write!(out, "{:<width$}", "");
    for name in &names {
        let _ = write!(out, "  {name:>width$}");
    }
    out.push('\n');

    for (r, name) in names.iter().enumerate() {
        let _ = write!(out, "{name:<width$}");
        for c in 0..names.len() {
            let cell = matrix
                .get(r, c)
                .map_or_else(|| fmt_opt(None), |v| format!("{v:.2}"));
            let _ = write!(out, "  {cell:>width$}");
        }
        out.push('\n');
    }
    out
}
