//! Integration tests for the full render pass
//!
//! These run the complete pipeline on fixture files in `testdata/` and check
//! the end-to-end results, including the rendered pages.

#![expect(clippy::unwrap_used, clippy::indexing_slicing)]

use anyhow::Result;
use ecommerce_eda::config::{DashboardSettings, OutputFormat};
use ecommerce_eda::dashboard::types::{ChartData, LabelValue};
use ecommerce_eda::dashboard::{Page, Report, Session, StepId, UPLOAD_ADVISORY, prepare_report};
use ecommerce_eda::writer::{VegaLiteWriter, Writer as _, render_page};
use std::path::Path;

fn report(file: &str) -> Result<Report> {
    Ok(prepare_report(Path::new(file), &DashboardSettings::default())?)
}

fn categories(report: &Report, step: StepId) -> Vec<LabelValue> {
    match report.chart(step).map(|c| &c.data) {
        Some(ChartData::Categories(values)) => values.clone(),
        _ => Vec::new(),
    }
}

#[test]
fn test_full_orders_file() -> Result<()> {
    let report = report("testdata/orders.csv")?;

    assert_eq!(report.overview.shape(), (12, 9));
    assert_eq!(report.overview.duplicate_rows, 1, "Row 12 repeats row 11");
    let discount_nulls = report
        .overview
        .null_counts()
        .into_iter()
        .find(|(name, _)| *name == "discount")
        .map(|(_, n)| n);
    assert_eq!(discount_nulls, Some(1));

    assert_eq!(report.charts.len(), 13, "Every step should render");
    assert!(report.skipped.is_empty());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    Ok(())
}

#[test]
fn test_top_products_descending() -> Result<()> {
    let report = report("testdata/orders.csv")?;
    let chart = report.chart(StepId::TopProducts).unwrap();
    let ChartData::Hierarchy(nodes) = &chart.data else {
        anyhow::bail!("treemap should carry a hierarchy");
    };

    // Eight distinct products, fewer than the top-10 limit
    assert_eq!(nodes.len(), 8);
    assert_eq!(nodes[0].label, "P100");
    assert!((nodes[0].value - 650.0).abs() < 1e-9);
    assert!(nodes.windows(2).all(|w| w[0].value >= w[1].value));
    // Equal totals are ordered by product id
    let p500 = nodes.iter().position(|n| n.label == "P500").unwrap();
    let p700 = nodes.iter().position(|n| n.label == "P700").unwrap();
    assert!(p500 < p700);
    Ok(())
}

#[test]
fn test_monthly_trend_matches_total_sales() -> Result<()> {
    let report = report("testdata/orders.csv")?;
    let chart = report.chart(StepId::MonthlySalesTrend).unwrap();
    let ChartData::TimeSeries(points) = &chart.data else {
        anyhow::bail!("trend should be a time series");
    };

    assert_eq!(points.len(), 4);
    let total: f64 = points.iter().map(|p| p.value).sum();
    assert!((total - 1845.2).abs() < 1e-6, "got {total}");
    Ok(())
}

#[test]
fn test_excel_workbook() -> Result<()> {
    let report = report("testdata/orders.xlsx")?;
    let dtype = |name: &str| {
        report
            .overview
            .schema
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.dtype.clone())
    };

    assert_eq!(report.overview.shape(), (3, 10));
    // A blank header cell gets a positional name
    assert_eq!(report.overview.schema[9].name, "column_10");
    // Workbook numbers are floats on disk; whole ones load as integers
    assert_eq!(dtype("order_id").as_deref(), Some("i64"));
    assert_eq!(dtype("quantity").as_deref(), Some("i64"));
    assert_eq!(dtype("price").as_deref(), Some("f64"));
    assert_eq!(dtype("order_date").as_deref(), Some("str"));
    assert_eq!(report.overview.preview.rows[0][5], "2024-01-05 00:00:00");

    assert_eq!(report.derived_columns.len(), 5);
    assert_eq!(report.charts.len(), 13);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let chart = report.chart(StepId::MonthlySalesTrend).unwrap();
    let ChartData::TimeSeries(points) = &chart.data else {
        anyhow::bail!("trend should be a time series");
    };
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values.len(), 2);
    assert!((values[0] - 38.0).abs() < 1e-9);
    assert!((values[1] - 20.9).abs() < 1e-9);

    let days = categories(&report, StepId::SalesByWeekday);
    let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Friday", "Saturday"]);
    Ok(())
}

#[test]
fn test_missing_discount_column() -> Result<()> {
    let report = report("testdata/orders_no_discount.csv")?;

    assert!(report.derived_columns.is_empty());
    let steps: Vec<StepId> = report.charts.iter().map(|c| c.step).collect();
    assert_eq!(
        steps,
        vec![
            StepId::CategoryDistribution,
            StepId::PriceDistribution,
            StepId::CorrelationMatrix,
        ]
    );
    assert!(report.chart(StepId::DiscountBinSales).is_none());
    assert_eq!(
        categories(&report, StepId::CategoryDistribution),
        vec![LabelValue::new("Books", 2.0), LabelValue::new("Toys", 1.0)]
    );
    Ok(())
}

#[test]
fn test_unparseable_dates_are_left_out() -> Result<()> {
    let report = report("testdata/orders_bad_dates.csv")?;
    let chart = report.chart(StepId::MonthlySalesTrend).unwrap();
    let ChartData::TimeSeries(points) = &chart.data else {
        anyhow::bail!("trend should be a time series");
    };

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![10.0, 30.0]);
    // The region chart still counts every row
    let regions = categories(&report, StepId::RegionSalesShare);
    let total: f64 = regions.iter().map(|r| r.value).sum();
    assert!((total - 100.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_session_reupload() -> Result<()> {
    let mut session = Session::default();
    assert!(matches!(session.render()?, Page::Advisory { .. }));

    session.upload("testdata/orders.csv")?;
    assert_eq!(session.render()?.report().unwrap().charts.len(), 13);

    session.upload("testdata/orders_no_discount.csv")?;
    let page = session.render()?;
    let report = page.report().unwrap();
    assert_eq!(report.overview.file_name, "orders_no_discount.csv");
    assert!(report.chart(StepId::TopCustomers).is_none());
    Ok(())
}

#[test]
fn test_pages_in_every_format() -> Result<()> {
    let settings = DashboardSettings::default();
    let mut session = Session::new(settings.clone());
    session.upload("testdata/orders.csv")?;
    let page = session.render()?;

    let text = render_page(&page, OutputFormat::Text, &settings)?;
    assert!(text.contains("📌 Univariate Analysis"));
    assert!(text.contains("Top 10 Customers by Sales (Donut Chart)"));
    assert!(text.contains("🟡 Duplicate Records: 1"));

    let html = render_page(&page, OutputFormat::Html, &settings)?;
    assert_eq!(html.matches("vegaEmbed(").count(), 13);
    assert!(html.contains("Treemap of Sales by Category and Region"));

    let json: serde_json::Value =
        serde_json::from_str(&render_page(&page, OutputFormat::Json, &settings)?)?;
    assert_eq!(json["page"], "report");
    assert_eq!(json["charts"].as_array().map(Vec::len), Some(13));

    let specs = VegaLiteWriter::new(&settings).write(&page)?;
    assert_eq!(specs.len(), 13);
    assert!(specs.iter().all(|s| s["$schema"].is_string()));
    Ok(())
}

#[test]
fn test_advisory_page_text() -> Result<()> {
    let text = render_page(
        &Page::advisory(),
        OutputFormat::Text,
        &DashboardSettings::default(),
    )?;
    assert!(text.contains(UPLOAD_ADVISORY));
    Ok(())
}
