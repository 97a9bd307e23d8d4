//! The analysis steps, as a declarative table.
//!
//! Each entry pairs a gate (the columns it needs) with a build function. The
//! runner walks the table in order, skips entries whose gate fails, and keeps
//! going when a build fails so one bad column cannot blank the whole page.

use super::aggregate::{self, Rank};
use super::columns::{
    CATEGORY, CUSTOMER_ID, DAY_NAME, DISCOUNT, DISCOUNT_BIN, DISCOUNT_CLIPPED, ORDER_DATE, PRICE,
    PRODUCT_ID, REGION, SALES,
};
use super::derive::{DiscountBin, weekday_order};
use super::types::{
    BoxSummary, ChartData, ChartKind, ChartOptions, ChartSpec, Dataset, Section, SkippedStep,
    StepId,
};
use crate::config::DashboardSettings;
use crate::error::Result;

/// Columns a step needs before it can run.
#[derive(Clone, Copy, Debug)]
pub enum Gate {
    /// Every listed column must be present
    Columns(&'static [&'static str]),
    /// At least one numeric column must be present
    AnyNumeric,
}

impl Gate {
    /// What is missing for this gate to open; empty when it is open.
    pub fn missing(&self, ds: &Dataset) -> Vec<String> {
        match self {
            Self::Columns(cols) => ds.missing(cols),
            Self::AnyNumeric => {
                if correlation_columns(ds).is_empty() {
                    vec!["<numeric column>".to_owned()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn is_open(&self, ds: &Dataset) -> bool {
        self.missing(ds).is_empty()
    }
}

/// The drawable part of a chart; the step supplies the rest.
struct Chart {
    kind: ChartKind,
    x_label: Option<String>,
    y_label: Option<String>,
    options: ChartOptions,
    data: ChartData,
}

impl Chart {
    fn new(kind: ChartKind, data: ChartData) -> Self {
        Self {
            kind,
            x_label: None,
            y_label: None,
            options: ChartOptions::default(),
            data,
        }
    }

    fn axes(mut self, x: &str, y: &str) -> Self {
        self.x_label = Some(x.to_owned());
        self.y_label = Some(y.to_owned());
        self
    }

    fn options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }
}

type BuildFn = fn(&Dataset, &DashboardSettings) -> Result<Chart>;

pub struct AnalysisStep {
    pub id: StepId,
    pub section: Section,
    pub heading: &'static str,
    pub title: &'static str,
    pub gate: Gate,
    build: BuildFn,
}

impl AnalysisStep {
    /// Build this step's chart. The caller is expected to have checked the gate.
    pub fn build(&self, ds: &Dataset, settings: &DashboardSettings) -> Result<ChartSpec> {
        let chart = (self.build)(ds, settings)?;
        Ok(ChartSpec {
            step: self.id,
            section: self.section,
            heading: self.heading.to_owned(),
            title: self.title.to_owned(),
            kind: chart.kind,
            x_label: chart.x_label,
            y_label: chart.y_label,
            options: chart.options,
            data: chart.data,
        })
    }
}

pub static STEPS: [AnalysisStep; 13] = [
    AnalysisStep {
        id: StepId::CategoryDistribution,
        section: Section::Univariate,
        heading: "Category Distribution",
        title: "Category Counts",
        gate: Gate::Columns(&[CATEGORY]),
        build: category_counts,
    },
    AnalysisStep {
        id: StepId::RegionSalesShare,
        section: Section::Univariate,
        heading: "Sales Share by Region",
        title: "Sales Contribution by Region",
        gate: Gate::Columns(&[REGION, SALES]),
        build: region_share,
    },
    AnalysisStep {
        id: StepId::PriceDistribution,
        section: Section::Univariate,
        heading: "Price Distribution",
        title: "Price Distribution",
        gate: Gate::Columns(&[PRICE]),
        build: price_distribution,
    },
    AnalysisStep {
        id: StepId::MonthlySalesTrend,
        section: Section::TimeSeries,
        heading: "Monthly Sales Trend",
        title: "Sales Over Time",
        gate: Gate::Columns(&[ORDER_DATE, SALES]),
        build: monthly_trend,
    },
    AnalysisStep {
        id: StepId::SalesByCategory,
        section: Section::Bivariate,
        heading: "Sales Distribution by Category",
        title: "Sales Distribution by Category",
        gate: Gate::Columns(&[CATEGORY, SALES]),
        build: sales_by_category,
    },
    AnalysisStep {
        id: StepId::SalesByWeekday,
        section: Section::Bivariate,
        heading: "Sales by Day of Week",
        title: "Total Sales by Weekday",
        gate: Gate::Columns(&[DAY_NAME, SALES]),
        build: weekday_sales,
    },
    AnalysisStep {
        id: StepId::SalesByCategoryRegion,
        section: Section::Bivariate,
        heading: "Sales by Category Across Regions",
        title: "Sales by Category Across Regions",
        gate: Gate::Columns(&[CATEGORY, REGION, SALES]),
        build: category_region_bars,
    },
    AnalysisStep {
        id: StepId::TopProducts,
        section: Section::Product,
        heading: "Top 10 Best-Selling Products (Treemap)",
        title: "Top Products by Sales",
        gate: Gate::Columns(&[PRODUCT_ID, SALES]),
        build: top_products,
    },
    AnalysisStep {
        id: StepId::BottomProducts,
        section: Section::Product,
        heading: "Lowest Performing Products",
        title: "Low Performing Products",
        gate: Gate::Columns(&[PRODUCT_ID, SALES]),
        build: bottom_products,
    },
    AnalysisStep {
        id: StepId::TopCustomers,
        section: Section::Customer,
        heading: "Top 10 Customers by Sales (Donut Chart)",
        title: "Top Customers by Sales",
        gate: Gate::Columns(&[CUSTOMER_ID, SALES]),
        build: top_customers,
    },
    AnalysisStep {
        id: StepId::CorrelationMatrix,
        section: Section::Correlation,
        heading: "Correlation Matrix",
        title: "Correlation Heatmap",
        gate: Gate::AnyNumeric,
        build: correlation,
    },
    AnalysisStep {
        id: StepId::CategoryRegionTreemap,
        section: Section::Extra,
        heading: "Treemap of Sales by Category and Region",
        title: "Treemap: Category & Region Sales Share",
        gate: Gate::Columns(&[CATEGORY, REGION, SALES]),
        build: category_region_treemap,
    },
    AnalysisStep {
        id: StepId::DiscountBinSales,
        section: Section::Extra,
        heading: "Discount vs Sales (Boxplot)",
        title: "Sales Distribution by Discount Bin",
        gate: Gate::Columns(&[DISCOUNT, SALES]),
        build: discount_bin_sales,
    },
];

/// Outcome of running the whole table once.
#[derive(Debug, Default)]
pub struct StepRun {
    pub charts: Vec<ChartSpec>,
    pub skipped: Vec<SkippedStep>,
    pub warnings: Vec<String>,
}

pub fn run_steps(ds: &Dataset, settings: &DashboardSettings) -> StepRun {
    let mut run = StepRun::default();

    for (idx, step) in STEPS.iter().enumerate() {
        let missing = step.gate.missing(ds);
        if !missing.is_empty() {
            tracing::debug!(step = ?step.id, ?missing, "Step skipped");
            run.skipped.push(SkippedStep {
                step: step.id,
                missing,
            });
            continue;
        }

        match step.build(ds, settings) {
            Ok(chart) => run.charts.push(chart),
            Err(e) => {
                tracing::warn!(step = ?step.id, error = %e, "Step failed");
                run.warnings
                    .push(format!("Step {} ({}): {e} (skipped)", idx + 1, step.heading));
            }
        }
    }

    run
}

/// Numeric columns that feed the correlation heatmap. `discount_clipped` is a
/// binning helper and would only duplicate `discount`.
pub fn correlation_columns(ds: &Dataset) -> Vec<String> {
    ds.numeric_column_names()
        .into_iter()
        .filter(|name| name != DISCOUNT_CLIPPED)
        .collect()
}

fn category_counts(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let counts = aggregate::value_counts(&ds.frame, CATEGORY)?;
    Ok(Chart::new(ChartKind::Bar, ChartData::Categories(counts))
        .axes(CATEGORY, "count")
        .options(ChartOptions {
            value_labels: true,
            color_by_label: true,
            ..Default::default()
        }))
}

fn region_share(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let sums = aggregate::sum_by_key(&ds.frame, REGION, SALES)?;
    Ok(
        Chart::new(ChartKind::Pie, ChartData::Categories(sums)).options(ChartOptions {
            color_by_label: true,
            ..Default::default()
        }),
    )
}

fn price_distribution(ds: &Dataset, settings: &DashboardSettings) -> Result<Chart> {
    let bins = aggregate::histogram(&ds.f64_values(PRICE)?, settings.histogram_bins);
    Ok(Chart::new(ChartKind::Histogram, ChartData::Histogram(bins)).axes("Price", "Frequency"))
}

fn monthly_trend(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let points = aggregate::sum_by_month(&ds.frame, ORDER_DATE, SALES)?;
    Ok(Chart::new(ChartKind::Line, ChartData::TimeSeries(points))
        .axes(ORDER_DATE, SALES)
        .options(ChartOptions {
            markers: true,
            ..Default::default()
        }))
}

/// One box per group, skipping groups with no sales values.
fn boxes(groups: Vec<(String, Vec<f64>)>) -> Result<Vec<BoxSummary>> {
    let mut out = Vec::with_capacity(groups.len());
    for (label, values) in groups {
        if let Some(summary) = aggregate::box_summary(label, &values)? {
            out.push(summary);
        }
    }
    Ok(out)
}

fn sales_by_category(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let boxes = boxes(aggregate::group_values(&ds.frame, CATEGORY, SALES)?)?;
    Ok(Chart::new(ChartKind::Box, ChartData::Boxes(boxes))
        .axes(CATEGORY, SALES)
        .options(ChartOptions {
            color_by_label: true,
            show_outliers: true,
            color_scheme: Some("set2".to_owned()),
            ..Default::default()
        }))
}

fn weekday_sales(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let mut sums = aggregate::sum_by_key(&ds.frame, DAY_NAME, SALES)?;
    sums.sort_by_key(|s| weekday_order(&s.label).unwrap_or(u32::MAX));

    Ok(Chart::new(ChartKind::Bar, ChartData::Categories(sums))
        .axes(DAY_NAME, SALES)
        .options(ChartOptions {
            color_by_label: true,
            ..Default::default()
        }))
}

fn category_region_bars(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let pairs = aggregate::sum_by_pair(&ds.frame, CATEGORY, REGION, SALES)?;
    Ok(Chart::new(ChartKind::StackedBar, ChartData::Stacked(pairs))
        .axes(SALES, CATEGORY)
        .options(ChartOptions {
            horizontal: true,
            ..Default::default()
        }))
}

fn top_products(ds: &Dataset, settings: &DashboardSettings) -> Result<Chart> {
    let top = aggregate::ranked_sums(&ds.frame, PRODUCT_ID, SALES, settings.top_n, Rank::Top)?;
    Ok(Chart::new(
        ChartKind::Treemap,
        ChartData::Hierarchy(aggregate::flat_hierarchy(&top)),
    )
    .options(ChartOptions {
        value_labels: true,
        color_scheme: Some("blues".to_owned()),
        ..Default::default()
    }))
}

fn bottom_products(ds: &Dataset, settings: &DashboardSettings) -> Result<Chart> {
    let bottom =
        aggregate::ranked_sums(&ds.frame, PRODUCT_ID, SALES, settings.top_n, Rank::Bottom)?;
    Ok(Chart::new(ChartKind::Bar, ChartData::Categories(bottom)).axes(PRODUCT_ID, SALES))
}

fn top_customers(ds: &Dataset, settings: &DashboardSettings) -> Result<Chart> {
    let top = aggregate::ranked_sums(&ds.frame, CUSTOMER_ID, SALES, settings.top_n, Rank::Top)?;
    Ok(
        Chart::new(ChartKind::Donut, ChartData::Categories(top)).options(ChartOptions {
            color_by_label: true,
            hole: Some(settings.donut_hole),
            ..Default::default()
        }),
    )
}

fn correlation(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let matrix = aggregate::correlation_matrix(&ds.frame, &correlation_columns(ds))?;
    Ok(Chart::new(ChartKind::Heatmap, ChartData::Matrix(matrix)).options(ChartOptions {
        value_labels: true,
        color_scheme: Some("redblue".to_owned()),
        ..Default::default()
    }))
}

fn category_region_treemap(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let pairs = aggregate::sum_by_pair(&ds.frame, CATEGORY, REGION, SALES)?;
    Ok(Chart::new(
        ChartKind::Treemap,
        ChartData::Hierarchy(aggregate::hierarchy(&pairs)),
    )
    .options(ChartOptions {
        value_labels: true,
        ..Default::default()
    }))
}

fn discount_bin_sales(ds: &Dataset, _: &DashboardSettings) -> Result<Chart> {
    let mut groups = aggregate::group_values(&ds.frame, DISCOUNT_BIN, SALES)?;
    groups.sort_by_key(|(label, _)| DiscountBin::from_label(label));

    Ok(Chart::new(ChartKind::Box, ChartData::Boxes(boxes(groups)?))
        .axes("Discount Bin", "Sales")
        .options(ChartOptions {
            show_outliers: true,
            ..Default::default()
        }))
}
