use crate::error::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const PAGE_TITLE: &str = "Ecommerce EDA";
pub const DASHBOARD_TITLE: &str = "📊 Ecommerce Data Analysis Dashboard";
pub const UPLOAD_ADVISORY: &str = "⚠ Please upload a dataset file to proceed.";

// Overview labels
pub const PREVIEW_HEADING: &str = "🔍 Dataset Preview";
pub const SHAPE_LABEL: &str = "📏 Shape of dataset:";
pub const MISSING_LABEL: &str = "🟡 Missing Values:";
pub const DUPLICATES_LABEL: &str = "🟡 Duplicate Records:";
pub const CLEANED_HEADING: &str = "✅ Cleaned Dataset";

/// One uploaded table. The frame gains derived columns during preparation and
/// is read-only for chart steps.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub name: String,
    pub frame: DataFrame,
}

impl Dataset {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_column(name))
    }

    /// The subset of `names` this dataset lacks, in the order given.
    pub fn missing(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| (*name).to_owned())
            .collect()
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .filter(|c| c.dtype().is_primitive_numeric())
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Column values as floats. Unparseable strings and NaN come back as `None`.
    pub fn f64_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let ca = series.f64()?;
        Ok(ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Evaluate `exprs` against the frame and add (or replace) the columns
    /// they produce.
    pub fn with_columns(&mut self, exprs: impl AsRef<[Expr]>) -> Result<()> {
        self.frame = self.frame.clone().lazy().with_columns(exprs).collect()?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Temporal,
    Boolean,
    Other,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_bool() {
            Self::Boolean
        } else if dtype.is_primitive_numeric() {
            Self::Numeric
        } else if dtype.is_temporal() {
            Self::Temporal
        } else if matches!(dtype, DataType::String) {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Temporal => "Temporal",
            Self::Boolean => "Boolean",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub nulls: usize,
}

/// The first rows of a table, every cell already formatted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

/// Text summaries shown above the charts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub file_name: String,
    pub rows: usize,
    pub columns: usize,
    pub schema: Vec<ColumnInfo>,
    pub duplicate_rows: usize,
    pub memory_bytes: usize,
    pub preview: TablePreview,
}

impl DatasetOverview {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn null_counts(&self) -> Vec<(&str, usize)> {
        self.schema
            .iter()
            .map(|c| (c.name.as_str(), c.nulls))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Univariate,
    TimeSeries,
    Bivariate,
    Product,
    Customer,
    Correlation,
    Extra,
}

impl Section {
    pub const ALL: [Self; 7] = [
        Self::Univariate,
        Self::TimeSeries,
        Self::Bivariate,
        Self::Product,
        Self::Customer,
        Self::Correlation,
        Self::Extra,
    ];

    /// Whether the header shows even when none of the section's charts ran.
    /// Time series only appears once there is something to plot.
    pub fn always_shown(self) -> bool {
        !matches!(self, Self::TimeSeries)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Univariate => "📌 Univariate Analysis",
            Self::TimeSeries => "📌 Time Series Analysis",
            Self::Bivariate => "📌 Bivariate Analysis",
            Self::Product => "📌 Product Analysis",
            Self::Customer => "📌 Customer Analysis",
            Self::Correlation => "📌 Correlation Analysis",
            Self::Extra => "📌 Extra Visualizations",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    CategoryDistribution,
    RegionSalesShare,
    PriceDistribution,
    MonthlySalesTrend,
    SalesByCategory,
    SalesByWeekday,
    SalesByCategoryRegion,
    TopProducts,
    BottomProducts,
    TopCustomers,
    CorrelationMatrix,
    CategoryRegionTreemap,
    DiscountBinSales,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Donut,
    Histogram,
    Line,
    Box,
    StackedBar,
    Treemap,
    Heatmap,
}

/// Presentation hints carried alongside the data.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChartOptions {
    /// Print each bar's value on the bar
    pub value_labels: bool,
    /// One colour per label instead of a single series colour
    pub color_by_label: bool,
    pub markers: bool,
    pub horizontal: bool,
    pub show_outliers: bool,
    pub color_scheme: Option<String>,
    /// Donut hole as a fraction of the radius
    pub hole: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LabelValue {
    pub label: String,
    pub value: f64,
}

impl LabelValue {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimePoint {
    /// First day of the period
    pub period: NaiveDate,
    pub value: f64,
}

/// Half-open `[start, end)` except for the last bin, which is closed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StackedValue {
    pub category: String,
    pub group: String,
    pub value: f64,
}

/// Node of a treemap hierarchy. Roots have no parent and their value is the
/// sum of their children.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where the coefficient is undefined
    pub data: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ChartData {
    Categories(Vec<LabelValue>),
    TimeSeries(Vec<TimePoint>),
    Histogram(Vec<HistogramBin>),
    Boxes(Vec<BoxSummary>),
    Stacked(Vec<StackedValue>),
    Hierarchy(Vec<TreeNode>),
    Matrix(CorrelationMatrix),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            Self::Categories(v) => v.len(),
            Self::TimeSeries(v) => v.len(),
            Self::Histogram(v) => v.len(),
            Self::Boxes(v) => v.len(),
            Self::Stacked(v) => v.len(),
            Self::Hierarchy(v) => v.len(),
            Self::Matrix(m) => m.columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a renderer needs to draw one chart.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub step: StepId,
    pub section: Section,
    pub heading: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub options: ChartOptions,
    pub data: ChartData,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedStep {
    pub step: StepId,
    pub missing: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub overview: DatasetOverview,
    pub derived_columns: Vec<String>,
    pub prepared_preview: TablePreview,
    pub charts: Vec<ChartSpec>,
    pub skipped: Vec<SkippedStep>,
    pub warnings: Vec<String>,
    #[serde(with = "duration_serde", rename = "render_duration")]
    pub duration: std::time::Duration,
}

impl Report {
    pub fn chart(&self, step: StepId) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.step == step)
    }

    /// Charts grouped under their section headers, in page order. Sections
    /// with no charts are kept only if their header always shows.
    pub fn sections(&self) -> Vec<(Section, Vec<&ChartSpec>)> {
        let mut sections = Vec::new();
        for section in Section::ALL {
            let charts: Vec<&ChartSpec> =
                self.charts.iter().filter(|c| c.section == section).collect();
            if section.always_shown() || !charts.is_empty() {
                sections.push((section, charts));
            }
        }
        sections
    }

    /// One-line description of the pass.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows × {} columns, {} charts, {} skipped, {} warnings, {:.2}s",
            self.overview.file_name,
            self.overview.rows,
            self.overview.columns,
            self.charts.len(),
            self.skipped.len(),
            self.warnings.len(),
            self.duration.as_secs_f64()
        )
    }
}

mod duration_serde {
    use serde::{Serializer, ser::SerializeStruct as _};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Duration", 2)?;
        state.serialize_field("secs", &duration.as_secs())?;
        state.serialize_field("nanos", &duration.subsec_nanos())?;
        state.end()
    }
}

/// What one render pass shows.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// No file uploaded yet
    Advisory { message: String },
    Report(Box<Report>),
}

impl Page {
    pub fn advisory() -> Self {
        Self::Advisory {
            message: UPLOAD_ADVISORY.to_owned(),
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Report(r) => Some(r),
            Self::Advisory { .. } => None,
        }
    }
}
