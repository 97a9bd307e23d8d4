//! Derived columns.
//!
//! Each derived column is added only when every column it is computed from is
//! present; otherwise it is skipped without error and whatever depends on it
//! downstream is simply absent. Order matters: `sales` and the date columns
//! must exist before the steps that read them.
//!
//! Derivation runs in two stages. [`derive_columns`] prepares the table shown
//! as the cleaned dataset; [`derive_discount_columns`] adds the binning helpers
//! used only by the discount chart.

use super::columns::{
    DAY_NAME, DISCOUNT, DISCOUNT_BIN, DISCOUNT_CLIPPED, MONTH, ORDER_DATE, PRICE, QUANTITY, SALES,
};
use super::types::Dataset;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Datetime layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

/// Date-only layouts. Month-first comes before day-first, so `01/02/2024` is
/// January 2nd and `15/01/2024` still parses.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Month-only layouts; the day is taken as the 1st.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%B %Y", "%b %Y"];

/// Parse one timestamp the way a lenient spreadsheet user would expect.
/// Returns `None` instead of failing.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }

    let dated = format!("1 {s}");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            MONTH_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&dated, &format!("%d {fmt}")).ok())
        })
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday-first position of a weekday name, for ordering weekday charts.
pub fn weekday_order(name: &str) -> Option<u32> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|d| weekday_name(*d) == name)
    .map(|d| d.num_days_from_monday())
}

/// Discount buckets, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscountBin {
    /// Exactly zero
    Zero,
    /// (0, 0.01]
    UpTo1,
    /// (0.01, 0.05]
    UpTo5,
    /// (0.05, 0.10]
    UpTo10,
    /// (0.10, 0.20]
    UpTo20,
    /// (0.20, 1.0]
    Over20,
}

impl DiscountBin {
    pub const ALL: [Self; 6] = [
        Self::Zero,
        Self::UpTo1,
        Self::UpTo5,
        Self::UpTo10,
        Self::UpTo20,
        Self::Over20,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Zero => "0%",
            Self::UpTo1 => "0-1%",
            Self::UpTo5 => "1-5%",
            Self::UpTo10 => "5-10%",
            Self::UpTo20 => "10-20%",
            Self::Over20 => ">20%",
        }
    }

    /// Inclusive upper edge of the bucket.
    pub fn upper(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::UpTo1 => 0.01,
            Self::UpTo5 => 0.05,
            Self::UpTo10 => 0.10,
            Self::UpTo20 => 0.20,
            Self::Over20 => 1.0,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

/// Bucket label for a clipped discount. Zero is its own closed bucket; every
/// other bucket is open below and closed above. Values past 1.0 get null.
fn discount_bin_expr(clipped: &Expr) -> Expr {
    let within = |bin: DiscountBin| clipped.clone().lt_eq(lit(bin.upper()));
    let label = |bin: DiscountBin| lit(bin.label());

    when(clipped.clone().eq(lit(DiscountBin::Zero.upper())))
        .then(label(DiscountBin::Zero))
        .when(within(DiscountBin::UpTo1))
        .then(label(DiscountBin::UpTo1))
        .when(within(DiscountBin::UpTo5))
        .then(label(DiscountBin::UpTo5))
        .when(within(DiscountBin::UpTo10))
        .then(label(DiscountBin::UpTo10))
        .when(within(DiscountBin::UpTo20))
        .then(label(DiscountBin::UpTo20))
        .when(within(DiscountBin::Over20))
        .then(label(DiscountBin::Over20))
        .otherwise(lit(Null {}))
}

/// Add the columns of the cleaned dataset (`price` as float, `sales`, and the
/// date parts) and return the names of the columns that were added.
///
/// # Errors
///
/// Fails only if polars cannot evaluate a derivation; missing inputs are not
/// errors.
pub fn derive_columns(ds: &mut Dataset) -> Result<Vec<String>> {
    let mut derived = Vec::new();

    if ds.has_column(PRICE) {
        ds.with_columns([col(PRICE).cast(DataType::Float64)])?;
    }

    if ds.has_all(&[PRICE, QUANTITY, DISCOUNT]) {
        let sales = col(PRICE)
            * col(QUANTITY).cast(DataType::Float64)
            * (lit(1.0) - col(DISCOUNT).cast(DataType::Float64));
        ds.with_columns([sales.alias(SALES)])?;
        derived.push(SALES.to_owned());
    } else {
        tracing::debug!(
            missing = ?ds.missing(&[PRICE, QUANTITY, DISCOUNT]),
            "Skipping sales derivation"
        );
    }

    if ds.has_column(ORDER_DATE) {
        derive_date_parts(ds)?;
        derived.push(MONTH.to_owned());
        derived.push(DAY_NAME.to_owned());
    }

    tracing::debug!(dataset = %ds.name, ?derived, "Derived columns");
    Ok(derived)
}

/// Add `discount_clipped` and `discount_bin` when `discount` is present.
///
/// # Errors
///
/// Fails only if polars cannot evaluate the binning.
pub fn derive_discount_columns(ds: &mut Dataset) -> Result<Vec<String>> {
    if !ds.has_column(DISCOUNT) {
        return Ok(Vec::new());
    }

    // Missing discounts count as no discount; negatives are floored at zero
    let clipped = col(DISCOUNT)
        .cast(DataType::Float64)
        .fill_null(lit(0.0))
        .clip_min(lit(0.0));
    ds.with_columns([clipped.alias(DISCOUNT_CLIPPED)])?;
    ds.with_columns([discount_bin_expr(&col(DISCOUNT_CLIPPED)).alias(DISCOUNT_BIN)])?;

    Ok(vec![DISCOUNT_CLIPPED.to_owned(), DISCOUNT_BIN.to_owned()])
}

/// Replace `order_date` with a millisecond datetime column. Text is parsed by
/// polars against the known layouts first; whatever is left goes through
/// [`parse_timestamp`]. Values that still fail become null.
fn derive_date_parts(ds: &mut Dataset) -> Result<()> {
    let dtype = ds.frame.column(ORDER_DATE)?.dtype().clone();
    let datetime = DataType::Datetime(TimeUnit::Milliseconds, None);

    if dtype.is_temporal() {
        ds.with_columns([col(ORDER_DATE).cast(datetime)])?;
    } else {
        let parsed = parse_order_dates(&ds.frame)?;
        ds.frame.with_column(parsed.cast(&datetime)?)?;
    }

    ds.with_columns([
        col(ORDER_DATE).dt().strftime("%B").alias(MONTH),
        col(ORDER_DATE).dt().strftime("%A").alias(DAY_NAME),
    ])?;
    Ok(())
}

fn parse_order_dates(frame: &DataFrame) -> Result<Series> {
    const RAW: &str = "raw";

    let text = col(ORDER_DATE).cast(DataType::String);
    let attempts: Vec<Expr> = DATETIME_FORMATS
        .iter()
        .chain(DATE_FORMATS)
        .map(|fmt| {
            text.clone().str().to_datetime(
                Some(TimeUnit::Milliseconds),
                None,
                StrptimeOptions {
                    format: Some((*fmt).into()),
                    strict: false,
                    ..Default::default()
                },
                lit("raise"),
            )
        })
        .collect();

    let out = frame
        .clone()
        .lazy()
        .select([
            coalesce(&attempts).cast(DataType::Int64).alias(ORDER_DATE),
            text.alias(RAW),
        ])
        .collect()?;

    let inferred = out.column(ORDER_DATE)?.as_materialized_series().i64()?.clone();
    let raw = out.column(RAW)?.as_materialized_series().str()?.clone();

    let mut unparsed = 0usize;
    let millis: Vec<Option<i64>> = inferred
        .into_iter()
        .zip(raw.into_iter())
        .map(|(parsed, raw)| {
            parsed.or_else(|| {
                let fallback = raw
                    .and_then(parse_timestamp)
                    .map(|dt| dt.and_utc().timestamp_millis());
                if raw.is_some() && fallback.is_none() {
                    unparsed += 1;
                }
                fallback
            })
        })
        .collect();

    if unparsed > 0 {
        tracing::debug!(unparsed, "Unparseable order dates treated as missing");
    }
    Ok(Series::new(ORDER_DATE.into(), millis))
}
