//! Aggregations behind the charts.
//!
//! Every aggregation reads straight from the dataset's frame through a lazy
//! query, so the grouping rules are spelled out in one place:
//!
//! - rows with a missing group key are dropped
//! - missing values add nothing to a sum, so an all-missing group sums to 0
//! - NaN and infinities are treated as missing

use super::types::{
    BoxSummary, CorrelationMatrix, HistogramBin, LabelValue, StackedValue, TimePoint, TreeNode,
};
use crate::error::Result;
use chrono::NaiveDate;
use polars::prelude::*;

const KEY: &str = "key";
const GROUP: &str = "group";
const VALUE: &str = "value";
const YEAR: &str = "year";
const MONTH: &str = "month";

/// `name` as a string key column.
fn key_expr(name: &str, alias: &str) -> Expr {
    col(name).cast(DataType::String).alias(alias)
}

/// `name` as floats, with anything non-finite turned into null.
fn value_expr(name: &str) -> Expr {
    let v = col(name).cast(DataType::Float64);
    when(v.clone().is_finite())
        .then(v)
        .otherwise(lit(Null {}))
        .alias(VALUE)
}

fn str_column(frame: &DataFrame, name: &str) -> Result<StringChunked> {
    Ok(frame.column(name)?.as_materialized_series().str()?.clone())
}

fn f64_column(frame: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

fn label_values(out: &DataFrame) -> Result<Vec<LabelValue>> {
    let keys = str_column(out, KEY)?;
    let values = f64_column(out, VALUE)?;
    Ok(keys
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(key, value)| Some(LabelValue::new(key?, value.unwrap_or(0.0))))
        .collect())
}

/// Occurrences per key, most frequent first. Ties keep first-appearance order.
///
/// # Errors
///
/// Fails if `key` is not a column of `frame`.
pub fn value_counts(frame: &DataFrame, key: &str) -> Result<Vec<LabelValue>> {
    let out = frame
        .clone()
        .lazy()
        .select([key_expr(key, KEY)])
        .filter(col(KEY).is_not_null())
        .group_by_stable([col(KEY)])
        .agg([len().alias(VALUE)])
        .sort_by_exprs(
            [col(VALUE)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    label_values(&out)
}

fn sums(frame: &DataFrame, key: &str, value: &str) -> LazyFrame {
    frame
        .clone()
        .lazy()
        .select([key_expr(key, KEY), value_expr(value)])
        .filter(col(KEY).is_not_null())
        .group_by_stable([col(KEY)])
        .agg([col(VALUE).sum()])
}

/// Sum of `value` per `key`, in the order keys first appear.
///
/// # Errors
///
/// Fails if either column is missing or `value` is not numeric.
pub fn sum_by_key(frame: &DataFrame, key: &str, value: &str) -> Result<Vec<LabelValue>> {
    label_values(&sums(frame, key, value).collect()?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
    Top,
    Bottom,
}

/// The `n` largest (or smallest) per-key sums. Ties are broken by label so the
/// result does not depend on row order.
///
/// # Errors
///
/// Fails if either column is missing or `value` is not numeric.
pub fn ranked_sums(
    frame: &DataFrame,
    key: &str,
    value: &str,
    n: usize,
    rank: Rank,
) -> Result<Vec<LabelValue>> {
    let out = sums(frame, key, value)
        .sort_by_exprs(
            [col(VALUE), col(KEY)],
            SortMultipleOptions::default()
                .with_order_descending_multi([rank == Rank::Top, false]),
        )
        .limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX))
        .collect()?;
    label_values(&out)
}

/// Sum of `value` per `(category, group)` pair, sorted by category then group.
///
/// # Errors
///
/// Fails if a column is missing or `value` is not numeric.
pub fn sum_by_pair(
    frame: &DataFrame,
    category: &str,
    group: &str,
    value: &str,
) -> Result<Vec<StackedValue>> {
    let out = frame
        .clone()
        .lazy()
        .select([
            key_expr(category, KEY),
            key_expr(group, GROUP),
            value_expr(value),
        ])
        .filter(col(KEY).is_not_null().and(col(GROUP).is_not_null()))
        .group_by([col(KEY), col(GROUP)])
        .agg([col(VALUE).sum()])
        .sort_by_exprs([col(KEY), col(GROUP)], SortMultipleOptions::default())
        .collect()?;

    let categories = str_column(&out, KEY)?;
    let groups = str_column(&out, GROUP)?;
    let values = f64_column(&out, VALUE)?;
    Ok(categories
        .into_iter()
        .zip(groups.into_iter())
        .zip(values.into_iter())
        .filter_map(|((category, group), value)| {
            Some(StackedValue {
                category: category?.to_owned(),
                group: group?.to_owned(),
                value: value.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Sum of `value` per calendar month of the datetime column `date`, oldest
/// first. Rows without a date are dropped.
///
/// # Errors
///
/// Fails if `date` is not temporal or `value` is not numeric.
pub fn sum_by_month(frame: &DataFrame, date: &str, value: &str) -> Result<Vec<TimePoint>> {
    let out = frame
        .clone()
        .lazy()
        .select([
            col(date).dt().year().cast(DataType::Int32).alias(YEAR),
            col(date).dt().month().cast(DataType::Int32).alias(MONTH),
            value_expr(value),
        ])
        .filter(col(YEAR).is_not_null())
        .group_by([col(YEAR), col(MONTH)])
        .agg([col(VALUE).sum()])
        .sort_by_exprs([col(YEAR), col(MONTH)], SortMultipleOptions::default())
        .collect()?;

    let years = out.column(YEAR)?.as_materialized_series().i32()?.clone();
    let months = out.column(MONTH)?.as_materialized_series().i32()?.clone();
    let values = f64_column(&out, VALUE)?;
    Ok(years
        .into_iter()
        .zip(months.into_iter())
        .zip(values.into_iter())
        .filter_map(|((year, month), value)| {
            let period = NaiveDate::from_ymd_opt(year?, u32::try_from(month?).ok()?, 1)?;
            Some(TimePoint {
                period,
                value: value.unwrap_or(0.0),
            })
        })
        .collect())
}

/// `bins` equal-width bins spanning the observed range. The last bin is closed
/// so the maximum lands in it. A constant column gets the range `v ± 0.5`.
pub fn histogram(values: &[Option<f64>], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        if let Some(c) = counts.get_mut(idx) {
            *c += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Tukey box statistics: whiskers reach the most extreme values within
/// 1.5 × IQR of the quartiles, anything beyond is an outlier. Quartiles are
/// linearly interpolated. `None` when there is no finite value.
///
/// # Errors
///
/// Fails if polars cannot compute a quartile.
pub fn box_summary(label: impl Into<String>, values: &[f64]) -> Result<Option<BoxSummary>> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let ca = Float64Chunked::from_slice(PlSmallStr::EMPTY, &sorted);
    let (Some(q1), Some(median), Some(q3)) = (
        ca.quantile(0.25, QuantileMethod::Linear)?,
        ca.quantile(0.5, QuantileMethod::Linear)?,
        ca.quantile(0.75, QuantileMethod::Linear)?,
    ) else {
        return Ok(None);
    };

    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let (outliers, inside): (Vec<f64>, Vec<f64>) = sorted
        .iter()
        .copied()
        .partition(|v| *v < lo_fence || *v > hi_fence);

    Ok(Some(BoxSummary {
        label: label.into(),
        count: sorted.len(),
        lower_whisker: inside.first().copied().unwrap_or(q1),
        q1,
        median,
        q3,
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    }))
}

/// Non-missing values of `value` grouped by `key`, keys in first-appearance
/// order.
///
/// # Errors
///
/// Fails if either column is missing or `value` is not numeric.
pub fn group_values(frame: &DataFrame, key: &str, value: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let out = frame
        .clone()
        .lazy()
        .select([key_expr(key, KEY), value_expr(value)])
        .filter(col(KEY).is_not_null())
        .group_by_stable([col(KEY)])
        .agg([col(VALUE).drop_nulls()])
        .collect()?;

    let keys = str_column(&out, KEY)?;
    let lists = out.column(VALUE)?.as_materialized_series().list()?.clone();

    let mut groups = Vec::with_capacity(out.height());
    for (key, list) in keys.into_iter().zip(lists.into_iter()) {
        let Some(key) = key else { continue };
        let values = match list {
            Some(series) => series.f64()?.into_iter().flatten().collect(),
            None => Vec::new(),
        };
        groups.push((key.to_owned(), values));
    }
    Ok(groups)
}

/// Pearson correlation over the rows where both sides have values.
/// `None` with fewer than two such rows or when either side is constant.
///
/// # Errors
///
/// Fails if the null mask cannot be applied.
pub fn pearson(a: &Float64Chunked, b: &Float64Chunked) -> Result<Option<f64>> {
    let both = &a.is_not_null() & &b.is_not_null();
    let (a, b) = (a.filter(&both)?, b.filter(&both)?);
    if a.len() < 2 {
        return Ok(None);
    }
    Ok(polars::prelude::cov::pearson_corr(&a, &b)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0)))
}

/// Pairwise Pearson coefficients between `columns`.
///
/// # Errors
///
/// Fails if a column is missing or cannot be cast to float.
pub fn correlation_matrix(frame: &DataFrame, columns: &[String]) -> Result<CorrelationMatrix> {
    let cleaned = frame
        .clone()
        .lazy()
        .select(
            columns
                .iter()
                .map(|name| value_expr(name).alias(name.as_str()))
                .collect::<Vec<_>>(),
        )
        .collect()?;

    let values = columns
        .iter()
        .map(|name| f64_column(&cleaned, name))
        .collect::<Result<Vec<_>>>()?;

    let data = values
        .iter()
        .map(|a| values.iter().map(|b| pearson(a, b)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        data,
    })
}

/// Two-level hierarchy: one root per category holding its groups as leaves.
/// Leaf ids are `category/group`.
pub fn hierarchy(pairs: &[StackedValue]) -> Vec<TreeNode> {
    let mut roots: Vec<TreeNode> = Vec::new();
    let mut leaves: Vec<TreeNode> = Vec::new();

    for pair in pairs {
        match roots.iter_mut().find(|r| r.id == pair.category) {
            Some(root) => root.value += pair.value,
            None => roots.push(TreeNode {
                id: pair.category.clone(),
                parent: None,
                label: pair.category.clone(),
                value: pair.value,
            }),
        }
        leaves.push(TreeNode {
            id: format!("{}/{}", pair.category, pair.group),
            parent: Some(pair.category.clone()),
            label: pair.group.clone(),
            value: pair.value,
        });
    }

    roots.extend(leaves);
    roots
}

/// Flat hierarchy: every label is a root.
pub fn flat_hierarchy(values: &[LabelValue]) -> Vec<TreeNode> {
    values
        .iter()
        .map(|v| TreeNode {
            id: v.label.clone(),
            parent: None,
            label: v.label.clone(),
            value: v.value,
        })
        .collect()
}
