//! Text summaries shown before the charts: shape, schema, null counts,
//! duplicate rows and a preview of the first rows.

use super::types::{ColumnInfo, ColumnKind, Dataset, DatasetOverview, TablePreview};
use crate::error::Result;
use crate::utils::fmt_bytes;
use polars::prelude::*;
use std::fmt::Write as _;

const NULL_CELL: &str = "—";

pub fn build_overview(ds: &Dataset, preview_rows: usize) -> Result<DatasetOverview> {
    let rows = ds.height();
    let schema = ds
        .frame
        .get_columns()
        .iter()
        .map(|c| {
            let nulls = c.null_count();
            ColumnInfo {
                name: c.name().to_string(),
                dtype: c.dtype().to_string(),
                kind: ColumnKind::of(c.dtype()),
                non_null: rows - nulls,
                nulls,
            }
        })
        .collect();

    Ok(DatasetOverview {
        file_name: ds.name.clone(),
        rows,
        columns: ds.width(),
        schema,
        duplicate_rows: count_duplicate_rows(&ds.frame)?,
        memory_bytes: ds.frame.estimated_size(),
        preview: preview(&ds.frame, preview_rows)?,
    })
}

/// Every column cast to strings, nulls as `None`. Row-major access goes
/// through these.
fn string_columns(frame: &DataFrame) -> Result<Vec<Vec<Option<String>>>> {
    frame
        .get_columns()
        .iter()
        .map(|c| {
            let s = c.as_materialized_series().cast(&DataType::String)?;
            let ca = s.str()?;
            Ok(ca.into_iter().map(|v| v.map(str::to_owned)).collect())
        })
        .collect()
}

/// Rows that repeat an earlier row exactly, across all columns. The first
/// occurrence of each row is not counted.
pub fn count_duplicate_rows(frame: &DataFrame) -> Result<usize> {
    let distinct = frame
        .clone()
        .lazy()
        .unique(None, UniqueKeepStrategy::First)
        .collect()?
        .height();
    Ok(frame.height() - distinct)
}

/// The first `limit` rows formatted for display; `limit == 0` keeps every row.
pub fn preview(frame: &DataFrame, limit: usize) -> Result<TablePreview> {
    let total_rows = frame.height();
    let take = if limit == 0 {
        total_rows
    } else {
        limit.min(total_rows)
    };
    let head = frame.head(Some(take));
    let columns = string_columns(&head)?;

    let rows = (0..head.height())
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    col.get(row)
                        .and_then(Clone::clone)
                        .unwrap_or_else(|| NULL_CELL.to_owned())
                })
                .collect()
        })
        .collect();

    Ok(TablePreview {
        columns: frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect(),
        rows,
        total_rows,
    })
}

/// A `df.info()`-style description of the table.
pub fn schema_summary(overview: &DatasetOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset: {}", overview.file_name);
    let _ = writeln!(
        out,
        "{} entries, {} columns",
        overview.rows, overview.columns
    );

    let name_width = overview
        .schema
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let _ = writeln!(
        out,
        " {:>3}  {:<name_width$}  {:>14}  {}",
        "#", "Column", "Non-Null Count", "Dtype"
    );
    for (i, col) in overview.schema.iter().enumerate() {
        let _ = writeln!(
            out,
            " {:>3}  {:<name_width$}  {:>14}  {}",
            i,
            col.name,
            format!("{} non-null", col.non_null),
            col.dtype
        );
    }

    let mut dtype_counts: Vec<(String, usize)> = Vec::new();
    for col in &overview.schema {
        match dtype_counts.iter_mut().find(|(d, _)| *d == col.dtype) {
            Some((_, n)) => *n += 1,
            None => dtype_counts.push((col.dtype.clone(), 1)),
        }
    }
    let dtypes = dtype_counts
        .iter()
        .map(|(d, n)| format!("{d}({n})"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "dtypes: {dtypes}");
    let _ = write!(out, "memory usage: {}", fmt_bytes(overview.memory_bytes as u64));
    out
}
