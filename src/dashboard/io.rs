//! Ingestion of uploaded files.
//!
//! Accepts `.csv`, `.xlsx` and `.xls`. Any failure here is a load error: the
//! upload is rejected as a whole and nothing downstream runs.

use super::types::Dataset;
use crate::error::{EdaError, Result};
use calamine::{Data, DataType as _, Reader as _, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Excel,
}

impl UploadFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Excel),
            _ => Err(EdaError::UnsupportedFormat(ext)),
        }
    }
}

/// Load an uploaded file into a [`Dataset`] named after the file.
///
/// # Errors
///
/// `UnsupportedFormat` for other extensions, `Load` for unreadable or
/// malformed content (including invalid UTF-8 in a CSV).
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let format = UploadFormat::from_path(path)?;
    if !path.is_file() {
        return Err(EdaError::Load(format!("{} is not a readable file", path.display())));
    }

    let frame = match format {
        UploadFormat::Csv => read_csv(path)?,
        UploadFormat::Excel => read_excel(path)?,
    };

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_owned();

    tracing::info!(
        file = %name,
        rows = frame.height(),
        columns = frame.width(),
        "Loaded dataset"
    );
    Ok(Dataset::new(name, frame))
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10_000))
        .with_has_header(true)
        .finish()
        .and_then(LazyFrame::collect)
        .map_err(|e| EdaError::Load(format!("{}: {e}", path.display())))
}

fn read_excel(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EdaError::Load(format!("{} has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| EdaError::Load(format!("{} has an empty first sheet", path.display())))?;
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i + 1),
            other => other.to_string().trim().to_owned(),
        })
        .collect();

    let body: Vec<&[Data]> = rows.collect();
    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            Column::from(excel_column(name, &cells))
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns).map_err(|e| EdaError::Load(format!("{}: {e}", path.display())))
}

/// Pick the narrowest type that holds every non-empty cell. Workbooks store
/// every number as a float, so whole-valued floats count as integers.
pub(crate) fn excel_column(name: &str, cells: &[&Data]) -> Series {
    let non_empty = || cells.iter().filter(|c| !matches!(c, Data::Empty));

    if non_empty().all(|c| is_whole_number(c)) {
        let values: Vec<Option<i64>> = cells.iter().map(|c| c.as_i64()).collect();
        return Series::new(name.into(), values);
    }
    if non_empty().all(|c| matches!(c, Data::Int(_) | Data::Float(_))) {
        let values: Vec<Option<f64>> = cells.iter().map(|c| c.as_f64()).collect();
        return Series::new(name.into(), values);
    }
    if non_empty().all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells.iter().map(|c| c.get_bool()).collect();
        return Series::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells.iter().map(|c| excel_cell_text(c)).collect();
    Series::new(name.into(), values)
}

fn is_whole_number(cell: &Data) -> bool {
    match cell {
        Data::Int(_) => true,
        Data::Float(f) => f.fract() == 0.0 && f.abs() < 9.0e15,
        _ => false,
    }
}

fn excel_cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
