//! Upload lifecycle.
//!
//! A session holds at most one uploaded file. Every render re-runs the whole
//! pipeline from the file on disk, so replacing the upload can never leak
//! derived state from the previous one.

use super::derive::{derive_columns, derive_discount_columns};
use super::io::{UploadFormat, load_dataset};
use super::overview::{build_overview, preview};
use super::steps::run_steps;
use super::types::{Page, Report};
use crate::config::DashboardSettings;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub settings: DashboardSettings,
    upload: Option<PathBuf>,
}

impl Session {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            settings,
            upload: None,
        }
    }

    /// Replace the current upload. Only the extension is checked here; the
    /// content is read on the next render.
    pub fn upload(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        UploadFormat::from_path(&path)?;
        tracing::info!(file = %path.display(), "File uploaded");
        self.upload = Some(path);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.upload = None;
    }

    pub fn current_upload(&self) -> Option<&Path> {
        self.upload.as_deref()
    }

    /// One render pass. Without an upload this is the standing advisory.
    ///
    /// # Errors
    ///
    /// Load failures are returned as-is. Failures inside individual chart
    /// steps are reported as warnings on the page instead.
    pub fn render(&self) -> Result<Page> {
        match &self.upload {
            None => Ok(Page::advisory()),
            Some(path) => Ok(Page::Report(Box::new(prepare_report(path, &self.settings)?))),
        }
    }
}

/// Load, summarise, derive and chart one file.
pub fn prepare_report(path: &Path, settings: &DashboardSettings) -> Result<Report> {
    let start = Instant::now();

    let mut ds = load_dataset(path)?;
    // Overview describes the file as uploaded, before any derived columns
    let overview = build_overview(&ds, settings.preview_rows)?;
    let mut derived_columns = derive_columns(&mut ds)?;
    let prepared_preview = preview(&ds.frame, settings.preview_rows)?;
    // Binning helpers feed the discount chart only and stay out of the cleaned table
    derived_columns.extend(derive_discount_columns(&mut ds)?);

    let run = run_steps(&ds, settings);

    let report = Report {
        overview,
        derived_columns,
        prepared_preview,
        charts: run.charts,
        skipped: run.skipped,
        warnings: run.warnings,
        duration: start.elapsed(),
    };

    tracing::info!(
        file = %ds.name,
        charts = report.charts.len(),
        skipped = report.skipped.len(),
        warnings = report.warnings.len(),
        elapsed_ms = report.duration.as_millis() as u64,
        "Render pass complete"
    );
    Ok(report)
}
