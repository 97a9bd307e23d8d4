//! Dashboard settings.
//!
//! Settings live in `<config_dir>/ecommerce-eda/config.json`. A missing file
//! means defaults; a malformed file is an error rather than silently ignored.

use crate::error::{EdaError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a rendered page is written out.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text summary for the terminal
    #[default]
    Text,
    /// The full report as JSON, chart data included
    Json,
    /// A standalone page embedding every chart as Vega-Lite
    Html,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    /// Number of equal-width bins in the price histogram
    pub histogram_bins: usize,
    /// How many products/customers the ranking charts keep
    pub top_n: usize,
    /// Rows shown in the raw and prepared dataset previews (0 shows every row)
    pub preview_rows: usize,
    pub output_format: OutputFormat,
    /// Inner radius of the donut chart as a fraction of the outer radius
    pub donut_hole: f64,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            histogram_bins: 30,
            top_n: 10,
            preview_rows: 10,
            output_format: OutputFormat::Text,
            donut_hole: 0.4,
            chart_width: 640,
            chart_height: 360,
        }
    }
}

impl DashboardSettings {
    /// Reject values no chart can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(EdaError::Config(
                "histogram_bins must be at least 1".to_owned(),
            ));
        }
        if self.top_n == 0 {
            return Err(EdaError::Config("top_n must be at least 1".to_owned()));
        }
        if !(0.0..1.0).contains(&self.donut_hole) {
            return Err(EdaError::Config(format!(
                "donut_hole must be in [0, 1), got {}",
                self.donut_hole
            )));
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| EdaError::Config("Failed to determine config directory".to_owned()))?;
    Ok(base.join("ecommerce-eda").join("config.json"))
}

/// Load settings from `path`, falling back to defaults when the file does not exist.
/// Values are not validated here; command-line overrides may still replace them.
pub fn load_settings_from(path: &Path) -> Result<DashboardSettings> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(DashboardSettings::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let settings: DashboardSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings_to(settings: &DashboardSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let s = DashboardSettings::default();
        assert_eq!(s.histogram_bins, 30);
        assert_eq!(s.top_n, 10);
        assert!((s.donut_hole - 0.4).abs() < f64::EPSILON);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("ecommerce_eda_no_such_config.json");
        let _ = std::fs::remove_file(&path);
        assert_eq!(load_settings_from(&path)?, DashboardSettings::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("ecommerce_eda_partial_config.json");
        std::fs::write(&path, r#"{ "top_n": 5, "output_format": "html" }"#)?;
        let s = load_settings_from(&path)?;
        let _ = std::fs::remove_file(&path);
        assert_eq!(s.top_n, 5);
        assert_eq!(s.output_format, OutputFormat::Html);
        assert_eq!(s.histogram_bins, 30);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_error() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("ecommerce_eda_bad_config.json");
        std::fs::write(&path, "{ not json")?;
        let result = load_settings_from(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(EdaError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_load_leaves_validation_to_caller() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "histogram_bins": 0 }"#)?;

        let s = load_settings_from(&path)?;
        assert_eq!(s.histogram_bins, 0);
        assert!(s.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_zero_bins_rejected() {
        let s = DashboardSettings {
            histogram_bins: 0,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let path = std::env::temp_dir()
            .join("ecommerce_eda_cfg_test")
            .join("config.json");
        let s = DashboardSettings {
            preview_rows: 3,
            ..Default::default()
        };
        save_settings_to(&s, &path)?;
        let loaded = load_settings_from(&path)?;
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, s);
        Ok(())
    }
}
