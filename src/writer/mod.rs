//! Page writers.
//!
//! A [`Page`] is rendered by one of the writers below. Each implements
//! [`Writer`], so callers pick an output format without caring how it is
//! produced:
//!
//! - [`TextWriter`]: terminal summary, chart data as aligned tables
//! - [`JsonWriter`]: the page serialised as-is
//! - [`HtmlWriter`]: a standalone page embedding Vega-Lite charts
//! - [`VegaLiteWriter`]: one Vega-Lite spec per chart

use crate::config::{DashboardSettings, OutputFormat};
use crate::dashboard::types::Page;
use crate::error::Result;

pub mod html;
pub mod json;
pub mod text;
pub mod treemap;
pub mod vegalite;

pub use html::HtmlWriter;
pub use json::JsonWriter;
pub use text::TextWriter;
pub use vegalite::VegaLiteWriter;

pub trait Writer {
    /// What `write` produces: a string for page writers, JSON values for
    /// chart-level writers.
    type Output;

    /// Render a page.
    ///
    /// # Errors
    ///
    /// Returns `EdaError::Render` when a chart cannot be expressed in this
    /// format, or a serialisation error.
    fn write(&self, page: &Page) -> Result<Self::Output>;
}

/// Render a page in the requested format.
pub fn render_page(page: &Page, format: OutputFormat, settings: &DashboardSettings) -> Result<String> {
    match format {
        OutputFormat::Text => TextWriter::new().write(page),
        OutputFormat::Json => JsonWriter::pretty().write(page),
        OutputFormat::Html => HtmlWriter::new(settings).write(page),
    }
}
