//! # Ecommerce EDA - Exploratory Analysis for Order Data
//!
//! Upload an ecommerce dataset and get a fixed sequence of charts. Each chart
//! is guarded by the columns it needs, so a partial dataset still renders
//! everything it can.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ecommerce_eda::config::DashboardSettings;
//! use ecommerce_eda::dashboard::Session;
//!
//! # fn example() -> ecommerce_eda::error::Result<()> {
//! let mut session = Session::new(DashboardSettings::default());
//! session.upload("orders.csv")?;
//!
//! if let Some(report) = session.render()?.report() {
//!     println!("{}", report.summary());
//!     for chart in &report.charts {
//!         println!("{}: {}", chart.heading, chart.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`dashboard`]: the render pass
//!   - [`dashboard::io`]: `.csv`, `.xlsx` and `.xls` ingestion
//!   - [`dashboard::derive`]: `sales`, date parts and discount buckets
//!   - [`dashboard::steps`]: the table of column-gated analysis steps
//!   - [`dashboard::session`]: upload lifecycle
//! - [`writer`]: text, JSON, HTML and Vega-Lite output
//! - [`config`]: dashboard settings
//! - [`error`]: error types and handling utilities
//! - [`logging`]: `tracing` setup
//! - [`utils`]: number formatting
//!
//! ## Render Pass
//!
//! Nothing is cached between passes. Every render reloads the uploaded file:
//!
//! ```text
//! load ──> overview ──> derive columns ──> prepared preview ──> steps ──> page
//! ```
//!
//! A step whose columns are missing is skipped and recorded; a step that fails
//! becomes a warning on the page and the remaining steps still run.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod utils;
pub mod writer;
