//! # Ecommerce EDA Entry Point
//!
//! Command-line host for the dashboard. Each invocation is one render pass:
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Initialise logging (console, plus rolling files unless --no-log-file)
//!   └─> Run the subcommand
//!         ├─> render: upload → load → derive → gated steps → write page
//!         └─> config: show or initialise the settings file
//! ```
//!
//! ```bash
//! ecommerce-eda render orders.csv --format html --output dashboard.html
//! ecommerce-eda render            # no file: prints the upload advisory
//! ecommerce-eda config --init
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // The rendered page goes to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    ecommerce_eda::logging::init(!cli.no_log_file)?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Starting");

    cli::run_command(cli.command)
}
