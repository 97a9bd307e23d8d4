use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use ecommerce_eda::config::{
    DashboardSettings, OutputFormat, get_config_path, load_settings_from, save_settings_to,
};
use ecommerce_eda::dashboard::Session;
use ecommerce_eda::writer::render_page;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ecommerce-eda",
    version,
    about = "Exploratory analysis dashboard for ecommerce order data"
)]
pub struct Cli {
    /// Log to the console only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one render pass over an uploaded file and write the page
    Render {
        /// Dataset to analyse (.csv, .xlsx or .xls). Without it the upload advisory is shown.
        file: Option<PathBuf>,

        /// Output format. Defaults to the configured format.
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings file. Defaults to the per-user config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of bins in the price histogram
        #[arg(long)]
        bins: Option<usize>,

        /// How many products/customers the ranking charts keep
        #[arg(long)]
        top_n: Option<usize>,

        /// Rows shown in the dataset previews (0 shows every row)
        #[arg(long)]
        preview_rows: Option<usize>,
    },
    /// Show the active settings, or write the defaults with --init
    Config {
        /// Write default settings if no settings file exists yet
        #[arg(long)]
        init: bool,

        /// Settings file. Defaults to the per-user config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            file,
            format,
            output,
            config,
            bins,
            top_n,
            preview_rows,
        } => {
            let overrides = Overrides {
                format,
                bins,
                top_n,
                preview_rows,
            };
            handle_render(file, output, config, &overrides)
        }
        Commands::Config { init, config } => handle_config(init, config),
    }
}

/// Command-line values that take precedence over the settings file.
struct Overrides {
    format: Option<OutputFormat>,
    bins: Option<usize>,
    top_n: Option<usize>,
    preview_rows: Option<usize>,
}

impl Overrides {
    fn apply(&self, settings: &mut DashboardSettings) {
        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if let Some(bins) = self.bins {
            settings.histogram_bins = bins;
        }
        if let Some(top_n) = self.top_n {
            settings.top_n = top_n;
        }
        if let Some(rows) = self.preview_rows {
            settings.preview_rows = rows;
        }
    }
}

fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(get_config_path()?),
    }
}

/// Settings file values with command-line overrides on top. Validation runs
/// on the combined result.
fn resolve_settings(config: Option<PathBuf>, overrides: &Overrides) -> Result<DashboardSettings> {
    let path = config_path(config)?;
    let mut settings = load_settings_from(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    overrides.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn handle_render(
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    overrides: &Overrides,
) -> Result<()> {
    let settings = resolve_settings(config, overrides)?;

    let format = settings.output_format;
    let mut session = Session::new(settings);
    if let Some(file) = file {
        session.upload(file)?;
    }

    let page = session.render()?;
    let rendered = render_page(&page, format, &session.settings)?;

    match output {
        Some(out) => {
            std::fs::write(&out, rendered)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), format = format.as_str(), "Page written");
            println!("Wrote {} page to {}", format.as_str(), out.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn handle_config(init: bool, config: Option<PathBuf>) -> Result<()> {
    let path = config_path(config)?;

    if init {
        if path.exists() {
            println!("Settings already exist at {}", path.display());
        } else {
            save_settings_to(&DashboardSettings::default(), &path)?;
            println!("Wrote default settings to {}", path.display());
        }
        return Ok(());
    }

    let settings = load_settings_from(&path)?;
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_flags_override_settings() -> Result<()> {
        let cli = Cli::try_parse_from([
            "ecommerce-eda",
            "render",
            "orders.csv",
            "--format",
            "html",
            "--top-n",
            "5",
        ])?;
        let Commands::Render {
            file,
            format,
            top_n,
            bins,
            ..
        } = cli.command
        else {
            anyhow::bail!("expected render");
        };
        assert_eq!(file, Some(PathBuf::from("orders.csv")));

        let mut settings = DashboardSettings::default();
        Overrides {
            format,
            bins,
            top_n,
            preview_rows: None,
        }
        .apply(&mut settings);
        assert_eq!(settings.output_format, OutputFormat::Html);
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.histogram_bins, 30);
        Ok(())
    }

    #[test]
    fn test_flag_repairs_invalid_settings_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "histogram_bins": 0 }"#)?;

        let fixed = Overrides {
            format: None,
            bins: Some(30),
            top_n: None,
            preview_rows: None,
        };
        let settings = resolve_settings(Some(path.clone()), &fixed)?;
        assert_eq!(settings.histogram_bins, 30);

        let untouched = Overrides {
            bins: None,
            ..fixed
        };
        assert!(resolve_settings(Some(path), &untouched).is_err());
        Ok(())
    }

    #[test]
    fn test_render_without_file() -> Result<()> {
        let cli = Cli::try_parse_from(["ecommerce-eda", "--no-log-file", "render"])?;
        assert!(cli.no_log_file);
        assert!(matches!(cli.command, Commands::Render { file: None, .. }));
        Ok(())
    }
}
