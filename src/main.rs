use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod annotations;
mod chart;
mod error;
mod logging;
mod metrics;
mod models;
mod report;
mod source;

use metrics::WindowPolicy;
use models::Target;
use source::{CsvProvider, EndpointProvider, SeriesProvider, SheetsProvider};

#[derive(Parser)]
#[command(name = "weight-trend")]
#[command(about = "Weight log metrics and chart data from a spreadsheet", long_about = None)]
struct Cli {
    /// Local CSV file with `date,weight` columns; wins over `--url` and `--sheet-id`
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Endpoint returning a JSON array of `{date, weight}`; wins over `--sheet-id`
    #[arg(long, env = "WEIGHT_DATA_URL")]
    url: Option<String>,
    /// Google Sheet to read through the Sheets values API
    #[arg(long, env = "WEIGHT_SHEET_ID")]
    sheet_id: Option<String>,
    #[arg(long, env = "WEIGHT_SHEETS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = source::DEFAULT_RANGE)]
    range: String,
    /// Goal weight in kilograms
    #[arg(long, env = "WEIGHT_TARGET_KG")]
    target_kg: Option<f64>,
    /// How the weekly and monthly windows are selected
    #[arg(long, value_enum, default_value_t = WindowPolicy::Calendar)]
    window: WindowPolicy,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stats panel
    Metrics,
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write the chart configuration as JSON
    Chart {
        #[arg(long, default_value = "chart.json")]
        out: PathBuf,
    },
}

impl Cli {
    fn provider(&self) -> anyhow::Result<Box<dyn SeriesProvider>> {
        if let Some(path) = &self.csv {
            return Ok(Box::new(CsvProvider::new(path.clone())));
        }
        if let Some(url) = &self.url {
            return Ok(Box::new(EndpointProvider::new(url.clone())));
        }
        let sheet_id = self
            .sheet_id
            .clone()
            .context("no data source: set --csv, --url (WEIGHT_DATA_URL) or --sheet-id (WEIGHT_SHEET_ID)")?;
        let api_key = self
            .api_key
            .clone()
            .context("WEIGHT_SHEETS_API_KEY must be set to read a Google Sheet")?;
        Ok(Box::new(SheetsProvider::new(
            sheet_id,
            api_key,
            self.range.clone(),
        )))
    }

    fn target(&self) -> anyhow::Result<Option<Target>> {
        match self.target_kg {
            Some(kilograms) if !kilograms.is_finite() || kilograms <= 0.0 => {
                anyhow::bail!("target weight must be a positive number of kilograms")
            }
            Some(kilograms) => Ok(Some(Target { kilograms })),
            None => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let target = cli.target()?;
    let provider = cli.provider()?;
    let label = provider.describe();

    let series = provider
        .fetch_series()
        .await
        .with_context(|| format!("failed to load weights from {label}"))?;
    tracing::debug!(samples = series.len(), window = ?cli.window, "series loaded");

    let metrics = metrics::compute_metrics(&series, cli.window)
        .context("weight series failed validation")?;
    let annotations = annotations::compute_chart_annotations(&series)
        .context("weight series failed validation")?;

    match cli.command {
        Commands::Metrics => {
            for line in report::stat_lines(&metrics, target) {
                println!("{:<14} {}", line.label, line.value);
            }
        }
        Commands::Report { out } => {
            let report = report::build_report(&label, &series, &metrics, &annotations, target);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Chart { out } => {
            let config = chart::render_chart(&metrics, &annotations, &series, target);
            let json = serde_json::to_string_pretty(&config)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), markers = config.markers.len(), "chart written");
            println!("Chart configuration written to {}.", out.display());
        }
    }

    Ok(())
}
