//! studioboard - Retainer capacity reports for studio time tracking

mod cli;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use cli::{parse_date_arg, parse_month_arg, Bound};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studioboard_core::{DataStore, StudioSettings};
use studioboard_types::{Client, DateRange, MonthKey};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "studioboard",
    version,
    about = "Retainer capacity reports for studio time tracking",
    long_about = "Splits logged hours into monthly allowance and rollover per client.\n\
                  \n\
                  Reads clients.json and time-entries.json from the data directory and\n\
                  recomputes every report from scratch.\n\
                  \n\
                  Examples:\n\
                    studioboard clients                            # List clients and retainer terms\n\
                    studioboard allocate acme --from 2025-01       # Per-day split since January\n\
                    studioboard summary acme                       # Month totals and remaining capacity\n\
                    studioboard forecast acme --month 2025-03      # Will March fill up?\n\
                    studioboard export acme --format csv -o acme.csv\n\
                  \n\
                  Environment Variables:\n\
                    STUDIOBOARD_DATA_DIR             # Directory with the JSON exports\n\
                    STUDIOBOARD_FORMAT               # Force output format: json|table\n\
                    STUDIOBOARD_NO_COLOR             # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Directory holding clients.json and time-entries.json
    #[arg(long, env = "STUDIOBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file (default: <config dir>/studioboard/settings.toml)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, env = "STUDIOBOARD_FORMAT", value_parser = ["json", "table"])]
    format: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "STUDIOBOARD_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// List clients and their retainer terms
    Clients {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the per-day monthly/rollover split for a client
    Allocate {
        /// Client id
        client: String,
        /// Period start: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        from: Option<String>,
        /// Period end: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show month totals and remaining capacity for a client
    Summary {
        /// Client id
        client: String,
        /// Period start: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        from: Option<String>,
        /// Period end: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Project whether a month will use its allowance
    Forecast {
        /// Client id
        client: String,
        /// Month to forecast: YYYY-MM (default: month of --as-of)
        #[arg(long)]
        month: Option<String>,
        /// Reference date: YYYY-MM-DD (default: today)
        #[arg(long)]
        as_of: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a client report to a file
    Export {
        /// Client id
        client: String,
        /// Export format
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Period start: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        from: Option<String>,
        /// Period end: YYYY-MM-DD or YYYY-MM
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Per-day split
    Csv,
    /// Full report
    Json,
    /// Month summary table
    Md,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.no_color);

    let settings_path = cli.settings.clone().or_else(StudioSettings::default_path);
    let settings = match &settings_path {
        Some(path) => StudioSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => StudioSettings::default(),
    };

    let data_dir = cli
        .data_dir
        .or_else(|| settings.data_dir.clone())
        .or_else(|| dirs::data_dir().map(|d| d.join("studioboard")))
        .context("Could not determine data directory")?;

    let force_json = cli.format.as_deref() == Some("json");
    let no_color = cli.no_color;
    let today = Local::now().date_naive();

    let store = load_store(&data_dir, &settings).await?;

    match cli.mode {
        Mode::Clients { json } => {
            let clients = store.clients();
            println!(
                "{}",
                cli::format_client_table(&clients, json || force_json, no_color)
            );
        }
        Mode::Allocate {
            client,
            from,
            to,
            json,
        } => {
            let (client, range) = client_and_range(&store, &client, from, to, today)?;
            let report = store.report(&client.id, range, today)?;
            println!(
                "{}",
                cli::format_daily_table(&report, json || force_json, no_color)
            );
        }
        Mode::Summary {
            client,
            from,
            to,
            json,
        } => {
            let (client, range) = client_and_range(&store, &client, from, to, today)?;
            let report = store.report(&client.id, range, today)?;
            println!(
                "{}",
                cli::format_month_table(&report, json || force_json, no_color)
            );
        }
        Mode::Forecast {
            client,
            month,
            as_of,
            json,
        } => {
            run_forecast(&store, &settings, &client, month, as_of, json || force_json, today)?;
        }
        Mode::Export {
            client,
            format,
            output,
            from,
            to,
        } => {
            let (client, range) = client_and_range(&store, &client, from, to, today)?;
            let report = store.report(&client.id, range, today)?;
            match format {
                ExportFormat::Csv => {
                    studioboard_core::export_daily_splits_to_csv(&report, &output)?
                }
                ExportFormat::Json => studioboard_core::export_report_to_json(&report, &output)?,
                ExportFormat::Md => studioboard_core::export_months_to_markdown(&report, &output)?,
            }
            println!("Exported {} to {}", client.name, output.display());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for JSON and tables
fn init_tracing(no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

async fn load_store(data_dir: &Path, settings: &StudioSettings) -> Result<DataStore> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    spinner.set_message(format!("Loading {}...", data_dir.display()));
    let store = DataStore::new(data_dir.to_path_buf(), settings.rollover_scope);
    let report = store.initial_load().await;

    if report.has_fatal_errors() {
        spinner.finish_and_clear();
        eprintln!("Fatal errors during data load:");
        for error in report.errors.iter() {
            eprintln!("  - {}: {}", error.source, error.message);
            if let Some(suggestion) = &error.suggestion {
                eprintln!("    {}", suggestion);
            }
        }
        anyhow::bail!("No usable data in {}", data_dir.display());
    }

    spinner.finish_and_clear();

    for warning in report.warnings() {
        eprintln!("warning: {}: {}", warning.source, warning.message);
    }

    let (warnings, errors, _) = report.error_count();
    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        clients = report.clients_loaded,
        entries = report.entries_loaded,
        warnings,
        errors,
        "Data loaded"
    );

    Ok(store)
}

fn client_and_range(
    store: &DataStore,
    client_id: &str,
    from: Option<String>,
    to: Option<String>,
    today: NaiveDate,
) -> Result<(Arc<Client>, DateRange)> {
    let client = store
        .client(client_id)
        .with_context(|| format!("Unknown client '{}'", client_id))?;

    let fallback = cli::default_range(&client, store.logged_range(client_id), today);
    let range = cli::resolve_range(from.as_deref(), to.as_deref(), fallback)?;

    Ok((client, range))
}

fn run_forecast(
    store: &DataStore,
    settings: &StudioSettings,
    client_id: &str,
    month: Option<String>,
    as_of: Option<String>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    let client = store
        .client(client_id)
        .with_context(|| format!("Unknown client '{}'", client_id))?;

    let as_of = match as_of {
        Some(s) => parse_date_arg(&s, Bound::End)?,
        None => today,
    };
    let month = match month {
        Some(m) => parse_month_arg(&m)?,
        None => MonthKey::of(as_of),
    };

    let forecast = store.forecast(client_id, month, as_of, &settings.forecast)?;
    println!("{}", cli::format_forecast(&client, &forecast, json));

    Ok(())
}
