//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use venuescout_core::{Aggregator, DiscoveryReport, ProgressReporter};
use venuescout_shared::{
    AppConfig, VenueRecord, config_file_path, init_config, load_config, resolve_api_key,
};

/// Widest the name column is allowed to get in table output.
const NAME_WIDTH: usize = 56;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// VenueScout: find conferences and journals for a research domain.
#[derive(Parser)]
#[command(
    name = "venuescout",
    version,
    about = "Discover academic venues for a research domain.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover venues for a research domain.
    Discover {
        /// Research domain, e.g. "robotics" or "quantum computing".
        domain: String,

        /// Output format.
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Skip the language model even if an API key is configured.
        #[arg(long)]
        no_llm: bool,

        /// Override the number of directory pages fetched.
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "venuescout=info",
        1 => "venuescout=debug",
        _ => "venuescout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so JSON results on stdout stay parseable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Discover {
            domain,
            format,
            no_llm,
            max_pages,
        } => cmd_discover(&domain, format, no_llm, max_pages).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_discover(
    domain: &str,
    format: OutputFormat,
    no_llm: bool,
    max_pages: Option<u32>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(pages) = max_pages {
        config.primary.max_pages = pages;
    }

    let aggregator = if no_llm {
        Aggregator::with_model(&config, None)?
    } else {
        Aggregator::from_config(&config)?
    };

    info!(domain, no_llm, "discovering venues");

    let reporter = CliProgress::new();
    let report = aggregator.discover_with_report(domain, &reporter).await;
    reporter.finish();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_response(&report.records))?);
        }
        OutputFormat::Table => {
            println!();
            print!("{}", render_table(&report.records));
            print_summary(&report);
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;

    println!("# {}", config_file_path()?.display());
    println!("{toml_str}");

    let key_state = if resolve_api_key(&config.llm).is_some() {
        "set"
    } else {
        "not set (generation and enrichment disabled)"
    };
    println!("# ${}: {key_state}", config.llm.api_key_env);
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Response envelope for `--format json`.
fn json_response(records: &[VenueRecord]) -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "count": records.len(),
        "data": records,
    })
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Render records as an aligned, plain-text table.
fn render_table(records: &[VenueRecord]) -> String {
    const HEADERS: [&str; 7] = ["ACRONYM", "NAME", "DATES", "LOCATION", "DEADLINE", "IMPACT", "INDEX"];

    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|r| {
            [
                r.acronym.clone(),
                truncate(&r.name, NAME_WIDTH),
                r.dates.to_string(),
                r.location.to_string(),
                r.deadline.to_string(),
                r.impact_factor.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into()),
                r.index.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ");
        format!("  {}\n", line.trim_end())
    };

    let mut out = format_row(HEADERS.map(String::from).as_slice());
    for row in &rows {
        out.push_str(&format_row(row.as_slice()));
    }
    out
}

fn print_summary(report: &DiscoveryReport) {
    let counts = &report.counts;
    println!();
    println!("  Venues:    {}", report.records.len());
    println!(
        "  Sources:   {} directory, {} catalog, {} generated, {} static",
        counts.primary, counts.secondary, counts.generated, counts.static_added
    );
    for degradation in &report.degradations {
        println!("  Degraded:  {degradation}");
    }
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
    phase: std::sync::Mutex<String>,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            phase: std::sync::Mutex::new(String::new()),
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = name.to_string();
        }
        self.spinner.set_message(name.to_string());
    }

    fn records(&self, count: usize) {
        let phase = self.phase.lock().map(|p| p.clone()).unwrap_or_default();
        self.spinner.set_message(format!("{phase} ({count} venues so far)"));
    }
}
