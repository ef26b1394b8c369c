//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use companyscout_core::{ProgressReporter, Researcher, load_history};
use companyscout_shared::{
    AppConfig, ExtractionOutcome, PipelineConfig, Stage, database_path, init_config, load_config,
    pretty_analysis,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// CompanyScout: research companies from their names.
#[derive(Parser)]
#[command(
    name = "companyscout",
    version,
    about = "Look up a company, read its website, and extract pricing and market details.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Database file (overrides `[storage] database_path`).
    #[arg(long, global = true, env = "COMPANYSCOUT_DB")]
    pub db: Option<PathBuf>,

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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research one company and store the result.
    Extract {
        /// Company name to search for.
        company: String,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List stored companies, newest first.
    List {
        /// Maximum number of rows to show.
        #[arg(short, long)]
        limit: Option<u32>,
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
        0 => "companyscout=info",
        1 => "companyscout=debug",
        _ => "companyscout=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Extract { company, json } => cmd_extract(&company, json, cli.db).await,
        Command::List { limit } => cmd_list(limit, cli.db).await.map(|()| ExitCode::SUCCESS),
        Command::Config { action } => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn cmd_extract(company: &str, json: bool, db: Option<PathBuf>) -> Result<ExitCode> {
    let config = load_config()?;
    let mut pipeline = PipelineConfig::resolve(&config)?;
    if let Some(path) = db {
        pipeline = pipeline.with_database_path(path);
    }

    info!(company, db = %pipeline.database_path.display(), "extracting company data");

    let researcher = Researcher::from_config(pipeline)?;
    let outcome = if json {
        researcher
            .extract_company_data(company, &companyscout_core::SilentProgress)
            .await
    } else {
        researcher
            .extract_company_data(company, &CliProgress::new())
            .await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcome(outcome: &ExtractionOutcome) {
    match outcome {
        ExtractionOutcome::Success { data, id } => {
            println!();
            println!("  Data extracted successfully!");
            println!("  Company:  {}", data.company_name);
            println!("  Domain:   {}", data.domain);
            println!(
                "  LinkedIn: {}",
                data.linkedin_url.as_deref().unwrap_or("Not found")
            );
            println!("  Row ID:   {id}");
            println!();
            println!("  Analysis:");
            for line in pretty_analysis(&data.analysis).lines() {
                println!("    {line}");
            }
            println!();
        }
        ExtractionOutcome::Failure { stage, error } => {
            match stage {
                Some(stage) => eprintln!("Error ({stage}): {error}"),
                None => eprintln!("Error: {error}"),
            }
        }
    }
}

async fn cmd_list(limit: Option<u32>, db: Option<PathBuf>) -> Result<()> {
    let path = match db {
        Some(path) => path,
        None => database_path(&load_config()?)?,
    };

    info!(db = %path.display(), ?limit, "listing stored companies");

    let history = load_history(&path, limit).await?;
    if history.total == 0 {
        println!("No companies stored yet in {}", path.display());
        return Ok(());
    }

    println!("Previously processed ({} companies)", history.total);
    println!();
    for record in &history.records {
        let when = record
            .stored_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "  #{:<4} {when}  {:<24} {}",
            record.id, record.company_name, record.domain
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: Stage) {
        let message = match stage {
            Stage::Lookup => "Searching for company",
            Stage::Fetch => "Reading website",
            Stage::Summarize => "Analyzing content",
            Stage::Persist => "Saving result",
        };
        self.spinner.set_message(message);
    }

    fn done(&self, _outcome: &ExtractionOutcome) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
