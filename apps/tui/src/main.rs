//! CompanyScout TUI: interactive terminal front end for company research.
//!
//! One tab takes a company name and runs the research pipeline; the other
//! browses stored results. Built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod session;
mod widgets;

use std::fs::OpenOptions;
use std::sync::Mutex;

use color_eyre::eyre::Result;
use companyscout_shared::{ResearchError, config_dir};

/// Log file name inside the config directory.
const LOG_FILE_NAME: &str = "tui.log";

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_file_logging()?;

    let session = session::Session::start()?;
    app::run(session)
}

/// Route tracing output to `~/.companyscout/tui.log` so it never draws over the UI.
fn init_file_logging() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ResearchError::io(&dir, e))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| ResearchError::io(&path, e))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("companyscout=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
