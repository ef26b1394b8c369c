//! CompanyScout CLI: research a company from its name.
//!
//! Resolves the company website through a search API, reads the site, asks
//! an LLM for pricing and market details, and stores the result locally.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
