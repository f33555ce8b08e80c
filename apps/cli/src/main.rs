//! VenueScout CLI: academic venue discovery for a research domain.
//!
//! Combines a conference directory, a venue catalog and language-model
//! fallbacks into one deduplicated, enriched list.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
