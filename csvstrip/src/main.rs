// csvstrip/src/main.rs
//! csvstrip entry point.

use anyhow::Result;
use clap::Parser;
use log::info;

use csvstrip::cli::{Cli, Commands};
use csvstrip::commands::{strip::run_strip, unescape::run_unescape};
use csvstrip::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    logger::init_logger(logger::level_for(args.quiet, args.debug));
    info!("csvstrip started. Version: {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Strip(cmd) => run_strip(cmd, args.quiet).await,
        Commands::Unescape(cmd) => run_unescape(cmd),
    }
}
