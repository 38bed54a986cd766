use clap::Parser;
use nba_analytics::cli::Cli;
use nba_analytics::error::Result;

mod main_dispatch;
mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    main_dispatch::run(&cli).await
}
