use anyhow::Result;
use clap::Parser;
use kse_schedule::cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    kse_schedule::init_logger();

    let cli = Cli::parse();
    info!("Starting kse-schedule");
    kse_schedule::run(cli.command()).await
}
