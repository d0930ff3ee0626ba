use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod db;
mod export;
mod models;
mod report;
mod sync;

use commands::{
    ConfigCommand, EntryCommand, ExportCommand, ReportCommand, SyncCommand, TankCommand,
};
use config::Config;
use db::{init_db, EntryRepository, SettingsRepository};

#[derive(Parser)]
#[command(name = "harvestlog")]
#[command(version)]
#[command(about = "Offline-first harvest weighing log and reporting tool", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, list, edit and delete measurements
    Entry(EntryCommand),

    /// Summaries and history
    Report(ReportCommand),

    /// CSV and report exports
    Export(ExportCommand),

    /// Active tank, sizing metric and prices
    Tank(TankCommand),

    /// Team, crate tare, show and reset
    Config(ConfigCommand),

    /// Push to / pull from the spreadsheet bridge
    Sync(SyncCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("If the database is unreachable, restart the application.");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let pool = init_db(config.database_path.clone()).await?;
    let entries = EntryRepository::new(pool.clone());
    let settings = SettingsRepository::new(pool);

    match command {
        Commands::Entry(cmd) => cmd.run(&entries, &settings).await?,
        Commands::Report(cmd) => cmd.run(&entries, &settings).await?,
        Commands::Export(cmd) => cmd.run(&entries, &settings).await?,
        Commands::Tank(cmd) => cmd.run(&settings).await?,
        Commands::Config(cmd) => cmd.run(&entries, &settings).await?,
        Commands::Sync(cmd) => cmd.run(&entries, &config).await?,
    }

    Ok(())
}
