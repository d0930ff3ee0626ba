//! Bridge commands: push unsynced entries out, pull remote entries in.

use clap::{Args, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::db::EntryRepository;
use crate::sync::{BridgeClient, BridgeError};

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Push entries not yet on the bridge
    Push,

    /// Pull the remote table and upsert locally
    Pull,

    /// Show bridge configuration and pending work
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SyncSubcommand::Push => {
                let client = client_from(config)?;
                let unsynced = entries.get_unsynced().await?;

                if unsynced.is_empty() {
                    println!("Nothing to push.");
                    return Ok(());
                }

                // Ids are flipped only after the endpoint acknowledges the
                // write; a failed push leaves every entry unsynced.
                client.push(&unsynced).await?;

                let ids: Vec<String> = unsynced.iter().map(|e| e.id.clone()).collect();
                entries.mark_synced(&ids).await?;

                info!(count = ids.len(), "entries pushed and marked synced");
                println!("Pushed {} entr(ies).", ids.len());
                Ok(())
            }

            SyncSubcommand::Pull => {
                let client = client_from(config)?;
                let pulled = client.pull().await?;

                if pulled.is_empty() {
                    println!("Remote table is empty.");
                    return Ok(());
                }

                for entry in &pulled {
                    entries.put(entry).await?;
                }

                info!(count = pulled.len(), "entries pulled from bridge");
                println!("Pulled {} entr(ies).", pulled.len());
                Ok(())
            }

            SyncSubcommand::Status => {
                println!("Bridge Configuration");
                println!("====================");
                println!();

                if !config.bridge.is_configured() {
                    println!("Status: Not configured");
                    println!();
                    println!("To enable the bridge, add to your config file:");
                    println!();
                    println!("  bridge:");
                    println!("    endpoint_url: \"https://example.com/your-sheet-endpoint\"");
                    println!();
                    println!("Or set the HARVESTLOG_BRIDGE_URL environment variable.");
                    return Ok(());
                }

                let client = client_from(config)?;
                let unsynced = entries.get_unsynced().await?;
                let total = entries.count().await?;

                println!("Endpoint: {}", client.endpoint_url());
                println!("Entries:  {} total, {} pending push", total, unsynced.len());
                Ok(())
            }
        }
    }
}

fn client_from(config: &Config) -> Result<BridgeClient, BridgeError> {
    match &config.bridge.endpoint_url {
        Some(url) => Ok(BridgeClient::new(url.clone())),
        None => Err(BridgeError::NotConfigured),
    }
}
