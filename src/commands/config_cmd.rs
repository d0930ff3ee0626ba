use clap::{Args, Subcommand};
use std::io::{self, Write};

use crate::db::{EntryRepository, SettingsRepository};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Set the team stamped onto new entries
    Team {
        /// Team name
        name: String,
    },

    /// Set the default crate tare weight in kilograms
    CrateWeight {
        /// Tare of one empty crate
        weight: f64,
    },

    /// Show the current settings
    Show,

    /// Wipe every entry and all settings. Irreversible.
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ConfigCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        settings_repo: &SettingsRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Team { name } => {
                if name.trim().is_empty() {
                    return Err("Team name cannot be empty".into());
                }
                let mut settings = settings_repo.get().await?;
                settings.team_name = name.trim().to_string();
                settings_repo.save(&settings).await?;
                println!("Team: {}", settings.team_name);
                Ok(())
            }

            ConfigSubcommand::CrateWeight { weight } => {
                if !weight.is_finite() || *weight <= 0.0 {
                    return Err("Crate weight must be a positive number".into());
                }
                let mut settings = settings_repo.get().await?;
                settings.crate_weight = *weight;
                settings_repo.save(&settings).await?;
                println!("Default crate weight: {:.2} kg", weight);
                Ok(())
            }

            ConfigSubcommand::Show => {
                let settings = settings_repo.get().await?;
                let count = entries.count().await?;

                println!("Active tank:          {}", settings.active_tank);
                println!("Count:                {}", settings.shrimp_count);
                println!("Team:                 {}", settings.team_name);
                println!("Default crate weight: {:.2} kg", settings.crate_weight);
                println!("Recorded entries:     {}", count);
                Ok(())
            }

            ConfigSubcommand::Reset { force } => {
                let count = entries.count().await?;

                if !force {
                    print!(
                        "This permanently deletes {} entr(ies) and all settings. Continue? [y/N] ",
                        count
                    );
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Reset cancelled.");
                        return Ok(());
                    }
                }

                entries.clear_all().await?;
                settings_repo.clear().await?;
                println!("All data cleared.");
                Ok(())
            }
        }
    }
}
