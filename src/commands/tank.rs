use clap::{Args, Subcommand};

use crate::db::SettingsRepository;
use crate::report::lenient_price;

#[derive(Args)]
pub struct TankCommand {
    #[command(subcommand)]
    pub command: TankSubcommand,
}

#[derive(Subcommand)]
pub enum TankSubcommand {
    /// Switch the active tank
    Use {
        /// Tank name, e.g. "Tank 3"
        name: String,
    },

    /// Set the sizing metric for the active tank
    Count {
        /// Pieces-per-kg grading number
        count: i64,
    },

    /// Set the price-per-net-kg for a tank
    Price {
        /// Tank name
        tank: String,

        /// Price string; parsed leniently when consumed
        price: String,
    },

    /// Show the active tank and per-tank settings
    Show,
}

impl TankCommand {
    pub async fn run(
        &self,
        settings_repo: &SettingsRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TankSubcommand::Use { name } => {
                let mut settings = settings_repo.get().await?;
                settings.switch_tank(name.clone());
                settings_repo.save(&settings).await?;
                println!(
                    "Active tank: {} (count {})",
                    settings.active_tank, settings.shrimp_count
                );
                Ok(())
            }

            TankSubcommand::Count { count } => {
                if *count <= 0 {
                    return Err("Count must be a positive number".into());
                }
                let mut settings = settings_repo.get().await?;
                settings.set_shrimp_count(*count);
                settings_repo.save(&settings).await?;
                println!("Count for {}: {}", settings.active_tank, count);
                Ok(())
            }

            TankSubcommand::Price { tank, price } => {
                let mut settings = settings_repo.get().await?;
                settings.tank_prices.insert(tank.clone(), price.clone());
                settings_repo.save(&settings).await?;
                println!(
                    "Price for {}: {} (effective {:.2})",
                    tank,
                    price,
                    lenient_price(price)
                );
                Ok(())
            }

            TankSubcommand::Show => {
                let settings = settings_repo.get().await?;
                println!("Active tank: {}", settings.active_tank);
                println!("Count:       {}", settings.shrimp_count);

                if !settings.tank_counts.is_empty() {
                    println!("\nPer-tank counts:");
                    let mut counts: Vec<_> = settings.tank_counts.iter().collect();
                    counts.sort();
                    for (tank, count) in counts {
                        println!("  {:<10} {}", tank, count);
                    }
                }

                if !settings.tank_prices.is_empty() {
                    println!("\nPer-tank prices:");
                    let mut prices: Vec<_> = settings.tank_prices.iter().collect();
                    prices.sort();
                    for (tank, price) in prices {
                        println!("  {:<10} {} (effective {:.2})", tank, price, lenient_price(price));
                    }
                }
                Ok(())
            }
        }
    }
}
