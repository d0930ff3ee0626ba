use clap::{Args, Subcommand};
use std::io::{self, Write};

use crate::db::{EntryRepository, SettingsRepository};
use crate::models::Entry;
use crate::report::{ids_for_date, log_groups, LogGroup};

#[derive(Args)]
pub struct EntryCommand {
    #[command(subcommand)]
    pub command: EntrySubcommand,
}

#[derive(Subcommand)]
pub enum EntrySubcommand {
    /// Record a new measurement
    Add {
        /// Gross weight in kilograms (must be positive)
        weight: f64,

        /// Tank to attribute the entry to (default: active tank)
        #[arg(long)]
        tank: Option<String>,

        /// Sizing metric (default: current count for the active tank)
        #[arg(long)]
        count: Option<i64>,

        /// Number of crates on the scale: 1 = single, 2 = patlu
        #[arg(long, default_value = "1")]
        crates: i64,

        /// Tare of one crate in kilograms (default: configured crate weight)
        #[arg(long)]
        crate_weight: Option<f64>,

        /// Recording team (default: configured team name)
        #[arg(long)]
        team: Option<String>,
    },

    /// List recorded entries grouped by tank
    List {
        /// Only this tank
        #[arg(long)]
        tank: Option<String>,

        /// Only this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit an entry (full-record overwrite by id)
    Edit {
        /// Entry id
        id: String,

        #[arg(long)]
        tank: Option<String>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        count: Option<i64>,

        #[arg(long)]
        crates: Option<i64>,

        #[arg(long)]
        crate_weight: Option<f64>,

        #[arg(long)]
        team: Option<String>,
    },

    /// Delete one entry
    Delete {
        /// Entry id
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Delete every entry recorded on a date
    DeleteDate {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

/// Gate for the add/edit path: the store itself accepts any shape, so the
/// weight rule has to hold before anything is written.
fn validate_weight(weight: f64) -> Result<(), String> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err("Weight must be a positive number".to_string());
    }
    Ok(())
}

impl EntryCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        settings_repo: &SettingsRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            EntrySubcommand::Add {
                weight,
                tank,
                count,
                crates,
                crate_weight,
                team,
            } => {
                validate_weight(*weight)?;
                if *crates < 1 {
                    return Err("Crate count must be at least 1".into());
                }

                let settings = settings_repo.get().await?;

                let mut entry = Entry::new(
                    tank.clone().unwrap_or_else(|| settings.active_tank.clone()),
                    *weight,
                )
                .with_count(count.unwrap_or(settings.shrimp_count))
                .with_crate_count(*crates)
                .with_team(team.clone().unwrap_or_else(|| settings.team_name.clone()));

                if let Some(cw) = crate_weight {
                    entry = entry.with_crate_weight(*cw);
                }

                entries.put(&entry).await?;
                println!("Recorded entry:");
                println!("  {}", entry);
                println!("  id: {}", entry.id);
                Ok(())
            }

            EntrySubcommand::List { tank, date } => {
                let mut all = entries.get_all().await?;
                if let Some(date) = date {
                    all.retain(|e| &e.date_key() == date);
                }

                let groups = log_groups(&all);
                let groups: Vec<LogGroup> = match tank {
                    Some(t) => groups.into_iter().filter(|g| &g.tank == t).collect(),
                    None => groups,
                };

                if groups.is_empty() {
                    println!("No entries found");
                    return Ok(());
                }

                let settings = settings_repo.get().await?;
                for group in &groups {
                    println!("{}", group.tank);
                    println!("{}", "-".repeat(72));
                    for (serial, entry) in &group.entries {
                        let kind = match entry.crate_count {
                            2 => "P",
                            1 => "S",
                            _ => "-",
                        };
                        println!(
                            "#{:<3} {:>8.2} kg  net {:>8.2} kg  [{}] count {:<4} {}  {}{}",
                            serial,
                            entry.weight,
                            entry.net(settings.crate_weight),
                            kind,
                            entry.count,
                            entry.timestamp.format("%Y-%m-%d %H:%M"),
                            entry.team,
                            if entry.synced { "  (synced)" } else { "" },
                        );
                    }
                    println!();
                }
                Ok(())
            }

            EntrySubcommand::Edit {
                id,
                tank,
                weight,
                count,
                crates,
                crate_weight,
                team,
            } => {
                let all = entries.get_all().await?;
                let mut entry = all
                    .into_iter()
                    .find(|e| &e.id == id)
                    .ok_or_else(|| format!("Entry not found: {}", id))?;

                if let Some(weight) = weight {
                    validate_weight(*weight)?;
                    entry.weight = *weight;
                }
                if let Some(tank) = tank {
                    entry.tank = tank.clone();
                }
                if let Some(count) = count {
                    entry.count = *count;
                }
                if let Some(crates) = crates {
                    if *crates < 1 {
                        return Err("Crate count must be at least 1".into());
                    }
                    entry.crate_count = *crates;
                }
                if let Some(cw) = crate_weight {
                    entry.crate_weight = Some(*cw);
                }
                if let Some(team) = team {
                    entry.team = team.clone();
                }

                // An edited record differs from what the bridge holds, so it
                // has to travel again on the next push.
                entry.synced = false;

                entries.put(&entry).await?;
                println!("Updated entry:");
                println!("  {}", entry);
                Ok(())
            }

            EntrySubcommand::Delete { id, force } => {
                let all = entries.get_all().await?;
                let entry = all
                    .iter()
                    .find(|e| &e.id == id)
                    .ok_or_else(|| format!("Entry not found: {}", id))?;

                if !force {
                    print!(
                        "Delete entry {} ({}, {:.2} kg)? [y/N] ",
                        entry.id, entry.tank, entry.weight
                    );
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                entries.delete_one(id).await?;
                println!("Deleted entry: {}", id);
                Ok(())
            }

            EntrySubcommand::DeleteDate { date, force } => {
                let all = entries.get_all().await?;
                let ids = ids_for_date(&all, date);

                if ids.is_empty() {
                    println!("No entries on {}", date);
                    return Ok(());
                }

                if !force {
                    print!("Delete {} entr(ies) recorded on {}? [y/N] ", ids.len(), date);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                entries.delete_many(&ids).await?;
                println!("Deleted {} entr(ies) from {}", ids.len(), date);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_edit_resets_synced_flag() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        let entries = EntryRepository::new(pool.clone());
        let settings = SettingsRepository::new(pool);

        let entry = Entry::new("Tank 1", 12.0).with_synced(true);
        entries.put(&entry).await.unwrap();
        assert!(entries.get_unsynced().await.unwrap().is_empty());

        let cmd = EntryCommand {
            command: EntrySubcommand::Edit {
                id: entry.id.clone(),
                tank: None,
                weight: Some(14.0),
                count: None,
                crates: None,
                crate_weight: None,
                team: None,
            },
        };
        cmd.run(&entries, &settings).await.unwrap();

        // the edited record is pending push again
        let unsynced = entries.get_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].id, entry.id);
        assert_eq!(unsynced[0].weight, 14.0);
        assert!(!unsynced[0].synced);
    }

    #[test]
    fn test_validate_weight_rejects_nonpositive() {
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(-4.2).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_weight_accepts_positive() {
        assert!(validate_weight(0.001).is_ok());
        assert!(validate_weight(12.5).is_ok());
    }
}
