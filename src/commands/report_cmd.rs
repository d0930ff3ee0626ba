use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use crate::db::{EntryRepository, SettingsRepository};
use crate::models::Entry;
use crate::report::{
    history, summarize, tank_revenue, total_revenue, totals, DaySummary, TankSummary, Totals,
};

/// Everything the JSON summary carries; mirrors the text table plus the
/// totals and revenue lines.
#[derive(Serialize)]
struct SummaryOutput<'a> {
    date: Option<&'a str>,
    tanks: &'a [TankSummary],
    totals: &'a Totals,
    total_revenue: f64,
}

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub command: ReportSubcommand,
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// Per-tank summaries with totals and revenue
    Summary {
        /// Restrict to one date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Per-date summaries, newest first
    History {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ReportCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        settings_repo: &SettingsRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let settings = settings_repo.get().await?;
        let all = entries.get_all().await?;

        match &self.command {
            ReportSubcommand::Summary { date, format } => {
                let scoped: Vec<Entry> = match date {
                    Some(d) => all.into_iter().filter(|e| &e.date_key() == d).collect(),
                    None => all,
                };

                let summaries = summarize(&scoped, settings.crate_weight);
                if summaries.is_empty() {
                    println!("No entries found");
                    return Ok(());
                }

                let grand = totals(&summaries);

                match format {
                    OutputFormat::Json => {
                        let output = SummaryOutput {
                            date: date.as_deref(),
                            tanks: &summaries,
                            totals: &grand,
                            total_revenue: total_revenue(&summaries, &settings.tank_prices),
                        };
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        if let Some(d) = date {
                            println!("Summary for {}", d);
                        } else {
                            println!("Summary (all time)");
                        }
                        println!(
                            "{:<10} {:>7} {:>6} {:>7} {:>7} {:>10} {:>10} {:>6} {:>12}",
                            "TANK", "ENTRIES", "PATLU", "SINGLE", "CRATES", "GROSS", "NET",
                            "COUNT", "REVENUE"
                        );
                        println!("{}", "-".repeat(82));
                        for s in &summaries {
                            println!(
                                "{:<10} {:>7} {:>6} {:>7} {:>7} {:>10.2} {:>10.2} {:>6} {:>12.2}",
                                s.tank,
                                s.entry_count,
                                s.patlu_count,
                                s.singles_count,
                                s.crate_count,
                                s.total_weight,
                                s.absolute_weight,
                                s.shrimp_count,
                                tank_revenue(s, &settings.tank_prices),
                            );
                        }
                        println!("{}", "-".repeat(82));
                        println!(
                            "{:<10} {:>7} {:>6} {:>7} {:>7} {:>10.2} {:>10.2} {:>6} {:>12.2}",
                            "TOTAL",
                            grand.total_entries,
                            grand.total_patlu,
                            grand.total_singles,
                            grand.total_crates,
                            grand.total_gross,
                            grand.total_absolute,
                            "",
                            total_revenue(&summaries, &settings.tank_prices),
                        );
                        println!("Net efficiency: {:.1}%", grand.net_efficiency);
                    }
                }
                Ok(())
            }

            ReportSubcommand::History { format } => {
                let days: Vec<DaySummary> = history(&all, settings.crate_weight);
                if days.is_empty() {
                    println!("No entries found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&days)?);
                    }
                    OutputFormat::Text => {
                        for day in &days {
                            println!(
                                "{}  {} entr(ies), {:.2} kg gross, {:.2} kg net",
                                day.date,
                                day.totals.total_entries,
                                day.totals.total_gross,
                                day.totals.total_absolute,
                            );
                            for s in &day.summaries {
                                println!(
                                    "    {:<10} {:>3} entr(ies) {:>8.2} kg gross {:>8.2} kg net",
                                    s.tank, s.entry_count, s.total_weight, s.absolute_weight
                                );
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_summary_json_carries_totals_and_revenue() {
        let entries = vec![
            Entry::new("Tank 1", 10.0).with_crate_count(2).with_crate_weight(1.8),
            Entry::new("Tank 1", 5.0).with_crate_count(1).with_crate_weight(1.8),
        ];
        let summaries = summarize(&entries, 1.8);
        let grand = totals(&summaries);

        let mut prices = HashMap::new();
        prices.insert("Tank 1".to_string(), "50".to_string());

        let output = SummaryOutput {
            date: Some("2025-03-01"),
            tanks: &summaries,
            totals: &grand,
            total_revenue: total_revenue(&summaries, &prices),
        };

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["date"], "2025-03-01");
        assert_eq!(value["tanks"].as_array().unwrap().len(), 1);
        assert!((value["totals"]["total_gross"].as_f64().unwrap() - 15.0).abs() < 1e-9);
        assert!((value["totals"]["net_efficiency"].as_f64().unwrap() - 64.0).abs() < 1e-9);
        assert!((value["total_revenue"].as_f64().unwrap() - 480.0).abs() < 1e-9);
    }
}
