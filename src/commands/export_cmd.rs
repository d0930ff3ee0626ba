use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::db::{EntryRepository, SettingsRepository};
use crate::export::{build_report, to_csv, ReportData};

#[derive(Args)]
pub struct ExportCommand {
    #[command(subcommand)]
    pub command: ExportSubcommand,
}

#[derive(Subcommand)]
pub enum ExportSubcommand {
    /// Export every entry as delimited text
    Csv {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Export the structured report
    Report {
        /// Restrict to one date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl ExportCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        settings_repo: &SettingsRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ExportSubcommand::Csv { output } => {
                let all = entries.get_all().await?;
                let csv = to_csv(&all);
                emit(csv, output.as_deref())?;
                Ok(())
            }

            ExportSubcommand::Report { date, output, json } => {
                let all = entries.get_all().await?;
                let settings = settings_repo.get().await?;
                let report = build_report(&all, &settings, date.as_deref());

                let text = if *json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    render_report(&report)
                };
                emit(text, output.as_deref())?;
                Ok(())
            }
        }
    }
}

fn emit(content: String, output: Option<&std::path::Path>) -> std::io::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn render_report(report: &ReportData) -> String {
    let mut out = String::new();

    match &report.date {
        Some(d) => out.push_str(&format!("Harvest report for {}\n", d)),
        None => out.push_str("Harvest report (all time)\n"),
    }
    out.push_str(&format!("{}\n\n", "=".repeat(60)));

    out.push_str("Metrics\n");
    out.push_str(&format!("  Gross weight:   {:.2} kg\n", report.metrics.total_gross));
    out.push_str(&format!("  Net weight:     {:.2} kg\n", report.metrics.total_net));
    out.push_str(&format!("  Revenue:        {:.2}\n", report.metrics.total_revenue));
    out.push_str(&format!("  Net efficiency: {:.1}%\n", report.metrics.net_efficiency));
    out.push_str(&format!("  Entries:        {}\n\n", report.metrics.total_entries));

    out.push_str("Per-tank breakdown\n");
    for s in &report.tanks {
        out.push_str(&format!(
            "  {:<10} {:>3} entr(ies)  {:>2} patlu  {:>2} single  {:>3} crates  {:>8.2} kg gross  {:>8.2} kg net  count {}\n",
            s.tank,
            s.entry_count,
            s.patlu_count,
            s.singles_count,
            s.crate_count,
            s.total_weight,
            s.absolute_weight,
            s.shrimp_count,
        ));
    }
    out.push('\n');

    out.push_str("Settlement\n");
    for row in &report.settlement {
        let price = if row.price.is_empty() { "-" } else { &row.price };
        out.push_str(&format!(
            "  {:<10} {:>8.2} kg net  @ {:<8}  = {:>10.2}\n",
            row.tank, row.net_weight, price, row.amount
        ));
    }
    out.push('\n');

    out.push_str("Detail\n");
    for d in &report.details {
        out.push_str(&format!(
            "  #{:<3} {:<10} {:>8.2} kg  net {:>8.2} kg  {} crate(s)  count {:<4} {}  {}\n",
            d.serial, d.tank, d.weight, d.net, d.crate_count, d.count, d.timestamp, d.team
        ));
    }

    out
}
