mod config_cmd;
mod entry;
mod export_cmd;
mod report_cmd;
mod sync_cmd;
mod tank;

pub use config_cmd::ConfigCommand;
pub use entry::EntryCommand;
pub use export_cmd::ExportCommand;
pub use report_cmd::ReportCommand;
pub use sync_cmd::SyncCommand;
pub use tank::TankCommand;
