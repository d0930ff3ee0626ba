mod entry;
mod settings;

pub use entry::{effective_crate_count, effective_crate_weight, Entry};
pub use settings::Settings;
