mod aggregate;
mod grouping;

pub use aggregate::{
    lenient_price, summarize, tank_revenue, total_revenue, totals, TankSummary, Totals,
};
pub use grouping::{history, ids_for_date, log_groups, serials_for_tank, DaySummary, LogGroup};
