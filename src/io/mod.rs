/// CSV export of schedules and comparisons.
pub mod export;
