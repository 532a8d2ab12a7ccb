//! CSV export for schedules and strategy comparisons.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::compare::ComparisonRow;
use crate::sim::types::ScheduleRecord;

/// Column header for schedule export.
const SCHEDULE_HEADER: &str = "timestep,time_hr,action,price,carbon,demand_kwh,\
                               soc_before,soc,grid_energy_kwh,cost,emissions_kg,\
                               reg_revenue,carbon_offset_kg";

/// Column header for comparison export.
const COMPARISON_HEADER: &str = "strategy,total_energy_kwh,total_cost,total_emissions_kg,\
                                 high_tariff_intervals,tariff_hours_avoided,\
                                 total_reg_revenue,best_cost,best_carbon";

/// Exports a schedule to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_schedule_csv(schedule: &[ScheduleRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_schedule_csv(schedule, io::BufWriter::new(file))
}

/// Writes a schedule as CSV to any writer.
///
/// # Arguments
///
/// * `schedule` - Records of one run
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_schedule_csv(schedule: &[ScheduleRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SCHEDULE_HEADER.split(',').map(str::trim))?;

    for r in schedule {
        wtr.write_record(&[
            r.timestep.to_string(),
            format!("{:.2}", r.time_hr),
            r.action.as_str().to_string(),
            format!("{:.4}", r.price),
            format!("{:.4}", r.carbon),
            format!("{:.4}", r.demand_kwh),
            format!("{:.6}", r.soc_before),
            format!("{:.6}", r.soc),
            format!("{:.4}", r.grid_energy_kwh),
            format!("{:.6}", r.cost),
            format!("{:.6}", r.emissions_kg),
            format!("{:.6}", r.reg_revenue),
            format!("{:.6}", r.carbon_offset_kg),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports comparison rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_comparison_csv(rows: &[ComparisonRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_comparison_csv(rows, io::BufWriter::new(file))
}

/// Writes comparison rows as CSV to any writer.
pub fn write_comparison_csv(rows: &[ComparisonRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(COMPARISON_HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.strategy.name().to_string(),
            format!("{:.4}", r.total_energy_kwh),
            format!("{:.4}", r.total_cost),
            format!("{:.4}", r.total_emissions_kg),
            r.high_tariff_intervals.to_string(),
            format!("{:.2}", r.tariff_hours_avoided),
            format!("{:.4}", r.total_reg_revenue),
            r.best_cost.to_string(),
            r.best_carbon.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
