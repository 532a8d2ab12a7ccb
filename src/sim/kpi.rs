//! Post-hoc summary metrics over a completed schedule.

use std::fmt;

use serde::Serialize;

use super::types::{Action, ScheduleRecord};

/// Aggregate metrics derived from one strategy's schedule.
///
/// Computed post-hoc from `&[ScheduleRecord]` so the reported totals always
/// agree with the per-interval records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Sum of per-interval battery energy movement (kWh).
    pub total_energy_kwh: f32,
    /// Sum of per-interval cost (currency).
    pub total_cost: f32,
    /// Sum of per-interval emissions (kg CO2).
    pub total_emissions_kg: f32,
    /// Intervals whose price exceeded the tariff threshold.
    pub high_tariff_intervals: usize,
    /// Horizon hours outside high-tariff intervals.
    pub tariff_hours_avoided: f32,
    /// Frequency-regulation revenue (currency).
    pub total_reg_revenue: f32,
    /// CO2 displaced by discharging (kg).
    pub total_carbon_offset_kg: f32,
    pub charge_intervals: usize,
    pub discharge_intervals: usize,
    pub idle_intervals: usize,
    /// SOC after the last interval, or 0.0 for an empty schedule.
    pub final_soc: f32,
}

impl Summary {
    /// Computes every metric from the complete schedule.
    ///
    /// # Arguments
    ///
    /// * `schedule` - Records of one run, in interval order
    /// * `tariff_threshold` - Price above which an interval counts as high tariff
    /// * `dt_hours` - Interval duration in hours
    pub fn from_schedule(schedule: &[ScheduleRecord], tariff_threshold: f32, dt_hours: f32) -> Self {
        let mut summary = Self {
            total_energy_kwh: 0.0,
            total_cost: 0.0,
            total_emissions_kg: 0.0,
            high_tariff_intervals: 0,
            tariff_hours_avoided: 0.0,
            total_reg_revenue: 0.0,
            total_carbon_offset_kg: 0.0,
            charge_intervals: 0,
            discharge_intervals: 0,
            idle_intervals: 0,
            final_soc: schedule.last().map_or(0.0, |r| r.soc),
        };

        for r in schedule {
            summary.total_energy_kwh += r.grid_energy_kwh;
            summary.total_cost += r.cost;
            summary.total_emissions_kg += r.emissions_kg;
            summary.total_reg_revenue += r.reg_revenue;
            summary.total_carbon_offset_kg += r.carbon_offset_kg;

            if r.price > tariff_threshold {
                summary.high_tariff_intervals += 1;
            }

            match r.action {
                Action::Charge => summary.charge_intervals += 1,
                Action::Discharge => summary.discharge_intervals += 1,
                Action::Idle => summary.idle_intervals += 1,
            }
        }

        let horizon_hours = schedule.len() as f32 * dt_hours;
        summary.tariff_hours_avoided =
            (horizon_hours - summary.high_tariff_intervals as f32 * dt_hours).max(0.0);
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Strategy Summary ---")?;
        writeln!(f, "Total energy:          {:.2} kWh", self.total_energy_kwh)?;
        writeln!(f, "Total cost:            {:.2}", self.total_cost)?;
        writeln!(f, "Total emissions:       {:.2} kg CO2", self.total_emissions_kg)?;
        writeln!(
            f,
            "High-tariff intervals: {} ({:.2} h avoided)",
            self.high_tariff_intervals, self.tariff_hours_avoided
        )?;
        writeln!(
            f,
            "Actions:               {} charge / {} discharge / {} idle",
            self.charge_intervals, self.discharge_intervals, self.idle_intervals
        )?;
        writeln!(f, "Regulation revenue:    {:.2}", self.total_reg_revenue)?;
        writeln!(f, "Carbon offset:         {:.2} kg CO2", self.total_carbon_offset_kg)?;
        write!(f, "Final SoC:             {:.1}%", self.final_soc * 100.0)
    }
}
