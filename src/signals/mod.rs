//! Input signal generation and assembly.
//!
//! Price and carbon come from a region profile (or an external feed), demand
//! from fixed household buckets. [`SignalSet`] bundles the series handed to
//! the simulation loop and checks that they share one horizon.

pub mod demand;
pub mod diurnal;
pub mod feed;
pub mod generator;
pub mod region;

pub use demand::DemandProfile;
pub use diurnal::DiurnalProfile;
pub use feed::{CsvSeriesFeed, FeedError, FeedWarning, SignalFeed};
pub use generator::{MarketSignals, SignalGenerator};
pub use region::{Region, RegionProfile};

use crate::error::SimError;
use crate::sim::types::TimeSeries;

/// Every per-interval input of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSet {
    /// Electricity price (currency/MWh).
    pub price: TimeSeries,
    /// Carbon intensity (gCO2/kWh).
    pub carbon: TimeSeries,
    /// Demand draw as a fraction of battery capacity.
    pub demand: TimeSeries,
    /// Frequency-regulation price (currency/kW·h); only read when
    /// regulation participation is enabled.
    pub regulation_price: Option<TimeSeries>,
}

impl SignalSet {
    pub fn new(price: TimeSeries, carbon: TimeSeries, demand: TimeSeries) -> Self {
        Self {
            price,
            carbon,
            demand,
            regulation_price: None,
        }
    }

    pub fn with_regulation_price(mut self, regulation_price: TimeSeries) -> Self {
        self.regulation_price = Some(regulation_price);
        self
    }

    /// Number of intervals, taken from the price series.
    pub fn horizon(&self) -> usize {
        self.price.len()
    }

    /// Checks that every series holds exactly `expected` samples.
    pub fn validate_shape(&self, expected: usize) -> Result<(), SimError> {
        if self.price.is_empty() {
            return Err(SimError::EmptySeries { series: "price" });
        }

        let mut named = vec![
            ("price", &self.price),
            ("carbon", &self.carbon),
            ("demand", &self.demand),
        ];
        if let Some(reg) = &self.regulation_price {
            named.push(("regulation_price", reg));
        }

        for (series, values) in named {
            if values.len() != expected {
                return Err(SimError::LengthMismatch {
                    series,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}
