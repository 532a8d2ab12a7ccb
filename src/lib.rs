//! Battery dispatch simulator.
//!
//! Decides for each interval of a price/carbon/demand horizon whether a
//! battery charges, discharges, or idles, tracks its state of charge, and
//! compares dispatch strategies over identical inputs.

pub mod cli;
pub mod config;
pub mod error;
/// CSV export.
pub mod io;
pub mod runner;
/// Signal generation, external feeds, and input assembly.
pub mod signals;
/// SOC integrator, dispatch policy, simulation loop, and comparator.
pub mod sim;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "tui")]
pub mod tui;

pub use error::{ConfigError, SimError};
