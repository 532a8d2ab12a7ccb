//! External signal feeds and the fallback resolver.
//!
//! A feed is never trusted to be up: any failure is logged, recorded as a
//! [`FeedWarning`], and the synthetic series is used instead.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::sim::types::TimeSeries;

/// Why a feed could not supply a usable series.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed unavailable: {0}")]
    Unavailable(String),

    #[error("malformed feed data: {0}")]
    Malformed(String),

    #[error("feed returned {actual} samples, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
}

/// Source of one externally supplied series.
pub trait SignalFeed {
    /// Short description used in logs and warnings.
    fn describe(&self) -> String;

    /// Fetches exactly `horizon` samples.
    fn fetch(&self, horizon: usize) -> Result<TimeSeries, FeedError>;
}

/// Reads one named column of a headered CSV file.
#[derive(Debug, Clone)]
pub struct CsvSeriesFeed {
    path: PathBuf,
    column: String,
}

impl CsvSeriesFeed {
    pub fn new(path: impl AsRef<Path>, column: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            column: column.into(),
        }
    }
}

impl SignalFeed for CsvSeriesFeed {
    fn describe(&self) -> String {
        format!("{}[{}]", self.path.display(), self.column)
    }

    fn fetch(&self, horizon: usize) -> Result<TimeSeries, FeedError> {
        let file = File::open(&self.path)
            .map_err(|e| FeedError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| FeedError::Malformed(e.to_string()))?;
        let index = headers
            .iter()
            .position(|h| h.trim() == self.column)
            .ok_or_else(|| FeedError::Malformed(format!("no column named `{}`", self.column)))?;

        let mut values = Vec::with_capacity(horizon);
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| FeedError::Malformed(e.to_string()))?;
            let cell = record.get(index).unwrap_or("").trim();
            let value: f32 = cell
                .parse()
                .map_err(|_| FeedError::Malformed(format!("row {}: `{cell}` is not a number", row + 1)))?;
            if !value.is_finite() {
                return Err(FeedError::Malformed(format!("row {}: non-finite value", row + 1)));
            }
            values.push(value);
        }

        if values.len() != horizon {
            return Err(FeedError::WrongLength {
                expected: horizon,
                actual: values.len(),
            });
        }
        Ok(values.into())
    }
}

/// Record of a feed that was replaced by its synthetic fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedWarning {
    /// Series that fell back (`"price"`, `"carbon"`).
    pub series: &'static str,
    /// Feed description.
    pub source: String,
    /// Failure reason.
    pub reason: String,
}

impl fmt::Display for FeedWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} feed {} failed ({}); using synthetic series",
            self.series, self.source, self.reason
        )
    }
}

/// Fetches `series` from `feed`, clipping to `range`, or falls back.
///
/// The fallback is only evaluated when the feed is absent or fails.
pub fn resolve_series(
    series: &'static str,
    feed: Option<&dyn SignalFeed>,
    horizon: usize,
    range: (f32, f32),
    fallback: impl FnOnce() -> TimeSeries,
) -> (TimeSeries, Option<FeedWarning>) {
    let Some(feed) = feed else {
        return (fallback(), None);
    };

    match feed.fetch(horizon) {
        Ok(values) => {
            info!(series, source = %feed.describe(), "loaded external series");
            (values.clamped(range.0, range.1), None)
        }
        Err(e) => {
            let warning = FeedWarning {
                series,
                source: feed.describe(),
                reason: e.to_string(),
            };
            warn!("{warning}");
            (fallback(), Some(warning))
        }
    }
}
