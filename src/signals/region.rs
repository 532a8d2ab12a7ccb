use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signals::diurnal::DiurnalProfile;

/// Hour offset of the price sinusoid (evening peak).
pub const PRICE_PHASE_SHIFT_HR: f32 = 18.0;
/// Hour offset of the carbon sinusoid.
pub const CARBON_PHASE_SHIFT_HR: f32 = 16.0;

/// Grid region with a characteristic price and carbon profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Uk,
    Germany,
    Texas,
    California,
    France,
}

impl Region {
    pub const ALL: [Self; 5] = [
        Self::Uk,
        Self::Germany,
        Self::Texas,
        Self::California,
        Self::France,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::Germany => "germany",
            Self::Texas => "texas",
            Self::California => "california",
            Self::France => "france",
        }
    }

    /// Market profile for this region.
    pub fn profile(self) -> RegionProfile {
        let (price_base, price_amp, carbon_base, carbon_amp, noise) = match self {
            Self::Uk => (120.0, 60.0, 250.0, 100.0, 15.0),
            Self::Germany => (90.0, 50.0, 300.0, 80.0, 15.0),
            Self::Texas => (60.0, 80.0, 400.0, 120.0, 20.0),
            Self::California => (100.0, 70.0, 200.0, 60.0, 10.0),
            Self::France => (80.0, 40.0, 100.0, 30.0, 5.0),
        };
        RegionProfile {
            price_base,
            price_amp,
            carbon_base,
            carbon_amp,
            noise,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.name() == key)
            .ok_or_else(|| {
                ConfigError::new(
                    "signals.region",
                    format!(
                        "unknown region \"{s}\", available: {}",
                        Self::ALL.map(Region::name).join(", ")
                    ),
                )
            })
    }
}

/// Price and carbon generation parameters for one region.
///
/// The same noise level applies to both series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionProfile {
    pub price_base: f32,
    pub price_amp: f32,
    pub carbon_base: f32,
    pub carbon_amp: f32,
    pub noise: f32,
}

impl RegionProfile {
    pub fn price(&self) -> DiurnalProfile {
        DiurnalProfile::new(
            self.price_base,
            self.price_amp,
            self.noise,
            PRICE_PHASE_SHIFT_HR,
        )
    }

    pub fn carbon(&self) -> DiurnalProfile {
        DiurnalProfile::new(
            self.carbon_base,
            self.carbon_amp,
            self.noise,
            CARBON_PHASE_SHIFT_HR,
        )
    }

    /// Bit pattern used as a cache key.
    pub(crate) fn key_bits(&self) -> [u32; 5] {
        [
            self.price_base.to_bits(),
            self.price_amp.to_bits(),
            self.carbon_base.to_bits(),
            self.carbon_amp.to_bits(),
            self.noise.to_bits(),
        ]
    }
}
