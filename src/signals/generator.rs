use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::signals::diurnal::DiurnalProfile;
use crate::signals::region::RegionProfile;
use crate::sim::types::{SimConfig, TimeSeries};

const PRICE_SEED_OFFSET: u64 = 1;
const CARBON_SEED_OFFSET: u64 = 2;
const REGULATION_SEED_OFFSET: u64 = 3;

/// Price and carbon series for one region over one horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSignals {
    pub price: TimeSeries,
    pub carbon: TimeSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    profile: [u32; 5],
    steps_per_day: usize,
    days: usize,
    seed: u64,
}

impl CacheKey {
    fn new(profile: &RegionProfile, grid: &SimConfig, seed: u64) -> Self {
        Self {
            profile: profile.key_bits(),
            steps_per_day: grid.steps_per_day,
            days: grid.days,
            seed,
        }
    }
}

#[derive(Debug)]
struct CachedMarket {
    key: CacheKey,
    signals: MarketSignals,
}

/// Synthetic signal source with a one-entry market cache.
///
/// Each series draws from its own RNG seeded from the generator seed plus a
/// fixed offset, so the output depends only on the seed, the profile, and
/// the horizon, never on call order. The cached market is replaced whenever
/// any of those change.
#[derive(Debug)]
pub struct SignalGenerator {
    seed: u64,
    cache: Option<CachedMarket>,
    generations: usize,
}

impl SignalGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cache: None,
            generations: 0,
        }
    }

    /// Changes the seed; the cached market no longer matches and is dropped.
    pub fn set_seed(&mut self, seed: u64) {
        if seed != self.seed {
            self.seed = seed;
            self.invalidate();
        }
    }

    /// Drops the cached market.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Number of markets generated so far (cache misses).
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Price and carbon series for `profile` over `grid`, reusing the
    /// cached pair when the inputs match.
    pub fn market(&mut self, profile: &RegionProfile, grid: &SimConfig) -> &MarketSignals {
        let key = CacheKey::new(profile, grid, self.seed);
        if self.cache.as_ref().is_some_and(|c| c.key != key) {
            self.cache = None;
        }
        if self.cache.is_none() {
            self.generations += 1;
            debug!(
                seed = self.seed,
                horizon = grid.total_steps(),
                "generating market signals"
            );
        }

        let seed = self.seed;
        &self
            .cache
            .get_or_insert_with(|| CachedMarket {
                key,
                signals: generate_market(profile, grid, seed),
            })
            .signals
    }

    /// Frequency-regulation price series. Not cached.
    pub fn regulation_price(&self, profile: &DiurnalProfile, grid: &SimConfig) -> TimeSeries {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(REGULATION_SEED_OFFSET));
        profile.generate(grid, &mut rng)
    }
}

fn generate_market(profile: &RegionProfile, grid: &SimConfig, seed: u64) -> MarketSignals {
    let mut price_rng = StdRng::seed_from_u64(seed.wrapping_add(PRICE_SEED_OFFSET));
    let mut carbon_rng = StdRng::seed_from_u64(seed.wrapping_add(CARBON_SEED_OFFSET));
    MarketSignals {
        price: profile.price().generate(grid, &mut price_rng),
        carbon: profile.carbon().generate(grid, &mut carbon_rng),
    }
}
