//! Per-round fish population.

use crate::config::SimConfig;
use crate::fish::{Fish, FishId};
use crate::rng::RandomSource;
use crate::species::SpeciesCatalog;

/// Closest a fish ever spawns to the shore.
pub const MIN_SPAWN_DISTANCE: f64 = 30.0;
/// Farthest a fish ever spawns.
pub const MAX_SPAWN_DISTANCE: f64 = 200.0;
/// Extra depth past the cast a normal round may spawn fish at.
pub const SPAWN_REACH_PAST_CAST: f64 = 20.0;
/// Lateral half-width used when the caller's is missing, zero or not a number.
pub const DEFAULT_HALF_WIDTH: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOptions {
    /// Scatter a larger school over the whole water instead of around the cast.
    pub spread: bool,
    /// Lateral half-width of the play field.
    pub half_width: f64,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self { spread: false, half_width: 5.0 }
    }
}

#[derive(Debug)]
pub struct SpawnResult {
    /// Sorted nearest-to-shore first.
    pub fishes: Vec<Fish>,
    pub lateral_limit: f64,
}

/// Half-width the round actually plays with; spawning, containment and the
/// renderer all read this one value.
pub fn lateral_limit(half_width: f64) -> f64 {
    let half_width = half_width.abs();
    if half_width.is_finite() && half_width > 0.0 {
        half_width
    } else {
        DEFAULT_HALF_WIDTH
    }
}

/// Distance band fish may spawn in for a cast at `dist`.
pub fn spawn_band(dist: f64, spread: bool) -> (f64, f64) {
    let max = if spread {
        MAX_SPAWN_DISTANCE
    } else {
        (dist + SPAWN_REACH_PAST_CAST).min(MAX_SPAWN_DISTANCE)
    };
    (MIN_SPAWN_DISTANCE, max.max(MIN_SPAWN_DISTANCE))
}

/// Sample the fish for a round cast to `dist`.
pub fn spawn_fishes(
    catalog: &SpeciesCatalog,
    dist: f64,
    options: SpawnOptions,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> SpawnResult {
    let half_width = lateral_limit(options.half_width);
    if catalog.is_empty() {
        return SpawnResult { fishes: Vec::new(), lateral_limit: half_width };
    }

    let (min_distance, max_distance) = spawn_band(dist, options.spread);
    let count = if options.spread {
        rng.range_usize(12, 18)
    } else {
        rng.range_usize(6, 10)
    };

    let mut fishes = Vec::with_capacity(count);
    for i in 0..count {
        let Some(spec) = catalog.sample(rng).cloned() else {
            continue;
        };
        let size = rng.range_f64(spec.size_cm.min, spec.size_cm.max);
        let weight = rng.range_f64(spec.weight_kg.min, spec.weight_kg.max);
        let distance = rng.range_f64(min_distance, max_distance);
        let lateral = rng.range_f64(-half_width, half_width);
        fishes.push(Fish::new(
            FishId(i as u32),
            spec,
            weight,
            size,
            lateral,
            distance,
            config.vertical_home_range,
            rng,
        ));
    }

    assign_bonus_multipliers(&mut fishes, rng);
    fishes.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));

    log::debug!(
        "spawned {} fish in {:.1}..{:.1} m (spread={})",
        fishes.len(),
        min_distance,
        max_distance,
        options.spread
    );

    SpawnResult { fishes, lateral_limit: half_width }
}

/// One fish gets x2; a quarter of the time a second, different fish gets x3.
fn assign_bonus_multipliers(fishes: &mut [Fish], rng: &mut impl RandomSource) {
    if fishes.is_empty() {
        return;
    }
    let mut pool: Vec<usize> = (0..fishes.len()).collect();
    let special = pool.swap_remove(rng.range_usize(0, pool.len() - 1));
    fishes[special].bonus_multiplier = 2;
    if !pool.is_empty() && rng.chance(0.25) {
        let rare = pool.swap_remove(rng.range_usize(0, pool.len() - 1));
        fishes[rare].bonus_multiplier = 3;
    }
}
