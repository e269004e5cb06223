//! Point and gear rules. Pure and deterministic.

use crate::config::{PlayerGear, SimConfig};
use crate::fish::Fish;
use crate::species::Equipment;

/// Distance bonus: +20% across the full cast range, floored at 1 and capped per species.
pub fn distance_factor(cast_distance: f64, base_cast: f64, max_cast: f64, cap: f64) -> f64 {
    let span = max_cast - base_cast;
    let raw = if span > 0.0 {
        1.0 + 0.20 * (cast_distance - base_cast) / span
    } else {
        1.0
    };
    raw.clamp(1.0, cap.max(1.0))
}

/// Score before the bonus multiplier and rounding.
pub fn base_score(fish: &Fish, cast_distance: f64, config: &SimConfig) -> f64 {
    let spec = &fish.species;
    let scoring = &spec.scoring;
    let weight_norm = spec.weight_kg.normalize(fish.weight_kg);
    let size_norm = spec.size_cm.normalize(fish.size_cm);
    let distance = distance_factor(
        cast_distance,
        config.base_cast,
        config.max_cast,
        scoring.distance_bonus_cap,
    );
    spec.base_points()
        * scoring.rarity_mult
        * (1.0 + weight_norm).powf(scoring.weight_exp)
        * (1.0 + size_norm).powf(scoring.size_exp)
        * distance
}

/// Points awarded for landing `fish` from a cast of `cast_distance` meters.
pub fn compute_points(fish: &Fish, cast_distance: f64, config: &SimConfig) -> i64 {
    let multiplier = f64::from(fish.bonus_multiplier.max(1));
    (base_score(fish, cast_distance, config) * multiplier).round() as i64
}

/// Line-break chance multiplier for under-tier gear (1.0 when gear meets the recommendation).
pub fn gear_penalty(equipment: &Equipment, gear: PlayerGear) -> f64 {
    let mut penalty = 1.0;
    if gear.rod_tier < equipment.rec_rod_tier {
        penalty += 0.25 * f64::from(equipment.rec_rod_tier - gear.rod_tier);
    }
    if gear.line_tier < equipment.rec_line_tier {
        penalty += 0.35 * f64::from(equipment.rec_line_tier - gear.line_tier);
    }
    penalty
}
