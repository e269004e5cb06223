//! The per-individual fish state mutated by steering and engagement.

use std::sync::Arc;

use glam::DVec2;
use serde::Serialize;

use crate::engagement::EngagementId;
use crate::rng::RandomSource;
use crate::species::{self, SpeciesSpec};

/// Stable handle for a fish within one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FishId(pub u32);

/// One spawned individual. `position.x` is lateral offset from the cast line,
/// `position.y` is distance from shore.
#[derive(Clone, Debug)]
pub struct Fish {
    pub id: FishId,
    pub species: Arc<SpeciesSpec>,
    pub weight_kg: f64,
    pub size_cm: f64,

    pub position: DVec2,
    pub velocity: DVec2,
    pub target_velocity: DVec2,

    pub swim_speed: f64,
    pub move_bias: f64,
    pub personality: f64,
    /// 0 (calm) ..= 1 (panicked).
    pub stress: f64,

    pub escape_timer: f64,
    pub alert_timer: f64,
    pub alert_vector: Option<DVec2>,
    pub wander_timer: f64,

    pub home_y: f64,
    pub vertical_range: f64,

    /// 1, 2 or 3.
    pub bonus_multiplier: u8,

    pub finished: bool,
    pub moving: bool,
    pub facing_right: bool,

    pub(crate) engagement: Option<EngagementId>,
}

impl Fish {
    /// Build a fish at `(lateral, distance)` with every dynamic field at its resting default.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FishId,
        species: Arc<SpeciesSpec>,
        weight_kg: f64,
        size_cm: f64,
        lateral: f64,
        distance: f64,
        vertical_range: f64,
        rng: &mut impl RandomSource,
    ) -> Self {
        let swim_speed = species::swim_speed(&species, weight_kg);
        let move_bias = species::move_bias(&species);
        Self {
            id,
            species,
            weight_kg,
            size_cm,
            position: DVec2::new(lateral, distance),
            velocity: DVec2::ZERO,
            target_velocity: DVec2::ZERO,
            swim_speed,
            move_bias,
            personality: rng.range_f64(0.8, 1.2),
            stress: 0.0,
            escape_timer: 0.0,
            alert_timer: 0.0,
            alert_vector: None,
            wander_timer: rng.range_f64(0.6, 1.4),
            home_y: distance,
            vertical_range,
            bonus_multiplier: 1,
            finished: false,
            moving: false,
            facing_right: rng.chance(0.5),
            engagement: None,
        }
    }

    /// Distance from shore; mirrors `position.y` for readers that only want a scalar.
    pub fn distance(&self) -> f64 {
        self.position.y
    }

    pub fn is_engaged(&self) -> bool {
        self.engagement.is_some()
    }

    pub fn engagement(&self) -> Option<EngagementId> {
        self.engagement
    }

    pub fn is_live(&self) -> bool {
        !self.finished
    }

    pub fn is_alerted(&self) -> bool {
        self.alert_timer > 0.0 && self.alert_vector.is_some()
    }

    pub fn distance_to(&self, point: DVec2) -> f64 {
        self.position.distance(point)
    }
}

/// Read-only view handed to the renderer.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FishView {
    pub id: FishId,
    pub species_id: String,
    pub color: String,
    pub x: f64,
    pub distance: f64,
    pub facing_right: bool,
    pub engaged: bool,
    pub stress: f64,
    pub alerted: bool,
    pub moving: bool,
    pub weight_kg: f64,
    pub size_cm: f64,
    pub bonus_multiplier: u8,
}

impl From<&Fish> for FishView {
    fn from(fish: &Fish) -> Self {
        Self {
            id: fish.id,
            species_id: fish.species.id.clone(),
            color: fish.species.color().to_string(),
            x: fish.position.x,
            distance: fish.position.y,
            facing_right: fish.facing_right,
            engaged: fish.is_engaged(),
            stress: fish.stress,
            alerted: fish.is_alerted(),
            moving: fish.moving,
            weight_kg: fish.weight_kg,
            size_cm: fish.size_cm,
            bonus_multiplier: fish.bonus_multiplier,
        }
    }
}
