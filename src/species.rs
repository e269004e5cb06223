//! Static species data and the pure lookups derived from it.
//!
//! The catalog is read once per session (from the same JSON layout the game's
//! data file uses) and shared immutably by every spawned fish. Missing fields
//! fall back to the defaults documented on each struct so partially authored
//! content still plays.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Rarity tiers, ordered from most to least common.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Relative spawn weight (duplication count in the sampling pool).
    pub fn spawn_weight(self) -> usize {
        match self {
            Rarity::Common => 100,
            Rarity::Uncommon => 50,
            Rarity::Rare => 20,
            Rarity::Epic => 8,
            Rarity::Legendary => 3,
            Rarity::Mythic => 1,
        }
    }

    /// Sort key for result screens (0 = Common).
    pub fn priority(self) -> u8 {
        self as u8
    }

    /// Map and circle color for species that don't author their own.
    pub fn color(self) -> &'static str {
        match self {
            Rarity::Common => "#1d4ed8",
            Rarity::Uncommon => "#10b981",
            Rarity::Rare => "#8b5cf6",
            Rarity::Epic => "#f97316",
            Rarity::Legendary => "#facc15",
            Rarity::Mythic => "#f472b6",
        }
    }

    /// Multiplier applied to the final catch probability.
    pub fn difficulty(self) -> f64 {
        match self {
            Rarity::Common => 1.15,
            Rarity::Uncommon => 1.05,
            Rarity::Rare => 0.95,
            Rarity::Epic => 0.85,
            Rarity::Legendary => 0.75,
            Rarity::Mythic => 0.65,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwimTag {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SwimTag {
    /// Base swim speed in meters per second.
    pub fn base_speed(self) -> f64 {
        match self {
            SwimTag::Fast => 8.0,
            SwimTag::Normal => 5.0,
            SwimTag::Slow => 3.0,
        }
    }
}

/// Closed numeric interval as stored in the data file (`{ "min": .., "max": .. }`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the span, clamped to `[0, 1]`; `0.5` for empty spans.
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.width();
        if width > 0.0 {
            ((value - self.min) / width).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

fn default_weight_span() -> Span {
    Span::new(1.0, 1.0)
}

fn default_size_span() -> Span {
    Span::new(20.0, 20.0)
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Behavior {
    pub swim_speed: SwimTag,
    pub approach_bias: f64,
    pub circle_shrink_rate: f64,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            swim_speed: SwimTag::Normal,
            approach_bias: 0.5,
            circle_shrink_rate: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scoring {
    /// Some data files keep `basePoints` here, others at the species root.
    pub base_points: Option<f64>,
    pub rarity_mult: f64,
    pub weight_exp: f64,
    pub size_exp: f64,
    pub distance_bonus_cap: f64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            base_points: None,
            rarity_mult: 1.0,
            weight_exp: 1.0,
            size_exp: 1.0,
            distance_bonus_cap: 1.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Equipment {
    #[serde(rename = "recRodTier")]
    pub rec_rod_tier: u8,
    #[serde(rename = "recLineTier")]
    pub rec_line_tier: u8,
    /// Weight above which the line may snap. Infinite when not authored.
    #[serde(rename = "breakRef_kg")]
    pub break_ref_kg: f64,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            rec_rod_tier: 1,
            rec_line_tier: 1,
            break_ref_kg: f64::INFINITY,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiHints {
    /// Falls back to the rarity color when absent.
    #[serde(rename = "mapColorHex")]
    pub map_color_hex: Option<String>,
}

pub const DEFAULT_BASE_POINTS: f64 = 100.0;

/// Bundled demo catalog, one or more species per rarity tier.
pub const SAMPLE_CATALOG_JSON: &str = include_str!("../data/species.json");

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpeciesSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default = "default_size_span")]
    pub size_cm: Span,
    #[serde(default = "default_weight_span")]
    pub weight_kg: Span,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default, rename = "basePoints")]
    pub base_points: Option<f64>,
    #[serde(default)]
    pub scoring: Scoring,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub ui: UiHints,
}

impl SpeciesSpec {
    pub fn base_points(&self) -> f64 {
        self.scoring
            .base_points
            .or(self.base_points)
            .unwrap_or(DEFAULT_BASE_POINTS)
    }

    pub fn color(&self) -> &str {
        self.ui.map_color_hex.as_deref().unwrap_or(self.rarity.color())
    }
}

/// Willingness of an idle fish to pick a new heading when its wander timer fires.
pub fn move_bias(spec: &SpeciesSpec) -> f64 {
    match spec.behavior.swim_speed {
        SwimTag::Fast => 0.7,
        SwimTag::Slow => 0.4,
        SwimTag::Normal => 0.55,
    }
}

/// Cruise speed for an individual: the tag's base speed scaled from 1.15 (lightest)
/// down to 0.85 (heaviest) across the species weight range.
pub fn swim_speed(spec: &SpeciesSpec, weight_kg: f64) -> f64 {
    let norm = spec.weight_kg.normalize(weight_kg);
    let heaviness = lerp(1.15, 0.85, norm);
    spec.behavior.swim_speed.base_speed() * heaviness
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<SpeciesSpec>),
    Envelope { species: Vec<SpeciesSpec> },
}

/// Immutable, shared species list for a session.
#[derive(Clone, Debug, Default)]
pub struct SpeciesCatalog {
    species: Vec<Arc<SpeciesSpec>>,
}

impl SpeciesCatalog {
    pub fn new(species: Vec<SpeciesSpec>) -> Self {
        Self { species: species.into_iter().map(Arc::new).collect() }
    }

    /// Parse either a bare species array or the game data envelope `{ "species": [..] }`.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json).map_err(SimError::Catalog)?;
        let species = match doc {
            CatalogDocument::Bare(list) => list,
            CatalogDocument::Envelope { species } => species,
        };
        log::debug!("loaded species catalog with {} entries", species.len());
        Ok(Self::new(species))
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpeciesSpec>> {
        self.species.iter()
    }

    pub fn get(&self, id: &str) -> SimResult<&Arc<SpeciesSpec>> {
        self.species
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SimError::UnknownSpecies(id.to_string()))
    }

    /// Weighted pick by rarity: equivalent to a uniform pick from a pool where each
    /// species appears `spawn_weight` times.
    pub fn sample(&self, rng: &mut impl crate::rng::RandomSource) -> Option<&Arc<SpeciesSpec>> {
        let total: usize = self.species.iter().map(|s| s.rarity.spawn_weight()).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.range_usize(0, total - 1);
        for spec in &self.species {
            let weight = spec.rarity.spawn_weight();
            if roll < weight {
                return Some(spec);
            }
            roll -= weight;
        }
        self.species.last()
    }
}
