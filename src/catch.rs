//! Strike resolution: catch odds from a timing circle and line-break risk.

use serde::Serialize;

use crate::config::PlayerGear;
use crate::engagement::Engagement;
use crate::fish::{Fish, FishId};
use crate::rng::RandomSource;
use crate::scoring::gear_penalty;

const BASE_CATCH: f64 = 0.15;
const SKILL_CATCH: f64 = 0.75;
const MIN_CATCH: f64 = 0.05;
const MAX_CATCH: f64 = 0.98;
const BREAK_FACTOR: f64 = 0.35;
const MAX_BREAK: f64 = 0.9;

/// Probability that striking now lands `fish`. Can exceed 1 for easy (Common) species.
pub fn catch_probability(engagement: &Engagement, fish: &Fish) -> f64 {
    let skill = 1.0 - engagement.openness();
    let mut p = BASE_CATCH + SKILL_CATCH * skill;
    p *= 0.8 + 0.5 * fish.species.behavior.approach_bias;
    p *= 1.0 - fish.stress * 0.2;
    p.clamp(MIN_CATCH, MAX_CATCH) * fish.species.rarity.difficulty()
}

pub fn roll_catch(engagement: &Engagement, fish: &Fish, rng: &mut impl RandomSource) -> bool {
    rng.next_f64() < catch_probability(engagement, fish)
}

/// Chance the line snaps on a hooked fish; 0 unless the fish outweighs its species' break reference.
pub fn line_break_chance(fish: &Fish, gear: PlayerGear) -> f64 {
    let equipment = &fish.species.equipment;
    let break_ref = equipment.break_ref_kg;
    if !(fish.weight_kg > break_ref) || break_ref <= 0.0 {
        return 0.0;
    }
    let chance = BREAK_FACTOR * (fish.weight_kg / break_ref) * gear_penalty(equipment, gear);
    chance.clamp(0.0, MAX_BREAK)
}

pub fn check_line_break(fish: &Fish, gear: PlayerGear, rng: &mut impl RandomSource) -> bool {
    let chance = line_break_chance(fish, gear);
    chance > 0.0 && rng.next_f64() < chance
}

/// A landed fish, as recorded on the round's catch list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaughtFish {
    pub fish: FishId,
    pub species_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub size_cm: f64,
    pub points: i64,
    pub bonus_multiplier: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatchOutcome {
    Caught(CaughtFish),
    #[serde(rename_all = "camelCase")]
    LineBroke { fish: FishId, species_id: String },
    Missed { fish: FishId },
}

impl CatchOutcome {
    pub fn fish(&self) -> FishId {
        match self {
            CatchOutcome::Caught(caught) => caught.fish,
            CatchOutcome::LineBroke { fish, .. } | CatchOutcome::Missed { fish } => *fish,
        }
    }
}

/// Everything one strike resolved, in engagement order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchReport {
    pub outcomes: Vec<CatchOutcome>,
    pub points: i64,
}

impl CatchReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn caught(&self) -> impl Iterator<Item = &CaughtFish> {
        self.outcomes.iter().filter_map(|o| match o {
            CatchOutcome::Caught(caught) => Some(caught),
            _ => None,
        })
    }

    pub fn line_breaks(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CatchOutcome::LineBroke { .. }))
            .count()
    }

    pub fn push(&mut self, outcome: CatchOutcome) {
        if let CatchOutcome::Caught(caught) = &outcome {
            self.points += caught.points;
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::EngagementId;
    use crate::rng::{FixedRng, SimRng};
    use crate::species::{Rarity, SpeciesCatalog, SAMPLE_CATALOG_JSON};

    fn fish(id: &str, weight: f64) -> Fish {
        let catalog = SpeciesCatalog::from_json(SAMPLE_CATALOG_JSON).unwrap();
        let spec = catalog.get(id).unwrap().clone();
        let mut rng = SimRng::seeded(1);
        Fish::new(FishId(0), spec, weight, spec_mid_size(&catalog, id), 0.0, 100.0, 32.0, &mut rng)
    }

    fn spec_mid_size(catalog: &SpeciesCatalog, id: &str) -> f64 {
        let spec = catalog.get(id).unwrap();
        (spec.size_cm.min + spec.size_cm.max) / 2.0
    }

    fn circle(radius: f64) -> Engagement {
        Engagement {
            id: EngagementId(0),
            fish: FishId(0),
            radius,
            min_radius: 12.0,
            max_radius: 24.0,
            life: 1.0,
            detection_range: 5.0,
            shrink_rate: 35.0,
        }
    }

    #[test]
    fn tight_circle_on_calm_bluegill() {
        // (0.15 + 0.75) * (0.8 + 0.25) = 0.945, times Common 1.15
        let p = catch_probability(&circle(12.0), &fish("bluegill", 1.5));
        assert!((p - 0.945 * 1.15).abs() < 1e-12);
    }

    #[test]
    fn wide_circle_is_harder() {
        // 0.15 * 1.05 = 0.1575, times 1.15
        let p = catch_probability(&circle(24.0), &fish("bluegill", 1.5));
        assert!((p - 0.1575 * 1.15).abs() < 1e-12);
    }

    #[test]
    fn probability_never_rises_as_circle_opens() {
        for id in ["bluegill", "pike", "moonfin"] {
            for stress in [0.0, 0.5, 1.0] {
                let mut f = fish(id, 1.0);
                f.stress = stress;
                let mut prev = f64::INFINITY;
                for step in 0..=48 {
                    let p = catch_probability(&circle(12.0 + step as f64 * 0.25), &f);
                    assert!(p <= prev, "{id} at stress {stress}: {p} > {prev}");
                    prev = p;
                }
            }
        }
    }

    #[test]
    fn stress_and_rarity_lower_the_odds() {
        let calm = fish("bluegill", 1.5);
        let mut stressed = calm.clone();
        stressed.stress = 1.0;
        assert!(catch_probability(&circle(18.0), &stressed) < catch_probability(&circle(18.0), &calm));

        let mythic = fish("moonfin", 1.0);
        assert_eq!(mythic.species.rarity, Rarity::Mythic);
        let p = catch_probability(&circle(12.0), &mythic);
        assert!(p <= MAX_CATCH * 0.65 + 1e-12);
    }

    #[test]
    fn roll_uses_injected_draw() {
        let engagement = circle(12.0);
        let f = fish("bluegill", 1.5);
        assert!(roll_catch(&engagement, &f, &mut FixedRng(0.0)));
        assert!(roll_catch(&engagement, &f, &mut FixedRng(0.99)));
        assert!(!roll_catch(&circle(24.0), &f, &mut FixedRng(0.5)));
    }

    #[test]
    fn line_holds_under_break_reference() {
        let f = fish("bluegill", 1.5);
        assert_eq!(line_break_chance(&f, PlayerGear::default()), 0.0);
        assert!(!check_line_break(&f, PlayerGear::default(), &mut FixedRng(0.0)));
    }

    #[test]
    fn heavy_fish_on_light_gear_may_snap() {
        let mut f = fish("bluegill", 1.5);
        f.weight_kg = 6.0;
        let chance = line_break_chance(&f, PlayerGear::default());
        assert!((chance - 0.35 * 1.2).abs() < 1e-12);
        assert!(check_line_break(&f, PlayerGear::default(), &mut FixedRng(0.4)));
        assert!(!check_line_break(&f, PlayerGear::default(), &mut FixedRng(0.5)));

        f.weight_kg = 500.0;
        assert_eq!(line_break_chance(&f, PlayerGear::default()), MAX_BREAK);
    }

    #[test]
    fn infinite_break_reference_never_snaps() {
        let mut f = fish("bluegill", 1.5);
        let mut spec = (*f.species).clone();
        spec.equipment.break_ref_kg = f64::INFINITY;
        f.species = std::sync::Arc::new(spec);
        f.weight_kg = 1e9;
        assert_eq!(line_break_chance(&f, PlayerGear { rod_tier: 0, line_tier: 0 }), 0.0);
    }

    #[test]
    fn report_sums_caught_points() {
        let mut report = CatchReport::default();
        report.push(CatchOutcome::Missed { fish: FishId(1) });
        report.push(CatchOutcome::Caught(CaughtFish {
            fish: FishId(2),
            species_id: "bluegill".into(),
            name: "Bluegill".into(),
            weight_kg: 1.5,
            size_cm: 25.0,
            points: 225,
            bonus_multiplier: 1,
        }));
        report.push(CatchOutcome::LineBroke { fish: FishId(3), species_id: "pike".into() });
        assert_eq!(report.points, 225);
        assert_eq!(report.caught().count(), 1);
        assert_eq!(report.line_breaks(), 1);
        assert_eq!(report.outcomes[2].fish(), FishId(3));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["kind"], "missed");
        assert_eq!(json["outcomes"][1]["speciesId"], "bluegill");
        assert_eq!(json["outcomes"][2]["kind"], "lineBroke");
    }
}
