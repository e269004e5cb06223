//! JavaScript facade over [`Simulation`].
//!
//! The page owns rendering, input and the cast/reel mini-games; it drives this
//! object once per frame and reads back JSON snapshots. Errors surface as JS
//! exceptions.

use wasm_bindgen::prelude::*;

use crate::config::{PlayerGear, SimConfig};
use crate::rng::SimRng;
use crate::spawn::SpawnOptions;
use crate::species::{SpeciesCatalog, SAMPLE_CATALOG_JSON};
use crate::world::Simulation;

#[wasm_bindgen]
pub struct FishingGame {
    sim: Simulation,
}

fn make_rng(seed: Option<u32>) -> SimRng {
    match seed {
        Some(seed) => SimRng::seeded(u64::from(seed)),
        None => unseeded(),
    }
}

#[cfg(feature = "rng")]
fn unseeded() -> SimRng {
    SimRng::from_entropy()
}

#[cfg(not(feature = "rng"))]
fn unseeded() -> SimRng {
    SimRng::seeded(0)
}

#[wasm_bindgen]
impl FishingGame {
    /// Session over `catalog_json` (bare species array or `{ "species": [...] }`)
    /// with default tunables. Omit `seed` for an entropy-seeded session.
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, seed: Option<u32>) -> Result<FishingGame, JsError> {
        let catalog = SpeciesCatalog::from_json(catalog_json)?;
        let sim = Simulation::new(catalog, SimConfig::default(), make_rng(seed))?;
        Ok(FishingGame { sim })
    }

    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(catalog_json: &str, config_json: &str, seed: Option<u32>) -> Result<FishingGame, JsError> {
        let catalog = SpeciesCatalog::from_json(catalog_json)?;
        let config = SimConfig::from_json(config_json)?;
        let sim = Simulation::new(catalog, config, make_rng(seed))?;
        Ok(FishingGame { sim })
    }

    /// Session over the bundled demo species.
    #[wasm_bindgen(js_name = withSampleCatalog)]
    pub fn with_sample_catalog(seed: Option<u32>) -> Result<FishingGame, JsError> {
        FishingGame::new(SAMPLE_CATALOG_JSON, seed)
    }

    /// Returns the number of fish spawned.
    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self, cast_distance: f64, spread: bool, half_width: f64) -> usize {
        self.sim.start_round(cast_distance, SpawnOptions { spread, half_width })
    }

    #[wasm_bindgen(js_name = beginFishing)]
    pub fn begin_fishing(&mut self) -> usize {
        self.sim.begin_fishing()
    }

    #[wasm_bindgen(js_name = setBobberDistance)]
    pub fn set_bobber_distance(&mut self, distance: f64) {
        self.sim.set_bobber_distance(distance);
    }

    pub fn splash(&mut self) -> usize {
        self.sim.splash()
    }

    pub fn step(&mut self, dt: f64) {
        self.sim.step(dt);
    }

    /// JSON `CatchReport` for every circle open at the moment of the strike.
    #[wasm_bindgen(js_name = attemptCatch)]
    pub fn attempt_catch(&mut self) -> Result<String, JsError> {
        let report = self.sim.attempt_catch();
        Ok(serde_json::to_string(&report)?)
    }

    /// JSON snapshot of fish and circles for drawing.
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.sim.snapshot())?)
    }

    #[wasm_bindgen(js_name = setGear)]
    pub fn set_gear(&mut self, rod_tier: u8, line_tier: u8) {
        self.sim.set_gear(PlayerGear { rod_tier, line_tier });
    }

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    #[wasm_bindgen(js_name = roundPoints)]
    pub fn round_points(&self) -> f64 {
        self.sim.round_points() as f64
    }

    #[wasm_bindgen(js_name = fishCount)]
    pub fn fish_count(&self) -> usize {
        self.sim.world().fishes().len()
    }

    #[wasm_bindgen(js_name = activeCount)]
    pub fn active_count(&self) -> usize {
        self.sim.world().engagements().len()
    }

    #[wasm_bindgen(js_name = bobberInWater)]
    pub fn bobber_in_water(&self) -> bool {
        self.sim.world().bobber_in_water()
    }
}
