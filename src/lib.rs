//! Fishing Arcade core crate.
//!
//! Fish steering, bobber timing circles and catch scoring for the canvas
//! fishing game. The page handles rendering, input and the cast/reel
//! mini-games; this crate owns the simulation those read from. Native callers
//! use [`Simulation`] directly; the browser goes through [`FishingGame`].

use wasm_bindgen::prelude::*;

pub mod bindings;
pub mod catch;
pub mod config;
pub mod engagement;
pub mod error;
pub mod fish;
pub mod logging;
pub mod rng;
pub mod scoring;
pub mod spawn;
pub mod species;
pub mod steering;
pub mod world;

pub use bindings::FishingGame;
pub use catch::{CatchOutcome, CatchReport, CaughtFish};
pub use config::{PlayerGear, SimConfig};
pub use error::{SimError, SimResult};
pub use fish::{Fish, FishId};
pub use rng::{RandomSource, SimRng};
pub use spawn::SpawnOptions;
pub use species::{Rarity, SpeciesCatalog, SpeciesSpec, SAMPLE_CATALOG_JSON};
pub use world::{Simulation, Snapshot, World};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a host page may have installed its own logger already
    let _ = logging::init(log::LevelFilter::Info);
}
