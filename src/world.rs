//! Round state and the simulation driver.
//!
//! [`World`] is the mutable state of one round: the bobber, the fish, the open
//! timing circles and the catches so far. [`Simulation`] owns a world together
//! with the static inputs (catalog, tunables, gear) and the random source, and
//! exposes the handful of events the game loop feeds it: start a round, land
//! the bobber, move it, tick, strike, reset. Rendering only reads snapshots.

use glam::DVec2;
use serde::Serialize;

use crate::catch::{self, CatchOutcome, CatchReport, CaughtFish};
use crate::config::{PlayerGear, SimConfig};
use crate::engagement::{EngagementId, EngagementManager, EngagementView};
use crate::error::{SimError, SimResult};
use crate::fish::{Fish, FishId, FishView};
use crate::rng::{RandomSource, SimRng};
use crate::scoring;
use crate::spawn::{self, SpawnOptions};
use crate::species::SpeciesCatalog;
use crate::steering::{self, SteeringContext};

// --- Round state -------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct World {
    cast_distance: f64,
    bobber_distance: f64,
    bobber_in_water: bool,
    lateral_limit: f64,
    fishes: Vec<Fish>,
    engagements: EngagementManager,
    catches: Vec<CaughtFish>,
    time: f64,
}

impl World {
    pub fn cast_distance(&self) -> f64 {
        self.cast_distance
    }

    pub fn bobber_distance(&self) -> f64 {
        self.bobber_distance
    }

    pub fn bobber(&self) -> DVec2 {
        DVec2::new(0.0, self.bobber_distance)
    }

    pub fn bobber_in_water(&self) -> bool {
        self.bobber_in_water
    }

    pub fn lateral_limit(&self) -> f64 {
        self.lateral_limit
    }

    pub fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub fn fish(&self, id: FishId) -> Option<&Fish> {
        self.fishes.iter().find(|f| f.id == id)
    }

    pub fn engagements(&self) -> &EngagementManager {
        &self.engagements
    }

    pub fn catches(&self) -> &[CaughtFish] {
        &self.catches
    }

    /// Seconds simulated since the round started.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Engaged fish and open circles point at each other one to one.
    pub fn is_consistent(&self) -> bool {
        let engaged = self.fishes.iter().filter(|f| f.is_engaged()).count();
        engaged == self.engagements.len() && self.engagements.links_consistent(&self.fishes)
    }

    /// Startle fish around `origin` (see [`steering::scatter`]).
    pub fn scatter(&mut self, origin: DVec2, radius: f64, duration: f64, rng: &mut impl RandomSource) -> usize {
        steering::scatter(&mut self.fishes, origin, radius, duration, rng)
    }

    fn clear(&mut self) {
        *self = World::default();
    }
}

/// Everything the renderer draws for one frame.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub time: f64,
    pub cast_distance: f64,
    pub bobber_distance: f64,
    pub bobber_in_water: bool,
    pub lateral_limit: f64,
    pub fishes: Vec<FishView>,
    pub engagements: Vec<EngagementView>,
    pub round_points: i64,
    pub catches: usize,
}

// --- Driver ------------------------------------------------------------------

/// A fishing session: static inputs plus the current round.
pub struct Simulation<R: RandomSource = SimRng> {
    catalog: SpeciesCatalog,
    config: SimConfig,
    gear: PlayerGear,
    world: World,
    rng: R,
}

impl<R: RandomSource> Simulation<R> {
    pub fn new(catalog: SpeciesCatalog, config: SimConfig, rng: R) -> SimResult<Self> {
        if catalog.is_empty() {
            return Err(SimError::EmptyCatalog);
        }
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            gear: PlayerGear::default(),
            world: World::default(),
            rng,
        })
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn gear(&self) -> PlayerGear {
        self.gear
    }

    pub fn set_gear(&mut self, gear: PlayerGear) {
        self.gear = gear;
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Start a new round for a cast of `cast_distance` meters. The bobber is still
    /// in flight; call [`Simulation::begin_fishing`] when it lands.
    pub fn start_round(&mut self, cast_distance: f64, options: SpawnOptions) -> usize {
        let cast = if cast_distance.is_finite() {
            cast_distance.clamp(0.0, self.config.max_cast)
        } else {
            self.config.base_cast
        };
        let options = SpawnOptions { half_width: spawn::lateral_limit(options.half_width), ..options };
        self.world.clear();

        let spawned = spawn::spawn_fishes(&self.catalog, cast, options, &self.config, &mut self.rng);
        self.world.cast_distance = cast;
        self.world.bobber_distance = cast;
        self.world.lateral_limit = spawned.lateral_limit;
        self.world.fishes = spawned.fishes;

        log::debug!(
            "round started: cast {:.1} m, {} fish, half-width {:.1}",
            cast,
            self.world.fishes.len(),
            self.world.lateral_limit
        );
        self.world.fishes.len()
    }

    /// The bobber lands at the cast distance. Nearby fish scatter from the splash.
    pub fn begin_fishing(&mut self) -> usize {
        self.world.bobber_in_water = true;
        self.world.bobber_distance = self.world.cast_distance;
        self.splash()
    }

    pub fn set_bobber_distance(&mut self, distance: f64) {
        if distance.is_finite() {
            self.world.bobber_distance = distance.max(0.0);
        }
    }

    /// Scatter fish within the splash radius of the bobber. Returns how many were startled.
    pub fn splash(&mut self) -> usize {
        let origin = self.world.bobber();
        let startled = self.world.scatter(
            origin,
            self.config.splash_radius,
            self.config.splash_duration,
            &mut self.rng,
        );
        log::trace!("splash at {:.1} m startled {} fish", origin.y, startled);
        startled
    }

    /// Advance the round by `dt` seconds, clamped to `[0, max_dt]`.
    pub fn step(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_dt) } else { 0.0 };
        if dt == 0.0 {
            return;
        }
        self.world.time += dt;

        let mut ctx = SteeringContext::new(&self.config, self.world.bobber_distance, self.world.lateral_limit);
        if !self.world.bobber_in_water {
            // fish ignore the bobber in flight; the browser build let them shy
            // from it parked at the minimum sink distance instead
            ctx.avoidance_radius = 0.0;
        }
        steering::update_fishes(&mut self.world.fishes, &ctx, dt, &mut self.rng);

        if self.world.bobber_in_water {
            self.world.engagements.update(
                &mut self.world.fishes,
                self.world.bobber_distance,
                &self.config,
                dt,
                &mut self.rng,
            );
        }
        debug_assert!(self.world.is_consistent());
    }

    /// Strike: resolve every open circle at once.
    ///
    /// All catch rolls happen before any circle is touched, so the order of
    /// engagements never changes another fish's odds. Landed fish leave the round.
    pub fn attempt_catch(&mut self) -> CatchReport {
        let rolls: Vec<(EngagementId, FishId, bool)> = self
            .world
            .engagements
            .active()
            .iter()
            .filter_map(|engagement| {
                let fish = self.world.fish(engagement.fish)?;
                Some((engagement.id, fish.id, catch::roll_catch(engagement, fish, &mut self.rng)))
            })
            .collect();

        let mut report = CatchReport::default();
        for (engagement, fish_id, hooked) in rolls {
            if !hooked {
                report.push(CatchOutcome::Missed { fish: fish_id });
                continue;
            }
            let Some(index) = self.world.fishes.iter().position(|f| f.id == fish_id) else {
                continue;
            };

            if catch::check_line_break(&self.world.fishes[index], self.gear, &mut self.rng) {
                self.world.engagements.release(
                    engagement,
                    &mut self.world.fishes,
                    self.world.bobber_distance,
                    true,
                    &mut self.rng,
                );
                let fish = &self.world.fishes[index];
                log::info!("line snapped on {} ({:.2} kg)", fish.species.id, fish.weight_kg);
                report.push(CatchOutcome::LineBroke { fish: fish_id, species_id: fish.species.id.clone() });
                continue;
            }

            self.world.engagements.release(
                engagement,
                &mut self.world.fishes,
                self.world.bobber_distance,
                false,
                &mut self.rng,
            );
            let fish = &mut self.world.fishes[index];
            fish.finished = true;
            let caught = CaughtFish {
                fish: fish.id,
                species_id: fish.species.id.clone(),
                name: fish.species.name.clone(),
                weight_kg: fish.weight_kg,
                size_cm: fish.size_cm,
                points: scoring::compute_points(fish, self.world.cast_distance, &self.config),
                bonus_multiplier: fish.bonus_multiplier,
            };
            log::info!(
                "caught {} ({:.2} kg, {:.1} cm) for {} points",
                caught.species_id,
                caught.weight_kg,
                caught.size_cm,
                caught.points
            );
            self.world.catches.push(caught.clone());
            report.push(CatchOutcome::Caught(caught));
        }

        self.world.fishes.retain(|f| !f.finished);
        debug_assert!(self.world.is_consistent());
        report
    }

    /// End the round: every fish, circle and catch is dropped.
    pub fn reset(&mut self) {
        self.world.clear();
        log::debug!("round reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        let world = &self.world;
        Snapshot {
            time: world.time,
            cast_distance: world.cast_distance,
            bobber_distance: world.bobber_distance,
            bobber_in_water: world.bobber_in_water,
            lateral_limit: world.lateral_limit,
            fishes: world.fishes.iter().map(FishView::from).collect(),
            engagements: world.engagements.views(&world.fishes, self.config.circle_base_life),
            round_points: self.round_points(),
            catches: world.catches.len(),
        }
    }

    pub fn round_points(&self) -> i64 {
        self.world.catches.iter().map(|c| c.points).sum()
    }
}
