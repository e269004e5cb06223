//! Timing circles.
//!
//! A fish that swims within detection range of the bobber opens a circle that
//! tightens with proximity and shrinks on its own over time. The circle is the
//! player's window to strike: the tighter it is when the player reels, the
//! better the odds (see [`crate::catch`]). Circles close when their life runs
//! out, when they shrink to the minimum, or when the fish wanders off.
//!
//! A fish and its circle point at each other (`Fish::engagement` and
//! `Engagement::fish`); both sides are always linked and unlinked together
//! inside this module.

use glam::DVec2;
use serde::Serialize;

use crate::config::SimConfig;
use crate::fish::{Fish, FishId};
use crate::rng::RandomSource;
use crate::species::lerp;

/// Range multiplier past which a circle is scheduled to close during detection.
pub const LEAVE_HYSTERESIS: f64 = 1.2;
/// Range multiplier past which a circle is torn down during the sweep.
pub const RELEASE_HYSTERESIS: f64 = 1.3;
/// Share of the radius span proximity alone can close.
const PROXIMITY_PULL: f64 = 0.7;
const RADIUS_BLEND_RATE: f64 = 8.0;
const CLOSED_MARGIN: f64 = 0.5;
const MIN_MAX_RADIUS: f64 = 24.0;
const MIN_MIN_RADIUS: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EngagementId(pub u32);

/// An open timing circle. Radii are in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Engagement {
    pub id: EngagementId,
    pub fish: FishId,
    pub radius: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Seconds left before the circle closes on its own.
    pub life: f64,
    pub detection_range: f64,
    /// Pixels per second.
    pub shrink_rate: f64,
}

impl Engagement {
    /// Radius position in `[0, 1]`: 0 at the tightest, 1 when wide open.
    pub fn openness(&self) -> f64 {
        let span = self.max_radius - self.min_radius;
        if span > 0.0 {
            ((self.radius - self.min_radius) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn is_spent(&self) -> bool {
        self.life <= 0.0 || self.radius <= self.min_radius + CLOSED_MARGIN
    }
}

pub fn max_radius(detection_range: f64, px_per_meter: f64) -> f64 {
    (detection_range * px_per_meter * 0.4).max(MIN_MAX_RADIUS)
}

pub fn min_radius(max_radius: f64) -> f64 {
    (max_radius * 0.35).max(MIN_MIN_RADIUS)
}

pub fn shrink_rate(circle_shrink_rate: f64) -> f64 {
    15.0 + 20.0 * circle_shrink_rate
}

/// Read-only view handed to the renderer (main view and minimap draw the same state).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementView {
    pub id: EngagementId,
    pub fish: FishId,
    pub radius: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub life: f64,
    pub life_fraction: f64,
    pub color: String,
}

/// Owns the set of open circles. At most one per fish.
#[derive(Clone, Debug, Default)]
pub struct EngagementManager {
    active: Vec<Engagement>,
    next_id: u32,
}

impl EngagementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Engagement] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn get(&self, id: EngagementId) -> Option<&Engagement> {
        self.active.iter().find(|e| e.id == id)
    }

    /// Detect new circles, then advance and prune every open one.
    pub fn update(
        &mut self,
        fishes: &mut [Fish],
        bobber_distance: f64,
        config: &SimConfig,
        dt: f64,
        rng: &mut impl RandomSource,
    ) {
        self.detect(fishes, bobber_distance, config);
        self.sweep(fishes, bobber_distance, dt, rng);
    }

    /// Open circles for fish inside detection range; schedule closing for engaged
    /// fish that drifted past the leave band.
    pub fn detect(&mut self, fishes: &mut [Fish], bobber_distance: f64, config: &SimConfig) {
        let bobber = DVec2::new(0.0, bobber_distance);
        let range = config.detection_range;
        for fish in fishes.iter_mut().filter(|f| f.is_live()) {
            let dist = fish.distance_to(bobber);
            let current = fish.engagement;
            match current {
                None if dist <= range => {
                    let max_r = max_radius(range, config.px_per_meter);
                    let id = EngagementId(self.next_id);
                    self.next_id = self.next_id.wrapping_add(1);
                    self.active.push(Engagement {
                        id,
                        fish: fish.id,
                        radius: max_r,
                        min_radius: min_radius(max_r),
                        max_radius: max_r,
                        life: config.circle_base_life,
                        detection_range: range,
                        shrink_rate: shrink_rate(fish.species.behavior.circle_shrink_rate),
                    });
                    fish.engagement = Some(id);
                    log::trace!("fish {:?} engaged at {:.2} m ({:?})", fish.id, dist, id);
                }
                Some(id) if dist <= range => {
                    if let Some(active) = self.active.iter_mut().find(|e| e.id == id) {
                        active.detection_range = range;
                    }
                }
                Some(id) if dist > range * LEAVE_HYSTERESIS => {
                    if let Some(active) = self.active.iter_mut().find(|e| e.id == id) {
                        active.life = active.life.min(0.0);
                    }
                }
                _ => {}
            }
        }
    }

    /// Advance every open circle by `dt` and close the spent ones.
    pub fn sweep(&mut self, fishes: &mut [Fish], bobber_distance: f64, dt: f64, rng: &mut impl RandomSource) {
        let bobber = DVec2::new(0.0, bobber_distance);
        let blend = (dt * RADIUS_BLEND_RATE).clamp(0.0, 1.0);
        let mut kept = Vec::with_capacity(self.active.len());

        for mut active in std::mem::take(&mut self.active) {
            let Some(fish) = fishes.iter_mut().find(|f| f.id == active.fish) else {
                log::trace!("{:?} dropped, fish {:?} is gone", active.id, active.fish);
                continue;
            };
            if fish.finished {
                unlink(fish, active.id);
                continue;
            }

            let dist = fish.distance_to(bobber);
            if dist > active.detection_range * RELEASE_HYSTERESIS {
                unlink(fish, active.id);
                retreat(fish, bobber_distance, rng);
                log::trace!("fish {:?} swam out of {:?}", fish.id, active.id);
                continue;
            }

            let proximity = if active.detection_range > 0.0 {
                (1.0 - dist / active.detection_range).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let target = lerp(active.max_radius, active.min_radius, proximity * PROXIMITY_PULL);
            active.radius += (target - active.radius) * blend;
            active.radius = active.radius.clamp(active.min_radius, active.max_radius);
            active.radius = (active.radius - active.shrink_rate * dt).max(active.min_radius);
            active.life -= dt;

            if active.is_spent() {
                unlink(fish, active.id);
                retreat(fish, bobber_distance, rng);
                log::trace!("{:?} closed on fish {:?}", active.id, fish.id);
            } else {
                kept.push(active);
            }
        }
        self.active = kept;
    }

    /// Close one circle. With `retreat` the fish bolts away from the bobber; without
    /// it (a catch, a removal) its motion is left untouched.
    pub fn release(
        &mut self,
        id: EngagementId,
        fishes: &mut [Fish],
        bobber_distance: f64,
        retreat_fish: bool,
        rng: &mut impl RandomSource,
    ) -> bool {
        let Some(index) = self.active.iter().position(|e| e.id == id) else {
            return false;
        };
        let active = self.active.remove(index);
        if let Some(fish) = fishes.iter_mut().find(|f| f.id == active.fish) {
            unlink(fish, id);
            if retreat_fish && !fish.finished {
                retreat(fish, bobber_distance, rng);
            }
        }
        true
    }

    /// Close every circle without touching fish motion (round reset).
    pub fn clear(&mut self, fishes: &mut [Fish]) {
        for active in self.active.drain(..) {
            if let Some(fish) = fishes.iter_mut().find(|f| f.id == active.fish) {
                unlink(fish, active.id);
            }
        }
    }

    pub fn views(&self, fishes: &[Fish], base_life: f64) -> Vec<EngagementView> {
        self.active
            .iter()
            .map(|e| EngagementView {
                id: e.id,
                fish: e.fish,
                radius: e.radius,
                min_radius: e.min_radius,
                max_radius: e.max_radius,
                life: e.life,
                life_fraction: if base_life > 0.0 { (e.life / base_life).clamp(0.0, 1.0) } else { 0.0 },
                color: fishes
                    .iter()
                    .find(|f| f.id == e.fish)
                    .map(|f| f.species.color().to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// True when every circle belongs to exactly one live fish that points back at it,
    /// and no other fish claims a circle.
    pub fn links_consistent(&self, fishes: &[Fish]) -> bool {
        let forward = self.active.iter().all(|e| {
            fishes
                .iter()
                .filter(|f| f.id == e.fish)
                .all(|f| f.engagement == Some(e.id) && f.is_live())
                && self.active.iter().filter(|o| o.fish == e.fish).count() == 1
        });
        let backward = fishes
            .iter()
            .filter_map(|f| f.engagement)
            .all(|id| self.get(id).is_some());
        forward && backward
    }
}

fn unlink(fish: &mut Fish, id: EngagementId) {
    if fish.engagement == Some(id) {
        fish.engagement = None;
    }
}

/// Send a disengaging fish away from the bobber and keep it wary for a moment.
pub fn retreat(fish: &mut Fish, bobber_distance: f64, rng: &mut impl RandomSource) {
    let away = fish.position - DVec2::new(0.0, bobber_distance);
    let heading = away.y.atan2(away.x) + rng.range_f64(-0.45, 0.45);
    let speed = fish.swim_speed * rng.range_f64(1.2, 1.6) * fish.personality;
    fish.target_velocity = DVec2::new(heading.cos() * speed, heading.sin() * speed * 0.7);
    fish.velocity = fish.target_velocity;
    fish.escape_timer = rng.range_f64(1.0, 2.0);
    fish.stress = (fish.stress + 0.3).min(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;
    use crate::species::{SpeciesCatalog, SAMPLE_CATALOG_JSON};

    const DT: f64 = 1.0 / 30.0;

    fn fish_at(id: u32, x: f64, y: f64) -> Fish {
        let catalog = SpeciesCatalog::from_json(SAMPLE_CATALOG_JSON).unwrap();
        let spec = catalog.get("bluegill").unwrap().clone();
        let mut rng = SimRng::seeded(id as u64);
        Fish::new(FishId(id), spec, 1.5, 25.0, x, y, 32.0, &mut rng)
    }

    #[test]
    fn radius_bounds_follow_pixel_metric() {
        assert_eq!(max_radius(5.0, 4.0), 24.0);
        assert_eq!(min_radius(24.0), 12.0);
        assert_eq!(max_radius(5.0, 40.0), 80.0);
        assert_eq!(min_radius(80.0), 28.0);
        assert_eq!(shrink_rate(1.0), 35.0);
    }

    #[test]
    fn fish_in_range_opens_a_single_circle() {
        let config = SimConfig::default();
        let mut fishes = vec![fish_at(0, 1.0, 102.0), fish_at(1, 0.0, 150.0)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);
        manager.detect(&mut fishes, 100.0, &config);
        assert_eq!(manager.len(), 1);
        assert!(fishes[0].is_engaged());
        assert!(!fishes[1].is_engaged());
        let active = &manager.active()[0];
        assert_eq!(active.fish, FishId(0));
        assert_eq!(active.radius, active.max_radius);
        assert_eq!(active.life, config.circle_base_life);
        assert!(manager.links_consistent(&fishes));
    }

    #[test]
    fn release_boundary_is_exclusive() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(3);
        let mut fishes = vec![fish_at(0, 0.0, 102.0)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);

        fishes[0].position.y = 100.0 + config.detection_range * RELEASE_HYSTERESIS;
        manager.sweep(&mut fishes, 100.0, DT, &mut rng);
        assert_eq!(manager.len(), 1, "exactly on the boundary must stay engaged");

        fishes[0].position.y += 1e-9;
        manager.sweep(&mut fishes, 100.0, DT, &mut rng);
        assert!(manager.is_empty());
        assert!(!fishes[0].is_engaged());
        assert!(fishes[0].escape_timer >= 1.0);
    }

    #[test]
    fn leaving_the_band_schedules_close() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(4);
        let mut fishes = vec![fish_at(0, 0.0, 103.0)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);
        fishes[0].position.y = 106.2;
        manager.detect(&mut fishes, 100.0, &config);
        assert!(manager.active()[0].life <= 0.0);
        assert!(fishes[0].is_engaged(), "closing waits for the sweep");
        manager.sweep(&mut fishes, 100.0, DT, &mut rng);
        assert!(manager.is_empty());
        assert!(!fishes[0].is_engaged());
    }

    #[test]
    fn circle_shrinks_even_when_fish_holds_still() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(5);
        let mut fishes = vec![fish_at(0, 0.0, 104.9)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);
        let mut last = manager.active()[0].radius;
        for _ in 0..5 {
            manager.sweep(&mut fishes, 100.0, DT, &mut rng);
            let Some(active) = manager.active().first() else { break };
            assert!(active.radius < last);
            assert!(active.radius >= active.min_radius);
            last = active.radius;
        }
    }

    #[test]
    fn circle_closes_at_minimum_and_fish_retreats() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(6);
        let mut fishes = vec![fish_at(0, 0.0, 100.5)];
        let mut manager = EngagementManager::new();
        for _ in 0..120 {
            manager.update(&mut fishes, 100.0, &config, DT, &mut rng);
            assert!(manager.links_consistent(&fishes));
            if !fishes[0].is_engaged() {
                break;
            }
        }
        assert!(!fishes[0].is_engaged());
        assert!(fishes[0].stress >= 0.3);
        assert!(fishes[0].velocity.length() > 0.0);
    }

    #[test]
    fn finished_fish_release_without_retreat() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(7);
        let mut fishes = vec![fish_at(0, 0.0, 101.0)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);
        fishes[0].finished = true;
        manager.sweep(&mut fishes, 100.0, DT, &mut rng);
        assert!(manager.is_empty());
        assert!(!fishes[0].is_engaged());
        assert_eq!(fishes[0].velocity, DVec2::ZERO);
        assert_eq!(fishes[0].stress, 0.0);
    }

    #[test]
    fn explicit_release_unlinks_both_sides() {
        let config = SimConfig::default();
        let mut rng = SimRng::seeded(8);
        let mut fishes = vec![fish_at(0, 0.0, 101.0), fish_at(1, 1.0, 99.0)];
        let mut manager = EngagementManager::new();
        manager.detect(&mut fishes, 100.0, &config);
        assert_eq!(manager.len(), 2);
        let id = fishes[0].engagement().unwrap();
        assert!(manager.release(id, &mut fishes, 100.0, false, &mut rng));
        assert!(!manager.release(id, &mut fishes, 100.0, false, &mut rng));
        assert_eq!(manager.len(), 1);
        assert!(!fishes[0].is_engaged());
        assert!(fishes[1].is_engaged());
        assert!(manager.links_consistent(&fishes));

        manager.clear(&mut fishes);
        assert!(manager.is_empty());
        assert!(fishes.iter().all(|f| !f.is_engaged()));
    }

    #[test]
    fn retreat_heads_away_from_bobber() {
        let mut fish = fish_at(0, 0.0, 110.0);
        let mut rng = SimRng::seeded(9);
        retreat(&mut fish, 100.0, &mut rng);
        // heading is straight down-range +-0.45 rad, so the y component stays positive
        assert!(fish.target_velocity.y > 0.0);
        assert_eq!(fish.velocity, fish.target_velocity);
        assert!((1.0..2.0).contains(&fish.escape_timer));
        assert!((fish.stress - 0.3).abs() < 1e-12);
    }
}
