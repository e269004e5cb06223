//! Per-tick fish movement.
//!
//! Every live fish picks a desired velocity from a priority cascade
//! (alert scatter, then wander, overridden by bobber avoidance or a lingering
//! escape drift), eases its actual velocity toward it with a frame-rate
//! independent low-pass, integrates, and is then contained inside the play
//! field. Fish never read each other's state, so update order does not matter.

use glam::DVec2;

use crate::config::SimConfig;
use crate::fish::Fish;
use crate::rng::RandomSource;
use crate::spawn;

const STRESS_RISE_PER_SEC: f64 = 0.45;
const STRESS_DECAY_PER_SEC: f64 = 0.2;
const MIN_SWIM_SPEED: f64 = 0.5;
const WANDER_SPEED_FACTOR: f64 = 0.6;
const WANDER_VERTICAL_FACTOR: f64 = 0.55;
const IDLE_REROLL_CHANCE: f64 = 0.4;
const ALERT_VERTICAL_FACTOR: f64 = 0.7;
const AVOID_VERTICAL_FACTOR: f64 = 0.75;
const ESCAPE_DRIFT_FACTOR: f64 = 0.9;
const ESCAPE_VERTICAL_DAMPING: f64 = 0.7;
const FACING_DEADZONE: f64 = 0.05;
const MIN_VERTICAL_BAND: f64 = 8.0;
const MIN_BOUNCE_SPEED: f64 = 3.0;
const SOFT_REBOUND: f64 = -0.3;
const REST_SPEED_SQ: f64 = 0.01;
const MOVING_SPEED_SQ: f64 = 0.04;

/// Everything a fish needs to know about the world for one tick.
#[derive(Clone, Copy, Debug)]
pub struct SteeringContext {
    pub bobber: DVec2,
    pub avoidance_radius: f64,
    pub lateral_limit: f64,
    pub water_min: f64,
    pub water_max: f64,
    pub vertical_escape_mult: f64,
}

impl SteeringContext {
    pub fn new(config: &SimConfig, bobber_distance: f64, lateral_limit: f64) -> Self {
        let lateral_limit = spawn::lateral_limit(lateral_limit);
        Self {
            bobber: DVec2::new(0.0, config.bobber_reaction_distance(bobber_distance)),
            avoidance_radius: config.avoidance_radius,
            lateral_limit,
            water_min: config.water_min,
            water_max: config.water_max,
            vertical_escape_mult: config.vertical_escape_mult,
        }
    }
}

/// Exponential smoothing factor for a ~9 Hz response, independent of frame rate.
pub fn velocity_smoothing(dt: f64) -> f64 {
    1.0 - 0.001f64.powf(dt * 9.0)
}

pub fn update_fishes(fishes: &mut [Fish], ctx: &SteeringContext, dt: f64, rng: &mut impl RandomSource) {
    for fish in fishes.iter_mut().filter(|f| f.is_live()) {
        step_fish(fish, ctx, dt, rng);
    }
}

/// Advance one fish by `dt` seconds.
pub fn step_fish(fish: &mut Fish, ctx: &SteeringContext, dt: f64, rng: &mut impl RandomSource) {
    fish.escape_timer = (fish.escape_timer - dt).max(0.0);
    fish.alert_timer = (fish.alert_timer - dt).max(0.0);
    if fish.alert_timer <= 0.0 {
        fish.alert_vector = None;
    }

    let offset = fish.position - ctx.bobber;
    let dist = offset.length();
    let avoiding = dist < ctx.avoidance_radius;
    fish.stress = if avoiding {
        (fish.stress + dt * STRESS_RISE_PER_SEC).min(1.0)
    } else {
        (fish.stress - dt * STRESS_DECAY_PER_SEC).max(0.0)
    };

    let speed = (fish.swim_speed * fish.personality).max(MIN_SWIM_SPEED);
    fish.target_velocity = desired_velocity(fish, offset, dist, avoiding, speed, dt, rng);

    fish.velocity += (fish.target_velocity - fish.velocity) * velocity_smoothing(dt);
    if fish.velocity.x.abs() > FACING_DEADZONE {
        fish.facing_right = fish.velocity.x > 0.0;
    }

    fish.position += fish.velocity * dt;
    contain(fish, ctx, speed);

    let speed_sq = fish.velocity.length_squared();
    if speed_sq < REST_SPEED_SQ && (!fish.moving || fish.target_velocity == DVec2::ZERO) {
        fish.velocity = DVec2::ZERO;
    }
    fish.moving = speed_sq > MOVING_SPEED_SQ;

    recover_non_finite(fish);
}

fn desired_velocity(
    fish: &mut Fish,
    offset: DVec2,
    dist: f64,
    avoiding: bool,
    speed: f64,
    dt: f64,
    rng: &mut impl RandomSource,
) -> DVec2 {
    if let Some(dir) = fish.alert_vector.filter(|_| fish.alert_timer > 0.0) {
        fish.moving = true;
        fish.escape_timer = fish.escape_timer.max(fish.alert_timer);
        return DVec2::new(dir.x * speed, dir.y * speed * ALERT_VERTICAL_FACTOR);
    }

    let mut desired = fish.target_velocity;

    fish.wander_timer -= dt;
    if fish.wander_timer <= 0.0 || (!fish.moving && rng.chance(IDLE_REROLL_CHANCE)) {
        fish.wander_timer = rng.range_f64(0.8, 1.8);
        desired = if rng.chance(fish.move_bias) {
            let heading = rng.angle();
            let wander = speed * WANDER_SPEED_FACTOR;
            DVec2::new(heading.cos() * wander, heading.sin() * wander * WANDER_VERTICAL_FACTOR)
        } else {
            DVec2::ZERO
        };
    }

    if avoiding {
        let away = away_from(offset, dist, rng);
        let avoid_speed = speed * (0.8 + fish.stress * 0.6);
        desired = DVec2::new(away.x * avoid_speed, away.y * avoid_speed * AVOID_VERTICAL_FACTOR);
        fish.wander_timer = fish.wander_timer.min(0.5);
    } else if fish.escape_timer > 0.0 {
        let side = if offset.x != 0.0 { offset.x.signum() } else { rng.sign() };
        desired.x = side * speed * ESCAPE_DRIFT_FACTOR;
        desired.y *= ESCAPE_VERTICAL_DAMPING;
    }

    desired
}

/// Unit vector from the bobber toward the fish; a random heading when they coincide.
pub(crate) fn away_from(offset: DVec2, dist: f64, rng: &mut impl RandomSource) -> DVec2 {
    if dist > f64::EPSILON {
        offset / dist
    } else {
        DVec2::from_angle(rng.angle())
    }
}

/// Keep the fish inside its vertical home band and the lateral play field.
fn contain(fish: &mut Fish, ctx: &SteeringContext, speed: f64) {
    let home = fish.home_y.clamp(ctx.water_min, ctx.water_max);
    fish.home_y = home;
    let escape_mult = if fish.escape_timer > 0.0 { ctx.vertical_escape_mult } else { 1.0 };
    let permitted = (fish.vertical_range * escape_mult).max(MIN_VERTICAL_BAND);
    let min_y = (home - permitted).clamp(ctx.water_min, ctx.water_max);
    let max_y = (home + permitted).clamp(ctx.water_min, ctx.water_max);

    let mut clamped = false;
    if fish.position.y < min_y {
        fish.position.y = min_y;
        clamped = true;
    }
    if fish.position.y > max_y {
        fish.position.y = max_y;
        clamped = true;
    }

    let limit = ctx.lateral_limit;
    let mut bounced = false;
    if fish.position.x < -limit {
        fish.position.x = -limit;
        bounced = true;
    }
    if fish.position.x > limit {
        fish.position.x = limit;
        bounced = true;
    }

    if bounced {
        let toward_center = if fish.position.x > 0.0 { -1.0 } else { 1.0 };
        let bounce = (fish.velocity.x.abs() * 0.5 + speed * 0.6).max(MIN_BOUNCE_SPEED);
        fish.target_velocity.x = toward_center * bounce;
        fish.velocity.x = fish.target_velocity.x;
        fish.moving = true;
    } else if clamped {
        fish.target_velocity *= SOFT_REBOUND;
    }
}

fn recover_non_finite(fish: &mut Fish) {
    let finite = fish.position.is_finite() && fish.velocity.is_finite() && fish.target_velocity.is_finite();
    debug_assert!(finite, "fish {:?} produced a non-finite state", fish.id);
    if !finite {
        log::warn!("fish {:?} produced a non-finite state, resetting to home", fish.id);
        fish.position = DVec2::new(0.0, fish.home_y);
        fish.velocity = DVec2::ZERO;
        fish.target_velocity = DVec2::ZERO;
        fish.moving = false;
    }
}

/// Startle every live fish within `radius` of `origin` away from it for `duration` seconds.
pub fn scatter(
    fishes: &mut [Fish],
    origin: DVec2,
    radius: f64,
    duration: f64,
    rng: &mut impl RandomSource,
) -> usize {
    let mut startled = 0;
    for fish in fishes.iter_mut().filter(|f| f.is_live()) {
        let offset = fish.position - origin;
        let dist = offset.length();
        if dist <= radius {
            fish.alert_vector = Some(away_from(offset, dist, rng));
            fish.alert_timer = fish.alert_timer.max(duration);
            startled += 1;
        }
    }
    startled
}
