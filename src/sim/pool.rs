//! Asteroid and laser pools: spawning, motion and range retirement
//!
//! Pools are plain `Vec`s on `GameState`. Removal always goes through
//! `retain`, never index splicing during iteration.

use glam::{Quat, Vec3};
use rand::Rng;

use super::schedule::SpawnTicks;
use super::state::{Entity, EntityKind, GameState};
use crate::CameraBasis;
use crate::assets::{Asset, AssetGate};
use crate::tuning::{LaserOrigin, Tuning};

/// Spawn one asteroid ahead of the camera, heading for it.
///
/// Position: `spawn_distance` along forward plus a random offset inside the
/// jitter box (right, up, forward). Velocity: unit vector toward the camera
/// scaled by `asteroid_speed`.
pub fn spawn_asteroid(state: &mut GameState, camera: &CameraBasis, tuning: &Tuning) -> u32 {
    let rng = &mut state.rng;
    let jitter = Vec3::new(
        (rng.random::<f32>() - 0.5) * tuning.asteroid_jitter.x,
        (rng.random::<f32>() - 0.5) * tuning.asteroid_jitter.y,
        (rng.random::<f32>() - 0.5) * tuning.asteroid_jitter.z,
    );
    let scale = tuning.asteroid_scale_min
        + rng.random::<f32>() * (tuning.asteroid_scale_max - tuning.asteroid_scale_min);
    let spin = rng.random::<f32>() * std::f32::consts::TAU;

    let pos = camera.position
        + camera.forward * (tuning.asteroid_spawn_distance + jitter.z)
        + camera.right * jitter.x
        + camera.up * jitter.y;
    let vel = (camera.position - pos).normalize_or_zero() * tuning.asteroid_speed;

    let id = state.next_entity_id();
    let mut asteroid = Entity::new(id, EntityKind::Asteroid, pos, vel);
    asteroid.scale = scale;
    asteroid.orientation = Quat::from_rotation_y(spin);
    state.asteroids.push(asteroid);

    log::debug!("Spawned asteroid {id} at {pos:?}");
    id
}

/// Spawn one laser along the camera forward vector
pub fn spawn_laser(state: &mut GameState, camera: &CameraBasis, tuning: &Tuning) -> u32 {
    let origin = match (tuning.laser_origin, state.aim) {
        (LaserOrigin::AimPoint, Some(aim)) => aim.pos,
        _ => camera.position,
    };
    let id = state.next_entity_id();
    let mut laser = Entity::new(id, EntityKind::Laser, origin, camera.forward * tuning.laser_speed);
    laser.orientation = camera.orientation;
    state.lasers.push(laser);
    id
}

/// Spawn everything the timers fired this frame. Spawns whose model has not
/// loaded yet are skipped; the timer fire is consumed either way.
pub fn spawn_due(
    state: &mut GameState,
    ticks: SpawnTicks,
    camera: &CameraBasis,
    tuning: &Tuning,
    assets: &dyn AssetGate,
) {
    for _ in 0..ticks.asteroids {
        if assets.is_ready(Asset::AsteroidModel) {
            spawn_asteroid(state, camera, tuning);
        } else {
            log::warn!("Skipping asteroid spawn: {} not ready", Asset::AsteroidModel.as_str());
        }
    }
    for _ in 0..ticks.lasers {
        if assets.is_ready(Asset::LaserModel) {
            spawn_laser(state, camera, tuning);
        } else {
            log::warn!("Skipping laser spawn: {} not ready", Asset::LaserModel.as_str());
        }
    }
}

/// Move every live entity by its velocity (once per frame)
pub fn advance_all(state: &mut GameState) {
    for asteroid in &mut state.asteroids {
        asteroid.advance();
    }
    for laser in &mut state.lasers {
        laser.advance();
    }
}

/// Counts of entities dropped for leaving their valid range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Retired {
    pub asteroids: usize,
    pub lasers: usize,
}

/// Drop asteroids that flew past without being hit and lasers past their
/// range or depth cutoff. No score effect.
pub fn retire_out_of_range(state: &mut GameState, tuning: &Tuning) -> Retired {
    let asteroids_before = state.asteroids.len();
    state
        .asteroids
        .retain(|a| a.traveled <= tuning.asteroid_max_travel);

    let lasers_before = state.lasers.len();
    state.lasers.retain(|l| {
        let in_range = l.traveled <= tuning.laser_range;
        let above_cutoff = tuning.laser_depth_cutoff.is_none_or(|z| l.pos.z >= z);
        in_range && above_cutoff
    });

    let retired = Retired {
        asteroids: asteroids_before - state.asteroids.len(),
        lasers: lasers_before - state.lasers.len(),
    };
    if retired.asteroids > 0 {
        log::debug!("Retired {} asteroids out of range", retired.asteroids);
    }
    retired
}
