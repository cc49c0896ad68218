//! Collision resolution between lasers, asteroids and the player
//!
//! Both passes only mark entities; removals are applied afterwards in one
//! `retain` per pool so no pool is mutated while it is being walked.

use glam::Vec3;

use super::state::{GameEvent, GameState};
use crate::tuning::{ReachPolicy, Tuning};

/// What one resolution pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Laser/asteroid pairs destroyed
    pub hits: u32,
    /// Asteroids that got inside the near field
    pub reached: u32,
}

/// Keep the elements whose flag is false, preserving order
fn drop_flagged<T>(items: &mut Vec<T>, flags: &[bool]) {
    let mut i = 0;
    items.retain(|_| {
        let keep = !flags[i];
        i += 1;
        keep
    });
}

/// Resolve all collisions for this frame (after entities have moved).
///
/// Each laser destroys at most the first live asteroid within
/// `hit_threshold`, in pool order; one asteroid is never credited to two
/// lasers. Surviving asteroids within `near_field` of `player` are then
/// handled according to `reach_policy`.
pub fn resolve_collisions(state: &mut GameState, player: Vec3, tuning: &Tuning) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let mut asteroid_dead = vec![false; state.asteroids.len()];
    let mut laser_dead = vec![false; state.lasers.len()];

    // --- LASER vs ASTEROID ---
    for (li, laser) in state.lasers.iter().enumerate() {
        let hit = state
            .asteroids
            .iter()
            .enumerate()
            .find(|(ai, asteroid)| {
                !asteroid_dead[*ai] && laser.pos.distance(asteroid.pos) < tuning.hit_threshold
            });

        if let Some((ai, asteroid)) = hit {
            asteroid_dead[ai] = true;
            laser_dead[li] = true;
            outcome.hits += 1;
            state.score += 1;
            state.events.push(GameEvent::Hit {
                laser_id: laser.id,
                asteroid_id: asteroid.id,
                pos: asteroid.pos,
            });
            log::debug!("Laser {} hit asteroid {}", laser.id, asteroid.id);
        }
    }

    // --- ASTEROID vs PLAYER ---
    if tuning.reach_policy != ReachPolicy::Unchecked {
        for (ai, asteroid) in state.asteroids.iter().enumerate() {
            if asteroid_dead[ai] || asteroid.distance_to(player) >= tuning.near_field {
                continue;
            }
            asteroid_dead[ai] = true;
            outcome.reached += 1;
            if tuning.reach_policy == ReachPolicy::Penalize {
                state.score -= 1;
            }
            state.events.push(GameEvent::AsteroidReachedPlayer {
                asteroid_id: asteroid.id,
            });
            log::debug!("Asteroid {} reached the player", asteroid.id);
        }
    }

    drop_flagged(&mut state.asteroids, &asteroid_dead);
    drop_flagged(&mut state.lasers, &laser_dead);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Entity, EntityKind};
    use proptest::prelude::*;

    fn laser(id: u32, pos: Vec3) -> Entity {
        Entity::new(id, EntityKind::Laser, pos, Vec3::ZERO)
    }

    fn asteroid(id: u32, pos: Vec3) -> Entity {
        Entity::new(id, EntityKind::Asteroid, pos, Vec3::ZERO)
    }

    fn far() -> Vec3 {
        Vec3::new(0.0, 0.0, 100.0)
    }

    #[test]
    fn test_close_pair_is_destroyed() {
        let mut state = GameState::new(1);
        state.lasers.push(laser(1, Vec3::new(0.0, 0.0, -2.0)));
        state.asteroids.push(asteroid(2, Vec3::new(0.1, 0.0, -2.0)));

        let outcome = resolve_collisions(&mut state, far(), &Tuning::default());
        assert_eq!(outcome, CollisionOutcome { hits: 1, reached: 0 });
        assert!(state.lasers.is_empty());
        assert!(state.asteroids.is_empty());
        assert_eq!(state.score, 1);
        let hits: Vec<_> = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Hit { .. }))
            .collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_other_entities_untouched() {
        let mut state = GameState::new(1);
        state.lasers.push(laser(1, Vec3::new(5.0, 0.0, 0.0)));
        state.lasers.push(laser(2, Vec3::new(0.0, 0.0, -2.0)));
        state.asteroids.push(asteroid(3, Vec3::new(-5.0, 0.0, 0.0)));
        state.asteroids.push(asteroid(4, Vec3::new(0.0, 0.05, -2.0)));
        let before_survivors = (state.lasers[0].clone(), state.asteroids[0].clone());

        resolve_collisions(&mut state, far(), &Tuning::default());
        assert_eq!(state.lasers, vec![before_survivors.0]);
        assert_eq!(state.asteroids, vec![before_survivors.1]);
    }

    #[test]
    fn test_one_laser_one_asteroid_per_frame() {
        let mut state = GameState::new(1);
        let spot = Vec3::new(0.0, 0.0, -2.0);
        state.lasers.push(laser(1, spot));
        state.asteroids.push(asteroid(2, spot));
        state.asteroids.push(asteroid(3, spot + Vec3::X * 0.05));

        let outcome = resolve_collisions(&mut state, far(), &Tuning::default());
        assert_eq!(outcome.hits, 1);
        assert_eq!(state.score, 1);
        // First match in pool order is consumed; the other waits for next frame
        assert_eq!(state.asteroids.len(), 1);
        assert_eq!(state.asteroids[0].id, 3);
    }

    #[test]
    fn test_two_lasers_one_asteroid() {
        let mut state = GameState::new(1);
        let spot = Vec3::new(0.0, 0.0, -2.0);
        state.lasers.push(laser(1, spot));
        state.lasers.push(laser(2, spot));
        state.asteroids.push(asteroid(3, spot));

        let outcome = resolve_collisions(&mut state, far(), &Tuning::default());
        assert_eq!(outcome.hits, 1);
        assert_eq!(state.score, 1);
        assert_eq!(state.lasers.len(), 1);
        assert_eq!(state.lasers[0].id, 2);
    }

    #[test]
    fn test_reach_penalizes_without_explosion() {
        let mut state = GameState::new(1);
        state.asteroids.push(asteroid(1, Vec3::new(0.0, 0.0, -0.3)));

        let outcome = resolve_collisions(&mut state, Vec3::ZERO, &Tuning::default());
        assert_eq!(outcome, CollisionOutcome { hits: 0, reached: 1 });
        assert!(state.asteroids.is_empty());
        assert_eq!(state.score, -1);
        assert_eq!(
            state.events,
            vec![GameEvent::AsteroidReachedPlayer { asteroid_id: 1 }]
        );
    }

    #[test]
    fn test_reach_policies() {
        let tuning = Tuning {
            reach_policy: ReachPolicy::Ignore,
            ..Tuning::default()
        };
        let mut state = GameState::new(1);
        state.asteroids.push(asteroid(1, Vec3::new(0.0, 0.0, -0.3)));
        resolve_collisions(&mut state, Vec3::ZERO, &tuning);
        assert!(state.asteroids.is_empty());
        assert_eq!(state.score, 0);

        let tuning = Tuning {
            reach_policy: ReachPolicy::Unchecked,
            ..Tuning::default()
        };
        let mut state = GameState::new(1);
        state.asteroids.push(asteroid(1, Vec3::new(0.0, 0.0, -0.3)));
        resolve_collisions(&mut state, Vec3::ZERO, &tuning);
        assert_eq!(state.asteroids.len(), 1);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_hit_takes_priority_over_reach() {
        let mut state = GameState::new(1);
        let spot = Vec3::new(0.0, 0.0, -0.2);
        state.lasers.push(laser(1, spot));
        state.asteroids.push(asteroid(2, spot));

        resolve_collisions(&mut state, Vec3::ZERO, &Tuning::default());
        assert_eq!(state.score, 1);
        assert_eq!(state.events.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_distant_pairs_change_nothing(
            dx in -1.0f32..1.0,
            dy in -1.0f32..1.0,
            dz in -1.0f32..1.0,
            threshold in 0.05f32..0.5,
        ) {
            let offset = Vec3::new(dx, dy, dz);
            prop_assume!(offset.length() >= threshold * 1.001);

            let tuning = Tuning { hit_threshold: threshold, ..Tuning::default() };
            let mut state = GameState::new(1);
            let base = Vec3::new(0.0, 0.0, -3.0);
            state.lasers.push(laser(1, base));
            state.asteroids.push(asteroid(2, base + offset));
            let before = (state.lasers.clone(), state.asteroids.clone());

            let outcome = resolve_collisions(&mut state, far(), &tuning);
            prop_assert_eq!(outcome, CollisionOutcome::default());
            prop_assert_eq!(state.score, 0);
            prop_assert_eq!((state.lasers, state.asteroids), before);
            prop_assert!(state.events.is_empty());
        }
    }
}
