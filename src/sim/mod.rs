//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-locked motion (velocities are per-frame displacements)
//! - Spawn timers ticked from the frame, never from host callbacks
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids increase)
//! - No rendering or platform dependencies

pub mod collision;
pub mod pool;
pub mod pose;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, resolve_collisions};
pub use pose::{FramePose, HitTestResult, Viewport, resolve_aim};
pub use schedule::{SpawnScheduler, SpawnTimer};
pub use state::{AimPoint, Entity, EntityKind, GameEvent, GamePhase, GameState};
pub use tick::{FrameInput, tick};
