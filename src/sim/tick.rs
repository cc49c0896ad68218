//! Per-frame simulation step
//!
//! Core game loop: pose → aim → phase → motion → spawns → collisions →
//! retirement. Called once per display refresh by the host.

use super::collision::resolve_collisions;
use super::pool::{advance_all, retire_out_of_range, spawn_due};
use super::pose::{FramePose, HitTestResult, resolve_aim};
use super::state::GameState;
use crate::assets::AssetGate;
use crate::tuning::{AimMode, Tuning};

/// Everything the host samples for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Host timestamp (ms, monotonic)
    pub time_ms: f64,
    /// Camera pose; None while tracking is lost
    pub pose: Option<FramePose>,
    /// Hit-test results for this frame (empty if unsupported or unresolved)
    pub hits: Vec<HitTestResult>,
    /// Device left/right tilt in degrees, if the host reports it
    pub tilt_gamma_deg: Option<f32>,
}

/// Advance the game state by one frame.
///
/// Returns false when the frame was skipped (session ended or no pose); a
/// skipped frame mutates nothing.
pub fn tick(
    state: &mut GameState,
    input: &FrameInput,
    tuning: &Tuning,
    assets: &dyn AssetGate,
) -> bool {
    if state.ended {
        return false;
    }

    // Tracking lost: recoverable, skip everything that depends on the pose
    let Some(pose) = input.pose.as_ref() else {
        return false;
    };

    state.frames += 1;
    state.camera = Some(*pose);
    let camera = pose.basis();

    // --- AIM ---
    let resolution = resolve_aim(pose, &input.hits, state.aim, input.tilt_gamma_deg, tuning);
    state.aim = resolution.aim;
    state.reticle_visible = match tuning.aim_mode {
        AimMode::HitTest => !input.hits.is_empty(),
        AimMode::FixedOffset => true,
    };

    // --- PHASE ---
    if resolution.anchored {
        state.mark_stabilized();
    }
    if state.stabilized() && !state.game_started() {
        state.start(
            input.time_ms,
            tuning.asteroid_spawn_interval_ms,
            tuning.laser_spawn_interval_ms,
        );
    }
    if !state.game_started() {
        return true;
    }

    // --- MOTION ---
    advance_all(state);

    // --- SPAWNS ---
    let ticks = state
        .scheduler
        .poll(input.time_ms, tuning.max_spawn_catch_up);
    spawn_due(state, ticks, &camera, tuning, assets);

    // --- COLLISIONS ---
    resolve_collisions(state, camera.position, tuning);

    // --- RETIREMENT ---
    retire_out_of_range(state, tuning);

    true
}
