//! Presentation interface
//!
//! The sim never renders or plays audio. After each frame the session hands
//! the presenter a read-only snapshot, then the discrete cue events.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::error::SessionError;
use crate::sim::{AimPoint, Entity, EntityKind, FramePose, GamePhase, GameState};

/// Receiver for per-frame state and one-shot cues
pub trait Presenter {
    /// Called once per simulated frame, before the frame's cue events
    fn on_frame_update(&mut self, snapshot: &FrameSnapshot<'_>);

    fn on_stabilized(&mut self) {}

    fn on_game_started(&mut self) {}

    /// A laser destroyed an asteroid at `pos`. Must restart the explosion
    /// cue if it is already playing.
    fn on_hit(&mut self, _pos: Vec3) {}

    fn on_asteroid_reached_player(&mut self) {}

    /// Session could not be established (fatal)
    fn on_session_error(&mut self, _error: &SessionError) {}

    fn on_session_ended(&mut self) {}
}

/// Read-only view of the state after a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub score: i64,
    pub aim: Option<AimPoint>,
    pub reticle_visible: bool,
    /// Camera pose the entities should be drawn from
    pub camera: Option<FramePose>,
    pub asteroids: &'a [Entity],
    pub lasers: &'a [Entity],
}

impl<'a> FrameSnapshot<'a> {
    pub fn from_state(state: &'a GameState) -> Self {
        Self {
            phase: state.phase,
            score: state.score,
            aim: state.aim,
            reticle_visible: state.reticle_visible,
            camera: state.camera,
            asteroids: &state.asteroids,
            lasers: &state.lasers,
        }
    }

    /// Per-entity GPU instance data, asteroids first
    pub fn instances(&self) -> Vec<InstanceRaw> {
        self.asteroids
            .iter()
            .chain(self.lasers.iter())
            .map(InstanceRaw::from_entity)
            .collect()
    }

    /// Camera matrices plus instances; None before the first pose
    pub fn render_frame(&self) -> Option<RenderFrame> {
        let camera = self.camera?;
        Some(RenderFrame {
            view: camera.transform.inverse().to_cols_array(),
            projection: camera.projection.to_cols_array(),
            instances: self.instances(),
        })
    }
}

/// Instance buffer entry for the host renderer. All `f32` so the page can
/// read the buffer through a single `Float32Array`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    /// 0 = asteroid, 1 = laser
    pub kind: f32,
    pub _pad: [f32; 3],
}

impl InstanceRaw {
    /// Floats per instance in the flat buffer
    pub const FLOATS: usize = std::mem::size_of::<InstanceRaw>() / std::mem::size_of::<f32>();
    /// Offset of `kind` within an instance
    pub const KIND_OFFSET: usize = 16;
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Column-major world-to-camera matrix
    pub view: [f32; 16],
    /// Column-major projection matrix
    pub projection: [f32; 16],
    pub instances: Vec<InstanceRaw>,
}

impl RenderFrame {
    /// Instances as one flat float buffer, `InstanceRaw::FLOATS` per entity
    pub fn instance_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl InstanceRaw {
    pub fn from_entity(entity: &Entity) -> Self {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(entity.scale),
            entity.orientation,
            entity.pos,
        );
        Self {
            model: model.to_cols_array_2d(),
            kind: match entity.kind {
                EntityKind::Asteroid => 0.0,
                EntityKind::Laser => 1.0,
            },
            _pad: [0.0; 3],
        }
    }
}

/// What the DOM overlay should show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudState {
    pub score_text: String,
    pub stabilized: bool,
    pub running: bool,
}

impl HudState {
    /// CSS class toggled on `<body>` once tracking has stabilized
    pub const STABILIZED_CLASS: &'static str = "stabilized";
    /// CSS class toggled on `<body>` while spawning is active
    pub const RUNNING_CLASS: &'static str = "running";

    pub fn from_snapshot(snapshot: &FrameSnapshot<'_>) -> Self {
        Self {
            score_text: snapshot.score.to_string(),
            stabilized: snapshot.phase >= GamePhase::Stabilized,
            running: snapshot.phase == GamePhase::Running,
        }
    }

    /// Fields that differ from `previous`, so the DOM is only touched on change
    pub fn changes_since(&self, previous: &HudState) -> HudChanges<'_> {
        HudChanges {
            score_text: (self.score_text != previous.score_text).then_some(self.score_text.as_str()),
            add_classes: [
                (self.stabilized && !previous.stabilized).then_some(Self::STABILIZED_CLASS),
                (self.running && !previous.running).then_some(Self::RUNNING_CLASS),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

/// Minimal DOM update for one frame. Classes are only ever added; the
/// phase never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudChanges<'a> {
    pub score_text: Option<&'a str>,
    pub add_classes: Vec<&'static str>,
}

impl HudChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.score_text.is_none() && self.add_classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_instances_carry_transform() {
        let mut state = GameState::new(1);
        let mut asteroid = Entity::new(1, EntityKind::Asteroid, Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        asteroid.scale = 2.0;
        state.asteroids.push(asteroid);
        state
            .lasers
            .push(Entity::new(2, EntityKind::Laser, Vec3::ZERO, Vec3::NEG_Z));

        let snapshot = FrameSnapshot::from_state(&state);
        let instances = snapshot.instances();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].kind, 0.0);
        assert_eq!(instances[1].kind, 1.0);
        // Translation in the last column, scale on the diagonal
        assert_eq!(instances[0].model[3][..3], [1.0, 2.0, 3.0]);
        assert_eq!(instances[0].model[0][0], 2.0);

        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<InstanceRaw>());
    }

    #[test]
    fn test_render_frame_buffer_layout() {
        let mut state = GameState::new(1);
        assert!(FrameSnapshot::from_state(&state).render_frame().is_none());

        let eye = Vec3::new(0.0, 1.6, 0.0);
        state.camera = Some(FramePose::from_transform(Mat4::from_translation(eye)));
        state.asteroids.push(Entity::new(
            1,
            EntityKind::Asteroid,
            Vec3::new(0.5, 1.0, -3.0),
            Vec3::ZERO,
        ));
        state
            .lasers
            .push(Entity::new(2, EntityKind::Laser, Vec3::new(0.0, 1.6, -1.0), Vec3::ZERO));

        let frame = FrameSnapshot::from_state(&state).render_frame().unwrap();
        let floats = frame.instance_floats();
        assert_eq!(InstanceRaw::FLOATS, 20);
        assert_eq!(floats.len(), 2 * InstanceRaw::FLOATS);

        // Translation sits in elements 12..15 of each column-major matrix
        assert_eq!(floats[12..15], [0.5, 1.0, -3.0]);
        assert_eq!(floats[InstanceRaw::KIND_OFFSET], 0.0);
        let laser = &floats[InstanceRaw::FLOATS..];
        assert_eq!(laser[12..15], [0.0, 1.6, -1.0]);
        assert_eq!(laser[InstanceRaw::KIND_OFFSET], 1.0);

        // View is the inverse camera transform
        let view = Mat4::from_cols_array(&frame.view);
        assert!((view.transform_point3(eye)).length() < 1e-5);
        assert_eq!(frame.projection, Mat4::IDENTITY.to_cols_array());
    }

    #[test]
    fn test_hud_changes() {
        let mut state = GameState::new(1);
        let before = HudState::from_snapshot(&FrameSnapshot::from_state(&state));
        assert_eq!(before.score_text, "0");
        assert!(before.changes_since(&before).is_empty());

        state.phase = GamePhase::Running;
        state.score = -2;
        state.aim = Some(AimPoint {
            pos: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        });
        let after = HudState::from_snapshot(&FrameSnapshot::from_state(&state));
        let changes = after.changes_since(&before);
        assert_eq!(changes.score_text, Some("-2"));
        assert_eq!(
            changes.add_classes,
            vec![HudState::STABILIZED_CLASS, HudState::RUNNING_CLASS]
        );
    }
}
