//! Scripted platform for native runs and tests
//!
//! Replays a deterministic head motion: standing height, slow yaw sweep,
//! a floor hit-test that resolves after a few frames, and optional
//! tracking dropouts.

use std::cell::Cell;
use std::ops::Range;

use glam::{Mat4, Quat, Vec3};

use super::{Clock, PoseSource};
use crate::sim::{FramePose, HitTestResult};

/// Eye height above the floor plane (m)
const EYE_HEIGHT: f32 = 1.6;

#[derive(Debug, Clone)]
pub struct ScriptedPoseSource {
    frame: u64,
    /// Frames before the floor hit-test starts returning results
    lock_on_after: u64,
    /// Peak yaw of the sweep (radians); 0 holds the camera still
    sweep_amplitude: f32,
    /// Sweep period in frames
    sweep_period: f32,
    /// Frame ranges with no pose
    dropouts: Vec<Range<u64>>,
    /// Frame ranges where the hit-test is empty
    hit_gaps: Vec<Range<u64>>,
    tilt_gamma_deg: Option<f32>,
}

impl Default for ScriptedPoseSource {
    fn default() -> Self {
        Self {
            frame: 0,
            lock_on_after: 30,
            sweep_amplitude: 0.0,
            sweep_period: 600.0,
            dropouts: Vec::new(),
            hit_gaps: Vec::new(),
            tilt_gamma_deg: None,
        }
    }
}

impl ScriptedPoseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_on_after(mut self, frames: u64) -> Self {
        self.lock_on_after = frames;
        self
    }

    pub fn sweep(mut self, amplitude: f32, period_frames: f32) -> Self {
        self.sweep_amplitude = amplitude;
        self.sweep_period = period_frames.max(1.0);
        self
    }

    pub fn dropout(mut self, frames: Range<u64>) -> Self {
        self.dropouts.push(frames);
        self
    }

    pub fn hit_gap(mut self, frames: Range<u64>) -> Self {
        self.hit_gaps.push(frames);
        self
    }

    pub fn tilt(mut self, gamma_deg: f32) -> Self {
        self.tilt_gamma_deg = Some(gamma_deg);
        self
    }

    /// Move to the next frame; call once per host frame
    pub fn advance(&mut self) {
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn yaw(&self) -> f32 {
        let phase = self.frame as f32 / self.sweep_period * std::f32::consts::TAU;
        self.sweep_amplitude * phase.sin()
    }

    fn camera_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(self.yaw()),
            Vec3::new(0.0, EYE_HEIGHT, 0.0),
        )
    }
}

impl PoseSource for ScriptedPoseSource {
    fn frame_pose(&mut self) -> Option<FramePose> {
        if self.dropouts.iter().any(|r| r.contains(&self.frame)) {
            return None;
        }
        Some(FramePose::from_transform(self.camera_transform()))
    }

    fn hit_test_results(&mut self) -> Vec<HitTestResult> {
        if self.frame < self.lock_on_after || self.hit_gaps.iter().any(|r| r.contains(&self.frame)) {
            return Vec::new();
        }
        // Ray from the eye, pitched down 45 degrees, meets the floor
        let rotation = Quat::from_rotation_y(self.yaw());
        let ahead = rotation * Vec3::NEG_Z * EYE_HEIGHT;
        vec![HitTestResult {
            pos: Vec3::new(ahead.x, 0.0, ahead.z),
            orientation: rotation,
        }]
    }

    fn tilt_gamma_deg(&mut self) -> Option<f32> {
        self.tilt_gamma_deg
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
