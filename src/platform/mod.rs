//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Camera pose and hit-test sampling (WebXR on web, scripted on native)
//! - Time

pub mod scripted;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use scripted::{ManualClock, ScriptedPoseSource};

use crate::sim::{FrameInput, FramePose, HitTestResult};

/// Supplies the camera pose and surface hits for the current frame
pub trait PoseSource {
    /// None while tracking is unavailable
    fn frame_pose(&mut self) -> Option<FramePose>;

    /// Empty if hit-testing is unsupported or has not resolved yet
    fn hit_test_results(&mut self) -> Vec<HitTestResult>;

    /// Left/right device tilt in degrees, if available
    fn tilt_gamma_deg(&mut self) -> Option<f32> {
        None
    }
}

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Sample one frame's input from the platform
pub fn sample_frame(source: &mut dyn PoseSource, time_ms: f64) -> FrameInput {
    let pose = source.frame_pose();
    // Hits are meaningless without a pose; don't query them
    let hits = if pose.is_some() {
        source.hit_test_results()
    } else {
        Vec::new()
    };
    FrameInput {
        time_ms,
        pose,
        hits,
        tilt_gamma_deg: source.tilt_gamma_deg(),
    }
}
