//! Pose resolution
//!
//! Turns the frame's camera pose (plus optional hit-test results) into the
//! aim point. Stateless apart from the previous aim point used for
//! smoothing.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::state::AimPoint;
use crate::tuning::{AimMode, AimSmoothing, Tuning};
use crate::{CameraBasis, camera_basis, lerp_toward, tilt_amount};

/// Render target rectangle for the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Camera pose for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    /// Camera-to-world transform
    pub transform: Mat4,
    pub projection: Mat4,
    pub viewport: Viewport,
}

impl FramePose {
    /// Pose with an identity projection, for headless drivers
    pub fn from_transform(transform: Mat4) -> Self {
        Self {
            transform,
            projection: Mat4::IDENTITY,
            viewport: Viewport::default(),
        }
    }

    pub fn basis(&self) -> CameraBasis {
        camera_basis(&self.transform)
    }
}

/// A hit-test intersection with a detected surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTestResult {
    pub pos: Vec3,
    pub orientation: Quat,
}

/// Outcome of resolving the aim for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimResolution {
    /// New aim point, or None if this frame produced no sample
    pub aim: Option<AimPoint>,
    /// A surface anchor (or camera-relative aim) is valid this frame
    pub anchored: bool,
}

/// Compute this frame's aim point.
///
/// Hit-test mode takes the first result as the anchor; with no results the
/// previous aim point is kept and `anchored` is false. Fixed-offset mode
/// always anchors at `aim_distance` along the camera forward vector.
/// Tilt steering is applied to the sample before smoothing.
pub fn resolve_aim(
    pose: &FramePose,
    hits: &[HitTestResult],
    previous: Option<AimPoint>,
    tilt_gamma_deg: Option<f32>,
    tuning: &Tuning,
) -> AimResolution {
    let basis = pose.basis();

    let sample = match tuning.aim_mode {
        AimMode::HitTest => hits.first().map(|hit| AimPoint {
            pos: hit.pos,
            orientation: hit.orientation,
        }),
        AimMode::FixedOffset => Some(AimPoint {
            pos: basis.position + basis.forward * tuning.aim_distance,
            orientation: basis.orientation,
        }),
    };

    let Some(mut sample) = sample else {
        return AimResolution {
            aim: previous,
            anchored: false,
        };
    };

    if tuning.tilt.enabled {
        if let Some(gamma) = tilt_gamma_deg {
            let amount = tilt_amount(gamma, tuning.tilt.max_gamma_deg);
            sample.pos += basis.right * amount * tuning.tilt.range;
        }
    }

    let aim = match (tuning.aim_smoothing, previous) {
        (AimSmoothing::Lerp { factor }, Some(prev)) => AimPoint {
            pos: lerp_toward(prev.pos, sample.pos, factor),
            orientation: prev.orientation.slerp(sample.orientation, factor),
        },
        // First sample or snap policy: take it as-is
        _ => sample,
    };

    AimResolution {
        aim: Some(aim),
        anchored: true,
    }
}
