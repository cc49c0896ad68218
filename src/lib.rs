//! AR Asteroids - an augmented-reality asteroid shooter
//!
//! Core modules:
//! - `sim`: Deterministic frame simulation (pose, pools, collisions, game state)
//! - `session`: Frame driver that feeds the sim and notifies the presenter
//! - `presentation`: What the host needs to render and to play cues
//! - `platform`: Pose/clock sources (WebXR on wasm, scripted on native)
//! - `tuning`: Data-driven game balance and rule policies

pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod cues;
pub mod error;
pub mod platform;
pub mod presentation;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{SessionError, TuningError};
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::{Mat4, Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Default RNG seed when the host does not provide one
    pub const DEFAULT_SEED: u64 = 0x0a57_e401;

    /// Nominal display refresh used by the headless driver (ms per frame)
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

    /// Timer fires allowed per frame before the schedule skips ahead
    pub const MAX_SPAWN_CATCH_UP: u32 = 4;
}

/// Camera basis extracted from a world-space transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: Vec3,
    pub orientation: Quat,
    /// Unit vector the camera looks along (-Z in camera space)
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Decompose a camera-to-world transform into position and axes
#[inline]
pub fn camera_basis(transform: &Mat4) -> CameraBasis {
    let (_scale, orientation, position) = transform.to_scale_rotation_translation();
    CameraBasis {
        position,
        orientation,
        forward: (orientation * Vec3::NEG_Z).normalize_or_zero(),
        right: (orientation * Vec3::X).normalize_or_zero(),
        up: (orientation * Vec3::Y).normalize_or_zero(),
    }
}

/// Linear blend from `from` toward `to` by `t` in [0, 1]
#[inline]
pub fn lerp_toward(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Map a left/right device tilt (degrees) to a signed unit amount
#[inline]
pub fn tilt_amount(gamma_deg: f32, max_gamma_deg: f32) -> f32 {
    if max_gamma_deg <= 0.0 {
        return 0.0;
    }
    (gamma_deg / max_gamma_deg).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_camera_looks_down_negative_z() {
        let basis = camera_basis(&Mat4::IDENTITY);
        assert_eq!(basis.position, Vec3::ZERO);
        assert!((basis.forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((basis.right - Vec3::X).length() < 1e-6);
        assert!((basis.up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_rotated_camera_basis() {
        // Turn 90 degrees left: forward becomes -X
        let transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(1.0, 1.6, 0.0),
        );
        let basis = camera_basis(&transform);
        assert!((basis.position - Vec3::new(1.0, 1.6, 0.0)).length() < 1e-5);
        assert!((basis.forward - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_lerp_toward() {
        let v = lerp_toward(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.2);
        assert!((v.x - 2.0).abs() < 1e-6);
        // Factor is clamped
        let v = lerp_toward(Vec3::ZERO, Vec3::ONE, 3.0);
        assert_eq!(v, Vec3::ONE);
    }

    #[test]
    fn test_tilt_amount_clamps() {
        assert_eq!(tilt_amount(90.0, 45.0), 1.0);
        assert_eq!(tilt_amount(-90.0, 45.0), -1.0);
        assert!((tilt_amount(22.5, 45.0) - 0.5).abs() < 1e-6);
        assert_eq!(tilt_amount(10.0, 0.0), 0.0);
    }
}
