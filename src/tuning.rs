//! Data-driven game balance
//!
//! Every rule that differs between prototypes of the game is an explicit
//! policy here rather than being baked into the loop.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Where the aim point comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AimMode {
    /// First hit-test result against a detected surface
    #[default]
    HitTest,
    /// Fixed distance along the camera forward vector
    FixedOffset,
}

/// How a new aim sample is applied to the previous aim point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AimSmoothing {
    /// Replace the aim point outright
    Snap,
    /// Move toward the new sample by `factor` each frame
    Lerp { factor: f32 },
}

impl Default for AimSmoothing {
    fn default() -> Self {
        AimSmoothing::Lerp { factor: 0.2 }
    }
}

/// What happens when an asteroid gets inside the near field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachPolicy {
    /// Remove the asteroid and subtract one point
    #[default]
    Penalize,
    /// Remove the asteroid, score unchanged
    Ignore,
    /// No near-field check; asteroids only retire by travel distance
    Unchecked,
}

/// Where lasers are emitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaserOrigin {
    #[default]
    Camera,
    AimPoint,
}

/// Device-tilt steering of the aim point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltSteering {
    pub enabled: bool,
    /// Tilt (degrees) that maps to full deflection
    pub max_gamma_deg: f32,
    /// Lateral offset at full deflection (world units)
    pub range: f32,
}

impl Default for TiltSteering {
    fn default() -> Self {
        Self {
            enabled: false,
            max_gamma_deg: 45.0,
            range: 1.5,
        }
    }
}

/// Game balance and rule policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Aim ===
    pub aim_mode: AimMode,
    /// Fixed-offset distance in front of the camera
    pub aim_distance: f32,
    pub aim_smoothing: AimSmoothing,
    pub tilt: TiltSteering,

    // === Asteroids ===
    pub asteroid_spawn_interval_ms: f64,
    /// Distance ahead of the camera where asteroids appear
    pub asteroid_spawn_distance: f32,
    /// Full width of the random spawn box (right, up, forward)
    pub asteroid_jitter: Vec3,
    /// Displacement per frame
    pub asteroid_speed: f32,
    pub asteroid_scale_min: f32,
    pub asteroid_scale_max: f32,
    /// Distance to the player that counts as "reached"
    pub near_field: f32,
    /// Distance traveled after which an unhit asteroid is dropped
    pub asteroid_max_travel: f32,
    pub reach_policy: ReachPolicy,

    // === Lasers ===
    pub laser_spawn_interval_ms: f64,
    /// Displacement per frame
    pub laser_speed: f32,
    /// Distance traveled after which a laser is dropped
    pub laser_range: f32,
    /// Optional world z below which lasers are dropped
    pub laser_depth_cutoff: Option<f32>,
    pub laser_origin: LaserOrigin,

    // === Collisions ===
    pub hit_threshold: f32,

    /// Timer fires allowed per frame before the schedule skips ahead
    pub max_spawn_catch_up: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            aim_mode: AimMode::HitTest,
            aim_distance: 1.5,
            aim_smoothing: AimSmoothing::default(),
            tilt: TiltSteering::default(),

            asteroid_spawn_interval_ms: 2000.0,
            asteroid_spawn_distance: 3.0,
            asteroid_jitter: Vec3::new(1.5, 0.5, 0.5),
            asteroid_speed: 0.02,
            asteroid_scale_min: 0.8,
            asteroid_scale_max: 1.2,
            near_field: 0.5,
            asteroid_max_travel: 6.0,
            reach_policy: ReachPolicy::Penalize,

            laser_spawn_interval_ms: 200.0,
            laser_speed: 0.1,
            laser_range: 5.0,
            laser_depth_cutoff: None,
            laser_origin: LaserOrigin::Camera,

            hit_threshold: 0.15,

            max_spawn_catch_up: crate::consts::MAX_SPAWN_CATCH_UP,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Preset for devices without hit-testing: aim hangs in front of the camera
    pub fn fixed_offset() -> Self {
        Self {
            aim_mode: AimMode::FixedOffset,
            aim_smoothing: AimSmoothing::Snap,
            ..Self::default()
        }
    }

    /// Check ranges that would break the loop
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, v: f32) -> Result<(), TuningError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(TuningError::invalid(field, format!("must be positive, got {v}")))
            }
        }

        if !(self.asteroid_spawn_interval_ms.is_finite() && self.asteroid_spawn_interval_ms > 0.0) {
            return Err(TuningError::invalid(
                "asteroid_spawn_interval_ms",
                "must be positive",
            ));
        }
        if !(self.laser_spawn_interval_ms.is_finite() && self.laser_spawn_interval_ms > 0.0) {
            return Err(TuningError::invalid(
                "laser_spawn_interval_ms",
                "must be positive",
            ));
        }
        positive("aim_distance", self.aim_distance)?;
        positive("asteroid_spawn_distance", self.asteroid_spawn_distance)?;
        positive("asteroid_speed", self.asteroid_speed)?;
        positive("asteroid_max_travel", self.asteroid_max_travel)?;
        positive("near_field", self.near_field)?;
        positive("laser_speed", self.laser_speed)?;
        positive("laser_range", self.laser_range)?;
        positive("hit_threshold", self.hit_threshold)?;
        positive("asteroid_scale_min", self.asteroid_scale_min)?;

        if self.asteroid_scale_max < self.asteroid_scale_min {
            return Err(TuningError::invalid(
                "asteroid_scale_max",
                "must not be below asteroid_scale_min",
            ));
        }
        if self.asteroid_jitter.min_element() < 0.0 {
            return Err(TuningError::invalid("asteroid_jitter", "must be non-negative"));
        }
        if let AimSmoothing::Lerp { factor } = self.aim_smoothing {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(TuningError::invalid(
                    "aim_smoothing",
                    format!("lerp factor must be in (0, 1], got {factor}"),
                ));
            }
        }
        if self.max_spawn_catch_up == 0 {
            return Err(TuningError::invalid("max_spawn_catch_up", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
        assert!(Tuning::fixed_offset().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let tuning = Tuning::from_json(
            r#"{
                "aim_mode": "fixed_offset",
                "aim_smoothing": { "kind": "snap" },
                "reach_policy": "ignore",
                "hit_threshold": 0.3
            }"#,
        )
        .unwrap();
        assert_eq!(tuning.aim_mode, AimMode::FixedOffset);
        assert_eq!(tuning.aim_smoothing, AimSmoothing::Snap);
        assert_eq!(tuning.reach_policy, ReachPolicy::Ignore);
        assert!((tuning.hit_threshold - 0.3).abs() < 1e-6);
        assert_eq!(tuning.laser_spawn_interval_ms, 200.0);
    }

    #[test]
    fn test_lerp_factor_parses() {
        let tuning =
            Tuning::from_json(r#"{ "aim_smoothing": { "kind": "lerp", "factor": 0.5 } }"#).unwrap();
        assert_eq!(tuning.aim_smoothing, AimSmoothing::Lerp { factor: 0.5 });
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "hit_threshold": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "hit_threshold", .. }));

        let err = Tuning::from_json(r#"{ "laser_spawn_interval_ms": -5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid { field: "laser_spawn_interval_ms", .. }
        ));

        let err =
            Tuning::from_json(r#"{ "aim_smoothing": { "kind": "lerp", "factor": 1.5 } }"#)
                .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "aim_smoothing", .. }));

        let err = Tuning::from_json(r#"{ "asteroid_scale_min": 2.0, "asteroid_scale_max": 1.0 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "asteroid_scale_max", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }
}
