//! Frame-ticked spawn timers
//!
//! Replaces host interval callbacks: timers only fire when the frame polls
//! them, so pool mutation always happens inside the frame update.

use serde::{Deserialize, Serialize};

/// A periodic timer polled with the frame clock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    interval_ms: f64,
    /// Next fire time; None while disarmed
    next_due_ms: Option<f64>,
}

impl SpawnTimer {
    /// Arm the timer; the first fire is one interval after `now_ms`.
    /// Returns false (and changes nothing) if already armed or if the
    /// interval is not a positive number.
    pub fn arm(&mut self, now_ms: f64, interval_ms: f64) -> bool {
        if self.next_due_ms.is_some() {
            log::warn!("Spawn timer already armed, ignoring re-arm");
            return false;
        }
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            log::error!("Refusing to arm spawn timer with interval {interval_ms} ms");
            return false;
        }
        self.interval_ms = interval_ms;
        self.next_due_ms = Some(now_ms + interval_ms);
        true
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Number of times the timer fired up to `now_ms`, at most `max_fires`.
    /// When further behind than that (tab hidden, tracking lost), the
    /// backlog is dropped and the schedule resumes from `now_ms`.
    pub fn poll(&mut self, now_ms: f64, max_fires: u32) -> u32 {
        let Some(mut due) = self.next_due_ms else {
            return 0;
        };

        let mut fires = 0;
        while now_ms >= due && fires < max_fires {
            fires += 1;
            due += self.interval_ms;
        }

        if now_ms >= due {
            let skipped = ((now_ms - due) / self.interval_ms).floor() + 1.0;
            log::debug!("Spawn timer behind, skipping {skipped} fires");
            due += skipped * self.interval_ms;
        }

        self.next_due_ms = Some(due);
        fires
    }
}

/// Fires due this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnTicks {
    pub asteroids: u32,
    pub lasers: u32,
}

/// Asteroid and laser timers, armed together exactly once
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub asteroid: SpawnTimer,
    pub laser: SpawnTimer,
    /// How many times `arm` has succeeded (never above 1)
    arm_count: u32,
}

impl SpawnScheduler {
    pub fn arm(&mut self, now_ms: f64, asteroid_interval_ms: f64, laser_interval_ms: f64) -> bool {
        if self.arm_count > 0 {
            log::warn!("Spawn schedule already armed");
            return false;
        }
        self.asteroid.arm(now_ms, asteroid_interval_ms);
        self.laser.arm(now_ms, laser_interval_ms);
        self.arm_count += 1;
        true
    }

    pub fn cancel(&mut self) {
        self.asteroid.cancel();
        self.laser.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.asteroid.is_armed() || self.laser.is_armed()
    }

    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }

    pub fn poll(&mut self, now_ms: f64, max_fires: u32) -> SpawnTicks {
        SpawnTicks {
            asteroids: self.asteroid.poll(now_ms, max_fires),
            lasers: self.laser.poll(now_ms, max_fires),
        }
    }
}
