//! Game state and core simulation types
//!
//! `GameState` is the single mutable hub: it owns both entity pools, the
//! spawn schedule, the score and the phase. Nothing outside it holds entity
//! references; callers go through ids.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pose::FramePose;
use super::schedule::SpawnScheduler;

/// Phase of the run. Ordered; the state only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamePhase {
    /// No tracking lock yet; nothing spawns
    NotStarted,
    /// Surface lock-on achieved, timers not yet armed
    Stabilized,
    /// Timers armed, collisions and scoring active
    Running,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "not-started",
            GamePhase::Stabilized => "stabilized",
            GamePhase::Running => "running",
        }
    }
}

/// Entity kinds; each lives in its own pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Asteroid,
    Laser,
}

/// A moving asteroid or laser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// World-space position
    pub pos: Vec3,
    /// World-space displacement applied once per frame
    pub vel: Vec3,
    pub orientation: Quat,
    /// Visual scale (does not affect the hit threshold)
    pub scale: f32,
    /// Distance covered since spawn
    pub traveled: f32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec3, vel: Vec3) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            orientation: Quat::IDENTITY,
            scale: 1.0,
            traveled: 0.0,
        }
    }

    /// Apply one frame of motion
    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.traveled += self.vel.length();
    }

    #[inline]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.pos.distance(point)
    }
}

/// Where the player is aiming / anchored this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPoint {
    pub pos: Vec3,
    pub orientation: Quat,
}

/// Discrete state changes for one-shot cues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// First valid surface anchor (fires once per session)
    Stabilized,
    /// Spawn timers armed (fires once per session)
    GameStarted,
    /// A laser destroyed an asteroid
    Hit {
        laser_id: u32,
        asteroid_id: u32,
        pos: Vec3,
    },
    /// An asteroid got inside the near field
    AsteroidReachedPlayer { asteroid_id: u32 },
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Frames simulated with a valid pose
    pub frames: u64,
    /// Net score: +1 per hit, -1 per asteroid reaching the player
    pub score: i64,
    pub phase: GamePhase,
    /// Camera pose of the last simulated frame, for rendering
    pub camera: Option<FramePose>,
    /// Latest aim point (None until the first sample)
    pub aim: Option<AimPoint>,
    /// Whether this frame produced an aim sample worth showing
    pub reticle_visible: bool,
    /// Active asteroids (insertion order, ascending ids)
    pub asteroids: Vec<Entity>,
    /// Active lasers (insertion order, ascending ids)
    pub lasers: Vec<Entity>,
    pub scheduler: SpawnScheduler,
    /// Events raised this frame, drained by the session
    pub events: Vec<GameEvent>,
    /// Session over; further frames are ignored
    pub ended: bool,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frames: 0,
            score: 0,
            phase: GamePhase::NotStarted,
            camera: None,
            aim: None,
            reticle_visible: false,
            asteroids: Vec::new(),
            lasers: Vec::new(),
            scheduler: SpawnScheduler::default(),
            events: Vec::new(),
            ended: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn stabilized(&self) -> bool {
        self.phase >= GamePhase::Stabilized
    }

    pub fn game_started(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Latch the stabilized flag. Returns true only on the transition.
    pub fn mark_stabilized(&mut self) -> bool {
        if self.stabilized() {
            return false;
        }
        self.phase = GamePhase::Stabilized;
        self.events.push(GameEvent::Stabilized);
        log::info!("Tracking stabilized");
        true
    }

    /// Arm the spawn timers and enter `Running`. Returns true only on the
    /// transition; later calls never re-arm.
    pub fn start(&mut self, now_ms: f64, asteroid_interval_ms: f64, laser_interval_ms: f64) -> bool {
        if self.game_started() || !self.stabilized() {
            return false;
        }
        self.scheduler
            .arm(now_ms, asteroid_interval_ms, laser_interval_ms);
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::GameStarted);
        log::info!("Game started at {now_ms:.0} ms");
        true
    }

    /// Stop the run: clear timers, ignore further frames
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.scheduler.cancel();
        self.ended = true;
        log::info!(
            "Session ended while {} (score {}, {} frames)",
            self.phase.as_str(),
            self.score,
            self.frames
        );
    }

    pub fn asteroid(&self, id: u32) -> Option<&Entity> {
        self.asteroids.iter().find(|a| a.id == id)
    }

    pub fn laser(&self, id: u32) -> Option<&Entity> {
        self.lasers.iter().find(|l| l.id == id)
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
