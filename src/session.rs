//! Frame driver
//!
//! Owns the game state for one AR session, runs the sim once per host
//! frame and forwards the results to the presenter.

use crate::assets::AssetGate;
use crate::error::TuningError;
use crate::platform::{PoseSource, sample_frame};
use crate::presentation::{FrameSnapshot, Presenter};
use crate::sim::{FrameInput, GameEvent, GameState, tick};
use crate::tuning::Tuning;

pub struct Session {
    state: GameState,
    tuning: Tuning,
}

impl Session {
    /// Start a session. Fails if `tuning` would break the loop.
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        log::info!(
            "New session (seed {seed}, aim {:?}, reach {:?})",
            tuning.aim_mode,
            tuning.reach_policy
        );
        Ok(Self {
            state: GameState::new(seed),
            tuning,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_ended(&self) -> bool {
        self.state.ended
    }

    /// Run one frame from already-sampled input. Returns false if the frame
    /// was skipped (no pose or session ended); the presenter is not called
    /// for skipped frames.
    pub fn frame(
        &mut self,
        input: &FrameInput,
        assets: &dyn AssetGate,
        presenter: &mut dyn Presenter,
    ) -> bool {
        if !tick(&mut self.state, input, &self.tuning, assets) {
            return false;
        }

        presenter.on_frame_update(&FrameSnapshot::from_state(&self.state));
        for event in self.state.drain_events() {
            match event {
                GameEvent::Stabilized => presenter.on_stabilized(),
                GameEvent::GameStarted => presenter.on_game_started(),
                GameEvent::Hit { pos, .. } => presenter.on_hit(pos),
                GameEvent::AsteroidReachedPlayer { .. } => presenter.on_asteroid_reached_player(),
            }
        }
        true
    }

    /// Sample the platform and run one frame
    pub fn frame_from(
        &mut self,
        source: &mut dyn PoseSource,
        time_ms: f64,
        assets: &dyn AssetGate,
        presenter: &mut dyn Presenter,
    ) -> bool {
        let input = sample_frame(source, time_ms);
        self.frame(&input, assets, presenter)
    }

    /// Stop the session: timers cleared, later frames ignored
    pub fn end(&mut self, presenter: &mut dyn Presenter) {
        if self.state.ended {
            return;
        }
        self.state.end();
        presenter.on_session_ended();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AlwaysReady;
    use crate::consts::NOMINAL_FRAME_MS;
    use crate::platform::ScriptedPoseSource;
    use crate::sim::GamePhase;
    use glam::Vec3;

    /// Records every presenter call for assertions
    #[derive(Default)]
    struct Recorder {
        frames: usize,
        scores: Vec<i64>,
        stabilized: usize,
        started: usize,
        hits: usize,
        reached: usize,
        ended: usize,
    }

    impl Presenter for Recorder {
        fn on_frame_update(&mut self, snapshot: &FrameSnapshot<'_>) {
            self.frames += 1;
            self.scores.push(snapshot.score);
        }
        fn on_stabilized(&mut self) {
            self.stabilized += 1;
        }
        fn on_game_started(&mut self) {
            self.started += 1;
        }
        fn on_hit(&mut self, _pos: Vec3) {
            self.hits += 1;
        }
        fn on_asteroid_reached_player(&mut self) {
            self.reached += 1;
        }
        fn on_session_ended(&mut self) {
            self.ended += 1;
        }
    }

    fn run(
        session: &mut Session,
        source: &mut ScriptedPoseSource,
        presenter: &mut Recorder,
        frames: usize,
    ) {
        for _ in 0..frames {
            let t = source.frame() as f64 * NOMINAL_FRAME_MS;
            session.frame_from(source, t, &AlwaysReady, presenter);
            source.advance();
        }
    }

    #[test]
    fn test_full_session_lifecycle() {
        let mut session = Session::new(7, Tuning::default()).unwrap();
        let mut source = ScriptedPoseSource::new()
            .lock_on_after(20)
            .sweep(0.3, 900.0)
            .dropout(100..130)
            .hit_gap(200..260);
        let mut presenter = Recorder::default();

        run(&mut session, &mut source, &mut presenter, 3600);

        // Dropout frames are not presented
        assert_eq!(presenter.frames, 3600 - 30);
        assert_eq!(presenter.stabilized, 1);
        assert_eq!(presenter.started, 1);
        assert_eq!(session.state().phase, GamePhase::Running);
        assert_eq!(session.state().scheduler.arm_count(), 1);

        // Score moves only through hits and reaches
        let expected = presenter.hits as i64 - presenter.reached as i64;
        assert_eq!(session.state().score, expected);
        assert!(presenter.hits + presenter.reached > 0);
    }

    #[test]
    fn test_end_stops_frames() {
        let mut session = Session::new(7, Tuning::fixed_offset()).unwrap();
        let mut source = ScriptedPoseSource::new();
        let mut presenter = Recorder::default();

        run(&mut session, &mut source, &mut presenter, 10);
        session.end(&mut presenter);
        session.end(&mut presenter);
        assert_eq!(presenter.ended, 1);
        assert!(session.is_ended());
        assert!(!session.state().scheduler.is_armed());

        let presented = presenter.frames;
        run(&mut session, &mut source, &mut presenter, 10);
        assert_eq!(presenter.frames, presented);
    }

    #[test]
    fn test_score_changes_are_explained_by_events() {
        let mut session = Session::new(3, Tuning::fixed_offset()).unwrap();
        let mut source = ScriptedPoseSource::new().sweep(0.5, 400.0);
        let mut presenter = Recorder::default();

        let mut last_score = 0;
        let mut last_hits = 0;
        let mut last_reached = 0;
        for _ in 0..2000 {
            let t = source.frame() as f64 * NOMINAL_FRAME_MS;
            session.frame_from(&mut source, t, &AlwaysReady, &mut presenter);
            source.advance();

            let delta = session.state().score - last_score;
            let hits = (presenter.hits - last_hits) as i64;
            let reached = (presenter.reached - last_reached) as i64;
            assert_eq!(delta, hits - reached);

            last_score = session.state().score;
            last_hits = presenter.hits;
            last_reached = presenter.reached;
        }
    }

    #[test]
    fn test_rejects_tuning_that_stalls_spawns() {
        let tuning = Tuning {
            laser_spawn_interval_ms: 0.0,
            ..Tuning::default()
        };
        let err = Session::new(7, tuning).err().unwrap();
        assert!(matches!(
            err,
            TuningError::Invalid { field: "laser_spawn_interval_ms", .. }
        ));
    }
}
