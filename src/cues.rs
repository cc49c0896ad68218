//! Sound cue definitions
//!
//! Each one-shot cue is a short list of oscillator voices with an
//! exponential pitch and gain sweep. Kept platform-free so the shapes can
//! be checked without an audio context.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Laser destroyed an asteroid
    Explosion,
    /// Asteroid reached the player
    Impact,
    /// Tracking locked onto a surface
    LockOn,
    /// Spawning started
    GameStart,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator in a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    /// Start offset from the cue trigger (s)
    pub delay: f64,
    /// Audible length (s); the oscillator stops shortly after
    pub duration: f64,
    pub freq_start: f32,
    pub freq_end: f32,
    /// Gain at onset, scaled by the effect volume
    pub peak: f32,
}

impl Voice {
    const fn new(waveform: Waveform, delay: f64, duration: f64, freq: (f32, f32), peak: f32) -> Self {
        Self {
            waveform,
            delay,
            duration,
            freq_start: freq.0,
            freq_end: freq.1,
            peak,
        }
    }

    /// Time at which the voice is fully silent
    pub fn end(&self) -> f64 {
        self.delay + self.duration
    }
}

/// Floor for exponential ramps, which cannot reach zero
pub const SILENCE: f32 = 0.001;

/// Ambient drone partials (Hz): a low fifth
pub const AMBIENT_PARTIALS: [f32; 2] = [55.0, 82.5];

/// Ambient drone level relative to the music gain
pub const AMBIENT_LEVEL: f32 = 0.15;

static EXPLOSION: [Voice; 3] = [
    // Rumble falling into the floor
    Voice::new(Waveform::Triangle, 0.0, 0.7, (180.0, 35.0), 0.55),
    // Gritty body
    Voice::new(Waveform::Sawtooth, 0.0, 0.35, (90.0, 45.0), 0.25),
    // Debris scatter
    Voice::new(Waveform::Square, 0.03, 0.12, (2400.0, 700.0), 0.08),
];

static IMPACT: [Voice; 2] = [
    Voice::new(Waveform::Sine, 0.0, 0.45, (140.0, 55.0), 0.5),
    Voice::new(Waveform::Square, 0.0, 0.08, (220.0, 110.0), 0.12),
];

static LOCK_ON: [Voice; 2] = [
    Voice::new(Waveform::Sine, 0.0, 0.1, (880.0, 880.0), 0.25),
    Voice::new(Waveform::Sine, 0.09, 0.12, (1320.0, 1320.0), 0.25),
];

static GAME_START: [Voice; 3] = [
    Voice::new(Waveform::Square, 0.0, 0.12, (330.0, 330.0), 0.15),
    Voice::new(Waveform::Square, 0.12, 0.12, (440.0, 440.0), 0.15),
    Voice::new(Waveform::Triangle, 0.24, 0.45, (660.0, 990.0), 0.3),
];

impl SoundEffect {
    pub fn voices(&self) -> &'static [Voice] {
        match self {
            SoundEffect::Explosion => &EXPLOSION,
            SoundEffect::Impact => &IMPACT,
            SoundEffect::LockOn => &LOCK_ON,
            SoundEffect::GameStart => &GAME_START,
        }
    }

    /// Length of the whole cue (s)
    pub fn length(&self) -> f64 {
        self.voices().iter().map(Voice::end).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SoundEffect; 4] = [
        SoundEffect::Explosion,
        SoundEffect::Impact,
        SoundEffect::LockOn,
        SoundEffect::GameStart,
    ];

    #[test]
    fn test_voices_are_playable() {
        for effect in ALL {
            assert!(!effect.voices().is_empty(), "{effect:?}");
            for voice in effect.voices() {
                // Exponential ramps need strictly positive endpoints
                assert!(voice.freq_start > 0.0 && voice.freq_end > 0.0);
                assert!(voice.peak > SILENCE && voice.peak <= 1.0);
                assert!(voice.duration > 0.0 && voice.delay >= 0.0);
            }
        }
    }

    #[test]
    fn test_cues_are_short() {
        for effect in ALL {
            assert!(effect.length() < 1.0, "{effect:?} lasts {}", effect.length());
        }
    }

    #[test]
    fn test_explosion_falls_in_pitch() {
        let rumble = SoundEffect::Explosion.voices()[0];
        assert!(rumble.freq_end < rumble.freq_start);
        // Outlasts the rest of the cue
        assert_eq!(rumble.end(), SoundEffect::Explosion.length());
    }

    #[test]
    fn test_game_start_rises() {
        let voices = SoundEffect::GameStart.voices();
        for pair in voices.windows(2) {
            assert!(pair[1].delay > pair[0].delay);
            assert!(pair[1].freq_start > pair[0].freq_start);
        }
    }
}
