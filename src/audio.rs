//! Audio cues using the Web Audio API
//!
//! Procedurally generated from the voice tables in `cues` - no external
//! files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::cues::{AMBIENT_LEVEL, AMBIENT_PARTIALS, SILENCE, SoundEffect, Voice, Waveform};
use crate::settings::Settings;

/// Audio manager for the session
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_gain: f32,
    music_gain: f32,
    /// Voices of the most recent explosion, cut off when the next one starts
    explosion: Vec<OscillatorNode>,
    /// Running ambient drone voices
    ambient: Vec<(OscillatorNode, GainNode)>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_gain: settings.sfx_gain(),
            music_gain: settings.music_gain(),
            explosion: Vec::new(),
            ambient: Vec::new(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Pick up changed volumes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_gain = settings.sfx_gain();
        self.music_gain = settings.music_gain();
        for (_, gain) in &self.ambient {
            gain.gain().set_value(self.music_gain * AMBIENT_LEVEL);
        }
    }

    /// Play a one-shot cue. A new explosion restarts one still ringing.
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.sfx_gain;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.ctx.clone() else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        if effect == SoundEffect::Explosion {
            for osc in self.explosion.drain(..) {
                osc.stop().ok();
            }
        }

        let now = ctx.current_time();
        let started: Vec<OscillatorNode> = effect
            .voices()
            .iter()
            .filter_map(|voice| play_voice(&ctx, voice, now, vol))
            .collect();

        if effect == SoundEffect::Explosion {
            self.explosion = started;
        }
    }

    /// Start the looping ambient drone (no-op if already running)
    pub fn start_ambient(&mut self) {
        if !self.ambient.is_empty() {
            return;
        }
        let Some(ctx) = self.ctx.clone() else { return };
        for freq in AMBIENT_PARTIALS {
            if let Some((osc, gain)) = create_osc(&ctx, freq, OscillatorType::Sine) {
                gain.gain().set_value(self.music_gain * AMBIENT_LEVEL);
                osc.start().ok();
                self.ambient.push((osc, gain));
            }
        }
        log::debug!("Ambient loop started");
    }

    pub fn stop_ambient(&mut self) {
        for (osc, _) in self.ambient.drain(..) {
            osc.stop().ok();
        }
    }
}

/// Schedule one voice relative to `now`
fn play_voice(ctx: &AudioContext, voice: &Voice, now: f64, vol: f32) -> Option<OscillatorNode> {
    let (osc, gain) = create_osc(ctx, voice.freq_start, oscillator_type(voice.waveform))?;
    let t = now + voice.delay;
    let end = t + voice.duration;

    gain.gain().set_value_at_time(voice.peak * vol, t).ok();
    gain.gain().exponential_ramp_to_value_at_time(SILENCE, end).ok();
    if voice.freq_end != voice.freq_start {
        osc.frequency().set_value_at_time(voice.freq_start, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(voice.freq_end, end)
            .ok();
    }

    osc.start_with_when(t).ok();
    osc.stop_with_when(end + 0.05).ok();
    Some(osc)
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

/// Create an oscillator routed through its own gain node
fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}
