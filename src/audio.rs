//! Audio cues and procedural sound recipes
//!
//! The simulation only names cues. Hosts turn them into sound through a
//! [`CueSink`]; [`AudioManager`] applies volume settings and can render the
//! recipes to PCM without any sample files.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::random::{RngExt, SimRng, seeded};

/// Sound cue vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Bomb released
    BombDrop,
    /// Bomb detonation
    Blast,
    /// Upgrade collected
    Pickup,
    /// Shield absorbed a hit
    Hit,
    /// Plain laser volley
    Laser,
    /// Volley carrying a pulse shot
    PulseShot,
    Rocket,
    BlastShot,
    LifeLost,
    GameOver,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Square,
    Triangle,
    Sawtooth,
}

/// One layer of a cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Voice {
    /// Exponential pitch sweep with a short attack
    Tone {
        freq_start: f32,
        freq_end: f32,
        duration: f32,
        gain: f32,
        waveform: Waveform,
    },
    /// Decaying white noise through a high-pass filter
    Noise {
        duration: f32,
        gain: f32,
        highpass: f32,
    },
}

const fn tone(freq_start: f32, freq_end: f32, duration: f32, gain: f32, waveform: Waveform) -> Voice {
    Voice::Tone {
        freq_start,
        freq_end,
        duration,
        gain,
        waveform,
    }
}

const fn noise(duration: f32, gain: f32, highpass: f32) -> Voice {
    Voice::Noise {
        duration,
        gain,
        highpass,
    }
}

mod recipes {
    use super::Voice;
    use super::Waveform::*;
    use super::{noise, tone};

    pub const BOMB_DROP: &[Voice] = &[tone(260.0, 140.0, 0.08, 0.03, Triangle)];
    pub const BLAST: &[Voice] = &[
        noise(0.12, 0.08, 450.0),
        tone(180.0, 70.0, 0.16, 0.035, Sawtooth),
    ];
    pub const PICKUP: &[Voice] = &[tone(430.0, 860.0, 0.08, 0.03, Square)];
    pub const HIT: &[Voice] = &[
        noise(0.08, 0.05, 900.0),
        tone(220.0, 120.0, 0.1, 0.02, Square),
    ];
    pub const LASER: &[Voice] = &[tone(780.0, 620.0, 0.045, 0.012, Square)];
    pub const PULSE_SHOT: &[Voice] = &[tone(520.0, 760.0, 0.065, 0.016, Triangle)];
    pub const ROCKET: &[Voice] = &[
        tone(260.0, 180.0, 0.08, 0.02, Triangle),
        noise(0.05, 0.018, 950.0),
    ];
    pub const BLAST_SHOT: &[Voice] = &[tone(360.0, 220.0, 0.1, 0.022, Sawtooth)];
    pub const LIFE_LOST: &[Voice] = &[
        noise(0.2, 0.1, 500.0),
        tone(240.0, 70.0, 0.28, 0.05, Sawtooth),
    ];
    pub const GAME_OVER: &[Voice] = &[
        noise(0.45, 0.16, 350.0),
        tone(300.0, 45.0, 0.55, 0.08, Sawtooth),
    ];
}

impl AudioCue {
    pub const ALL: [AudioCue; 10] = [
        AudioCue::BombDrop,
        AudioCue::Blast,
        AudioCue::Pickup,
        AudioCue::Hit,
        AudioCue::Laser,
        AudioCue::PulseShot,
        AudioCue::Rocket,
        AudioCue::BlastShot,
        AudioCue::LifeLost,
        AudioCue::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::BombDrop => "bomb_drop",
            AudioCue::Blast => "blast",
            AudioCue::Pickup => "pickup",
            AudioCue::Hit => "hit",
            AudioCue::Laser => "laser",
            AudioCue::PulseShot => "pulse_shot",
            AudioCue::Rocket => "rocket",
            AudioCue::BlastShot => "blast_shot",
            AudioCue::LifeLost => "life_lost",
            AudioCue::GameOver => "game_over",
        }
    }

    /// Voices making up the cue
    pub fn recipe(&self) -> &'static [Voice] {
        match self {
            AudioCue::BombDrop => recipes::BOMB_DROP,
            AudioCue::Blast => recipes::BLAST,
            AudioCue::Pickup => recipes::PICKUP,
            AudioCue::Hit => recipes::HIT,
            AudioCue::Laser => recipes::LASER,
            AudioCue::PulseShot => recipes::PULSE_SHOT,
            AudioCue::Rocket => recipes::ROCKET,
            AudioCue::BlastShot => recipes::BLAST_SHOT,
            AudioCue::LifeLost => recipes::LIFE_LOST,
            AudioCue::GameOver => recipes::GAME_OVER,
        }
    }

    /// Length of the longest voice in seconds
    pub fn duration(&self) -> f32 {
        self.recipe()
            .iter()
            .map(Voice::duration)
            .fold(0.0, f32::max)
    }
}

/// Envelope floor for exponential ramps
const SILENCE: f32 = 0.0001;
/// Lowest frequency a sweep may reach
const MIN_FREQ: f32 = 30.0;

impl Voice {
    pub fn duration(&self) -> f32 {
        match *self {
            Voice::Tone { duration, .. } | Voice::Noise { duration, .. } => duration,
        }
    }

    /// Render this voice to mono samples at `sample_rate`, scaled by `volume`
    pub fn render<R: Rng + ?Sized>(&self, sample_rate: u32, volume: f32, rng: &mut R) -> Vec<f32> {
        let rate = sample_rate as f32;
        let len = (rate * self.duration()).floor() as usize;
        let mut out = Vec::with_capacity(len);

        match *self {
            Voice::Tone {
                freq_start,
                freq_end,
                duration,
                gain,
                waveform,
            } => {
                let freq_end = freq_end.max(MIN_FREQ);
                let attack = (duration * 0.3).min(0.02);
                let mut phase = 0.0f32;
                for i in 0..len {
                    let t = i as f32 / rate;
                    let freq = freq_start * (freq_end / freq_start).powf(t / duration);
                    phase = (phase + freq / rate).fract();
                    let env = if t < attack {
                        exp_ramp(SILENCE, gain, t / attack)
                    } else {
                        exp_ramp(gain, SILENCE, (t - attack) / (duration - attack).max(1e-6))
                    };
                    out.push(oscillate(waveform, phase) * env * volume);
                }
            }
            Voice::Noise {
                duration,
                gain,
                highpass,
            } => {
                // One-pole high-pass
                let rc = 1.0 / (std::f32::consts::TAU * highpass);
                let alpha = rc / (rc + 1.0 / rate);
                let attack = 0.01f32.min(duration);
                let (mut prev_in, mut prev_out) = (0.0f32, 0.0f32);
                for i in 0..len {
                    let t = i as f32 / rate;
                    let raw = rng.frange(-1.0, 1.0) * (1.0 - i as f32 / len as f32);
                    let filtered = alpha * (prev_out + raw - prev_in);
                    prev_in = raw;
                    prev_out = filtered;
                    let env = if t < attack {
                        exp_ramp(SILENCE, gain, t / attack)
                    } else {
                        exp_ramp(gain, SILENCE, (t - attack) / (duration - attack).max(1e-6))
                    };
                    out.push(filtered * env * volume);
                }
            }
        }
        out
    }
}

#[inline]
fn exp_ramp(from: f32, to: f32, t: f32) -> f32 {
    from * (to / from).powf(t.clamp(0.0, 1.0))
}

#[inline]
fn oscillate(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

/// Something that reacts to audio cues
pub trait CueSink {
    fn play(&mut self, cue: AudioCue);
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Records cues in order (headless runs and tests)
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    pub cues: Vec<AudioCue>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for CueLog {
    fn play(&mut self, cue: AudioCue) {
        log::trace!("cue {}", cue.as_str());
        self.cues.push(cue);
    }
}

/// A cue accepted by the mixer, with its final gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixedCue {
    pub cue: AudioCue,
    pub volume: f32,
}

/// Audio manager for the game
///
/// Applies master/sfx volume and mute to incoming cues and queues them for
/// the host's output device.
#[derive(Debug)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    pending: Vec<MixedCue>,
    noise: SimRng,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pending: Vec::new(),
            noise: seeded(0x5eed_a0d1),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cues queued since the last drain
    pub fn drain(&mut self) -> Vec<MixedCue> {
        std::mem::take(&mut self.pending)
    }

    /// Render a cue's voices mixed into one buffer
    pub fn render(&mut self, cue: AudioCue, sample_rate: u32) -> Vec<f32> {
        let volume = self.effective_volume();
        let mut mix: Vec<f32> = Vec::new();
        for voice in cue.recipe() {
            let samples = voice.render(sample_rate, volume, &mut self.noise);
            if samples.len() > mix.len() {
                mix.resize(samples.len(), 0.0);
            }
            for (out, s) in mix.iter_mut().zip(samples) {
                *out += s;
            }
        }
        mix
    }
}

impl CueSink for AudioManager {
    fn play(&mut self, cue: AudioCue) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        self.pending.push(MixedCue { cue, volume });
    }
}
