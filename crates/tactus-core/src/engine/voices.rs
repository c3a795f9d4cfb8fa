//! Per-role voice synthesis
//!
//! All oscillator phases, envelopes and the noise generator live here. Each
//! percussive role carries a decaying envelope that is re-armed to 1.0 when
//! the active pattern hits; the melodic roles (leads, pad, fx) run
//! continuously. One call to [`VoiceBank::render`] produces one mono sample
//! for one role; panning and level happen in the mix loop.

use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::engine::params::ChannelParams;
use crate::engine::sequencer::StepPosition;
use crate::types::{ChannelRole, Sample, NUM_CHANNELS, SAMPLE_RATE};

/// Multiplicative envelope decay applied every sample (~-3 dB per 80 ms at 44.1k)
pub const ENVELOPE_DECAY: f32 = 0.9997;

/// Detune ratio of the leads' second harmonic
const LEAD_DETUNE: f32 = 2.01;

/// Frequency of the sine LFO sweeping the fx voice
const FX_LFO_HZ: f32 = 0.7;

/// Oscillator phases, envelopes and noise for all voices
#[derive(Debug, Clone)]
pub struct VoiceBank {
    envelopes: [f32; NUM_CHANNELS],
    kick_phase: f32,
    snare_phase: f32,
    lead_phases: [f32; 2],
    pad_phases: [f32; 4],
    fx_phase: f32,
    fx_lfo_phase: f32,
    noise: SmallRng,
}

/// Advance a phase accumulator by one sample at `freq`, wrapped modulo 2*pi
#[inline]
fn advance(phase: &mut f32, freq: f32) -> f32 {
    *phase += TAU * freq / SAMPLE_RATE as f32;
    if *phase >= TAU {
        *phase -= TAU;
    }
    *phase
}

impl VoiceBank {
    pub fn new() -> Self {
        Self {
            envelopes: [0.0; NUM_CHANNELS],
            kick_phase: 0.0,
            snare_phase: 0.0,
            lead_phases: [0.0; 2],
            pad_phases: [0.0; 4],
            fx_phase: 0.0,
            fx_lfo_phase: 0.0,
            // Fixed seed: noise needs no reproducibility guarantees, but a
            // deterministic stream keeps renders comparable in tests.
            noise: SmallRng::seed_from_u64(0x7AC7_05BE),
        }
    }

    /// Re-arm a role's envelope on a pattern hit
    pub fn trigger(&mut self, role: ChannelRole) {
        self.envelopes[role as usize] = 1.0;
    }

    /// Current envelope value for a channel index
    pub fn envelope(&self, idx: usize) -> f32 {
        self.envelopes.get(idx).copied().unwrap_or(0.0)
    }

    /// Decay every envelope by the fixed per-sample factor
    pub fn decay_envelopes(&mut self) {
        for env in &mut self.envelopes {
            *env *= ENVELOPE_DECAY;
        }
    }

    /// Uniform noise in [-1, 1)
    #[inline]
    fn noise(&mut self) -> f32 {
        self.noise.random::<f32>() * 2.0 - 1.0
    }

    /// Synthesize one mono sample for `role`
    ///
    /// `pos` locates the sample on the step grid; percussive roles use the
    /// in-step progress for their pitch/level contours, the bass saw runs on
    /// absolute time so retriggers never reset its waveform.
    pub fn render(&mut self, role: ChannelRole, params: &ChannelParams, pos: StepPosition) -> Sample {
        let env = self.envelopes[role as usize];
        match role {
            ChannelRole::Kick => {
                // Pitch-dropping sine: 190 Hz falling toward 40 Hz across the step
                let freq = 150.0 * (-5.0 * pos.progress).exp() + 40.0;
                advance(&mut self.kick_phase, freq).sin() * env * 1.2
            }
            ChannelRole::Snare => {
                let tone = advance(&mut self.snare_phase, params.frequency).sin();
                (self.noise() * 0.6 + tone * 0.4) * env
            }
            ChannelRole::HiHat => {
                // Noise burst shaped by a fast decay over the step
                self.noise() * env * 0.5 * (-10.0 * pos.progress).exp()
            }
            ChannelRole::Bass => {
                let t = pos.sample as f64 / f64::from(SAMPLE_RATE);
                let saw = 2.0 * (t * f64::from(params.frequency)).fract() as f32 - 1.0;
                saw * env * 0.7
            }
            ChannelRole::Lead1 | ChannelRole::Lead2 => {
                let idx = role as usize - ChannelRole::Lead1 as usize;
                // Subtle step-wise modulation keeps the line moving
                let freq = params.frequency * (1.0 + (pos.step % 4) as f32 * 0.02);
                let phase = advance(&mut self.lead_phases[idx], freq);
                phase.sin() * 0.5 + (phase * LEAD_DETUNE).sin() * 0.25
            }
            ChannelRole::Pad => {
                // Soft chord: root, major third-ish, fifth, octave
                let base = params.frequency;
                let mut sample = 0.0;
                for (phase, ratio) in self.pad_phases.iter_mut().zip([1.0, 1.25, 1.5, 2.0]) {
                    sample += advance(phase, base * ratio).sin() * 0.15;
                }
                sample
            }
            ChannelRole::Fx => {
                let sweep = advance(&mut self.fx_lfo_phase, FX_LFO_HZ).sin();
                let freq = params.frequency * (1.0 + sweep * 0.5);
                advance(&mut self.fx_phase, freq).sin() * 0.3
            }
        }
    }
}

impl Default for VoiceBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_pos(step: usize, progress: f32) -> StepPosition {
        StepPosition {
            sample: 0,
            step,
            progress,
            step_start: false,
        }
    }

    #[test]
    fn test_envelope_trigger_and_decay() {
        let mut bank = VoiceBank::new();
        assert_eq!(bank.envelope(ChannelRole::Kick as usize), 0.0);

        bank.trigger(ChannelRole::Kick);
        assert_eq!(bank.envelope(ChannelRole::Kick as usize), 1.0);

        for _ in 0..100 {
            bank.decay_envelopes();
        }
        let expected = ENVELOPE_DECAY.powi(100);
        let env = bank.envelope(ChannelRole::Kick as usize);
        assert!((env - expected).abs() < 1e-6, "env {} expected {}", env, expected);
    }

    #[test]
    fn test_envelope_invariant_bounds() {
        let mut bank = VoiceBank::new();
        bank.trigger(ChannelRole::Snare);
        for _ in 0..100_000 {
            bank.decay_envelopes();
            let env = bank.envelope(ChannelRole::Snare as usize);
            assert!((0.0..=1.0).contains(&env));
        }
    }

    #[test]
    fn test_silent_without_trigger() {
        let mut bank = VoiceBank::new();
        let params = ChannelParams::for_role(ChannelRole::Kick);
        for _ in 0..64 {
            let s = bank.render(ChannelRole::Kick, &params, grid_pos(0, 0.5));
            assert_eq!(s, 0.0, "percussive voice must be silent with a zero envelope");
        }
    }

    #[test]
    fn test_continuous_voices_sound_without_trigger() {
        let mut bank = VoiceBank::new();
        let params = ChannelParams::for_role(ChannelRole::Pad);
        let peak = (0..1024)
            .map(|_| bank.render(ChannelRole::Pad, &params, grid_pos(0, 0.0)).abs())
            .fold(0.0f32, f32::max);
        assert!(peak > 0.1, "pad should sound untriggered, peak {}", peak);
    }

    #[test]
    fn test_voice_output_bounded() {
        let mut bank = VoiceBank::new();
        for role in ChannelRole::ALL {
            bank.trigger(role);
            let params = ChannelParams::for_role(role);
            for i in 0..4096u64 {
                let pos = StepPosition {
                    sample: i,
                    step: (i / 256) as usize % 16,
                    progress: (i % 256) as f32 / 256.0,
                    step_start: false,
                };
                let s = bank.render(role, &params, pos);
                assert!(s.abs() <= 1.5, "{:?} sample {} out of range: {}", role, i, s);
            }
        }
    }
}
