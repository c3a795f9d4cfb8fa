//! Engine state and the per-sample render loop
//!
//! [`EngineState`] owns everything the render path reads: channel
//! parameters, master level, the sequencer and the voice bank. The audio
//! callback locks it for exactly one block; the control surface and the
//! MIDI listener contend for the same lock between blocks. All setters take
//! 0-127 controller values - the conversion to the normalized engine domain
//! happens here and nowhere else.

use crate::engine::clip::soft_clip;
use crate::engine::params::{audible, pan_from_cc, pan_gains, volume_from_cc, ChannelParams};
use crate::engine::sequencer::StepSequencer;
use crate::engine::voices::VoiceBank;
use crate::patterns::BeatPattern;
use crate::types::{ChannelRole, StereoSample, SAMPLE_RATE};

/// Master level applied before the soft clip (0-127 domain at the setter)
const DEFAULT_MASTER: f32 = 0.8;

/// Synthesis and mix state, exclusively owned behind the engine lock
#[derive(Debug, Clone)]
pub struct EngineState {
    channels: Vec<ChannelParams>,
    master: f32,
    sequencer: StepSequencer,
    voices: VoiceBank,
}

impl EngineState {
    /// State for `channel_count` channels with per-role defaults
    ///
    /// Channels beyond the known roles get generic defaults and render
    /// silence; they exist so controller traffic for them stays a no-op
    /// instead of an error.
    pub fn new(channel_count: usize) -> Self {
        let channels = (0..channel_count)
            .map(|idx| match ChannelRole::from_index(idx) {
                Some(role) => ChannelParams::for_role(role),
                None => ChannelParams::generic(),
            })
            .collect();

        Self {
            channels,
            master: DEFAULT_MASTER,
            sequencer: StepSequencer::new(),
            voices: VoiceBank::new(),
        }
    }

    // --- Parameter setters (0-127 domain, out-of-range index is a no-op) ---

    pub fn set_channel_volume(&mut self, idx: usize, value: u8) {
        if let Some(ch) = self.channels.get_mut(idx) {
            ch.volume = volume_from_cc(value);
        }
    }

    pub fn set_channel_pan(&mut self, idx: usize, value: u8) {
        if let Some(ch) = self.channels.get_mut(idx) {
            ch.pan = pan_from_cc(value);
        }
    }

    pub fn set_channel_mute(&mut self, idx: usize, mute: bool) {
        if let Some(ch) = self.channels.get_mut(idx) {
            ch.mute = mute;
        }
    }

    pub fn set_channel_solo(&mut self, idx: usize, solo: bool) {
        if let Some(ch) = self.channels.get_mut(idx) {
            ch.solo = solo;
        }
    }

    pub fn set_master_volume(&mut self, value: u8) {
        self.master = volume_from_cc(value);
    }

    // --- Sequencer control ---

    pub fn set_bpm(&mut self, bpm: u16) {
        self.sequencer.set_bpm(bpm);
    }

    pub fn bpm(&self) -> u16 {
        self.sequencer.bpm()
    }

    pub fn set_pattern(&mut self, idx: usize) {
        self.sequencer.set_pattern(idx);
    }

    pub fn next_pattern(&mut self) {
        self.sequencer.next_pattern();
    }

    pub fn prev_pattern(&mut self) {
        self.sequencer.prev_pattern();
    }

    pub fn pattern_index(&self) -> usize {
        self.sequencer.pattern_index()
    }

    pub fn pattern(&self) -> &'static BeatPattern {
        self.sequencer.pattern()
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current_step(SAMPLE_RATE)
    }

    /// Render one block of post-clip stereo frames into `out`
    ///
    /// The samples-per-step interval and the any-solo gate are computed once
    /// per block; a tempo or solo change lands on the next block.
    pub fn render_block(&mut self, out: &mut [StereoSample]) {
        let Self {
            channels,
            master,
            sequencer,
            voices,
        } = self;

        let samples_per_step = sequencer.samples_per_step(SAMPLE_RATE);
        let any_solo = channels.iter().any(|ch| ch.solo);

        for frame in out.iter_mut() {
            let pos = sequencer.tick(samples_per_step);

            // Re-arm percussive envelopes at the start of a step with a hit
            if pos.step_start {
                let pattern = sequencer.pattern();
                for role in ChannelRole::ALL {
                    if role.is_percussive() && pattern.hit(role, pos.step) {
                        voices.trigger(role);
                    }
                }
            }

            let mut left = 0.0;
            let mut right = 0.0;
            for (idx, ch) in channels.iter().enumerate() {
                if !audible(ch.mute, ch.solo, any_solo) {
                    continue;
                }
                let Some(role) = ChannelRole::from_index(idx) else {
                    continue;
                };

                let sample = voices.render(role, ch, pos) * ch.volume;
                let (gain_l, gain_r) = pan_gains(ch.pan);
                left += sample * gain_l;
                right += sample * gain_r;
            }

            *frame = StereoSample::new(soft_clip(left * *master), soft_clip(right * *master));

            // Decay after synthesis so a freshly armed envelope is heard at 1.0
            voices.decay_envelopes();
        }
    }
}
