//! Mixer coordination layer
//!
//! [`MixerState`] is the user-facing source of truth for channel values in
//! the 0-127 domain. Every mutation pushes the same value into the engine
//! (under its lock) and, where the audibility policy allows, out to the MIDI
//! destination. Inbound CC messages apply the identical update by channel
//! index, so the last writer wins per channel regardless of source.

use tactus_core::engine::{audible, AudioEngine};
use tactus_core::patterns::BeatPattern;
use tactus_core::{ChannelRole, StereoSample};
use tactus_midi::{CcMessage, MidiHandler, CC_PAN, CC_VOLUME};

use crate::channel::{MixerChannel, CENTER_PAN, DEFAULT_VOLUME};

/// Clamp a widened controller computation back into 0-127
fn clamp_cc(value: i16) -> u8 {
    value.clamp(0, 127) as u8
}

/// The complete mixer state
///
/// Owns the engine handle and the MIDI transport; the control surface and
/// the inbound message pump both mutate through here, one operation at a
/// time.
pub struct MixerState {
    channels: Vec<MixerChannel>,
    master_volume: u8,
    selected: usize,
    engine: Option<AudioEngine>,
    midi: MidiHandler,
}

impl MixerState {
    /// Mixer with the 8 role channels and their defaults
    ///
    /// The FX channel starts muted - its swept sine is harsh in a fresh
    /// mix. All defaults are pushed into the engine immediately so both
    /// domains start identical.
    pub fn new(engine: Option<AudioEngine>, midi: MidiHandler) -> Self {
        let mut channels: Vec<MixerChannel> =
            ChannelRole::ALL.iter().map(|&role| MixerChannel::new(role)).collect();
        channels[ChannelRole::Fx as usize].mute = true;

        let state = Self {
            channels,
            master_volume: DEFAULT_VOLUME,
            selected: 0,
            engine,
            midi,
        };
        state.sync_engine();
        state
    }

    /// Push every channel's current values and the master into the engine
    fn sync_engine(&self) {
        let Some(engine) = &self.engine else {
            return;
        };
        for (idx, ch) in self.channels.iter().enumerate() {
            engine.set_channel_volume(idx, ch.volume);
            engine.set_channel_pan(idx, ch.pan);
            engine.set_channel_mute(idx, ch.mute);
            engine.set_channel_solo(idx, ch.solo);
        }
        engine.set_master_volume(self.master_volume);
    }

    // --- Accessors ---

    pub fn channels(&self) -> &[MixerChannel] {
        &self.channels
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_channel(&self) -> Option<&MixerChannel> {
        self.channels.get(self.selected)
    }

    pub fn master_volume(&self) -> u8 {
        self.master_volume
    }

    pub fn engine(&self) -> Option<&AudioEngine> {
        self.engine.as_ref()
    }

    pub fn midi(&self) -> &MidiHandler {
        &self.midi
    }

    pub fn midi_mut(&mut self) -> &mut MidiHandler {
        &mut self.midi
    }

    // --- Channel selection ---

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.channels.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    // --- Audibility fan-out ---

    fn any_solo(&self) -> bool {
        self.channels.iter().any(|ch| ch.solo)
    }

    /// Volume this channel should present on the outbound wire
    ///
    /// Shares `audible` with the engine's render loop, so the two paths
    /// cannot diverge.
    fn outbound_volume(&self, idx: usize) -> u8 {
        let any_solo = self.any_solo();
        self.channels
            .get(idx)
            .map(|ch| {
                if audible(ch.mute, ch.solo, any_solo) {
                    ch.volume
                } else {
                    0
                }
            })
            .unwrap_or(0)
    }

    /// Recompute and send outbound volumes for every channel
    fn push_outbound_volumes(&mut self) {
        let any_solo = self.any_solo();
        for idx in 0..self.channels.len() {
            let ch = &self.channels[idx];
            let volume = if audible(ch.mute, ch.solo, any_solo) {
                ch.volume
            } else {
                0
            };
            self.midi.send_cc(idx as u8, CC_VOLUME, volume);
        }
    }

    // --- Control surface operations (act on the selected channel) ---

    /// Change the selected channel's volume by `delta`, clamped to 0-127
    pub fn adjust_volume(&mut self, delta: i16) {
        let idx = self.selected;
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.volume = clamp_cc(i16::from(ch.volume) + delta);
        let volume = ch.volume;

        if let Some(engine) = &self.engine {
            engine.set_channel_volume(idx, volume);
        }
        let outbound = self.outbound_volume(idx);
        self.midi.send_cc(idx as u8, CC_VOLUME, outbound);
    }

    /// Change the selected channel's pan by `delta`, clamped to 0-127
    pub fn adjust_pan(&mut self, delta: i16) {
        let idx = self.selected;
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.pan = clamp_cc(i16::from(ch.pan) + delta);
        let pan = ch.pan;

        if let Some(engine) = &self.engine {
            engine.set_channel_pan(idx, pan);
        }
        self.midi.send_cc(idx as u8, CC_PAN, pan);
    }

    /// Toggle mute on the selected channel
    pub fn toggle_mute(&mut self) {
        let idx = self.selected;
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.mute = !ch.mute;
        let mute = ch.mute;

        if let Some(engine) = &self.engine {
            engine.set_channel_mute(idx, mute);
        }
        self.push_outbound_volumes();
    }

    /// Toggle solo on the selected channel
    ///
    /// Solo is a global gate, so the flag is re-pushed for every channel and
    /// all outbound volumes are recomputed.
    pub fn toggle_solo(&mut self) {
        let idx = self.selected;
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.solo = !ch.solo;

        if let Some(engine) = &self.engine {
            for (i, c) in self.channels.iter().enumerate() {
                engine.set_channel_solo(i, c.solo);
            }
        }
        self.push_outbound_volumes();
    }

    /// Reset the selected channel to defaults and fan the reset out
    pub fn reset_selected(&mut self) {
        let idx = self.selected;
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.reset();

        if let Some(engine) = &self.engine {
            engine.set_channel_volume(idx, DEFAULT_VOLUME);
            engine.set_channel_pan(idx, CENTER_PAN);
            engine.set_channel_mute(idx, false);
            engine.set_channel_solo(idx, false);
        }
        self.midi.send_cc(idx as u8, CC_PAN, CENTER_PAN);
        // Clearing mute/solo can change every channel's audibility
        self.push_outbound_volumes();
    }

    // --- Inbound control application (by channel index) ---

    /// Set a channel's volume from an inbound message
    ///
    /// Inbound values are not echoed back to the wire.
    pub fn set_channel_volume(&mut self, idx: usize, value: u8) {
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.volume = value.min(127);
        if let Some(engine) = &self.engine {
            engine.set_channel_volume(idx, ch.volume);
        }
    }

    /// Set a channel's pan from an inbound message
    pub fn set_channel_pan(&mut self, idx: usize, value: u8) {
        let Some(ch) = self.channels.get_mut(idx) else {
            return;
        };
        ch.pan = value.min(127);
        if let Some(engine) = &self.engine {
            engine.set_channel_pan(idx, ch.pan);
        }
    }

    /// Apply one inbound control message; unrecognized controllers are ignored
    pub fn apply_cc(&mut self, msg: CcMessage) {
        match msg.controller {
            CC_VOLUME => self.set_channel_volume(usize::from(msg.channel), msg.value),
            CC_PAN => self.set_channel_pan(usize::from(msg.channel), msg.value),
            other => log::debug!("MIDI: ignoring CC {}", other),
        }
    }

    /// Drain the inbound queue and apply every pending message
    pub fn poll_midi(&mut self) {
        while let Some(msg) = self.midi.try_recv() {
            self.apply_cc(msg);
        }
    }

    // --- Master, tempo and pattern ---

    /// Change the master volume by `delta`, clamped to 0-127
    pub fn adjust_master(&mut self, delta: i16) {
        self.master_volume = clamp_cc(i16::from(self.master_volume) + delta);
        if let Some(engine) = &self.engine {
            engine.set_master_volume(self.master_volume);
        }
    }

    /// Change the tempo by `delta`; the engine clamps to its BPM range
    pub fn adjust_bpm(&mut self, delta: i16) {
        if let Some(engine) = &self.engine {
            let bpm = engine.bpm() as i16 + delta;
            engine.set_bpm(bpm.max(0) as u16);
        }
    }

    pub fn bpm(&self) -> u16 {
        self.engine
            .as_ref()
            .map_or(tactus_core::engine::DEFAULT_BPM, AudioEngine::bpm)
    }

    pub fn next_pattern(&mut self) {
        if let Some(engine) = &self.engine {
            engine.next_pattern();
        }
    }

    pub fn prev_pattern(&mut self) {
        if let Some(engine) = &self.engine {
            engine.prev_pattern();
        }
    }

    pub fn pattern_index(&self) -> usize {
        self.engine.as_ref().map_or(0, AudioEngine::pattern_index)
    }

    pub fn pattern(&self) -> Option<&'static BeatPattern> {
        self.engine.as_ref().map(AudioEngine::pattern)
    }

    /// Current sequencer step, 0-15
    pub fn current_step(&self) -> usize {
        self.engine.as_ref().map_or(0, AudioEngine::current_step)
    }

    /// Waveform snapshot for the display, oldest frame first
    pub fn waveform_snapshot(&self) -> Vec<StereoSample> {
        self.engine
            .as_ref()
            .map(AudioEngine::waveform_snapshot)
            .unwrap_or_default()
    }

    /// Shut down the engine and release MIDI resources. Idempotent.
    pub fn close(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.shutdown();
        }
        self.midi.close();
    }
}
