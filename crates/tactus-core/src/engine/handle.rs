//! The owning engine handle
//!
//! [`AudioEngine`] is the single explicitly-owned entry point to the
//! synthesis state: it holds the state mutex shared with the device
//! callback, the waveform ring, the active flag and the stream itself.
//! Every consumer receives a reference to this handle; there is no global
//! engine instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::audio::{self, AudioResult};
use crate::engine::state::EngineState;
use crate::engine::waveform::WaveformRing;
use crate::patterns::BeatPattern;
use crate::types::StereoSample;

/// Handle to a running (or released) synthesis engine
pub struct AudioEngine {
    state: Arc<Mutex<EngineState>>,
    waveform: Arc<Mutex<WaveformRing>>,
    active: Arc<AtomicBool>,
    stream: Option<cpal::Stream>,
    sample_rate: u32,
}

impl AudioEngine {
    /// Open the default playback device and begin continuous rendering
    ///
    /// Fails only if the device cannot be acquired; every later operation on
    /// the handle is infallible.
    pub fn start(channel_count: usize) -> AudioResult<Self> {
        let state = Arc::new(Mutex::new(EngineState::new(channel_count)));
        let waveform = Arc::new(Mutex::new(WaveformRing::new()));
        let active = Arc::new(AtomicBool::new(true));

        let (stream, sample_rate) =
            audio::start_stream(state.clone(), waveform.clone(), active.clone())?;

        Ok(Self {
            state,
            waveform,
            active,
            stream: Some(stream),
            sample_rate,
        })
    }

    /// An engine with no playback stream attached
    ///
    /// Setters, getters and snapshots behave normally; nothing pulls the
    /// render path. Used when running without audio.
    pub fn detached(channel_count: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::new(channel_count))),
            waveform: Arc::new(Mutex::new(WaveformRing::new())),
            active: Arc::new(AtomicBool::new(true)),
            stream: None,
            sample_rate: crate::types::SAMPLE_RATE,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().unwrap()
    }

    // --- Channel parameters (0-127 domain, out-of-range index is a no-op) ---

    pub fn set_channel_volume(&self, idx: usize, value: u8) {
        self.state().set_channel_volume(idx, value);
    }

    pub fn set_channel_pan(&self, idx: usize, value: u8) {
        self.state().set_channel_pan(idx, value);
    }

    pub fn set_channel_mute(&self, idx: usize, mute: bool) {
        self.state().set_channel_mute(idx, mute);
    }

    pub fn set_channel_solo(&self, idx: usize, solo: bool) {
        self.state().set_channel_solo(idx, solo);
    }

    pub fn set_master_volume(&self, value: u8) {
        self.state().set_master_volume(value);
    }

    // --- Tempo and pattern ---

    /// Set the tempo, clamped to the engine's BPM range
    pub fn set_bpm(&self, bpm: u16) {
        self.state().set_bpm(bpm);
    }

    pub fn bpm(&self) -> u16 {
        self.state().bpm()
    }

    pub fn set_pattern(&self, idx: usize) {
        self.state().set_pattern(idx);
    }

    pub fn next_pattern(&self) {
        self.state().next_pattern();
    }

    pub fn prev_pattern(&self) {
        self.state().prev_pattern();
    }

    pub fn pattern_index(&self) -> usize {
        self.state().pattern_index()
    }

    pub fn pattern(&self) -> &'static BeatPattern {
        self.state().pattern()
    }

    /// Step the sequencer currently sits on, 0-15
    pub fn current_step(&self) -> usize {
        self.state().current_step()
    }

    /// Sample rate the playback device runs at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Copy the recent output waveform, oldest frame first
    pub fn waveform_snapshot(&self) -> Vec<StereoSample> {
        self.waveform.lock().unwrap().snapshot()
    }

    /// Whether the engine is still rendering (false after shutdown)
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Stop rendering and release the device. Idempotent.
    ///
    /// The callback observes the flag and emits silence for any buffer the
    /// device requests before the stream is torn down.
    pub fn shutdown(&mut self) {
        self.active.store(false, Ordering::Relaxed);
        if self.stream.take().is_some() {
            log::info!("Audio engine shut down");
        }
    }
}
