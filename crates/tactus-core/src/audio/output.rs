//! CPAL playback stream
//!
//! Opens the default output device, negotiates a stereo config (i16
//! preferred so the wire format is plain interleaved PCM, f32 accepted),
//! and drives [`EngineState::render_block`] from the device callback. The
//! callback locks the engine state for exactly one block, then takes the
//! waveform ring's own lock for the bounded visualization copy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample as CpalSample, SampleFormat, SampleRate, Stream, StreamConfig};

use super::error::{AudioError, AudioResult};
use crate::engine::{EngineState, WaveformRing};
use crate::types::{StereoSample, SAMPLE_RATE};

/// Headroom applied when quantizing to the output format
const OUTPUT_HEADROOM: f32 = 0.7;

/// Largest callback we pre-allocate for; bigger requests still work but may
/// allocate once
const MAX_BLOCK_FRAMES: usize = 8192;

/// Everything the device callback owns
struct RenderState {
    state: Arc<Mutex<EngineState>>,
    waveform: Arc<Mutex<WaveformRing>>,
    active: Arc<AtomicBool>,
    scratch: Vec<StereoSample>,
}

impl RenderState {
    fn new(
        state: Arc<Mutex<EngineState>>,
        waveform: Arc<Mutex<WaveformRing>>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state,
            waveform,
            active,
            scratch: Vec::with_capacity(MAX_BLOCK_FRAMES),
        }
    }

    /// Render one block into the scratch buffer
    ///
    /// An inactive engine produces silence instead of failing.
    fn render(&mut self, frames: usize) {
        self.scratch.clear();
        self.scratch.resize(frames, StereoSample::silence());

        if !self.active.load(Ordering::Relaxed) {
            return;
        }

        self.state.lock().unwrap().render_block(&mut self.scratch);

        let mut ring = self.waveform.lock().unwrap();
        for frame in &self.scratch {
            ring.push(*frame);
        }
    }
}

/// Open the default output device and start the playback stream
///
/// Returns the stream handle (dropping it stops playback) and the sample
/// rate the device actually runs at.
pub(crate) fn start_stream(
    state: Arc<Mutex<EngineState>>,
    waveform: Arc<Mutex<WaveformRing>>,
    active: Arc<AtomicBool>,
) -> AudioResult<(Stream, u32)> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    log::info!("Using audio device: {}", device_name);

    let supported = pick_output_config(&device)?;
    let sample_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();
    let config = supported.config();

    log::info!(
        "Audio config: {} channels, {}Hz, {:?}",
        config.channels,
        sample_rate,
        sample_format
    );

    let render = RenderState::new(state, waveform, active);
    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, render, |x| {
            (x * OUTPUT_HEADROOM * f32::from(i16::MAX)) as i16
        })?,
        SampleFormat::F32 => build_stream::<f32>(&device, &config, render, |x| x * OUTPUT_HEADROOM)?,
        other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
    };

    stream
        .play()
        .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

    log::info!("Audio stream started");
    Ok((stream, sample_rate))
}

/// Pick the best output configuration for a device
///
/// Prefers i16 then f32, at least stereo, at the engine sample rate; falls
/// back to whatever the device offers with a logged warning.
fn pick_output_config(device: &cpal::Device) -> AudioResult<cpal::SupportedStreamConfig> {
    let configs: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .collect();

    if configs.is_empty() {
        return Err(AudioError::ConfigError(
            "No supported output configurations".to_string(),
        ));
    }

    let target_rate = SampleRate(SAMPLE_RATE);
    let matching = |format: SampleFormat| {
        configs.iter().find(|c| {
            c.sample_format() == format
                && c.channels() >= 2
                && target_rate >= c.min_sample_rate()
                && target_rate <= c.max_sample_rate()
        })
    };

    let best = matching(SampleFormat::I16)
        .or_else(|| matching(SampleFormat::F32))
        .or_else(|| configs.iter().find(|c| c.channels() >= 2))
        .or_else(|| configs.first())
        .ok_or_else(|| {
            AudioError::ConfigError("No suitable output configuration found".to_string())
        })?;

    let rate = if target_rate >= best.min_sample_rate() && target_rate <= best.max_sample_rate() {
        target_rate
    } else {
        let fallback = best.max_sample_rate();
        log::warn!(
            "Audio device doesn't support {}Hz, falling back to {}Hz",
            SAMPLE_RATE,
            fallback.0
        );
        fallback
    };

    Ok(best.clone().with_sample_rate(rate))
}

/// Build an output stream for one sample format
fn build_stream<T: cpal::SizedSample + Send + 'static>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut render: RenderState,
    convert: impl Fn(f32) -> T + Send + 'static,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _info: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                render.render(frames);

                for (frame, sample) in data.chunks_mut(channels).zip(render.scratch.iter()) {
                    frame[0] = convert(sample.left);
                    if channels > 1 {
                        frame[1] = convert(sample.right);
                    }
                    // Fill additional channels with silence
                    for ch in frame.iter_mut().skip(2) {
                        *ch = <T as CpalSample>::EQUILIBRIUM;
                    }
                }
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

    Ok(stream)
}
