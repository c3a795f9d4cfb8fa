//! Synthesis engine: parameters, sequencer, voices and the owning handle

mod clip;
mod handle;
mod params;
mod sequencer;
mod state;
mod voices;
mod waveform;

pub use clip::soft_clip;
pub use handle::AudioEngine;
pub use params::{audible, pan_from_cc, pan_gains, volume_from_cc, ChannelParams};
pub use sequencer::{StepPosition, StepSequencer, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use state::EngineState;
pub use voices::{VoiceBank, ENVELOPE_DECAY};
pub use waveform::{WaveformRing, WAVEFORM_LEN};
