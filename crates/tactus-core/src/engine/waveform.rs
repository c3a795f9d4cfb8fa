//! Waveform ring buffer for visualization
//!
//! The render path overwrites this fixed-size ring with every post-clip
//! stereo frame; a display consumer periodically copies it out. The ring has
//! its own lock at the engine handle so a snapshot never stalls a render for
//! longer than one bounded copy.

use crate::types::StereoSample;

/// Frames kept for display
pub const WAVEFORM_LEN: usize = 128;

/// Fixed-size circular buffer of recent output frames
#[derive(Debug, Clone)]
pub struct WaveformRing {
    frames: [StereoSample; WAVEFORM_LEN],
    head: usize,
}

impl WaveformRing {
    pub fn new() -> Self {
        Self {
            frames: [StereoSample::silence(); WAVEFORM_LEN],
            head: 0,
        }
    }

    /// Overwrite the oldest frame
    #[inline]
    pub fn push(&mut self, frame: StereoSample) {
        self.frames[self.head] = frame;
        self.head = (self.head + 1) % WAVEFORM_LEN;
    }

    /// Copy the ring out in playback order, oldest frame first
    pub fn snapshot(&self) -> Vec<StereoSample> {
        let mut out = Vec::with_capacity(WAVEFORM_LEN);
        for i in 0..WAVEFORM_LEN {
            out.push(self.frames[(self.head + i) % WAVEFORM_LEN]);
        }
        out
    }
}

impl Default for WaveformRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_oldest_first() {
        let mut ring = WaveformRing::new();
        // Write more frames than the ring holds so it wraps
        for i in 0..WAVEFORM_LEN + 10 {
            ring.push(StereoSample::new(i as f32, 0.0));
        }

        let snap = ring.snapshot();
        assert_eq!(snap.len(), WAVEFORM_LEN);
        assert_eq!(snap[0].left, 10.0, "oldest surviving frame first");
        assert_eq!(snap[WAVEFORM_LEN - 1].left, (WAVEFORM_LEN + 9) as f32);
    }

    #[test]
    fn test_fresh_ring_is_silent() {
        let ring = WaveformRing::new();
        assert!(ring.snapshot().iter().all(|f| *f == StereoSample::silence()));
    }
}
