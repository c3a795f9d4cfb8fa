//! Step sequencer - maps the monotonic sample counter onto the 16-step grid
//!
//! The counter only ever advances; step index and in-step progress are
//! derived from it with the current samples-per-step interval. The interval
//! is integer arithmetic (`sample_rate * 60 / bpm / 4`), recomputed once per
//! rendered block so a BPM change takes effect at the next block boundary.

use crate::patterns::{self, BeatPattern, PATTERNS, STEPS};

/// Global BPM range
pub const MIN_BPM: u16 = 60;
pub const MAX_BPM: u16 = 200;
pub const DEFAULT_BPM: u16 = 120;

/// Position of one rendered sample on the step grid
#[derive(Debug, Clone, Copy)]
pub struct StepPosition {
    /// Absolute sample counter value for this sample
    pub sample: u64,
    /// Step index, 0-15
    pub step: usize,
    /// Fractional progress through the step, [0, 1)
    pub progress: f32,
    /// True exactly at the first sample of a step
    pub step_start: bool,
}

/// Sequencer state: sample counter, tempo and active pattern index
#[derive(Debug, Clone)]
pub struct StepSequencer {
    sample_pos: u64,
    bpm: u16,
    pattern_index: usize,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            sample_pos: 0,
            bpm: DEFAULT_BPM,
            pattern_index: 0,
        }
    }

    /// Samples per 16th-note step at the current tempo (integer arithmetic)
    pub fn samples_per_step(&self, sample_rate: u32) -> u64 {
        u64::from(sample_rate) * 60 / u64::from(self.bpm) / 4
    }

    /// Set the tempo, clamped to [MIN_BPM, MAX_BPM]
    pub fn set_bpm(&mut self, bpm: u16) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Select a pattern by index, wrapped into the bank
    pub fn set_pattern(&mut self, idx: usize) {
        self.pattern_index = idx % PATTERNS.len();
    }

    /// Cycle to the next pattern, wrapping past the end
    pub fn next_pattern(&mut self) {
        self.pattern_index = patterns::wrap_index(self.pattern_index as isize + 1);
    }

    /// Cycle to the previous pattern, wrapping past the start
    pub fn prev_pattern(&mut self) {
        self.pattern_index = patterns::wrap_index(self.pattern_index as isize - 1);
    }

    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    /// The pattern consulted at the next step evaluation
    pub fn pattern(&self) -> &'static BeatPattern {
        &PATTERNS[self.pattern_index]
    }

    /// Step index the counter currently sits on
    pub fn current_step(&self, sample_rate: u32) -> usize {
        ((self.sample_pos / self.samples_per_step(sample_rate)) % STEPS as u64) as usize
    }

    /// Advance the counter by one sample and report the grid position
    ///
    /// `samples_per_step` is passed in rather than recomputed so one block
    /// renders against a single interval.
    pub fn tick(&mut self, samples_per_step: u64) -> StepPosition {
        let sample = self.sample_pos;
        self.sample_pos += 1;

        let step = ((sample / samples_per_step) % STEPS as u64) as usize;
        let within = sample % samples_per_step;
        StepPosition {
            sample,
            step,
            progress: within as f32 / samples_per_step as f32,
            step_start: within == 0,
        }
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SAMPLE_RATE;

    #[test]
    fn test_samples_per_step() {
        let mut seq = StepSequencer::new();
        seq.set_bpm(120);
        // 44100 * 60 / 120 / 4 = 5512 (integer division)
        assert_eq!(seq.samples_per_step(SAMPLE_RATE), 5512);
    }

    #[test]
    fn test_bpm_clamping() {
        let mut seq = StepSequencer::new();

        seq.set_bpm(250);
        assert_eq!(seq.bpm(), MAX_BPM);

        seq.set_bpm(10);
        assert_eq!(seq.bpm(), MIN_BPM);

        seq.set_bpm(135);
        assert_eq!(seq.bpm(), 135);
    }

    #[test]
    fn test_step_advances_and_wraps_once_per_bar() {
        let mut seq = StepSequencer::new();
        seq.set_bpm(120);
        let spb = seq.samples_per_step(SAMPLE_RATE);

        let mut wraps = 0;
        let mut last_step = 0;
        for _ in 0..STEPS as u64 * spb {
            let pos = seq.tick(spb);
            if pos.step < last_step {
                wraps += 1;
            }
            last_step = pos.step;
        }
        assert_eq!(wraps, 0, "no wrap within the first bar");
        assert_eq!(last_step, STEPS - 1);

        // The very next sample starts the second bar
        let pos = seq.tick(spb);
        assert_eq!(pos.step, 0);
        assert!(pos.step_start);
    }

    #[test]
    fn test_step_start_fires_once_per_step() {
        let mut seq = StepSequencer::new();
        seq.set_bpm(120);
        let spb = seq.samples_per_step(SAMPLE_RATE);

        let starts = (0..spb * 4)
            .filter(|_| seq.tick(spb).step_start)
            .count();
        assert_eq!(starts, 4);
    }

    #[test]
    fn test_progress_stays_in_range() {
        let mut seq = StepSequencer::new();
        let spb = seq.samples_per_step(SAMPLE_RATE);
        for _ in 0..spb * 2 {
            let pos = seq.tick(spb);
            assert!((0.0..1.0).contains(&pos.progress));
        }
    }

    #[test]
    fn test_pattern_cycling_round_trip() {
        let mut seq = StepSequencer::new();
        let start = seq.pattern_index();

        for _ in 0..PATTERNS.len() {
            seq.next_pattern();
        }
        assert_eq!(seq.pattern_index(), start, "next^N is the identity");

        seq.next_pattern();
        seq.prev_pattern();
        assert_eq!(seq.pattern_index(), start, "prev undoes next");

        seq.prev_pattern();
        assert_eq!(seq.pattern_index(), PATTERNS.len() - 1, "prev wraps backwards");
    }

    #[test]
    fn test_set_pattern_wraps() {
        let mut seq = StepSequencer::new();
        seq.set_pattern(PATTERNS.len() + 2);
        assert_eq!(seq.pattern_index(), 2);
    }
}
