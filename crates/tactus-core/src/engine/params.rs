//! Engine-domain channel parameters and boundary conversions
//!
//! The control surface and MIDI both speak 0-127; the engine renders from
//! normalized floats. The conversions live here and nowhere else, so the two
//! representations cannot drift apart. The solo/mute audibility rule is also
//! factored into a single pure function: the render loop and the mixer's
//! outbound fan-out both call it.

use std::f32::consts::FRAC_PI_4;

use crate::types::{ChannelRole, Sample};

/// Per-channel synthesis parameters, owned by the engine state
///
/// Mutated only under the engine lock, via the 0-127 setters.
#[derive(Debug, Clone, Copy)]
pub struct ChannelParams {
    /// Channel level, 0.0 to 1.0
    pub volume: Sample,
    /// Stereo position, -1.0 (left) to 1.0 (right)
    pub pan: Sample,
    pub mute: bool,
    pub solo: bool,
    /// Base frequency in Hz for the role's voice
    pub frequency: Sample,
}

impl ChannelParams {
    /// Parameters with the role's synthesis defaults, centered pan
    pub fn for_role(role: ChannelRole) -> Self {
        let (volume, frequency) = role.defaults();
        Self {
            volume,
            pan: 0.0,
            mute: false,
            solo: false,
            frequency,
        }
    }

    /// Generic defaults for channels beyond the known roles
    pub fn generic() -> Self {
        Self {
            volume: 0.7,
            pan: 0.0,
            mute: false,
            solo: false,
            frequency: 440.0,
        }
    }
}

/// Convert a 0-127 controller value to a 0.0-1.0 level
#[inline]
pub fn volume_from_cc(value: u8) -> Sample {
    Sample::from(value) / 127.0
}

/// Convert a 0-127 controller value to a -1.0-1.0 pan position (64 = center)
#[inline]
pub fn pan_from_cc(value: u8) -> Sample {
    (Sample::from(value) - 64.0) / 64.0
}

/// Pan law: left = cos(theta), right = sin(theta), theta = (pan+1) * pi/4
///
/// Constant-power across the sweep (cos^2 + sin^2 = 1); center pan leaves
/// both gains at 1/sqrt(2).
#[inline]
pub fn pan_gains(pan: Sample) -> (Sample, Sample) {
    let theta = (pan + 1.0) * FRAC_PI_4;
    (theta.cos(), theta.sin())
}

/// The solo/mute audibility rule
///
/// When any channel is soloed, only soloed-and-unmuted channels sound;
/// otherwise every unmuted channel sounds.
#[inline]
pub fn audible(mute: bool, solo: bool, any_solo: bool) -> bool {
    if any_solo {
        solo && !mute
    } else {
        !mute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_conversion() {
        assert_eq!(volume_from_cc(0), 0.0);
        assert_eq!(volume_from_cc(127), 1.0);
        assert!((volume_from_cc(100) - 100.0 / 127.0).abs() < 1e-6);
    }

    #[test]
    fn test_pan_conversion() {
        assert_eq!(pan_from_cc(0), -1.0);
        assert_eq!(pan_from_cc(64), 0.0);
        assert!((pan_from_cc(127) - 63.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn test_pan_law_center() {
        let (l, r) = pan_gains(pan_from_cc(64));
        assert!((l - r).abs() < 1e-6, "center pan must be balanced: {} vs {}", l, r);
    }

    #[test]
    fn test_pan_law_extremes() {
        let (l, r) = pan_gains(pan_from_cc(0));
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6, "full left must silence the right: {}", r);

        let (l, r) = pan_gains(pan_from_cc(127));
        assert!(l.abs() < 0.05, "full right must near-silence the left: {}", l);
        assert!(r > 0.99);
    }

    #[test]
    fn test_pan_law_constant_power() {
        for value in [0u8, 17, 42, 64, 99, 127] {
            let (l, r) = pan_gains(pan_from_cc(value));
            assert!((l * l + r * r - 1.0).abs() < 1e-5, "power at cc {}", value);
        }
    }

    #[test]
    fn test_audibility_rule() {
        // No solo anywhere: mute alone decides
        assert!(audible(false, false, false));
        assert!(!audible(true, false, false));

        // Solo active somewhere: only soloed-and-unmuted channels sound
        assert!(!audible(false, false, true));
        assert!(audible(false, true, true));
        assert!(!audible(true, true, true), "mute beats solo");
    }
}
