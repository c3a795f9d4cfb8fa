//! User-domain channel strip records
//!
//! The mixer speaks the 0-127 controller domain; the engine keeps its own
//! normalized copy, updated by explicit push on every mutation. These
//! records are the user-facing source of truth.

use tactus_core::ChannelRole;

/// Default channel volume (~79% of full scale)
pub const DEFAULT_VOLUME: u8 = 100;

/// Centered pan
pub const CENTER_PAN: u8 = 64;

/// A single mixer channel strip in the 0-127 controller domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerChannel {
    /// Instrument role; the role's discriminant is the channel index and
    /// the MIDI channel number
    pub role: ChannelRole,
    /// Display name
    pub name: &'static str,
    /// 0-127, mapped to CC 7
    pub volume: u8,
    /// 0-127 (64 = center), mapped to CC 10
    pub pan: u8,
    pub mute: bool,
    pub solo: bool,
}

impl MixerChannel {
    /// A channel strip with default values for `role`
    pub fn new(role: ChannelRole) -> Self {
        Self {
            role,
            name: role.name(),
            volume: DEFAULT_VOLUME,
            pan: CENTER_PAN,
            mute: false,
            solo: false,
        }
    }

    /// Restore volume, pan, mute and solo to their defaults
    pub fn reset(&mut self) {
        self.volume = DEFAULT_VOLUME;
        self.pan = CENTER_PAN;
        self.mute = false;
        self.solo = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_defaults() {
        let ch = MixerChannel::new(ChannelRole::Snare);
        assert_eq!(ch.name, "SNARE");
        assert_eq!(ch.volume, DEFAULT_VOLUME);
        assert_eq!(ch.pan, CENTER_PAN);
        assert!(!ch.mute);
        assert!(!ch.solo);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut ch = MixerChannel::new(ChannelRole::Kick);
        ch.volume = 5;
        ch.pan = 0;
        ch.mute = true;
        ch.solo = true;

        ch.reset();
        assert_eq!(ch, MixerChannel::new(ChannelRole::Kick));
    }
}
