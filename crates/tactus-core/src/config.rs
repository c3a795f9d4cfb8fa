//! Startup configuration
//!
//! Stored as YAML in the user's config directory. Everything here is a
//! startup knob only; the live mix is never persisted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_BPM;

/// Startup configuration for the engine and transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TactusConfig {
    /// MIDI port name substring to auto-connect (case-insensitive);
    /// `None` starts without a transport
    pub midi_port: Option<String>,
    /// Initial tempo (clamped by the engine on apply)
    pub bpm: u16,
    /// Initial pattern index (wrapped into the bank on apply)
    pub pattern: usize,
    /// Initial master volume, 0-127
    pub master_volume: u8,
}

impl Default for TactusConfig {
    fn default() -> Self {
        Self {
            midi_port: None,
            bpm: DEFAULT_BPM,
            pattern: 0,
            master_volume: 100,
        }
    }
}

/// Default config file location: `<config dir>/tactus/tactus.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tactus")
        .join("tactus.yaml")
}

/// Load configuration from `path`, falling back to defaults
///
/// A missing file is normal (first run); a malformed file is logged and
/// ignored rather than aborting startup.
pub fn load_config(path: &Path) -> TactusConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            return TactusConfig::default();
        }
    };

    match serde_yaml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
            TactusConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/tactus.yaml"));
        assert_eq!(config, TactusConfig::default());
        assert_eq!(config.bpm, DEFAULT_BPM);
        assert_eq!(config.master_volume, 100);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config: TactusConfig = serde_yaml::from_str("bpm: 140\nmidi_port: nanoKONTROL\n").unwrap();
        assert_eq!(config.bpm, 140);
        assert_eq!(config.midi_port.as_deref(), Some("nanoKONTROL"));
        // Unspecified fields keep their defaults
        assert_eq!(config.pattern, 0);
        assert_eq!(config.master_volume, 100);
    }

    #[test]
    fn test_round_trip() {
        let config = TactusConfig {
            midi_port: Some("Launchpad".to_string()),
            bpm: 174,
            pattern: 2,
            master_volume: 90,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: TactusConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
