//! Transport (playback) state types

use serde::{Deserialize, Serialize};

/// Playback state machine status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportStatus {
    /// No track loaded
    Stopped,

    /// Resolving/loading the current source
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Repeat mode for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the collection ends
    #[default]
    Off,

    /// Loop the entire collection
    All,

    /// Loop the current track only
    One,
}

impl RepeatMode {
    /// Next mode in the cycle off -> all -> one -> off
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// String representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport settings persisted across restarts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Volume in `[0, 1]`
    pub volume: f32,

    /// Whether shuffle is enabled
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            shuffle: false,
            repeat: RepeatMode::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_cycles_through_all_modes() {
        let mut mode = RepeatMode::Off;
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::All);
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::One);
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::Off);
    }

    #[test]
    fn default_settings() {
        let settings = TransportSettings::default();
        assert_eq!(settings.volume, 0.8);
        assert!(!settings.shuffle);
        assert_eq!(settings.repeat, RepeatMode::Off);
    }
}
