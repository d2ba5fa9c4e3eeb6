use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value:?} (expected one of: {expected})")]
pub struct ParseFlagError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseFlagError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            expected,
        }
    }
}

/// Location sharing mode configured on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationMode {
    #[default]
    Off,
    WhileUsing,
    Always,
}

impl LocationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::WhileUsing => "while-using",
            Self::Always => "always",
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl FromStr for LocationMode {
    type Err = ParseFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "while-using" | "while_using" | "foreground" => Ok(Self::WhileUsing),
            "always" | "background" => Ok(Self::Always),
            _ => Err(ParseFlagError::new(
                "location mode",
                s,
                "off, while-using, always",
            )),
        }
    }
}

impl fmt::Display for LocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice wake configuration. Configured is not the same as usable: the
/// microphone permission is tracked separately in [`FeatureFlags`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceWakeMode {
    #[default]
    Off,
    Foreground,
    Always,
}

impl VoiceWakeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Foreground => "foreground",
            Self::Always => "always",
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl FromStr for VoiceWakeMode {
    type Err = ParseFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "foreground" | "on" => Ok(Self::Foreground),
            "always" => Ok(Self::Always),
            _ => Err(ParseFlagError::new(
                "voice wake mode",
                s,
                "off, foreground, always",
            )),
        }
    }
}

impl fmt::Display for VoiceWakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device and runtime toggles captured at connect time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    pub camera_enabled: bool,
    pub location_mode: LocationMode,
    pub voice_wake_mode: VoiceWakeMode,
    pub microphone_permission_granted: bool,
    pub sms_available: bool,
    pub debug_build: bool,
}

impl FeatureFlags {
    /// Voice wake is usable only when configured and the microphone
    /// permission is currently granted.
    pub fn voice_wake_usable(&self) -> bool {
        self.voice_wake_mode.is_enabled() && self.microphone_permission_granted
    }
}

/// Supplies a fresh [`FeatureFlags`] snapshot. Called once per connection
/// attempt; results are never cached across attempts.
pub trait FeatureFlagSource: Send + Sync {
    fn snapshot(&self) -> FeatureFlags;
}

impl FeatureFlagSource for FeatureFlags {
    fn snapshot(&self) -> FeatureFlags {
        *self
    }
}

impl<F> FeatureFlagSource for F
where
    F: Fn() -> FeatureFlags + Send + Sync,
{
    fn snapshot(&self) -> FeatureFlags {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_parse_from_cli_spellings() {
        assert_eq!("while-using".parse(), Ok(LocationMode::WhileUsing));
        assert_eq!("Always".parse(), Ok(LocationMode::Always));
        assert_eq!("on".parse(), Ok(VoiceWakeMode::Foreground));
        assert!("sometimes".parse::<LocationMode>().is_err());
    }

    #[test]
    fn voice_wake_needs_mode_and_permission() {
        let mut flags = FeatureFlags {
            voice_wake_mode: VoiceWakeMode::Always,
            ..FeatureFlags::default()
        };
        assert!(!flags.voice_wake_usable());
        flags.microphone_permission_granted = true;
        assert!(flags.voice_wake_usable());
        flags.voice_wake_mode = VoiceWakeMode::Off;
        assert!(!flags.voice_wake_usable());
    }
}
