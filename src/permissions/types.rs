//! Permission types
//!
//! - `Feature` - closed set of browser capabilities a page can request
//! - `Decision` - what the user decided for a feature
//! - `PermissionState` - what the shell reports back to the engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::ShellError;

/// A browser capability that a page can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Desktop notifications
    Notifications,
    /// Location access
    Geolocation,
    /// Audio capture only
    Microphone,
    /// Video capture only
    Camera,
    /// Audio and video capture together
    CameraAndMicrophone,
    /// Pointer lock
    MouseLock,
    /// Screen or window capture
    ScreenCapture,
    /// Screen capture including system audio
    ScreenAndAudioCapture,
    /// Async clipboard read/write
    Clipboard,
    /// Enumerating locally installed fonts
    LocalFonts,
}

impl Feature {
    /// Every recognised feature, in file order
    pub const ALL: [Feature; 10] = [
        Feature::Camera,
        Feature::CameraAndMicrophone,
        Feature::Clipboard,
        Feature::Geolocation,
        Feature::LocalFonts,
        Feature::Microphone,
        Feature::MouseLock,
        Feature::Notifications,
        Feature::ScreenAndAudioCapture,
        Feature::ScreenCapture,
    ];

    /// Name used as the key in the permission file
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Notifications => "notifications",
            Feature::Geolocation => "geolocation",
            Feature::Microphone => "microphone",
            Feature::Camera => "camera",
            Feature::CameraAndMicrophone => "camera-and-microphone",
            Feature::MouseLock => "mouse-lock",
            Feature::ScreenCapture => "screen-capture",
            Feature::ScreenAndAudioCapture => "screen-and-audio-capture",
            Feature::Clipboard => "clipboard",
            Feature::LocalFonts => "local-fonts",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ShellError::UnknownFeature(s.to_string()))
    }
}

/// The user's recorded answer for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Allowed for every origin of this profile
    Granted,
    /// Refused for every origin of this profile
    Denied,
    /// Never decided (absent from the file)
    #[default]
    Unset,
}

impl Decision {
    /// Whether this decision is stored on disk
    pub fn is_set(&self) -> bool {
        !matches!(self, Decision::Unset)
    }

    /// Lowercase name; only `granted` and `denied` are ever persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Granted => "granted",
            Decision::Denied => "denied",
            Decision::Unset => "unset",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a persisted value. Only `granted` and `denied` appear in the file;
/// unset is represented by the key being absent.
impl FromStr for Decision {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(Decision::Granted),
            "denied" => Ok(Decision::Denied),
            other => Err(ShellError::InvalidDecision(other.to_string())),
        }
    }
}

impl From<bool> for Decision {
    fn from(granted: bool) -> Self {
        if granted {
            Decision::Granted
        } else {
            Decision::Denied
        }
    }
}

/// Permission result handed to the browser engine for an origin+feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Granted by the user
    Granted,
    /// Denied by the user
    Denied,
    /// No answer; the engine applies its own default
    Unknown,
}

impl From<Decision> for PermissionState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Granted => PermissionState::Granted,
            Decision::Denied => PermissionState::Denied,
            Decision::Unset => PermissionState::Unknown,
        }
    }
}
