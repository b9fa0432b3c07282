use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier the NVR assigns to a camera.
///
/// Protect uses 24-character hex strings, but nothing in this crate relies
/// on that shape; the newtype only exists so camera identifiers cannot be
/// mixed up with names or other strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(String);

impl CameraId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CameraId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for CameraId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CameraId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for CameraId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_id_round_trip() {
        let id = CameraId::new("5f4d3c2b1a09080706050403");
        assert_eq!(id.as_str(), "5f4d3c2b1a09080706050403");
        assert_eq!(id.to_string(), "5f4d3c2b1a09080706050403");

        let parsed: CameraId = "5f4d3c2b1a09080706050403".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_camera_id_serde_is_transparent() {
        let id = CameraId::new("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");

        let back: CameraId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
