//! Firmware and hardware version metadata

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// Capacity of a firmware name field in bytes
pub const FIRMWARE_NAME_CAPACITY: usize = 64;

/// major.minor.revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl VersionTriple {
    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Board revision, major.minor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl HardwareVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}", self.major, self.minor)
    }
}

/// Firmware image name bounded to [`FIRMWARE_NAME_CAPACITY`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FirmwareName(String);

impl TryFrom<String> for FirmwareName {
    type Error = PlatformError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<FirmwareName> for String {
    fn from(name: FirmwareName) -> Self {
        name.0
    }
}

impl FirmwareName {
    /// Create a name, rejecting anything longer than the field capacity
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() > FIRMWARE_NAME_CAPACITY {
            return Err(PlatformError::NameTooLong {
                len: name.len(),
                max: FIRMWARE_NAME_CAPACITY,
            });
        }
        Ok(Self(name))
    }

    /// Decode a fixed-size name field with its reported length
    ///
    /// The reported length is clamped to the buffer and the field capacity,
    /// and invalid UTF-8 is replaced.
    pub fn from_raw(buf: &[u8], reported_len: usize) -> Self {
        let len = reported_len.min(buf.len()).min(FIRMWARE_NAME_CAPACITY);
        let bytes = &buf[..len];
        let bytes = match bytes.iter().position(|&b| b == 0) {
            Some(nul) => &bytes[..nul],
            None => bytes,
        };
        let mut text = String::from_utf8_lossy(bytes).into_owned();
        // Replacement chars can push a lossy decode past capacity
        while text.len() > FIRMWARE_NAME_CAPACITY {
            text.pop();
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Snapshot of the audio subsystem's version metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FirmwareInfo {
    /// Audio DSP firmware
    pub mx1200_version: VersionTriple,
    /// Voice prompt ("sound remind") firmware
    pub sound_remind_version: VersionTriple,
    pub hardware_version: HardwareVersion,
    pub mx1200_fw_name: FirmwareName,
    pub sound_remind_fw_name: FirmwareName,
}

impl fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mx1200 {} / sound_remind {} / hardware {}",
            self.mx1200_version, self.sound_remind_version, self.hardware_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_capacity() {
        assert!(FirmwareName::new("a".repeat(64)).is_ok());
        let err = FirmwareName::new("a".repeat(65)).unwrap_err();
        assert!(matches!(err, PlatformError::NameTooLong { len: 65, max: 64 }));
    }

    #[test]
    fn test_from_raw_respects_reported_length() {
        let mut buf = [0u8; 64];
        buf[..11].copy_from_slice(b"mx1200_v1.4");

        assert_eq!(FirmwareName::from_raw(&buf, 6).as_str(), "mx1200");
        // Reported length past the terminator stops at the NUL
        assert_eq!(FirmwareName::from_raw(&buf, 40).as_str(), "mx1200_v1.4");
        // Reported length past the buffer is clamped
        assert_eq!(FirmwareName::from_raw(&buf[..11], 200).len(), 11);
    }

    #[test]
    fn test_deserialize_enforces_capacity() {
        let name: FirmwareName = serde_json::from_str(r#""SOUND_REMIND_V1.0.7.bin""#).unwrap();
        assert_eq!(name.as_str(), "SOUND_REMIND_V1.0.7.bin");
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""SOUND_REMIND_V1.0.7.bin""#);

        let oversized = format!("\"{}\"", "a".repeat(65));
        let err = serde_json::from_str::<FirmwareName>(&oversized).unwrap_err();
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(VersionTriple::new(1, 2, 3).to_string(), "V1.2.3");
        assert_eq!(HardwareVersion::new(2, 0).to_string(), "V2.0");
    }
}
