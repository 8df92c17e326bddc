//! File signatures for change detection.

use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::str::FromStr;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Signature of a file: modification time and size.
///
/// Persisted between runs as a `"<mtime>_<size>"` string and compared to
/// classify files as new, changed, or unchanged. The signature is never used
/// for date logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileSignature {
    /// Modification time, seconds since the Unix epoch
    pub mtime_secs: u64,
    /// File size in bytes
    pub size: u64,
}

impl FileSignature {
    /// Compute the signature of a file on disk.
    pub fn of(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self::from_metadata(&meta))
    }

    /// Build a signature from already-fetched metadata.
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime_secs = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            mtime_secs,
            size: meta.len(),
        }
    }
}

impl fmt::Display for FileSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.mtime_secs, self.size)
    }
}

#[derive(Debug, Error)]
#[error("Invalid file signature: {0}")]
pub struct SignatureParseError(String);

impl FromStr for FileSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mtime, size) = s
            .split_once('_')
            .ok_or_else(|| SignatureParseError(s.to_string()))?;
        Ok(Self {
            mtime_secs: mtime
                .parse()
                .map_err(|_| SignatureParseError(s.to_string()))?,
            size: size
                .parse()
                .map_err(|_| SignatureParseError(s.to_string()))?,
        })
    }
}

impl Serialize for FileSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let sig = FileSignature {
            mtime_secs: 1735828414,
            size: 2048,
        };
        assert_eq!(sig.to_string(), "1735828414_2048");
        assert_eq!(sig.to_string().parse::<FileSignature>().unwrap(), sig);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("nounderscore".parse::<FileSignature>().is_err());
        assert!("a_b".parse::<FileSignature>().is_err());
    }

    #[test]
    fn test_signature_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        std::fs::write(&path, b"12345").unwrap();

        let sig = FileSignature::of(&path).unwrap();
        assert_eq!(sig.size, 5);
        assert!(sig.mtime_secs > 0);
    }

    #[test]
    fn test_json_round_trip() {
        let sig = FileSignature {
            mtime_secs: 100,
            size: 7,
        };
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, "\"100_7\"");
        let back: FileSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
