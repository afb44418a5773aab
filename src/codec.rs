//! JSON serialization adapter

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encoding profile selecting the serialization strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeProfile {
    /// Compact output for request bodies and wire payloads.
    #[default]
    Wire,
    /// Pretty-printed output for documents under the cache root, so
    /// payloads on disk stay inspectable.
    LocalCache,
}

/// JSON codec used at every serialization seam.
///
/// One instance is shared by the resolution engine, the retry queue, and
/// the write-back path. Payload types bring their own date and binary
/// representations through their serde implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encode a value under the given profile.
    pub fn encode<T: Serialize>(&self, value: &T, profile: EncodeProfile) -> Result<Vec<u8>> {
        let bytes = match profile {
            EncodeProfile::Wire => serde_json::to_vec(value)?,
            EncodeProfile::LocalCache => serde_json::to_vec_pretty(value)?,
        };
        Ok(bytes)
    }

    /// Decode bytes into `T`.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Re-encode raw wire bytes under the local-cache profile.
    ///
    /// The round trip doubles as a shape check: bytes that are not JSON
    /// fail here and never reach the cache store.
    pub fn recode_for_cache(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        self.encode(&value, EncodeProfile::LocalCache)
    }
}
