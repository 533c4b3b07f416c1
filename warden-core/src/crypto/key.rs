use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::crypto::types::KEY_SIZE;
use crate::error::{CodecError, Result};

/// The static 256-bit payload key shared out-of-band with the API server.
///
/// The bytes are wiped on drop and never printed: `Debug` is redacted and
/// there is no `Display`.
#[derive(Clone)]
pub struct PayloadKey {
    bytes: Zeroizing<[u8; KEY_SIZE]>,
}

impl PayloadKey {
    /// Load a key from its base64 form (standard alphabet, padded).
    ///
    /// Surrounding whitespace is ignored so values read from files or
    /// environment variables with a trailing newline still load.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CodecError::InvalidKey("key is missing".into()));
        }

        let decoded = Zeroizing::new(
            BASE64
                .decode(encoded)
                .map_err(|e| CodecError::InvalidKey(format!("not valid base64: {e}")))?,
        );
        Self::from_bytes(&decoded)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CodecError::InvalidKey(format!(
                "{} bytes (expected {KEY_SIZE})",
                bytes.len()
            )));
        }

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        let bytes: &mut [u8; KEY_SIZE] = &mut key;
        OsRng.fill_bytes(bytes);
        Self { bytes: key }
    }

    /// Export the key in the same base64 form `from_base64` accepts.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes[..])
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PayloadKey(<redacted>)")
    }
}
