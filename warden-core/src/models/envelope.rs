use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire representation of an encrypted JSON payload.
///
/// All three fields are standard base64. The tag travels separately from
/// the ciphertext so the format does not depend on how a particular AEAD
/// library lays out its output buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Base64-encoded 12-byte nonce
    pub iv: String,

    /// Base64-encoded 16-byte GCM authentication tag
    pub tag: String,

    /// Base64-encoded ciphertext, same length as the plaintext
    pub data: String,
}

impl Envelope {
    /// Whether a JSON value has exactly the envelope's shape: an object whose
    /// only keys are `iv`, `tag` and `data`, all strings.
    pub fn is_envelope_shaped(value: &Value) -> bool {
        match value.as_object() {
            Some(map) => {
                map.len() == 3
                    && ["iv", "tag", "data"]
                        .iter()
                        .all(|field| map.get(*field).is_some_and(Value::is_string))
            }
            None => false,
        }
    }
}
