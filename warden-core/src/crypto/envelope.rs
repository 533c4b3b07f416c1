use std::fmt;

use ::aes_gcm::{Aes256Gcm, Key, KeyInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::crypto::{aes_gcm, key::PayloadKey, types::ALGORITHM};
use crate::error::{CodecError, Result};
use crate::models::envelope::Envelope;

/// Envelope codec for API payloads
///
/// Workflow:
/// 1. Serialize the value to JSON bytes
/// 2. Encrypt with AES-256-GCM under a fresh random nonce
/// 3. Split the tag from the ciphertext
/// 4. Base64-encode nonce, tag and ciphertext into an [`Envelope`]
///
/// The codec holds only the initialized cipher; the raw key is not kept.
/// The cipher's AES round keys are zeroized when the codec is dropped.
#[derive(Clone)]
pub struct EnvelopeCodec {
    cipher: Aes256Gcm,
}

impl EnvelopeCodec {
    pub fn new(key: &PayloadKey) -> Self {
        tracing::debug!("Initialized {} envelope codec", ALGORITHM);
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Build a codec straight from the base64 key configured for this deployment.
    pub fn from_base64_key(encoded: &str) -> Result<Self> {
        Ok(Self::new(&PayloadKey::from_base64(encoded)?))
    }

    /// Encrypt raw bytes into an envelope.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope> {
        let (ciphertext, iv, tag) = aes_gcm::encrypt(&self.cipher, plaintext)?;

        Ok(Envelope {
            iv: BASE64.encode(iv),
            tag: BASE64.encode(tag),
            data: BASE64.encode(&ciphertext),
        })
    }

    /// Decrypt an envelope back to raw bytes.
    ///
    /// Fails closed: malformed base64, wrong field sizes and authentication
    /// failures all return an error and no plaintext.
    pub fn open(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let iv = decode_field("iv", &envelope.iv)?;
        let tag = decode_field("tag", &envelope.tag)?;
        let data = decode_field("data", &envelope.data)?;

        aes_gcm::decrypt(&self.cipher, &data, &iv, &tag)
    }

    /// Serialize `value` to JSON and seal it.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Envelope> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|e| CodecError::EncryptionFailed(format!("payload serialization: {e}")))?;
        self.seal(&plaintext)
    }

    /// Open an envelope and parse the plaintext as JSON.
    pub fn decode(&self, envelope: &Envelope) -> Result<Value> {
        self.decode_as(envelope)
    }

    /// Open an envelope and deserialize the plaintext into `T`.
    pub fn decode_as<T: DeserializeOwned>(&self, envelope: &Envelope) -> Result<T> {
        let plaintext = self.open(envelope)?;
        serde_json::from_slice(&plaintext).map_err(CodecError::MalformedPayload)
    }
}

impl fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

fn decode_field(field: &'static str, encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|source| CodecError::InvalidField { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    fn codec(byte: u8) -> EnvelopeCodec {
        EnvelopeCodec::new(&PayloadKey::from_bytes(&[byte; 32]).unwrap())
    }

    #[test]
    fn test_cipher_key_schedule_is_zeroized_on_drop() {
        fn assert_zeroize_on_drop<T: zeroize::ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<aes::Aes256>();
    }

    fn flip_bit(field: &str, bit: usize) -> String {
        let mut bytes = BASE64.decode(field).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        BASE64.encode(bytes)
    }

    #[test]
    fn test_roundtrip_values() {
        let codec = codec(42);
        let values = [
            json!({ "email": "admin@example.com", "password": "hunter2" }),
            json!([1, 2, 3, { "nested": [true, null] }]),
            json!("unicode: ключ 🔑"),
            json!(12.5),
            json!(null),
            json!({}),
        ];

        for value in values {
            let envelope = codec.encode(&value).unwrap();
            assert_eq!(codec.decode(&envelope).unwrap(), value);
        }
    }

    #[test]
    fn test_typed_roundtrip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct StatusUpdate {
            status: String,
        }

        let codec = codec(5);
        let update = StatusUpdate { status: "contacted".into() };

        let envelope = codec.encode(&update).unwrap();
        let decoded: StatusUpdate = codec.decode_as(&envelope).unwrap();
        assert_eq!(decoded, update);
    }

    #[test]
    fn test_field_sizes() {
        let codec = codec(1);
        let plaintext = br#"{"name":"device-7"}"#;
        let envelope = codec.seal(plaintext).unwrap();

        assert_eq!(BASE64.decode(&envelope.iv).unwrap().len(), 12);
        assert_eq!(BASE64.decode(&envelope.tag).unwrap().len(), 16);
        assert_eq!(BASE64.decode(&envelope.data).unwrap().len(), plaintext.len());
    }

    #[test]
    fn test_nonce_uniqueness() {
        let codec = codec(9);
        let value = json!({ "otp": "123456" });

        let first = codec.encode(&value).unwrap();
        let second = codec.encode(&value).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_tamper_detection_every_bit() {
        let codec = codec(3);
        let envelope = codec.encode(&json!({ "role": "admin" })).unwrap();

        let data_bits = BASE64.decode(&envelope.data).unwrap().len() * 8;
        for bit in 0..data_bits {
            let tampered = Envelope {
                data: flip_bit(&envelope.data, bit),
                ..envelope.clone()
            };
            let err = codec.decode(&tampered).unwrap_err();
            assert_eq!(err.kind(), CodecErrorKind::Decryption, "data bit {bit}");
        }

        for bit in 0..128 {
            let tampered = Envelope {
                tag: flip_bit(&envelope.tag, bit),
                ..envelope.clone()
            };
            let err = codec.decode(&tampered).unwrap_err();
            assert_eq!(err.kind(), CodecErrorKind::Decryption, "tag bit {bit}");
        }
    }

    #[test]
    fn test_wrong_iv_fails() {
        let codec = codec(3);
        let envelope = codec.encode(&json!({ "id": "1" })).unwrap();
        let tampered = Envelope {
            iv: flip_bit(&envelope.iv, 0),
            ..envelope
        };
        assert!(matches!(codec.decode(&tampered), Err(CodecError::DecryptionFailed(_))));
    }

    #[test]
    fn test_wrong_key_fails() {
        let envelope = codec(1).encode(&json!({ "secret": true })).unwrap();
        let result = codec(2).decode(&envelope);
        assert!(matches!(result, Err(CodecError::DecryptionFailed(_))));
    }

    #[test]
    fn test_short_iv_rejected() {
        let codec = codec(4);
        let envelope = Envelope {
            iv: BASE64.encode([0u8; 8]),
            ..codec.encode(&json!(1)).unwrap()
        };
        assert!(matches!(codec.decode(&envelope), Err(CodecError::InvalidNonceSize(8))));
    }

    #[test]
    fn test_long_tag_rejected() {
        let codec = codec(4);
        let envelope = Envelope {
            tag: BASE64.encode([0u8; 17]),
            ..codec.encode(&json!(1)).unwrap()
        };
        assert!(matches!(codec.decode(&envelope), Err(CodecError::InvalidTagSize(17))));
    }

    #[test]
    fn test_invalid_base64_field() {
        let codec = codec(4);
        let envelope = Envelope {
            data: "%%%".to_string(),
            ..codec.encode(&json!(1)).unwrap()
        };
        let err = codec.decode(&envelope).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "data", .. }));
        assert!(err.is_decryption_failure());
    }

    #[test]
    fn test_non_json_plaintext_is_malformed_payload() {
        let codec = codec(6);
        let envelope = codec.seal(b"<html>not json</html>").unwrap();

        let err = codec.decode(&envelope).unwrap_err();
        assert_eq!(err.kind(), CodecErrorKind::MalformedPayload);
    }

    #[test]
    fn test_from_base64_key() {
        let key = PayloadKey::generate();
        let a = EnvelopeCodec::new(&key);
        let b = EnvelopeCodec::from_base64_key(&key.to_base64()).unwrap();

        let envelope = a.encode(&json!({ "ok": 1 })).unwrap();
        assert_eq!(b.decode(&envelope).unwrap(), json!({ "ok": 1 }));
    }

    #[test]
    fn test_missing_key_is_encryption_error() {
        let err = EnvelopeCodec::from_base64_key("").unwrap_err();
        assert_eq!(err.kind(), CodecErrorKind::Encryption);
    }

    #[test]
    fn test_debug_hides_cipher() {
        let printed = format!("{:?}", codec(8));
        assert!(printed.starts_with("EnvelopeCodec"));
        assert!(printed.contains("AES-256-GCM"));
    }

    #[test]
    fn test_serialized_envelope_roundtrip() {
        let codec = codec(77);
        let envelope = codec.encode(&json!({ "page": 2 })).unwrap();

        let json = serde_json::to_string(&envelope).unwrap();
        let deserialized: Envelope = serde_json::from_str(&json).unwrap();

        assert_eq!(codec.decode(&deserialized).unwrap(), json!({ "page": 2 }));
    }
}
