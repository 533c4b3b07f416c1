//! Request/response body protection strategies.
//!
//! The dispatcher never decides on its own whether bodies are encrypted: the
//! caller picks a [`PayloadProtection`] for its deployment. [`SealedPayloads`]
//! is the normal mode. [`PlaintextPayloads`] exists for servers that do not
//! speak the envelope format and logs every use as degraded.

use serde_json::Value;
use warden_core::{CodecError, Envelope, EnvelopeCodec, PayloadKey};

use crate::error::{ClientError, Result};

pub trait PayloadProtection: Send + Sync {
    /// Turn an outgoing JSON body into the JSON actually sent on the wire.
    fn protect(&self, body: &Value) -> Result<Value>;

    /// Decode a response body the server flagged with `x-encrypted: true`.
    fn unprotect(&self, body: Value) -> Result<Value>;

    fn is_encrypted(&self) -> bool;
}

/// Envelope encryption with the deployment's payload key.
#[derive(Debug, Clone)]
pub struct SealedPayloads {
    codec: EnvelopeCodec,
}

impl SealedPayloads {
    pub fn new(codec: EnvelopeCodec) -> Self {
        Self { codec }
    }

    pub fn from_key(key: &PayloadKey) -> Self {
        Self::new(EnvelopeCodec::new(key))
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }
}

impl PayloadProtection for SealedPayloads {
    fn protect(&self, body: &Value) -> Result<Value> {
        let envelope = self.codec.encode(body)?;
        serde_json::to_value(envelope).map_err(ClientError::InvalidRequestBody)
    }

    fn unprotect(&self, body: Value) -> Result<Value> {
        let envelope: Envelope = serde_json::from_value(body).map_err(|e| {
            CodecError::DecryptionFailed(format!("response is not an envelope: {e}"))
        })?;
        Ok(self.codec.decode(&envelope)?)
    }

    fn is_encrypted(&self) -> bool {
        true
    }
}

/// Degraded mode: bodies travel as plain JSON.
#[derive(Debug, Clone, Copy)]
pub struct PlaintextPayloads {
    _private: (),
}

impl PlaintextPayloads {
    pub fn new() -> Self {
        tracing::warn!("Payload encryption disabled: request bodies will be sent in plaintext");
        Self { _private: () }
    }
}

impl Default for PlaintextPayloads {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadProtection for PlaintextPayloads {
    fn protect(&self, body: &Value) -> Result<Value> {
        tracing::warn!("Sending request body unencrypted (plaintext mode)");
        Ok(body.clone())
    }

    fn unprotect(&self, _body: Value) -> Result<Value> {
        Err(ClientError::EncryptedResponseInPlaintextMode)
    }

    fn is_encrypted(&self) -> bool {
        false
    }
}
