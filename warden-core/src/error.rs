use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid payload key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid nonce size: {0} bytes (expected 12)")]
    InvalidNonceSize(usize),

    #[error("Invalid tag size: {0} bytes (expected 16)")]
    InvalidTagSize(usize),

    #[error("Invalid base64 in envelope field `{field}`: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Decrypted payload is not valid JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

/// Coarse failure class of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecErrorKind {
    /// No envelope could be produced (bad key, serialization or cipher failure).
    Encryption,
    /// The envelope was malformed or failed authentication.
    Decryption,
    /// Authentication succeeded but the plaintext is not JSON.
    MalformedPayload,
}

impl CodecError {
    pub fn kind(&self) -> CodecErrorKind {
        match self {
            CodecError::InvalidKey(_) | CodecError::EncryptionFailed(_) => CodecErrorKind::Encryption,
            CodecError::DecryptionFailed(_)
            | CodecError::InvalidNonceSize(_)
            | CodecError::InvalidTagSize(_)
            | CodecError::InvalidField { .. } => CodecErrorKind::Decryption,
            CodecError::MalformedPayload(_) => CodecErrorKind::MalformedPayload,
        }
    }

    pub fn is_decryption_failure(&self) -> bool {
        self.kind() == CodecErrorKind::Decryption
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
