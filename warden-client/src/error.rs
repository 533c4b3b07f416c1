use thiserror::Error;
use warden_core::CodecError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// Request paths must be absolute (`/users`) and stay on the base URL's host.
    #[error("Invalid request path: {0:?}")]
    InvalidPath(String),

    /// Non-2xx response. `message` is the server's `message` field when it
    /// sent one, otherwise a generic status line.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to serialize request body: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),

    #[error("Invalid response body: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Response has the shape of an encrypted envelope but no x-encrypted header")]
    UnsignaledEnvelope,

    #[error("Server sent an encrypted response but payload encryption is disabled")]
    EncryptedResponseInPlaintextMode,
}

impl ClientError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            ClientError::SessionExpired => Some(401),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
