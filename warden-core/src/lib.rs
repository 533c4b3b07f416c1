pub mod crypto;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use crypto::envelope::EnvelopeCodec;
pub use crypto::key::PayloadKey;
pub use error::{CodecError, CodecErrorKind, Result};
pub use models::envelope::Envelope;
