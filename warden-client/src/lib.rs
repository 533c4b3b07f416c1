pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod expiry;
pub mod models;
pub mod protection;
pub mod session;

// Re-export commonly used types
pub use client::{ApiClient, ENCRYPTED_HEADER};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use expiry::{LogRedirect, SessionExpiryHandler};
pub use protection::{PayloadProtection, PlaintextPayloads, SealedPayloads};
pub use reqwest::Method;
pub use session::Session;
