pub mod aes_gcm;
pub mod envelope;
pub mod key;
pub mod types;
