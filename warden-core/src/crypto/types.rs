// Cipher parameters shared with the API server. AES-256-GCM only.
pub const KEY_SIZE: usize = 32; // 256 bits
pub const GCM_NONCE_SIZE: usize = 12; // 96 bits
pub const GCM_TAG_SIZE: usize = 16; // 128 bits

/// Human-readable algorithm name, used in log lines.
pub const ALGORITHM: &str = "AES-256-GCM";
