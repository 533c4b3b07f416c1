use aes_gcm::{aead::Aead, Aes256Gcm, Nonce};
use crate::crypto::types::{GCM_NONCE_SIZE, GCM_TAG_SIZE};
use crate::error::{CodecError, Result};
use rand::{rngs::OsRng, RngCore};

/// Encrypt data with AES-256-GCM under a fresh random nonce
///
/// Returns: (ciphertext, nonce, tag)
///
/// Note: the `aes-gcm` crate appends the tag to the ciphertext, but the
/// envelope carries it as a separate field, so it is split off here.
pub fn encrypt(
    cipher: &Aes256Gcm,
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; GCM_NONCE_SIZE], [u8; GCM_TAG_SIZE])> {
    let mut nonce = [0u8; GCM_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let (ciphertext, tag) = encrypt_with_nonce(cipher, &nonce, plaintext)?;
    Ok((ciphertext, nonce, tag))
}

/// Encrypt under a caller-chosen nonce. Only for known-answer tests and
/// `encrypt` itself; a nonce must never be reused under the same key.
pub(crate) fn encrypt_with_nonce(
    cipher: &Aes256Gcm,
    nonce: &[u8; GCM_NONCE_SIZE],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; GCM_TAG_SIZE])> {
    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CodecError::EncryptionFailed(e.to_string()))?;

    let tag_start = ciphertext
        .len()
        .checked_sub(GCM_TAG_SIZE)
        .ok_or_else(|| CodecError::EncryptionFailed("cipher output shorter than tag".into()))?;

    let mut tag = [0u8; GCM_TAG_SIZE];
    tag.copy_from_slice(&ciphertext[tag_start..]);
    ciphertext.truncate(tag_start);

    Ok((ciphertext, tag))
}

/// Decrypt data with AES-256-GCM
///
/// Sizes are checked before the cipher runs; an authentication failure
/// returns no plaintext at all.
pub fn decrypt(
    cipher: &Aes256Gcm,
    ciphertext: &[u8],
    nonce: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    if nonce.len() != GCM_NONCE_SIZE {
        return Err(CodecError::InvalidNonceSize(nonce.len()));
    }
    if tag.len() != GCM_TAG_SIZE {
        return Err(CodecError::InvalidTagSize(tag.len()));
    }

    // Reconstruct ciphertext || tag, the layout `encrypt` split apart
    let mut ciphertext_with_tag = Vec::with_capacity(ciphertext.len() + tag.len());
    ciphertext_with_tag.extend_from_slice(ciphertext);
    ciphertext_with_tag.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext_with_tag.as_ref())
        .map_err(|e| CodecError::DecryptionFailed(e.to_string()))
}
