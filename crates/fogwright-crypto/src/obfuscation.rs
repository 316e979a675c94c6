//! Byte-shift obfuscation layered on top of the block cipher
//!
//! Plaintext and embedded key ids are stored with every byte decremented by
//! one. Deciphered buffers are zero-filled to the block boundary, so the first
//! zero byte marks the end of the text.
//!
//! Plaintext is NUL-free ASCII by contract. A legitimate `0x01` byte in the
//! original text would shift to `0x00` and truncate the output; this is the
//! upstream format and is not worked around.

use crate::ecb::{AesEcbCipher, BLOCK_SIZE};
use crate::error::CryptoError;

/// Fixed key for profile-encrypted payloads
pub const PROFILE_KEY: &[u8; 32] = b"5BCC2D6A95D4DF04A005504E59A9B36E";

/// Control character padding embedded key ids after the shift
pub const KEY_ID_SENTINEL: char = '\u{1}';

/// Fixed part of the embedded key id field; the branch name length is added
pub const KEY_ID_BASE_LEN: usize = 7;

/// Length of the embedded key id field for a branch
pub fn key_id_field_len(branch: &str) -> usize {
    KEY_ID_BASE_LEN + branch.len()
}

/// Decode bytes as ASCII, replacing anything outside the range with `?`
pub fn ascii_decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
        .collect()
}

/// Recover a key id from its embedded field
pub fn decode_key_id(field: &[u8]) -> String {
    let shifted: Vec<u8> = field.iter().map(|b| b.wrapping_add(1)).collect();
    ascii_decode(&shifted).replace(KEY_ID_SENTINEL, "")
}

/// Build the embedded field for a key id
pub fn encode_key_id(key_id: &str, field_len: usize) -> Result<Vec<u8>, CryptoError> {
    if key_id.len() > field_len || !key_id.is_ascii() {
        return Err(CryptoError::KeyIdTooLong {
            key_id: key_id.to_string(),
            field_len,
        });
    }

    let mut field: Vec<u8> = key_id.bytes().map(|b| b.wrapping_sub(1)).collect();
    field.resize(field_len, 0);
    Ok(field)
}

/// Undo the byte shift on a deciphered buffer
///
/// Stops at the first zero byte; it and everything after it is padding.
pub fn unshift_text(deciphered: &[u8]) -> String {
    let emitted: Vec<u8> = deciphered
        .iter()
        .take_while(|&&b| b != 0)
        .map(|b| b.wrapping_add(1))
        .collect();
    ascii_decode(&emitted)
}

/// Decipher and unshift a ciphertext into text
pub fn decrypt_text(key: &[u8], ciphertext: &[u8]) -> Result<String, CryptoError> {
    let cipher = AesEcbCipher::new(key)?;
    let deciphered = cipher.decrypt(ciphertext)?;
    Ok(unshift_text(&deciphered))
}

/// Shift, zero-fill and encipher text
pub fn encrypt_text(key: &[u8], plaintext: &str) -> Result<Vec<u8>, CryptoError> {
    let cipher = AesEcbCipher::new(key)?;
    let mut buffer: Vec<u8> = plaintext.bytes().map(|b| b.wrapping_sub(1)).collect();
    let padded_len = buffer.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    buffer.resize(padded_len, 0);
    cipher.encrypt_in_place(&mut buffer)?;
    Ok(buffer)
}
