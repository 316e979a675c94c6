//! AES-256 in ECB mode without padding
//!
//! CDN payloads are enciphered block by block with no chaining and no padding
//! scheme; the plaintext is zero-filled up to the block boundary instead (see
//! [`crate::obfuscation`]). Keys are 32 bytes.

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::CryptoError;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES-256 block cipher operating in ECB mode
pub struct AesEcbCipher {
    cipher: Aes256,
}

impl AesEcbCipher {
    /// Create a cipher from raw key bytes
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = Aes256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }

    /// Decrypt `data` in place
    pub fn decrypt_in_place(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        check_block_length(data.len())?;
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }

    /// Encrypt `data` in place
    pub fn encrypt_in_place(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        check_block_length(data.len())?;
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }

    /// Decrypt `data` into a new buffer
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut buffer = data.to_vec();
        self.decrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }

    /// Encrypt `data` into a new buffer
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut buffer = data.to_vec();
        self.encrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }
}

fn check_block_length(length: usize) -> Result<(), CryptoError> {
    if length % BLOCK_SIZE == 0 {
        Ok(())
    } else {
        Err(CryptoError::InvalidBlockLength {
            length,
            block_size: BLOCK_SIZE,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fips197_vector() {
        // FIPS-197 appendix C.3
        let key = hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
            .expect("valid hex");
        let plaintext = hex::decode("00112233445566778899aabbccddeeff").expect("valid hex");

        let cipher = AesEcbCipher::new(&key).expect("32-byte key");
        let ciphertext = cipher.encrypt(&plaintext).expect("whole block");
        assert_eq!(hex::encode(&ciphertext), "8ea2b7ca516745bfeafc49904b496089");

        let decrypted = cipher.decrypt(&ciphertext).expect("whole block");
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_blocks_are_independent() {
        let cipher = AesEcbCipher::new(&[7u8; KEY_SIZE]).expect("32-byte key");
        let ciphertext = cipher.encrypt(&[0x41; 32]).expect("two blocks");
        assert_eq!(ciphertext[..16], ciphertext[16..]);
    }

    #[test]
    fn test_invalid_key_size() {
        let result = AesEcbCipher::new(&[0u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKeySize {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_partial_block_rejected() {
        let cipher = AesEcbCipher::new(&[0u8; KEY_SIZE]).expect("32-byte key");
        let result = cipher.decrypt(&[0u8; 17]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidBlockLength { length: 17, .. })
        ));
    }
}
