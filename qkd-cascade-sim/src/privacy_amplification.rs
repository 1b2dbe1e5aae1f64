//! Privacy amplification by hashing the reconciled key.
//!
//! The key is packed most-significant-bit first and run through SHA-256, so
//! the secret is always 256 bits no matter how long the key was. A plain
//! cryptographic hash is not a universal hash family: the output is not
//! backed by the leftover hash lemma against an eavesdropper holding partial
//! information, and the parities disclosed during reconciliation are not
//! subtracted from the output length.

use std::fmt;

use sha2::{Digest, Sha256};

/// Digest size in bytes.
pub const SECRET_LEN: usize = 32;

/// The shared secret produced by a successful run.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinalSecret([u8; SECRET_LEN]);

impl FinalSecret {
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, always 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for FinalSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Keep secrets out of accidental debug logs.
impl fmt::Debug for FinalSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FinalSecret({}..)", &self.to_hex()[..8])
    }
}

/// Packs bits eight at a time, MSB first.
///
/// A trailing group shorter than eight bits fills the high-order end of the
/// last byte and leaves the low bits zero.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (index, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[index / 8] |= 1 << (7 - index % 8);
        }
    }
    bytes
}

pub fn hash_bytes(bytes: &[u8]) -> [u8; SECRET_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Compresses Alice's reconciled key into the final secret.
pub fn amplify(key_bits: &[bool]) -> FinalSecret {
    FinalSecret(hash_bytes(&bits_to_bytes(key_bits)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::digest::{digest, SHA256};

    #[test]
    fn test_bits_pack_msb_first() {
        let bits = [
            true, false, true, false, true, false, true, false, // 0xAA
            false, false, false, false, true, true, true, true, // 0x0F
        ];
        assert_eq!(bits_to_bytes(&bits), vec![0xAA, 0x0F]);
    }

    #[test]
    fn test_short_trailing_byte() {
        let bits = [true, true, true, true, true, true, true, true, true, false, true];
        assert_eq!(bits_to_bytes(&bits), vec![0xFF, 0b1010_0000]);
        assert_eq!(bits_to_bytes(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_hash_function_accuracy() {
        let input_chunk = [0b10101010, 0b11001100, 0b11110000, 0b00001111];
        let expected_output = digest(&SHA256, &input_chunk).as_ref().to_vec();
        assert_eq!(
            hash_bytes(&input_chunk).to_vec(),
            expected_output,
            "Hash function did not produce expected output"
        );
    }

    #[test]
    fn test_empty_key_hashes_empty_input() {
        assert_eq!(
            amplify(&[]).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_secret_is_64_lowercase_hex_chars() {
        for len in [1, 7, 8, 9, 100, 1000] {
            let key: Vec<bool> = (0..len).map(|i| i % 5 == 0).collect();
            let secret = amplify(&key).to_string();
            assert_eq!(secret.len(), 64);
            assert!(secret
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_amplification_is_deterministic() {
        let key: Vec<bool> = (0..77).map(|i| i % 3 == 1).collect();
        assert_eq!(amplify(&key), amplify(&key.clone()));
    }

    #[test]
    fn test_single_bit_flip_changes_secret() {
        let key: Vec<bool> = (0..96).map(|i| i % 2 == 0).collect();
        let original = amplify(&key);
        for position in 0..key.len() {
            let mut flipped = key.clone();
            flipped[position] = !flipped[position];
            assert_ne!(amplify(&flipped), original, "flip at {}", position);
        }
    }

    #[test]
    fn test_debug_does_not_print_whole_secret() {
        let secret = amplify(&[true; 16]);
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains(&secret.to_hex()));
    }
}
