//! Hash utilities for the blockchain
//! Provides a simpler interface to the cryptographic hash functions

use sha2::{Digest, Sha256};

/// 256-bit hash value - fixed size array for blockchain use
pub type Hash256 = [u8; 32];

/// Compute SHA256(data)
pub fn hash256(data: &[u8]) -> Hash256 {
    let digest = Sha256::digest(data);

    let mut result = [0u8; 32];
    result.copy_from_slice(&digest);
    result
}

/// Convert hash to hexadecimal string
pub fn hash_to_hex(hash_bytes: &[u8]) -> String {
    hex::encode(hash_bytes)
}

/// Count the leading zero hex digits (nibbles) of a hash.
///
/// Proof-of-work difficulty is expressed as the number of zero digits the
/// hexadecimal rendering of the hash must begin with, so a difficulty check
/// compares this count against the required difficulty.
pub fn leading_zero_nibbles(hash: &Hash256) -> u32 {
    let mut count = 0;
    for byte in hash {
        if *byte == 0 {
            count += 2;
        } else {
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_is_deterministic() {
        let data = b"test data";
        assert_eq!(hash256(data), hash256(data));
        assert_ne!(hash256(data), hash256(b"other data"));
    }

    #[test]
    fn test_hash256_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            hash_to_hex(&hash256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_leading_zero_nibbles() {
        let mut hash = [0xffu8; 32];
        assert_eq!(leading_zero_nibbles(&hash), 0);

        hash[0] = 0x0f;
        assert_eq!(leading_zero_nibbles(&hash), 1);

        hash[0] = 0x00;
        assert_eq!(leading_zero_nibbles(&hash), 2);

        hash[1] = 0x0a;
        assert_eq!(leading_zero_nibbles(&hash), 3);

        let all_zero = [0u8; 32];
        assert_eq!(leading_zero_nibbles(&all_zero), 64);
    }
}
