//! Byte-layout transforms between digests, integer blocks and hex strings
//!
//! A signature input is not padded with PKCS#1 or PSS. The 32-byte digest is
//! right-aligned into a zero-filled block as wide as the modulus and the
//! block is read as a big-endian integer:
//!
//! ```text
//! [00 00 .. 00][d0 d1 .. d31]
//!  block_len-32    digest
//! ```
//!
//! Hex output is minimal: leading zero bytes are dropped, matching how a
//! big integer serializes itself.

use crate::error::{IdentityError, Result};
use num_bigint::BigUint;
use std::fmt;

/// Bytes needed to hold an integer of `bits` bits
#[must_use]
pub fn block_len_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Right-align `digest` into a zero-filled block of `block_len` bytes
///
/// The last digest byte lands on the last block byte. An oversized digest
/// keeps only its trailing `block_len` bytes.
#[must_use]
pub fn pad_to_block(digest: &[u8], block_len: usize) -> Vec<u8> {
    let mut block = vec![0u8; block_len];
    let take = digest.len().min(block_len);
    block[block_len - take..].copy_from_slice(&digest[digest.len() - take..]);
    block
}

/// Lowercase hex of `block` with the leading run of zero bytes skipped
///
/// An all-zero block encodes to the empty string.
#[must_use]
pub fn encode_hex(block: &[u8]) -> String {
    match block.iter().position(|&b| b != 0) {
        Some(start) => hex::encode(&block[start..]),
        None => String::new(),
    }
}

/// Minimal lowercase radix-16 rendering of an integer (`65537` -> `"10001"`)
///
/// Zero encodes to the empty string.
#[must_use]
pub fn integer_hex(value: &BigUint) -> String {
    if value.bits() == 0 {
        String::new()
    } else {
        value.to_str_radix(16)
    }
}

/// Parse a minimal hex string back into an integer
///
/// The empty string is zero. Odd digit counts are accepted.
pub fn parse_integer_hex(digits: &str) -> Option<BigUint> {
    if digits.is_empty() {
        return Some(BigUint::default());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Hex string with a fixed upper bound on its length
///
/// The bound is two digits per block byte, so a value produced for a given
/// modulus always fits and an undersized caller buffer is caught at the copy
/// boundary rather than overrun.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HexString {
    digits: String,
    capacity: usize,
}

impl HexString {
    /// Wrap `digits`, failing if they exceed `capacity`
    pub fn new(digits: String, capacity: usize) -> Result<Self> {
        if digits.len() > capacity {
            return Err(IdentityError::CapacityExceeded {
                capacity,
                actual: digits.len(),
            });
        }
        Ok(Self { digits, capacity })
    }

    /// Wrap `digits` with the capacity implied by a block length
    pub fn for_block(digits: String, block_len: usize) -> Result<Self> {
        Self::new(digits, 2 * block_len)
    }

    /// The hex digits
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Number of hex digits
    #[must_use]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// True for the encoding of zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Maximum number of digits this string may hold
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Smallest buffer accepted by [`HexString::copy_into`]
    #[must_use]
    pub fn required_buffer_len(&self) -> usize {
        self.capacity + 1
    }

    /// Copy the digits plus a NUL terminator into `buf`
    ///
    /// `buf` must hold `capacity + 1` bytes regardless of the current length,
    /// so a buffer sized for a smaller modulus is rejected on every call.
    /// Returns the number of digits written.
    pub fn copy_into(&self, buf: &mut [u8]) -> Result<usize> {
        let required = self.required_buffer_len();
        if buf.len() < required {
            return Err(IdentityError::CapacityExceeded {
                capacity: buf.len(),
                actual: required,
            });
        }
        let len = self.digits.len();
        buf[..len].copy_from_slice(self.digits.as_bytes());
        buf[len] = 0;
        Ok(len)
    }

    /// Consume into the plain string
    #[must_use]
    pub fn into_string(self) -> String {
        self.digits
    }
}

impl fmt::Display for HexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl AsRef<str> for HexString {
    fn as_ref(&self) -> &str {
        &self.digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_all_ff_digest() {
        let block = pad_to_block(&[0xFF; 32], 128);
        assert_eq!(block.len(), 128);
        assert!(block[..96].iter().all(|&b| b == 0x00));
        assert!(block[96..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_pad_preserves_order() {
        let digest: Vec<u8> = (1..=32).collect();
        let block = pad_to_block(&digest, 128);
        assert_eq!(&block[96..], digest.as_slice());
        assert_eq!(block[127], 32);
    }

    #[test]
    fn test_pad_oversized_digest_keeps_tail() {
        let digest: Vec<u8> = (0..10).collect();
        let block = pad_to_block(&digest, 4);
        assert_eq!(block, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_pad_exact_fit() {
        let digest = [0xAB; 16];
        assert_eq!(pad_to_block(&digest, 16), digest.to_vec());
    }

    #[test]
    fn test_pad_empty_digest() {
        assert_eq!(pad_to_block(&[], 8), vec![0u8; 8]);
    }

    #[test]
    fn test_encode_all_zero_is_empty() {
        assert_eq!(encode_hex(&[0u8; 128]), "");
    }

    #[test]
    fn test_encode_trailing_one() {
        let mut block = [0u8; 128];
        block[127] = 0x01;
        assert_eq!(encode_hex(&block), "01");
    }

    #[test]
    fn test_encode_nonzero_leading_byte() {
        let mut block = [0u8; 128];
        block[0] = 0xAB;
        let hex = encode_hex(&block);
        assert_eq!(hex.len(), 256);
        assert!(hex.starts_with("ab"));
        assert!(hex[2..].chars().all(|c| c == '0'));
    }

    #[test]
    fn test_encode_keeps_interior_zeros() {
        assert_eq!(encode_hex(&[0x00, 0x00, 0x10, 0x00, 0x01]), "100001");
    }

    #[test]
    fn test_integer_hex_is_nibble_minimal() {
        assert_eq!(integer_hex(&BigUint::from(65537u32)), "10001");
        assert_eq!(integer_hex(&BigUint::from(0u32)), "");
        assert_eq!(integer_hex(&BigUint::from(0xABCDu32)), "abcd");
    }

    #[test]
    fn test_parse_integer_hex() {
        assert_eq!(
            parse_integer_hex("10001"),
            Some(BigUint::from(65537u32))
        );
        assert_eq!(parse_integer_hex(""), Some(BigUint::from(0u32)));
        assert_eq!(parse_integer_hex("xyz"), None);
    }

    #[test]
    fn test_block_len_for_bits() {
        assert_eq!(block_len_for_bits(1024), 128);
        assert_eq!(block_len_for_bits(768), 96);
        assert_eq!(block_len_for_bits(1025), 129);
    }

    #[test]
    fn test_hex_string_rejects_overlong() {
        let result = HexString::new("abcdef".to_string(), 4);
        assert!(matches!(
            result,
            Err(IdentityError::CapacityExceeded {
                capacity: 4,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_copy_into_terminates() {
        let hex = HexString::for_block("10001".to_string(), 4).unwrap();
        let mut buf = [0xFFu8; 9];
        let written = hex.copy_into(&mut buf).unwrap();
        assert_eq!(written, 5);
        assert_eq!(&buf[..5], b"10001");
        assert_eq!(buf[5], 0);
    }

    #[test]
    fn test_copy_into_rejects_small_buffer() {
        // Capacity is 8 digits, so 9 bytes are required even for a short value
        let hex = HexString::for_block("01".to_string(), 4).unwrap();
        let mut buf = [0u8; 8];
        let result = hex.copy_into(&mut buf);
        assert!(matches!(
            result,
            Err(IdentityError::CapacityExceeded {
                capacity: 8,
                actual: 9
            })
        ));
        assert_eq!(buf, [0u8; 8], "Rejected copy must not touch the buffer");
    }
}
