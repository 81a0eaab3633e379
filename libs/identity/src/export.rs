//! Public key export
//!
//! The exported strings are the display values captured at generation time.
//! They are never fed back into signing.

use crate::encoding::{HexString, block_len_for_bits, parse_integer_hex};
use crate::error::{IdentityError, Result};
use crate::keygen::KeyMaterial;
use num_bigint::BigUint;
use std::fmt;

/// Public exponent and modulus as minimal hex strings
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicKey {
    exponent_hex: HexString,
    modulus_hex: HexString,
}

impl PublicKey {
    /// Build from hex strings received from elsewhere (e.g. a verifier's input)
    pub fn from_hex(exponent_hex: &str, modulus_hex: &str) -> Result<Self> {
        let n = parse_integer_hex(modulus_hex)
            .ok_or_else(|| IdentityError::InvalidPublicKey("modulus is not hex".to_string()))?;
        if n.bits() == 0 {
            return Err(IdentityError::InvalidPublicKey(
                "modulus is zero".to_string(),
            ));
        }
        if parse_integer_hex(exponent_hex).is_none() {
            return Err(IdentityError::InvalidPublicKey(
                "exponent is not hex".to_string(),
            ));
        }

        let block_len = block_len_for_bits(usize::try_from(n.bits()).unwrap_or(usize::MAX));
        let exponent_hex = HexString::for_block(exponent_hex.to_ascii_lowercase(), block_len)
            .map_err(|_| IdentityError::InvalidPublicKey("exponent exceeds modulus".to_string()))?;
        let modulus_hex = HexString::for_block(modulus_hex.to_ascii_lowercase(), block_len)
            .map_err(|_| IdentityError::InvalidPublicKey("modulus has leading zeros".to_string()))?;

        Ok(Self {
            exponent_hex,
            modulus_hex,
        })
    }

    /// Public exponent hex (`"10001"` for 65537)
    #[must_use]
    pub fn exponent_hex(&self) -> &HexString {
        &self.exponent_hex
    }

    /// Modulus hex
    #[must_use]
    pub fn modulus_hex(&self) -> &HexString {
        &self.modulus_hex
    }

    /// Block length implied by the modulus
    #[must_use]
    pub fn block_len(&self) -> usize {
        self.modulus_hex.capacity() / 2
    }

    /// Copy both strings into caller buffers of at least `2 * block_len + 1` bytes
    ///
    /// Both buffers are checked before either is written.
    pub fn copy_into(&self, exponent_buf: &mut [u8], modulus_buf: &mut [u8]) -> Result<()> {
        for buf_len in [exponent_buf.len(), modulus_buf.len()] {
            if buf_len < self.modulus_hex.required_buffer_len() {
                return Err(IdentityError::CapacityExceeded {
                    capacity: buf_len,
                    actual: self.modulus_hex.required_buffer_len(),
                });
            }
        }
        self.exponent_hex.copy_into(exponent_buf)?;
        self.modulus_hex.copy_into(modulus_buf)?;
        Ok(())
    }

    /// Parsed `(e, n)` for verification
    pub(crate) fn components(&self) -> Result<(BigUint, BigUint)> {
        let e = parse_integer_hex(self.exponent_hex.as_str())
            .ok_or_else(|| IdentityError::InvalidPublicKey("exponent is not hex".to_string()))?;
        let n = parse_integer_hex(self.modulus_hex.as_str())
            .ok_or_else(|| IdentityError::InvalidPublicKey("modulus is not hex".to_string()))?;
        Ok((e, n))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e={} n={}", self.exponent_hex, self.modulus_hex)
    }
}

/// Copy the display strings out of generated key material
#[must_use]
pub fn export_public_key(material: &KeyMaterial) -> PublicKey {
    PublicKey {
        exponent_hex: material.exponent_hex().clone(),
        modulus_hex: material.modulus_hex().clone(),
    }
}
