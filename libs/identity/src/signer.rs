//! Message signing and the matching verification check
//!
//! A signature is
//!
//! ```text
//! m = int_be(pad_to_block(SHA-256(message), block_len))
//! s = m^D mod N
//! ```
//!
//! rendered with [`encode_hex`]. Verification recomputes `m` and checks
//! `s^E mod N == m`. There is no PKCS#1/PSS padding; the block layout in
//! [`crate::encoding`] is the whole scheme.

use crate::constants::DIGEST_LEN;
use crate::encoding::{HexString, block_len_for_bits, encode_hex, pad_to_block, parse_integer_hex};
use crate::error::{IdentityError, Result};
use crate::export::PublicKey;
use crate::keygen::{KeyMaterial, WorkingKey};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// SHA-256 of `message`, treated as raw bytes of explicit length
#[must_use]
pub fn message_digest(message: &[u8]) -> [u8; DIGEST_LEN] {
    let result = Sha256::digest(message);
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&result);
    digest
}

/// `m^D mod N` with the private exponent
///
/// This must stay the private-exponent exponentiation. Substituting E here
/// still produces well-formed hex, and every signature silently fails to
/// verify.
fn private_exponentiation(key: &WorkingKey, m: &BigUint) -> Result<BigUint> {
    let n = key.modulus();
    if n.bits() == 0 {
        return Err(IdentityError::SignFailure("modulus is zero".to_string()));
    }
    if m >= n {
        return Err(IdentityError::SignFailure(
            "message block is not below the modulus".to_string(),
        ));
    }
    if m.bits() == 0 {
        return Err(IdentityError::SignFailure(
            "message block is zero".to_string(),
        ));
    }

    Ok(m.modpow(key.private_exponent(), n))
}

/// Sign an already computed digest
///
/// Fails with [`IdentityError::HashFailure`] when the digest is wider than
/// the block, since embedding it would silently drop its leading bytes.
pub fn sign_digest(material: &KeyMaterial, digest: &[u8]) -> Result<HexString> {
    let block_len = material.block_len();
    if digest.len() > block_len {
        return Err(IdentityError::HashFailure(format!(
            "{}-byte digest does not fit a {block_len}-byte block",
            digest.len()
        )));
    }

    let block = pad_to_block(digest, block_len);
    let m = BigUint::from_bytes_be(&block);
    let s = private_exponentiation(material.working_key(), &m)?;

    let s_bytes = s.to_bytes_be();
    if s_bytes.len() > block_len {
        return Err(IdentityError::SignFailure(format!(
            "result is {} bytes, block is {block_len}",
            s_bytes.len()
        )));
    }

    // Full-width block first; encode_hex then strips what it strips
    let signature_block = pad_to_block(&s_bytes, block_len);
    HexString::for_block(encode_hex(&signature_block), block_len)
}

/// Sign `message` with the generated key material
pub fn sign(material: &KeyMaterial, message: &[u8]) -> Result<HexString> {
    let digest = message_digest(message);
    sign_digest(material, &digest)
}

/// Check a hex signature against a message and public key
///
/// Returns `Ok(false)` for any signature that is malformed or does not
/// match. Only an unusable public key is an error.
pub fn verify(public_key: &PublicKey, message: &[u8], signature_hex: &str) -> Result<bool> {
    let (e, n) = public_key.components()?;
    if n.bits() == 0 {
        return Err(IdentityError::InvalidPublicKey(
            "modulus is zero".to_string(),
        ));
    }

    let Some(s) = parse_integer_hex(signature_hex) else {
        return Ok(false);
    };
    if s >= n || s.bits() == 0 {
        return Ok(false);
    }

    let block_len = block_len_for_bits(usize::try_from(n.bits()).unwrap_or(usize::MAX));
    let expected = BigUint::from_bytes_be(&pad_to_block(&message_digest(message), block_len));

    Ok(s.modpow(&e, &n) == expected)
}
