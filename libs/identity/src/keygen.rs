//! RSA key generation bound to the board identity
//!
//! Generation draws entropy, seeds the DRBG with the board identity as
//! personalization, builds an RSA keypair and then keeps only what later
//! operations need:
//!
//! - display strings for the public exponent and modulus
//! - a working key holding the private exponent D and modulus N
//!
//! The public exponent is not part of the working key. Signing computes
//! `m^D mod N` and nothing else.

use crate::config::IdentityConfig;
use crate::encoding::{HexString, block_len_for_bits, integer_hex};
use crate::entropy::{EntropySource, seed_drbg};
use crate::error::{IdentityError, Result};
use log::{debug, error, info};
use num_bigint::BigUint;
use rsa::RsaPrivateKey;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use std::fmt;
use std::time::Instant;
use zeroize::Zeroize;

/// Private exponent and modulus, the only values signing uses
pub struct WorkingKey {
    d: BigUint,
    n: BigUint,
}

impl WorkingKey {
    /// Private exponent D
    pub(crate) fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    /// Modulus N
    pub(crate) fn modulus(&self) -> &BigUint {
        &self.n
    }
}

impl fmt::Debug for WorkingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingKey")
            .field("d", &"<redacted>")
            .field("n_bits", &self.n.bits())
            .finish()
    }
}

/// Everything retained from one key generation
#[derive(Debug)]
pub struct KeyMaterial {
    modulus_bits: usize,
    block_len: usize,
    exponent_hex: HexString,
    modulus_hex: HexString,
    working: WorkingKey,
}

impl KeyMaterial {
    /// Modulus size in bits
    #[must_use]
    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    /// Signature block length in bytes (modulus byte length)
    #[must_use]
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Public exponent as minimal hex
    #[must_use]
    pub fn exponent_hex(&self) -> &HexString {
        &self.exponent_hex
    }

    /// Modulus as minimal hex
    #[must_use]
    pub fn modulus_hex(&self) -> &HexString {
        &self.modulus_hex
    }

    pub(crate) fn working_key(&self) -> &WorkingKey {
        &self.working
    }
}

/// Copy an `rsa` integer into a `num-bigint` one, wiping the byte transfer
fn import_integer(value: &rsa::BigUint) -> BigUint {
    let mut bytes = value.to_bytes_be();
    let imported = BigUint::from_bytes_be(&bytes);
    bytes.zeroize();
    imported
}

/// Generate fresh key material
///
/// Validates `config` first, so an invalid configuration never consumes
/// entropy.
pub fn generate(config: &IdentityConfig, entropy: &mut dyn EntropySource) -> Result<KeyMaterial> {
    config.validate()?;

    let board_id = config.resolve_board_id();
    let mut rng = seed_drbg(entropy, &board_id).inspect_err(|e| error!("{e}"))?;

    debug!(
        "Generating {}-bit RSA key (e = {})...",
        config.modulus_bits, config.public_exponent
    );
    let start = Instant::now();

    let exponent = rsa::BigUint::from(config.public_exponent);
    let key = RsaPrivateKey::new_with_exp(&mut rng, config.modulus_bits, &exponent)
        .map_err(|e| IdentityError::KeyGenerationFailure(e.to_string()))
        .inspect_err(|e| error!("{e}"))?;

    let n = import_integer(key.n());
    let e = import_integer(key.e());
    let d = import_integer(key.d());
    drop(key);

    let bits = usize::try_from(n.bits()).unwrap_or(usize::MAX);
    if bits != config.modulus_bits {
        let err = IdentityError::KeyGenerationFailure(format!(
            "modulus has {bits} bits, expected {}",
            config.modulus_bits
        ));
        error!("{err}");
        return Err(err);
    }

    let block_len = block_len_for_bits(config.modulus_bits);
    let exponent_hex = HexString::for_block(integer_hex(&e), block_len)?;
    let modulus_hex = HexString::for_block(integer_hex(&n), block_len)?;

    info!(
        "Generated {}-bit signing identity in {:?}",
        config.modulus_bits,
        start.elapsed()
    );

    Ok(KeyMaterial {
        modulus_bits: config.modulus_bits,
        block_len,
        exponent_hex,
        modulus_hex,
        working: WorkingKey { d, n },
    })
}
