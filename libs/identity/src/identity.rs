//! The process signing identity and its one-time initialization barrier
//!
//! [`SigningIdentity`] can only be obtained from a successful generation, so
//! holding one proves the key material exists. [`IdentityCell`] is the
//! process-wide slot: empty until bootstrap publishes an identity, after
//! which readers share it through an `Arc` and never hold the lock while
//! doing modular arithmetic.
//!
//! ```rust
//! use board_identity::{IdentityCell, IdentityError};
//!
//! let cell = IdentityCell::new();
//! assert!(matches!(cell.sign(b"ping"), Err(IdentityError::NotInitialized)));
//! ```

use crate::config::IdentityConfig;
use crate::encoding::HexString;
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{IdentityError, Result};
use crate::export::{self, PublicKey};
use crate::keygen::{self, KeyMaterial};
use crate::signer;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Generated key material behind a handle that only generation can produce
#[derive(Debug)]
pub struct SigningIdentity {
    material: KeyMaterial,
}

impl SigningIdentity {
    /// Generate a new identity from an explicit entropy source
    pub fn generate(config: &IdentityConfig, entropy: &mut dyn EntropySource) -> Result<Self> {
        let material = keygen::generate(config, entropy)?;
        Ok(Self { material })
    }

    /// Generate a new identity from the OS entropy source
    pub fn bootstrap(config: &IdentityConfig) -> Result<Self> {
        let mut entropy = OsEntropy::new(config.entropy_timeout());
        Self::generate(config, &mut entropy)
    }

    /// Public exponent and modulus
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        export::export_public_key(&self.material)
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Result<HexString> {
        signer::sign(&self.material, message)
    }

    /// Signature block length in bytes
    #[must_use]
    pub fn block_len(&self) -> usize {
        self.material.block_len()
    }

    /// Smallest caller buffer for exported strings and signatures
    #[must_use]
    pub fn required_buffer_len(&self) -> usize {
        2 * self.material.block_len() + 1
    }

    /// Underlying key material
    #[must_use]
    pub fn key_material(&self) -> &KeyMaterial {
        &self.material
    }
}

/// Process-wide slot for the signing identity
///
/// Starts empty. [`IdentityCell::generate`] publishes a new identity only
/// after generation succeeds; a failed generation leaves the previous one in
/// place. Export and sign before the first publication return
/// [`IdentityError::NotInitialized`].
#[derive(Debug, Default)]
pub struct IdentityCell {
    slot: RwLock<Option<Arc<SigningIdentity>>>,
    // Serializes generations so entropy draws and swaps do not interleave
    generation: Mutex<()>,
}

impl IdentityCell {
    /// Create an empty cell (usable in a `static`)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            generation: Mutex::new(()),
        }
    }

    /// Generate with OS entropy and publish the result
    pub fn generate(&self, config: &IdentityConfig) -> Result<()> {
        let mut entropy = OsEntropy::new(config.entropy_timeout());
        self.generate_with(config, &mut entropy)
    }

    /// Generate with `entropy` and publish the result
    pub fn generate_with(
        &self,
        config: &IdentityConfig,
        entropy: &mut dyn EntropySource,
    ) -> Result<()> {
        let _guard = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let identity = SigningIdentity::generate(config, entropy).inspect_err(|e| {
            error!("Identity bootstrap failed: {e}");
        })?;

        let replaced = self.install(identity);
        if replaced {
            info!("Signing identity replaced; earlier signatures no longer verify");
        }
        Ok(())
    }

    /// Publish an already generated identity, returning whether one was replaced
    pub fn install(&self, identity: SigningIdentity) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| {
            error!("Identity lock poisoned, recovering");
            poisoned.into_inner()
        });
        slot.replace(Arc::new(identity)).is_some()
    }

    /// True once an identity has been published
    pub fn is_initialized(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Shared handle to the current identity
    pub fn identity(&self) -> Result<Arc<SigningIdentity>> {
        self.read_slot().ok_or(IdentityError::NotInitialized)
    }

    /// Exported public key of the current identity
    pub fn export_public_key(&self) -> Result<PublicKey> {
        Ok(self.identity()?.public_key())
    }

    /// Buffer form of [`IdentityCell::export_public_key`]
    ///
    /// Each buffer must hold `2 * block_len + 1` bytes.
    pub fn export_public_key_into(
        &self,
        exponent_buf: &mut [u8],
        modulus_buf: &mut [u8],
    ) -> Result<()> {
        self.export_public_key()?.copy_into(exponent_buf, modulus_buf)
    }

    /// Sign `message` with the current identity
    pub fn sign(&self, message: &[u8]) -> Result<HexString> {
        let identity = self.identity()?;
        identity.sign(message).inspect_err(|e| {
            warn!("Message left unsigned: {e}");
        })
    }

    /// Buffer form of [`IdentityCell::sign`]; returns the digit count
    ///
    /// The buffer must hold `2 * block_len + 1` bytes.
    pub fn sign_into(&self, message: &[u8], signature_buf: &mut [u8]) -> Result<usize> {
        self.sign(message)?.copy_into(signature_buf)
    }

    fn read_slot(&self) -> Option<Arc<SigningIdentity>> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| {
                error!("Identity lock poisoned, recovering");
                poisoned.into_inner()
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::verify;
    use crate::test_utils::{FailingEntropy, FixedEntropy, test_config};

    fn initialized_cell(seed: u8) -> IdentityCell {
        let cell = IdentityCell::new();
        cell.generate_with(&test_config(), &mut FixedEntropy::new(seed)).unwrap();
        cell
    }

    #[test]
    fn test_uninitialized_fails_closed() {
        let cell = IdentityCell::new();
        assert!(!cell.is_initialized());
        assert!(matches!(
            cell.export_public_key(),
            Err(IdentityError::NotInitialized)
        ));
        assert!(matches!(cell.sign(b"ping"), Err(IdentityError::NotInitialized)));

        let mut buf = [0u8; 257];
        assert!(matches!(
            cell.sign_into(b"ping", &mut buf),
            Err(IdentityError::NotInitialized)
        ));
        assert_eq!(buf, [0u8; 257]);
    }

    #[test]
    fn test_generate_then_export_and_sign() {
        let cell = initialized_cell(30);
        assert!(cell.is_initialized());

        let public = cell.export_public_key().unwrap();
        assert_eq!(public.exponent_hex().as_str(), "10001");

        let sig = cell.sign(b"ping").unwrap();
        assert!(verify(&public, b"ping", sig.as_str()).unwrap());
    }

    #[test]
    fn test_buffer_interfaces() {
        let cell = initialized_cell(31);
        let required = cell.identity().unwrap().required_buffer_len();
        assert_eq!(required, 257);

        let mut exp_buf = vec![0u8; required];
        let mut mod_buf = vec![0u8; required];
        cell.export_public_key_into(&mut exp_buf, &mut mod_buf).unwrap();
        assert_eq!(&exp_buf[..6], b"10001\0");

        let mut sig_buf = vec![0u8; required];
        let written = cell.sign_into(b"ping", &mut sig_buf).unwrap();
        assert_eq!(sig_buf[written], 0);
        let sig = std::str::from_utf8(&sig_buf[..written]).unwrap();
        assert_eq!(sig, cell.sign(b"ping").unwrap().as_str());

        let mut short = vec![0u8; required - 1];
        assert!(matches!(
            cell.sign_into(b"ping", &mut short),
            Err(IdentityError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_regenerate_replaces_identity() {
        let cell = initialized_cell(32);
        let old_public = cell.export_public_key().unwrap();
        let old_sig = cell.sign(b"ping").unwrap();

        cell.generate_with(&test_config(), &mut FixedEntropy::new(33)).unwrap();
        let new_public = cell.export_public_key().unwrap();

        assert_ne!(old_public, new_public);
        assert!(!verify(&new_public, b"ping", old_sig.as_str()).unwrap());
        assert!(verify(&old_public, b"ping", old_sig.as_str()).unwrap());
    }

    #[test]
    fn test_failed_generation_keeps_previous_identity() {
        let cell = initialized_cell(34);
        let before = cell.export_public_key().unwrap();

        let result = cell.generate_with(&test_config(), &mut FailingEntropy);
        let err = result.unwrap_err();
        assert!(err.is_bootstrap_fatal());

        assert_eq!(cell.export_public_key().unwrap(), before);
    }

    #[test]
    fn test_failed_first_generation_stays_uninitialized() {
        let cell = IdentityCell::new();
        assert!(
            cell.generate_with(&test_config(), &mut FailingEntropy)
                .is_err()
        );
        assert!(matches!(cell.sign(b"ping"), Err(IdentityError::NotInitialized)));
    }

    #[test]
    fn test_handle_survives_replacement() {
        let cell = initialized_cell(35);
        let held = cell.identity().unwrap();
        let held_public = held.public_key();

        cell.generate_with(&test_config(), &mut FixedEntropy::new(36)).unwrap();

        // A handle taken earlier keeps signing with the key it was issued
        let sig = held.sign(b"ping").unwrap();
        assert!(verify(&held_public, b"ping", sig.as_str()).unwrap());
    }

    #[test]
    fn test_static_cell() {
        static CELL: IdentityCell = IdentityCell::new();
        assert!(matches!(
            CELL.export_public_key(),
            Err(IdentityError::NotInitialized)
        ));
    }
}
