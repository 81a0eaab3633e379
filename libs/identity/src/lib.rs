//! Board-bound RSA signing identity
//!
//! This library gives a device a signing identity that lives only in process
//! memory: an RSA keypair generated once at bootstrap from hardware entropy
//! personalized with the board identity, a public key exported as hex, and
//! signatures over arbitrary messages.
//!
//! # Signature scheme
//!
//! Signatures do not use PKCS#1 v1.5 or PSS. The SHA-256 digest of the
//! message is right-aligned into a zero-filled block as wide as the modulus,
//! read as a big-endian integer `m`, and raised to the private exponent:
//! `s = m^D mod N`. The signature is `s` in minimal lowercase hex. A verifier
//! holding `(E, N)` checks `s^E mod N == m`.
//!
//! # Modules
//!
//! - `encoding` - digest-to-block padding and minimal hex
//! - `keygen` - DRBG seeding and RSA key generation
//! - `export` - public key display strings
//! - `signer` - signing and verification
//! - `identity` - the identity handle and its one-time initialization cell
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use board_identity::{IdentityCell, IdentityConfig, verify};
//!
//! static IDENTITY: IdentityCell = IdentityCell::new();
//!
//! IDENTITY.generate(&IdentityConfig::default()).unwrap();
//!
//! let public = IDENTITY.export_public_key().unwrap();
//! let signature = IDENTITY.sign(b"ping").unwrap();
//! assert!(verify(&public, b"ping", signature.as_str()).unwrap());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod encoding;
pub mod entropy;
pub mod error;
pub mod export;
pub mod identity;
pub mod keygen;
pub mod signer;
/// Deterministic entropy sources and configurations for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types
pub use config::IdentityConfig;
pub use encoding::{HexString, encode_hex, pad_to_block};
pub use entropy::{EntropySource, OsEntropy};
pub use error::{ErrorClass, IdentityError, Result};
pub use export::PublicKey;
pub use identity::{IdentityCell, SigningIdentity};
pub use keygen::KeyMaterial;
pub use signer::{message_digest, verify};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
