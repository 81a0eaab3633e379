//! Default parameters for the board signing identity
//!
//! Everything here can be overridden through [`crate::config::IdentityConfig`];
//! these are the values used when no configuration file is given.

use std::time::Duration;

/// Default RSA modulus size in bits (128-byte blocks)
pub const DEFAULT_MODULUS_BITS: usize = 1024;

/// Default RSA public exponent (F4)
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

/// SHA-256 digest length in bytes
pub const DIGEST_LEN: usize = 32;

/// Bytes drawn from the entropy source to seed the DRBG
pub const ENTROPY_SEED_LEN: usize = 32;

/// Upper bound on how long key generation waits for the entropy source
pub const DEFAULT_ENTROPY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the host platform publishes the board identity
pub const DEFAULT_BOARD_ID_PATH: &str = "/etc/machine-id";

/// Personalization string used when the platform provides no board identity
pub const DEFAULT_BOARD_ID: &str = "board-identity-unprovisioned";

/// Smallest modulus accepted by configuration validation
pub const MIN_MODULUS_BITS: usize = 512;

/// Largest modulus accepted by configuration validation
pub const MAX_MODULUS_BITS: usize = 4096;
