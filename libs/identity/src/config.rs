//! Identity configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so an empty
//! object `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "modulus_bits": 1024,
//!   "public_exponent": 65537,
//!   "board_id": "rev-b-0042",
//!   "board_id_path": "/etc/machine-id",
//!   "entropy_timeout_ms": 5000
//! }
//! ```

use crate::constants::{
    DEFAULT_BOARD_ID, DEFAULT_BOARD_ID_PATH, DEFAULT_ENTROPY_TIMEOUT, DEFAULT_MODULUS_BITS,
    DEFAULT_PUBLIC_EXPONENT, DIGEST_LEN, MAX_MODULUS_BITS, MIN_MODULUS_BITS,
};
use crate::encoding::block_len_for_bits;
use crate::error::{IdentityError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parameters for generating the board signing identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// RSA modulus size in bits; signatures are `modulus_bits / 8` bytes
    pub modulus_bits: usize,

    /// Public exponent used for key generation
    pub public_exponent: u32,

    /// Explicit board identity; takes precedence over `board_id_path`
    pub board_id: Option<String>,

    /// File whose first line holds the board identity
    pub board_id_path: PathBuf,

    /// How long to wait for the entropy source before giving up
    pub entropy_timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            board_id: None,
            board_id_path: PathBuf::from(DEFAULT_BOARD_ID_PATH),
            entropy_timeout_ms: u64::try_from(DEFAULT_ENTROPY_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

impl IdentityConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IdentityError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            IdentityError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.validate()?;
        debug!("Loaded identity config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Check parameters before any entropy is drawn
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&self.modulus_bits) {
            return Err(IdentityError::Config(format!(
                "modulus_bits must be between {MIN_MODULUS_BITS} and {MAX_MODULUS_BITS}, got {}",
                self.modulus_bits
            )));
        }

        if self.modulus_bits % 8 != 0 {
            return Err(IdentityError::Config(format!(
                "modulus_bits must be a multiple of 8, got {}",
                self.modulus_bits
            )));
        }

        // The digest must sit strictly below the modulus
        if self.block_len() <= DIGEST_LEN {
            return Err(IdentityError::Config(format!(
                "{}-byte block cannot hold a {DIGEST_LEN}-byte digest",
                self.block_len()
            )));
        }

        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(IdentityError::Config(format!(
                "public_exponent must be odd and at least 3, got {}",
                self.public_exponent
            )));
        }

        if self.entropy_timeout_ms == 0 {
            return Err(IdentityError::Config(
                "entropy_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Signature block length in bytes
    #[must_use]
    pub fn block_len(&self) -> usize {
        block_len_for_bits(self.modulus_bits)
    }

    /// Entropy wait bound
    #[must_use]
    pub fn entropy_timeout(&self) -> Duration {
        Duration::from_millis(self.entropy_timeout_ms)
    }

    /// Resolve the board identity used as DRBG personalization
    ///
    /// Order: explicit `board_id`, first non-empty line of `board_id_path`,
    /// then [`DEFAULT_BOARD_ID`].
    #[must_use]
    pub fn resolve_board_id(&self) -> Vec<u8> {
        if let Some(id) = &self.board_id {
            return id.as_bytes().to_vec();
        }

        match std::fs::read_to_string(&self.board_id_path) {
            Ok(content) => {
                if let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) {
                    debug!("Board identity read from {}", self.board_id_path.display());
                    return line.as_bytes().to_vec();
                }
                warn!(
                    "Board identity file {} is empty, using built-in identity",
                    self.board_id_path.display()
                );
            }
            Err(e) => {
                warn!(
                    "Cannot read board identity from {}: {e}, using built-in identity",
                    self.board_id_path.display()
                );
            }
        }

        DEFAULT_BOARD_ID.as_bytes().to_vec()
    }
}
