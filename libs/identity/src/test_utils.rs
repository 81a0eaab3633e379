//! Deterministic entropy sources and configurations for tests
//!
//! Real bootstrap uses [`crate::entropy::OsEntropy`]. These sources make key
//! generation reproducible, or make it fail on demand.

use crate::config::IdentityConfig;
use crate::entropy::EntropySource;
use crate::error::{IdentityError, Result};
use crate::identity::SigningIdentity;

/// Board identity used by [`test_config`]
pub const TEST_BOARD_ID: &str = "test-board-0001";

/// Entropy source yielding a fixed byte pattern derived from `seed`
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy {
    seed: u8,
}

impl FixedEntropy {
    /// Same seed, same bytes, same key
    #[must_use]
    pub fn new(seed: u8) -> Self {
        Self { seed }
    }
}

impl EntropySource for FixedEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        for (i, byte) in buf.iter_mut().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "pattern wraps")]
            let offset = i as u8;
            *byte = self.seed.wrapping_mul(31).wrapping_add(offset);
        }
        Ok(())
    }
}

/// Entropy source that is always unavailable
#[derive(Debug, Clone, Copy)]
pub struct FailingEntropy;

impl EntropySource for FailingEntropy {
    fn fill(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(IdentityError::EntropySeedFailure(
            "entropy source unavailable".to_string(),
        ))
    }
}

/// Default-sized configuration with a fixed board identity
///
/// Setting `board_id` keeps tests independent of `/etc/machine-id`.
#[must_use]
pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        board_id: Some(TEST_BOARD_ID.to_string()),
        ..IdentityConfig::default()
    }
}

/// Reproducible identity from [`test_config`] and `seed`
pub fn test_identity(seed: u8) -> Result<SigningIdentity> {
    SigningIdentity::generate(&test_config(), &mut FixedEntropy::new(seed))
}
