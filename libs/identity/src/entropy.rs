//! Entropy sources and DRBG seeding
//!
//! The DRBG is ChaCha20 keyed with `HMAC-SHA256(entropy, board_id)`, so the
//! board identity personalizes the stream without ever standing in for real
//! entropy. Reading the hardware source happens on a helper thread bounded by
//! a timeout; a stalled source fails bootstrap instead of hanging it.

use crate::constants::ENTROPY_SEED_LEN;
use crate::error::{IdentityError, Result};
use hmac::{Hmac, Mac};
use log::debug;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use sha2::Sha256;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// A source of seed material for key generation
pub trait EntropySource {
    /// Fill `buf` entirely with entropy
    fn fill(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Operating system / hardware entropy via `getrandom`
#[derive(Debug, Clone, Copy)]
pub struct OsEntropy {
    timeout: Duration,
}

impl OsEntropy {
    /// Create a source that gives up after `timeout`
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut bytes = read_with_timeout(buf.len(), self.timeout, |out| {
            getrandom::fill(out).map_err(|e| e.to_string())
        })?;
        buf.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(())
    }
}

/// Run `reader` on a helper thread and wait at most `timeout` for `len` bytes
///
/// On timeout the helper thread is detached; it finishes or blocks on its own
/// and its result is discarded.
fn read_with_timeout<F>(len: usize, timeout: Duration, reader: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut [u8]) -> std::result::Result<(), String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("entropy-reader".to_string())
        .spawn(move || {
            let mut bytes = vec![0u8; len];
            let result = reader(&mut bytes).map(|()| bytes);
            // Receiver is gone after a timeout
            let _ = tx.send(result);
        })
        .map_err(|e| {
            IdentityError::EntropySeedFailure(format!("Cannot spawn entropy reader: {e}"))
        })?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(IdentityError::EntropySeedFailure(format!(
            "Entropy source failed: {e}"
        ))),
        Err(RecvTimeoutError::Timeout) => Err(IdentityError::EntropySeedFailure(format!(
            "Entropy source did not respond within {timeout:?}"
        ))),
        Err(RecvTimeoutError::Disconnected) => Err(IdentityError::EntropySeedFailure(
            "Entropy reader exited without a result".to_string(),
        )),
    }
}

/// Seed a ChaCha20 DRBG from `source`, personalized with `board_id`
pub fn seed_drbg(source: &mut dyn EntropySource, board_id: &[u8]) -> Result<ChaCha20Rng> {
    let mut entropy = [0u8; ENTROPY_SEED_LEN];
    source.fill(&mut entropy)?;

    let mut mac = HmacSha256::new_from_slice(&entropy)
        .map_err(|e| IdentityError::EntropySeedFailure(format!("HMAC init failed: {e}")))?;
    entropy.zeroize();
    mac.update(board_id);

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&mac.finalize().into_bytes());
    let rng = ChaCha20Rng::from_seed(seed);
    seed.zeroize();

    debug!(
        "DRBG seeded ({ENTROPY_SEED_LEN} bytes entropy, {}-byte board identity)",
        board_id.len()
    );
    Ok(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingEntropy, FixedEntropy};
    use rand_chacha::rand_core::RngCore;

    #[test]
    fn test_os_entropy_fills_buffer() {
        let mut source = OsEntropy::new(Duration::from_secs(5));
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        source.fill(&mut a).unwrap();
        source.fill(&mut b).unwrap();
        assert_ne!(a, b, "Two draws of 32 random bytes should differ");
    }

    #[test]
    fn test_stalled_reader_times_out() {
        let result = read_with_timeout(32, Duration::from_millis(50), |_| {
            thread::sleep(Duration::from_secs(2));
            Ok(())
        });
        let err = result.unwrap_err();
        assert!(matches!(err, IdentityError::EntropySeedFailure(_)));
        assert!(err.to_string().contains("did not respond"));
    }

    #[test]
    fn test_failing_reader_reports_cause() {
        let result = read_with_timeout(32, Duration::from_secs(1), |_| {
            Err("device unplugged".to_string())
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("device unplugged"));
    }

    #[test]
    fn test_seed_is_deterministic_for_same_inputs() {
        let mut rng1 = seed_drbg(&mut FixedEntropy::new(7), b"board-a").unwrap();
        let mut rng2 = seed_drbg(&mut FixedEntropy::new(7), b"board-a").unwrap();
        assert_eq!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_board_id_personalizes_stream() {
        let mut rng1 = seed_drbg(&mut FixedEntropy::new(7), b"board-a").unwrap();
        let mut rng2 = seed_drbg(&mut FixedEntropy::new(7), b"board-b").unwrap();
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_seed_failure_propagates() {
        let result = seed_drbg(&mut FailingEntropy, b"board-a");
        assert!(matches!(result, Err(IdentityError::EntropySeedFailure(_))));
    }
}
