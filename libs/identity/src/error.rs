//! Error taxonomy for identity bootstrap, export and signing

use thiserror::Error;

/// How a caller is expected to react to an [`IdentityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The device has no usable identity; startup must not proceed
    Bootstrap,
    /// The caller broke a precondition (ordering, buffer size, bad input)
    Caller,
    /// This message could not be signed; it must be treated as unsigned
    Message,
}

/// Identity errors
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The DRBG could not be seeded from the entropy source
    #[error("Failed to seed DRBG: {0}")]
    EntropySeedFailure(String),

    /// RSA keypair generation failed
    #[error("Failed to generate RSA key: {0}")]
    KeyGenerationFailure(String),

    /// Export or sign was attempted before a successful generation
    #[error("Signing identity has not been generated")]
    NotInitialized,

    /// The message digest could not be computed or embedded
    #[error("Failed to calculate message hash: {0}")]
    HashFailure(String),

    /// The private-key exponentiation failed
    #[error("Failed to sign message: {0}")]
    SignFailure(String),

    /// A caller-supplied buffer or string exceeded its bound
    #[error("Capacity exceeded: need {actual} bytes, have {capacity}")]
    CapacityExceeded {
        /// Bytes available
        capacity: usize,
        /// Bytes required
        actual: usize,
    },

    /// Public key components could not be parsed for verification
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Configuration is invalid or unreadable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IdentityError {
    /// Classify the error for recovery decisions
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EntropySeedFailure(_) | Self::KeyGenerationFailure(_) | Self::Config(_) => {
                ErrorClass::Bootstrap
            }
            Self::NotInitialized | Self::CapacityExceeded { .. } | Self::InvalidPublicKey(_) => {
                ErrorClass::Caller
            }
            Self::HashFailure(_) | Self::SignFailure(_) => ErrorClass::Message,
        }
    }

    /// True when identity bootstrap must be abandoned
    #[must_use]
    pub fn is_bootstrap_fatal(&self) -> bool {
        self.class() == ErrorClass::Bootstrap
    }
}

/// Result type for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;
