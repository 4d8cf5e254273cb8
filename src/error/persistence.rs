// Persistence error types and constants

use crate::error::ErrorCode;
use log::warn;
use std::fmt;

/// Persistence error code constants
///
/// Error code range: 4001-4004
pub struct PersistenceErrorCodes {}

impl PersistenceErrorCodes {
    /// Reading or writing the backing medium failed
    pub const IO: i32 = 4001;

    /// Model could not be encoded
    pub const SERIALIZATION: i32 = 4002;

    /// Stored data could not be decoded
    pub const DESERIALIZATION: i32 = 4003;

    /// In-memory store lock was poisoned
    pub const LOCK_POISONED: i32 = 4004;
}

/// Log a persistence error with structured context
///
/// Logged at warn level: persistence failures never interrupt analysis.
pub fn log_persistence_error(err: &PersistenceError, context: &str) {
    warn!(
        "Persistence error in {}: code={}, component=ModelStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors reported by a `ModelStore`
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// Underlying read/write failed
    Io { details: String },

    /// Encoding the personal model failed
    Serialization { reason: String },

    /// Decoding a stored personal model failed
    Deserialization { reason: String },

    /// Mutex guarding an in-memory store was poisoned
    LockPoisoned,
}

impl ErrorCode for PersistenceError {
    fn code(&self) -> i32 {
        match self {
            PersistenceError::Io { .. } => PersistenceErrorCodes::IO,
            PersistenceError::Serialization { .. } => PersistenceErrorCodes::SERIALIZATION,
            PersistenceError::Deserialization { .. } => PersistenceErrorCodes::DESERIALIZATION,
            PersistenceError::LockPoisoned => PersistenceErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            PersistenceError::Io { details } => format!("Store I/O failed: {}", details),
            PersistenceError::Serialization { reason } => {
                format!("Failed to encode personal model: {}", reason)
            }
            PersistenceError::Deserialization { reason } => {
                format!("Failed to decode personal model: {}", reason)
            }
            PersistenceError::LockPoisoned => "Model store lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PersistenceError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PersistenceError {}

/// Convert from std::io::Error to PersistenceError
impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io {
            details: err.to_string(),
        }
    }
}
