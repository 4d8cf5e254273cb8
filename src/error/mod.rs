// Error types for the emotion resonance pipeline
//
// The numeric pipeline itself never fails; these errors cover setup
// (taxonomy loading/validation), persistence of personal models, PCM
// loading for the diagnostics driver, and the task-hosted engine. Each
// family owns a numeric code range.

mod capture;
mod engine;
mod persistence;
mod taxonomy;

pub use capture::{log_capture_error, CaptureError, CaptureErrorCodes};
pub use engine::{log_engine_error, EngineError, EngineErrorCodes};
pub use persistence::{log_persistence_error, PersistenceError, PersistenceErrorCodes};
pub use taxonomy::{log_taxonomy_error, TaxonomyError, TaxonomyErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// library, CLI and host boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_trait_objects() {
        let errors: Vec<Box<dyn ErrorCode>> = vec![
            Box::new(TaxonomyError::Empty),
            Box::new(PersistenceError::LockPoisoned),
            Box::new(EngineError::ChannelClosed),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![3001, 4004, 5001]);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), TaxonomyError> {
            Err(TaxonomyError::Empty)
        }

        fn caller() -> Result<(), TaxonomyError> {
            may_fail()?;
            Ok(())
        }

        assert!(caller().is_err());
    }
}
