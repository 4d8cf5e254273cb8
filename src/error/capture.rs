// Capture error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Capture error code constants
///
/// Error code range: 2001-2003
pub struct CaptureErrorCodes {}

impl CaptureErrorCodes {
    /// Audio file could not be opened
    pub const OPEN_FAILED: i32 = 2001;

    /// Sample data could not be decoded
    pub const READ_FAILED: i32 = 2002;

    /// File uses a layout the reader does not handle
    pub const UNSUPPORTED_FORMAT: i32 = 2003;
}

/// Log a capture error with structured context
pub fn log_capture_error(err: &CaptureError, context: &str) {
    error!(
        "Capture error in {}: code={}, component=Capture, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors from loading PCM for the diagnostics driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    OpenFailed { path: String, reason: String },
    ReadFailed { path: String, reason: String },
    UnsupportedFormat { path: String, details: String },
}

impl ErrorCode for CaptureError {
    fn code(&self) -> i32 {
        match self {
            CaptureError::OpenFailed { .. } => CaptureErrorCodes::OPEN_FAILED,
            CaptureError::ReadFailed { .. } => CaptureErrorCodes::READ_FAILED,
            CaptureError::UnsupportedFormat { .. } => CaptureErrorCodes::UNSUPPORTED_FORMAT,
        }
    }

    fn message(&self) -> String {
        match self {
            CaptureError::OpenFailed { path, reason } => {
                format!("Failed to open {}: {}", path, reason)
            }
            CaptureError::ReadFailed { path, reason } => {
                format!("Error reading {}: {}", path, reason)
            }
            CaptureError::UnsupportedFormat { path, details } => {
                format!("Unsupported audio format in {}: {}", path, details)
            }
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CaptureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CaptureError {}
