// Engine error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Engine error code constants
///
/// Error code range: 5001-5002
pub struct EngineErrorCodes {}

impl EngineErrorCodes {
    /// The analyzer task stopped accepting commands
    pub const CHANNEL_CLOSED: i32 = 5001;

    /// The analyzer task dropped a reply
    pub const WORKER_GONE: i32 = 5002;
}

/// Log an engine error with structured context
pub fn log_engine_error(err: &EngineError, context: &str) {
    error!(
        "Engine error in {}: code={}, component=AnalyzerHandle, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors from the task-hosted analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Command channel closed (analyzer task has exited)
    ChannelClosed,

    /// Reply channel dropped before an answer arrived
    WorkerGone,
}

impl ErrorCode for EngineError {
    fn code(&self) -> i32 {
        match self {
            EngineError::ChannelClosed => EngineErrorCodes::CHANNEL_CLOSED,
            EngineError::WorkerGone => EngineErrorCodes::WORKER_GONE,
        }
    }

    fn message(&self) -> String {
        match self {
            EngineError::ChannelClosed => "Analyzer task is no longer running".to_string(),
            EngineError::WorkerGone => "Analyzer task dropped the reply".to_string(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for EngineError {}
