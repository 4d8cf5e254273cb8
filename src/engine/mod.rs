//! Engine module hosting the pipeline for multi-threaded embedders.
//!
//! This module exposes the wall-clock abstraction (`clock`) and the
//! `AnalyzerHandle` task host (`handle`).

pub mod clock;
pub mod handle;

pub use clock::{StubTimeSource, SystemTimeSource, TimeSource};
pub use handle::AnalyzerHandle;
