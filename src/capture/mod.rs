//! Capture adapters: turn PCM from files or generators into `AudioFrame`s.
//!
//! The analysis core never depends on this module; it exists so the
//! diagnostics binary and tests can drive the pipeline without an audio
//! device.

pub mod frame_builder;
pub mod sources;
pub mod wav;

pub use frame_builder::{FrameBuilder, DEFAULT_FFT_SIZE};
pub use sources::SyntheticSource;
pub use wav::{read_wav, PcmClip};
