// Emotion Resonance Core - audio frames to emotional states
// Frame-driven analysis pipeline with per-user adaptive memory

// Module declarations
pub mod adaptation;
pub mod analysis;
pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod taxonomy;

// Re-exports for convenience
pub use adaptation::{JsonFileStore, MemoryStore, ModelStore, PersonalAdaptationStore, PersonalModel};
pub use analysis::{AudioFrame, EmotionAnalyzer, EmotionDimensions, EmotionalState, MagnitudeScale};
pub use config::AppConfig;
pub use engine::AnalyzerHandle;
pub use taxonomy::EmotionTaxonomy;
