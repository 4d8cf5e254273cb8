//! Per-user adaptation: observation history, corrections, and the
//! persisted `PersonalModel` behind them.

pub mod model;
pub mod persistence;
pub mod store;

pub use model::{Correction, HistoryEntry, PersonalModel};
pub use persistence::{JsonFileStore, MemoryStore, ModelStore};
pub use store::PersonalAdaptationStore;
