//! AnalyzerHandle: hosts an `EmotionAnalyzer` on its own tokio task.
//!
//! The task is the single owner of the analyzer and therefore of the
//! personal adaptation store. Other tasks talk to it through a command
//! channel, receive states from a broadcast channel, and read the personal
//! model only through snapshot copies.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::adaptation::PersonalModel;
use crate::analysis::{AudioFrame, Color, EmotionAnalyzer, EmotionalState};
use crate::error::{log_engine_error, log_persistence_error, EngineError};

/// Command queue depth; `submit` waits when the analyzer falls this far behind
const COMMAND_BUFFER: usize = 64;
/// Broadcast depth; slow subscribers lag rather than block the analyzer
const STATE_BUFFER: usize = 128;

enum Command {
    Analyze {
        frame: AudioFrame,
        reply: Option<oneshot::Sender<EmotionalState>>,
    },
    Correct {
        original: EmotionalState,
        corrected: String,
        context: String,
    },
    SetColors {
        category: String,
        colors: Vec<Color>,
    },
    Snapshot(oneshot::Sender<PersonalModel>),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<PersonalModel>),
}

/// Front end to the analyzer task
pub struct AnalyzerHandle {
    command_tx: mpsc::Sender<Command>,
    states_tx: broadcast::Sender<EmotionalState>,
    worker: Option<JoinHandle<()>>,
}

impl AnalyzerHandle {
    /// Move `analyzer` onto a new task of the current tokio runtime
    pub fn spawn(analyzer: EmotionAnalyzer) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (states_tx, _) = broadcast::channel(STATE_BUFFER);
        let worker = tokio::spawn(run_worker(analyzer, command_rx, states_tx.clone()));

        Self {
            command_tx,
            states_tx,
            worker: Some(worker),
        }
    }

    /// Receive every state the analyzer produces from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EmotionalState> {
        self.states_tx.subscribe()
    }

    /// Queue a frame; the result goes to subscribers only
    pub async fn submit(&self, frame: AudioFrame) -> Result<(), EngineError> {
        self.send(Command::Analyze { frame, reply: None }).await
    }

    /// Analyze a frame and wait for its state (also broadcast)
    pub async fn analyze(&self, frame: AudioFrame) -> Result<EmotionalState, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Analyze {
            frame,
            reply: Some(reply),
        })
        .await?;
        rx.await.map_err(|_| EngineError::WorkerGone)
    }

    pub async fn record_correction(
        &self,
        original: EmotionalState,
        corrected: &str,
        context: &str,
    ) -> Result<(), EngineError> {
        self.send(Command::Correct {
            original,
            corrected: corrected.to_string(),
            context: context.to_string(),
        })
        .await
    }

    pub async fn set_color_preference(
        &self,
        category: &str,
        colors: Vec<Color>,
    ) -> Result<(), EngineError> {
        self.send(Command::SetColors {
            category: category.to_string(),
            colors,
        })
        .await
    }

    /// Copy of the personal model as of every command queued before this one
    pub async fn snapshot(&self) -> Result<PersonalModel, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| EngineError::WorkerGone)
    }

    /// Write the personal model through to its store
    ///
    /// Store failures are logged by the worker, not returned.
    pub async fn flush(&self) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush(reply)).await?;
        rx.await.map_err(|_| EngineError::WorkerGone)
    }

    /// Flush, stop the task, and return the final personal model
    pub async fn shutdown(mut self) -> Result<PersonalModel, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown(reply)).await?;
        let model = rx.await.map_err(|_| EngineError::WorkerGone)?;
        if let Some(worker) = self.worker.take() {
            worker.await.map_err(|_| EngineError::WorkerGone)?;
        }
        Ok(model)
    }

    async fn send(&self, command: Command) -> Result<(), EngineError> {
        self.command_tx.send(command).await.map_err(|_| {
            let err = EngineError::ChannelClosed;
            log_engine_error(&err, "AnalyzerHandle::send");
            err
        })
    }
}

impl Drop for AnalyzerHandle {
    fn drop(&mut self) {
        // Dropping command_tx ends the worker loop on its own; nothing to join
        if let Some(worker) = self.worker.take() {
            log::debug!(
                "[AnalyzerHandle] Dropped without shutdown (worker finished: {})",
                worker.is_finished()
            );
        }
    }
}

async fn run_worker(
    mut analyzer: EmotionAnalyzer,
    mut command_rx: mpsc::Receiver<Command>,
    states_tx: broadcast::Sender<EmotionalState>,
) {
    log::info!("[AnalyzerHandle] Worker started");
    let mut frames: u64 = 0;

    while let Some(command) = command_rx.recv().await {
        match command {
            Command::Analyze { frame, reply } => {
                let state = analyzer.analyze(&frame);
                frames += 1;
                // No subscribers is fine
                let _ = states_tx.send(state.clone());
                if let Some(reply) = reply {
                    let _ = reply.send(state);
                }
            }
            Command::Correct {
                original,
                corrected,
                context,
            } => analyzer.record_correction(&original, &corrected, &context),
            Command::SetColors { category, colors } => {
                analyzer.store_mut().set_color_preference(&category, colors)
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(analyzer.store().snapshot());
            }
            Command::Flush(reply) => {
                flush_store(&mut analyzer, "AnalyzerHandle::flush");
                let _ = reply.send(());
            }
            Command::Shutdown(reply) => {
                flush_store(&mut analyzer, "AnalyzerHandle::shutdown");
                let _ = reply.send(analyzer.store().snapshot());
                break;
            }
        }
    }

    log::info!("[AnalyzerHandle] Worker stopped after {} frames", frames);
}

fn flush_store(analyzer: &mut EmotionAnalyzer, context: &str) {
    if let Err(err) = analyzer.store_mut().flush() {
        log_persistence_error(&err, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::{MemoryStore, ModelStore, PersonalAdaptationStore};
    use crate::config::AppConfig;
    use crate::engine::clock::StubTimeSource;
    use crate::taxonomy::EmotionTaxonomy;
    use std::sync::Arc;

    fn analyzer(store: PersonalAdaptationStore) -> EmotionAnalyzer {
        EmotionAnalyzer::new(EmotionTaxonomy::builtin(), &AppConfig::default(), store)
            .unwrap()
            .with_time_source(Arc::new(StubTimeSource::default()))
    }

    fn tone_frame() -> AudioFrame {
        let mut magnitudes = vec![0.0; 256];
        for n in 1..5 {
            magnitudes[n * 10] = 200.0 / n as f32;
        }
        let samples = (0..512)
            .map(|i| if (i / 16) % 2 == 0 { 180 } else { 76 })
            .collect();
        AudioFrame::linear(magnitudes, samples, 44_100)
    }

    #[tokio::test]
    async fn test_analyze_replies_and_broadcasts() {
        let handle = AnalyzerHandle::spawn(analyzer(PersonalAdaptationStore::default()));
        let mut states = handle.subscribe();

        let state = handle.analyze(tone_frame()).await.unwrap();
        let broadcast = states.recv().await.unwrap();
        assert_eq!(state, broadcast);

        handle.submit(tone_frame()).await.unwrap();
        let second = states.recv().await.unwrap();
        assert_eq!(second.primary_category, state.primary_category);

        let model = handle.snapshot().await.unwrap();
        assert_eq!(model.emotion_history.len(), 2);
    }

    #[tokio::test]
    async fn test_corrections_and_colors_reach_the_store() {
        let handle = AnalyzerHandle::spawn(analyzer(PersonalAdaptationStore::default()));
        let state = handle.analyze(tone_frame()).await.unwrap();

        handle
            .record_correction(state.clone(), "Trust", "calmer")
            .await
            .unwrap();
        handle
            .set_color_preference(&state.primary_category, vec![Color::rgb(9, 9, 9)])
            .await
            .unwrap();

        let model = handle.snapshot().await.unwrap();
        assert_eq!(model.user_corrections.len(), 1);
        assert_eq!(model.user_corrections[0].corrected, "Trust");
        assert_eq!(
            model.color_preferences.get(&state.primary_category),
            Some(&vec![Color::rgb(9, 9, 9)])
        );
    }

    #[tokio::test]
    async fn test_shutdown_flushes_to_store() {
        let backend = MemoryStore::new();
        let store = PersonalAdaptationStore::restore(
            AppConfig::default().adaptation,
            Box::new(backend.clone()),
            "frank",
        );
        let handle = AnalyzerHandle::spawn(analyzer(store));
        for _ in 0..3 {
            handle.submit(tone_frame()).await.unwrap();
        }

        let model = handle.shutdown().await.unwrap();
        assert_eq!(model.emotion_history.len(), 3);
        let stored = backend.load("frank").unwrap().unwrap();
        assert_eq!(stored, model);
    }
}
