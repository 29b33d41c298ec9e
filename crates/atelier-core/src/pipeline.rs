//! Gate-polling generation pipeline.

use crate::events::GenerationEvent;
use crate::gate::AdmissionGate;
use crate::slot::PendingSlot;
use atelier_client::{GenerationBackend, Sketch};
use atelier_config::{
    AtelierConfig, CUSTOM_PROMPT_KEY, GENERATION_SETTINGS_KEY, GenerationConfig,
    GenerationSettings, PromptConfig, SettingsStore,
};
use atelier_history::HistoryStore;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Buffered events per subscriber before lagging.
const EVENT_BUFFER: usize = 64;

/// Wires the admission gate, the pending slot, a generation backend, and the
/// history store together.
///
/// The drawing surface reports stroke lifecycle through [`stroke_began`] /
/// [`stroke_ended`] and offers snapshots through [`submit_sketch`]; a fixed
/// cadence drives [`poll`], which dispatches at most one admitted sketch per
/// tick as an independent task. Completion is delivered over the event
/// channel, never by blocking the poll cadence.
///
/// [`stroke_began`]: GenerationPipeline::stroke_began
/// [`stroke_ended`]: GenerationPipeline::stroke_ended
/// [`submit_sketch`]: GenerationPipeline::submit_sketch
/// [`poll`]: GenerationPipeline::poll
pub struct GenerationPipeline {
    gate: AdmissionGate,
    slot: PendingSlot,
    backend: Arc<dyn GenerationBackend>,
    history: Arc<HistoryStore>,
    settings: Arc<SettingsStore>,
    prompt_config: PromptConfig,
    generation_config: GenerationConfig,
    poll_interval: Duration,
    events: broadcast::Sender<GenerationEvent>,
}

impl GenerationPipeline {
    /// Create a pipeline from config and its collaborators.
    pub fn new(
        config: &AtelierConfig,
        backend: Arc<dyn GenerationBackend>,
        history: Arc<HistoryStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            gate: AdmissionGate::from_config(&config.admission),
            slot: PendingSlot::new(),
            backend,
            history,
            settings,
            prompt_config: config.prompt.clone(),
            generation_config: config.generation.clone(),
            poll_interval: Duration::from_millis(config.admission.poll_interval_ms),
            events,
        }
    }

    /// Subscribe to generation lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.events.subscribe()
    }

    /// Report that a stroke started; admissions pause until it ends.
    pub fn stroke_began(&self) {
        self.gate.stroke_began();
    }

    /// Report that the in-progress stroke finished.
    pub fn stroke_ended(&self) {
        self.gate.stroke_ended();
    }

    /// Offer the latest composed sketch, replacing any pending one.
    pub fn submit_sketch(&self, sketch: Sketch) {
        debug!(
            "sketch offered (bytes={}, {}x{})",
            sketch.png.len(),
            sketch.width,
            sketch.height
        );
        self.slot.offer(sketch);
    }

    /// Clear the gate and drop any pending sketch.
    pub fn reset(&self) {
        self.gate.reset();
        self.slot.clear();
    }

    /// One tick of the polling driver: dispatch the pending sketch if the
    /// gate admits it now. Returns whether a generation was dispatched.
    pub fn poll(&self) -> bool {
        if self.slot.is_empty() {
            return false;
        }
        if !self.gate.should_allow_now() {
            return false;
        }
        let Some(sketch) = self.slot.take() else {
            return false;
        };
        self.dispatch(sketch);
        true
    }

    /// Run the polling driver on its configured cadence until aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            "starting generation pipeline (poll_interval={:?})",
            self.poll_interval
        );
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(self.poll_interval);
            loop {
                let _ = ticks.tick().await;
                let _ = self.poll();
            }
        })
    }

    /// The effective prompt: the user's custom prompt when one is saved,
    /// otherwise the configured default.
    pub fn prompt(&self) -> String {
        self.settings
            .get(CUSTOM_PROMPT_KEY)
            .unwrap_or_else(|| self.prompt_config.default_prompt.clone())
    }

    /// The effective generation settings: the user's saved settings when
    /// present, otherwise the configured defaults.
    pub fn generation_settings(&self) -> GenerationSettings {
        self.settings
            .get(GENERATION_SETTINGS_KEY)
            .unwrap_or_else(|| self.generation_config.settings.clone())
    }

    /// Dispatch one generation round-trip as an independent unit of work.
    ///
    /// The in-flight call never blocks the poll cadence; its outcome arrives
    /// on the event channel. All failures are soft.
    fn dispatch(&self, sketch: Sketch) {
        let backend = Arc::clone(&self.backend);
        let history = Arc::clone(&self.history);
        let events = self.events.clone();
        let prompt = self.prompt();
        let settings = self.generation_settings();

        let _ = events.send(GenerationEvent::Started);
        drop(tokio::spawn(async move {
            match backend.generate(&sketch, &prompt, &settings).await {
                Ok(image) => {
                    let record = match history.save_generation(&sketch.png, &image) {
                        Ok(record) => Some(record),
                        Err(err) => {
                            error!("failed to archive generation: {err}");
                            None
                        }
                    };
                    let _ = events.send(GenerationEvent::Completed { record, image });
                }
                Err(err) if err.is_empty_response() => {
                    warn!("generation produced no image this round");
                    let _ = events.send(GenerationEvent::Failed {
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    error!("generation failed: {err}");
                    let _ = events.send(GenerationEvent::Failed {
                        reason: err.to_string(),
                    });
                }
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationPipeline;
    use crate::events::GenerationEvent;
    use atelier_config::{AdmissionConfig, AtelierConfig, SettingsStore};
    use atelier_history::{HistoryStore, RetentionPolicy};
    use atelier_client::{ClientError, GenerationBackend};
    use atelier_test_utils::{
        FailingBackend, FixedBackend, RecordingBackend, ScriptedBackend, result_fixture,
        sketch_fixture,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::broadcast;

    fn pipeline_with(
        backend: Arc<dyn GenerationBackend>,
        min_interval_secs: f64,
    ) -> (Arc<GenerationPipeline>, Arc<HistoryStore>, TempDir) {
        let temp = tempdir().expect("tempdir");
        let settings =
            Arc::new(SettingsStore::new(temp.path().join("settings.json")).expect("settings"));
        let history = Arc::new(
            HistoryStore::new(
                temp.path().join("history"),
                Arc::clone(&settings),
                RetentionPolicy::default(),
            )
            .expect("history"),
        );
        let config = AtelierConfig::builder()
            .admission(AdmissionConfig {
                min_interval_secs,
                poll_interval_ms: 10,
            })
            .build();
        let pipeline = Arc::new(GenerationPipeline::new(
            &config,
            backend,
            Arc::clone(&history),
            settings,
        ));
        (pipeline, history, temp)
    }

    async fn next_event(
        events: &mut broadcast::Receiver<GenerationEvent>,
    ) -> GenerationEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event timeout")
            .expect("channel open")
    }

    #[tokio::test]
    async fn admitted_sketch_completes_and_is_archived() {
        let backend = Arc::new(FixedBackend::new(result_fixture()));
        let (pipeline, history, _temp) = pipeline_with(backend, 5.0);
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());

        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        let GenerationEvent::Completed { record, image } = next_event(&mut events).await else {
            panic!("expected completion");
        };
        assert_eq!(image, result_fixture());

        let record = record.expect("archived");
        let archived = history.load_history();
        assert_eq!(archived, vec![record.clone()]);
        assert_eq!(
            history.load_image(&record.sketch_filename),
            Some(sketch_fixture().png)
        );
        assert_eq!(
            history.load_image(&record.result_filename),
            Some(result_fixture())
        );
    }

    #[tokio::test]
    async fn empty_slot_never_dispatches() {
        let backend = Arc::new(FixedBackend::new(result_fixture()));
        let (pipeline, _, _temp) = pipeline_with(backend, 0.0);
        assert!(!pipeline.poll());
    }

    #[tokio::test]
    async fn cooldown_blocks_the_next_dispatch() {
        let backend = Arc::new(FixedBackend::new(result_fixture()));
        let (pipeline, _, _temp) = pipeline_with(backend, 3600.0);

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());

        pipeline.submit_sketch(sketch_fixture());
        assert!(!pipeline.poll(), "second dispatch inside the interval");
    }

    #[tokio::test]
    async fn stroke_in_progress_blocks_dispatch() {
        let backend = Arc::new(FixedBackend::new(result_fixture()));
        let (pipeline, _, _temp) = pipeline_with(backend, 0.0);

        pipeline.stroke_began();
        pipeline.submit_sketch(sketch_fixture());
        assert!(!pipeline.poll());

        pipeline.stroke_ended();
        assert!(pipeline.poll());
    }

    #[tokio::test]
    async fn backend_failure_emits_failed_and_skips_history() {
        let backend = Arc::new(FailingBackend::new());
        let (pipeline, history, _temp) = pipeline_with(backend, 0.0);
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());

        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Failed { .. }
        ));
        assert!(history.load_history().is_empty());
    }

    #[tokio::test]
    async fn empty_response_is_a_soft_failure() {
        let backend = Arc::new(FailingBackend::empty_response());
        let (pipeline, history, _temp) = pipeline_with(backend, 0.0);
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());

        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        let GenerationEvent::Failed { reason } = next_event(&mut events).await else {
            panic!("expected failure");
        };
        assert!(reason.contains("no images"));
        assert!(history.load_history().is_empty());
    }

    #[tokio::test]
    async fn next_admission_is_the_natural_retry() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(ClientError::Status { status: 500 }),
            Ok(result_fixture()),
        ]));
        let (pipeline, history, _temp) = pipeline_with(backend, 0.0);
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Failed { .. }
        ));

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Completed { .. }
        ));
        assert_eq!(history.load_history().len(), 1);
    }

    #[tokio::test]
    async fn custom_prompt_and_settings_reach_the_backend() {
        let recording = RecordingBackend::new(FixedBackend::new(result_fixture()));
        let calls = recording.call_log();
        let backend: Arc<dyn GenerationBackend> = Arc::new(recording);

        let temp = tempdir().expect("tempdir");
        let settings =
            Arc::new(SettingsStore::new(temp.path().join("settings.json")).expect("settings"));
        let history = Arc::new(
            HistoryStore::new(
                temp.path().join("history"),
                Arc::clone(&settings),
                RetentionPolicy::default(),
            )
            .expect("history"),
        );
        settings
            .set(atelier_config::CUSTOM_PROMPT_KEY, &"a fox in snow")
            .expect("set prompt");
        settings
            .set(
                atelier_config::GENERATION_SETTINGS_KEY,
                &atelier_config::GenerationSettings::quality(),
            )
            .expect("set settings");

        let pipeline = Arc::new(GenerationPipeline::new(
            &AtelierConfig::default(),
            backend,
            history,
            settings,
        ));
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        assert!(pipeline.poll());
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        let _ = next_event(&mut events).await;

        let recorded = calls.lock().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].prompt, "a fox in snow");
        assert_eq!(
            recorded[0].settings,
            atelier_config::GenerationSettings::quality()
        );
    }

    #[tokio::test]
    async fn spawned_driver_dispatches_offered_sketch() {
        let backend = Arc::new(FixedBackend::new(result_fixture()));
        let (pipeline, history, _temp) = pipeline_with(backend, 0.0);
        let mut events = pipeline.subscribe();

        pipeline.submit_sketch(sketch_fixture());
        let driver = Arc::clone(&pipeline).spawn();

        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Started
        ));
        assert!(matches!(
            next_event(&mut events).await,
            GenerationEvent::Completed { .. }
        ));
        driver.abort();
        assert_eq!(history.load_history().len(), 1);
    }
}
