//! Language-switch orchestrator.
//!
//! When the widget language changes, every transcript holding more than its
//! system message is re-translated into the new language. One batch runs per
//! transcript and the messages inside a batch are translated concurrently. A
//! failed translation keeps that message's original text. Batches fail
//! independently: one that dies entirely leaves its own transcript untouched
//! while the other transcript may still commit. Dropping a switch before it
//! settles aborts its batches and leaves both transcripts as they were.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::join_all;
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use vaani_core::config::WidgetConfig;
use vaani_core::languages::AUTO_DETECT;
use vaani_core::types::Message;
use vaani_provider::{TranslateOptions, Translator};

use crate::conversation::{ConversationMode, ConversationStore, TranscriptSnapshot};

/// Orchestrator settings for one widget instance.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    pub initial_language: String,
    pub auto_translate: bool,
    pub options: TranslateOptions,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            initial_language: "en".to_string(),
            auto_translate: true,
            options: TranslateOptions::default(),
        }
    }
}

impl From<&WidgetConfig> for SwitchConfig {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            initial_language: config.initial_language().to_string(),
            auto_translate: config.enable_auto_translation,
            options: TranslateOptions::from(&config.translation),
        }
    }
}

/// Active and last language of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageState {
    pub current: String,
    pub previous: String,
}

/// What happened to one transcript during a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub mode: ConversationMode,
    pub translated: usize,
    pub failed: usize,
    /// False when a newer switch or a reset got there first, or the batch
    /// died; the transcript was left alone.
    pub committed: bool,
}

/// Result of a language switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    SameLanguage,
    AutoTranslateDisabled,
    NothingToTranslate,
    Translated { batches: Vec<BatchReport> },
}

/// Decrements the in-flight counter when the switch settles, however it
/// settles.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Batch tasks spawned by one switch. On drop, tasks still running are
/// aborted and their pending markers cleared, so a cancelled switch does not
/// leave a transcript looking superseded.
struct SpawnedBatches {
    store: Arc<ConversationStore>,
    tasks: Vec<(ConversationMode, u64, AbortHandle)>,
}

impl Drop for SpawnedBatches {
    fn drop(&mut self) {
        for (mode, revision, task) in self.tasks.drain(..) {
            task.abort();
            // No-op once the batch committed or a newer one took over.
            self.store.abandon(mode, revision);
        }
    }
}

/// Work planned synchronously when the language changes.
struct SwitchJob {
    source: String,
    target: String,
    snapshots: Vec<TranscriptSnapshot>,
    _guard: InFlightGuard,
}

enum Plan {
    Done(SwitchOutcome),
    Run(SwitchJob),
}

/// Reacts to language changes by re-translating the widget's transcripts.
pub struct LanguageSwitchOrchestrator {
    translator: Arc<dyn Translator>,
    store: Arc<ConversationStore>,
    options: TranslateOptions,
    auto_translate: bool,
    language: Mutex<LanguageState>,
    in_flight: Arc<AtomicUsize>,
}

impl LanguageSwitchOrchestrator {
    pub fn new(
        translator: Arc<dyn Translator>,
        store: Arc<ConversationStore>,
        config: SwitchConfig,
    ) -> Self {
        Self {
            translator,
            store,
            options: config.options,
            auto_translate: config.auto_translate,
            language: Mutex::new(LanguageState {
                current: config.initial_language.clone(),
                previous: config.initial_language,
            }),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn language_state(&self) -> MutexGuard<'_, LanguageState> {
        self.language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn language(&self) -> LanguageState {
        self.language_state().clone()
    }

    pub fn current_language(&self) -> String {
        self.language_state().current.clone()
    }

    /// True while any switch is still translating.
    pub fn is_translating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Switch language and translate in the background.
    ///
    /// The new language is visible, and the translating flag set, before
    /// this returns. The handle resolves once every batch has settled; it
    /// may be dropped.
    pub fn on_language_change(self: &Arc<Self>, new_language: &str) -> JoinHandle<SwitchOutcome> {
        match self.plan(new_language) {
            Plan::Done(outcome) => tokio::spawn(async move { outcome }),
            Plan::Run(job) => {
                let this = Arc::clone(self);
                tokio::spawn(async move { this.run(job).await })
            }
        }
    }

    /// Switch language and wait for translation to settle.
    pub async fn change_language(&self, new_language: &str) -> SwitchOutcome {
        match self.plan(new_language) {
            Plan::Done(outcome) => outcome,
            Plan::Run(job) => self.run(job).await,
        }
    }

    fn plan(&self, new_language: &str) -> Plan {
        let previous = {
            let mut state = self.language_state();
            let previous = std::mem::replace(&mut state.current, new_language.to_string());
            state.previous = previous.clone();
            previous
        };
        info!(from = %previous, to = %new_language, "Language changed");

        if previous == new_language {
            return Plan::Done(SwitchOutcome::SameLanguage);
        }
        if !self.auto_translate {
            debug!("Auto-translation disabled, keeping transcripts");
            return Plan::Done(SwitchOutcome::AutoTranslateDisabled);
        }

        let snapshots: Vec<TranscriptSnapshot> = ConversationMode::ALL
            .iter()
            .filter_map(|mode| self.store.begin_batch(*mode))
            .collect();
        if snapshots.is_empty() {
            debug!("No messages to translate");
            return Plan::Done(SwitchOutcome::NothingToTranslate);
        }

        Plan::Run(SwitchJob {
            source: previous,
            target: new_language.to_string(),
            snapshots,
            _guard: InFlightGuard::enter(&self.in_flight),
        })
    }

    async fn run(&self, job: SwitchJob) -> SwitchOutcome {
        let mut spawned = SpawnedBatches {
            store: Arc::clone(&self.store),
            tasks: Vec::with_capacity(job.snapshots.len()),
        };
        let handles: Vec<_> = job
            .snapshots
            .into_iter()
            .map(|snapshot| {
                let mode = snapshot.mode;
                let revision = snapshot.revision;
                // A transcript whose previous batch never landed may still be
                // in an older language.
                let source = if snapshot.superseded {
                    AUTO_DETECT.to_string()
                } else {
                    job.source.clone()
                };
                let handle = tokio::spawn(translate_batch(
                    Arc::clone(&self.translator),
                    self.options.clone(),
                    snapshot.messages,
                    source,
                    job.target.clone(),
                ));
                spawned.tasks.push((mode, revision, handle.abort_handle()));
                (mode, revision, handle)
            })
            .collect();

        let mut batches = Vec::with_capacity(handles.len());
        for (mode, revision, handle) in handles {
            match handle.await {
                Ok(result) => {
                    let committed = self.store.commit(mode, revision, result.messages);
                    if committed {
                        info!(
                            mode = %mode,
                            translated = result.translated,
                            failed = result.failed,
                            "Transcript translated"
                        );
                    } else {
                        debug!(mode = %mode, revision, "Discarding stale translation batch");
                    }
                    batches.push(BatchReport {
                        mode,
                        translated: result.translated,
                        failed: result.failed,
                        committed,
                    });
                }
                Err(e) => {
                    error!(mode = %mode, error = %e, "Translation batch failed, keeping original transcript");
                    self.store.abandon(mode, revision);
                    batches.push(BatchReport {
                        mode,
                        translated: 0,
                        failed: 0,
                        committed: false,
                    });
                }
            }
        }

        SwitchOutcome::Translated { batches }
    }
}

struct BatchResult {
    messages: Vec<Message>,
    translated: usize,
    failed: usize,
}

/// Translate every non-system message of one transcript, in place order.
async fn translate_batch(
    translator: Arc<dyn Translator>,
    options: TranslateOptions,
    messages: Vec<Message>,
    source: String,
    target: String,
) -> BatchResult {
    let calls = messages.iter().enumerate().map(|(index, message)| {
        let translator = &translator;
        let options = &options;
        let source = source.as_str();
        let target = target.as_str();
        async move {
            if message.is_system() {
                return (message.clone(), None);
            }
            match translator
                .translate(&message.content, target, source, options)
                .await
            {
                Ok(text) => (message.with_content(text), Some(true)),
                Err(e) => {
                    warn!(index, error = %e, "Translation failed, keeping original message");
                    (message.clone(), Some(false))
                }
            }
        }
    });

    let mut result = BatchResult {
        messages: Vec::with_capacity(messages.len()),
        translated: 0,
        failed: 0,
    };
    for (message, outcome) in join_all(calls).await {
        match outcome {
            Some(true) => result.translated += 1,
            Some(false) => result.failed += 1,
            None => {}
        }
        result.messages.push(message);
    }
    result
}
