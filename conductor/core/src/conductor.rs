//! Conductor - The Orchestration Core
//!
//! The Conductor drives a synthesis run:
//! - validates the run request and supersedes any previous run
//! - spawns the primary generation and waits for its completion
//! - publishes the new record and its theme, then fans out the enrichments
//! - merges each enrichment completion into a new record version
//!
//! # Run State Machine
//!
//! ```text
//!   Idle ──start_run──▶ PrimaryPending ──ok──▶ Live{pending} ──last──▶ Settled
//!                            │                   │    ▲
//!                            err                 └────┘ enrichment merged
//!                            ▼
//!                          Failed
//! ```
//!
//! `start_run` from any state supersedes the active run. Completions carry the
//! [`RunId`] of the run that issued them and are dropped when it no longer
//! matches the active run.
//!
//! # Scheduling
//!
//! Capability calls run as spawned tokio tasks, but they never touch conductor
//! state: each one sends a [`Completion`] back over an internal channel and
//! only [`Conductor::apply`] acts on it. Because `apply` takes `&mut self` and
//! builds each new record without awaiting, merges cannot interleave.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::concept::{ConceptRecord, ConceptSeed, Enrichment, EnrichmentKind, EnrichmentSet, ImageData};
use crate::error::{GenerationError, ValidationError};
use crate::gateway::ConceptGateway;
use crate::messages::{Completion, ConductorMessage, RunId, RunState, StudioSnapshot};
use crate::request::{DirectedRequest, RunRequest};
use crate::tasks::{EnrichmentTasks, TaskKind, DEFAULT_RUN_HISTORY};
use crate::theme::Theme;

/// Conductor configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// Theme shown when no concept is active
    pub default_theme: Theme,
    /// Capacity of the internal completion channel
    pub completion_buffer: usize,
    /// Number of runs whose task handles are remembered
    pub run_history: usize,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::studio_default(),
            completion_buffer: 32,
            run_history: DEFAULT_RUN_HISTORY,
        }
    }
}

/// The run currently occupying the active slot
#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    state: RunState,
    record: Option<Arc<ConceptRecord>>,
    error: Option<String>,
}

/// The Conductor - headless orchestration core
pub struct Conductor<G: ConceptGateway> {
    /// Configuration
    config: ConductorConfig,
    /// Capability provider
    gateway: Arc<G>,
    /// Active run, if any
    active: Option<ActiveRun>,
    /// Active presentation theme
    theme: Theme,
    /// Last issued run number
    last_run: u64,
    /// Spawned task handles
    tasks: EnrichmentTasks,
    /// Completion channel shared with spawned tasks
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
    /// Channel to send messages to UI surfaces
    tx: mpsc::Sender<ConductorMessage>,
    /// Last-value publication
    snapshot: watch::Sender<StudioSnapshot>,
}

impl<G: ConceptGateway> Conductor<G> {
    /// Create a new Conductor with the given gateway
    pub fn new(gateway: G, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel(config.completion_buffer.max(1));
        let theme = config.default_theme.clone();
        let (snapshot, _) = watch::channel(StudioSnapshot::idle(theme.clone()));

        Self {
            tasks: EnrichmentTasks::new(config.run_history),
            config,
            gateway: Arc::new(gateway),
            active: None,
            theme,
            last_run: 0,
            completions_tx,
            completions_rx,
            tx,
            snapshot,
        }
    }

    /// Subscribe to last-value snapshots
    pub fn subscribe(&self) -> watch::Receiver<StudioSnapshot> {
        self.snapshot.subscribe()
    }

    /// The latest snapshot
    #[must_use]
    pub fn snapshot(&self) -> StudioSnapshot {
        self.snapshot.borrow().clone()
    }

    /// State of the active run
    #[must_use]
    pub fn state(&self) -> RunState {
        self.active.as_ref().map_or(RunState::Idle, |run| run.state)
    }

    /// Identifier of the active run
    #[must_use]
    pub fn active_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|run| run.id)
    }

    /// The active record, if published
    #[must_use]
    pub fn record(&self) -> Option<Arc<ConceptRecord>> {
        self.active.as_ref().and_then(|run| run.record.clone())
    }

    /// The active presentation theme
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Task bookkeeping
    #[must_use]
    pub fn tasks(&self) -> &EnrichmentTasks {
        &self.tasks
    }

    /// The capability provider
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ============================================
    // Run Lifecycle
    // ============================================

    /// Start a synthesis run, superseding any active one
    ///
    /// A request missing a reference is rejected before anything changes.
    pub async fn start_run(&mut self, request: RunRequest) -> Result<RunId, ValidationError> {
        let references = request.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected run request");
        })?;

        self.last_run += 1;
        let run_id = RunId(self.last_run);

        if let Some(previous) = self.active.take() {
            let in_flight = self.tasks.supersede(previous.id);
            tracing::info!(
                run_id = %previous.id,
                superseded_by = %run_id,
                in_flight,
                "Run superseded"
            );
        }

        self.active = Some(ActiveRun {
            id: run_id,
            state: RunState::PrimaryPending,
            record: None,
            error: None,
        });
        let theme_reset = self.reset_theme();
        self.refresh_snapshot();

        if theme_reset {
            self.send(ConductorMessage::ThemeChanged {
                theme: self.theme.clone(),
            })
            .await;
        }
        self.send(ConductorMessage::State {
            run_id,
            state: RunState::PrimaryPending,
        })
        .await;

        let gateway = Arc::clone(&self.gateway);
        let completions = self.completions_tx.clone();
        let handle = tokio::spawn(async move {
            let result = gateway.synthesize_concept(&references).await;
            let _ = completions.send(Completion::Primary { run_id, result }).await;
        });
        self.tasks.track(run_id, TaskKind::Primary, handle);

        tracing::info!(run_id = %run_id, "Run started");
        Ok(run_id)
    }

    /// Apply one completion: the single merge and transition entry point
    pub async fn apply(&mut self, completion: Completion) {
        let run_id = completion.run_id();
        if self.active_run() != Some(run_id) {
            tracing::debug!(run_id = %run_id, "Dropping completion from superseded run");
            return;
        }

        match completion {
            Completion::Primary { result, .. } => self.on_primary(run_id, result).await,
            Completion::Enrichment { enrichment, .. } => {
                self.on_enrichment(run_id, enrichment).await;
            }
        }
    }

    async fn on_primary(&mut self, run_id: RunId, result: Result<ConceptSeed, GenerationError>) {
        if self.state() != RunState::PrimaryPending {
            tracing::debug!(run_id = %run_id, "Ignoring repeated primary completion");
            return;
        }
        if let Some(elapsed) = self.tasks.complete(run_id, TaskKind::Primary) {
            tracing::debug!(run_id = %run_id, elapsed = ?elapsed, "Primary resolved");
        }

        match result {
            Ok(seed) => self.go_live(run_id, seed).await,
            Err(e) => self.fail(run_id, &e).await,
        }
    }

    async fn go_live(&mut self, run_id: RunId, seed: ConceptSeed) {
        let record = Arc::new(ConceptRecord::new(seed));
        let state = RunState::Live {
            pending: EnrichmentSet::all(),
        };
        if let Some(active) = self.active.as_mut() {
            active.record = Some(Arc::clone(&record));
            active.state = state;
        }
        self.theme = record.theme().clone();
        self.refresh_snapshot();

        tracing::info!(
            run_id = %run_id,
            concept = %record.name(),
            theme = %self.theme.name,
            "Concept published"
        );

        self.send(ConductorMessage::ConceptPublished {
            run_id,
            record: Arc::clone(&record),
            published_at: Utc::now(),
        })
        .await;
        self.send(ConductorMessage::ThemeChanged {
            theme: self.theme.clone(),
        })
        .await;
        self.send(ConductorMessage::State { run_id, state }).await;

        self.dispatch_enrichments(run_id, &record);
    }

    async fn fail(&mut self, run_id: RunId, error: &GenerationError) {
        tracing::warn!(run_id = %run_id, error = %error, "Primary generation failed");

        let message = error.to_string();
        if let Some(active) = self.active.as_mut() {
            active.state = RunState::Failed;
            active.error = Some(message.clone());
        }
        let theme_reset = self.reset_theme();
        self.refresh_snapshot();

        self.send(ConductorMessage::RunFailed {
            run_id,
            error: message,
        })
        .await;
        if theme_reset {
            self.send(ConductorMessage::ThemeChanged {
                theme: self.theme.clone(),
            })
            .await;
        }
        self.send(ConductorMessage::State {
            run_id,
            state: RunState::Failed,
        })
        .await;
    }

    async fn on_enrichment(&mut self, run_id: RunId, enrichment: Enrichment) {
        let kind = enrichment.kind();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let RunState::Live { mut pending } = active.state else {
            tracing::debug!(run_id = %run_id, kind = %kind, "Ignoring enrichment outside Live");
            return;
        };
        // A kind resolves once, whether or not its first outcome populated the field
        if !pending.remove(kind) {
            tracing::debug!(run_id = %run_id, kind = %kind, "Duplicate enrichment ignored");
            return;
        }
        let Some(current) = active.record.as_ref() else {
            return;
        };

        // Build and store the next record version before any await
        let merged = current.merged(enrichment).map(Arc::new);
        if let Some(ref next) = merged {
            active.record = Some(Arc::clone(next));
        }
        active.state = if pending.is_empty() {
            RunState::Settled
        } else {
            RunState::Live { pending }
        };
        let state = active.state;

        if let Some(elapsed) = self.tasks.complete(run_id, TaskKind::Enrichment(kind)) {
            tracing::info!(
                run_id = %run_id,
                kind = %kind,
                merged = merged.is_some(),
                elapsed = ?elapsed,
                "Enrichment resolved"
            );
        }

        self.refresh_snapshot();

        if let Some(record) = merged {
            self.send(ConductorMessage::ConceptPublished {
                run_id,
                record,
                published_at: Utc::now(),
            })
            .await;
        }
        self.send(ConductorMessage::State { run_id, state }).await;
        if state == RunState::Settled {
            tracing::info!(run_id = %run_id, "Run settled");
        }
    }

    fn dispatch_enrichments(&mut self, run_id: RunId, record: &ConceptRecord) {
        let prompt = record.visual_prompt().to_string();
        self.spawn_enrichment(run_id, EnrichmentKind::Illustration, |gateway: Arc<G>| async move {
            Enrichment::Illustration(gateway.synthesize_illustration(&prompt).await)
        });

        let name = record.name().to_string();
        let tags = record.design_tags().to_vec();
        self.spawn_enrichment(run_id, EnrichmentKind::Leads, |gateway: Arc<G>| async move {
            Enrichment::Leads(gateway.find_leads(&name, &tags).await)
        });

        let theme_name = record.theme().name.clone();
        self.spawn_enrichment(run_id, EnrichmentKind::MoodBoard, |gateway: Arc<G>| async move {
            Enrichment::MoodBoard(gateway.synthesize_mood_board(&theme_name).await)
        });
    }

    fn spawn_enrichment<F, Fut>(&mut self, run_id: RunId, kind: EnrichmentKind, job: F)
    where
        F: FnOnce(Arc<G>) -> Fut,
        Fut: Future<Output = Enrichment> + Send + 'static,
    {
        let work = job(Arc::clone(&self.gateway));
        let completions = self.completions_tx.clone();
        let handle = tokio::spawn(async move {
            let enrichment = work.await;
            let _ = completions
                .send(Completion::Enrichment { run_id, enrichment })
                .await;
        });
        self.tasks.track(run_id, TaskKind::Enrichment(kind), handle);
        tracing::debug!(run_id = %run_id, kind = %kind, "Enrichment dispatched");
    }

    // ============================================
    // Driving
    // ============================================

    /// Apply every completion that is already waiting
    ///
    /// Returns `true` if anything was applied.
    pub async fn poll_completions(&mut self) -> bool {
        let mut applied = false;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion).await;
            applied = true;
        }
        applied
    }

    /// Wait for the next completion and apply it
    ///
    /// Returns `false` only if the completion channel closed.
    pub async fn process_next(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.apply(completion).await;
                true
            }
            None => false,
        }
    }

    /// Drive the active run until it settles or fails
    pub async fn run_until_settled(&mut self) -> RunState {
        while matches!(
            self.state(),
            RunState::PrimaryPending | RunState::Live { .. }
        ) {
            if !self.process_next().await {
                break;
            }
        }
        self.state()
    }

    /// Directed generation; independent of the run state machine
    pub async fn direct(
        &self,
        request: DirectedRequest,
    ) -> Result<Option<ImageData>, ValidationError> {
        let prompt = request.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected directed request");
        })?;
        let image = self.gateway.synthesize_directed(&prompt).await;
        tracing::info!(produced = image.is_some(), "Directed generation finished");
        Ok(image)
    }

    // ============================================
    // Publication
    // ============================================

    /// Put the default theme back; returns whether it changed
    fn reset_theme(&mut self) -> bool {
        if self.theme == self.config.default_theme {
            return false;
        }
        self.theme = self.config.default_theme.clone();
        true
    }

    fn refresh_snapshot(&self) {
        let active = self.active.as_ref();
        self.snapshot.send_replace(StudioSnapshot {
            run_id: active.map(|run| run.id),
            state: self.state(),
            record: active.and_then(|run| run.record.clone()),
            theme: self.theme.clone(),
            error: active.and_then(|run| run.error.clone()),
            updated_at: Utc::now(),
        });
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
