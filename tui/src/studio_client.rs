//! Studio Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network) and provides
//! a convenient interface for staging references, starting runs and
//! receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client": it doesn't contain any business logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Stage reference files and start runs
//! 2. Let the Conductor apply completions each frame
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use std::path::Path;

use anyhow::Context;
use tokio::sync::mpsc;

use atelier_core::{
    ConceptGateway, Conductor, ConductorConfig, ConductorMessage, GeminiBackend,
    GenerationGateway, MediaFile, MediaStager, RunId, RunRequest, RunState, StagedMedia,
    StudioConfig, StudioSnapshot, ValidationError,
};

/// Message channel capacity between the Conductor and the view
const MESSAGE_BUFFER: usize = 100;

/// Client for communicating with the embedded Conductor
pub struct StudioClient<G: ConceptGateway> {
    /// The embedded Conductor instance
    conductor: Conductor<G>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
    /// Turns files into previews and payloads
    stager: MediaStager,
}

impl StudioClient<GenerationGateway<GeminiBackend>> {
    /// Create a client talking to Gemini, per the loaded configuration
    pub fn from_config(config: &StudioConfig) -> anyhow::Result<Self> {
        let backend = GeminiBackend::new(&config.backend)?;
        let gateway = GenerationGateway::new(backend, config.gateway.clone());
        Ok(Self::new(
            gateway,
            config.conductor.clone(),
            MediaStager::new(config.max_payload_bytes),
        ))
    }
}

impl<G: ConceptGateway> StudioClient<G> {
    /// Create a client around any gateway
    pub fn new(gateway: G, config: ConductorConfig, stager: MediaStager) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER);
        let conductor = Conductor::new(gateway, config, tx);
        Self {
            conductor,
            rx,
            stager,
        }
    }

    /// Load and stage a reference file
    pub async fn stage_file(&self, path: &Path) -> anyhow::Result<StagedMedia> {
        let file = MediaFile::load(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(self.stager.stage(&file))
    }

    /// Start (or restart) a synthesis run
    pub async fn start_run(&mut self, request: RunRequest) -> Result<RunId, ValidationError> {
        self.conductor.start_run(request).await
    }

    /// Apply completions that have arrived (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.conductor.poll_completions().await
    }

    /// Wait for the next completion and apply it
    pub async fn process_next(&mut self) -> bool {
        self.conductor.process_next().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Last-value snapshot
    pub fn snapshot(&self) -> StudioSnapshot {
        self.conductor.snapshot()
    }

    /// Get the current run state
    pub fn state(&self) -> RunState {
        self.conductor.state()
    }
}
