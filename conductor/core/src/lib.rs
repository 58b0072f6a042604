//! Atelier Core - Headless Concept Synthesis for atelier
//!
//! This crate turns three reference images (texture, silhouette, color) into a
//! synthesized fashion concept, then progressively enriches it with an
//! illustration, shopping leads and a mood board while re-theming whatever
//! surface displays it. It is completely independent of any UI framework.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          UI Surfaces                              │
//! │        ┌─────────┐            ┌─────────────────────────┐         │
//! │        │   TUI   │            │  Headless CLI / Tests   │         │
//! │        │(ratatui)│            │                         │         │
//! │        └────┬────┘            └────────────┬────────────┘         │
//! │             └───────────────┬──────────────┘                      │
//! │               ConductorMessage (mpsc, ordered log)                │
//! │               StudioSnapshot   (watch, last value)                │
//! └─────────────────────────────┼────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼────────────────────────────────────┐
//! │                       ATELIER CORE                                │
//! │  ┌──────────────────────────┴─────────────────────────────────┐  │
//! │  │                       Conductor                             │  │
//! │  │   run state machine · record merges · task tracking         │  │
//! │  └──────────────────────────┬─────────────────────────────────┘  │
//! │                  Completion │ (run-id tagged)                     │
//! │  ┌──────────────┐  ┌────────┴────────┐  ┌──────────────────────┐  │
//! │  │ Media        │  │ Generation      │  │ Generative Backend   │  │
//! │  │ Staging      │─▶│ Gateway         │─▶│ (Gemini REST)        │  │
//! │  └──────────────┘  └─────────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Drives runs and publishes records and themes
//! - [`ConceptRecord`]: The immutable, versioned result of a run
//! - [`ConceptGateway`]: The capability seam (implemented by [`GenerationGateway`])
//! - [`MediaStager`]: Turns raw files into previews and payloads
//! - [`ConductorMessage`] / [`StudioSnapshot`]: What surfaces consume
//!
//! # Quick Start
//!
//! ```ignore
//! use atelier_core::{
//!     load_config, Conductor, GenerationGateway, MediaFile, MediaStager, RunRequest,
//!     backend::GeminiBackend,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let config = load_config()?;
//!     let backend = GeminiBackend::new(&config.backend)?;
//!     let gateway = GenerationGateway::new(backend, config.gateway.clone());
//!     let mut conductor = Conductor::new(gateway, config.conductor.clone(), tx);
//!
//!     let stager = MediaStager::default();
//!     let texture = stager.encode(&MediaFile::load("texture.jpg").await?)?;
//!     let silhouette = stager.encode(&MediaFile::load("silhouette.jpg").await?)?;
//!     let color = stager.encode(&MediaFile::load("color.jpg").await?)?;
//!
//!     conductor.start_run(RunRequest::new(texture, silhouette, color)).await?;
//!
//!     while conductor.process_next().await {
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!         if conductor.state().is_terminal() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Generative backend abstraction (Gemini)
//! - [`concept`]: Records, enrichments and the merge rule
//! - [`conductor`]: Main Conductor struct and run state machine
//! - [`config`]: TOML/env/CLI configuration
//! - [`error`]: Error taxonomy
//! - [`gateway`]: Capability calls over a backend
//! - [`messages`]: Publications and completion events
//! - [`request`]: Run and directed-generation requests
//! - [`staging`]: Media previews and payloads
//! - [`tasks`]: Spawned task tracking
//! - [`theme`]: Presentation theme
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod concept;
pub mod conductor;
pub mod config;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod request;
pub mod staging;
pub mod tasks;
pub mod theme;

// Re-exports for convenience
pub use backend::{BackendConfig, GeminiBackend, GenerationRequest, GenerativeBackend};
pub use concept::{
    dedup_leads, ConceptDetails, ConceptRecord, ConceptSeed, Enrichment, EnrichmentKind,
    EnrichmentSet, ImageData, Lead, MoodBoardFacet, MoodBoardTile,
};
pub use conductor::{Conductor, ConductorConfig};
pub use error::{GenerationError, StagingError, ValidationError};
pub use gateway::{ConceptGateway, GatewayConfig, GenerationGateway};
pub use messages::{Completion, ConductorMessage, RunId, RunState, StudioSnapshot};
pub use request::{DirectedPrompt, DirectedRequest, ReferenceSet, ReferenceSlot, RunRequest};
pub use staging::{EncodedPayload, MediaFile, MediaStager, Preview, StagedMedia};
pub use tasks::{EnrichmentTasks, TaskKind, TaskStatus};
pub use theme::{Rgb, Theme};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, AtelierToml,
    ConfigError, ConfigOverrides, ConfigSource, StudioConfig,
};
