//! Conductor Messages
//!
//! Everything the Conductor publishes to surfaces, plus the completion events
//! its spawned tasks send back to it.
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. Every publication is a full snapshot of the
//! value it describes (a whole record, a whole theme), never a diff, so a
//! surface that joins late can render current state from the latest
//! publication alone. Two channels carry the same information:
//!
//! - an ordered [`ConductorMessage`] log over `mpsc` (every publication)
//! - a last-value [`StudioSnapshot`] over `watch` (only the latest)

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::concept::{ConceptRecord, ConceptSeed, Enrichment, EnrichmentKind, EnrichmentSet};
use crate::error::GenerationError;
use crate::theme::Theme;

/// Identifier of one synthesis run
///
/// Issued by the conductor from a monotonic counter; a completion whose run id
/// differs from the active run's is stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Orchestrator run states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No run has been requested
    #[default]
    Idle,
    /// Waiting on the primary generation
    PrimaryPending,
    /// Record published; some enrichments outstanding
    Live {
        /// Enrichments not yet resolved
        pending: EnrichmentSet,
    },
    /// Every enrichment resolved
    Settled,
    /// The primary generation failed
    Failed,
}

impl RunState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Awaiting references",
            Self::PrimaryPending => "Synthesizing concept...",
            Self::Live { .. } => "Enriching...",
            Self::Settled => "Complete",
            Self::Failed => "Synthesis failed",
        }
    }

    /// Whether the run can make no further progress
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }

    /// Enrichments still outstanding (empty outside `Live`)
    #[must_use]
    pub fn pending(&self) -> EnrichmentSet {
        match self {
            Self::Live { pending } => *pending,
            _ => EnrichmentSet::empty(),
        }
    }

    /// Whether `kind` is still awaited
    #[must_use]
    pub fn is_pending(&self, kind: EnrichmentKind) -> bool {
        self.pending().contains(kind)
    }
}

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize)]
pub enum ConductorMessage {
    /// The run moved to a new state
    State {
        /// Run the state belongs to
        run_id: RunId,
        /// The new state
        state: RunState,
    },

    /// The active presentation theme changed
    ThemeChanged {
        /// The full theme
        theme: Theme,
    },

    /// A new version of the run's record
    ConceptPublished {
        /// Run the record belongs to
        run_id: RunId,
        /// The full record
        record: Arc<ConceptRecord>,
        /// When this version was published
        published_at: DateTime<Utc>,
    },

    /// The primary generation failed; no record exists for this run
    RunFailed {
        /// The failed run
        run_id: RunId,
        /// Error description
        error: String,
    },
}

/// Last-value view of the studio
#[derive(Clone, Debug, Serialize)]
pub struct StudioSnapshot {
    /// The active run, if any
    pub run_id: Option<RunId>,
    /// State of the active run
    pub state: RunState,
    /// The active record, if the primary generation has resolved
    pub record: Option<Arc<ConceptRecord>>,
    /// The active presentation theme
    pub theme: Theme,
    /// Terminal error of the active run
    pub error: Option<String>,
    /// When this snapshot was produced
    pub updated_at: DateTime<Utc>,
}

impl StudioSnapshot {
    /// The snapshot before any run
    #[must_use]
    pub fn idle(theme: Theme) -> Self {
        Self {
            run_id: None,
            state: RunState::Idle,
            record: None,
            theme,
            error: None,
            updated_at: Utc::now(),
        }
    }
}

/// Result of a spawned capability call, routed back to the conductor
#[derive(Debug)]
pub enum Completion {
    /// The primary generation resolved
    Primary {
        /// Run that issued the call
        run_id: RunId,
        /// Outcome
        result: Result<ConceptSeed, GenerationError>,
    },
    /// An enrichment resolved
    Enrichment {
        /// Run that issued the call
        run_id: RunId,
        /// Outcome, already absorbed into a value
        enrichment: Enrichment,
    },
}

impl Completion {
    /// Run that issued the call
    #[must_use]
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Primary { run_id, .. } | Self::Enrichment { run_id, .. } => *run_id,
        }
    }
}
