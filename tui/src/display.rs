//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client": it renders what the Conductor publishes.
//! Every `ConceptPublished` carries a complete record, so applying a message
//! means replacing the held value, never combining two of them.
//!
//! - UploadSlot: One reference image as the user staged it
//! - DisplayState: Everything the renderer reads

use std::sync::Arc;

use atelier_core::{
    ConceptRecord, ConductorMessage, EnrichmentKind, Preview, ReferenceSlot, RunId, RunState,
    StudioSnapshot, Theme,
};

use crate::theme::Palette;

/// A staged reference image, as shown in the upload strip
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSlot {
    /// Which reference this is
    pub slot: ReferenceSlot,
    /// Preview, if the file was a usable image
    pub preview: Option<Preview>,
}

impl UploadSlot {
    /// An empty slot
    pub fn empty(slot: ReferenceSlot) -> Self {
        Self { slot, preview: None }
    }

    /// One-line summary for the upload strip
    pub fn summary(&self) -> String {
        match self.preview {
            Some(ref p) => format!(
                "{}: {} ({}, {})",
                self.slot,
                p.name,
                p.mime_type,
                human_size(p.size_bytes)
            ),
            None => format!("{}: (empty)", self.slot),
        }
    }

    /// Whether a preview is present
    pub fn is_filled(&self) -> bool {
        self.preview.is_some()
    }
}

/// Format a byte count for display
pub fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64;
    if value >= KIB * KIB {
        format!("{:.1} MB", value / (KIB * KIB))
    } else if value >= KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Run the state belongs to
    pub run_id: Option<RunId>,
    /// Run state as last published
    pub run_state: RunState,
    /// Active record as last published
    pub record: Option<Arc<ConceptRecord>>,
    /// Active theme as last published
    pub theme: Theme,
    /// Palette derived from `theme`
    pub palette: Palette,
    /// Last primary failure
    pub error: Option<String>,
    /// Staged references, in slot order
    pub uploads: [UploadSlot; 3],
}

impl Default for DisplayState {
    fn default() -> Self {
        let theme = Theme::studio_default();
        Self {
            run_id: None,
            run_state: RunState::Idle,
            record: None,
            palette: Palette::from_theme(&theme),
            theme,
            error: None,
            uploads: ReferenceSlot::ALL.map(UploadSlot::empty),
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the conductor's last-value snapshot
    pub fn from_snapshot(snapshot: &StudioSnapshot) -> Self {
        let mut state = Self::default();
        state.run_id = snapshot.run_id;
        state.run_state = snapshot.state;
        state.record = snapshot.record.clone();
        state.error = snapshot.error.clone();
        state.set_theme(snapshot.theme.clone());
        state
    }

    /// Apply a conductor message
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::State { run_id, state } => {
                if self.run_id != Some(run_id) {
                    // A new run: drop what the previous one showed
                    self.record = None;
                    self.error = None;
                }
                self.run_id = Some(run_id);
                self.run_state = state;
            }
            ConductorMessage::ThemeChanged { theme } => self.set_theme(theme),
            ConductorMessage::ConceptPublished { run_id, record, .. } => {
                self.run_id = Some(run_id);
                self.record = Some(record);
            }
            ConductorMessage::RunFailed { run_id, error } => {
                self.run_id = Some(run_id);
                self.record = None;
                self.error = Some(error);
            }
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        self.palette = Palette::from_theme(&theme);
        self.theme = theme;
    }

    /// Record a staged upload
    pub fn set_upload(&mut self, slot: ReferenceSlot, preview: Option<Preview>) {
        if let Some(upload) = self.uploads.iter_mut().find(|u| u.slot == slot) {
            upload.preview = preview;
        }
    }

    /// Whether an enrichment is still awaited
    pub fn is_pending(&self, kind: EnrichmentKind) -> bool {
        self.run_state.is_pending(kind)
    }

    /// The status line text
    pub fn status_line(&self) -> String {
        let mut line = match self.run_id {
            Some(id) => format!("[{id}] {}", self.run_state.description()),
            None => self.run_state.description().to_string(),
        };
        let pending: Vec<_> = self
            .run_state
            .pending()
            .iter()
            .map(EnrichmentKind::label)
            .collect();
        if !pending.is_empty() {
            line.push_str(&format!(" · waiting on {}", pending.join(", ")));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::EnrichmentSet;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_upload_summary() {
        let mut slot = UploadSlot::empty(ReferenceSlot::Color);
        assert_eq!(slot.summary(), "color: (empty)");
        slot.preview = Some(Preview {
            name: "swatch.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 2048,
            data_url: String::new(),
        });
        assert_eq!(slot.summary(), "color: swatch.png (image/png, 2.0 KB)");
        assert!(slot.is_filled());
    }

    #[test]
    fn test_theme_change_updates_palette() {
        let mut state = DisplayState::new();
        let theme = Theme {
            primary_color: "#C0C0C0".to_string(),
            ..Theme::studio_default()
        };
        state.apply_message(ConductorMessage::ThemeChanged { theme });
        assert_eq!(state.palette.primary, ratatui::style::Color::Rgb(192, 192, 192));
    }

    #[test]
    fn test_new_run_clears_previous_error() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::RunFailed {
            run_id: RunId(1),
            error: "boom".to_string(),
        });
        assert!(state.error.is_some());

        state.apply_message(ConductorMessage::State {
            run_id: RunId(2),
            state: RunState::PrimaryPending,
        });
        assert!(state.error.is_none());
        assert_eq!(state.run_state, RunState::PrimaryPending);
    }

    #[test]
    fn test_status_line_lists_pending() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::State {
            run_id: RunId(3),
            state: RunState::Live {
                pending: [EnrichmentKind::Leads].into_iter().collect::<EnrichmentSet>(),
            },
        });
        let line = state.status_line();
        assert!(line.starts_with("[run-3]"));
        assert!(line.ends_with("waiting on leads"), "{line}");
    }
}
