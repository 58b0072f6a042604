//! Concept Card
//!
//! Turns the display state into the styled lines of the concept card. This is
//! a pure function of the last published record, run state and palette: each
//! enrichment shows either its content or a placeholder, independently of the
//! other two.

use atelier_core::{ConceptRecord, EnrichmentKind, RunState};

use super::text_block::StyledLine;
use crate::display::{human_size, DisplayState};
use crate::theme::Palette;

/// Placeholder text while an enrichment is in flight
pub fn pending_placeholder(kind: EnrichmentKind) -> &'static str {
    match kind {
        EnrichmentKind::Illustration => "[ rendering lookbook illustration... ]",
        EnrichmentKind::Leads => "[ searching for shopping leads... ]",
        EnrichmentKind::MoodBoard => "[ composing mood board... ]",
    }
}

/// Text when an enrichment resolved without producing anything
pub fn absent_placeholder(kind: EnrichmentKind) -> &'static str {
    match kind {
        EnrichmentKind::Illustration => "[ no illustration produced ]",
        EnrichmentKind::Leads => "[ lead search unavailable ]",
        EnrichmentKind::MoodBoard => "[ mood board unavailable ]",
    }
}

/// Build every line of the card
pub fn card_lines(state: &DisplayState) -> Vec<StyledLine> {
    let palette = &state.palette;

    if let Some(ref error) = state.error {
        return vec![
            ("SYNTHESIS FAILED".to_string(), palette.heading()),
            (error.clone(), palette.base().fg(crate::theme::ERROR_RED)),
            (String::new(), palette.base()),
            ("Press r to try again.".to_string(), palette.dim()),
        ];
    }

    match state.record {
        Some(ref record) => record_lines(record, state.run_state, palette),
        None if state.run_state == RunState::PrimaryPending => vec![(
            "Fusing texture, silhouette and color into a concept...".to_string(),
            palette.pending(),
        )],
        None => vec![(
            "Stage three references, then press r to synthesize.".to_string(),
            palette.dim(),
        )],
    }
}

fn record_lines(record: &ConceptRecord, run_state: RunState, palette: &Palette) -> Vec<StyledLine> {
    let blank = || (String::new(), palette.base());
    let mut lines = vec![
        (record.name().to_uppercase(), palette.heading()),
        (
            record
                .design_tags()
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join("  "),
            palette.label(),
        ),
        (record.rationale().to_string(), palette.base()),
        blank(),
    ];

    let details = record.details();
    for (label, value) in [
        ("FABRICATION", &details.fabrication),
        ("STRUCTURE", &details.structure),
        ("COLOR THEORY", &details.color_theory),
        ("ARCHETYPE", &details.archetype),
    ] {
        lines.push((label.to_string(), palette.label()));
        lines.push((value.clone(), palette.base()));
    }
    lines.push(blank());
    lines.push(("VISUAL PROMPT".to_string(), palette.label()));
    lines.push((record.visual_prompt().to_string(), palette.dim()));
    lines.push(blank());

    let placeholder = |kind: EnrichmentKind| {
        if run_state.is_pending(kind) {
            (pending_placeholder(kind).to_string(), palette.pending())
        } else {
            (absent_placeholder(kind).to_string(), palette.dim())
        }
    };

    lines.push(("ILLUSTRATION".to_string(), palette.heading()));
    match record.illustration() {
        Some(image) => lines.push((
            format!("[{} · {}]", image.mime_type, human_size(image.len())),
            palette.base(),
        )),
        None => lines.push(placeholder(EnrichmentKind::Illustration)),
    }
    lines.push(blank());

    lines.push(("CURATED LEADS".to_string(), palette.heading()));
    match record.shopping_leads() {
        Some([]) => lines.push(("No leads found.".to_string(), palette.dim())),
        Some(leads) => {
            for lead in leads {
                let host = lead.host().unwrap_or_else(|| lead.url.clone());
                lines.push((format!("→ {}  ({host})", lead.title), palette.base()));
            }
        }
        None => lines.push(placeholder(EnrichmentKind::Leads)),
    }
    lines.push(blank());

    lines.push(("MOOD BOARD".to_string(), palette.heading()));
    match record.mood_board() {
        Some(tiles) => {
            for tile in tiles {
                lines.push((
                    format!(
                        "{}: [{} · {}]",
                        tile.facet.label(),
                        tile.image.mime_type,
                        human_size(tile.image.len())
                    ),
                    palette.base(),
                ));
            }
        }
        None => lines.push(placeholder(EnrichmentKind::MoodBoard)),
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use atelier_core::{
        ConceptDetails, ConceptSeed, Enrichment, EnrichmentSet, ImageData, Lead, RunId, Theme,
    };

    fn record() -> ConceptRecord {
        ConceptRecord::new(ConceptSeed {
            name: "Liquid Relic".to_string(),
            rationale: "Chrome poured over driftwood.".to_string(),
            design_tags: vec!["chrome".to_string(), "organic".to_string()],
            details: ConceptDetails {
                fabrication: "Mirror-finish lamé".to_string(),
                structure: "Draped column".to_string(),
                color_theory: "Cold silver against warm umber".to_string(),
                archetype: "The relic hunter".to_string(),
            },
            visual_prompt: "A draped chrome column gown".to_string(),
            theme: Theme::studio_default(),
        })
    }

    fn texts(lines: &[StyledLine]) -> Vec<&str> {
        lines.iter().map(|(text, _)| text.as_str()).collect()
    }

    fn live(record: ConceptRecord, pending: EnrichmentSet) -> DisplayState {
        DisplayState {
            run_id: Some(RunId(1)),
            run_state: RunState::Live { pending },
            record: Some(Arc::new(record)),
            ..DisplayState::default()
        }
    }

    #[test]
    fn test_fresh_record_shows_all_placeholders() {
        let state = live(record(), EnrichmentSet::all());
        let lines = card_lines(&state);
        let texts = texts(&lines);

        assert_eq!(texts[0], "LIQUID RELIC");
        assert_eq!(texts[1], "#chrome  #organic");
        for kind in EnrichmentKind::ALL {
            assert!(texts.contains(&pending_placeholder(kind)), "{kind}");
        }
    }

    #[test]
    fn test_populated_field_replaces_only_its_placeholder() {
        let record = record()
            .merged(Enrichment::Leads(vec![Lead::new(
                "Chrome gown",
                "https://www.shop.example/gown",
            )]))
            .unwrap();
        let pending = [EnrichmentKind::Illustration, EnrichmentKind::MoodBoard]
            .into_iter()
            .collect();
        let lines = card_lines(&live(record, pending));
        let texts = texts(&lines);

        assert!(texts.contains(&"→ Chrome gown  (shop.example)"));
        assert!(!texts.contains(&pending_placeholder(EnrichmentKind::Leads)));
        assert!(texts.contains(&pending_placeholder(EnrichmentKind::Illustration)));
        assert!(texts.contains(&pending_placeholder(EnrichmentKind::MoodBoard)));
    }

    #[test]
    fn test_settled_without_illustration_shows_absent() {
        let record = record()
            .merged(Enrichment::Leads(Vec::new()))
            .unwrap()
            .merged(Enrichment::Illustration(Some(ImageData::new("image/png", vec![0; 2048]))))
            .unwrap();
        let state = DisplayState {
            run_state: RunState::Settled,
            record: Some(Arc::new(record)),
            ..DisplayState::default()
        };
        let lines = card_lines(&state);
        let texts = texts(&lines);

        assert!(texts.contains(&"[image/png · 2.0 KB]"));
        assert!(texts.contains(&"No leads found."));
        assert!(texts.contains(&absent_placeholder(EnrichmentKind::MoodBoard)));
    }

    #[test]
    fn test_failure_replaces_card() {
        let state = DisplayState {
            run_state: RunState::Failed,
            error: Some("no response text received from backend".to_string()),
            ..DisplayState::default()
        };
        let lines = card_lines(&state);
        assert_eq!(texts(&lines)[0], "SYNTHESIS FAILED");
    }
}
