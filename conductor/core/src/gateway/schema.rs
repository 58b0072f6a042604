//! Concept response schema and shape validation
//!
//! The backend is asked for JSON matching [`concept_schema`]; whatever comes
//! back is still checked here field by field. Any missing field or malformed
//! theme color fails the whole response.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::concept::{ConceptDetails, ConceptSeed};
use crate::error::GenerationError;
use crate::theme::Theme;

/// JSON schema sent with the primary request
pub fn concept_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "concept_name": { "type": "STRING", "description": "Creative title of the concept" },
            "rationale": { "type": "STRING", "description": "A concise, poetic summary of the fusion" },
            "concept_details": {
                "type": "OBJECT",
                "properties": {
                    "fabrication": { "type": "STRING", "description": "Detailed analysis of materials and textures" },
                    "silhouette_structure": { "type": "STRING", "description": "Breakdown of the cut, shape, and construction" },
                    "color_theory": { "type": "STRING", "description": "Explanation of the palette and emotional impact" },
                    "muse_character": { "type": "STRING", "description": "The archetype or character this outfit embodies" }
                },
                "required": ["fabrication", "silhouette_structure", "color_theory", "muse_character"]
            },
            "visual_prompt": { "type": "STRING", "description": "Detailed image generation prompt for a high fashion lookbook photo" },
            "design_dna_tags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Keywords describing the design DNA"
            },
            "ui_theme": {
                "type": "OBJECT",
                "properties": {
                    "theme_name": { "type": "STRING" },
                    "primary_hex": { "type": "STRING", "description": "Dominant bright color hex code" },
                    "secondary_hex": { "type": "STRING", "description": "Accent color hex code" },
                    "css_gradient": { "type": "STRING", "description": "CSS linear-gradient string (e.g., 'linear-gradient(135deg, #123, #456)')" },
                    "text_color": { "type": "STRING", "description": "Hex for readability" }
                },
                "required": ["theme_name", "primary_hex", "secondary_hex", "css_gradient", "text_color"]
            }
        },
        "required": ["concept_name", "rationale", "concept_details", "visual_prompt", "design_dna_tags", "ui_theme"]
    })
}

#[derive(Deserialize)]
struct ConceptWire {
    concept_name: String,
    rationale: String,
    concept_details: DetailsWire,
    visual_prompt: String,
    design_dna_tags: Vec<String>,
    ui_theme: ThemeWire,
}

#[derive(Deserialize)]
struct DetailsWire {
    fabrication: String,
    silhouette_structure: String,
    color_theory: String,
    muse_character: String,
}

#[derive(Deserialize)]
struct ThemeWire {
    theme_name: String,
    primary_hex: String,
    secondary_hex: String,
    css_gradient: String,
    text_color: String,
}

fn require_text(field: &'static str, value: String) -> Result<String, GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

/// Parse and validate a primary response
pub fn parse_concept(text: &str) -> Result<ConceptSeed, GenerationError> {
    let wire: ConceptWire =
        serde_json::from_str(text.trim()).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let theme = Theme {
        name: wire.ui_theme.theme_name,
        primary_color: wire.ui_theme.primary_hex,
        secondary_color: wire.ui_theme.secondary_hex,
        background_gradient: wire.ui_theme.css_gradient,
        text_color: wire.ui_theme.text_color,
    };
    theme
        .check()
        .map_err(|(field, reason)| GenerationError::InvalidField { field, reason })?;

    Ok(ConceptSeed {
        name: require_text("concept_name", wire.concept_name)?,
        rationale: require_text("rationale", wire.rationale)?,
        design_tags: wire.design_dna_tags,
        details: ConceptDetails {
            fabrication: wire.concept_details.fabrication,
            structure: wire.concept_details.silhouette_structure,
            color_theory: wire.concept_details.color_theory,
            archetype: wire.concept_details.muse_character,
        },
        visual_prompt: require_text("visual_prompt", wire.visual_prompt)?,
        theme,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn liquid_relic_json() -> Value {
        json!({
            "concept_name": "Liquid Relic",
            "rationale": "Chrome poured over driftwood.",
            "concept_details": {
                "fabrication": "Mirror-finish lamé",
                "silhouette_structure": "Draped column",
                "color_theory": "Cold silver against warm umber",
                "muse_character": "The relic hunter"
            },
            "visual_prompt": "A draped chrome column gown",
            "design_dna_tags": ["chrome", "organic", "chrome"],
            "ui_theme": {
                "theme_name": "Molten Archive",
                "primary_hex": "#C0C0C0",
                "secondary_hex": "#8B5A2B",
                "css_gradient": "linear-gradient(135deg, #1b1b1b, #3a2a1a)",
                "text_color": "#f5f5f5"
            }
        })
    }

    #[test]
    fn test_parse_full_shape() {
        let seed = parse_concept(&liquid_relic_json().to_string()).unwrap();
        assert_eq!(seed.name, "Liquid Relic");
        assert_eq!(seed.design_tags, vec!["chrome", "organic", "chrome"]);
        assert_eq!(seed.details.structure, "Draped column");
        assert_eq!(seed.details.archetype, "The relic hunter");
        assert_eq!(seed.theme.name, "Molten Archive");
        assert_eq!(seed.theme.primary_color, "#C0C0C0");
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut value = liquid_relic_json();
        value["concept_details"]
            .as_object_mut()
            .unwrap()
            .remove("muse_character");
        assert!(matches!(
            parse_concept(&value.to_string()),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_theme_is_malformed() {
        let mut value = liquid_relic_json();
        value.as_object_mut().unwrap().remove("ui_theme");
        assert!(matches!(
            parse_concept(&value.to_string()),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_hex_is_invalid_field() {
        let mut value = liquid_relic_json();
        value["ui_theme"]["primary_hex"] = json!("silver");
        assert_eq!(
            parse_concept(&value.to_string()).unwrap_err(),
            GenerationError::InvalidField {
                field: "primary_hex",
                reason: "`silver` is not a hex color".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut value = liquid_relic_json();
        value["concept_name"] = json!("  ");
        assert!(matches!(
            parse_concept(&value.to_string()),
            Err(GenerationError::InvalidField {
                field: "concept_name",
                ..
            })
        ));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            parse_concept("I'm sorry, I can't help with that."),
            Err(GenerationError::Malformed(_))
        ));
    }
}
