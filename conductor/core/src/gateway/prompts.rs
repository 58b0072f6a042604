//! Fixed prompt templates for the capability calls

/// System instruction for primary concept synthesis
pub const CONCEPT_SYSTEM_INSTRUCTION: &str = "\
You are an Avant-Garde Fashion Director. Analyze the 3 uploaded images \
(Texture, Silhouette, Color) to create a new fashion concept.
Return a strict JSON object.
Break down the concept into specific details (Fabrication, Silhouette, Color Theory, Muse) \
in the 'concept_details' section.
The 'ui_theme' should extract the aesthetic vibe of the generated concept to style the \
surface displaying the result.";

/// User text accompanying the three reference images
pub const CONCEPT_USER_TEXT: &str = "Analyze these three images: 1. Texture, 2. Silhouette, \
3. Color. Generate the fashion concept JSON.";

/// Prefix applied to every image prompt
pub const LOOKBOOK_PREFIX: &str =
    "High fashion photography, professional lookbook shot, cinematic lighting.";

/// Number of tags folded into the leads query
pub const LEAD_QUERY_TAGS: usize = 3;

/// Fallback title for a lead without one
pub const DEFAULT_LEAD_TITLE: &str = "Fashion Item";

/// Full prompt for an image request
pub fn illustration_prompt(prompt: &str) -> String {
    format!("{LOOKBOOK_PREFIX} {prompt}")
}

/// Search query built from the concept name and its first three tags
pub fn lead_query(concept_name: &str, tags: &[String]) -> String {
    let tags = tags
        .iter()
        .take(LEAD_QUERY_TAGS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    format!("buy avant-garde fashion {concept_name} {tags} dress or outfit")
}

/// Grounded-search instruction asking for `count` purchasable items
pub fn leads_prompt(concept_name: &str, tags: &[String], count: usize) -> String {
    format!(
        "Find {count} real, distinct, purchasable high-fashion items that match this style: \
         \"{concept_name}\". Search for: {}. Return a list of products.",
        lead_query(concept_name, tags)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_query_uses_first_three_tags() {
        let tags: Vec<String> = ["chrome", "organic", "sculptural", "ignored"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            lead_query("Liquid Relic", &tags),
            "buy avant-garde fashion Liquid Relic chrome organic sculptural dress or outfit"
        );
    }

    #[test]
    fn test_leads_prompt_embeds_query() {
        let prompt = leads_prompt("Liquid Relic", &["chrome".to_string()], 4);
        assert!(prompt.starts_with("Find 4 real, distinct"));
        assert!(prompt.contains("buy avant-garde fashion Liquid Relic chrome dress or outfit"));
    }

    #[test]
    fn test_illustration_prompt_prefix() {
        assert_eq!(
            illustration_prompt("A chrome gown"),
            "High fashion photography, professional lookbook shot, cinematic lighting. A chrome gown"
        );
    }
}
