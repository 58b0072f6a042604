//! Generation Gateway
//!
//! Wraps the capability calls behind a uniform async contract:
//!
//! | Call | Result | Failure policy |
//! |------|--------|----------------|
//! | `synthesize_concept` | `ConceptSeed` | propagates [`GenerationError`] |
//! | `synthesize_illustration` | `Option<ImageData>` | absorbed, logged at `warn` |
//! | `find_leads` | `Vec<Lead>` | absorbed, empty list |
//! | `synthesize_mood_board` | `Vec<MoodBoardTile>` | absorbed per tile |
//! | `synthesize_directed` | `Option<ImageData>` | absorbed, logged at `warn` |
//!
//! The gateway owns no state between calls. "Declined" (the backend answered
//! without an image) and "failed" (the call errored) both resolve to `None`
//! but are logged at different levels.

mod prompts;
mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{GenerationRequest, GenerativeBackend};
use crate::concept::{dedup_leads, ConceptSeed, ImageData, Lead, MoodBoardFacet, MoodBoardTile};
use crate::error::GenerationError;
use crate::request::{DirectedPrompt, ReferenceSet};

pub use prompts::{illustration_prompt, lead_query, leads_prompt};
pub use schema::{concept_schema, parse_concept};

/// The capability seam the conductor depends on
#[async_trait]
pub trait ConceptGateway: Send + Sync + 'static {
    /// Primary generation; the only call allowed to fail
    async fn synthesize_concept(
        &self,
        references: &ReferenceSet,
    ) -> Result<ConceptSeed, GenerationError>;

    /// Lookbook illustration for a visual prompt
    async fn synthesize_illustration(&self, prompt: &str) -> Option<ImageData>;

    /// Grounded shopping leads, deduplicated and capped
    async fn find_leads(&self, concept_name: &str, tags: &[String]) -> Vec<Lead>;

    /// Three facet images rendered concurrently, returned in facet order
    async fn synthesize_mood_board(&self, theme_name: &str) -> Vec<MoodBoardTile>;

    /// Free-form image from a directive and reference images
    async fn synthesize_directed(&self, prompt: &DirectedPrompt) -> Option<ImageData>;
}

/// Model selection and limits for the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Model for primary concept synthesis
    pub concept_model: String,
    /// Model for every image request
    pub image_model: String,
    /// Model for grounded search
    pub search_model: String,
    /// Maximum number of leads returned
    pub max_leads: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            concept_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            search_model: "gemini-2.5-flash".to_string(),
            max_leads: 4,
        }
    }
}

/// [`ConceptGateway`] over any [`GenerativeBackend`]
pub struct GenerationGateway<B: GenerativeBackend> {
    backend: Arc<B>,
    config: GatewayConfig,
}

impl<B: GenerativeBackend> Clone for GenerationGateway<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B: GenerativeBackend> GenerationGateway<B> {
    /// Create a gateway
    pub fn new(backend: B, config: GatewayConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    /// The gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn render_image(&self, request: GenerationRequest, purpose: &str) -> Option<ImageData> {
        match self.backend.generate(&request).await {
            Ok(response) => {
                let image = response.images.into_iter().next();
                if image.is_none() {
                    tracing::info!(purpose, model = %request.model, "Backend returned no image");
                }
                image
            }
            Err(e) => {
                tracing::warn!(purpose, model = %request.model, error = %e, "Image generation failed");
                None
            }
        }
    }
}

#[async_trait]
impl<B: GenerativeBackend + 'static> ConceptGateway for GenerationGateway<B> {
    async fn synthesize_concept(
        &self,
        references: &ReferenceSet,
    ) -> Result<ConceptSeed, GenerationError> {
        let mut request = GenerationRequest::new(&self.config.concept_model)
            .with_system(prompts::CONCEPT_SYSTEM_INSTRUCTION)
            .with_text(prompts::CONCEPT_USER_TEXT)
            .with_json_schema(concept_schema());
        for payload in references.ordered() {
            request = request.with_inline(payload.clone());
        }

        let response = self.backend.generate(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Concept generation failed");
            GenerationError::from(e)
        })?;

        let text = response
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;
        let seed = parse_concept(&text).inspect_err(|e| {
            tracing::warn!(error = %e, "Concept response failed validation");
        })?;

        tracing::info!(
            concept = %seed.name,
            theme = %seed.theme.name,
            duration_ms = response.duration_ms,
            "Concept synthesized"
        );
        Ok(seed)
    }

    async fn synthesize_illustration(&self, prompt: &str) -> Option<ImageData> {
        let request =
            GenerationRequest::new(&self.config.image_model).with_text(illustration_prompt(prompt));
        self.render_image(request, "illustration").await
    }

    async fn find_leads(&self, concept_name: &str, tags: &[String]) -> Vec<Lead> {
        let request = GenerationRequest::new(&self.config.search_model)
            .with_text(leads_prompt(concept_name, tags, self.config.max_leads))
            .with_grounded_search();

        let response = match self.backend.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(concept = %concept_name, error = %e, "Lead search failed");
                return Vec::new();
            }
        };

        let candidates = response.citations.into_iter().filter_map(|citation| {
            let url = citation.uri.filter(|u| !u.trim().is_empty())?;
            let title = citation
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| prompts::DEFAULT_LEAD_TITLE.to_string());
            Some(Lead { title, url })
        });

        let mut leads = dedup_leads(candidates);
        leads.truncate(self.config.max_leads);
        if leads.is_empty() {
            tracing::debug!(concept = %concept_name, "Lead search returned no sources");
        }
        leads
    }

    async fn synthesize_mood_board(&self, theme_name: &str) -> Vec<MoodBoardTile> {
        let renders = MoodBoardFacet::ALL.map(|facet| async move {
            let image = self.synthesize_illustration(&facet.prompt(theme_name)).await;
            image.map(|image| MoodBoardTile { facet, image })
        });

        futures::future::join_all(renders)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn synthesize_directed(&self, prompt: &DirectedPrompt) -> Option<ImageData> {
        let mut request = GenerationRequest::new(&self.config.image_model)
            .with_text(illustration_prompt(&prompt.directive));
        for payload in &prompt.references {
            request = request.with_inline(payload.clone());
        }
        self.render_image(request, "directed").await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::backend::{Citation, GenerationResponse, Part};
    use crate::request::RunRequest;
    use crate::staging::EncodedPayload;
    use pretty_assertions::assert_eq;

    /// Backend that answers by inspecting the request text
    #[derive(Default)]
    struct ScriptedBackend {
        concept_text: Option<String>,
        citations: Vec<Citation>,
        fail: bool,
        /// (prompt fragment, delay, produce an image)
        images: Vec<(&'static str, u64, bool)>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    fn first_text(request: &GenerationRequest) -> String {
        request
            .parts
            .iter()
            .find_map(|p| match p {
                Part::Text(t) => Some(t.clone()),
                Part::Inline(_) => None,
            })
            .unwrap_or_default()
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn health_check(&self) -> bool {
            !self.fail
        }

        async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                anyhow::bail!("Scripted returned 503 Service Unavailable: overloaded");
            }

            let text = first_text(request);
            let mut response = GenerationResponse {
                model: request.model.clone(),
                ..Default::default()
            };

            if request.grounded_search {
                response.citations = self.citations.clone();
            } else if request.system.is_some() {
                response.text = self.concept_text.clone();
            } else if let Some((_, delay, produce)) =
                self.images.iter().find(|(frag, _, _)| text.contains(frag))
            {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
                if *produce {
                    response.images.push(ImageData::new("image/png", text.into_bytes()));
                }
            }
            Ok(response)
        }
    }

    fn gateway(backend: ScriptedBackend) -> GenerationGateway<ScriptedBackend> {
        GenerationGateway::new(backend, GatewayConfig::default())
    }

    fn payload(tag: &str) -> EncodedPayload {
        EncodedPayload {
            mime_type: "image/jpeg".to_string(),
            data: tag.to_string(),
        }
    }

    fn references() -> ReferenceSet {
        RunRequest::new(payload("t"), payload("s"), payload("c"))
            .validate()
            .unwrap()
    }

    fn citation(title: Option<&str>, uri: Option<&str>) -> Citation {
        Citation {
            title: title.map(String::from),
            uri: uri.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_concept_request_shape() {
        let backend = ScriptedBackend {
            concept_text: Some(schema::tests::liquid_relic_json().to_string()),
            ..Default::default()
        };
        let gateway = gateway(backend);

        let seed = gateway.synthesize_concept(&references()).await.unwrap();
        assert_eq!(seed.name, "Liquid Relic");

        let seen = gateway.backend().seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.parts.len(), 4);
        assert_eq!(request.parts[1], Part::Inline(payload("t")));
        assert_eq!(request.parts[3], Part::Inline(payload("c")));
    }

    #[tokio::test]
    async fn test_concept_errors_propagate() {
        let failing = gateway(ScriptedBackend {
            fail: true,
            ..Default::default()
        });
        assert!(matches!(
            failing.synthesize_concept(&references()).await,
            Err(GenerationError::Backend(_))
        ));

        let silent = gateway(ScriptedBackend::default());
        assert_eq!(
            silent.synthesize_concept(&references()).await.unwrap_err(),
            GenerationError::EmptyResponse
        );
    }

    #[tokio::test]
    async fn test_illustration_declined_and_failed_are_absent() {
        let declined = gateway(ScriptedBackend {
            images: vec![("lookbook", 0, false)],
            ..Default::default()
        });
        assert!(declined.synthesize_illustration("gown").await.is_none());

        let failed = gateway(ScriptedBackend {
            fail: true,
            ..Default::default()
        });
        assert!(failed.synthesize_illustration("gown").await.is_none());
    }

    #[tokio::test]
    async fn test_leads_dedup_cap_and_defaults() {
        let gateway = gateway(ScriptedBackend {
            citations: vec![
                citation(Some("A"), Some("https://a.example")),
                citation(None, Some("https://b.example")),
                citation(Some("A again"), Some("https://a.example")),
                citation(Some("No url"), None),
                citation(Some("C"), Some("https://c.example")),
                citation(Some("D"), Some("https://d.example")),
                citation(Some("E"), Some("https://e.example")),
            ],
            ..Default::default()
        });

        let leads = gateway
            .find_leads("Liquid Relic", &["chrome".to_string()])
            .await;
        assert_eq!(
            leads,
            vec![
                Lead::new("A", "https://a.example"),
                Lead::new("Fashion Item", "https://b.example"),
                Lead::new("C", "https://c.example"),
                Lead::new("D", "https://d.example"),
            ]
        );

        let seen = gateway.backend().seen.lock().unwrap();
        assert!(seen[0].grounded_search);
    }

    #[tokio::test]
    async fn test_leads_failure_is_empty() {
        let gateway = gateway(ScriptedBackend {
            fail: true,
            ..Default::default()
        });
        assert!(gateway.find_leads("Liquid Relic", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_mood_board_keeps_facet_order() {
        // architecture resolves first, then palette, then texture
        let gateway = gateway(ScriptedBackend {
            images: vec![
                ("Abstract artistic texture", 30, true),
                ("architectural geometry", 5, true),
                ("Fluid color gradient", 15, true),
            ],
            ..Default::default()
        });

        let tiles = gateway.synthesize_mood_board("Molten Archive").await;
        let facets: Vec<_> = tiles.iter().map(|t| t.facet).collect();
        assert_eq!(
            facets,
            vec![
                MoodBoardFacet::Texture,
                MoodBoardFacet::Architecture,
                MoodBoardFacet::Palette
            ]
        );
    }

    #[tokio::test]
    async fn test_mood_board_drops_missing_tiles() {
        let gateway = gateway(ScriptedBackend {
            images: vec![
                ("Abstract artistic texture", 0, true),
                ("architectural geometry", 0, false),
                ("Fluid color gradient", 0, true),
            ],
            ..Default::default()
        });

        let tiles = gateway.synthesize_mood_board("Molten Archive").await;
        let facets: Vec<_> = tiles.iter().map(|t| t.facet).collect();
        assert_eq!(facets, vec![MoodBoardFacet::Texture, MoodBoardFacet::Palette]);
    }

    #[tokio::test]
    async fn test_directed_sends_references_in_order() {
        let gateway = gateway(ScriptedBackend {
            images: vec![("gothic", 0, true)],
            ..Default::default()
        });
        let prompt = DirectedPrompt {
            directive: "gothic chrome armor".to_string(),
            references: vec![payload("a"), payload("c")],
        };

        assert!(gateway.synthesize_directed(&prompt).await.is_some());

        let seen = gateway.backend().seen.lock().unwrap();
        assert_eq!(seen[0].model, "gemini-2.5-flash-image");
        assert_eq!(
            &seen[0].parts[1..],
            &[Part::Inline(payload("a")), Part::Inline(payload("c"))]
        );
    }
}
