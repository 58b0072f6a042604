//! Generative Backend Traits
//!
//! Trait definitions for multimodal generation backends. The gateway speaks to
//! a backend in terms of a single request/response shape that covers all four
//! capabilities: structured text, image output, and grounded search.
//!
//! Implementations handle provider-specific details (API formats, auth, etc.)

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::concept::ImageData;
use crate::staging::EncodedPayload;

/// One piece of request content
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    /// Plain text
    Text(String),
    /// Inline image
    Inline(EncodedPayload),
}

/// Requested response shape
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResponseFormat {
    /// Free text (and, for image models, images)
    #[default]
    Text,
    /// JSON constrained by a schema
    Json {
        /// Response schema in the backend's schema dialect
        schema: serde_json::Value,
    },
}

/// A generation request
#[derive(Clone, Debug, Default)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// System instruction
    pub system: Option<String>,
    /// Content parts in order
    pub parts: Vec<Part>,
    /// Response shape
    pub format: ResponseFormat,
    /// Ground the answer in web search results
    pub grounded_search: bool,
}

impl GenerationRequest {
    /// Create an empty request for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the system instruction
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append a text part
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Append an inline image part
    #[must_use]
    pub fn with_inline(mut self, payload: EncodedPayload) -> Self {
        self.parts.push(Part::Inline(payload));
        self
    }

    /// Request schema-constrained JSON
    #[must_use]
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.format = ResponseFormat::Json { schema };
        self
    }

    /// Enable grounded web search
    #[must_use]
    pub fn with_grounded_search(mut self) -> Self {
        self.grounded_search = true;
        self
    }
}

/// A web source the backend grounded its answer on
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Citation {
    /// Page title
    pub title: Option<String>,
    /// Page URL
    pub uri: Option<String>,
}

/// Response from a generation request
#[derive(Clone, Debug, Default)]
pub struct GenerationResponse {
    /// Concatenated text parts, if any
    pub text: Option<String>,
    /// Inline images, in response order
    pub images: Vec<ImageData>,
    /// Grounding sources, in response order
    pub citations: Vec<Citation>,
    /// Model that served the request
    pub model: String,
    /// Round-trip time in milliseconds
    pub duration_ms: Option<u64>,
}

/// Generative backend trait
///
/// Implement this trait to add support for different providers.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Get the backend name (e.g., "Gemini")
    fn name(&self) -> &str;

    /// Check if the backend is reachable and accepts our credentials
    async fn health_check(&self) -> bool;

    /// Send a request and wait for the complete response
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationResponse>;
}

/// Default Gemini API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Backend connection configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API key (usually taken from the environment rather than the file)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
