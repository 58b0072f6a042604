//! Gemini Backend Implementation
//!
//! Generative backend for the Gemini `generateContent` REST endpoint.
//!
//! # Gemini API
//!
//! - `POST /v1beta/models/{model}:generateContent` - one-shot generation
//! - `GET /v1beta/models` - list models (used as a health probe)
//!
//! Requests authenticate with the `x-goog-api-key` header. Images travel
//! inline as base64 `inlineData` parts in both directions.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::traits::{
    BackendConfig, Citation, GenerationRequest, GenerationResponse, GenerativeBackend, Part,
    ResponseFormat,
};
use crate::concept::ImageData;

/// Gemini backend client
#[derive(Clone)]
pub struct GeminiBackend {
    /// API base URL
    base_url: String,
    /// API key
    api_key: Option<String>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    /// Get generate endpoint URL
    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Get models endpoint URL
    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no Gemini API key configured (set GEMINI_API_KEY)"))
    }

    /// Build the JSON body for a request
    pub(crate) fn build_body(request: &GenerationRequest) -> Value {
        let parts: Vec<Value> = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => json!({ "text": text }),
                Part::Inline(payload) => json!({
                    "inlineData": {
                        "mimeType": payload.mime_type,
                        "data": payload.data,
                    }
                }),
            })
            .collect();

        let mut body = json!({
            "contents": [{ "role": "user", "parts": parts }],
        });

        if let Some(ref system) = request.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        if let ResponseFormat::Json { ref schema } = request.format {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }

        if request.grounded_search {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }

        body
    }

    /// Extract text, images and grounding sources from the first candidate
    pub(crate) fn parse_response(data: &Value, model: &str) -> GenerationResponse {
        let Some(candidate) = data
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
        else {
            if let Some(reason) = data
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(Value::as_str)
            {
                tracing::info!(model, reason, "Gemini declined the prompt");
            }
            return GenerationResponse {
                model: model.to_string(),
                ..Default::default()
            };
        };

        let mut text = String::new();
        let mut images = Vec::new();
        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for part in parts {
            if let Some(t) = part.get("text").and_then(Value::as_str) {
                text.push_str(t);
            }
            if let Some(inline) = part.get("inlineData") {
                let mime = inline
                    .get("mimeType")
                    .and_then(Value::as_str)
                    .unwrap_or("image/png");
                let Some(encoded) = inline.get("data").and_then(Value::as_str) else {
                    continue;
                };
                match ImageData::from_base64(mime, encoded) {
                    Ok(image) => images.push(image),
                    Err(e) => tracing::warn!(model, error = %e, "Skipping undecodable image part"),
                }
            }
        }

        let citations = candidate
            .get("groundingMetadata")
            .and_then(|m| m.get("groundingChunks"))
            .and_then(Value::as_array)
            .map(|chunks| {
                chunks
                    .iter()
                    .filter_map(|chunk| chunk.get("web"))
                    .map(|web| Citation {
                        title: web.get("title").and_then(Value::as_str).map(String::from),
                        uri: web.get("uri").and_then(Value::as_str).map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        GenerationResponse {
            text: (!text.is_empty()).then_some(text),
            images,
            citations,
            model: model.to_string(),
            duration_ms: None,
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn health_check(&self) -> bool {
        let Ok(key) = self.api_key() else {
            return false;
        };
        self.http_client
            .get(self.models_url())
            .header("x-goog-api-key", key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
        let start = Instant::now();
        let key = self.api_key()?;
        let body = Self::build_body(request);

        tracing::debug!(model = %request.model, parts = request.parts.len(), "Gemini request");

        let response = self
            .http_client
            .post(self.generate_url(&request.model))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {status}: {body}");
        }

        let data: Value = response.json().await?;
        let mut parsed = Self::parse_response(&data, &request.model);
        parsed.duration_ms = Some(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX));
        Ok(parsed)
    }
}
