//! Generative Backend Integration
//!
//! This module provides abstracted access to multimodal generation backends
//! through a common trait interface.
//!
//! # Available Backends
//!
//! - **Gemini**: Google's `generateContent` API (default)
//!
//! # Usage
//!
//! ```ignore
//! use atelier_core::backend::{BackendConfig, GeminiBackend, GenerativeBackend, GenerationRequest};
//!
//! let backend = GeminiBackend::new(&BackendConfig::default())?;
//! let request = GenerationRequest::new("gemini-2.5-flash").with_text("Hello!");
//! let response = backend.generate(&request).await?;
//! ```

mod gemini;
mod traits;

pub use gemini::GeminiBackend;
pub use traits::{
    BackendConfig, Citation, GenerationRequest, GenerationResponse, GenerativeBackend, Part,
    ResponseFormat, DEFAULT_BASE_URL,
};
