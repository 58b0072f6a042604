//! Error Types
//!
//! Errors that cross the orchestrator boundary. Enrichment failures have no
//! type here: the gateway absorbs them and the affected record field stays
//! unpopulated.

use thiserror::Error;

use crate::request::ReferenceSlot;

/// A run or directed request was malformed; no state changed
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One of the three synthesis references was not supplied
    #[error("missing {0} reference image")]
    MissingReference(ReferenceSlot),

    /// Directed generation needs a non-blank directive
    #[error("creative directive is empty")]
    EmptyDirective,

    /// Directed generation needs the first reference image
    #[error("reference image 01 is required")]
    MissingPrimaryReference,
}

/// The primary concept generation failed; the run is terminal
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The backend could not be reached or returned an error status
    #[error("backend request failed: {0}")]
    Backend(String),

    /// The backend answered without any text to parse
    #[error("no response text received from backend")]
    EmptyResponse,

    /// The response text was not the expected JSON shape
    #[error("malformed concept response: {0}")]
    Malformed(String),

    /// A field parsed but carried an unusable value
    #[error("invalid concept field `{field}`: {reason}")]
    InvalidField {
        /// Wire name of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Backend(format!("{err:#}"))
    }
}

/// A raw input file could not be turned into a preview or payload
#[derive(Debug, Error)]
pub enum StagingError {
    /// Reading the file failed
    #[error("failed to read media: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no content
    #[error("media file is empty")]
    Empty,

    /// The file exceeds the inline payload limit
    #[error("media is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The content is not a recognisable image
    #[error("content is not an image ({mime})")]
    NotAnImage {
        /// The resolved MIME type
        mime: String,
    },
}
