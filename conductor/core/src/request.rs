//! Run Requests
//!
//! What a caller hands the conductor to start work. Requests carry optional
//! payloads so that surfaces can build them incrementally while the user picks
//! files; [`RunRequest::validate`] and [`DirectedRequest::validate`] turn them
//! into the complete forms the gateway accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::staging::EncodedPayload;

/// Role a reference image plays in synthesis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSlot {
    /// Material and surface inspiration
    Texture,
    /// Shape and cut inspiration
    Silhouette,
    /// Palette inspiration
    Color,
}

impl ReferenceSlot {
    /// All slots in prompt order
    pub const ALL: [Self; 3] = [Self::Texture, Self::Silhouette, Self::Color];
}

impl fmt::Display for ReferenceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Texture => "texture",
            Self::Silhouette => "silhouette",
            Self::Color => "color",
        })
    }
}

/// Request to start a synthesis run
#[derive(Clone, Debug, Default)]
pub struct RunRequest {
    /// Texture reference
    pub texture: Option<EncodedPayload>,
    /// Silhouette reference
    pub silhouette: Option<EncodedPayload>,
    /// Color reference
    pub color: Option<EncodedPayload>,
}

impl RunRequest {
    /// A request with all three references supplied
    #[must_use]
    pub fn new(texture: EncodedPayload, silhouette: EncodedPayload, color: EncodedPayload) -> Self {
        Self {
            texture: Some(texture),
            silhouette: Some(silhouette),
            color: Some(color),
        }
    }

    /// Place a payload in a slot
    #[must_use]
    pub fn with_reference(mut self, slot: ReferenceSlot, payload: EncodedPayload) -> Self {
        *self.slot_mut(slot) = Some(payload);
        self
    }

    fn slot_mut(&mut self, slot: ReferenceSlot) -> &mut Option<EncodedPayload> {
        match slot {
            ReferenceSlot::Texture => &mut self.texture,
            ReferenceSlot::Silhouette => &mut self.silhouette,
            ReferenceSlot::Color => &mut self.color,
        }
    }

    /// Require all three references
    pub fn validate(self) -> Result<ReferenceSet, ValidationError> {
        let texture = self
            .texture
            .ok_or(ValidationError::MissingReference(ReferenceSlot::Texture))?;
        let silhouette = self
            .silhouette
            .ok_or(ValidationError::MissingReference(ReferenceSlot::Silhouette))?;
        let color = self
            .color
            .ok_or(ValidationError::MissingReference(ReferenceSlot::Color))?;
        Ok(ReferenceSet {
            texture,
            silhouette,
            color,
        })
    }
}

/// Three validated references, ready for primary generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceSet {
    /// Texture reference
    pub texture: EncodedPayload,
    /// Silhouette reference
    pub silhouette: EncodedPayload,
    /// Color reference
    pub color: EncodedPayload,
}

impl ReferenceSet {
    /// References in prompt order
    #[must_use]
    pub fn ordered(&self) -> [&EncodedPayload; 3] {
        [&self.texture, &self.silhouette, &self.color]
    }
}

/// Number of reference slots in directed mode
pub const DIRECTED_SLOTS: usize = 3;

/// Request for a single directed image
#[derive(Clone, Debug, Default)]
pub struct DirectedRequest {
    /// Free-text creative directive
    pub directive: String,
    /// Reference slots; slot 0 is mandatory
    pub references: [Option<EncodedPayload>; DIRECTED_SLOTS],
}

impl DirectedRequest {
    /// A request with the mandatory first reference
    pub fn new(directive: impl Into<String>, primary: EncodedPayload) -> Self {
        Self {
            directive: directive.into(),
            references: [Some(primary), None, None],
        }
    }

    /// Fill an optional slot (indices past the last slot are ignored)
    #[must_use]
    pub fn with_reference(mut self, index: usize, payload: EncodedPayload) -> Self {
        if let Some(slot) = self.references.get_mut(index) {
            *slot = Some(payload);
        }
        self
    }

    /// Require a directive and the first reference
    pub fn validate(self) -> Result<DirectedPrompt, ValidationError> {
        let directive = self.directive.trim();
        if directive.is_empty() {
            return Err(ValidationError::EmptyDirective);
        }
        let [primary, second, third] = self.references;
        let primary = primary.ok_or(ValidationError::MissingPrimaryReference)?;

        let references = std::iter::once(primary)
            .chain(second)
            .chain(third)
            .collect();
        Ok(DirectedPrompt {
            directive: directive.to_string(),
            references,
        })
    }
}

/// A validated directed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectedPrompt {
    /// Trimmed directive
    pub directive: String,
    /// Supplied references, slot order preserved, primary first
    pub references: Vec<EncodedPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tag: &str) -> EncodedPayload {
        EncodedPayload {
            mime_type: "image/png".to_string(),
            data: tag.to_string(),
        }
    }

    #[test]
    fn test_run_request_requires_every_slot() {
        let request = RunRequest::default()
            .with_reference(ReferenceSlot::Texture, payload("t"))
            .with_reference(ReferenceSlot::Color, payload("c"));
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::MissingReference(ReferenceSlot::Silhouette)
        );
    }

    #[test]
    fn test_run_request_orders_references() {
        let set = RunRequest::new(payload("t"), payload("s"), payload("c"))
            .validate()
            .unwrap();
        let data: Vec<_> = set.ordered().iter().map(|p| p.data.as_str()).collect();
        assert_eq!(data, vec!["t", "s", "c"]);
    }

    #[test]
    fn test_directed_rejects_blank_directive() {
        let request = DirectedRequest::new("   ", payload("a"));
        assert_eq!(request.validate().unwrap_err(), ValidationError::EmptyDirective);
    }

    #[test]
    fn test_directed_requires_primary() {
        let request = DirectedRequest {
            directive: "Make it gothic".to_string(),
            references: [None, Some(payload("b")), None],
        };
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::MissingPrimaryReference
        );
    }

    #[test]
    fn test_directed_keeps_slot_order() {
        let prompt = DirectedRequest::new("  Make it gothic ", payload("a"))
            .with_reference(2, payload("c"))
            .with_reference(7, payload("ignored"))
            .validate()
            .unwrap();
        assert_eq!(prompt.directive, "Make it gothic");
        assert_eq!(prompt.references, vec![payload("a"), payload("c")]);
    }
}
