//! Concept Records
//!
//! The evolving result of a synthesis run. A record is born when the primary
//! generation resolves and then picks up at most three enrichments
//! (illustration, shopping leads, mood board) as they complete, in any order.
//!
//! # Immutability
//!
//! Records are never mutated once built. [`ConceptRecord::merged`] derives a
//! new record from an existing one plus an [`Enrichment`]; the seed produced by
//! the primary generation is shared between versions through an `Arc`. The
//! orchestrator publishes records as `Arc<ConceptRecord>`, so anyone holding an
//! older snapshot keeps seeing exactly what was published to them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// A generated image
///
/// The bytes are reference counted, so cloning an image (and therefore a
/// record that holds it) never copies pixel data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// MIME type reported by the producer
    pub mime_type: String,
    #[serde(with = "base64_bytes", rename = "data")]
    bytes: Arc<[u8]>,
}

impl ImageData {
    /// Wrap raw image bytes
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Decode an image delivered as base64
    pub fn from_base64(
        mime_type: impl Into<String>,
        encoded: &str,
    ) -> Result<Self, base64::DecodeError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Raw image bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image carries no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the MIME type
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Written-out breakdown of a concept
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDetails {
    /// Materials and textures
    pub fabrication: String,
    /// Cut, shape and construction
    pub structure: String,
    /// Palette and its emotional impact
    pub color_theory: String,
    /// The character the look embodies
    pub archetype: String,
}

/// Output of a successful primary generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSeed {
    /// Generated concept title
    pub name: String,
    /// Short summary of the fusion
    pub rationale: String,
    /// Design DNA keywords, in generation order (duplicates allowed)
    pub design_tags: Vec<String>,
    /// Detailed breakdown
    pub details: ConceptDetails,
    /// Prompt used for the illustration enrichment
    pub visual_prompt: String,
    /// Presentation theme extracted alongside the concept
    pub theme: Theme,
}

/// A grounded shopping reference
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lead {
    /// Page title
    pub title: String,
    /// Page URL (the deduplication key)
    pub url: String,
}

impl Lead {
    /// Create a lead
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Host part of the URL without a leading `www.`
    #[must_use]
    pub fn host(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}

/// Drop leads whose URL was already seen; the first occurrence wins
pub fn dedup_leads(leads: impl IntoIterator<Item = Lead>) -> Vec<Lead> {
    let mut seen = HashSet::new();
    leads
        .into_iter()
        .filter(|lead| seen.insert(lead.url.clone()))
        .collect()
}

/// The three abstractions a mood board is built from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodBoardFacet {
    /// Material pattern study
    Texture,
    /// Architectural geometry study
    Architecture,
    /// Color and light study
    Palette,
}

impl MoodBoardFacet {
    /// All facets in presentation order
    pub const ALL: [Self; 3] = [Self::Texture, Self::Architecture, Self::Palette];

    /// Image prompt for this facet of the given aesthetic
    #[must_use]
    pub fn prompt(self, theme_name: &str) -> String {
        match self {
            Self::Texture => format!(
                "Abstract artistic texture pattern representing the {theme_name} aesthetic, \
                 high quality wallpaper, 8k resolution"
            ),
            Self::Architecture => format!(
                "Futuristic architectural geometry inspired by {theme_name}, \
                 cinematic lighting, macro detail"
            ),
            Self::Palette => format!(
                "Fluid color gradient and light leak overlay in the style of {theme_name}, \
                 ethereal mood"
            ),
        }
    }

    /// Caption for display
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Texture => "Texture",
            Self::Architecture => "Architecture",
            Self::Palette => "Palette",
        }
    }
}

/// One produced mood-board image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBoardTile {
    /// Which abstraction produced the image
    pub facet: MoodBoardFacet,
    /// The image
    pub image: ImageData,
}

/// The optional, best-effort follow-up generations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrichmentKind {
    /// Lookbook illustration of the concept
    Illustration,
    /// Grounded shopping leads
    Leads,
    /// Three-image mood board
    MoodBoard,
}

impl EnrichmentKind {
    /// All kinds in dispatch order
    pub const ALL: [Self; 3] = [Self::Illustration, Self::Leads, Self::MoodBoard];

    fn bit(self) -> u8 {
        match self {
            Self::Illustration => 0b001,
            Self::Leads => 0b010,
            Self::MoodBoard => 0b100,
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Illustration => "illustration",
            Self::Leads => "leads",
            Self::MoodBoard => "mood board",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A subset of [`EnrichmentKind`]s
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<EnrichmentKind>", into = "Vec<EnrichmentKind>")]
pub struct EnrichmentSet(u8);

impl EnrichmentSet {
    /// The empty set
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every enrichment kind
    #[must_use]
    pub fn all() -> Self {
        EnrichmentKind::ALL.into_iter().collect()
    }

    /// Add a kind
    pub fn insert(&mut self, kind: EnrichmentKind) {
        self.0 |= kind.bit();
    }

    /// Remove a kind, returning whether it was present
    pub fn remove(&mut self, kind: EnrichmentKind) -> bool {
        let present = self.contains(kind);
        self.0 &= !kind.bit();
        present
    }

    /// Membership test
    #[must_use]
    pub fn contains(self, kind: EnrichmentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Whether no kinds remain
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in dispatch order
    pub fn iter(self) -> impl Iterator<Item = EnrichmentKind> {
        EnrichmentKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<EnrichmentKind> for EnrichmentSet {
    fn from_iter<I: IntoIterator<Item = EnrichmentKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl From<Vec<EnrichmentKind>> for EnrichmentSet {
    fn from(kinds: Vec<EnrichmentKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<EnrichmentSet> for Vec<EnrichmentKind> {
    fn from(set: EnrichmentSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for EnrichmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Result of one enrichment call, ready to merge
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Enrichment {
    /// Illustration outcome (`None` when the capability produced nothing)
    Illustration(Option<ImageData>),
    /// Leads found (empty means "no leads", which still counts as resolved)
    Leads(Vec<Lead>),
    /// Mood-board tiles in facet order
    MoodBoard(Vec<MoodBoardTile>),
}

impl Enrichment {
    /// Which record field this enrichment targets
    #[must_use]
    pub fn kind(&self) -> EnrichmentKind {
        match self {
            Self::Illustration(_) => EnrichmentKind::Illustration,
            Self::Leads(_) => EnrichmentKind::Leads,
            Self::MoodBoard(_) => EnrichmentKind::MoodBoard,
        }
    }
}

/// The evolving result of a synthesis run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConceptRecord {
    #[serde(flatten)]
    seed: Arc<ConceptSeed>,
    illustration: Option<ImageData>,
    shopping_leads: Option<Vec<Lead>>,
    mood_board: Option<Vec<MoodBoardTile>>,
}

impl ConceptRecord {
    /// A fresh record with no enrichments populated
    #[must_use]
    pub fn new(seed: ConceptSeed) -> Self {
        Self {
            seed: Arc::new(seed),
            illustration: None,
            shopping_leads: None,
            mood_board: None,
        }
    }

    /// The primary generation output
    #[must_use]
    pub fn seed(&self) -> &ConceptSeed {
        &self.seed
    }

    /// Concept title
    #[must_use]
    pub fn name(&self) -> &str {
        &self.seed.name
    }

    /// Concept rationale
    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.seed.rationale
    }

    /// Design tags in generation order
    #[must_use]
    pub fn design_tags(&self) -> &[String] {
        &self.seed.design_tags
    }

    /// Detailed breakdown
    #[must_use]
    pub fn details(&self) -> &ConceptDetails {
        &self.seed.details
    }

    /// Illustration prompt
    #[must_use]
    pub fn visual_prompt(&self) -> &str {
        &self.seed.visual_prompt
    }

    /// Presentation theme
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.seed.theme
    }

    /// Illustration, once produced
    #[must_use]
    pub fn illustration(&self) -> Option<&ImageData> {
        self.illustration.as_ref()
    }

    /// Shopping leads, once resolved (possibly empty)
    #[must_use]
    pub fn shopping_leads(&self) -> Option<&[Lead]> {
        self.shopping_leads.as_deref()
    }

    /// Mood-board tiles, once at least one was produced
    #[must_use]
    pub fn mood_board(&self) -> Option<&[MoodBoardTile]> {
        self.mood_board.as_deref()
    }

    /// Whether the field targeted by `kind` has been written
    #[must_use]
    pub fn is_populated(&self, kind: EnrichmentKind) -> bool {
        match kind {
            EnrichmentKind::Illustration => self.illustration.is_some(),
            EnrichmentKind::Leads => self.shopping_leads.is_some(),
            EnrichmentKind::MoodBoard => self.mood_board.is_some(),
        }
    }

    /// Fields that are still unpopulated
    #[must_use]
    pub fn unpopulated(&self) -> EnrichmentSet {
        EnrichmentKind::ALL
            .into_iter()
            .filter(|kind| !self.is_populated(*kind))
            .collect()
    }

    /// Derive the record that results from merging `enrichment`
    ///
    /// Returns `None` when the merge is a no-op: the field was already written
    /// (first write wins), the illustration is absent, or the mood board is
    /// empty. Leads are written even when empty.
    #[must_use]
    pub fn merged(&self, enrichment: Enrichment) -> Option<Self> {
        if self.is_populated(enrichment.kind()) {
            return None;
        }

        let mut next = self.clone();
        match enrichment {
            Enrichment::Illustration(image) => {
                next.illustration = Some(image?);
            }
            Enrichment::Leads(leads) => {
                next.shopping_leads = Some(dedup_leads(leads));
            }
            Enrichment::MoodBoard(tiles) => {
                if tiles.is_empty() {
                    return None;
                }
                next.mood_board = Some(tiles);
            }
        }
        Some(next)
    }
}

/// Serde adapter that stores bytes as a base64 string
mod base64_bytes {
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Arc<[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&**bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<[u8]>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map(Arc::from)
            .map_err(serde::de::Error::custom)
    }
}
