//! Core domain types for VenueScout venue records.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Display sentinel for schedule fields whose value is not known.
pub const TBD: &str = "TBD";

// ---------------------------------------------------------------------------
// DiscoveryId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one discovery request (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryId(pub Uuid);

impl DiscoveryId {
    /// Generate a new time-sortable discovery identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DiscoveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DiscoveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A displayable schedule field that also tracks whether its value is known.
///
/// Unknown fields still render as text (`"TBD"` or a placeholder such as
/// `"TBD 2026"`), so a record is always displayable, but enrichment decides
/// eligibility from [`FieldValue::is_known`] rather than string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    text: String,
    known: bool,
}

impl FieldValue {
    /// A known value. Blank or `"TBD"` text yields an unknown field instead.
    pub fn known(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(TBD) {
            return Self::unknown();
        }
        Self {
            text: trimmed.to_string(),
            known: true,
        }
    }

    /// An unknown value rendered as `"TBD"`.
    pub fn unknown() -> Self {
        Self {
            text: TBD.to_string(),
            known: false,
        }
    }

    /// An unknown value rendered with custom placeholder text.
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            known: false,
        }
    }

    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.map(FieldValue::known).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// VenueRecord
// ---------------------------------------------------------------------------

/// A single academic venue, as returned by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    /// Source-assigned identifier, or a prefixed random id (see [`IdSpace`]).
    pub id: String,
    /// Short label (e.g. `ICML 2026`).
    pub acronym: String,
    /// Full display name; the identity key for deduplication.
    pub name: String,
    /// Human-readable schedule.
    #[serde(default)]
    pub dates: FieldValue,
    #[serde(default)]
    pub location: FieldValue,
    /// Submission deadline text.
    #[serde(default)]
    pub deadline: FieldValue,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub impact_factor: Option<f64>,
    /// Indexing body, e.g. `IEEE` or `Scopus`.
    #[serde(default)]
    pub index: Option<String>,
}

impl VenueRecord {
    /// Create a record with unknown schedule fields and no bibliometrics.
    ///
    /// An empty acronym is derived from the name.
    pub fn new(id: impl Into<String>, acronym: impl Into<String>, name: impl Into<String>) -> Self {
        let name = collapse_whitespace(&name.into());
        let acronym = collapse_whitespace(&acronym.into());
        let acronym = if acronym.is_empty() {
            derive_acronym(&name)
        } else {
            acronym
        };

        Self {
            id: id.into(),
            acronym,
            name,
            dates: FieldValue::unknown(),
            location: FieldValue::unknown(),
            deadline: FieldValue::unknown(),
            website: String::new(),
            impact_factor: None,
            index: None,
        }
    }

    pub fn with_dates(mut self, dates: FieldValue) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_location(mut self, location: FieldValue) -> Self {
        self.location = location;
        self
    }

    pub fn with_deadline(mut self, deadline: FieldValue) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_impact_factor(mut self, impact_factor: f64) -> Self {
        self.impact_factor = Some(impact_factor);
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Deduplication key: trimmed, lower-cased name.
    pub fn dedup_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Acronym key used while merging fallback sources.
    pub fn acronym_key(&self) -> String {
        self.acronym.trim().to_lowercase()
    }

    /// Whether the record still lacks bibliometric data.
    pub fn needs_metadata(&self) -> bool {
        self.impact_factor.is_none()
    }

    /// Whether any schedule field is still unknown.
    pub fn needs_schedule(&self) -> bool {
        !(self.dates.is_known() && self.location.is_known() && self.deadline.is_known())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Derive an acronym from the uppercase letters of a name.
///
/// Falls back to the first four characters, upper-cased, when fewer than
/// three uppercase letters are present.
pub fn derive_acronym(name: &str) -> String {
    let capitals: String = name.chars().filter(|c| c.is_uppercase()).collect();
    if capitals.chars().count() >= 3 {
        return capitals;
    }
    name.chars().take(4).collect::<String>().to_uppercase()
}

/// Numeric part of a randomly assigned id.
const RANDOM_ID_RANGE: RangeInclusive<u32> = 10_000..=99_999;

/// Namespace for ids assigned when a source does not supply one.
///
/// Every space has its own prefix, so random ids never collide across
/// sources or with the bare numeric `eventid`s the directory hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSpace {
    Directory,
    Catalog,
    Generated,
}

impl IdSpace {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Directory => "cfp",
            Self::Catalog => "oa",
            Self::Generated => "gen",
        }
    }

    /// The space a random id was drawn from, if any.
    pub fn of(id: &str) -> Option<Self> {
        let (prefix, number) = id.split_once('-')?;
        number.parse::<u32>().ok()?;
        [Self::Directory, Self::Catalog, Self::Generated]
            .into_iter()
            .find(|space| space.prefix() == prefix)
    }
}

/// Generate a random identifier such as `gen-48213` inside `space`.
pub fn random_id(space: IdSpace) -> String {
    let number = rand::thread_rng().gen_range(RANDOM_ID_RANGE);
    format!("{}-{number}", space.prefix())
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
