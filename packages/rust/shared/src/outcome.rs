//! Explicit success-or-degraded results for venue sources.
//!
//! Every source adapter returns an [`Outcome`] instead of a `Result`: a source
//! that fails or is disabled degrades to "nothing", and the caller decides how
//! to record that. Errors never cross the adapter boundary as `Err`.

use crate::error::VenueScoutError;

/// Which collaborator produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Paginated HTML directory (WikiCFP).
    Primary,
    /// Structured venue catalog API (OpenAlex).
    Secondary,
    /// Language-model venue synthesis.
    Generative,
    /// Language-model field enrichment.
    Enrichment,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Generative => "generative",
            Self::Enrichment => "enrichment",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a source produced nothing.
#[derive(Debug)]
pub enum DegradeCause {
    /// Required configuration (e.g. an API key) is absent; no call was made.
    Disabled,
    /// The call was attempted and failed.
    Failed(VenueScoutError),
}

/// A degraded source result.
#[derive(Debug)]
pub struct Degradation {
    pub source: SourceKind,
    pub cause: DegradeCause,
}

impl Degradation {
    pub fn disabled(source: SourceKind) -> Self {
        Self {
            source,
            cause: DegradeCause::Disabled,
        }
    }

    pub fn failed(source: SourceKind, error: VenueScoutError) -> Self {
        Self {
            source,
            cause: DegradeCause::Failed(error),
        }
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            DegradeCause::Disabled => write!(f, "{} source disabled", self.source),
            DegradeCause::Failed(e) => write!(f, "{} source failed: {e}", self.source),
        }
    }
}

/// Result of one adapter call: data, or a degradation to "empty".
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    Ready(T),
    Degraded(Degradation),
}

impl<T> Outcome<T> {
    /// Build an outcome from a fallible computation.
    pub fn from_result(source: SourceKind, result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Degraded(Degradation::failed(source, e)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Split into the value (or its default) and the degradation, if any.
    pub fn split(self) -> (T, Option<Degradation>)
    where
        T: Default,
    {
        match self {
            Self::Ready(value) => (value, None),
            Self::Degraded(d) => (T::default(), Some(d)),
        }
    }
}
