//! Key strategies for matching model output back to records.
//!
//! Enrichment responses are keyed by whatever identifier the model chose to
//! echo: usually the acronym, sometimes the full name, occasionally the name
//! cut at its subtitle. Strategies are tried in order and the first hit wins.

use std::collections::HashMap;

use venuescout_shared::{VenueRecord, collapse_whitespace};

/// Normalize a key for comparison: collapsed whitespace, lower case.
pub fn normalize_key(key: &str) -> String {
    collapse_whitespace(key).to_lowercase()
}

/// One way of deriving a lookup key from a record.
pub trait KeyMatcher: Send + Sync {
    /// Strategy name for tracing.
    fn name(&self) -> &'static str;

    /// Raw candidate key, or `None` when the record has nothing to offer.
    fn candidate(&self, record: &VenueRecord) -> Option<String>;
}

/// Matches on the record's acronym.
pub struct AcronymMatcher;

impl KeyMatcher for AcronymMatcher {
    fn name(&self) -> &'static str {
        "acronym"
    }

    fn candidate(&self, record: &VenueRecord) -> Option<String> {
        Some(record.acronym.clone())
    }
}

/// Matches on the full display name.
pub struct FullNameMatcher;

impl KeyMatcher for FullNameMatcher {
    fn name(&self) -> &'static str {
        "full_name"
    }

    fn candidate(&self, record: &VenueRecord) -> Option<String> {
        Some(record.name.clone())
    }
}

/// Matches on the name up to its first colon.
pub struct NamePrefixMatcher;

impl KeyMatcher for NamePrefixMatcher {
    fn name(&self) -> &'static str {
        "name_prefix"
    }

    fn candidate(&self, record: &VenueRecord) -> Option<String> {
        record.name.split(':').next().map(str::to_string)
    }
}

/// Ordered list of key strategies.
pub struct MatcherChain {
    matchers: Vec<Box<dyn KeyMatcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Box<dyn KeyMatcher>>) -> Self {
        Self { matchers }
    }

    /// Append a strategy, tried after the existing ones.
    pub fn with(mut self, matcher: impl KeyMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Find the entry for `record` in a map keyed by [`normalize_key`] output.
    pub fn find<'a, T>(&self, record: &VenueRecord, entries: &'a HashMap<String, T>) -> Option<&'a T> {
        self.matchers.iter().find_map(|matcher| {
            let key = normalize_key(&matcher.candidate(record)?);
            if key.is_empty() {
                return None;
            }
            let hit = entries.get(&key)?;
            tracing::trace!(strategy = matcher.name(), %key, "enrichment key matched");
            Some(hit)
        })
    }
}

impl Default for MatcherChain {
    /// Acronym, then full name, then name prefix.
    fn default() -> Self {
        Self::new(vec![
            Box::new(AcronymMatcher),
            Box::new(FullNameMatcher),
            Box::new(NamePrefixMatcher),
        ])
    }
}
