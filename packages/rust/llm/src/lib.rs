//! Language-model collaborators for venue discovery.
//!
//! This crate provides:
//! - [`ChatModel`] / [`OpenAiCompatClient`]: chat-completion transport
//! - [`extract`]: JSON recovery from free-form model output
//! - [`LlmVenueGenerator`]: synthesizes venues when scraping under-delivers
//! - [`LlmVenueEnricher`]: fills missing schedule or bibliometric fields
//! - [`MatcherChain`]: ordered key strategies for matching model output to records
//!
//! Both adapters report through [`Outcome`]; a missing API key yields
//! `DegradeCause::Disabled` without making a request.

mod client;
mod enrich;
pub mod extract;
mod generate;
mod matchers;
mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use venuescout_shared::{Outcome, Result, VenueRecord};

pub use client::OpenAiCompatClient;
pub use enrich::{FieldPatch, LlmVenueEnricher, apply_patches};
pub use generate::{LlmVenueGenerator, parse_generated_venues};
pub use matchers::{
    AcronymMatcher, FullNameMatcher, KeyMatcher, MatcherChain, NamePrefixMatcher, normalize_key,
};

/// Impact factor assigned when the model offers none.
pub const DEFAULT_IMPACT_FACTOR: f64 = 2.0;

/// Indexing body assigned when the model offers none.
pub const DEFAULT_INDEX: &str = "Scopus";

// ---------------------------------------------------------------------------
// Chat protocol
// ---------------------------------------------------------------------------

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion call: messages plus sampling and deadline settings.
#[derive(Debug, Clone)]
pub struct Completion {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub timeout: Duration,
}

/// A chat-completion endpoint returning the first choice's text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &Completion) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Adapter traits
// ---------------------------------------------------------------------------

/// Synthesizes plausible venues for a domain.
#[async_trait]
pub trait VenueGenerator: Send + Sync {
    async fn generate(&self, domain: &str) -> Outcome<Vec<VenueRecord>>;
}

/// Which fields an enrichment pass fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichMode {
    /// Schedule fields: dates, location, deadline.
    Dates,
    /// Bibliometric fields: impact factor and index.
    Metadata,
}

impl EnrichMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Metadata => "metadata",
        }
    }
}

/// Fills missing fields of records in place, reporting how many were matched.
#[async_trait]
pub trait VenueEnricher: Send + Sync {
    async fn enrich(
        &self,
        records: &mut [VenueRecord],
        domain: &str,
        mode: EnrichMode,
    ) -> Outcome<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_serializes_role_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("be terse")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"be terse"}"#);
    }

    #[test]
    fn enrich_mode_as_str() {
        assert_eq!(EnrichMode::Dates.as_str(), "dates");
        assert_eq!(EnrichMode::Metadata.as_str(), "metadata");
    }
}
