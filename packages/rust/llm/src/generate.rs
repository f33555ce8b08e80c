//! Generative fallback: ask the model for plausible venues.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use venuescout_shared::{
    Degradation, FieldValue, IdSpace, LlmConfig, Outcome, Result, SourceKind, VenueRecord,
    random_id,
};

use crate::extract::{json_array, lenient_f64, lenient_string};
use crate::prompts::{GENERATION_SYSTEM, generation_prompt};
use crate::{
    ChatMessage, ChatModel, Completion, DEFAULT_IMPACT_FACTOR, DEFAULT_INDEX, VenueGenerator,
};

/// One element of the model's JSON array.
#[derive(Debug, Deserialize)]
struct GeneratedVenue {
    #[serde(default, deserialize_with = "lenient_string")]
    acronym: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    dates: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    impact_factor: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    index: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    website: Option<String>,
}

impl GeneratedVenue {
    fn into_record(self) -> Option<VenueRecord> {
        let name = self.name?;
        let field = |value: Option<String>| value.map(FieldValue::known).unwrap_or_default();

        Some(
            VenueRecord::new(
                random_id(IdSpace::Generated),
                self.acronym.unwrap_or_default(),
                name,
            )
            .with_dates(field(self.dates))
            .with_location(field(self.location))
            .with_deadline(field(self.deadline))
            .with_website(self.website.unwrap_or_default())
            .with_impact_factor(self.impact_factor.unwrap_or(DEFAULT_IMPACT_FACTOR))
            .with_index(self.index.unwrap_or_else(|| DEFAULT_INDEX.to_string())),
        )
    }
}

/// Parse model output into venue records.
///
/// Items that are not objects or lack a name are dropped; the rest get fresh
/// random ids and bibliometric defaults.
pub fn parse_generated_venues(content: &str) -> Result<Vec<VenueRecord>> {
    let items = json_array(content)?;
    let total = items.len();

    let records: Vec<VenueRecord> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<GeneratedVenue>(item) {
            Ok(venue) => venue.into_record(),
            Err(e) => {
                debug!(error = %e, "dropping malformed generated venue");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(kept = records.len(), total, "some generated venues were invalid");
    }
    Ok(records)
}

/// Venue generator backed by a chat model.
pub struct LlmVenueGenerator {
    model: Option<Arc<dyn ChatModel>>,
    temperature: f32,
    timeout: Duration,
    reference_year: Option<i32>,
}

impl LlmVenueGenerator {
    /// `model` is `None` when no API key is configured; generation is then disabled.
    pub fn new(model: Option<Arc<dyn ChatModel>>, config: &LlmConfig) -> Self {
        Self {
            model,
            temperature: config.generation_temperature,
            timeout: Duration::from_secs(config.generation_timeout_secs),
            reference_year: None,
        }
    }

    /// Pin the first year of the requested window.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }
}

#[async_trait]
impl VenueGenerator for LlmVenueGenerator {
    #[instrument(skip(self))]
    async fn generate(&self, domain: &str) -> Outcome<Vec<VenueRecord>> {
        let Some(model) = &self.model else {
            debug!("no model configured, skipping generation");
            return Outcome::Degraded(Degradation::disabled(SourceKind::Generative));
        };

        let year = self.reference_year.unwrap_or_else(|| Utc::now().year());
        let request = Completion {
            messages: vec![
                ChatMessage::system(GENERATION_SYSTEM),
                ChatMessage::user(generation_prompt(domain, year)),
            ],
            temperature: self.temperature,
            timeout: self.timeout,
        };

        let result = match model.complete(&request).await {
            Ok(content) => parse_generated_venues(&content),
            Err(e) => Err(e),
        };

        match result {
            Ok(records) => {
                info!(count = records.len(), "generated venues");
                Outcome::Ready(records)
            }
            Err(e) => {
                warn!(error = %e, "venue generation failed");
                Outcome::Degraded(Degradation::failed(SourceKind::Generative, e))
            }
        }
    }
}
