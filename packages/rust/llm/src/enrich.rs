//! Model-assisted enrichment of incomplete venue records.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use venuescout_shared::{
    Degradation, FieldValue, LlmConfig, Outcome, Result, SourceKind, VenueRecord,
};

use crate::extract::{json_object, lenient_f64, lenient_string};
use crate::matchers::{MatcherChain, normalize_key};
use crate::prompts::{ENRICHMENT_SYSTEM, enrichment_prompt};
use crate::{
    ChatMessage, ChatModel, Completion, DEFAULT_IMPACT_FACTOR, DEFAULT_INDEX, EnrichMode,
    VenueEnricher,
};

/// Field values the model proposed for one venue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldPatch {
    #[serde(default, deserialize_with = "lenient_string")]
    pub dates: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deadline: Option<String>,
    #[serde(default, alias = "impact_factor", deserialize_with = "lenient_f64")]
    pub impact: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub index: Option<String>,
}

/// Overwrite `field` only if it is unknown and the patch has a real value.
fn fill_schedule(field: &mut FieldValue, proposed: Option<&String>) {
    if field.is_known() {
        return;
    }
    if let Some(value) = proposed.map(FieldValue::known).filter(FieldValue::is_known) {
        *field = value;
    }
}

fn fill_metadata(record: &mut VenueRecord, patch: Option<&FieldPatch>) {
    if record.impact_factor.is_none() {
        let impact = patch.and_then(|p| p.impact).unwrap_or(DEFAULT_IMPACT_FACTOR);
        record.impact_factor = Some(impact);
    }
    if record.index.is_none() {
        let index = patch
            .and_then(|p| p.index.clone())
            .unwrap_or_else(|| DEFAULT_INDEX.to_string());
        record.index = Some(index);
    }
}

/// Apply model patches to `records`, returning how many records matched a key.
///
/// `patches` must be keyed by [`normalize_key`] output. Existing values are
/// never replaced: `Dates` fills unknown schedule fields only, `Metadata`
/// fills a missing impact factor or index. In `Metadata` mode records with no
/// matching patch still receive the default bibliometrics.
pub fn apply_patches(
    records: &mut [VenueRecord],
    patches: &HashMap<String, FieldPatch>,
    mode: EnrichMode,
    matchers: &MatcherChain,
) -> usize {
    let mut matched = 0;

    for record in records.iter_mut() {
        let patch = matchers.find(record, patches);
        if patch.is_some() {
            matched += 1;
        }

        match mode {
            EnrichMode::Dates => {
                let Some(patch) = patch else { continue };
                fill_schedule(&mut record.dates, patch.dates.as_ref());
                fill_schedule(&mut record.location, patch.location.as_ref());
                fill_schedule(&mut record.deadline, patch.deadline.as_ref());
            }
            EnrichMode::Metadata => fill_metadata(record, patch),
        }
    }

    matched
}

/// Parse the model's `{key: patch}` object into a normalized-key map.
///
/// Entries whose value is not a patch object are ignored. Objects keep the
/// reply's key order, so when two keys normalize to the same key the one
/// the model wrote first wins.
fn parse_patches(content: &str) -> Result<HashMap<String, FieldPatch>> {
    let object = json_object(content)?;
    let mut patches = HashMap::with_capacity(object.len());

    for (key, value) in object {
        let normalized = normalize_key(&key);
        if normalized.is_empty() {
            continue;
        }
        match serde_json::from_value::<FieldPatch>(value) {
            Ok(patch) => {
                patches.entry(normalized).or_insert(patch);
            }
            Err(e) => debug!(%key, error = %e, "ignoring malformed enrichment entry"),
        }
    }

    Ok(patches)
}

/// Venue enricher backed by a chat model.
pub struct LlmVenueEnricher {
    model: Option<Arc<dyn ChatModel>>,
    matchers: MatcherChain,
    temperature: f32,
    timeout: Duration,
}

impl LlmVenueEnricher {
    /// `model` is `None` when no API key is configured; enrichment is then disabled.
    pub fn new(model: Option<Arc<dyn ChatModel>>, config: &LlmConfig) -> Self {
        Self {
            model,
            matchers: MatcherChain::default(),
            temperature: config.enrichment_temperature,
            timeout: Duration::from_secs(config.enrichment_timeout_secs),
        }
    }

    /// Replace the key-matching strategies.
    pub fn with_matchers(mut self, matchers: MatcherChain) -> Self {
        self.matchers = matchers;
        self
    }
}

#[async_trait]
impl VenueEnricher for LlmVenueEnricher {
    #[instrument(skip(self, records, mode), fields(count = records.len(), mode = mode.as_str()))]
    async fn enrich(
        &self,
        records: &mut [VenueRecord],
        domain: &str,
        mode: EnrichMode,
    ) -> Outcome<usize> {
        if records.is_empty() {
            return Outcome::Ready(0);
        }
        let Some(model) = &self.model else {
            debug!("no model configured, skipping enrichment");
            return Outcome::Degraded(Degradation::disabled(SourceKind::Enrichment));
        };

        let request = Completion {
            messages: vec![
                ChatMessage::system(ENRICHMENT_SYSTEM),
                ChatMessage::user(enrichment_prompt(records, domain, mode)),
            ],
            temperature: self.temperature,
            timeout: self.timeout,
        };

        let patches = match model.complete(&request).await {
            Ok(content) => parse_patches(&content),
            Err(e) => Err(e),
        };

        match patches {
            Ok(patches) => {
                let matched = apply_patches(records, &patches, mode, &self.matchers);
                info!(matched, offered = patches.len(), "enrichment applied");
                Outcome::Ready(matched)
            }
            Err(e) => {
                warn!(error = %e, "enrichment failed, records left unmodified");
                Outcome::Degraded(Degradation::failed(SourceKind::Enrichment, e))
            }
        }
    }
}
