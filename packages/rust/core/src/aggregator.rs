//! Venue discovery: primary -> secondary -> generative -> static, then
//! metadata enrichment and a final name dedup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use venuescout_llm::{
    ChatModel, EnrichMode, LlmVenueEnricher, LlmVenueGenerator, OpenAiCompatClient,
    VenueEnricher, VenueGenerator,
};
use venuescout_shared::{
    AppConfig, DegradeCause, Degradation, DiscoveryId, Result, ThresholdConfig, VenueRecord,
};
use venuescout_sources::{
    OpenAlexSource, PrimarySource, SecondarySource, WikiCfpSource, static_venues,
};

use crate::merge::{dedup_by_name, merge_by_acronym, merge_by_name, unique_acronyms};

/// Tuning for one [`Aggregator`].
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Upper bound on primary result pages fetched per request.
    pub max_pages: u32,
    /// Pause between consecutive primary pages.
    pub page_delay: Duration,
    pub thresholds: ThresholdConfig,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            max_pages: 3,
            page_delay: Duration::from_millis(500),
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl AggregatorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_pages: config.primary.max_pages,
            page_delay: Duration::from_millis(config.primary.page_delay_ms),
            thresholds: config.thresholds.clone(),
        }
    }
}

/// How many records each phase contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    /// Pages actually requested from the primary source.
    pub primary_pages: u32,
    pub primary: usize,
    /// Secondary records merged after the name check.
    pub secondary: usize,
    /// Secondary records matched by the dates enrichment call.
    pub dates_enriched: usize,
    /// Generated records merged after the acronym check.
    pub generated: usize,
    pub static_added: usize,
    /// Records matched by the metadata enrichment call.
    pub metadata_enriched: usize,
    pub duplicates_removed: usize,
}

/// Full result of one discovery request.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub id: DiscoveryId,
    pub domain: String,
    pub records: Vec<VenueRecord>,
    pub counts: PhaseCounts,
    /// Every source that was disabled or failed along the way.
    pub degradations: Vec<Degradation>,
    pub elapsed: Duration,
}

/// Progress callback for reporting discovery status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called whenever the working set changes size.
    fn records(&self, count: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn records(&self, _count: usize) {}
}

/// The discovery orchestrator.
///
/// Each collaborator is injected; every call into one is fault-isolated, so
/// discovery itself cannot fail.
pub struct Aggregator {
    primary: Box<dyn PrimarySource>,
    secondary: Box<dyn SecondarySource>,
    generator: Box<dyn VenueGenerator>,
    enricher: Box<dyn VenueEnricher>,
    settings: AggregatorSettings,
}

impl Aggregator {
    pub fn new(
        primary: Box<dyn PrimarySource>,
        secondary: Box<dyn SecondarySource>,
        generator: Box<dyn VenueGenerator>,
        enricher: Box<dyn VenueEnricher>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            primary,
            secondary,
            generator,
            enricher,
            settings,
        }
    }

    /// Wire the HTTP sources and, if an API key is available, the chat model.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model = OpenAiCompatClient::from_config(&config.llm)?
            .map(|client| Arc::new(client) as Arc<dyn ChatModel>);
        Self::with_model(config, model)
    }

    /// Wire the HTTP sources with an explicit chat model (`None` disables
    /// generation and enrichment).
    pub fn with_model(config: &AppConfig, model: Option<Arc<dyn ChatModel>>) -> Result<Self> {
        if model.is_none() {
            info!("language model unavailable; generative fallback and enrichment disabled");
        }

        Ok(Self::new(
            Box::new(WikiCfpSource::new(&config.primary)?),
            Box::new(OpenAlexSource::new(&config.secondary)?),
            Box::new(LlmVenueGenerator::new(model.clone(), &config.llm)),
            Box::new(LlmVenueEnricher::new(model, &config.llm)),
            AggregatorSettings::from_config(config),
        ))
    }

    /// Discover venues for `domain`. Never fails; see [`Self::discover_with_report`].
    pub async fn discover(&self, domain: &str) -> Vec<VenueRecord> {
        self.discover_with_report(domain, &SilentProgress).await.records
    }

    /// Discover venues for `domain`, reporting per-phase detail.
    ///
    /// 1. Primary: up to `max_pages` pages, stopping at the first empty one
    /// 2. Secondary: one catalog query, dates-enriched, merged by name
    /// 3. Fallback: generative below the low-water mark, static below the floor
    /// 4. Metadata enrichment over records lacking an impact factor
    /// 5. Dedup by name
    #[instrument(skip_all, fields(discovery_id = tracing::field::Empty, domain = %domain))]
    pub async fn discover_with_report(
        &self,
        domain: &str,
        progress: &dyn ProgressReporter,
    ) -> DiscoveryReport {
        let start = Instant::now();
        let id = DiscoveryId::new();
        tracing::Span::current().record("discovery_id", tracing::field::display(&id));
        info!("starting discovery");

        let mut run = Run::default();

        // --- Phase 1: Primary ---
        progress.phase("Searching conference directory");
        self.primary_phase(domain, &mut run, progress).await;

        // --- Phase 2: Secondary ---
        progress.phase("Searching venue catalog");
        self.secondary_phase(domain, &mut run).await;
        progress.records(run.working.len());

        // --- Phase 3: Fallback cascade ---
        let thresholds = &self.settings.thresholds;
        if run.working.len() < thresholds.generative_low_water {
            progress.phase("Generating venues");
            let (generated, degradation) = self.generator.generate(domain).await.split();
            run.note(degradation);
            run.counts.generated = merge_by_acronym(&mut run.working, generated);

            if unique_acronyms(&run.working) < thresholds.static_floor {
                info!(
                    unique = unique_acronyms(&run.working),
                    floor = thresholds.static_floor,
                    "below floor, appending static venues"
                );
                let table = static_venues();
                run.counts.static_added = table.len();
                run.working.extend(table);
            }
            progress.records(run.working.len());
        }

        // --- Phase 4: Metadata enrichment ---
        progress.phase("Estimating impact metadata");
        self.metadata_phase(domain, &mut run).await;

        // --- Phase 5: Dedup ---
        let before = run.working.len();
        let records = dedup_by_name(run.working);
        run.counts.duplicates_removed = before - records.len();
        progress.records(records.len());

        let report = DiscoveryReport {
            id,
            domain: domain.to_string(),
            records,
            counts: run.counts,
            degradations: run.degradations,
            elapsed: start.elapsed(),
        };

        info!(
            count = report.records.len(),
            primary = report.counts.primary,
            secondary = report.counts.secondary,
            generated = report.counts.generated,
            static_added = report.counts.static_added,
            degraded = report.degradations.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "discovery complete"
        );

        report
    }

    async fn primary_phase(&self, domain: &str, run: &mut Run, progress: &dyn ProgressReporter) {
        for page in 1..=self.settings.max_pages {
            if page > 1 && !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }

            run.counts.primary_pages = page;
            let (records, degradation) = self.primary.fetch_page(domain, page).await.split();
            let degraded = degradation.is_some();
            run.note(degradation);

            if records.is_empty() {
                if !degraded {
                    debug!(page, "primary pagination exhausted");
                }
                break;
            }

            run.counts.primary += records.len();
            run.working.extend(records);
            progress.records(run.working.len());
        }
    }

    async fn secondary_phase(&self, domain: &str, run: &mut Run) {
        let (mut catalog, degradation) = self.secondary.search(domain).await.split();
        run.note(degradation);
        if catalog.is_empty() {
            return;
        }

        let (matched, degradation) = self
            .enricher
            .enrich(&mut catalog, domain, EnrichMode::Dates)
            .await
            .split();
        run.note(degradation);
        run.counts.dates_enriched = matched;
        run.counts.secondary = merge_by_name(&mut run.working, catalog);
    }

    /// Enrich the records lacking an impact factor as one batch, then write
    /// them back in place.
    async fn metadata_phase(&self, domain: &str, run: &mut Run) {
        let pending: Vec<usize> = run
            .working
            .iter()
            .enumerate()
            .filter(|(_, r)| r.needs_metadata())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return;
        }

        let mut batch: Vec<VenueRecord> = pending.iter().map(|&i| run.working[i].clone()).collect();
        let (matched, degradation) = self
            .enricher
            .enrich(&mut batch, domain, EnrichMode::Metadata)
            .await
            .split();
        run.note(degradation);
        run.counts.metadata_enriched = matched;

        for (i, record) in pending.into_iter().zip(batch) {
            run.working[i] = record;
        }
    }
}

/// Mutable state of one discovery request.
#[derive(Default)]
struct Run {
    working: Vec<VenueRecord>,
    counts: PhaseCounts,
    degradations: Vec<Degradation>,
}

impl Run {
    fn note(&mut self, degradation: Option<Degradation>) {
        let Some(degradation) = degradation else {
            return;
        };
        match &degradation.cause {
            DegradeCause::Disabled => debug!(source = %degradation.source, "source disabled"),
            DegradeCause::Failed(e) => {
                warn!(source = %degradation.source, error = %e, "source degraded to empty")
            }
        }
        self.degradations.push(degradation);
    }
}
