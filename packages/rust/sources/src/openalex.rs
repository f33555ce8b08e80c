//! Secondary source: the OpenAlex catalog API.
//!
//! OpenAlex knows venue names and homepages but not upcoming schedules, so
//! every record it yields carries placeholder schedule fields and is handed
//! to date enrichment by the orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

use venuescout_shared::{
    Degradation, FieldValue, IdSpace, Outcome, Result, SecondaryConfig, SourceKind, VenueRecord,
    VenueScoutError, collapse_whitespace, derive_acronym, random_id,
};

use crate::{SecondarySource, build_client, get_text, parse_base_url};

/// Catalog search endpoint relative to the API origin.
const CATALOG_PATH: &str = "/sources";

/// Placeholder schedule text for catalog records.
const DATES_PLACEHOLDER: &str = "TBD 2026";

/// User-Agent string for catalog requests.
const USER_AGENT: &str = concat!("VenueScout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    results: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: Option<String>,
    display_name: Option<String>,
    homepage_url: Option<String>,
    url: Option<String>,
}

/// OpenAlex keyword search adapter.
pub struct OpenAlexSource {
    client: Client,
    base_url: Url,
    per_page: u32,
}

impl OpenAlexSource {
    /// Create a source from the `[secondary]` config section.
    pub fn new(config: &SecondaryConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(USER_AGENT, Duration::from_secs(config.timeout_secs))?,
            base_url: parse_base_url(&config.base_url)?,
            per_page: config.per_page,
        })
    }

    fn search_url(&self, domain: &str) -> Url {
        // Commas separate filters in the OpenAlex query syntax.
        let keyword = domain.replace(',', " ");
        let mut url = self.base_url.clone();
        url.set_path(CATALOG_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("filter", &format!("display_name.search:{}", keyword.trim()))
            .append_pair("per-page", &self.per_page.to_string());
        url
    }

    async fn query(&self, domain: &str) -> Result<Vec<VenueRecord>> {
        let url = self.search_url(domain);
        let body = get_text(&self.client, &url).await?;
        let response: CatalogResponse = serde_json::from_str(&body)
            .map_err(|e| VenueScoutError::parse(format!("catalog response: {e}")))?;

        Ok(response.results.into_iter().filter_map(to_record).collect())
    }
}

#[async_trait]
impl SecondarySource for OpenAlexSource {
    #[instrument(skip(self), fields(source = "openalex"))]
    async fn search(&self, domain: &str) -> Outcome<Vec<VenueRecord>> {
        match self.query(domain).await {
            Ok(records) => {
                info!(count = records.len(), "catalog search complete");
                Outcome::Ready(records)
            }
            Err(e) => {
                warn!(error = %e, "catalog search failed");
                Outcome::Degraded(Degradation::failed(SourceKind::Secondary, e))
            }
        }
    }
}

/// Convert a catalog entry into a schedule-less record. Nameless entries are dropped.
fn to_record(entry: CatalogEntry) -> Option<VenueRecord> {
    let name = collapse_whitespace(entry.display_name.as_deref().unwrap_or_default());
    if name.is_empty() {
        return None;
    }

    let id = entry
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| random_id(IdSpace::Catalog));
    let website = entry
        .homepage_url
        .filter(|u| !u.is_empty())
        .or(entry.url)
        .unwrap_or_default();

    Some(
        VenueRecord::new(id, derive_acronym(&name), name)
            .with_dates(FieldValue::placeholder(DATES_PLACEHOLDER))
            .with_website(website),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> SecondaryConfig {
        SecondaryConfig {
            base_url: base_url.into(),
            timeout_secs: 2,
            ..SecondaryConfig::default()
        }
    }

    const CATALOG_BODY: &str = r#"{
        "meta": {"count": 3},
        "results": [
            {
                "id": "https://openalex.org/S4306420609",
                "display_name": "International Conference on Machine Learning",
                "homepage_url": "https://icml.cc"
            },
            {
                "id": null,
                "display_name": "robotics",
                "homepage_url": null
            },
            {
                "id": "https://openalex.org/S1",
                "display_name": "   "
            }
        ]
    }"#;

    #[test]
    fn search_url_uses_filter_syntax() {
        let source = OpenAlexSource::new(&test_config("https://api.openalex.org")).unwrap();
        let url = source.search_url("graph, learning");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("filter".into(), "display_name.search:graph  learning".into())));
        assert!(pairs.contains(&("per-page".into(), "15".into())));
    }

    #[tokio::test]
    async fn search_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(CATALOG_PATH))
            .and(wiremock::matchers::query_param(
                "filter",
                "display_name.search:machine learning",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(CATALOG_BODY))
            .mount(&server)
            .await;

        let source = OpenAlexSource::new(&test_config(&server.uri())).unwrap();
        let records = match source.search("machine learning").await {
            Outcome::Ready(records) => records,
            Outcome::Degraded(d) => panic!("expected Ready, got {d}"),
        };

        assert_eq!(records.len(), 2);

        let icml = &records[0];
        assert_eq!(icml.id, "https://openalex.org/S4306420609");
        assert_eq!(icml.acronym, "ICML");
        assert_eq!(icml.dates.as_str(), "TBD 2026");
        assert_eq!(icml.location.as_str(), "TBD");
        assert_eq!(icml.deadline.as_str(), "TBD");
        assert_eq!(icml.website, "https://icml.cc");
        assert!(icml.needs_schedule());

        let robotics = &records[1];
        assert_eq!(robotics.acronym, "ROBO");
        assert_eq!(IdSpace::of(&robotics.id), Some(IdSpace::Catalog));
        assert_eq!(robotics.website, "");
    }

    #[tokio::test]
    async fn search_degrades_on_malformed_json() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let source = OpenAlexSource::new(&test_config(&server.uri())).unwrap();
        match source.search("anything").await {
            Outcome::Degraded(d) => {
                assert_eq!(d.source, SourceKind::Secondary);
                assert!(d.to_string().contains("parse error"));
            }
            Outcome::Ready(_) => panic!("expected Degraded"),
        }
    }

    #[tokio::test]
    async fn search_degrades_on_transport_error() {
        // Nothing listens on the discard port.
        let source = OpenAlexSource::new(&test_config("http://127.0.0.1:9")).unwrap();
        assert!(source.search("anything").await.is_degraded());
    }
}
