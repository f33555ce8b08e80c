//! Venue sources: the primary HTML directory, the secondary catalog API,
//! and the static fallback table.
//!
//! This crate provides:
//! - [`PrimarySource`] / [`WikiCfpSource`]: paginated, row-pair HTML scraping
//! - [`SecondarySource`] / [`OpenAlexSource`]: catalog search by keyword
//! - [`static_venues`]: the hand-curated last-resort list
//!
//! Sources never return `Err`; failures degrade to an empty [`Outcome`].

mod fallback;
mod openalex;
mod wikicfp;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use venuescout_shared::{Outcome, Result, VenueRecord, VenueScoutError};

pub use fallback::static_venues;
pub use openalex::OpenAlexSource;
pub use wikicfp::{WikiCfpSource, is_upcoming, parse_search_results};

/// Maximum number of redirects followed by source clients.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A paginated venue directory.
#[async_trait]
pub trait PrimarySource: Send + Sync {
    /// Fetch one result page (1-based) for `domain`.
    async fn fetch_page(&self, domain: &str, page: u32) -> Outcome<Vec<VenueRecord>>;
}

/// A structured venue catalog searched by keyword.
///
/// Records it returns lack schedule data and are enrichment candidates.
#[async_trait]
pub trait SecondarySource: Send + Sync {
    async fn search(&self, domain: &str) -> Outcome<Vec<VenueRecord>>;
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with the given user agent and timeout.
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| VenueScoutError::Network(format!("failed to build HTTP client: {e}")))
}

/// Parse a configured base URL, reporting it as a config error.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| VenueScoutError::config(format!("invalid base URL {raw:?}: {e}")))
}

/// GET a URL and return the body, treating non-2xx as a network error.
pub(crate) async fn get_text(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| VenueScoutError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(VenueScoutError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| VenueScoutError::Network(format!("{url}: failed to read body: {e}")))
}
