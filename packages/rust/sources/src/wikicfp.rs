//! Primary source: the WikiCFP search servlet.
//!
//! Search results are laid out as row pairs. The first row of each pair has a
//! `rowspan="2"` cell holding the event link (acronym) followed by the full
//! name; the second row carries dates, location, and submission deadline.
//! The search is issued across all years, so rows are kept only when their
//! dates mention one of the next five calendar years.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use venuescout_shared::{
    Degradation, FieldValue, IdSpace, Outcome, PrimaryConfig, Result, SourceKind, VenueRecord,
    collapse_whitespace, random_id,
};

use crate::{PrimarySource, build_client, get_text, parse_base_url};

/// Search servlet path relative to the directory origin.
const SEARCH_PATH: &str = "/cfp/servlet/tool.search";

/// Number of calendar years (starting with the reference year) a row may mention.
const UPCOMING_YEARS: i32 = 5;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("td selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector"));

// ---------------------------------------------------------------------------
// WikiCfpSource
// ---------------------------------------------------------------------------

/// Paginated WikiCFP search adapter.
pub struct WikiCfpSource {
    client: Client,
    base_url: Url,
    page_size: u32,
    /// Fixed "current year" for the upcoming filter; `None` uses the clock.
    reference_year: Option<i32>,
}

impl WikiCfpSource {
    /// Create a source from the `[primary]` config section.
    pub fn new(config: &PrimaryConfig) -> Result<Self> {
        let client = build_client(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            page_size: config.page_size,
            reference_year: None,
        })
    }

    /// Pin the year used by the upcoming-date filter.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }

    /// Build the search URL for a 1-based page number.
    fn search_url(&self, domain: &str, page: u32) -> Url {
        let skip = page.saturating_sub(1) * self.page_size;
        let mut url = self.base_url.clone();
        url.set_path(SEARCH_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("q", domain)
            .append_pair("year", "a")
            .append_pair("skip", &skip.to_string());
        url
    }
}

#[async_trait]
impl PrimarySource for WikiCfpSource {
    #[instrument(skip(self), fields(source = "wikicfp"))]
    async fn fetch_page(&self, domain: &str, page: u32) -> Outcome<Vec<VenueRecord>> {
        let url = self.search_url(domain, page);
        debug!(%url, "fetching search page");

        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "search page fetch failed");
                return Outcome::Degraded(Degradation::failed(SourceKind::Primary, e));
            }
        };

        let records = parse_search_results(&body, &self.base_url, self.reference_year());
        info!(count = records.len(), "parsed search page");
        Outcome::Ready(records)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Header half of a row pair.
struct EventHeader {
    acronym: String,
    name: String,
    link: Url,
}

/// Detail half of a row pair.
struct EventDetail {
    dates: String,
    location: String,
    deadline: String,
}

/// Parse a search result page into upcoming venue records.
///
/// Rows whose first cell lacks `rowspan="2"` are skipped. Each recognized
/// header consumes the following row as its detail row, so a detail row is
/// never considered as a header itself.
pub fn parse_search_results(html: &str, base_url: &Url, reference_year: i32) -> Vec<VenueRecord> {
    let doc = Html::parse_document(html);
    let rows: Vec<ElementRef<'_>> = doc.select(&ROW_SEL).collect();

    let mut records = Vec::new();
    let mut i = 0;

    while i < rows.len() {
        let row = rows[i];
        i += 1;

        let Some(header) = parse_header(row, base_url) else {
            continue;
        };

        let Some(detail_row) = rows.get(i) else {
            break;
        };
        i += 1;

        let Some(detail) = parse_detail(*detail_row) else {
            debug!(acronym = %header.acronym, "detail row has too few cells");
            continue;
        };

        if !is_upcoming(&detail.dates, reference_year) {
            debug!(acronym = %header.acronym, dates = %detail.dates, "skipping past event");
            continue;
        }

        let id = event_id(&header.link).unwrap_or_else(|| random_id(IdSpace::Directory));

        records.push(
            VenueRecord::new(id, header.acronym, header.name)
                .with_dates(FieldValue::known(detail.dates))
                .with_location(FieldValue::known(detail.location))
                .with_deadline(FieldValue::known(detail.deadline))
                .with_website(header.link.to_string()),
        );
    }

    records
}

/// Whether `dates` mentions one of the `UPCOMING_YEARS` years starting at `reference_year`.
pub fn is_upcoming(dates: &str, reference_year: i32) -> bool {
    (reference_year..reference_year + UPCOMING_YEARS).any(|year| dates.contains(&year.to_string()))
}

fn parse_header(row: ElementRef<'_>, base_url: &Url) -> Option<EventHeader> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SEL).collect();
    let first = cells.first()?;

    if first.value().attr("rowspan").map(str::trim) != Some("2") {
        return None;
    }

    let anchor = first.select(&LINK_SEL).next()?;
    let href = anchor.value().attr("href")?;
    let link = base_url.join(href).ok()?;
    let acronym = element_text(anchor);

    let name = element_text(*cells.get(1)?);
    if name.is_empty() {
        return None;
    }

    Some(EventHeader {
        acronym,
        name,
        link,
    })
}

fn parse_detail(row: ElementRef<'_>) -> Option<EventDetail> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SEL).collect();
    if cells.len() < 3 {
        return None;
    }

    Some(EventDetail {
        dates: element_text(cells[0]),
        location: element_text(cells[1]),
        deadline: element_text(cells[2]),
    })
}

/// Extract the `eventid` query parameter from an event link.
fn event_id(link: &Url) -> Option<String> {
    link.query_pairs()
        .find(|(key, _)| key == "eventid")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture() -> String {
        let path = "../../../fixtures/html/wikicfp-search.html";
        std::fs::read_to_string(path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn base() -> Url {
        Url::parse("http://www.wikicfp.com").unwrap()
    }

    fn test_config(base_url: &str) -> PrimaryConfig {
        PrimaryConfig {
            base_url: base_url.into(),
            page_delay_ms: 0,
            timeout_secs: 2,
            ..PrimaryConfig::default()
        }
    }

    /// Build a single header/detail row pair for inline tests.
    fn row_pair(acronym: &str, name: &str, dates: &str) -> String {
        format!(
            r#"<tr><td rowspan="2"><a href="/cfp/servlet/event.showcfp?eventid=42">{acronym}</a></td><td>{name}</td></tr>
               <tr><td>{dates}</td><td>Lisbon, Portugal</td><td>Jan 10, 2026</td></tr>"#
        )
    }

    #[test]
    fn parses_row_pairs_from_fixture() {
        let records = parse_search_results(&load_fixture(), &base(), 2025);
        let acronyms: Vec<&str> = records.iter().map(|r| r.acronym.as_str()).collect();
        assert_eq!(acronyms, vec!["ICRA 2026", "IROS 2027", "HRI 2026"]);

        let icra = &records[0];
        assert_eq!(icra.id, "183211");
        assert_eq!(
            icra.name,
            "IEEE International Conference on Robotics and Automation"
        );
        assert_eq!(icra.dates.as_str(), "Jun 1, 2026 - Jun 5, 2026");
        assert_eq!(icra.location.as_str(), "Vienna, Austria");
        assert_eq!(icra.deadline.as_str(), "Sep 15, 2025");
        assert_eq!(
            icra.website,
            "http://www.wikicfp.com/cfp/servlet/event.showcfp?eventid=183211&copyownerid=90704"
        );
        assert!(icra.impact_factor.is_none());
    }

    #[test]
    fn rows_without_rowspan_are_skipped() {
        let records = parse_search_results(&load_fixture(), &base(), 2025);
        assert!(records.iter().all(|r| r.acronym != "ORPHAN 2026"));
    }

    #[test]
    fn link_without_event_id_gets_random_id() {
        let records = parse_search_results(&load_fixture(), &base(), 2025);
        let hri = records.iter().find(|r| r.acronym == "HRI 2026").unwrap();
        assert_eq!(IdSpace::of(&hri.id), Some(IdSpace::Directory));
        assert_eq!(hri.website, "http://www.wikicfp.com/cfp/program?id=991");
    }

    #[test]
    fn date_filter_boundary() {
        let past = format!("<table>{}</table>", row_pair("OLD", "Old Workshop", "2019 Jan 1-3"));
        assert!(parse_search_results(&past, &base(), 2025).is_empty());

        let future = format!("<table>{}</table>", row_pair("NEW", "New Workshop", "2026 Jan 1-3"));
        let records = parse_search_results(&future, &base(), 2025);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].acronym, "NEW");
    }

    #[test]
    fn is_upcoming_window_is_five_years() {
        assert!(is_upcoming("Dec 2025", 2025));
        assert!(is_upcoming("Jan 2029", 2025));
        assert!(!is_upcoming("Jan 2030", 2025));
        assert!(!is_upcoming("Jan 2024", 2025));
        assert!(!is_upcoming("N/A", 2025));
    }

    #[test]
    fn detail_row_is_never_reprocessed_as_header() {
        // The detail row's first cell carries a row-span marker and a link; it
        // must still be consumed as the detail half of the preceding pair.
        let html = r#"<table>
            <tr><td rowspan="2"><a href="/e?eventid=1">AAA 2026</a></td><td>Alpha Conference</td></tr>
            <tr><td rowspan="2"><a href="/e?eventid=2">Mar 2026</a></td><td>Porto</td><td>Dec 2025</td></tr>
            <tr><td>Bogus Name</td><td>x</td><td>y</td></tr>
        </table>"#;
        let records = parse_search_results(html, &base(), 2025);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].acronym, "AAA 2026");
        assert_eq!(records[0].dates.as_str(), "Mar 2026");
    }

    #[test]
    fn trailing_header_without_detail_is_dropped() {
        let html = r#"<table>
            <tr><td rowspan="2"><a href="/e?eventid=7">LONE 2026</a></td><td>Lonely Conference</td></tr>
        </table>"#;
        assert!(parse_search_results(html, &base(), 2025).is_empty());
    }

    #[test]
    fn search_url_encodes_pagination() {
        let source = WikiCfpSource::new(&test_config("http://www.wikicfp.com")).unwrap();
        let url = source.search_url("machine learning", 3);
        assert_eq!(url.path(), SEARCH_PATH);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".into(), "machine learning".into())));
        assert!(pairs.contains(&("year".into(), "a".into())));
        assert!(pairs.contains(&("skip".into(), "40".into())));
    }

    #[tokio::test]
    async fn fetch_page_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(SEARCH_PATH))
            .and(wiremock::matchers::query_param("q", "robotics"))
            .and(wiremock::matchers::query_param("skip", "0"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(load_fixture()))
            .mount(&server)
            .await;

        let source = WikiCfpSource::new(&test_config(&server.uri()))
            .unwrap()
            .with_reference_year(2025);

        match source.fetch_page("robotics", 1).await {
            Outcome::Ready(records) => {
                assert_eq!(records.len(), 3);
                assert!(records[0].website.starts_with(&server.uri()));
            }
            Outcome::Degraded(d) => panic!("expected Ready, got {d}"),
        }
    }

    #[tokio::test]
    async fn fetch_page_degrades_on_server_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(SEARCH_PATH))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = WikiCfpSource::new(&test_config(&server.uri())).unwrap();
        let outcome = source.fetch_page("robotics", 1).await;

        match outcome {
            Outcome::Degraded(d) => assert_eq!(d.source, SourceKind::Primary),
            Outcome::Ready(_) => panic!("expected Degraded"),
        }
    }

    #[tokio::test]
    async fn fetch_page_without_results_is_empty() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>No results</p></body></html>"),
            )
            .mount(&server)
            .await;

        let source = WikiCfpSource::new(&test_config(&server.uri())).unwrap();
        match source.fetch_page("nothing", 2).await {
            Outcome::Ready(records) => assert!(records.is_empty()),
            Outcome::Degraded(d) => panic!("expected Ready, got {d}"),
        }
    }
}
