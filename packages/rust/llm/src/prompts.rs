//! Prompt text for venue generation and enrichment.

use venuescout_shared::VenueRecord;

use crate::EnrichMode;

pub(crate) const GENERATION_SYSTEM: &str =
    "You are a valid JSON generator. Do not output markdown fences or text. Just JSON.";

pub(crate) const ENRICHMENT_SYSTEM: &str = "You are an academic expert JSON generator.";

/// Ask for 8-12 real venues covering `domain` in `year` and the year after.
pub(crate) fn generation_prompt(domain: &str, year: i32) -> String {
    let next_year = year + 1;
    format!(
        r#"You are a comprehensive academic conference database.
The user is searching for conferences in the field of: '{domain}'.

Scraping sources returned too few results.
Generate a list of 8-12 REAL, MAJOR conferences that cover '{domain}' occurring in {year}-{next_year}.
If exact dates are not confirmed, estimate them from historical patterns.

Return strictly valid JSON in this format:
[
  {{
    "acronym": "CONF {next_year}",
    "name": "Full Conference Name",
    "dates": "Month DD - Month DD, YYYY",
    "location": "City, Country",
    "deadline": "Month DD, YYYY",
    "impact_factor": 5.5,
    "index": "IEEE/Scopus/WebOfScience",
    "website": "https://example.com"
  }}
]"#
    )
}

/// Ask for per-venue schedule or bibliometric estimates, keyed by acronym.
pub(crate) fn enrichment_prompt(records: &[VenueRecord], domain: &str, mode: EnrichMode) -> String {
    let venues = records
        .iter()
        .map(|r| format!("- {} (Acronym: {})", r.name, r.acronym))
        .collect::<Vec<_>>()
        .join("\n");

    match mode {
        EnrichMode::Dates => format!(
            r#"For the following real academic venues in '{domain}', estimate the NEXT likely event details based on their historical recurring schedule.

Input:
{venues}

Return JSON mapping the acronym (or the name if there is no acronym) to details.
Format:
{{
  "ACRONYM": {{
    "dates": "June 15-20, 2026",
    "location": "Paris, France",
    "deadline": "Jan 10, 2026"
  }}
}}"#
        ),
        EnrichMode::Metadata => format!(
            r#"For these conferences in '{domain}', estimate Impact Factor (0-20) and Indexing (IEEE, Scopus, etc).

Input:
{venues}

Format:
{{ "ACRONYM": {{ "impact": 5.2, "index": "IEEE" }} }}"#
        ),
    }
}
