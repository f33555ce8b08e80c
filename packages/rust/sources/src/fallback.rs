//! Hand-curated last-resort venue list.

use venuescout_shared::{FieldValue, VenueRecord};

/// The static fallback table: five well-known venues, regardless of domain.
pub fn static_venues() -> Vec<VenueRecord> {
    vec![
        VenueRecord::new(
            "conf_cvpr_2026",
            "CVPR 2026",
            "IEEE/CVF Conference on Computer Vision and Pattern Recognition",
        )
        .with_dates(FieldValue::known("June 14-20, 2026"))
        .with_deadline(FieldValue::known("November 2025"))
        .with_impact_factor(45.17)
        .with_index("IEEE/CVF")
        .with_website("https://cvpr.thecvf.com/"),
        VenueRecord::new(
            "conf_neurips_2025",
            "NeurIPS 2025",
            "Conference on Neural Information Processing Systems",
        )
        .with_dates(FieldValue::known("December 2025"))
        .with_location(FieldValue::known("San Diego, USA (Est.)"))
        .with_deadline(FieldValue::known("May 2025"))
        .with_impact_factor(38.2)
        .with_index("NeurIPS")
        .with_website("https://neurips.cc/"),
        VenueRecord::new(
            "conf_icml_2026",
            "ICML 2026",
            "International Conference on Machine Learning",
        )
        .with_dates(FieldValue::known("July 2026"))
        .with_location(FieldValue::known("Vienna, Austria"))
        .with_deadline(FieldValue::known("January 2026"))
        .with_impact_factor(32.5)
        .with_index("ICML")
        .with_website("https://icml.cc/"),
        VenueRecord::new(
            "conf_aaai_2026",
            "AAAI 2026",
            "AAAI Conference on Artificial Intelligence",
        )
        .with_dates(FieldValue::known("February 2026"))
        .with_location(FieldValue::known("Vancouver, Canada"))
        .with_deadline(FieldValue::known("August 2025"))
        .with_impact_factor(18.5)
        .with_index("AAAI")
        .with_website("https://aaai.org/"),
        VenueRecord::new(
            "conf_iclr_2026",
            "ICLR 2026",
            "International Conference on Learning Representations",
        )
        .with_dates(FieldValue::known("May 2026"))
        .with_location(FieldValue::known("Singapore"))
        .with_deadline(FieldValue::known("October 2025"))
        .with_impact_factor(25.4)
        .with_index("ICLR")
        .with_website("https://iclr.cc/"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_five_distinct_complete_venues() {
        let venues = static_venues();
        assert_eq!(venues.len(), 5);

        let names: HashSet<String> = venues.iter().map(|v| v.dedup_key()).collect();
        assert_eq!(names.len(), 5);
        assert!(venues.iter().all(|v| !v.needs_metadata()));
    }

    #[test]
    fn unknown_location_renders_as_tbd() {
        let cvpr = &static_venues()[0];
        assert!(!cvpr.location.is_known());
        assert_eq!(cvpr.location.as_str(), "TBD");
    }
}
