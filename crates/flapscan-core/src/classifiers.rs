//! Pure classification helpers applied to extracted records.

use crate::models::{LinkRate, LinkState, SiteCode};
use crate::rules::ClassificationRules;

/// Map a description to a category name.
///
/// Matching is a case-insensitive substring test. Categories are tried in
/// configured order and the first one with any matching keyword wins; an
/// empty description or no match yields the fallback category.
pub fn classify_category<'r>(description: &str, rules: &'r ClassificationRules) -> &'r str {
    if description.is_empty() {
        return &rules.fallback_category;
    }
    let lowered = description.to_lowercase();
    rules
        .categories
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|kw| lowered.contains(&kw.to_lowercase()))
        })
        .map(|rule| rule.name.as_str())
        .unwrap_or(&rules.fallback_category)
}

/// Port speed from the interface name prefix (case-sensitive).
pub fn classify_rate(interface: &str) -> LinkRate {
    if interface.starts_with("Hu") {
        LinkRate::HundredGig
    } else if interface.starts_with("Te") {
        LinkRate::TenGig
    } else {
        LinkRate::Unknown
    }
}

/// Up only when both raw tokens are exactly `"up"`.
///
/// The comparison is case-sensitive, unlike the descriptor lookup which
/// lower-cases its status columns first.
pub fn classify_link_status(state1: &str, state2: &str) -> LinkState {
    if state1 == "up" && state2 == "up" {
        LinkState::Up
    } else {
        LinkState::Down
    }
}

/// Far-end site from a circuit description.
///
/// Only the text before the first backslash is considered. The first
/// configured prefix it contains wins; otherwise the segment itself is
/// returned as an unclassified code.
pub fn classify_site(description: &str, site_prefixes: &[String]) -> SiteCode {
    let first_segment = description.split('\\').next().unwrap_or(description);
    site_prefixes
        .iter()
        .find(|prefix| first_segment.contains(prefix.as_str()))
        .map(|prefix| SiteCode::Known(prefix.clone()))
        .unwrap_or_else(|| SiteCode::Unclassified(first_segment.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CategoryRule;

    fn rules() -> ClassificationRules {
        ClassificationRules::default()
    }

    // ── classify_category ─────────────────────────────────────────────────────

    #[test]
    fn test_category_matches_keyword_case_insensitively() {
        assert_eq!(classify_category("Etisalat-MKT/RMS", &rules()), "Etisalat");
        assert_eq!(classify_category("ORANGE backhaul", &rules()), "Orange");
    }

    #[test]
    fn test_category_empty_description_is_fallback() {
        assert_eq!(classify_category("", &rules()), "OTHER");
    }

    #[test]
    fn test_category_no_match_is_fallback() {
        assert_eq!(classify_category("NO_DESC_FOUND", &rules()), "OTHER");
        assert_eq!(classify_category("Vodafone core", &rules()), "OTHER");
    }

    #[test]
    fn test_category_first_configured_category_wins() {
        // "tele" belongs to Etisalat, "te" to WE: Etisalat is listed first.
        assert_eq!(classify_category("Telecom link", &rules()), "Etisalat");

        let reversed = ClassificationRules {
            categories: vec![
                CategoryRule::new("WE", &["te"]),
                CategoryRule::new("Etisalat", &["tele"]),
            ],
            ..Default::default()
        };
        assert_eq!(classify_category("Telecom link", &reversed), "WE");
    }

    #[test]
    fn test_category_uppercase_keywords_still_match() {
        let custom = ClassificationRules {
            categories: vec![CategoryRule::new("Orange", &["ORG"])],
            ..Default::default()
        };
        assert_eq!(classify_category("org-cairo", &custom), "Orange");
    }

    #[test]
    fn test_category_is_deterministic() {
        let r = rules();
        let first = classify_category("WE-Fixed/ALX", &r).to_string();
        for _ in 0..10 {
            assert_eq!(classify_category("WE-Fixed/ALX", &r), first);
        }
    }

    // ── classify_rate ─────────────────────────────────────────────────────────

    #[test]
    fn test_rate_prefixes() {
        assert_eq!(classify_rate("HundredGigE0/0/0/1"), LinkRate::HundredGig);
        assert_eq!(classify_rate("Hu0/1/0/3"), LinkRate::HundredGig);
        assert_eq!(classify_rate("TenGigE0/0/0/4"), LinkRate::TenGig);
        assert_eq!(classify_rate("BE10"), LinkRate::Unknown);
    }

    #[test]
    fn test_rate_is_case_sensitive() {
        assert_eq!(classify_rate("hundredGigE0/0/0/1"), LinkRate::Unknown);
        assert_eq!(classify_rate("TE0/0/0/1"), LinkRate::Unknown);
    }

    // ── classify_link_status ──────────────────────────────────────────────────

    #[test]
    fn test_link_status_both_up() {
        assert_eq!(classify_link_status("up", "up"), LinkState::Up);
    }

    #[test]
    fn test_link_status_anything_else_is_down() {
        assert_eq!(classify_link_status("up", "down"), LinkState::Down);
        assert_eq!(classify_link_status("admin-down", "down"), LinkState::Down);
        // Case-sensitive on purpose.
        assert_eq!(classify_link_status("Up", "up"), LinkState::Down);
        assert_eq!(classify_link_status("up", "UP"), LinkState::Down);
    }

    // ── classify_site ─────────────────────────────────────────────────────────

    #[test]
    fn test_site_known_prefix_in_first_segment() {
        let prefixes = rules().site_prefixes;
        assert_eq!(
            classify_site("To-RMD-04\\Core-LR-55", &prefixes),
            SiteCode::Known("RMD".to_string())
        );
    }

    #[test]
    fn test_site_ignores_text_after_backslash() {
        let prefixes = rules().site_prefixes;
        // "HQ" only appears after the backslash.
        assert_eq!(
            classify_site("SiteX\\HQ-LR-118", &prefixes),
            SiteCode::Unclassified("SiteX".to_string())
        );
    }

    #[test]
    fn test_site_first_prefix_wins() {
        let prefixes = vec!["CA5".to_string(), "HQ".to_string()];
        assert_eq!(
            classify_site("HQ-CA5 trunk LR-7", &prefixes),
            SiteCode::Known("CA5".to_string())
        );
    }

    #[test]
    fn test_site_without_backslash_uses_whole_description() {
        assert_eq!(
            classify_site("Remote-LR-9", &[]),
            SiteCode::Unclassified("Remote-LR-9".to_string())
        );
    }
}
