//! Interface description lookup from `show int <iface> des` output.
//!
//! ```text
//! Interface          Status      Protocol    Description
//! --------------------------------------------------------------------------------
//! BV527              up          up          Etisalat-MKT/RMS
//! ```
//!
//! The row is located by the digits of the interface name, so `BV52` also
//! matches a row for `BV527`. Callers that issue one command per interface
//! only ever see their own row, which is why this has not been tightened.

use std::sync::OnceLock;

use flapscan_core::models::{Descriptor, LinkState};
use regex::Regex;

fn column_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("regex is valid"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{3,}").expect("regex is valid"))
}

/// Digits of an interface id, e.g. `"BVI527"` → `"527"`.
pub fn numeric_suffix(interface: &str) -> String {
    interface.chars().filter(char::is_ascii_digit).collect()
}

fn columns(line: &str) -> Vec<&str> {
    column_split_re()
        .split(line.trim())
        .map(str::trim)
        .collect()
}

fn description_or_sentinel(text: &str, status: LinkState) -> Descriptor {
    if text.is_empty() {
        Descriptor::new(flapscan_core::models::NO_DESC_FOUND, status)
    } else {
        Descriptor::new(text, status)
    }
}

/// Find the description and port status of `interface` in `output`.
///
/// Never fails: when nothing usable is present the `NO_DESC_FOUND` /
/// `UNKNOWN` sentinel is returned.
pub fn describe_interface(output: &str, interface: &str) -> Descriptor {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Descriptor::not_found();
    }

    let digits = numeric_suffix(interface);
    if !digits.is_empty() {
        for line in lines.iter().filter(|l| l.contains(digits.as_str())) {
            let parts = columns(line);
            if parts.len() >= 4 {
                let status = parts[1].to_lowercase();
                let protocol = parts[2].to_lowercase();
                let verdict = if status == "up" && protocol == "up" {
                    LinkState::Up
                } else {
                    LinkState::Down
                };
                return description_or_sentinel(parts[3], verdict);
            }
            if parts.len() >= 2 {
                return description_or_sentinel(parts[parts.len() - 1], LinkState::Unknown);
            }
        }
    }

    for line in lines.iter().rev() {
        if separator_re().is_match(line) {
            continue;
        }
        let parts = columns(line);
        if parts.len() >= 2 {
            return description_or_sentinel(parts[parts.len() - 1], LinkState::Unknown);
        }
    }

    Descriptor::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flapscan_core::models::NO_DESC_FOUND;

    const HEADER: &str = "Interface          Status      Protocol    Description\n--------------------------------------------------------------------------------\n";

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("BVI527"), "527");
        assert_eq!(numeric_suffix("Hu0/0/0/1"), "0001");
        assert_eq!(numeric_suffix("Loopback"), "");
    }

    #[test]
    fn test_full_row_both_up() {
        let out = format!("{HEADER}BV527              up          up          Etisalat-MKT/RMS\n");
        let d = describe_interface(&out, "BV527");
        assert_eq!(d.text, "Etisalat-MKT/RMS");
        assert_eq!(d.status, LinkState::Up);
        assert_eq!(d.status.label(), "Up");
    }

    #[test]
    fn test_full_row_mixed_case_up() {
        let d = describe_interface("BV527    UP    Up    Orange-HQ", "BV527");
        assert_eq!(d.status, LinkState::Up);
    }

    #[test]
    fn test_full_row_any_other_combination_is_down() {
        for (status, proto) in [("up", "down"), ("down", "up"), ("admin-down", "admin-down")] {
            let line = format!("BV527    {status}    {proto}    WE-ALX");
            let d = describe_interface(&line, "BV527");
            assert_eq!(d.status, LinkState::Down, "{status}/{proto}");
            assert_eq!(d.text, "WE-ALX");
        }
    }

    #[test]
    fn test_single_spaces_do_not_split_columns() {
        let d = describe_interface("BV527    up    up    Etisalat MKT to RMS", "BV527");
        assert_eq!(d.text, "Etisalat MKT to RMS");
    }

    #[test]
    fn test_two_or_three_columns_use_last_as_description() {
        let d = describe_interface("BV527    up    up", "BV527");
        assert_eq!(d.text, "up");
        assert_eq!(d.status, LinkState::Unknown);

        let d = describe_interface("BV527    Orange-HQ", "BV527");
        assert_eq!(d.text, "Orange-HQ");
        assert_eq!(d.status, LinkState::Unknown);
    }

    #[test]
    fn test_single_column_match_keeps_scanning() {
        let out = "BV527\nBV527    up    down    Orange-HQ";
        let d = describe_interface(out, "BV527");
        assert_eq!(d.text, "Orange-HQ");
        assert_eq!(d.status, LinkState::Down);
    }

    #[test]
    fn test_fallback_scans_from_bottom_skipping_separators() {
        let out = "Interface    Status    Description\nGi0/0    up    Uplink-A\n-------------------\n";
        let d = describe_interface(out, "BV527");
        assert_eq!(d.text, "Uplink-A");
        assert_eq!(d.status, LinkState::Unknown);
    }

    #[test]
    fn test_fallback_when_interface_has_no_digits() {
        let out = "Loopback    up    up    Mgmt";
        let d = describe_interface(out, "Loopback");
        assert_eq!(d.text, "Mgmt");
        assert_eq!(d.status, LinkState::Unknown);
    }

    #[test]
    fn test_nothing_usable_returns_sentinel() {
        assert_eq!(describe_interface("", "BV527"), Descriptor::not_found());
        assert_eq!(describe_interface("   \n\n", "BV527"), Descriptor::not_found());
        let d = describe_interface("------\nsingle\n", "BV527");
        assert_eq!(d.text, NO_DESC_FOUND);
        assert_eq!(d.status, LinkState::Unknown);
    }

    #[test]
    fn test_digit_collision_takes_first_matching_row() {
        // Known ambiguity: "52" is contained in "BV527".
        let out = "BV527    up    up    Etisalat-MKT\nBV52    down    down    Orange-HQ";
        let d = describe_interface(out, "BV52");
        assert_eq!(d.text, "Etisalat-MKT");
    }
}
