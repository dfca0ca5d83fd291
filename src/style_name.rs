// src/style_name.rs
//! Canonical style names from scraped event headings.
//!
//! The portal titles each event page like `Results for Amateur Beginner
//! Two-Step/A1 (18+)`. Styles are stored under a cleaned-up name so that
//! headings which differ only in label noise land on the same style.
//!
//! Rules run in a fixed order; a later rule may expose text an earlier rule
//! left behind, so the order is part of the contract.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::sanitize::normalize_ws;

const HEADING_LABEL: &str = "Results for";

/// Synonyms and renames, applied top to bottom, each as replace-all.
///
/// The solo-proficiency sources carry the backslash the portal leaves in
/// front of the apostrophe. Both of them map to "Mixed Leads".
pub const SYNONYMS: &[(&str, &str)] = &[
    ("Mixed Pro - Leader Judged", "Mixed Leads"),
    (r"Leaders\' Solo Proficiency", "Mixed Leads"),
    ("Mixed Pro - Follower Judged", "Mixed Follows"),
    (r"Followers\' Solo Proficiency", "Mixed Leads"),
    ("Intermediate/Advanced", "Open"),
    ("Country Western", "Country"),
    ("Social Dances", "Social"),
    ("Beginner", "Newcomer"),
    ("Two-Step", "Two Step"),
];

fn age_division_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/A1\s*\(18\+\)").unwrap())
}

fn dropped_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(Amateur|Collegiate)\b").unwrap())
}

fn age_range_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(18-34\)").unwrap())
}

/// Raw `<h1>` text -> canonical style name. Never fails; unknown text passes
/// through cleaned but unmapped.
pub fn normalize(raw_heading: &str) -> String {
    let mut name = raw_heading.replace(HEADING_LABEL, "").trim().to_string();

    name = age_division_label().replace_all(&name, "").into_owned();

    for (from, to) in SYNONYMS {
        if name.contains(from) {
            name = name.replace(from, to);
        }
    }

    name = dropped_words().replace_all(&name, "").into_owned();
    name = age_range_suffix().replace_all(&name, "").into_owned();

    normalize_ws(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beginner_two_step() {
        assert_eq!(normalize("Results for Beginner Two-Step"), "Newcomer Two Step");
    }

    #[test]
    fn label_noise_is_removed() {
        assert_eq!(
            normalize("Results for Amateur Intermediate/Advanced Country Western Two-Step/A1 (18+)"),
            "Open Country Two Step"
        );
        assert_eq!(normalize("  Results for  Collegiate Social Dances (18-34) "), "Social");
    }

    #[test]
    fn every_synonym_maps_exactly() {
        for (from, to) in SYNONYMS {
            let out = normalize(&format!("Results for {from}"));
            assert_eq!(&out, to, "source {from:?}");
            assert!(!out.contains(from), "leftover {from:?} in {out:?}");
        }
    }

    #[test]
    fn follower_solo_maps_to_mixed_leads() {
        assert_eq!(normalize(r"Followers\' Solo Proficiency Swing"), "Mixed Leads Swing");
        assert_eq!(normalize("Mixed Pro - Follower Judged Swing"), "Mixed Follows Swing");
    }

    #[test]
    fn whole_words_only() {
        // "Amateurish" is not the word "Amateur"
        assert_eq!(normalize("Amateurish Waltz"), "Amateurish Waltz");
        assert_eq!(normalize("Amateur Waltz"), "Waltz");
    }

    #[test]
    fn other_sub_labels_are_kept() {
        assert_eq!(normalize("Results for Newcomer Waltz/B2 (18+)"), "Newcomer Waltz/B2 (18+)");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "Results for Beginner Two-Step",
            "Results for Amateur Mixed Pro - Leader Judged Hustle/A1 (18+)",
            r"Leaders\' Solo Proficiency Cha Cha (18-34)",
            "Results for Collegiate Intermediate/Advanced Social Dances",
            "plain text",
            "",
        ];
        for x in inputs {
            let once = normalize(x);
            assert_eq!(normalize(&once), once, "input {x:?}");
        }
    }

    #[test]
    fn empty_and_label_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("Results for"), "");
    }
}
