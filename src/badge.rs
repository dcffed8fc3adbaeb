// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge URL generation.
//!
//! Badges are rendered by shields.io; this module only builds the static
//! badge URLs (`/badge/<label>-<message>-<color>?style=<style>`) with a
//! per-language color taken from a fixed table.

use crate::{settings::BadgeStyle, totals::LanguageTotals};

/// Color used for languages without an entry in the color table.
pub const DEFAULT_COLOR: &str = "555555";

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("Python", "3776AB"),
    ("JavaScript", "F7DF1E"),
    ("TypeScript", "3178C6"),
    ("Rust", "DEA584"),
    ("Go", "00ADD8"),
    ("Java", "B07219"),
    ("C", "A8B9CC"),
    ("C++", "F34B7D"),
    ("C#", "239120"),
    ("Ruby", "CC342D"),
    ("PHP", "777BB4"),
    ("Swift", "F05138"),
    ("Kotlin", "A97BFF"),
    ("Shell", "89E051"),
    ("HTML", "E34C26"),
    ("CSS", "563D7C"),
    ("Vue", "4FC08D"),
    ("Dart", "00B4AB")
];

/// Formats a line count with `K`/`M` suffixes.
///
/// # Examples
///
/// ```
/// use loc_stats::format_number;
///
/// assert_eq!(format_number(999), "999");
/// assert_eq!(format_number(1_000), "1.0K");
/// assert_eq!(format_number(1_500_000), "1.5M");
/// ```
pub fn format_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Returns the hex color (without `#`) associated with `language`.
pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map_or(DEFAULT_COLOR, |&(_, color)| color)
}

/// Builds the shields.io URL for a single language badge.
///
/// # Examples
///
/// ```
/// use loc_stats::{BadgeStyle, badge_url};
///
/// let url = badge_url("C++", 1_500, BadgeStyle::FlatSquare);
/// assert_eq!(
///     url,
///     "https://img.shields.io/badge/C%2B%2B-1.5K%20lines-F34B7D?style=flat-square"
/// );
/// ```
pub fn badge_url(language: &str, lines: u64, style: BadgeStyle) -> String {
    let label = badge_component(language);
    let message = badge_component(&format!("{} lines", format_number(lines)));
    let color = language_color(language);

    format!(
        "https://img.shields.io/badge/{label}-{message}-{color}?style={}",
        style.as_str()
    )
}

/// Encodes one dash-separated component of a static badge path.
///
/// `-` and `_` are separators in the path, so literal ones are doubled
/// before percent-encoding.
fn badge_component(text: &str) -> String {
    let escaped = text.replace('-', "--").replace('_', "__");
    urlencoding::encode(&escaped).into_owned()
}

/// Badge URLs for the `top_n` ranked languages, in rank order.
pub fn top_badges(totals: &LanguageTotals, top_n: usize, style: BadgeStyle) -> Vec<(String, String)> {
    totals
        .ranked(top_n)
        .into_iter()
        .map(|entry| {
            (
                entry.language.to_owned(),
                badge_url(entry.language, entry.lines, style)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_matches_suffix_rules() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1.0K");
        assert_eq!(format_number(15_234), "15.2K");
        assert_eq!(format_number(999_999), "1000.0K");
        assert_eq!(format_number(1_000_000), "1.0M");
        assert_eq!(format_number(1_500_000), "1.5M");
    }

    #[test]
    fn language_color_uses_table() {
        assert_eq!(language_color("Rust"), "DEA584");
        assert_eq!(language_color("C#"), "239120");
    }

    #[test]
    fn language_color_is_case_sensitive_and_defaults_to_gray() {
        assert_eq!(language_color("rust"), DEFAULT_COLOR);
        assert_eq!(language_color("Brainfuck"), DEFAULT_COLOR);
    }

    #[test]
    fn badge_url_encodes_label_and_message() {
        let url = badge_url("Python", 15_000, BadgeStyle::FlatSquare);
        assert_eq!(
            url,
            "https://img.shields.io/badge/Python-15.0K%20lines-3776AB?style=flat-square"
        );
    }

    #[test]
    fn badge_url_encodes_special_characters() {
        let url = badge_url("C#", 42, BadgeStyle::Flat);
        assert!(url.starts_with("https://img.shields.io/badge/C%23-42%20lines-239120"));
        assert!(url.ends_with("?style=flat"));
    }

    #[test]
    fn badge_url_doubles_path_separators() {
        let url = badge_url("Objective-C", 2_000, BadgeStyle::FlatSquare);
        assert!(url.starts_with("https://img.shields.io/badge/Objective--C-2.0K%20lines-555555"));

        let url = badge_url("Vim_Script", 3, BadgeStyle::FlatSquare);
        assert!(url.starts_with("https://img.shields.io/badge/Vim__Script-3%20lines-"));
    }

    #[test]
    fn badge_url_honours_style() {
        let url = badge_url("Go", 10, BadgeStyle::ForTheBadge);
        assert!(url.ends_with("?style=for-the-badge"));
    }

    #[test]
    fn top_badges_follow_ranking() {
        let totals = LanguageTotals::from_iter([
            ("Python", 15_000),
            ("JavaScript", 8_500),
            ("TypeScript", 6_200),
            ("Rust", 4_100)
        ]);

        let badges = top_badges(&totals, 2, BadgeStyle::FlatSquare);
        let names: Vec<&str> = badges.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Python", "JavaScript"]);
        assert!(badges[1].1.contains("8.5K%20lines"));
    }

    #[test]
    fn top_badges_of_empty_totals_is_empty() {
        assert!(top_badges(&LanguageTotals::new(), 8, BadgeStyle::Flat).is_empty());
    }
}
