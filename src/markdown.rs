// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Markdown fragments embedded into the profile document.
//!
//! All fragments are pure functions of the totals: the same input always
//! yields byte-identical output.

use std::fmt::Write as _;

use crate::{
    badge::badge_url,
    settings::{BadgeStyle, RenderMode},
    totals::{LanguageTotals, group_thousands}
};

/// Rendering options shared by the section builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Number of languages shown.
    pub top_n:         usize,
    /// Badge preset.
    pub style:         BadgeStyle,
    /// Whether the full section appends the detailed table.
    pub include_table: bool
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            top_n:         crate::totals::DEFAULT_TOP_N,
            style:         BadgeStyle::FlatSquare,
            include_table: true
        }
    }
}

/// Table of the top languages with counts and share of the full total.
///
/// # Examples
///
/// ```
/// use loc_stats::{LanguageTotals, markdown_table};
///
/// let totals = LanguageTotals::from_iter([("Python", 1000), ("Go", 9000)]);
/// let table = markdown_table(&totals, 2);
/// assert!(table.ends_with("| Go | 9,000 | 90.0% |\n| Python | 1,000 | 10.0% |"));
/// ```
pub fn markdown_table(totals: &LanguageTotals, top_n: usize) -> String {
    let mut table = String::from(
        "| Language | Lines of Code | Percentage |\n|----------|---------------|------------|"
    );

    for entry in totals.ranked(top_n) {
        let _ = write!(
            table,
            "\n| {} | {} | {:.1}% |",
            entry.language,
            group_thousands(entry.lines),
            totals.percentage(entry.lines)
        );
    }

    table
}

/// Space-separated badge images for the top languages.
pub fn badge_line(totals: &LanguageTotals, top_n: usize, style: BadgeStyle) -> String {
    totals
        .ranked(top_n)
        .into_iter()
        .map(|entry| {
            format!(
                "![{}]({})",
                entry.language,
                badge_url(entry.language, entry.lines, style)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full section: heading, total, badges and (optionally) the table.
pub fn full_section(totals: &LanguageTotals, options: &MarkdownOptions) -> String {
    let mut lines = vec![
        "## 📊 Coding Statistics".to_owned(),
        String::new(),
        format!(
            "**Total Lines of Code:** {}",
            group_thousands(totals.total())
        ),
        String::new(),
        "### Top Languages".to_owned(),
        String::new(),
        badge_line(totals, options.top_n, options.style)
    ];

    if options.include_table {
        lines.extend([
            String::new(),
            "### Detailed Breakdown".to_owned(),
            String::new(),
            markdown_table(totals, options.top_n)
        ]);
    }

    lines.join("\n")
}

/// Compact section: badges and a one-line total.
pub fn compact_section(totals: &LanguageTotals, options: &MarkdownOptions) -> String {
    [
        "### 💻 Lines of Code".to_owned(),
        String::new(),
        badge_line(totals, options.top_n, options.style),
        String::new(),
        format!(
            "*Total: {} lines across {} languages*",
            group_thousands(totals.total()),
            totals.len()
        )
    ]
    .join("\n")
}

/// Renders the section variant selected by `mode`.
pub fn render_section(
    totals: &LanguageTotals,
    mode: RenderMode,
    options: &MarkdownOptions
) -> String {
    match mode {
        RenderMode::Compact => compact_section(totals, options),
        RenderMode::Full => full_section(totals, options)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sample() -> LanguageTotals {
        LanguageTotals::from_iter([
            ("Python", 15_234),
            ("JavaScript", 8_521),
            ("TypeScript", 6_234),
            ("Rust", 4_123),
            ("Go", 2_341),
            ("HTML", 1_823),
            ("CSS", 1_234),
            ("Shell", 567),
            ("Java", 987),
            ("Ruby", 12)
        ])
    }

    #[test]
    fn table_orders_rows_and_uses_full_denominator() {
        let totals = LanguageTotals::from_iter([("Python", 1000), ("Go", 9000)]);
        let table = markdown_table(&totals, 2);
        assert_eq!(
            table,
            "| Language | Lines of Code | Percentage |\n\
             |----------|---------------|------------|\n\
             | Go | 9,000 | 90.0% |\n\
             | Python | 1,000 | 10.0% |"
        );
    }

    #[test]
    fn table_of_empty_totals_has_only_header() {
        let table = markdown_table(&LanguageTotals::new(), 8);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn table_percentages_of_subset_do_not_sum_to_hundred() {
        let totals = LanguageTotals::from_iter([("A", 50), ("B", 30), ("C", 20)]);
        let table = markdown_table(&totals, 2);
        assert!(table.contains("| A | 50 | 50.0% |"));
        assert!(table.contains("| B | 30 | 30.0% |"));
        assert!(!table.contains("| C |"));
    }

    #[test]
    fn badge_line_joins_images_with_spaces() {
        let totals = LanguageTotals::from_iter([("Rust", 2_000), ("Go", 1_000)]);
        let line = badge_line(&totals, 8, BadgeStyle::FlatSquare);
        let images: Vec<&str> = line.split(' ').collect();
        assert_eq!(images.len(), 2);
        assert!(images[0].starts_with("![Rust](https://img.shields.io/badge/Rust-2.0K"));
        assert!(images[1].starts_with("![Go]("));
    }

    #[test]
    fn compact_section_reports_total_and_language_count() {
        let section = compact_section(&sample(), &MarkdownOptions::default());
        assert!(section.starts_with("### 💻 Lines of Code\n\n![Python]"));
        assert!(section.ends_with("*Total: 41,076 lines across 10 languages*"));
        assert!(!section.contains("| Language |"));
        assert!(!section.contains("![Ruby]"));
    }

    #[test]
    fn full_section_contains_badges_and_table() {
        let section = full_section(&sample(), &MarkdownOptions::default());
        assert!(section.contains("**Total Lines of Code:** 41,076"));
        assert!(section.contains("### Top Languages"));
        assert!(section.contains("### Detailed Breakdown"));
        assert!(section.contains("| Python | 15,234 | 37.1% |"));
    }

    #[test]
    fn full_section_without_table() {
        let options = MarkdownOptions {
            include_table: false,
            ..MarkdownOptions::default()
        };
        let section = full_section(&sample(), &options);
        assert!(!section.contains("### Detailed Breakdown"));
        assert!(section.ends_with(')'));
    }

    #[test]
    fn section_dispatches_on_mode() {
        let totals = sample();
        let options = MarkdownOptions::default();
        assert_eq!(
            render_section(&totals, RenderMode::Compact, &options),
            compact_section(&totals, &options)
        );
        assert_eq!(
            render_section(&totals, RenderMode::Full, &options),
            full_section(&totals, &options)
        );
    }

    fn percentages(table: &str) -> Vec<f64> {
        table
            .lines()
            .skip(2)
            .filter_map(|row| row.trim_end_matches(" |").rsplit("| ").next())
            .filter_map(|cell| cell.trim_end_matches('%').parse().ok())
            .collect()
    }

    proptest! {
        #[test]
        fn rendering_is_deterministic_and_pure(
            entries in prop::collection::btree_map("[A-Za-z+#]{1,10}", 0u64..5_000_000, 0..20)
        ) {
            let totals = LanguageTotals::from_iter(entries);
            let snapshot = totals.clone();
            let options = MarkdownOptions::default();

            let first = full_section(&totals, &options);
            let second = full_section(&totals, &options);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(compact_section(&totals, &options), compact_section(&totals, &options));
            prop_assert_eq!(&totals, &snapshot);
        }

        #[test]
        fn full_table_percentages_are_bounded_and_sum_to_hundred(
            entries in prop::collection::btree_map("[A-Za-z]{1,10}", 1u64..5_000_000, 1..20)
        ) {
            let totals = LanguageTotals::from_iter(entries);
            let table = markdown_table(&totals, totals.len());
            let values = percentages(&table);

            prop_assert_eq!(values.len(), totals.len());
            for value in &values {
                prop_assert!((0.0..=100.0).contains(value));
            }
            let sum: f64 = values.iter().sum();
            prop_assert!((sum - 100.0).abs() <= 0.05 * values.len() as f64 + 1e-9);
        }
    }
}
