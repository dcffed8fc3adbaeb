// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Language totals and the ranking rule shared by every renderer.
//!
//! Languages are ranked by descending line count; equal counts are ordered
//! alphabetically by language name so rendered output never depends on map
//! iteration order. Percentages always use the sum of the *full* mapping as
//! denominator, even when only the top entries are displayed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of languages shown by renderers when no override is provided.
pub const DEFAULT_TOP_N: usize = 8;

/// Mapping from language name to total line count.
///
/// Keys are case-sensitive and unique. The mapping serializes as a plain JSON
/// object, which is also the wire format produced by the counting engine.
///
/// # Examples
///
/// ```
/// use loc_stats::LanguageTotals;
///
/// let totals = LanguageTotals::from_iter([("Python", 1000,), ("Go", 9000,),],);
/// assert_eq!(totals.total(), 10_000);
/// assert_eq!(totals.ranked(1)[0].language, "Go");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTotals(BTreeMap<String, u64>);

/// Single ranked entry borrowed from a [`LanguageTotals`] mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedLanguage<'a> {
    /// Language name.
    pub language: &'a str,
    /// Total line count for the language.
    pub lines:    u64
}

impl LanguageTotals {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the line count for `language`.
    pub fn insert<L>(&mut self, language: L, lines: u64)
    where
        L: Into<String>
    {
        self.0.insert(language.into(), lines);
    }

    /// Returns the line count recorded for `language`.
    pub fn get(&self, language: &str) -> Option<u64> {
        self.0.get(language).copied()
    }

    /// Number of distinct languages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no language has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all line counts, saturating at [`u64::MAX`].
    pub fn total(&self) -> u64 {
        self.0.values().fold(0, |sum, lines| sum.saturating_add(*lines))
    }

    /// Sum of all line counts, or `None` when it does not fit in a `u64`.
    pub fn checked_total(&self) -> Option<u64> {
        self.0
            .values()
            .try_fold(0u64, |sum, lines| sum.checked_add(*lines))
    }

    /// Iterates over `(language, lines)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(language, lines)| (language.as_str(), *lines))
    }

    /// Returns the `top_n` languages ordered by descending line count.
    ///
    /// Ties are broken by ascending language name.
    pub fn ranked(&self, top_n: usize) -> Vec<RankedLanguage<'_>> {
        let mut ranked: Vec<RankedLanguage<'_>> = self
            .iter()
            .map(|(language, lines)| RankedLanguage {
                language,
                lines
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.lines
                .cmp(&a.lines)
                .then_with(|| a.language.cmp(b.language))
        });
        ranked.truncate(top_n);
        ranked
    }

    /// Share of the full total represented by `lines`, in percent.
    ///
    /// Returns `0.0` when the mapping is empty or sums to zero.
    pub fn percentage(&self, lines: u64) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        lines as f64 / total as f64 * 100.0
    }
}

impl<L> FromIterator<(L, u64)> for LanguageTotals
where
    L: Into<String>
{
    fn from_iter<I: IntoIterator<Item = (L, u64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(language, lines)| (language.into(), lines))
                .collect()
        )
    }
}

/// Formats an integer with `,` thousands separators (`12345` → `12,345`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
