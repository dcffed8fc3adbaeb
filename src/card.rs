// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Standalone SVG card summarizing the language totals.
//!
//! The card has a header block with the grand total, one stacked bar of
//! language shares and a row per shown language. Its height grows with the
//! number of rows; everything else has fixed geometry.

use std::{
    borrow::Cow,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf}
};

use crate::{
    badge::{format_number, language_color},
    error::{self, Error},
    totals::{DEFAULT_TOP_N, LanguageTotals, RankedLanguage, group_thousands}
};

const HEADER_HEIGHT: u32 = 80;
const BAR_HEIGHT: u32 = 30;
const ROW_HEIGHT: u32 = 25;
const LIST_PADDING: u32 = 20;
const CARD_PADDING: u32 = 20;
const HORIZONTAL_MARGIN: u32 = 40;

/// Presentation options of the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOptions {
    /// Account named in the accessible description.
    pub username: String,
    /// Header text.
    pub title:    String,
    /// Card width in pixels.
    pub width:    u32,
    /// Number of languages shown.
    pub top_n:    usize
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            username: "User".to_owned(),
            title:    "Code Statistics".to_owned(),
            width:    495,
            top_n:    DEFAULT_TOP_N
        }
    }
}

impl CardOptions {
    /// Default options for `username`.
    pub fn for_user(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            ..Self::default()
        }
    }
}

/// Card height for `rows` shown languages.
pub fn card_height(rows: usize) -> u32 {
    let rows = u32::try_from(rows).unwrap_or(u32::MAX / ROW_HEIGHT);
    HEADER_HEIGHT + BAR_HEIGHT + rows.saturating_mul(ROW_HEIGHT) + LIST_PADDING + CARD_PADDING
}

/// Renders the card markup.
///
/// # Examples
///
/// ```
/// use loc_stats::{CardOptions, LanguageTotals, render_card};
///
/// let totals = LanguageTotals::from_iter([("Rust", 4_000), ("Go", 1_000)]);
/// let svg = render_card(&totals, &CardOptions::for_user("octocat"));
/// assert!(svg.starts_with("<svg width=\"495\" height=\"200\""));
/// assert!(svg.contains("Lines of code statistics for octocat"));
/// ```
pub fn render_card(totals: &LanguageTotals, options: &CardOptions) -> String {
    let ranked = totals.ranked(options.top_n);
    let total = totals.total();
    let width = options.width;
    let height = card_height(ranked.len());
    let title = escape_xml(&options.title);
    let username = escape_xml(&options.username);

    let mut svg = String::with_capacity(2048);
    let _ = writeln!(
        svg,
        "<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-labelledby=\"descId\">"
    );
    let _ = writeln!(svg, "  <title id=\"titleId\">{title}</title>");
    let _ = writeln!(
        svg,
        "  <desc id=\"descId\">Lines of code statistics for {username}</desc>"
    );
    svg.push_str(STYLE);
    let _ = writeln!(
        svg,
        "  <rect width=\"{width}\" height=\"{height}\" fill=\"#fffefe\" rx=\"4.5\" stroke=\"#e4e2e2\" stroke-width=\"1\"/>"
    );

    svg.push_str("  <g transform=\"translate(20, 25)\">\n");
    let _ = writeln!(svg, "    <text x=\"0\" y=\"0\" class=\"header\">{title}</text>");

    svg.push_str("    <g transform=\"translate(0, 30)\">\n");
    svg.push_str("      <text x=\"0\" y=\"0\" class=\"stat-label\">Total Lines of Code</text>\n");
    let _ = writeln!(
        svg,
        "      <text x=\"0\" y=\"20\" class=\"stat-value\">{}</text>",
        group_thousands(total)
    );
    svg.push_str("    </g>\n");

    svg.push_str("    <g transform=\"translate(0, 70)\">\n");
    svg.push_str("      <text x=\"0\" y=\"0\" class=\"stat-label\">Language Distribution</text>\n");
    svg.push_str("      <g transform=\"translate(0, 15)\">\n");
    write_bar(
        &mut svg,
        &ranked,
        total,
        width.saturating_sub(HORIZONTAL_MARGIN)
    );
    svg.push_str("      </g>\n");
    svg.push_str("    </g>\n");

    svg.push_str("    <g transform=\"translate(0, 110)\">\n");
    write_rows(&mut svg, &ranked, totals);
    svg.push_str("    </g>\n");

    svg.push_str("  </g>\n");
    svg.push_str("</svg>\n");
    svg
}

/// Renders the card and writes it to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::Io`] when the directory or file cannot be written.
pub fn save_card(
    path: &Path,
    totals: &LanguageTotals,
    options: &CardOptions
) -> Result<PathBuf, Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| error::io_error(parent, source))?;
    }
    fs::write(path, render_card(totals, options))
        .map_err(|source| error::io_error(path, source))?;
    Ok(path.to_path_buf())
}

const STYLE: &str = "  <style>
    .header { font: 600 18px 'Segoe UI', Ubuntu, Sans-Serif; fill: #2f80ed }
    .stat-value { font: 600 20px 'Segoe UI', Ubuntu, Sans-Serif; fill: #333 }
    .stat-label { font: 400 12px 'Segoe UI', Ubuntu, Sans-Serif; fill: #666 }
    .lang-name { font: 400 12px 'Segoe UI', Ubuntu, Sans-Serif; fill: #333 }
    .lang-percent { font: 400 11px 'Segoe UI', Ubuntu, Sans-Serif; fill: #666 }
    .lang-lines { font: 400 11px 'Segoe UI', Ubuntu, monospace; fill: #666 }
  </style>
";

// Segments narrower than one unit are dropped and do not advance the offset.
fn write_bar(svg: &mut String, ranked: &[RankedLanguage<'_>], total: u64, bar_width: u32) {
    if total == 0 {
        return;
    }

    let mut offset = 0.0_f64;
    for entry in ranked {
        let segment = entry.lines as f64 / total as f64 * f64::from(bar_width);
        if segment < 1.0 {
            continue;
        }
        let _ = writeln!(
            svg,
            "        <rect x=\"{offset:.2}\" y=\"0\" width=\"{segment:.2}\" height=\"8\" fill=\"#{}\" rx=\"2\"/>",
            language_color(entry.language)
        );
        offset += segment;
    }
}

fn write_rows(svg: &mut String, ranked: &[RankedLanguage<'_>], totals: &LanguageTotals) {
    let mut y = 0_u32;
    for entry in ranked {
        let _ = writeln!(svg, "      <g transform=\"translate(0, {y})\">");
        let _ = writeln!(
            svg,
            "        <circle cx=\"5\" cy=\"6\" r=\"5\" fill=\"#{}\"/>",
            language_color(entry.language)
        );
        let _ = writeln!(
            svg,
            "        <text x=\"15\" y=\"10\" class=\"lang-name\">{}</text>",
            escape_xml(entry.language)
        );
        let _ = writeln!(
            svg,
            "        <text x=\"280\" y=\"10\" class=\"lang-percent\" text-anchor=\"end\">{:.1}%</text>",
            totals.percentage(entry.lines)
        );
        let _ = writeln!(
            svg,
            "        <text x=\"440\" y=\"10\" class=\"lang-lines\" text-anchor=\"end\">{} lines</text>",
            format_number(entry.lines)
        );
        svg.push_str("      </g>\n");
        y += ROW_HEIGHT;
    }
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
