// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Rewrites the generated region of a profile document.
///
/// The region is delimited by two literal marker lines. Everything between
/// them (markers included) is replaced by the markers wrapped around a freshly
/// rendered section; content outside the markers is never touched. The cache
/// record is rewritten on every run whatever happens to the document.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::LazyLock
};

use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    card::{CardOptions, save_card},
    error::{self, Error},
    markdown::{MarkdownOptions, render_section},
    pipeline::{AggregationResult, load_result},
    settings::RenderMode,
    store::write_json,
    totals::{LanguageTotals, group_thousands}
};

/// Opening marker of the generated region.
pub const START_MARKER: &str = "<!-- LOC-STATS:START -->";
/// Closing marker of the generated region.
pub const END_MARKER: &str = "<!-- LOC-STATS:END -->";

static REGION: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}.*?{}",
        regex::escape(START_MARKER),
        regex::escape(END_MARKER)
    );
    Regex::new(&pattern).unwrap_or_else(|_| unreachable!("escaped markers form a valid pattern"))
});

/// Why a document was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The document does not exist.
    MissingDocument,
    /// The document lacks a start marker followed by an end marker.
    MissingMarkers
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDocument => write!(f, "document not found"),
            Self::MissingMarkers => write!(
                f,
                "markers not found, add {START_MARKER} and {END_MARKER} where the stats belong"
            )
        }
    }
}

/// Result of a document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The region was replaced. `changed` is `false` when the new contents
    /// equal the old ones and nothing was written.
    Rewritten {
        /// Whether the document bytes changed.
        changed: bool
    },
    /// The document was not modified.
    Aborted(AbortReason)
}

impl UpdateOutcome {
    /// Returns `true` when the region is up to date.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rewritten { .. })
    }
}

/// Replaces every marker-delimited region of `content` with `section`.
///
/// Returns `None` when no region exists.
///
/// # Examples
///
/// ```
/// use loc_stats::replace_region;
///
/// let doc = "intro\n<!-- LOC-STATS:START -->\nold\n<!-- LOC-STATS:END -->\noutro\n";
/// let updated = replace_region(doc, "new").expect("markers present");
/// assert_eq!(
///     updated,
///     "intro\n<!-- LOC-STATS:START -->\nnew\n<!-- LOC-STATS:END -->\noutro\n"
/// );
/// ```
pub fn replace_region(content: &str, section: &str) -> Option<String> {
    if !REGION.is_match(content) {
        return None;
    }
    let replacement = format!("{START_MARKER}\n{section}\n{END_MARKER}");
    Some(REGION.replace_all(content, NoExpand(&replacement)).into_owned())
}

/// Renders the section for `totals` and rewrites the region of `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the document exists but cannot be read or
/// written. Missing documents and missing markers are reported through
/// [`UpdateOutcome::Aborted`].
pub fn update_document(
    path: &Path,
    totals: &LanguageTotals,
    mode: RenderMode,
    options: &MarkdownOptions
) -> Result<UpdateOutcome, Error> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if source.kind() == ErrorKind::NotFound => {
            warn!("Document not found at {}", path.display());
            return Ok(UpdateOutcome::Aborted(AbortReason::MissingDocument));
        }
        Err(source) => return Err(error::io_error(path, source))
    };

    let rendered = render_section(totals, mode, options);
    let Some(updated) = replace_region(&content, &rendered) else {
        warn!("{} in {}", AbortReason::MissingMarkers, path.display());
        return Ok(UpdateOutcome::Aborted(AbortReason::MissingMarkers));
    };

    if updated == content {
        info!("No changes to {}", path.display());
        return Ok(UpdateOutcome::Rewritten {
            changed: false
        });
    }

    fs::write(path, updated).map_err(|source| error::io_error(path, source))?;
    info!("Document updated at {}", path.display());
    Ok(UpdateOutcome::Rewritten {
        changed: true
    })
}

/// Observational snapshot of the last update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Time of the update.
    pub last_update:     DateTime<Utc>,
    /// Totals at that time.
    pub languages:       LanguageTotals,
    /// Sum of `languages`.
    pub total_lines:     u64,
    /// Repositories synchronized by the run that produced the totals.
    pub repos_processed: usize
}

impl CacheRecord {
    /// Derives the record for `result` at `now`.
    pub fn new(result: &AggregationResult, now: DateTime<Utc>) -> Self {
        Self {
            last_update:     now,
            languages:       result.languages.clone(),
            total_lines:     result.languages.total(),
            repos_processed: result.processed_repos
        }
    }
}

/// Overwrites the cache file with a record derived from `result`.
///
/// # Errors
///
/// Returns [`Error`] when the file cannot be written.
pub fn update_cache(path: &Path, result: &AggregationResult) -> Result<CacheRecord, Error> {
    let record = CacheRecord::new(result, Utc::now());
    write_json(path, &record)?;
    info!(
        "Cache updated: {} total lines",
        group_thousands(record.total_lines)
    );
    Ok(record)
}

/// Inputs of a full publishing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Aggregation result to publish.
    pub results_file: PathBuf,
    /// Cache record to overwrite.
    pub cache_file:   PathBuf,
    /// Document holding the marker region.
    pub document:     PathBuf,
    /// Section variant.
    pub mode:         RenderMode,
    /// Section options.
    pub markdown:     MarkdownOptions,
    /// Card destination; `None` disables the card.
    pub card_output:  Option<PathBuf>,
    /// Card presentation.
    pub card:         CardOptions
}

/// What a publishing run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Record written to the cache file.
    pub cache:    CacheRecord,
    /// Outcome of the document update.
    pub document: UpdateOutcome,
    /// Card written, when requested.
    pub card:     Option<PathBuf>
}

/// Loads the aggregation result, then refreshes the cache, the document and
/// optionally the card.
///
/// The cache is written before the document is inspected, so it is refreshed
/// even when the document update aborts.
///
/// # Errors
///
/// Returns [`Error`] when the result cannot be loaded or any file write
/// fails.
pub fn publish(request: &PublishRequest) -> Result<PublishReport, Error> {
    info!("Loading results from {}", request.results_file.display());
    let result = load_result(&request.results_file)?;

    let cache = update_cache(&request.cache_file, &result)?;
    let document = update_document(
        &request.document,
        &result.languages,
        request.mode,
        &request.markdown
    )?;
    if let UpdateOutcome::Aborted(reason) = document {
        warn!("Document left unchanged: {}", reason);
    }

    let card = match &request.card_output {
        Some(path) => {
            let written = save_card(path, &result.languages, &request.card)?;
            info!("SVG card saved to {}", written.display());
            Some(written)
        }
        None => None
    };

    Ok(PublishReport {
        cache,
        document,
        card
    })
}
