// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! End-to-end aggregation run.
//!
//! The stages run strictly in order: list, persist the list, synchronize,
//! count, persist the result. Each stage applies its own soft-failure policy,
//! so a run always ends with an [`AggregationResult`] unless the local file
//! system refuses a write.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    engine::{LineCounter, count_languages},
    error::Error,
    lister::{RepositoryRecord, RepositorySource, list_repositories},
    mirror::{MirrorBackend, sync_all},
    settings::{Settings, TimeoutSettings},
    store::{read_json, write_json},
    totals::{LanguageTotals, group_thousands}
};

/// Durable hand-off between the pipeline and the document updater.
///
/// # Examples
///
/// ```
/// use loc_stats::{AggregationResult, LanguageTotals};
///
/// let result = AggregationResult {
///     username:        "octocat".to_owned(),
///     total_repos:     3,
///     processed_repos: 2,
///     languages:       LanguageTotals::from_iter([("Rust", 120)])
/// };
/// let json = serde_json::to_value(&result).expect("serialize");
/// assert_eq!(json["languages"]["Rust"], 120);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Account whose repositories were aggregated.
    pub username:        String,
    /// Repositories returned by the lister.
    pub total_repos:     usize,
    /// Repositories synchronized successfully.
    pub processed_repos: usize,
    /// Totals reported by the line counter.
    pub languages:       LanguageTotals
}

/// Persists the repository list, replacing any previous snapshot.
///
/// # Errors
///
/// Returns [`Error`] when the file cannot be written.
pub fn save_repository_list(path: &Path, repositories: &[RepositoryRecord]) -> Result<(), Error> {
    write_json(path, repositories)?;
    info!(
        "Saved {} repositories to {}",
        repositories.len(),
        path.display()
    );
    Ok(())
}

/// Loads a repository list written by [`save_repository_list`].
///
/// # Errors
///
/// Returns [`Error`] when the file is missing or malformed.
pub fn load_repository_list(path: &Path) -> Result<Vec<RepositoryRecord>, Error> {
    read_json(path)
}

/// Persists an aggregation result.
///
/// # Errors
///
/// Returns [`Error`] when the file cannot be written.
pub fn save_result(path: &Path, result: &AggregationResult) -> Result<(), Error> {
    write_json(path, result)?;
    info!("Results saved to {}", path.display());
    Ok(())
}

/// Loads an aggregation result written by [`save_result`].
///
/// # Errors
///
/// Returns [`Error`] when the file is missing or malformed.
pub fn load_result(path: &Path) -> Result<AggregationResult, Error> {
    read_json(path)
}

/// Human readable ranking printed after a run, one line per language.
pub fn summary_lines(languages: &LanguageTotals, top_n: usize) -> Vec<String> {
    languages
        .ranked(top_n)
        .into_iter()
        .map(|entry| {
            format!(
                "  {}: {} lines",
                entry.language,
                group_thousands(entry.lines)
            )
        })
        .collect()
}

/// Files and limits used by a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    /// Directory holding the mirrors.
    pub mirror_root:       PathBuf,
    /// Persisted repository list.
    pub repositories_file: PathBuf,
    /// Persisted aggregation result.
    pub results_file:      PathBuf,
    /// Per-repository synchronization limits.
    pub timeouts:          TimeoutSettings,
    /// Languages listed in the closing summary.
    pub top_n:             usize
}

impl From<&Settings> for PipelineLayout {
    fn from(settings: &Settings) -> Self {
        Self {
            mirror_root:       settings.mirror_root.clone(),
            repositories_file: settings.repositories_file.clone(),
            results_file:      settings.results_file.clone(),
            timeouts:          settings.timeouts,
            top_n:             settings.top_n
        }
    }
}

/// Aggregation run over injected collaborators.
#[derive(Debug)]
pub struct Pipeline<S, B, C> {
    source:  S,
    backend: B,
    counter: C,
    layout:  PipelineLayout
}

impl<S, B, C> Pipeline<S, B, C>
where
    S: RepositorySource,
    B: MirrorBackend,
    C: LineCounter
{
    /// Assembles a pipeline.
    pub fn new(source: S, backend: B, counter: C, layout: PipelineLayout) -> Self {
        Self {
            source,
            backend,
            counter,
            layout
        }
    }

    /// Runs every stage for the source's owner and persists the result once.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] only when a local artifact cannot be written or the
    /// mirror root cannot be created. Listing, synchronization and counting
    /// failures degrade to partial or empty data instead.
    pub async fn run(&self) -> Result<AggregationResult, Error> {
        let username = self.source.owner();
        info!("Step 1: fetching repositories for {}", username);
        let repositories = list_repositories(&self.source).await;
        save_repository_list(&self.layout.repositories_file, &repositories)?;

        info!("Step 2: synchronizing mirrors");
        let report = sync_all(
            &self.backend,
            &self.layout.mirror_root,
            &repositories,
            self.layout.timeouts
        )
        .await?;

        info!("Step 3: counting lines of code");
        let languages = count_languages(&self.counter, &self.layout.mirror_root).await;

        info!("Step 4: saving results");
        let result = AggregationResult {
            username: username.to_owned(),
            total_repos: repositories.len(),
            processed_repos: report.success_count(),
            languages
        };
        save_result(&self.layout.results_file, &result)?;

        info!("Top {} languages by LOC:", self.layout.top_n);
        for line in summary_lines(&result.languages, self.layout.top_n) {
            info!("{}", line);
        }

        Ok(result)
    }
}
