// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Local mirror synchronization.
///
/// Each listed repository gets a shallow working copy under the mirror root:
/// cloned on first sight, pulled afterwards. Every repository is handled in
/// isolation; a failing or timed-out command marks that repository failed and
/// the batch moves on.
use std::{
    ffi::OsStr,
    future::Future,
    path::{Component, Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::{process::Command, time};
use tracing::{debug, info, warn};

use crate::{
    error::{self, Error},
    lister::RepositoryRecord,
    settings::TimeoutSettings,
};

/// Version-control operations needed to keep a mirror fresh.
pub trait MirrorBackend
{
    /// Creates a depth-limited clone of `url` at `destination`.
    fn clone_shallow(
        &self,
        url: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<(), Error,>,> + Send;

    /// Fast-forwards an existing mirror in place.
    fn refresh(&self, mirror: &Path,) -> impl Future<Output = Result<(), Error,>,> + Send;
}

/// [`MirrorBackend`] driving the `git` command-line client.
#[derive(Debug, Clone,)]
pub struct GitCli
{
    program: PathBuf,
    depth:   u32,
}

impl GitCli
{
    /// Uses the `git` found on `PATH` with the given clone depth.
    pub fn new(depth: u32,) -> Self
    {
        Self::with_program("git", depth,)
    }

    /// Uses an explicit git executable.
    pub fn with_program<P: Into<PathBuf,>,>(program: P, depth: u32,) -> Self
    {
        Self {
            program: program.into(), depth,
        }
    }

    async fn run_git<I, S,>(&self, args: I, display: &str,) -> Result<(), Error,>
    where
        I: IntoIterator<Item = S,>,
        S: AsRef<OsStr,>,
    {
        let output = Command::new(&self.program,)
            .args(args,)
            .env("GIT_TERMINAL_PROMPT", "0",)
            .kill_on_drop(true,)
            .output()
            .await
            .map_err(|e| Error::service(format!("git command failed: {e}"),),)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr,);
            return Err(Error::service(format!("git {display} failed: {}", stderr.trim()),),);
        }

        Ok((),)
    }
}

impl MirrorBackend for GitCli
{
    async fn clone_shallow(&self, url: &str, destination: &Path,) -> Result<(), Error,>
    {
        let depth = self.depth.to_string();
        self.run_git(
            [
                OsStr::new("clone",),
                OsStr::new("--depth",),
                OsStr::new(&depth,),
                OsStr::new(url,),
                destination.as_os_str(),
            ],
            "clone",
        )
        .await
    }

    async fn refresh(&self, mirror: &Path,) -> Result<(), Error,>
    {
        self.run_git([OsStr::new("-C",), mirror.as_os_str(), OsStr::new("pull",)], "pull",)
            .await
    }
}

/// Operation performed for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction
{
    /// A new shallow clone was created.
    Cloned,
    /// An existing mirror was pulled.
    Refreshed,
}

/// Reason a repository could not be synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SyncFailure
{
    /// The repository name cannot be mapped to a directory under the root.
    InvalidName(String,),
    /// The VCS command failed.
    Command(String,),
    /// The VCS command exceeded its time budget and was abandoned.
    TimedOut(u64,),
}

impl std::fmt::Display for SyncFailure
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        match self {
            Self::InvalidName(name,) => write!(f, "invalid repository name {name:?}"),
            Self::Command(message,) => write!(f, "{message}"),
            Self::TimedOut(secs,) => write!(f, "timed out after {secs}s"),
        }
    }
}

/// Per-repository synchronization result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct SyncOutcome
{
    /// Repository name.
    pub name:   String,
    /// Performed action or failure reason.
    pub result: Result<SyncAction, SyncFailure,>,
}

impl SyncOutcome
{
    /// Returns `true` when the mirror is fresh.
    pub fn is_success(&self,) -> bool
    {
        self.result.is_ok()
    }
}

/// Batch report collected by [`sync_all`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct SyncReport
{
    /// One entry per input repository.
    pub outcomes: Vec<SyncOutcome,>,
}

impl SyncReport
{
    /// Number of repositories attempted.
    pub fn attempted(&self,) -> usize
    {
        self.outcomes.len()
    }

    /// Names of repositories that were synchronized successfully.
    pub fn succeeded(&self,) -> Vec<&str,>
    {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_success(),)
            .map(|outcome| outcome.name.as_str(),)
            .collect()
    }

    /// Number of successful repositories.
    pub fn success_count(&self,) -> usize
    {
        self.outcomes.iter().filter(|outcome| outcome.is_success(),).count()
    }

    /// Failed repositories with their reasons.
    pub fn failures(&self,) -> impl Iterator<Item = (&str, &SyncFailure,),>
    {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_,) => None,
            Err(failure,) => Some((outcome.name.as_str(), failure,),),
        },)
    }
}

/// Derives the mirror directory for `name`.
///
/// Names must be a single normal path component; anything else (separators,
/// `..`, empty strings) is rejected so mirrors can never escape the root.
pub fn mirror_path(root: &Path, name: &str,) -> Option<PathBuf,>
{
    let mut components = Path::new(name,).components();
    match (components.next(), components.next(),) {
        (Some(Component::Normal(_,),), None,) => Some(root.join(name,),),
        _ => None,
    }
}

/// Synchronizes every repository into `root`.
///
/// Missing mirrors are cloned within `timeouts.clone_secs`, existing ones are
/// refreshed within `timeouts.refresh_secs`. Failures are recorded in the
/// returned report and never stop the batch.
///
/// # Errors
///
/// Returns [`Error::Io`] only when the mirror root itself cannot be created.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use loc_stats::{GitCli, TimeoutSettings, sync_all};
///
/// # async fn example(repos: Vec<loc_stats::RepositoryRecord>) -> Result<(), loc_stats::Error> {
/// let report = sync_all(&GitCli::new(1,), Path::new("repos",), &repos, TimeoutSettings::default(),)
///     .await?;
/// println!("{}/{} synchronized", report.success_count(), report.attempted());
/// # Ok(())
/// # }
/// ```
pub async fn sync_all<B,>(
    backend: &B,
    root: &Path,
    repositories: &[RepositoryRecord],
    timeouts: TimeoutSettings,
) -> Result<SyncReport, Error,>
where
    B: MirrorBackend,
{
    tokio::fs::create_dir_all(root,).await.map_err(|source| error::io_error(root, source,),)?;

    let pb = ProgressBar::new(repositories.len() as u64,);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.yellow} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_bar(),),
    );

    let mut report = SyncReport {
        outcomes: Vec::with_capacity(repositories.len(),),
    };

    for repository in repositories {
        pb.set_message(repository.name.clone(),);
        let result = sync_one(backend, root, repository, timeouts,).await;

        match &result {
            Ok(action,) => debug!("{}: {:?}", repository.name, action),
            Err(failure,) => warn!("failed to sync {}: {}", repository.name, failure),
        }

        report.outcomes.push(SyncOutcome {
            name: repository.name.clone(),
            result,
        },);
        pb.inc(1,);
    }

    pb.finish_with_message(format!(
        "synchronized {}/{} repositories",
        report.success_count(),
        report.attempted()
    ),);
    info!(
        "Successfully processed {}/{} repositories",
        report.success_count(),
        report.attempted()
    );

    Ok(report,)
}

async fn sync_one<B,>(
    backend: &B,
    root: &Path,
    repository: &RepositoryRecord,
    timeouts: TimeoutSettings,
) -> Result<SyncAction, SyncFailure,>
where
    B: MirrorBackend,
{
    let path = mirror_path(root, &repository.name,)
        .ok_or_else(|| SyncFailure::InvalidName(repository.name.clone(),),)?;

    if tokio::fs::try_exists(&path,).await.unwrap_or(false,) {
        debug!("Updating {}", repository.name);
        bounded(timeouts.refresh_timeout(), backend.refresh(&path,),).await?;
        Ok(SyncAction::Refreshed,)
    } else {
        debug!("Cloning {}", repository.name);
        bounded(timeouts.clone_timeout(), backend.clone_shallow(&repository.clone_url, &path,),)
            .await?;
        Ok(SyncAction::Cloned,)
    }
}

async fn bounded<F,>(limit: Duration, operation: F,) -> Result<(), SyncFailure,>
where
    F: Future<Output = Result<(), Error,>,>,
{
    match time::timeout(limit, operation,).await {
        Ok(Ok(()),) => Ok((),),
        Ok(Err(error,),) => Err(SyncFailure::Command(error.to_string(),),),
        Err(_,) => Err(SyncFailure::TimedOut(limit.as_secs(),),),
    }
}
