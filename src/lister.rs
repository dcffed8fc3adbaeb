// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Lists repositories owned by a GitHub user.
///
/// Pages through `/users/{user}/repos` until an empty page is returned,
/// keeping only repositories that are neither forks nor archived. Any failed
/// page stops pagination and the repositories gathered so far are returned.
use std::future::Future;

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Error;

/// Repository entry returned by the listing endpoint.
///
/// Only the fields below are required; any other field in the API payload is
/// ignored. Entries with missing fields or wrong types fail the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepositoryRecord
{
    /// Repository name, unique per owner.
    pub name:      String,
    /// HTTPS clone URL.
    pub clone_url: String,
    /// Whether the repository is a fork.
    pub fork:      bool,
    /// Whether the repository is archived.
    pub archived:  bool,
}

impl RepositoryRecord
{
    /// Returns `true` for repositories that contribute to the statistics.
    pub fn is_counted(&self,) -> bool
    {
        !self.fork && !self.archived
    }
}

impl std::fmt::Display for RepositoryRecord
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{}", self.name)
    }
}

/// Paginated source of repository records.
pub trait RepositorySource
{
    /// Account whose repositories are listed.
    fn owner(&self,) -> &str;

    /// Fetches a single page (1-based).
    fn fetch_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Vec<RepositoryRecord,>, Error,>,> + Send;
}

/// Query parameters accepted by `/users/{user}/repos`.
#[derive(Debug, Serialize,)]
struct ListParams
{
    page:      u32,
    per_page:  u8,
    #[serde(rename = "type")]
    kind:      &'static str,
    sort:      &'static str,
    direction: &'static str,
}

/// GitHub-backed [`RepositorySource`].
#[derive(Debug, Clone,)]
pub struct GitHubSource
{
    client:    Octocrab,
    username:  String,
    page_size: u8,
}

impl GitHubSource
{
    /// Builds a client for `username`, authenticated when `token` is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the HTTP client cannot be initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use loc_stats::{GitHubSource, list_repositories};
    ///
    /// # async fn example() -> Result<(), loc_stats::Error> {
    /// let token = std::env::var("GITHUB_TOKEN",).ok();
    /// let source = GitHubSource::new("octocat", token.as_deref(), 100,)?;
    /// let repos = list_repositories(&source,).await;
    /// println!("{} repositories", repos.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(username: &str, token: Option<&str,>, page_size: u8,) -> Result<Self, Error,>
    {
        let builder = Octocrab::builder();
        let client = match token {
            Some(token,) => builder.personal_token(token.to_owned(),).build().map_err(|e| {
                Error::service(format!("failed to initialize GitHub client: {e}"),)
            },)?,
            None => builder.build().map_err(|e| {
                Error::service(format!("failed to initialize GitHub client: {e}"),)
            },)?,
        };

        Ok(Self {
            client,
            username: username.to_owned(),
            page_size,
        },)
    }
}

impl RepositorySource for GitHubSource
{
    fn owner(&self,) -> &str
    {
        &self.username
    }

    async fn fetch_page(&self, page: u32,) -> Result<Vec<RepositoryRecord,>, Error,>
    {
        let params = ListParams {
            page,
            per_page: self.page_size,
            kind: "owner",
            sort: "updated",
            direction: "desc",
        };

        self.client
            .get(format!("/users/{}/repos", self.username), Some(&params,),)
            .await
            .map_err(|e| Error::service(format!("failed to list repositories: {e}"),),)
    }
}

/// Drops forks and archived repositories from a page.
pub fn filter_page(page: Vec<RepositoryRecord,>,) -> Vec<RepositoryRecord,>
{
    page.into_iter().filter(RepositoryRecord::is_counted,).collect()
}

/// Collects every counted repository exposed by `source`.
///
/// Pagination stops at the first empty page. A failed page ends pagination
/// early and the repositories accumulated so far are returned; the failure is
/// logged but never propagated.
pub async fn list_repositories<S,>(source: &S,) -> Vec<RepositoryRecord,>
where
    S: RepositorySource,
{
    let mut repositories = Vec::new();
    let mut page = 1u32;

    loop {
        let items = match source.fetch_page(page,).await {
            Ok(items,) => items,
            Err(error,) => {
                warn!("stopping pagination at page {}: {}", page, error);
                break;
            }
        };

        if items.is_empty() {
            debug!("page {} is empty, pagination finished", page);
            break;
        }

        let fetched = items.len();
        let counted = filter_page(items,);
        debug!("page {}: kept {} of {} repositories", page, counted.len(), fetched);
        repositories.extend(counted,);
        page += 1;
    }

    info!("Found {} repositories (excluding forks and archived)", repositories.len());
    repositories
}

#[cfg(test)]
mod tests
{
    use std::sync::Mutex;

    use super::*;

    fn record(name: &str, fork: bool, archived: bool,) -> RepositoryRecord
    {
        RepositoryRecord {
            name: name.to_owned(),
            clone_url: format!("https://github.com/octocat/{name}.git"),
            fork,
            archived,
        }
    }

    struct ScriptedSource
    {
        pages:    Vec<Result<Vec<RepositoryRecord,>, Error,>,>,
        requests: Mutex<Vec<u32,>,>,
    }

    impl ScriptedSource
    {
        fn new(pages: Vec<Result<Vec<RepositoryRecord,>, Error,>,>,) -> Self
        {
            Self {
                pages, requests: Mutex::new(Vec::new(),),
            }
        }
    }

    impl RepositorySource for ScriptedSource
    {
        fn owner(&self,) -> &str
        {
            "octocat"
        }

        async fn fetch_page(&self, page: u32,) -> Result<Vec<RepositoryRecord,>, Error,>
        {
            self.requests.lock().expect("requests lock",).push(page,);
            let index = (page - 1) as usize;
            match self.pages.get(index,) {
                Some(Ok(items,),) => Ok(items.clone(),),
                Some(Err(_,),) => Err(Error::service("HTTP 403",),),
                None => Ok(Vec::new(),),
            }
        }
    }

    #[tokio::test]
    async fn github_source_reports_its_owner()
    {
        let source = GitHubSource::new("octocat", None, 100,).expect("client builds",);
        assert_eq!(source.owner(), "octocat");
    }

    #[test]
    fn filter_page_keeps_only_regular_repositories()
    {
        let page = vec![
            record("forked", true, false,),
            record("archived", false, true,),
            record("both", true, true,),
            record("normal", false, false,),
        ];

        let kept = filter_page(page,);
        assert_eq!(kept, vec![record("normal", false, false)]);
    }

    #[tokio::test]
    async fn list_repositories_pages_until_empty()
    {
        let source = ScriptedSource::new(vec![
            Ok(vec![record("a", false, false,), record("b", true, false,)],),
            Ok(vec![record("c", false, false,)],),
            Ok(Vec::new(),),
        ],);

        let repos = list_repositories(&source,).await;
        let names: Vec<&str,> = repos.iter().map(|r| r.name.as_str(),).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(*source.requests.lock().expect("requests lock",), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_repositories_returns_partial_results_on_failure()
    {
        let source = ScriptedSource::new(vec![
            Ok(vec![record("first", false, false,)],),
            Err(Error::service("HTTP 403",),),
            Ok(vec![record("never", false, false,)],),
        ],);

        let repos = list_repositories(&source,).await;
        assert_eq!(repos, vec![record("first", false, false)]);
        assert_eq!(*source.requests.lock().expect("requests lock",), vec![1, 2]);
    }

    #[tokio::test]
    async fn list_repositories_handles_immediate_failure()
    {
        let source = ScriptedSource::new(vec![Err(Error::service("HTTP 500",),)],);
        assert!(list_repositories(&source,).await.is_empty());
    }

    #[test]
    fn record_ignores_unknown_fields()
    {
        let json = r#"{
            "name": "hello",
            "clone_url": "https://github.com/octocat/hello.git",
            "fork": false,
            "archived": false,
            "stargazers_count": 12
        }"#;
        let parsed: RepositoryRecord = serde_json::from_str(json,).expect("valid record",);
        assert_eq!(parsed.name, "hello");
    }

    #[test]
    fn record_rejects_wrong_types()
    {
        let json = r#"{"name": "x", "clone_url": "u", "fork": "no", "archived": false}"#;
        assert!(serde_json::from_str::<RepositoryRecord,>(json,).is_err());
    }

    #[test]
    fn list_params_serialize_owner_scope()
    {
        let params = ListParams {
            page: 2, per_page: 100, kind: "owner", sort: "updated", direction: "desc",
        };
        let value = serde_json::to_value(&params,).expect("serialize params",);
        assert_eq!(value["type"], "owner");
        assert_eq!(value["per_page"], 100);
        assert_eq!(value["sort"], "updated");
    }

    #[tokio::test]
    async fn github_source_builds_without_token()
    {
        let source = GitHubSource::new("octocat", None, 100,);
        assert!(source.is_ok());
    }
}
