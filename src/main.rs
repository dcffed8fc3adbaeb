// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the loc-stats binary.
//!
//! Each pipeline stage is available on its own (`fetch`, `sync`, `count`),
//! `aggregate` runs them end to end, `update` publishes a persisted result
//! into the profile document and `report` prints a single rendering.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use loc_stats::{
    AggregationResult, CardOptions, Error, GitCli, GitHubSource, MarkdownOptions,
    Pipeline, PipelineLayout, ProcessEngine, PublishRequest, RenderMode, Settings, UpdateOutcome,
    compact_section, count_languages, full_section, list_repositories, load_repository_list,
    load_result, load_settings, markdown_table, publish, render_card, save_repository_list,
    sync_all, top_badges,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Aggregates line-of-code statistics and publishes them.
#[derive(Debug, Parser,)]
#[command(name = "loc-stats", version, about = "Aggregate and publish line-of-code statistics")]
struct Cli
{
    /// Optional YAML document overriding paths, timeouts and rendering knobs.
    #[arg(long = "settings", value_name = "PATH", global = true)]
    settings: Option<PathBuf,>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
enum Command
{
    /// List owned repositories and persist the filtered list.
    Fetch(IdentityArgs,),
    /// Clone or refresh a mirror for every persisted repository.
    Sync,
    /// Run the counting engine over the mirror root and print its totals.
    Count,
    /// Run fetch, sync and count, then persist the aggregation result.
    Aggregate(IdentityArgs,),
    /// Refresh the cache, the profile document and the SVG card.
    Update(UpdateArgs,),
    /// Print a single rendering of the persisted result.
    Report(ReportArgs,),
}

#[derive(Debug, Args,)]
struct IdentityArgs
{
    /// GitHub account whose repositories are aggregated.
    #[arg(long = "username", env = "GITHUB_USERNAME", value_name = "LOGIN")]
    username: Option<String,>,

    /// Token raising the API rate limit.
    #[arg(long = "token", env = "GITHUB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: Option<String,>,
}

impl IdentityArgs
{
    fn username(&self,) -> Result<&str, Error,>
    {
        self.username
            .as_deref()
            .map(str::trim,)
            .filter(|value| !value.is_empty(),)
            .ok_or_else(|| Error::validation("GITHUB_USERNAME is required",),)
    }
}

#[derive(Debug, Args,)]
struct UpdateArgs
{
    /// Document holding the generated region.
    #[arg(long = "readme", env = "README_PATH", value_name = "PATH", default_value = "README.md")]
    readme: PathBuf,

    /// Section variant written into the document.
    #[arg(long = "mode", env = "SECTION_TYPE", value_enum, default_value_t = RenderMode::Compact)]
    mode: RenderMode,

    /// Whether the SVG card is written too.
    #[arg(
        long = "svg",
        env = "GENERATE_SVG",
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    svg: bool,

    /// Omit the detailed table from the full section.
    #[arg(long = "no-table", action = ArgAction::SetTrue)]
    no_table: bool,

    /// Account named in the SVG card.
    #[arg(long = "username", env = "GITHUB_USERNAME", value_name = "LOGIN")]
    username: Option<String,>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum ReportTarget
{
    /// One badge URL per line.
    Badges,
    /// Markdown table.
    Table,
    /// Compact markdown section.
    Compact,
    /// Full markdown section.
    Full,
    /// SVG card.
    Svg,
}

#[derive(Debug, Args,)]
struct ReportArgs
{
    /// Rendering to print.
    #[arg(long = "target", value_enum, default_value_t = ReportTarget::Compact)]
    target: ReportTarget,

    /// Number of languages shown; defaults to the settings value.
    #[arg(long = "top-n", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    top_n: Option<u16,>,
}

#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes the parsed command.
///
/// # Errors
///
/// Propagates configuration errors, local I/O failures and aborted document
/// updates.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let settings = load_settings(cli.settings.as_deref(),)?;

    match cli.command {
        Command::Fetch(identity,) => run_fetch(&settings, &identity,).await,
        Command::Sync => run_sync(&settings,).await,
        Command::Count => run_count(&settings,).await,
        Command::Aggregate(identity,) => run_aggregate(&settings, &identity,).await,
        Command::Update(args,) => run_update(&settings, &args,),
        Command::Report(args,) => run_report(&settings, &args,),
    }
}

async fn run_fetch(settings: &Settings, identity: &IdentityArgs,) -> Result<(), Error,>
{
    let username = identity.username()?;
    let source = GitHubSource::new(username, identity.token.as_deref(), settings.page_size,)?;
    let repositories = list_repositories(&source,).await;
    save_repository_list(&settings.repositories_file, &repositories,)
}

async fn run_sync(settings: &Settings,) -> Result<(), Error,>
{
    let repositories = load_repository_list(&settings.repositories_file,)?;
    let report = sync_all(
        &GitCli::new(settings.clone_depth,),
        &settings.mirror_root,
        &repositories,
        settings.timeouts,
    )
    .await?;

    if report.success_count() < report.attempted() {
        info!("Failed repositories:");
        for (name, failure,) in report.failures() {
            info!("  {}: {}", name, failure);
        }
    }
    Ok((),)
}

async fn run_count(settings: &Settings,) -> Result<(), Error,>
{
    let engine = ProcessEngine::new(&settings.engine,);
    let totals = count_languages(&engine, &settings.mirror_root,).await;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &totals,)?;
    writeln!(handle).map_err(|e| Error::service(format!("failed to write output: {e}"),),)
}

async fn run_aggregate(settings: &Settings, identity: &IdentityArgs,) -> Result<(), Error,>
{
    let username = identity.username()?;
    let source = GitHubSource::new(username, identity.token.as_deref(), settings.page_size,)?;
    let pipeline = Pipeline::new(
        source,
        GitCli::new(settings.clone_depth,),
        ProcessEngine::new(&settings.engine,),
        PipelineLayout::from(settings,),
    );

    let result = pipeline.run().await?;
    info!(
        "Processed {}/{} repositories, {} languages",
        result.processed_repos,
        result.total_repos,
        result.languages.len()
    );
    Ok((),)
}

fn publish_request(settings: &Settings, args: &UpdateArgs,) -> PublishRequest
{
    let username = args
        .username
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .unwrap_or("User",);

    PublishRequest {
        results_file: settings.results_file.clone(),
        cache_file:   settings.cache_file.clone(),
        document:     args.readme.clone(),
        mode:         args.mode,
        markdown:     MarkdownOptions {
            top_n:         settings.top_n,
            style:         settings.badge_style,
            include_table: !args.no_table,
        },
        card_output:  args.svg.then(|| settings.svg_output.clone(),),
        card:         CardOptions {
            top_n: settings.top_n,
            ..CardOptions::for_user(username,)
        },
    }
}

fn run_update(settings: &Settings, args: &UpdateArgs,) -> Result<(), Error,>
{
    let report = publish(&publish_request(settings, args,),)?;

    match report.document {
        UpdateOutcome::Rewritten {
            ..
        } => Ok((),),
        UpdateOutcome::Aborted(reason,) => Err(Error::validation(format!(
            "{} was not updated: {reason}",
            args.readme.display()
        ),),),
    }
}

fn run_report(settings: &Settings, args: &ReportArgs,) -> Result<(), Error,>
{
    let result = load_result(&settings.results_file,)?;
    let top_n = args.top_n.map_or(settings.top_n, usize::from,);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, args.target, &result, settings, top_n,)
}

fn write_report<W: Write,>(
    writer: &mut W,
    target: ReportTarget,
    result: &AggregationResult,
    settings: &Settings,
    top_n: usize,
) -> Result<(), Error,>
{
    let options = MarkdownOptions {
        top_n,
        style: settings.badge_style,
        include_table: true,
    };

    let rendered = match target {
        ReportTarget::Badges => top_badges(&result.languages, top_n, settings.badge_style,)
            .into_iter()
            .map(|(language, url,)| format!("{language}: {url}"),)
            .collect::<Vec<_,>>()
            .join("\n",),
        ReportTarget::Table => markdown_table(&result.languages, top_n,),
        ReportTarget::Compact => compact_section(&result.languages, &options,),
        ReportTarget::Full => full_section(&result.languages, &options,),
        ReportTarget::Svg => render_card(
            &result.languages,
            &CardOptions {
                top_n,
                ..CardOptions::for_user(&result.username,)
            },
        )
        .trim_end()
        .to_owned(),
    };

    writeln!(writer, "{rendered}")
        .map_err(|e| Error::service(format!("failed to write output: {e}"),),)
}
