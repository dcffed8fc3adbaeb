// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Per-language line-of-code statistics across a developer's repositories.
//!
//! The library lists the repositories owned by a GitHub account, keeps a
//! shallow local mirror of each one, delegates counting to an external
//! engine and persists the aggregated totals. The totals are then published
//! as shields.io badges, markdown sections embedded between two marker lines
//! of a profile document, and a standalone SVG card.
//!
//! Network, version control and the counting engine sit behind the
//! [`RepositorySource`], [`MirrorBackend`] and [`LineCounter`] traits so a
//! [`Pipeline`] can be exercised without touching any of them. Every path the
//! pipeline reads or writes comes from [`Settings`].

mod badge;
mod card;
mod engine;
mod error;
mod lister;
mod markdown;
mod mirror;
mod pipeline;
mod readme;
mod settings;
mod store;
mod totals;

pub use badge::{DEFAULT_COLOR, badge_url, format_number, language_color, top_badges};
pub use card::{CardOptions, card_height, render_card, save_card};
pub use engine::{LineCounter, ProcessEngine, count_languages, parse_engine_output};
pub use error::{Error, decode_error, io_error};
pub use lister::{
    GitHubSource, RepositoryRecord, RepositorySource, filter_page, list_repositories
};
pub use markdown::{
    MarkdownOptions, badge_line, compact_section, full_section, markdown_table, render_section
};
pub use mirror::{
    GitCli, MirrorBackend, SyncAction, SyncFailure, SyncOutcome, SyncReport, mirror_path, sync_all
};
pub use pipeline::{
    AggregationResult, Pipeline, PipelineLayout, load_repository_list, load_result,
    save_repository_list, save_result, summary_lines
};
pub use readme::{
    AbortReason, CacheRecord, END_MARKER, PublishReport, PublishRequest, START_MARKER,
    UpdateOutcome, publish, replace_region, update_cache, update_document
};
pub use settings::{
    BadgeStyle, EngineSettings, RenderMode, Settings, TimeoutSettings, load_settings,
    parse_settings
};
pub use store::{read_json, write_json};
pub use totals::{DEFAULT_TOP_N, LanguageTotals, RankedLanguage, group_thousands};
