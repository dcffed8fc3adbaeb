// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Settings document describing the pipeline's working layout.
//!
//! Every field is optional in YAML and falls back to a layout relative to the
//! working directory (`repos/`, `repos.json`, `loc_results.json`, ...).
//! Paths are threaded explicitly into each component so several pipelines
//! can run side by side against distinct roots.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    totals::DEFAULT_TOP_N
};

/// Working layout and tuning knobs for the aggregation pipeline.
///
/// # Examples
///
/// ```
/// use loc_stats::parse_settings;
///
/// let yaml = r#"
/// mirror_root: /var/lib/loc/repos
/// top_n: 5
/// timeouts:
///   clone_secs: 300
/// "#;
/// let settings = parse_settings(yaml,).expect("valid settings",);
/// assert_eq!(settings.top_n, 5);
/// assert_eq!(settings.timeouts.refresh_secs, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding one mirror per repository.
    pub mirror_root:       PathBuf,
    /// Persisted repository list written by the lister.
    pub repositories_file: PathBuf,
    /// Aggregation result handed over to the document updater.
    pub results_file:      PathBuf,
    /// Observational cache record rewritten by the document updater.
    pub cache_file:        PathBuf,
    /// Destination of the standalone SVG card.
    pub svg_output:        PathBuf,
    /// External counting engine location and build recipe.
    pub engine:            EngineSettings,
    /// Per-repository synchronization limits.
    pub timeouts:          TimeoutSettings,
    /// Depth passed to `git clone --depth`.
    #[serde(deserialize_with = "deserialize_positive_u32")]
    pub clone_depth:       u32,
    /// Page size requested from the repository listing endpoint.
    #[serde(deserialize_with = "deserialize_page_size")]
    pub page_size:         u8,
    /// Number of languages shown by renderers.
    #[serde(deserialize_with = "deserialize_top_n")]
    pub top_n:             usize,
    /// Visual preset requested from shields.io.
    pub badge_style:       BadgeStyle
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mirror_root:       PathBuf::from("repos"),
            repositories_file: PathBuf::from("repos.json"),
            results_file:      PathBuf::from("loc_results.json"),
            cache_file:        PathBuf::from("cache.json"),
            svg_output:        PathBuf::from("loc_stats.svg"),
            engine:            EngineSettings::default(),
            timeouts:          TimeoutSettings::default(),
            clone_depth:       1,
            page_size:         100,
            top_n:             DEFAULT_TOP_N,
            badge_style:       BadgeStyle::FlatSquare
        }
    }
}

/// Location of the external line-counting engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Working directory of the engine; also where it is built.
    pub directory:     PathBuf,
    /// Engine executable, relative to `directory` unless absolute.
    pub binary:        PathBuf,
    /// Command run inside `directory` when the binary is missing. An empty
    /// list disables the build step.
    pub build_command: Vec<String>
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            directory:     PathBuf::from("engine"),
            binary:        PathBuf::from("target/release/loc_runner"),
            build_command: vec!["cargo".to_owned(), "build".to_owned(), "--release".to_owned()]
        }
    }
}

impl EngineSettings {
    /// Resolves the executable path against the engine directory.
    pub fn binary_path(&self) -> PathBuf {
        if self.binary.is_absolute() {
            self.binary.clone()
        } else {
            self.directory.join(&self.binary)
        }
    }
}

/// Per-repository synchronization limits, in seconds.
///
/// Clones move the whole (shallow) history and get the longer budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutSettings {
    /// Budget for the initial shallow clone.
    #[serde(deserialize_with = "deserialize_positive_u64")]
    pub clone_secs:   u64,
    /// Budget for refreshing an existing mirror.
    #[serde(deserialize_with = "deserialize_positive_u64")]
    pub refresh_secs: u64
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            clone_secs:   120,
            refresh_secs: 60
        }
    }
}

impl TimeoutSettings {
    /// Clone budget as a [`Duration`].
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_secs)
    }

    /// Refresh budget as a [`Duration`].
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

/// Badge presets supported by shields.io.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeStyle {
    /// Flat badge with rounded corners.
    Flat,
    /// Flat badge with square corners.
    FlatSquare,
    /// Glossy badge.
    Plastic,
    /// Large uppercase badge.
    ForTheBadge,
    /// Social-network styled badge.
    Social
}

impl BadgeStyle {
    /// Value of the `style` query parameter understood by shields.io.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::FlatSquare => "flat-square",
            Self::Plastic => "plastic",
            Self::ForTheBadge => "for-the-badge",
            Self::Social => "social"
        }
    }
}

/// Section variant written into the target document.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Total plus badges.
    #[default]
    Compact,
    /// Total, badges and the detailed table.
    Full
}

/// Parses a settings document from YAML.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the document is malformed, contains unknown
/// keys, or carries out-of-range values.
pub fn parse_settings(yaml: &str) -> Result<Settings, Error> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Loads settings from `path`, or returns defaults when no path is given.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when it cannot be decoded.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, Error> {
    match path {
        Some(path) => {
            let contents =
                fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
            parse_settings(&contents)
        }
        None => Ok(Settings::default())
    }
}

fn deserialize_top_n<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value = usize::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("top_n must be at least 1"));
    }
    Ok(value)
}

fn deserialize_page_size<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value = u8::deserialize(deserializer)?;
    if value == 0 || value > 100 {
        return Err(serde::de::Error::custom("page_size must be between 1 and 100"));
    }
    Ok(value)
}

fn deserialize_positive_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value = u32::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("value must be at least 1"));
    }
    Ok(value)
}

fn deserialize_positive_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value = u64::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("timeouts must be greater than zero"));
    }
    Ok(value)
}
