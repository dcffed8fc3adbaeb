// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Adapter for the external line-counting engine.
///
/// The engine is a separate executable invoked as `<binary> <mirror-root>`
/// that prints one JSON object mapping language names to line counts. The
/// adapter builds the executable on demand, runs it from its own directory
/// and validates the output.
use std::{
    future::Future,
    path::{Path, PathBuf},
};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{error::Error, settings::EngineSettings, totals::LanguageTotals};

/// Source of language totals for a directory of mirrors.
pub trait LineCounter
{
    /// Counts lines below `mirror_root`.
    fn count(
        &self,
        mirror_root: &Path,
    ) -> impl Future<Output = Result<LanguageTotals, Error,>,> + Send;
}

/// [`LineCounter`] backed by the engine subprocess.
#[derive(Debug, Clone,)]
pub struct ProcessEngine
{
    directory:     PathBuf,
    binary:        PathBuf,
    build_command: Vec<String,>,
}

impl ProcessEngine
{
    /// Creates an adapter from engine settings.
    pub fn new(settings: &EngineSettings,) -> Self
    {
        Self {
            directory:     settings.directory.clone(),
            binary:        settings.binary_path(),
            build_command: settings.build_command.clone(),
        }
    }

    /// Builds the engine when its executable is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the executable is absent and no build command
    /// is configured, when the build fails, or when the build does not
    /// produce the executable.
    pub async fn ensure_binary(&self,) -> Result<(), Error,>
    {
        if tokio::fs::try_exists(&self.binary,).await.unwrap_or(false,) {
            return Ok((),);
        }

        let Some((program, args,),) = self.build_command.split_first() else {
            return Err(Error::validation(format!(
                "engine binary {} is missing and no build command is configured",
                self.binary.display()
            ),),);
        };

        info!("Building line counter in {}", self.directory.display());
        let output = Command::new(program,)
            .args(args,)
            .current_dir(&self.directory,)
            .kill_on_drop(true,)
            .output()
            .await
            .map_err(|e| Error::service(format!("failed to start engine build: {e}"),),)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr,);
            return Err(Error::service(format!("engine build failed: {}", stderr.trim()),),);
        }

        if !tokio::fs::try_exists(&self.binary,).await.unwrap_or(false,) {
            return Err(Error::service(format!(
                "engine build succeeded but {} is still missing",
                self.binary.display()
            ),),);
        }
        Ok((),)
    }
}

impl LineCounter for ProcessEngine
{
    async fn count(&self, mirror_root: &Path,) -> Result<LanguageTotals, Error,>
    {
        self.ensure_binary().await?;

        let root = std::path::absolute(mirror_root,).map_err(|e| {
            Error::validation(format!(
                "cannot resolve mirror root {}: {e}",
                mirror_root.display()
            ),)
        },)?;
        let binary = std::path::absolute(&self.binary,).map_err(|e| {
            Error::validation(format!(
                "cannot resolve engine binary {}: {e}",
                self.binary.display()
            ),)
        },)?;

        debug!("Running {} {}", binary.display(), root.display());
        let output = Command::new(&binary,)
            .arg(&root,)
            .current_dir(&self.directory,)
            .kill_on_drop(true,)
            .output()
            .await
            .map_err(|e| Error::service(format!("failed to start line counter: {e}"),),)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr,);
            return Err(Error::service(format!(
                "line counter exited with {}: {}",
                output.status,
                stderr.trim()
            ),),);
        }

        parse_engine_output(&String::from_utf8_lossy(&output.stdout,),)
    }
}

/// Decodes the engine's standard output.
///
/// # Errors
///
/// Returns [`Error`] when the output is not a single JSON object of
/// non-negative integer counts, or when the counts sum past [`u64::MAX`].
pub fn parse_engine_output(stdout: &str,) -> Result<LanguageTotals, Error,>
{
    let totals: LanguageTotals = serde_json::from_str(stdout.trim(),)
        .map_err(|e| Error::validation(format!("malformed line counter output: {e}"),),)?;

    if totals.checked_total().is_none() {
        return Err(Error::validation(
            "malformed line counter output: total line count overflows",
        ),);
    }
    Ok(totals,)
}

/// Runs `counter`, degrading any failure to an empty mapping.
pub async fn count_languages<C,>(counter: &C, mirror_root: &Path,) -> LanguageTotals
where
    C: LineCounter,
{
    match counter.count(mirror_root,).await {
        Ok(totals,) => {
            info!("Counted {} languages", totals.len());
            totals
        }
        Err(error,) => {
            warn!("line counting failed, continuing with empty totals: {}", error);
            LanguageTotals::new()
        }
    }
}

#[cfg(test)]
mod tests
{
    use tempfile::tempdir;

    use super::*;

    struct FailingCounter;

    impl LineCounter for FailingCounter
    {
        async fn count(&self, _mirror_root: &Path,) -> Result<LanguageTotals, Error,>
        {
            Err(Error::service("line counter exited with exit status: 1",),)
        }
    }

    #[test]
    fn parse_engine_output_accepts_object()
    {
        let totals =
            parse_engine_output("{\"Python\": 1000, \"Go\": 9000}\n",).expect("valid output",);
        assert_eq!(totals.get("Go"), Some(9000));
        assert_eq!(totals.total(), 10_000);
    }

    #[test]
    fn parse_engine_output_accepts_empty_object()
    {
        assert!(parse_engine_output("{}",).expect("valid output",).is_empty());
    }

    #[test]
    fn parse_engine_output_rejects_malformed_json()
    {
        assert!(parse_engine_output("Counting...\n{\"Rust\": 1}",).is_err());
        assert!(parse_engine_output("",).is_err());
    }

    #[test]
    fn parse_engine_output_rejects_wrong_value_types()
    {
        assert!(parse_engine_output("{\"Rust\": \"many\"}",).is_err());
        assert!(parse_engine_output("{\"Rust\": 1.5}",).is_err());
        assert!(parse_engine_output("[1, 2]",).is_err());
    }

    #[test]
    fn parse_engine_output_rejects_overflowing_total()
    {
        let error = parse_engine_output("{\"Rust\": 18446744073709551615, \"Go\": 5}",)
            .expect_err("sum does not fit",);
        assert!(error.to_string().contains("overflows"));
        assert!(parse_engine_output("{\"Rust\": 18446744073709551615}",).is_ok());
    }

    #[tokio::test]
    async fn count_languages_degrades_to_empty()
    {
        let totals = count_languages(&FailingCounter, Path::new("repos",),).await;
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn missing_binary_without_build_command_is_reported()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let engine = ProcessEngine::new(&EngineSettings {
            directory:     temp.path().to_path_buf(),
            binary:        PathBuf::from("loc_runner",),
            build_command: Vec::new(),
        },);

        let error = engine.ensure_binary().await.expect_err("binary is missing",);
        assert!(error.to_string().contains("no build command"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn build_that_leaves_binary_missing_is_reported()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let engine = ProcessEngine::new(&EngineSettings {
            directory:     temp.path().to_path_buf(),
            binary:        PathBuf::from("target/release/loc_runner",),
            build_command: vec!["true".to_owned()],
        },);

        let error = engine.ensure_binary().await.expect_err("binary is still missing",);
        assert!(error.to_string().contains("still missing"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn build_that_produces_binary_succeeds()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let engine = ProcessEngine::new(&EngineSettings {
            directory:     temp.path().to_path_buf(),
            binary:        PathBuf::from("loc_runner",),
            build_command: vec!["touch".to_owned(), "loc_runner".to_owned()],
        },);

        engine.ensure_binary().await.expect("build produced the binary",);
        assert!(temp.path().join("loc_runner",).exists());
    }

    #[tokio::test]
    async fn failing_build_degrades_to_empty_totals()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let engine = ProcessEngine::new(&EngineSettings {
            directory:     temp.path().to_path_buf(),
            binary:        PathBuf::from("loc_runner",),
            build_command: vec![temp.path().join("missing-build-tool",).display().to_string()],
        },);

        let totals = count_languages(&engine, temp.path(),).await;
        assert!(totals.is_empty());
    }
}
