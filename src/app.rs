//! Top-level run: configuration, translator probe, requirement check, pipeline.

use std::fmt;

use crate::args::Args;
use crate::config::{ConfigError, Settings, write_default_config};
use crate::pipeline::{self, Layout, PipelineError};
use crate::tools::{PathLookup, SystemToolRunner, check_requirements};
use crate::translate::connect_deepl;

/// Errors that stop the program.
#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded or written.
    Config(ConfigError),
    /// Required tools are not installed; each was reported already.
    MissingTools,
    /// The pipeline failed.
    Pipeline(PipelineError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => err.fmt(f),
            Self::MissingTools => f.write_str("missing required tools"),
            Self::Pipeline(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::MissingTools => None,
            Self::Pipeline(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

/// What: Execute the program for parsed arguments.
///
/// Inputs:
/// - `args`: Parsed command line.
///
/// Output:
/// - `Ok(())` when the requested work completed.
///
/// # Errors
/// - Returns `Err(AppError::Config)` for configuration problems.
/// - Returns `Err(AppError::MissingTools)` when gettext tools are missing.
/// - Returns `Err(AppError::Pipeline)` when extraction, a catalog or a locale failed.
///
/// Details:
/// - `--config` only writes the default file and returns.
/// - A requested but unusable translator disables auto-translation without failing.
pub async fn run(args: &Args) -> Result<(), AppError> {
    let env_path = args.env_path();
    if args.config {
        write_default_config(&env_path)?;
        println!(
            "Default configuration created, please edit the {} file and re-run.",
            env_path.display()
        );
        return Ok(());
    }

    let settings = Settings::load(&env_path)?;
    println!("{}", settings.summary());
    tracing::debug!(settings = ?settings, "configuration loaded");

    let translator = if args.translate {
        connect_deepl(settings.deepl_key.as_ref(), &settings.source_locale).await
    } else {
        None
    };

    if !check_requirements(&PathLookup) {
        return Err(AppError::MissingTools);
    }

    let layout = Layout::new(&args.project_dir, &settings);
    let summary = pipeline::run(
        &settings,
        &layout,
        &SystemToolRunner,
        translator.as_ref(),
    )
    .await?;
    tracing::info!(
        updated = summary.updated.len(),
        initialized = summary.initialized.len(),
        translated = summary.translated.len(),
        "pipeline finished"
    );
    println!("Updated all translations!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    /// What: `--config` writes the default file and a second run loads it.
    async fn config_flag_writes_loadable_file() {
        use clap::Parser;

        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_str().expect("utf-8 path");
        let args = Args::parse_from(["gen-localization", "-c", "--project-dir", root]);
        run(&args).await.expect("config written");

        let settings = Settings::load(&args.env_path()).expect("settings");
        assert!(!settings.locales.is_empty());
        assert!(!settings.keyword.is_empty());
    }

    #[tokio::test]
    /// What: A run without a configured locale list stops before touching anything.
    async fn missing_locales_stops_early() {
        use clap::Parser;

        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_str().expect("utf-8 path");
        let args = Args::parse_from(["gen-localization", "--project-dir", root]);
        let err = run(&args).await.expect_err("should fail");
        assert!(matches!(err, AppError::Config(ConfigError::MissingLocales)));
        assert!(!dir.path().join("locales").exists());
    }
}
