//! The localization pipeline: extract once, then init, merge, translate,
//! compile and relocate every configured locale in order.

pub mod steps;

use std::fmt;
use std::path::PathBuf;

use crate::catalog::{CatalogError, PatchOutcome, auto_translate_file};
use crate::config::Settings;
use crate::tools::{ToolError, ToolRunner};
use crate::translate::Translator;

pub use steps::Layout;

/// Per-locale stage, used to report where a locale failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Creating the locale directory.
    Setup,
    /// `msginit`.
    Init,
    /// `msgmerge`.
    Merge,
    /// `msgfmt`.
    Compile,
    /// Moving the compiled catalog into place.
    Relocate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Init => "init",
            Self::Merge => "merge",
            Self::Compile => "compile",
            Self::Relocate => "relocate",
        })
    }
}

/// Cause of a per-locale failure.
#[derive(Debug)]
pub enum StageError {
    /// A gettext tool failed.
    Tool(ToolError),
    /// A filesystem operation failed.
    Io(std::io::Error),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool(err) => err.fmt(f),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tool(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

/// A locale that could not be brought up to date.
#[derive(Debug)]
pub struct LocaleFailure {
    /// Locale code.
    pub locale: String,
    /// Stage that failed.
    pub stage: Stage,
    /// Why it failed.
    pub error: StageError,
}

impl fmt::Display for LocaleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.locale, self.stage, self.error)
    }
}

/// What: Errors that end a pipeline run.
///
/// Details:
/// - `LocalesFailed` is returned only after every locale has been attempted.
#[derive(Debug)]
pub enum PipelineError {
    /// Creating the shared output directories failed.
    Io {
        /// Directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// `xgettext` failed; no locale was processed.
    Extraction(ToolError),
    /// A catalog could not be parsed or rewritten.
    Catalog(CatalogError),
    /// One or more locales failed.
    LocalesFailed(Vec<LocaleFailure>),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Extraction(err) => write!(f, "extraction failed: {err}"),
            Self::Catalog(err) => write!(f, "catalog error: {err}"),
            Self::LocalesFailed(failures) => {
                write!(f, "{} locale(s) failed:", failures.len())?;
                for failure in failures {
                    write!(f, " [{failure}]")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Extraction(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::LocalesFailed(_) => None,
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// What happened to the locales of a successful run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Locales whose catalog was created by `msginit` during this run.
    pub initialized: Vec<String>,
    /// Locales with the number of entries auto-translated.
    pub translated: Vec<(String, usize)>,
    /// Locales whose compiled catalog was refreshed.
    pub updated: Vec<String>,
}

/// Outcome of a per-locale pass that did not hit a fatal error.
type LocaleResult = Result<(), LocaleFailure>;

/// Tie a stage error to its locale.
fn fail(locale: &str, stage: Stage, error: StageError) -> LocaleFailure {
    LocaleFailure {
        locale: locale.to_string(),
        stage,
        error,
    }
}

/// What: Run the whole pipeline.
///
/// Inputs:
/// - `settings`: Loaded configuration.
/// - `layout`: Paths derived from the project root and settings.
/// - `runner`: Executes the gettext tools.
/// - `translator`: Present when auto-translation is enabled and usable.
///
/// Output:
/// - `Ok(RunSummary)` when every locale was processed.
///
/// # Errors
/// - Returns `Err(PipelineError::Io)` when the output directories cannot be created.
/// - Returns `Err(PipelineError::Extraction)` when `xgettext` fails.
/// - Returns `Err(PipelineError::Catalog)` when a catalog is malformed or
///   cannot be rewritten; the run stops at that locale.
/// - Returns `Err(PipelineError::LocalesFailed)` after the loop when any
///   locale's init, merge, compile or relocate step failed.
///
/// Details:
/// - Requirement checks are the caller's job and must happen before this.
/// - The source locale is never auto-translated.
/// - Translator failures and count mismatches skip that locale's patch only.
pub async fn run<R, T>(
    settings: &Settings,
    layout: &Layout,
    runner: &R,
    translator: Option<&T>,
) -> Result<RunSummary, PipelineError>
where
    R: ToolRunner,
    T: Translator,
{
    for dir in [layout.po_dir(), layout.compiled_dir()] {
        let path = layout.abs(dir);
        std::fs::create_dir_all(&path).map_err(|source| PipelineError::Io { path, source })?;
    }

    runner
        .run(&steps::extract(settings, layout))
        .map_err(PipelineError::Extraction)?;
    tracing::info!(template = %layout.template().display(), "template extracted");

    let mut summary = RunSummary::default();
    let mut failures = Vec::new();
    for locale in &settings.locales {
        let translator = translator.filter(|_| *locale != settings.source_locale);
        match process_locale(layout, runner, translator, locale, &mut summary).await? {
            Ok(()) => {
                summary.updated.push(locale.clone());
                println!("Updated translation for locales/{locale}");
            }
            Err(failure) => {
                tracing::error!(
                    locale = %failure.locale,
                    stage = %failure.stage,
                    error = %failure.error,
                    "locale update failed"
                );
                failures.push(failure);
            }
        }
    }

    if failures.is_empty() {
        Ok(summary)
    } else {
        Err(PipelineError::LocalesFailed(failures))
    }
}

/// What: Bring one locale's catalogs up to date.
///
/// Output:
/// - Outer `Err` for fatal catalog errors; inner `Err` for a failed stage.
async fn process_locale<R, T>(
    layout: &Layout,
    runner: &R,
    translator: Option<&T>,
    locale: &str,
    summary: &mut RunSummary,
) -> Result<LocaleResult, CatalogError>
where
    R: ToolRunner,
    T: Translator,
{
    let locale_dir = layout.abs(&layout.locale_dir(locale));
    if let Err(e) = std::fs::create_dir_all(&locale_dir) {
        return Ok(Err(fail(locale, Stage::Setup, StageError::Io(e))));
    }

    let catalog = layout.catalog(locale);
    if !layout.abs(&catalog).exists() {
        if let Err(e) = runner.run(&steps::init(layout, locale)) {
            return Ok(Err(fail(locale, Stage::Init, StageError::Tool(e))));
        }
        summary.initialized.push(locale.to_string());
        println!("Generated {}", catalog.display());
    }

    if let Err(e) = runner.run(&steps::merge(layout, locale)) {
        return Ok(Err(fail(locale, Stage::Merge, StageError::Tool(e))));
    }

    if let Some(translator) = translator {
        match auto_translate_file(&layout.abs(&catalog), locale, translator).await? {
            PatchOutcome::Translated { count } => {
                summary.translated.push((locale.to_string(), count));
            }
            PatchOutcome::Unchanged => {}
            PatchOutcome::LengthMismatch { sent, received } => {
                println!(
                    "Did not receive the same length of data as we sent: {sent} - {received}"
                );
            }
            PatchOutcome::TranslatorFailed(err) => {
                println!("Unable to translate {locale}: {err}");
            }
        }
    }

    if let Err(e) = runner.run(&steps::compile(layout, locale)) {
        return Ok(Err(fail(locale, Stage::Compile, StageError::Tool(e))));
    }

    let from = layout.abs(&layout.compiled_scratch(locale));
    let to = layout.abs(&layout.compiled_target(locale));
    if let Err(e) = steps::relocate(&from, &to) {
        return Ok(Err(fail(locale, Stage::Relocate, StageError::Io(e))));
    }
    tracing::debug!(locale, target = %to.display(), "compiled catalog installed");
    Ok(Ok(()))
}
