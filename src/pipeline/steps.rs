//! Directory layout and the gettext command lines for each pipeline step.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::tools::Invocation;

/// What: Where every pipeline artifact lives.
///
/// Details:
/// - Paths are kept relative to `root` so tool invocations (which run with
///   `root` as working directory) and the generated `#:` references stay
///   project-relative. Use [`Layout::abs`] for filesystem access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root.
    root: PathBuf,
    /// Text domain.
    domain: String,
    /// `locales/po`.
    po_dir: PathBuf,
    /// `locales/<domain>.pot`.
    template: PathBuf,
    /// `<generated_dir>/locales`.
    compiled_dir: PathBuf,
}

impl Layout {
    /// Build the layout for `settings` under `root`.
    #[must_use]
    pub fn new(root: &Path, settings: &Settings) -> Self {
        let locales = Path::new("locales");
        Self {
            root: root.to_path_buf(),
            domain: settings.domain.clone(),
            po_dir: locales.join("po"),
            template: locales.join(format!("{}.pot", settings.domain)),
            compiled_dir: settings.generated_dir.join("locales"),
        }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a layout path against the project root.
    #[must_use]
    pub fn abs(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Directory holding every locale's text catalog.
    #[must_use]
    pub fn po_dir(&self) -> &Path {
        &self.po_dir
    }

    /// Template produced by extraction.
    #[must_use]
    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Root of the compiled catalog tree.
    #[must_use]
    pub fn compiled_dir(&self) -> &Path {
        &self.compiled_dir
    }

    /// `locales/po/<locale>`.
    #[must_use]
    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.po_dir.join(locale)
    }

    /// `locales/po/<locale>/<domain>.po`.
    #[must_use]
    pub fn catalog(&self, locale: &str) -> PathBuf {
        self.locale_dir(locale).join(format!("{}.po", self.domain))
    }

    /// `locales/po/<locale>/<domain>.mo`, where `msgfmt` writes.
    #[must_use]
    pub fn compiled_scratch(&self, locale: &str) -> PathBuf {
        self.locale_dir(locale).join(format!("{}.mo", self.domain))
    }

    /// `<generated_dir>/locales/<locale>/LC_MESSAGES/<domain>.mo`.
    #[must_use]
    pub fn compiled_target(&self, locale: &str) -> PathBuf {
        self.compiled_dir
            .join(locale)
            .join("LC_MESSAGES")
            .join(format!("{}.mo", self.domain))
    }
}

/// Render a path argument.
fn arg(path: &Path) -> String {
    path.display().to_string()
}

/// What: `xgettext` command producing the template catalog.
///
/// Details:
/// - `--language` is only passed when configured; otherwise xgettext infers
///   it from each file's extension.
#[must_use]
pub fn extract(settings: &Settings, layout: &Layout) -> Invocation {
    let mut args: Vec<String> = settings.sources.iter().map(|s| arg(s)).collect();
    if let Some(language) = &settings.language {
        args.push(format!("--language={language}"));
    }
    args.extend([
        format!("-k{}", settings.keyword),
        format!("--package-name={}", settings.package_name),
        format!("--package-version={}", settings.package_version),
        format!("--copyright-holder={}", settings.copyright_holder),
        format!("--add-comments={}", settings.comments),
        format!("--msgid-bugs-address={}", settings.bugs_address),
        format!("--output={}", arg(layout.template())),
    ]);
    Invocation::new("xgettext", args).in_dir(layout.root())
}

/// What: `msginit` command creating a locale's catalog from the template.
///
/// Details:
/// - `--no-translator` keeps msginit from prompting for an email address.
#[must_use]
pub fn init(layout: &Layout, locale: &str) -> Invocation {
    Invocation::new(
        "msginit",
        vec![
            "-i".to_string(),
            arg(layout.template()),
            "-o".to_string(),
            arg(&layout.catalog(locale)),
            "-l".to_string(),
            locale.to_string(),
            "--no-translator".to_string(),
        ],
    )
    .quiet()
    .in_dir(layout.root())
}

/// `msgmerge` command folding new template entries into a locale's catalog.
#[must_use]
pub fn merge(layout: &Layout, locale: &str) -> Invocation {
    let catalog = arg(&layout.catalog(locale));
    Invocation::new(
        "msgmerge",
        vec![
            "-o".to_string(),
            catalog.clone(),
            catalog,
            arg(layout.template()),
        ],
    )
    .quiet()
    .in_dir(layout.root())
}

/// `msgfmt` command compiling a locale's catalog next to its source.
#[must_use]
pub fn compile(layout: &Layout, locale: &str) -> Invocation {
    Invocation::new(
        "msgfmt",
        vec![
            "-o".to_string(),
            arg(&layout.compiled_scratch(locale)),
            arg(&layout.catalog(locale)),
        ],
    )
    .in_dir(layout.root())
}

/// What: Move a compiled catalog into place, replacing any previous one.
///
/// Inputs:
/// - `from`: Freshly compiled file.
/// - `to`: Final location; parent directories are created.
///
/// # Errors
/// - Returns `Err` when directories cannot be created or the file cannot be
///   moved or copied.
///
/// Details:
/// - Falls back to copy and remove when a rename is impossible, for example
///   across filesystems.
pub fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Err(err) = std::fs::rename(from, to) {
        tracing::debug!(error = %err, from = %from.display(), "rename failed; copying instead");
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}
