//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_ENV_FILE;

/// gen-localization - keep gettext catalogs extracted, merged, translated and compiled
#[derive(Parser, Debug)]
#[command(name = "gen-localization")]
#[command(version)]
#[command(about = "Extract, merge, auto-translate and compile gettext catalogs", long_about = None)]
pub struct Args {
    /// Whether or not to auto-translate missing fields
    #[arg(short, long)]
    pub translate: bool,

    /// Creates a default configuration file and exits
    #[arg(short, long)]
    pub config: bool,

    /// Path of the environment file holding the configuration
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Project root; all catalog paths are relative to it
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Environment file location, resolved against the project root when relative.
    #[must_use]
    pub fn env_path(&self) -> PathBuf {
        if self.env_file.is_absolute() {
            self.env_file.clone()
        } else {
            self.project_dir.join(&self.env_file)
        }
    }
}

/// What: Determine the log level based on command-line arguments.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `log_level` argument.
#[must_use]
pub fn determine_log_level(args: &Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: No flags means a plain pipeline run against `./.env`.
    fn defaults() {
        let args = Args::parse_from(["gen-localization"]);
        assert!(!args.translate);
        assert!(!args.config);
        assert_eq!(args.env_path(), PathBuf::from("./.env"));
        assert_eq!(determine_log_level(&args), "info");
        assert!(args.log_file.is_none());
    }

    #[test]
    /// What: Short and long forms of the two pipeline flags parse.
    fn translate_and_config_flags() {
        let args = Args::parse_from(["gen-localization", "-t"]);
        assert!(args.translate);
        let args = Args::parse_from(["gen-localization", "--translate", "--config"]);
        assert!(args.translate && args.config);
        let args = Args::parse_from(["gen-localization", "-c"]);
        assert!(args.config);
    }

    #[test]
    /// What: Verbose wins over an explicit log level.
    fn verbose_overrides_level() {
        let args = Args::parse_from(["gen-localization", "--log-level", "warn", "-v"]);
        assert_eq!(determine_log_level(&args), "debug");
    }

    #[test]
    /// What: Relative env files resolve against the project dir, absolute ones do not.
    fn env_path_resolution() {
        let args = Args::parse_from([
            "gen-localization",
            "--project-dir",
            "/work",
            "--env-file",
            "conf/.env",
        ]);
        assert_eq!(args.env_path(), PathBuf::from("/work/conf/.env"));
        let args = Args::parse_from(["gen-localization", "--env-file", "/etc/loc.env"]);
        assert_eq!(args.env_path(), PathBuf::from("/etc/loc.env"));
    }

    #[test]
    /// What: Unknown arguments are rejected.
    fn rejects_positional_arguments() {
        assert!(Args::try_parse_from(["gen-localization", "extra"]).is_err());
    }
}
