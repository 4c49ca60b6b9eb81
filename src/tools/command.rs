//! Command execution abstraction for the gettext toolchain.
//!
//! This module provides the [`ToolRunner`] trait and the process-backed
//! implementation, so pipeline steps can be exercised with stub runners.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// What: A single external tool invocation.
///
/// Details:
/// - `quiet` discards the tool's stderr; stdout is always inherited.
/// - Relative path arguments are resolved against `current_dir` when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name, resolved through `PATH`.
    pub program: &'static str,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Discard stderr.
    pub quiet: bool,
    /// Working directory for the child process.
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation that keeps the tool's stderr visible.
    #[must_use]
    pub const fn new(program: &'static str, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            quiet: false,
            current_dir: None,
        }
    }

    /// Discard the tool's stderr.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Run the tool from `dir`.
    #[must_use]
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// What: Abstract process execution used for the gettext binaries.
///
/// Inputs:
/// - `invocation`: Program, arguments and stderr handling.
///
/// Output:
/// - `Ok(())` when the tool exits successfully.
///
/// # Errors
/// - Returns `Err(ToolError::Io)` when the process cannot be spawned or waited on
/// - Returns `Err(ToolError::Failed)` when the tool exits with a non-zero status
///
/// Details:
/// - Production code relies on [`SystemToolRunner`]; tests supply runners that
///   emulate the tools' file effects.
pub trait ToolRunner {
    /// # Errors
    /// - Returns `Err(ToolError::Io)` when the process cannot be spawned or waited on
    /// - Returns `Err(ToolError::Failed)` when the tool exits with a non-zero status
    fn run(&self, invocation: &Invocation) -> Result<(), ToolError>;
}

/// What: Real tool runner backed by `std::process::Command`.
///
/// Details:
/// - Blocks until the child exits. stdin is closed so tools such as `msginit`
///   never wait for interactive input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ToolError> {
        tracing::debug!(command = %invocation, "running tool");
        let mut command = std::process::Command::new(invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        if invocation.quiet {
            command.stderr(Stdio::null());
        }
        let status = command.status().map_err(|source| ToolError::Io {
            program: invocation.program.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(ToolError::Failed {
                program: invocation.program.to_string(),
                args: invocation.args.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// What: Error type capturing tool spawning and exit failures.
///
/// Details:
/// - `code` is `None` when the process was terminated by a signal.
#[derive(Debug)]
pub enum ToolError {
    /// The process could not be spawned or waited on.
    Io {
        /// Program name.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The tool exited unsuccessfully.
    Failed {
        /// Program name that failed.
        program: String,
        /// Command arguments.
        args: Vec<String>,
        /// Exit code, if any.
        code: Option<i32>,
    },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { program, source } => write!(f, "failed to run {program}: {source}"),
            Self::Failed {
                program,
                args,
                code: Some(code),
            } => write!(f, "{program} {args:?} exited with status {code}"),
            Self::Failed {
                program,
                args,
                code: None,
            } => write!(f, "{program} {args:?} was terminated by a signal"),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Failed { .. } => None,
        }
    }
}
