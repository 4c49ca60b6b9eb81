//! External gettext tools: availability checks and process invocation.

pub mod command;

pub use command::{Invocation, SystemToolRunner, ToolError, ToolRunner};

/// Binaries the pipeline shells out to.
pub const REQUIRED_TOOLS: [&str; 4] = ["xgettext", "msgfmt", "msginit", "msgmerge"];

/// What: Resolve whether a program is available.
///
/// Details:
/// - Kept separate from [`ToolRunner`] so availability can be checked without
///   spawning anything.
pub trait ToolLookup {
    /// Return `true` if `program` resolves to an executable.
    fn is_available(&self, program: &str) -> bool;
}

/// `PATH` lookup backed by the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLookup;

impl ToolLookup for PathLookup {
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

impl<F> ToolLookup for F
where
    F: Fn(&str) -> bool,
{
    fn is_available(&self, program: &str) -> bool {
        self(program)
    }
}

/// What: List the required tools that cannot be resolved.
///
/// Inputs:
/// - `lookup`: Availability resolver.
///
/// Output:
/// - Missing tool names, in [`REQUIRED_TOOLS`] order.
#[must_use]
pub fn missing_tools(lookup: &impl ToolLookup) -> Vec<&'static str> {
    REQUIRED_TOOLS
        .into_iter()
        .filter(|tool| !lookup.is_available(tool))
        .collect()
}

/// What: Check that every required tool is available, reporting each missing one.
///
/// Inputs:
/// - `lookup`: Availability resolver.
///
/// Output:
/// - `true` when all tools resolve.
///
/// Details:
/// - Prints `Missing <tool>` for every tool that does not resolve.
#[must_use]
pub fn check_requirements(lookup: &impl ToolLookup) -> bool {
    let missing = missing_tools(lookup);
    for tool in &missing {
        tracing::error!(tool, "required tool not found on PATH");
        println!("Missing {tool}");
    }
    missing.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    /// What: A single unresolved tool is reported alone and fails the check.
    fn reports_exactly_the_missing_tool() {
        let asked = RefCell::new(Vec::new());
        let lookup = |program: &str| {
            asked.borrow_mut().push(program.to_string());
            program != "msginit"
        };
        assert_eq!(missing_tools(&lookup), vec!["msginit"]);
        assert!(!check_requirements(&lookup));
        // Every tool was looked up, nothing else was touched
        assert_eq!(asked.borrow().len(), REQUIRED_TOOLS.len() * 2);
    }

    #[test]
    /// What: All tools present passes the check.
    fn all_present_passes() {
        assert!(check_requirements(&|_: &str| true));
        assert_eq!(missing_tools(&|_: &str| false), REQUIRED_TOOLS.to_vec());
    }

    #[test]
    /// What: The `which`-backed lookup rejects nonsense names.
    fn path_lookup_rejects_unknown() {
        assert!(!PathLookup.is_available("gen-localization-no-such-tool"));
    }
}
