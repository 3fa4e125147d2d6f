//! Neutralizes loader-runtime artifacts in concatenated module source
//!
//! The upstream bundler leaves loader calls, interop flags, and residual
//! module-system export statements in generated code; none of them can run
//! in a module-less host. Offending lines are replaced by a comment line of
//! the same count, preserving 1:1 line alignment for downstream debugging
//! and source maps. Deleting or mangling lines is deliberately not done.

use indexmap::IndexSet;
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::module_graph::{ContextToken, ModuleGraph, ModuleId};

/// Host loader-runtime call prefix
pub const LOADER_REQUIRE_PREFIX: &str = "__webpack_require__";
/// Host loader-runtime exports object
pub const LOADER_EXPORTS_PREFIX: &str = "__webpack_exports__";
/// ES-module interop marker
pub const ES_INTEROP_MARKER: &str = "__esModule";

/// Substrings whose presence anywhere on a line condemns the line
const FORBIDDEN_SUBSTRINGS: &[&str] = &[
    LOADER_REQUIRE_PREFIX,
    LOADER_EXPORTS_PREFIX,
    ES_INTEROP_MARKER,
];

/// Replacement emitted in place of a condemned line
const NEUTRALIZED_LINE: &str = "// (removed: bundler loader artifact)";

/// Foreign-module-system export statement at statement position
static EXPORT_STATEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*export\b").expect("export statement pattern is valid"));

/// Same check, usable over a whole assembled text
static EXPORT_STATEMENT_ANYWHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\b").expect("export statement pattern is valid"));

/// Concatenate and sanitize the generated source of the emission set
///
/// Module order is the emission set's own iteration order; a module whose
/// source the host elided contributes nothing.
pub fn sanitize_modules(
    graph: &dyn ModuleGraph,
    emission: &IndexSet<ModuleId>,
    context: &ContextToken,
) -> String {
    let mut combined = String::new();
    for &module in emission {
        match graph.generated_source(module, context) {
            Some(source) => {
                combined.push_str(&sanitize(&source));
                if !combined.ends_with('\n') {
                    combined.push('\n');
                }
            }
            None => {
                debug!("module #{} has no generated source, skipping", module.as_u32());
            }
        }
    }
    combined
}

/// Replace every forbidden line with the neutralized comment, keeping the
/// line count intact
pub fn sanitize(source: &str) -> String {
    let mut replaced = 0_usize;
    let mut sanitized = source
        .lines()
        .map(|line| {
            if line_is_forbidden(line) {
                replaced += 1;
                NEUTRALIZED_LINE
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    if replaced > 0 {
        trace!("neutralized {replaced} loader-runtime line(s)");
    }
    if source.ends_with('\n') {
        sanitized.push('\n');
    }
    sanitized
}

/// Scan an assembled text for any forbidden pattern that survived
pub fn find_forbidden(text: &str) -> Option<String> {
    for pattern in FORBIDDEN_SUBSTRINGS {
        if text.contains(pattern) {
            return Some((*pattern).to_owned());
        }
    }
    if EXPORT_STATEMENT_ANYWHERE_RE.is_match(text) {
        return Some("export statement".to_owned());
    }
    None
}

fn line_is_forbidden(line: &str) -> bool {
    FORBIDDEN_SUBSTRINGS
        .iter()
        .any(|pattern| line.contains(pattern))
        || EXPORT_STATEMENT_RE.is_match(line)
}
