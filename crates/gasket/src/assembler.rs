//! Final artifact text assembly
//!
//! Renders, in order: the namespace initializer, the sanitized module
//! source, and one export-assignment statement per binding. The assembled
//! text is then re-validated against the forbidden-pattern set; a match at
//! that point means sanitization failed and the build must not ship.

use log::debug;
use regex::Regex;

use crate::{
    config::Config,
    error::{BundleError, Result},
    exports::ExportBinding,
    sanitizer,
};

/// Global object every namespace segment hangs off; the target runtimes
/// have no reliable `this` binding at the top level.
const GLOBAL_OBJECT: &str = "globalThis";

/// Assemble the final script text
pub fn assemble(config: &Config, bindings: &[ExportBinding], sanitized: &str) -> Result<String> {
    // Every bound identifier must have a concrete definition in the emitted
    // source; a re-export whose defining module the host elided would
    // otherwise ship as a dangling reference.
    for binding in bindings {
        if !has_runtime_definition(sanitized, &binding.local_name) {
            return Err(BundleError::MissingRuntimeDefinition {
                local_name: binding.local_name.clone(),
            });
        }
    }

    let namespace = config.namespace();
    let mut artifact = render_namespace_initializer(config);
    artifact.push_str(sanitized);
    if !artifact.ends_with('\n') {
        artifact.push('\n');
    }
    for binding in bindings {
        artifact.push_str(&format!(
            "{GLOBAL_OBJECT}.{namespace}.{} = {};\n",
            binding.export_name, binding.local_name
        ));
    }

    // Last-line invariant: nothing forbidden may survive into the artifact.
    if let Some(pattern) = sanitizer::find_forbidden(&artifact) {
        return Err(BundleError::LeakedPattern { pattern });
    }

    debug!(
        "assembled {} byte(s) under namespace {namespace}",
        artifact.len()
    );
    Ok(artifact)
}

/// One `path = path || {};` statement per dotted prefix: creates missing
/// segments, leaves existing ones untouched, idempotent across artifacts
/// sharing a namespace root.
fn render_namespace_initializer(config: &Config) -> String {
    let mut rendered = String::new();
    let mut path = String::from(GLOBAL_OBJECT);
    for segment in config.namespace_segments() {
        path.push('.');
        path.push_str(segment);
        rendered.push_str(&format!("{path} = {path} || {{}};\n"));
    }
    rendered
}

fn definition_pattern(local_name: &str) -> String {
    let escaped = regex::escape(local_name);
    format!(
        r"(?m)^\s*(?:(?:async\s+)?function\*?\s+{escaped}\s*\(|class\s+{escaped}\b|(?:var|let|const)\s+{escaped}\b)"
    )
}

/// Whether the concatenated source defines `local_name` as a function,
/// class, or variable at statement position
fn has_runtime_definition(source: &str, local_name: &str) -> bool {
    Regex::new(&definition_pattern(local_name))
        .map(|pattern| pattern.is_match(source))
        .unwrap_or(false)
}
