//! The emission pipeline
//!
//! A single linear pass per host compilation: resolve the entry, enforce
//! the export-surface invariants, resolve bindings, collect the emission
//! set, sanitize, assemble. Any stage failure is terminal for that emission
//! and no artifact is produced. The pipeline holds no state between runs,
//! so watch-mode re-invocations are safely re-entrant.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info};

use crate::{
    assembler::assemble,
    config::{BuildMode, Config},
    entrypoint::resolve_entrypoint,
    error::Result,
    exports::resolve_export_surface,
    invariants::enforce_invariants,
    module_graph::ModuleGraph,
    reachability::collect_emission_set,
    sanitizer::sanitize_modules,
};

/// The one text artifact of a successful emission run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Resolved entry name plus the mode-determined extension
    pub file_name: String,
    pub contents: String,
}

impl Artifact {
    /// Persist the artifact into `dir`, returning the written path
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)
            .with_context(|| format!("failed to write artifact {}", path.display()))?;
        Ok(path)
    }
}

/// Configured pipeline, constructed once and reused across compilation
/// passes (e.g. a watch loop)
#[derive(Debug, Clone)]
pub struct Flattener {
    config: Config,
}

impl Flattener {
    /// Validate the configuration up front; invalid values fail here,
    /// before any graph is ever touched
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run one emission over a graph snapshot
    pub fn run(&self, graph: &dyn ModuleGraph) -> Result<Artifact> {
        run_pipeline(graph, &self.config)
    }
}

/// One-shot convenience over [`Flattener`]
pub fn flatten(graph: &dyn ModuleGraph, config: &Config) -> Result<Artifact> {
    config.validate()?;
    run_pipeline(graph, config)
}

fn run_pipeline(graph: &dyn ModuleGraph, config: &Config) -> Result<Artifact> {
    let entry = resolve_entrypoint(graph)?;
    debug!("flattening entry `{}`", entry.entry_name);

    enforce_invariants(graph, &entry)?;
    let bindings = resolve_export_surface(graph, &entry, config)?;
    let emission = collect_emission_set(graph, &entry, &bindings)?;
    let sanitized = sanitize_modules(graph, &emission, &entry.context);
    let script = assemble(config, &bindings, &sanitized)?;

    let file_name = format!(
        "{}.{}",
        entry.entry_name,
        config.build_mode.artifact_extension()
    );
    let contents = match config.build_mode {
        BuildMode::ServerScript => script,
        BuildMode::WebApp => wrap_html(&script),
    };

    info!(
        "emitted {file_name} ({} modules, {} export bindings)",
        emission.len(),
        bindings.len()
    );
    Ok(Artifact {
        file_name,
        contents,
    })
}

/// Inline the script into a minimal HTML document for browser-hosted builds
fn wrap_html(script: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <script>\n{script}    </script>\n  </head>\n  \
         <body></body>\n</html>\n"
    )
}
