//! Export surface resolution
//!
//! Maps the entry module's ordered export list onto concrete runtime
//! identifiers and namespace-facing names. By the time this stage runs the
//! invariant guard has already excluded every shape whose local identifier
//! cannot be known statically.

use log::{debug, trace};

use crate::{
    config::Config,
    entrypoint::ResolvedEntrypoint,
    error::{BundleError, Result},
    module_graph::{ModuleGraph, module_label},
    sanitizer::ES_INTEROP_MARKER,
};

/// Local identifier the upstream emitter defines for a default export
pub const DEFAULT_EXPORT_LOCAL: &str = "defaultExport";

/// One symbol to attach to the namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBinding {
    /// Namespace-facing key
    pub export_name: String,
    /// Runtime identifier expected to exist in the emitted source
    pub local_name: String,
    /// Original export name, used to trace the defining module
    pub source_export_name: String,
}

/// Resolve the entry module's exports to namespace bindings
pub fn resolve_export_surface(
    graph: &dyn ModuleGraph,
    entry: &ResolvedEntrypoint,
    config: &Config,
) -> Result<Vec<ExportBinding>> {
    let info = graph.exports_info(entry.entry_module);
    let mut bindings = Vec::with_capacity(info.exports.len());

    for export in &info.exports {
        if export.name == ES_INTEROP_MARKER {
            // Synthetic interop flag, never exposed on the namespace.
            trace!("skipping interop marker export");
            continue;
        }

        if export.name == "default" {
            let export_name = config
                .default_export_name
                .clone()
                .unwrap_or_else(|| DEFAULT_EXPORT_LOCAL.to_owned());
            bindings.push(ExportBinding {
                export_name,
                local_name: DEFAULT_EXPORT_LOCAL.to_owned(),
                source_export_name: "default".to_owned(),
            });
        } else {
            // A re-export whose target is exported under a different name is
            // the aliasing case the invariant guard forbids; the guard's
            // static scan cannot see synthetic entry modules, so the
            // metadata shape is rejected here as well.
            if let Some(target) = &export.target
                && let Some(target_name) = target.export_name.as_deref()
                && target_name != export.name
            {
                return Err(BundleError::UnsupportedAliasedReexport {
                    module: module_label(graph, entry.entry_module),
                    original: target_name.to_owned(),
                    alias: export.name.clone(),
                });
            }
            bindings.push(ExportBinding {
                export_name: export.name.clone(),
                local_name: export.name.clone(),
                source_export_name: export.name.clone(),
            });
        }
    }

    if bindings.is_empty() {
        return Err(BundleError::NoExportedSymbols {
            entry: entry.entry_name.clone(),
        });
    }

    debug!(
        "entry `{}` exposes {} binding(s): {}",
        entry.entry_name,
        bindings.len(),
        bindings
            .iter()
            .map(|binding| binding.export_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(bindings)
}
