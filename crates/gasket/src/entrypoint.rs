//! Entry point selection
//!
//! The build configuration must declare exactly one entry point, and that
//! entry point must surface a source module. Anything else is a fatal
//! misconfiguration caught here, before any other pipeline work.

use indexmap::IndexSet;
use log::debug;

use crate::{
    error::{BundleError, Result},
    module_graph::{ContextToken, ModuleGraph, ModuleId, is_source_path},
};

/// The single entry selected for an emission run
#[derive(Debug, Clone)]
pub struct ResolvedEntrypoint {
    /// Logical entry name, also the artifact's base name
    pub entry_name: String,
    pub entry_module: ModuleId,
    pub context: ContextToken,
    /// Modules reachable from the entry's chunks, in host iteration order
    pub reachable: IndexSet<ModuleId>,
}

/// Select exactly one entry module from the graph's declared entry points
pub fn resolve_entrypoint(graph: &dyn ModuleGraph) -> Result<ResolvedEntrypoint> {
    let mut candidates: Vec<ResolvedEntrypoint> = Vec::new();

    for entry in graph.entrypoints() {
        let mut reachable: IndexSet<ModuleId> = IndexSet::new();
        for &chunk in &entry.chunks {
            reachable.extend(graph.chunk_modules(chunk));
        }

        // The chunks' own declared entry modules are the narrower, more
        // reliable signal; the full reachable set is the fallback path for
        // hosts that do not report the subset.
        let entry_module = entry
            .chunks
            .iter()
            .flat_map(|&chunk| graph.chunk_entry_modules(chunk))
            .find(|&module| has_source_resource(graph, module))
            .or_else(|| {
                reachable
                    .iter()
                    .copied()
                    .find(|&module| has_source_resource(graph, module))
            });

        match entry_module {
            Some(module) => {
                debug!(
                    "entry `{}` resolved to module #{} ({} reachable modules)",
                    entry.name,
                    module.as_u32(),
                    reachable.len()
                );
                candidates.push(ResolvedEntrypoint {
                    entry_name: entry.name,
                    entry_module: module,
                    context: entry.context,
                    reachable,
                });
            }
            None => {
                debug!("entry `{}` surfaced no source module, skipping", entry.name);
            }
        }
    }

    match candidates.len() {
        0 => Err(BundleError::NoEntrypointFound),
        1 => Ok(candidates.remove(0)),
        _ => Err(BundleError::EntrypointCardinality(
            candidates
                .into_iter()
                .map(|candidate| candidate.entry_name)
                .collect(),
        )),
    }
}

fn has_source_resource(graph: &dyn ModuleGraph, module: ModuleId) -> bool {
    graph
        .resource_path(module)
        .is_some_and(|path| is_source_path(&path))
}
