//! Emission set collection
//!
//! Decides which modules' generated source must be concatenated into the
//! artifact: the entry module (it may hold top-level side effects unrelated
//! to any export), everything the host's own dead-code elimination kept
//! reachable, and the defining module behind every export binding.

use indexmap::IndexSet;
use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::{
    entrypoint::ResolvedEntrypoint,
    error::{BundleError, Result},
    exports::ExportBinding,
    module_graph::{ModuleGraph, ModuleId},
};

/// Collect the deduplicated, insertion-ordered set of modules to emit
pub fn collect_emission_set(
    graph: &dyn ModuleGraph,
    entry: &ResolvedEntrypoint,
    bindings: &[ExportBinding],
) -> Result<IndexSet<ModuleId>> {
    let mut emission: IndexSet<ModuleId> = IndexSet::new();
    emission.insert(entry.entry_module);
    emission.extend(entry.reachable.iter().copied());

    for binding in bindings {
        let defining =
            resolve_defining_module(graph, entry.entry_module, &binding.source_export_name)?;
        if emission.insert(defining) {
            trace!(
                "export `{}` pulled module #{} into the emission set",
                binding.export_name,
                defining.as_u32()
            );
        }
    }

    debug!("emission set holds {} module(s)", emission.len());
    Ok(emission)
}

/// Trace re-export chains until the module that actually provides the value
fn resolve_defining_module(
    graph: &dyn ModuleGraph,
    start: ModuleId,
    export_name: &str,
) -> Result<ModuleId> {
    let mut module = start;
    let mut name = export_name.to_owned();
    let mut visited: FxHashSet<(ModuleId, String)> = FxHashSet::default();

    loop {
        if !visited.insert((module, name.clone())) {
            // A cycle in re-export metadata can never terminate at a
            // provider.
            return Err(BundleError::DefiningModuleResolution {
                export_name: export_name.to_owned(),
            });
        }

        let info = graph.exports_info(module);
        let Some(export) = info.get(&name) else {
            return Err(BundleError::DefiningModuleResolution {
                export_name: export_name.to_owned(),
            });
        };

        if export.provided {
            return Ok(module);
        }
        match &export.target {
            Some(target) => {
                if let Some(next_name) = &target.export_name {
                    name = next_name.clone();
                }
                module = target.module;
            }
            None => {
                return Err(BundleError::DefiningModuleResolution {
                    export_name: export_name.to_owned(),
                });
            }
        }
    }
}
