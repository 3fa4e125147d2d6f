//! gasket: flattens a resolved module graph into a single namespaced script
//!
//! The upstream bundler resolves, transpiles, and tree-shakes a multi-module
//! program; gasket takes the resulting graph snapshot and emits one top-level
//! script that binds every exported symbol onto an explicit global namespace
//! path. The target runtimes have no module system, so all loader-runtime
//! artifacts are neutralized along the way.
//!
//! The pipeline is a single linear pass per emission:
//! entrypoint resolution → invariant guard → export surface resolution →
//! reachability collection → source sanitization → assembly.

pub mod assembler;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod exports;
pub mod invariants;
pub mod module_graph;
pub mod orchestrator;
pub mod reachability;
pub mod sanitizer;

pub use config::{BuildMode, Config, LogLevel, init_logging};
pub use entrypoint::ResolvedEntrypoint;
pub use error::{BundleError, Result};
pub use exports::{DEFAULT_EXPORT_LOCAL, ExportBinding};
pub use module_graph::{
    ChunkId, ContextToken, EntryPoint, ExportInfo, ExportTarget, ExportsInfo, ModuleGraph,
    ModuleId, memory::MemoryGraph,
};
pub use orchestrator::{Artifact, Flattener, flatten};
