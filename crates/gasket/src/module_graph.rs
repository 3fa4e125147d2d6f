//! Read-only view over the host-supplied dependency graph
//!
//! The upstream bundler owns module resolution, transpilation, and dead-code
//! elimination; this module defines the seam through which the flattening
//! pipeline observes the result. All host-specific adaptation (duck-typed
//! chunk accessors, optional resource paths, per-context code variants)
//! lives behind the [`ModuleGraph`] trait, so upstream API churn never
//! reaches the pipeline stages.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

pub mod memory;

/// File extensions treated as source-language modules when selecting an
/// entry module or scanning sources on disk.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "jsx", "mjs"];

/// Unique identifier for a module within one graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value of the ModuleId
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Unique identifier for a host chunk within one graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(u32);

impl ChunkId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Key selecting which generated-code variant of a module to read
///
/// Hosts that emit multiple variants of the same module key them by an
/// opaque token. Only membership is meaningful; no ordering is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ContextToken {
    /// The host produced a single unkeyed variant
    #[default]
    Absent,
    Single(String),
    Set(BTreeSet<String>),
}

impl ContextToken {
    /// Build a set-shaped token from any iterator of names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(names.into_iter().map(Into::into).collect())
    }

    /// Membership test, the only query the token supports
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Absent => false,
            Self::Single(single) => single == name,
            Self::Set(set) => set.contains(name),
        }
    }
}

/// Re-export target of an export binding: the `(module, exportName)` pair
/// the binding resolves to one hop away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub module: ModuleId,
    /// Name on the target module; `None` means the name is unchanged
    pub export_name: Option<String>,
}

/// Per-name export metadata on a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    pub name: String,
    /// Whether the module itself provides the runtime value
    pub provided: bool,
    /// One-hop re-export target, if this binding forwards elsewhere
    pub target: Option<ExportTarget>,
}

impl ExportInfo {
    /// A locally provided export
    pub fn local(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            provided: true,
            target: None,
        }
    }

    /// A re-export forwarding to `module`; `target_name` overrides the
    /// exported name on the target when it differs
    pub fn reexport(name: &str, module: ModuleId, target_name: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            provided: false,
            target: Some(ExportTarget {
                module,
                export_name: target_name.map(str::to_owned),
            }),
        }
    }
}

/// Ordered export surface of a module
#[derive(Debug, Clone, Default)]
pub struct ExportsInfo {
    /// Exports in the host's declaration order
    pub exports: Vec<ExportInfo>,
    /// True when the surface is not statically enumerable (wildcard case)
    pub other_exports_provided: bool,
}

impl ExportsInfo {
    pub fn named(exports: Vec<ExportInfo>) -> Self {
        Self {
            exports,
            other_exports_provided: false,
        }
    }

    /// Look up a single export by name
    pub fn get(&self, name: &str) -> Option<&ExportInfo> {
        self.exports.iter().find(|export| export.name == name)
    }
}

/// A declared entry point: logical name plus the chunks it spans and the
/// execution-context token its generated code is keyed by
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub name: String,
    pub chunks: Vec<ChunkId>,
    pub context: ContextToken,
}

/// Read-only snapshot of the host dependency graph for one emission run
///
/// Implementations must be cheap to query repeatedly; the pipeline holds the
/// borrow only for the duration of a single run and never retains it.
pub trait ModuleGraph {
    /// Declared entry points, in host declaration order
    fn entrypoints(&self) -> Vec<EntryPoint>;

    /// Modules reachable from a chunk, in host iteration order
    fn chunk_modules(&self, chunk: ChunkId) -> Vec<ModuleId>;

    /// The subset of a chunk's modules the host considers its own entry
    /// module(s)
    fn chunk_entry_modules(&self, chunk: ChunkId) -> Vec<ModuleId>;

    /// Export metadata for a module
    fn exports_info(&self, module: ModuleId) -> ExportsInfo;

    /// Post-transpilation, pre-bundling source text for a context token;
    /// `None` when the host elided the module
    fn generated_source(&self, module: ModuleId, context: &ContextToken) -> Option<String>;

    /// On-disk path backing the module, when one exists
    fn resource_path(&self, module: ModuleId) -> Option<PathBuf>;
}

/// Whether a path carries a source-language extension
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| SOURCE_EXTENSIONS.contains(&extension))
}

/// Human-readable label for a module, preferring its resource path
pub(crate) fn module_label(graph: &dyn ModuleGraph, module: ModuleId) -> String {
    graph
        .resource_path(module)
        .map_or_else(|| format!("module #{}", module.as_u32()), |path| path.display().to_string())
}
