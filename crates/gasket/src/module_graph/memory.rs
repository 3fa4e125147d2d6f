//! In-memory reference implementation of [`ModuleGraph`]
//!
//! Hosts that precompute their graph into plain data can hand it to the
//! pipeline through this adapter; the conformance suite drives the pipeline
//! through it as well.

use std::path::PathBuf;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use super::{
    ChunkId, ContextToken, EntryPoint, ExportsInfo, ModuleGraph, ModuleId,
};

type FxIndexMap<K, V> = IndexMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

#[derive(Debug, Default)]
struct MemoryModule {
    resource_path: Option<PathBuf>,
    /// Fallback source returned for any context token
    default_source: Option<String>,
    /// Context-specific variants, consulted before the fallback
    context_sources: Vec<(ContextToken, String)>,
    exports: ExportsInfo,
}

#[derive(Debug, Default)]
struct MemoryChunk {
    modules: Vec<ModuleId>,
    entry_modules: Vec<ModuleId>,
}

/// Programmable in-memory module graph
#[derive(Debug, Default)]
pub struct MemoryGraph {
    modules: FxIndexMap<ModuleId, MemoryModule>,
    chunks: FxIndexMap<ChunkId, MemoryChunk>,
    entrypoints: Vec<EntryPoint>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; `source` becomes the variant returned for every
    /// context token unless a context-specific one is set later
    pub fn add_module(
        &mut self,
        resource_path: Option<impl Into<PathBuf>>,
        source: Option<&str>,
    ) -> ModuleId {
        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.insert(
            id,
            MemoryModule {
                resource_path: resource_path.map(Into::into),
                default_source: source.map(str::to_owned),
                context_sources: Vec::new(),
                exports: ExportsInfo::default(),
            },
        );
        id
    }

    /// Replace a module's export metadata
    pub fn set_exports(&mut self, module: ModuleId, exports: ExportsInfo) {
        if let Some(entry) = self.modules.get_mut(&module) {
            entry.exports = exports;
        }
    }

    /// Register a context-specific generated-source variant
    pub fn set_source_for(&mut self, module: ModuleId, context: ContextToken, source: &str) {
        if let Some(entry) = self.modules.get_mut(&module) {
            entry.context_sources.push((context, source.to_owned()));
        }
    }

    /// Register a chunk with its reachable modules and entry-module subset
    pub fn add_chunk(&mut self, modules: Vec<ModuleId>, entry_modules: Vec<ModuleId>) -> ChunkId {
        let id = ChunkId::new(self.chunks.len() as u32);
        self.chunks.insert(
            id,
            MemoryChunk {
                modules,
                entry_modules,
            },
        );
        id
    }

    /// Declare an entry point over previously registered chunks
    pub fn add_entrypoint(&mut self, name: &str, chunks: Vec<ChunkId>, context: ContextToken) {
        self.entrypoints.push(EntryPoint {
            name: name.to_owned(),
            chunks,
            context,
        });
    }
}

impl ModuleGraph for MemoryGraph {
    fn entrypoints(&self) -> Vec<EntryPoint> {
        self.entrypoints.clone()
    }

    fn chunk_modules(&self, chunk: ChunkId) -> Vec<ModuleId> {
        self.chunks
            .get(&chunk)
            .map(|entry| entry.modules.clone())
            .unwrap_or_default()
    }

    fn chunk_entry_modules(&self, chunk: ChunkId) -> Vec<ModuleId> {
        self.chunks
            .get(&chunk)
            .map(|entry| entry.entry_modules.clone())
            .unwrap_or_default()
    }

    fn exports_info(&self, module: ModuleId) -> ExportsInfo {
        self.modules
            .get(&module)
            .map(|entry| entry.exports.clone())
            .unwrap_or_default()
    }

    fn generated_source(&self, module: ModuleId, context: &ContextToken) -> Option<String> {
        let entry = self.modules.get(&module)?;
        entry
            .context_sources
            .iter()
            .find(|(token, _)| token == context)
            .map(|(_, source)| source.clone())
            .or_else(|| entry.default_source.clone())
    }

    fn resource_path(&self, module: ModuleId) -> Option<PathBuf> {
        self.modules
            .get(&module)
            .and_then(|entry| entry.resource_path.clone())
    }
}
