//! Diagnostic kinds raised by the flattening pipeline
//!
//! Every variant is fatal for the emission that raised it: the transform is
//! deterministic, so nothing is retried and no artifact is written. Messages
//! are written for the person who has to fix the build configuration.

/// Convenience alias used throughout the pipeline
pub type Result<T, E = BundleError> = std::result::Result<T, E>;

/// Fatal diagnostics for a single emission run
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// Invalid construction-time configuration, raised before any graph work
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// No entry point surfaced a source module
    #[error(
        "no entry point resolved to a source module; declare exactly one entry whose module is a \
         source file"
    )]
    NoEntrypointFound,

    /// More than one entry point surfaced a source module
    #[error(
        "expected exactly one entry point but found {0:?}; keep a single entry in the build \
         configuration"
    )]
    EntrypointCardinality(Vec<String>),

    /// `export *` anywhere reachable, or the graph reports a
    /// non-enumerable export surface
    #[error(
        "wildcard re-export (`export *`) found in {module}; its export surface cannot be \
         enumerated statically, re-export each symbol by name instead"
    )]
    UnsupportedWildcardReexport { module: String },

    /// `export { x as y } from ...` in the entry module
    #[error(
        "aliased re-export `export {{ {original} as {alias} }}` in entry module {module}; the \
         alias has no runtime identifier after bundling, define a local wrapper named `{alias}` \
         instead"
    )]
    UnsupportedAliasedReexport {
        module: String,
        original: String,
        alias: String,
    },

    /// The entry module resolved to an empty binding list
    #[error(
        "entry module of `{entry}` exports no symbols; export at least one function to attach to \
         the namespace"
    )]
    NoExportedSymbols { entry: String },

    /// Export metadata reached a dead end: no re-export target and not
    /// provided locally
    #[error(
        "export metadata for `{export_name}` is inconsistent: no re-export target and no local \
         provider; the host graph supplied an invalid snapshot"
    )]
    DefiningModuleResolution { export_name: String },

    /// A bound export has no definition in the concatenated source
    #[error(
        "exported symbol `{local_name}` has no function, class, or variable definition in the \
         emitted source; anchor its defining module with a side-effect import (e.g. `import \
         \"./module\";`)"
    )]
    MissingRuntimeDefinition { local_name: String },

    /// A forbidden substring survived into the assembled artifact
    #[error(
        "forbidden pattern `{pattern}` leaked into the assembled artifact; sanitization should \
         have neutralized it"
    )]
    LeakedPattern { pattern: String },
}
