//! Construction-time configuration for the flattening pipeline
//!
//! Configuration is validated once, before any graph access, and is
//! immutable afterwards; re-runs in a watch loop share it without any
//! cross-run mutable state.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{BundleError, Result};

/// Namespace segments must survive as property names in emitted code
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Which artifact shape to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// A bare server-side script file
    #[default]
    ServerScript,
    /// An HTML wrapper with the script inlined for browser-hosted builds
    WebApp,
}

impl BuildMode {
    /// Extension of the emitted artifact
    pub fn artifact_extension(self) -> &'static str {
        match self {
            Self::ServerScript => "gs",
            Self::WebApp => "html",
        }
    }
}

/// Pipeline log verbosity, mapped onto the `log` facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Process-wide emission configuration, supplied once at construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// First segment(s) of the global namespace path
    pub namespace_root: String,
    /// Trailing segment(s) of the global namespace path
    pub subsystem: String,
    pub build_mode: BuildMode,
    /// Namespace-facing name for the entry module's default export
    pub default_export_name: Option<String>,
    pub log_level: Option<LogLevel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace_root: "DEFAULT".to_owned(),
            subsystem: "DEFAULT".to_owned(),
            build_mode: BuildMode::default(),
            default_export_name: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Parse and validate a TOML fragment supplied by the host
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|error| BundleError::Configuration(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject invalid namespace and override values before any graph work
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("namespace-root", &self.namespace_root),
            ("subsystem", &self.subsystem),
        ] {
            if value.is_empty() {
                return Err(BundleError::Configuration(format!(
                    "{field} must not be empty"
                )));
            }
            for segment in value.split('.') {
                if !IDENTIFIER_RE.is_match(segment) {
                    return Err(BundleError::Configuration(format!(
                        "{field} segment `{segment}` is not a valid identifier"
                    )));
                }
            }
        }
        if let Some(name) = &self.default_export_name
            && !IDENTIFIER_RE.is_match(name)
        {
            return Err(BundleError::Configuration(format!(
                "default-export-name `{name}` is not a valid identifier"
            )));
        }
        Ok(())
    }

    /// The full dotted namespace path, e.g. `MYADDON.GAS`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.namespace_root, self.subsystem)
    }

    /// Namespace path split into its dot-separated segments
    pub fn namespace_segments(&self) -> Vec<&str> {
        self.namespace_root
            .split('.')
            .chain(self.subsystem.split('.'))
            .collect()
    }
}

/// One-call logging setup honoring the configured verbosity
///
/// Safe to call once per process; later calls are no-ops so watch-mode
/// re-runs never panic on double initialization.
pub fn init_logging(level: Option<LogLevel>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    let _ = builder.try_init();
}
