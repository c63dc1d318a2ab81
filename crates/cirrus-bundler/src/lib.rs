#![cfg_attr(docsrs, feature(doc_cfg))]

//! # cirrus-bundler
//!
//! Synthesizes the build configuration for packaging a server-rendering
//! application into one deployable bundle.
//!
//! The bundling engine is external. This crate decides everything the engine
//! needs up front: which module references are aliased to mocks, polyfills or
//! pinned copies, which are left to the host runtime, the virtual middleware
//! module, compile-time constants, and the stage order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cirrus_bundler::ConfigAssembler;
//! use cirrus_config::ApplicationDescription;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let desc = ApplicationDescription::new(".nuxt/dist/server/server.js")
//!     .with_native_runtime(false)
//!     .with_middleware("/api", "./server/api.js");
//!
//! let config = ConfigAssembler::new("node_modules/@cirrus/runtime").assemble(&desc)?;
//! assert!(config.external().is_empty());
//! std::fs::write("build.json", config.to_json()?)?;
//! # Ok(()) }
//! ```

pub mod alias;
pub mod assembler;
pub mod catalogue;
pub mod middleware;
pub mod pipeline;
pub mod replace;
pub mod resolver;
pub mod target;

pub use alias::{AliasLayer, AliasLayerKind, AliasResolver, AliasTarget, ResolvedAliases};
pub use assembler::{BuildConfiguration, ConfigAssembler, ModuleFormat, OutputDescriptor};
pub use middleware::{IdentifierHasher, MIDDLEWARE_MODULE_ID, MiddlewareModuleSynthesizer, Sha512Hasher};
pub use pipeline::{DynamicRequireMode, Pipeline, PipelineAssembler, Stage, StagePhase};
pub use replace::ReplacementTable;
pub use resolver::{ModuleResolver, NodeModuleResolver, ResolveError};
pub use target::{DeploymentTarget, NativeModules, RuntimeEnvironment};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for cirrus-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selected renderer has no implementation in the runtime directory.
    #[error("Renderer not found: {renderer}")]
    RendererNotFound {
        renderer: String,
        #[source]
        source: ResolveError,
    },

    /// A polyfill, pinned dependency or runtime file is missing.
    #[error("Required dependency not found: {}", source.specifier)]
    DependencyNotFound {
        #[source]
        source: ResolveError,
    },

    /// Stage list violates the ordering invariants.
    #[error("Invalid pipeline: {message}")]
    InvalidPipeline { message: String },

    /// The application description is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] cirrus_config::ConfigError),

    /// The configuration could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result type alias for cirrus-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::RendererNotFound { .. } => "RENDERER_NOT_FOUND",
            Error::DependencyNotFound { .. } => "DEPENDENCY_NOT_FOUND",
            Error::InvalidPipeline { .. } => "INVALID_PIPELINE",
            Error::Config(_) => "INVALID_CONFIG",
            Error::Serialize(_) => "SERIALIZE_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::RendererNotFound { renderer, source } => Some(Box::new(format!(
                "No '{}' renderer implementation under {}.\nSupported renderers: {}",
                renderer,
                source.base_dir.display(),
                cirrus_config::Renderer::ALL
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
            Error::DependencyNotFound { source } => Some(Box::new(format!(
                "Install '{}' so it resolves from {}.\nReason: {}",
                source.specifier,
                source.base_dir.display(),
                source.reason
            ))),
            Error::Config(err) => Some(Box::new(format!(
                "Check your configuration file for invalid values.\nError: {}",
                err
            ))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;
    use std::path::PathBuf;

    fn resolve_error(specifier: &str) -> ResolveError {
        ResolveError {
            specifier: specifier.to_string(),
            base_dir: PathBuf::from("/runtime"),
            reason: "not found".to_string(),
        }
    }

    #[test]
    fn diagnostic_codes() {
        let err = Error::RendererNotFound {
            renderer: "vue3".to_string(),
            source: resolve_error("/runtime/ssr/vue3"),
        };
        assert_eq!(err.code().unwrap().to_string(), "RENDERER_NOT_FOUND");
        assert!(err.help().unwrap().to_string().contains("vue2, vue2.basic, vue3"));

        let err = Error::DependencyNotFound {
            source: resolve_error("buffer/index.js"),
        };
        assert_eq!(err.to_string(), "Required dependency not found: buffer/index.js");
        assert!(err.help().unwrap().to_string().contains("Install 'buffer/index.js'"));
    }
}
