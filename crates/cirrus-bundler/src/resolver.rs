//! Module resolution collaborator.
//!
//! The assembler needs physical paths for polyfills, pinned dependencies and
//! runtime files. Resolution goes through [`ModuleResolver`] so the lookup
//! strategy can be swapped (tests, virtual filesystems).

use std::path::{Path, PathBuf};

/// File extensions tried during resolution, in order
pub const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".mjs", ".js", ".json", ".node"];

/// A module reference that could not be resolved to a file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot resolve '{specifier}' from {}: {reason}", base_dir.display())]
pub struct ResolveError {
    pub specifier: String,
    pub base_dir: PathBuf,
    pub reason: String,
}

/// Resolves a module reference to an absolute physical path
///
/// Implementations must be deterministic and read-only: the same
/// `(specifier, base_dir)` pair always yields the same result.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf, ResolveError>;
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for &R {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf, ResolveError> {
        (**self).resolve(specifier, base_dir)
    }
}

/// Node-style resolver backed by `oxc_resolver`
///
/// Follows CommonJS `require.resolve` semantics: `node`/`require` export
/// conditions and the `main` field only.
pub struct NodeModuleResolver {
    resolver: oxc_resolver::Resolver,
}

impl NodeModuleResolver {
    pub fn new() -> Self {
        let resolver = oxc_resolver::Resolver::new(oxc_resolver::ResolveOptions {
            condition_names: vec!["node".into(), "require".into(), "default".into()],
            extensions: RESOLVE_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            main_fields: vec!["main".into()],
            ..Default::default()
        });

        Self { resolver }
    }
}

impl Default for NodeModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeModuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeModuleResolver").finish_non_exhaustive()
    }
}

impl ModuleResolver for NodeModuleResolver {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf, ResolveError> {
        self.resolver
            .resolve(base_dir, specifier)
            .map(|res| res.path().to_path_buf())
            .map_err(|e| ResolveError {
                specifier: specifier.to_string(),
                base_dir: base_dir.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
