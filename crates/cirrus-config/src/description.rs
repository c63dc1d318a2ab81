//! The application description: everything the assembler needs to know
//! about one server bundle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::helpers::{
    default_build_dir, default_entry, default_out_name, default_public_path, default_root_dir,
    default_router_base, default_target_dir, default_true,
};
use crate::renderer::Renderer;

/// A request handler mounted on a route
///
/// Neither field has to be unique across a description. Route matching is
/// first-match-wins at runtime, so the list order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareBinding {
    /// Route prefix the handler is mounted on
    pub route: String,

    /// Module specifier whose default export is the handler
    pub handle: String,
}

impl MiddlewareBinding {
    pub fn new(route: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            handle: handle.into(),
        }
    }
}

/// Static asset settings exposed to the runtime as build-time constants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAssets {
    #[serde(default)]
    pub base: String,

    #[serde(default)]
    pub version: String,
}

/// Declarative description of a server application to bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDescription {
    /// Project root, used as the base for dependency resolution
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Framework build directory (contains `dist/server`)
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Entry module, relative to `root_dir` unless absolute
    #[serde(default = "default_entry")]
    pub entry: PathBuf,

    /// Directory the bundle is written to
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// File name of the bundle inside `target_dir`
    #[serde(default = "default_out_name")]
    pub out_name: String,

    /// Whether the deployment target provides native platform modules
    ///
    /// `false` means a sandboxed runtime: built-ins are mocked or polyfilled
    /// instead of left external.
    #[serde(default = "default_true")]
    pub has_native_runtime: bool,

    /// Server renderer implementation
    #[serde(default)]
    pub renderer: Renderer,

    /// Middleware bindings, in routing order
    #[serde(default)]
    pub server_middleware: Vec<MiddlewareBinding>,

    #[serde(default)]
    pub static_assets: StaticAssets,

    /// Embed dynamically required chunks instead of writing them next to the bundle
    #[serde(default)]
    pub inline_chunks: bool,

    #[serde(default)]
    pub full_static: bool,

    #[serde(default = "default_true")]
    pub minify: bool,

    /// Emit a bundle size report
    #[serde(default)]
    pub analyze: bool,

    /// Log the cold start duration when the bundle finishes loading
    #[serde(default)]
    pub log_startup: bool,

    #[serde(default = "default_router_base")]
    pub router_base: String,

    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for ApplicationDescription {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            build_dir: default_build_dir(),
            entry: default_entry(),
            target_dir: default_target_dir(),
            out_name: default_out_name(),
            has_native_runtime: true,
            renderer: Renderer::default(),
            server_middleware: Vec::new(),
            static_assets: StaticAssets::default(),
            inline_chunks: false,
            full_static: false,
            minify: true,
            analyze: false,
            log_startup: false,
            router_base: default_router_base(),
            public_path: default_public_path(),
        }
    }
}

impl ApplicationDescription {
    /// Create a description for the given entry module with default settings
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            ..Self::default()
        }
    }

    /// Create from serde_json::Value (for programmatic config from DB/API)
    ///
    /// # Example
    ///
    /// ```
    /// use cirrus_config::{ApplicationDescription, Renderer};
    /// use serde_json::json;
    ///
    /// let desc = ApplicationDescription::from_value(json!({
    ///     "entry": "server/index.js",
    ///     "renderer": "vue3",
    ///     "has_native_runtime": false
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(desc.renderer, Renderer::Vue3);
    /// assert!(!desc.has_native_runtime);
    /// assert_eq!(desc.out_name, "server.js");
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "description".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "description".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Load the description for a project root
    ///
    /// Layers defaults, the discovered config file (if any) and `CIRRUS_`
    /// environment variables.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        crate::discovery::ConfigDiscovery::new(root).load_or_default()
    }

    /// Append a middleware binding
    pub fn with_middleware(mut self, route: impl Into<String>, handle: impl Into<String>) -> Self {
        self.server_middleware
            .push(MiddlewareBinding::new(route, handle));
        self
    }

    /// Set the runtime capability flag
    pub fn with_native_runtime(mut self, has_native_runtime: bool) -> Self {
        self.has_native_runtime = has_native_runtime;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Entry module resolved against `root_dir`
    pub fn entry_path(&self) -> PathBuf {
        resolve_against(&self.root_dir, &self.entry)
    }

    /// Full path of the output bundle
    pub fn out_file(&self) -> PathBuf {
        resolve_against(&self.root_dir, &self.target_dir).join(&self.out_name)
    }

    /// Build directory resolved against `root_dir`
    pub fn build_path(&self) -> PathBuf {
        resolve_against(&self.root_dir, &self.build_dir)
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
