//! File-based config discovery and layered loading
//!
//! Precedence, lowest to highest: built-in defaults, the discovered config
//! file, `CIRRUS_`-prefixed environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde_json::Value;

use crate::description::ApplicationDescription;
use crate::error::{ConfigError, Result};
use crate::renderer::Renderer;

/// Environment variable prefix; nested keys are separated by `__`
/// (`CIRRUS_STATIC_ASSETS__VERSION`).
pub const ENV_PREFIX: &str = "CIRRUS_";

/// A config file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Toml(PathBuf),
    Json(PathBuf),
    /// `package.json` carrying a `cirrus` field
    PackageJson(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Toml(path) | ConfigSource::Json(path) | ConfigSource::PackageJson(path) => {
                path
            }
        }
    }

    /// Classify an explicit config path by its file name
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return Ok(ConfigSource::PackageJson(path));
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigSource::Toml(path)),
            Some("json") => Ok(ConfigSource::Json(path)),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use cirrus_config::ConfigDiscovery;
///
/// let desc = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. cirrus.toml
    /// 2. cirrus.json
    /// 3. package.json (cirrus field)
    pub fn find(&self) -> Option<ConfigSource> {
        let toml_path = self.root.join("cirrus.toml");
        if toml_path.exists() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let json_path = self.root.join("cirrus.json");
        if json_path.exists() {
            return Some(ConfigSource::Json(json_path));
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed = serde_json::from_str::<Value>(&content).ok()?;
        match parsed.get("cirrus") {
            Some(field) if !field.is_null() => Some(ConfigSource::PackageJson(pkg_path)),
            _ => None,
        }
    }

    /// Load the description from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ApplicationDescription> {
        let source = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&source)
    }

    /// Load the description from defaults and environment only
    pub fn load_or_default(&self) -> Result<ApplicationDescription> {
        match self.find() {
            Some(source) => self.load_from(&source),
            None => extract(self.base_figment()),
        }
    }

    /// Load the description from a specific source
    pub fn load_from(&self, source: &ConfigSource) -> Result<ApplicationDescription> {
        tracing::debug!("Loading application description from {}", source.path().display());

        let figment = Figment::new().merge(Serialized::defaults(self.defaults()));
        let figment = match source {
            ConfigSource::Toml(path) => figment.merge(Toml::file(path)),
            ConfigSource::Json(path) => figment.merge(Json::file(path)),
            ConfigSource::PackageJson(path) => {
                figment.merge(Serialized::defaults(read_package_field(path)?))
            }
        };

        extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn base_figment(&self) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(self.defaults()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn defaults(&self) -> ApplicationDescription {
        ApplicationDescription {
            root_dir: self.root.clone(),
            ..ApplicationDescription::default()
        }
    }
}

fn read_package_field(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {e}")),
    })?;

    match parsed.get("cirrus") {
        Some(value) if !value.is_null() => Ok(value.clone()),
        Some(_) => Err(ConfigError::InvalidValue {
            field: "cirrus".to_string(),
            hint: Some("The 'cirrus' field cannot be null".to_string()),
        }),
        None => Err(ConfigError::InvalidValue {
            field: "cirrus".to_string(),
            hint: Some("Add a 'cirrus' field to your package.json".to_string()),
        }),
    }
}

fn extract(figment: Figment) -> Result<ApplicationDescription> {
    // surface a bad selector as its own error rather than a generic value error
    if let Ok(selector) = figment.extract_inner::<String>("renderer") {
        selector.parse::<Renderer>()?;
    }

    figment.extract().map_err(|e| {
        let field = if e.path.is_empty() {
            "configuration".to_string()
        } else {
            e.path.join(".")
        };
        ConfigError::InvalidValue {
            field,
            hint: Some(e.to_string()),
        }
    })
}

/// Discover and load config from the current directory
pub fn discover() -> Result<ApplicationDescription> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}
