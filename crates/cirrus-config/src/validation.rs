//! Pluggable description validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).

use std::path::{Path, PathBuf};

use crate::description::ApplicationDescription;
use crate::error::{ConfigError, Result};

/// Trait for pluggable validation strategies
pub trait ConfigValidator {
    fn validate(&self, desc: &ApplicationDescription) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use cirrus_config::{ApplicationDescription, ConfigValidator, SchemaValidator};
///
/// let desc = ApplicationDescription::new("server/index.js").with_middleware("/api", "./api.js");
/// SchemaValidator.validate(&desc).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, desc: &ApplicationDescription) -> Result<()> {
        if desc.entry.as_os_str().is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "entry cannot be empty".to_string(),
                hint: Some("Point 'entry' at the server entry module".to_string()),
            });
        }

        let out_name = desc.out_name.trim();
        if out_name.is_empty() || out_name.contains(['/', '\\']) {
            return Err(ConfigError::SchemaValidation {
                message: format!("out_name '{}' must be a plain file name", desc.out_name),
                hint: Some("Use 'target_dir' to choose the output directory".to_string()),
            });
        }

        for (index, binding) in desc.server_middleware.iter().enumerate() {
            if binding.handle.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: format!("server_middleware[{index}] has an empty handle"),
                    hint: Some("Each middleware needs a module specifier".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Checks that the entry module and relative middleware handlers exist on disk.
/// Bare package specifiers are left to module resolution.
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, desc: &ApplicationDescription) -> Result<()> {
        SchemaValidator.validate(desc)?;

        let entry = self.root.join(&desc.entry);
        if !entry.exists() {
            return Err(ConfigError::EntryNotFound { path: entry });
        }

        for binding in &desc.server_middleware {
            if !is_relative_specifier(&binding.handle) {
                continue;
            }
            let path = self.root.join(&binding.handle);
            if !path.exists() {
                return Err(ConfigError::HandlerNotFound { path });
            }
        }

        Ok(())
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Convenience function for schema-only validation
pub fn validate_schema(desc: &ApplicationDescription) -> Result<()> {
    SchemaValidator.validate(desc)
}

/// Convenience function for filesystem validation
pub fn validate_fs(desc: &ApplicationDescription, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn schema_validator_accepts_defaults() {
        assert!(SchemaValidator.validate(&ApplicationDescription::default()).is_ok());
    }

    #[test]
    fn schema_validator_rejects_empty_entry() {
        let desc = ApplicationDescription::new("");
        assert!(matches!(
            SchemaValidator.validate(&desc),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn schema_validator_rejects_nested_out_name() {
        let desc = ApplicationDescription {
            out_name: "dist/server.js".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SchemaValidator.validate(&desc),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn schema_validator_rejects_empty_handle() {
        let desc = ApplicationDescription::default().with_middleware("/api", "  ");
        assert!(matches!(
            SchemaValidator.validate(&desc),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn schema_validator_accepts_any_route_string() {
        let desc = ApplicationDescription::default()
            .with_middleware("/a\nb", "./a.js")
            .with_middleware("", "./b.js");
        assert!(SchemaValidator.validate(&desc).is_ok());
    }

    #[test]
    fn fs_validator_reports_missing_entry() {
        let dir = TempDir::new().unwrap();
        let desc = ApplicationDescription::new("server.js");
        match validate_fs(&desc, dir.path()) {
            Err(ConfigError::EntryNotFound { path }) => {
                assert_eq!(path, dir.path().join("server.js"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fs_validator_checks_only_relative_handlers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("server.js"), "").unwrap();
        fs::write(dir.path().join("a.js"), "").unwrap();

        let desc = ApplicationDescription::new("server.js")
            .with_middleware("/a", "./a.js")
            .with_middleware("/health", "health-check-middleware");
        assert!(validate_fs(&desc, dir.path()).is_ok());

        let desc = desc.with_middleware("/b", "./b.js");
        assert!(matches!(
            validate_fs(&desc, dir.path()),
            Err(ConfigError::HandlerNotFound { .. })
        ));
    }
}
