//! # cirrus-config
//!
//! The declarative application description consumed by the Cirrus
//! configuration assembler, plus discovery, layered loading and validation
//! of config files.

pub mod description;
pub mod discovery;
pub mod error;
mod helpers;
pub mod renderer;
pub mod validation;

pub use description::{ApplicationDescription, MiddlewareBinding, StaticAssets};
pub use discovery::{ConfigDiscovery, ConfigSource, discover};
pub use error::{ConfigError, Result};
pub use renderer::Renderer;
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
