//! # cirrus-target
//!
//! Deployment target presets for Cirrus.
//!
//! A target fixes what a description would otherwise spell out by hand: the
//! native runtime capability and whether server chunks must be inlined.

pub mod detection;
pub mod targets;

pub use cirrus_bundler::{DeploymentTarget, NativeModules, RuntimeEnvironment};
pub use detection::detect_target;
pub use targets::*;

/// Error types for target lookup
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TargetError {
    #[error("Unknown deployment target: {name}")]
    #[diagnostic(code(UNKNOWN_TARGET), help("Available targets: {available}"))]
    Unknown { name: String, available: String },
}

/// Result type alias for target lookup
pub type Result<T> = std::result::Result<T, TargetError>;

/// Names of the built-in targets
pub const TARGET_NAMES: &[&str] = &["node", "vercel-node", "cloudflare-workers"];

/// Look up a built-in target by its name
pub fn target_by_name(name: &str) -> Result<Box<dyn DeploymentTarget>> {
    match name {
        "node" => Ok(Box::new(NodeServerTarget)),
        "vercel-node" => Ok(Box::new(VercelNodeTarget)),
        "cloudflare-workers" => Ok(Box::new(CloudflareWorkersTarget)),
        other => Err(TargetError::Unknown {
            name: other.to_string(),
            available: TARGET_NAMES.join(", "),
        }),
    }
}
