//! Auto-detection of deployment targets from project files.

use crate::targets::{CloudflareWorkersTarget, NodeServerTarget, VercelNodeTarget};
use cirrus_bundler::DeploymentTarget;
use std::path::Path;

/// Detect deployment target from project files
///
/// Checks for common deployment configuration files:
/// - `vercel.json` or `.vercel/` → VercelNodeTarget
/// - `wrangler.toml` or `_routes.json` → CloudflareWorkersTarget
/// - Otherwise → NodeServerTarget (default)
pub fn detect_target(project_root: &Path) -> Box<dyn DeploymentTarget> {
    let target: Box<dyn DeploymentTarget> =
        if project_root.join("vercel.json").exists() || project_root.join(".vercel").exists() {
            Box::new(VercelNodeTarget)
        } else if project_root.join("wrangler.toml").exists()
            || project_root.join("_routes.json").exists()
        {
            Box::new(CloudflareWorkersTarget)
        } else {
            Box::new(NodeServerTarget)
        };

    tracing::debug!(
        "detected deployment target {} for {}",
        target.name(),
        project_root.display()
    );
    target
}
