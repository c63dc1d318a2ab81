//! Long-running Node.js server target.

use cirrus_bundler::{DeploymentTarget, RuntimeEnvironment};

/// Plain Node.js server
///
/// Built-ins stay external and server chunks are written next to the bundle.
pub struct NodeServerTarget;

impl DeploymentTarget for NodeServerTarget {
    fn name(&self) -> &'static str {
        "node"
    }

    fn runtime(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::Node
    }
}
