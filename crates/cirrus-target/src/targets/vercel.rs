//! Vercel Node.js deployment target.

use cirrus_bundler::{DeploymentTarget, NativeModules, RuntimeEnvironment};

/// Vercel Node.js deployment target
///
/// This target configures builds for Vercel's Node.js runtime:
/// - Externalizes Node.js built-ins
/// - Inlines server chunks, since a function is deployed as a single file
pub struct VercelNodeTarget;

impl DeploymentTarget for VercelNodeTarget {
    fn name(&self) -> &'static str {
        "vercel-node"
    }

    fn runtime(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::Node
    }

    fn native_modules(&self) -> NativeModules {
        NativeModules::External
    }

    fn inline_chunks(&self) -> bool {
        true
    }
}
