//! Cloudflare Workers deployment target.

use cirrus_bundler::{DeploymentTarget, NativeModules, RuntimeEnvironment};

/// Cloudflare Workers deployment target
///
/// Workers run in a V8 isolate without Node.js built-ins, so every
/// capability-sensitive module is routed through the alias table.
pub struct CloudflareWorkersTarget;

impl DeploymentTarget for CloudflareWorkersTarget {
    fn name(&self) -> &'static str {
        "cloudflare-workers"
    }

    fn runtime(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::EdgeWorker
    }

    fn native_modules(&self) -> NativeModules {
        NativeModules::Aliased
    }
}
