//! Deployment target types.
//!
//! This module defines the core types for deployment targets:
//! - `RuntimeEnvironment`: Where the bundle will execute
//! - `NativeModules`: How native platform modules are satisfied
//! - `DeploymentTarget`: Trait for deployment target adapters

use cirrus_config::ApplicationDescription;

/// Environment where the bundle will execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Node.js (full APIs)
    Node,
    /// V8 isolate (Cloudflare Workers, Deno Deploy)
    EdgeWorker,
}

impl RuntimeEnvironment {
    /// Whether native platform modules are available at load time
    #[inline]
    pub fn has_native_modules(&self) -> bool {
        matches!(self, Self::Node)
    }
}

/// What to do with native platform modules
///
/// Binary: either every built-in stays external, or every built-in is
/// routed through the alias table. There is no per-module mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeModules {
    /// Leave unresolved; the host runtime provides them
    External,
    /// Redirect to mocks, polyfills and overrides
    Aliased,
}

impl NativeModules {
    /// Policy implied by a description's capability flag
    #[inline]
    pub fn for_capability(has_native_runtime: bool) -> Self {
        if has_native_runtime {
            Self::External
        } else {
            Self::Aliased
        }
    }

    #[inline]
    pub fn is_aliased(&self) -> bool {
        matches!(self, Self::Aliased)
    }
}

/// Trait for deployment targets that fix runtime capabilities
///
/// Implemented by deployment adapters (e.g., Vercel, Cloudflare) so that a
/// description does not have to spell out the capability flag by hand.
pub trait DeploymentTarget: Send + Sync {
    /// Unique identifier (e.g., "vercel-node", "cloudflare-workers")
    fn name(&self) -> &'static str;

    /// Runtime environment for this target
    fn runtime(&self) -> RuntimeEnvironment;

    /// How to handle native platform modules
    fn native_modules(&self) -> NativeModules {
        NativeModules::for_capability(self.runtime().has_native_modules())
    }

    /// Whether dynamically required chunks must be embedded in the bundle
    fn inline_chunks(&self) -> bool {
        false
    }

    /// Apply this target's capabilities to a description
    fn apply(&self, mut desc: ApplicationDescription) -> ApplicationDescription {
        desc.has_native_runtime = !self.native_modules().is_aliased();
        desc.inline_chunks |= self.inline_chunks();
        desc
    }
}
