//! Virtual module aggregating the configured server middleware.
//!
//! The generated module imports every handler under an identifier derived
//! from a content hash of its path and default-exports the `{ route, handle }`
//! list in declaration order.

use std::collections::{HashMap, HashSet};

use cirrus_config::MiddlewareBinding;
use sha2::{Digest, Sha512};

/// Name of the synthesized middleware module
pub const MIDDLEWARE_MODULE_ID: &str = "~serverMiddleware";

/// Number of hash characters kept in a generated identifier
pub const IDENTIFIER_HASH_WIDTH: usize = 6;

/// Content hash used to derive import identifiers
///
/// Must be a pure function of the input string. Not security sensitive.
pub trait IdentifierHasher {
    fn hex_digest(&self, input: &str) -> String;
}

/// SHA-512, hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Hasher;

impl IdentifierHasher for Sha512Hasher {
    fn hex_digest(&self, input: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(input.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// One import in the generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerImport {
    pub identifier: String,
    pub handle: String,
}

/// Binding list with identifiers assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewarePlan {
    /// One import per distinct handler path, in first-seen order
    pub imports: Vec<HandlerImport>,
    /// `(route, identifier)` per binding, in input order
    pub routes: Vec<(String, String)>,
}

/// Issues identifiers that are unique within one module
///
/// A handler path always maps to the same identifier. Distinct paths whose
/// hash prefixes collide get `_1`, `_2`, ... appended in first-seen order.
struct IdentifierAllocator<'h, H: IdentifierHasher + ?Sized> {
    hasher: &'h H,
    by_handle: HashMap<String, String>,
    issued: HashSet<String>,
}

impl<'h, H: IdentifierHasher + ?Sized> IdentifierAllocator<'h, H> {
    fn new(hasher: &'h H) -> Self {
        Self {
            hasher,
            by_handle: HashMap::new(),
            issued: HashSet::new(),
        }
    }

    /// Identifier for `handle` and whether it was newly issued
    fn identifier(&mut self, handle: &str) -> (String, bool) {
        if let Some(existing) = self.by_handle.get(handle) {
            return (existing.clone(), false);
        }

        let prefix = self.prefix(handle);
        let mut candidate = prefix.clone();
        let mut suffix = 1usize;
        while self.issued.contains(&candidate) {
            tracing::trace!("identifier {} already issued, disambiguating '{}'", candidate, handle);
            candidate = format!("{prefix}_{suffix}");
            suffix += 1;
        }

        self.issued.insert(candidate.clone());
        self.by_handle.insert(handle.to_string(), candidate.clone());
        (candidate, true)
    }

    fn prefix(&self, handle: &str) -> String {
        let digest: String = self
            .hasher
            .hex_digest(handle)
            .chars()
            .take(IDENTIFIER_HASH_WIDTH)
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("_{digest}")
    }
}

/// Generates the middleware virtual module
#[derive(Debug, Clone, Default)]
pub struct MiddlewareModuleSynthesizer<H = Sha512Hasher> {
    hasher: H,
}

impl MiddlewareModuleSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: IdentifierHasher> MiddlewareModuleSynthesizer<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// Assign identifiers to `bindings` without rendering source
    pub fn plan(&self, bindings: &[MiddlewareBinding]) -> MiddlewarePlan {
        let mut allocator = IdentifierAllocator::new(&self.hasher);
        let mut imports = Vec::new();
        let mut routes = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let (identifier, is_new) = allocator.identifier(&binding.handle);
            if is_new {
                imports.push(HandlerImport {
                    identifier: identifier.clone(),
                    handle: binding.handle.clone(),
                });
            }
            routes.push((binding.route.clone(), identifier));
        }

        MiddlewarePlan { imports, routes }
    }

    /// Render the module source for `bindings`
    ///
    /// Output is byte-identical for identical input.
    pub fn synthesize(&self, bindings: &[MiddlewareBinding]) -> String {
        render(&self.plan(bindings))
    }
}

fn render(plan: &MiddlewarePlan) -> String {
    let mut source = String::new();

    for import in &plan.imports {
        source.push_str(&format!(
            "import {} from {};\n",
            import.identifier,
            js_string(&import.handle)
        ));
    }

    if plan.routes.is_empty() {
        source.push_str("export default [];\n");
        return source;
    }

    if !plan.imports.is_empty() {
        source.push('\n');
    }

    let entries: Vec<String> = plan
        .routes
        .iter()
        .map(|(route, identifier)| {
            format!("  {{ route: {}, handle: {} }}", js_string(route), identifier)
        })
        .collect();

    source.push_str("export default [\n");
    source.push_str(&entries.join(",\n"));
    source.push_str("\n];\n");
    source
}

/// JSON string literal, which is also a valid JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
