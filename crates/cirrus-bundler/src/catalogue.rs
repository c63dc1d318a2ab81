//! Static module catalogues consulted by the alias resolver.
//!
//! Every table here is fixed at compile time. The alias resolver turns them
//! into typed layers; nothing mutates them.

/// Built-in modules of the Node.js host runtime
/// (`require('module').builtinModules` on Node 20)
pub static NODE_BUILTINS: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Framework dependencies that pull in native modules and are not needed
/// when rendering inside a sandbox
pub static NATIVE_DEPENDENT_MODULES: &[&str] = &[
    // @nuxt/devalue
    "consola",
    // vue2
    "encoding",
    "stream",
    "he",
    "resolve",
    "source-map",
    "lodash.template",
    "serialize-javascript",
    // vue3
    "@babel/parser",
    "@vue/compiler-core",
    "@vue/compiler-dom",
    "@vue/compiler-ssr",
];

/// Modules replaced by dedicated lightweight shims shipped in the runtime
/// directory (module name, path relative to the runtime directory)
pub static RUNTIME_OVERRIDES: &[(&str, &str)] = &[("depd", "mocks/depd"), ("http", "mocks/http")];

/// Platform primitives replaced by portable implementations
/// (module name, specifier of the implementation file)
pub static POLYFILLS: &[(&str, &str)] = &[
    ("buffer", "buffer/index.js"),
    ("util", "util/util.js"),
    ("events", "events/events.js"),
    ("inherits", "inherits/inherits_browser.js"),
];

/// Packages pinned to one physical copy regardless of the runtime
pub static PROVIDED_DEPENDENCIES: &[&str] = &[
    "@nuxt/devalue",
    "vue-bundle-renderer",
    "@cloudflare/kv-asset-handler",
];

/// Shared no-op module inside the runtime directory
pub const GENERIC_MOCK: &str = "mocks/generic";

/// Directory of renderer implementations inside the runtime directory
pub const RENDERER_DIR: &str = "ssr";

/// Framework alias names
pub mod framework {
    pub const RUNTIME: &str = "~runtime";
    pub const RENDERER: &str = "~renderer";
    pub const BUILD: &str = "~build";
    pub const MOCK: &str = "~mock";
}

/// Every module name that a sandboxed build must not leave unresolved
pub fn capability_mock_names() -> impl Iterator<Item = &'static str> {
    NATIVE_DEPENDENT_MODULES
        .iter()
        .chain(NODE_BUILTINS.iter())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtins_are_unique() {
        let unique: HashSet<_> = NODE_BUILTINS.iter().collect();
        assert_eq!(unique.len(), NODE_BUILTINS.len());
    }

    #[test]
    fn builtins_match_node_20() {
        // `node -p "require('module').builtinModules.join(' ')"` on v20.11
        let node_20 = "_http_agent _http_client _http_common _http_incoming _http_outgoing \
            _http_server _stream_duplex _stream_passthrough _stream_readable _stream_transform \
            _stream_wrap _stream_writable _tls_common _tls_wrap assert assert/strict async_hooks \
            buffer child_process cluster console constants crypto dgram diagnostics_channel dns \
            dns/promises domain events fs fs/promises http http2 https inspector \
            inspector/promises module net os path path/posix path/win32 perf_hooks process \
            punycode querystring readline readline/promises repl stream stream/consumers \
            stream/promises stream/web string_decoder sys timers timers/promises tls \
            trace_events tty url util util/types v8 vm wasi worker_threads zlib";
        let expected: Vec<&str> = node_20.split_whitespace().collect();
        assert_eq!(NODE_BUILTINS, expected.as_slice());
    }

    #[test]
    fn overrides_and_polyfills_are_disjoint() {
        let overrides: HashSet<_> = RUNTIME_OVERRIDES.iter().map(|(name, _)| name).collect();
        assert!(POLYFILLS.iter().all(|(name, _)| !overrides.contains(name)));
    }

    #[test]
    fn mock_names_cover_builtins_and_framework_modules() {
        let names: HashSet<_> = capability_mock_names().collect();
        assert!(names.contains("fs"));
        assert!(names.contains("@vue/compiler-ssr"));
        // `stream` appears in both tables
        assert_eq!(
            names.len(),
            NODE_BUILTINS.len() + NATIVE_DEPENDENT_MODULES.len() - 1
        );
    }
}
