//! Shared test utilities for cirrus-bundler tests
//!
//! Builds throwaway projects on disk with the runtime directory and the
//! polyfill and pinned packages laid out the way a real install would.

#![allow(dead_code)]

use cirrus_bundler::{ModuleResolver, ResolveError};
use cirrus_config::ApplicationDescription;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Runtime directory inside the project
pub const RUNTIME_DIR: &str = "node_modules/@cirrus/runtime";

/// A project root with everything the assembler resolves
pub struct TestProject {
    // held so the directory outlives the test
    _dir: TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        // canonical so resolved paths compare equal to joined ones
        let root = fs::canonicalize(dir.path()).expect("canonical root");

        let runtime = root.join(RUNTIME_DIR);
        for file in [
            "ssr/vue2.js",
            "ssr/vue2.basic.js",
            "ssr/vue3.js",
            "mocks/generic.js",
            "mocks/depd.js",
            "mocks/http.js",
        ] {
            write(&runtime.join(file), "module.exports = {};");
        }

        for (name, file) in [
            ("buffer", "index.js"),
            ("util", "util.js"),
            ("events", "events.js"),
            ("inherits", "inherits_browser.js"),
            ("@nuxt/devalue", "index.js"),
            ("vue-bundle-renderer", "index.js"),
            ("@cloudflare/kv-asset-handler", "index.js"),
        ] {
            package(&root, name, file);
        }

        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.root.join(RUNTIME_DIR)
    }

    /// Remove a file created by `new()`
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root.join(relative)).expect("remove fixture file");
    }

    /// Description rooted at this project
    pub fn description(&self) -> ApplicationDescription {
        ApplicationDescription {
            root_dir: self.root.clone(),
            ..Default::default()
        }
    }
}

fn package(root: &Path, name: &str, main: &str) {
    let dir = root.join("node_modules").join(name);
    write(
        &dir.join("package.json"),
        &format!(r#"{{"name": "{name}", "main": "{main}"}}"#),
    );
    write(&dir.join(main), "module.exports = {};");
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// Resolves every specifier to `<base>/<specifier>.js` without touching disk
pub struct StubResolver;

impl ModuleResolver for StubResolver {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf, ResolveError> {
        Ok(base_dir.join(format!("{specifier}.js")))
    }
}
