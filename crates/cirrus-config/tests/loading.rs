//! Layered loading: defaults, config file, environment.

use cirrus_config::{ApplicationDescription, ConfigDiscovery, discover, ConfigError, ConfigSource, MiddlewareBinding, Renderer};
use figment::Jail;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn toml_config_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cirrus.toml"),
        r#"
entry = "server/index.js"
has_native_runtime = false
renderer = "vue3"
log_startup = true

[static_assets]
base = "/_nuxt/static"
version = "1700000000"

[[server_middleware]]
route = "/api"
handle = "./api/index.js"

[[server_middleware]]
route = "/health"
handle = "./health.js"
"#,
    )
    .unwrap();

    let desc = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(desc.root_dir, dir.path());
    assert_eq!(desc.entry, PathBuf::from("server/index.js"));
    assert!(!desc.has_native_runtime);
    assert_eq!(desc.renderer, Renderer::Vue3);
    assert!(desc.log_startup);
    assert_eq!(desc.static_assets.version, "1700000000");
    assert_eq!(
        desc.server_middleware,
        vec![
            MiddlewareBinding::new("/api", "./api/index.js"),
            MiddlewareBinding::new("/health", "./health.js"),
        ]
    );
    // untouched fields keep their defaults
    assert!(desc.minify);
    assert_eq!(desc.out_name, "server.js");
}

#[test]
fn package_json_field_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{
            "name": "shop",
            "cirrus": {
                "out_name": "lambda.js",
                "inline_chunks": true
            }
        }"#,
    )
    .unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    assert!(matches!(discovery.find(), Some(ConfigSource::PackageJson(_))));

    let desc = discovery.load().unwrap();
    assert_eq!(desc.out_name, "lambda.js");
    assert!(desc.inline_chunks);
}

#[test]
fn unknown_renderer_in_file_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cirrus.json"), r#"{"renderer": "react"}"#).unwrap();

    let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
    match err {
        ConfigError::UnknownRenderer { value, expected } => {
            assert_eq!(value, "react");
            assert_eq!(expected, "vue2, vue2.basic, vue3");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "cirrus.toml",
            r#"
minify = true
has_native_runtime = true
"#,
        )?;
        jail.set_env("CIRRUS_MINIFY", "false");
        jail.set_env("CIRRUS_STATIC_ASSETS__VERSION", "v42");

        let desc = ConfigDiscovery::new(jail.directory())
            .load()
            .map_err(|e| e.to_string())?;

        assert!(!desc.minify);
        assert!(desc.has_native_runtime);
        assert_eq!(desc.static_assets.version, "v42");
        Ok(())
    });
}

#[test]
fn load_or_default_uses_environment_without_file() {
    Jail::expect_with(|jail| {
        jail.set_env("CIRRUS_HAS_NATIVE_RUNTIME", "false");

        let desc = ConfigDiscovery::new(jail.directory())
            .load_or_default()
            .map_err(|e| e.to_string())?;

        assert!(!desc.has_native_runtime);
        assert_eq!(desc.renderer, Renderer::Vue2);
        Ok(())
    });
}

#[test]
fn description_load_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let desc = ApplicationDescription::load(dir.path()).unwrap();
    assert_eq!(desc.root_dir, dir.path());
    assert_eq!(desc.renderer, Renderer::Vue2);
}

#[test]
fn discover_loads_from_current_directory() {
    Jail::expect_with(|jail| {
        jail.create_file("cirrus.json", r#"{"entry": "dist/server.js", "renderer": "vue2.basic"}"#)?;

        let desc = discover().map_err(|e| e.to_string())?;
        let cwd = std::env::current_dir().map_err(|e| e.to_string())?;

        assert_eq!(desc.root_dir, cwd);
        assert_eq!(desc.entry, PathBuf::from("dist/server.js"));
        assert_eq!(desc.renderer, Renderer::Vue2Basic);
        Ok(())
    });
}

#[test]
fn discover_requires_a_config_file() {
    Jail::expect_with(|_jail| {
        assert!(matches!(discover(), Err(ConfigError::NotFound)));
        Ok(())
    });
}
