//! Capability-conditional alias resolution.
//!
//! Aliases come from independent layers with a fixed rank. Layers are built
//! from the static catalogue and the description, then merged by an explicit
//! rank-ordered walk: the highest-ranked layer claims a key first and lower
//! layers can never overwrite it.

use std::cmp::Reverse;
use std::fmt;
use std::path::{Path, PathBuf};

use cirrus_config::ApplicationDescription;
use indexmap::IndexMap;
use indexmap::map::Entry;
use path_clean::PathClean;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalogue::{
    GENERIC_MOCK, POLYFILLS, PROVIDED_DEPENDENCIES, RENDERER_DIR, RUNTIME_OVERRIDES,
    capability_mock_names, framework,
};
use crate::resolver::ModuleResolver;
use crate::target::NativeModules;
use crate::{Error, Result};

/// Alias layers, lowest rank first
///
/// The derived ordering is the precedence order: a greater variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AliasLayerKind {
    /// `~runtime`, `~renderer`, `~build`, `~mock`
    Framework,
    /// Packages pinned to one physical copy
    ProvidedDependency,
    /// Native modules redirected to the shared no-op module
    CapabilityMock,
    /// Portable reimplementations of platform primitives
    Polyfill,
    /// Dedicated shims that replace a specific module
    Override,
}

impl AliasLayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::ProvidedDependency => "provided-dependency",
            Self::CapabilityMock => "capability-mock",
            Self::Polyfill => "polyfill",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for AliasLayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replacement for an aliased module reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// Concrete path or specifier
    Path(String),
    /// The shared no-op module
    Mock,
}

impl AliasTarget {
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_string_lossy().into_owned())
    }

    fn render(&self, mock_target: &str) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Mock => mock_target.to_string(),
        }
    }
}

/// One ranked source of module-reference rewrites
#[derive(Debug, Clone)]
pub struct AliasLayer {
    kind: AliasLayerKind,
    entries: IndexMap<String, AliasTarget>,
}

impl AliasLayer {
    pub fn new(kind: AliasLayerKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Add an entry; a repeated key inside one layer replaces the earlier value
    pub fn insert(&mut self, key: impl Into<String>, target: AliasTarget) {
        self.entries.insert(key.into(), target);
    }

    pub fn with(mut self, key: impl Into<String>, target: AliasTarget) -> Self {
        self.insert(key, target);
        self
    }

    pub fn kind(&self) -> AliasLayerKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&AliasTarget> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AliasTarget)> {
        self.entries.iter().map(|(key, target)| (key.as_str(), target))
    }
}

/// A flattened alias entry and the layer it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlias {
    pub target: String,
    pub layer: AliasLayerKind,
}

/// Flattened alias mapping with one entry per module reference
///
/// Keys are sorted so the mapping serializes identically across runs.
/// Serializes as a plain `key -> target` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAliases {
    entries: IndexMap<String, ResolvedAlias>,
}

impl ResolvedAliases {
    /// Merge layers by rank
    ///
    /// Layers are visited from highest to lowest rank and each key is claimed
    /// by the first layer that defines it. Layers of equal rank keep their
    /// relative order. `Mock` targets render as `mock_target`.
    pub fn merge(layers: &[AliasLayer], mock_target: &str) -> Self {
        let mut ordered: Vec<&AliasLayer> = layers.iter().collect();
        ordered.sort_by_key(|layer| Reverse(layer.kind));

        let mut entries: IndexMap<String, ResolvedAlias> = IndexMap::new();
        let mut shadowed = 0usize;

        for layer in ordered {
            for (key, target) in layer.iter() {
                match entries.entry(key.to_string()) {
                    Entry::Occupied(winner) => {
                        shadowed += 1;
                        tracing::trace!(
                            "alias '{}' from {} layer shadowed by {} layer",
                            key,
                            layer.kind,
                            winner.get().layer
                        );
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(ResolvedAlias {
                            target: target.render(mock_target),
                            layer: layer.kind,
                        });
                    }
                }
            }
        }

        entries.sort_keys();
        tracing::debug!(
            "merged {} alias layers into {} entries ({} shadowed)",
            layers.len(),
            entries.len(),
            shadowed
        );

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|alias| alias.target.as_str())
    }

    /// Layer that supplied the winning entry for `key`
    pub fn layer_of(&self, key: &str) -> Option<AliasLayerKind> {
        self.entries.get(key).map(|alias| alias.layer)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedAlias)> {
        self.entries.iter().map(|(key, alias)| (key.as_str(), alias))
    }
}

impl Serialize for ResolvedAliases {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, alias) in &self.entries {
            map.serialize_entry(key, &alias.target)?;
        }
        map.end()
    }
}

/// Builds and merges the alias layers for one description
pub struct AliasResolver<'a, R: ModuleResolver + ?Sized> {
    resolver: &'a R,
    runtime_dir: PathBuf,
}

impl<'a, R: ModuleResolver + ?Sized> AliasResolver<'a, R> {
    pub fn new(resolver: &'a R, runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            runtime_dir: runtime_dir.into().clean(),
        }
    }

    /// Resolve the flattened alias mapping for `desc`
    ///
    /// # Errors
    ///
    /// [`Error::RendererNotFound`] when the renderer implementation is missing,
    /// [`Error::DependencyNotFound`] when any other required file is missing.
    pub fn resolve(&self, desc: &ApplicationDescription) -> Result<ResolvedAliases> {
        let mock_target = self.runtime_file(GENERIC_MOCK)?;
        let layers = self.layers(desc, &mock_target)?;
        Ok(ResolvedAliases::merge(&layers, &mock_target))
    }

    /// Build every layer that applies to `desc`, unmerged
    pub fn layers(&self, desc: &ApplicationDescription, mock_target: &str) -> Result<Vec<AliasLayer>> {
        let mut layers = vec![
            self.framework_layer(desc, mock_target)?,
            self.provided_layer(&desc.root_dir)?,
        ];

        if NativeModules::for_capability(desc.has_native_runtime).is_aliased() {
            layers.push(capability_mock_layer());
            layers.push(self.polyfill_layer(&desc.root_dir)?);
            layers.push(self.override_layer());
        }

        Ok(layers)
    }

    fn framework_layer(&self, desc: &ApplicationDescription, mock_target: &str) -> Result<AliasLayer> {
        Ok(AliasLayer::new(AliasLayerKind::Framework)
            .with(framework::RUNTIME, AliasTarget::path(&self.runtime_dir))
            .with(framework::RENDERER, AliasTarget::Path(self.renderer(desc)?))
            .with(framework::BUILD, AliasTarget::path(desc.build_path().clean()))
            .with(framework::MOCK, AliasTarget::Path(mock_target.to_string())))
    }

    fn provided_layer(&self, root_dir: &Path) -> Result<AliasLayer> {
        let mut layer = AliasLayer::new(AliasLayerKind::ProvidedDependency);
        for name in PROVIDED_DEPENDENCIES {
            layer.insert(*name, AliasTarget::path(self.dependency(name, root_dir)?));
        }
        Ok(layer)
    }

    fn polyfill_layer(&self, root_dir: &Path) -> Result<AliasLayer> {
        let mut layer = AliasLayer::new(AliasLayerKind::Polyfill);
        for (name, specifier) in POLYFILLS {
            layer.insert(*name, AliasTarget::path(self.dependency(specifier, root_dir)?));
        }
        Ok(layer)
    }

    fn override_layer(&self) -> AliasLayer {
        let mut layer = AliasLayer::new(AliasLayerKind::Override);
        for (name, shim) in RUNTIME_OVERRIDES {
            layer.insert(*name, AliasTarget::path(self.runtime_dir.join(shim).clean()));
        }
        layer
    }

    fn renderer(&self, desc: &ApplicationDescription) -> Result<String> {
        let specifier = self
            .runtime_dir
            .join(RENDERER_DIR)
            .join(desc.renderer.as_str());
        self.resolver
            .resolve(&specifier.to_string_lossy(), &self.runtime_dir)
            .map(|path| path.to_string_lossy().into_owned())
            .map_err(|source| Error::RendererNotFound {
                renderer: desc.renderer.to_string(),
                source,
            })
    }

    fn runtime_file(&self, relative: &str) -> Result<String> {
        let specifier = self.runtime_dir.join(relative);
        self.dependency(&specifier.to_string_lossy(), &self.runtime_dir)
            .map(|path| path.to_string_lossy().into_owned())
    }

    fn dependency(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf> {
        self.resolver
            .resolve(specifier, base_dir)
            .map_err(|source| Error::DependencyNotFound { source })
    }
}

/// Every capability-sensitive module mapped to the shared mock
pub fn capability_mock_layer() -> AliasLayer {
    let mut layer = AliasLayer::new(AliasLayerKind::CapabilityMock);
    for name in capability_mock_names() {
        layer.insert(name, AliasTarget::Mock);
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{NATIVE_DEPENDENT_MODULES, NODE_BUILTINS};
    use crate::resolver::ResolveError;
    use cirrus_config::Renderer;

    /// Resolves every specifier to `<base>/<specifier>.js` unless listed as missing
    struct EchoResolver {
        missing: Vec<&'static str>,
    }

    impl ModuleResolver for EchoResolver {
        fn resolve(&self, specifier: &str, base_dir: &Path) -> std::result::Result<PathBuf, ResolveError> {
            if self.missing.iter().any(|m| specifier.ends_with(m)) {
                return Err(ResolveError {
                    specifier: specifier.to_string(),
                    base_dir: base_dir.to_path_buf(),
                    reason: "not found".to_string(),
                });
            }
            Ok(base_dir.join(format!("{specifier}.js")))
        }
    }

    fn echo() -> EchoResolver {
        EchoResolver { missing: vec![] }
    }

    fn restricted() -> ApplicationDescription {
        ApplicationDescription {
            root_dir: PathBuf::from("/app"),
            ..Default::default()
        }
        .with_native_runtime(false)
    }

    #[test]
    fn higher_rank_wins_regardless_of_layer_order() {
        let mock = AliasLayer::new(AliasLayerKind::CapabilityMock).with("x", AliasTarget::Mock);
        let custom = AliasLayer::new(AliasLayerKind::Override)
            .with("x", AliasTarget::Path("/shims/x.js".into()));

        for layers in [vec![mock.clone(), custom.clone()], vec![custom, mock]] {
            let merged = ResolvedAliases::merge(&layers, "/mock.js");
            assert_eq!(merged.get("x"), Some("/shims/x.js"));
            assert_eq!(merged.layer_of("x"), Some(AliasLayerKind::Override));
            assert_eq!(merged.len(), 1);
        }
    }

    #[test]
    fn mock_sentinel_renders_as_mock_target() {
        let layer = AliasLayer::new(AliasLayerKind::CapabilityMock).with("fs", AliasTarget::Mock);
        let merged = ResolvedAliases::merge(&[layer], "/runtime/mocks/generic.js");
        assert_eq!(merged.get("fs"), Some("/runtime/mocks/generic.js"));
    }

    #[test]
    fn merged_keys_are_sorted() {
        let layer = AliasLayer::new(AliasLayerKind::Polyfill)
            .with("util", AliasTarget::Path("u".into()))
            .with("buffer", AliasTarget::Path("b".into()))
            .with("events", AliasTarget::Path("e".into()));
        let merged = ResolvedAliases::merge(&[layer], "m");
        let keys: Vec<_> = merged.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["buffer", "events", "util"]);
    }

    #[test]
    fn restricted_runtime_aliases_every_capability_module() {
        let resolver = echo();
        let aliases = AliasResolver::new(&resolver, "/runtime")
            .resolve(&restricted())
            .unwrap();

        for name in NODE_BUILTINS.iter().chain(NATIVE_DEPENDENT_MODULES) {
            assert!(aliases.contains_key(name), "missing alias for {name}");
        }
        for (name, _) in POLYFILLS {
            assert!(aliases.contains_key(name), "missing polyfill for {name}");
        }
    }

    #[test]
    fn restricted_layers_rank_as_expected() {
        let resolver = echo();
        let aliases = AliasResolver::new(&resolver, "/runtime")
            .resolve(&restricted())
            .unwrap();

        assert_eq!(aliases.layer_of("fs"), Some(AliasLayerKind::CapabilityMock));
        assert_eq!(aliases.get("fs"), Some("/runtime/mocks/generic.js"));
        assert_eq!(aliases.layer_of("http"), Some(AliasLayerKind::Override));
        assert_eq!(aliases.get("http"), Some("/runtime/mocks/http"));
        assert_eq!(aliases.layer_of("depd"), Some(AliasLayerKind::Override));
        assert_eq!(aliases.layer_of("buffer"), Some(AliasLayerKind::Polyfill));
        assert_eq!(aliases.get("buffer"), Some("/app/buffer/index.js.js"));
        assert_eq!(aliases.layer_of("inherits"), Some(AliasLayerKind::Polyfill));
        assert_eq!(
            aliases.layer_of("vue-bundle-renderer"),
            Some(AliasLayerKind::ProvidedDependency)
        );
    }

    #[test]
    fn full_runtime_has_no_capability_layers() {
        let resolver = echo();
        let desc = ApplicationDescription {
            root_dir: PathBuf::from("/app"),
            ..Default::default()
        };
        let aliases = AliasResolver::new(&resolver, "/runtime").resolve(&desc).unwrap();

        for name in capability_mock_names() {
            assert!(!aliases.contains_key(name), "unexpected alias for {name}");
        }
        assert!(!aliases.contains_key("inherits"));
        assert!(!aliases.contains_key("depd"));
        assert_eq!(aliases.len(), 4 + PROVIDED_DEPENDENCIES.len());
    }

    #[test]
    fn renderer_binding_follows_selector() {
        let resolver = echo();
        let alias_resolver = AliasResolver::new(&resolver, "/runtime");
        for renderer in Renderer::ALL {
            let desc = ApplicationDescription::default().with_renderer(renderer);
            let aliases = alias_resolver.resolve(&desc).unwrap();
            assert_eq!(
                aliases.get(framework::RENDERER),
                Some(format!("/runtime/ssr/{renderer}.js").as_str())
            );
        }
    }

    #[test]
    fn missing_renderer_fails_fast() {
        let resolver = EchoResolver {
            missing: vec!["ssr/vue3"],
        };
        let desc = ApplicationDescription::default().with_renderer(Renderer::Vue3);
        let err = AliasResolver::new(&resolver, "/runtime")
            .resolve(&desc)
            .unwrap_err();
        assert!(matches!(err, Error::RendererNotFound { ref renderer, .. } if renderer == "vue3"));
    }

    #[test]
    fn missing_polyfill_is_a_dependency_error() {
        let resolver = EchoResolver {
            missing: vec!["events/events.js"],
        };
        let err = AliasResolver::new(&resolver, "/runtime")
            .resolve(&restricted())
            .unwrap_err();
        match err {
            Error::DependencyNotFound { source } => assert_eq!(source.specifier, "events/events.js"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn polyfills_are_not_resolved_for_full_runtime() {
        let resolver = EchoResolver {
            missing: vec!["events/events.js"],
        };
        assert!(
            AliasResolver::new(&resolver, "/runtime")
                .resolve(&ApplicationDescription::default())
                .is_ok()
        );
    }

    #[test]
    fn serializes_as_plain_map() {
        let layer = AliasLayer::new(AliasLayerKind::Override).with("http", AliasTarget::Path("/h".into()));
        let merged = ResolvedAliases::merge(&[layer], "m");
        assert_eq!(serde_json::to_value(&merged).unwrap(), serde_json::json!({ "http": "/h" }));
    }
}
