//! Top-level build configuration assembly.

use std::path::PathBuf;

use cirrus_config::{ApplicationDescription, validate_schema};
use indexmap::IndexMap;
use serde::Serialize;

use crate::alias::{AliasResolver, ResolvedAliases};
use crate::middleware::{IdentifierHasher, MIDDLEWARE_MODULE_ID, MiddlewareModuleSynthesizer, Sha512Hasher};
use crate::pipeline::{Pipeline, PipelineAssembler, PipelineInputs, Stage, StagePhase};
use crate::replace::ReplacementTable;
use crate::resolver::{ModuleResolver, NodeModuleResolver};
use crate::target::DeploymentTarget;
use crate::{Error, Result};

/// Captures the process start time before any application code runs
pub const STARTUP_INTRO: &str = "global._startTime = process.hrtime();";

/// Logs the elapsed cold start time once the bundle has finished loading
pub const STARTUP_OUTRO: &str = "global._endTime = process.hrtime(global._startTime); global._coldstart = ((global._endTime[0] * 1e9) + global._endTime[1]) / 1e6; console.log(`λ Cold start took: ${global._coldstart}ms`);";

/// Module format of the emitted bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    #[default]
    Cjs,
}

/// Where and how the bundle is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDescriptor {
    pub file: PathBuf,
    pub format: ModuleFormat,
    /// Code injected before the bundle body
    pub intro: String,
    /// Code injected after the bundle body
    pub outro: String,
    pub prefer_const: bool,
}

/// The assembled configuration handed to the bundling engine
///
/// Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfiguration {
    input: PathBuf,
    output: OutputDescriptor,
    external: Vec<String>,
    stages: Pipeline,
}

impl BuildConfiguration {
    pub fn input(&self) -> &std::path::Path {
        &self.input
    }

    pub fn output(&self) -> &OutputDescriptor {
        &self.output
    }

    /// Module references left for the host runtime
    pub fn external(&self) -> &[String] {
        &self.external
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.stages
    }

    pub fn aliases(&self) -> Option<&ResolvedAliases> {
        match self.stages.stage(StagePhase::Alias) {
            Some(Stage::Alias { entries }) => Some(entries),
            _ => None,
        }
    }

    pub fn virtual_modules(&self) -> Option<&IndexMap<String, String>> {
        match self.stages.stage(StagePhase::Virtual) {
            Some(Stage::Virtual { modules }) => Some(modules),
            _ => None,
        }
    }

    pub fn replacements(&self) -> Option<&ReplacementTable> {
        match self.stages.stage(StagePhase::Replace) {
            Some(Stage::Replace { values }) => Some(values),
            _ => None,
        }
    }

    /// Source of the synthesized middleware module
    pub fn middleware_module(&self) -> Option<&str> {
        self.virtual_modules()
            .and_then(|modules| modules.get(MIDDLEWARE_MODULE_ID))
            .map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Serialize)
    }
}

/// Builds one [`BuildConfiguration`] per description
///
/// # Example
///
/// ```no_run
/// use cirrus_bundler::ConfigAssembler;
/// use cirrus_config::ApplicationDescription;
///
/// let desc = ApplicationDescription::new("server/index.js")
///     .with_native_runtime(false)
///     .with_middleware("/api", "./api/index.js");
///
/// let config = ConfigAssembler::new("node_modules/@cirrus/runtime")
///     .assemble(&desc)
///     .unwrap();
/// println!("{}", config.to_json().unwrap());
/// ```
pub struct ConfigAssembler<R = NodeModuleResolver, H = Sha512Hasher> {
    runtime_dir: PathBuf,
    resolver: R,
    synthesizer: MiddlewareModuleSynthesizer<H>,
}

impl ConfigAssembler {
    /// Assembler resolving through Node-style module resolution
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            resolver: NodeModuleResolver::new(),
            synthesizer: MiddlewareModuleSynthesizer::new(),
        }
    }
}

impl<R: ModuleResolver, H: IdentifierHasher> ConfigAssembler<R, H> {
    pub fn with_resolver<R2: ModuleResolver>(self, resolver: R2) -> ConfigAssembler<R2, H> {
        ConfigAssembler {
            runtime_dir: self.runtime_dir,
            resolver,
            synthesizer: self.synthesizer,
        }
    }

    pub fn with_hasher<H2: IdentifierHasher>(self, hasher: H2) -> ConfigAssembler<R, H2> {
        ConfigAssembler {
            runtime_dir: self.runtime_dir,
            resolver: self.resolver,
            synthesizer: MiddlewareModuleSynthesizer::with_hasher(hasher),
        }
    }

    /// Assemble the build configuration for `desc`
    ///
    /// Either a complete configuration or an error; nothing is produced on
    /// failure.
    pub fn assemble(&self, desc: &ApplicationDescription) -> Result<BuildConfiguration> {
        validate_schema(desc)?;

        let aliases = AliasResolver::new(&self.resolver, &self.runtime_dir).resolve(desc)?;

        let mut virtual_modules = IndexMap::new();
        virtual_modules.insert(
            MIDDLEWARE_MODULE_ID.to_string(),
            self.synthesizer.synthesize(&desc.server_middleware),
        );

        let pipeline_assembler = PipelineAssembler::new(desc);
        let stages = pipeline_assembler.assemble(PipelineInputs {
            replacements: ReplacementTable::for_description(desc),
            virtual_modules,
            aliases,
        })?;

        let (intro, outro) = if desc.log_startup {
            (STARTUP_INTRO.to_string(), STARTUP_OUTRO.to_string())
        } else {
            (String::new(), String::new())
        };

        let config = BuildConfiguration {
            input: desc.entry_path(),
            output: OutputDescriptor {
                file: desc.out_file(),
                format: ModuleFormat::Cjs,
                intro,
                outro,
                prefer_const: true,
            },
            external: pipeline_assembler.externals(),
            stages,
        };

        tracing::info!(
            "assembled {} ({} externals, {} aliases, {} stages)",
            config.output.file.display(),
            config.external.len(),
            config.aliases().map_or(0, ResolvedAliases::len),
            config.stages.len()
        );

        Ok(config)
    }

    /// Apply a deployment target's capabilities, then assemble
    pub fn assemble_for(
        &self,
        target: &dyn DeploymentTarget,
        desc: ApplicationDescription,
    ) -> Result<BuildConfiguration> {
        tracing::debug!("assembling for target {}", target.name());
        self.assemble(&target.apply(desc))
    }
}
