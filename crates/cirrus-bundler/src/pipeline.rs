//! Transformation stages with execution phases.
//!
//! Stages are descriptors for the external bundling engine. Each carries a
//! phase, and the pipeline runs them in phase order so that constants are
//! folded before resolution, synthetic and aliased names are known before the
//! filesystem is consulted, and CommonJS interop sees resolved modules.

use std::path::{Path, PathBuf};

use cirrus_config::ApplicationDescription;
use indexmap::IndexMap;
use path_clean::PathClean;
use serde::Serialize;

use crate::alias::ResolvedAliases;
use crate::catalogue::NODE_BUILTINS;
use crate::replace::ReplacementTable;
use crate::resolver::RESOLVE_EXTENSIONS;
use crate::target::NativeModules;
use crate::{Error, Result};

/// Stage execution phases
///
/// Stages are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagePhase {
    /// Constant replacement (always first)
    ///
    /// Dead branches disappear before anything tries to satisfy their imports.
    Replace = 0,

    /// Dynamic require support for server chunks
    DynamicRequire = 10,

    /// Virtual module provision
    Virtual = 20,

    /// Alias substitution
    Alias = 30,

    /// Generic module resolution against the filesystem
    Resolve = 40,

    /// CommonJS interop normalization
    Interop = 50,

    /// JSON module loading
    Json = 60,

    /// Bundle size analysis (optional)
    Analyze = 90,

    /// Minification (optional, always last)
    Minify = 100,
}

/// How dynamically required server chunks are emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DynamicRequireMode {
    /// Everything embedded in the bundle, no output directory
    Inline,
    /// Chunks written to `out_dir/<chunks_dir>`
    Split { out_dir: PathBuf },
}

/// One opaque transformation stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum Stage {
    Replace {
        values: ReplacementTable,
    },
    DynamicRequire {
        /// Directory scanned for dynamically required chunks
        dir: PathBuf,
        #[serde(flatten)]
        mode: DynamicRequireMode,
        chunks_dir: String,
        ignore: Vec<String>,
    },
    Virtual {
        modules: IndexMap<String, String>,
    },
    Alias {
        entries: ResolvedAliases,
    },
    Resolve {
        extensions: Vec<String>,
        prefer_builtins: bool,
        root_dir: PathBuf,
        main_fields: Vec<String>,
    },
    Interop {
        extensions: Vec<String>,
    },
    Json,
    Analyze,
    Minify,
}

impl Stage {
    pub fn phase(&self) -> StagePhase {
        match self {
            Stage::Replace { .. } => StagePhase::Replace,
            Stage::DynamicRequire { .. } => StagePhase::DynamicRequire,
            Stage::Virtual { .. } => StagePhase::Virtual,
            Stage::Alias { .. } => StagePhase::Alias,
            Stage::Resolve { .. } => StagePhase::Resolve,
            Stage::Interop { .. } => StagePhase::Interop,
            Stage::Json => StagePhase::Json,
            Stage::Analyze => StagePhase::Analyze,
            Stage::Minify => StagePhase::Minify,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Replace { .. } => "replace",
            Stage::DynamicRequire { .. } => "dynamic-require",
            Stage::Virtual { .. } => "virtual",
            Stage::Alias { .. } => "alias",
            Stage::Resolve { .. } => "resolve",
            Stage::Interop { .. } => "interop",
            Stage::Json => "json",
            Stage::Analyze => "analyze",
            Stage::Minify => "minify",
        }
    }
}

/// Phases every pipeline must contain
const REQUIRED_PHASES: &[StagePhase] = &[
    StagePhase::Replace,
    StagePhase::Virtual,
    StagePhase::Alias,
    StagePhase::Resolve,
    StagePhase::Interop,
];

/// An ordered, validated stage list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Accept a stage list as-is after checking the ordering invariants
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self> {
        let pipeline = Self { stages };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Check the ordering invariants
    ///
    /// Phases must be strictly increasing (no stage twice, no stage out of
    /// order) and every required phase must be present.
    pub fn validate(&self) -> Result<()> {
        for pair in self.stages.windows(2) {
            if pair[0].phase() >= pair[1].phase() {
                return Err(Error::InvalidPipeline {
                    message: format!(
                        "stage '{}' must not run before '{}'",
                        pair[0].name(),
                        pair[1].name()
                    ),
                });
            }
        }

        for required in REQUIRED_PHASES {
            if self.position(*required).is_none() {
                return Err(Error::InvalidPipeline {
                    message: format!("missing required {required:?} stage"),
                });
            }
        }

        Ok(())
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the stage running in `phase`
    pub fn position(&self, phase: StagePhase) -> Option<usize> {
        self.stages.iter().position(|stage| stage.phase() == phase)
    }

    pub fn stage(&self, phase: StagePhase) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.phase() == phase)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }
}

/// Collects stages in any order and sorts them into a pipeline
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage; sorting happens once in `build()`
    pub fn add(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn build(mut self) -> Result<Pipeline> {
        self.stages.sort_by_key(Stage::phase);
        Pipeline::from_stages(self.stages)
    }
}

/// Inputs computed by the other components
pub struct PipelineInputs {
    pub replacements: ReplacementTable,
    pub virtual_modules: IndexMap<String, String>,
    pub aliases: ResolvedAliases,
}

/// Decides stage parameters from a description
pub struct PipelineAssembler<'a> {
    desc: &'a ApplicationDescription,
}

impl<'a> PipelineAssembler<'a> {
    pub fn new(desc: &'a ApplicationDescription) -> Self {
        Self { desc }
    }

    /// Native module policy implied by the capability flag
    pub fn native_modules(&self) -> NativeModules {
        NativeModules::for_capability(self.desc.has_native_runtime)
    }

    /// Module references left for the host runtime
    pub fn externals(&self) -> Vec<String> {
        match self.native_modules() {
            NativeModules::External => NODE_BUILTINS.iter().map(|m| (*m).to_string()).collect(),
            NativeModules::Aliased => Vec::new(),
        }
    }

    /// Emission mode of the dynamic require stage
    ///
    /// Restricted runtimes cannot load chunks from disk, so they always inline.
    pub fn dynamic_require_mode(&self) -> DynamicRequireMode {
        if self.native_modules().is_aliased() || self.desc.inline_chunks {
            return DynamicRequireMode::Inline;
        }
        let out_dir = self
            .desc
            .out_file()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .clean();
        DynamicRequireMode::Split { out_dir }
    }

    /// Chunk directory name: `_` followed by the output file stem
    pub fn chunks_dir(&self) -> String {
        let stem = Path::new(&self.desc.out_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("_{stem}")
    }

    pub fn assemble(&self, inputs: PipelineInputs) -> Result<Pipeline> {
        let extensions: Vec<String> = RESOLVE_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
        let interop_extensions = extensions.iter().filter(|e| *e != ".json").cloned().collect();

        let mut builder = PipelineBuilder::new();
        builder
            .add(Stage::Replace {
                values: inputs.replacements,
            })
            .add(Stage::DynamicRequire {
                dir: self.desc.build_path().join("dist/server").clean(),
                mode: self.dynamic_require_mode(),
                chunks_dir: self.chunks_dir(),
                ignore: vec!["server.js".to_string()],
            })
            .add(Stage::Virtual {
                modules: inputs.virtual_modules,
            })
            .add(Stage::Alias {
                entries: inputs.aliases,
            })
            .add(Stage::Resolve {
                extensions,
                prefer_builtins: true,
                root_dir: self.desc.root_dir.clone(),
                main_fields: vec!["main".to_string()],
            })
            .add(Stage::Interop {
                extensions: interop_extensions,
            })
            .add(Stage::Json);

        if self.desc.analyze {
            builder.add(Stage::Analyze);
        }
        if self.desc.minify {
            builder.add(Stage::Minify);
        }

        let pipeline = builder.build()?;
        tracing::debug!("pipeline: {}", pipeline.names().join(" -> "));
        Ok(pipeline)
    }
}
